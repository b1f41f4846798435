//! `OutputObserver<W>` — bridges `GeneratorObserver` to an `OutputWriter`.

use dl_generator::{DeliveryRecord, Fleet, GeneratorObserver, RunSummary};
use dl_spatial::RoadNetwork;

use crate::row::{DeliveryRow, SegmentRow, VehicleRow, WarehouseRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// Deliveries buffered before a write, unless overridden with
/// [`OutputObserver::with_flush_every`].
pub const DEFAULT_FLUSH_EVERY: usize = 256;

/// A [`GeneratorObserver`] that writes the fleet, deliveries and segments to
/// any [`OutputWriter`] backend (CSV, SQLite, Parquet, …).
///
/// Node ids are translated to external ids through `network`, which must be
/// the network the generator runs on.
///
/// Errors from the writer are stored internally because observer methods
/// have no return value.  After `generator.run()` returns, check for errors
/// with [`take_error`][Self::take_error].
pub struct OutputObserver<'a, W: OutputWriter> {
    writer:      W,
    network:     &'a RoadNetwork,
    deliveries:  Vec<DeliveryRow>,
    segments:    Vec<SegmentRow>,
    flush_every: usize,
    last_error:  Option<OutputError>,
}

impl<'a, W: OutputWriter> OutputObserver<'a, W> {
    pub fn new(writer: W, network: &'a RoadNetwork) -> Self {
        Self {
            writer,
            network,
            deliveries:  Vec::new(),
            segments:    Vec::new(),
            flush_every: DEFAULT_FLUSH_EVERY,
            last_error:  None,
        }
    }

    /// Write buffered rows every `n` deliveries (minimum 1).
    pub fn with_flush_every(mut self, n: usize) -> Self {
        self.flush_every = n.max(1);
        self
    }

    /// Take the stored write error (if any) after `generator.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Write the buffered delivery and segment rows.
    ///
    /// The buffers are cleared even when a write fails.
    pub fn flush(&mut self) -> OutputResult<()> {
        let deliveries = std::mem::take(&mut self.deliveries);
        let segments = std::mem::take(&mut self.segments);
        if !deliveries.is_empty() {
            self.writer.write_deliveries(&deliveries)?;
        }
        if !segments.is_empty() {
            self.writer.write_segments(&segments)?;
        }
        Ok(())
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> GeneratorObserver for OutputObserver<'_, W> {
    fn on_fleet(&mut self, fleet: &Fleet) {
        let warehouses: Vec<WarehouseRow> = fleet
            .warehouses
            .iter()
            .map(|w| WarehouseRow::new(w, self.network))
            .collect();
        let result = self.writer.write_warehouses(&warehouses);
        self.store_err(result);

        let vehicles: Vec<VehicleRow> = fleet.vehicles.iter().map(VehicleRow::from).collect();
        let result = self.writer.write_vehicles(&vehicles);
        self.store_err(result);
    }

    fn on_delivery(&mut self, delivery: &DeliveryRecord) {
        self.deliveries.push(DeliveryRow::from(delivery));
        let network = self.network;
        self.segments
            .extend(delivery.segments.iter().map(|s| SegmentRow::new(s, network)));

        if self.deliveries.len() >= self.flush_every {
            let result = self.flush();
            self.store_err(result);
        }
    }

    fn on_run_end(&mut self, _summary: &RunSummary) {
        let result = self.flush();
        self.store_err(result);
        let result = self.writer.finish();
        self.store_err(result);
    }
}
