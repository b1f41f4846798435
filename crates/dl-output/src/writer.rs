//! The `OutputWriter` trait implemented by all backend writers.

use crate::{DeliveryRow, OutputResult, SegmentRow, VehicleRow, WarehouseRow};

/// One output backend.
///
/// The fleet is written once at the start of a run; deliveries and their
/// segments arrive in delivery-id order, in batches of any size (including
/// empty).  [`OutputObserver`][crate::OutputObserver] stores the first error
/// instead of propagating it, since observer callbacks cannot fail.
pub trait OutputWriter {
    fn write_warehouses(&mut self, rows: &[WarehouseRow]) -> OutputResult<()>;

    fn write_vehicles(&mut self, rows: &[VehicleRow]) -> OutputResult<()>;

    fn write_deliveries(&mut self, rows: &[DeliveryRow]) -> OutputResult<()>;

    fn write_segments(&mut self, rows: &[SegmentRow]) -> OutputResult<()>;

    /// Flush and close all underlying files.  Safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
