//! CSV output backend.
//!
//! Creates four files in the configured output directory:
//! - `warehouses.csv`
//! - `vehicles.csv`
//! - `deliveries.csv`
//! - `segments.csv`
//!
//! Dates are written as `YYYY-MM-DD`; trips and geometries are quoted by the
//! `csv` crate since they contain commas.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::error::create_file;
use crate::row::{DELIVERY_COLUMNS, SEGMENT_COLUMNS, VEHICLE_COLUMNS, WAREHOUSE_COLUMNS};
use crate::writer::OutputWriter;
use crate::{DeliveryRow, OutputResult, SegmentRow, VehicleRow, WarehouseRow};

/// Writes generator output to four CSV files.
pub struct CsvWriter {
    warehouses: Writer<File>,
    vehicles:   Writer<File>,
    deliveries: Writer<File>,
    segments:   Writer<File>,
    finished:   bool,
}

impl CsvWriter {
    /// Create the four CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut warehouses = Writer::from_writer(create_file(dir.join("warehouses.csv"))?);
        warehouses.write_record(WAREHOUSE_COLUMNS)?;

        let mut vehicles = Writer::from_writer(create_file(dir.join("vehicles.csv"))?);
        vehicles.write_record(VEHICLE_COLUMNS)?;

        let mut deliveries = Writer::from_writer(create_file(dir.join("deliveries.csv"))?);
        deliveries.write_record(DELIVERY_COLUMNS)?;

        let mut segments = Writer::from_writer(create_file(dir.join("segments.csv"))?);
        segments.write_record(SEGMENT_COLUMNS)?;

        Ok(Self {
            warehouses,
            vehicles,
            deliveries,
            segments,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_warehouses(&mut self, rows: &[WarehouseRow]) -> OutputResult<()> {
        for row in rows {
            self.warehouses.write_record(&[
                row.warehouse_id.to_string(),
                row.node_id.to_string(),
                row.x.to_string(),
                row.y.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_vehicles(&mut self, rows: &[VehicleRow]) -> OutputResult<()> {
        for row in rows {
            self.vehicles.write_record([
                row.vehicle_id.to_string().as_str(),
                &row.licence,
                &row.vehicle_type,
                &row.brand,
                row.warehouse_id.to_string().as_str(),
            ])?;
        }
        Ok(())
    }

    fn write_deliveries(&mut self, rows: &[DeliveryRow]) -> OutputResult<()> {
        for row in rows {
            self.deliveries.write_record(&[
                row.delivery_id.to_string(),
                row.vehicle_id.to_string(),
                row.day.to_string(),
                row.date.to_string(),
                row.customers.to_string(),
                row.start_time.clone(),
                row.end_time.clone(),
                format!("{:.3}", row.length_m),
                row.trip.clone(),
                row.trajectory.clone(),
            ])?;
        }
        Ok(())
    }

    fn write_segments(&mut self, rows: &[SegmentRow]) -> OutputResult<()> {
        for row in rows {
            self.segments.write_record(&[
                row.delivery_id.to_string(),
                row.seq.to_string(),
                row.source_node.to_string(),
                row.target_node.to_string(),
                row.start_time.clone(),
                row.end_time.clone(),
                format!("{:.3}", row.length_m),
                row.trip.clone(),
                row.trajectory.clone(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.warehouses.flush()?;
        self.vehicles.flush()?;
        self.deliveries.flush()?;
        self.segments.flush()?;
        Ok(())
    }
}
