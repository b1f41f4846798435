//! Parquet output backend (feature `parquet`).
//!
//! Creates four files in the configured output directory:
//! - `warehouses.parquet`
//! - `vehicles.parquet`
//! - `deliveries.parquet`
//! - `segments.parquet`
//!
//! Each `write_*` call becomes one record batch.  Dates are stored as
//! `Date32`; timestamps, trips and geometries as UTF-8 text.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{
    ArrayRef, Date32Builder, Float64Builder, Int64Builder, StringBuilder, UInt32Builder,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::error::create_file;
use crate::writer::OutputWriter;
use crate::{DeliveryRow, OutputResult, SegmentRow, VehicleRow, WarehouseRow};

/// `num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn date32(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

// ── Schemas ───────────────────────────────────────────────────────────────────

fn warehouse_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("warehouse_id", DataType::UInt32,  false),
        Field::new("node_id",      DataType::Int64,   false),
        Field::new("x",            DataType::Float64, false),
        Field::new("y",            DataType::Float64, false),
    ]))
}

fn vehicle_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("vehicle_id",   DataType::UInt32, false),
        Field::new("licence",      DataType::Utf8,   false),
        Field::new("vehicle_type", DataType::Utf8,   false),
        Field::new("brand",        DataType::Utf8,   false),
        Field::new("warehouse_id", DataType::UInt32, false),
    ]))
}

fn delivery_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("delivery_id", DataType::UInt32,  false),
        Field::new("vehicle_id",  DataType::UInt32,  false),
        Field::new("day",         DataType::UInt32,  false),
        Field::new("date",        DataType::Date32,  false),
        Field::new("customers",   DataType::UInt32,  false),
        Field::new("start_time",  DataType::Utf8,    false),
        Field::new("end_time",    DataType::Utf8,    false),
        Field::new("length_m",    DataType::Float64, false),
        Field::new("trip",        DataType::Utf8,    false),
        Field::new("trajectory",  DataType::Utf8,    false),
    ]))
}

fn segment_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("delivery_id", DataType::UInt32,  false),
        Field::new("seq",         DataType::UInt32,  false),
        Field::new("source_node", DataType::Int64,   false),
        Field::new("target_node", DataType::Int64,   false),
        Field::new("start_time",  DataType::Utf8,    false),
        Field::new("end_time",    DataType::Utf8,    false),
        Field::new("length_m",    DataType::Float64, false),
        Field::new("trip",        DataType::Utf8,    false),
        Field::new("trajectory",  DataType::Utf8,    false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

// ── Table ─────────────────────────────────────────────────────────────────────

/// One open Parquet file and its schema.  The writer is `None` once closed.
struct Table {
    writer: Option<ArrowWriter<File>>,
    schema: Arc<Schema>,
}

impl Table {
    fn create(path: PathBuf, schema: Arc<Schema>) -> OutputResult<Self> {
        let file = create_file(path)?;
        let writer = ArrowWriter::try_new(file, Arc::clone(&schema), Some(snappy_props()))?;
        Ok(Self { writer: Some(writer), schema })
    }

    fn write(&mut self, columns: Vec<ArrayRef>) -> OutputResult<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        let batch = RecordBatch::try_new(Arc::clone(&self.schema), columns)?;
        writer.write(&batch)?;
        Ok(())
    }

    fn close(&mut self) -> OutputResult<()> {
        if let Some(w) = self.writer.take() {
            w.close()?;
        }
        Ok(())
    }
}

// ── ParquetWriter ─────────────────────────────────────────────────────────────

/// Writes generator output to four Parquet files.
///
/// `finish()` **must** be called to write the Parquet file footers; files
/// written without calling `finish()` cannot be opened by Parquet readers.
pub struct ParquetWriter {
    warehouses: Table,
    vehicles:   Table,
    deliveries: Table,
    segments:   Table,
}

impl ParquetWriter {
    /// Create the four Parquet files in `dir`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        Ok(Self {
            warehouses: Table::create(dir.join("warehouses.parquet"), warehouse_schema())?,
            vehicles:   Table::create(dir.join("vehicles.parquet"), vehicle_schema())?,
            deliveries: Table::create(dir.join("deliveries.parquet"), delivery_schema())?,
            segments:   Table::create(dir.join("segments.parquet"), segment_schema())?,
        })
    }
}

impl OutputWriter for ParquetWriter {
    fn write_warehouses(&mut self, rows: &[WarehouseRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut ids   = UInt32Builder::new();
        let mut nodes = Int64Builder::new();
        let mut xs    = Float64Builder::new();
        let mut ys    = Float64Builder::new();
        for row in rows {
            ids.append_value(row.warehouse_id);
            nodes.append_value(row.node_id);
            xs.append_value(row.x);
            ys.append_value(row.y);
        }
        self.warehouses.write(vec![
            Arc::new(ids.finish()),
            Arc::new(nodes.finish()),
            Arc::new(xs.finish()),
            Arc::new(ys.finish()),
        ])
    }

    fn write_vehicles(&mut self, rows: &[VehicleRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut ids        = UInt32Builder::new();
        let mut licences   = StringBuilder::new();
        let mut types      = StringBuilder::new();
        let mut brands     = StringBuilder::new();
        let mut warehouses = UInt32Builder::new();
        for row in rows {
            ids.append_value(row.vehicle_id);
            licences.append_value(&row.licence);
            types.append_value(&row.vehicle_type);
            brands.append_value(&row.brand);
            warehouses.append_value(row.warehouse_id);
        }
        self.vehicles.write(vec![
            Arc::new(ids.finish()),
            Arc::new(licences.finish()),
            Arc::new(types.finish()),
            Arc::new(brands.finish()),
            Arc::new(warehouses.finish()),
        ])
    }

    fn write_deliveries(&mut self, rows: &[DeliveryRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut ids          = UInt32Builder::new();
        let mut vehicles     = UInt32Builder::new();
        let mut days         = UInt32Builder::new();
        let mut dates        = Date32Builder::new();
        let mut customers    = UInt32Builder::new();
        let mut starts       = StringBuilder::new();
        let mut ends         = StringBuilder::new();
        let mut lengths      = Float64Builder::new();
        let mut trips        = StringBuilder::new();
        let mut trajectories = StringBuilder::new();
        for row in rows {
            ids.append_value(row.delivery_id);
            vehicles.append_value(row.vehicle_id);
            days.append_value(row.day);
            dates.append_value(date32(row.date));
            customers.append_value(row.customers);
            starts.append_value(&row.start_time);
            ends.append_value(&row.end_time);
            lengths.append_value(row.length_m);
            trips.append_value(&row.trip);
            trajectories.append_value(&row.trajectory);
        }
        self.deliveries.write(vec![
            Arc::new(ids.finish()),
            Arc::new(vehicles.finish()),
            Arc::new(days.finish()),
            Arc::new(dates.finish()),
            Arc::new(customers.finish()),
            Arc::new(starts.finish()),
            Arc::new(ends.finish()),
            Arc::new(lengths.finish()),
            Arc::new(trips.finish()),
            Arc::new(trajectories.finish()),
        ])
    }

    fn write_segments(&mut self, rows: &[SegmentRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut deliveries   = UInt32Builder::new();
        let mut seqs         = UInt32Builder::new();
        let mut sources      = Int64Builder::new();
        let mut targets      = Int64Builder::new();
        let mut starts       = StringBuilder::new();
        let mut ends         = StringBuilder::new();
        let mut lengths      = Float64Builder::new();
        let mut trips        = StringBuilder::new();
        let mut trajectories = StringBuilder::new();
        for row in rows {
            deliveries.append_value(row.delivery_id);
            seqs.append_value(row.seq);
            sources.append_value(row.source_node);
            targets.append_value(row.target_node);
            starts.append_value(&row.start_time);
            ends.append_value(&row.end_time);
            lengths.append_value(row.length_m);
            trips.append_value(&row.trip);
            trajectories.append_value(&row.trajectory);
        }
        self.segments.write(vec![
            Arc::new(deliveries.finish()),
            Arc::new(seqs.finish()),
            Arc::new(sources.finish()),
            Arc::new(targets.finish()),
            Arc::new(starts.finish()),
            Arc::new(ends.finish()),
            Arc::new(lengths.finish()),
            Arc::new(trips.finish()),
            Arc::new(trajectories.finish()),
        ])
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.warehouses.close()?;
        self.vehicles.close()?;
        self.deliveries.close()?;
        self.segments.close()?;
        Ok(())
    }
}
