//! `dl-output` — output writers for generated delivery data.
//!
//! Three backends are provided behind Cargo features:
//!
//! | Feature   | Backend | Files created                                                        |
//! |-----------|---------|----------------------------------------------------------------------|
//! | *(none)*  | CSV     | `warehouses.csv`, `vehicles.csv`, `deliveries.csv`, `segments.csv`   |
//! | `sqlite`  | SQLite  | `output.db`                                                          |
//! | `parquet` | Parquet | `warehouses.parquet`, `vehicles.parquet`, `deliveries.parquet`, `segments.parquet` |
//!
//! All backends implement [`OutputWriter`] and are driven by
//! [`OutputObserver`], which implements `dl_generator::GeneratorObserver`.
//! Trips are written in MobilityDB text form, projected geometries as WKT.
//!
//! # Usage
//!
//! ```rust,ignore
//! use dl_output::{CsvWriter, OutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = OutputObserver::new(writer, &generator.network);
//! generator.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::{OutputObserver, DEFAULT_FLUSH_EVERY};
pub use row::{DeliveryRow, SegmentRow, VehicleRow, WarehouseRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;

#[cfg(feature = "parquet")]
pub use parquet::ParquetWriter;
