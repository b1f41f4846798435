//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! four tables: `warehouses`, `vehicles`, `deliveries` and `segments`.
//! Existing tables are dropped first, so a rerun into the same directory
//! replaces the previous output.

use std::path::Path;

use rusqlite::{params, Connection, Statement};

use crate::writer::OutputWriter;
use crate::{DeliveryRow, OutputResult, SegmentRow, VehicleRow, WarehouseRow};

const SCHEMA: &str = "
    PRAGMA journal_mode = WAL;
    PRAGMA synchronous  = NORMAL;
    DROP TABLE IF EXISTS segments;
    DROP TABLE IF EXISTS deliveries;
    DROP TABLE IF EXISTS vehicles;
    DROP TABLE IF EXISTS warehouses;
    CREATE TABLE warehouses (
        warehouse_id INTEGER PRIMARY KEY,
        node_id      INTEGER NOT NULL,
        x            REAL    NOT NULL,
        y            REAL    NOT NULL
    );
    CREATE TABLE vehicles (
        vehicle_id   INTEGER PRIMARY KEY,
        licence      TEXT    NOT NULL,
        vehicle_type TEXT    NOT NULL,
        brand        TEXT    NOT NULL,
        warehouse_id INTEGER NOT NULL REFERENCES warehouses (warehouse_id)
    );
    CREATE TABLE deliveries (
        delivery_id INTEGER PRIMARY KEY,
        vehicle_id  INTEGER NOT NULL REFERENCES vehicles (vehicle_id),
        day         INTEGER NOT NULL,
        date        TEXT    NOT NULL,
        customers   INTEGER NOT NULL,
        start_time  TEXT    NOT NULL,
        end_time    TEXT    NOT NULL,
        length_m    REAL    NOT NULL,
        trip        TEXT    NOT NULL,
        trajectory  TEXT    NOT NULL
    );
    CREATE TABLE segments (
        delivery_id INTEGER NOT NULL REFERENCES deliveries (delivery_id),
        seq         INTEGER NOT NULL,
        source_node INTEGER NOT NULL,
        target_node INTEGER NOT NULL,
        start_time  TEXT    NOT NULL,
        end_time    TEXT    NOT NULL,
        length_m    REAL    NOT NULL,
        trip        TEXT    NOT NULL,
        trajectory  TEXT    NOT NULL,
        PRIMARY KEY (delivery_id, seq)
    );";

/// Writes generator output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn, finished: false })
    }

    /// Insert `rows` in one transaction.
    fn insert<T>(
        &self,
        sql:  &str,
        rows: &[T],
        mut bind: impl FnMut(&mut Statement<'_>, &T) -> rusqlite::Result<usize>,
    ) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(sql)?;
            for row in rows {
                bind(&mut stmt, row)?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

impl OutputWriter for SqliteWriter {
    fn write_warehouses(&mut self, rows: &[WarehouseRow]) -> OutputResult<()> {
        self.insert(
            "INSERT INTO warehouses (warehouse_id, node_id, x, y) VALUES (?1, ?2, ?3, ?4)",
            rows,
            |stmt, r| stmt.execute(params![r.warehouse_id, r.node_id, r.x, r.y]),
        )
    }

    fn write_vehicles(&mut self, rows: &[VehicleRow]) -> OutputResult<()> {
        self.insert(
            "INSERT INTO vehicles (vehicle_id, licence, vehicle_type, brand, warehouse_id) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rows,
            |stmt, r| {
                stmt.execute(params![r.vehicle_id, r.licence, r.vehicle_type, r.brand, r.warehouse_id])
            },
        )
    }

    fn write_deliveries(&mut self, rows: &[DeliveryRow]) -> OutputResult<()> {
        self.insert(
            "INSERT INTO deliveries \
             (delivery_id, vehicle_id, day, date, customers, start_time, end_time, length_m, trip, trajectory) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rows,
            |stmt, r| {
                stmt.execute(params![
                    r.delivery_id,
                    r.vehicle_id,
                    r.day,
                    r.date.to_string(),
                    r.customers,
                    r.start_time,
                    r.end_time,
                    r.length_m,
                    r.trip,
                    r.trajectory,
                ])
            },
        )
    }

    fn write_segments(&mut self, rows: &[SegmentRow]) -> OutputResult<()> {
        self.insert(
            "INSERT INTO segments \
             (delivery_id, seq, source_node, target_node, start_time, end_time, length_m, trip, trajectory) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rows,
            |stmt, r| {
                stmt.execute(params![
                    r.delivery_id,
                    r.seq,
                    r.source_node,
                    r.target_node,
                    r.start_time,
                    r.end_time,
                    r.length_m,
                    r.trip,
                    r.trajectory,
                ])
            },
        )
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
