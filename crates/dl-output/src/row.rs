//! Flat row types shared by all output backends.
//!
//! Node ids are written as the external ids from the network files, not the
//! dense internal indices, so output rows join back onto the input data.

use chrono::NaiveDate;

use dl_core::time::format_timestamp;
use dl_generator::{DeliveryRecord, SegmentRecord, Vehicle, Warehouse};
use dl_spatial::RoadNetwork;

// ── Column names ──────────────────────────────────────────────────────────────

pub const WAREHOUSE_COLUMNS: [&str; 4] = ["warehouse_id", "node_id", "x", "y"];

pub const VEHICLE_COLUMNS: [&str; 5] =
    ["vehicle_id", "licence", "vehicle_type", "brand", "warehouse_id"];

pub const DELIVERY_COLUMNS: [&str; 10] = [
    "delivery_id", "vehicle_id", "day", "date", "customers",
    "start_time", "end_time", "length_m", "trip", "trajectory",
];

pub const SEGMENT_COLUMNS: [&str; 9] = [
    "delivery_id", "seq", "source_node", "target_node",
    "start_time", "end_time", "length_m", "trip", "trajectory",
];

// ── Rows ──────────────────────────────────────────────────────────────────────

/// One warehouse.
#[derive(Clone, Debug, PartialEq)]
pub struct WarehouseRow {
    pub warehouse_id: u32,
    /// External id of the warehouse node.
    pub node_id:      i64,
    pub x:            f64,
    pub y:            f64,
}

impl WarehouseRow {
    pub fn new(warehouse: &Warehouse, network: &RoadNetwork) -> Self {
        Self {
            warehouse_id: warehouse.id.0,
            node_id:      network.node_ext_id[warehouse.node.index()],
            x:            warehouse.position.x,
            y:            warehouse.position.y,
        }
    }
}

/// One vehicle.
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleRow {
    pub vehicle_id:   u32,
    pub licence:      String,
    pub vehicle_type: String,
    pub brand:        String,
    pub warehouse_id: u32,
}

impl From<&Vehicle> for VehicleRow {
    fn from(v: &Vehicle) -> Self {
        Self {
            vehicle_id:   v.id.0,
            licence:      v.licence.clone(),
            vehicle_type: v.vehicle_type.to_owned(),
            brand:        v.brand.to_owned(),
            warehouse_id: v.warehouse.0,
        }
    }
}

/// One completed vehicle-day.
#[derive(Clone, Debug, PartialEq)]
pub struct DeliveryRow {
    pub delivery_id: u32,
    pub vehicle_id:  u32,
    /// 0-based day index within the run.
    pub day:         u32,
    pub date:        NaiveDate,
    pub customers:   u32,
    /// `YYYY-MM-DD HH:MM:SS.fff`
    pub start_time:  String,
    pub end_time:    String,
    /// Length of the projected geometry in metres.
    pub length_m:    f64,
    /// MobilityDB `tgeompoint` text.
    pub trip:        String,
    /// WKT `LINESTRING`.
    pub trajectory:  String,
}

impl From<&DeliveryRecord> for DeliveryRow {
    fn from(d: &DeliveryRecord) -> Self {
        Self {
            delivery_id: d.id.0,
            vehicle_id:  d.vehicle.0,
            day:         d.day,
            date:        d.date,
            customers:   d.customers,
            start_time:  format_timestamp(d.trajectory.start_time()),
            end_time:    format_timestamp(d.trajectory.end_time()),
            length_m:    d.trajectory.length(),
            trip:        d.trajectory.to_string(),
            trajectory:  d.trajectory.trace().to_string(),
        }
    }
}

/// One leg of a delivery.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentRow {
    pub delivery_id: u32,
    pub seq:         u32,
    /// External id of the source node.
    pub source_node: i64,
    pub target_node: i64,
    pub start_time:  String,
    pub end_time:    String,
    pub length_m:    f64,
    pub trip:        String,
    pub trajectory:  String,
}

impl SegmentRow {
    pub fn new(segment: &SegmentRecord, network: &RoadNetwork) -> Self {
        let t = &segment.trajectory;
        Self {
            delivery_id: segment.delivery.0,
            seq:         segment.seq,
            source_node: network.node_ext_id[segment.source.index()],
            target_node: network.node_ext_id[segment.target.index()],
            start_time:  format_timestamp(t.start_time()),
            end_time:    format_timestamp(t.end_time()),
            length_m:    t.length(),
            trip:        t.to_string(),
            trajectory:  t.trace().to_string(),
        }
    }
}
