//! Generated delivery and segment records.

use std::fmt;

use chrono::NaiveDate;

use dl_core::{DeliveryId, NodeId, VehicleId};
use dl_trajectory::Trajectory;

/// One leg of a delivery, between two consecutive stops.
///
/// The trajectory includes the dwell at `target` when `target` is a
/// customer; the final leg back to the warehouse ends on arrival.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentRecord {
    pub delivery:   DeliveryId,
    /// 1-based position within the delivery.
    pub seq:        u32,
    pub source:     NodeId,
    pub target:     NodeId,
    pub trajectory: Trajectory,
}

/// A completed vehicle-day.
#[derive(Clone, Debug, PartialEq)]
pub struct DeliveryRecord {
    pub id:         DeliveryId,
    pub vehicle:    VehicleId,
    pub day:        u32,
    pub date:       NaiveDate,
    /// Customers visited; always `segments.len() - 1`.
    pub customers:  u32,
    /// All segments merged in order.
    pub trajectory: Trajectory,
    pub segments:   Vec<SegmentRecord>,
}

/// Why a planned delivery produced no output.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// The router found no path for one of the legs.
    NoPath { source: NodeId, target: NodeId },
    /// A leg's path could not be turned into a trajectory.
    NoTrajectory { source: NodeId, target: NodeId },
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::NoPath { source, target } => {
                write!(f, "no path from {source} to {target}")
            }
            DropReason::NoTrajectory { source, target } => {
                write!(f, "no trajectory from {source} to {target}")
            }
        }
    }
}

/// Result of synthesizing one vehicle-day.
#[derive(Clone, Debug, PartialEq)]
pub enum DeliveryOutcome {
    Delivered(DeliveryRecord),
    /// The delivery was abandoned; none of its segments are kept.
    Dropped {
        id:      DeliveryId,
        vehicle: VehicleId,
        day:     u32,
        reason:  DropReason,
    },
    /// The day is not a working day.
    NoDelivery,
}
