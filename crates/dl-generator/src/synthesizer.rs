//! Delivery synthesis: a route plan and its paths → one delivery trajectory.
//!
//! # Per-delivery state machine
//!
//! ```text
//! Start ──▶ Segment k ──▶ … ──▶ Segment N+1 ──▶ Finish (merge)
//!              │
//!              └── no path / no trajectory ──▶ Abort (drop the whole delivery)
//! ```
//!
//! For each leg `k` of the plan the path is looked up in the [`PathTable`]
//! and handed to the [`TrajectoryBuilder`] starting at the running clock.
//! After every leg that ends at a customer the vehicle dwells for a
//! bounded-Gaussian time in `[MIN_DWELL_MIN, MAX_DWELL_MIN]` minutes,
//! recorded as one stationary instant at the customer's position.
//!
//! Partial deliveries never escape: segments are accumulated locally and
//! only returned inside [`DeliveryOutcome::Delivered`].

use tracing::{debug, trace, warn};

use dl_core::time::{is_working_day, minutes_f64};
use dl_core::{Calendar, NodeId, StreamRng, Timestamp};
use dl_spatial::RoadNetwork;
use dl_trajectory::{Trajectory, TrajectoryBuilder};

use crate::assembler::PathTable;
use crate::planner::RoutePlan;
use crate::records::{DeliveryOutcome, DeliveryRecord, DropReason, SegmentRecord};
use crate::{GenError, GenResult};

/// Hour at which the working day starts, before the random offset.
pub const DAY_START_HOUR: u32 = 7;
/// Latest start offset after [`DAY_START_HOUR`] (minutes).
pub const MAX_START_OFFSET_MIN: f64 = 120.0;
pub const MIN_DWELL_MIN: f64 = 10.0;
pub const MAX_DWELL_MIN: f64 = 60.0;

/// Turns route plans into deliveries.
///
/// Holds only shared, read-only inputs, so one synthesizer can serve many
/// threads; all per-delivery state lives in [`synthesize`](Self::synthesize).
pub struct DeliverySynthesizer<'a, B: TrajectoryBuilder + ?Sized> {
    pub network: &'a RoadNetwork,
    pub paths:   &'a PathTable,
    pub builder: &'a B,
    pub disturb: bool,
}

impl<'a, B: TrajectoryBuilder + ?Sized> DeliverySynthesizer<'a, B> {
    pub fn new(network: &'a RoadNetwork, paths: &'a PathTable, builder: &'a B, disturb: bool) -> Self {
        Self { network, paths, builder, disturb }
    }

    /// Draw the departure time for `plan`.
    pub fn start_time(plan: &RoutePlan, rng: &mut StreamRng) -> GenResult<Timestamp> {
        let base = Calendar::at_hour(plan.date, DAY_START_HOUR).ok_or_else(|| {
            GenError::Invariant(format!("no {DAY_START_HOUR}:00 on {}", plan.date))
        })?;
        Ok(base + minutes_f64(rng.bounded_gauss(0.0, MAX_START_OFFSET_MIN)))
    }

    /// Synthesize one vehicle-day.
    ///
    /// Missing paths and unbuildable trajectories drop the delivery and are
    /// reported in the outcome; only broken invariants return `Err`.
    pub fn synthesize(&self, plan: &RoutePlan, rng: &mut StreamRng) -> GenResult<DeliveryOutcome> {
        if !is_working_day(plan.date) {
            return Ok(DeliveryOutcome::NoDelivery);
        }
        let legs = plan.stops.len().saturating_sub(1);
        if legs == 0 {
            return Err(GenError::Invariant(format!(
                "{} has a plan without legs",
                plan.delivery
            )));
        }

        for (source, target) in plan.legs() {
            self.check_leg(plan, source, target)?;
        }

        let mut clock = Self::start_time(plan, rng)?;
        let mut segments: Vec<SegmentRecord> = Vec::with_capacity(legs);

        for (i, (source, target)) in plan.legs().enumerate() {
            let seq = i as u32 + 1;

            let Some(steps) = self.paths.get(source, target) else {
                return Ok(self.abort(plan, DropReason::NoPath { source, target }));
            };
            let Some(mut trajectory) = self.builder.build(steps, clock, self.disturb, rng) else {
                return Ok(self.abort(plan, DropReason::NoTrajectory { source, target }));
            };
            clock = trajectory.end_time();

            if i + 1 < legs {
                let dwell = rng.bounded_gauss(MIN_DWELL_MIN, MAX_DWELL_MIN);
                clock += minutes_f64(dwell);
                let at = trajectory.end_point();
                trajectory.append_stationary(at, clock)?;
            }
            trace!(delivery = plan.delivery.0, seq, source = source.0, target = target.0, instants = trajectory.len(), "segment");

            segments.push(SegmentRecord {
                delivery: plan.delivery,
                seq,
                source,
                target,
                trajectory,
            });
        }

        let parts: Vec<Trajectory> = segments.iter().map(|s| s.trajectory.clone()).collect();
        let trajectory = Trajectory::merge(&parts)?;
        debug!(
            delivery = plan.delivery.0,
            vehicle = plan.vehicle.0,
            day = plan.day,
            customers = plan.customers(),
            "delivery complete"
        );

        Ok(DeliveryOutcome::Delivered(DeliveryRecord {
            id:         plan.delivery,
            vehicle:    plan.vehicle,
            day:        plan.day,
            date:       plan.date,
            customers:  plan.customers(),
            trajectory,
            segments,
        }))
    }

    fn check_leg(&self, plan: &RoutePlan, source: NodeId, target: NodeId) -> GenResult<()> {
        if source == target {
            return Err(GenError::Invariant(format!(
                "{} visits {source} twice in a row",
                plan.delivery
            )));
        }
        for node in [source, target] {
            if !self.network.contains(node) {
                return Err(GenError::Invariant(format!(
                    "{} references {node}, which is not in the network",
                    plan.delivery
                )));
            }
        }
        Ok(())
    }

    fn abort(&self, plan: &RoutePlan, reason: DropReason) -> DeliveryOutcome {
        warn!(delivery = plan.delivery.0, vehicle = plan.vehicle.0, day = plan.day, %reason, "delivery dropped");
        DeliveryOutcome::Dropped {
            id:      plan.delivery,
            vehicle: plan.vehicle,
            day:     plan.day,
            reason,
        }
    }
}
