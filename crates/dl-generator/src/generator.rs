//! The `Generator` struct and its phase loop.

use std::fmt;

use chrono::NaiveDate;
use tracing::info;

use dl_core::time::is_working_day;
use dl_core::{DeliveryId, GeneratorConfig, NodeId, Stream, StreamRng, VehicleId};
use dl_spatial::{RoadNetwork, Router};
use dl_trajectory::TrajectoryBuilder;

use crate::assembler::PathTable;
use crate::compiler::route_pairs;
use crate::fleet::Fleet;
use crate::planner::{plan_stops, PairRegistry, RoutePlan};
use crate::records::{DeliveryOutcome, DropReason};
use crate::synthesizer::DeliverySynthesizer;
use crate::{CancelToken, GenError, GenResult, GeneratorObserver};

/// Plans synthesized per parallel chunk; bounds the number of finished
/// deliveries held before they are handed to the observer.
#[cfg(feature = "parallel")]
const PARALLEL_CHUNK: usize = 1_024;

/// A working vehicle-day awaiting its plan: vehicle, home node, day, date.
type Slot = (VehicleId, NodeId, u32, NaiveDate);

// ── RunSummary ────────────────────────────────────────────────────────────────

/// Counts reported at the end of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub warehouses:            usize,
    pub vehicles:              usize,
    /// Working vehicle-days that received a plan.
    pub planned_routes:        usize,
    /// Vehicle-days falling on the non-working weekday.
    pub non_working_slots:     usize,
    pub distinct_pairs:        usize,
    /// Distinct pairs the router found a path for.
    pub routed_pairs:          usize,
    pub deliveries:            usize,
    pub segments:              usize,
    pub dropped_no_path:       usize,
    pub dropped_no_trajectory: usize,
}

impl RunSummary {
    pub fn dropped(&self) -> usize {
        self.dropped_no_path + self.dropped_no_trajectory
    }

    /// Count one synthesis outcome.  Non-working days are counted while
    /// planning, so `NoDelivery` is ignored here.
    pub fn record(&mut self, outcome: &DeliveryOutcome) {
        match outcome {
            DeliveryOutcome::Delivered(d) => {
                self.deliveries += 1;
                self.segments += d.segments.len();
            }
            DeliveryOutcome::Dropped { reason: DropReason::NoPath { .. }, .. } => {
                self.dropped_no_path += 1;
            }
            DeliveryOutcome::Dropped { reason: DropReason::NoTrajectory { .. }, .. } => {
                self.dropped_no_trajectory += 1;
            }
            DeliveryOutcome::NoDelivery => {}
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "warehouses:          {}", self.warehouses)?;
        writeln!(f, "vehicles:            {}", self.vehicles)?;
        writeln!(f, "planned routes:      {}", self.planned_routes)?;
        writeln!(f, "non-working slots:   {}", self.non_working_slots)?;
        writeln!(f, "routed pairs:        {}/{}", self.routed_pairs, self.distinct_pairs)?;
        writeln!(f, "deliveries:          {}", self.deliveries)?;
        writeln!(f, "segments:            {}", self.segments)?;
        write!(
            f,
            "dropped deliveries:  {} (no path {}, no trajectory {})",
            self.dropped(),
            self.dropped_no_path,
            self.dropped_no_trajectory
        )
    }
}

// ── Generator ─────────────────────────────────────────────────────────────────

/// The delivery generator.
///
/// `Generator<R, B>` owns the configuration, the road network and the two
/// pluggable engines, and runs the phases in order:
///
/// 1. **Fleet**: place warehouses and create vehicles.
/// 2. **Plan** (optionally parallel with the `parallel` feature): one route
///    plan per working vehicle-day; collect distinct pairs.
/// 3. **Route**: send the pairs to `R` in batches and assemble the paths.
/// 4. **Synthesize** (optionally parallel): one delivery per plan, reported
///    to the observer in delivery-id order.
///
/// Create via [`GeneratorBuilder`][crate::GeneratorBuilder].
pub struct Generator<R: Router, B: TrajectoryBuilder> {
    pub config:  GeneratorConfig,
    /// Strongly-connected road network; read-only during the run.
    pub network: RoadNetwork,
    pub router:  R,
    pub builder: B,
    pub cancel:  CancelToken,
}

impl<R: Router, B: TrajectoryBuilder> Generator<R, B> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run every phase and return the counts.
    pub fn run<O: GeneratorObserver>(&self, observer: &mut O) -> GenResult<RunSummary> {
        let mut summary = RunSummary::default();

        let fleet = Fleet::create(&self.network, &self.config)?;
        summary.warehouses = fleet.warehouses.len();
        summary.vehicles = fleet.vehicles.len();
        info!(warehouses = summary.warehouses, vehicles = summary.vehicles, "fleet created");
        observer.on_fleet(&fleet);

        let (plans, non_working) = self.plan(&fleet)?;
        let mut registry = PairRegistry::new();
        for plan in &plans {
            registry.register(plan);
        }
        summary.planned_routes = plans.len();
        summary.non_working_slots = non_working;
        summary.distinct_pairs = registry.len();
        info!(
            routes = plans.len(),
            non_working,
            pairs = registry.len(),
            "routes planned"
        );
        observer.on_plans(&plans, registry.len());

        let paths = route_pairs(
            &self.router,
            &self.network,
            registry.pairs(),
            self.config.route_mode,
            self.config.batch_size,
            &self.cancel,
            |i, total, rows| observer.on_batch(i, total, rows),
        )?;
        summary.routed_pairs = paths.len();

        self.synthesize(&plans, &paths, &mut summary, observer)?;
        info!(
            deliveries = summary.deliveries,
            segments = summary.segments,
            dropped = summary.dropped(),
            "deliveries synthesized"
        );
        observer.on_run_end(&summary);
        Ok(summary)
    }

    /// Plan every working vehicle-day.
    ///
    /// Returns the plans in delivery-id order (vehicle-major, then day) and
    /// the number of non-working vehicle-days skipped.
    pub fn plan(&self, fleet: &Fleet) -> GenResult<(Vec<RoutePlan>, usize)> {
        let calendar = self.config.calendar();
        let mut slots: Vec<Slot> = Vec::new();
        let mut non_working = 0usize;
        for vehicle in &fleet.vehicles {
            let home = fleet.home_node(vehicle).ok_or_else(|| {
                GenError::Invariant(format!("{} has no warehouse", vehicle.id))
            })?;
            for (day, date) in calendar.iter() {
                if is_working_day(date) {
                    slots.push((vehicle.id, home, day, date));
                } else {
                    non_working += 1;
                }
            }
        }

        let node_count = self.network.node_count();
        let seed = self.config.seed;
        let retries = self.config.max_destination_retries;
        let plan_one = |index: usize, &(vehicle, home, day, date): &Slot| -> GenResult<RoutePlan> {
            let mut rng = StreamRng::new(seed, Stream::Planning { vehicle, day });
            let stops = plan_stops(node_count, home, vehicle, day, retries, &mut rng)?;
            Ok(RoutePlan {
                delivery: DeliveryId(index as u32 + 1),
                vehicle,
                day,
                date,
                stops,
            })
        };

        #[cfg(not(feature = "parallel"))]
        let plans = slots
            .iter()
            .enumerate()
            .map(|(i, slot)| plan_one(i, slot))
            .collect::<GenResult<Vec<_>>>()?;

        #[cfg(feature = "parallel")]
        let plans = {
            use rayon::prelude::*;
            slots
                .par_iter()
                .enumerate()
                .map(|(i, slot)| plan_one(i, slot))
                .collect::<GenResult<Vec<_>>>()?
        };

        Ok((plans, non_working))
    }

    // ── Synthesis ─────────────────────────────────────────────────────────

    fn synthesize<O: GeneratorObserver>(
        &self,
        plans:    &[RoutePlan],
        paths:    &PathTable,
        summary:  &mut RunSummary,
        observer: &mut O,
    ) -> GenResult<()> {
        let synth = DeliverySynthesizer::new(&self.network, paths, &self.builder, self.config.disturb);
        let seed = self.config.seed;
        let cancel = &self.cancel;
        let one = |plan: &RoutePlan| -> GenResult<DeliveryOutcome> {
            cancel.check()?;
            let mut rng = StreamRng::new(seed, Stream::Synthesis { vehicle: plan.vehicle, day: plan.day });
            synth.synthesize(plan, &mut rng)
        };

        #[cfg(not(feature = "parallel"))]
        for plan in plans {
            let outcome = one(plan)?;
            emit(&outcome, summary, observer);
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            for chunk in plans.chunks(PARALLEL_CHUNK) {
                let outcomes = chunk
                    .par_iter()
                    .map(|plan| one(plan))
                    .collect::<GenResult<Vec<_>>>()?;
                for outcome in &outcomes {
                    emit(outcome, summary, observer);
                }
            }
        }

        Ok(())
    }
}

/// Report one outcome to the summary and the observer.
fn emit<O: GeneratorObserver>(outcome: &DeliveryOutcome, summary: &mut RunSummary, observer: &mut O) {
    summary.record(outcome);
    match outcome {
        DeliveryOutcome::Delivered(d) => observer.on_delivery(d),
        DeliveryOutcome::Dropped { id, reason, .. } => observer.on_dropped(*id, reason),
        DeliveryOutcome::NoDelivery => {}
    }
}
