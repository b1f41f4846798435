//! Generator observer trait for progress reporting and data collection.

use dl_core::DeliveryId;

use crate::fleet::Fleet;
use crate::generator::RunSummary;
use crate::planner::RoutePlan;
use crate::records::{DeliveryRecord, DropReason};

/// Callbacks invoked by [`Generator::run`][crate::Generator::run] as the
/// phases progress.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.  Deliveries and drops are reported in
/// delivery-id order, also when synthesis runs in parallel.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct Progress;
///
/// impl GeneratorObserver for Progress {
///     fn on_batch(&mut self, index: usize, total: usize, _rows: usize) {
///         println!("routed batch {}/{total}", index + 1);
///     }
/// }
/// ```
pub trait GeneratorObserver {
    /// Called once the fleet exists, before any planning.
    fn on_fleet(&mut self, _fleet: &Fleet) {}

    /// Called after planning with every plan and the number of distinct
    /// pairs to route.
    fn on_plans(&mut self, _plans: &[RoutePlan], _pairs: usize) {}

    /// Called after each routing batch has been assembled.
    fn on_batch(&mut self, _index: usize, _total: usize, _rows: usize) {}

    /// Called for every completed delivery.
    fn on_delivery(&mut self, _delivery: &DeliveryRecord) {}

    /// Called for every planned delivery that was abandoned.
    fn on_dropped(&mut self, _id: DeliveryId, _reason: &DropReason) {}

    /// Called once after the last delivery.
    fn on_run_end(&mut self, _summary: &RunSummary) {}
}

/// A [`GeneratorObserver`] that does nothing.
pub struct NoopObserver;

impl GeneratorObserver for NoopObserver {}
