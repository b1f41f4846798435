//! Destination planning.
//!
//! Every working vehicle-day gets a route plan: a closed tour that leaves
//! the vehicle's warehouse, visits 3–7 distinct customer nodes and returns.
//!
//! ```text
//! [warehouse, d1, d2, …, dN, warehouse]      N ∈ [MIN_STOPS, MAX_STOPS]
//! ```
//!
//! Destinations are drawn uniformly from all network nodes and redrawn while
//! they collide with a stop already in the plan (warehouse included).  The
//! consecutive `(source, target)` pairs of all plans feed the
//! [`PairRegistry`], which the routing phase consumes.

use chrono::NaiveDate;
use rustc_hash::FxHashSet;

use dl_core::{DeliveryId, NodeId, StreamRng, VehicleId};

use crate::{GenError, GenResult};

/// Fewest customers visited on one delivery.
pub const MIN_STOPS: u32 = 3;
/// Most customers visited on one delivery.
pub const MAX_STOPS: u32 = 7;

// ── RoutePlan ─────────────────────────────────────────────────────────────────

/// Ordered stops of one vehicle on one working day.
#[derive(Clone, Debug, PartialEq)]
pub struct RoutePlan {
    /// Id the resulting delivery will carry.
    pub delivery: DeliveryId,
    pub vehicle:  VehicleId,
    /// Day index within the run.
    pub day:      u32,
    pub date:     NaiveDate,
    /// Warehouse, customers, warehouse.
    pub stops:    Vec<NodeId>,
}

impl RoutePlan {
    /// Number of customers (stops minus the warehouse at both ends).
    pub fn customers(&self) -> u32 {
        self.stops.len().saturating_sub(2) as u32
    }

    /// Consecutive `(source, target)` legs, in travel order.
    pub fn legs(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.stops.windows(2).map(|w| (w[0], w[1]))
    }
}

/// Draw the stop sequence for one vehicle-day.
///
/// `node_count` is the size of the network; `warehouse` must be one of its
/// nodes.  Fails with [`GenError::DestinationExhausted`] if the network is
/// too small for the drawn customer count or if a destination needs more
/// than `max_retries` redraws.
pub fn plan_stops(
    node_count:  usize,
    warehouse:   NodeId,
    vehicle:     VehicleId,
    day:         u32,
    max_retries: u32,
    rng:         &mut StreamRng,
) -> GenResult<Vec<NodeId>> {
    let customers = rng.uniform_int(MIN_STOPS, MAX_STOPS);
    if node_count < customers as usize + 1 {
        return Err(GenError::DestinationExhausted { vehicle, day, retries: 0 });
    }
    let max_node = node_count as u32 - 1;

    let mut stops: Vec<NodeId> = Vec::with_capacity(customers as usize + 2);
    stops.push(warehouse);
    for _ in 0..customers {
        let mut node = NodeId(rng.uniform_int(0, max_node));
        let mut redraws = 0;
        while stops.contains(&node) {
            if redraws == max_retries {
                return Err(GenError::DestinationExhausted { vehicle, day, retries: max_retries });
            }
            node = NodeId(rng.uniform_int(0, max_node));
            redraws += 1;
        }
        stops.push(node);
    }
    stops.push(warehouse);
    Ok(stops)
}

// ── PairRegistry ──────────────────────────────────────────────────────────────

/// Distinct `(source, target)` pairs across all plans, in first-seen order.
#[derive(Clone, Debug, Default)]
pub struct PairRegistry {
    pairs: Vec<(NodeId, NodeId)>,
    seen:  FxHashSet<(NodeId, NodeId)>,
}

impl PairRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one pair; returns `true` if it was new.
    pub fn insert(&mut self, source: NodeId, target: NodeId) -> bool {
        let new = self.seen.insert((source, target));
        if new {
            self.pairs.push((source, target));
        }
        new
    }

    /// Record every leg of `plan`.
    pub fn register(&mut self, plan: &RoutePlan) {
        for (s, t) in plan.legs() {
            self.insert(s, t);
        }
    }

    pub fn pairs(&self) -> &[(NodeId, NodeId)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
