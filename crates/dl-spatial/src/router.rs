//! Batch routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! The generator calls routing through the [`Router`] trait, so applications
//! can swap in an external engine (pgRouting, OSRM, contraction hierarchies)
//! without touching the pipeline.  The default [`DijkstraRouter`] is
//! sufficient for city-scale networks.
//!
//! # Result shape
//!
//! A batch returns flat [`PathRow`]s in the pgRouting many-to-many
//! convention: for each (source, target) pair, one row per visited node in
//! travel order, each carrying the edge taken *out of* that node; the final
//! row sits on the target with `edge = None`.  A pair with no path (or with
//! `source == target`) contributes no rows at all.
//!
//! # Cost units
//!
//! [`RouteMode::Fastest`] uses travel time in milliseconds at the speed
//! limit; [`RouteMode::Shortest`] uses length in millimetres.  Both are
//! accumulated as `u64`.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;

use dl_core::{EdgeId, NodeId, RouteMode};

use crate::network::RoadNetwork;
use crate::{SpatialError, SpatialResult};

// ── PathRow ───────────────────────────────────────────────────────────────────

/// One row of a batch routing result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathRow {
    /// 1-based position within this pair's path.
    pub seq:      u32,
    /// Node entered at this step.
    pub node:     NodeId,
    /// Edge taken out of `node`; `None` on the final row.
    pub edge:     Option<EdgeId>,
    pub source:   NodeId,
    pub target:   NodeId,
    /// Cost accumulated from `source` up to `node`.
    pub agg_cost: u64,
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable batch routing engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so a single router can be shared
/// by a parallel generator.
pub trait Router: Send + Sync {
    /// Compute paths for every pair in `pairs` with the given edge weighting.
    ///
    /// Rows are grouped by pair, in input order.  An `Err` means the whole
    /// batch failed and no row is trustworthy.
    fn route_batch(
        &self,
        network: &RoadNetwork,
        pairs:   &[(NodeId, NodeId)],
        mode:    RouteMode,
    ) -> SpatialResult<Vec<PathRow>>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Many-to-many Dijkstra over the CSR arc graph.
///
/// Pairs are grouped by source; one search per distinct source settles all
/// of that source's targets and stops as soon as the last one is popped.
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route_batch(
        &self,
        network: &RoadNetwork,
        pairs:   &[(NodeId, NodeId)],
        mode:    RouteMode,
    ) -> SpatialResult<Vec<PathRow>> {
        if network.is_empty() {
            return Err(SpatialError::EmptyNetwork);
        }
        for &(s, t) in pairs {
            if !network.contains(s) {
                return Err(SpatialError::NodeNotFound(s));
            }
            if !network.contains(t) {
                return Err(SpatialError::NodeNotFound(t));
            }
        }

        // Distinct sources in first-seen order, each with its targets.
        let mut by_source: Vec<(NodeId, Vec<NodeId>)> = Vec::new();
        let mut slot: FxHashMap<NodeId, usize> = FxHashMap::default();
        for &(s, t) in pairs {
            let i = *slot.entry(s).or_insert_with(|| {
                by_source.push((s, Vec::new()));
                by_source.len() - 1
            });
            by_source[i].1.push(t);
        }

        let mut trees: FxHashMap<NodeId, SearchTree> = FxHashMap::default();
        for (source, targets) in &by_source {
            trees.insert(*source, dijkstra(network, *source, targets, mode));
        }

        let mut rows = Vec::new();
        for &(s, t) in pairs {
            if let Some(tree) = trees.get(&s) {
                tree.append_rows(network, s, t, &mut rows);
            }
        }
        Ok(rows)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Edge cost for the given weighting.
#[inline]
fn edge_cost(network: &RoadNetwork, edge: EdgeId, mode: RouteMode) -> u64 {
    match mode {
        RouteMode::Fastest  => network.edge_travel_ms(edge).round() as u64,
        RouteMode::Shortest => (network.edge_length_m[edge.index()] * 1_000.0).round() as u64,
    }
}

/// Shortest-path tree rooted at one source.
struct SearchTree {
    dist:      Vec<u64>,
    /// Arc index that reached each node; `u32::MAX` for unreached nodes.
    prev_arc:  Vec<u32>,
    /// Node the `prev_arc` leaves from.
    prev_node: Vec<NodeId>,
}

impl SearchTree {
    /// Append the pgRouting-style rows for `source → target`, or nothing if
    /// `target` was not reached or equals `source`.
    fn append_rows(&self, network: &RoadNetwork, source: NodeId, target: NodeId, rows: &mut Vec<PathRow>) {
        if source == target || self.dist[target.index()] == u64::MAX {
            return;
        }

        // Walk back from the target collecting (node, arc) pairs.
        let mut hops: Vec<(NodeId, u32)> = Vec::new();
        let mut cur = target;
        while cur != source {
            let arc = self.prev_arc[cur.index()];
            let from = self.prev_node[cur.index()];
            hops.push((from, arc));
            cur = from;
        }
        hops.reverse();

        let mut seq = 1u32;
        for (node, arc) in hops {
            rows.push(PathRow {
                seq,
                node,
                edge: Some(network.arc_edge[arc as usize]),
                source,
                target,
                agg_cost: self.dist[node.index()],
            });
            seq += 1;
        }
        rows.push(PathRow {
            seq,
            node: target,
            edge: None,
            source,
            target,
            agg_cost: self.dist[target.index()],
        });
    }
}

fn dijkstra(network: &RoadNetwork, from: NodeId, targets: &[NodeId], mode: RouteMode) -> SearchTree {
    let n = network.node_count();
    let mut dist      = vec![u64::MAX; n];
    let mut prev_arc  = vec![u32::MAX; n];
    let mut prev_node = vec![NodeId::INVALID; n];

    let mut pending: Vec<bool> = vec![false; n];
    let mut remaining = 0usize;
    for &t in targets {
        if t != from && !pending[t.index()] {
            pending[t.index()] = true;
            remaining += 1;
        }
    }

    dist[from.index()] = 0;

    // Min-heap: (cost, node). Reverse makes BinaryHeap (max) behave as min-heap.
    // Secondary key NodeId ensures deterministic tie-breaking.
    let mut heap: BinaryHeap<Reverse<(u64, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((0, from)));

    while let Some(Reverse((cost, node))) = heap.pop() {
        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }
        if pending[node.index()] {
            pending[node.index()] = false;
            remaining -= 1;
        }
        if remaining == 0 {
            break;
        }

        let start = network.node_out_start[node.index()] as usize;
        let end   = network.node_out_start[node.index() + 1] as usize;
        for arc in start..end {
            let edge = network.arc_edge[arc];
            let neighbor = network.arc_to[arc];
            let new_cost = cost.saturating_add(edge_cost(network, edge, mode));

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_arc[neighbor.index()] = arc as u32;
                prev_node[neighbor.index()] = node;
                heap.push(Reverse((new_cost, neighbor)));
            }
        }
    }

    SearchTree { dist, prev_arc, prev_node }
}
