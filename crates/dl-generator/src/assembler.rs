//! Path assembly: raw router rows → oriented path steps.
//!
//! The router reports a path as one [`PathRow`] per visited node, each
//! naming the edge taken out of that node; the final row (edge `None`) only
//! marks arrival and is skipped.  Edge geometry is stored from the edge's
//! source to its target, so a two-way edge travelled backwards has its
//! geometry reversed here.
//!
//! Step endpoints are pinned to the node positions, so consecutive steps
//! (and consecutive segments of a delivery) meet exactly.

use rustc_hash::FxHashMap;

use dl_core::{EdgeId, NodeId};
use dl_spatial::{PathRow, PathStep, RoadNetwork};

use crate::{GenError, GenResult};

// ── PathTable ─────────────────────────────────────────────────────────────────

/// Oriented steps for every routed `(source, target)` pair.
///
/// Pairs the router found no path for are simply absent.
#[derive(Clone, Debug, Default)]
pub struct PathTable {
    paths: FxHashMap<(NodeId, NodeId), Vec<PathStep>>,
}

impl PathTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, source: NodeId, target: NodeId) -> Option<&[PathStep]> {
        self.paths.get(&(source, target)).map(Vec::as_slice)
    }

    pub fn contains(&self, source: NodeId, target: NodeId) -> bool {
        self.paths.contains_key(&(source, target))
    }

    pub fn insert(&mut self, source: NodeId, target: NodeId, steps: Vec<PathStep>) {
        self.paths.insert((source, target), steps);
    }

    pub fn remove(&mut self, source: NodeId, target: NodeId) -> Option<Vec<PathStep>> {
        self.paths.remove(&(source, target))
    }

    /// Number of pairs with a path.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

// ── Assembly ──────────────────────────────────────────────────────────────────

/// Assemble one batch of rows into `table`.
///
/// Rows of one pair must be contiguous and in `seq` order, as
/// [`Router::route_batch`](dl_spatial::Router::route_batch) returns them.
pub fn assemble_into(table: &mut PathTable, network: &RoadNetwork, rows: &[PathRow]) -> GenResult<()> {
    let mut current: Option<(NodeId, NodeId)> = None;
    let mut steps: Vec<PathStep> = Vec::new();

    for row in rows {
        let key = (row.source, row.target);
        if current != Some(key) {
            if let Some((s, t)) = current.take() {
                table.insert(s, t, std::mem::take(&mut steps));
            }
            current = Some(key);
        }
        if let Some(edge) = row.edge {
            steps.push(orient(network, row, edge)?);
        }
    }
    if let Some((s, t)) = current {
        table.insert(s, t, steps);
    }
    Ok(())
}

/// Assemble a full result set into a fresh table.
pub fn assemble(network: &RoadNetwork, rows: &[PathRow]) -> GenResult<PathTable> {
    let mut table = PathTable::new();
    assemble_into(&mut table, network, rows)?;
    Ok(table)
}

/// Resolve `edge` as travelled out of `row.node`.
fn orient(network: &RoadNetwork, row: &PathRow, edge: EdgeId) -> GenResult<PathStep> {
    let invalid = || GenError::InvalidPathRow {
        from: row.source,
        to:   row.target,
        seq:  row.seq,
        node: row.node,
        edge,
    };
    if edge.index() >= network.edge_count() {
        return Err(invalid());
    }
    let e = edge.index();
    let (from, to) = (network.edge_source[e], network.edge_target[e]);

    let mut geometry = if from == row.node {
        network.edge_geometry[e].clone()
    } else if to == row.node && !network.edge_oneway[e] {
        network.edge_geometry[e].reversed()
    } else {
        return Err(invalid());
    };

    let exit = if from == row.node { to } else { from };
    if let Some(first) = geometry.0.first_mut() {
        *first = network.node_pos[row.node.index()];
    }
    if let Some(last) = geometry.0.last_mut() {
        *last = network.node_pos[exit.index()];
    }

    Ok(PathStep {
        edge,
        geometry,
        speed_kmh: network.edge_speed_kmh[e],
        category:  network.edge_category[e],
    })
}
