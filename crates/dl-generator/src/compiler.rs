//! Routing request compilation.
//!
//! The distinct pairs collected by the planner are cut, in order, into
//! batches of at most `batch_size` pairs.  Each batch is one call to the
//! [`Router`]; its rows are assembled into the [`PathTable`] before the next
//! batch is sent, so only one batch of raw rows is alive at a time.

use tracing::{debug, info};

use dl_core::{NodeId, RouteMode};
use dl_spatial::{RoadNetwork, Router};

use crate::assembler::{assemble_into, PathTable};
use crate::{CancelToken, GenError, GenResult};

/// Split `pairs` into consecutive batches of at most `batch_size`.
///
/// Concatenating the batches gives back `pairs` unchanged.
pub fn batches(pairs: &[(NodeId, NodeId)], batch_size: usize) -> GenResult<std::slice::Chunks<'_, (NodeId, NodeId)>> {
    if batch_size == 0 {
        return Err(GenError::Invariant("batch size must be at least 1".into()));
    }
    Ok(pairs.chunks(batch_size))
}

/// Route every pair and assemble the results.
///
/// `on_batch(index, total, rows)` is called after each batch is assembled.
/// A router error aborts the whole run.
pub fn route_pairs<R: Router + ?Sized>(
    router:     &R,
    network:    &RoadNetwork,
    pairs:      &[(NodeId, NodeId)],
    mode:       RouteMode,
    batch_size: usize,
    cancel:     &CancelToken,
    mut on_batch: impl FnMut(usize, usize, usize),
) -> GenResult<PathTable> {
    let total = pairs.len().div_ceil(batch_size.max(1));
    let mut table = PathTable::new();

    for (i, batch) in batches(pairs, batch_size)?.enumerate() {
        cancel.check()?;
        let rows = router.route_batch(network, batch, mode)?;
        debug!(batch = i + 1, total, pairs = batch.len(), rows = rows.len(), "routed batch");
        assemble_into(&mut table, network, &rows)?;
        on_batch(i, total, rows.len());
    }

    info!(
        pairs = pairs.len(),
        routed = table.len(),
        unreachable = pairs.len().saturating_sub(table.len()),
        %mode,
        "routing complete"
    );
    Ok(table)
}
