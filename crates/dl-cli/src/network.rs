//! Built-in synthetic road network, used when no network files are given.
//!
//! A square grid of two-way streets.  Every fourth row and column is a
//! primary road, the outer ring is a one-way secondary loop running
//! counter-clockwise, everything else is residential.  The grid is strongly
//! connected, so the largest-SCC restriction keeps every node.

use dl_core::{NodeId, Point};
use dl_spatial::{RoadCategory, RoadNetwork, RoadNetworkBuilder};

/// Default grid side, in nodes.
pub const DEFAULT_GRID_SIZE: u32 = 20;

/// Distance between neighbouring nodes (metres).
pub const GRID_SPACING_M: f64 = 250.0;

/// Build a `size × size` grid.  Node `r * size + c` sits at
/// `(c * GRID_SPACING_M, r * GRID_SPACING_M)` and carries external id
/// `r * size + c + 1`.
pub fn synthetic_grid(size: u32) -> RoadNetwork {
    let n = size.max(2);
    let mut b = RoadNetworkBuilder::with_capacity((n * n) as usize, (2 * n * (n - 1)) as usize);

    for r in 0..n {
        for c in 0..n {
            let ext = (r * n + c + 1) as i64;
            b.add_node_with_id(ext, Point::new(c as f64 * GRID_SPACING_M, r as f64 * GRID_SPACING_M));
        }
    }

    let id = |r: u32, c: u32| NodeId(r * n + c);
    let last = n - 1;
    for r in 0..n {
        for c in 0..n {
            if c < last {
                link(&mut b, id(r, c), id(r, c + 1), r, last, true);
            }
            if r < last {
                link(&mut b, id(r, c), id(r + 1, c), c, last, false);
            }
        }
    }
    b.build()
}

/// Add the street between `a` and `b`; `line` is the row (horizontal) or
/// column (vertical) the street runs along.
fn link(builder: &mut RoadNetworkBuilder, a: NodeId, b: NodeId, line: u32, last: u32, horizontal: bool) {
    if line == 0 || line == last {
        // Counter-clockwise ring: east along the bottom, north on the right,
        // west along the top, south on the left.
        let forward = match (horizontal, line == 0) {
            (true, true)   => true,
            (true, false)  => false,
            (false, true)  => false,
            (false, false) => true,
        };
        let (from, to) = if forward { (a, b) } else { (b, a) };
        let cat = RoadCategory::Secondary;
        builder.add_oneway(from, to, cat, cat.default_speed_kmh());
    } else {
        let cat = if line % 4 == 0 { RoadCategory::Primary } else { RoadCategory::Residential };
        builder.add_road(a, b, cat, cat.default_speed_kmh());
    }
}
