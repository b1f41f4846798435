//! CSV road-network loader.
//!
//! # CSV format
//!
//! Two files.  Nodes:
//!
//! ```csv
//! id,x,y
//! 101,1489250.5,6894120.0
//! 102,1490120.0,6894560.5
//! ```
//!
//! Edges (geometry and speed are optional):
//!
//! ```csv
//! id,source,target,highway,speed_kmh,oneway,geometry
//! 7,101,102,primary,50,no,"LINESTRING(1489250.5 6894120,1489700 6894400,1490120 6894560.5)"
//! 8,102,101,residential,,yes,
//! ```
//!
//! | Column      | Meaning                                                    |
//! |-------------|------------------------------------------------------------|
//! | `highway`   | OSM `highway=*` value; non-drivable values drop the edge   |
//! | `speed_kmh` | empty or non-positive → category default                   |
//! | `oneway`    | `yes` / `true` / `1` → one-way; anything else two-way      |
//! | `geometry`  | WKT `LINESTRING` from source to target; empty → straight   |
//!
//! Coordinates must be in a metric projection.  Motorways and motorway
//! links are implicitly one-way, as in OSM.

use std::io::Read;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use dl_core::{LineString, NodeId, Point};

use crate::network::{EdgeSpec, RoadCategory, RoadNetwork, RoadNetworkBuilder};
use crate::SpatialError;

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRecord {
    id: i64,
    x:  f64,
    y:  f64,
}

#[derive(Deserialize)]
struct EdgeRecord {
    id:        i64,
    source:    i64,
    target:    i64,
    highway:   String,
    speed_kmh: Option<f64>,
    oneway:    Option<String>,
    geometry:  Option<String>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a road network from `nodes.csv` and `edges.csv` style files.
///
/// The result is **not** restricted to a strongly-connected component; call
/// [`RoadNetwork::restrict_to_largest_scc`] before generating deliveries.
pub fn load_network_csv(nodes: &Path, edges: &Path) -> Result<RoadNetwork, SpatialError> {
    let nodes = std::fs::File::open(nodes)?;
    let edges = std::fs::File::open(edges)?;
    load_network_readers(nodes, edges)
}

/// Like [`load_network_csv`] but accepts any `Read` sources.
///
/// Useful for testing (pass a `std::io::Cursor`).
pub fn load_network_readers<N: Read, E: Read>(nodes: N, edges: E) -> Result<RoadNetwork, SpatialError> {
    let mut builder = RoadNetworkBuilder::new();
    let mut ext_ids: FxHashMap<i64, NodeId> = FxHashMap::default();

    let mut node_reader = csv::Reader::from_reader(nodes);
    for result in node_reader.deserialize::<NodeRecord>() {
        let row = result?;
        if ext_ids.contains_key(&row.id) {
            return Err(SpatialError::DuplicateNode(row.id));
        }
        let id = builder.add_node_with_id(row.id, Point::new(row.x, row.y));
        ext_ids.insert(row.id, id);
    }

    let mut edge_reader = csv::Reader::from_reader(edges);
    for result in edge_reader.deserialize::<EdgeRecord>() {
        let row = result?;
        let Some(category) = RoadCategory::from_highway(&row.highway) else {
            continue;
        };
        let source = *ext_ids
            .get(&row.source)
            .ok_or(SpatialError::UnknownNodeRef { edge: row.id, node: row.source })?;
        let target = *ext_ids
            .get(&row.target)
            .ok_or(SpatialError::UnknownNodeRef { edge: row.id, node: row.target })?;

        let geometry = match row.geometry.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(wkt) => Some(LineString::parse_wkt(wkt).ok_or_else(|| {
                SpatialError::Parse(format!("edge {}: invalid geometry {wkt:?}", row.id))
            })?),
        };

        builder.add_edge(EdgeSpec {
            ext_id:    Some(row.id),
            source,
            target,
            category,
            speed_kmh: row.speed_kmh,
            oneway:    is_oneway(&row.highway, row.oneway.as_deref()),
            geometry,
        });
    }

    Ok(builder.build())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Motorways and motorway links are implicitly one-way in OSM convention.
fn is_oneway(highway: &str, flag: Option<&str>) -> bool {
    let explicit = matches!(
        flag.map(|f| f.trim().to_ascii_lowercase()).as_deref(),
        Some("yes" | "true" | "1")
    );
    let implicit = matches!(highway.trim(), "motorway" | "motorway_link");
    explicit || implicit
}
