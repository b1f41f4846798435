//! Road network representation and builder.
//!
//! # Data layout
//!
//! Edges are stored once, in **canonical direction** (`edge_source` →
//! `edge_target`, geometry ordered the same way), indexed by `EdgeId`.  A
//! two-way edge can be travelled in both directions, so traversal runs over
//! **arcs**: each edge contributes one arc `source → target` and, unless it
//! is one-way, a second arc `target → source`.
//!
//! Arcs use **Compressed Sparse Row (CSR)** format.  Given a `NodeId n`, its
//! outgoing arcs occupy:
//!
//! ```text
//! arc_edge[ node_out_start[n] .. node_out_start[n+1] ]
//! arc_to  [ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! Iteration over a node's outgoing arcs is a contiguous memory scan — ideal
//! for Dijkstra's inner loop.
//!
//! # Connectivity
//!
//! Deliveries assume every node can reach every other node.  Call
//! [`RoadNetwork::restrict_to_largest_scc`] after loading to drop everything
//! outside the largest strongly-connected component.

use rustc_hash::FxHashMap;

use dl_core::{EdgeId, LineString, NodeId, Point};

// ── RoadCategory ──────────────────────────────────────────────────────────────

/// Functional road class, ordered from most to least important.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RoadCategory {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    #[default]
    Residential,
    Service,
}

impl RoadCategory {
    pub const ALL: [RoadCategory; 7] = [
        RoadCategory::Motorway,
        RoadCategory::Trunk,
        RoadCategory::Primary,
        RoadCategory::Secondary,
        RoadCategory::Tertiary,
        RoadCategory::Residential,
        RoadCategory::Service,
    ];

    /// Map an OSM `highway=*` value to a category, or `None` if the road is
    /// not drivable by a delivery vehicle.
    ///
    /// Unknown values map to `Residential` rather than being dropped.
    pub fn from_highway(highway: &str) -> Option<RoadCategory> {
        match highway.trim() {
            "motorway" | "motorway_link"        => Some(RoadCategory::Motorway),
            "trunk"    | "trunk_link"           => Some(RoadCategory::Trunk),
            "primary"  | "primary_link"         => Some(RoadCategory::Primary),
            "secondary"| "secondary_link"       => Some(RoadCategory::Secondary),
            "tertiary" | "tertiary_link"        => Some(RoadCategory::Tertiary),
            "residential" | "living_street"     => Some(RoadCategory::Residential),
            "service"  | "unclassified"         => Some(RoadCategory::Service),
            // Explicitly non-car:
            "footway" | "path" | "cycleway"
            | "pedestrian" | "steps" | "track"  => None,
            _                                   => Some(RoadCategory::Residential),
        }
    }

    /// Assumed speed limit (km/h) when the source data carries none.
    pub fn default_speed_kmh(self) -> f64 {
        match self {
            RoadCategory::Motorway    => 100.0,
            RoadCategory::Trunk       => 80.0,
            RoadCategory::Primary     => 60.0,
            RoadCategory::Secondary   => 50.0,
            RoadCategory::Tertiary    => 50.0,
            RoadCategory::Residential => 30.0,
            RoadCategory::Service     => 20.0,
        }
    }

    /// 0 for motorways up to 6 for service roads.
    #[inline]
    pub fn rank(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoadCategory::Motorway    => "motorway",
            RoadCategory::Trunk       => "trunk",
            RoadCategory::Primary     => "primary",
            RoadCategory::Secondary   => "secondary",
            RoadCategory::Tertiary    => "tertiary",
            RoadCategory::Residential => "residential",
            RoadCategory::Service     => "service",
        }
    }
}

impl std::fmt::Display for RoadCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Road graph in CSR-over-arcs format.
///
/// All fields are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`RoadNetworkBuilder`].
pub struct RoadNetwork {
    // ── Node data (indexed by NodeId) ─────────────────────────────────────
    pub node_pos: Vec<Point>,

    /// Identifier of each node in the source data set.
    pub node_ext_id: Vec<i64>,

    // ── CSR arc adjacency ─────────────────────────────────────────────────
    /// Outgoing arcs of node `n` are `node_out_start[n] .. node_out_start[n+1]`.
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    /// Edge travelled by each arc.
    pub arc_edge: Vec<EdgeId>,

    /// Node reached by each arc.
    pub arc_to: Vec<NodeId>,

    // ── Edge data (indexed by EdgeId, canonical direction) ────────────────
    pub edge_source: Vec<NodeId>,
    pub edge_target: Vec<NodeId>,

    /// Length in metres (geometry length).
    pub edge_length_m: Vec<f64>,

    /// Speed limit in km/h.  Always positive.
    pub edge_speed_kmh: Vec<f64>,

    pub edge_category: Vec<RoadCategory>,

    /// Geometry ordered from `edge_source` to `edge_target`.
    pub edge_geometry: Vec<LineString>,

    pub edge_oneway: Vec<bool>,

    /// Identifier of each edge in the source data set.
    pub edge_ext_id: Vec<i64>,

    ext_to_node: FxHashMap<i64, NodeId>,
}

impl RoadNetwork {
    /// Construct an empty network with no nodes or edges.
    pub fn empty() -> Self {
        RoadNetworkBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_source.len()
    }

    pub fn arc_count(&self) -> usize {
        self.arc_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    /// `true` if `node` is a valid index into this network.
    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    /// Dense id of the node whose source-data id is `ext_id`.
    pub fn node_by_ext_id(&self, ext_id: i64) -> Option<NodeId> {
        self.ext_to_node.get(&ext_id).copied()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over `(edge, next_node)` for every outgoing arc of `node`.
    ///
    /// This is a contiguous index range — no heap allocation.
    #[inline]
    pub fn out_arcs(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, NodeId)> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| (self.arc_edge[i], self.arc_to[i]))
    }

    /// Out-degree of `node` (number of outgoing arcs).
    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// Car travel time over `edge` at its speed limit, in milliseconds.
    #[inline]
    pub fn edge_travel_ms(&self, edge: EdgeId) -> f64 {
        let mps = self.edge_speed_kmh[edge.index()] / 3.6;
        self.edge_length_m[edge.index()] / mps * 1_000.0
    }

    // ── Connectivity ──────────────────────────────────────────────────────

    /// Strongly-connected component label of every node (Kosaraju, iterative).
    ///
    /// Labels are dense from 0 in discovery order of the second pass.
    pub fn scc_labels(&self) -> Vec<u32> {
        let n = self.node_count();

        // Pass 1: post-order over the forward graph.
        let mut visited = vec![false; n];
        let mut order: Vec<NodeId> = Vec::with_capacity(n);
        let mut stack: Vec<(NodeId, usize)> = Vec::new();
        for root in 0..n {
            if visited[root] {
                continue;
            }
            visited[root] = true;
            stack.push((NodeId(root as u32), self.node_out_start[root] as usize));
            while let Some(top) = stack.last_mut() {
                let node = top.0;
                let end = self.node_out_start[node.index() + 1] as usize;
                if top.1 < end {
                    let to = self.arc_to[top.1];
                    top.1 += 1;
                    if !visited[to.index()] {
                        visited[to.index()] = true;
                        stack.push((to, self.node_out_start[to.index()] as usize));
                    }
                } else {
                    order.push(node);
                    stack.pop();
                }
            }
        }

        // Reverse adjacency in CSR form.
        let mut rev_start = vec![0u32; n + 1];
        for &to in &self.arc_to {
            rev_start[to.index() + 1] += 1;
        }
        for i in 1..=n {
            rev_start[i] += rev_start[i - 1];
        }
        let mut fill = rev_start.clone();
        let mut rev_from = vec![NodeId::INVALID; self.arc_count()];
        for from in 0..n {
            for (_, to) in self.out_arcs(NodeId(from as u32)) {
                let slot = &mut fill[to.index()];
                rev_from[*slot as usize] = NodeId(from as u32);
                *slot += 1;
            }
        }

        // Pass 2: flood the reverse graph in decreasing finish order.
        const UNSET: u32 = u32::MAX;
        let mut label = vec![UNSET; n];
        let mut next_label = 0u32;
        let mut work: Vec<NodeId> = Vec::new();
        for &root in order.iter().rev() {
            if label[root.index()] != UNSET {
                continue;
            }
            label[root.index()] = next_label;
            work.push(root);
            while let Some(node) = work.pop() {
                let start = rev_start[node.index()] as usize;
                let end   = rev_start[node.index() + 1] as usize;
                for &from in &rev_from[start..end] {
                    if label[from.index()] == UNSET {
                        label[from.index()] = next_label;
                        work.push(from);
                    }
                }
            }
            next_label += 1;
        }
        label
    }

    /// Keep only the largest strongly-connected component.
    ///
    /// Ties are broken in favour of the component containing the lowest
    /// `NodeId`.  Surviving nodes keep their relative order and are
    /// renumbered densely; edges with an endpoint outside the component are
    /// dropped.  Source-data ids are preserved.
    pub fn restrict_to_largest_scc(&self) -> RoadNetwork {
        if self.is_empty() {
            return RoadNetwork::empty();
        }
        let labels = self.scc_labels();
        let mut sizes: FxHashMap<u32, usize> = FxHashMap::default();
        for &l in &labels {
            *sizes.entry(l).or_default() += 1;
        }
        // Scan nodes in id order so the first component reaching the maximum
        // size wins ties.
        let mut best_label = labels[0];
        let mut best_size = 0usize;
        for &l in &labels {
            let size = sizes[&l];
            if size > best_size {
                best_size = size;
                best_label = l;
            }
        }

        let mut remap = vec![NodeId::INVALID; self.node_count()];
        let mut b = RoadNetworkBuilder::with_capacity(best_size, self.edge_count());
        for (i, &l) in labels.iter().enumerate() {
            if l == best_label {
                remap[i] = b.add_node_with_id(self.node_ext_id[i], self.node_pos[i]);
            }
        }
        for e in 0..self.edge_count() {
            let from = remap[self.edge_source[e].index()];
            let to   = remap[self.edge_target[e].index()];
            if !from.is_valid() || !to.is_valid() {
                continue;
            }
            b.add_edge(EdgeSpec {
                ext_id:    Some(self.edge_ext_id[e]),
                source:    from,
                target:    to,
                category:  self.edge_category[e],
                speed_kmh: Some(self.edge_speed_kmh[e]),
                oneway:    self.edge_oneway[e],
                geometry:  Some(self.edge_geometry[e].clone()),
            });
        }
        b.build()
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Description of one edge handed to [`RoadNetworkBuilder::add_edge`].
#[derive(Clone, Debug)]
pub struct EdgeSpec {
    /// Source-data id; defaults to the dense `EdgeId`.
    pub ext_id:    Option<i64>,
    pub source:    NodeId,
    pub target:    NodeId,
    pub category:  RoadCategory,
    /// `None` (or a non-positive value) uses the category default.
    pub speed_kmh: Option<f64>,
    pub oneway:    bool,
    /// Geometry from `source` to `target`; `None` means a straight segment.
    pub geometry:  Option<LineString>,
}

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use dl_core::Point;
/// use dl_spatial::{RoadCategory, RoadNetworkBuilder};
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node(Point::new(0.0, 0.0));
/// let c = b.add_node(Point::new(1_200.0, 0.0));
/// b.add_road(a, c, RoadCategory::Primary, 60.0);
/// let net = b.build();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 1);
/// assert_eq!(net.arc_count(), 2); // two-way
/// ```
pub struct RoadNetworkBuilder {
    nodes:     Vec<Point>,
    node_ids:  Vec<i64>,
    raw_edges: Vec<EdgeSpec>,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), node_ids: Vec::new(), raw_edges: Vec::new() }
    }

    /// Pre-allocate for the expected number of nodes and edges to reduce
    /// reallocations when bulk-loading from CSV.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:     Vec::with_capacity(nodes),
            node_ids:  Vec::with_capacity(nodes),
            raw_edges: Vec::with_capacity(edges),
        }
    }

    /// Add a road node and return its `NodeId` (sequential from 0).  The
    /// source-data id defaults to the dense index.
    pub fn add_node(&mut self, pos: Point) -> NodeId {
        let ext = self.nodes.len() as i64;
        self.add_node_with_id(ext, pos)
    }

    /// Add a road node carrying its source-data id.
    pub fn add_node_with_id(&mut self, ext_id: i64, pos: Point) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        self.node_ids.push(ext_id);
        id
    }

    pub fn add_edge(&mut self, spec: EdgeSpec) -> EdgeId {
        let id = EdgeId(self.raw_edges.len() as u32);
        self.raw_edges.push(spec);
        id
    }

    /// Convenience: a straight two-way road.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, category: RoadCategory, speed_kmh: f64) -> EdgeId {
        self.add_edge(EdgeSpec {
            ext_id:    None,
            source:    a,
            target:    b,
            category,
            speed_kmh: Some(speed_kmh),
            oneway:    false,
            geometry:  None,
        })
    }

    /// Convenience: a straight one-way road from `a` to `b`.
    pub fn add_oneway(&mut self, a: NodeId, b: NodeId, category: RoadCategory, speed_kmh: f64) -> EdgeId {
        self.add_edge(EdgeSpec {
            ext_id:    None,
            source:    a,
            target:    b,
            category,
            speed_kmh: Some(speed_kmh),
            oneway:    true,
            geometry:  None,
        })
    }

    /// Position of a node added earlier.
    pub fn node_pos(&self, id: NodeId) -> Point {
        self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadNetwork`].
    ///
    /// Edges keep their insertion order as `EdgeId`.  Arcs are sorted by
    /// source node (stable, so ties keep edge order).  Time complexity:
    /// O(E log E).
    pub fn build(self) -> RoadNetwork {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        let mut edge_source    = Vec::with_capacity(edge_count);
        let mut edge_target    = Vec::with_capacity(edge_count);
        let mut edge_length_m  = Vec::with_capacity(edge_count);
        let mut edge_speed_kmh = Vec::with_capacity(edge_count);
        let mut edge_category  = Vec::with_capacity(edge_count);
        let mut edge_geometry  = Vec::with_capacity(edge_count);
        let mut edge_oneway    = Vec::with_capacity(edge_count);
        let mut edge_ext_id    = Vec::with_capacity(edge_count);

        // (from, edge, to)
        let mut arcs: Vec<(NodeId, EdgeId, NodeId)> = Vec::with_capacity(edge_count * 2);

        for (i, spec) in self.raw_edges.into_iter().enumerate() {
            let id = EdgeId(i as u32);
            let geometry = spec.geometry.unwrap_or_else(|| {
                LineString::new(vec![
                    self.nodes[spec.source.index()],
                    self.nodes[spec.target.index()],
                ])
            });
            let speed = spec
                .speed_kmh
                .filter(|s| s.is_finite() && *s > 0.0)
                .unwrap_or_else(|| spec.category.default_speed_kmh());

            arcs.push((spec.source, id, spec.target));
            if !spec.oneway {
                arcs.push((spec.target, id, spec.source));
            }

            edge_source.push(spec.source);
            edge_target.push(spec.target);
            edge_length_m.push(geometry.length());
            edge_speed_kmh.push(speed);
            edge_category.push(spec.category);
            edge_geometry.push(geometry);
            edge_oneway.push(spec.oneway);
            edge_ext_id.push(spec.ext_id.unwrap_or(i as i64));
        }

        arcs.sort_by_key(|&(from, _, _)| from.0);

        let arc_edge: Vec<EdgeId> = arcs.iter().map(|a| a.1).collect();
        let arc_to:   Vec<NodeId> = arcs.iter().map(|a| a.2).collect();

        // Build CSR row pointer (node_out_start).
        let mut node_out_start = vec![0u32; node_count + 1];
        for &(from, _, _) in &arcs {
            node_out_start[from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, arcs.len());

        let ext_to_node = self
            .node_ids
            .iter()
            .enumerate()
            .map(|(i, &ext)| (ext, NodeId(i as u32)))
            .collect();

        RoadNetwork {
            node_pos: self.nodes,
            node_ext_id: self.node_ids,
            node_out_start,
            arc_edge,
            arc_to,
            edge_source,
            edge_target,
            edge_length_m,
            edge_speed_kmh,
            edge_category,
            edge_geometry,
            edge_oneway,
            edge_ext_id,
            ext_to_node,
        }
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
