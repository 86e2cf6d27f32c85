//! Road network representation and builder.
//!
//! # Data layout
//!
//! Roads are undirected, but the graph stores them as pairs of directed
//! **half-edges** in **Compressed Sparse Row (CSR)** format.  Given a
//! `NodeId n`, its outgoing half-edges occupy the contiguous `EdgeId` range:
//!
//! ```text
//! node_out_start[n] .. node_out_start[n+1]
//! ```
//!
//! All edge arrays are sorted by source node and indexed by `EdgeId`, so a
//! vehicle choosing its next edge at an intersection scans one short slice.
//!
//! # One-way roads
//!
//! Every road is stored in both directions even when tagged one-way.  The
//! tag is kept as metadata (`edge_oneway`), and the half-edge that runs
//! against it is flagged in `edge_against_oneway`.  Whether traversal honours
//! the flag is the vehicle's decision, not the graph's.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(lat, lon)` to the nearest `NodeId`.  Used
//! by drivers to snap arbitrary coordinates to intersections.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use v2v_core::{EdgeId, GeoPoint, NodeId, RoadClass};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[lat, lon]` point with
/// the associated `NodeId`.
#[derive(Clone, Debug)]
struct NodeEntry {
    point: [f64; 2], // [lat, lon]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space.  Sufficient for
    /// nearest-node queries within a city.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── RoadSegment ───────────────────────────────────────────────────────────────

/// Attributes of one undirected road between two intersections.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadSegment {
    pub length_m:   f64,
    pub road_class: RoadClass,
    /// Advisory: traffic may only flow from the first to the second node.
    pub oneway:     bool,
}

impl RoadSegment {
    pub fn new(length_m: f64, road_class: RoadClass) -> Self {
        Self { length_m, road_class, oneway: false }
    }

    pub fn oneway(mut self, oneway: bool) -> Self {
        self.oneway = oneway;
        self
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Undirected road graph stored as CSR half-edges, plus a spatial index for
/// node snapping.
///
/// All fields are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`RoadNetworkBuilder`].
#[derive(Debug)]
pub struct RoadNetwork {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Geographic position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<GeoPoint>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    pub edge_from: Vec<NodeId>,
    pub edge_to: Vec<NodeId>,

    /// Length of each half-edge in metres (both halves of a road agree).
    pub edge_length_m: Vec<f64>,

    pub edge_class: Vec<RoadClass>,

    /// One-way tag of the road this half-edge belongs to.
    pub edge_oneway: Vec<bool>,

    /// `true` on the half-edge that runs against a one-way tag.
    pub edge_against_oneway: Vec<bool>,

    // ── Spatial index ─────────────────────────────────────────────────────
    spatial_idx: RTree<NodeEntry>,
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

    /// Number of directed half-edges (twice the number of roads).
    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    #[inline]
    pub fn contains_node(&self, node: NodeId) -> bool {
        node.index() < self.node_pos.len()
    }

    /// Position of `node`, or `None` for ids outside the graph.
    #[inline]
    pub fn node_position(&self, node: NodeId) -> Option<GeoPoint> {
        self.node_pos.get(node.index()).copied()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all half-edges leaving `node`.
    ///
    /// Empty for ids outside the graph.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let (start, end) = self.out_range(node);
        (start..end).map(|i| EdgeId(i as u32))
    }

    /// Out-degree of `node` (number of half-edges leaving it).
    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let (start, end) = self.out_range(node);
        end - start
    }

    /// Number of half-edges leaving `node` whose road class is drivable.
    pub fn drivable_out_degree(&self, node: NodeId) -> usize {
        self.out_edges(node)
            .filter(|e| self.edge_class[e.index()].is_drivable())
            .count()
    }

    /// The first half-edge from `from` to `to`, if the two are adjacent.
    pub fn edge_between(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.out_edges(from).find(|e| self.edge_to[e.index()] == to)
    }

    #[inline]
    fn out_range(&self, node: NodeId) -> (usize, usize) {
        if !self.contains_node(node) {
            return (0, 0);
        }
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start, end)
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Return the `NodeId` of the nearest road node to `pos`.
    ///
    /// Returns `None` only if the network has no nodes.
    pub fn snap_to_node(&self, pos: GeoPoint) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.lat, pos.lon])
            .map(|e| e.id)
    }

    /// Return up to `k` nearest nodes to `pos`, sorted by ascending distance.
    pub fn k_nearest_nodes(&self, pos: GeoPoint, k: usize) -> Vec<NodeId> {
        self.spatial_idx
            .nearest_neighbor_iter(&[pos.lat, pos.lon])
            .take(k)
            .map(|e| e.id)
            .collect()
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use v2v_core::{GeoPoint, RoadClass};
/// use v2v_road::{RoadNetworkBuilder, RoadSegment};
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node(GeoPoint::new(48.5734, 7.7521));
/// let c = b.add_node(GeoPoint::new(48.5747, 7.7541));
/// b.add_road(a, c, RoadSegment::new(206.0, RoadClass::Primary));
/// let net = b.build();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 2); // one road, two half-edges
/// ```
pub struct RoadNetworkBuilder {
    nodes:     Vec<GeoPoint>,
    raw_edges: Vec<RawEdge>,
}

struct RawEdge {
    from:           NodeId,
    to:             NodeId,
    length_m:       f64,
    class:          RoadClass,
    oneway:         bool,
    against_oneway: bool,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), raw_edges: Vec::new() }
    }

    /// Pre-allocate for the expected number of nodes and roads.
    pub fn with_capacity(nodes: usize, roads: usize) -> Self {
        Self {
            nodes:     Vec::with_capacity(nodes),
            raw_edges: Vec::with_capacity(roads * 2),
        }
    }

    /// Add an intersection and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: GeoPoint) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        id
    }

    /// Add an undirected road between `a` and `b`.
    ///
    /// Both half-edges are stored.  For a one-way road, `a → b` is the legal
    /// direction and `b → a` is flagged as running against it.  Negative or
    /// non-finite lengths are stored as zero.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, segment: RoadSegment) {
        let length_m = if segment.length_m.is_finite() { segment.length_m.max(0.0) } else { 0.0 };
        self.raw_edges.push(RawEdge {
            from: a,
            to: b,
            length_m,
            class: segment.road_class,
            oneway: segment.oneway,
            against_oneway: false,
        });
        self.raw_edges.push(RawEdge {
            from: b,
            to: a,
            length_m,
            class: segment.road_class,
            oneway: segment.oneway,
            against_oneway: segment.oneway,
        });
    }

    /// Like [`add_road`](Self::add_road) with the length computed by
    /// haversine between the two node positions.
    pub fn add_road_auto(&mut self, a: NodeId, b: NodeId, road_class: RoadClass, oneway: bool) {
        let length_m = self.node_pos(a).distance_m(self.node_pos(b));
        self.add_road(a, b, RoadSegment { length_m, road_class, oneway });
    }

    /// Look up the position of a node added earlier.
    pub fn node_pos(&self, id: NodeId) -> GeoPoint {
        self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn road_count(&self) -> usize { self.raw_edges.len() / 2 }

    /// Consume the builder and produce a [`RoadNetwork`].
    ///
    /// Half-edges naming a node that was never added are dropped.
    ///
    /// Time complexity: O(E log E) for edge sort + O(N log N) for R-tree bulk
    /// load, where N = nodes, E = half-edges.
    pub fn build(self) -> RoadNetwork {
        let node_count = self.nodes.len();

        // Sort edges by source node for CSR construction.  Stable sort keeps
        // insertion order among a node's edges, which keeps edge selection
        // reproducible for a given seed.
        let mut raw: Vec<RawEdge> = self
            .raw_edges
            .into_iter()
            .filter(|e| e.from.index() < node_count && e.to.index() < node_count)
            .collect();
        raw.sort_by_key(|e| e.from.0);
        let edge_count = raw.len();

        let edge_from:           Vec<NodeId>    = raw.iter().map(|e| e.from).collect();
        let edge_to:             Vec<NodeId>    = raw.iter().map(|e| e.to).collect();
        let edge_length_m:       Vec<f64>       = raw.iter().map(|e| e.length_m).collect();
        let edge_class:          Vec<RoadClass> = raw.iter().map(|e| e.class).collect();
        let edge_oneway:         Vec<bool>      = raw.iter().map(|e| e.oneway).collect();
        let edge_against_oneway: Vec<bool>      = raw.iter().map(|e| e.against_oneway).collect();

        // Build CSR row pointer (node_out_start).
        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        // Bulk-load R-tree for O(N log N) construction (faster than N inserts).
        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, &pos)| NodeEntry {
                point: [pos.lat, pos.lon],
                id: NodeId(i as u32),
            })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        RoadNetwork {
            node_pos: self.nodes,
            node_out_start,
            edge_from,
            edge_to,
            edge_length_m,
            edge_class,
            edge_oneway,
            edge_against_oneway,
            spatial_idx,
        }
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
