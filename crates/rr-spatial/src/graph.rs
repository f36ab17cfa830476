//! Road graph representation and builder.
//!
//! # Data layout
//!
//! The graph is a name-keyed adjacency map:
//!
//! ```text
//! Adjacency: node name → { neighbour name → weight_km }
//! ```
//!
//! `BTreeMap` at both levels keeps iteration order stable, so searches and
//! nearest-neighbour tie-breaks are reproducible run to run.  The graph is
//! small (tens of waypoints plus one node per live incident), so the map
//! overhead is irrelevant next to determinism.
//!
//! [`RoadGraph`] pairs the adjacency map with the coordinate table and owns
//! the only mutation API (`insert_node` / `move_node` / `remove_node`).
//! [`Adjacency`] on its own is what the path engines read, and what Yen's
//! algorithm clones into scratch copies.

use std::collections::BTreeMap;

use log::{debug, info};

use rr_core::{GeoPoint, NodeName};

use crate::{SpatialError, SpatialResult};

/// Static coordinate table: `name → position`.
pub type NodeTable = BTreeMap<NodeName, GeoPoint>;

/// Static adjacency list: `name → [neighbour names]`.  Each listed pair
/// becomes a bidirectional road.
pub type ConnectionTable = BTreeMap<NodeName, Vec<NodeName>>;

// ── Adjacency ─────────────────────────────────────────────────────────────────

/// Directed, weighted adjacency map.
///
/// Every edge endpoint is also a key, so a node with no outgoing edges is
/// still visible to the path engines.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Adjacency {
    edges: BTreeMap<NodeName, BTreeMap<NodeName, f64>>,
}

impl Adjacency {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of **directed** edges.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn contains_node(&self, name: &str) -> bool {
        self.edges.contains_key(name)
    }

    /// The stored key for `name`, borrowed from the graph.
    pub fn node_key(&self, name: &str) -> Option<&NodeName> {
        self.edges.get_key_value(name).map(|(k, _)| k)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeName> + '_ {
        self.edges.keys()
    }

    /// Outgoing edges of `name` as `(neighbour, weight_km)`.  Empty for an
    /// unknown node.
    pub fn neighbors<'a>(&'a self, name: &str) -> impl Iterator<Item = (&'a NodeName, f64)> + 'a {
        self.edges
            .get(name)
            .into_iter()
            .flat_map(|out| out.iter().map(|(n, &w)| (n, w)))
    }

    pub fn weight(&self, from: &str, to: &str) -> Option<f64> {
        self.edges.get(from).and_then(|out| out.get(to)).copied()
    }

    /// All directed edges as `(from, to, weight_km)`, ordered by `from` then
    /// `to`.
    pub fn edges(&self) -> impl Iterator<Item = (&NodeName, &NodeName, f64)> + '_ {
        self.edges
            .iter()
            .flat_map(|(from, out)| out.iter().map(move |(to, &w)| (from, to, w)))
    }

    /// `true` if every edge `A→B` has a mirror `B→A` of identical weight.
    pub fn is_symmetric(&self) -> bool {
        self.edges()
            .all(|(a, b, w)| self.weight(b.as_str(), a.as_str()) == Some(w))
    }

    /// Sum of edge weights along `path`.
    ///
    /// Returns `None` if `path` is empty or any consecutive pair is not an
    /// edge of this graph.  A single-node path has distance 0.
    pub fn path_distance(&self, path: &[NodeName]) -> Option<f64> {
        let first = path.first()?;
        if !self.contains_node(first.as_str()) {
            return None;
        }
        path.windows(2).try_fold(0.0, |acc, pair| {
            self.weight(pair[0].as_str(), pair[1].as_str()).map(|w| acc + w)
        })
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Register `name` as a node with no edges (no-op if present).
    pub fn add_node(&mut self, name: NodeName) {
        self.edges.entry(name).or_default();
    }

    /// Insert or overwrite the **directed** edge `from → to`.
    pub fn set_edge(&mut self, from: NodeName, to: NodeName, weight_km: f64) {
        self.edges.entry(to.clone()).or_default();
        self.edges.entry(from).or_default().insert(to, weight_km);
    }

    /// Insert edges in **both directions** with the same weight.
    pub fn set_road(&mut self, a: NodeName, b: NodeName, weight_km: f64) {
        self.set_edge(a.clone(), b.clone(), weight_km);
        self.set_edge(b, a, weight_km);
    }

    /// Remove the directed edge `from → to`.  Returns `false` if absent.
    pub fn remove_edge(&mut self, from: &str, to: &str) -> bool {
        self.edges
            .get_mut(from)
            .is_some_and(|out| out.remove(to).is_some())
    }

    /// Remove `name`, its outgoing edges, and every edge pointing at it.
    ///
    /// Idempotent: returns `false` if nothing was removed.
    pub fn remove_node(&mut self, name: &str) -> bool {
        let mut removed = self.edges.remove(name).is_some();
        for out in self.edges.values_mut() {
            removed |= out.remove(name).is_some();
        }
        removed
    }
}

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// The routing graph store: coordinate table plus adjacency map.
///
/// The static waypoint skeleton is built once via [`RoadGraph::build_static`]
/// or [`RoadGraphBuilder`]; incident nodes are then added and removed at
/// runtime through [`insert_node`](Self::insert_node) and
/// [`remove_node`](Self::remove_node).  Callers own the lifecycle; there is
/// no global instance.
#[derive(Clone, Debug, Default)]
pub struct RoadGraph {
    coords:    NodeTable,
    adjacency: Adjacency,
}

impl RoadGraph {
    /// Build the static graph from a coordinate table and an adjacency list.
    ///
    /// For every `A → [B, C, …]` sets `graph[A][B] = graph[B][A] =
    /// distance(A, B)`.  Every coordinate entry becomes a node even if it has
    /// no connections.
    ///
    /// # Errors
    ///
    /// [`SpatialError::MissingCoordinate`] if any name in `connections` has
    /// no entry in `nodes`.
    pub fn build_static(nodes: &NodeTable, connections: &ConnectionTable) -> SpatialResult<Self> {
        let mut b = RoadGraphBuilder::new();
        for (name, &pos) in nodes {
            b.add_node(name.clone(), pos);
        }
        for (from, neighbors) in connections {
            for to in neighbors {
                b.add_road(from.clone(), to.clone());
            }
        }
        b.build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.coords.len()
    }

    /// Number of **directed** edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    // ── Read access ───────────────────────────────────────────────────────

    /// The adjacency map read by the path engines.
    #[inline]
    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    pub fn contains(&self, name: &str) -> bool {
        self.coords.contains_key(name)
    }

    pub fn position(&self, name: &str) -> Option<GeoPoint> {
        self.coords.get(name).copied()
    }

    pub fn positions(&self) -> &NodeTable {
        &self.coords
    }

    /// Names of all incident pseudo-nodes currently in the graph.
    pub fn incident_nodes(&self) -> impl Iterator<Item = &NodeName> + '_ {
        self.coords.keys().filter(|n| n.is_incident())
    }

    /// Map a node sequence to coordinates (e.g. for drawing a polyline).
    /// `None` if any name is unknown.
    pub fn path_positions(&self, path: &[NodeName]) -> Option<Vec<GeoPoint>> {
        path.iter().map(|n| self.position(n.as_str())).collect()
    }

    /// Up to `k` non-incident nodes nearest to `pos`, as `(name, km)`.
    ///
    /// Sorted by distance ascending, ties broken by name, so equal-distance
    /// candidates are always selected in the same order.
    pub fn nearest_static_nodes(&self, pos: GeoPoint, k: usize) -> Vec<(NodeName, f64)> {
        let mut candidates: Vec<(&NodeName, f64)> = self
            .coords
            .iter()
            .filter(|(name, _)| !name.is_incident())
            .map(|(name, &p)| (name, pos.distance_km(p)))
            .collect();
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        candidates
            .into_iter()
            .take(k)
            .map(|(name, d)| (name.clone(), d))
            .collect()
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Insert `name` at `pos` and link it both ways to its `k` nearest
    /// non-incident nodes.  Returns the chosen neighbours, nearest first.
    ///
    /// An existing node of the same name is removed first (with all its
    /// edges), so repeated insertion never leaves a stale copy behind.
    pub fn insert_node(&mut self, name: NodeName, pos: GeoPoint, k: usize) -> Vec<NodeName> {
        if self.remove_node(name.as_str()) {
            debug!("replacing existing node {name}");
        }

        let nearest = self.nearest_static_nodes(pos, k);

        self.adjacency.add_node(name.clone());
        for (neighbor, d) in &nearest {
            self.adjacency.set_road(name.clone(), neighbor.clone(), *d);
        }
        debug!(
            "inserted {name} at {pos} linked to [{}]",
            nearest.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>().join(", ")
        );
        self.coords.insert(name, pos);

        nearest.into_iter().map(|(n, _)| n).collect()
    }

    /// Update the coordinate of `name` without touching its edges.
    ///
    /// Edge weights keep reflecting the position at insertion time.  Returns
    /// `false` if the node does not exist.
    pub fn move_node(&mut self, name: &str, pos: GeoPoint) -> bool {
        match self.coords.get_mut(name) {
            Some(slot) => {
                *slot = pos;
                true
            }
            None => false,
        }
    }

    /// Delete `name`, its coordinate, and every edge touching it.
    ///
    /// Idempotent: returns `false` if the node did not exist.
    pub fn remove_node(&mut self, name: &str) -> bool {
        let had_coord = self.coords.remove(name).is_some();
        let had_edges = self.adjacency.remove_node(name);
        had_coord || had_edges
    }
}

// ── RoadGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`RoadGraph`] incrementally, then call [`build`](Self::build).
///
/// Nodes and roads may be added in any order; weights are computed from the
/// node coordinates at build time.
///
/// # Example
///
/// ```
/// use rr_core::GeoPoint;
/// use rr_spatial::RoadGraphBuilder;
///
/// let mut b = RoadGraphBuilder::new();
/// b.add_node("defaultStartNode", GeoPoint::new(13.629, 123.240));
/// b.add_node("W1", GeoPoint::new(13.630, 123.241));
/// b.add_road("defaultStartNode", "W1");
/// let graph = b.build().unwrap();
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edge_count(), 2); // bidirectional
/// ```
pub struct RoadGraphBuilder {
    nodes: NodeTable,
    roads: Vec<(NodeName, NodeName)>,
}

impl RoadGraphBuilder {
    pub fn new() -> Self {
        Self { nodes: NodeTable::new(), roads: Vec::new() }
    }

    /// Add (or reposition) a static waypoint.
    pub fn add_node(&mut self, name: impl Into<NodeName>, pos: GeoPoint) {
        self.nodes.insert(name.into(), pos);
    }

    /// Add a bidirectional road between two waypoints.
    pub fn add_road(&mut self, a: impl Into<NodeName>, b: impl Into<NodeName>) {
        self.roads.push((a.into(), b.into()));
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn road_count(&self) -> usize { self.roads.len() }

    /// Consume the builder and produce a [`RoadGraph`].
    ///
    /// # Errors
    ///
    /// [`SpatialError::MissingCoordinate`] for the first road whose endpoint
    /// was never added.
    pub fn build(self) -> SpatialResult<RoadGraph> {
        let mut adjacency = Adjacency::new();
        for name in self.nodes.keys() {
            adjacency.add_node(name.clone());
        }

        for (a, b) in self.roads {
            let pa = lookup(&self.nodes, &a, &b)?;
            let pb = lookup(&self.nodes, &b, &a)?;
            if a == b {
                debug!("skipping self-loop on {a}");
                continue;
            }
            adjacency.set_road(a, b, pa.distance_km(pb));
        }
        debug_assert!(adjacency.is_symmetric());

        info!(
            "built road graph: {} nodes, {} directed edges",
            self.nodes.len(),
            adjacency.edge_count()
        );
        Ok(RoadGraph { coords: self.nodes, adjacency })
    }
}

impl Default for RoadGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn lookup(nodes: &NodeTable, name: &NodeName, referenced_by: &NodeName) -> SpatialResult<GeoPoint> {
    nodes.get(name).copied().ok_or_else(|| SpatialError::MissingCoordinate {
        node:          name.clone(),
        referenced_by: referenced_by.clone(),
    })
}
