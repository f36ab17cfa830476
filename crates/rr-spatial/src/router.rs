//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! The K-shortest-paths engine calls single-path search through the
//! [`Router`] trait, so the spur searches can be backed by a different
//! algorithm (A*, a cached router, a test double) without touching Yen's
//! bookkeeping.  The default [`DijkstraRouter`] is the canonical engine.
//!
//! # Cost units
//!
//! All costs are great-circle **kilometres** (`f64`), summed along the path.

use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap, HashSet};

use rr_core::NodeName;

use crate::graph::Adjacency;

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query: an ordered node sequence and its total
/// length.
///
/// An unreachable destination is represented by an empty `nodes` list and
/// `distance_km = +∞`.  Check [`is_reachable`](Self::is_reachable) before
/// use.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    /// Nodes to visit in order, from origin to destination inclusive.
    pub nodes: Vec<NodeName>,
    /// Sum of edge weights along `nodes`, in kilometres.
    pub distance_km: f64,
}

impl Route {
    /// The "no path" result.
    pub fn unreachable() -> Self {
        Self { nodes: Vec::new(), distance_km: f64::INFINITY }
    }

    /// `true` if this route actually connects an origin to a destination.
    pub fn is_reachable(&self) -> bool {
        !self.nodes.is_empty() && self.distance_km.is_finite()
    }

    /// `true` if the origin and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Number of edges traversed.
    pub fn hop_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn origin(&self) -> Option<&NodeName> {
        self.nodes.first()
    }

    pub fn destination(&self) -> Option<&NodeName> {
        self.nodes.last()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable single-path routing engine.
///
/// # Contract
///
/// - Must not mutate `graph` (it is borrowed shared).
/// - `from == to` yields a one-node route of distance 0.
/// - An unreachable `to` yields [`Route::unreachable`], not an error.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so a router can live inside the
/// shared dispatch state.
pub trait Router: Send + Sync {
    fn route(&self, graph: &Adjacency, from: &str, to: &str) -> Route;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra's algorithm over the adjacency map.
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(&self, graph: &Adjacency, from: &str, to: &str) -> Route {
        shortest_path(graph, from, to)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Heap entry.  Ordered so `BinaryHeap` (a max-heap) pops the **smallest**
/// cost first; equal costs pop in ascending name order for deterministic
/// tie-breaking.
struct Frontier<'g> {
    cost: f64,
    node: &'g NodeName,
}

impl PartialEq for Frontier<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier<'_> {}

impl PartialOrd for Frontier<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(self.node))
    }
}

/// Shortest path from `start` to `end` by summed edge weight.
///
/// Stops as soon as `end` is settled.  Returns [`Route::unreachable`] if no
/// path exists (including when `start` is not in the graph), and a one-node
/// route of distance 0 when `start == end`.
pub fn shortest_path(graph: &Adjacency, start: &str, end: &str) -> Route {
    if start == end {
        return Route { nodes: vec![NodeName::from(start)], distance_km: 0.0 };
    }
    let Some(source) = graph.node_key(start) else {
        return Route::unreachable();
    };

    // dist[v] = best known cost to reach v; absent means +∞.
    let mut dist: HashMap<&NodeName, f64> = HashMap::new();
    // prev[v] = predecessor of v on the best known path.
    let mut prev: HashMap<&NodeName, &NodeName> = HashMap::new();
    let mut settled: HashSet<&NodeName> = HashSet::new();

    dist.insert(source, 0.0);
    let mut heap = BinaryHeap::new();
    heap.push(Frontier { cost: 0.0, node: source });

    while let Some(Frontier { cost, node }) = heap.pop() {
        // Skip stale heap entries.
        if !settled.insert(node) {
            continue;
        }
        if node == end {
            return reconstruct(&prev, source, node, cost);
        }

        for (neighbor, w) in graph.neighbors(node.as_str()) {
            // Edges into nodes that were removed as keys (scratch copies) are
            // ignored.
            if settled.contains(neighbor) || !graph.contains_node(neighbor.as_str()) {
                continue;
            }
            let new_cost = cost + w;
            let improved = match dist.entry(neighbor) {
                Entry::Vacant(slot) => {
                    slot.insert(new_cost);
                    true
                }
                Entry::Occupied(mut slot) if new_cost < *slot.get() => {
                    slot.insert(new_cost);
                    true
                }
                Entry::Occupied(_) => false,
            };
            if improved {
                prev.insert(neighbor, node);
                heap.push(Frontier { cost: new_cost, node: neighbor });
            }
        }
    }

    Route::unreachable()
}

fn reconstruct(
    prev: &HashMap<&NodeName, &NodeName>,
    source: &NodeName,
    target: &NodeName,
    total_km: f64,
) -> Route {
    let mut nodes = vec![target.clone()];
    let mut cur = target;
    while cur != source {
        match prev.get(cur) {
            Some(&p) => {
                nodes.push(p.clone());
                cur = p;
            }
            // Broken chain: the path would not start at the origin.
            None => return Route::unreachable(),
        }
    }
    nodes.reverse();
    Route { nodes, distance_km: total_km }
}
