//! Yen's K-shortest loopless paths, layered over a single-path [`Router`].
//!
//! # Outline
//!
//! ```text
//! A = [shortest(start, end)]
//! while |A| < K:
//!   prev = A.last()
//!   for each spur index i in prev (except the destination):
//!     root    = prev[0..=i], spur = prev[i]
//!     scratch = clone(graph)
//!     for p in A sharing root: drop scratch edge spur → p[i+1]
//!     drop root nodes (except spur) from scratch
//!     cand    = root[..i] ++ shortest_scratch(spur, end)
//!     keep cand only if every hop is an edge of the ORIGINAL graph
//!   pop the cheapest unseen candidate into A
//! ```
//!
//! Scratch copies only ever lose edges, yet every candidate is still
//! re-priced against the original graph: the true distance is the sum of
//! original weights, and a router that returns a hop the original graph does
//! not have must never leak that hop to callers.

use log::{debug, trace};

use rr_core::NodeName;

use crate::graph::Adjacency;
use crate::router::{DijkstraRouter, Route, Router};

/// Up to `k` distinct loopless routes from `start` to `end`, ascending by
/// distance, using Dijkstra for every search.
///
/// The first element (if any) is exactly [`shortest_path`](crate::shortest_path).
/// Returns an empty list when `k == 0` or `end` is unreachable; fewer than
/// `k` routes when the graph has no more alternatives.
pub fn k_shortest_paths(graph: &Adjacency, start: &str, end: &str, k: usize) -> Vec<Route> {
    k_shortest_paths_with(&DijkstraRouter, graph, start, end, k)
}

/// [`k_shortest_paths`] with a caller-supplied single-path router.
pub fn k_shortest_paths_with<R: Router + ?Sized>(
    router: &R,
    graph:  &Adjacency,
    start:  &str,
    end:    &str,
    k:      usize,
) -> Vec<Route> {
    if k == 0 {
        return Vec::new();
    }

    let first = router.route(graph, start, end);
    if !first.is_reachable() || graph.path_distance(&first.nodes).is_none() {
        return Vec::new();
    }

    let mut accepted: Vec<Route> = vec![first];
    // Pending pool, kept in insertion order; ties on distance resolve to the
    // earliest-found candidate.
    let mut pool: Vec<Route> = Vec::new();

    while accepted.len() < k {
        let prev = accepted[accepted.len() - 1].nodes.clone();

        for i in 0..prev.len().saturating_sub(1) {
            let spur = &prev[i];
            let root = &prev[..=i];

            let mut scratch = graph.clone();

            for p in &accepted {
                if p.nodes.len() > i + 1 && p.nodes[..=i] == *root {
                    scratch.remove_edge(spur.as_str(), p.nodes[i + 1].as_str());
                }
            }
            for node in &root[..i] {
                scratch.remove_node(node.as_str());
            }

            let spur_route = router.route(&scratch, spur.as_str(), end);
            if !spur_route.is_reachable() || spur_route.origin() != Some(spur) {
                continue;
            }

            let mut nodes: Vec<NodeName> = root[..i].to_vec();
            nodes.extend(spur_route.nodes);

            let Some(distance_km) = graph.path_distance(&nodes) else {
                debug!("discarding candidate with non-existent hop: {}", join(&nodes));
                continue;
            };
            if nodes.len() < 2 {
                continue;
            }
            if pool.iter().chain(accepted.iter()).any(|r| r.nodes == nodes) {
                trace!("duplicate candidate {}", join(&nodes));
                continue;
            }
            pool.push(Route { nodes, distance_km });
        }

        // Pop the cheapest candidate.  A candidate that already made it into
        // `accepted` is skipped and the next one tried; each retry shrinks
        // the pool so this terminates.
        let mut next = None;
        while let Some(idx) = cheapest(&pool) {
            let cand = pool.remove(idx);
            if accepted.iter().any(|r| r.nodes == cand.nodes) {
                continue;
            }
            next = Some(cand);
            break;
        }
        match next {
            Some(route) => accepted.push(route),
            None => break,
        }
    }

    accepted
}

/// Index of the first minimum-distance route in `pool`.
fn cheapest(pool: &[Route]) -> Option<usize> {
    pool.iter()
        .enumerate()
        .min_by(|(ia, a), (ib, b)| a.distance_km.total_cmp(&b.distance_km).then(ia.cmp(ib)))
        .map(|(i, _)| i)
}

fn join(nodes: &[NodeName]) -> String {
    nodes.iter().map(NodeName::as_str).collect::<Vec<_>>().join(" → ")
}
