//! Beam search over a single layer and the full multi-layer k-NN query.

use crate::distance::cosine_distance;
use crate::hnsw::graph::HnswGraph;
use crate::hnsw::visited::VisitedSet;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Expansion frontier entry: min-orientation, closest at the heap root.
#[derive(Debug, PartialEq, Eq)]
struct Candidate {
    distance: OrderedFloat<f32>,
    slot: u32,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other.distance.cmp(&self.distance)
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Kept-result entry: max-orientation, furthest at the heap root so the worst
/// of the current ef can be evicted in O(log ef).
#[derive(Debug, PartialEq, Eq)]
struct Furthest {
    distance: OrderedFloat<f32>,
    slot: u32,
}

impl Ord for Furthest {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance.cmp(&other.distance)
    }
}

impl PartialOrd for Furthest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Beam search at one layer: returns up to `ef` slots closest to `query`,
/// sorted by ascending cosine distance.
///
/// Terminates once the closest unexpanded candidate is further than the
/// furthest kept result; no neighbor of such a candidate can improve the set.
pub(crate) fn search_layer(
    graph: &HnswGraph,
    query: &[f32],
    entry: u32,
    ef: usize,
    layer: usize,
    visited: &mut VisitedSet,
) -> Vec<(f32, u32)> {
    visited.reset(graph.len());

    let mut candidates: BinaryHeap<Candidate> = BinaryHeap::with_capacity(ef * 2);
    let mut results: BinaryHeap<Furthest> = BinaryHeap::with_capacity(ef + 1);

    let Some(entry_embedding) = graph.embedding(entry) else {
        return Vec::new();
    };
    let entry_dist = OrderedFloat(cosine_distance(query, entry_embedding));
    visited.mark(entry);
    candidates.push(Candidate {
        distance: entry_dist,
        slot: entry,
    });
    results.push(Furthest {
        distance: entry_dist,
        slot: entry,
    });

    while let Some(closest) = candidates.pop() {
        let furthest_kept = results
            .peek()
            .map_or(OrderedFloat(f32::MAX), |r| r.distance);
        if closest.distance > furthest_kept {
            break;
        }

        for &neighbor in graph.neighbor_list(closest.slot, layer) {
            if !visited.mark(neighbor) {
                continue;
            }
            let Some(embedding) = graph.embedding(neighbor) else {
                tracing::warn!(slot = neighbor, layer, "skipping dangling neighbor");
                continue;
            };
            let distance = OrderedFloat(cosine_distance(query, embedding));

            if results.len() < ef {
                candidates.push(Candidate {
                    distance,
                    slot: neighbor,
                });
                results.push(Furthest {
                    distance,
                    slot: neighbor,
                });
            } else if results
                .peek()
                .is_some_and(|worst| distance < worst.distance)
            {
                candidates.push(Candidate {
                    distance,
                    slot: neighbor,
                });
                results.pop();
                results.push(Furthest {
                    distance,
                    slot: neighbor,
                });
            }
        }
    }

    results
        .into_sorted_vec()
        .into_iter()
        .map(|r| (r.distance.0, r.slot))
        .collect()
}

/// Full k-NN query: greedy descent from the entry point down to layer 1, then
/// a beam search at layer 0. Returns up to `max(ef_search, k)` hits as
/// `(cosine_distance, slot)` ascending; callers truncate to k.
pub(crate) fn knn_search(graph: &HnswGraph, query: &[f32], k: usize) -> Vec<(f32, u32)> {
    let Some(entry_point) = graph.entry_point else {
        return Vec::new();
    };

    let current = graph.greedy_descend(query, entry_point, graph.max_level, 1);

    let ef = graph.config.ef_search.max(k);
    let mut visited = VisitedSet::with_capacity(graph.len());
    search_layer(graph, query, current, ef, 0, &mut visited)
}
