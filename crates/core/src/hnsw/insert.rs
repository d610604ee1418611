//! HNSW insertion: level assignment, top-down descent, per-layer candidate
//! search, closest-first neighbor selection, and bidirectional edge wiring
//! with symmetric pruning.

use crate::distance::cosine_distance;
use crate::hnsw::graph::{HnswGraph, Node};
use crate::hnsw::search::search_layer;
use crate::hnsw::visited::VisitedSet;
use crate::vector::{Metadata, Vector};
use ordered_float::OrderedFloat;

impl HnswGraph {
    /// Wires one vector into the graph. Embedding length is validated by the
    /// index wrapper before this is called.
    pub(crate) fn insert(&mut self, vector: Vector) {
        let level = self.random_level();
        let slot = self.nodes.len() as u32;
        let Vector {
            id,
            embedding,
            metadata,
        } = vector;

        // First node becomes the entry point.
        let Some(entry_point) = self.entry_point else {
            self.push_node(id, embedding, metadata, level);
            self.entry_point = Some(slot);
            self.max_level = level;
            return;
        };

        // Descent phase: greedy walk through the layers above the new node's
        // level to find a close entry for the wiring phase.
        let mut current = self.greedy_descend(&embedding, entry_point, self.max_level, level + 1);

        // Insertion phase: beam-search each layer the node will occupy,
        // keeping the m_target closest candidates as its neighbors.
        let top = level.min(self.max_level);
        let mut selected_per_layer: Vec<Vec<u32>> = vec![Vec::new(); top + 1];
        let mut visited = VisitedSet::with_capacity(self.len());
        for layer in (0..=top).rev() {
            let candidates = search_layer(
                self,
                &embedding,
                current,
                self.config.ef_construction,
                layer,
                &mut visited,
            );
            let m_target = self.link_cap(layer);
            selected_per_layer[layer] = candidates
                .iter()
                .take(m_target)
                .map(|&(_, candidate)| candidate)
                .collect();

            // Best candidate seeds the next lower layer.
            if let Some(&(_, best)) = candidates.first() {
                current = best;
            }
        }

        self.push_node(id, embedding, metadata, level);

        // Wire both directions; prune any neighbor the reverse edge pushes
        // over its cap.
        for (layer, selected) in selected_per_layer.into_iter().enumerate() {
            let m_target = self.link_cap(layer);
            self.neighbors[slot as usize][layer] = selected.clone();
            for neighbor in selected {
                self.add_reverse_edge(neighbor, slot, layer, m_target);
            }
        }

        if level > self.max_level {
            self.entry_point = Some(slot);
            self.max_level = level;
        }
    }

    /// Neighbor cap for a layer: `m_max0` at the base, `m` above.
    fn link_cap(&self, layer: usize) -> usize {
        if layer == 0 {
            self.config.m_max0
        } else {
            self.config.m
        }
    }

    fn push_node(&mut self, id: String, embedding: Vec<f32>, metadata: Metadata, level: usize) {
        self.nodes.push(Node {
            id,
            embedding,
            metadata,
            level,
        });
        self.neighbors.push(vec![Vec::new(); level + 1]);
    }

    fn add_reverse_edge(&mut self, neighbor: u32, new_slot: u32, layer: usize, cap: usize) {
        let Some(lists) = self.neighbors.get_mut(neighbor as usize) else {
            tracing::warn!(slot = neighbor, layer, "reverse edge to dangling neighbor");
            return;
        };
        let Some(list) = lists.get_mut(layer) else {
            tracing::warn!(slot = neighbor, layer, "reverse edge above neighbor's level");
            return;
        };
        list.push(new_slot);
        if list.len() > cap {
            self.prune_neighbors(neighbor, layer, cap);
        }
    }

    /// Shrinks `slot`'s neighbor list at `layer` to the `cap` entries closest
    /// to its own embedding. Every dropped edge is removed from both
    /// endpoints so edges stay bidirectional.
    fn prune_neighbors(&mut self, slot: u32, layer: usize, cap: usize) {
        let list = self.neighbors[slot as usize][layer].clone();
        if list.len() <= cap {
            return;
        }

        let Some(base) = self.embedding(slot) else {
            return;
        };
        let mut ranked: Vec<(OrderedFloat<f32>, u32)> = list
            .iter()
            .filter_map(|&candidate| {
                let embedding = self.embedding(candidate)?;
                Some((OrderedFloat(cosine_distance(base, embedding)), candidate))
            })
            .collect();
        ranked.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        for &(_, dropped) in ranked.iter().skip(cap) {
            if let Some(reverse) = self
                .neighbors
                .get_mut(dropped as usize)
                .and_then(|lists| lists.get_mut(layer))
            {
                reverse.retain(|&s| s != slot);
            }
        }
        self.neighbors[slot as usize][layer] = ranked
            .into_iter()
            .take(cap)
            .map(|(_, candidate)| candidate)
            .collect();
    }
}
