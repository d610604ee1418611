//! HNSW graph storage and configuration.
//!
//! Nodes live in a single owning arena (`Vec<Node>`) and refer to each other
//! by stable u32 slot indices — never by owning references, which would cycle.
//! Neighbor lists are kept per slot per layer, separate from the node
//! payloads, so edge rewiring never touches embeddings.

use crate::config;
use crate::distance::cosine_distance;
use crate::vector::Metadata;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Tuning parameters for an HNSW index.
///
/// Controls the trade-off between build speed, search speed, recall, and
/// memory usage.
#[derive(Debug, Clone)]
pub struct HnswConfig {
    /// Target bidirectional links per node per layer above 0.
    pub m: usize,
    /// Hard link cap at layer 0 (typically `2 * m`).
    pub m_max0: usize,
    /// Candidate list size during construction.
    pub ef_construction: usize,
    /// Candidate list size during search (higher = better recall, slower).
    pub ef_search: usize,
    /// Level-assignment scale, typically `1 / ln(m)`.
    pub ml: f64,
    /// Absolute ceiling on a node's level.
    pub max_layer_cap: usize,
    /// Seed for the index-owned level RNG.
    pub seed: u64,
}

impl HnswConfig {
    /// Config with the given `m`, deriving `m_max0 = 2m` and `ml = 1/ln(m)`.
    pub fn with_m(m: usize) -> Self {
        Self {
            m,
            m_max0: m * 2,
            ml: 1.0 / (m as f64).ln(),
            ..Self::default()
        }
    }
}

impl Default for HnswConfig {
    fn default() -> Self {
        Self {
            m: config::HNSW_DEFAULT_M,
            m_max0: config::HNSW_DEFAULT_M * 2,
            ef_construction: config::HNSW_DEFAULT_EF_CONSTRUCTION,
            ef_search: config::HNSW_DEFAULT_EF_SEARCH,
            ml: 1.0 / (config::HNSW_DEFAULT_M as f64).ln(),
            max_layer_cap: config::HNSW_MAX_LAYER,
            seed: config::HNSW_DEFAULT_SEED,
        }
    }
}

/// One stored node: payload plus its top level. Edges live in the graph's
/// neighbor table, not here.
#[derive(Debug)]
pub(crate) struct Node {
    pub id: String,
    pub embedding: Vec<f32>,
    pub metadata: Metadata,
    pub level: usize,
}

/// The mutable graph state, guarded by the index-level lock.
#[derive(Debug)]
pub(crate) struct HnswGraph {
    pub config: HnswConfig,
    pub nodes: Vec<Node>,
    /// `neighbors[slot][layer]` = slots adjacent at that layer, for
    /// `layer <= nodes[slot].level`.
    pub neighbors: Vec<Vec<Vec<u32>>>,
    pub entry_point: Option<u32>,
    pub max_level: usize,
    rng: StdRng,
}

impl HnswGraph {
    pub fn new(config: HnswConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            nodes: Vec::new(),
            neighbors: Vec::new(),
            entry_point: None,
            max_level: 0,
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Draws a level from the geometric distribution `floor(-ln(U) * ml)`,
    /// clamped to `[0, max_layer_cap]`. Level 0 holds ~all nodes; each higher
    /// level is exponentially sparser.
    pub fn random_level(&mut self) -> usize {
        let u: f64 = self.rng.gen();
        let level = (-u.ln() * self.config.ml).floor();
        (level as usize).min(self.config.max_layer_cap)
    }

    /// Neighbor slots of `slot` at `layer`. Empty for out-of-range layers.
    #[inline]
    pub fn neighbor_list(&self, slot: u32, layer: usize) -> &[u32] {
        self.neighbors
            .get(slot as usize)
            .and_then(|layers| layers.get(layer))
            .map_or(&[], |list| list.as_slice())
    }

    /// Embedding of `slot`, or `None` for a dangling reference. Callers skip
    /// dangling slots rather than panicking; they cannot occur given correct
    /// construction.
    #[inline]
    pub fn embedding(&self, slot: u32) -> Option<&[f32]> {
        self.nodes.get(slot as usize).map(|n| n.embedding.as_slice())
    }

    /// Greedy walk toward `query`: at each layer from `top` down to `bottom`,
    /// repeatedly hop to any neighbor strictly closer by cosine distance
    /// until none is. Returns the final slot.
    ///
    /// This is the descent used above the beam-search layer both at insert
    /// and at query time.
    pub fn greedy_descend(
        &self,
        query: &[f32],
        mut current: u32,
        top: usize,
        bottom: usize,
    ) -> u32 {
        if bottom > top {
            return current;
        }
        for layer in (bottom..=top).rev() {
            let mut current_dist = match self.embedding(current) {
                Some(e) => cosine_distance(query, e),
                None => return current,
            };
            loop {
                let mut moved = false;
                for &neighbor in self.neighbor_list(current, layer) {
                    let Some(e) = self.embedding(neighbor) else {
                        tracing::warn!(slot = neighbor, layer, "skipping dangling neighbor");
                        continue;
                    };
                    let d = cosine_distance(query, e);
                    if d < current_dist {
                        current = neighbor;
                        current_dist = d;
                        moved = true;
                    }
                }
                if !moved {
                    break;
                }
            }
        }
        current
    }
}
