//! Hierarchical Navigable Small World (HNSW) approximate nearest neighbor
//! index.
//!
//! A layered proximity graph: every node appears on layers `0..=level` with
//! exponentially decreasing probability, so queries descend coarse-to-fine
//! from a single entry point and finish with a beam search on the dense base
//! layer. Expected logarithmic search, at the cost of approximate results.
//!
//! Nodes are held in a slot arena and referenced by index (never by owning
//! pointers — the graph is full of cycles), and all edges are kept
//! bidirectional within each layer, including through pruning.

mod graph;
mod insert;
mod search;
mod visited;

pub use graph::HnswConfig;

use crate::error::IndexError;
use crate::vector::{SearchResult, Vector};
use graph::HnswGraph;
use parking_lot::RwLock;
use search::knn_search;

/// Thread-safe HNSW index over fixed-dimension embeddings.
///
/// One readers-writer lock guards the whole graph: inserts are exclusive,
/// searches share. The level RNG lives inside the graph and is only touched
/// under the writer lock.
pub struct HnswIndex {
    dimensions: usize,
    graph: RwLock<HnswGraph>,
}

impl HnswIndex {
    /// Creates an empty index for embeddings of length `dimensions`.
    pub fn new(dimensions: usize, config: HnswConfig) -> Self {
        Self {
            dimensions,
            graph: RwLock::new(HnswGraph::new(config)),
        }
    }

    /// Empty index with default parameters (M=16, ef_construction=200,
    /// ef_search=100).
    pub fn with_default_config(dimensions: usize) -> Self {
        Self::new(dimensions, HnswConfig::default())
    }

    /// Inserts one vector, fully wiring it into every layer it occupies
    /// before the writer lock is released.
    pub fn insert(&self, vector: Vector) -> Result<(), IndexError> {
        self.check_dimensions(&vector)?;
        self.graph.write().insert(vector);
        Ok(())
    }

    /// Inserts a batch under one writer lock. All embeddings are validated
    /// before any graph mutation; returns the number inserted.
    pub fn insert_batch(&self, vectors: Vec<Vector>) -> Result<usize, IndexError> {
        for v in &vectors {
            self.check_dimensions(v)?;
        }
        let count = vectors.len();
        let mut graph = self.graph.write();
        for v in vectors {
            graph.insert(v);
        }
        Ok(count)
    }

    /// Approximate top-k by cosine similarity, descending. Empty index
    /// yields an empty list.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<SearchResult> {
        let graph = self.graph.read();
        knn_search(&graph, query, k)
            .into_iter()
            .take(k)
            .filter_map(|(distance, slot)| {
                let node = graph.nodes.get(slot as usize)?;
                Some(SearchResult {
                    id: node.id.clone(),
                    // Traversal ranks by cosine distance; report similarity.
                    score: 1.0 - distance,
                    metadata: node.metadata.clone(),
                })
            })
            .collect()
    }

    /// Number of stored vectors.
    pub fn count(&self) -> usize {
        self.graph.read().len()
    }

    /// Returns `true` if no vectors are stored.
    pub fn is_empty(&self) -> bool {
        self.graph.read().is_empty()
    }

    /// Declared embedding dimension.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn check_dimensions(&self, vector: &Vector) -> Result<(), IndexError> {
        if vector.embedding.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.embedding.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bruteforce::BruteForceIndex;
    use crate::vector::Metadata;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    fn vec_with(id: &str, embedding: Vec<f32>) -> Vector {
        Vector {
            id: id.to_string(),
            embedding,
            metadata: Metadata::default(),
        }
    }

    fn random_unit(rng: &mut StdRng, dim: usize) -> Vec<f32> {
        let v: Vec<f32> = (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect();
        crate::distance::normalize(&v)
    }

    fn fill_random(index: &HnswIndex, rng: &mut StdRng, n: usize, dim: usize) {
        for i in 0..n {
            index
                .insert(vec_with(&format!("v{i}"), random_unit(rng, dim)))
                .unwrap();
        }
    }

    #[test]
    fn test_finds_obvious_match() {
        let index = HnswIndex::with_default_config(3);
        index.insert(vec_with("a", vec![1.0, 0.0, 0.0])).unwrap();
        index.insert(vec_with("b", vec![0.0, 1.0, 0.0])).unwrap();
        index.insert(vec_with("c", vec![0.9, 0.1, 0.0])).unwrap();

        let results = index.search(&[1.0, 0.0, 0.0], 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "a");
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_index_returns_empty() {
        let index = HnswIndex::with_default_config(4);
        assert!(index.search(&[1.0, 0.0, 0.0, 0.0], 5).is_empty());
        assert_eq!(index.count(), 0);
        assert!(index.is_empty());
    }

    #[test]
    fn test_dimension_guard() {
        let index = HnswIndex::with_default_config(4);
        let err = index.insert(vec_with("a", vec![1.0; 5])).unwrap_err();
        assert!(matches!(err, IndexError::DimensionMismatch { .. }));
        assert_eq!(index.count(), 0);
    }

    #[test]
    fn test_batch_validated_before_mutation() {
        let index = HnswIndex::with_default_config(2);
        let batch = vec![vec_with("a", vec![1.0, 0.0]), vec_with("b", vec![1.0; 3])];
        assert!(index.insert_batch(batch).is_err());
        assert_eq!(index.count(), 0);

        let batch = vec![vec_with("a", vec![1.0, 0.0]), vec_with("b", vec![0.0, 1.0])];
        assert_eq!(index.insert_batch(batch).unwrap(), 2);
        assert_eq!(index.count(), 2);
    }

    #[test]
    fn test_edges_are_bidirectional() {
        let mut rng = StdRng::seed_from_u64(5);
        let index = HnswIndex::with_default_config(16);
        fill_random(&index, &mut rng, 200, 16);

        let graph = index.graph.read();
        for (slot, layers) in graph.neighbors.iter().enumerate() {
            for (layer, neighbors) in layers.iter().enumerate() {
                for &neighbor in neighbors {
                    let reverse = graph.neighbor_list(neighbor, layer);
                    assert!(
                        reverse.contains(&(slot as u32)),
                        "edge {slot}->{neighbor} at layer {layer} has no reverse"
                    );
                }
            }
        }
    }

    #[test]
    fn test_degree_bounds() {
        let mut rng = StdRng::seed_from_u64(9);
        let index = HnswIndex::new(32, HnswConfig::with_m(8));
        fill_random(&index, &mut rng, 500, 32);

        let graph = index.graph.read();
        for layers in &graph.neighbors {
            for (layer, neighbors) in layers.iter().enumerate() {
                let cap = if layer == 0 { 16 } else { 8 };
                assert!(
                    neighbors.len() <= cap,
                    "layer {layer} degree {} exceeds cap {cap}",
                    neighbors.len()
                );
            }
        }
    }

    #[test]
    fn test_neighbors_resolve_within_their_level() {
        let mut rng = StdRng::seed_from_u64(21);
        let index = HnswIndex::with_default_config(8);
        fill_random(&index, &mut rng, 300, 8);

        let graph = index.graph.read();
        for layers in &graph.neighbors {
            for (layer, neighbors) in layers.iter().enumerate() {
                for &neighbor in neighbors {
                    let node = &graph.nodes[neighbor as usize];
                    assert!(
                        node.level >= layer,
                        "neighbor {neighbor} at layer {layer} has level {}",
                        node.level
                    );
                }
            }
        }
    }

    #[test]
    fn test_entry_point_tracks_max_level() {
        let mut rng = StdRng::seed_from_u64(13);
        let index = HnswIndex::with_default_config(8);
        assert!(index.graph.read().entry_point.is_none());

        fill_random(&index, &mut rng, 300, 8);
        let graph = index.graph.read();
        let entry = graph.entry_point.expect("non-empty index has entry point");
        assert_eq!(graph.nodes[entry as usize].level, graph.max_level);

        let observed_max = graph.nodes.iter().map(|n| n.level).max().unwrap();
        assert_eq!(graph.max_level, observed_max);
    }

    #[test]
    fn test_recall_floor_against_bruteforce() {
        let mut rng = StdRng::seed_from_u64(17);
        let dim = 384;
        let n = 500;
        let k = 10;

        let hnsw = HnswIndex::with_default_config(dim);
        let exact = BruteForceIndex::new(dim);
        for i in 0..n {
            let v = vec_with(&format!("v{i}"), random_unit(&mut rng, dim));
            hnsw.insert(v.clone()).unwrap();
            exact.insert(v).unwrap();
        }

        let mut total_recall = 0.0;
        let trials = 10;
        for _ in 0..trials {
            let query = random_unit(&mut rng, dim);
            let truth: HashSet<String> = exact
                .search(&query, k)
                .into_iter()
                .map(|r| r.id)
                .collect();
            let found = hnsw
                .search(&query, k)
                .into_iter()
                .filter(|r| truth.contains(&r.id))
                .count();
            total_recall += found as f64 / k as f64;
        }
        let recall = total_recall / trials as f64;
        assert!(recall >= 0.8, "recall {recall} below floor");
    }

    #[test]
    fn test_deterministic_for_fixed_seed() {
        let mut rng = StdRng::seed_from_u64(23);
        let dim = 16;
        let corpus: Vec<Vector> = (0..150)
            .map(|i| vec_with(&format!("v{i}"), random_unit(&mut rng, dim)))
            .collect();

        let a = HnswIndex::with_default_config(dim);
        let b = HnswIndex::with_default_config(dim);
        for v in &corpus {
            a.insert(v.clone()).unwrap();
            b.insert(v.clone()).unwrap();
        }

        let graph_a = a.graph.read();
        let graph_b = b.graph.read();
        assert_eq!(graph_a.entry_point, graph_b.entry_point);
        assert_eq!(graph_a.max_level, graph_b.max_level);
        assert_eq!(graph_a.neighbors, graph_b.neighbors);
    }

    #[test]
    fn test_repeated_search_is_stable() {
        let mut rng = StdRng::seed_from_u64(29);
        let index = HnswIndex::with_default_config(16);
        fill_random(&index, &mut rng, 200, 16);

        let query = random_unit(&mut rng, 16);
        let first: Vec<String> = index.search(&query, 10).into_iter().map(|r| r.id).collect();
        for _ in 0..3 {
            let again: Vec<String> =
                index.search(&query, 10).into_iter().map(|r| r.id).collect();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn test_results_sorted_descending_in_range() {
        let mut rng = StdRng::seed_from_u64(31);
        let index = HnswIndex::with_default_config(32);
        fill_random(&index, &mut rng, 300, 32);

        let query = random_unit(&mut rng, 32);
        let results = index.search(&query, 10);
        assert_eq!(results.len(), 10);
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        for r in &results {
            assert!(r.score >= -1.0 - 1e-6 && r.score <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn test_zero_norm_vector_tolerated() {
        let index = HnswIndex::with_default_config(3);
        index.insert(vec_with("zero", vec![0.0; 3])).unwrap();
        index.insert(vec_with("x", vec![1.0, 0.0, 0.0])).unwrap();

        let results = index.search(&[1.0, 0.0, 0.0], 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "x");
    }

    #[test]
    fn test_k_larger_than_corpus() {
        let index = HnswIndex::with_default_config(2);
        index.insert(vec_with("a", vec![1.0, 0.0])).unwrap();
        index.insert(vec_with("b", vec![0.0, 1.0])).unwrap();
        assert_eq!(index.search(&[1.0, 0.0], 50).len(), 2);
    }

    #[test]
    fn test_metadata_returned_verbatim() {
        let index = HnswIndex::with_default_config(2);
        let metadata = Metadata {
            document_id: "doc-1".to_string(),
            chunk_index: 7,
            text: "lorem".to_string(),
            page_number: None,
        };
        index
            .insert(Vector {
                id: "v1".to_string(),
                embedding: vec![0.0, 1.0],
                metadata: metadata.clone(),
            })
            .unwrap();
        let results = index.search(&[0.0, 1.0], 1);
        assert_eq!(results[0].metadata, metadata);
    }
}
