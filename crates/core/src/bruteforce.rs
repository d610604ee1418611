//! Exact nearest neighbor search by linear scan.
//!
//! The baseline index: O(n·D) per query, exact by construction. Used as the
//! ground-truth oracle for the HNSW index and as the better choice for small
//! corpora. An optional data-parallel variant fans the scan out over
//! contiguous chunks on the rayon pool.

use crate::config;
use crate::distance::cosine_similarity;
use crate::error::IndexError;
use crate::topk::TopK;
use crate::vector::{SearchResult, Vector};
use parking_lot::RwLock;
use rayon::prelude::*;

/// Append-only vector store with exact top-k search.
///
/// A single readers-writer lock guards the vector list: inserts take the
/// writer side, searches share the reader side.
pub struct BruteForceIndex {
    dimensions: usize,
    vectors: RwLock<Vec<Vector>>,
}

impl BruteForceIndex {
    /// Creates an empty index for embeddings of length `dimensions`.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            vectors: RwLock::new(Vec::new()),
        }
    }

    /// Appends one vector. Rejects embeddings whose length differs from the
    /// declared dimension; the index is unchanged on error.
    pub fn insert(&self, vector: Vector) -> Result<(), IndexError> {
        self.check_dimensions(&vector)?;
        self.vectors.write().push(vector);
        Ok(())
    }

    /// Appends a batch under one writer lock. All embeddings are validated
    /// before anything is appended; returns the number inserted.
    pub fn insert_batch(&self, vectors: Vec<Vector>) -> Result<usize, IndexError> {
        for v in &vectors {
            self.check_dimensions(v)?;
        }
        let count = vectors.len();
        self.vectors.write().extend(vectors);
        Ok(count)
    }

    /// Exact top-k by cosine similarity, descending. Score ties break by
    /// insertion order. Empty index yields an empty list.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<SearchResult> {
        let vectors = self.vectors.read();
        materialize(scan_chunk(query, &vectors, k))
    }

    /// Data-parallel variant of [`search`](Self::search): the vector list is
    /// split into `workers` contiguous chunks, each scanned for a local top-k
    /// on the rayon pool, then merged through one more bounded selector.
    ///
    /// Returns the same result set as the serial scan modulo tie-breaking.
    /// The reader lock is held across the whole fan-out/fan-in; all workers
    /// are joined before this returns. `workers == 0` falls back to
    /// [`config::DEFAULT_SEARCH_WORKERS`].
    pub fn search_concurrent(
        &self,
        query: &[f32],
        k: usize,
        workers: usize,
    ) -> Vec<SearchResult> {
        let vectors = self.vectors.read();
        if vectors.is_empty() {
            return Vec::new();
        }

        let workers = if workers == 0 {
            config::DEFAULT_SEARCH_WORKERS
        } else {
            workers
        };
        let chunk_size = vectors.len().div_ceil(workers);

        let partials: Vec<Vec<(f32, &Vector)>> = vectors
            .par_chunks(chunk_size)
            .map(|chunk| scan_chunk(query, chunk, k))
            .collect();

        let mut merged = TopK::new(k);
        for (score, vector) in partials.into_iter().flatten() {
            merged.push(score, vector);
        }
        materialize(merged.into_sorted())
    }

    /// Number of stored vectors.
    pub fn count(&self) -> usize {
        self.vectors.read().len()
    }

    /// Returns `true` if no vectors are stored.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
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

/// Scans one contiguous slice, retaining the local top-k by score.
fn scan_chunk<'a>(query: &[f32], chunk: &'a [Vector], k: usize) -> Vec<(f32, &'a Vector)> {
    let mut topk = TopK::new(k);
    for vector in chunk {
        let score = cosine_similarity(query, &vector.embedding);
        topk.push(score, vector);
    }
    topk.into_sorted()
}

fn materialize(hits: Vec<(f32, &Vector)>) -> Vec<SearchResult> {
    hits.into_iter()
        .map(|(score, vector)| SearchResult {
            id: vector.id.clone(),
            score,
            metadata: vector.metadata.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Metadata;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

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

    #[test]
    fn test_axis_vectors_exact_order() {
        let index = BruteForceIndex::new(3);
        index.insert(vec_with("a", vec![1.0, 0.0, 0.0])).unwrap();
        index.insert(vec_with("b", vec![0.0, 1.0, 0.0])).unwrap();
        index.insert(vec_with("c", vec![0.9, 0.1, 0.0])).unwrap();

        let results = index.search(&[1.0, 0.0, 0.0], 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "a");
        assert_eq!(results[1].id, "c");
        assert!((results[0].score - 1.0).abs() < 1e-6);
        assert!((results[1].score - 0.9 / 0.82f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_empty_index_returns_empty() {
        let index = BruteForceIndex::new(4);
        assert!(index.search(&[1.0, 0.0, 0.0, 0.0], 5).is_empty());
        assert!(index.search_concurrent(&[1.0, 0.0, 0.0, 0.0], 5, 4).is_empty());
    }

    #[test]
    fn test_dimension_guard() {
        let index = BruteForceIndex::new(4);
        let err = index
            .insert(vec_with("a", vec![1.0, 2.0, 3.0, 4.0, 5.0]))
            .unwrap_err();
        assert_eq!(
            err,
            IndexError::DimensionMismatch {
                expected: 4,
                actual: 5
            }
        );
        assert_eq!(index.count(), 0);
    }

    #[test]
    fn test_batch_rejected_atomically() {
        let index = BruteForceIndex::new(2);
        let batch = vec![
            vec_with("good", vec![1.0, 0.0]),
            vec_with("bad", vec![1.0, 0.0, 0.0]),
        ];
        assert!(index.insert_batch(batch).is_err());
        assert_eq!(index.count(), 0);
    }

    #[test]
    fn test_batch_insert_counts() {
        let index = BruteForceIndex::new(2);
        let batch = vec![vec_with("a", vec![1.0, 0.0]), vec_with("b", vec![0.0, 1.0])];
        assert_eq!(index.insert_batch(batch).unwrap(), 2);
        assert_eq!(index.count(), 2);
    }

    #[test]
    fn test_exact_against_full_sort() {
        let mut rng = StdRng::seed_from_u64(7);
        let dim = 16;
        let index = BruteForceIndex::new(dim);
        let mut corpus = Vec::new();
        for i in 0..200 {
            let e = random_unit(&mut rng, dim);
            corpus.push((format!("v{i}"), e.clone()));
            index.insert(vec_with(&format!("v{i}"), e)).unwrap();
        }

        let query = random_unit(&mut rng, dim);
        let results = index.search(&query, 10);

        let mut expected: Vec<(String, f32)> = corpus
            .iter()
            .map(|(id, e)| (id.clone(), cosine_similarity(&query, e)))
            .collect();
        expected.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());

        for (result, (id, score)) in results.iter().zip(expected.iter()) {
            assert_eq!(&result.id, id);
            assert!((result.score - score).abs() < 1e-6);
        }
    }

    #[test]
    fn test_concurrent_matches_serial() {
        let mut rng = StdRng::seed_from_u64(11);
        let dim = 64;
        let index = BruteForceIndex::new(dim);
        for i in 0..1000 {
            index
                .insert(vec_with(&format!("v{i}"), random_unit(&mut rng, dim)))
                .unwrap();
        }

        for trial in 0..5 {
            let query = random_unit(&mut rng, dim);
            let serial = index.search(&query, 10);
            for workers in [1, 2, 8] {
                let parallel = index.search_concurrent(&query, 10, workers);
                let serial_ids: Vec<&str> = serial.iter().map(|r| r.id.as_str()).collect();
                let parallel_ids: Vec<&str> = parallel.iter().map(|r| r.id.as_str()).collect();
                assert_eq!(
                    serial_ids, parallel_ids,
                    "trial {trial} with {workers} workers diverged"
                );
            }
        }
    }

    #[test]
    fn test_ties_break_by_insertion_order() {
        let index = BruteForceIndex::new(2);
        for id in ["first", "second", "third"] {
            index.insert(vec_with(id, vec![1.0, 0.0])).unwrap();
        }
        let results = index.search(&[1.0, 0.0], 2);
        assert_eq!(results[0].id, "first");
        assert_eq!(results[1].id, "second");
    }

    #[test]
    fn test_k_larger_than_corpus() {
        let index = BruteForceIndex::new(2);
        index.insert(vec_with("only", vec![1.0, 0.0])).unwrap();
        let results = index.search(&[0.5, 0.5], 10);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_scores_within_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let index = BruteForceIndex::new(8);
        for i in 0..50 {
            let e: Vec<f32> = (0..8).map(|_| rng.gen_range(-5.0..5.0)).collect();
            index.insert(vec_with(&format!("v{i}"), e)).unwrap();
        }
        let query: Vec<f32> = (0..8).map(|_| rng.gen_range(-5.0..5.0)).collect();
        for r in index.search(&query, 50) {
            assert!(r.score >= -1.0 - 1e-6 && r.score <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn test_metadata_returned_verbatim() {
        let index = BruteForceIndex::new(2);
        let metadata = Metadata {
            document_id: "doc-9".to_string(),
            chunk_index: 3,
            text: "the quick brown fox".to_string(),
            page_number: Some(12),
        };
        index
            .insert(Vector {
                id: "v1".to_string(),
                embedding: vec![1.0, 0.0],
                metadata: metadata.clone(),
            })
            .unwrap();
        let results = index.search(&[1.0, 0.0], 1);
        assert_eq!(results[0].metadata, metadata);
    }
}
