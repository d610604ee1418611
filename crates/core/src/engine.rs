//! Query dispatcher over the two index implementations.
//!
//! The engine owns one brute-force and one HNSW index, maintains both on
//! every insert (so the exact index can serve as a ground-truth oracle for
//! the approximate one), validates caller input, and routes each search to
//! the requested algorithm while timing it.

use crate::bruteforce::BruteForceIndex;
use crate::config;
use crate::error::IndexError;
use crate::hnsw::{HnswConfig, HnswIndex};
use crate::vector::{SearchResult, Vector};
use std::str::FromStr;
use std::time::Instant;

/// Search algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// Approximate graph search (the default).
    Hnsw,
    /// Exact linear scan.
    BruteForce,
    /// Exact linear scan, fanned out over worker chunks.
    BruteForceConcurrent,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Hnsw => "hnsw",
            Algorithm::BruteForce => "bruteforce",
            Algorithm::BruteForceConcurrent => "bruteforce_concurrent",
        }
    }
}

impl FromStr for Algorithm {
    type Err = IndexError;

    /// The empty string selects the default algorithm.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "hnsw" => Ok(Algorithm::Hnsw),
            "bruteforce" => Ok(Algorithm::BruteForce),
            "bruteforce_concurrent" => Ok(Algorithm::BruteForceConcurrent),
            other => Err(IndexError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// Search results together with the measured wall-clock latency.
#[derive(Debug)]
pub struct SearchOutput {
    pub results: Vec<SearchResult>,
    pub latency_ms: f64,
}

/// Outcome of a batch insert across both indexes.
///
/// The two counts diverge only if one index rejects what the other accepted;
/// callers should treat `inserted != hnsw_inserted` as partial success
/// rather than assuming the indexes are in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Vectors appended to the brute-force index.
    pub inserted: usize,
    /// Vectors wired into the HNSW index.
    pub hnsw_inserted: usize,
}

/// Snapshot of index size and shape for observability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    pub vector_count: usize,
    pub dimensions: usize,
    pub index_type: &'static str,
}

/// Owns both indexes and routes operations to them.
///
/// The two indexes have independent locks; the engine never holds both at
/// once, so a slow HNSW search does not block brute-force readers.
pub struct SearchEngine {
    dimensions: usize,
    bruteforce: BruteForceIndex,
    hnsw: HnswIndex,
}

impl SearchEngine {
    /// Creates an engine for embeddings of length `dimensions` with the given
    /// HNSW parameters.
    pub fn new(dimensions: usize, hnsw_config: HnswConfig) -> Result<Self, IndexError> {
        if dimensions == 0 {
            return Err(IndexError::InvalidDimension(dimensions));
        }
        Ok(Self {
            dimensions,
            bruteforce: BruteForceIndex::new(dimensions),
            hnsw: HnswIndex::new(dimensions, hnsw_config),
        })
    }

    /// Engine with default HNSW parameters.
    pub fn with_default_config(dimensions: usize) -> Result<Self, IndexError> {
        Self::new(dimensions, HnswConfig::default())
    }

    /// Inserts one vector into both indexes.
    pub fn insert(&self, vector: Vector) -> Result<(), IndexError> {
        self.validate(&vector)?;
        self.bruteforce.insert(vector.clone())?;
        self.hnsw.insert(vector)?;
        Ok(())
    }

    /// Inserts a batch into both indexes.
    ///
    /// Both indexes validate every vector before mutating, so a bad batch is
    /// rejected atomically with both indexes unchanged. The returned
    /// [`BatchOutcome`] carries both per-index counts; there is no
    /// cross-index transaction.
    pub fn insert_batch(&self, vectors: Vec<Vector>) -> Result<BatchOutcome, IndexError> {
        for v in &vectors {
            self.validate(v)?;
        }
        let inserted = self.bruteforce.insert_batch(vectors.clone())?;
        let hnsw_inserted = match self.hnsw.insert_batch(vectors) {
            Ok(count) => count,
            Err(err) => {
                tracing::warn!(%err, "HNSW batch insert diverged from brute-force");
                0
            }
        };
        Ok(BatchOutcome {
            inserted,
            hnsw_inserted,
        })
    }

    /// Routes a top-k query to the requested algorithm and times it.
    ///
    /// `top_k <= 0` falls back to [`config::DEFAULT_TOP_K`]. Returns
    /// results in descending similarity order together with the measured
    /// latency in milliseconds.
    pub fn search(
        &self,
        query: &[f32],
        top_k: i64,
        algorithm: Algorithm,
    ) -> Result<SearchOutput, IndexError> {
        if query.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }
        let k = if top_k <= 0 {
            config::DEFAULT_TOP_K
        } else {
            top_k as usize
        };

        let start = Instant::now();
        let results = match algorithm {
            Algorithm::Hnsw => self.hnsw.search(query, k),
            Algorithm::BruteForce => self.bruteforce.search(query, k),
            Algorithm::BruteForceConcurrent => {
                self.bruteforce
                    .search_concurrent(query, k, config::DEFAULT_SEARCH_WORKERS)
            }
        };
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        Ok(SearchOutput {
            results,
            latency_ms,
        })
    }

    /// Number of stored vectors (from the exact index).
    pub fn count(&self) -> usize {
        self.bruteforce.count()
    }

    /// Declared embedding dimension.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Size and shape snapshot.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            vector_count: self.count(),
            dimensions: self.dimensions,
            index_type: "hnsw+bruteforce",
        }
    }

    fn validate(&self, vector: &Vector) -> Result<(), IndexError> {
        if vector.id.is_empty() {
            return Err(IndexError::EmptyId);
        }
        if vector.embedding.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.embedding.len(),
            });
        }
        Ok(())
    }
}
