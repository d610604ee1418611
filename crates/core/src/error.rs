//! Error types for index construction and the caller-facing operations.

use thiserror::Error;

/// Input violations surfaced to the caller. The index state is unchanged
/// whenever one of these is returned.
///
/// The core has no internal failure modes: no I/O, no syscalls beyond
/// allocation. Invariant violations are handled defensively in place
/// (skip + diagnostic) rather than surfaced here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// The embedding length does not match the index's declared dimension.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Vector ids must be non-empty strings.
    #[error("vector id must not be empty")]
    EmptyId,

    /// Index dimension must be positive at construction.
    #[error("index dimension must be positive, got {0}")]
    InvalidDimension(usize),

    /// The requested search algorithm is not one of
    /// `hnsw`, `bruteforce`, `bruteforce_concurrent`.
    #[error("unknown search algorithm: {0:?}")]
    UnknownAlgorithm(String),
}
