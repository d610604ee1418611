//! Global configuration constants for vecsearch.
//!
//! Index tuning defaults and input validation limits are defined here.
//! Runtime configuration (port, dimensions, HNSW overrides) is handled via
//! CLI arguments and environment variables in the server's `main.rs`.

/// Default number of bidirectional links per HNSW node above layer 0.
///
/// Higher values improve recall but increase memory and build time.
/// Typical range: 8–64.
pub const HNSW_DEFAULT_M: usize = 16;

/// Default ef parameter during HNSW index construction.
///
/// Controls the size of the dynamic candidate list during insertion.
/// Higher values produce a better graph but slow down build time.
pub const HNSW_DEFAULT_EF_CONSTRUCTION: usize = 200;

/// Default ef parameter during HNSW search.
///
/// Controls the size of the dynamic candidate list during query.
/// Higher values improve recall at the cost of latency.
pub const HNSW_DEFAULT_EF_SEARCH: usize = 100;

/// Absolute ceiling on HNSW layer assignment.
pub const HNSW_MAX_LAYER: usize = 16;

/// Default seed for the index-owned level RNG.
///
/// A fixed seed makes graph construction reproducible for a given insert order.
pub const HNSW_DEFAULT_SEED: u64 = 42;

/// Number of results returned by `search` when the caller requests `top_k <= 0`.
pub const DEFAULT_TOP_K: usize = 10;

/// Worker count for data-parallel brute-force search when the caller requests `<= 0`.
pub const DEFAULT_SEARCH_WORKERS: usize = 4;

/// Default embedding dimensionality (all-MiniLM-L6-v2 produces 384-dim vectors).
pub const DEFAULT_DIMENSIONS: usize = 384;

/// Maximum allowed embedding dimension at index construction.
pub const MAX_DIMENSION: usize = 4096;

/// Maximum number of results (`top_k`) per search request.
pub const MAX_K: usize = 10_000;

/// Maximum number of vectors per batch insert request.
pub const MAX_BATCH_SIZE: usize = 1_000;

/// Default HTTP server port.
pub const DEFAULT_PORT: u16 = 8001;

/// Maximum HTTP request body size in bytes (10 MB).
pub const MAX_REQUEST_BODY_BYTES: usize = 10 * 1024 * 1024;
