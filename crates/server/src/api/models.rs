//! Request and response data transfer objects for the REST API.
//!
//! All types derive `Serialize` and/or `Deserialize` for JSON marshalling
//! via Axum. The wire shapes mirror what upstream document-intelligence
//! clients send: embeddings plus opaque chunk metadata.

use serde::{Deserialize, Serialize};
use vecsearch_core::{Metadata, SearchResult, Vector};

/// Request body for `POST /insert`.
#[derive(Debug, Deserialize)]
pub struct InsertRequest {
    pub id: String,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl From<InsertRequest> for Vector {
    fn from(req: InsertRequest) -> Self {
        Vector {
            id: req.id,
            embedding: req.embedding,
            metadata: req.metadata,
        }
    }
}

/// Response body for `POST /insert`.
#[derive(Debug, Serialize)]
pub struct InsertResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Request body for `POST /insert/batch`.
#[derive(Debug, Deserialize)]
pub struct InsertBatchRequest {
    pub vectors: Vec<Vector>,
}

/// Response body for `POST /insert/batch`.
#[derive(Debug, Serialize)]
pub struct InsertBatchResponse {
    /// Vectors appended to the exact index. When HNSW wiring diverges the
    /// message says so; the counts are never silently papered over.
    pub inserted: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Request body for `POST /search`.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub embedding: Vec<f32>,
    /// Non-positive values fall back to the server default (10).
    #[serde(default)]
    pub top_k: i64,
    /// One of `hnsw`, `bruteforce`, `bruteforce_concurrent`; empty selects
    /// `hnsw`.
    #[serde(default)]
    pub algorithm: String,
}

/// Response body for `POST /search`.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub latency_ms: f64,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub vector_count: usize,
}

/// Response body for `GET /stats`.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub vector_count: usize,
    pub dimensions: usize,
    pub index_type: String,
}
