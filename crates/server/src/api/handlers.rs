//! HTTP request handlers and shared application state.

use crate::api::errors::ApiError;
use crate::api::metrics;
use crate::api::models::*;
use axum::extract::State;
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use vecsearch_core::{config, Algorithm, SearchEngine, Vector};

/// Shared application state passed to every handler via Axum's `State`
/// extractor.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
    pub prometheus_handle: PrometheusHandle,
}

fn validate_embedding(embedding: &[f32]) -> Result<(), ApiError> {
    if embedding.iter().any(|v| v.is_nan() || v.is_infinite()) {
        return Err(ApiError::BadRequest(
            "Embedding contains NaN or Inf".into(),
        ));
    }
    Ok(())
}

/// `POST /insert`
pub async fn insert(
    State(state): State<AppState>,
    Json(req): Json<InsertRequest>,
) -> Result<Json<InsertResponse>, ApiError> {
    validate_embedding(&req.embedding)?;
    state.engine.insert(Vector::from(req))?;
    metrics::record_insert(1);
    metrics::update_index_metrics(&state.engine);

    Ok(Json(InsertResponse {
        success: true,
        message: None,
    }))
}

/// `POST /insert/batch`
pub async fn insert_batch(
    State(state): State<AppState>,
    Json(req): Json<InsertBatchRequest>,
) -> Result<Json<InsertBatchResponse>, ApiError> {
    if req.vectors.len() > config::MAX_BATCH_SIZE {
        return Err(ApiError::BadRequest(format!(
            "Batch exceeds maximum of {} vectors",
            config::MAX_BATCH_SIZE
        )));
    }
    for v in &req.vectors {
        validate_embedding(&v.embedding)?;
    }

    let outcome = state.engine.insert_batch(req.vectors)?;
    metrics::record_insert(outcome.inserted);
    metrics::update_index_metrics(&state.engine);

    let message = if outcome.hnsw_inserted != outcome.inserted {
        tracing::warn!(
            inserted = outcome.inserted,
            hnsw_inserted = outcome.hnsw_inserted,
            "batch insert left indexes out of sync"
        );
        Some(format!(
            "partial success: {} of {} vectors wired into the HNSW index",
            outcome.hnsw_inserted, outcome.inserted
        ))
    } else {
        None
    };

    Ok(Json(InsertBatchResponse {
        inserted: outcome.inserted,
        message,
    }))
}

/// `POST /search`
pub async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    validate_embedding(&req.embedding)?;
    if req.top_k > config::MAX_K as i64 {
        return Err(ApiError::BadRequest(format!(
            "top_k exceeds maximum of {}",
            config::MAX_K
        )));
    }

    let algorithm: Algorithm = req.algorithm.parse()?;
    let output = state.engine.search(&req.embedding, req.top_k, algorithm)?;
    metrics::record_search(algorithm.as_str(), output.latency_ms);

    Ok(Json(SearchResponse {
        results: output.results,
        latency_ms: output.latency_ms,
    }))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        vector_count: state.engine.count(),
    })
}

/// `GET /stats`
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.engine.stats();
    Json(StatsResponse {
        vector_count: stats.vector_count,
        dimensions: stats.dimensions,
        index_type: stats.index_type.to_string(),
    })
}

/// `GET /metrics`
pub async fn metrics_endpoint(State(state): State<AppState>) -> String {
    state.prometheus_handle.render()
}
