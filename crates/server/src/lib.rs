//! vecsearch-server — HTTP surface for the vecsearch engine.
//!
//! Provides the REST API; all index logic lives in `vecsearch-core`.

/// REST API layer: Axum router, HTTP handlers, models, metrics.
pub mod api;
