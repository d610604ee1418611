//! API error types mapped to HTTP status codes.
//!
//! Each [`ApiError`] variant maps to a status code and produces a JSON
//! response body `{"error": "message"}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use vecsearch_core::IndexError;

/// Application-level error type that implements `IntoResponse`.
#[derive(Debug)]
pub enum ApiError {
    /// Invalid request parameters (400).
    BadRequest(String),
    /// Unexpected server error (500).
    Internal(String),
}

impl From<IndexError> for ApiError {
    fn from(err: IndexError) -> Self {
        // Every core error is an input violation; the index has no
        // internal failure modes.
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        let body = axum::Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
