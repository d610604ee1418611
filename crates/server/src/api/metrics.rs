//! Prometheus metrics recording.

use metrics::{counter, gauge, histogram};
use std::time::Duration;
use vecsearch_core::SearchEngine;

/// Records HTTP request metrics.
pub fn record_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];
    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Records an insert operation.
pub fn record_insert(count: usize) {
    counter!("vecsearch_inserts_total").increment(count as u64);
}

/// Records a search operation and its in-index latency.
pub fn record_search(algorithm: &str, latency_ms: f64) {
    let labels = [("algorithm", algorithm.to_string())];
    counter!("vecsearch_searches_total", &labels).increment(1);
    histogram!("vecsearch_search_latency_ms", &labels).record(latency_ms);
}

/// Updates the stored-vector gauge from the engine.
pub fn update_index_metrics(engine: &SearchEngine) {
    gauge!("vecsearch_vectors_total").set(engine.count() as f64);
}
