//! Metrics and observability utilities
//!
//! Provides Prometheus metric descriptions and recording helpers
//! with standardized naming conventions.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Curatly metrics
pub const METRICS_PREFIX: &str = "curatly";

/// Histogram buckets for request latency (in seconds).
/// Page assembly fans out to museum APIs, so the upper buckets matter.
pub const LATENCY_BUCKETS: &[f64] = &[
    0.010, // 10ms
    0.050, // 50ms
    0.100, // 100ms
    0.250, // 250ms
    0.500, // 500ms
    1.000, // 1s
    2.500, // 2.5s
    5.000, // 5s
    10.00, // 10s
    30.00, // 30s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Search metrics
    describe_counter!(
        format!("{}_search_pages_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of artwork pages assembled"
    );

    describe_histogram!(
        format!("{}_search_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Artwork page assembly latency in seconds"
    );

    describe_gauge!(
        format!("{}_search_results_count", METRICS_PREFIX),
        Unit::Count,
        "Number of artworks returned in the last page"
    );

    // Upstream museum API metrics
    describe_counter!(
        format!("{}_upstream_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total requests sent to museum APIs"
    );

    describe_counter!(
        format!("{}_upstream_retries_total", METRICS_PREFIX),
        Unit::Count,
        "Rate-limited museum API requests that were retried"
    );

    // Persistence metrics
    describe_counter!(
        format!("{}_persistence_operations_total", METRICS_PREFIX),
        Unit::Count,
        "Favourite and exhibition writes"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Helper to record an assembled artwork page
pub fn record_search(duration_secs: f64, provider: &str, result_count: usize) {
    counter!(
        format!("{}_search_pages_total", METRICS_PREFIX),
        "provider" => provider.to_string()
    )
    .increment(1);

    histogram!(
        format!("{}_search_duration_seconds", METRICS_PREFIX),
        "provider" => provider.to_string()
    )
    .record(duration_secs);

    gauge!(
        format!("{}_search_results_count", METRICS_PREFIX),
        "provider" => provider.to_string()
    )
    .set(result_count as f64);
}

/// Helper to record a museum API call
pub fn record_upstream(provider: &str, endpoint: &str, status: u16) {
    counter!(
        format!("{}_upstream_requests_total", METRICS_PREFIX),
        "provider" => provider.to_string(),
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Helper to record a retried museum API call
pub fn record_retry(provider: &str) {
    counter!(
        format!("{}_upstream_retries_total", METRICS_PREFIX),
        "provider" => provider.to_string()
    )
    .increment(1);
}

/// Helper to record a persistence write
pub fn record_persistence(operation: &str, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(
        format!("{}_persistence_operations_total", METRICS_PREFIX),
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets() {
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }
    }

    #[test]
    fn test_recorders_without_exporter() {
        // No recorder installed: calls are no-ops and must not panic
        let metrics = RequestMetrics::start("GET", "/api/artworks");
        metrics.finish(200);
        record_search(0.25, "met", 20);
        record_upstream("aic", "search", 200);
        record_retry("met");
        record_persistence("add_favourite", true);
    }
}
