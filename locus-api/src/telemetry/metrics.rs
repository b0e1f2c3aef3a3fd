//! Prometheus Metrics Definitions
//!
//! Defines all Locus metrics with their labels. Each process registers the
//! same set in the default registry; the gateway serves them on `/metrics`.

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
/// Covers: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Provider round-trip buckets (seconds)
const PROVIDER_LATENCY_BUCKETS: &[f64] = &[0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0];

/// Global metrics instance - initialized on first use
pub static METRICS: Lazy<ApiResult<LocusMetrics>> = Lazy::new(LocusMetrics::new);

/// Result of one cache lookup on the geo path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
    /// GET failed or the stored document did not decode; served as a miss
    Error,
}

impl CacheOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheOutcome::Hit => "hit",
            CacheOutcome::Miss => "miss",
            CacheOutcome::Error => "error",
        }
    }
}

/// Result of one provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderOutcome {
    Success,
    Empty,
    Error,
}

impl ProviderOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderOutcome::Success => "success",
            ProviderOutcome::Empty => "empty",
            ProviderOutcome::Error => "error",
        }
    }
}

/// Container for all Locus metrics.
#[derive(Clone)]
pub struct LocusMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Geo cache lookups - labels: operation, result
    pub geo_cache_lookups_total: CounterVec,

    /// Provider calls - labels: operation, outcome
    pub provider_calls_total: CounterVec,

    /// Provider call duration histogram - labels: operation
    pub provider_call_duration_seconds: HistogramVec,
}

impl LocusMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "locus_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_requests_total: {}", e)))?,

            http_request_duration_seconds: register_histogram_vec!(
                "locus_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_request_duration_seconds: {}", e)))?,

            geo_cache_lookups_total: register_counter_vec!(
                "locus_geo_cache_lookups_total",
                "Geo cache lookups by result",
                &["operation", "result"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register geo_cache_lookups_total: {}", e)))?,

            provider_calls_total: register_counter_vec!(
                "locus_provider_calls_total",
                "Geocoding provider calls by outcome",
                &["operation", "outcome"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register provider_calls_total: {}", e)))?,

            provider_call_duration_seconds: register_histogram_vec!(
                "locus_provider_call_duration_seconds",
                "Geocoding provider call duration in seconds",
                &["operation"],
                PROVIDER_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register provider_call_duration_seconds: {}", e)))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, status_str.as_str()])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Record a geo cache lookup.
    pub fn record_cache_lookup(&self, operation: &str, outcome: CacheOutcome) {
        self.geo_cache_lookups_total
            .with_label_values(&[operation, outcome.as_str()])
            .inc();
    }

    /// Record a provider call.
    pub fn record_provider_call(&self, operation: &str, outcome: ProviderOutcome, duration_secs: f64) {
        self.provider_calls_total
            .with_label_values(&[operation, outcome.as_str()])
            .inc();
        self.provider_call_duration_seconds
            .with_label_values(&[operation])
            .observe(duration_secs);
    }
}

/// Run `f` against the global metrics, if they registered.
pub fn with_metrics(f: impl FnOnce(&LocusMetrics)) {
    if let Ok(metrics) = METRICS.as_ref() {
        f(metrics);
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
        (status = 500, description = "Failed to encode metrics"),
    ),
))]
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::core::Collector;

    #[test]
    fn test_metrics_creation() -> Result<(), String> {
        let metrics = METRICS
            .as_ref()
            .map_err(|e| format!("Metrics init failed: {}", e.message))?;
        assert!(!metrics.http_requests_total.desc().is_empty());
        Ok(())
    }

    #[test]
    fn test_record_cache_lookup() -> Result<(), String> {
        let metrics = METRICS
            .as_ref()
            .map_err(|e| format!("Metrics init failed: {}", e.message))?;
        let before = metrics
            .geo_cache_lookups_total
            .with_label_values(&["metrics_test", "hit"])
            .get();
        metrics.record_cache_lookup("metrics_test", CacheOutcome::Hit);
        let after = metrics
            .geo_cache_lookups_total
            .with_label_values(&["metrics_test", "hit"])
            .get();
        assert_eq!(after - before, 1.0);
        Ok(())
    }

    #[test]
    fn test_record_provider_call() -> Result<(), String> {
        let metrics = METRICS
            .as_ref()
            .map_err(|e| format!("Metrics init failed: {}", e.message))?;
        metrics.record_provider_call("search", ProviderOutcome::Error, 0.2);
        Ok(())
    }

    #[tokio::test]
    async fn test_metrics_handler_renders_text() {
        with_metrics(|m| m.record_http_request("GET", "/health/ping", 200, 0.001));
        let response = metrics_handler().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
