//! Locus Telemetry - Observability Infrastructure
//!
//! Structured logging through `tracing` and Prometheus metrics for every
//! process. The HTTP gateway additionally exposes `/metrics`.

pub mod metrics;
pub mod middleware;
pub mod tracer;

pub use metrics::{metrics_handler, LocusMetrics, METRICS};
pub use middleware::observability_middleware;
pub use tracer::{init_tracing, TelemetryConfig};
