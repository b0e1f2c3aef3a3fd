//! Tracing Subscriber Initialization
//!
//! Every binary installs one JSON `fmt` layer filtered by `RUST_LOG`.

use locus_core::env_var;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ApiError, ApiResult};

/// Filter used when `RUST_LOG` is unset or unparseable.
pub const DEFAULT_LOG_FILTER: &str = "locus=debug,tower_http=debug,info";

/// Telemetry configuration from environment variables.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to the startup log line
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Environment (production, staging, development)
    pub environment: String,
}

impl TelemetryConfig {
    /// Build the configuration for one process.
    ///
    /// `LOCUS_SERVICE_NAME` overrides the binary's own name.
    pub fn for_service(service_name: &str) -> Self {
        Self {
            service_name: env_var("LOCUS_SERVICE_NAME")
                .unwrap_or_else(|| service_name.to_string()),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: env_var("LOCUS_ENVIRONMENT")
                .unwrap_or_else(|| "development".to_string()),
        }
    }
}

/// Install the global tracing subscriber.
///
/// Call once at startup, before anything logs. A second call fails.
pub fn init_tracing(config: &TelemetryConfig) -> ApiResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
        .map_err(|e| ApiError::internal_error(format!("Failed to init subscriber: {}", e)))?;

    tracing::info!(
        service_name = %config.service_name,
        service_version = %config.service_version,
        environment = %config.environment,
        "Telemetry initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(DEFAULT_LOG_FILTER.parse::<EnvFilter>().is_ok());
    }

    #[test]
    fn test_config_uses_binary_name() {
        let config = TelemetryConfig::for_service("locus-geo");
        assert!(!config.service_name.is_empty());
        assert_eq!(config.service_version, env!("CARGO_PKG_VERSION"));
    }
}
