//! Locus HTTP gateway entry point.

use axum::Router;
use locus_api::config::GatewayConfig;
use locus_api::telemetry::{init_tracing, TelemetryConfig};
use locus_api::{create_router, shutdown_signal, ApiError, ApiResult, GatewayState, GrpcBackends};

#[tokio::main]
async fn main() -> ApiResult<()> {
    init_tracing(&TelemetryConfig::for_service("locus-gateway"))?;

    let config = GatewayConfig::from_env()?;
    let backends = GrpcBackends::connect(&config)?;
    let app: Router = create_router(GatewayState::from_grpc(backends), &config.cors_origins);

    tracing::info!(
        addr = %config.listen_addr,
        auth_service = %config.auth_service,
        geo_service = %config.geo_service,
        user_service = %config.user_service,
        "Starting gateway"
    );

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", config.listen_addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;

    Ok(())
}
