//! Locus auth service entry point.
//!
//! Issues tokens on register/login and answers ValidateToken for the geo
//! service and the gateway. Accounts live in the user service.

use std::sync::Arc;

use locus_api::config::AuthServerConfig;
use locus_api::grpc::connect_lazy;
use locus_api::proto::auth::auth_service_server::AuthServiceServer;
use locus_api::telemetry::{init_tracing, TelemetryConfig};
use locus_api::{shutdown_signal, ApiError, ApiResult, AuthGrpcService, RemoteUserDirectory, TokenConfig};
use tonic::transport::Server;

#[tokio::main]
async fn main() -> ApiResult<()> {
    init_tracing(&TelemetryConfig::for_service("locus-auth"))?;

    let config = AuthServerConfig::from_env()?;
    let tokens = TokenConfig::from_env()?;
    tokens.validate_for_production()?;

    let users = RemoteUserDirectory::new(
        connect_lazy(&config.user_service, config.rpc_timeout)?,
        config.rpc_timeout,
    );
    let service = AuthGrpcService::new(tokens, Arc::new(users));

    tracing::info!(
        addr = %config.listen_addr,
        user_service = %config.user_service,
        "Starting auth service"
    );

    Server::builder()
        .add_service(AuthServiceServer::new(service))
        .serve_with_shutdown(config.listen_addr, shutdown_signal())
        .await
        .map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;

    Ok(())
}
