//! Locus user service entry point.
//!
//! Uses PostgreSQL when `DATABASE_URL` is set, otherwise an in-process
//! store that is lost on restart.

use std::sync::Arc;

use locus_api::config::UserServerConfig;
use locus_api::proto::user::user_service_server::UserServiceServer;
use locus_api::telemetry::{init_tracing, TelemetryConfig};
use locus_api::{shutdown_signal, ApiError, ApiResult, UserAccounts, UserGrpcService};
use locus_storage::{InMemoryUserStore, PgUserStore, UserStore};
use tonic::transport::Server;

#[tokio::main]
async fn main() -> ApiResult<()> {
    init_tracing(&TelemetryConfig::for_service("locus-user"))?;

    let config = UserServerConfig::from_env()?;

    let store: Arc<dyn UserStore> = match config.database_url.as_deref() {
        Some(url) => {
            let store = PgUserStore::connect(url, config.db_pool_size)?;
            store.migrate().await?;
            tracing::info!("Using PostgreSQL user store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; accounts are kept in memory");
            Arc::new(InMemoryUserStore::new())
        }
    };

    let service = UserGrpcService::new(UserAccounts::new(store));

    tracing::info!(addr = %config.listen_addr, "Starting user service");

    Server::builder()
        .add_service(UserServiceServer::new(service))
        .serve_with_shutdown(config.listen_addr, shutdown_signal())
        .await
        .map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;

    Ok(())
}
