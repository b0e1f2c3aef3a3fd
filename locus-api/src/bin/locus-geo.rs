//! Locus geo service entry point.
//!
//! Validates callers through the auth service, caches provider answers in
//! Redis (or in process with `REDIS_ADDR=memory`) and queries DaData on a
//! miss.

use std::sync::Arc;
use std::time::Duration;

use locus_api::config::GeoServerConfig;
use locus_api::grpc::connect_lazy;
use locus_api::proto::geo::geo_service_server::GeoServiceServer;
use locus_api::telemetry::{init_tracing, TelemetryConfig};
use locus_api::{shutdown_signal, ApiError, ApiResult, GeoEngine, GeoGrpcService, RemoteTokenValidator};
use locus_provider::DadataProvider;
use locus_storage::{CacheStore, InMemoryCacheStore, RedisCacheStore};
use tonic::transport::Server;

const REDIS_TIMEOUT: Duration = Duration::from_secs(5);

fn in_memory_cache(config: &GeoServerConfig) -> InMemoryCacheStore {
    InMemoryCacheStore::new().with_max_entries(config.memory_cache_max_entries)
}

async fn build_cache(config: &GeoServerConfig) -> Arc<dyn CacheStore> {
    if config.uses_in_memory_cache() {
        tracing::info!(max_entries = config.memory_cache_max_entries, "Using in-process cache");
        return Arc::new(in_memory_cache(config));
    }

    let redis = match RedisCacheStore::connect(&config.redis_addr, config.redis_pool_size, REDIS_TIMEOUT) {
        Ok(redis) => redis,
        Err(e) => {
            tracing::warn!(error = %e, "Invalid Redis configuration, falling back to in-process cache");
            return Arc::new(in_memory_cache(config));
        }
    };

    match redis.check_connection().await {
        Ok(()) => {
            tracing::info!(redis_addr = %config.redis_addr, "Connected to Redis cache");
        }
        Err(e) => {
            // The pool reconnects on its own; lookups degrade to the provider until then.
            tracing::warn!(error = %e, redis_addr = %config.redis_addr, "Redis not reachable at startup");
        }
    }
    Arc::new(redis)
}

#[tokio::main]
async fn main() -> ApiResult<()> {
    init_tracing(&TelemetryConfig::for_service("locus-geo"))?;

    let config = GeoServerConfig::from_env()?;

    let validator = RemoteTokenValidator::new(connect_lazy(&config.auth_service, config.rpc_timeout)?);
    let provider = DadataProvider::new(config.dadata.clone())?;
    let cache = build_cache(&config).await;

    let engine = GeoEngine::new(Arc::new(validator), cache, Arc::new(provider));

    tracing::info!(
        addr = %config.listen_addr,
        auth_service = %config.auth_service,
        "Starting geo service"
    );

    Server::builder()
        .add_service(GeoServiceServer::new(GeoGrpcService::new(engine)))
        .serve_with_shutdown(config.listen_addr, shutdown_signal())
        .await
        .map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;

    Ok(())
}
