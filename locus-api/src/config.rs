//! Process Configuration
//!
//! Every binary reads its settings from the environment once at startup.
//! Empty variables are treated as unset.
//!
//! Listen addresses accept `:port`, `port`, or `host:port`. Downstream
//! service addresses accept `host:port` or a full `http(s)://` URI.

use crate::error::{ApiError, ApiResult};
use locus_core::{env_parse, env_var};
use locus_provider::DadataConfig;
use locus_storage::DEFAULT_MAX_ENTRIES;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_AUTH_GRPC_PORT: &str = ":50051";
pub const DEFAULT_GEO_GRPC_PORT: &str = ":50052";
pub const DEFAULT_USER_GRPC_PORT: &str = ":50053";
pub const DEFAULT_HTTP_PORT: &str = ":8000";

pub const DEFAULT_AUTH_SERVICE: &str = "auth1:50051";
pub const DEFAULT_GEO_SERVICE: &str = "geo1:50052";
pub const DEFAULT_USER_SERVICE: &str = "user1:50053";
pub const DEFAULT_REDIS_ADDR: &str = "redis:6379";

/// `REDIS_ADDR` value selecting the in-process cache.
pub const IN_MEMORY_CACHE: &str = "memory";

/// Whether `LOCUS_ENVIRONMENT` names a production deployment.
pub fn is_production() -> bool {
    let environment = env_var("LOCUS_ENVIRONMENT")
        .unwrap_or_else(|| "development".to_string())
        .to_lowercase();
    environment == "production" || environment == "prod"
}

/// Parse a listen address.
pub fn parse_listen_addr(value: &str) -> ApiResult<SocketAddr> {
    let value = value.trim();
    let addr = if let Some(port) = value.strip_prefix(':') {
        format!("0.0.0.0:{}", port)
    } else if value.parse::<u16>().is_ok() {
        format!("0.0.0.0:{}", value)
    } else {
        value.to_string()
    };
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_argument(format!("Invalid listen address {}: {}", value, e)))
}

/// Turn a downstream address into a URI tonic can connect to.
pub fn service_uri(value: &str) -> String {
    let value = value.trim();
    if value.starts_with("http://") || value.starts_with("https://") {
        value.to_string()
    } else {
        format!("http://{}", value)
    }
}

fn listen_from_env(key: &str, default: &str) -> ApiResult<SocketAddr> {
    parse_listen_addr(&env_var(key).unwrap_or_else(|| default.to_string()))
}

fn service_from_env(key: &str, default: &str) -> String {
    service_uri(&env_var(key).unwrap_or_else(|| default.to_string()))
}

/// Timeout applied to outgoing internal RPCs.
fn rpc_timeout_from_env() -> Duration {
    Duration::from_millis(env_parse("LOCUS_RPC_TIMEOUT_MS").unwrap_or(5_000))
}

// ============================================================================
// PER-PROCESS CONFIGURATION
// ============================================================================

/// Auth service settings.
#[derive(Debug, Clone)]
pub struct AuthServerConfig {
    pub listen_addr: SocketAddr,
    pub user_service: String,
    pub rpc_timeout: Duration,
}

impl AuthServerConfig {
    /// # Environment Variables
    /// - `GRPC_PORT` (default `:50051`)
    /// - `USER_SERVICE` (default `user1:50053`)
    pub fn from_env() -> ApiResult<Self> {
        Ok(Self {
            listen_addr: listen_from_env("GRPC_PORT", DEFAULT_AUTH_GRPC_PORT)?,
            user_service: service_from_env("USER_SERVICE", DEFAULT_USER_SERVICE),
            rpc_timeout: rpc_timeout_from_env(),
        })
    }
}

/// Geo service settings.
#[derive(Debug, Clone)]
pub struct GeoServerConfig {
    pub listen_addr: SocketAddr,
    pub auth_service: String,
    pub rpc_timeout: Duration,
    /// `host:port`, a `redis://` URL, or `memory`
    pub redis_addr: String,
    pub redis_pool_size: usize,
    /// Entry bound of the in-process cache
    pub memory_cache_max_entries: usize,
    pub dadata: DadataConfig,
}

impl GeoServerConfig {
    /// # Environment Variables
    /// - `GRPC_PORT` (default `:50052`)
    /// - `AUTH_SERVICE` (default `auth1:50051`)
    /// - `REDIS_ADDR` (default `redis:6379`; `memory` for an in-process cache)
    /// - `REDIS_POOL_SIZE` (default 16)
    /// - `LOCUS_CACHE_MAX_ENTRIES` (default 10000, in-process cache only)
    /// - `DADATA_*`, see [`DadataConfig::from_env`]
    pub fn from_env() -> ApiResult<Self> {
        Ok(Self {
            listen_addr: listen_from_env("GRPC_PORT", DEFAULT_GEO_GRPC_PORT)?,
            auth_service: service_from_env("AUTH_SERVICE", DEFAULT_AUTH_SERVICE),
            rpc_timeout: rpc_timeout_from_env(),
            redis_addr: env_var("REDIS_ADDR").unwrap_or_else(|| DEFAULT_REDIS_ADDR.to_string()),
            redis_pool_size: env_parse("REDIS_POOL_SIZE").unwrap_or(16),
            memory_cache_max_entries: env_parse("LOCUS_CACHE_MAX_ENTRIES")
                .unwrap_or(DEFAULT_MAX_ENTRIES),
            dadata: DadataConfig::from_env(),
        })
    }

    pub fn uses_in_memory_cache(&self) -> bool {
        self.redis_addr.eq_ignore_ascii_case(IN_MEMORY_CACHE)
    }
}

/// User service settings.
#[derive(Clone)]
pub struct UserServerConfig {
    pub listen_addr: SocketAddr,
    /// PostgreSQL URL; the in-process store is used when unset
    pub database_url: Option<String>,
    pub db_pool_size: usize,
}

impl std::fmt::Debug for UserServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserServerConfig")
            .field("listen_addr", &self.listen_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("db_pool_size", &self.db_pool_size)
            .finish()
    }
}

impl UserServerConfig {
    /// # Environment Variables
    /// - `GRPC_PORT` (default `:50053`)
    /// - `DATABASE_URL` (optional)
    /// - `DB_POOL_SIZE` (default 16)
    pub fn from_env() -> ApiResult<Self> {
        Ok(Self {
            listen_addr: listen_from_env("GRPC_PORT", DEFAULT_USER_GRPC_PORT)?,
            database_url: env_var("DATABASE_URL"),
            db_pool_size: env_parse("DB_POOL_SIZE").unwrap_or(16),
        })
    }
}

/// HTTP gateway settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub listen_addr: SocketAddr,
    pub auth_service: String,
    pub geo_service: String,
    pub user_service: String,
    pub rpc_timeout: Duration,
    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
}

impl GatewayConfig {
    /// # Environment Variables
    /// - `HTTP_PORT` (default `:8000`)
    /// - `AUTH_SERVICE`, `GEO_SERVICE`, `USER_SERVICE`
    /// - `LOCUS_CORS_ORIGINS`: comma-separated list
    pub fn from_env() -> ApiResult<Self> {
        let cors_origins = env_var("LOCUS_CORS_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            listen_addr: listen_from_env("HTTP_PORT", DEFAULT_HTTP_PORT)?,
            auth_service: service_from_env("AUTH_SERVICE", DEFAULT_AUTH_SERVICE),
            geo_service: service_from_env("GEO_SERVICE", DEFAULT_GEO_SERVICE),
            user_service: service_from_env("USER_SERVICE", DEFAULT_USER_SERVICE),
            rpc_timeout: rpc_timeout_from_env(),
            cors_origins,
        })
    }
}
