//! Shared cache backed by Redis through a `deadpool-redis` pool.

use super::CacheStore;
use async_trait::async_trait;
use deadpool_redis::{Config, Pool, PoolConfig, Runtime};
use locus_core::CacheError;
use redis::AsyncCommands;
use std::time::Duration;

/// Redis cache shared by every geo replica.
#[derive(Clone)]
pub struct RedisCacheStore {
    pool: Pool,
}

impl std::fmt::Debug for RedisCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.pool.status();
        f.debug_struct("RedisCacheStore")
            .field("size", &status.size)
            .field("available", &status.available)
            .finish()
    }
}

impl RedisCacheStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Build a pool for `addr`, which may be a bare `host:port` or a full
    /// `redis://` URL. No connection is made until first use.
    pub fn connect(addr: &str, pool_size: usize, timeout: Duration) -> Result<Self, CacheError> {
        let mut config = Config::from_url(redis_url(addr));
        let mut pool_config = PoolConfig::new(pool_size);
        pool_config.timeouts.wait = Some(timeout);
        pool_config.timeouts.create = Some(timeout);
        pool_config.timeouts.recycle = Some(timeout);
        config.pool = Some(pool_config);

        let pool = config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| CacheError::Connection {
                reason: format!("failed to create redis pool: {}", e),
            })?;
        Ok(Self::new(pool))
    }

    /// Open one connection to confirm the server is reachable.
    pub async fn check_connection(&self) -> Result<(), CacheError> {
        self.connection().await.map(|_| ())
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection, CacheError> {
        self.pool.get().await.map_err(|e| CacheError::Connection {
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.connection().await?;
        conn.get::<_, Option<Vec<u8>>>(key)
            .await
            .map_err(|e| CacheError::Command {
                reason: format!("GET failed: {}", e),
            })
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        // SETEX rejects a zero expiry.
        let ttl_secs = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(|e| CacheError::Command {
                reason: format!("SETEX failed: {}", e),
            })
    }
}

fn redis_url(addr: &str) -> String {
    let addr = addr.trim();
    if addr.starts_with("redis://") || addr.starts_with("rediss://") || addr.starts_with("unix://")
    {
        addr.to_string()
    } else {
        format!("redis://{}", addr)
    }
}
