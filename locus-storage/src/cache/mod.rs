//! Key-value cache backends.
//!
//! The lookup path only needs `get` and `set` with a TTL, so the trait stays
//! byte-oriented and knows nothing about what is stored. Serialisation is
//! the caller's concern.

mod memory;
mod redis_backend;

pub use memory::{InMemoryCacheStore, DEFAULT_MAX_ENTRIES};
pub use redis_backend::RedisCacheStore;

use async_trait::async_trait;
use locus_core::CacheError;
use std::sync::Arc;
use std::time::Duration;

/// Cache backend trait for pluggable cache implementations.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch the bytes stored under `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;
}

#[async_trait]
impl<T: CacheStore + ?Sized> CacheStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        (**self).set(key, value, ttl).await
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses (absent or expired).
    pub misses: u64,
    /// Number of live entries currently held.
    pub entry_count: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            entry_count: 2,
        };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    }
}
