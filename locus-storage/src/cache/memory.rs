//! In-process cache backed by a `DashMap`.

use super::{CacheStats, CacheStore};
use async_trait::async_trait;
use dashmap::DashMap;
use locus_core::CacheError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CachedEntry {
    data: Vec<u8>,
    expires_at: Instant,
}

impl CachedEntry {
    fn new(data: Vec<u8>, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Default bound on the number of stored entries.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Single-node cache. Clones share the same map.
///
/// Expired entries are dropped on read, and swept whenever a write would
/// take the map past `max_entries`. If the map is still full after the
/// sweep, the entry closest to expiry is evicted.
#[derive(Debug, Clone)]
pub struct InMemoryCacheStore {
    entries: Arc<DashMap<String, CachedEntry>>,
    max_entries: usize,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            max_entries: DEFAULT_MAX_ENTRIES,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry bound. Zero is treated as one.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max.max(1);
        self
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Number of stored entries, including ones that expired but were not
    /// read since.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .map(|entry| !entry.is_expired())
            .unwrap_or(false)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: self.entries.iter().filter(|e| !e.is_expired()).count() as u64,
        }
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let found = match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => Some(entry.data.clone()),
            Some(entry) => {
                drop(entry);
                self.entries.remove(key);
                None
            }
            None => None,
        };

        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        Ok(found)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            self.make_room();
        }
        self.entries
            .insert(key.to_string(), CachedEntry::new(value, ttl));
        Ok(())
    }
}

impl InMemoryCacheStore {
    /// Drop expired entries; if that frees nothing, evict the entry that
    /// expires soonest.
    fn make_room(&self) {
        self.entries.retain(|_, entry| !entry.is_expired());
        if self.entries.len() < self.max_entries {
            return;
        }

        let victim = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().expires_at)
            .map(|entry| entry.key().clone());
        if let Some(key) = victim {
            tracing::debug!(key = %key, "Evicting cache entry at capacity");
            self.entries.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get() -> Result<(), CacheError> {
        let cache = InMemoryCacheStore::new();
        assert_eq!(cache.get("search:a").await?, None);

        cache
            .set("search:a", b"[1]".to_vec(), Duration::from_secs(60))
            .await?;
        assert_eq!(cache.get("search:a").await?, Some(b"[1]".to_vec()));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entry_count, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_last_writer_wins() -> Result<(), CacheError> {
        let cache = InMemoryCacheStore::new();
        cache.set("k", b"first".to_vec(), Duration::from_secs(60)).await?;
        cache.set("k", b"second".to_vec(), Duration::from_secs(60)).await?;
        assert_eq!(cache.get("k").await?, Some(b"second".to_vec()));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() -> Result<(), CacheError> {
        let cache = InMemoryCacheStore::new();
        cache.set("k", b"v".to_vec(), Duration::from_secs(10)).await?;

        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(cache.contains_key("k"));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get("k").await?, None);
        assert!(cache.is_empty());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_are_swept_at_capacity() -> Result<(), CacheError> {
        let cache = InMemoryCacheStore::new().with_max_entries(100);
        for i in 0..100 {
            cache
                .set(&format!("search:{}", i), b"v".to_vec(), Duration::from_secs(1))
                .await?;
        }
        assert_eq!(cache.len(), 100);

        tokio::time::advance(Duration::from_secs(3600)).await;
        cache.set("search:fresh", b"v".to_vec(), Duration::from_secs(60)).await?;

        assert_eq!(cache.len(), 1);
        assert!(cache.contains_key("search:fresh"));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_cache_evicts_soonest_expiry() -> Result<(), CacheError> {
        let cache = InMemoryCacheStore::new().with_max_entries(3);
        cache.set("a", b"1".to_vec(), Duration::from_secs(30)).await?;
        cache.set("b", b"2".to_vec(), Duration::from_secs(10)).await?;
        cache.set("c", b"3".to_vec(), Duration::from_secs(60)).await?;

        cache.set("d", b"4".to_vec(), Duration::from_secs(60)).await?;

        assert_eq!(cache.len(), 3);
        assert!(!cache.contains_key("b"));
        assert!(cache.contains_key("a"));
        assert!(cache.contains_key("d"));

        // Overwriting an existing key never evicts.
        cache.set("a", b"5".to_vec(), Duration::from_secs(60)).await?;
        assert_eq!(cache.len(), 3);
        assert!(cache.contains_key("c"));
        Ok(())
    }

    #[tokio::test]
    async fn test_clones_share_entries() -> Result<(), CacheError> {
        let cache = InMemoryCacheStore::new();
        let other = cache.clone();
        cache.set("k", b"v".to_vec(), Duration::from_secs(60)).await?;
        assert_eq!(other.get("k").await?, Some(b"v".to_vec()));
        Ok(())
    }
}
