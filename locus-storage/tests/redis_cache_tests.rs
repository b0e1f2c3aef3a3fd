//! Redis-backed cache tests. Require a reachable server at `LOCUS_TEST_REDIS`
//! (default `127.0.0.1:6379`).
#![cfg(feature = "redis-tests")]

use locus_core::CacheError;
use locus_storage::{CacheStore, RedisCacheStore};
use std::time::Duration;

fn store() -> Result<RedisCacheStore, CacheError> {
    let addr = std::env::var("LOCUS_TEST_REDIS").unwrap_or_else(|_| "127.0.0.1:6379".to_string());
    RedisCacheStore::connect(&addr, 4, Duration::from_secs(2))
}

#[tokio::test]
async fn redis_set_then_get_round_trips_bytes() -> Result<(), CacheError> {
    let cache = store()?;
    let key = format!("search:redis-test-{}", uuid::Uuid::new_v4());

    assert_eq!(cache.get(&key).await?, None);
    cache
        .set(&key, br#"{"addresses":[]}"#.to_vec(), Duration::from_secs(30))
        .await?;
    assert_eq!(cache.get(&key).await?, Some(br#"{"addresses":[]}"#.to_vec()));
    Ok(())
}

#[tokio::test]
async fn redis_entries_expire() -> Result<(), CacheError> {
    let cache = store()?;
    let key = format!("geo:redis-ttl-{}", uuid::Uuid::new_v4());

    cache.set(&key, b"v".to_vec(), Duration::from_secs(1)).await?;
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(cache.get(&key).await?, None);
    Ok(())
}

#[tokio::test]
async fn unreachable_server_reports_connection_error() {
    let cache = match RedisCacheStore::connect("127.0.0.1:1", 1, Duration::from_millis(200)) {
        Ok(cache) => cache,
        Err(err) => panic!("pool creation should be lazy: {err}"),
    };
    let result = cache.get("search:anything").await;
    assert!(matches!(result, Err(CacheError::Connection { .. })));
}
