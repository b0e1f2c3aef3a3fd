//! Locus Test Utilities
//!
//! In-memory fakes for the seams of the lookup path, shared by the test
//! suites of every crate:
//! - [`FakeProvider`]: scripted geocoding provider that counts calls
//! - [`FakeTokenValidator`]: accepts, rejects or fails every token
//! - [`RecordingCache`]: in-memory cache that counts traffic and can be
//!   told to fail
//! - fixtures and proptest generators for addresses

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use proptest::prelude::*;

pub use locus_core::{
    Address, AddressList, CacheError, ProviderError, TokenValidation, TokenValidator,
    ValidatorError,
};
use locus_provider::GeoProvider;
use locus_storage::{CacheStore, InMemoryCacheStore};

// ============================================================================
// FIXTURES
// ============================================================================

/// A real DaData answer for "Москва Сухаревская 11".
pub fn sukharevskaya() -> Address {
    Address::new("Москва", "Сухаревская", "11", "55.77412", "37.624065")
}

pub fn tverskaya() -> Address {
    Address::new("Москва", "Тверская", "1", "55.757718", "37.612466")
}

pub fn address_strategy() -> impl Strategy<Value = Address> {
    (
        "[А-Яа-я ]{0,12}",
        "[А-Яа-я ]{0,12}",
        "[0-9]{0,3}",
        "-?[0-9]{1,2}\\.[0-9]{1,6}",
        "-?[0-9]{1,3}\\.[0-9]{1,6}",
    )
        .prop_map(|(city, street, house, lat, lon)| Address::new(city, street, house, lat, lon))
}

pub fn address_list_strategy() -> impl Strategy<Value = Vec<Address>> {
    prop::collection::vec(address_strategy(), 1..5)
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

// ============================================================================
// PROVIDER
// ============================================================================

/// Geocoding provider with scripted answers.
///
/// Every call returns the currently scripted result for its operation.
#[derive(Debug, Clone)]
pub struct FakeProvider {
    inner: Arc<FakeProviderInner>,
}

#[derive(Debug)]
struct FakeProviderInner {
    search_result: Mutex<Result<Vec<Address>, ProviderError>>,
    geocode_result: Mutex<Result<Vec<Address>, ProviderError>>,
    search_calls: AtomicUsize,
    geocode_calls: AtomicUsize,
    last_query: Mutex<Option<String>>,
    last_coordinates: Mutex<Option<(String, String)>>,
    delay: Mutex<Option<Duration>>,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self::returning(Vec::new())
    }
}

impl FakeProvider {
    /// Both operations answer with `addresses`.
    pub fn returning(addresses: Vec<Address>) -> Self {
        Self {
            inner: Arc::new(FakeProviderInner {
                search_result: Mutex::new(Ok(addresses.clone())),
                geocode_result: Mutex::new(Ok(addresses)),
                search_calls: AtomicUsize::new(0),
                geocode_calls: AtomicUsize::new(0),
                last_query: Mutex::new(None),
                last_coordinates: Mutex::new(None),
                delay: Mutex::new(None),
            }),
        }
    }

    /// Both operations fail with `error`.
    pub fn failing(error: ProviderError) -> Self {
        let provider = Self::default();
        provider.set_search_result(Err(error.clone()));
        provider.set_geocode_result(Err(error));
        provider
    }

    pub fn set_search_result(&self, result: Result<Vec<Address>, ProviderError>) {
        *lock(&self.inner.search_result) = result;
    }

    pub fn set_geocode_result(&self, result: Result<Vec<Address>, ProviderError>) {
        *lock(&self.inner.geocode_result) = result;
    }

    /// Sleep this long before answering.
    pub fn with_delay(self, delay: Duration) -> Self {
        *lock(&self.inner.delay) = Some(delay);
        self
    }

    pub fn search_calls(&self) -> usize {
        self.inner.search_calls.load(Ordering::SeqCst)
    }

    pub fn geocode_calls(&self) -> usize {
        self.inner.geocode_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.search_calls() + self.geocode_calls()
    }

    pub fn last_query(&self) -> Option<String> {
        lock(&self.inner.last_query).clone()
    }

    pub fn last_coordinates(&self) -> Option<(String, String)> {
        lock(&self.inner.last_coordinates).clone()
    }

    async fn pause(&self) {
        let delay = *lock(&self.inner.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl GeoProvider for FakeProvider {
    async fn address_search(&self, query: &str) -> Result<Vec<Address>, ProviderError> {
        self.inner.search_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.inner.last_query) = Some(query.to_string());
        self.pause().await;
        lock(&self.inner.search_result).clone()
    }

    async fn geocode(&self, lat: &str, lon: &str) -> Result<Vec<Address>, ProviderError> {
        self.inner.geocode_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.inner.last_coordinates) = Some((lat.to_string(), lon.to_string()));
        self.pause().await;
        lock(&self.inner.geocode_result).clone()
    }
}

// ============================================================================
// TOKEN VALIDATOR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Verdict {
    Accept(String),
    Reject,
    Fail,
}

/// Token validator with a fixed verdict.
#[derive(Debug, Clone)]
pub struct FakeTokenValidator {
    verdict: Verdict,
    calls: Arc<AtomicUsize>,
    last_token: Arc<Mutex<Option<String>>>,
    last_timeout: Arc<Mutex<Option<Duration>>>,
}

impl FakeTokenValidator {
    fn with_verdict(verdict: Verdict) -> Self {
        Self {
            verdict,
            calls: Arc::new(AtomicUsize::new(0)),
            last_token: Arc::new(Mutex::new(None)),
            last_timeout: Arc::new(Mutex::new(None)),
        }
    }

    /// Every token is valid for `user_id`.
    pub fn accepting(user_id: impl Into<String>) -> Self {
        Self::with_verdict(Verdict::Accept(user_id.into()))
    }

    /// Every token is answered with `valid: false`.
    pub fn rejecting() -> Self {
        Self::with_verdict(Verdict::Reject)
    }

    /// Every call fails as if the auth service were down.
    pub fn unavailable() -> Self {
        Self::with_verdict(Verdict::Fail)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_token(&self) -> Option<String> {
        lock(&self.last_token).clone()
    }

    pub fn last_timeout(&self) -> Option<Duration> {
        *lock(&self.last_timeout)
    }
}

#[async_trait]
impl TokenValidator for FakeTokenValidator {
    async fn validate(
        &self,
        token: &str,
        timeout: Option<Duration>,
    ) -> Result<TokenValidation, ValidatorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_token) = Some(token.to_string());
        *lock(&self.last_timeout) = timeout;

        match &self.verdict {
            Verdict::Accept(user_id) => Ok(TokenValidation::valid(user_id.clone())),
            Verdict::Reject => Ok(TokenValidation::invalid()),
            Verdict::Fail => Err(ValidatorError::Unavailable {
                reason: "connection refused".to_string(),
            }),
        }
    }
}

// ============================================================================
// CACHE
// ============================================================================

/// In-memory cache that counts traffic and can be switched to fail.
#[derive(Debug, Clone, Default)]
pub struct RecordingCache {
    inner: InMemoryCacheStore,
    gets: Arc<AtomicUsize>,
    sets: Arc<AtomicUsize>,
    fail_gets: Arc<AtomicBool>,
    fail_sets: Arc<AtomicBool>,
}

impl RecordingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache whose every GET and SET fails.
    pub fn broken() -> Self {
        let cache = Self::new();
        cache.fail_gets(true);
        cache.fail_sets(true);
        cache
    }

    pub fn fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    pub fn fail_sets(&self, fail: bool) {
        self.fail_sets.store(fail, Ordering::SeqCst);
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Read an entry without counting it.
    pub async fn peek(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.get(key).await.ok().flatten()
    }

    /// Store raw bytes without counting them, e.g. to plant a corrupt entry.
    pub async fn plant(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        self.inner.set(key, value, Duration::from_secs(3600)).await
    }
}

#[async_trait]
impl CacheStore for RecordingCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(CacheError::Connection {
                reason: "cache unreachable".to_string(),
            });
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        if self.fail_sets.load(Ordering::SeqCst) {
            return Err(CacheError::Command {
                reason: "READONLY You can't write against a read only replica".to_string(),
            });
        }
        self.inner.set(key, value, ttl).await
    }
}
