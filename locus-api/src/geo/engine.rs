//! Cache-through lookup engine.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use locus_core::{AddressList, ProviderError, TokenValidator, CACHE_TTL};
use locus_provider::GeoProvider;
use locus_storage::CacheStore;

use super::keys::{parse_coordinates, search_key};
use crate::context::CallContext;
use crate::error::{ApiError, ApiResult};
use crate::telemetry::metrics::{with_metrics, CacheOutcome, ProviderOutcome};

const OP_SEARCH: &str = "search";
const OP_GEOCODE: &str = "geocode";

/// Authenticated read-through cache in front of a geocoding provider.
///
/// Holds only shared handles; every request is independent. Concurrent
/// misses on the same key each reach the provider and the last write wins.
#[derive(Clone)]
pub struct GeoEngine {
    validator: Arc<dyn TokenValidator>,
    cache: Arc<dyn CacheStore>,
    provider: Arc<dyn GeoProvider>,
    cache_ttl: Duration,
}

impl std::fmt::Debug for GeoEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoEngine")
            .field("cache_ttl", &self.cache_ttl)
            .finish_non_exhaustive()
    }
}

impl GeoEngine {
    pub fn new(
        validator: Arc<dyn TokenValidator>,
        cache: Arc<dyn CacheStore>,
        provider: Arc<dyn GeoProvider>,
    ) -> Self {
        Self {
            validator,
            cache,
            provider,
            cache_ttl: CACHE_TTL,
        }
    }

    /// Override the entry lifetime (24 hours by default).
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Free-text address search. An empty result is a successful answer.
    pub async fn search_address(&self, ctx: &CallContext, query: &str) -> ApiResult<AddressList> {
        within_deadline(ctx, "address search", async {
            self.authenticate(ctx).await?;
            let key = search_key(query);

            self.cache_through(OP_SEARCH, &key, || async move {
                self.provider
                    .address_search(query)
                    .await
                    .map(AddressList::from)
                    .map_err(|e| provider_failure(OP_SEARCH, "failed to search address", e))
            })
            .await
        })
        .await
    }

    /// Reverse geocoding of a `"<lat>,<lon>"` string. No match is `NotFound`.
    pub async fn geocode(&self, ctx: &CallContext, address: &str) -> ApiResult<AddressList> {
        within_deadline(ctx, "geocode", async {
            self.authenticate(ctx).await?;
            let coords = parse_coordinates(address)?;
            let key = coords.cache_key();

            let list = self
                .cache_through(OP_GEOCODE, &key, || async move {
                    self.provider
                        .geocode(&coords.lat, &coords.lon)
                        .await
                        .map(AddressList::from)
                        .map_err(|e| provider_failure(OP_GEOCODE, "failed to geocode", e))
                })
                .await?;

            if list.is_empty() {
                return Err(ApiError::not_found("address not found"));
            }
            Ok(list)
        })
        .await
    }

    // ========================================================================
    // Steps
    // ========================================================================

    /// Check the caller's bearer token and return the account id it names.
    async fn authenticate(&self, ctx: &CallContext) -> ApiResult<String> {
        let token = ctx
            .token()
            .ok_or_else(|| ApiError::unauthenticated("no token provided"))?;

        match self.validator.validate(token, ctx.remaining()).await {
            Ok(validation) if validation.valid => {
                tracing::debug!(user_id = %validation.user_id, "Caller authenticated");
                Ok(validation.user_id)
            }
            Ok(_) => Err(ApiError::unauthenticated("token is not valid")),
            Err(e) => {
                tracing::warn!(error = %e, "Token validation unavailable");
                Err(ApiError::unauthenticated("invalid token"))
            }
        }
    }

    async fn cache_through<F, Fut>(
        &self,
        operation: &'static str,
        key: &str,
        fetch: F,
    ) -> ApiResult<AddressList>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<AddressList>>,
    {
        if let Some(cached) = self.lookup(operation, key).await {
            return Ok(cached);
        }

        let start = Instant::now();
        let result = fetch().await;
        let elapsed = start.elapsed().as_secs_f64();

        let list = match result {
            Ok(list) => list,
            Err(e) => {
                with_metrics(|m| m.record_provider_call(operation, ProviderOutcome::Error, elapsed));
                return Err(e);
            }
        };

        let outcome = if list.is_empty() {
            ProviderOutcome::Empty
        } else {
            ProviderOutcome::Success
        };
        with_metrics(|m| m.record_provider_call(operation, outcome, elapsed));

        if !list.is_empty() {
            self.store(key, &list).await;
        }
        Ok(list)
    }

    /// Read a cached list. Any failure is logged and served as a miss.
    async fn lookup(&self, operation: &'static str, key: &str) -> Option<AddressList> {
        let (outcome, cached) = match self.cache.get(key).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<AddressList>(&bytes) {
                Ok(list) => {
                    tracing::debug!(key, "Cache hit");
                    (CacheOutcome::Hit, Some(list))
                }
                Err(e) => {
                    tracing::warn!(key, error = %e, "Discarding undecodable cache entry");
                    (CacheOutcome::Error, None)
                }
            },
            Ok(None) => {
                tracing::debug!(key, "Cache miss");
                (CacheOutcome::Miss, None)
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Cache read failed, falling back to provider");
                (CacheOutcome::Error, None)
            }
        };

        with_metrics(|m| m.record_cache_lookup(operation, outcome));
        cached
    }

    /// Write a list to the cache. Failures are logged and swallowed.
    async fn store(&self, key: &str, list: &AddressList) {
        let bytes = match serde_json::to_vec(list) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to encode cache entry");
                return;
            }
        };

        if let Err(e) = self.cache.set(key, bytes, self.cache_ttl).await {
            tracing::warn!(key, error = %e, "Cache write failed");
        }
    }
}

fn provider_failure(operation: &str, context: &str, err: ProviderError) -> ApiError {
    tracing::error!(operation, error = %err, "Provider call failed");
    ApiError::internal_error(format!("{}: {}", context, err))
}

/// Run `fut` until the caller's deadline, if there is one. The future is
/// dropped when time runs out, so nothing after that point executes.
async fn within_deadline<T>(
    ctx: &CallContext,
    operation: &str,
    fut: impl Future<Output = ApiResult<T>>,
) -> ApiResult<T> {
    match ctx.deadline() {
        Some(deadline) => tokio::time::timeout_at(deadline, fut)
            .await
            .map_err(|_| ApiError::deadline_exceeded(operation))?,
        None => fut.await,
    }
}
