//! Shared constants.

use std::time::Duration;

/// Cache key prefix for free-text address searches.
pub const SEARCH_KEY_PREFIX: &str = "search:";

/// Cache key prefix for reverse-geocoding lookups.
pub const GEO_KEY_PREFIX: &str = "geo:";

/// Lifetime of a cached provider response.
pub const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Lifetime of an issued bearer token, in seconds.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

pub const DEFAULT_PAGE: i32 = 1;
pub const DEFAULT_PER_PAGE: i32 = 10;

/// Metadata key carrying the caller's bearer token on internal RPCs.
pub const AUTHORIZATION_METADATA_KEY: &str = "authorization";

/// Scheme prefix tolerated in front of a bearer token.
pub const BEARER_PREFIX: &str = "Bearer ";
