//! Locus Storage
//!
//! Storage backends behind two narrow traits:
//!
//! - [`CacheStore`]: byte-oriented key-value cache with per-entry TTL, used
//!   by the geo lookup path. Backed by an in-process map or a shared Redis.
//! - [`UserStore`]: account persistence for the user service. Backed by an
//!   in-process store or PostgreSQL.

pub mod cache;
pub mod users;

pub use cache::{CacheStats, CacheStore, InMemoryCacheStore, RedisCacheStore, DEFAULT_MAX_ENTRIES};
pub use users::{
    hash_password, verify_password, InMemoryUserStore, NewUser, PgUserStore, UserRecord,
    UserStore,
};
