//! Account storage.

mod memory;
mod password;
mod postgres;

pub use memory::InMemoryUserStore;
pub use password::{hash_password, verify_password};
pub use postgres::PgUserStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use locus_core::{Pagination, StoreError, UserProfile};
use uuid::Uuid;

/// A stored account.
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Public view of the account.
    pub fn to_profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.to_string(),
            email: self.email.clone(),
            created_at: self.created_at.to_string(),
        }
    }
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Input for [`UserStore::insert`]. The password is already hashed.
#[derive(Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
}

/// Account persistence.
///
/// Emails are unique; a second insert with the same email fails with
/// [`StoreError::AlreadyExists`].
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// One page of accounts, newest first, plus the total number of accounts.
    async fn list(&self, page: Pagination) -> Result<(Vec<UserRecord>, i64), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_debug_redacts_hash() {
        let record = UserRecord {
            id: Uuid::nil(),
            email: "a@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc.timestamp_opt(1704067200, 0).single().unwrap_or_default(),
        };
        let debug = format!("{:?}", record);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("$argon2id$secret"));
    }

    #[test]
    fn test_profile_has_readable_timestamp() {
        let record = UserRecord {
            id: Uuid::nil(),
            email: "a@example.com".to_string(),
            password_hash: String::new(),
            created_at: Utc.timestamp_opt(1704067200, 0).single().unwrap_or_default(),
        };
        let profile = record.to_profile();
        assert_eq!(profile.id, "00000000-0000-0000-0000-000000000000");
        assert_eq!(profile.created_at, "2024-01-01 00:00:00 UTC");
    }
}
