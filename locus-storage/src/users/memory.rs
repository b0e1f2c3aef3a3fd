//! In-process account store for tests and single-node development.

use super::{NewUser, UserRecord, UserStore};
use async_trait::async_trait;
use chrono::Utc;
use locus_core::{Pagination, StoreError};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct InMemoryUserStore {
    // Insertion order; listing sorts newest first.
    users: Arc<RwLock<Vec<UserRecord>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Database {
        reason: "user store lock poisoned".to_string(),
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::AlreadyExists);
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.push(record.clone());
        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn list(&self, page: Pagination) -> Result<(Vec<UserRecord>, i64), StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        let total = users.len() as i64;

        // Reverse first so the stable sort keeps later inserts ahead on ties.
        let mut sorted: Vec<UserRecord> = users.iter().rev().cloned().collect();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        let rows = sorted.into_iter().skip(offset).take(limit).collect();
        Ok((rows, total))
    }
}
