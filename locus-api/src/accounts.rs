//! Account operations behind the user service.
//!
//! Password hashing and verification are CPU-bound and run on the blocking
//! pool so they never stall the async workers.

use std::sync::Arc;

use locus_core::{Pagination, StoreError, UserPage, UserProfile};
use locus_storage::{hash_password, verify_password, NewUser, UserStore};

use crate::error::{ApiError, ApiResult};

pub const CREDENTIALS_REQUIRED: &str = "email and password are required";

/// Account service over a [`UserStore`].
#[derive(Clone)]
pub struct UserAccounts {
    store: Arc<dyn UserStore>,
}

impl UserAccounts {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Create an account. The password is stored as a salted argon2 hash.
    pub async fn create_user(&self, email: &str, password: &str) -> ApiResult<UserProfile> {
        if email.is_empty() || password.is_empty() {
            return Err(ApiError::invalid_argument(CREDENTIALS_REQUIRED));
        }

        let password = password.to_string();
        let password_hash = run_blocking(move || hash_password(&password)).await?;

        let record = self
            .store
            .insert(NewUser {
                email: email.to_string(),
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %record.id, "User created");
        Ok(record.to_profile())
    }

    /// Look up an account by email. When `password` is given it must match.
    pub async fn get_profile(&self, email: &str, password: Option<&str>) -> ApiResult<UserProfile> {
        let record = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(StoreError::NotFound)?;

        if let Some(password) = password {
            let password = password.to_string();
            let hash = record.password_hash.clone();
            let matches = run_blocking(move || verify_password(&password, &hash)).await?;
            if !matches {
                tracing::debug!(user_id = %record.id, "Password mismatch");
                return Err(StoreError::InvalidCredentials.into());
            }
        }

        Ok(record.to_profile())
    }

    /// One page of accounts, newest first.
    pub async fn list_users(&self, page: Pagination) -> ApiResult<UserPage> {
        let (records, total) = self.store.list(page).await?;
        Ok(UserPage {
            users: records.iter().map(|r| r.to_profile()).collect(),
            total: i32::try_from(total).unwrap_or(i32::MAX),
        })
    }
}

async fn run_blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::internal_error(format!("Password task failed: {}", e)))?
        .map_err(ApiError::from)
}
