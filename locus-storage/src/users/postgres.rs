//! PostgreSQL account store.

use super::{NewUser, UserRecord, UserStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use locus_core::{Pagination, StoreError};
use tokio_postgres::error::SqlState;
use tokio_postgres::{NoTls, Row};
use uuid::Uuid;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) UNIQUE NOT NULL,
    password_hash VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
";

#[derive(Clone)]
pub struct PgUserStore {
    pool: Pool,
}

impl std::fmt::Debug for PgUserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgUserStore")
            .field("pool_size", &self.pool.status().size)
            .finish()
    }
}

impl PgUserStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a pool from a `postgres://` connection URL.
    pub fn connect(database_url: &str, max_size: usize) -> Result<Self, StoreError> {
        let mut cfg = Config::new();
        cfg.url = Some(database_url.to_string());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        cfg.pool = Some(deadpool_postgres::PoolConfig::new(max_size));

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| StoreError::Database {
                reason: format!("failed to create pool: {}", e),
            })?;
        Ok(Self::new(pool))
    }

    /// Create the `users` table and its index when missing.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        let conn = self.get_conn().await?;
        conn.batch_execute(SCHEMA).await.map_err(db_error)
    }

    async fn get_conn(&self) -> Result<deadpool_postgres::Object, StoreError> {
        self.pool.get().await.map_err(|e| StoreError::Database {
            reason: e.to_string(),
        })
    }
}

fn db_error(err: tokio_postgres::Error) -> StoreError {
    if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
        return StoreError::AlreadyExists;
    }
    StoreError::Database {
        reason: err.to_string(),
    }
}

fn row_to_record(row: &Row) -> UserRecord {
    UserRecord {
        id: row.get::<_, Uuid>("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at: row.get::<_, DateTime<Utc>>("created_at"),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_one(
                "INSERT INTO users (email, password_hash) VALUES ($1, $2) \
                 RETURNING id, email, password_hash, created_at",
                &[&user.email, &user.password_hash],
            )
            .await
            .map_err(db_error)?;
        Ok(row_to_record(&row))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
                &[&email],
            )
            .await
            .map_err(db_error)?;
        Ok(row.as_ref().map(row_to_record))
    }

    async fn list(&self, page: Pagination) -> Result<(Vec<UserRecord>, i64), StoreError> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                "SELECT id, email, password_hash, created_at FROM users \
                 ORDER BY created_at DESC LIMIT $1 OFFSET $2",
                &[&page.limit(), &page.offset()],
            )
            .await
            .map_err(db_error)?;

        let total: i64 = conn
            .query_one("SELECT COUNT(*) FROM users", &[])
            .await
            .map_err(db_error)?
            .get(0);

        Ok((rows.iter().map(row_to_record).collect(), total))
    }
}
