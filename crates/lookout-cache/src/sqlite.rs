//! Persistent cache store backed by `SQLite`.
//!
//! One row per key holds the serialized [`AggregateResult`], its query type and
//! a millisecond creation timestamp. Writes are single-statement upserts, so a
//! concurrent reader sees either the old row or the new one.

use crate::error::{CacheError, Result};
use crate::migrations::prepare_schema;
use crate::{cache_key, is_expired, CacheStore};
use async_trait::async_trait;
use chrono::Utc;
use lookout_core::{AggregateResult, QueryType};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::time::Duration;

/// `SQLite`-backed cache with TTL.
#[derive(Debug, Clone)]
pub struct SqliteCache {
    pool: Pool<Sqlite>,
    ttl: Duration,
    schema_version: i64,
}

impl SqliteCache {
    /// Open (creating if needed) the cache database at `path` and run migrations.
    ///
    /// Missing parent directories are created.
    pub async fn open(path: impl AsRef<Path>, ttl: Duration) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let connect_options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await
            .map_err(|e| CacheError::Open(format!("{}: {e}", path.display())))?;

        let schema_version = prepare_schema(&pool).await?;

        tracing::info!(
            schema_version,
            "Cache database opened at {}",
            path.display()
        );

        Ok(Self {
            pool,
            ttl,
            schema_version,
        })
    }

    /// Open a private in-memory database.
    ///
    /// The pool is pinned to a single long-lived connection so the data
    /// survives for the lifetime of this value.
    pub async fn in_memory(ttl: Duration) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| CacheError::Open(format!("in-memory database: {e}")))?;

        let schema_version = prepare_schema(&pool).await?;

        Ok(Self {
            pool,
            ttl,
            schema_version,
        })
    }

    /// Underlying `SQLx` pool.
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Configured time-to-live.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Schema version the database was brought to on open.
    #[must_use]
    pub fn schema_version(&self) -> i64 {
        self.schema_version
    }

    /// Number of stored rows, expired ones included.
    pub async fn len(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cache_entries")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Whether the store holds no rows.
    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Close the pool gracefully.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("Cache database closed");
    }

    async fn try_get(&self, key: &str) -> Result<Option<AggregateResult>> {
        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT payload, created_at FROM cache_entries WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        let Some((payload, created_at)) = row else {
            return Ok(None);
        };

        let age_ms = Utc::now().timestamp_millis().saturating_sub(created_at).max(0);
        let age = Duration::from_millis(u64::try_from(age_ms).unwrap_or(0));

        if is_expired(age, self.ttl) {
            // Conditional on the observed timestamp so a fresh concurrent
            // upsert is not deleted.
            sqlx::query("DELETE FROM cache_entries WHERE key = ? AND created_at = ?")
                .bind(key)
                .bind(created_at)
                .execute(&self.pool)
                .await?;
            tracing::debug!(key, "Cache entry expired");
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&payload)?))
    }

    async fn try_set(
        &self,
        key: &str,
        query_type: QueryType,
        result: &AggregateResult,
    ) -> Result<()> {
        let payload = serde_json::to_string(result)?;

        sqlx::query(
            "INSERT INTO cache_entries (key, query_type, payload, created_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET
                query_type = excluded.query_type,
                payload = excluded.payload,
                created_at = excluded.created_at",
        )
        .bind(key)
        .bind(query_type.as_str())
        .bind(payload)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn try_clear(&self, query_type: Option<QueryType>) -> Result<u64> {
        let outcome = match query_type {
            None => sqlx::query("DELETE FROM cache_entries").execute(&self.pool).await?,
            Some(query_type) => {
                sqlx::query("DELETE FROM cache_entries WHERE query_type = ?")
                    .bind(query_type.as_str())
                    .execute(&self.pool)
                    .await?
            }
        };
        Ok(outcome.rows_affected())
    }
}

#[async_trait]
impl CacheStore for SqliteCache {
    async fn get(&self, query: &str, query_type: QueryType) -> Option<AggregateResult> {
        let key = cache_key(query_type, query);
        match self.try_get(&key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    async fn set(&self, query: &str, query_type: QueryType, result: &AggregateResult) -> bool {
        let key = cache_key(query_type, query);
        match self.try_set(&key, query_type, result).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Cache write failed, skipping");
                false
            }
        }
    }

    async fn clear(&self, query_type: Option<QueryType>) -> usize {
        match self.try_clear(query_type).await {
            Ok(removed) => {
                tracing::info!(removed, ?query_type, "Cleared cache entries");
                usize::try_from(removed).unwrap_or(usize::MAX)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cache clear failed");
                0
            }
        }
    }
}
