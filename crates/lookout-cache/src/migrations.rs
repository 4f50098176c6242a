//! `cache_entries` schema management.
//!
//! The schema ships inside the binary (`migrations/`). Every store applies it
//! on open, so a cache file written by an older build is brought forward
//! before its first read.

use crate::error::{CacheError, Result};
use sqlx::{Pool, Sqlite};

/// Apply any pending schema changes and return the resulting version.
pub async fn prepare_schema(pool: &Pool<Sqlite>) -> Result<i64> {
    let before = schema_version(pool).await?;

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| CacheError::Migration(format!("cache schema upgrade failed: {e}")))?;

    let after = schema_version(pool).await?;
    if after != before {
        tracing::info!(from = before, to = after, "Cache schema upgraded");
    } else {
        tracing::debug!(version = after, "Cache schema up to date");
    }
    Ok(after)
}

/// Latest applied schema version, or 0 for a database never opened as a cache.
pub async fn schema_version(pool: &Pool<Sqlite>) -> Result<i64> {
    let tracked: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;

    if tracked == 0 {
        return Ok(0);
    }

    let version: Option<i64> =
        sqlx::query_scalar("SELECT MAX(version) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;
    Ok(version.unwrap_or(0))
}
