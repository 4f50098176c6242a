//! Cache error types.
//!
//! These never escape the [`CacheStore`](crate::CacheStore) surface: the store
//! logs them and degrades to a miss or a skipped write.

use thiserror::Error;

/// Cache-specific errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to open or create the backing database.
    #[error("failed to open cache: {0}")]
    Open(String),

    /// Migration execution failed.
    #[error("migration failed: {0}")]
    Migration(String),

    /// Payload could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// In-process store lock was poisoned.
    #[error("cache lock poisoned")]
    Poisoned,

    /// Underlying `SQLx` error.
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// I/O error while preparing the cache location.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
