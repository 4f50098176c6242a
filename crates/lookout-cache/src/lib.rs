//! Lookout Cache - TTL-bounded store of aggregate results.
//!
//! Results are keyed by query type and normalized query. Cache failures never
//! surface to callers: a read that fails is a miss and a write that fails is
//! skipped, both logged at `warn`.
//!
//! Two stores are provided:
//!
//! - [`SqliteCache`] - persistent store backed by `SQLx` with embedded migrations
//! - [`MemoryCache`] - process-local store for tests and one-shot runs

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod error;
pub mod memory;
pub mod migrations;
pub mod sqlite;

pub use error::{CacheError, Result};
pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

use async_trait::async_trait;
use lookout_core::{AggregateResult, QueryType};
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Keyed store of [`AggregateResult`]s with a time-to-live.
///
/// Implementations must be safe to share across concurrent lookups. A reader
/// never observes a partially written entry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Return the stored result when present and younger than the TTL.
    ///
    /// An expired entry is removed and reported as a miss.
    async fn get(&self, query: &str, query_type: QueryType) -> Option<AggregateResult>;

    /// Store or replace the result for this key, stamped with the current time.
    ///
    /// Returns whether the entry was persisted.
    async fn set(&self, query: &str, query_type: QueryType, result: &AggregateResult) -> bool;

    /// Remove every entry, or only entries of one query type.
    ///
    /// Returns the number of entries removed.
    async fn clear(&self, query_type: Option<QueryType>) -> usize;
}

/// Derive the storage key for a query.
///
/// Case-insensitive: `("username", "Octocat")` and `("USERNAME", "octocat")`
/// share a key.
#[must_use]
pub fn cache_key(query_type: QueryType, query: &str) -> String {
    let material = format!("{}:{}", query_type.as_str(), query).to_lowercase();
    hex::encode(Sha256::digest(material.as_bytes()))
}

/// Whether an entry of the given age has outlived `ttl`.
pub(crate) fn is_expired(age: Duration, ttl: Duration) -> bool {
    age > ttl
}
