//! Process-local cache store.

use crate::error::{CacheError, Result};
use crate::{cache_key, is_expired, CacheStore};
use async_trait::async_trait;
use lookout_core::{AggregateResult, QueryType};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry {
    query_type: QueryType,
    payload: String,
    created_at: Instant,
}

/// In-memory cache with TTL.
///
/// Entries are stored serialized so a hit hands back an independent copy,
/// exactly as the persistent store would.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    ttl: Duration,
}

impl MemoryCache {
    /// Create an empty cache with the given time-to-live.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Configured time-to-live.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn try_get(&self, key: &str) -> Result<Option<AggregateResult>> {
        let entry = {
            let entries = self.entries.read().map_err(|_| CacheError::Poisoned)?;
            match entries.get(key) {
                Some(entry) => entry.clone(),
                None => return Ok(None),
            }
        };

        if is_expired(entry.created_at.elapsed(), self.ttl) {
            let mut entries = self.entries.write().map_err(|_| CacheError::Poisoned)?;
            // Only drop the entry we judged stale; a concurrent writer may
            // already have replaced it.
            if entries
                .get(key)
                .is_some_and(|current| current.created_at == entry.created_at)
            {
                entries.remove(key);
            }
            tracing::debug!(key, "Cache entry expired");
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&entry.payload)?))
    }

    fn try_set(&self, key: String, query_type: QueryType, result: &AggregateResult) -> Result<()> {
        let payload = serde_json::to_string(result)?;
        let mut entries = self.entries.write().map_err(|_| CacheError::Poisoned)?;
        entries.insert(
            key,
            Entry {
                query_type,
                payload,
                created_at: Instant::now(),
            },
        );
        Ok(())
    }

    fn try_clear(&self, query_type: Option<QueryType>) -> Result<usize> {
        let mut entries = self.entries.write().map_err(|_| CacheError::Poisoned)?;
        let before = entries.len();
        match query_type {
            None => entries.clear(),
            Some(wanted) => entries.retain(|_, entry| entry.query_type != wanted),
        }
        Ok(before - entries.len())
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, query: &str, query_type: QueryType) -> Option<AggregateResult> {
        let key = cache_key(query_type, query);
        match self.try_get(&key) {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    async fn set(&self, query: &str, query_type: QueryType, result: &AggregateResult) -> bool {
        let key = cache_key(query_type, query);
        match self.try_set(key, query_type, result) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Cache write failed, skipping");
                false
            }
        }
    }

    async fn clear(&self, query_type: Option<QueryType>) -> usize {
        match self.try_clear(query_type) {
            Ok(removed) => {
                tracing::info!(removed, ?query_type, "Cleared cache entries");
                removed
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cache clear failed");
                0
            }
        }
    }
}
