//! Behaviour shared by every cache store, exercised through `dyn CacheStore`.

use futures::future::join_all;
use lookout_cache::{CacheStore, MemoryCache, SqliteCache};
use lookout_core::{AggregateResult, Fields, Identifier, ProbeResult, QueryType};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn sample(query: &str, found: usize) -> AggregateResult {
    let id = Identifier::parse(QueryType::Username, query).expect("valid username");
    let results = (0..found)
        .map(|i| {
            let mut fields = Fields::new();
            fields.insert("index", i.to_string());
            let url = format!("https://s{i}.example/{query}");
            ProbeResult::found(format!("Source{i}"), url, fields)
        })
        .collect();
    AggregateResult::from_probe_results(id, results, None)
}

async fn stores(dir: &TempDir) -> Vec<(&'static str, Arc<dyn CacheStore>)> {
    let sqlite = SqliteCache::open(dir.path().join("cache.db"), Duration::from_secs(60))
        .await
        .expect("open sqlite cache");
    let memory: Arc<dyn CacheStore> = Arc::new(MemoryCache::new(Duration::from_secs(60)));
    let sqlite: Arc<dyn CacheStore> = Arc::new(sqlite);
    vec![("memory", memory), ("sqlite", sqlite)]
}

#[tokio::test]
async fn test_round_trip_preserves_result() {
    let dir = TempDir::new().expect("temp dir");
    for (name, store) in stores(&dir).await {
        let result = sample("octocat", 3);
        assert!(store.set("octocat", QueryType::Username, &result).await, "{name}");
        let hit = store.get("octocat", QueryType::Username).await;
        assert_eq!(hit.as_ref(), Some(&result), "{name}");
    }
}

#[tokio::test]
async fn test_types_do_not_collide() {
    let dir = TempDir::new().expect("temp dir");
    for (name, store) in stores(&dir).await {
        store
            .set("octocat", QueryType::Username, &sample("octocat", 1))
            .await;
        assert!(store.get("octocat", QueryType::Email).await.is_none(), "{name}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_readers_never_see_torn_entries() {
    let dir = TempDir::new().expect("temp dir");
    for (name, store) in stores(&dir).await {
        let writers = (0..8).map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .set("octocat", QueryType::Username, &sample("octocat", i % 4 + 1))
                    .await
            })
        });
        let readers = (0..16).map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.get("octocat", QueryType::Username).await })
        });

        let (written, read) = tokio::join!(join_all(writers), join_all(readers));

        assert!(written.into_iter().all(|w| w.expect("writer task")), "{name}");
        for hit in read.into_iter().filter_map(|r| r.expect("reader task")) {
            assert_eq!(hit.total_checked, hit.probe_results.len(), "{name}");
            assert_eq!(hit.total_found, hit.total_checked, "{name}");
        }
        assert!(store.get("octocat", QueryType::Username).await.is_some(), "{name}");
    }
}
