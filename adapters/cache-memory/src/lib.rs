//! In-process `Cache` implementation covering the full keyspace in spec §6:
//! plain get/set with optional TTL, a list used as a blocking queue
//! (`queue:extraction`/`queue:dlq`), and a hash used for retry counters.
//! Grounded on `adapters/in_memory/src/lib.rs`'s `Arc<RwLock<...>>`
//! store-plus-indices pattern, generalized from a graph store to the
//! generic KV/list/hash shapes `kgx_core::traits::Cache` names.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::{Notify, RwLock};
use tracing::debug;

use kgx_core::errors::CacheResult;
use kgx_core::traits::Cache;

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map(|exp| now <= exp).map(|fresh| !fresh).unwrap_or(false)
    }
}

#[derive(Default)]
struct MemoryStore {
    values: HashMap<String, Entry>,
    lists: HashMap<String, VecDeque<String>>,
    hashes: HashMap<String, HashMap<String, i64>>,
}

/// A process-wide in-memory `Cache`, suitable for tests and single-process
/// deployments where a real Redis-compatible store isn't available. One
/// instance is meant to be shared (via `Arc`) across the orchestrator, the
/// Tier-C client, and the worker, matching spec §5's "one long-lived client
/// per process" contract.
pub struct InMemoryCache {
    store: RwLock<MemoryStore>,
    /// Notified whenever any list receives a push, so `blpop` waiters can
    /// recheck without busy-polling.
    pushed: Notify,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(MemoryStore::default()),
            pushed: Notify::new(),
        }
    }

    /// Number of live (unexpired) keys — a diagnostic helper, not part of
    /// the `Cache` contract.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.store
            .read()
            .await
            .values
            .values()
            .filter(|e| !e.is_expired(now))
            .count()
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let store = self.store.read().await;
        let now = Instant::now();
        Ok(store
            .values
            .get(key)
            .filter(|e| !e.is_expired(now))
            .map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> CacheResult<()> {
        let mut store = self.store.write().await;
        store.values.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: ttl.map(|d| Instant::now() + d),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.store.write().await.values.remove(key);
        Ok(())
    }

    async fn lpush(&self, key: &str, value: String) -> CacheResult<()> {
        {
            let mut store = self.store.write().await;
            store.lists.entry(key.to_string()).or_default().push_front(value);
        }
        self.pushed.notify_waiters();
        Ok(())
    }

    async fn blpop(&self, key: &str, timeout: Duration) -> CacheResult<Option<String>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(value) = {
                let mut store = self.store.write().await;
                store.lists.get_mut(key).and_then(|list| list.pop_back())
            } {
                return Ok(Some(value));
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                debug!(key, "blpop timed out");
                return Ok(None);
            }

            // Either a push wakes us early, or the remaining budget elapses
            // and we re-check once more before reporting a timeout.
            let _ = tokio::time::timeout(remaining, self.pushed.notified()).await;
        }
    }

    async fn hincrby(&self, hash: &str, field: &str, delta: i64) -> CacheResult<i64> {
        let mut store = self.store.write().await;
        let counters = store.hashes.entry(hash.to_string()).or_default();
        let entry = counters.entry(field.to_string()).or_insert(0);
        *entry += delta;
        Ok(*entry)
    }

    async fn hget(&self, hash: &str, field: &str) -> CacheResult<i64> {
        let store = self.store.read().await;
        Ok(store
            .hashes
            .get(hash)
            .and_then(|counters| counters.get(field))
            .copied()
            .unwrap_or(0))
    }

    async fn hdel(&self, hash: &str, field: &str) -> CacheResult<()> {
        let mut store = self.store.write().await;
        if let Some(counters) = store.hashes.get_mut(hash) {
            counters.remove(field);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_set_round_trips() {
        let cache = InMemoryCache::new();
        assert_eq!(cache.get("k").await.unwrap(), None);
        cache.set("k", "v".to_string(), None).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));
        cache.delete("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_with_ttl_expires() {
        let cache = InMemoryCache::new();
        cache
            .set("k", "v".to_string(), Some(Duration::from_millis(10)))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn lpush_blpop_is_fifo() {
        let cache = InMemoryCache::new();
        cache.lpush("q", "first".to_string()).await.unwrap();
        cache.lpush("q", "second".to_string()).await.unwrap();
        assert_eq!(
            cache.blpop("q", Duration::from_millis(50)).await.unwrap(),
            Some("first".to_string())
        );
        assert_eq!(
            cache.blpop("q", Duration::from_millis(50)).await.unwrap(),
            Some("second".to_string())
        );
    }

    #[tokio::test]
    async fn blpop_times_out_on_empty_queue() {
        let cache = InMemoryCache::new();
        let result = cache.blpop("empty", Duration::from_millis(20)).await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn blpop_wakes_on_concurrent_push() {
        let cache = Arc::new(InMemoryCache::new());
        let waiter = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.blpop("q", Duration::from_secs(5)).await.unwrap() })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        cache.lpush("q", "hello".to_string()).await.unwrap();
        let result = waiter.await.unwrap();
        assert_eq!(result, Some("hello".to_string()));
    }

    #[tokio::test]
    async fn hincrby_accumulates_and_hdel_clears() {
        let cache = InMemoryCache::new();
        assert_eq!(cache.hget("retry_counts", "job-1").await.unwrap(), 0);
        assert_eq!(cache.hincrby("retry_counts", "job-1", 1).await.unwrap(), 1);
        assert_eq!(cache.hincrby("retry_counts", "job-1", 1).await.unwrap(), 2);
        cache.hdel("retry_counts", "job-1").await.unwrap();
        assert_eq!(cache.hget("retry_counts", "job-1").await.unwrap(), 0);
    }
}
