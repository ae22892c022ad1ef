//! Tier C LLM client: SHA-256 cache-fronted batching over any
//! `LlmConnector` (spec §4.5/§6). Grounded on
//! `original_source/packages/extraction/tier_c/llm_client.py`'s
//! cache-then-call-then-save sequencing and its `batch_size` chunking, but
//! windows within a batch run concurrently here (`futures::future::join_all`)
//! rather than the Python's sequential `for window in batch` loop — nothing
//! about the cache or connector calls requires sequencing within a batch.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::debug;

use kgx_core::errors::LlmResult;
use kgx_core::traits::{Cache, LlmConnector};
use kgx_core::types::{tier_c_cache_key, ExtractionResult};

const DEFAULT_BATCH_SIZE: usize = 16;

pub struct TierCLlmClient<C: Cache> {
    connector: Arc<dyn LlmConnector>,
    cache: Arc<C>,
    batch_size: usize,
}

impl<C: Cache> TierCLlmClient<C> {
    pub fn new(connector: Arc<dyn LlmConnector>, cache: Arc<C>) -> Self {
        Self {
            connector,
            cache,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    fn compute_cache_key(window: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(window.as_bytes());
        let digest = hasher.finalize();
        tier_c_cache_key(&hex_encode(&digest))
    }

    async fn check_cache(&self, cache_key: &str) -> LlmResult<Option<ExtractionResult>> {
        let cached = self
            .cache
            .get(cache_key)
            .await
            .map_err(|e| kgx_core::errors::LlmError::InternalError(e.to_string()))?;
        match cached {
            Some(payload) => Ok(serde_json::from_str(&payload).ok()),
            None => Ok(None),
        }
    }

    async fn save_to_cache(&self, cache_key: &str, result: &ExtractionResult) -> LlmResult<()> {
        let payload = serde_json::to_string(result)
            .map_err(|e| kgx_core::errors::LlmError::ResponseParseError(e.to_string()))?;
        self.cache
            .set(cache_key, payload, None)
            .await
            .map_err(|e| kgx_core::errors::LlmError::InternalError(e.to_string()))?;
        Ok(())
    }

    /// Extracts triples from a single window, short-circuiting on a cache hit.
    pub async fn extract_from_window(&self, window: &str) -> LlmResult<ExtractionResult> {
        let cache_key = Self::compute_cache_key(window);

        if let Some(cached) = self.check_cache(&cache_key).await? {
            debug!("Tier-C cache hit for window");
            return Ok(cached);
        }

        let result = self.connector.complete_triples(window).await?;
        self.save_to_cache(&cache_key, &result).await?;
        Ok(result)
    }

    /// Extracts triples from every window, chunked into `batch_size` groups.
    /// Windows within a batch run concurrently; batches run sequentially so
    /// no single call to this method holds more than `batch_size` in-flight
    /// requests to the connector at once.
    pub async fn batch_extract(&self, windows: &[String]) -> LlmResult<Vec<ExtractionResult>> {
        let mut results = Vec::with_capacity(windows.len());

        for chunk in windows.chunks(self.batch_size) {
            let futures = chunk.iter().map(|window| self.extract_from_window(window));
            let chunk_results: Vec<LlmResult<ExtractionResult>> =
                futures_util::future::join_all(futures).await;

            for result in chunk_results {
                results.push(result?);
            }
        }

        Ok(results)
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use kgx_core::errors::{CacheResult, LlmError};
    use kgx_core::types::Triple;

    struct InMemoryCache {
        store: Mutex<HashMap<String, String>>,
    }

    impl InMemoryCache {
        fn new() -> Self {
            Self {
                store: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl Cache for InMemoryCache {
        async fn get(&self, key: &str) -> CacheResult<Option<String>> {
            Ok(self.store.lock().unwrap().get(key).cloned())
        }
        async fn set(&self, key: &str, value: String, _ttl: Option<Duration>) -> CacheResult<()> {
            self.store.lock().unwrap().insert(key.to_string(), value);
            Ok(())
        }
        async fn delete(&self, key: &str) -> CacheResult<()> {
            self.store.lock().unwrap().remove(key);
            Ok(())
        }
        async fn lpush(&self, _key: &str, _value: String) -> CacheResult<()> {
            Ok(())
        }
        async fn blpop(&self, _key: &str, _timeout: Duration) -> CacheResult<Option<String>> {
            Ok(None)
        }
        async fn hincrby(&self, _hash: &str, _field: &str, _delta: i64) -> CacheResult<i64> {
            Ok(0)
        }
        async fn hget(&self, _hash: &str, _field: &str) -> CacheResult<i64> {
            Ok(0)
        }
        async fn hdel(&self, _hash: &str, _field: &str) -> CacheResult<()> {
            Ok(())
        }
    }

    struct CountingConnector {
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl LlmConnector for CountingConnector {
        async fn complete_triples(&self, _window: &str) -> LlmResult<ExtractionResult> {
            *self.calls.lock().unwrap() += 1;
            Ok(ExtractionResult {
                triples: vec![Triple::new("s", "p", "o", 0.9).unwrap()],
            })
        }
    }

    #[tokio::test]
    async fn repeated_window_hits_connector_exactly_once() {
        let connector = Arc::new(CountingConnector {
            calls: Mutex::new(0),
        });
        let cache = Arc::new(InMemoryCache::new());
        let client = TierCLlmClient::new(connector.clone(), cache);

        client.extract_from_window("same text").await.unwrap();
        client.extract_from_window("same text").await.unwrap();

        assert_eq!(*connector.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn batch_extract_preserves_input_order() {
        struct EchoConnector;
        #[async_trait]
        impl LlmConnector for EchoConnector {
            async fn complete_triples(&self, window: &str) -> LlmResult<ExtractionResult> {
                Ok(ExtractionResult {
                    triples: vec![Triple::new(window, "p", "o", 0.5).unwrap()],
                })
            }
        }

        let client = TierCLlmClient::new(Arc::new(EchoConnector), Arc::new(InMemoryCache::new()));
        let windows = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let results = client.batch_extract(&windows).await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].triples[0].subject, "a");
        assert_eq!(results[1].triples[0].subject, "b");
        assert_eq!(results[2].triples[0].subject, "c");
    }

    #[tokio::test]
    async fn connector_error_propagates_from_batch() {
        struct FailingConnector;
        #[async_trait]
        impl LlmConnector for FailingConnector {
            async fn complete_triples(&self, _window: &str) -> LlmResult<ExtractionResult> {
                Err(LlmError::ApiError("engine unavailable".to_string()))
            }
        }

        let client = TierCLlmClient::new(Arc::new(FailingConnector), Arc::new(InMemoryCache::new()));
        let windows = vec!["a".to_string()];
        assert!(client.batch_extract(&windows).await.is_err());
    }
}
