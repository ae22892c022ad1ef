//! Dead letter queue with exponential-backoff retry bookkeeping. Grounded on
//! `examples/original_source/packages/common/dlq.py`'s `DeadLetterQueue`:
//! same `retry_counts` hash, same `base_delay * 2^(retry_count-1)` backoff
//! formula, generalized from a raw Redis client to `kgx_core::traits::Cache`.
//!
//! This queue only ever sees failures that escape the orchestrator's own
//! `process_document` call entirely — a job that reaches `JobState::Failed`
//! through the orchestrator's internal retry loop is already a terminal,
//! recorded outcome and is not re-queued here (see `worker.rs`).

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};

use kgx_core::errors::CacheResult;
use kgx_core::traits::Cache;
use kgx_core::types::{QUEUE_DLQ, RETRY_COUNTS_HASH};

pub struct DeadLetterQueue<C: Cache> {
    cache: Arc<C>,
    max_retries: i64,
    base_delay_secs: u64,
}

impl<C: Cache> DeadLetterQueue<C> {
    pub fn new(cache: Arc<C>, max_retries: i64, base_delay_secs: u64) -> Self {
        Self {
            cache,
            max_retries,
            base_delay_secs,
        }
    }

    /// Pushes `job_data` onto `queue:dlq` with error metadata attached.
    pub async fn send_to_dlq(&self, mut job_data: Value, error: &str) -> CacheResult<()> {
        if let Value::Object(ref mut map) = job_data {
            map.insert("error".to_string(), Value::String(error.to_string()));
            map.insert(
                "failed_at".to_string(),
                Value::String(Utc::now().to_rfc3339()),
            );
        }

        let entry = serde_json::to_string(&job_data)
            .unwrap_or_else(|_| format!("{{\"error\":{error:?}}}"));
        self.cache.lpush(QUEUE_DLQ, entry).await?;
        warn!(error, "sent job to DLQ");
        Ok(())
    }

    pub async fn increment_retry_count(&self, job_id: &str) -> CacheResult<i64> {
        let count = self.cache.hincrby(RETRY_COUNTS_HASH, job_id, 1).await?;
        debug!(job_id, count, "incremented retry count");
        Ok(count)
    }

    pub async fn get_retry_count(&self, job_id: &str) -> CacheResult<i64> {
        self.cache.hget(RETRY_COUNTS_HASH, job_id).await
    }

    pub async fn should_retry(&self, job_id: &str) -> CacheResult<bool> {
        let count = self.get_retry_count(job_id).await?;
        Ok(count < self.max_retries)
    }

    /// `base_delay * 2^(retry_count-1)`, e.g. with a 2s base: 2s, 4s, 8s.
    pub fn calculate_backoff_delay(&self, retry_count: i64) -> u64 {
        let exponent = (retry_count - 1).max(0) as u32;
        self.base_delay_secs * 2u64.pow(exponent)
    }

    pub async fn clear_retry_count(&self, job_id: &str) -> CacheResult<()> {
        self.cache.hdel(RETRY_COUNTS_HASH, job_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgx_adapter_cache_memory::InMemoryCache;
    use std::time::Duration;

    fn build() -> DeadLetterQueue<InMemoryCache> {
        DeadLetterQueue::new(Arc::new(InMemoryCache::new()), 3, 2)
    }

    #[test]
    fn backoff_matches_documented_formula() {
        let dlq = build();
        assert_eq!(dlq.calculate_backoff_delay(1), 2);
        assert_eq!(dlq.calculate_backoff_delay(2), 4);
        assert_eq!(dlq.calculate_backoff_delay(3), 8);
    }

    #[tokio::test]
    async fn should_retry_false_once_max_exceeded() {
        let dlq = build();
        for _ in 0..3 {
            dlq.increment_retry_count("job-1").await.unwrap();
        }
        assert!(!dlq.should_retry("job-1").await.unwrap());
        assert_eq!(dlq.get_retry_count("job-1").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn clear_retry_count_resets_to_zero() {
        let dlq = build();
        dlq.increment_retry_count("job-2").await.unwrap();
        dlq.clear_retry_count("job-2").await.unwrap();
        assert_eq!(dlq.get_retry_count("job-2").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn send_to_dlq_pushes_annotated_entry() {
        let dlq = build();
        dlq.send_to_dlq(serde_json::json!({"doc_id": "abc"}), "boom")
            .await
            .unwrap();

        let raw = dlq
            .cache
            .blpop(QUEUE_DLQ, Duration::from_millis(50))
            .await
            .unwrap()
            .unwrap();
        let parsed: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["doc_id"], "abc");
        assert_eq!(parsed["error"], "boom");
        assert!(parsed["failed_at"].is_string());
    }
}
