//! Background Worker (spec §4.7). Grounded on
//! `examples/original_source/apps/worker/main.py`'s `ExtractionWorker`:
//! same `should_stop`/`signal_stop`/`poll_once`/`run` shape and the same
//! "one poisoned message can't kill the loop" contract, reworked from the
//! Python's ad-hoc `SingleDocStore` collaborator-swap (flagged in spec §9's
//! Design Notes as a hack) to a direct `query_pending` lookup plus the
//! orchestrator's `process_document(doc_id, content)` primary.
//!
//! Per spec §4.7's closing note (expanded on in §9's open questions), the
//! DLQ/backoff machinery below fires only for failures that escape
//! `process_document` entirely (document store errors, a cache error
//! bubbling out of the orchestrator call) — a job that reaches
//! `JobState::Failed` through the orchestrator's own retry loop is already a
//! terminal, persisted outcome and is simply logged here.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

use kgx_core::traits::{Cache, DocumentStore};
use kgx_core::types::{JobState, QUEUE_EXTRACTION};
use kgx_extraction::ExtractionOrchestrator;

use crate::dlq::DeadLetterQueue;

pub struct ExtractionWorker<C: Cache> {
    cache: Arc<C>,
    orchestrator: Arc<ExtractionOrchestrator<C>>,
    document_store: Arc<dyn DocumentStore>,
    dlq: DeadLetterQueue<C>,
    poll_timeout: Duration,
    stop_flag: AtomicBool,
}

impl<C: Cache> ExtractionWorker<C> {
    pub fn new(
        cache: Arc<C>,
        orchestrator: Arc<ExtractionOrchestrator<C>>,
        document_store: Arc<dyn DocumentStore>,
        dlq: DeadLetterQueue<C>,
        poll_timeout: Duration,
    ) -> Self {
        info!(poll_timeout_secs = poll_timeout.as_secs(), "initialized extraction worker");
        Self {
            cache,
            orchestrator,
            document_store,
            dlq,
            poll_timeout,
            stop_flag: AtomicBool::new(false),
        }
    }

    pub fn should_stop(&self) -> bool {
        self.stop_flag.load(Ordering::SeqCst)
    }

    pub fn signal_stop(&self) {
        info!("received stop signal");
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    /// Runs until `signal_stop` is called; the in-flight pop or job always
    /// finishes before the loop exits.
    pub async fn run(&self) {
        info!("starting extraction worker loop");
        while !self.should_stop() {
            self.poll_once().await;
        }
        info!("worker stopped");
    }

    /// Polls the queue once and processes a single job if available. Never
    /// propagates an error — one poisoned message must not kill the loop.
    pub async fn poll_once(&self) {
        let popped = match self.cache.blpop(QUEUE_EXTRACTION, self.poll_timeout).await {
            Ok(popped) => popped,
            Err(e) => {
                error!(error = %e, "error polling extraction queue");
                return;
            }
        };

        let Some(raw_job) = popped else {
            return;
        };

        let job_value: Value = match serde_json::from_str(&raw_job) {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, "invalid job data: not valid JSON");
                return;
            }
        };

        let Some(doc_id_str) = job_value.get("doc_id").and_then(|v| v.as_str()) else {
            error!("invalid job data: missing doc_id");
            return;
        };

        let Ok(doc_id) = Uuid::parse_str(doc_id_str) else {
            error!(doc_id = doc_id_str, "invalid job data: bad doc_id format");
            return;
        };

        info!(doc_id = %doc_id, "processing extraction job");

        if let Err(e) = self.dispatch(doc_id).await {
            warn!(doc_id = %doc_id, error = %e, "extraction dispatch failed outside the orchestrator");
            self.handle_escaped_failure(doc_id_str, job_value, &e.to_string())
                .await;
        }
    }

    /// Looks up the pending document, runs it through the orchestrator, and
    /// persists the terminal state back to the document store. Any error
    /// here counts as "escaping `process_document`" per spec §4.7/§9.
    async fn dispatch(&self, doc_id: Uuid) -> Result<(), DispatchError> {
        let pending = self
            .document_store
            .query_pending(None)
            .await
            .map_err(|e| DispatchError(e.to_string()))?;

        let Some(mut doc) = pending.into_iter().find(|d| d.doc_id == doc_id) else {
            warn!(doc_id = %doc_id, "document not found in PENDING state, skipping");
            return Ok(());
        };

        let content = self
            .document_store
            .get_content(doc_id)
            .await
            .map_err(|e| DispatchError(e.to_string()))?;

        let job = self
            .orchestrator
            .process_document(doc_id, &content)
            .await
            .map_err(|e| DispatchError(e.to_string()))?;

        match job.state {
            JobState::Completed => {
                info!(doc_id = %doc_id, job_id = %job.job_id, "extraction completed");
            }
            JobState::Failed => {
                warn!(doc_id = %doc_id, job_id = %job.job_id, "extraction job failed after exhausting retries");
            }
            other => {
                warn!(doc_id = %doc_id, state = ?other, "process_document returned a non-terminal state");
            }
        }

        doc.extraction_state = job.state;
        doc.updated_at = Utc::now();
        self.document_store
            .update_document(doc)
            .await
            .map_err(|e| DispatchError(e.to_string()))?;

        Ok(())
    }

    async fn handle_escaped_failure(&self, job_id: &str, job_value: Value, error: &str) {
        let retry_count = match self.dlq.increment_retry_count(job_id).await {
            Ok(count) => count,
            Err(e) => {
                error!(job_id, error = %e, "failed to increment retry count, sending straight to DLQ");
                let _ = self.dlq.send_to_dlq(job_value, error).await;
                return;
            }
        };

        match self.dlq.should_retry(job_id).await {
            Ok(true) => {
                let delay = self.dlq.calculate_backoff_delay(retry_count);
                warn!(job_id, retry_count, delay_secs = delay, "retrying job after backoff");
                tokio::time::sleep(Duration::from_secs(delay)).await;
                let retry_envelope = json!({ "doc_id": job_value.get("doc_id").cloned().unwrap_or(Value::Null) });
                if let Err(e) = self
                    .cache
                    .lpush(QUEUE_EXTRACTION, retry_envelope.to_string())
                    .await
                {
                    error!(job_id, error = %e, "failed to requeue job, sending to DLQ instead");
                    let _ = self.dlq.send_to_dlq(job_value, error).await;
                }
            }
            Ok(false) => {
                warn!(job_id, retry_count, "retries exhausted, sending to DLQ");
                if let Err(e) = self.dlq.send_to_dlq(job_value, error).await {
                    error!(job_id, error = %e, "failed to send job to DLQ");
                }
                let _ = self.dlq.clear_retry_count(job_id).await;
            }
            Err(e) => {
                error!(job_id, error = %e, "failed to check retry policy, sending to DLQ");
                let _ = self.dlq.send_to_dlq(job_value, error).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct DispatchError(String);
