//! Shared data model: documents, extraction jobs, windows, triples, and the
//! temporal/provenance fields every entity record carries (spec §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CacheError, CoreError};

/// Where a `Document` was ingested from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Web,
    File,
    Api,
    Mail,
    Other(String),
}

/// A source document tracked through the extraction pipeline.
///
/// Created by ingest readers; its `extraction_state` is mutated only by the
/// Orchestrator via the Document Store, never destroyed by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub doc_id: Uuid,
    pub source_url: String,
    pub source_type: SourceType,
    /// Hex-encoded content hash, 64 chars (SHA-256).
    pub content_hash: String,
    pub ingested_at: DateTime<Utc>,
    pub extraction_state: JobState,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(source_url: impl Into<String>, source_type: SourceType, content_hash: String) -> Self {
        let now = Utc::now();
        Self {
            doc_id: Uuid::new_v4(),
            source_url: source_url.into(),
            source_type,
            content_hash,
            ingested_at: now,
            extraction_state: JobState::Pending,
            updated_at: now,
        }
    }
}

/// States of the Extraction Orchestrator's per-document state machine (§4.1).
///
/// Transitions are monotonic along the happy path; backwards transitions are
/// forbidden. `Failed` is the only terminal failure state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Pending,
    TierADone,
    TierBDone,
    TierCDone,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

/// The last error recorded against a job (spec §9 Open Question: the job
/// holds the LAST error only, not an accumulating list — see SPEC_FULL §D).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobError {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub retry_count: u32,
}

/// Per-document extraction job. Persisted to the cache under
/// `extraction_job:{job_id}` on every state transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionJob {
    pub job_id: Uuid,
    pub doc_id: Uuid,
    pub state: JobState,
    pub tier_a_triples: u64,
    pub tier_b_windows: u64,
    pub tier_c_triples: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub retry_count: u32,
    pub errors: Option<JobError>,
}

impl ExtractionJob {
    pub fn new(doc_id: Uuid) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            doc_id,
            state: JobState::Pending,
            tier_a_triples: 0,
            tier_b_windows: 0,
            tier_c_triples: 0,
            started_at: Utc::now(),
            completed_at: None,
            retry_count: 0,
            errors: None,
        }
    }

    /// The cache key this job is persisted under (named constant per spec §9
    /// — callers must use this, not a hand-built string).
    pub fn cache_key(&self) -> String {
        extraction_job_key(self.job_id)
    }
}

/// Named keyspace constant builder for `extraction_job:{job_id}` (spec §6).
pub fn extraction_job_key(job_id: Uuid) -> String {
    format!("extraction_job:{job_id}")
}

/// Named keyspace constant for the Tier-C cache entry (no prefix, spec §6).
pub fn tier_c_cache_key(fingerprint: &str) -> String {
    fingerprint.to_string()
}

/// Named keyspace constant for an API key record (spec §6).
pub fn api_key_cache_key(key_hash: &str) -> String {
    format!("api_key:{key_hash}")
}

/// Name of the extraction job queue (spec §6/§4.7).
pub const QUEUE_EXTRACTION: &str = "queue:extraction";
/// Name of the dead-letter queue (spec §6/§4.7).
pub const QUEUE_DLQ: &str = "queue:dlq";
/// Name of the retry-counter hash (spec §6/§4.7).
pub const RETRY_COUNTS_HASH: &str = "retry_counts";

/// A bounded-length slice of document text submitted to Tier C (§3/§4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionWindow {
    pub content: String,
    pub token_count: u32,
    pub start: usize,
    pub end: usize,
}

/// A subject-predicate-object assertion with a confidence score (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub confidence: f32,
}

impl Triple {
    /// Construct a triple, enforcing §3's invariants (non-empty strings,
    /// confidence in range). Malformed Tier-C output must not reach this
    /// constructor with `?` — Tier C collapses those to empty results
    /// instead (§4.5), so this only guards truly programmer-facing misuse.
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
        confidence: f32,
    ) -> Result<Self, CoreError> {
        let subject = subject.into();
        let predicate = predicate.into();
        let object = object.into();
        if subject.is_empty() || predicate.is_empty() || object.is_empty() {
            return Err(CoreError::Validation(
                "triple fields must be non-empty".into(),
            ));
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(CoreError::Validation(format!(
                "confidence {confidence} out of range [0,1]"
            )));
        }
        Ok(Self {
            subject,
            predicate,
            object,
            confidence,
        })
    }
}

/// Output of a single Tier-C call, batched or not.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub triples: Vec<Triple>,
}

/// `extraction_tier` provenance values (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionTier {
    A,
    B,
    C,
}

/// Mandatory temporal fields every entity record carries (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Temporal {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub source_timestamp: Option<DateTime<Utc>>,
}

impl Temporal {
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            source_timestamp: None,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.created_at > self.updated_at {
            return Err(CoreError::Validation(
                "created_at must be <= updated_at".into(),
            ));
        }
        Ok(())
    }
}

/// Mandatory provenance fields every entity record carries (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provenance {
    pub extraction_tier: ExtractionTier,
    pub extraction_method: String,
    pub confidence: f32,
    pub extractor_version: String,
}

impl Provenance {
    pub fn new(
        extraction_tier: ExtractionTier,
        extraction_method: impl Into<String>,
        confidence: f32,
        extractor_version: impl Into<String>,
    ) -> Result<Self, CoreError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(CoreError::Validation(format!(
                "confidence {confidence} out of range [0,1]"
            )));
        }
        let extractor_version = extractor_version.into();
        if extractor_version.is_empty() {
            return Err(CoreError::Validation(
                "extractor_version must be non-empty".into(),
            ));
        }
        Ok(Self {
            extraction_tier,
            extraction_method: extraction_method.into(),
            confidence,
            extractor_version,
        })
    }
}

/// Result of one Batched Graph Writer call (§4.6).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WriteOutcome {
    pub total_written: u64,
    pub batches_executed: u64,
    /// Edge rows skipped because an endpoint was missing; never fails the batch.
    pub skipped: u64,
}

impl WriteOutcome {
    pub fn merge(mut self, other: WriteOutcome) -> Self {
        self.total_written += other.total_written;
        self.batches_executed += other.batches_executed;
        self.skipped += other.skipped;
        self
    }
}

/// Converts a cache miss (`None`) into `CacheError::NotFound` for call sites
/// that require presence (e.g. `get_content`).
pub fn require_present<T>(value: Option<T>, key: &str) -> Result<T, CacheError> {
    value.ok_or_else(|| CacheError::NotFound(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_cache_key_matches_named_constant() {
        let job = ExtractionJob::new(Uuid::new_v4());
        assert_eq!(job.cache_key(), extraction_job_key(job.job_id));
        assert!(job.cache_key().starts_with("extraction_job:"));
    }

    #[test]
    fn triple_rejects_empty_fields_and_bad_confidence() {
        assert!(Triple::new("", "p", "o", 0.5).is_err());
        assert!(Triple::new("s", "p", "o", 1.5).is_err());
        assert!(Triple::new("s", "p", "o", 0.0).is_ok());
        assert!(Triple::new("s", "p", "o", 1.0).is_ok());
    }

    #[test]
    fn temporal_validate_rejects_inverted_bounds() {
        let mut t = Temporal::now();
        t.updated_at = t.created_at - chrono::Duration::seconds(1);
        assert!(t.validate().is_err());
    }

    #[test]
    fn provenance_rejects_empty_version() {
        assert!(Provenance::new(ExtractionTier::A, "pattern", 0.9, "").is_err());
        assert!(Provenance::new(ExtractionTier::A, "pattern", 0.9, "v1").is_ok());
    }
}
