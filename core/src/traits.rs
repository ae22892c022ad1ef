//! Cross-cutting traits at the external boundaries (spec §6): Cache, LLM
//! connector, Document Store, and raw-dict Reader. The Batched Graph
//! Writer's trait lives in `kgx-schemas` instead, since its methods are
//! keyed to the concrete entity records defined there (see that crate's
//! `writer` module) — `core` stays free of any dependency on entity shapes.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::errors::{CacheResult, CoreResult, IngestResult, LlmResult};
use crate::types::{Document, ExtractionResult};

/// Process-wide fast KV store backing the keyspace in spec §6: plain
/// get/set with optional TTL, a list used as a blocking queue, and a hash
/// used as retry counters. One long-lived client per process (§5).
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// `ttl` of `None` means the entry never expires.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> CacheResult<()>;

    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Left-push `value` onto the list at `key`.
    async fn lpush(&self, key: &str, value: String) -> CacheResult<()>;

    /// Blocking right-pop with a timeout; `Ok(None)` on timeout (not an
    /// error — the worker loop treats it as "nothing to do this tick").
    async fn blpop(&self, key: &str, timeout: Duration) -> CacheResult<Option<String>>;

    /// Atomically increments `hash[field]` by `delta`, returning the new value.
    async fn hincrby(&self, hash: &str, field: &str, delta: i64) -> CacheResult<i64>;

    /// Returns 0 when the field is absent (matches `get_retry_count`'s contract).
    async fn hget(&self, hash: &str, field: &str) -> CacheResult<i64>;

    async fn hdel(&self, hash: &str, field: &str) -> CacheResult<()>;
}

/// Tier-C's view of an LLM provider: a single chat-style call that must
/// produce a triples JSON object (spec §4.5/§6). Implementations are either
/// `Real` (an HTTP connector to an actual engine) or `Null` (always returns
/// empty triples) per the §9 redesign note — both implement this trait, so
/// callers never branch on which one they hold.
#[async_trait]
pub trait LlmConnector: Send + Sync {
    async fn complete_triples(&self, window: &str) -> LlmResult<ExtractionResult>;
}

/// Adapter contract for document persistence (spec §4.8). Two
/// implementations are expected (in-memory, relational) but only the
/// former ships in this core; the trait is the extension point for the
/// latter.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn query_pending(&self, limit: Option<usize>) -> CoreResult<Vec<Document>>;

    /// Fails with a not-found error if `doc_id` is unknown.
    async fn get_content(&self, doc_id: Uuid) -> CoreResult<String>;

    async fn update_document(&self, doc: Document) -> CoreResult<()>;
}

/// Contract every ingest reader satisfies (spec §6): emit a map of entity
/// family name to a list of raw JSON records. The Ingest Use Case validates
/// each record into the typed schema for that family before driving the
/// writer — readers themselves never construct typed entities.
#[async_trait]
pub trait Reader: Send + Sync {
    async fn load_data(&self) -> IngestResult<HashMap<String, Vec<Value>>>;
}
