//! Error types shared across the extraction pipeline.

use thiserror::Error;

/// Top-level error aggregating every subsystem's error type.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("graph writer error: {0}")]
    Graph(#[from] GraphError),

    #[error("LLM connector error: {0}")]
    Llm(#[from] LlmError),

    #[error("orchestrator error: {0}")]
    Orchestrator(#[from] OrchestratorError),

    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors from the `Cache` abstraction (keyspace in spec §6).
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("key not found: {0}")]
    NotFound(String),

    #[error("value could not be decoded: {0}")]
    Decode(String),

    #[error("queue timed out after waiting")]
    QueueTimeout,

    #[error("internal cache error: {0}")]
    Internal(String),
}

/// Errors from the Batched Graph Writer.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("query execution failed: {0}")]
    QueryFailed(String),

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("unsupported entity family: {0}")]
    UnsupportedFamily(String),

    #[error("timeout: {0}")]
    Timeout(String),
}

/// Errors from the Tier-C LLM client / connector.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("API error from LLM provider: {0}")]
    ApiError(String),

    #[error("timeout during LLM call")]
    Timeout,

    #[error("failed to parse LLM response: {0}")]
    ResponseParseError(String),

    #[error("LLM response failed schema validation: {0}")]
    SchemaValidationError(String),

    #[error("internal connector error: {0}")]
    InternalError(String),
}

/// Errors from the Extraction Orchestrator's state machine.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("document not found: {0}")]
    DocumentNotFound(uuid::Uuid),

    #[error("job {job_id} exhausted retries: {message}")]
    RetriesExhausted { job_id: uuid::Uuid, message: String },

    #[error("document store error: {0}")]
    DocumentStore(String),
}

/// Errors from the Ingest Use Case and its readers.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("reader failed to load data: {0}")]
    ReaderFailed(String),

    #[error("record failed validation: {0}")]
    InvalidRecord(String),

    #[error("port out of range [1,65535]: {0}")]
    InvalidPort(String),

    #[error("unknown entity family: {0}")]
    UnknownFamily(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
pub type CacheResult<T> = Result<T, CacheError>;
pub type GraphResult<T> = Result<T, GraphError>;
pub type LlmResult<T> = Result<T, LlmError>;
pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
pub type IngestResult<T> = Result<T, IngestError>;
