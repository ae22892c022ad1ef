//! # kgx-core
//!
//! Shared data model, cross-cutting traits, and error hierarchy for the kgx
//! knowledge-extraction pipeline. Every other crate in the workspace depends
//! on this one; it depends on nothing else in the workspace.

pub mod errors;
pub mod temporal;
pub mod traits;
pub mod types;

pub use errors::{CacheError, CoreError, GraphError, IngestError, LlmError, OrchestratorError};
pub use traits::{Cache, DocumentStore, LlmConnector, Reader};
pub use types::{Document, ExtractionJob, ExtractionResult, ExtractionWindow, JobState, Triple};

/// Convenience re-exports for crates consuming `kgx-core`.
pub mod prelude {
    pub use crate::errors::*;
    pub use crate::traits::*;
    pub use crate::types::*;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use uuid::Uuid;
}
