//! Docker Compose ingest: a `Reader` implementation plus the use case that
//! validates its raw output and drives a `GraphWriter` (spec §4.6/§6).

pub mod reader;
pub mod use_case;

pub use reader::ComposeReader;
pub use use_case::{IngestUseCase, IngestionSummary};
