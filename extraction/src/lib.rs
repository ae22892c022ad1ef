//! Tier A/B/C knowledge extraction pipeline and its orchestrator (spec §4).

pub mod orchestrator;
pub mod tier_a;
pub mod tier_b;
pub mod tier_c;

pub use orchestrator::ExtractionOrchestrator;
