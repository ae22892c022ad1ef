//! Tier C: cache-fronted LLM triple extraction. See spec §4.5.

pub mod llm_client;
