//! Configuration for the HTTP LLM connector.

use serde::{Deserialize, Serialize};

/// Connection settings for a chat-completions-style LLM engine (spec §6:
/// "speaks to whichever engine is configured, Real or Null").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpLlmConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub timeout_ms: u64,
    pub max_retries: u32,
}

impl HttpLlmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "qwen3:4b".to_string(),
            api_base: "http://localhost:11434/v1".to_string(),
            max_tokens: Some(1024),
            temperature: Some(0.0),
            timeout_ms: 30_000,
            max_retries: 3,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature.clamp(0.0, 1.0));
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

impl Default for HttpLlmConfig {
    fn default() -> Self {
        Self::new("")
    }
}
