//! HTTP LLM connector for Tier-C knowledge extraction (spec §4.5/§6).
//!
//! Two implementations share `kgx_core::traits::LlmConnector`: `HttpLlmConnector`
//! (Real, speaks an OpenAI-compatible chat-completions API) and
//! `NullLlmConnector` (always returns empty triples) — the §9 redesign note's
//! Real/Null split, generalized from the teacher's single-vendor
//! `OpenAiConnector` in `connectors/openai`.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use kgx_core::errors::{LlmError, LlmResult};
use kgx_core::traits::LlmConnector;
use kgx_core::types::{ExtractionResult, Triple};

mod config;
mod models;

pub use config::HttpLlmConfig;
use models::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ResponseFormat, TriplesPayload};

/// Speaks to whichever engine is configured via `HttpLlmConfig` — the engine
/// itself stays an external collaborator (spec §1/§6); this type only knows
/// the documented chat-completions contract.
pub struct HttpLlmConnector {
    client: Client,
    config: HttpLlmConfig,
}

impl HttpLlmConnector {
    pub fn new(config: HttpLlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| LlmError::ConfigError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn build_prompt(window: &str) -> String {
        format!(
            "Extract knowledge triples from the following text.\n\
             Return ONLY a JSON object with this exact format:\n\
             {{\"triples\": [{{\"subject\": \"entity1\", \"predicate\": \"RELATIONSHIP\", \"object\": \"entity2\", \"confidence\": 0.9}}]}}\n\n\
             Text: {window}\n\n\
             JSON:"
        )
    }

    /// Strips markdown code fences a chat model commonly wraps JSON in, then
    /// parses. Per spec §4.5, a response that still doesn't parse (or whose
    /// fields fail `Triple::new`'s validation) collapses to an empty result
    /// rather than failing the call — only transport/API failures are `Err`.
    fn parse_triples(content: &str) -> ExtractionResult {
        let cleaned = content
            .trim()
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim();

        let payload: TriplesPayload = match serde_json::from_str(cleaned) {
            Ok(p) => p,
            Err(e) => {
                warn!("Tier-C response failed to parse as JSON, returning empty result: {e}");
                return ExtractionResult::default();
            }
        };

        let triples = payload
            .triples
            .into_iter()
            .filter_map(|raw| {
                match Triple::new(raw.subject, raw.predicate, raw.object, raw.confidence) {
                    Ok(t) => Some(t),
                    Err(e) => {
                        warn!("dropping malformed Tier-C triple: {e}");
                        None
                    }
                }
            })
            .collect();

        ExtractionResult { triples }
    }
}

#[async_trait]
impl LlmConnector for HttpLlmConnector {
    async fn complete_triples(&self, window: &str) -> LlmResult<ExtractionResult> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Self::build_prompt(window),
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            response_format: Some(ResponseFormat {
                r#type: "json_object".to_string(),
            }),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError(format!("{status}: {body}")));
        }

        let chat_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ResponseParseError(e.to_string()))?;

        let content = chat_response
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .ok_or_else(|| LlmError::ResponseParseError("no content in response".to_string()))?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Tier-C call completed"
            );
        }

        Ok(Self::parse_triples(content))
    }
}

/// Always returns empty triples without making a network call. Used when no
/// LLM engine is configured (spec §9 redesign note) — callers never branch
/// on which connector they hold.
#[derive(Debug, Default)]
pub struct NullLlmConnector;

#[async_trait]
impl LlmConnector for NullLlmConnector {
    async fn complete_triples(&self, _window: &str) -> LlmResult<ExtractionResult> {
        Ok(ExtractionResult::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_triples_strips_markdown_fence() {
        let content = "```json\n{\"triples\": [{\"subject\": \"a\", \"predicate\": \"rel\", \"object\": \"b\", \"confidence\": 0.9}]}\n```";
        let result = HttpLlmConnector::parse_triples(content);
        assert_eq!(result.triples.len(), 1);
        assert_eq!(result.triples[0].subject, "a");
    }

    #[test]
    fn parse_triples_collapses_unparseable_json_to_empty() {
        let result = HttpLlmConnector::parse_triples("not json at all");
        assert!(result.triples.is_empty());
    }

    #[test]
    fn parse_triples_drops_individually_malformed_entries() {
        let content = r#"{"triples": [
            {"subject": "", "predicate": "rel", "object": "b", "confidence": 0.9},
            {"subject": "a", "predicate": "rel", "object": "b", "confidence": 0.9}
        ]}"#;
        let result = HttpLlmConnector::parse_triples(content);
        assert_eq!(result.triples.len(), 1);
    }

    #[tokio::test]
    async fn null_connector_always_returns_empty() {
        let connector = NullLlmConnector;
        let result = connector.complete_triples("anything").await.unwrap();
        assert!(result.triples.is_empty());
    }
}
