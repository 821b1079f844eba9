//! Thin client for the Gemini `generateContent` API.
//!
//! - `POST {endpoint}/v1beta/models/{model}:generateContent` — synchronous
//!   text completion, no streaming.
//!
//! The client is initialized once with an [`LlmConfig`] and the API key, and
//! reuses a reqwest client with a request timeout. A timed-out or failed
//! call surfaces as [`LlmError::Transport`]; the orchestrator maps any
//! completion failure to its escalation reply, so errors here never reach
//! the end user as raw payloads.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use deskbot_core::config::LlmConfig;
use deskbot_core::error::DeskbotError;

/// Errors produced by the completion client.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The API key was empty at construction time.
    #[error("API key is empty")]
    MissingApiKey,

    /// Invalid endpoint (empty or missing http/https).
    #[error("invalid LLM endpoint: {0}")]
    InvalidEndpoint(String),

    /// Transport/HTTP client error, including timeouts.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-successful HTTP status from upstream.
    #[error("unexpected HTTP status {status}: {snippet}")]
    HttpStatus {
        status: StatusCode,
        /// Short snippet of the response body.
        snippet: String,
    },

    /// Unexpected/invalid JSON response.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The response carried no candidates or only empty parts.
    #[error("completion contained no text")]
    EmptyCompletion,
}

impl From<LlmError> for DeskbotError {
    fn from(err: LlmError) -> Self {
        DeskbotError::Llm(err.to_string())
    }
}

/// Single-shot text completion given a fully-formed prompt.
///
/// Object-safe so the orchestrator can hold `Box<dyn CompletionClient>` and
/// tests can substitute scripted stubs.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

// ---------------------------------------------------------------------------
// GeminiClient
// ---------------------------------------------------------------------------

/// Production completion client for Gemini.
pub struct GeminiClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
    temperature: f32,
}

impl GeminiClient {
    /// Create a new client from the given config and API key.
    ///
    /// # Errors
    /// - [`LlmError::MissingApiKey`] if the key is empty
    /// - [`LlmError::InvalidEndpoint`] if the endpoint is not http(s)
    /// - [`LlmError::Transport`] if the HTTP client cannot be built
    pub fn new(cfg: &LlmConfig, api_key: String) -> Result<Self, LlmError> {
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(LlmError::InvalidEndpoint(cfg.endpoint.clone()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            endpoint.trim_end_matches('/'),
            cfg.model
        );

        Ok(Self {
            client,
            url,
            api_key,
            temperature: cfg.temperature,
        })
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let resp = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let raw = resp.text().await?;

        if !status.is_success() {
            let snippet: String = raw.chars().take(200).collect();
            return Err(LlmError::HttpStatus { status, snippet });
        }

        let text = extract_completion(&raw)?;
        debug!(chars = text.len(), "Completion received");
        Ok(text)
    }
}

/// Pull the first candidate's text out of a raw `generateContent` response.
fn extract_completion(raw: &str) -> Result<String, LlmError> {
    let parsed: GenerateResponse =
        serde_json::from_str(raw).map_err(|e| LlmError::Decode(e.to_string()))?;

    let candidate = parsed
        .candidates
        .into_iter()
        .next()
        .ok_or(LlmError::EmptyCompletion)?;

    let text: String = candidate
        .content
        .parts
        .into_iter()
        .map(|p| p.text)
        .collect::<Vec<_>>()
        .join("");

    if text.is_empty() {
        return Err(LlmError::EmptyCompletion);
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> LlmConfig {
        LlmConfig::default()
    }

    // ---- Construction ----

    #[test]
    fn test_new_with_valid_config() {
        let client = GeminiClient::new(&test_config(), "key-123".to_string()).unwrap();
        assert_eq!(
            client.url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_new_rejects_empty_api_key() {
        let result = GeminiClient::new(&test_config(), "  ".to_string());
        assert!(matches!(result, Err(LlmError::MissingApiKey)));
    }

    #[test]
    fn test_new_rejects_bad_endpoint() {
        let cfg = LlmConfig {
            endpoint: "ftp://example.com".to_string(),
            ..test_config()
        };
        let result = GeminiClient::new(&cfg, "key".to_string());
        assert!(matches!(result, Err(LlmError::InvalidEndpoint(_))));
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let cfg = LlmConfig {
            endpoint: "http://localhost:9876/".to_string(),
            model: "test-model".to_string(),
            ..test_config()
        };
        let client = GeminiClient::new(&cfg, "key".to_string()).unwrap();
        assert_eq!(
            client.url,
            "http://localhost:9876/v1beta/models/test-model:generateContent"
        );
    }

    // ---- Request serialization ----

    #[test]
    fn test_request_body_shape() {
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: "hi" }],
            }],
            generation_config: GenerationConfig { temperature: 0.3 },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert!((json["generationConfig"]["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    // ---- Response decoding ----

    #[test]
    fn test_extract_completion() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Our hours are 9-5."}], "role": "model"}}
            ]
        }"#;
        assert_eq!(extract_completion(raw).unwrap(), "Our hours are 9-5.");
    }

    #[test]
    fn test_extract_completion_joins_parts() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Our hours "}, {"text": "are 9-5."}]}}
            ]
        }"#;
        assert_eq!(extract_completion(raw).unwrap(), "Our hours are 9-5.");
    }

    #[test]
    fn test_extract_completion_uses_first_candidate() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "first"}]}},
                {"content": {"parts": [{"text": "second"}]}}
            ]
        }"#;
        assert_eq!(extract_completion(raw).unwrap(), "first");
    }

    #[test]
    fn test_extract_completion_no_candidates() {
        let raw = r#"{"candidates": []}"#;
        assert!(matches!(
            extract_completion(raw),
            Err(LlmError::EmptyCompletion)
        ));
    }

    #[test]
    fn test_extract_completion_missing_candidates_field() {
        let raw = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        assert!(matches!(
            extract_completion(raw),
            Err(LlmError::EmptyCompletion)
        ));
    }

    #[test]
    fn test_extract_completion_empty_parts() {
        let raw = r#"{"candidates": [{"content": {"parts": []}}]}"#;
        assert!(matches!(
            extract_completion(raw),
            Err(LlmError::EmptyCompletion)
        ));
    }

    #[test]
    fn test_extract_completion_invalid_json() {
        assert!(matches!(
            extract_completion("not json"),
            Err(LlmError::Decode(_))
        ));
    }

    // ---- Error conversion ----

    #[test]
    fn test_llm_error_into_deskbot_error() {
        let err: DeskbotError = LlmError::EmptyCompletion.into();
        assert!(matches!(err, DeskbotError::Llm(_)));
        assert!(err.to_string().contains("no text"));
    }
}
