//! OpenAI-compatible chat completion provider (`/v1/chat/completions`).
//!
//! All OpenAI wire types are private to this module — callers only see
//! [`Prompt`] in and [`LlmResponse`] out. The provider is stateless and does
//! one round-trip per call.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::LlmConfig;
use crate::error::error_chain;
use crate::llm::{LlmResponse, LlmUsage, Prompt, ProviderError};

/// Sampling temperature sent with every request.
pub const TEMPERATURE: f32 = 0.3;

/// Output cap sent with every request.
pub const MAX_TOKENS: u32 = 200;

// ── Public provider ───────────────────────────────────────────────────────────

/// Adapter for any HTTP endpoint implementing `/v1/chat/completions`.
///
/// Constructed once at startup, then cheaply cloned because `reqwest::Client`
/// is an `Arc` internally.
#[derive(Clone)]
pub struct OpenAiCompatibleProvider {
    client: Client,
    api_base_url: String,
    model: String,
    api_key: String,
}

impl OpenAiCompatibleProvider {
    /// Build a provider from config values and an API key, sent as
    /// `Authorization: Bearer <key>` on every request.
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::Config("api key must not be empty".into()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.clone(),
            model: config.model.clone(),
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `prompt` and return the trimmed text of the first choice.
    pub async fn complete(&self, prompt: &Prompt) -> Result<LlmResponse, ProviderError> {
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                Message { role: "system", content: &prompt.system },
                Message { role: "user", content: &prompt.user },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        debug!(
            model = %payload.model,
            temperature = payload.temperature,
            max_tokens = payload.max_tokens,
            content_len = prompt.user.len(),
            "sending LLM request"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full LLM request payload");
        }

        let response = self
            .client
            .post(&self.api_base_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let cause = error_chain(&e);
                debug!(url = %self.api_base_url, error = %cause, timeout = e.is_timeout(), "LLM HTTP request failed (transport)");
                ProviderError::Request(cause)
            })?;

        let response = check_status(response).await?;

        let parsed = response.json::<ChatCompletionResponse>().await.map_err(|e| {
            let cause = error_chain(&e);
            debug!(error = %cause, "failed to deserialize LLM response");
            ProviderError::Request(format!("failed to parse response body: {cause}"))
        })?;

        debug!(choices = parsed.choices.len(), "received LLM response");

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ProviderError::EmptyContent)?;

        let usage = parsed.usage.map(|u| LlmUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        });

        Ok(LlmResponse { text, usage })
    }
}

impl std::fmt::Debug for OpenAiCompatibleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The API key is never printed.
        f.debug_struct("OpenAiCompatibleProvider")
            .field("api_base_url", &self.api_base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<UsageData>,
}

#[derive(Debug, Deserialize)]
struct UsageData {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// Error envelope used by OpenAI and compatible APIs.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Consume the response and return it if successful, or a structured error.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let message = if let Ok(env) = serde_json::from_str::<ErrorEnvelope>(&body) {
        let code = env
            .error
            .code
            .map(|v| match v {
                serde_json::Value::String(s) => format!(" [code={s}]"),
                other => format!(" [code={other}]"),
            })
            .unwrap_or_default();
        format!("{}{code}", env.error.message)
    } else {
        body
    };

    debug!(%status, %message, "LLM request returned HTTP error");
    Err(ProviderError::Status { status: status.as_u16(), message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn config_for(server: &MockServer) -> LlmConfig {
        LlmConfig {
            api_base_url: server.url("/v1/chat/completions"),
            model: "gpt-4o-mini".into(),
            timeout_seconds: 2,
        }
    }

    fn prompt() -> Prompt {
        Prompt { system: "sys".into(), user: "hei".into() }
    }

    #[test]
    fn debug_output_hides_key() {
        let cfg = LlmConfig {
            api_base_url: "http://localhost:0/v1/chat/completions".into(),
            model: "m".into(),
            timeout_seconds: 1,
        };
        let provider = OpenAiCompatibleProvider::new(&cfg, "sk-secret".into()).unwrap();
        assert!(!format!("{provider:?}").contains("sk-secret"));
    }

    #[test]
    fn empty_key_rejected() {
        let cfg = LlmConfig {
            api_base_url: "http://localhost:0/v1/chat/completions".into(),
            model: "m".into(),
            timeout_seconds: 1,
        };
        assert!(matches!(
            OpenAiCompatibleProvider::new(&cfg, "  ".into()),
            Err(ProviderError::Config(_))
        ));
    }

    #[tokio::test]
    async fn sends_fixed_parameters_and_trims_reply() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .header("authorization", "Bearer sk-test")
                    .json_body_partial(
                        r#"{"model": "gpt-4o-mini", "temperature": 0.3, "max_tokens": 200}"#,
                    );
                then.status(200).json_body(json!({
                    "choices": [{"message": {"role": "assistant", "content": "  Ett sammendrag.\n"}}],
                    "usage": {"prompt_tokens": 12, "completion_tokens": 4}
                }));
            })
            .await;

        let provider = OpenAiCompatibleProvider::new(&config_for(&server), "sk-test".into()).unwrap();
        let reply = provider.complete(&prompt()).await.unwrap();
        mock.assert_async().await;
        assert_eq!(reply.text, "Ett sammendrag.");
        assert_eq!(reply.usage, Some(LlmUsage { input_tokens: 12, output_tokens: 4 }));
    }

    #[tokio::test]
    async fn error_envelope_is_surfaced() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(429).json_body(json!({
                    "error": {"message": "Rate limit reached", "code": "rate_limit_exceeded"}
                }));
            })
            .await;

        let provider = OpenAiCompatibleProvider::new(&config_for(&server), "sk-test".into()).unwrap();
        match provider.complete(&prompt()).await {
            Err(ProviderError::Status { status, message }) => {
                assert_eq!(status, 429);
                assert!(message.contains("Rate limit reached"));
                assert!(message.contains("rate_limit_exceeded"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn blank_content_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200).json_body(json!({
                    "choices": [{"message": {"role": "assistant", "content": "   "}}]
                }));
            })
            .await;

        let provider = OpenAiCompatibleProvider::new(&config_for(&server), "sk-test".into()).unwrap();
        assert!(matches!(
            provider.complete(&prompt()).await,
            Err(ProviderError::EmptyContent)
        ));
    }

    #[tokio::test]
    async fn malformed_body_is_a_request_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200).body("not json");
            })
            .await;

        let provider = OpenAiCompatibleProvider::new(&config_for(&server), "sk-test".into()).unwrap();
        assert!(matches!(
            provider.complete(&prompt()).await,
            Err(ProviderError::Request(_))
        ));
    }
}
