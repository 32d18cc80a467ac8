//! LLM provider abstraction.
//!
//! There is exactly one backend: an OpenAI-compatible `/v1/chat/completions`
//! endpoint. Provider instances are shared immutable capabilities — clone
//! them freely.

pub mod openai_compatible;

use thiserror::Error;

pub use openai_compatible::OpenAiCompatibleProvider;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("invalid provider config: {0}")]
    Config(String),
    #[error("provider request failed: {0}")]
    Request(String),
    #[error("provider returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("empty or missing content in response")]
    EmptyContent,
}

// ── Request / response ────────────────────────────────────────────────────────

/// One system + user exchange.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Text reply plus token usage, when the provider reports it.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmResponse {
    pub text: String,
    pub usage: Option<LlmUsage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
