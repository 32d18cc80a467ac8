//! Summary pipeline: filter the roster, then phrase the result.
//!
//! - **filter** — availability + skill predicate.
//! - **fallback** — deterministic template text.
//! - [`Summarizer`] — asks the model when one is configured and the result is
//!   non-empty, and substitutes the template on every other path.

pub mod fallback;
pub mod filter;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::llm::{OpenAiCompatibleProvider, Prompt, ProviderError};
use crate::roster::Consultant;

pub use filter::filter_consultants;

const SYSTEM_PROMPT: &str = "Du er en assistent som skriver korte, profesjonelle sammendrag på norsk \
om hvilke konsulenter som er tilgjengelige. Svar med ett kort avsnitt i ren tekst.";

/// Query parameters of one summary request.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryCriteria {
    pub min_availability: f64,
    pub skill: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarySource {
    Template,
    Llm,
}

impl SummarySource {
    pub fn as_str(self) -> &'static str {
        match self {
            SummarySource::Template => "template",
            SummarySource::Llm => "llm",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub text: String,
    pub source: SummarySource,
}

impl Summary {
    fn template(matches: &[&Consultant], criteria: &SummaryCriteria) -> Self {
        Self {
            text: fallback::render(matches, criteria.min_availability, &criteria.skill),
            source: SummarySource::Template,
        }
    }
}

/// Result of asking the model for a summary.
#[derive(Debug)]
pub enum LlmOutcome {
    Generated(String),
    /// No API key at startup.
    Disabled,
    Failed(ProviderError),
}

/// Renders summaries. Cheap to clone; shared across requests.
#[derive(Debug, Clone)]
pub struct Summarizer {
    provider: Option<OpenAiCompatibleProvider>,
}

impl Summarizer {
    pub fn template_only() -> Self {
        Self { provider: None }
    }

    pub fn with_provider(provider: OpenAiCompatibleProvider) -> Self {
        Self { provider: Some(provider) }
    }

    /// Template-only when `OPENAI_API_KEY` is absent.
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        match &config.llm_api_key {
            Some(key) => {
                let provider = OpenAiCompatibleProvider::new(&config.llm, key.clone())?;
                info!(model = %provider.model(), "LLM summaries enabled");
                Ok(Self::with_provider(provider))
            }
            None => {
                info!("no OPENAI_API_KEY set — using template summaries only");
                Ok(Self::template_only())
            }
        }
    }

    pub fn llm_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Produce the summary for an already-filtered set.
    ///
    /// An empty set never reaches the model.
    pub async fn summarize(&self, matches: &[&Consultant], criteria: &SummaryCriteria) -> Summary {
        if matches.is_empty() {
            return Summary::template(matches, criteria);
        }

        match self.generate(matches, criteria).await {
            LlmOutcome::Generated(text) => Summary { text, source: SummarySource::Llm },
            LlmOutcome::Disabled => Summary::template(matches, criteria),
            LlmOutcome::Failed(e) => {
                warn!(error = %e, matches = matches.len(), "LLM summary failed — falling back to template");
                Summary::template(matches, criteria)
            }
        }
    }

    /// One model call, no retry.
    pub async fn generate(&self, matches: &[&Consultant], criteria: &SummaryCriteria) -> LlmOutcome {
        let Some(provider) = &self.provider else {
            return LlmOutcome::Disabled;
        };
        let prompt = build_prompt(matches, criteria);
        match provider.complete(&prompt).await {
            Ok(resp) => {
                if let Some(u) = resp.usage {
                    debug!(input_tokens = u.input_tokens, output_tokens = u.output_tokens, "llm usage");
                }
                LlmOutcome::Generated(resp.text)
            }
            Err(e) => LlmOutcome::Failed(e),
        }
    }
}

/// Fixed system instruction plus a user message listing each match.
pub fn build_prompt(matches: &[&Consultant], criteria: &SummaryCriteria) -> Prompt {
    let lines = matches
        .iter()
        .map(|c| {
            format!(
                "- {}: {:.0}% tilgjengelighet, ferdigheter: {}",
                c.navn,
                c.availability(),
                c.ferdigheter.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let user = format!(
        "Lag et kort sammendrag av konsulentene som har minst {}% tilgjengelighet \
og ferdigheten '{}'.\n\nKonsulenter:\n{lines}",
        criteria.min_availability, criteria.skill
    );

    Prompt { system: SYSTEM_PROMPT.to_string(), user }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;
    use httpmock::prelude::*;
    use serde_json::json;

    fn criteria(min: f64, skill: &str) -> SummaryCriteria {
        SummaryCriteria { min_availability: min, skill: skill.into() }
    }

    fn anna() -> Consultant {
        Consultant::new(1, "Anna K.", &["python", "docker"], 40.0)
    }

    fn provider_for(server: &MockServer) -> OpenAiCompatibleProvider {
        provider_with_timeout(server, 2)
    }

    fn provider_with_timeout(server: &MockServer, timeout_seconds: u64) -> OpenAiCompatibleProvider {
        let cfg = LlmConfig {
            api_base_url: server.url("/v1/chat/completions"),
            model: "gpt-4o-mini".into(),
            timeout_seconds,
        };
        OpenAiCompatibleProvider::new(&cfg, "sk-test".into()).unwrap()
    }

    #[test]
    fn prompt_lists_each_match() {
        let a = anna();
        let leo = Consultant::new(2, "Leo T.", &["python", "react"], 20.0);
        let prompt = build_prompt(&[&a, &leo], &criteria(50.0, "python"));
        assert!(prompt.system.contains("norsk"));
        assert!(prompt.user.contains("minst 50% tilgjengelighet"));
        assert!(prompt.user.contains("'python'"));
        assert!(prompt.user.contains("- Anna K.: 60% tilgjengelighet, ferdigheter: python, docker"));
        assert!(prompt.user.contains("- Leo T.: 80% tilgjengelighet, ferdigheter: python, react"));
    }

    #[tokio::test]
    async fn template_only_uses_fallback() {
        let a = anna();
        let s = Summarizer::template_only();
        assert!(matches!(s.generate(&[&a], &criteria(50.0, "python")).await, LlmOutcome::Disabled));
        let summary = s.summarize(&[&a], &criteria(50.0, "python")).await;
        assert_eq!(summary.source, SummarySource::Template);
        assert_eq!(summary.text, fallback::render(&[&a], 50.0, "python"));
    }

    #[tokio::test]
    async fn empty_set_never_calls_model() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200).json_body(json!({
                    "choices": [{"message": {"content": "skal ikke brukes"}}]
                }));
            })
            .await;

        let s = Summarizer::with_provider(provider_for(&server));
        let summary = s.summarize(&[], &criteria(70.0, "python")).await;
        assert_eq!(
            summary.text,
            "Fant ingen konsulenter med minst 70% tilgjengelighet og ferdigheten 'python'."
        );
        assert_eq!(summary.source, SummarySource::Template);
        mock.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn model_text_is_used_when_call_succeeds() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200).json_body(json!({
                    "choices": [{"message": {"content": "\nAnna K. er ledig for Python-oppdrag.  "}}]
                }));
            })
            .await;

        let a = anna();
        let s = Summarizer::with_provider(provider_for(&server));
        let summary = s.summarize(&[&a], &criteria(50.0, "python")).await;
        mock.assert_hits_async(1).await;
        assert_eq!(summary.source, SummarySource::Llm);
        assert_eq!(summary.text, "Anna K. er ledig for Python-oppdrag.");
    }

    #[tokio::test]
    async fn model_failure_falls_back_to_template() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(401).json_body(json!({"error": {"message": "Incorrect API key"}}));
            })
            .await;

        let a = anna();
        let s = Summarizer::with_provider(provider_for(&server));
        let summary = s.summarize(&[&a], &criteria(50.0, "python")).await;
        mock.assert_hits_async(1).await;
        assert_eq!(summary.source, SummarySource::Template);
        assert_eq!(
            summary.text,
            "Fant 1 konsulent med minst 50% tilgjengelighet og ferdigheten 'python'. Anna K. har 60% tilgjengelighet."
        );
    }

    #[tokio::test]
    async fn slow_model_falls_back_to_template() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200)
                    .delay(std::time::Duration::from_secs(3))
                    .json_body(json!({"choices": [{"message": {"content": "for sent"}}]}));
            })
            .await;

        let a = anna();
        let s = Summarizer::with_provider(provider_with_timeout(&server, 1));
        match s.generate(&[&a], &criteria(50.0, "python")).await {
            LlmOutcome::Failed(ProviderError::Request(cause)) => {
                assert!(cause.to_lowercase().contains("timed out"), "{cause}");
            }
            other => panic!("expected a timed-out request, got {other:?}"),
        }

        let started = std::time::Instant::now();
        let summary = s.summarize(&[&a], &criteria(50.0, "python")).await;
        assert!(started.elapsed() < std::time::Duration::from_secs(3));
        mock.assert_hits_async(2).await;
        assert_eq!(summary.source, SummarySource::Template);
        assert_eq!(
            summary.text,
            "Fant 1 konsulent med minst 50% tilgjengelighet og ferdigheten 'python'. Anna K. har 60% tilgjengelighet."
        );
    }
}
