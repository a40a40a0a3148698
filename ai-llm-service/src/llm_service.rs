//! Provider-polymorphic text generation.
//!
//! [`LlmService`] is a tagged variant with one client per provider calling
//! convention. It is built once from an [`LlmModelConfig`] and keeps its own
//! copy of that config, so it stays bound to the provider it was constructed
//! for even if the application's settings change afterwards.
//!
//! # Example
//! ```no_run
//! use ai_llm_service::config::default_config::model_config;
//! use ai_llm_service::config::llm_provider::LlmProvider;
//! use ai_llm_service::llm_service::{GenerateParams, LlmService};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = model_config(
//!     LlmProvider::Local,
//!     "qwen2.5-7b-instruct",
//!     Some("http://localhost:1234"),
//!     Some(0.7),
//!     None,
//! )?;
//! let svc = LlmService::new(cfg)?;
//! let text = svc.generate("Explain dropout in one sentence.", &GenerateParams::default()).await?;
//! println!("{text}");
//! # Ok(()) }
//! ```

use tracing::{info, instrument};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::AiLlmError,
    health_service::{HealthService, HealthStatus},
    services::{
        anthropic_service::AnthropicService, gemini_service::GeminiService,
        open_ai_service::OpenAiService,
    },
};

/// Per-call generation knobs. Unset fields fall back to the model config.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateParams<'a> {
    /// Optional system instruction.
    pub system: Option<&'a str>,
    /// Overrides the configured temperature.
    pub temperature: Option<f32>,
    /// Overrides the configured completion budget.
    pub max_tokens: Option<u32>,
}

/// One capability ("generate text from a prompt"), one implementation per provider.
#[derive(Debug)]
pub enum LlmService {
    /// Local OpenAI-compatible server.
    Local(OpenAiService),
    /// Hosted OpenAI.
    OpenAI(OpenAiService),
    /// Hosted Anthropic.
    Anthropic(AnthropicService),
    /// Hosted Google Gemini.
    Gemini(GeminiService),
}

impl LlmService {
    /// Builds the client matching `cfg.provider`.
    ///
    /// # Errors
    /// Propagates the provider client's construction errors (missing key,
    /// invalid endpoint, HTTP client build failure).
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        let provider = cfg.provider;
        let svc = match provider {
            LlmProvider::Local => LlmService::Local(OpenAiService::new(cfg)?),
            LlmProvider::OpenAI => LlmService::OpenAI(OpenAiService::new(cfg)?),
            LlmProvider::Anthropic => LlmService::Anthropic(AnthropicService::new(cfg)?),
            LlmProvider::Gemini => LlmService::Gemini(GeminiService::new(cfg)?),
        };
        info!(%provider, model = %svc.config().model, "LlmService ready");
        Ok(svc)
    }

    /// Provider this instance is bound to.
    pub fn provider(&self) -> LlmProvider {
        self.config().provider
    }

    /// Config captured at construction time.
    pub fn config(&self) -> &LlmModelConfig {
        match self {
            LlmService::Local(s) | LlmService::OpenAI(s) => s.config(),
            LlmService::Anthropic(s) => s.config(),
            LlmService::Gemini(s) => s.config(),
        }
    }

    /// Generates text for `prompt`.
    ///
    /// # Errors
    /// Any transport, authentication or decoding failure as [`AiLlmError`];
    /// use [`AiLlmError::kind`] to tell them apart.
    #[instrument(skip_all, fields(provider = %self.provider(), prompt_len = prompt.len()))]
    pub async fn generate(
        &self,
        prompt: &str,
        params: &GenerateParams<'_>,
    ) -> Result<String, AiLlmError> {
        match self {
            LlmService::Local(s) | LlmService::OpenAI(s) => s.generate(prompt, params).await,
            LlmService::Anthropic(s) => s.generate(prompt, params).await,
            LlmService::Gemini(s) => s.generate(prompt, params).await,
        }
    }

    /// Runs the provider health probe for this instance's config.
    pub async fn health(&self, health: &HealthService) -> HealthStatus {
        health.check(self.config()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_config::model_config;
    use crate::error_handler::FailureKind;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn routes_to_matching_variant() {
        let cfg = model_config(LlmProvider::Gemini, "gemini-1.5-flash", None, None, Some("k")).unwrap();
        assert!(matches!(LlmService::new(cfg).unwrap(), LlmService::Gemini(_)));

        let cfg = model_config(LlmProvider::Anthropic, "claude", None, None, Some("k")).unwrap();
        assert!(matches!(LlmService::new(cfg).unwrap(), LlmService::Anthropic(_)));
    }

    #[test]
    fn later_config_changes_do_not_rebind_service() {
        let mut cfg =
            model_config(LlmProvider::Local, "m", Some("http://localhost:1234"), None, None).unwrap();
        let svc = LlmService::new(cfg.clone()).unwrap();

        cfg.provider = LlmProvider::OpenAI;
        cfg.model = "gpt-4o-mini".into();

        assert_eq!(svc.provider(), LlmProvider::Local);
        assert_eq!(svc.config().model, "m");
    }

    #[tokio::test]
    async fn local_provider_generates_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "Dropout zeroes random activations."}}]
            })))
            .mount(&server)
            .await;

        let cfg = model_config(LlmProvider::Local, "m", Some(&server.uri()), Some(0.7), None).unwrap();
        let svc = LlmService::new(cfg).unwrap();
        let out = svc
            .generate("Explain dropout.", &GenerateParams::default())
            .await
            .unwrap();
        assert!(out.contains("Dropout"));
    }

    #[tokio::test]
    async fn unreachable_base_url_is_transport_error() {
        // Port 9 (discard) is closed on test hosts; connection is refused.
        let cfg = model_config(LlmProvider::Local, "m", Some("http://127.0.0.1:9"), None, None).unwrap();
        let svc = LlmService::new(cfg).unwrap();
        let err = svc.generate("hi", &GenerateParams::default()).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
    }
}
