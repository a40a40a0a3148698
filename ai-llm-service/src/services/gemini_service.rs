//! Google Gemini (Generative Language API) client.
//!
//! - POST {endpoint}/v1beta/models/{model}:generateContent
//!
//! Auth uses the `x-goog-api-key` header. The system prompt maps to
//! `systemInstruction`, sampling knobs to `generationConfig`.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ProviderError, ProviderErrorKind},
    llm_service::GenerateParams,
    services::{checked_endpoint, status_error},
};

/// Thin client for Gemini `generateContent`.
#[derive(Debug)]
pub struct GeminiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_generate: String,
}

impl GeminiService {
    /// Creates a new [`GeminiService`] from the given config.
    ///
    /// # Errors
    /// - [`AiLlmError::Provider`] with `InvalidProvider` if `cfg.provider` is not Gemini
    /// - [`AiLlmError::Provider`] with `MissingApiKey` if no key is configured
    /// - [`AiLlmError::Provider`] with `InvalidEndpoint` if `cfg.endpoint` is invalid
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        const PROVIDER: LlmProvider = LlmProvider::Gemini;
        if cfg.provider != PROVIDER {
            return Err(ProviderError::new(PROVIDER, ProviderErrorKind::InvalidProvider).into());
        }

        let api_key = cfg
            .api_key()
            .ok_or_else(|| ProviderError::new(PROVIDER, ProviderErrorKind::MissingApiKey))?;

        let base = checked_endpoint(PROVIDER, &cfg.endpoint)?;
        let timeout = Duration::from_secs(cfg.timeout_secs.unwrap_or(60));

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            header::HeaderValue::from_str(api_key).map_err(|e| {
                ProviderError::new(
                    PROVIDER,
                    ProviderErrorKind::Decode(format!("invalid API key header: {e}")),
                )
            })?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let url_generate = format!("{base}/v1beta/models/{}:generateContent", cfg.model.trim());

        info!(
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            timeout_secs = timeout.as_secs(),
            "GeminiService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_generate,
        })
    }

    /// Config this client was built with.
    pub fn config(&self) -> &LlmModelConfig {
        &self.cfg
    }

    /// Generates text for a single-turn prompt.
    ///
    /// # Errors
    /// - [`AiLlmError::Provider`] with `HttpStatus` for non-2xx responses
    ///   (Gemini answers an invalid key with 400 `API_KEY_INVALID` or 403)
    /// - [`AiLlmError::HttpTransport`] for client/network failures
    /// - [`AiLlmError::Provider`] with `Decode` if the JSON cannot be parsed
    /// - [`AiLlmError::Provider`] with `EmptyChoices` if no candidate text exists
    pub async fn generate(
        &self,
        prompt: &str,
        params: &GenerateParams<'_>,
    ) -> Result<String, AiLlmError> {
        let started = Instant::now();
        let provider = self.cfg.provider;

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
            system_instruction: params.system.map(|sys| Content {
                role: None,
                parts: vec![Part { text: sys }],
            }),
            generation_config: GenerationConfig {
                temperature: params.temperature.or(self.cfg.temperature),
                max_output_tokens: params.max_tokens.or(self.cfg.max_tokens),
            },
        };

        debug!(
            model = %self.cfg.model,
            prompt_len = prompt.len(),
            has_system = params.system.is_some(),
            "POST {}", self.url_generate
        );

        let resp = self
            .client
            .post(&self.url_generate)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(
                status_error(provider, &self.cfg.model, &self.url_generate, resp, started).await,
            );
        }

        let out: GenerateContentResponse = resp.json().await.map_err(|e| {
            error!(
                error = %e,
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "failed to decode generateContent response"
            );
            ProviderError::new(
                provider,
                ProviderErrorKind::Decode(format!(
                    "serde error: {e}; expected `candidates[0].content.parts[].text`"
                )),
            )
        })?;

        let Some(candidate) = out.candidates.into_iter().next() else {
            if let Some(reason) = out.prompt_feedback.and_then(|f| f.block_reason) {
                warn!(model = %self.cfg.model, %reason, "prompt blocked by Gemini");
            }
            return Err(ProviderError::new(provider, ProviderErrorKind::EmptyChoices).into());
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ProviderError::new(provider, ProviderErrorKind::EmptyChoices).into());
        }

        info!(
            model = %self.cfg.model,
            finish_reason = candidate.finish_reason.as_deref().unwrap_or("n/a"),
            latency_ms = started.elapsed().as_millis(),
            "generateContent completed"
        );

        Ok(text)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartOut>,
}

#[derive(Debug, Deserialize)]
struct PartOut {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handler::FailureKind;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cfg(endpoint: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Gemini,
            model: "gemini-1.5-flash".into(),
            endpoint: endpoint.into(),
            api_key: Some("g-key".into()),
            max_tokens: Some(512),
            temperature: Some(0.7),
            timeout_secs: Some(5),
        }
    }

    #[tokio::test]
    async fn generate_reads_candidate_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(header("x-goog-api-key", "g-key"))
            .and(body_partial_json(json!({
                "systemInstruction": {"parts": [{"text": "sys"}]},
                "generationConfig": {"maxOutputTokens": 512}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Hello "}, {"text": "there"}]},
                    "finishReason": "STOP"
                }]
            })))
            .mount(&server)
            .await;

        let svc = GeminiService::new(cfg(&server.uri())).unwrap();
        let params = GenerateParams {
            system: Some("sys"),
            ..Default::default()
        };
        assert_eq!(svc.generate("hi", &params).await.unwrap(), "Hello there");
    }

    #[tokio::test]
    async fn blocked_prompt_has_no_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let svc = GeminiService::new(cfg(&server.uri())).unwrap();
        let err = svc.generate("hi", &GenerateParams::default()).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::MalformedResponse);
    }

    #[tokio::test]
    async fn forbidden_key_is_authentication_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": 403, "status": "PERMISSION_DENIED"}
            })))
            .mount(&server)
            .await;

        let svc = GeminiService::new(cfg(&server.uri())).unwrap();
        let err = svc.generate("hi", &GenerateParams::default()).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Authentication);
    }
}
