//! Anthropic Messages API client.
//!
//! - POST {endpoint}/v1/messages — single non-streaming message
//!
//! Auth uses `x-api-key` plus the pinned `anthropic-version` header.
//! The system prompt travels in the top-level `system` field, not as a message.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    config::{default_config::DEFAULT_MAX_TOKENS, llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ProviderError, ProviderErrorKind},
    llm_service::GenerateParams,
    services::{checked_endpoint, status_error},
};

/// API version header value sent with every request.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Thin client for Anthropic's Messages API.
#[derive(Debug)]
pub struct AnthropicService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_messages: String,
}

impl AnthropicService {
    /// Creates a new [`AnthropicService`] from the given config.
    ///
    /// # Errors
    /// - [`AiLlmError::Provider`] with `InvalidProvider` if `cfg.provider` is not Anthropic
    /// - [`AiLlmError::Provider`] with `MissingApiKey` if no key is configured
    /// - [`AiLlmError::Provider`] with `InvalidEndpoint` if `cfg.endpoint` is invalid
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        const PROVIDER: LlmProvider = LlmProvider::Anthropic;
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
            "x-api-key",
            header::HeaderValue::from_str(api_key).map_err(|e| {
                ProviderError::new(
                    PROVIDER,
                    ProviderErrorKind::Decode(format!("invalid API key header: {e}")),
                )
            })?,
        );
        headers.insert(
            "anthropic-version",
            header::HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let url_messages = format!("{base}/v1/messages");

        info!(
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            timeout_secs = timeout.as_secs(),
            "AnthropicService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_messages,
        })
    }

    /// Config this client was built with.
    pub fn config(&self) -> &LlmModelConfig {
        &self.cfg
    }

    /// Sends one user message and returns the concatenated text blocks.
    ///
    /// # Errors
    /// - [`AiLlmError::Provider`] with `HttpStatus` for non-2xx responses
    /// - [`AiLlmError::HttpTransport`] for client/network failures
    /// - [`AiLlmError::Provider`] with `Decode` if the JSON cannot be parsed
    /// - [`AiLlmError::Provider`] with `EmptyChoices` if no text block is returned
    pub async fn generate(
        &self,
        prompt: &str,
        params: &GenerateParams<'_>,
    ) -> Result<String, AiLlmError> {
        let started = Instant::now();
        let provider = self.cfg.provider;
        let body = MessagesRequest {
            model: &self.cfg.model,
            max_tokens: params
                .max_tokens
                .or(self.cfg.max_tokens)
                .unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: params.temperature.or(self.cfg.temperature),
            system: params.system,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        debug!(
            model = %self.cfg.model,
            prompt_len = prompt.len(),
            has_system = params.system.is_some(),
            "POST {}", self.url_messages
        );

        let resp = self
            .client
            .post(&self.url_messages)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(
                status_error(provider, &self.cfg.model, &self.url_messages, resp, started).await,
            );
        }

        let out: MessagesResponse = resp.json().await.map_err(|e| {
            error!(
                error = %e,
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "failed to decode /v1/messages response"
            );
            ProviderError::new(
                provider,
                ProviderErrorKind::Decode(format!("serde error: {e}; expected `content[].text`")),
            )
        })?;

        let text: String = out
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(ProviderError::new(provider, ProviderErrorKind::EmptyChoices).into());
        }

        info!(
            model = %self.cfg.model,
            stop_reason = out.stop_reason.as_deref().unwrap_or("n/a"),
            latency_ms = started.elapsed().as_millis(),
            "message completed"
        );

        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
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
            provider: LlmProvider::Anthropic,
            model: "claude-3-5-haiku-latest".into(),
            endpoint: endpoint.into(),
            api_key: Some("ak".into()),
            max_tokens: None,
            temperature: Some(0.5),
            timeout_secs: Some(5),
        }
    }

    #[tokio::test]
    async fn joins_text_blocks_and_sends_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "ak"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .and(body_partial_json(json!({
                "max_tokens": DEFAULT_MAX_TOKENS,
                "system": "grade strictly"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [
                    {"type": "text", "text": "Score: "},
                    {"type": "text", "text": "8/10"}
                ],
                "stop_reason": "end_turn"
            })))
            .mount(&server)
            .await;

        let svc = AnthropicService::new(cfg(&server.uri())).unwrap();
        let params = GenerateParams {
            system: Some("grade strictly"),
            ..Default::default()
        };
        assert_eq!(svc.generate("grade this", &params).await.unwrap(), "Score: 8/10");
    }

    #[tokio::test]
    async fn missing_content_field_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "msg_1"})))
            .mount(&server)
            .await;

        let svc = AnthropicService::new(cfg(&server.uri())).unwrap();
        let err = svc.generate("x", &GenerateParams::default()).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::MalformedResponse);
    }
}
