//! Universal health service for LLM backends.
//!
//! Lightweight probes per provider:
//! - Local / OpenAI: `GET {endpoint}/v1/models` (Bearer auth when a key is set)
//! - Anthropic:      `GET {endpoint}/v1/models` with `x-api-key`
//! - Gemini:         `GET {endpoint}/v1beta/models/{model}` with `x-goog-api-key`
//!
//! The returned [`HealthStatus`] is JSON-serializable and suitable for a `/health` endpoint.
//! [`HealthService::check`] is resilient and never fails (errors mapped to `ok=false`).
//! Provider-specific probes (`try_*`) return strict `Result`.

use std::time::{Duration, Instant};

use reqwest::{StatusCode, header};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::llm_model_config::LlmModelConfig;
use crate::config::llm_provider::LlmProvider;
use crate::error_handler::{AiLlmError, HealthError, HttpError, make_snippet};
use crate::services::anthropic_service::ANTHROPIC_VERSION;

/// A serializable health snapshot for a single provider/config.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Backend/provider identifier (e.g., "google").
    pub provider: String,
    /// Target endpoint base URL.
    pub endpoint: String,
    /// Model identifier relevant to the probe.
    pub model: Option<String>,
    /// Overall health flag.
    pub ok: bool,
    /// Measured HTTP latency in milliseconds for the main probe.
    pub latency_ms: u128,
    /// Short human-readable message with details.
    pub message: String,
}

impl HealthStatus {
    #[inline]
    fn new(
        ok: bool,
        cfg: &LlmModelConfig,
        latency_ms: u128,
        message: impl Into<String>,
    ) -> Self {
        Self {
            provider: cfg.provider.to_string(),
            endpoint: cfg.endpoint.clone(),
            model: Some(cfg.model.clone()),
            ok,
            latency_ms,
            message: message.into(),
        }
    }
}

/// A universal health checker that reuses a single HTTP client.
pub struct HealthService {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl HealthService {
    /// Creates a new health service with an optional client timeout (seconds).
    ///
    /// # Errors
    /// Returns [`AiLlmError::HttpTransport`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        info!(
            default_timeout_secs = timeout.as_secs(),
            "HealthService initialized"
        );

        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }

    /// Checks health for a single LLM config, routing to the provider-specific probe.
    ///
    /// This method is **resilient**: it never returns an error. Any failure is converted
    /// to `HealthStatus { ok: false, message: ... }`.
    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            warn!(
                provider = %cfg.provider,
                endpoint = %cfg.endpoint,
                "invalid endpoint (empty or missing http/https)"
            );
            return HealthStatus::new(false, cfg, 0, "endpoint is empty or missing http/https");
        }

        let start = Instant::now();
        let result = match cfg.provider {
            LlmProvider::Local | LlmProvider::OpenAI | LlmProvider::Anthropic => {
                self.try_probe_models_list(cfg).await
            }
            LlmProvider::Gemini => self.try_probe_gemini(cfg).await,
        };

        match result {
            Ok(mut status) => {
                if status.latency_ms == 0 {
                    status.latency_ms = start.elapsed().as_millis();
                }
                info!(
                    provider = %status.provider,
                    endpoint = %status.endpoint,
                    model = %status.model.as_deref().unwrap_or("n/a"),
                    ok = status.ok,
                    latency_ms = status.latency_ms,
                    "health probe completed"
                );
                status
            }
            Err(err) => {
                let status = HealthStatus::new(false, cfg, start.elapsed().as_millis(), err.to_string());
                warn!(
                    provider = %status.provider,
                    endpoint = %status.endpoint,
                    latency_ms = status.latency_ms,
                    message = %status.message,
                    "health probe failed"
                );
                status
            }
        }
    }

    /// Strict probe for providers exposing an OpenAI-style `/v1/models` list.
    ///
    /// - Ensure 2xx
    /// - Verify `cfg.model` exists in `data[].id`
    pub async fn try_probe_models_list(
        &self,
        cfg: &LlmModelConfig,
    ) -> Result<HealthStatus, AiLlmError> {
        let url = format!("{}/v1/models", cfg.base_url());
        let mut req = self.client.get(&url).timeout(self.timeout_for(cfg));

        match (cfg.provider, cfg.api_key()) {
            (LlmProvider::Anthropic, Some(key)) => {
                req = req
                    .header("x-api-key", header_value(key)?)
                    .header("anthropic-version", ANTHROPIC_VERSION);
            }
            (LlmProvider::Anthropic | LlmProvider::OpenAI, None) => {
                return Err(HealthError::Decode(format!("missing {} API key", cfg.provider)).into());
            }
            (_, Some(key)) => {
                req = req.header(header::AUTHORIZATION, header_value(&format!("Bearer {key}"))?);
            }
            (_, None) => {}
        }

        let start = Instant::now();
        debug!(provider = %cfg.provider, model = %cfg.model, "GET {}", url);

        let resp = req.send().await?;
        let latency = start.elapsed().as_millis();

        if !resp.status().is_success() {
            return Err(Self::http_failure(cfg, url, resp, latency).await);
        }

        // Expected minimal JSON: { "data": [ { "id": "<model>" }, ... ] }
        #[derive(serde::Deserialize)]
        struct ModelItem {
            id: String,
        }
        #[derive(serde::Deserialize)]
        struct Models {
            data: Vec<ModelItem>,
        }

        match resp.json::<Models>().await {
            Ok(models) => {
                if models.data.iter().any(|m| m.id == cfg.model) {
                    Ok(HealthStatus::new(true, cfg, latency, "provider is healthy; model is available"))
                } else {
                    Ok(HealthStatus::new(
                        false,
                        cfg,
                        latency,
                        "provider is up, but model not found in /v1/models",
                    ))
                }
            }
            Err(e) => {
                warn!(
                    provider = %cfg.provider,
                    model = %cfg.model,
                    error = %e,
                    latency_ms = latency,
                    "failed to decode /v1/models; treating server as reachable"
                );
                Ok(HealthStatus::new(
                    true,
                    cfg,
                    latency,
                    format!("provider is reachable; failed to decode /v1/models: {e}"),
                ))
            }
        }
    }

    /// Strict Gemini probe: fetches the model resource itself.
    ///
    /// A 404 means the key is valid but the model does not exist; 400/401/403
    /// (invalid key) surface as errors.
    pub async fn try_probe_gemini(&self, cfg: &LlmModelConfig) -> Result<HealthStatus, AiLlmError> {
        let url = format!("{}/v1beta/models/{}", cfg.base_url(), cfg.model.trim());
        let key = cfg
            .api_key()
            .ok_or_else(|| HealthError::Decode("missing google API key".into()))?;

        let start = Instant::now();
        debug!(provider = "google", model = %cfg.model, "GET {}", url);

        let resp = self
            .client
            .get(&url)
            .timeout(self.timeout_for(cfg))
            .header("x-goog-api-key", header_value(key)?)
            .send()
            .await?;
        let latency = start.elapsed().as_millis();

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(HealthStatus::new(
                false,
                cfg,
                latency,
                "Gemini key accepted, but model not found",
            ));
        }
        if !resp.status().is_success() {
            return Err(Self::http_failure(cfg, url, resp, latency).await);
        }

        Ok(HealthStatus::new(true, cfg, latency, "Gemini is healthy; model is available"))
    }

    fn timeout_for(&self, cfg: &LlmModelConfig) -> Duration {
        cfg.timeout_secs
            .map(Duration::from_secs)
            .map(|t| t.min(self.default_timeout))
            .unwrap_or(self.default_timeout)
    }

    async fn http_failure(
        cfg: &LlmModelConfig,
        url: String,
        resp: reqwest::Response,
        latency: u128,
    ) -> AiLlmError {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        let snippet = make_snippet(&text);

        error!(
            provider = %cfg.provider,
            %url,
            %status,
            %snippet,
            latency_ms = latency,
            "health probe returned non-success status"
        );

        HealthError::HttpStatus(HttpError {
            status,
            url,
            snippet,
        })
        .into()
    }
}

fn header_value(raw: &str) -> Result<header::HeaderValue, AiLlmError> {
    header::HeaderValue::from_str(raw)
        .map_err(|e| HealthError::Decode(format!("invalid API key header: {e}")).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handler::FailureKind;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cfg(provider: LlmProvider, endpoint: &str, key: Option<&str>) -> LlmModelConfig {
        LlmModelConfig {
            provider,
            model: "m-1".into(),
            endpoint: endpoint.into(),
            api_key: key.map(str::to_string),
            max_tokens: None,
            temperature: None,
            timeout_secs: Some(5),
        }
    }

    #[tokio::test]
    async fn local_model_listed_is_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": "m-1"}]})),
            )
            .mount(&server)
            .await;

        let hs = HealthService::new(Some(5)).unwrap();
        let status = hs.check(&cfg(LlmProvider::Local, &server.uri(), None)).await;
        assert!(status.ok, "{}", status.message);
        assert_eq!(status.provider, "lmstudio");
    }

    #[tokio::test]
    async fn missing_model_is_not_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .and(header("x-api-key", "ak"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": "other"}]})),
            )
            .mount(&server)
            .await;

        let hs = HealthService::new(Some(5)).unwrap();
        let status = hs
            .check(&cfg(LlmProvider::Anthropic, &server.uri(), Some("ak")))
            .await;
        assert!(!status.ok);
        assert!(status.message.contains("model not found"));
    }

    #[tokio::test]
    async fn gemini_invalid_key_is_strict_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1beta/models/m-1"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT",
                          "details": [{"reason": "API_KEY_INVALID"}]}
            })))
            .mount(&server)
            .await;

        let hs = HealthService::new(Some(5)).unwrap();
        let c = cfg(LlmProvider::Gemini, &server.uri(), Some("bad"));
        let err = hs.try_probe_gemini(&c).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Authentication);

        let status = hs.check(&c).await;
        assert!(!status.ok);
    }

    #[tokio::test]
    async fn invalid_endpoint_short_circuits() {
        let hs = HealthService::new(None).unwrap();
        let status = hs.check(&cfg(LlmProvider::Local, "localhost:1234", None)).await;
        assert!(!status.ok);
        assert_eq!(status.latency_ms, 0);
    }
}
