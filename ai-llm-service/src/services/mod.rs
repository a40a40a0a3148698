//! One thin client per provider calling convention.

use std::time::Instant;

use tracing::error;

use crate::{
    config::{llm_model_config::normalize_endpoint, llm_provider::LlmProvider},
    error_handler::{AiLlmError, HttpError, ProviderError, ProviderErrorKind, make_snippet},
};

pub mod anthropic_service;
pub mod gemini_service;
pub mod open_ai_service;

/// Drains a non-success response into a provider error, logging the snippet.
pub(crate) async fn status_error(
    provider: LlmProvider,
    model: &str,
    url: &str,
    resp: reqwest::Response,
    started: Instant,
) -> AiLlmError {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    let snippet = make_snippet(&text);

    error!(
        %provider,
        %status,
        %url,
        %snippet,
        model = %model,
        latency_ms = started.elapsed().as_millis(),
        "generation request returned non-success status"
    );

    ProviderError::new(
        provider,
        ProviderErrorKind::HttpStatus(HttpError {
            status,
            url: url.to_string(),
            snippet,
        }),
    )
    .into()
}

/// Validates the endpoint scheme and returns its normalized base URL.
pub(crate) fn checked_endpoint(provider: LlmProvider, endpoint: &str) -> Result<String, AiLlmError> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
    {
        return Err(ProviderError::new(
            provider,
            ProviderErrorKind::InvalidEndpoint(endpoint.to_string()),
        )
        .into());
    }
    Ok(normalize_endpoint(endpoint).to_string())
}
