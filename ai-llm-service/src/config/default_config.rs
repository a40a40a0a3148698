//! Builds a validated [`LlmModelConfig`] from explicit settings values.
//!
//! A config that leaves here is safe to hand to
//! [`crate::llm_service::LlmService::new`].

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ConfigError, validate_http_endpoint, validate_range_f32},
};

/// Default generation timeout for every provider.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default completion budget; Anthropic requires an explicit value.
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Builds and validates a config from explicit values.
///
/// - `base_url` is required for [`LlmProvider::Local`]; hosted providers use
///   their vendor endpoint when it is blank.
/// - `api_key` is required for hosted providers.
///
/// # Errors
/// - [`ConfigError::EmptyModel`] if `model` is blank
/// - [`ConfigError::InvalidFormat`] if the endpoint is missing or not http(s)
/// - [`ConfigError::OutOfRange`] if `temperature` is outside `0.0..=2.0`
/// - [`ConfigError::MissingVar`] if a hosted provider has no API key
pub fn model_config(
    provider: LlmProvider,
    model: &str,
    base_url: Option<&str>,
    temperature: Option<f32>,
    api_key: Option<&str>,
) -> Result<LlmModelConfig, AiLlmError> {
    let model = model.trim();
    if model.is_empty() {
        return Err(ConfigError::EmptyModel.into());
    }

    let endpoint = match base_url.map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) => url.to_string(),
        None => provider
            .default_endpoint()
            .ok_or(ConfigError::InvalidFormat {
                var: "llm_base_url",
                reason: "a base URL is required for the local provider",
            })?
            .to_string(),
    };
    validate_http_endpoint("llm_base_url", &endpoint)?;

    if let Some(t) = temperature {
        validate_range_f32("temperature", t, 0.0, 2.0, "expected 0.0..=2.0")?;
    }

    let api_key = api_key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string);
    if provider.is_hosted() && api_key.is_none() {
        return Err(ConfigError::MissingVar(provider.api_key_env().unwrap_or("api_key")).into());
    }

    Ok(LlmModelConfig {
        provider,
        model: model.to_string(),
        endpoint,
        api_key,
        max_tokens: Some(DEFAULT_MAX_TOKENS),
        temperature,
        timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handler::FailureKind;

    #[test]
    fn local_requires_base_url() {
        let err = model_config(LlmProvider::Local, "m", None, None, None).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Configuration);

        let cfg = model_config(
            LlmProvider::Local,
            "m",
            Some("http://localhost:1234/"),
            Some(0.3),
            None,
        )
        .unwrap();
        assert_eq!(cfg.base_url(), "http://localhost:1234");
        assert_eq!(cfg.api_key, None);
    }

    #[test]
    fn hosted_defaults_endpoint_and_requires_key() {
        let cfg = model_config(
            LlmProvider::Gemini,
            "gemini-1.5-flash",
            Some("  "),
            None,
            Some("k"),
        )
        .unwrap();
        assert_eq!(cfg.endpoint, "https://generativelanguage.googleapis.com");

        let err = model_config(LlmProvider::Anthropic, "claude", None, None, Some(" ")).unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn rejects_empty_model_and_bad_temperature() {
        assert!(model_config(LlmProvider::OpenAI, " ", None, None, Some("k")).is_err());
        assert!(model_config(LlmProvider::OpenAI, "gpt", None, Some(3.0), Some("k")).is_err());
        assert!(
            model_config(LlmProvider::Local, "m", Some("ftp://x"), None, None).is_err()
        );
    }
}
