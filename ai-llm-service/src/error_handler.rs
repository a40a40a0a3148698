//! Unified error handling for `ai-llm-service`.
//!
//! This module exposes a single top-level error type [`AiLlmError`] for the whole
//! library, and groups domain-specific errors in nested enums (e.g., [`ConfigError`],
//! [`ProviderError`], [`HealthError`]). Callers that only need to know *what kind*
//! of failure happened use [`AiLlmError::kind`].
//!
//! All messages include the suffix `[AI LLM Service]` to simplify attribution in logs.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

use crate::config::llm_provider::LlmProvider;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, AiLlmError>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `ai-llm-service` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AiLlmError {
    /// Configuration/validation errors (construction time).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Errors raised while talking to a concrete provider.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Health-check/connectivity/decoding errors.
    #[error(transparent)]
    Health(#[from] HealthError),

    /// Underlying HTTP transport error (e.g., `reqwest::Error`).
    #[error("[AI LLM Service] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),
}

/// Coarse classification of a failure, independent of the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Invalid or incomplete configuration detected before any request.
    Configuration,
    /// Network failure, timeout, or a 5xx from upstream.
    Transport,
    /// Missing credential or 401/403 from upstream.
    Authentication,
    /// Upstream answered 2xx but the payload was unusable.
    MalformedResponse,
    /// Any other non-success status (4xx other than auth).
    Upstream,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Configuration => "configuration",
            FailureKind::Transport => "transport",
            FailureKind::Authentication => "authentication",
            FailureKind::MalformedResponse => "malformed response",
            FailureKind::Upstream => "upstream",
        };
        f.write_str(s)
    }
}

impl AiLlmError {
    /// Classifies the error into a [`FailureKind`].
    pub fn kind(&self) -> FailureKind {
        match self {
            AiLlmError::Config(_) => FailureKind::Configuration,
            AiLlmError::HttpTransport(e) if e.is_decode() => FailureKind::MalformedResponse,
            AiLlmError::HttpTransport(_) => FailureKind::Transport,
            AiLlmError::Provider(p) => p.kind.failure_kind(),
            AiLlmError::Health(h) => match h {
                HealthError::HttpStatus(http) => http.failure_kind(),
                HealthError::Decode(_) => FailureKind::MalformedResponse,
            },
        }
    }
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Construction-time validation errors.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required value (usually the provider's API key) is missing or empty.
    #[error("[AI LLM Service] missing required value: {0}")]
    MissingVar(&'static str),

    /// Unsupported provider identifier.
    #[error("[AI LLM Service] unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Value had the wrong format (e.g., invalid URL).
    #[error("[AI LLM Service] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Field name (e.g., `llm_base_url`).
        var: &'static str,
        /// Explanation (e.g., `must start with http:// or https://`).
        reason: &'static str,
    },

    /// A numeric field was outside of the allowed range.
    #[error("[AI LLM Service] {field} is out of range: {detail}")]
    OutOfRange {
        /// Field name (e.g., `temperature`).
        field: &'static str,
        /// Description of the expected range.
        detail: &'static str,
    },

    /// Model name was empty or invalid.
    #[error("[AI LLM Service] model name must not be empty")]
    EmptyModel,
}

/* ------------------------------------------------------------------------- */
/* Provider errors                                                           */
/* ------------------------------------------------------------------------- */

/// Non-success HTTP response details.
#[derive(Debug)]
pub struct HttpError {
    /// Numeric HTTP status code.
    pub status: StatusCode,
    /// Request URL.
    pub url: String,
    /// Short snippet of the response body (trimmed).
    pub snippet: String,
}

impl HttpError {
    fn failure_kind(&self) -> FailureKind {
        match self.status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FailureKind::Authentication,
            // Gemini reports a bad key as 400 with this reason.
            StatusCode::BAD_REQUEST if self.snippet.contains("API_KEY_INVALID") => {
                FailureKind::Authentication
            }
            s if s.is_server_error() => FailureKind::Transport,
            _ => FailureKind::Upstream,
        }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {} from {}: {}", self.status, self.url, self.snippet)
    }
}

/// What went wrong inside a provider client.
#[non_exhaustive]
#[derive(Debug)]
pub enum ProviderErrorKind {
    /// The config was routed to the wrong client.
    InvalidProvider,
    /// Hosted provider without an API key.
    MissingApiKey,
    /// Endpoint is empty or lacks http/https.
    InvalidEndpoint(String),
    /// Upstream returned a non-successful HTTP status.
    HttpStatus(HttpError),
    /// Payload could not be decoded.
    Decode(String),
    /// Response decoded but carried no generated text.
    EmptyChoices,
}

impl ProviderErrorKind {
    fn failure_kind(&self) -> FailureKind {
        match self {
            ProviderErrorKind::InvalidProvider | ProviderErrorKind::InvalidEndpoint(_) => {
                FailureKind::Configuration
            }
            ProviderErrorKind::MissingApiKey => FailureKind::Authentication,
            ProviderErrorKind::HttpStatus(http) => http.failure_kind(),
            ProviderErrorKind::Decode(_) | ProviderErrorKind::EmptyChoices => {
                FailureKind::MalformedResponse
            }
        }
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderErrorKind::InvalidProvider => f.write_str("config routed to wrong provider"),
            ProviderErrorKind::MissingApiKey => f.write_str("missing API key"),
            ProviderErrorKind::InvalidEndpoint(e) => write!(f, "invalid endpoint: {e}"),
            ProviderErrorKind::HttpStatus(http) => http.fmt(f),
            ProviderErrorKind::Decode(msg) => write!(f, "decode error: {msg}"),
            ProviderErrorKind::EmptyChoices => f.write_str("response contained no generated text"),
        }
    }
}

/// Provider-attributed error.
#[derive(Debug, Error)]
#[error("[AI LLM Service] {provider}: {kind}")]
pub struct ProviderError {
    pub provider: LlmProvider,
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    pub fn new(provider: LlmProvider, kind: ProviderErrorKind) -> Self {
        Self { provider, kind }
    }
}

/* ------------------------------------------------------------------------- */
/* Health errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for provider health checks.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum HealthError {
    /// Upstream returned a non-successful HTTP status.
    #[error("[AI LLM Service] {0}")]
    HttpStatus(HttpError),

    /// Response payload could not be decoded as expected.
    #[error("[AI LLM Service] decode error: {0}")]
    Decode(String),
}

/* ------------------------------------------------------------------------- */
/* Helpers                                                                   */
/* ------------------------------------------------------------------------- */

/// Reads an optional, non-empty environment variable.
pub fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Maximum number of characters kept from an upstream error body.
pub const SNIPPET_MAX_CHARS: usize = 240;

/// Trims a response body into a single-line snippet for logs and errors.
pub fn make_snippet(body: &str) -> String {
    let flat: String = body
        .trim()
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .take(SNIPPET_MAX_CHARS)
        .collect();
    flat
}

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
///
/// # Errors
/// Returns [`AiLlmError::Config`] with [`ConfigError::InvalidFormat`] when
/// the string does not start with a valid HTTP scheme.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    let value = value.trim();
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

/// Validates that a floating-point value lies within an inclusive range.
///
/// # Errors
/// Returns [`AiLlmError::Config`] with [`ConfigError::OutOfRange`] if `value`
/// is outside `[min, max]` or not finite.
pub fn validate_range_f32(
    field: &'static str,
    value: f32,
    min: f32,
    max: f32,
    detail: &'static str,
) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, detail }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_is_flat_and_bounded() {
        let body = format!("line one\nline two\t{}", "x".repeat(500));
        let s = make_snippet(&body);
        assert!(!s.contains('\n'));
        assert_eq!(s.chars().count(), SNIPPET_MAX_CHARS);
    }

    #[test]
    fn auth_statuses_classify_as_authentication() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let err: AiLlmError = ProviderError::new(
                LlmProvider::Gemini,
                ProviderErrorKind::HttpStatus(HttpError {
                    status,
                    url: "https://example.test".into(),
                    snippet: String::new(),
                }),
            )
            .into();
            assert_eq!(err.kind(), FailureKind::Authentication);
        }
    }

    #[test]
    fn server_errors_classify_as_transport() {
        let err: AiLlmError = HealthError::HttpStatus(HttpError {
            status: StatusCode::BAD_GATEWAY,
            url: "http://localhost".into(),
            snippet: String::new(),
        })
        .into();
        assert_eq!(err.kind(), FailureKind::Transport);
    }

    #[test]
    fn empty_choices_is_malformed() {
        let err: AiLlmError =
            ProviderError::new(LlmProvider::OpenAI, ProviderErrorKind::EmptyChoices).into();
        assert_eq!(err.kind(), FailureKind::MalformedResponse);
        assert!(err.to_string().contains("openai"));
    }

    #[test]
    fn endpoint_and_range_validation() {
        assert!(validate_http_endpoint("llm_base_url", "http://localhost:1234").is_ok());
        assert!(validate_http_endpoint("llm_base_url", "localhost:1234").is_err());
        assert!(validate_range_f32("temperature", 0.7, 0.0, 1.0, "0..=1").is_ok());
        assert!(validate_range_f32("temperature", f32::NAN, 0.0, 1.0, "0..=1").is_err());
        assert!(validate_range_f32("temperature", 1.5, 0.0, 1.0, "0..=1").is_err());
    }
}
