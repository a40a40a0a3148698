use crate::config::llm_provider::LlmProvider;

/// Configuration for an LLM model invocation.
///
/// A service instance takes ownership of a clone of this value at construction
/// time; later changes to the caller's copy never reach an existing service.
///
/// # Fields
///
/// - `provider`: Which LLM provider/backend to use.
/// - `model`: The model identifier (e.g., `"gpt-4o-mini"`, `"gemini-1.5-flash"`).
/// - `endpoint`: Base URL (local server or vendor API root, without path).
/// - `api_key`: API key for providers that require authentication.
/// - `max_tokens`: Maximum number of tokens to generate (if supported).
/// - `temperature`: Controls randomness (0.0 = deterministic).
/// - `timeout_secs`: Optional request timeout in seconds.
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::Local,
///     model: "qwen2.5-7b-instruct".to_string(),
///     endpoint: "http://localhost:1234".to_string(),
///     api_key: None,
///     max_tokens: Some(2048),
///     temperature: Some(0.7),
///     timeout_secs: Some(60),
/// };
/// assert!(!cfg.provider.is_hosted());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    /// The LLM provider/backend.
    pub provider: LlmProvider,

    /// Model identifier string.
    pub model: String,

    /// Base URL (local socket/URL or remote API root).
    pub endpoint: String,

    /// Optional API key for authentication.
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature (controls creativity).
    pub temperature: Option<f32>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    /// Endpoint ready for path concatenation, see [`normalize_endpoint`].
    pub fn base_url(&self) -> &str {
        normalize_endpoint(&self.endpoint)
    }

    /// API key trimmed, `None` when absent or blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// Trims whitespace, trailing slashes and one trailing `/v1`.
///
/// LM Studio documents its server as `http://localhost:1234/v1`; clients
/// append the versioned path themselves.
pub fn normalize_endpoint(endpoint: &str) -> &str {
    let trimmed = endpoint.trim().trim_end_matches('/');
    trimmed
        .strip_suffix("/v1")
        .map(|s| s.trim_end_matches('/'))
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_drops_trailing_version_segment() {
        assert_eq!(normalize_endpoint("http://localhost:1234/v1/"), "http://localhost:1234");
        assert_eq!(normalize_endpoint(" http://localhost:1234/ "), "http://localhost:1234");
        assert_eq!(normalize_endpoint("https://proxy.test/openai/v1"), "https://proxy.test/openai");
        assert_eq!(normalize_endpoint("http://host/v1beta"), "http://host/v1beta");
    }
}
