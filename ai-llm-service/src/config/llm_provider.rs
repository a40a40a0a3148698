use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error_handler::ConfigError;

/// Represents the provider (backend) used for large language model (LLM) inference.
///
/// The string forms match the `llm_provider` values accepted in the settings
/// file: `lmstudio` (alias `local`), `openai`, `anthropic`, `google` (alias `gemini`).
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::llm_provider::LlmProvider;
///
/// let p: LlmProvider = "google".parse().unwrap();
/// assert_eq!(p, LlmProvider::Gemini);
/// assert!(p.is_hosted());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LlmProvider {
    /// Local OpenAI-compatible server (LM Studio and friends).
    #[serde(rename = "lmstudio", alias = "local")]
    Local,
    /// OpenAI's hosted API.
    #[serde(rename = "openai")]
    OpenAI,
    /// Anthropic's hosted Messages API.
    #[serde(rename = "anthropic")]
    Anthropic,
    /// Google Gemini (Generative Language API).
    #[serde(rename = "google", alias = "gemini")]
    Gemini,
}

impl LlmProvider {
    /// All providers, in the order they are offered in the settings tab.
    pub const ALL: [LlmProvider; 4] = [
        LlmProvider::Local,
        LlmProvider::OpenAI,
        LlmProvider::Anthropic,
        LlmProvider::Gemini,
    ];

    /// Canonical identifier used in settings files.
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::Local => "lmstudio",
            LlmProvider::OpenAI => "openai",
            LlmProvider::Anthropic => "anthropic",
            LlmProvider::Gemini => "google",
        }
    }

    /// Human-readable label.
    pub fn display_name(&self) -> &'static str {
        match self {
            LlmProvider::Local => "LM Studio (local)",
            LlmProvider::OpenAI => "OpenAI",
            LlmProvider::Anthropic => "Anthropic",
            LlmProvider::Gemini => "Google Gemini",
        }
    }

    /// Hosted providers require an API key and have a fixed vendor endpoint.
    pub fn is_hosted(&self) -> bool {
        !matches!(self, LlmProvider::Local)
    }

    /// Fixed vendor base URL for hosted providers; `None` for the local server.
    pub fn default_endpoint(&self) -> Option<&'static str> {
        match self {
            LlmProvider::Local => None,
            LlmProvider::OpenAI => Some("https://api.openai.com"),
            LlmProvider::Anthropic => Some("https://api.anthropic.com"),
            LlmProvider::Gemini => Some("https://generativelanguage.googleapis.com"),
        }
    }

    /// Environment variable consulted for this provider's API key.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            LlmProvider::Local => None,
            LlmProvider::OpenAI => Some("OPENAI_API_KEY"),
            LlmProvider::Anthropic => Some("ANTHROPIC_API_KEY"),
            LlmProvider::Gemini => Some("GOOGLE_API_KEY"),
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lmstudio" | "lm_studio" | "local" => Ok(LlmProvider::Local),
            "openai" => Ok(LlmProvider::OpenAI),
            "anthropic" => Ok(LlmProvider::Anthropic),
            "google" | "gemini" => Ok(LlmProvider::Gemini),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases() {
        assert_eq!("LM_Studio".parse::<LlmProvider>().unwrap(), LlmProvider::Local);
        assert_eq!("gemini".parse::<LlmProvider>().unwrap(), LlmProvider::Gemini);
        assert!("mistral".parse::<LlmProvider>().is_err());
    }

    #[test]
    fn serde_uses_settings_ids() {
        let json = serde_json::to_string(&LlmProvider::Gemini).unwrap();
        assert_eq!(json, "\"google\"");
        let p: LlmProvider = serde_json::from_str("\"local\"").unwrap();
        assert_eq!(p, LlmProvider::Local);
    }
}
