//! Application settings: a JSON file merged with provider API keys from the
//! environment.
//!
//! Settings are read at startup and again only when a failed LLM check is
//! retried. `PUT /api/settings` rewrites the file.

use std::{
    io,
    path::{Path, PathBuf},
};

use ai_llm_service::{
    AiLlmError, LlmModelConfig, LlmProvider, config::default_config::model_config,
    error_handler::env_opt,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

/// Settings file used when `APP_SETTINGS_PATH` is unset.
pub const DEFAULT_SETTINGS_PATH: &str = "config/.app_settings.json";

/// Placeholder shown instead of a configured secret.
const REDACTED: &str = "********";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write settings file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl SettingsError {
    /// The file does not exist (as opposed to being unreadable or invalid).
    pub fn is_not_found(&self) -> bool {
        matches!(self, SettingsError::Read { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// Contents of `.app_settings.json`.
///
/// The six original keys are mandatory; the per-vendor keys for OpenAI and
/// Anthropic and the local server's bearer token are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    pub llm_provider: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub enable_code_execution: bool,
    pub google_api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anthropic_api_key: Option<String>,
    /// Sent to the local server only; never shared with a hosted vendor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_api_key: Option<String>,
}

impl AppSettings {
    /// Reads the file, validates it and fills empty API keys from
    /// `GOOGLE_API_KEY` / `OPENAI_API_KEY` / `ANTHROPIC_API_KEY` /
    /// `LOCAL_LLM_API_KEY`.
    pub async fn load(path: &Path) -> Result<Self, SettingsError> {
        let mut settings = Self::read_file(path).await?;
        settings.fill_keys_from(env_opt);
        info!(
            path = %path.display(),
            provider = %settings.llm_provider,
            model = %settings.llm_model,
            code_execution = settings.enable_code_execution,
            "settings loaded"
        );
        Ok(settings)
    }

    /// Reads and validates the file without consulting the environment.
    pub async fn read_file(path: &Path) -> Result<Self, SettingsError> {
        let raw = fs::read_to_string(path).await.map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&raw).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Writes the settings as pretty JSON, creating parent directories.
    pub async fn save(&self, path: &Path) -> Result<(), SettingsError> {
        self.validate()?;
        let write_err = |source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await.map_err(write_err)?;
        }
        let body = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, body + "\n").await.map_err(write_err)?;
        debug!(path = %path.display(), "settings written");
        Ok(())
    }

    /// Fills empty key fields using `lookup` (env var name -> value).
    pub fn fill_keys_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.google_api_key.trim().is_empty() {
            if let Some(v) = lookup("GOOGLE_API_KEY") {
                self.google_api_key = v;
            }
        }
        for (slot, var) in [
            (&mut self.openai_api_key, "OPENAI_API_KEY"),
            (&mut self.anthropic_api_key, "ANTHROPIC_API_KEY"),
            (&mut self.local_api_key, "LOCAL_LLM_API_KEY"),
        ] {
            if slot.as_deref().is_none_or(|k| k.trim().is_empty()) {
                if let Some(v) = lookup(var) {
                    *slot = Some(v);
                }
            }
        }
    }

    /// Checks the fields that do not depend on credentials.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let provider = self.provider()?;
        if self.llm_model.trim().is_empty() {
            return Err(SettingsError::Invalid {
                field: "llm_model",
                reason: "must not be empty".into(),
            });
        }
        if !(0.0..=2.0).contains(&self.llm_temperature) {
            return Err(SettingsError::Invalid {
                field: "llm_temperature",
                reason: format!("{} is outside 0.0..=2.0", self.llm_temperature),
            });
        }
        let base = self.llm_base_url.trim();
        if provider == LlmProvider::Local && base.is_empty() {
            return Err(SettingsError::Invalid {
                field: "llm_base_url",
                reason: "required for the local provider".into(),
            });
        }
        if !base.is_empty() && !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(SettingsError::Invalid {
                field: "llm_base_url",
                reason: "must start with http:// or https://".into(),
            });
        }
        Ok(())
    }

    pub fn provider(&self) -> Result<LlmProvider, SettingsError> {
        self.llm_provider
            .parse::<LlmProvider>()
            .map_err(|e| SettingsError::Invalid {
                field: "llm_provider",
                reason: e.to_string(),
            })
    }

    /// API key for `provider`, if one is configured.
    pub fn api_key_for(&self, provider: LlmProvider) -> Option<&str> {
        let key = match provider {
            LlmProvider::Local => self.local_api_key.as_deref(),
            LlmProvider::OpenAI => self.openai_api_key.as_deref(),
            LlmProvider::Anthropic => self.anthropic_api_key.as_deref(),
            LlmProvider::Gemini => Some(self.google_api_key.as_str()),
        };
        key.map(str::trim).filter(|k| !k.is_empty())
    }

    /// Builds the provider config the LLM service is constructed with.
    ///
    /// Hosted providers ignore `llm_base_url` when it is blank and fall back
    /// to the vendor endpoint. The local server only ever gets
    /// `local_api_key`.
    pub fn to_model_config(&self) -> Result<LlmModelConfig, AiLlmError> {
        let provider: LlmProvider = self.llm_provider.parse()?;
        let base_url = Some(self.llm_base_url.as_str()).filter(|u| !u.trim().is_empty());
        model_config(
            provider,
            &self.llm_model,
            base_url,
            Some(self.llm_temperature),
            self.api_key_for(provider),
        )
    }

    /// Copy with every configured secret replaced by a placeholder.
    pub fn redacted(&self) -> Self {
        let mask = |k: &str| {
            if k.trim().is_empty() {
                String::new()
            } else {
                REDACTED.to_string()
            }
        };
        Self {
            google_api_key: mask(&self.google_api_key),
            openai_api_key: self.openai_api_key.as_deref().map(mask),
            anthropic_api_key: self.anthropic_api_key.as_deref().map(mask),
            local_api_key: self.local_api_key.as_deref().map(mask),
            ..self.clone()
        }
    }

    /// True when `value` is the placeholder produced by [`Self::redacted`].
    pub fn is_redacted(value: &str) -> bool {
        value == REDACTED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "llm_provider": "google",
        "llm_base_url": "",
        "llm_model": "gemini-1.5-flash",
        "llm_temperature": 0.7,
        "enable_code_execution": false,
        "google_api_key": "AIza-test"
    }"#;

    fn write_tmp(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    #[tokio::test]
    async fn well_formed_file_populates_every_field() {
        let f = write_tmp(SAMPLE);
        let s = AppSettings::read_file(f.path()).await.unwrap();
        assert_eq!(
            s,
            AppSettings {
                llm_provider: "google".into(),
                llm_base_url: String::new(),
                llm_model: "gemini-1.5-flash".into(),
                llm_temperature: 0.7,
                enable_code_execution: false,
                google_api_key: "AIza-test".into(),
                openai_api_key: None,
                anthropic_api_key: None,
                local_api_key: None,
            }
        );
        let cfg = s.to_model_config().unwrap();
        assert_eq!(cfg.provider, LlmProvider::Gemini);
        assert_eq!(cfg.endpoint, "https://generativelanguage.googleapis.com");
        assert_eq!(cfg.api_key(), Some("AIza-test"));
    }

    #[tokio::test]
    async fn missing_key_and_unknown_provider_are_rejected() {
        let f = write_tmp(r#"{"llm_provider": "google"}"#);
        assert!(matches!(
            AppSettings::read_file(f.path()).await,
            Err(SettingsError::Parse { .. })
        ));

        let f = write_tmp(&SAMPLE.replace("\"google\"", "\"cohere\""));
        assert!(matches!(
            AppSettings::read_file(f.path()).await,
            Err(SettingsError::Invalid { field: "llm_provider", .. })
        ));

        let f = write_tmp(&SAMPLE.replace("\"google\"", "\"lmstudio\""));
        assert!(matches!(
            AppSettings::read_file(f.path()).await,
            Err(SettingsError::Invalid { field: "llm_base_url", .. })
        ));
    }

    #[tokio::test]
    async fn env_fills_only_empty_keys() {
        let f = write_tmp(&SAMPLE.replace("AIza-test", ""));
        let mut s = AppSettings::read_file(f.path()).await.unwrap();
        s.anthropic_api_key = Some("from-file".into());
        s.fill_keys_from(|var| Some(format!("env-{var}")));

        assert_eq!(s.google_api_key, "env-GOOGLE_API_KEY");
        assert_eq!(s.openai_api_key.as_deref(), Some("env-OPENAI_API_KEY"));
        assert_eq!(s.anthropic_api_key.as_deref(), Some("from-file"));
        assert_eq!(s.local_api_key.as_deref(), Some("env-LOCAL_LLM_API_KEY"));
    }

    #[tokio::test]
    async fn local_provider_never_gets_the_openai_key() {
        let f = write_tmp(
            &SAMPLE
                .replace("\"google\"", "\"lmstudio\"")
                .replace("\"llm_base_url\": \"\"", "\"llm_base_url\": \"http://some-remote-host:1234\""),
        );
        let mut s = AppSettings::read_file(f.path()).await.unwrap();
        s.fill_keys_from(|var| (var == "OPENAI_API_KEY").then(|| "sk-real-openai".to_string()));
        assert_eq!(s.openai_api_key.as_deref(), Some("sk-real-openai"));

        let cfg = s.to_model_config().unwrap();
        assert_eq!(cfg.provider, LlmProvider::Local);
        assert_eq!(cfg.api_key, None);

        s.local_api_key = Some("lm-token".into());
        assert_eq!(s.to_model_config().unwrap().api_key(), Some("lm-token"));
    }

    #[tokio::test]
    async fn only_a_missing_file_counts_as_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppSettings::read_file(&dir.path().join("absent.json")).await.unwrap_err();
        assert!(err.is_not_found());

        let f = write_tmp("{ not json");
        let err = AppSettings::read_file(f.path()).await.unwrap_err();
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn redaction_hides_secrets_only() {
        let f = write_tmp(SAMPLE);
        let s = AppSettings::read_file(f.path()).await.unwrap().redacted();
        assert!(AppSettings::is_redacted(&s.google_api_key));
        assert_eq!(s.llm_model, "gemini-1.5-flash");
        assert_eq!(s.openai_api_key, None);
    }

    #[tokio::test]
    async fn save_then_read_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(".app_settings.json");
        let f = write_tmp(SAMPLE);
        let mut s = AppSettings::read_file(f.path()).await.unwrap();
        s.enable_code_execution = true;
        s.save(&path).await.unwrap();
        assert_eq!(AppSettings::read_file(&path).await.unwrap(), s);
    }
}
