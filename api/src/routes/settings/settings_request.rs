use serde::{Deserialize, Serialize};

use crate::core::{app_settings::AppSettings, startup::StartupState};

/// Body of `PUT /api/settings`.
///
/// Key fields left out, blank, or equal to the redaction placeholder keep
/// the value currently stored in the file.
#[derive(Debug, Deserialize)]
pub struct SettingsUpdate {
    pub llm_provider: String,
    #[serde(default)]
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_temperature: f32,
    #[serde(default)]
    pub enable_code_execution: bool,
    #[serde(default)]
    pub google_api_key: Option<String>,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default)]
    pub local_api_key: Option<String>,
}

fn keep_or_replace(current: Option<String>, update: Option<String>) -> Option<String> {
    match update.map(|k| k.trim().to_string()) {
        Some(k) if !k.is_empty() && !AppSettings::is_redacted(&k) => Some(k),
        _ => current,
    }
}

impl SettingsUpdate {
    /// Merges the update over the settings currently stored on disk.
    pub fn apply_to(self, stored: AppSettings) -> AppSettings {
        AppSettings {
            llm_provider: self.llm_provider.trim().to_string(),
            llm_base_url: self.llm_base_url.trim().to_string(),
            llm_model: self.llm_model.trim().to_string(),
            llm_temperature: self.llm_temperature,
            enable_code_execution: self.enable_code_execution,
            google_api_key: keep_or_replace(Some(stored.google_api_key), self.google_api_key)
                .unwrap_or_default(),
            openai_api_key: keep_or_replace(stored.openai_api_key, self.openai_api_key),
            anthropic_api_key: keep_or_replace(stored.anthropic_api_key, self.anthropic_api_key),
            local_api_key: keep_or_replace(stored.local_api_key, self.local_api_key),
        }
    }
}

/// Response of `GET /api/settings`.
#[derive(Debug, Serialize)]
pub struct SettingsView {
    /// Settings the running LLM service was built from, secrets redacted.
    pub settings: AppSettings,
    pub startup: StartupState,
}

/// Response of `PUT /api/settings`.
#[derive(Debug, Serialize)]
pub struct SettingsSaved {
    /// What was written, secrets redacted.
    pub settings: AppSettings,
    /// False only while the LLM check is failing: the next page load then
    /// re-reads the file. A ready service keeps its construction-time config.
    pub restart_required: bool,
}
