//! LLM readiness check, run before the server accepts requests.
//!
//! `Unchecked -> Ready | Failed`. A state never transitions again; a failed
//! one is replaced by a fresh check on the next page load
//! (see [`crate::core::app_state::AppState::retry_if_failed`]).

use std::sync::Arc;

use ai_llm_service::{LlmProvider, LlmService, health_service::HealthService};
use serde::Serialize;
use tracing::{error, info};

use crate::core::app_settings::AppSettings;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum StartupState {
    #[default]
    Unchecked,
    Ready,
    Failed(String),
}

impl StartupState {
    /// Applies the check outcome. Only `Unchecked` transitions.
    pub fn complete(self, outcome: Result<(), String>) -> Self {
        match self {
            StartupState::Unchecked => match outcome {
                Ok(()) => StartupState::Ready,
                Err(reason) => StartupState::Failed(reason),
            },
            terminal => terminal,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, StartupState::Ready)
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            StartupState::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// User-facing banner text shown when the check failed.
pub fn failure_banner(provider: Option<LlmProvider>) -> String {
    match provider {
        Some(LlmProvider::Local) => "Failed to initialize LLM service. Please check that your \
             local LLM server is running and try again."
            .to_string(),
        Some(p) => format!(
            "Failed to initialize LLM service. Please check your {} API key and try again.",
            p.display_name()
        ),
        None => "Failed to initialize LLM service. Please check your settings and try again."
            .to_string(),
    }
}

async fn build_and_probe(
    settings: &AppSettings,
    health: &HealthService,
) -> Result<LlmService, String> {
    let cfg = settings.to_model_config().map_err(|e| e.to_string())?;
    let llm = LlmService::new(cfg).map_err(|e| e.to_string())?;
    let status = llm.health(health).await;
    if !status.ok {
        return Err(status.message);
    }
    info!(
        provider = %status.provider,
        model = ?status.model,
        latency_ms = status.latency_ms,
        "LLM service ready"
    );
    Ok(llm)
}

/// Builds the service from settings and checks that it answers.
///
/// Returns the resulting state and, on success, the shared service.
pub async fn check_llm(
    settings: &AppSettings,
    health: &HealthService,
) -> (StartupState, Option<Arc<LlmService>>) {
    match build_and_probe(settings, health).await {
        Ok(llm) => (StartupState::Unchecked.complete(Ok(())), Some(Arc::new(llm))),
        Err(reason) => {
            error!(provider = %settings.llm_provider, %reason, "LLM service failed to initialize");
            (StartupState::Unchecked.complete(Err(reason)), None)
        }
    }
}
