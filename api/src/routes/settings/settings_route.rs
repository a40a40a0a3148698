//! Settings tab: read the active configuration, write the settings file.

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::Response,
};
use tracing::{info, instrument, warn};

use crate::{
    core::{app_settings::AppSettings, app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
    routes::settings::settings_request::{SettingsSaved, SettingsUpdate, SettingsView},
};

/// Handler: GET /api/settings
pub async fn get_settings(State(state): State<Arc<AppState>>) -> Response {
    let runtime = state.runtime().await;
    ApiResponse::ok(SettingsView {
        settings: runtime.settings.redacted(),
        startup: runtime.startup.clone(),
    })
}

/// Handler: PUT /api/settings
///
/// Validates and persists the new settings. A ready LLM service is not
/// rebuilt; changes apply on the next start. A missing file is created from
/// the settings in effect. Any other read error fails the request and
/// leaves the file untouched.
#[instrument(name = "settings_update_route", skip_all, fields(provider = %body.llm_provider))]
pub async fn put_settings(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SettingsUpdate>,
) -> AppResult<Response> {
    let path = state.settings_path.clone();
    let runtime = state.runtime().await;
    let stored = match AppSettings::read_file(&path).await {
        Ok(stored) => stored,
        // env-provided keys never end up in the file
        Err(e) if e.is_not_found() => AppSettings {
            google_api_key: String::new(),
            openai_api_key: None,
            anthropic_api_key: None,
            local_api_key: None,
            ..runtime.settings.clone()
        },
        Err(e) => {
            warn!(error = %e, path = %path.display(), "refusing to overwrite unreadable settings");
            return Err(AppError::Http {
                status: StatusCode::CONFLICT,
                code: "SETTINGS_FILE_INVALID",
                message: format!("{e}; fix or remove the file before saving"),
            });
        }
    };
    let updated = body.apply_to(stored);
    updated.save(&path).await?;

    let restart_required = runtime.startup.failure().is_none();
    info!(path = %path.display(), restart_required, "settings saved");
    Ok(ApiResponse::ok(SettingsSaved {
        settings: updated.redacted(),
        restart_required,
    }))
}
