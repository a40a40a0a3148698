use std::sync::Arc;

use ai_llm_service::health_service::HealthStatus;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse, response::Response};
use serde::Serialize;

use crate::core::{app_state::AppState, startup::StartupState};

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub startup: StartupState,
    /// Live probe of the provider; absent when startup failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm: Option<HealthStatus>,
}

/// Handler: GET /health
///
/// 200 when startup succeeded and the provider still answers, 503 otherwise.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let runtime = state.runtime().await;
    let llm = match runtime.backend() {
        Ok(backend) => Some(backend.llm.health(&state.health).await),
        Err(_) => None,
    };
    let healthy = runtime.startup.is_ready() && llm.as_ref().is_some_and(|s| s.ok);
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(HealthReport {
            startup: runtime.startup.clone(),
            llm,
        }),
    )
        .into_response()
}
