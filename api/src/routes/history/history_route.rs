use std::sync::Arc;

use axum::{extract::State, response::Response};
use interview::SessionHistory;
use serde::Serialize;

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse, session::SessionId};

#[derive(Debug, Serialize)]
pub struct HistoryView {
    #[serde(flatten)]
    pub history: SessionHistory,
    pub average_coding_score: Option<f32>,
    pub quiz_accuracy: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct HistoryCleared {
    pub cleared: bool,
}

/// Handler: GET /api/history
pub async fn get_history(State(state): State<Arc<AppState>>, session: SessionId) -> Response {
    let history = state.sessions.snapshot(session.as_str()).await;
    ApiResponse::ok(HistoryView {
        average_coding_score: history.average_coding_score(),
        quiz_accuracy: history.quiz_accuracy(),
        history,
    })
}

/// Handler: DELETE /api/history
pub async fn clear_history(State(state): State<Arc<AppState>>, session: SessionId) -> Response {
    state.sessions.clear(session.as_str()).await;
    ApiResponse::ok(HistoryCleared { cleared: true })
}
