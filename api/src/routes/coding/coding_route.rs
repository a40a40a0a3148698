//! Coding Practice tab: problem generation, grading and optional execution.

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    response::Response,
};
use chrono::Utc;
use interview::CodingAttempt;
use tracing::{info, instrument};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse, session::SessionId},
    error_handler::AppResult,
    routes::coding::coding_request::{EvaluateRequest, ProblemRequest, RunRequest},
};

/// Handler: POST /api/coding/problem
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8501/api/coding/problem \
///   -H 'content-type: application/json' \
///   -d '{"topic":"gradient_descent","difficulty":"medium"}'
/// ```
#[instrument(
    name = "coding_problem_route",
    skip_all,
    fields(topic = %body.topic, difficulty = %body.difficulty)
)]
pub async fn generate_problem(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ProblemRequest>,
) -> AppResult<Response> {
    let backend = state.backend().await?;
    let problem = backend
        .coding
        .generate_problem(body.topic, body.difficulty)
        .await?;
    Ok(ApiResponse::ok(problem))
}

/// Handler: POST /api/coding/evaluate
///
/// Grades the submission and appends it to the session history.
#[instrument(name = "coding_evaluate_route", skip_all, fields(session = %session.as_str()))]
pub async fn evaluate_submission(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Json(body): Json<EvaluateRequest>,
) -> AppResult<Response> {
    let backend = state.backend().await?;
    let evaluation = backend
        .coding
        .evaluate_submission(&body.problem, &body.code)
        .await?;

    let title = body
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| "Untitled problem".to_string());
    info!(%title, score = ?evaluation.score, "submission evaluated");

    state
        .sessions
        .record_coding(
            session.as_str(),
            CodingAttempt {
                title,
                topic: body.topic,
                difficulty: body.difficulty,
                score: evaluation.score,
                at: Utc::now(),
            },
        )
        .await;

    Ok(ApiResponse::ok(evaluation))
}

/// Handler: POST /api/coding/run
///
/// Refused with `403 CODE_EXECUTION_DISABLED` unless enabled in settings.
#[instrument(name = "coding_run_route", skip_all, fields(code_len = body.code.len()))]
pub async fn run_code(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RunRequest>,
) -> AppResult<Response> {
    let runtime = state.runtime().await;
    let output = runtime.runner.run(&body.code).await?;
    Ok(ApiResponse::ok(output))
}
