//! Multiple Choice Questions tab.

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    response::Response,
};
use chrono::Utc;
use interview::{QuizAttempt, quiz};
use tracing::{info, instrument};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse, session::SessionId},
    error_handler::{AppError, AppResult},
    routes::quiz::quiz_request::{
        ExplainRequest, ExplainResponse, GenerateQuizRequest, SubmitQuizRequest,
        SubmitQuizResponse,
    },
};

/// Handler: POST /api/quiz/generate
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8501/api/quiz/generate \
///   -H 'content-type: application/json' \
///   -d '{"topic":"regularization","difficulty":"easy","count":5}'
/// ```
#[instrument(
    name = "quiz_generate_route",
    skip_all,
    fields(topic = %body.topic, count = body.count)
)]
pub async fn generate_quiz(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateQuizRequest>,
) -> AppResult<Response> {
    let backend = state.backend().await?;
    let questions = backend
        .quiz
        .generate_quiz(body.topic, body.difficulty, body.count)
        .await?;
    Ok(ApiResponse::ok(questions))
}

/// Handler: POST /api/quiz/submit
///
/// Grades locally (no LLM call) and records the score in the session history.
#[instrument(name = "quiz_submit_route", skip_all, fields(session = %session.as_str()))]
pub async fn submit_quiz(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    Json(body): Json<SubmitQuizRequest>,
) -> AppResult<Response> {
    if body.questions.is_empty() {
        return Err(AppError::BadRequest("questions must not be empty".into()));
    }
    let result = quiz::grade(&body.questions, &body.answers)?;
    info!(correct = result.correct, total = result.total, "quiz graded");

    state
        .sessions
        .record_quiz(
            session.as_str(),
            QuizAttempt {
                topic: body.topic,
                correct: result.correct,
                total: result.total,
                at: Utc::now(),
            },
        )
        .await;

    let percent = result.percent();
    Ok(ApiResponse::ok(SubmitQuizResponse { result, percent }))
}

/// Handler: POST /api/quiz/explain
#[instrument(name = "quiz_explain_route", skip_all)]
pub async fn explain_answer(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ExplainRequest>,
) -> AppResult<Response> {
    let backend = state.backend().await?;
    let explanation = backend
        .quiz
        .explain_answer(&body.question, body.selected)
        .await?;
    Ok(ApiResponse::ok(ExplainResponse { explanation }))
}
