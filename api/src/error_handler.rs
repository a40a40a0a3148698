use ai_llm_service::{AiLlmError, FailureKind};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use interview::InterviewError;
use thiserror::Error;
use tracing::{error, warn};

use crate::core::{
    app_settings::SettingsError,
    http::response_envelope::{ApiErrorDetail, ApiResponse},
};

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Settings(#[from] SettingsError),

    // --- IO / network / server ---
    #[error("failed to bind listener on {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found")]
    NotFound,

    // --- LLM ---
    #[error("LLM service unavailable: {0}")]
    LlmUnavailable(String),

    #[error(transparent)]
    Llm(#[from] AiLlmError),

    /// Rich HTTP error mapped from lower layers with specific status & code.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Settings(SettingsError::Invalid { .. }) => StatusCode::BAD_REQUEST,
            AppError::LlmUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Llm(e) => match e.kind() {
                FailureKind::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_GATEWAY,
            },
            AppError::Http { status, .. } => *status,
            AppError::Settings(_) | AppError::Bind { .. } | AppError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Settings(SettingsError::Invalid { .. }) => "BAD_REQUEST",
            AppError::Settings(_) => "SETTINGS_ERROR",
            AppError::Bind { .. } => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::NotFound => "NOT_FOUND",
            AppError::LlmUnavailable(_) => "LLM_UNAVAILABLE",
            AppError::Llm(e) => match e.kind() {
                FailureKind::Authentication => "LLM_AUTH_FAILED",
                FailureKind::Transport => "LLM_TRANSPORT",
                FailureKind::MalformedResponse => "LLM_BAD_RESPONSE",
                FailureKind::Upstream => "LLM_UPSTREAM",
                FailureKind::Configuration => "LLM_CONFIG",
            },
            AppError::Http { code, .. } => *code,
        }
    }

    fn hint(&self) -> Option<&'static str> {
        match self {
            AppError::Llm(e) if e.kind() == FailureKind::Authentication => {
                Some("Check the API key in the Settings tab, then restart the app.")
            }
            AppError::Llm(e) if e.kind() == FailureKind::Transport => {
                Some("Is the provider reachable? For a local server, check that it is running.")
            }
            AppError::LlmUnavailable(_) => Some("Fix the settings and restart the app."),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = self.error_code(), error = %self, "request failed");
        } else {
            warn!(code = self.error_code(), error = %self, "request rejected");
        }
        let details = self.hint().map(ApiErrorDetail::hint).into_iter().collect();
        ApiResponse::failure(self.error_code(), self.to_string(), details).with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<InterviewError> for AppError {
    fn from(err: InterviewError) -> Self {
        match err {
            InterviewError::Llm(e) => AppError::Llm(e),
            InterviewError::InvalidInput(msg) => AppError::BadRequest(msg),
            InterviewError::Parse(msg) => AppError::Http {
                status: StatusCode::BAD_GATEWAY,
                code: "QUIZ_PARSE_FAILED",
                message: format!("The model returned an unusable quiz: {msg}"),
            },
            InterviewError::ExecutionDisabled => AppError::Http {
                status: StatusCode::FORBIDDEN,
                code: "CODE_EXECUTION_DISABLED",
                message: "Code execution is disabled. Enable it in Settings and restart.".into(),
            },
            InterviewError::Execution(e) => AppError::Http {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "EXECUTION_FAILED",
                message: format!("Could not run the code: {e}"),
            },
        }
    }
}
