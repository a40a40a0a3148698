//! Typed error for the interview crate.

use ai_llm_service::AiLlmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InterviewError {
    /// The provider call failed (transport, auth, malformed payload).
    #[error(transparent)]
    Llm(#[from] AiLlmError),

    /// The model answered, but not in the shape we asked for.
    #[error("could not parse model output: {0}")]
    Parse(String),

    /// Caller supplied an invalid argument (e.g., empty code, bad count).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Code execution is switched off in settings.
    #[error("code execution is disabled in settings")]
    ExecutionDisabled,

    /// The interpreter could not be started or awaited.
    #[error("failed to run code: {0}")]
    Execution(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, InterviewError>;
