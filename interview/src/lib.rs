//! Interview practice domain: coding problems, quizzes, grading, history.
//!
//! Everything LLM-facing goes through [`ai_llm_service::LlmService`]; this
//! crate only owns prompts and the parsing of model output.

pub mod coding;
pub mod error;
pub mod history;
pub mod prompt;
pub mod quiz;
pub mod runner;
pub mod topics;

pub use coding::{CodingCoach, CodingProblem, Evaluation};
pub use error::{InterviewError, Result};
pub use history::{CodingAttempt, QuizAttempt, SessionHistory, SessionStore};
pub use quiz::{GradedAnswer, QuizMaster, QuizQuestion, QuizResult};
pub use runner::{CodeRunner, ExecutionOutput};
pub use topics::{Difficulty, Topic};
