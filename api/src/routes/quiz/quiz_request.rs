use interview::{Difficulty, QuizQuestion, QuizResult, Topic};
use serde::{Deserialize, Serialize};

fn default_count() -> usize {
    5
}

/// Body of `POST /api/quiz/generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateQuizRequest {
    pub topic: Topic,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Number of questions, `1..=10`.
    #[serde(default = "default_count")]
    pub count: usize,
}

/// Body of `POST /api/quiz/submit`.
///
/// The client echoes the questions it was given; grading is stateless.
#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    pub topic: Topic,
    pub questions: Vec<QuizQuestion>,
    /// Selected option per question; `null` for unanswered.
    pub answers: Vec<Option<usize>>,
}

#[derive(Debug, Serialize)]
pub struct SubmitQuizResponse {
    #[serde(flatten)]
    pub result: QuizResult,
    pub percent: f32,
}

/// Body of `POST /api/quiz/explain`.
#[derive(Debug, Deserialize)]
pub struct ExplainRequest {
    pub question: QuizQuestion,
    #[serde(default)]
    pub selected: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ExplainResponse {
    pub explanation: String,
}
