use interview::{Difficulty, Topic};
use serde::Deserialize;

/// Body of `POST /api/coding/problem`.
#[derive(Debug, Deserialize)]
pub struct ProblemRequest {
    pub topic: Topic,
    #[serde(default)]
    pub difficulty: Difficulty,
}

/// Body of `POST /api/coding/evaluate`.
#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    /// Problem statement as shown to the user.
    pub problem: String,
    pub code: String,
    /// Used for the history entry only.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub topic: Option<Topic>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

/// Body of `POST /api/coding/run`.
#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub code: String,
}
