//! Coding practice: problem generation and submission grading.

use std::sync::Arc;

use ai_llm_service::{GenerateParams, LlmService};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::{InterviewError, Result};
use crate::prompt::{self, GRADER_SYSTEM, INTERVIEWER_SYSTEM};
use crate::topics::{Difficulty, Topic};

lazy_static! {
    static ref TITLE_RE: Regex =
        Regex::new(r"(?mi)^\s*(?:#+\s*)?(?:\*\*)?title\s*:\s*(?:\*\*)?\s*(.+?)\s*$").unwrap();
    static ref HEADING_RE: Regex = Regex::new(r"(?m)^#{1,3}\s+(.+?)\s*$").unwrap();
    static ref CODE_BLOCK_RE: Regex =
        Regex::new(r"(?s)```[ \t]*(?:python|py)?[ \t]*\r?\n(.*?)```").unwrap();
    static ref SCORE_RE: Regex =
        Regex::new(r"(?i)score\s*\**\s*[:=]?\s*\**\s*(\d{1,2})\s*/\s*10").unwrap();
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodingProblem {
    pub title: String,
    pub topic: Topic,
    pub difficulty: Difficulty,
    /// Full markdown statement as returned by the model.
    pub statement: String,
    /// First python block of the answer, if any.
    pub starter_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Score out of 10 when the model produced one.
    pub score: Option<u8>,
    pub feedback: String,
}

/// Splits a model answer into a [`CodingProblem`].
///
/// The title comes from a `Title:` line, else the first markdown heading,
/// else `"<topic> (<difficulty>)"`.
pub fn parse_problem(raw: &str, topic: Topic, difficulty: Difficulty) -> CodingProblem {
    let title = TITLE_RE
        .captures(raw)
        .or_else(|| HEADING_RE.captures(raw))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim_matches('*').trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| format!("{} ({})", topic.label(), difficulty.label()));

    CodingProblem {
        title,
        topic,
        difficulty,
        statement: raw.trim().to_string(),
        starter_code: extract_code_block(raw),
    }
}

/// Returns the body of the first fenced python (or untagged) code block.
pub fn extract_code_block(raw: &str) -> Option<String> {
    CODE_BLOCK_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim_end().to_string())
        .filter(|code| !code.trim().is_empty())
}

/// Reads `Score: N/10` out of grader feedback; values above 10 are ignored.
pub fn parse_evaluation(raw: &str) -> Evaluation {
    let score = SCORE_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u8>().ok())
        .filter(|s| *s <= 10);

    Evaluation {
        score,
        feedback: raw.trim().to_string(),
    }
}

/// The coding tab's LLM-backed operations.
pub struct CodingCoach {
    llm: Arc<LlmService>,
}

impl CodingCoach {
    pub fn new(llm: Arc<LlmService>) -> Self {
        Self { llm }
    }

    /// Asks the model for a new problem.
    ///
    /// # Errors
    /// [`InterviewError::Llm`] if the provider call fails.
    #[instrument(skip(self), fields(topic = %topic, difficulty = %difficulty))]
    pub async fn generate_problem(
        &self,
        topic: Topic,
        difficulty: Difficulty,
    ) -> Result<CodingProblem> {
        let prompt = prompt::build_problem_prompt(topic, difficulty);
        let params = GenerateParams {
            system: Some(INTERVIEWER_SYSTEM),
            ..Default::default()
        };
        let raw = self.llm.generate(&prompt, &params).await?;
        let problem = parse_problem(&raw, topic, difficulty);

        info!(
            title = %problem.title,
            has_starter = problem.starter_code.is_some(),
            "coding problem generated"
        );
        Ok(problem)
    }

    /// Grades `code` against the problem statement.
    ///
    /// Grading runs at temperature 0.2 regardless of settings so repeated
    /// submissions get comparable scores.
    ///
    /// # Errors
    /// - [`InterviewError::InvalidInput`] for an empty problem or submission
    /// - [`InterviewError::Llm`] if the provider call fails
    #[instrument(skip_all, fields(code_len = code.len()))]
    pub async fn evaluate_submission(&self, problem: &str, code: &str) -> Result<Evaluation> {
        if problem.trim().is_empty() {
            return Err(InterviewError::InvalidInput("problem must not be empty".into()));
        }
        if code.trim().is_empty() {
            return Err(InterviewError::InvalidInput("submission must not be empty".into()));
        }

        let prompt = prompt::build_evaluation_prompt(problem, code);
        let params = GenerateParams {
            system: Some(GRADER_SYSTEM),
            temperature: Some(0.2),
            ..Default::default()
        };
        let raw = self.llm.generate(&prompt, &params).await?;
        let evaluation = parse_evaluation(&raw);

        debug!(score = ?evaluation.score, "submission graded");
        Ok(evaluation)
    }
}
