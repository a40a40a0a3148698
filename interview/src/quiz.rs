//! Multiple-choice quizzes: generation, parsing, grading, explanations.

use std::sync::Arc;

use ai_llm_service::{GenerateParams, LlmService};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::error::{InterviewError, Result};
use crate::prompt::{self, INTERVIEWER_SYSTEM};
use crate::topics::{Difficulty, Topic};

/// Options per question.
pub const OPTION_COUNT: usize = 4;

/// Largest quiz a single request may ask for.
pub const MAX_QUESTIONS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    #[serde(default)]
    pub explanation: String,
}

/// One graded answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradedAnswer {
    pub selected: Option<usize>,
    pub correct_index: usize,
    pub is_correct: bool,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizResult {
    pub correct: usize,
    pub total: usize,
    pub answers: Vec<GradedAnswer>,
}

impl QuizResult {
    /// Percentage in `0.0..=100.0`; zero for an empty quiz.
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f32 * 100.0 / self.total as f32
        }
    }
}

/// Shape the model is asked to return; field names vary a little in practice.
#[derive(Debug, Deserialize)]
struct RawQuestion {
    #[serde(alias = "q", alias = "prompt")]
    question: String,
    #[serde(alias = "choices", alias = "answers")]
    options: Vec<String>,
    #[serde(default, alias = "answer", alias = "answer_index", alias = "correct")]
    correct_index: Option<Value>,
    #[serde(default)]
    explanation: Option<String>,
}

/// Extracts and validates quiz questions from raw model output.
///
/// Accepts a bare JSON array, a fenced ```json block, or an array embedded in
/// prose. `correct_index` may be a number, a letter (`"B"`), or the option
/// text itself. At most `limit` questions are returned.
///
/// Items that do not match the expected shape are skipped like any other
/// invalid question.
///
/// # Errors
/// [`InterviewError::Parse`] when no array is found, the JSON is invalid,
/// or no question survives validation.
pub fn parse_quiz(raw: &str, limit: usize) -> Result<Vec<QuizQuestion>> {
    let start = raw.find('[');
    let end = raw.rfind(']');
    let slice = match (start, end) {
        (Some(s), Some(e)) if s < e => &raw[s..=e],
        _ => return Err(InterviewError::Parse("no JSON array in quiz response".into())),
    };

    let items: Vec<Value> = serde_json::from_str(slice)
        .map_err(|e| InterviewError::Parse(format!("invalid quiz JSON: {e}")))?;

    let mut out = Vec::with_capacity(items.len().min(limit));
    for (i, item) in items.into_iter().enumerate() {
        let checked = serde_json::from_value::<RawQuestion>(item)
            .map_err(|e| format!("unexpected shape: {e}"))
            .and_then(validate);
        match checked {
            Ok(q) => out.push(q),
            Err(reason) => warn!(index = i, %reason, "dropping malformed quiz question"),
        }
        if out.len() == limit {
            break;
        }
    }

    if out.is_empty() {
        return Err(InterviewError::Parse(
            "quiz response contained no valid questions".into(),
        ));
    }
    Ok(out)
}

fn validate(item: RawQuestion) -> std::result::Result<QuizQuestion, String> {
    let question = item.question.trim().to_string();
    if question.is_empty() {
        return Err("empty question".into());
    }
    let options: Vec<String> = item.options.iter().map(|o| o.trim().to_string()).collect();
    if options.len() != OPTION_COUNT {
        return Err(format!("expected {OPTION_COUNT} options, got {}", options.len()));
    }
    if options.iter().any(String::is_empty) {
        return Err("empty option".into());
    }

    let correct_index = match item.correct_index {
        Some(Value::Number(n)) => n.as_u64().map(|n| n as usize),
        Some(Value::String(s)) => resolve_answer(&s, &options),
        _ => None,
    }
    .filter(|i| *i < OPTION_COUNT)
    .ok_or_else(|| "missing or out-of-range correct answer".to_string())?;

    Ok(QuizQuestion {
        question,
        options,
        correct_index,
        explanation: item.explanation.unwrap_or_default().trim().to_string(),
    })
}

fn resolve_answer(answer: &str, options: &[String]) -> Option<usize> {
    let answer = answer.trim();
    if let Some(i) = options.iter().position(|o| o.eq_ignore_ascii_case(answer)) {
        return Some(i);
    }
    if let Ok(n) = answer.parse::<usize>() {
        return Some(n);
    }
    let first = answer.chars().next()?;
    let is_letter_only = answer.len() == 1
        || answer
            .chars()
            .nth(1)
            .is_some_and(|c| matches!(c, ')' | '.' | ':'));
    if is_letter_only && first.is_ascii_alphabetic() {
        let idx = (first.to_ascii_uppercase() as u8).checked_sub(b'A')? as usize;
        return Some(idx);
    }
    None
}

/// Grades `answers` against `questions` position by position.
///
/// # Errors
/// [`InterviewError::InvalidInput`] when the lengths differ.
pub fn grade(questions: &[QuizQuestion], answers: &[Option<usize>]) -> Result<QuizResult> {
    if questions.len() != answers.len() {
        return Err(InterviewError::InvalidInput(format!(
            "{} answers for {} questions",
            answers.len(),
            questions.len()
        )));
    }

    let answers: Vec<GradedAnswer> = questions
        .iter()
        .zip(answers)
        .map(|(q, sel)| GradedAnswer {
            selected: *sel,
            correct_index: q.correct_index,
            is_correct: *sel == Some(q.correct_index),
            explanation: q.explanation.clone(),
        })
        .collect();

    Ok(QuizResult {
        correct: answers.iter().filter(|a| a.is_correct).count(),
        total: answers.len(),
        answers,
    })
}

/// The quiz tab's LLM-backed operations.
pub struct QuizMaster {
    llm: Arc<LlmService>,
}

impl QuizMaster {
    pub fn new(llm: Arc<LlmService>) -> Self {
        Self { llm }
    }

    /// Generates `count` questions (`1..=MAX_QUESTIONS`).
    ///
    /// # Errors
    /// - [`InterviewError::InvalidInput`] for an out-of-range `count`
    /// - [`InterviewError::Llm`] if the provider call fails
    /// - [`InterviewError::Parse`] if the answer holds no valid question
    #[instrument(skip(self), fields(topic = %topic, difficulty = %difficulty))]
    pub async fn generate_quiz(
        &self,
        topic: Topic,
        difficulty: Difficulty,
        count: usize,
    ) -> Result<Vec<QuizQuestion>> {
        if !(1..=MAX_QUESTIONS).contains(&count) {
            return Err(InterviewError::InvalidInput(format!(
                "count must be between 1 and {MAX_QUESTIONS}"
            )));
        }

        let prompt = prompt::build_quiz_prompt(topic, difficulty, count);
        let params = GenerateParams {
            system: Some(INTERVIEWER_SYSTEM),
            ..Default::default()
        };
        let raw = self.llm.generate(&prompt, &params).await?;
        let questions = parse_quiz(&raw, count)?;

        if questions.len() < count {
            warn!(requested = count, got = questions.len(), "model returned fewer questions");
        }
        info!(count = questions.len(), "quiz generated");
        Ok(questions)
    }

    /// Asks the model to explain the correct answer, tailored to the user's choice.
    ///
    /// # Errors
    /// [`InterviewError::InvalidInput`] for an out-of-range choice,
    /// [`InterviewError::Llm`] if the provider call fails.
    pub async fn explain_answer(
        &self,
        question: &QuizQuestion,
        selected: Option<usize>,
    ) -> Result<String> {
        if selected.is_some_and(|s| s >= question.options.len()) {
            return Err(InterviewError::InvalidInput("selected option out of range".into()));
        }
        let prompt = prompt::build_explanation_prompt(question, selected);
        let params = GenerateParams {
            system: Some(INTERVIEWER_SYSTEM),
            ..Default::default()
        };
        Ok(self.llm.generate(&prompt, &params).await?.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FENCED: &str = r#"Here is your quiz:
```json
[
  {"question": "What does L2 regularization penalize?",
   "options": ["Absolute weights", "Squared weights", "Bias only", "Learning rate"],
   "correct_index": 1,
   "explanation": "Ridge adds the sum of squared weights."},
  {"question": "Which activation is zero-centered?",
   "options": ["ReLU", "Sigmoid", "Tanh", "Softplus"],
   "answer": "C"},
  {"question": "Broken", "options": ["a", "b"], "correct_index": 0}
]
```"#;

    #[test]
    fn parses_fenced_json_and_drops_invalid() {
        let qs = parse_quiz(FENCED, 10).unwrap();
        assert_eq!(qs.len(), 2);
        assert_eq!(qs[0].correct_index, 1);
        assert_eq!(qs[1].correct_index, 2);
        assert!(qs[1].explanation.is_empty());
    }

    #[test]
    fn respects_limit() {
        let qs = parse_quiz(FENCED, 1).unwrap();
        assert_eq!(qs.len(), 1);
    }

    #[test]
    fn item_missing_a_field_is_skipped_not_fatal() {
        let raw = r#"[
  {"options": ["a", "b", "c", "d"], "correct_index": 0},
  "not an object",
  {"question": "Dropout is applied at?", "options": ["training", "inference", "both", "neither"], "correct_index": 0}
]"#;
        let qs = parse_quiz(raw, 10).unwrap();
        assert_eq!(qs.len(), 1);
        assert_eq!(qs[0].question, "Dropout is applied at?");
    }

    #[test]
    fn answer_may_be_option_text() {
        let raw = r#"[{"question": "q", "options": ["w", "x", "y", "z"], "answer": "y"}]"#;
        assert_eq!(parse_quiz(raw, 5).unwrap()[0].correct_index, 2);
    }

    #[test]
    fn rejects_prose_and_out_of_range() {
        assert!(parse_quiz("I cannot help with that.", 5).is_err());
        let raw = r#"[{"question": "q", "options": ["w", "x", "y", "z"], "correct_index": 7}]"#;
        assert!(matches!(parse_quiz(raw, 5), Err(InterviewError::Parse(_))));
    }

    #[test]
    fn grading_counts_and_checks_lengths() {
        let qs = parse_quiz(FENCED, 10).unwrap();
        let res = grade(&qs, &[Some(1), None]).unwrap();
        assert_eq!(res.correct, 1);
        assert_eq!(res.total, 2);
        assert!(!res.answers[1].is_correct);
        assert_eq!(res.percent(), 50.0);

        assert!(grade(&qs, &[Some(1)]).is_err());
    }
}
