//! Prompt builders: short system messages plus task-specific user prompts.

use crate::quiz::QuizQuestion;
use crate::topics::{Difficulty, Topic};

/// System message for problem generation and explanations.
pub const INTERVIEWER_SYSTEM: &str = r#"
You are an experienced machine learning interviewer at a top tech company.
Write clear, self-contained questions. Prefer Python with NumPy; avoid high-level
library calls that would trivialize the task (no sklearn/torch unless asked).
"#;

/// System message for grading. Kept strict so scores stay comparable.
pub const GRADER_SYSTEM: &str = r#"
You are a strict but fair interview grader. Judge correctness first, then
numerical stability, vectorization, readability. Never rewrite the whole
solution; point at the lines that matter.
"#;

/// Upper bound on submitted code forwarded to the model.
pub const MAX_CODE_CHARS: usize = 12_000;

/// Builds the prompt for a new coding problem.
///
/// The model is asked for a fixed layout (`Title:` line, `## Problem`,
/// `## Starter Code` with a fenced python block) so the answer can be split
/// by [`crate::coding::parse_problem`].
pub fn build_problem_prompt(topic: Topic, difficulty: Difficulty) -> String {
    format!(
        "Create one {difficulty} coding interview problem about {topic}.\n\
         The problem should be {guidance}.\n\n\
         Respond in exactly this format:\n\
         Title: <short title>\n\
         ## Problem\n\
         <statement with input/output specification and one worked example>\n\
         ## Starter Code\n\
         ```python\n\
         <function signature(s) with docstrings and `pass` bodies>\n\
         ```\n",
        difficulty = difficulty.label(),
        topic = topic.label(),
        guidance = difficulty.guidance(),
    )
}

/// Builds the grading prompt for a submission.
///
/// Code longer than [`MAX_CODE_CHARS`] is cut at a char boundary.
pub fn build_evaluation_prompt(problem: &str, code: &str) -> String {
    let mut out = String::new();
    out.push_str("Problem:\n");
    out.push_str(problem.trim());
    out.push_str("\n\nCandidate solution:\n```python\n");
    let code = code.trim();
    out.push_str(safe_truncate(code, MAX_CODE_CHARS));
    if code.len() > MAX_CODE_CHARS {
        out.push_str("\n# ... truncated");
    }
    out.push_str("\n```\n\n");
    out.push_str(
        "Start your answer with a line `Score: N/10`, then give feedback under the \
         headings Correctness, Efficiency, Code Quality and Suggested Improvements.\n",
    );
    out
}

/// Builds the prompt for a multiple-choice quiz returned as JSON.
pub fn build_quiz_prompt(topic: Topic, difficulty: Difficulty, count: usize) -> String {
    format!(
        "Write {count} {difficulty} multiple-choice interview questions about {topic}.\n\
         Each question has exactly 4 options and exactly one correct option.\n\
         Return ONLY a JSON array, no prose, where each item is:\n\
         {{\"question\": string, \"options\": [string, string, string, string], \
         \"correct_index\": 0-3, \"explanation\": string}}\n",
        difficulty = difficulty.label().to_lowercase(),
        topic = topic.label(),
    )
}

/// Builds the prompt asking why an answer is right or wrong.
pub fn build_explanation_prompt(question: &QuizQuestion, selected: Option<usize>) -> String {
    let mut out = String::new();
    out.push_str("Question: ");
    out.push_str(question.question.trim());
    out.push('\n');
    for (i, opt) in question.options.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", option_letter(i), opt.trim()));
    }
    out.push_str(&format!(
        "Correct answer: {}\n",
        option_letter(question.correct_index)
    ));
    match selected {
        Some(i) if i == question.correct_index => {
            out.push_str("The candidate answered correctly. Reinforce why it is right ");
            out.push_str("and mention one common misconception about the other options.\n");
        }
        Some(i) => {
            out.push_str(&format!("The candidate chose {}. ", option_letter(i)));
            out.push_str("Explain why that option is wrong and why the correct one is right.\n");
        }
        None => out.push_str("Explain the correct answer and why each distractor is wrong.\n"),
    }
    out.push_str("Keep it under 200 words.\n");
    out
}

/// `0 -> 'A'`, `1 -> 'B'`, ...
pub fn option_letter(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

fn safe_truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        s
    } else {
        let mut end = max;
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        &s[..end]
    }
}
