//! HTML fragments for the four tabs.
//!
//! Fragments are plain server-rendered markup; `assets/app.js` wires the
//! buttons to the JSON API.

use std::fmt::Write;

use interview::{Difficulty, Topic, quiz::MAX_QUESTIONS};

use crate::core::app_state::LlmRuntime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Coding,
    Quiz,
    Settings,
    Help,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Coding, Tab::Quiz, Tab::Settings, Tab::Help];

    pub fn slug(&self) -> &'static str {
        match self {
            Tab::Coding => "coding",
            Tab::Quiz => "quiz",
            Tab::Settings => "settings",
            Tab::Help => "help",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Coding => "Coding Practice",
            Tab::Quiz => "Multiple Choice Questions",
            Tab::Settings => "Settings",
            Tab::Help => "Help",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.slug() == slug)
    }

    pub fn render(&self, runtime: &LlmRuntime) -> String {
        match self {
            Tab::Coding => render_coding(runtime.runner.is_enabled()),
            Tab::Quiz => render_quiz(),
            Tab::Settings => render_settings(runtime),
            Tab::Help => render_help(),
        }
    }
}

/// Minimal HTML escaping for text and attribute values.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn topic_select(id: &str) -> String {
    let mut out = format!(r#"<select id="{id}" name="topic">"#);
    for (group, deep) in [("Machine Learning", false), ("Deep Learning", true)] {
        let _ = write!(out, r#"<optgroup label="{group}">"#);
        for t in Topic::ALL.iter().filter(|t| t.is_deep_learning() == deep) {
            let _ = write!(out, r#"<option value="{}">{}</option>"#, t.id(), t.label());
        }
        out.push_str("</optgroup>");
    }
    out.push_str("</select>");
    out
}

fn difficulty_select(id: &str) -> String {
    let mut out = format!(r#"<select id="{id}" name="difficulty">"#);
    for d in Difficulty::ALL {
        let selected = if d == Difficulty::default() { " selected" } else { "" };
        let _ = write!(out, r#"<option value="{}"{selected}>{}</option>"#, d.id(), d.label());
    }
    out.push_str("</select>");
    out
}

fn render_coding(execution_enabled: bool) -> String {
    let run_button = if execution_enabled {
        r#"<button id="coding-run" type="button">Run Code</button>"#
    } else {
        r#"<span class="muted">Code execution is disabled in Settings.</span>"#
    };
    format!(
        r#"<section class="tab-body" data-tab="coding">
  <h2>Coding Practice</h2>
  <div class="controls">
    <label>Topic {topics}</label>
    <label>Difficulty {difficulty}</label>
    <button id="coding-generate" type="button">Generate Problem</button>
  </div>
  <article id="coding-problem" class="problem" hidden></article>
  <label for="coding-code">Your solution (Python)</label>
  <textarea id="coding-code" rows="18" spellcheck="false"></textarea>
  <div class="controls">
    <button id="coding-submit" type="button">Submit for Evaluation</button>
    {run_button}
  </div>
  <pre id="coding-output" class="output" hidden></pre>
  <article id="coding-feedback" class="feedback" hidden></article>
</section>"#,
        topics = topic_select("coding-topic"),
        difficulty = difficulty_select("coding-difficulty"),
    )
}

fn render_quiz() -> String {
    let mut counts = String::new();
    for n in 1..=MAX_QUESTIONS {
        let selected = if n == 5 { " selected" } else { "" };
        let _ = write!(counts, r#"<option value="{n}"{selected}>{n}</option>"#);
    }
    format!(
        r#"<section class="tab-body" data-tab="quiz">
  <h2>Multiple Choice Questions</h2>
  <div class="controls">
    <label>Topic {topics}</label>
    <label>Difficulty {difficulty}</label>
    <label>Questions <select id="quiz-count">{counts}</select></label>
    <button id="quiz-generate" type="button">Generate Quiz</button>
  </div>
  <form id="quiz-form" hidden></form>
  <button id="quiz-submit" type="button" hidden>Submit Answers</button>
  <article id="quiz-result" class="feedback" hidden></article>
  <h3>Your progress</h3>
  <div id="history" class="history"></div>
</section>"#,
        topics = topic_select("quiz-topic"),
        difficulty = difficulty_select("quiz-difficulty"),
    )
}

fn render_settings(runtime: &LlmRuntime) -> String {
    let s = runtime.settings.redacted();
    let active = runtime.provider();
    let mut providers = String::new();
    for p in ai_llm_service::LlmProvider::ALL {
        let selected = if Some(p) == active { " selected" } else { "" };
        let _ = write!(
            providers,
            r#"<option value="{}"{selected}>{}</option>"#,
            p.as_str(),
            p.display_name()
        );
    }
    let checked = if s.enable_code_execution { " checked" } else { "" };
    format!(
        r#"<section class="tab-body" data-tab="settings">
  <h2>Settings</h2>
  <form id="settings-form">
    <label>Provider <select name="llm_provider">{providers}</select></label>
    <label>Base URL (local server only) <input name="llm_base_url" value="{base}" placeholder="http://localhost:1234"></label>
    <p class="muted">A trailing <code>/v1</code> is optional; it is added to every request.</p>
    <label>Model <input name="llm_model" value="{model}" required></label>
    <label>Temperature <input name="llm_temperature" type="number" min="0" max="2" step="0.05" value="{temp}"></label>
    <label><input name="enable_code_execution" type="checkbox"{checked}> Enable code execution</label>
    <label>Google API key <input name="google_api_key" type="password" value="{google}"></label>
    <label>OpenAI API key <input name="openai_api_key" type="password" value="{openai}"></label>
    <label>Anthropic API key <input name="anthropic_api_key" type="password" value="{anthropic}"></label>
    <label>Local server token (optional) <input name="local_api_key" type="password" value="{local}"></label>
    <button type="submit">Save Settings</button>
  </form>
  <p class="muted">Saved settings take effect after the app is restarted.</p>
  <p id="settings-status" class="status" hidden></p>
</section>"#,
        base = escape_html(&s.llm_base_url),
        model = escape_html(&s.llm_model),
        temp = s.llm_temperature,
        google = escape_html(&s.google_api_key),
        openai = escape_html(s.openai_api_key.as_deref().unwrap_or_default()),
        anthropic = escape_html(s.anthropic_api_key.as_deref().unwrap_or_default()),
        local = escape_html(s.local_api_key.as_deref().unwrap_or_default()),
    )
}

fn render_help() -> String {
    r#"<section class="tab-body" data-tab="help">
  <h2>Help</h2>
  <h3>Coding Practice</h3>
  <ol>
    <li>Pick a topic and a difficulty, then press <em>Generate Problem</em>.</li>
    <li>Write your solution in the editor. NumPy is fine; avoid library shortcuts.</li>
    <li>Press <em>Submit for Evaluation</em> to get a score out of 10 and feedback.</li>
    <li>If code execution is enabled, <em>Run Code</em> runs it locally with <code>python3</code> (10 s limit).</li>
  </ol>
  <h3>Multiple Choice Questions</h3>
  <ol>
    <li>Choose a topic, difficulty and number of questions (1 to 10).</li>
    <li>Answer, submit, and ask for an explanation of any question.</li>
  </ol>
  <h3>Providers</h3>
  <ul>
    <li><strong>LM Studio (local)</strong>: start the local server and set its base URL, e.g. <code>http://localhost:1234</code>.</li>
    <li><strong>OpenAI</strong>, <strong>Anthropic</strong>, <strong>Google Gemini</strong>: set the API key in Settings or via <code>OPENAI_API_KEY</code>, <code>ANTHROPIC_API_KEY</code>, <code>GOOGLE_API_KEY</code>.</li>
  </ul>
  <p>Settings live in <code>config/.app_settings.json</code> (override with <code>APP_SETTINGS_PATH</code>) and apply after a restart.</p>
</section>"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_round_trip() {
        for t in Tab::ALL {
            assert_eq!(Tab::from_slug(t.slug()), Some(t));
        }
        assert_eq!(Tab::from_slug("admin"), None);
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn run_button_follows_setting() {
        assert!(render_coding(true).contains(r#"id="coding-run""#));
        assert!(!render_coding(false).contains(r#"id="coding-run""#));
    }

    #[test]
    fn topic_select_groups_all_topics() {
        let html = topic_select("t");
        assert_eq!(html.matches("<option ").count(), Topic::ALL.len());
        assert!(html.contains(r#"<optgroup label="Deep Learning">"#));
    }
}
