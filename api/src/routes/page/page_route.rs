//! The single page and its tab fragments.

use std::{fmt::Write, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use tracing::debug;

use crate::{
    core::{
        app_state::{AppState, LlmRuntime},
        session::{self, SessionId, cookie_session},
        startup::failure_banner,
    },
    error_handler::{AppError, AppResult},
    routes::page::tabs::{Tab, escape_html},
};

pub const PAGE_TITLE: &str = "Machine Learning & Deep Learning Interview Preparation";

const APP_CSS: &str = include_str!("../../../assets/app.css");
const APP_JS: &str = include_str!("../../../assets/app.js");

fn document(body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>ML/DL Interview Preparation</title>
  <link rel="stylesheet" href="/assets/app.css">
</head>
<body>
  <main>
    <h1>{title}</h1>
{body}
  </main>
</body>
</html>
"#,
        title = escape_html(PAGE_TITLE),
    )
}

fn banner_page(runtime: &LlmRuntime) -> String {
    let reason = runtime.startup.failure().unwrap_or_default();
    document(&format!(
        r#"    <div class="banner error" role="alert">
      <p>{}</p>
      <details><summary>Details</summary><pre>{}</pre></details>
    </div>"#,
        escape_html(&failure_banner(runtime.provider())),
        escape_html(reason),
    ))
}

fn full_page(runtime: &LlmRuntime) -> String {
    let mut body = String::from(
        r#"    <p class="intro">This app helps you prepare for machine learning and deep learning interviews by providing:</p>
    <ul class="intro">
      <li><strong>Coding Practice</strong>: implement ML/DL algorithms with adjustable difficulty</li>
      <li><strong>Multiple Choice Questions</strong>: test your knowledge with ML/DL quizzes</li>
    </ul>
    <nav class="tabs" role="tablist">
"#,
    );
    for (i, tab) in Tab::ALL.iter().enumerate() {
        let _ = writeln!(
            body,
            r#"      <button role="tab" data-tab="{}" aria-selected="{}">{}</button>"#,
            tab.slug(),
            i == 0,
            tab.title()
        );
    }
    body.push_str("    </nav>\n");
    for (i, tab) in Tab::ALL.iter().enumerate() {
        let hidden = if i == 0 { "" } else { " hidden" };
        let _ = writeln!(
            body,
            r#"    <div class="panel" id="tab-{}" role="tabpanel"{hidden}>{}</div>"#,
            tab.slug(),
            tab.render(runtime)
        );
    }
    body.push_str(r#"    <script src="/assets/app.js"></script>"#);
    document(&body)
}

/// Handler: GET /
///
/// Renders all four tabs, or only the failure banner (503) when the LLM
/// check failed. A failed check is repeated first, so a provider that came
/// up after the app recovers on reload. Issues a session cookie unless the
/// browser already carries a valid one.
pub async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let runtime = state.retry_if_failed().await;
    if runtime.startup.failure().is_some() {
        return (StatusCode::SERVICE_UNAVAILABLE, Html(banner_page(&runtime))).into_response();
    }

    let mut res = Html(full_page(&runtime)).into_response();
    if !cookie_session(&headers).is_some_and(|id| session::is_valid(&id)) {
        let session = SessionId::generate();
        debug!(session = %session.as_str(), "new session");
        if let Ok(v) = HeaderValue::from_str(&session.cookie()) {
            res.headers_mut().insert(header::SET_COOKIE, v);
        }
    }
    res
}

/// Handler: GET /tabs/{name}
pub async fn tab_fragment(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> AppResult<Response> {
    let tab = Tab::from_slug(&name).ok_or(AppError::NotFound)?;
    let runtime = state.runtime().await;
    if let Some(reason) = runtime.startup.failure() {
        return Err(AppError::LlmUnavailable(reason.to_string()));
    }
    Ok(Html(tab.render(&runtime)).into_response())
}

/// Handler: GET /assets/app.css
pub async fn stylesheet() -> Response {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], APP_CSS).into_response()
}

/// Handler: GET /assets/app.js
pub async fn script() -> Response {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        APP_JS,
    )
        .into_response()
}
