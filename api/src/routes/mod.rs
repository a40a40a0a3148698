pub mod coding;
pub mod health;
pub mod history;
pub mod page;
pub mod quiz;
pub mod settings;

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{core::app_state::AppState, middleware_layer::json_extractor::json_error_mapper};

/// All routes of the app, with request tracing and JSON rejection mapping.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/coding/problem", post(coding::coding_route::generate_problem))
        .route("/coding/evaluate", post(coding::coding_route::evaluate_submission))
        .route("/coding/run", post(coding::coding_route::run_code))
        .route("/quiz/generate", post(quiz::quiz_route::generate_quiz))
        .route("/quiz/submit", post(quiz::quiz_route::submit_quiz))
        .route("/quiz/explain", post(quiz::quiz_route::explain_answer))
        .route(
            "/settings",
            get(settings::settings_route::get_settings).put(settings::settings_route::put_settings),
        )
        .route(
            "/history",
            get(history::history_route::get_history).delete(history::history_route::clear_history),
        )
        .layer(middleware::from_fn(json_error_mapper));

    Router::new()
        .route("/", get(page::page_route::index))
        .route("/tabs/{name}", get(page::page_route::tab_fragment))
        .route("/assets/app.css", get(page::page_route::stylesheet))
        .route("/assets/app.js", get(page::page_route::script))
        .route("/health", get(health::health_route::health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use ai_llm_service::health_service::HealthService;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::core::{
        app_settings::AppSettings,
        app_state::LlmRuntime,
        startup::{StartupState, check_llm},
    };

    fn settings(provider: &str, base_url: &str, key: &str) -> AppSettings {
        AppSettings {
            llm_provider: provider.into(),
            llm_base_url: base_url.into(),
            llm_model: "test-model".into(),
            llm_temperature: 0.7,
            enable_code_execution: false,
            google_api_key: key.into(),
            openai_api_key: None,
            anthropic_api_key: None,
            local_api_key: None,
        }
    }

    async fn app_for(settings: AppSettings, settings_path: PathBuf) -> Router {
        let health = HealthService::new(Some(5)).unwrap();
        let (startup, llm) = check_llm(&settings, &health).await;
        router(Arc::new(AppState::assemble(
            LlmRuntime::new(settings, startup, llm),
            settings_path,
            health,
        )))
    }

    async fn mount_models(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": "test-model"}]})),
            )
            .mount(server)
            .await;
    }

    async fn local_app(server: &MockServer) -> Router {
        mount_models(server).await;
        local_app_unchecked(server).await
    }

    /// Local app whose `/v1/models` mock is left to the caller.
    async fn local_app_unchecked(server: &MockServer) -> Router {
        app_for(settings("lmstudio", &server.uri(), ""), PathBuf::from("unused.json")).await
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, String) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .header("x-session-id", "test-session")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("x-session-id", "test-session")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn gemini_with_invalid_key_shows_banner_without_tabs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1beta/models/test-model"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "status": "INVALID_ARGUMENT",
                          "details": [{"reason": "API_KEY_INVALID"}]}
            })))
            .mount(&server)
            .await;

        let app = app_for(settings("google", &server.uri(), "bad-key"), "unused.json".into()).await;

        let (status, html) = send(app.clone(), get("/")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(html.contains("Machine Learning &amp; Deep Learning Interview Preparation"));
        assert!(html.contains("Please check your Google Gemini API key"));
        assert!(!html.contains(r#"role="tablist""#));

        let (status, body) = send(
            app,
            post_json("/api/quiz/generate", json!({"topic": "clustering"})),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.contains("LLM_UNAVAILABLE"));
    }

    #[tokio::test]
    async fn ready_page_renders_four_tabs_and_sets_cookie() {
        let server = MockServer::start().await;
        let app = local_app(&server).await;

        let res = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().get("set-cookie").is_some());
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        for title in ["Coding Practice", "Multiple Choice Questions", "Settings", "Help"] {
            assert!(html.contains(title), "missing tab {title}");
        }
    }

    #[tokio::test]
    async fn quiz_generate_then_submit_records_history() {
        let server = MockServer::start().await;
        let quiz = json!([{
            "question": "Which norm does Lasso use?",
            "options": ["L1", "L2", "L-infinity", "None"],
            "correct_index": 0,
            "explanation": "Lasso penalizes absolute values."
        }]);
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": format!("```json\n{quiz}\n```")}}]
            })))
            .mount(&server)
            .await;
        let app = local_app(&server).await;

        let (status, body) = send(
            app.clone(),
            post_json(
                "/api/quiz/generate",
                json!({"topic": "regularization", "difficulty": "easy", "count": 1}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let v: Value = serde_json::from_str(&body).unwrap();
        let questions = v["data"].clone();
        assert_eq!(questions.as_array().unwrap().len(), 1);

        let (status, body) = send(
            app.clone(),
            post_json(
                "/api/quiz/submit",
                json!({"topic": "regularization", "questions": questions, "answers": [0]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let v: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(v["data"]["correct"], 1);
        assert_eq!(v["data"]["percent"], 100.0);

        let (_, body) = send(app, get("/api/history")).await;
        let v: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(v["data"]["quiz"].as_array().unwrap().len(), 1);
        assert_eq!(v["data"]["quiz_accuracy"], 100.0);
    }

    #[tokio::test]
    async fn upstream_auth_failure_maps_to_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
            .mount(&server)
            .await;
        let app = local_app(&server).await;

        let (status, body) = send(
            app,
            post_json("/api/coding/problem", json!({"topic": "clustering"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let v: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(v["success"], false);
        assert_eq!(v["error"]["code"], "LLM_AUTH_FAILED");
    }

    #[tokio::test]
    async fn bad_body_and_disabled_execution_are_rejected() {
        let server = MockServer::start().await;
        let app = local_app(&server).await;

        let (status, body) = send(
            app.clone(),
            post_json("/api/quiz/generate", json!({"topic": "astrology"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("BAD_REQUEST"));

        let (status, body) = send(app.clone(), post_json("/api/coding/run", json!({"code": "print(1)"}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.contains("CODE_EXECUTION_DISABLED"));

        let (status, body) = send(
            app,
            post_json("/api/quiz/generate", json!({"topic": "clustering", "count": 11})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("count must be between 1 and 10"));
    }

    #[tokio::test]
    async fn settings_are_redacted_and_updates_need_restart() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let path_on_disk = dir.path().join(".app_settings.json");
        let initial = settings("lmstudio", &server.uri(), "AIza-secret");
        initial.save(&path_on_disk).await.unwrap();
        mount_models(&server).await;
        let app = app_for(initial, path_on_disk.clone()).await;

        let (status, body) = send(app.clone(), get("/api/settings")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains("AIza-secret"));
        assert!(body.contains("********"));

        let req = Request::builder()
            .method("PUT")
            .uri("/api/settings")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({
                    "llm_provider": "google",
                    "llm_model": "gemini-1.5-flash",
                    "llm_temperature": 0.2,
                    "enable_code_execution": true,
                    "google_api_key": "********"
                })
                .to_string(),
            ))
            .unwrap();
        let (status, body) = send(app.clone(), req).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert!(body.contains("\"restart_required\":true"));

        let saved = AppSettings::read_file(&path_on_disk).await.unwrap();
        assert_eq!(saved.llm_provider, "google");
        assert_eq!(saved.google_api_key, "AIza-secret");

        // the running instance still reports the provider it started with
        let (_, body) = send(app, get("/api/settings")).await;
        assert!(body.contains("\"llm_provider\":\"lmstudio\""));
    }

    #[tokio::test]
    async fn failed_check_recovers_on_next_page_load() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let app = local_app_unchecked(&server).await;

        let (status, _) = send(app.clone(), get("/")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        // the local server finished loading the model
        server.reset().await;
        mount_models(&server).await;

        let (status, html) = send(app.clone(), get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(r#"role="tablist""#));

        let (status, _) = send(app, get("/tabs/quiz")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_settings_file_is_not_overwritten() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let path_on_disk = dir.path().join(".app_settings.json");
        let broken = "{ \"llm_provider\": \"google\", ";
        std::fs::write(&path_on_disk, broken).unwrap();

        mount_models(&server).await;
        let app = app_for(settings("lmstudio", &server.uri(), ""), path_on_disk.clone()).await;

        let req = Request::builder()
            .method("PUT")
            .uri("/api/settings")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({
                    "llm_provider": "lmstudio",
                    "llm_model": "other-model",
                    "llm_temperature": 0.5
                })
                .to_string(),
            ))
            .unwrap();
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::CONFLICT, "{body}");
        assert!(body.contains("SETTINGS_FILE_INVALID"));
        assert_eq!(std::fs::read_to_string(&path_on_disk).unwrap(), broken);
    }

    #[tokio::test]
    async fn session_cookie_is_kept_and_keys_history() {
        let server = MockServer::start().await;
        let app = local_app(&server).await;

        let req = Request::builder()
            .uri("/")
            .header("cookie", "session_id=browser-1")
            .body(Body::empty())
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().get("set-cookie").is_none());

        let submit = Request::builder()
            .method("POST")
            .uri("/api/quiz/submit")
            .header("content-type", "application/json")
            .header("cookie", "session_id=browser-1")
            .body(Body::from(
                json!({
                    "topic": "clustering",
                    "questions": [{
                        "question": "k-means minimizes?",
                        "options": ["inertia", "entropy", "margin", "log-loss"],
                        "correct_index": 0,
                        "explanation": "Within-cluster sum of squares."
                    }],
                    "answers": [0]
                })
                .to_string(),
            ))
            .unwrap();
        let (status, body) = send(app.clone(), submit).await;
        assert_eq!(status, StatusCode::OK, "{body}");

        let history = |cookie: &str| {
            Request::builder()
                .uri("/api/history")
                .header("cookie", cookie)
                .body(Body::empty())
                .unwrap()
        };
        let (_, body) = send(app.clone(), history("session_id=browser-1")).await;
        let v: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(v["data"]["quiz"].as_array().unwrap().len(), 1);

        let (_, body) = send(app, history("session_id=browser-2")).await;
        let v: Value = serde_json::from_str(&body).unwrap();
        assert!(v["data"]["quiz"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_tab_is_not_found() {
        let server = MockServer::start().await;
        let app = local_app(&server).await;
        let (status, _) = send(app.clone(), get("/tabs/help")).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(app, get("/tabs/admin")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn startup_state_serializes_with_reason() {
        assert_eq!(
            serde_json::to_value(StartupState::Failed("x".into())).unwrap(),
            json!({"state": "failed", "reason": "x"})
        );
        assert_eq!(
            serde_json::to_value(StartupState::Ready).unwrap(),
            json!({"state": "ready"})
        );
    }
}
