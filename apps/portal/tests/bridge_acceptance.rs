use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use client_core::{ApiClient, BackendApi, RetryPolicy};
use crossbeam_channel::{bounded, Receiver};
use portal::{
    backend_bridge::runtime,
    controller::{actions::UiAction, events::UiEvent},
    ui::{shell::Route, theme::Accent, views},
    PortalApp, Settings,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

struct Harness {
    app: PortalApp,
    ui_rx: Receiver<UiEvent>,
    _server: tokio::runtime::Runtime,
}

fn spawn_server(runtime: &tokio::runtime::Runtime, router: Router) -> String {
    runtime.block_on(async {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        format!("http://{addr}")
    })
}

fn settings(base: &str) -> Settings {
    Settings {
        api_base_url: base.to_string(),
        request_timeout: Duration::from_secs(5),
        retry: RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(20),
        },
        color: false,
        ..Settings::default()
    }
}

fn harness_with(server: tokio::runtime::Runtime, settings: Settings) -> Harness {
    let api = ApiClient::with_policy(&settings.api_base_url, settings.request_policy())
        .expect("client");
    let api: Arc<dyn BackendApi> = Arc::new(api);
    let (cmd_tx, cmd_rx) = bounded(32);
    let (ui_tx, ui_rx) = bounded(64);
    runtime::launch(api, cmd_rx, ui_tx).expect("bridge");
    Harness {
        app: PortalApp::new(&settings, cmd_tx),
        ui_rx,
        _server: server,
    }
}

fn harness(router: Router) -> Harness {
    let server = tokio::runtime::Runtime::new().expect("server runtime");
    let base = spawn_server(&server, router);
    harness_with(server, settings(&base))
}

impl Harness {
    /// Feeds bridge events into the app until `done` holds.
    fn pump_until(&mut self, done: impl Fn(&PortalApp) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !done(&self.app) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.ui_rx.recv_timeout(remaining) {
                Ok(event) => self.app.handle_event(event),
                Err(_) => panic!("timed out waiting for bridge; screen:\n{}", self.app.render()),
            }
        }
    }

    fn act(&mut self, line: &str) {
        let action = UiAction::parse(line).expect("valid command");
        self.app.handle_action(action);
    }
}

fn curriculum() -> Value {
    json!({
        "curriculum_analysis": {
            "Levels": {"L3 Grade 12": 12},
            "Types": {"PDF Books": 5, "Presentations": 3},
            "Structure": [{"file": "unit1.pdf"}, {"file": "unit1.pptx"}]
        }
    })
}

#[test]
fn merit_grade_renders_blue_card_with_feedback() {
    let router = Router::new()
        .route("/api/v1/btec-resources", get(|| async { Json(curriculum()) }))
        .route("/api/health", get(|| async { Json(json!({"status": "ok"})) }))
        .route(
            "/api/v1/ai-grade",
            post(|Json(body): Json<Value>| async move {
                if body
                    != json!({
                        "student_id": "Demo-User",
                        "unit_name": "Unit 1: Business Environment",
                        "submission_text": "The business environment impacts strategy."
                    })
                {
                    return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({"detail": "bad body"})));
                }
                (
                    StatusCode::OK,
                    Json(json!({"grade": "Merit", "ai_feedback": "Good analysis."})),
                )
            }),
        );
    let mut h = harness(router);
    h.app.start(Route::Dashboard);
    h.pump_until(|app| {
        app.dashboard().stats().value().is_some() && app.dashboard().health().value().is_some()
    });
    let rendered = h.app.render();
    assert!(rendered.contains("Grade 12 Files: 12  |  Textbooks: 5  |  Slides: 3"));
    assert!(rendered.contains("System scanned 2 resources."));
    assert!(rendered.contains("AI: ONLINE"));

    h.act("grade The business environment impacts strategy.");
    assert!(h.app.render().contains("[Analyzing...]"));
    h.pump_until(|app| !app.dashboard().grading().is_pending());

    let result = h.app.dashboard().grading().value().expect("graded");
    let card = views::grade_card(result);
    assert_eq!(card.title, "Merit");
    assert_eq!(card.accent, Accent::Blue);
    assert_eq!(card.body, "Good analysis.");
    assert!(h.app.render().contains("[Merit]\nGood analysis."));
}

#[test]
fn empty_course_list_renders_as_empty() {
    let router = Router::new().route("/courses", get(|| async { Json(json!([])) }));
    let mut h = harness(router);
    h.app.start(Route::Courses);
    h.pump_until(|app| !app.courses().courses().is_pending());

    assert_eq!(h.app.courses().courses().value(), Some(&Vec::new()));
    let rendered = h.app.render();
    assert!(rendered.contains("No courses yet."));
    assert!(!rendered.contains("Connection Failed"));
}

#[test]
fn unreachable_backend_shows_connection_failed() {
    let port = {
        let spare = std::net::TcpListener::bind("127.0.0.1:0").expect("spare port");
        spare.local_addr().expect("addr").port()
    };
    let server = tokio::runtime::Runtime::new().expect("server runtime");
    let mut h = harness_with(server, settings(&format!("http://127.0.0.1:{port}")));
    h.app.start(Route::Dashboard);
    h.pump_until(|app| {
        !app.dashboard().stats().is_pending() && !app.dashboard().health().is_pending()
    });

    assert!(h.app.dashboard().stats().error().is_some());
    let rendered = h.app.render();
    assert!(rendered.contains("Connection Failed"));
    assert!(rendered.contains("AI: OFFLINE"));
    assert!(!rendered.contains("Loading..."));
}

#[test]
fn validation_rejection_shows_backend_detail() {
    let router = Router::new()
        .route("/api/v1/btec-resources", get(|| async { Json(curriculum()) }))
        .route("/api/health", get(|| async { Json(json!({"status": "ok"})) }))
        .route(
            "/api/v1/ai-grade",
            post(|| async {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({"detail": [{"loc": ["body", "submission_text"], "msg": "field required"}]})),
                )
            }),
        );
    let mut h = harness(router);
    h.app.start(Route::Dashboard);
    h.act("grade short");
    h.pump_until(|app| !app.dashboard().grading().is_pending());

    assert!(h.app.render().contains("Request rejected: field required"));
}

#[test]
fn base_url_override_applies_to_later_calls() {
    let server = tokio::runtime::Runtime::new().expect("server runtime");
    let alpha = spawn_server(
        &server,
        Router::new().route("/courses", get(|| async { Json(json!([{"id": 1, "title": "Alpha"}])) })),
    );
    let beta = spawn_server(
        &server,
        Router::new().route("/courses", get(|| async { Json(json!([{"id": 2, "title": "Beta"}])) })),
    );
    let mut h = harness_with(server, settings(&alpha));

    h.app.start(Route::Courses);
    h.pump_until(|app| !app.courses().courses().is_pending());
    assert!(h.app.render().contains("#1 Alpha"));

    h.act(&format!("api {beta}"));
    h.pump_until(|app| app.status().starts_with("backend set to"));
    h.act("reload");
    h.pump_until(|app| !app.courses().courses().is_pending());

    let rendered = h.app.render();
    assert!(rendered.contains("#2 Beta"));
    assert!(rendered.contains(&format!("@ {beta}/")));
}

#[test]
fn login_attaches_bearer_token_to_later_requests() {
    let router = Router::new()
        .route(
            "/token",
            post(|Json(body): Json<Value>| async move {
                if body["username"] == "admin" && body["password"] == "admin" {
                    (
                        StatusCode::OK,
                        Json(json!({
                            "access_token": "test_token_123",
                            "token_type": "bearer",
                            "user": {"id": 1, "email": "admin@test.com", "name": "Admin"}
                        })),
                    )
                } else {
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({"detail": "Incorrect username or password"})),
                    )
                }
            }),
        )
        .route(
            "/api/v1/btec-resources",
            get(|headers: HeaderMap| async move {
                let authorized = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    == Some("Bearer test_token_123");
                if authorized {
                    (StatusCode::OK, Json(curriculum()))
                } else {
                    (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Not authenticated"})))
                }
            }),
        )
        .route("/api/health", get(|| async { Json(json!({"status": "ok"})) }));
    let mut h = harness(router);
    h.app.start(Route::Home);

    h.act("login admin wrong");
    h.pump_until(|app| !app.login().login().is_pending());
    assert!(h
        .app
        .render()
        .contains("Request rejected: Incorrect username or password"));

    h.act("login admin admin");
    h.pump_until(|app| app.session().is_some());
    assert_eq!(h.app.shell().current(), Route::Dashboard);
    h.pump_until(|app| !app.dashboard().stats().is_pending());

    assert!(h.app.dashboard().stats().value().is_some());
    let rendered = h.app.render();
    assert!(rendered.contains("| Admin"));
    assert!(rendered.contains("Grade 12 Files: 12"));
}
