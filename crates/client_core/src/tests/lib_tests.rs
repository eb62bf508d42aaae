use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;

use super::*;

async fn spawn_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn fast_policy() -> RequestPolicy {
    RequestPolicy {
        timeout: Duration::from_secs(5),
        retry: RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(40),
        },
    }
}

fn no_retry_policy(timeout: Duration) -> RequestPolicy {
    RequestPolicy {
        timeout,
        retry: RetryPolicy::none(),
    }
}

#[tokio::test]
async fn grade_submission_posts_json_and_decodes_result() {
    let seen: Arc<parking_lot::Mutex<Option<(String, serde_json::Value)>>> = Arc::default();
    let app = Router::new()
        .route(
            "/api/v1/ai-grade",
            post(
                |State(seen): State<Arc<parking_lot::Mutex<Option<(String, serde_json::Value)>>>>,
                 headers: HeaderMap,
                 Json(body): Json<serde_json::Value>| async move {
                    let content_type = headers
                        .get("content-type")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    *seen.lock() = Some((content_type, body));
                    Json(json!({"grade": "Merit", "ai_feedback": "Good analysis."}))
                },
            ),
        )
        .with_state(seen.clone());
    let base = spawn_server(app).await;
    let client = ApiClient::with_policy(&base, fast_policy()).expect("client");

    let request = GradeRequest {
        student_id: "Demo-User".into(),
        unit_name: "Unit 1: Business Environment".into(),
        submission_text: "The business environment impacts strategy.".into(),
    };
    let result = client
        .grade_submission(&request, &CancellationToken::new())
        .await
        .expect("grade");

    assert_eq!(result.grade, "Merit");
    assert_eq!(result.ai_feedback, "Good analysis.");
    let (content_type, body) = seen.lock().clone().expect("request captured");
    assert!(content_type.starts_with("application/json"));
    assert_eq!(
        body,
        json!({
            "student_id": "Demo-User",
            "unit_name": "Unit 1: Business Environment",
            "submission_text": "The business environment impacts strategy."
        })
    );
}

#[tokio::test]
async fn empty_course_list_is_not_an_error() {
    let app = Router::new().route("/courses", get(|| async { Json(json!([])) }));
    let base = spawn_server(app).await;
    let client = ApiClient::new(&base).expect("client");

    let courses = client
        .list_courses(&CancellationToken::new())
        .await
        .expect("courses");
    assert!(courses.is_empty());
}

#[tokio::test]
async fn curriculum_without_levels_reads_as_zero() {
    let app = Router::new().route(
        "/api/v1/btec-resources",
        get(|| async {
            Json(json!({"curriculum_analysis": {"Types": {"Presentations": 3}, "Structure": [{}, {}]}}))
        }),
    );
    let base = spawn_server(app).await;
    let client = ApiClient::new(&base).expect("client");

    let stats = client
        .curriculum_stats(&CancellationToken::new())
        .await
        .expect("stats");
    assert_eq!(stats.level_count("L3 Grade 12"), 0);
    assert_eq!(stats.type_count("Presentations"), 3);
    assert_eq!(stats.resource_count(), 2);
}

#[tokio::test]
async fn non_success_status_carries_status_and_body() {
    let app = Router::new().route(
        "/api/v1/ai-grade",
        post(|| async {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({"detail": [{"msg": "field required"}]})),
            )
        }),
    );
    let base = spawn_server(app).await;
    let client = ApiClient::new(&base).expect("client");

    let err = client
        .request(
            Method::POST,
            "/api/v1/ai-grade",
            Some(&json!({})),
            &CancellationToken::new(),
        )
        .await
        .expect_err("422");
    assert_eq!(err.kind(), RequestErrorKind::Http);
    assert_eq!(err.status(), Some(422));
    assert_eq!(err.detail().as_deref(), Some("field required"));
}

#[tokio::test]
async fn malformed_json_fails_closed() {
    let app = Router::new().route("/courses", get(|| async { "<html>oops</html>" }));
    let base = spawn_server(app).await;
    let client = ApiClient::new(&base).expect("client");

    let err = client
        .list_courses(&CancellationToken::new())
        .await
        .expect_err("parse error");
    assert_eq!(err.kind(), RequestErrorKind::Parse);
    assert_eq!(err.body(), Some("<html>oops</html>"));
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = ApiClient::with_policy(
        &format!("http://{addr}"),
        no_retry_policy(Duration::from_secs(5)),
    )
    .expect("client");
    let err = client
        .curriculum_stats(&CancellationToken::new())
        .await
        .expect_err("connection refused");
    assert_eq!(err.kind(), RequestErrorKind::Network);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn get_retries_transient_failures() {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/courses",
            get(|State(calls): State<Arc<AtomicUsize>>| async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"detail": "warming up"})))
                } else {
                    (StatusCode::OK, Json(json!([{"id": 1, "title": "Unit 1"}])))
                }
            }),
        )
        .with_state(calls.clone());
    let base = spawn_server(app).await;
    let client = ApiClient::with_policy(&base, fast_policy()).expect("client");

    let courses = client
        .list_courses(&CancellationToken::new())
        .await
        .expect("third attempt succeeds");
    assert_eq!(courses.len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn get_gives_up_after_max_attempts() {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/courses",
            get(|State(calls): State<Arc<AtomicUsize>>| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                StatusCode::BAD_GATEWAY
            }),
        )
        .with_state(calls.clone());
    let base = spawn_server(app).await;
    let client = ApiClient::with_policy(&base, fast_policy()).expect("client");

    let err = client
        .list_courses(&CancellationToken::new())
        .await
        .expect_err("exhausted");
    assert_eq!(err.status(), Some(502));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn post_is_never_retried() {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/api/v1/ai-grade",
            post(|State(calls): State<Arc<AtomicUsize>>| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                StatusCode::SERVICE_UNAVAILABLE
            }),
        )
        .with_state(calls.clone());
    let base = spawn_server(app).await;
    let client = ApiClient::with_policy(&base, fast_policy()).expect("client");

    let request = GradeRequest {
        student_id: "Demo-User".into(),
        unit_name: "Unit 1".into(),
        submission_text: "text".into(),
    };
    let err = client
        .grade_submission(&request, &CancellationToken::new())
        .await
        .expect_err("503");
    assert_eq!(err.status(), Some(503));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn slow_backend_times_out() {
    let app = Router::new().route(
        "/api/health",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({"status": "ok"}))
        }),
    );
    let base = spawn_server(app).await;
    let client =
        ApiClient::with_policy(&base, no_retry_policy(Duration::from_millis(100))).expect("client");

    let err = client
        .health(&CancellationToken::new())
        .await
        .expect_err("timeout");
    assert_eq!(err, RequestError::Timeout(Duration::from_millis(100)));
}

#[tokio::test]
async fn cancellation_resolves_promptly() {
    let app = Router::new().route(
        "/api/v1/btec-resources",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Json(json!({}))
        }),
    );
    let base = spawn_server(app).await;
    let client = Arc::new(ApiClient::with_policy(&base, fast_policy()).expect("client"));
    let cancel = CancellationToken::new();

    let task = {
        let client = Arc::clone(&client);
        let cancel = cancel.clone();
        tokio::spawn(async move { client.curriculum_stats(&cancel).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    let outcome = tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("cancelled call returns promptly")
        .expect("join");
    assert_eq!(outcome, Err(RequestError::Cancelled));
}

#[tokio::test]
async fn base_url_override_applies_to_later_calls() {
    let first = spawn_server(Router::new().route(
        "/courses",
        get(|| async { Json(json!([{"id": 1, "title": "From first"}])) }),
    ))
    .await;
    let second = spawn_server(Router::new().route(
        "/courses",
        get(|| async { Json(json!([{"id": 2, "title": "From second"}])) }),
    ))
    .await;
    let client = ApiClient::new(&first).expect("client");
    let cancel = CancellationToken::new();

    let courses = client.list_courses(&cancel).await.expect("first");
    assert_eq!(courses[0].title, "From first");

    client.set_base_url(&second).expect("override");
    assert_eq!(client.base_url().as_str(), format!("{second}/"));
    for _ in 0..2 {
        let courses = client.list_courses(&cancel).await.expect("second");
        assert_eq!(courses[0].title, "From second");
    }

    assert!(client.set_base_url("not a url").is_err());
    assert_eq!(client.base_url().as_str(), format!("{second}/"));
}

#[tokio::test]
async fn login_attaches_bearer_token_until_logout() {
    let app = Router::new()
        .route(
            "/token",
            post(|Json(body): Json<serde_json::Value>| async move {
                if body["username"] == "admin" && body["password"] == "admin" {
                    (
                        StatusCode::OK,
                        Json(json!({
                            "access_token": "test_token_123",
                            "token_type": "bearer",
                            "user": {"id": 1, "email": "admin", "name": "Test User", "role": "instructor"}
                        })),
                    )
                } else {
                    (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({"detail": "Invalid credentials"})),
                    )
                }
            }),
        )
        .route(
            "/courses",
            get(|headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("none")
                    .to_string();
                Json(json!([{"id": 1, "title": auth}]))
            }),
        );
    let base = spawn_server(app).await;
    let client = ApiClient::new(&base).expect("client");
    let cancel = CancellationToken::new();

    let err = client
        .login("admin", "wrong", &cancel)
        .await
        .expect_err("rejected");
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.detail().as_deref(), Some("Invalid credentials"));
    assert!(!client.session().is_authenticated());

    let session = client.login("admin", "admin", &cancel).await.expect("login");
    assert_eq!(session.display_name(), "Test User");
    let courses = client.list_courses(&cancel).await.expect("courses");
    assert_eq!(courses[0].title, "Bearer test_token_123");

    client.logout();
    let courses = client.list_courses(&cancel).await.expect("courses");
    assert_eq!(courses[0].title, "none");
}

#[tokio::test]
async fn login_cancelled_in_flight_establishes_no_session() {
    let cancel = CancellationToken::new();
    let app = Router::new()
        .route(
            "/token",
            post(|State(cancel): State<CancellationToken>| async move {
                // The issuing screen goes away while the token is on the wire.
                cancel.cancel();
                Json(json!({"access_token": "late_token", "token_type": "bearer"}))
            }),
        )
        .with_state(cancel.clone());
    let base = spawn_server(app).await;
    let client = ApiClient::with_policy(&base, no_retry_policy(Duration::from_secs(5)))
        .expect("client");

    let err = client
        .login("admin", "admin", &cancel)
        .await
        .expect_err("cancelled");
    assert_eq!(err.kind(), RequestErrorKind::Cancelled);
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn recommendations_send_student_id_as_query() {
    let app = Router::new().route(
        "/api/v1/virtual-tutor/recommendations",
        post(|Query(params): Query<HashMap<String, String>>| async move {
            Json(json!({"student": params.get("student_id").cloned()}))
        }),
    );
    let base = spawn_server(app).await;
    let client = ApiClient::new(&base).expect("client");
    let cancel = CancellationToken::new();

    let reply = client
        .recommendations(Some(StudentId(42)), &cancel)
        .await
        .expect("with id");
    assert_eq!(reply.0, json!({"student": "42"}));

    let reply = client.recommendations(None, &cancel).await.expect("without id");
    assert_eq!(reply.0, json!({"student": null}));
}

#[tokio::test]
async fn invalid_path_is_rejected_before_sending() {
    let client = ApiClient::new(DEFAULT_BASE_URL).expect("client");
    let err = client
        .request(Method::GET, "courses", None, &CancellationToken::new())
        .await
        .expect_err("relative path without slash");
    assert_eq!(err.kind(), RequestErrorKind::InvalidUrl);
}
