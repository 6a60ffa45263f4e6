//! Shared harness for the server integration tests.

#![allow(unused)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{Method, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use tower::ServiceExt;

use gradex_contracts::{AssessRequest, AssessResponse};
use gradex_core::{Dispatcher, MemoryExecutorStore, RequestCrypto};
use gradex_model::ExerciseId;
use gradex_server::{AppState, create_api_router};

pub const TEST_PSK: &str = "integration-test-psk";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryExecutorStore>,
    pub crypto: Arc<RequestCrypto>,
}

/// Build the app on the in-memory store with the given outbound timeout.
pub fn build_test_app(call_timeout: Duration) -> TestApp {
    let store = Arc::new(MemoryExecutorStore::new());
    let crypto = Arc::new(RequestCrypto::new(TEST_PSK, 30).unwrap());
    let dispatcher = Arc::new(Dispatcher::new(
        store.clone(),
        crypto.clone(),
        call_timeout,
    ));
    let state = AppState::new(store.clone(), dispatcher, crypto.clone());
    TestApp {
        router: create_api_router(state),
        store,
        crypto,
    }
}

/// Drive one request through the router and decode the JSON body (Null for
/// empty bodies).
pub async fn send_json(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[derive(Clone)]
struct MockState {
    mode: Arc<MockMode>,
}

pub enum MockMode {
    Grade(i32, &'static str),
    Slow(Duration),
}

async fn mock_assess(
    State(state): State<MockState>,
    Path(_exercise_id): Path<i64>,
    Json(_body): Json<AssessRequest>,
) -> Response {
    match &*state.mode {
        MockMode::Grade(grade, feedback) => Json(AssessResponse {
            grade: *grade,
            feedback: (*feedback).to_string(),
        })
        .into_response(),
        MockMode::Slow(delay) => {
            tokio::time::sleep(*delay).await;
            Json(AssessResponse {
                grade: 100,
                feedback: "late".to_string(),
            })
            .into_response()
        }
    }
}

/// Serve a mock executor on an ephemeral port and return its base URL.
pub async fn spawn_mock_executor(mode: MockMode) -> String {
    let state = MockState {
        mode: Arc::new(mode),
    };
    let app = Router::new()
        .route(
            "/v1/exercises/{exercise_id}/automatic-assessment",
            post(mock_assess),
        )
        .with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Register an executor over the API and make it capable for the exercise.
pub async fn register_capable_executor(
    app: &TestApp,
    exercise_id: i64,
    base_url: &str,
    max_load: i32,
) -> i64 {
    let (status, body) = send_json(
        &app.router,
        Method::POST,
        "/v1/executors",
        Some(serde_json::json!({
            "name": "mock executor",
            "base_url": base_url,
            "max_load": max_load,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();

    let (status, _) = send_json(
        &app.router,
        Method::PUT,
        &format!("/v1/exercises/{exercise_id}/executors"),
        Some(serde_json::json!({ "executors": [id] })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    id
}

/// Build a correctly signed assessment body for "now".
pub fn signed_body(
    app: &TestApp,
    exercise_id: i64,
    submission: &str,
) -> serde_json::Value {
    let timestamp = chrono::Utc::now().timestamp();
    let signature =
        app.crypto
            .sign(ExerciseId(exercise_id), submission, timestamp);
    serde_json::json!({
        "submission": submission,
        "timestamp": timestamp,
        "signature": signature,
    })
}
