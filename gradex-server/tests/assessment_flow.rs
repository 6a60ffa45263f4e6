//! End-to-end tests for the signed assessment endpoint.

mod common;

use std::time::Duration;

use axum::http::{Method, StatusCode};
use chrono::Utc;

use common::{
    MockMode, build_test_app, register_capable_executor, send_json,
    signed_body, spawn_mock_executor,
};
use gradex_core::{ExecutorRegistry, LoadAccounting};
use gradex_model::{ExecutorId, ExerciseId};

fn assess_uri(exercise_id: i64) -> String {
    format!("/v1/exercises/{exercise_id}/automatic-assessment")
}

#[tokio::test]
async fn signed_submission_is_graded_end_to_end() {
    let app = build_test_app(Duration::from_secs(5));
    let base_url = spawn_mock_executor(MockMode::Grade(91, "looks good")).await;
    let id = register_capable_executor(&app, 1, &base_url, 5).await;

    let (status, body) = send_json(
        &app.router,
        Method::POST,
        &assess_uri(1),
        Some(signed_body(&app, 1, "print('hello')")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["grade"], 91);
    assert_eq!(body["feedback"], "looks good");

    let executor = app.store.get(ExecutorId(id)).await.unwrap().unwrap();
    assert_eq!(executor.current_load, 0);
}

#[tokio::test]
async fn stale_timestamp_is_rejected_with_a_generic_403() {
    let app = build_test_app(Duration::from_secs(5));
    let base_url = spawn_mock_executor(MockMode::Grade(100, "")).await;
    register_capable_executor(&app, 1, &base_url, 5).await;

    let timestamp = Utc::now().timestamp() - 40;
    let signature = app.crypto.sign(ExerciseId(1), "sub", timestamp);
    let (status, body) = send_json(
        &app.router,
        Method::POST,
        &assess_uri(1),
        Some(serde_json::json!({
            "submission": "sub",
            "timestamp": timestamp,
            "signature": signature,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    // The precise reason stays in the logs.
    assert_eq!(body["error"]["message"], "Forbidden");
}

#[tokio::test]
async fn future_timestamp_is_rejected() {
    let app = build_test_app(Duration::from_secs(5));
    let base_url = spawn_mock_executor(MockMode::Grade(100, "")).await;
    register_capable_executor(&app, 1, &base_url, 5).await;

    let timestamp = Utc::now().timestamp() + 5;
    let signature = app.crypto.sign(ExerciseId(1), "sub", timestamp);
    let (status, _) = send_json(
        &app.router,
        Method::POST,
        &assess_uri(1),
        Some(serde_json::json!({
            "submission": "sub",
            "timestamp": timestamp,
            "signature": signature,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn tampered_signature_is_rejected() {
    let app = build_test_app(Duration::from_secs(5));
    let base_url = spawn_mock_executor(MockMode::Grade(100, "")).await;
    register_capable_executor(&app, 1, &base_url, 5).await;

    let mut body = signed_body(&app, 1, "sub");
    body["signature"] = serde_json::json!(
        "deadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef"
    );
    let (status, _) =
        send_json(&app.router, Method::POST, &assess_uri(1), Some(body)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn exercise_without_executors_is_a_conflict() {
    let app = build_test_app(Duration::from_secs(5));

    let (status, _) = send_json(
        &app.router,
        Method::POST,
        &assess_uri(42),
        Some(signed_body(&app, 42, "sub")),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn saturated_fleet_is_refused_without_reserving_load() {
    let app = build_test_app(Duration::from_secs(5));
    let base_url = spawn_mock_executor(MockMode::Grade(100, "")).await;
    let id = register_capable_executor(&app, 1, &base_url, 1).await;
    app.store.increment_load(ExecutorId(id)).await.unwrap();

    let (status, _) = send_json(
        &app.router,
        Method::POST,
        &assess_uri(1),
        Some(signed_body(&app, 1, "sub")),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let executor = app.store.get(ExecutorId(id)).await.unwrap().unwrap();
    assert_eq!(executor.current_load, 1);
}

#[tokio::test]
async fn executor_timeout_is_an_internal_error_and_load_is_released() {
    let app = build_test_app(Duration::from_millis(200));
    let base_url = spawn_mock_executor(MockMode::Slow(Duration::from_secs(5))).await;
    let id = register_capable_executor(&app, 1, &base_url, 5).await;

    let (status, _) = send_json(
        &app.router,
        Method::POST,
        &assess_uri(1),
        Some(signed_body(&app, 1, "while True: pass")),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let executor = app.store.get(ExecutorId(id)).await.unwrap().unwrap();
    assert_eq!(executor.current_load, 0);
}

#[tokio::test]
async fn out_of_range_grade_is_an_internal_error() {
    let app = build_test_app(Duration::from_secs(5));
    let base_url = spawn_mock_executor(MockMode::Grade(150, "generous")).await;
    register_capable_executor(&app, 1, &base_url, 5).await;

    let (status, _) = send_json(
        &app.router,
        Method::POST,
        &assess_uri(1),
        Some(signed_body(&app, 1, "sub")),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn dispatch_prefers_the_less_loaded_executor() {
    let app = build_test_app(Duration::from_secs(5));
    let busy_url = spawn_mock_executor(MockMode::Grade(10, "busy")).await;
    let idle_url = spawn_mock_executor(MockMode::Grade(90, "idle")).await;

    let busy = register_capable_executor(&app, 1, &busy_url, 10).await;
    let idle = {
        let (status, body) = send_json(
            &app.router,
            Method::POST,
            "/v1/executors",
            Some(serde_json::json!({
                "name": "idle executor",
                "base_url": idle_url,
                "max_load": 10,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    };
    let (status, _) = send_json(
        &app.router,
        Method::PUT,
        "/v1/exercises/1/executors",
        Some(serde_json::json!({ "executors": [busy, idle] })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Pre-load the first executor; selection must go to the idle one.
    for _ in 0..8 {
        app.store.increment_load(ExecutorId(busy)).await.unwrap();
    }

    let (status, body) = send_json(
        &app.router,
        Method::POST,
        &assess_uri(1),
        Some(signed_body(&app, 1, "sub")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["feedback"], "idle");
}
