use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn answer_body(correct: bool, latency_ms: i64) -> Value {
    json!({
        "isCorrect": correct,
        "latencyMs": latency_ms,
        "revisions": 0,
        "idleBeforeSubmitMs": 0,
        "timeToFirstInteractionMs": 0,
        "selectedAnswer": "5"
    })
}

async fn start(app: &Router, age_group: &str) -> String {
    let (status, body) = send(app, "POST", "/api/sessions", Some(json!({ "ageGroup": age_group }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["sessionId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_root() {
    let app = common::create_test_app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_health_ready_reports_classifier() {
    let app = common::create_test_app();
    let (status, body) = send(&app, "GET", "/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["classifier"], "bootstrap");
    assert_eq!(body["checks"]["redis"], "disabled");
}

#[tokio::test]
async fn test_health_live() {
    let app = common::create_test_app();
    let (status, body) = send(&app, "GET", "/health/live", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = common::create_test_app();
    let (status, body) = send(&app, "GET", "/api/nothing-here", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_start_session_with_unknown_age_uses_default() {
    let app = common::create_test_app();
    let (status, body) = send(&app, "POST", "/api/sessions", Some(json!({ "ageGroup": "adult" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["ageGroup"], "7-8");
    assert_eq!(body["data"]["difficultyState"], "MEDIUM");
}

#[tokio::test]
async fn test_answer_flow_raises_difficulty() {
    let app = common::create_test_app();
    let id = start(&app, "7-8").await;
    let uri = format!("/api/sessions/{id}/answers");

    let mut last = Value::Null;
    for _ in 0..3 {
        let (status, body) = send(&app, "POST", &uri, Some(answer_body(true, 2000))).await;
        assert_eq!(status, StatusCode::OK);
        last = body;
    }
    assert_eq!(last["data"]["difficultyState"], "HARD");
    assert!(last["data"]["transitionReason"].is_string());
    assert_eq!(last["data"]["answersRecorded"], 3);
    assert!(last["data"]["derivedFeatures"]["confidence"].is_number());

    let (status, body) = send(&app, "GET", &format!("/api/sessions/{id}/difficulty"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["state"], "HARD");
    assert_eq!(body["data"]["numberRange"], json!([1, 50]));
}

#[tokio::test]
async fn test_negative_latency_is_validation_error() {
    let app = common::create_test_app();
    let (status, body) = send(&app, "POST", "/api/sessions/s1/answers", Some(answer_body(true, -10))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_malformed_body_is_validation_error() {
    let app = common::create_test_app();
    let (status, body) = send(&app, "POST", "/api/sessions/s1/answers", Some(json!({ "isCorrect": "yes" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_duplicate_question_is_conflict() {
    let app = common::create_test_app();
    let uri = "/api/sessions/dup/answers";

    let mut first = answer_body(true, 2000);
    first["questionId"] = json!("a");
    let mut second = answer_body(true, 2100);
    second["questionId"] = json!("b");

    assert_eq!(send(&app, "POST", uri, Some(first.clone())).await.0, StatusCode::OK);
    assert_eq!(send(&app, "POST", uri, Some(second)).await.0, StatusCode::OK);
    let (status, body) = send(&app, "POST", uri, Some(first)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_reads_on_unknown_session_are_404() {
    let app = common::create_test_app();
    for path in ["", "/difficulty", "/analysis", "/features"] {
        let (status, body) = send(&app, "GET", &format!("/api/sessions/missing{path}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "path {path}");
        assert_eq!(body["code"], "NOT_FOUND");
    }
    let (status, _) = send(&app, "POST", "/api/sessions/missing/finalize", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", "/api/dashboard/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_generation_request_query() {
    let app = common::create_test_app();
    let id = start(&app, "5-6").await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/sessions/{id}/generation-request?testType=memory-recall&count=3"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["testType"], "memory-recall");
    assert_eq!(body["data"]["count"], 3);
    assert_eq!(body["data"]["difficulty"]["sequenceLength"], 3);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/sessions/{id}/generation-request?testType=juggling"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_finalize_and_dashboard() {
    let app = common::create_test_app();
    let id = start(&app, "9-10").await;
    let uri = format!("/api/sessions/{id}/answers");
    for (correct, latency) in [(true, 1800), (true, 2200), (false, 4000), (true, 2500)] {
        send(&app, "POST", &uri, Some(answer_body(correct, latency))).await;
    }

    let (status, first) = send(&app, "POST", &format!("/api/sessions/{id}/finalize"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = send(&app, "POST", &format!("/api/sessions/{id}/finalize"), None).await;
    assert_eq!(first, second);
    let level = first["data"]["riskLevel"].as_str().unwrap();
    assert!(["low", "medium", "high"].contains(&level));

    let (status, report) = send(&app, "GET", &format!("/api/dashboard/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["data"]["totalQuestions"], 4);
    assert_eq!(report["data"]["correctAnswers"], 3);
    assert_eq!(report["data"]["features"]["accuracyPercent"], 75.0);
    assert_eq!(report["data"]["assessment"], first["data"]);

    let (status, analysis) = send(&app, "GET", &format!("/api/sessions/{id}/analysis"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(analysis["data"]["totalQuestions"], 4);
}
