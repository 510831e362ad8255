//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycles across content, students and cache.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use eveil::{api::create_router, AppState, Config};
use serde_json::{json, Value};
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    create_router(AppState::in_memory(&Config::default()))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn create_student(app: &Router, id: u64, level: u8) {
    let (status, _) = send(
        app,
        "PUT",
        &format!("/students/{}", id),
        Some(json!({"name": "Léa", "level": level})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

fn success_attempt() -> Value {
    json!({"success": true, "time_spent_secs": 30, "hints_used": 0, "answer": ["a"]})
}

fn ids(json: &Value) -> Vec<String> {
    json.as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap().to_string())
        .collect()
}

// == Content Endpoint Tests ==

#[tokio::test]
async fn test_phonics_content_for_period() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/content/phonics?period=1", None).await;

    assert_eq!(status, StatusCode::OK);
    let challenges = json.as_array().unwrap();
    assert_eq!(challenges.len(), 17);
    assert!(challenges.iter().all(|c| c["period"] == 1));
}

#[tokio::test]
async fn test_math_content_for_level() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/content/math?level=4", None).await;

    assert_eq!(status, StatusCode::OK);
    let challenges = json.as_array().unwrap();
    assert_eq!(challenges.len(), 5);
    assert!(challenges.iter().all(|c| c["operation"] == "addition"));
}

#[tokio::test]
async fn test_content_listing_served_from_cache_second_time() {
    let app = create_test_app();

    send(&app, "GET", "/content/math?level=1", None).await;
    send(&app, "GET", "/content/math?level=1", None).await;

    let (_, stats) = send(&app, "GET", "/cache/stats", None).await;
    assert_eq!(stats["hits"], 1);
    assert_eq!(stats["misses"], 1);
}

#[tokio::test]
async fn test_seeded_random_pick_is_reproducible() {
    let app = create_test_app();

    let (status, first) = send(&app, "GET", "/content/phonics/random?period=2&seed=7", None).await;
    let (_, second) = send(&app, "GET", "/content/phonics/random?period=2&seed=7", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["id"], second["id"]);
    assert_eq!(first["period"], 2);
}

#[tokio::test]
async fn test_random_pick_for_empty_level_is_not_found() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/content/math/random?level=9&seed=1", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "CHALLENGE_NOT_FOUND");
}

// == Exercise Endpoint Tests ==

#[tokio::test]
async fn test_exercise_lookup() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/exercises/math-l1-decomposition-5", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["module_level"], 1);
    assert_eq!(json["configuration"]["type"], "math");
}

#[tokio::test]
async fn test_check_answer() {
    let app = create_test_app();
    let uri = "/exercises/math-l1-decomposition-5/check";

    let (status, json) = send(&app, "POST", uri, Some(json!({"answer": [3, 2]}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["correct"], true);

    let (_, json) = send(&app, "POST", uri, Some(json!({"answer": [1, 1]}))).await;
    assert_eq!(json["correct"], false);

    let (status, json) = send(&app, "POST", uri, Some(json!({"answer": "five"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_ANSWER");
}

// == Student Endpoint Tests ==

#[tokio::test]
async fn test_recommendations_skip_completed_exercises() {
    let app = create_test_app();
    create_student(&app, 1, 1).await;

    let (status, json) = send(&app, "GET", "/students/1/recommendations?limit=3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        ids(&json),
        vec!["phonics-p1-phoneme-0", "phonics-p1-phoneme-1", "phonics-p1-phoneme-2"]
    );

    let (status, record) = send(
        &app,
        "POST",
        "/students/1/exercises/phonics-p1-phoneme-0/attempts",
        Some(success_attempt()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["status"], "completed");

    let (_, json) = send(&app, "GET", "/students/1/recommendations?limit=3", None).await;
    assert_eq!(
        ids(&json),
        vec!["phonics-p1-phoneme-1", "phonics-p1-phoneme-2", "phonics-p1-phoneme-3"]
    );
}

#[tokio::test]
async fn test_progress_reflects_attempts() {
    let app = create_test_app();
    create_student(&app, 2, 1).await;

    let (_, before) = send(&app, "GET", "/students/2/progress", None).await;
    assert_eq!(before["total_points"], 0);

    send(
        &app,
        "POST",
        "/students/2/exercises/phonics-p1-phoneme-0/attempts",
        Some(success_attempt()),
    )
    .await;

    let (status, after) = send(&app, "GET", "/students/2/progress", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["total_points"], 10);
    assert_eq!(after["exercises_completed"], 1);
    assert_eq!(after["streak"], 1);
}

#[tokio::test]
async fn test_access_updates_streak() {
    let app = create_test_app();
    create_student(&app, 3, 2).await;

    let (status, json) = send(&app, "POST", "/students/3/access", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["streak"], 1);
}

#[tokio::test]
async fn test_preferences_and_level_updates() {
    let app = create_test_app();
    create_student(&app, 4, 1).await;

    let (status, json) = send(
        &app,
        "PUT",
        "/students/4/preferences",
        Some(json!({"sound_enabled": false, "animations_enabled": true, "theme": "ocean"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["preferences"]["theme"], "ocean");

    let (status, json) = send(&app, "PUT", "/students/4/level", Some(json!({"level": 3}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["level"], 3);

    let (_, json) = send(&app, "GET", "/students/4/recommendations?limit=1", None).await;
    assert_eq!(ids(&json), vec!["phonics-p3-phoneme-0"]);
}

// == Error Response Tests ==

#[tokio::test]
async fn test_attempt_for_unknown_student() {
    let app = create_test_app();

    let (status, json) = send(
        &app,
        "POST",
        "/students/404/exercises/phonics-p1-phoneme-0/attempts",
        Some(success_attempt()),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "STUDENT_NOT_FOUND");
}

#[tokio::test]
async fn test_attempt_without_success_flag() {
    let app = create_test_app();
    create_student(&app, 5, 1).await;

    let (status, json) = send(
        &app,
        "POST",
        "/students/5/exercises/phonics-p1-phoneme-0/attempts",
        Some(json!({"time_spent_secs": 30})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "MISSING_SUCCESS_FLAG");
}

#[tokio::test]
async fn test_invalid_level_rejected() {
    let app = create_test_app();

    let (status, json) = send(&app, "PUT", "/students/6", Some(json!({"name": "Tom", "level": 9}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_LEVEL");
}

#[tokio::test]
async fn test_invalid_json_request() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/students/7")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"invalid json"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["code"], "INVALID_BODY");
}

#[tokio::test]
async fn test_mistyped_attempt_fields_get_validation_code() {
    let app = create_test_app();
    create_student(&app, 8, 1).await;
    let uri = "/students/8/exercises/phonics-p1-phoneme-0/attempts";

    for body in [
        json!({"success": true, "time_spent_secs": 12.5}),
        json!({"success": "yes", "time_spent_secs": 12}),
    ] {
        let (status, json) = send(&app, "POST", uri, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "INVALID_BODY");
        assert!(json["error"].as_str().is_some());
    }

    let (_, progress) = send(&app, "GET", "/students/8/progress", None).await;
    assert_eq!(progress["attempts"], 0);
}

// == Health and Stats Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json["exercises"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_cache_stats_reports_memory_backend() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/cache/stats", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["backend"], "memory");
    assert!(json.get("hit_rate").is_some());
}
