use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, Store, API_KEY_HEADER};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(API_KEY_HEADER, "test_token")
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(API_KEY_HEADER, "test_token")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn workout_body(title: &str) -> Value {
    json!({
        "id": "",
        "title": title,
        "description": "",
        "start_time": "2024-01-15T10:00:00Z",
        "end_time": "2024-01-15T11:00:00Z",
        "updated_at": "2024-01-15T11:00:00Z",
        "created_at": "2024-01-15T10:00:00Z",
        "exercises": []
    })
}

// --- auth ---

#[tokio::test]
async fn missing_api_key_is_unauthorized() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/v1/workouts/count")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await, json!({"error": "Unauthorized"}));
}

// --- workouts ---

#[tokio::test]
async fn workout_count_starts_at_zero() {
    let resp = app().oneshot(get("/v1/workouts/count")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"workout_count": 0}));
}

#[tokio::test]
async fn create_workout_assigns_id() {
    let resp = app()
        .oneshot(json_request("POST", "/v1/workouts", &workout_body("Push Day")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let workout = body_json(resp).await;
    assert_eq!(workout["title"], "Push Day");
    assert!(!workout["id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn create_workout_rejects_non_object() {
    let resp = app()
        .oneshot(json_request("POST", "/v1/workouts", &json!([])))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(resp).await["error"].is_string());
}

#[tokio::test]
async fn unknown_workout_is_404_with_error_body() {
    let resp = app().oneshot(get("/v1/workouts/nope")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_json(resp).await["error"].is_string());
}

#[tokio::test]
async fn list_workouts_pages() {
    let store = Store {
        workouts: (0..7).map(|i| json!({"id": i.to_string()})).collect(),
        ..Store::default()
    };
    let resp = app_with(store)
        .oneshot(get("/v1/workouts?page=2&pageSize=5"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["page"], 2);
    assert_eq!(body["page_count"], 2);
    assert_eq!(body["workouts"], json!([{"id": "5"}, {"id": "6"}]));
}

#[tokio::test]
async fn update_unknown_workout_is_404() {
    let resp = app()
        .oneshot(json_request("PUT", "/v1/workouts/nope", &workout_body("x")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- routines ---

#[tokio::test]
async fn routines_are_wrapped_in_envelope() {
    let store = Store {
        routines: vec![json!({"id": "r1", "title": "Legs", "exercises": []})],
        ..Store::default()
    };
    let resp = app_with(store).oneshot(get("/v1/routines/r1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["routine"]["title"], "Legs");
}

#[tokio::test]
async fn update_routine_returns_array_envelope() {
    let store = Store {
        routines: vec![json!({"id": "r1", "title": "Legs", "created_at": "2024-01-01T00:00:00Z"})],
        ..Store::default()
    };
    let resp = app_with(store)
        .oneshot(json_request(
            "PUT",
            "/v1/routines/r1",
            &json!({"title": "Legs v2", "exercises": []}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["routine"][0]["id"], "r1");
    assert_eq!(body["routine"][0]["title"], "Legs v2");
}

// --- exercise templates ---

#[tokio::test]
async fn exercise_templates_are_seeded() {
    let resp = app()
        .oneshot(get("/v1/exercise_templates?page=1&pageSize=100"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["page_count"], 1);
    assert!(!body["exercise_templates"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn exercise_template_by_id() {
    let resp = app()
        .oneshot(get("/v1/exercise_templates/79D0BB3A"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["title"], "Bench Press (Barbell)");
}

#[tokio::test]
async fn huge_page_number_is_rejected() {
    let resp = app()
        .oneshot(get(&format!("/v1/workouts?page={}&pageSize=100", usize::MAX)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(resp).await["error"].is_string());
}

#[tokio::test]
async fn oversized_page_is_rejected() {
    let resp = app()
        .oneshot(get("/v1/exercise_templates?pageSize=1000"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
