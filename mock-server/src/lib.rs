//! In-memory imitation of the Hevy REST API.
//!
//! Serves the `/v1` endpoints the client uses, with the same envelopes the
//! real service returns: bare objects for workouts and exercise templates,
//! `{"routine": ...}` for routines, and `{"page", "page_count", "<items>"}`
//! for lists. Every route requires an `api-key` header.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const API_KEY_HEADER: &str = "api-key";
const DEFAULT_PAGE_SIZE: usize = 5;
const MAX_PAGE_SIZE: usize = 100;

/// Collections held by the server, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Store {
    pub workouts: Vec<Value>,
    pub routines: Vec<Value>,
    pub exercise_templates: Vec<Value>,
}

impl Store {
    /// Empty workouts and routines, plus a small exercise catalogue.
    pub fn seeded() -> Self {
        Self {
            exercise_templates: seed_exercise_templates(),
            ..Self::default()
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<usize>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<usize>,
}

/// Error answer with a `{"error": "..."}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn not_found(kind: &str, id: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{kind} {id} not found"))
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub fn app() -> Router {
    app_with(Store::seeded())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/v1/workouts", get(list_workouts).post(create_workout))
        .route("/v1/workouts/count", get(workout_count))
        .route("/v1/workouts/{id}", get(get_workout).put(update_workout))
        .route("/v1/routines", get(list_routines).post(create_routine))
        .route("/v1/routines/{id}", get(get_routine).put(update_routine))
        .route("/v1/exercise_templates", get(list_exercise_templates))
        .route("/v1/exercise_templates/{id}", get(get_exercise_template))
        .layer(middleware::from_fn(require_api_key))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "mock hevy api listening");
    }
    axum::serve(listener, app()).await
}

async fn require_api_key(request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(API_KEY_HEADER)
        .is_some_and(|value| !value.is_empty());
    if !authorized {
        tracing::debug!(uri = %request.uri(), "rejecting request without api-key");
        return ApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }
    next.run(request).await
}

// --- workouts ---

async fn workout_count(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    Json(json!({ "workout_count": store.workouts.len() }))
}

async fn list_workouts(
    State(db): State<Db>,
    Query(params): Query<PageParams>,
) -> Result<Json<Value>, ApiError> {
    let store = db.read().await;
    paginate(&store.workouts, &params, "workouts").map(Json)
}

async fn get_workout(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let store = db.read().await;
    find(&store.workouts, &id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("workout", &id))
}

async fn create_workout(
    State(db): State<Db>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let workout = stamp_new(body)?;
    db.write().await.workouts.push(workout.clone());
    Ok((StatusCode::CREATED, Json(workout)))
}

async fn update_workout(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let mut store = db.write().await;
    replace(&mut store.workouts, &id, body)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("workout", &id))
}

// --- routines ---

async fn list_routines(
    State(db): State<Db>,
    Query(params): Query<PageParams>,
) -> Result<Json<Value>, ApiError> {
    let store = db.read().await;
    paginate(&store.routines, &params, "routines").map(Json)
}

async fn get_routine(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let store = db.read().await;
    find(&store.routines, &id)
        .map(|routine| Json(json!({ "routine": routine })))
        .ok_or_else(|| ApiError::not_found("routine", &id))
}

async fn create_routine(
    State(db): State<Db>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let routine = stamp_new(body)?;
    db.write().await.routines.push(routine.clone());
    Ok((StatusCode::CREATED, Json(json!({ "routine": [routine] }))))
}

async fn update_routine(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let mut store = db.write().await;
    replace(&mut store.routines, &id, body)?
        .map(|routine| Json(json!({ "routine": [routine] })))
        .ok_or_else(|| ApiError::not_found("routine", &id))
}

// --- exercise templates ---

async fn list_exercise_templates(
    State(db): State<Db>,
    Query(params): Query<PageParams>,
) -> Result<Json<Value>, ApiError> {
    let store = db.read().await;
    paginate(&store.exercise_templates, &params, "exercise_templates").map(Json)
}

async fn get_exercise_template(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let store = db.read().await;
    find(&store.exercise_templates, &id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("exercise template", &id))
}

// --- helpers ---

pub fn paginate(items: &[Value], params: &PageParams, key: &str) -> Result<Value, ApiError> {
    let page = params.page.unwrap_or(1);
    let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page == 0 {
        return Err(ApiError::bad_request("page must be at least 1"));
    }
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(ApiError::bad_request(format!(
            "pageSize must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }

    let offset = (page - 1)
        .checked_mul(page_size)
        .ok_or_else(|| ApiError::bad_request("page out of range"))?;
    let slice: Vec<Value> = items
        .iter()
        .skip(offset)
        .take(page_size)
        .cloned()
        .collect();
    let mut body = Map::new();
    body.insert("page".to_string(), page.into());
    body.insert("page_count".to_string(), items.len().div_ceil(page_size).into());
    body.insert(key.to_string(), Value::Array(slice));
    Ok(Value::Object(body))
}

fn find<'a>(items: &'a [Value], id: &str) -> Option<&'a Value> {
    items.iter().find(|item| item["id"] == id)
}

fn now() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn into_object(body: Value) -> Result<Map<String, Value>, ApiError> {
    match body {
        Value::Object(fields) => Ok(fields),
        _ => Err(ApiError::bad_request("body must be a JSON object")),
    }
}

/// Assign a fresh id and creation timestamps, ignoring any sent by the caller.
pub fn stamp_new(body: Value) -> Result<Value, ApiError> {
    let mut fields = into_object(body)?;
    fields.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
    fields.insert("created_at".to_string(), now());
    fields.insert("updated_at".to_string(), now());
    Ok(Value::Object(fields))
}

/// Replace the object stored under `id`, keeping its id and creation time.
fn replace(items: &mut [Value], id: &str, body: Value) -> Result<Option<Value>, ApiError> {
    let mut fields = into_object(body)?;
    let Some(slot) = items.iter_mut().find(|item| item["id"] == id) else {
        return Ok(None);
    };
    fields.insert("id".to_string(), Value::String(id.to_string()));
    fields.insert("created_at".to_string(), slot["created_at"].clone());
    fields.insert("updated_at".to_string(), now());
    *slot = Value::Object(fields);
    Ok(Some(slot.clone()))
}

fn seed_exercise_templates() -> Vec<Value> {
    vec![
        json!({
            "id": "79D0BB3A",
            "title": "Bench Press (Barbell)",
            "type": "weight_reps",
            "primary_muscle_group": "chest",
            "secondary_muscle_groups": ["triceps", "shoulders"],
            "is_custom": false
        }),
        json!({
            "id": "D04AC939",
            "title": "Squat (Barbell)",
            "type": "weight_reps",
            "primary_muscle_group": "quadriceps",
            "secondary_muscle_groups": ["glutes", "hamstrings", "glutes"],
            "is_custom": false
        }),
        json!({
            "id": "1B2B1E7C",
            "title": "Pull Up",
            "type": "bodyweight_reps",
            "primary_muscle_group": "lats",
            "secondary_muscle_groups": ["biceps", "upper_back"],
            "is_custom": false
        }),
        json!({
            "id": "AC1BB830",
            "title": "Running",
            "type": "distance_duration",
            "primary_muscle_group": "cardio",
            "secondary_muscle_groups": [],
            "is_custom": false
        }),
    ]
}
