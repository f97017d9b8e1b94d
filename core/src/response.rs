//! Response decoders.
//!
//! # Design
//! A decoder owns the raw [`HttpResponse`] and, next to it, the typed payload
//! decoded from it. Decoding is attempted only for 2xx responses with a
//! non-empty body, and any [`DecodeError`] is logged and turned into an absent
//! payload: `None` for single entities, an empty list for pages. Callers always
//! get an inspectable response and only null-check the payload.
//!
//! The per-operation names (`WorkoutResponse`, `RoutinesResponse`, ...) are
//! aliases of two generic shapes, [`EntityResponse`] and [`PageResponse`].

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

use crate::error::DecodeError;
use crate::http::HttpResponse;
use crate::model::{Entity, ExerciseTemplate, Routine, Workout, WorkoutCount};

/// Status and raw data shared by every decoded response.
pub trait ApiResponse {
    fn from_http(response: HttpResponse) -> Self;

    fn http(&self) -> &HttpResponse;

    fn status_code(&self) -> u16 {
        self.http().status
    }

    fn headers(&self) -> &BTreeMap<String, String> {
        &self.http().headers
    }

    /// The raw body: JSON, or a string holding the text of a non-JSON body.
    fn data(&self) -> &Value {
        &self.http().data
    }

    fn is_success(&self) -> bool {
        self.http().is_success()
    }

    /// Non-2xx status, including the transport failure status `0`.
    fn is_error(&self) -> bool {
        !self.is_success()
    }
}

/// Entities that come back from a list endpoint under a named array.
pub trait PagedEntity: Entity {
    const LIST_KEY: &'static str;
}

impl PagedEntity for Workout {
    const LIST_KEY: &'static str = "workouts";
}

impl PagedEntity for Routine {
    const LIST_KEY: &'static str = "routines";
}

impl PagedEntity for ExerciseTemplate {
    const LIST_KEY: &'static str = "exercise_templates";
}

fn has_payload(data: &Value) -> bool {
    match data {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// Strip a `{"<key>": {...}}` or `{"<key>": [{...}]}` envelope.
fn unwrap_envelope<E: Entity>(data: &Value) -> &Value {
    let Some(key) = E::ENVELOPE_KEY else {
        return data;
    };
    let inner = match data.as_object() {
        Some(fields) if fields.len() == 1 => fields.get(key),
        _ => None,
    };
    match inner {
        Some(Value::Array(items)) if items.len() == 1 && items[0].is_object() => &items[0],
        Some(value @ Value::Object(_)) => value,
        _ => data,
    }
}

fn decode_entity<E: Entity>(response: &HttpResponse) -> Result<E, DecodeError> {
    if !has_payload(&response.data) {
        return Err(DecodeError::EmptyBody);
    }
    E::decode(unwrap_envelope::<E>(&response.data).clone())
}

fn decode_count(data: &Value, key: &str) -> Option<u32> {
    data.get(key)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
}

fn decode_items<E: PagedEntity>(data: &Value) -> Result<Vec<E>, DecodeError> {
    let items = data
        .get(E::LIST_KEY)
        .and_then(Value::as_array)
        .ok_or_else(|| DecodeError::invariant(format!("missing `{}` array", E::LIST_KEY)))?;
    items.iter().cloned().map(E::decode).collect()
}

fn log_decode_failure<E>(response: &HttpResponse, error: &DecodeError) {
    warn!(
        entity = std::any::type_name::<E>(),
        status = response.status,
        %error,
        "failed to decode response body"
    );
}

/// Response carrying at most one typed entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityResponse<E> {
    http: HttpResponse,
    entity: Option<E>,
}

impl<E: Entity> EntityResponse<E> {
    pub fn entity(&self) -> Option<&E> {
        self.entity.as_ref()
    }

    pub fn into_entity(self) -> Option<E> {
        self.entity
    }
}

impl<E: Entity> ApiResponse for EntityResponse<E> {
    fn from_http(http: HttpResponse) -> Self {
        let entity = if http.is_success() && has_payload(&http.data) {
            decode_entity::<E>(&http)
                .inspect_err(|error| log_decode_failure::<E>(&http, error))
                .ok()
        } else {
            None
        };
        Self { http, entity }
    }

    fn http(&self) -> &HttpResponse {
        &self.http
    }
}

/// One page of a list endpoint.
///
/// `page` and `page_count` are read independently of the item list; a single
/// malformed item empties the whole list.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResponse<E> {
    http: HttpResponse,
    page: Option<u32>,
    page_count: Option<u32>,
    items: Vec<E>,
}

impl<E: PagedEntity> PageResponse<E> {
    pub fn page(&self) -> Option<u32> {
        self.page
    }

    pub fn page_count(&self) -> Option<u32> {
        self.page_count
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn into_items(self) -> Vec<E> {
        self.items
    }
}

impl<E: PagedEntity> ApiResponse for PageResponse<E> {
    fn from_http(http: HttpResponse) -> Self {
        let mut page = PageResponse {
            page: None,
            page_count: None,
            items: Vec::new(),
            http,
        };
        if !page.http.is_success() || !has_payload(&page.http.data) {
            return page;
        }
        page.page = decode_count(&page.http.data, "page");
        page.page_count = decode_count(&page.http.data, "page_count");
        match decode_items::<E>(&page.http.data) {
            Ok(items) => page.items = items,
            Err(error) => log_decode_failure::<E>(&page.http, &error),
        }
        page
    }

    fn http(&self) -> &HttpResponse {
        &self.http
    }
}

pub type WorkoutCountResponse = EntityResponse<WorkoutCount>;
pub type WorkoutResponse = EntityResponse<Workout>;
pub type RoutineResponse = EntityResponse<Routine>;
pub type ExerciseTemplateResponse = EntityResponse<ExerciseTemplate>;
pub type WorkoutsResponse = PageResponse<Workout>;
pub type RoutinesResponse = PageResponse<Routine>;
pub type ExerciseTemplatesResponse = PageResponse<ExerciseTemplate>;

impl WorkoutCountResponse {
    pub fn workout_count(&self) -> Option<&WorkoutCount> {
        self.entity()
    }
}

impl WorkoutResponse {
    pub fn workout(&self) -> Option<&Workout> {
        self.entity()
    }
}

impl RoutineResponse {
    pub fn routine(&self) -> Option<&Routine> {
        self.entity()
    }
}

impl ExerciseTemplateResponse {
    pub fn exercise_template(&self) -> Option<&ExerciseTemplate> {
        self.entity()
    }
}

impl WorkoutsResponse {
    pub fn workouts(&self) -> &[Workout] {
        self.items()
    }
}

impl RoutinesResponse {
    pub fn routines(&self) -> &[Routine] {
        self.items()
    }
}

impl ExerciseTemplatesResponse {
    pub fn exercise_templates(&self) -> &[ExerciseTemplate] {
        self.items()
    }
}
