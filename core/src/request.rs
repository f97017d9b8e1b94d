//! Request builders, one type per API operation.
//!
//! # Design
//! A builder only knows its method, its endpoint (path plus query, relative
//! to the service origin) and, for writes, its JSON body. Resolving the
//! endpoint against a base URL and attaching credentials is done by
//! [`HevyClient`](crate::HevyClient), which keeps builders free of
//! configuration and easy to test in isolation.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest};
use crate::model::{Routine, Workout};

const WORKOUTS: &str = "/v1/workouts";
const ROUTINES: &str = "/v1/routines";
const EXERCISE_TEMPLATES: &str = "/v1/exercise_templates";

/// Page selection for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Pagination {
    pub const fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    fn query(&self) -> String {
        format!("page={}&pageSize={}", self.page, self.page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, 5)
    }
}

impl fmt::Display for Pagination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.page, self.page_size)
    }
}

/// A single API operation, described independently of any transport.
pub trait ApiRequest {
    fn method(&self) -> HttpMethod;

    /// Path and query relative to the service origin.
    fn endpoint(&self) -> String;

    fn body(&self) -> Result<Option<Value>, ClientError> {
        Ok(None)
    }

    /// Resolve against `base_url` and attach `headers`.
    fn to_http(
        &self,
        base_url: &str,
        headers: &[(String, String)],
    ) -> Result<HttpRequest, ClientError> {
        Ok(HttpRequest {
            method: self.method(),
            url: format!("{}{}", base_url.trim_end_matches('/'), self.endpoint()),
            headers: headers.to_vec(),
            body: self.body()?,
        })
    }
}

fn entity_path(collection: &str, id: &str) -> String {
    format!("{collection}/{}", urlencoding::encode(id))
}

fn page_path(collection: &str, pagination: &Pagination) -> String {
    format!("{collection}?{}", pagination.query())
}

fn json_body<T: Serialize>(payload: &T) -> Result<Option<Value>, ClientError> {
    Ok(Some(serde_json::to_value(payload)?))
}

/// `GET /v1/workouts/count`
#[derive(Debug, Clone, Copy, Default)]
pub struct GetWorkoutCount;

impl ApiRequest for GetWorkoutCount {
    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn endpoint(&self) -> String {
        format!("{WORKOUTS}/count")
    }
}

/// `GET /v1/workouts?page={n}&pageSize={s}`
#[derive(Debug, Clone, Copy, Default)]
pub struct GetWorkouts {
    pub pagination: Pagination,
}

impl ApiRequest for GetWorkouts {
    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn endpoint(&self) -> String {
        page_path(WORKOUTS, &self.pagination)
    }
}

/// `GET /v1/workouts/{id}`
#[derive(Debug, Clone)]
pub struct GetWorkout<'a> {
    pub id: &'a str,
}

impl ApiRequest for GetWorkout<'_> {
    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn endpoint(&self) -> String {
        entity_path(WORKOUTS, self.id)
    }
}

/// `POST /v1/workouts`
#[derive(Debug, Clone)]
pub struct CreateWorkout<'a> {
    pub workout: &'a Workout,
}

impl ApiRequest for CreateWorkout<'_> {
    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn endpoint(&self) -> String {
        WORKOUTS.to_string()
    }

    fn body(&self) -> Result<Option<Value>, ClientError> {
        json_body(self.workout)
    }
}

/// `PUT /v1/workouts/{id}`
#[derive(Debug, Clone)]
pub struct UpdateWorkout<'a> {
    pub id: &'a str,
    pub workout: &'a Workout,
}

impl ApiRequest for UpdateWorkout<'_> {
    fn method(&self) -> HttpMethod {
        HttpMethod::Put
    }

    fn endpoint(&self) -> String {
        entity_path(WORKOUTS, self.id)
    }

    fn body(&self) -> Result<Option<Value>, ClientError> {
        json_body(self.workout)
    }
}

/// `GET /v1/routines?page={n}&pageSize={s}`
#[derive(Debug, Clone, Copy, Default)]
pub struct GetRoutines {
    pub pagination: Pagination,
}

impl ApiRequest for GetRoutines {
    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn endpoint(&self) -> String {
        page_path(ROUTINES, &self.pagination)
    }
}

/// `GET /v1/routines/{id}`
#[derive(Debug, Clone)]
pub struct GetRoutine<'a> {
    pub id: &'a str,
}

impl ApiRequest for GetRoutine<'_> {
    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn endpoint(&self) -> String {
        entity_path(ROUTINES, self.id)
    }
}

/// `POST /v1/routines`
#[derive(Debug, Clone)]
pub struct CreateRoutine<'a> {
    pub routine: &'a Routine,
}

impl ApiRequest for CreateRoutine<'_> {
    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn endpoint(&self) -> String {
        ROUTINES.to_string()
    }

    fn body(&self) -> Result<Option<Value>, ClientError> {
        json_body(self.routine)
    }
}

/// `PUT /v1/routines/{id}`
#[derive(Debug, Clone)]
pub struct UpdateRoutine<'a> {
    pub id: &'a str,
    pub routine: &'a Routine,
}

impl ApiRequest for UpdateRoutine<'_> {
    fn method(&self) -> HttpMethod {
        HttpMethod::Put
    }

    fn endpoint(&self) -> String {
        entity_path(ROUTINES, self.id)
    }

    fn body(&self) -> Result<Option<Value>, ClientError> {
        json_body(self.routine)
    }
}

/// `GET /v1/exercise_templates?page={n}&pageSize={s}`
#[derive(Debug, Clone, Copy, Default)]
pub struct GetExerciseTemplates {
    pub pagination: Pagination,
}

impl ApiRequest for GetExerciseTemplates {
    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn endpoint(&self) -> String {
        page_path(EXERCISE_TEMPLATES, &self.pagination)
    }
}

/// `GET /v1/exercise_templates/{id}`
#[derive(Debug, Clone)]
pub struct GetExerciseTemplate<'a> {
    pub id: &'a str,
}

impl ApiRequest for GetExerciseTemplate<'_> {
    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn endpoint(&self) -> String {
        entity_path(EXERCISE_TEMPLATES, self.id)
    }
}
