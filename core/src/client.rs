//! Typed façade over the Hevy REST API.
//!
//! # Design
//! Every read follows the same path: compute the [`TypedKey`], return the
//! cached `Arc` on a hit, otherwise build the request, execute it through the
//! [`Transport`], decode it, and cache it if the status was 2xx. Writes skip
//! the cache in both directions.
//!
//! The cache sits behind a mutex that is never held across a transport call.
//! Two threads missing on the same key at the same time will both fetch; the
//! second store simply replaces the first.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use secrecy::ExposeSecret;
use tracing::{debug, warn};

use crate::cache::{CacheKey, Cacheable, ResponseCache, TypedKey};
use crate::config::ClientConfig;
use crate::error::ConfigError;
use crate::http::HttpResponse;
use crate::model::{Routine, Workout};
use crate::request::{
    ApiRequest, CreateRoutine, CreateWorkout, GetExerciseTemplate, GetExerciseTemplates,
    GetRoutine, GetRoutines, GetWorkout, GetWorkoutCount, GetWorkouts, Pagination,
    UpdateRoutine, UpdateWorkout,
};
use crate::response::{
    ApiResponse, ExerciseTemplateResponse, ExerciseTemplatesResponse, RoutineResponse,
    RoutinesResponse, WorkoutCountResponse, WorkoutResponse, WorkoutsResponse,
};
use crate::transport::{Transport, UreqTransport};

const USER_AGENT: &str = concat!("hevy-client/", env!("CARGO_PKG_VERSION"));

/// Client for the Hevy API with a private, time-bounded read cache.
pub struct HevyClient<T = UreqTransport> {
    base_url: String,
    headers: Vec<(String, String)>,
    transport: T,
    cache: Mutex<ResponseCache>,
}

impl HevyClient<UreqTransport> {
    /// Build a client from `api_key`, or from `.env` / `HEVY_API_KEY` when the
    /// key is absent or empty.
    pub fn new(api_key: Option<&str>) -> Result<Self, ConfigError> {
        Self::from_config(ClientConfig::resolve(api_key)?)
    }

    pub fn from_config(config: ClientConfig) -> Result<Self, ConfigError> {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> HevyClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, ConfigError> {
        let cache = ResponseCache::new(&config.cache);
        Self::with_cache(config, transport, cache)
    }

    /// Build a client around a caller-supplied cache. `config.cache` is ignored.
    pub fn with_cache(
        config: ClientConfig,
        transport: T,
        cache: ResponseCache,
    ) -> Result<Self, ConfigError> {
        let api_key = config.require_api_key()?.expose_secret().to_string();
        let headers = vec![
            ("user-agent".to_string(), USER_AGENT.to_string()),
            ("accept".to_string(), "application/json".to_string()),
            ("content-type".to_string(), "application/json".to_string()),
            ("api-key".to_string(), api_key),
        ];
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            headers,
            transport,
            cache: Mutex::new(cache),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn get_workout_count(&self) -> Arc<WorkoutCountResponse> {
        self.cached(WorkoutCountResponse::cache_key(&()), &GetWorkoutCount)
    }

    pub fn get_workouts(&self, pagination: Pagination) -> Arc<WorkoutsResponse> {
        self.cached(WorkoutsResponse::cache_key(&pagination), &GetWorkouts { pagination })
    }

    pub fn get_workout(&self, id: &str) -> Arc<WorkoutResponse> {
        self.cached(WorkoutResponse::cache_key(id), &GetWorkout { id })
    }

    pub fn create_workout(&self, workout: &Workout) -> WorkoutResponse {
        self.send(&CreateWorkout { workout })
    }

    pub fn update_workout(&self, id: &str, workout: &Workout) -> WorkoutResponse {
        self.send(&UpdateWorkout { id, workout })
    }

    pub fn get_routines(&self, pagination: Pagination) -> Arc<RoutinesResponse> {
        self.cached(RoutinesResponse::cache_key(&pagination), &GetRoutines { pagination })
    }

    pub fn get_routine(&self, id: &str) -> Arc<RoutineResponse> {
        self.cached(RoutineResponse::cache_key(id), &GetRoutine { id })
    }

    pub fn create_routine(&self, routine: &Routine) -> RoutineResponse {
        self.send(&CreateRoutine { routine })
    }

    pub fn update_routine(&self, id: &str, routine: &Routine) -> RoutineResponse {
        self.send(&UpdateRoutine { id, routine })
    }

    pub fn get_exercise_templates(
        &self,
        pagination: Pagination,
    ) -> Arc<ExerciseTemplatesResponse> {
        self.cached(
            ExerciseTemplatesResponse::cache_key(&pagination),
            &GetExerciseTemplates { pagination },
        )
    }

    pub fn get_exercise_template(&self, id: &str) -> Arc<ExerciseTemplateResponse> {
        self.cached(
            ExerciseTemplateResponse::cache_key(id),
            &GetExerciseTemplate { id },
        )
    }

    /// Drop one cached read. Returns whether an entry was present.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.lock_cache().invalidate(key)
    }

    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    pub fn cached_entries(&self) -> usize {
        self.lock_cache().len()
    }

    fn cached<R, Q>(&self, key: TypedKey<R>, request: &Q) -> Arc<R>
    where
        R: Cacheable,
        Q: ApiRequest + ?Sized,
    {
        let hit = self.lock_cache().get::<R>(&key);
        if let Some(response) = hit {
            debug!(%key, "cache hit");
            return response;
        }
        debug!(%key, "cache miss");

        let response = Arc::new(self.send::<R, Q>(request));
        if self.lock_cache().insert(key.clone(), Arc::clone(&response)) {
            debug!(%key, "cached response");
        } else {
            debug!(%key, status = response.status_code(), "not caching error response");
        }
        response
    }

    fn send<R, Q>(&self, request: &Q) -> R
    where
        R: ApiResponse,
        Q: ApiRequest + ?Sized,
    {
        let http = match request.to_http(&self.base_url, &self.headers) {
            Ok(http) => self.transport.execute(&http),
            Err(error) => {
                warn!(%error, endpoint = %request.endpoint(), "could not build request");
                HttpResponse::transport_failure(error)
            }
        };
        R::from_http(http)
    }

    fn lock_cache(&self) -> MutexGuard<'_, ResponseCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> fmt::Debug for HevyClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HevyClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
