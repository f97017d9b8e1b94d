//! Blocking client for the Hevy workout-tracking API.
//!
//! # Overview
//! Request builders ([`request`]) describe each operation as plain data, a
//! [`Transport`] performs the HTTP round-trip, and response decoders
//! ([`response`]) turn the raw [`HttpResponse`] into typed entities from
//! [`model`]. [`HevyClient`] ties the three together and keeps a small
//! TTL + LRU cache of successful reads.
//!
//! # Design
//! - Nothing below the façade performs I/O; builders and decoders are
//!   deterministic and tested without a network.
//! - Decode failures never surface as errors. A response that does not match
//!   the expected schema is still returned, with its typed payload absent.
//! - Transport failures are reported in-band with status `0`.
//! - The only fallible step is construction: a client cannot exist without an
//!   API key.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod request;
pub mod response;
pub mod transport;

pub use cache::{CacheKey, Cacheable, ResponseCache, TtlCache, TypedKey};
pub use client::HevyClient;
pub use config::{CacheConfig, ClientConfig};
pub use error::{ClientError, ConfigError, DecodeError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use model::{
    format_duration, Entity, Exercise, ExerciseSummary, ExerciseTemplate, Routine,
    RoutineSummary, Set, SetSummary, Workout, WorkoutCount, WorkoutSummary,
};
pub use request::{ApiRequest, Pagination};
pub use response::{
    ApiResponse, EntityResponse, ExerciseTemplateResponse, ExerciseTemplatesResponse,
    PageResponse, PagedEntity, RoutineResponse, RoutinesResponse, WorkoutCountResponse,
    WorkoutResponse, WorkoutsResponse,
};
pub use transport::{Transport, UreqTransport};
