//! Domain model for the Hevy API.
//!
//! # Design
//! Every entity is an immutable value object. Inbound values are only built
//! through [`Entity::decode`], which checks the JSON shape with serde and then
//! the entity's own invariants. Outbound values are built by the caller and
//! serialized by the request builders; optional fields left as `None` are sent
//! as explicit `null`.
//!
//! Summaries are condensed, display-oriented projections that drop internal
//! and empty fields.

use std::collections::HashSet;

use chrono::{DateTime, TimeDelta, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::DecodeError;

/// Schema-validated decoding from untyped JSON.
pub trait Entity: DeserializeOwned {
    /// Name the service uses when it wraps a single entity in an envelope,
    /// e.g. `{"routine": {...}}`.
    const ENVELOPE_KEY: Option<&'static str> = None;

    fn validate(&self) -> Result<(), DecodeError> {
        Ok(())
    }

    fn decode(value: Value) -> Result<Self, DecodeError> {
        let entity: Self = serde_json::from_value(value)?;
        entity.validate()?;
        Ok(entity)
    }
}

fn ensure_unique_indices<I>(indices: I, owner: &str) -> Result<(), DecodeError>
where
    I: IntoIterator<Item = u32>,
{
    let mut seen = HashSet::new();
    for index in indices {
        if !seen.insert(index) {
            return Err(DecodeError::invariant(format!(
                "duplicate index {index} in {owner}"
            )));
        }
    }
    Ok(())
}

fn validate_exercises(exercises: &[Exercise], owner: &str) -> Result<(), DecodeError> {
    ensure_unique_indices(exercises.iter().map(|e| e.index), owner)?;
    exercises.iter().try_for_each(Exercise::validate)
}

/// Total number of workouts logged by the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutCount {
    pub workout_count: u64,
}

impl Entity for WorkoutCount {}

/// A single set inside an exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Set {
    pub index: u32,
    /// Set kind tag: `normal`, `warmup`, `dropset`, `failure`, ...
    #[serde(rename = "type")]
    pub set_type: String,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub distance_meters: Option<f64>,
    #[serde(default)]
    pub duration_seconds: Option<u32>,
    #[serde(default)]
    pub rpe: Option<f64>,
    #[serde(default)]
    pub custom_metric: Option<f64>,
}

impl Set {
    pub fn summary(&self) -> SetSummary {
        SetSummary {
            weight_kg: self.weight_kg,
            reps: self.reps,
            distance_meters: self.distance_meters,
            duration_seconds: self.duration_seconds,
            rpe: self.rpe,
            custom_metric: self.custom_metric,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpe: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_metric: Option<f64>,
}

/// An exercise performed (workout) or planned (routine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub index: u32,
    pub title: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub exercise_template_id: String,
    #[serde(default)]
    pub supersets_id: Option<i64>,
    pub sets: Vec<Set>,
}

impl Exercise {
    fn validate(&self) -> Result<(), DecodeError> {
        ensure_unique_indices(
            self.sets.iter().map(|s| s.index),
            &format!("sets of exercise {:?}", self.title),
        )
    }

    pub fn summary(&self) -> ExerciseSummary {
        ExerciseSummary {
            title: self.title.clone(),
            notes: self.notes.clone().filter(|n| !n.is_empty()),
            sets: self.sets.iter().map(Set::summary).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseSummary {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub sets: Vec<SetSummary>,
}

/// A logged workout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub exercises: Vec<Exercise>,
}

impl Workout {
    pub fn duration(&self) -> TimeDelta {
        self.end_time - self.start_time
    }

    pub fn summary(&self) -> WorkoutSummary {
        WorkoutSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            description: Some(self.description.clone()).filter(|d| !d.is_empty()),
            duration: format_duration(self.duration()),
            exercises: self.exercises.iter().map(Exercise::summary).collect(),
        }
    }
}

impl Entity for Workout {
    const ENVELOPE_KEY: Option<&'static str> = Some("workout");

    fn validate(&self) -> Result<(), DecodeError> {
        if self.end_time < self.start_time {
            return Err(DecodeError::invariant(format!(
                "workout {} ends before it starts",
                self.id
            )));
        }
        validate_exercises(&self.exercises, &format!("workout {}", self.id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutSummary {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub duration: String,
    pub exercises: Vec<ExerciseSummary>,
}

/// A saved workout template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub folder_id: Option<i64>,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub exercises: Vec<Exercise>,
}

impl Routine {
    pub fn summary(&self) -> RoutineSummary {
        RoutineSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            exercises: self.exercises.iter().map(Exercise::summary).collect(),
        }
    }
}

impl Entity for Routine {
    const ENVELOPE_KEY: Option<&'static str> = Some("routine");

    fn validate(&self) -> Result<(), DecodeError> {
        validate_exercises(&self.exercises, &format!("routine {}", self.id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutineSummary {
    pub id: String,
    pub title: String,
    pub exercises: Vec<ExerciseSummary>,
}

/// Catalogue entry describing an exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseTemplate {
    pub id: String,
    pub title: String,
    /// Equipment / measurement tag, e.g. `barbell`, `weight_reps`.
    #[serde(rename = "type")]
    pub template_type: String,
    pub primary_muscle_group: String,
    #[serde(deserialize_with = "dedup_in_order")]
    pub secondary_muscle_groups: Vec<String>,
    pub is_custom: bool,
}

impl Entity for ExerciseTemplate {
    const ENVELOPE_KEY: Option<&'static str> = Some("exercise_template");
}

fn dedup_in_order<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    let mut seen = HashSet::new();
    Ok(raw.into_iter().filter(|g| seen.insert(g.clone())).collect())
}

/// Render a duration as `H:MM:SS`, prefixed with the day count past 24 hours
/// and suffixed with microseconds when present.
pub fn format_duration(duration: TimeDelta) -> String {
    if duration < TimeDelta::zero() {
        return format!("-{}", format_duration(-duration));
    }
    let total = duration.num_seconds();
    let days = total / 86_400;
    let rest = total % 86_400;
    let (hours, minutes, seconds) = (rest / 3_600, rest % 3_600 / 60, rest % 60);
    let micros = duration.subsec_nanos() / 1_000;

    let mut out = match days {
        0 => String::new(),
        1 => "1 day, ".to_string(),
        n => format!("{n} days, "),
    };
    out.push_str(&format!("{hours}:{minutes:02}:{seconds:02}"));
    if micros > 0 {
        out.push_str(&format!(".{micros:06}"));
    }
    out
}
