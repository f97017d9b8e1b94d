//! Print the account's workout count and the latest workout on the first
//! page, and save that workout as JSON.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use hevy_core::{ApiResponse, ClientConfig, HevyClient, Pagination};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hevy")]
#[command(about = "Show the latest Hevy workout and save it to disk")]
struct Args {
    /// API key; falls back to HEVY_API_KEY (and `.env`) when omitted
    #[arg(long)]
    api_key: Option<String>,

    /// Override the service origin
    #[arg(long)]
    base_url: Option<String>,

    /// Directory the workout JSON is written to
    #[arg(long, default_value = "data")]
    output_dir: PathBuf,

    /// Page size used when looking for the latest workout
    #[arg(long, default_value_t = 5)]
    page_size: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = ClientConfig::resolve(args.api_key.as_deref())?;
    if let Some(base_url) = args.base_url {
        config = config.base_url(base_url);
    }
    let client = HevyClient::from_config(config)?;

    let count = client.get_workout_count();
    let Some(count) = count.workout_count() else {
        bail!("could not find workouts (status {})", count.status_code());
    };
    println!("{}", without_nulls(serde_json::to_value(count)?));

    let page = client.get_workouts(Pagination::new(1, args.page_size));
    let Some(workout) = page.workouts().last() else {
        bail!("could not find workouts (status {})", page.status_code());
    };
    println!("{}", serde_json::to_string_pretty(&workout.summary())?);

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating {}", args.output_dir.display()))?;
    let path = args.output_dir.join(format!("{}.json", workout.id));
    let export = without_nulls(serde_json::to_value(workout)?);
    fs::write(&path, serde_json::to_string_pretty(&export)?)
        .with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "saved workout");

    Ok(())
}

/// Drop object fields that are `null`, at any depth.
fn without_nulls(value: Value) -> Value {
    match value {
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, without_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(without_nulls).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn export_drops_unset_fields() {
        let workout = json!({
            "id": "w1",
            "exercises": [{
                "notes": null,
                "sets": [{"index": 0, "weight_kg": 100.0, "rpe": null}]
            }]
        });
        assert_eq!(
            without_nulls(workout),
            json!({
                "id": "w1",
                "exercises": [{"sets": [{"index": 0, "weight_kg": 100.0}]}]
            })
        );
    }

    #[test]
    fn export_keeps_nulls_inside_arrays() {
        assert_eq!(without_nulls(json!([null, {"a": null}])), json!([null, {}]));
    }
}
