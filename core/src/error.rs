//! Error types for the Hevy client.
//!
//! # Design
//! Only configuration problems and payload serialization are surfaced as
//! `Err`. Transport and service failures travel inside the response value
//! (status `0` or a non-2xx status), and `DecodeError` is caught at the
//! decoder boundary, where it downgrades the typed payload to "absent".

use thiserror::Error;

/// Fatal construction-time errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither an explicit key nor `HEVY_API_KEY` was available.
    #[error("api-key must be provided either directly or via configuration")]
    MissingApiKey,

    /// An environment override could not be parsed.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Errors returned by constructors and request builders.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The request payload could not be turned into JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure to map a JSON body onto a typed entity.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Required field missing or of the wrong type.
    #[error("unexpected shape: {0}")]
    Shape(#[from] serde_json::Error),

    /// Well-formed JSON that breaks an entity invariant.
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// Nothing to decode.
    #[error("empty body")]
    EmptyBody,
}

impl DecodeError {
    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        DecodeError::Invariant(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_message_names_both_sources() {
        let msg = ConfigError::MissingApiKey.to_string();
        assert!(msg.contains("directly"));
        assert!(msg.contains("configuration"));
    }

    #[test]
    fn config_error_converts_into_client_error() {
        let err: ClientError = ConfigError::MissingApiKey.into();
        assert!(matches!(err, ClientError::Config(ConfigError::MissingApiKey)));
    }

    #[test]
    fn shape_error_wraps_serde() {
        let serde_err = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let err: DecodeError = serde_err.into();
        assert!(err.to_string().starts_with("unexpected shape"));
    }
}
