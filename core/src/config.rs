//! Client configuration.
//!
//! An explicitly supplied API key always wins and bypasses the environment.
//! Otherwise a `.env` file is loaded (without overriding variables already
//! set) and the following variables are read:
//!
//! - `HEVY_API_KEY` (required)
//! - `HEVY_BASE_URL`
//! - `HEVY_CACHE_TTL_SECS`
//! - `HEVY_CACHE_MAX_ENTRIES`
//!
//! Empty values count as unset.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.hevyapp.com";
pub const API_KEY_ENV: &str = "HEVY_API_KEY";
pub const BASE_URL_ENV: &str = "HEVY_BASE_URL";
pub const CACHE_TTL_ENV: &str = "HEVY_CACHE_TTL_SECS";
pub const CACHE_MAX_ENTRIES_ENV: &str = "HEVY_CACHE_MAX_ENTRIES";

/// Sizing of the per-client response cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub ttl: Duration,
    /// Zero disables caching.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_entries: 1_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub cache: CacheConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            cache: CacheConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(SecretString::from(api_key.into())),
            ..Default::default()
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Read configuration from `.env` and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env file");
        }

        let mut config = Self::default();
        if let Some(api_key) = non_empty_var(API_KEY_ENV) {
            config.api_key = Some(SecretString::from(api_key));
        }
        if let Some(base_url) = non_empty_var(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        if let Some(secs) = parse_var::<u64>(CACHE_TTL_ENV)? {
            config.cache.ttl = Duration::from_secs(secs);
        }
        if let Some(max_entries) = parse_var::<usize>(CACHE_MAX_ENTRIES_ENV)? {
            config.cache.max_entries = max_entries;
        }
        Ok(config)
    }

    /// Use `api_key` when it is non-empty, the environment otherwise, and
    /// fail when neither yields a key.
    pub fn resolve(api_key: Option<&str>) -> Result<Self, ConfigError> {
        let config = match api_key.filter(|key| !key.is_empty()) {
            Some(key) => Self::with_api_key(key),
            None => Self::from_env()?,
        };
        config.require_api_key()?;
        Ok(config)
    }

    pub fn require_api_key(&self) -> Result<&SecretString, ConfigError> {
        self.api_key.as_ref().ok_or(ConfigError::MissingApiKey)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

fn parse_var<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    non_empty_var(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key, value })
        })
        .transpose()
}
