// Environment configuration for the extractor binary.
//
// Responsibilities
// - Read required and optional settings from the environment.
// - Fail before any I/O when a required value is missing or a value does not parse.

use crate::application::checkpoint::DEFAULT_CHECKPOINT_KEY;
use crate::core::retry::{RetryPolicies, RetryPolicy};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.rawg.io/api";
pub const DEFAULT_PAGE_SIZE: u32 = 40;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 10;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Gcs { bucket: String },
    Local { root: PathBuf },
}

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub page_size: u32,
    pub http_timeout: Duration,
    pub destination: Destination,
    pub checkpoint_key: String,
    pub retry: RetryPolicies,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .field("http_timeout", &self.http_timeout)
            .field("destination", &self.destination)
            .field("checkpoint_key", &self.checkpoint_key)
            .field("retry", &self.retry)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let api_key = required("RAWG_API_KEY")?;
        let bucket = required("GCS_BUCKET_NAME")?;
        let destination = match get("BRONZE_LOCAL_ROOT") {
            Some(root) => Destination::Local { root: root.into() },
            None => Destination::Gcs { bucket },
        };

        let max_retries = parse_or(&get, "EXTRACT_MAX_RETRIES", DEFAULT_MAX_RETRIES)?;
        let delay_secs = parse_or(&get, "EXTRACT_RETRY_DELAY_SECS", DEFAULT_RETRY_DELAY_SECS)?;
        let page_size = parse_or(&get, "RAWG_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(ConfigError::Invalid {
                name: "RAWG_PAGE_SIZE",
                value: "0".into(),
            });
        }
        let timeout_secs = parse_or(&get, "RAWG_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;

        Ok(Self {
            api_key,
            base_url: get("RAWG_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            page_size,
            http_timeout: Duration::from_secs(timeout_secs),
            destination,
            checkpoint_key: get("CHECKPOINT_KEY").unwrap_or_else(|| DEFAULT_CHECKPOINT_KEY.to_string()),
            retry: RetryPolicies::uniform(RetryPolicy::new(
                max_retries,
                Duration::from_secs(delay_secs),
            )),
        })
    }
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
