//! Client configuration loaded from environment variables.
//!
//! The API token is deliberately not part of these structs: it is read
//! from the environment on every request (see [`crate::api`]).

use std::str::FromStr;
use std::time::Duration;

use plates_core::error::CoreError;
use plates_core::generation::DEFAULT_MODEL_VERSION;

use crate::backoff::RetryConfig;

pub const DEFAULT_API_URL: &str = "https://api.replicate.com/v1";
/// Environment variable holding the provider API token.
pub const API_TOKEN_VAR: &str = "REPLICATE_API_TOKEN";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 300;

/// Provider endpoint configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicateConfig {
    /// Base HTTP URL without trailing slash.
    pub api_url: String,
    /// Model version sent with every prediction.
    pub model_version: String,
    /// Name of the env var the token is read from at call time.
    pub token_var: String,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
}

impl Default for ReplicateConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model_version: DEFAULT_MODEL_VERSION.to_string(),
            token_var: API_TOKEN_VAR.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ReplicateConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                        |
    /// |---------------------------|--------------------------------|
    /// | `REPLICATE_API_URL`       | `https://api.replicate.com/v1` |
    /// | `REPLICATE_MODEL_VERSION` | line-art model version         |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                           |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let defaults = Self::default();

        let api_url = lookup("REPLICATE_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.api_url);

        let model_version = lookup("REPLICATE_MODEL_VERSION")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.model_version);

        let request_timeout = parse_var::<u64>(&lookup, "REQUEST_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        Ok(Self {
            api_url,
            model_version,
            token_var: defaults.token_var,
            request_timeout,
        })
    }
}

/// Poll loop configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    /// Fixed delay between consecutive status queries.
    pub interval: Duration,
    /// Upper bound on status queries. `None` leaves only the wall clock.
    pub max_attempts: Option<u32>,
    /// Wall-clock budget for the whole loop.
    pub timeout: Option<Duration>,
    /// Retry policy for failed status queries.
    pub transport_retry: RetryConfig,
    /// Ask the provider to cancel the job when the loop times out or is
    /// cancelled.
    pub cancel_remote_on_abort: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_attempts: None,
            timeout: Some(Duration::from_secs(DEFAULT_POLL_TIMEOUT_SECS)),
            transport_retry: RetryConfig::default(),
            cancel_remote_on_abort: true,
        }
    }
}

impl PollConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default |
    /// |--------------------------|---------|
    /// | `POLL_INTERVAL_MS`       | `1000`  |
    /// | `POLL_MAX_ATTEMPTS`      | unset   |
    /// | `POLL_TIMEOUT_SECS`      | `300`   |
    /// | `POLL_TRANSPORT_RETRIES` | `0`     |
    /// | `POLL_CANCEL_ON_ABORT`   | `true`  |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let defaults = Self::default();

        let interval = parse_var::<u64>(&lookup, "POLL_INTERVAL_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.interval);
        if interval.is_zero() {
            return Err(CoreError::Validation(
                "POLL_INTERVAL_MS must be greater than zero".into(),
            ));
        }

        let max_attempts = parse_var::<u32>(&lookup, "POLL_MAX_ATTEMPTS")?;
        if max_attempts == Some(0) {
            return Err(CoreError::Validation(
                "POLL_MAX_ATTEMPTS must be greater than zero".into(),
            ));
        }

        let timeout = match parse_var::<u64>(&lookup, "POLL_TIMEOUT_SECS")? {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.timeout,
        };

        if max_attempts.is_none() && timeout.is_none() {
            return Err(CoreError::Validation(
                "polling needs POLL_MAX_ATTEMPTS or a non-zero POLL_TIMEOUT_SECS".into(),
            ));
        }

        let transport_retry = RetryConfig {
            max_retries: parse_var::<u32>(&lookup, "POLL_TRANSPORT_RETRIES")?.unwrap_or(0),
            ..defaults.transport_retry
        };

        let cancel_remote_on_abort = parse_var::<bool>(&lookup, "POLL_CANCEL_ON_ABORT")?
            .unwrap_or(defaults.cancel_remote_on_abort);

        Ok(Self {
            interval,
            max_attempts,
            timeout,
            transport_retry,
            cancel_remote_on_abort,
        })
    }
}

/// Read and parse an optional variable. Blank values count as unset.
fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, CoreError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| CoreError::Validation(format!("{key} is invalid ('{raw}'): {e}"))),
        _ => Ok(None),
    }
}
