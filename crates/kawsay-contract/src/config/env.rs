// crates/kawsay-contract/src/config/env.rs
// ============================================================================
// Module: Harness Environment
// Description: Environment-backed configuration for the contract harness.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std, thiserror, url
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid or empty values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::num::NonZeroUsize;
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Predictor base URL used when no override is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for harness configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessEnv {
    /// Predictor base URL override.
    BaseUrl,
    /// Event log target (`stderr`, `off`, or a file path).
    EventLog,
    /// Worker count for parallel suite runs (positive integer).
    Parallelism,
    /// Directory for suite report artifacts.
    RunRoot,
}

impl HarnessEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BaseUrl => "BASE_URL",
            Self::EventLog => "KAWSAY_EVENT_LOG",
            Self::Parallelism => "KAWSAY_PARALLELISM",
            Self::RunRoot => "KAWSAY_RUN_ROOT",
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration load errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Variable is set but not valid UTF-8.
    #[error("{0} must be valid UTF-8")]
    NotUtf8(&'static str),
    /// Variable is set but empty or whitespace.
    #[error("{0} must not be empty")]
    Empty(&'static str),
    /// Variable failed validation.
    #[error("{name} {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Validation failure.
        reason: String,
    },
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Destination for structured harness events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventLogTarget {
    /// Events are discarded.
    Off,
    /// Events are written as JSON lines to stderr.
    Stderr,
    /// Events are appended as JSON lines to a file.
    File(PathBuf),
}

impl EventLogTarget {
    /// Parses a target literal: `off`, `stderr`, or a file path.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("off") {
            Self::Off
        } else if trimmed.eq_ignore_ascii_case("stderr") {
            Self::Stderr
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }
}

/// Typed harness configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Predictor base URL.
    pub base_url: Url,
    /// Event log target when explicitly configured.
    pub event_log: Option<EventLogTarget>,
    /// Worker count for parallel runs; `None` runs serially.
    pub parallelism: Option<NonZeroUsize>,
    /// Directory for suite report artifacts.
    pub run_root: Option<PathBuf>,
}

impl HarnessConfig {
    /// Returns the configuration used when no environment override is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if [`DEFAULT_BASE_URL`] fails to parse.
    pub fn defaults() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: default_base_url()?,
            event_log: None,
            parallelism: None,
            run_root: None,
        })
    }

    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value is not valid UTF-8, is empty, or
    /// fails validation (for example, a non-http base URL or zero workers).
    pub fn load() -> Result<Self, ConfigError> {
        let base_url = read_env_nonempty(HarnessEnv::BaseUrl.as_str())?
            .map(|value| parse_base_url(HarnessEnv::BaseUrl.as_str(), &value))
            .transpose()?;
        let base_url = match base_url {
            Some(url) => url,
            None => default_base_url()?,
        };
        let event_log = read_env_nonempty(HarnessEnv::EventLog.as_str())?
            .map(|value| EventLogTarget::parse(&value));
        let parallelism = read_env_nonempty(HarnessEnv::Parallelism.as_str())?
            .map(|value| parse_workers(HarnessEnv::Parallelism.as_str(), &value))
            .transpose()?;
        let run_root = read_env_nonempty(HarnessEnv::RunRoot.as_str())?.map(PathBuf::from);
        Ok(Self {
            base_url,
            event_log,
            parallelism,
            run_root,
        })
    }

    /// Replaces the base URL after validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the URL is not http or https.
    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(HarnessEnv::BaseUrl.as_str(), raw)?;
        Ok(self)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the parsed default base URL.
fn default_base_url() -> Result<Url, ConfigError> {
    parse_base_url(HarnessEnv::BaseUrl.as_str(), DEFAULT_BASE_URL)
}

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &'static str) -> Result<Option<String>, ConfigError> {
    std::env::var_os(name)
        .map_or(Ok(None), |raw| raw.into_string().map(Some).map_err(|_| ConfigError::NotUtf8(name)))
}

/// Reads an environment variable and rejects empty values.
fn read_env_nonempty(name: &'static str) -> Result<Option<String>, ConfigError> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty(name)),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses an http(s) base URL.
///
/// # Errors
///
/// Returns an error when the value does not parse or uses another scheme.
pub fn parse_base_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|err| ConfigError::Invalid {
        name,
        reason: format!("must be an absolute URL: {err}"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Invalid {
            name,
            reason: format!("must use http or https, got {other}"),
        }),
    }
}

/// Parses a positive worker count.
fn parse_workers(name: &'static str, raw: &str) -> Result<NonZeroUsize, ConfigError> {
    let count: usize = raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        reason: "must be a positive integer".to_string(),
    })?;
    NonZeroUsize::new(count).ok_or_else(|| ConfigError::Invalid {
        name,
        reason: "must be greater than zero".to_string(),
    })
}
