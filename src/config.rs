//! Error translation settings.
//!
//! Two knobs, read once when the middleware is built:
//!
//! | Key | Env var | Type | Default |
//! |---|---|---|---|
//! | `error.reporting` | `ERROR_REPORTING` | non-negative integer | `1` |
//! | `error.display` | `ERROR_DISPLAY` | boolean | `false` |
//!
//! `error.reporting` is a logging verbosity for intercepted failures:
//! `0` logs nothing, `1` logs internal failures, `2` and above also logs
//! route misses. `error.display` decides whether traces reach the client.
//! Leave it off in production.

use std::env;

use thiserror::Error;

use crate::failure::Classification;

pub const REPORTING_KEY: &str = "error.reporting";
pub const DISPLAY_KEY: &str = "error.display";

/// Configuration for [`ErrorTranslation`](crate::middleware::ErrorTranslation).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ErrorConfig {
    pub reporting: u32,
    pub display: bool,
}

impl Default for ErrorConfig {
    fn default() -> Self {
        Self { reporting: 1, display: false }
    }
}

impl ErrorConfig {
    pub fn new(reporting: u32, display: bool) -> Self {
        Self { reporting, display }
    }

    /// Reads `error.reporting` and `error.display` through `lookup`.
    ///
    /// Missing keys keep their defaults.
    ///
    /// ```rust
    /// use std::collections::HashMap;
    /// use backstop::ErrorConfig;
    ///
    /// let settings = HashMap::from([("error.display", "on")]);
    /// let config =
    ///     ErrorConfig::from_lookup(|key| settings.get(key).map(|v| v.to_string())).unwrap();
    ///
    /// assert!(config.display);
    /// assert_eq!(config.reporting, 1);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(REPORTING_KEY) {
            config.reporting = value.trim().parse::<u32>().map_err(|_| {
                ConfigError::InvalidReporting { key: REPORTING_KEY, value: value.clone() }
            })?;
        }

        if let Some(value) = lookup(DISPLAY_KEY) {
            config.display = parse_bool(&value).ok_or_else(|| ConfigError::InvalidDisplay {
                key: DISPLAY_KEY,
                value: value.clone(),
            })?;
        }

        Ok(config)
    }

    /// Reads `ERROR_REPORTING` and `ERROR_DISPLAY` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(env_name(key)).ok())
    }

    /// Whether a failure of this class is logged.
    pub fn reports(&self, class: Classification) -> bool {
        match class {
            Classification::Internal => self.reporting >= 1,
            Classification::NotFound => self.reporting >= 2,
        }
    }
}

/// A configuration value that could not be parsed.
#[derive(Debug, Eq, Error, PartialEq)]
pub enum ConfigError {
    #[error("`{key}` must be a non-negative integer, got `{value}`")]
    InvalidReporting { key: &'static str, value: String },

    #[error("`{key}` must be a boolean, got `{value}`")]
    InvalidDisplay { key: &'static str, value: String },
}

/// `error.reporting` → `ERROR_REPORTING`
fn env_name(key: &str) -> String {
    key.replace('.', "_").to_ascii_uppercase()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
