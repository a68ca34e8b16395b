//! Common configuration types for callview components.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Default log filter when neither `RUST_LOG` nor `CALLVIEW_LOG_LEVEL` is set.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Observability configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Enable JSON-formatted logs
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            json_logs: false,
        }
    }
}

impl ObservabilityConfig {
    /// Load observability settings from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `CALLVIEW_JSON_LOGS` is not a boolean.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&std::env::vars().collect())
    }

    /// Load observability settings from a `HashMap` of environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `CALLVIEW_JSON_LOGS` is not a boolean.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let log_level = vars
            .get("CALLVIEW_LOG_LEVEL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        let json_logs = match vars.get("CALLVIEW_JSON_LOGS") {
            Some(raw) => parse_bool(raw).ok_or_else(|| {
                ConfigError::InvalidValue(format!("CALLVIEW_JSON_LOGS={raw}"))
            })?,
            None => false,
        };

        Ok(Self {
            log_level,
            json_logs,
        })
    }
}

/// Parse the boolean spellings accepted in environment variables.
#[must_use]
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
