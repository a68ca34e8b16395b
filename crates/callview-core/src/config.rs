//! Call view session configuration.
//!
//! Configuration is loaded from environment variables with defaults suited to
//! a phone-sized grid (four speaker tiles, four tiles per page).

use common::config::ConfigError;
use std::collections::HashMap;
use std::env;
use std::str::FromStr;

/// Default number of speaker tiles the layout can show.
pub const DEFAULT_SPEAKER_CAPACITY: usize = 4;

/// Default number of tiles per grid page.
pub const DEFAULT_PAGE_SIZE: usize = 4;

/// What a `PeerJoined` event does to the tile registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaceholderPolicy {
    /// Wait for the first track event before materializing a tile. Avoids an
    /// empty tile that flickers while the SDK is still publishing tracks.
    #[default]
    Lazy,
    /// Materialize an absent-track placeholder tile as soon as a peer joins.
    Eager,
}

impl FromStr for PlaceholderPolicy {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "lazy" => Ok(PlaceholderPolicy::Lazy),
            "eager" => Ok(PlaceholderPolicy::Eager),
            _ => Err(ConfigError::InvalidValue(format!(
                "CALLVIEW_PLACEHOLDER_POLICY={raw}"
            ))),
        }
    }
}

/// Per-session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Maximum number of peers in the active-speaker window.
    pub speaker_capacity: usize,
    /// Number of camera tiles per grid page.
    pub page_size: usize,
    /// PeerJoined behavior, fixed for the lifetime of the session.
    pub placeholder_policy: PlaceholderPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            speaker_capacity: DEFAULT_SPEAKER_CAPACITY,
            page_size: DEFAULT_PAGE_SIZE,
            placeholder_policy: PlaceholderPolicy::default(),
        }
    }
}

impl SessionConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for unparseable or zero sizes and
    /// unknown placeholder policies.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    ///
    /// # Errors
    ///
    /// See [`SessionConfig::from_env`].
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let speaker_capacity = parse_size(
            vars,
            "CALLVIEW_SPEAKER_CAPACITY",
            DEFAULT_SPEAKER_CAPACITY,
        )?;

        let page_size = parse_size(vars, "CALLVIEW_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;

        let placeholder_policy = vars
            .get("CALLVIEW_PLACEHOLDER_POLICY")
            .map(|raw| raw.parse())
            .transpose()?
            .unwrap_or_default();

        Ok(SessionConfig {
            speaker_capacity,
            page_size,
            placeholder_policy,
        })
    }
}

fn parse_size(
    vars: &HashMap<String, String>,
    key: &str,
    default: usize,
) -> Result<usize, ConfigError> {
    match vars.get(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(ConfigError::InvalidValue(format!("{key}={raw}"))),
        },
    }
}
