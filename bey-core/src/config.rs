//! Runtime Configuration
//!
//! A cell needs to know one thing about its environment: whether values
//! handed out by `get()` should be frozen against in-place mutation.
//!
//! # Lifecycle
//!
//! The process-wide configuration is set at most once, with [`init`], before
//! any cell is created. The first call to [`current`] (which every
//! [`StateCell::new`](crate::store::StateCell::new) performs) locks in
//! whatever is set at that point, falling back to [`Config::default`].
//! After that the configuration is immutable and `init` fails.
//!
//! Cells that need a specific mode regardless of the process setting take a
//! [`Config`] directly via
//! [`StateCell::with_config`](crate::store::StateCell::with_config).

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Whether values returned from a cell are guarded against mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Snapshots are frozen; in-place mutation attempts are rejected.
    Development,
    /// The freeze guard is skipped.
    Production,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
        }
    }

    pub fn freezes(self) -> bool {
        matches!(self, Mode::Development)
    }
}

impl Default for Mode {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Mode::Development
        } else {
            Mode::Production
        }
    }
}

/// Configuration for state cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mode: Mode,
}

impl Config {
    pub fn development() -> Self {
        Self { mode: Mode::Development }
    }

    pub fn production() -> Self {
        Self { mode: Mode::Production }
    }
}

/// Set the process-wide configuration.
///
/// Must run before the first cell is created.
pub fn init(config: Config) -> Result<(), ConfigError> {
    CONFIG.set(config).map_err(|_| ConfigError::AlreadyInitialized {
        current: current().mode.as_str(),
    })?;
    tracing::debug!(mode = config.mode.as_str(), "bey configuration initialized");
    Ok(())
}

/// The process-wide configuration, locking in the default if unset.
pub fn current() -> Config {
    *CONFIG.get_or_init(Config::default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mode_follows_build_profile() {
        let expected = if cfg!(debug_assertions) {
            Mode::Development
        } else {
            Mode::Production
        };
        assert_eq!(Config::default().mode, expected);
    }

    #[test]
    fn only_development_freezes() {
        assert!(Mode::Development.freezes());
        assert!(!Mode::Production.freezes());
    }

    #[test]
    fn config_deserializes_lowercase_mode() {
        let config: Config = serde_json::from_str(r#"{"mode":"production"}"#).unwrap();
        assert_eq!(config, Config::production());

        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn config_serializes_mode_name() {
        let json = serde_json::to_string(&Config::development()).unwrap();
        assert_eq!(json, r#"{"mode":"development"}"#);
    }
}
