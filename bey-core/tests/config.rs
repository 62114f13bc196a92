//! Process-wide configuration.
//!
//! Kept in its own test binary: the configuration is global and can only be
//! set once per process.

use bey_core::config::{self, Config, Mode};
use bey_core::error::ConfigError;
use bey_core::store::StateCell;

#[test]
fn init_once_then_locked() {
    config::init(Config::production()).unwrap();
    assert_eq!(config::current().mode, Mode::Production);

    let cell = StateCell::new(1);
    assert_eq!(cell.mode(), Mode::Production);
    assert!(!cell.get().is_frozen());

    // Explicit configuration still wins for a single cell.
    let guarded = StateCell::with_config(1, Config::development());
    assert!(guarded.get().is_frozen());

    assert_eq!(
        config::init(Config::development()),
        Err(ConfigError::AlreadyInitialized {
            current: "production"
        })
    );
    assert_eq!(config::current().mode, Mode::Production);
}
