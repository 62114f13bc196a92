//! Error types.
//!
//! Each concern gets its own enum. Nothing here is retried; callers either
//! fix the misuse or propagate.

use thiserror::Error;

/// Errors raised by a [`StateCell`](crate::store::StateCell) or its snapshots.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A frozen snapshot was asked for in-place mutable access.
    ///
    /// Only raised in [`Mode::Development`](crate::config::Mode::Development).
    /// State changes must go through `set` or `update`.
    #[error("cannot mutate a frozen state value in place; use `set` or `update`")]
    FrozenValue,
}

/// Errors raised while establishing the process-wide configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `init` ran after the configuration was already set or first read.
    #[error("configuration already initialized (mode: {current})")]
    AlreadyInitialized { current: &'static str },
}

/// Errors raised by [`SelectorSubscription`](crate::subscription::SelectorSubscription)
/// lifecycle transitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("subscription is already mounted")]
    AlreadyMounted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_readable() {
        assert_eq!(
            StoreError::FrozenValue.to_string(),
            "cannot mutate a frozen state value in place; use `set` or `update`"
        );
        assert_eq!(
            ConfigError::AlreadyInitialized { current: "production" }.to_string(),
            "configuration already initialized (mode: production)"
        );
        assert_eq!(
            SubscriptionError::AlreadyMounted.to_string(),
            "subscription is already mounted"
        );
    }
}
