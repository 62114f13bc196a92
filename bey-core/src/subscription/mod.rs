//! Selector Subscriptions
//!
//! This module connects host UI components to state cells.
//!
//! # Concepts
//!
//! ## Selectors
//!
//! A selector projects a cell's whole value down to the slice one component
//! renders. Selectors must be pure; they run on every notification.
//!
//! ## Change Detection
//!
//! After each notification the new projection is compared with the previous
//! one using [`ShallowEq`]. A component subscribed to `state.count` does not
//! re-render when `state.name` changes, even though both live in the same
//! cell, and a selector that builds a fresh record every call does not force
//! a re-render as long as the record's fields keep their identity.
//!
//! ## Hosts
//!
//! The host framework supplies a [`RenderHost`] and drives the
//! [`SelectorSubscription`] lifecycle from whatever binding mechanism it has:
//! an effect hook, class lifecycle methods, or manual wiring.

mod host;
mod selector;
mod shallow;

pub use host::{DirtyFlag, RenderHost};
pub use selector::{Phase, SelectorSubscription};
pub use shallow::{Identity, ShallowEq};
