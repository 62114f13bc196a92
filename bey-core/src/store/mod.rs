//! State Cells
//!
//! This module implements the state container: cells that hold immutable
//! values, the listeners they notify, and the copy-on-write update path.
//!
//! # Concepts
//!
//! ## Cells
//!
//! A [`StateCell`] owns the current value of some piece of application state
//! and the ordered list of listeners interested in it. The value is shared
//! read-only between changes and replaced wholesale on every change.
//!
//! ## Updates
//!
//! [`update`] derives a new value from the current one with a recipe that
//! edits a [`Draft`]. If the recipe changed nothing, the cell keeps its
//! value and no listener runs. This is what keeps no-op edits from fanning
//! out to every subscriber.
//!
//! ## Snapshots
//!
//! `get()` returns a [`Snapshot`]. In development mode snapshots are frozen
//! so accidental in-place mutation fails loudly; see [`crate::config`].

mod cell;
mod draft;
mod listener;
mod observable;
mod snapshot;

pub use cell::StateCell;
pub use draft::{produce, update, Draft};
pub use listener::{Listener, ListenerId};
pub use observable::{Listenable, Subscribable, Unsubscribe};
pub use snapshot::Snapshot;
