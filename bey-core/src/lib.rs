//! Bey Core
//!
//! This crate provides external state for component-based UIs. It
//! implements:
//!
//! - State cells that hold immutable values outside the component tree
//! - Copy-on-write updates that only notify when something changed
//! - Selector subscriptions that re-render a component only when the slice
//!   of state it reads changed under shallow equality
//!
//! The crate does not render anything. Host frameworks drive a
//! [`SelectorSubscription`](subscription::SelectorSubscription) through its
//! mount, retarget and unmount transitions and supply a
//! [`RenderHost`](subscription::RenderHost) to be marked dirty.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `store`: State cells, listeners, snapshots and copy-on-write updates
//! - `subscription`: Selector subscriptions, shallow equality, host seam
//! - `config`: Development/production mode
//! - `error`: Error types
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use bey_core::store::{update, StateCell};
//! use bey_core::subscription::{DirtyFlag, SelectorSubscription};
//!
//! #[derive(Clone, PartialEq)]
//! struct App { count: i32, name: String }
//!
//! let app = StateCell::new(App { count: 0, name: "Ada".into() });
//!
//! let host = Arc::new(DirtyFlag::new());
//! let counter = SelectorSubscription::new(app.clone(), |s| s.count, host.clone());
//! counter.mount().unwrap();
//!
//! // Unrelated field: no re-render.
//! update(&app, |s| s.name = "Grace".into());
//! assert!(!host.take_dirty());
//!
//! // Selected field: re-render.
//! update(&app, |s| s.count += 1);
//! assert!(host.take_dirty());
//! assert_eq!(counter.render(), 1);
//! ```

pub mod config;
pub mod error;
pub mod store;
pub mod subscription;

pub use config::{Config, Mode};
pub use error::{ConfigError, StoreError, SubscriptionError};
pub use store::{update, StateCell};
pub use subscription::{SelectorSubscription, ShallowEq};
