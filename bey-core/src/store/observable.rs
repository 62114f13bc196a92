//! Observation capabilities.
//!
//! A cell can be observed two ways, and host bindings pick whichever suits
//! them:
//!
//! - [`Listenable`]: register and remove zero-argument [`Listener`]s by
//!   identity. Listeners pull the new value themselves.
//! - [`Subscribable`]: hand over an observer that receives each new value,
//!   and get back an [`Unsubscribe`] handle. This is the shape generic
//!   observable-stream adapters expect.

use std::fmt;

use super::listener::Listener;
use super::snapshot::Snapshot;

/// Register and remove listeners by identity.
pub trait Listenable {
    fn on(&self, listener: &Listener);

    /// Remove every entry for `listener`. Must be a no-op for unknown listeners.
    fn off(&self, listener: &Listener);
}

/// Push-style observation with an unsubscribe handle.
pub trait Subscribable<S> {
    /// Call `observer` with the new value after every change.
    fn subscribe<F>(&self, observer: F) -> Unsubscribe
    where
        F: Fn(Snapshot<S>) + Send + Sync + 'static;
}

/// Handle returned by [`Subscribable::subscribe`].
///
/// Dropping the handle detaches the observer. Use [`forget`](Self::forget)
/// to keep the observer attached for the life of the source.
#[must_use = "dropping the handle unsubscribes immediately"]
pub struct Unsubscribe {
    detach: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Unsubscribe {
    pub fn new<F>(detach: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Detach the observer now.
    pub fn unsubscribe(mut self) {
        self.detach_now();
    }

    /// Leave the observer attached and discard the handle.
    pub fn forget(mut self) {
        self.detach = None;
    }

    pub fn is_active(&self) -> bool {
        self.detach.is_some()
    }

    fn detach_now(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Unsubscribe {
    fn drop(&mut self) {
        self.detach_now();
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("active", &self.is_active())
            .finish()
    }
}
