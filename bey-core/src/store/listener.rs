//! Listener types for state cells.
//!
//! A Listener is a zero-argument callback a cell invokes after its value
//! changes. Listeners read the new value themselves through `get()`.
//!
//! Cells never compare callbacks. `on` stores a clone of the listener and
//! `off` drops every stored entry whose identity matches, so the handle a
//! caller keeps is what it later passes to `off`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Source of listener identities. Never reused within a process.
static NEXT_LISTENER: AtomicU64 = AtomicU64::new(0);

/// Identity of a registered callback.
///
/// Assigned when a [`Listener`] is built and carried by all of its clones.
/// Exposed so hosts can key their own bookkeeping by listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn allocate() -> Self {
        Self(NEXT_LISTENER.fetch_add(1, Ordering::Relaxed))
    }
}

/// A callback registered on a cell.
///
/// Cheap to clone. Two listeners are the same listener iff they came from
/// the same [`Listener::new`] call.
#[derive(Clone)]
pub struct Listener {
    id: ListenerId,
    notify: Arc<dyn Fn() + Send + Sync>,
}

impl Listener {
    /// Wrap `notify` under a fresh identity.
    pub fn new<F>(notify: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            id: ListenerId::allocate(),
            notify: Arc::new(notify),
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Run the callback. Cells call this once per entry per broadcast.
    pub fn notify(&self) {
        (self.notify)();
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener").field(&self.id).finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
