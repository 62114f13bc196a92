//! StateCell Implementation
//!
//! A StateCell holds an immutable value outside any component tree and
//! broadcasts to its listeners whenever that value is replaced.
//!
//! # How Cells Work
//!
//! 1. The value lives behind an `Arc` and is never mutated in place. Every
//!    change swaps in a new `Arc`.
//!
//! 2. `set` replaces the value and then calls every registered listener,
//!    once each, in registration order, before returning.
//!
//! 3. Listeners take no arguments. They read the new value through `get()`.
//!
//! # Re-entrancy
//!
//! No lock is held while listeners run. A listener may call `set`, `on` or
//! `off` on the same cell; a nested `set` runs its own broadcast to
//! completion before the outer one resumes. The listener list is captured
//! at the start of each broadcast, so a listener added or removed during a
//! broadcast takes effect from the next one.

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use smallvec::SmallVec;

use super::listener::Listener;
use super::observable::{Listenable, Subscribable, Unsubscribe};
use super::snapshot::Snapshot;
use crate::config::{self, Config, Mode};

/// Counter for generating unique cell IDs.
static CELL_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_cell_id() -> u64 {
    CELL_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

type Listeners = SmallVec<[Listener; 4]>;

/// The stored value plus whether it has been frozen yet.
///
/// The flag belongs to the value, so storing the same reference again
/// carries its freeze state along.
struct Stored<S> {
    value: Arc<S>,
    frozen: Arc<AtomicBool>,
}

impl<S> Stored<S> {
    fn new(value: Arc<S>) -> Self {
        Self {
            value,
            frozen: Arc::new(AtomicBool::new(false)),
        }
    }

    fn with_flag(value: Arc<S>, frozen: &Arc<AtomicBool>) -> Self {
        Self {
            value,
            frozen: Arc::clone(frozen),
        }
    }
}

struct CellInner<S> {
    id: u64,
    mode: Mode,
    initial: Arc<S>,
    /// Freeze state of `initial`, shared with `current` while it holds it.
    initial_frozen: Arc<AtomicBool>,
    current: RwLock<Stored<S>>,
    listeners: RwLock<Listeners>,
    /// Number of stored values the freeze guard has been applied to.
    freeze_count: AtomicUsize,
}

/// An observable holder of an immutable value.
///
/// Cloning a `StateCell` gives another handle to the same cell.
///
/// # Example
///
/// ```rust
/// use bey_core::store::{Listener, StateCell};
///
/// let counter = StateCell::new(1);
/// let listener = Listener::new(|| println!("changed"));
///
/// counter.on(&listener);
/// counter.set(2); // prints "changed"
/// assert_eq!(*counter.get(), 2);
/// ```
pub struct StateCell<S>
where
    S: Send + Sync + 'static,
{
    inner: Arc<CellInner<S>>,
}

impl<S> StateCell<S>
where
    S: Send + Sync + 'static,
{
    /// Create a cell using the process-wide configuration.
    pub fn new(initial: S) -> Self {
        Self::with_config(initial, config::current())
    }

    /// Create a cell with an explicit configuration.
    pub fn with_config(initial: S, config: Config) -> Self {
        Self::from_arc_with_config(Arc::new(initial), config)
    }

    /// Adopt an existing reference as the initial value.
    pub fn from_arc(initial: Arc<S>) -> Self {
        Self::from_arc_with_config(initial, config::current())
    }

    pub fn from_arc_with_config(initial: Arc<S>, config: Config) -> Self {
        let initial_frozen = Arc::new(AtomicBool::new(false));
        Self {
            inner: Arc::new(CellInner {
                id: next_cell_id(),
                mode: config.mode,
                current: RwLock::new(Stored::with_flag(Arc::clone(&initial), &initial_frozen)),
                initial,
                initial_frozen,
                listeners: RwLock::new(SmallVec::new()),
                freeze_count: AtomicUsize::new(0),
            }),
        }
    }

    /// Get the cell's unique ID.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn mode(&self) -> Mode {
        self.inner.mode
    }

    /// Whether two handles refer to the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Get the current value.
    ///
    /// Returns a reference to the stored value, not a copy. In development
    /// mode the snapshot is frozen. The freeze is recorded once per stored
    /// value, on the first `get()` after it was stored.
    pub fn get(&self) -> Snapshot<S> {
        let stored = self.inner.current.read();
        let freeze = self.inner.mode.freezes();
        if freeze && !stored.frozen.swap(true, Ordering::AcqRel) {
            self.inner.freeze_count.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(cell = self.inner.id, "freezing state value");
        }
        Snapshot::new(Arc::clone(&stored.value), freeze)
    }

    /// The stored reference, bypassing the freeze guard.
    pub(crate) fn current(&self) -> Arc<S> {
        Arc::clone(&self.inner.current.read().value)
    }

    /// Replace the value and notify every listener.
    pub fn set(&self, next: S) {
        self.set_arc(Arc::new(next));
    }

    /// Replace the value with an existing reference and notify every listener.
    ///
    /// Notification is unconditional, even if `next` is the stored reference.
    pub fn set_arc(&self, next: Arc<S>) {
        {
            let mut stored = self.inner.current.write();
            if !Arc::ptr_eq(&stored.value, &next) {
                *stored = self.stored_for(next);
            }
        }
        self.notify_listeners();
    }

    /// Pair a reference with its freeze flag. Only the initial value keeps
    /// a flag after it has been replaced.
    fn stored_for(&self, value: Arc<S>) -> Stored<S> {
        if Arc::ptr_eq(&value, &self.inner.initial) {
            Stored::with_flag(value, &self.inner.initial_frozen)
        } else {
            Stored::new(value)
        }
    }

    /// Restore the initial value without notifying listeners.
    ///
    /// The stored value becomes the very reference the cell was created
    /// with. Use [`reset_and_notify`](Self::reset_and_notify) when observers
    /// must see the change.
    pub fn reset(&self) {
        *self.inner.current.write() =
            Stored::with_flag(Arc::clone(&self.inner.initial), &self.inner.initial_frozen);
        tracing::trace!(cell = self.inner.id, "state reset without notification");
    }

    /// Restore the initial value and notify every listener.
    pub fn reset_and_notify(&self) {
        self.set_arc(Arc::clone(&self.inner.initial));
    }

    /// Register a listener. Registering twice adds a second entry.
    pub fn on(&self, listener: &Listener) {
        self.inner.listeners.write().push(listener.clone());
    }

    /// Remove every entry for this listener. Unknown listeners are ignored.
    pub fn off(&self, listener: &Listener) {
        self.inner.listeners.write().retain(|l| l != listener);
    }

    /// Get the number of registered listener entries.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.read().len()
    }

    /// Get the number of stored values the freeze guard was applied to.
    pub fn freeze_count(&self) -> usize {
        self.inner.freeze_count.load(Ordering::Relaxed)
    }

    fn notify_listeners(&self) {
        let listeners: Listeners = self.inner.listeners.read().clone();
        tracing::trace!(
            cell = self.inner.id,
            listeners = listeners.len(),
            "broadcasting state change"
        );
        for listener in &listeners {
            listener.notify();
        }
    }

    fn downgrade(&self) -> Weak<CellInner<S>> {
        Arc::downgrade(&self.inner)
    }

    fn upgrade(weak: &Weak<CellInner<S>>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }
}

impl<S> Clone for StateCell<S>
where
    S: Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> Debug for StateCell<S>
where
    S: Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateCell")
            .field("id", &self.inner.id)
            .field("mode", &self.inner.mode)
            .field("value", &*self.current())
            .field("listener_count", &self.listener_count())
            .finish()
    }
}

impl<S> Listenable for StateCell<S>
where
    S: Send + Sync + 'static,
{
    fn on(&self, listener: &Listener) {
        StateCell::on(self, listener);
    }

    fn off(&self, listener: &Listener) {
        StateCell::off(self, listener);
    }
}

impl<S> Subscribable<S> for StateCell<S>
where
    S: Send + Sync + 'static,
{
    fn subscribe<F>(&self, observer: F) -> Unsubscribe
    where
        F: Fn(Snapshot<S>) + Send + Sync + 'static,
    {
        // The cell owns the listener, so the listener only holds a weak
        // handle back to the cell.
        let weak = self.downgrade();
        let listener = Listener::new(move || {
            if let Some(cell) = StateCell::upgrade(&weak) {
                observer(cell.get());
            }
        });
        self.on(&listener);

        let weak = self.downgrade();
        Unsubscribe::new(move || {
            if let Some(cell) = StateCell::upgrade(&weak) {
                cell.off(&listener);
            }
        })
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
