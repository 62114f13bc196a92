//! Snapshots of a cell's value.
//!
//! A [`Snapshot`] is what [`StateCell::get`](super::StateCell::get) hands
//! out: a shared reference to the stored value, never a copy. In
//! development mode it is frozen and refuses mutable access; in production
//! mode the guard is skipped and `try_mut` detaches a private copy instead.
//! Either way the cell's stored value is never written through a snapshot.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::error::StoreError;

/// Shared, read-only view of a cell's value at the time of `get()`.
pub struct Snapshot<S> {
    value: Arc<S>,
    frozen: bool,
}

impl<S> Snapshot<S> {
    pub(crate) fn new(value: Arc<S>, frozen: bool) -> Self {
        Self { value, frozen }
    }

    /// Whether mutable access is rejected.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Freeze this snapshot. No-op if already frozen.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Request mutable access to the value.
    ///
    /// Frozen snapshots return [`StoreError::FrozenValue`]. Unfrozen ones
    /// clone on write, so the cell keeps its own value untouched.
    pub fn try_mut(&mut self) -> Result<&mut S, StoreError>
    where
        S: Clone,
    {
        if self.frozen {
            return Err(StoreError::FrozenValue);
        }
        Ok(Arc::make_mut(&mut self.value))
    }

    pub fn as_arc(&self) -> &Arc<S> {
        &self.value
    }

    /// Give up the snapshot and keep the shared reference.
    pub fn into_arc(self) -> Arc<S> {
        self.value
    }

    /// Reference equality of the underlying values.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.value, &b.value)
    }
}

impl<S> Deref for Snapshot<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.value
    }
}

impl<S> AsRef<S> for Snapshot<S> {
    fn as_ref(&self) -> &S {
        &self.value
    }
}

impl<S> Clone for Snapshot<S> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            frozen: self.frozen,
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for Snapshot<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("value", &*self.value)
            .field("frozen", &self.frozen)
            .finish()
    }
}
