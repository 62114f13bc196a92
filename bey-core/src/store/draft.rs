//! Copy-on-Write Updates
//!
//! [`produce`] derives the next immutable value from the current one and a
//! recipe that edits a [`Draft`]. [`update`] runs `produce` against a cell
//! and stores the result only if it is a new reference.
//!
//! # How Drafts Work
//!
//! 1. The draft starts as a view of the current value. Reading costs nothing.
//!
//! 2. The first mutable access clones the value. `Clone` is shallow for
//!    `Arc` fields, so sub-trees the recipe never touches keep their
//!    original references in the result.
//!
//! 3. When the recipe returns, a draft that was never written, or whose copy
//!    compares equal to the original, yields the original `Arc`. Anything
//!    else yields a new `Arc`.
//!
//! Because of step 3, a no-op recipe never causes a notification.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use super::cell::StateCell;

/// Mutable, lazily-copied view of a value inside a recipe.
pub struct Draft<S> {
    base: Arc<S>,
    copy: Option<S>,
}

impl<S: Clone> Draft<S> {
    fn new(base: Arc<S>) -> Self {
        Self { base, copy: None }
    }

    /// Substitute a whole new value for the draft.
    pub fn replace(&mut self, value: S) {
        self.copy = Some(value);
    }

    /// The value the recipe started from.
    pub fn original(&self) -> &S {
        &self.base
    }

    /// Whether the recipe has taken a copy yet.
    pub fn is_modified(&self) -> bool {
        self.copy.is_some()
    }

    fn finish(self) -> Arc<S>
    where
        S: PartialEq,
    {
        match self.copy {
            Some(copy) if copy != *self.base => Arc::new(copy),
            _ => self.base,
        }
    }
}

impl<S> Deref for Draft<S> {
    type Target = S;

    fn deref(&self) -> &S {
        match &self.copy {
            Some(copy) => copy,
            None => &self.base,
        }
    }
}

impl<S: Clone> DerefMut for Draft<S> {
    fn deref_mut(&mut self) -> &mut S {
        let base = &self.base;
        self.copy.get_or_insert_with(|| S::clone(base))
    }
}

/// Apply `recipe` to `current`, returning `current` itself if nothing changed.
pub fn produce<S, F>(current: &Arc<S>, recipe: F) -> Arc<S>
where
    S: Clone + PartialEq,
    F: FnOnce(&mut Draft<S>),
{
    let mut draft = Draft::new(Arc::clone(current));
    recipe(&mut draft);
    draft.finish()
}

/// Update a cell through a copy-on-write recipe.
///
/// Listeners are notified once if the recipe produced a new value, and not
/// at all otherwise.
///
/// # Example
///
/// ```rust
/// use bey_core::store::{update, StateCell};
///
/// #[derive(Clone, PartialEq)]
/// struct Counter { count: i32 }
///
/// let counter = StateCell::new(Counter { count: 1 });
/// update(&counter, |state| state.count += 1);
/// assert_eq!(counter.get().count, 2);
/// ```
pub fn update<S, F>(target: &StateCell<S>, recipe: F)
where
    S: Clone + PartialEq + Send + Sync + 'static,
    F: FnOnce(&mut Draft<S>),
{
    let current = target.current();
    let next = produce(&current, recipe);

    if Arc::ptr_eq(&next, &current) {
        tracing::trace!(cell = target.id(), "update produced no change; skipping notification");
        return;
    }

    target.set_arc(next);
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
