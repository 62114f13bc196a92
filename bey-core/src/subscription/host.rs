//! Host framework seam.
//!
//! A subscription never renders anything itself. When its projection
//! changes it asks the host component to re-render through [`RenderHost`],
//! an opaque "mark dirty" call with no payload. The host's render step then
//! reads the projection back from the subscription.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// The re-render primitive a host UI framework provides.
pub trait RenderHost: Send + Sync {
    /// Mark the owning component dirty.
    fn request_render(&self);
}

impl<F> RenderHost for F
where
    F: Fn() + Send + Sync,
{
    fn request_render(&self) {
        self()
    }
}

/// A host for frameworks that poll for dirtiness once per frame.
///
/// Immediate-mode and terminal UIs redraw from a loop rather than from
/// callbacks; they check [`take_dirty`](Self::take_dirty) each frame.
#[derive(Debug, Default)]
pub struct DirtyFlag {
    dirty: AtomicBool,
    requests: AtomicUsize,
}

impl DirtyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Clear the flag, returning whether it was set.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::SeqCst)
    }

    /// Total render requests received.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl RenderHost for DirtyFlag {
    fn request_render(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.dirty.store(true, Ordering::SeqCst);
    }
}
