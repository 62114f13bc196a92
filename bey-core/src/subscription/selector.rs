//! SelectorSubscription Implementation
//!
//! A SelectorSubscription connects one host component to one [`StateCell`].
//! It projects the cell's value through a selector and asks the host to
//! re-render only when the projection changed under [`ShallowEq`].
//!
//! # Lifecycle
//!
//! The subscription is a two-state machine driven by the host binding:
//!
//! ```text
//!              mount()
//!   Unmounted ─────────▶ Mounted
//!       ▲                  │
//!       └──────────────────┘
//!             unmount()
//! ```
//!
//! `update_target` may be called in either state. While mounted it moves the
//! update handler from the old cell to the new one.
//!
//! # Update Handler
//!
//! On every notification from the target cell the handler:
//!
//! 1. Computes the next projection from `target.get()`.
//! 2. Compares it with the cached projection.
//! 3. Stores it as the cached projection, whatever the comparison said.
//! 4. Stops if the subscription is unmounted.
//! 5. Stops if the projections were shallow-equal.
//! 6. Otherwise calls [`RenderHost::request_render`].
//!
//! A notification can still arrive after `unmount()` (for example from a
//! `set` issued while the host tears down). Step 4 makes it harmless.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use super::host::RenderHost;
use super::shallow::ShallowEq;
use crate::error::SubscriptionError;
use crate::store::{Listener, Snapshot, StateCell};

/// Lifecycle state of a [`SelectorSubscription`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unmounted,
    Mounted,
}

type Selector<S, P> = Box<dyn Fn(&Snapshot<S>) -> P + Send + Sync>;

struct Shared<S, P>
where
    S: Send + Sync + 'static,
{
    target: RwLock<StateCell<S>>,
    selector: Selector<S, P>,
    /// Projection from the most recent mount, retarget or notification.
    cached: RwLock<Option<Arc<P>>>,
    phase: RwLock<Phase>,
    host: Arc<dyn RenderHost>,
}

impl<S, P> Shared<S, P>
where
    S: Send + Sync + 'static,
    P: ShallowEq + Send + Sync + 'static,
{
    fn project(&self, target: &StateCell<S>) -> P {
        let snapshot = target.get();
        (self.selector)(&snapshot)
    }

    fn on_update(&self) {
        let target = self.target.read().clone();
        let next = self.project(&target);

        let changed = {
            let mut cached = self.cached.write();
            let changed = cached
                .as_deref()
                .map_or(true, |previous| !previous.shallow_eq(&next));
            *cached = Some(Arc::new(next));
            changed
        };

        if *self.phase.read() == Phase::Unmounted {
            tracing::trace!(cell = target.id(), "notification after unmount; render suppressed");
            return;
        }
        if !changed {
            tracing::trace!(cell = target.id(), "projection unchanged; render suppressed");
            return;
        }

        self.host.request_render();
    }
}

/// Binds a host component to a slice of a [`StateCell`].
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use bey_core::store::{update, StateCell};
/// use bey_core::subscription::{DirtyFlag, SelectorSubscription};
///
/// #[derive(Clone, PartialEq)]
/// struct Counter { count: i32, label: String }
///
/// let counter = StateCell::new(Counter { count: 0, label: "clicks".into() });
/// let host = Arc::new(DirtyFlag::new());
/// let subscription = SelectorSubscription::new(counter.clone(), |s| s.count, host.clone());
///
/// subscription.mount().unwrap();
/// update(&counter, |s| s.label = "taps".into());
/// assert!(!host.is_dirty());
///
/// update(&counter, |s| s.count += 1);
/// assert!(host.take_dirty());
/// assert_eq!(subscription.render(), 1);
/// ```
pub struct SelectorSubscription<S, P>
where
    S: Send + Sync + 'static,
    P: ShallowEq + Send + Sync + 'static,
{
    shared: Arc<Shared<S, P>>,
    handler: Listener,
}

impl<S, P> SelectorSubscription<S, P>
where
    S: Send + Sync + 'static,
    P: ShallowEq + Send + Sync + 'static,
{
    /// Create an unmounted subscription.
    pub fn new<F>(target: StateCell<S>, selector: F, host: Arc<dyn RenderHost>) -> Self
    where
        F: Fn(&Snapshot<S>) -> P + Send + Sync + 'static,
    {
        let shared = Arc::new(Shared {
            target: RwLock::new(target),
            selector: Box::new(selector),
            cached: RwLock::new(None),
            phase: RwLock::new(Phase::Unmounted),
            host,
        });

        // The target cell owns the handler; the handler must not own us.
        let weak: Weak<Shared<S, P>> = Arc::downgrade(&shared);
        let handler = Listener::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.on_update();
            }
        });

        Self { shared, handler }
    }

    pub fn phase(&self) -> Phase {
        *self.shared.phase.read()
    }

    pub fn is_mounted(&self) -> bool {
        self.phase() == Phase::Mounted
    }

    /// The cell this subscription is bound to.
    pub fn target(&self) -> StateCell<S> {
        self.shared.target.read().clone()
    }

    /// Capture the current projection and start listening to the target.
    ///
    /// The phase only becomes [`Phase::Mounted`] once the handler is
    /// registered. A selector that panics here leaves the subscription
    /// unmounted, and `mount` may be called again.
    pub fn mount(&self) -> Result<(), SubscriptionError> {
        if self.is_mounted() {
            return Err(SubscriptionError::AlreadyMounted);
        }

        let target = self.target();
        let projection = self.shared.project(&target);

        let mut phase = self.shared.phase.write();
        if *phase == Phase::Mounted {
            return Err(SubscriptionError::AlreadyMounted);
        }
        *self.shared.cached.write() = Some(Arc::new(projection));
        target.on(&self.handler);
        *phase = Phase::Mounted;
        drop(phase);

        tracing::debug!(cell = target.id(), "selector subscription mounted");
        Ok(())
    }

    /// Rebind to another cell. No-op if `next` is the current target.
    ///
    /// While mounted, the handler moves from the old cell to `next` and the
    /// cached projection is recomputed from `next`. While unmounted the
    /// cache is dropped, so nothing from the old cell survives.
    pub fn update_target(&self, next: StateCell<S>) {
        let previous = {
            let mut target = self.shared.target.write();
            if target.ptr_eq(&next) {
                return;
            }
            std::mem::replace(&mut *target, next.clone())
        };

        if self.is_mounted() {
            previous.off(&self.handler);
            next.on(&self.handler);
            let projection = self.shared.project(&next);
            *self.shared.cached.write() = Some(Arc::new(projection));
        } else {
            *self.shared.cached.write() = None;
        }

        tracing::debug!(from = previous.id(), to = next.id(), "selector subscription retargeted");
    }

    /// Stop listening. Later notifications never reach the host.
    pub fn unmount(&self) {
        {
            let mut phase = self.shared.phase.write();
            if *phase == Phase::Unmounted {
                return;
            }
            *phase = Phase::Unmounted;
        }

        let target = self.target();
        target.off(&self.handler);
        tracing::debug!(cell = target.id(), "selector subscription unmounted");
    }

    /// The projection to render with.
    ///
    /// Returns the cached projection. Before the first mount there is no
    /// cache yet, so the selector runs against the target's current value.
    pub fn render(&self) -> P
    where
        P: Clone,
    {
        self.render_with(P::clone)
    }

    /// Pass the projection to a children-render function.
    pub fn render_with<R, F>(&self, children: F) -> R
    where
        F: FnOnce(&P) -> R,
    {
        // Clone the Arc out so no lock is held while children run.
        let cached = self.shared.cached.read().clone();
        match cached {
            Some(projection) => children(&*projection),
            None => children(&self.shared.project(&self.target())),
        }
    }
}

impl<S> SelectorSubscription<S, Snapshot<S>>
where
    S: ShallowEq + Send + Sync + 'static,
{
    /// Subscribe to the whole value.
    pub fn identity(target: StateCell<S>, host: Arc<dyn RenderHost>) -> Self {
        Self::new(target, Snapshot::clone, host)
    }
}

impl<S, P> Drop for SelectorSubscription<S, P>
where
    S: Send + Sync + 'static,
    P: ShallowEq + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.unmount();
    }
}

impl<S, P> fmt::Debug for SelectorSubscription<S, P>
where
    S: Send + Sync + 'static,
    P: ShallowEq + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectorSubscription")
            .field("target", &self.target().id())
            .field("phase", &self.phase())
            .field("cached", &self.shared.cached.read().is_some())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::update;
    use crate::subscription::DirtyFlag;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        count: i32,
        name: String,
    }

    fn counter() -> StateCell<Counter> {
        StateCell::new(Counter {
            count: 1,
            name: "Ada".into(),
        })
    }

    fn count_subscription(
        cell: &StateCell<Counter>,
    ) -> (SelectorSubscription<Counter, i32>, Arc<DirtyFlag>) {
        let host = Arc::new(DirtyFlag::new());
        let subscription = SelectorSubscription::new(cell.clone(), |s| s.count, host.clone());
        (subscription, host)
    }

    #[test]
    fn render_before_mount_reads_current_value() {
        let cell = counter();
        let (subscription, host) = count_subscription(&cell);

        assert_eq!(subscription.phase(), Phase::Unmounted);
        assert_eq!(subscription.render(), 1);
        assert_eq!(cell.listener_count(), 0);
        assert_eq!(host.request_count(), 0);
    }

    #[test]
    fn mount_registers_handler_and_caches() {
        let cell = counter();
        let (subscription, _host) = count_subscription(&cell);

        subscription.mount().unwrap();
        assert!(subscription.is_mounted());
        assert_eq!(cell.listener_count(), 1);
        assert_eq!(subscription.render(), 1);
    }

    #[test]
    fn double_mount_is_rejected() {
        let cell = counter();
        let (subscription, _host) = count_subscription(&cell);

        subscription.mount().unwrap();
        assert_eq!(subscription.mount(), Err(SubscriptionError::AlreadyMounted));
        assert_eq!(cell.listener_count(), 1);
    }

    #[test]
    fn mount_can_be_retried_after_selector_panic() {
        use std::panic::{catch_unwind, AssertUnwindSafe};
        use std::sync::atomic::AtomicBool;

        let cell = StateCell::new(0);
        let host = Arc::new(DirtyFlag::new());
        let failed_once = Arc::new(AtomicBool::new(false));

        let failed = failed_once.clone();
        let subscription = SelectorSubscription::new(
            cell.clone(),
            move |s: &Snapshot<i32>| {
                if !failed.swap(true, Ordering::SeqCst) {
                    panic!("first projection failed");
                }
                **s
            },
            host.clone(),
        );

        let result = catch_unwind(AssertUnwindSafe(|| subscription.mount()));
        assert!(result.is_err());
        assert!(!subscription.is_mounted());
        assert_eq!(cell.listener_count(), 0);

        subscription.mount().unwrap();
        assert!(subscription.is_mounted());
        assert_eq!(cell.listener_count(), 1);

        cell.set(3);
        assert_eq!(host.request_count(), 1);
        assert_eq!(subscription.render(), 3);
    }

    #[test]
    fn rerenders_only_when_projection_changes() {
        let cell = counter();
        let (subscription, host) = count_subscription(&cell);
        subscription.mount().unwrap();

        update(&cell, |s| s.name = "Grace".into());
        assert_eq!(host.request_count(), 0);

        update(&cell, |s| s.count += 1);
        assert_eq!(host.request_count(), 1);
        assert_eq!(subscription.render(), 2);

        // Same count, new reference: notified but not re-rendered.
        cell.set(Counter {
            count: 2,
            name: "Grace".into(),
        });
        assert_eq!(host.request_count(), 1);
    }

    #[test]
    fn cache_follows_latest_notification() {
        let cell = StateCell::new(0);
        let host = Arc::new(DirtyFlag::new());
        let subscription = SelectorSubscription::new(cell.clone(), |s| **s / 10, host.clone());
        subscription.mount().unwrap();

        cell.set(5);
        assert_eq!(host.request_count(), 0);
        cell.set(15);
        assert_eq!(host.request_count(), 1);
        cell.set(19);
        assert_eq!(host.request_count(), 1);
        assert_eq!(subscription.render(), 1);
    }

    #[test]
    fn unmount_stops_rendering() {
        let cell = counter();
        let (subscription, host) = count_subscription(&cell);
        subscription.mount().unwrap();

        subscription.unmount();
        assert_eq!(cell.listener_count(), 0);

        update(&cell, |s| s.count += 1);
        assert_eq!(host.request_count(), 0);

        // Idempotent.
        subscription.unmount();
        assert_eq!(subscription.phase(), Phase::Unmounted);
    }

    #[test]
    fn notification_in_flight_after_unmount_is_ignored() {
        let cell = counter();
        let host = Arc::new(DirtyFlag::new());
        let subscription = Arc::new(SelectorSubscription::new(
            cell.clone(),
            |s: &Snapshot<Counter>| s.count,
            host.clone(),
        ));

        // Registered before the subscription, so it runs first and unmounts
        // the subscription while the broadcast is still in progress.
        let teardown = {
            let subscription = subscription.clone();
            Listener::new(move || subscription.unmount())
        };
        cell.on(&teardown);
        subscription.mount().unwrap();

        update(&cell, |s| s.count += 1);

        assert_eq!(host.request_count(), 0);
        assert!(!subscription.is_mounted());
        assert_eq!(subscription.render(), 2);
        cell.off(&teardown);
    }

    #[test]
    fn update_target_moves_handler_and_recomputes() {
        let first = counter();
        let second = StateCell::new(Counter {
            count: 100,
            name: "Grace".into(),
        });
        let (subscription, host) = count_subscription(&first);
        subscription.mount().unwrap();

        subscription.update_target(second.clone());
        assert_eq!(first.listener_count(), 0);
        assert_eq!(second.listener_count(), 1);
        assert_eq!(subscription.render(), 100);

        update(&first, |s| s.count += 1);
        assert_eq!(host.request_count(), 0);

        update(&second, |s| s.count += 1);
        assert_eq!(host.request_count(), 1);
        assert_eq!(subscription.render(), 101);
    }

    #[test]
    fn update_target_with_same_cell_is_noop() {
        let cell = counter();
        let (subscription, _host) = count_subscription(&cell);
        subscription.mount().unwrap();

        subscription.update_target(cell.clone());
        assert_eq!(cell.listener_count(), 1);
    }

    #[test]
    fn update_target_while_unmounted_drops_stale_projection() {
        let first = counter();
        let second = StateCell::new(Counter {
            count: 7,
            name: "Grace".into(),
        });
        let (subscription, _host) = count_subscription(&first);
        subscription.mount().unwrap();
        subscription.unmount();

        subscription.update_target(second.clone());
        assert_eq!(second.listener_count(), 0);
        assert_eq!(subscription.render(), 7);

        subscription.mount().unwrap();
        assert_eq!(second.listener_count(), 1);
        assert_eq!(first.listener_count(), 0);
    }

    #[test]
    fn dropping_a_mounted_subscription_unregisters() {
        let cell = counter();
        {
            let (subscription, _host) = count_subscription(&cell);
            subscription.mount().unwrap();
            assert_eq!(cell.listener_count(), 1);
        }
        assert_eq!(cell.listener_count(), 0);
    }

    #[test]
    fn render_with_passes_projection_to_children() {
        let cell = counter();
        let host = Arc::new(DirtyFlag::new());
        let subscription = SelectorSubscription::new(
            cell.clone(),
            |s: &Snapshot<Counter>| (s.name.clone(),),
            host,
        );
        subscription.mount().unwrap();

        let label = subscription.render_with(|(name,)| format!("Hello, {name}"));
        assert_eq!(label, "Hello, Ada");
    }

    #[test]
    fn identity_selector_tracks_whole_value() {
        #[derive(Debug, Clone, PartialEq)]
        struct Pair {
            left: i32,
            right: i32,
        }
        crate::impl_shallow_eq!(Pair { left, right });

        let cell = StateCell::new(Pair { left: 1, right: 2 });
        let host = Arc::new(DirtyFlag::new());
        let subscription = SelectorSubscription::identity(cell.clone(), host.clone());
        subscription.mount().unwrap();

        // New reference, same fields.
        cell.set(Pair { left: 1, right: 2 });
        assert_eq!(host.request_count(), 0);

        update(&cell, |p| p.right = 3);
        assert_eq!(host.request_count(), 1);
        assert_eq!(subscription.render().right, 3);
    }

    #[test]
    fn closure_hosts_receive_requests() {
        let cell = counter();
        let renders = Arc::new(AtomicI32::new(0));
        let renders_clone = renders.clone();
        let subscription = SelectorSubscription::new(
            cell.clone(),
            |s: &Snapshot<Counter>| s.count,
            Arc::new(move || {
                renders_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );
        subscription.mount().unwrap();

        update(&cell, |s| s.count += 1);
        update(&cell, |s| s.count += 1);
        assert_eq!(renders.load(Ordering::SeqCst), 2);
    }

    #[test]
    #[should_panic(expected = "selector failed")]
    fn selector_panic_propagates_out_of_set() {
        let cell = StateCell::new(0);
        let host = Arc::new(DirtyFlag::new());
        let subscription = SelectorSubscription::new(
            cell.clone(),
            |s: &Snapshot<i32>| {
                if **s > 0 {
                    panic!("selector failed");
                }
                **s
            },
            host,
        );
        subscription.mount().unwrap();

        cell.set(1);
    }
}
