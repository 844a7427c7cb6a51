//! Observer registrations and their cancellation handles.

use super::registry::Shared;
use super::{Cancellable, Observer};
use crate::core::Event;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::trace;

/// Registry-side entry for one observer.
///
/// The `active` flag is shared with the [`Subscription`]. Fan-out checks it
/// right before each delivery, so a cancelled observer receives nothing
/// issued after `cancel` returns.
pub(crate) struct Registration {
    pub(crate) id: u64,
    active: Arc<AtomicBool>,
    observer: Arc<dyn Observer>,
}

impl Registration {
    pub(crate) fn new(id: u64, observer: Arc<dyn Observer>) -> (Self, Arc<AtomicBool>) {
        let active = Arc::new(AtomicBool::new(true));
        let registration = Self {
            id,
            active: Arc::clone(&active),
            observer,
        };
        (registration, active)
    }

    /// Deliver `event` unless the registration was cancelled.
    pub(crate) fn deliver(&self, event: Event) -> bool {
        if self.active.load(Ordering::Acquire) {
            self.observer.on_state_changed(event);
            true
        } else {
            false
        }
    }

    pub(crate) fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }
}

/// Cancellation handle returned by `subscribe`.
///
/// Dropping a `Subscription` does **not** cancel it; use
/// [`Subscription::into_guard`] for scope-bound observation. The handle
/// holds only a weak reference to the registry, so it never keeps the
/// lifecycle alive.
pub struct Subscription {
    id: u64,
    active: Arc<AtomicBool>,
    registry: Weak<Shared>,
}

impl Subscription {
    pub(crate) fn new(id: u64, active: Arc<AtomicBool>, registry: Weak<Shared>) -> Self {
        Self {
            id,
            active,
            registry,
        }
    }

    /// Registry-unique identifier of this subscription.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// False once cancelled, or once the lifecycle released its observers.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire) && self.registry.strong_count() > 0
    }

    /// Convert into a guard that cancels when dropped.
    pub fn into_guard(self) -> SubscriptionGuard {
        SubscriptionGuard { inner: self }
    }
}

impl Cancellable for Subscription {
    fn cancel(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
        trace!(subscription = self.id, "observer cancelled");
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Subscription that cancels itself on drop.
#[derive(Debug)]
#[must_use = "dropping the guard cancels the subscription immediately"]
pub struct SubscriptionGuard {
    inner: Subscription,
}

impl SubscriptionGuard {
    /// See [`Subscription::is_active`].
    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }
}

impl Cancellable for SubscriptionGuard {
    fn cancel(&self) {
        self.inner.cancel();
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.inner.cancel();
    }
}
