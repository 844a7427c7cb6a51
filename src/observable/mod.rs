//! Observable lifecycle: the imperative shell around the pure core.
//!
//! A [`LifecycleRegistry`] is owned by the host that drives transitions.
//! Consumers see it through the [`Lifecycle`] trait, either on the registry
//! itself or on a read-only [`LifecycleView`].
//!
//! Two observation channels are offered:
//! - **Observers** receive every transition [`Event`], in order, until their
//!   [`Subscription`] is cancelled.
//! - **[`StateFlow`]** exposes the latest [`State`] and lets async code wait
//!   for changes. It is a latest-value channel, so a slow reader may skip
//!   intermediate states; observers never do.
//!
//! # Example
//!
//! ```rust
//! use lifecycle::core::{Event, State};
//! use lifecycle::observable::{Cancellable, Lifecycle, LifecycleRegistry};
//! use std::sync::{Arc, Mutex};
//!
//! let registry = LifecycleRegistry::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! let sink = Arc::clone(&seen);
//! let subscription = registry.observe(move |event| sink.lock().unwrap().push(event));
//!
//! registry.move_to(State::Resumed);
//! subscription.cancel();
//! registry.destroy();
//!
//! assert_eq!(
//!     *seen.lock().unwrap(),
//!     vec![Event::OnCreate, Event::OnStart, Event::OnResume]
//! );
//! assert_eq!(registry.current_state(), State::Destroyed);
//! ```

mod flow;
mod registry;
mod subscription;

pub use flow::StateFlow;
pub use registry::{LifecycleRegistry, LifecycleView};
pub use subscription::{Subscription, SubscriptionGuard};

use crate::core::{Event, State};
use std::sync::Arc;

/// Callback invoked once per transition event.
///
/// Any `Fn(Event) + Send + Sync` closure is an observer.
pub trait Observer: Send + Sync {
    fn on_state_changed(&self, event: Event);
}

impl<F> Observer for F
where
    F: Fn(Event) + Send + Sync,
{
    fn on_state_changed(&self, event: Event) {
        self(event)
    }
}

/// Handle that deregisters one observer.
///
/// `cancel` is idempotent: calls after the first do nothing.
pub trait Cancellable {
    fn cancel(&self);
}

/// A holder of [`State`] that can be observed for changes.
pub trait Lifecycle: Send + Sync {
    /// Continuously observable current state.
    fn current_state_flow(&self) -> StateFlow;

    /// Register `observer` for every subsequent event.
    ///
    /// Past events are not replayed.
    fn subscribe(&self, observer: Arc<dyn Observer>) -> Subscription;

    /// Latest value of [`Lifecycle::current_state_flow`].
    fn current_state(&self) -> State {
        self.current_state_flow().value()
    }

    /// Register a closure as an observer.
    fn observe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(Event) + Send + Sync + 'static,
        Self: Sized,
    {
        self.subscribe(Arc::new(observer))
    }
}
