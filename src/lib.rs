//! Lifecycle: an observable five-state lifecycle
//!
//! A lifecycle holds one of five ordered states and tells observers about
//! every move between them. Hosts such as UI screens or navigation
//! containers drive it; the resources they own listen to it.
//!
//! # Core Concepts
//!
//! - **State**: `DESTROYED < INITIALIZED < CREATED < STARTED < RESUMED`
//! - **Event**: fired on a move between adjacent states, derived from the
//!   transition table (`Event::up_from`, `up_to`, `down_from`, `down_to`)
//! - **Observer**: callback receiving each event, cancelled through its
//!   `Subscription`
//! - **StateFlow**: continuously observable current state
//!
//! The `core` module is pure. The `observable` module holds the registry
//! that a host drives and consumers observe.
//!
//! # Example
//!
//! ```rust
//! use lifecycle::{Cancellable, Event, Lifecycle, LifecycleRegistry, State};
//! use std::sync::{Arc, Mutex};
//!
//! let registry = LifecycleRegistry::new();
//! let events = Arc::new(Mutex::new(Vec::new()));
//!
//! let sink = Arc::clone(&events);
//! let subscription = registry.observe(move |event| sink.lock().unwrap().push(event));
//!
//! registry.move_to(State::Created);
//! subscription.cancel();
//! registry.move_to(State::Started);
//!
//! assert_eq!(*events.lock().unwrap(), vec![Event::OnCreate]);
//! assert_eq!(registry.current_state(), State::Started);
//! ```

pub mod builder;
pub mod core;
pub mod observable;

// Re-export commonly used types
pub use builder::{BuildError, LifecycleRegistryBuilder};
pub use self::core::{Event, ParseError, State, TransitionHistory, TransitionRecord};
pub use observable::{
    Cancellable, Lifecycle, LifecycleRegistry, LifecycleView, Observer, StateFlow, Subscription,
    SubscriptionGuard,
};
