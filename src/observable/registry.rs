//! Host-driven lifecycle holder.
//!
//! Transitions are serialized per registry: every observer sees every event
//! in the same order. A transition requested from inside an observer
//! callback is queued and applied once the current fan-out has reached all
//! observers, before the outermost host call returns.

use super::flow::StateFlow;
use super::subscription::{Registration, Subscription};
use super::{Lifecycle, Observer};
use crate::builder::{LifecycleRegistryBuilder, DEFAULT_HISTORY_LIMIT, DEFAULT_NAME};
use crate::core::{Event, State, TransitionHistory, TransitionRecord};
use parking_lot::{Mutex, ReentrantMutex};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, trace, warn};

#[derive(Clone, Copy, Debug)]
enum Request {
    Event(Event),
    MoveTo(State),
}

#[derive(Default)]
struct Dispatcher {
    busy: bool,
    pending: VecDeque<Request>,
}

/// Clears the busy flag even if an observer panics mid fan-out.
struct BusyReset<'a>(&'a RefCell<Dispatcher>);

impl Drop for BusyReset<'_> {
    fn drop(&mut self) {
        let mut dispatcher = self.0.borrow_mut();
        dispatcher.busy = false;
        dispatcher.pending.clear();
    }
}

pub(crate) struct Shared {
    name: String,
    state: watch::Sender<State>,
    observers: Mutex<Vec<Arc<Registration>>>,
    dispatcher: ReentrantMutex<RefCell<Dispatcher>>,
    history: Mutex<TransitionHistory>,
    next_id: AtomicU64,
    release_on_destroy: bool,
}

impl Shared {
    fn current(&self) -> State {
        *self.state.borrow()
    }

    fn submit(&self, request: Request) {
        let guard = self.dispatcher.lock();
        {
            let mut dispatcher = guard.borrow_mut();
            dispatcher.pending.push_back(request);
            if dispatcher.busy {
                trace!(lifecycle = %self.name, ?request, "transition queued behind fan-out");
                return;
            }
            dispatcher.busy = true;
        }

        let _reset = BusyReset(&*guard);
        loop {
            let next = guard.borrow_mut().pending.pop_front();
            match next {
                Some(request) => self.apply(request),
                None => break,
            }
        }
    }

    fn apply(&self, request: Request) {
        let current = self.current();
        if current.is_final() {
            warn!(lifecycle = %self.name, ?request, "lifecycle is destroyed, ignoring transition");
            return;
        }

        match request {
            Request::Event(event) => {
                let target = event.target_state();
                if target == current {
                    debug!(lifecycle = %self.name, %event, state = %current, "already in target state");
                    return;
                }
                self.step(current, target, Some(event));
            }
            Request::MoveTo(target) => self.walk(current, target),
        }
    }

    /// Move one adjacent state at a time towards `target`.
    fn walk(&self, mut current: State, target: State) {
        while current != target {
            let step = if target > current {
                current
                    .next_up()
                    .map(|next| (next, Event::up_from(current)))
            } else {
                // INITIALIZED is never re-entered from above.
                current
                    .next_down()
                    .filter(|next| *next >= target)
                    .map(|next| (next, Event::down_from(current)))
            };

            let Some((next, event)) = step else {
                warn!(lifecycle = %self.name, from = %current, to = %target, "no path to requested state");
                return;
            };
            self.step(current, next, event);
            current = next;
        }
    }

    fn step(&self, from: State, to: State, event: Option<Event>) {
        let delivered = match event {
            Some(event) => self.notify(event),
            None => 0,
        };

        // Observers hear about the change before it becomes visible.
        self.history
            .lock()
            .push(TransitionRecord::now(from, to, event));
        self.state.send_replace(to);

        debug!(
            lifecycle = %self.name,
            %from,
            %to,
            event = %event.map_or("none", Event::name),
            delivered,
            "lifecycle transition"
        );

        if to.is_final() && self.release_on_destroy {
            self.release_observers();
        }
    }

    fn notify(&self, event: Event) -> usize {
        let snapshot: Vec<Arc<Registration>> = self.observers.lock().clone();
        let mut delivered = 0;
        for registration in &snapshot {
            if registration.deliver(event) {
                delivered += 1;
            }
        }
        delivered
    }

    fn release_observers(&self) {
        let released = std::mem::take(&mut *self.observers.lock());
        for registration in &released {
            registration.deactivate();
        }
        debug!(lifecycle = %self.name, released = released.len(), "observers released");
    }

    fn subscribe(self: &Arc<Self>, observer: Arc<dyn Observer>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (registration, active) = Registration::new(id, observer);

        // Wait out any fan-out running on another thread: once registered,
        // an observer hears about every state change it can see.
        let _dispatch = self.dispatcher.lock();
        let mut observers = self.observers.lock();
        if self.release_on_destroy && self.current().is_final() {
            registration.deactivate();
            trace!(lifecycle = %self.name, subscription = id, "subscribed after destroy");
        } else {
            observers.push(Arc::new(registration));
            trace!(lifecycle = %self.name, subscription = id, "observer subscribed");
        }
        drop(observers);

        Subscription::new(id, active, Arc::downgrade(self))
    }

    pub(crate) fn remove(&self, id: u64) {
        self.observers.lock().retain(|registration| registration.id != id);
    }
}

/// Lifecycle holder driven by its host.
///
/// The registry is the only handle that can change state. Hand consumers a
/// [`LifecycleView`] (or a reference typed as `&dyn Lifecycle`) instead.
///
/// The registry does not check that requested moves are coherent: that is
/// the host's responsibility. It only refuses to move away from
/// `DESTROYED`, since no event exists for such a move.
///
/// Observers hear about each change before it becomes visible through
/// [`Lifecycle::current_state`] and [`StateFlow`]. Subscribing from another
/// thread while a transition is in flight waits until that transition has
/// been delivered and published. Subscribing or cancelling from inside an
/// observer callback does not wait.
///
/// # Example
///
/// ```rust
/// use lifecycle::core::{Event, State};
/// use lifecycle::observable::{Lifecycle, LifecycleRegistry};
///
/// let registry = LifecycleRegistry::new();
/// assert_eq!(registry.current_state(), State::Initialized);
///
/// registry.handle_event(Event::OnCreate);
/// assert_eq!(registry.current_state(), State::Created);
///
/// registry.move_to(State::Resumed);
/// assert_eq!(
///     registry.history().events(),
///     vec![Event::OnCreate, Event::OnStart, Event::OnResume]
/// );
/// ```
pub struct LifecycleRegistry {
    shared: Arc<Shared>,
}

impl LifecycleRegistry {
    /// Registry with the default configuration, in `INITIALIZED`.
    pub fn new() -> Self {
        Self::from_parts(
            DEFAULT_NAME.to_string(),
            TransitionHistory::with_limit(DEFAULT_HISTORY_LIMIT),
            true,
        )
    }

    /// Start configuring a registry. See [`LifecycleRegistryBuilder`].
    pub fn builder() -> LifecycleRegistryBuilder {
        LifecycleRegistryBuilder::new()
    }

    pub(crate) fn from_parts(
        name: String,
        history: TransitionHistory,
        release_on_destroy: bool,
    ) -> Self {
        let (state, _) = watch::channel(State::Initialized);
        Self {
            shared: Arc::new(Shared {
                name,
                state,
                observers: Mutex::new(Vec::new()),
                dispatcher: ReentrantMutex::new(RefCell::new(Dispatcher::default())),
                history: Mutex::new(history),
                next_id: AtomicU64::new(1),
                release_on_destroy,
            }),
        }
    }

    /// Name used to tag this registry's log lines.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Report `event` and move to the state it leads to.
    ///
    /// Ignored once the lifecycle is `DESTROYED`, and when the lifecycle is
    /// already in the event's target state.
    pub fn handle_event(&self, event: Event) {
        self.shared.submit(Request::Event(event));
    }

    /// Move to `target`, broadcasting the event of every adjacent step.
    ///
    /// `INITIALIZED -> RESUMED` broadcasts `ON_CREATE`, `ON_START` and
    /// `ON_RESUME`. `INITIALIZED -> DESTROYED` changes state without an
    /// event, since the transition table defines none for it.
    pub fn move_to(&self, target: State) {
        self.shared.submit(Request::MoveTo(target));
    }

    /// Walk down to `DESTROYED`.
    pub fn destroy(&self) {
        self.move_to(State::Destroyed);
    }

    /// Number of observers currently registered.
    pub fn observer_count(&self) -> usize {
        self.shared.observers.lock().len()
    }

    /// Snapshot of the recorded transitions.
    pub fn history(&self) -> TransitionHistory {
        self.shared.history.lock().clone()
    }

    /// Read-only handle for consumers.
    pub fn view(&self) -> LifecycleView {
        LifecycleView {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Default for LifecycleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle for LifecycleRegistry {
    fn current_state_flow(&self) -> StateFlow {
        StateFlow::new(self.shared.state.subscribe())
    }

    fn subscribe(&self, observer: Arc<dyn Observer>) -> Subscription {
        self.shared.subscribe(observer)
    }

    fn current_state(&self) -> State {
        self.shared.current()
    }
}

impl fmt::Debug for LifecycleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleRegistry")
            .field("name", &self.shared.name)
            .field("state", &self.shared.current())
            .field("observers", &self.observer_count())
            .finish()
    }
}

/// Read-only, cloneable view of a [`LifecycleRegistry`].
#[derive(Clone)]
pub struct LifecycleView {
    shared: Arc<Shared>,
}

impl LifecycleView {
    /// Name of the underlying registry.
    pub fn name(&self) -> &str {
        &self.shared.name
    }
}

impl Lifecycle for LifecycleView {
    fn current_state_flow(&self) -> StateFlow {
        StateFlow::new(self.shared.state.subscribe())
    }

    fn subscribe(&self, observer: Arc<dyn Observer>) -> Subscription {
        self.shared.subscribe(observer)
    }

    fn current_state(&self) -> State {
        self.shared.current()
    }
}

impl fmt::Debug for LifecycleView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleView")
            .field("name", &self.shared.name)
            .field("state", &self.shared.current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observable::Cancellable;
    use std::sync::Mutex as StdMutex;
    use tracing_test::traced_test;

    fn recorder(registry: &impl Lifecycle) -> (Arc<StdMutex<Vec<Event>>>, Subscription) {
        let events = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let subscription = registry.observe(move |event| sink.lock().unwrap().push(event));
        (events, subscription)
    }

    #[test]
    fn starts_initialized() {
        let registry = LifecycleRegistry::new();
        assert_eq!(registry.current_state(), State::Initialized);
        assert_eq!(registry.name(), DEFAULT_NAME);
        assert!(registry.history().is_empty());
    }

    #[test]
    fn handle_event_moves_to_target_state() {
        let registry = LifecycleRegistry::new();
        let (events, _subscription) = recorder(&registry);

        registry.handle_event(Event::OnCreate);
        registry.handle_event(Event::OnStart);
        registry.handle_event(Event::OnResume);
        registry.handle_event(Event::OnPause);

        assert_eq!(registry.current_state(), State::Started);
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                Event::OnCreate,
                Event::OnStart,
                Event::OnResume,
                Event::OnPause
            ]
        );
    }

    #[test]
    fn handle_event_for_current_state_is_ignored() {
        let registry = LifecycleRegistry::new();
        registry.move_to(State::Started);
        let (events, _subscription) = recorder(&registry);

        registry.handle_event(Event::OnStart);

        assert!(events.lock().unwrap().is_empty());
        assert_eq!(registry.history().len(), 2);
    }

    #[test]
    fn move_to_walks_every_step_up() {
        let registry = LifecycleRegistry::new();
        let (events, _subscription) = recorder(&registry);

        registry.move_to(State::Resumed);

        assert_eq!(
            *events.lock().unwrap(),
            vec![Event::OnCreate, Event::OnStart, Event::OnResume]
        );
        assert_eq!(
            registry.history().path(),
            vec![
                State::Initialized,
                State::Created,
                State::Started,
                State::Resumed
            ]
        );
    }

    #[test]
    fn destroy_walks_every_step_down() {
        let registry = LifecycleRegistry::new();
        registry.move_to(State::Resumed);
        let (events, _subscription) = recorder(&registry);

        registry.destroy();

        assert_eq!(
            *events.lock().unwrap(),
            vec![Event::OnPause, Event::OnStop, Event::OnDestroy]
        );
        assert_eq!(registry.current_state(), State::Destroyed);
    }

    #[test]
    fn destroying_an_uncreated_lifecycle_is_silent() {
        let registry = LifecycleRegistry::new();
        let (events, _subscription) = recorder(&registry);

        registry.destroy();

        assert!(events.lock().unwrap().is_empty());
        assert_eq!(registry.current_state(), State::Destroyed);
        let history = registry.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history.transitions()[0].event, None);
    }

    #[test]
    fn initialized_is_not_reentered_from_above() {
        let registry = LifecycleRegistry::new();
        registry.move_to(State::Started);
        let (events, _subscription) = recorder(&registry);

        registry.move_to(State::Initialized);

        assert_eq!(*events.lock().unwrap(), vec![Event::OnStop]);
        assert_eq!(registry.current_state(), State::Created);
    }

    #[traced_test]
    #[test]
    fn nothing_moves_away_from_destroyed() {
        let registry = LifecycleRegistry::builder()
            .release_observers_on_destroy(false)
            .build()
            .unwrap();
        let (events, _subscription) = recorder(&registry);

        registry.destroy();
        registry.move_to(State::Resumed);
        registry.handle_event(Event::OnCreate);

        assert!(events.lock().unwrap().is_empty());
        assert_eq!(registry.current_state(), State::Destroyed);
        assert!(logs_contain("lifecycle is destroyed, ignoring transition"));
    }

    #[test]
    fn observers_are_released_on_destroy() {
        let registry = LifecycleRegistry::new();
        let (_events, subscription) = recorder(&registry);
        assert_eq!(registry.observer_count(), 1);

        registry.move_to(State::Created);
        registry.destroy();

        assert_eq!(registry.observer_count(), 0);
        assert!(!subscription.is_active());
        subscription.cancel();
    }

    #[test]
    fn observers_kept_after_destroy_when_configured() {
        let registry = LifecycleRegistry::builder()
            .release_observers_on_destroy(false)
            .build()
            .unwrap();
        let (_events, subscription) = recorder(&registry);

        registry.destroy();

        assert_eq!(registry.observer_count(), 1);
        assert!(subscription.is_active());
    }

    #[test]
    fn subscribing_after_destroy_registers_nothing() {
        let registry = LifecycleRegistry::new();
        registry.destroy();

        let (_events, subscription) = recorder(&registry);

        assert_eq!(registry.observer_count(), 0);
        assert!(!subscription.is_active());
    }

    #[test]
    fn observer_can_subscribe_during_delivery() {
        let registry = LifecycleRegistry::new();
        let view = registry.view();
        let late = Arc::new(StdMutex::new(Vec::new()));
        let subscriptions = Arc::new(StdMutex::new(Vec::new()));

        let sink = Arc::clone(&late);
        let held = Arc::clone(&subscriptions);
        let _subscription = registry.observe(move |event| {
            if event == Event::OnCreate {
                let sink = Arc::clone(&sink);
                let subscription = view.observe(move |event| sink.lock().unwrap().push(event));
                held.lock().unwrap().push(subscription);
            }
        });

        registry.move_to(State::Started);

        assert_eq!(subscriptions.lock().unwrap().len(), 1);
        assert_eq!(*late.lock().unwrap(), vec![Event::OnStart]);
    }

    #[test]
    fn cancel_removes_only_its_own_observer() {
        let registry = LifecycleRegistry::new();
        let (first, first_subscription) = recorder(&registry);
        let (second, _second_subscription) = recorder(&registry);

        first_subscription.cancel();
        first_subscription.cancel();
        assert_eq!(registry.observer_count(), 1);

        registry.handle_event(Event::OnCreate);

        assert!(first.lock().unwrap().is_empty());
        assert_eq!(*second.lock().unwrap(), vec![Event::OnCreate]);
    }

    #[test]
    fn observer_can_cancel_itself_during_delivery() {
        let registry = LifecycleRegistry::new();
        let events = Arc::new(StdMutex::new(Vec::new()));
        let slot: Arc<StdMutex<Option<Subscription>>> = Arc::new(StdMutex::new(None));

        let sink = Arc::clone(&events);
        let own = Arc::clone(&slot);
        let subscription = registry.observe(move |event| {
            sink.lock().unwrap().push(event);
            if let Some(subscription) = own.lock().unwrap().as_ref() {
                subscription.cancel();
            }
        });
        *slot.lock().unwrap() = Some(subscription);

        registry.move_to(State::Resumed);

        assert_eq!(*events.lock().unwrap(), vec![Event::OnCreate]);
        assert_eq!(registry.observer_count(), 0);
    }

    #[test]
    fn nested_transition_is_delivered_after_current_fan_out() {
        let registry = Arc::new(LifecycleRegistry::new());
        let log = Arc::new(StdMutex::new(Vec::new()));

        let weak = Arc::downgrade(&registry);
        let first = Arc::clone(&log);
        let _first = registry.observe(move |event| {
            first.lock().unwrap().push(("first", event));
            if event == Event::OnCreate {
                if let Some(registry) = weak.upgrade() {
                    registry.handle_event(Event::OnStart);
                }
            }
        });
        let second = Arc::clone(&log);
        let _second = registry.observe(move |event| second.lock().unwrap().push(("second", event)));

        registry.handle_event(Event::OnCreate);

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                ("first", Event::OnCreate),
                ("second", Event::OnCreate),
                ("first", Event::OnStart),
                ("second", Event::OnStart),
            ]
        );
        assert_eq!(registry.current_state(), State::Started);
    }

    #[test]
    fn observer_sees_event_before_state_is_published() {
        let registry = Arc::new(LifecycleRegistry::new());
        let seen = Arc::new(StdMutex::new(Vec::new()));

        let view = registry.view();
        let sink = Arc::clone(&seen);
        let _subscription = registry.observe(move |event| {
            sink.lock().unwrap().push((event, view.current_state()));
        });

        registry.move_to(State::Created);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![(Event::OnCreate, State::Initialized)]
        );
        assert_eq!(registry.current_state(), State::Created);
    }

    #[test]
    fn view_observes_but_shares_state() {
        let registry = LifecycleRegistry::builder().name("screen").build().unwrap();
        let view = registry.view();
        let (events, _subscription) = recorder(&view);

        registry.move_to(State::Started);

        assert_eq!(view.name(), "screen");
        assert_eq!(view.current_state(), State::Started);
        assert_eq!(*events.lock().unwrap(), vec![Event::OnCreate, Event::OnStart]);
    }

    #[test]
    fn history_respects_configured_limit() {
        let registry = LifecycleRegistry::builder().history_limit(2).build().unwrap();

        registry.move_to(State::Resumed);

        let history = registry.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history.events(), vec![Event::OnStart, Event::OnResume]);
    }

    #[traced_test]
    #[test]
    fn transitions_are_logged() {
        let registry = LifecycleRegistry::builder().name("screen").build().unwrap();

        registry.move_to(State::Created);

        assert!(logs_contain("lifecycle transition"));
        assert!(logs_contain("ON_CREATE"));
        assert!(logs_contain("screen"));
    }
}
