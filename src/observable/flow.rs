//! Latest-value stream of the current state.

use crate::core::State;
use tokio::sync::watch;

/// Continuously observable current [`State`].
///
/// Reading the value never blocks and needs no async runtime. Waiting for
/// changes is async. Once the owning registry is dropped, the waiting
/// methods return `None`.
///
/// # Example
///
/// ```rust
/// use lifecycle::core::State;
/// use lifecycle::observable::{Lifecycle, LifecycleRegistry};
///
/// let registry = LifecycleRegistry::new();
/// let flow = registry.current_state_flow();
/// assert_eq!(flow.value(), State::Initialized);
///
/// registry.move_to(State::Started);
/// assert!(flow.has_changed());
/// assert_eq!(flow.value(), State::Started);
/// ```
#[derive(Clone, Debug)]
pub struct StateFlow {
    receiver: watch::Receiver<State>,
}

impl StateFlow {
    pub(crate) fn new(receiver: watch::Receiver<State>) -> Self {
        Self { receiver }
    }

    /// The latest state.
    pub fn value(&self) -> State {
        *self.receiver.borrow()
    }

    /// True if a state newer than the last one seen through
    /// [`StateFlow::changed`] has been published.
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Wait for the next published state and return it.
    pub async fn changed(&mut self) -> Option<State> {
        self.receiver.changed().await.ok()?;
        let state = *self.receiver.borrow_and_update();
        Some(state)
    }

    /// Wait until the state satisfies `predicate`, checking the current
    /// value first.
    pub async fn wait_until<F>(&mut self, mut predicate: F) -> Option<State>
    where
        F: FnMut(State) -> bool,
    {
        let state = self.receiver.wait_for(|state| predicate(*state)).await.ok()?;
        let state = *state;
        Some(state)
    }

    /// Wait until the state ranks at or above `state`.
    pub async fn wait_for_at_least(&mut self, state: State) -> Option<State> {
        self.wait_until(|current| current.is_at_least(state)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_reflects_latest_send() {
        let (sender, receiver) = watch::channel(State::Initialized);
        let flow = StateFlow::new(receiver);

        sender.send_replace(State::Created);
        assert_eq!(flow.value(), State::Created);
    }

    #[tokio::test]
    async fn changed_returns_none_when_sender_dropped() {
        let (sender, receiver) = watch::channel(State::Initialized);
        let mut flow = StateFlow::new(receiver);

        drop(sender);
        assert_eq!(flow.changed().await, None);
    }

    #[tokio::test]
    async fn wait_until_checks_current_value_first() {
        let (_sender, receiver) = watch::channel(State::Resumed);
        let mut flow = StateFlow::new(receiver);

        let state = flow.wait_until(|s| s == State::Resumed).await;
        assert_eq!(state, Some(State::Resumed));
    }
}
