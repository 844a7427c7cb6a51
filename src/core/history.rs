//! Transition history tracking.
//!
//! A lifecycle records every state change it performs as a
//! [`TransitionRecord`]. Records are plain values; the history can be
//! bounded so long-lived hosts do not grow it without limit.

use super::event::Event;
use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single state change.
///
/// `event` is `None` only for moves the transition table has no event for,
/// such as `INITIALIZED -> DESTROYED`.
///
/// # Example
///
/// ```rust
/// use lifecycle::core::{Event, State, TransitionRecord};
/// use chrono::Utc;
///
/// let record = TransitionRecord {
///     from: State::Initialized,
///     to: State::Created,
///     event: Some(Event::OnCreate),
///     timestamp: Utc::now(),
/// };
/// assert!(record.is_upward());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// The state being left
    pub from: State,
    /// The state being entered
    pub to: State,
    /// The event broadcast for this change, if any
    pub event: Option<Event>,
    /// When the change was recorded
    pub timestamp: DateTime<Utc>,
}

impl TransitionRecord {
    /// Build a record stamped with the current time.
    pub fn now(from: State, to: State, event: Option<Event>) -> Self {
        Self {
            from,
            to,
            event,
            timestamp: Utc::now(),
        }
    }

    pub fn is_upward(&self) -> bool {
        self.to > self.from
    }
}

/// Ordered, optionally bounded history of state changes.
///
/// `record` is pure and returns a new history; the owning lifecycle uses
/// the in-place variant internally.
///
/// # Example
///
/// ```rust
/// use lifecycle::core::{Event, State, TransitionHistory, TransitionRecord};
///
/// let history = TransitionHistory::new()
///     .record(TransitionRecord::now(State::Initialized, State::Created, Some(Event::OnCreate)))
///     .record(TransitionRecord::now(State::Created, State::Started, Some(Event::OnStart)));
///
/// assert_eq!(
///     history.path(),
///     vec![State::Initialized, State::Created, State::Started]
/// );
/// assert_eq!(history.events(), vec![Event::OnCreate, Event::OnStart]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionHistory {
    transitions: Vec<TransitionRecord>,
    limit: Option<usize>,
}

impl TransitionHistory {
    /// Create a new, unbounded, empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty history that keeps at most `limit` most recent records.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            transitions: Vec::new(),
            limit: Some(limit),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// The existing history is left untouched.
    pub fn record(&self, transition: TransitionRecord) -> Self {
        let mut next = self.clone();
        next.push(transition);
        next
    }

    pub(crate) fn push(&mut self, transition: TransitionRecord) {
        self.transitions.push(transition);
        if let Some(limit) = self.limit {
            if self.transitions.len() > limit {
                let excess = self.transitions.len() - limit;
                self.transitions.drain(..excess);
            }
        }
    }

    /// States traversed: the first recorded source, then each target.
    pub fn path(&self) -> Vec<State> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.first() {
            path.push(first.from);
        }
        path.extend(self.transitions.iter().map(|t| t.to));
        path
    }

    /// Events broadcast, in order. Silent changes are skipped.
    pub fn events(&self) -> Vec<Event> {
        self.transitions.iter().filter_map(|t| t.event).collect()
    }

    /// Time between the first and last recorded transition.
    ///
    /// Returns `None` when the history is empty.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.transitions.first()?, self.transitions.last()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    /// Recorded transitions, oldest first.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lifecycle::core::{Event, State, TransitionHistory, TransitionRecord};
    ///
    /// let history = TransitionHistory::new()
    ///     .record(TransitionRecord::now(State::Initialized, State::Created, Some(Event::OnCreate)));
    ///
    /// assert_eq!(history.transitions()[0].to, State::Created);
    /// assert_eq!(history.last().map(|t| t.event), Some(Some(Event::OnCreate)));
    /// ```
    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    /// Most recent transition, if any.
    pub fn last(&self) -> Option<&TransitionRecord> {
        self.transitions.last()
    }

    /// Maximum number of records kept; `None` when unbounded.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Number of records currently kept.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
