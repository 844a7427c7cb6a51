//! Lifecycle events and the transition table.
//!
//! Events are never stored. They are derived from states with four total
//! functions, one per direction and anchor:
//!
//! | function      | state argument is          | `None` for                  |
//! |---------------|----------------------------|-----------------------------|
//! | `up_from`     | the state being left       | `RESUMED`, `DESTROYED`      |
//! | `up_to`       | the state being entered    | `INITIALIZED`, `DESTROYED`  |
//! | `down_from`   | the state being left       | `INITIALIZED`, `DESTROYED`  |
//! | `down_to`     | the state being entered    | `INITIALIZED`, `RESUMED`    |
//!
//! Every function matches all five states explicitly. `None` means "no
//! event applies" and is an ordinary result, not an error.

use super::error::ParseError;
use super::state::State;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A discrete notification fired on a move between two adjacent states.
///
/// # Example
///
/// ```rust
/// use lifecycle::core::{Event, State};
///
/// assert_eq!(Event::up_from(State::Initialized), Some(Event::OnCreate));
/// assert_eq!(Event::down_to(State::Destroyed), Some(Event::OnDestroy));
/// assert_eq!(Event::down_from(State::Initialized), None);
/// assert_eq!(Event::OnStart.inverse(), Event::OnStop);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    OnCreate,
    OnStart,
    OnResume,
    OnPause,
    OnStop,
    OnDestroy,
}

impl Event {
    /// Every event, upward events first.
    pub const ALL: [Event; 6] = [
        Event::OnCreate,
        Event::OnStart,
        Event::OnResume,
        Event::OnPause,
        Event::OnStop,
        Event::OnDestroy,
    ];

    /// Event reported when leaving `state` for the next higher state.
    pub const fn up_from(state: State) -> Option<Event> {
        match state {
            State::Destroyed => None,
            State::Initialized => Some(Event::OnCreate),
            State::Created => Some(Event::OnStart),
            State::Started => Some(Event::OnResume),
            State::Resumed => None,
        }
    }

    /// Event reported when entering `state` from the next lower state.
    pub const fn up_to(state: State) -> Option<Event> {
        match state {
            State::Destroyed => None,
            State::Initialized => None,
            State::Created => Some(Event::OnCreate),
            State::Started => Some(Event::OnStart),
            State::Resumed => Some(Event::OnResume),
        }
    }

    /// Event reported when leaving `state` for the next lower state.
    pub const fn down_from(state: State) -> Option<Event> {
        match state {
            State::Destroyed => None,
            State::Initialized => None,
            State::Created => Some(Event::OnDestroy),
            State::Started => Some(Event::OnStop),
            State::Resumed => Some(Event::OnPause),
        }
    }

    /// Event reported when entering `state` from the next higher state.
    pub const fn down_to(state: State) -> Option<Event> {
        match state {
            State::Destroyed => Some(Event::OnDestroy),
            State::Initialized => None,
            State::Created => Some(Event::OnStop),
            State::Started => Some(Event::OnPause),
            State::Resumed => None,
        }
    }

    /// Event for a move between two adjacent states, in either direction.
    ///
    /// Returns `None` when `from` and `to` are not neighbours, when they are
    /// equal, or when the move leaves `Destroyed`.
    pub fn between(from: State, to: State) -> Option<Event> {
        if from.next_up() == Some(to) {
            Event::up_from(from)
        } else if from.next_down() == Some(to) {
            Event::down_from(from)
        } else {
            None
        }
    }

    /// The state a lifecycle is in once this event has been reported.
    pub const fn target_state(self) -> State {
        match self {
            Event::OnCreate => State::Created,
            Event::OnStart => State::Started,
            Event::OnResume => State::Resumed,
            Event::OnPause => State::Started,
            Event::OnStop => State::Created,
            Event::OnDestroy => State::Destroyed,
        }
    }

    /// The state a lifecycle leaves when this event is reported.
    ///
    /// `OnCreate` leaves `Initialized`; `OnDestroy` leaves `Created`.
    pub const fn source_state(self) -> State {
        match self {
            Event::OnCreate => State::Initialized,
            Event::OnStart => State::Created,
            Event::OnResume => State::Started,
            Event::OnPause => State::Resumed,
            Event::OnStop => State::Started,
            Event::OnDestroy => State::Created,
        }
    }

    /// The event that undoes this one.
    pub const fn inverse(self) -> Event {
        match self {
            Event::OnCreate => Event::OnDestroy,
            Event::OnStart => Event::OnStop,
            Event::OnResume => Event::OnPause,
            Event::OnPause => Event::OnResume,
            Event::OnStop => Event::OnStart,
            Event::OnDestroy => Event::OnCreate,
        }
    }

    /// True for events that move the lifecycle to a higher state.
    pub const fn is_upward(self) -> bool {
        matches!(self, Event::OnCreate | Event::OnStart | Event::OnResume)
    }

    /// Stable, upper-case label used in logs and serialized forms.
    ///
    /// ```rust
    /// use lifecycle::core::Event;
    ///
    /// assert_eq!(Event::OnPause.name(), "ON_PAUSE");
    /// ```
    pub const fn name(self) -> &'static str {
        match self {
            Event::OnCreate => "ON_CREATE",
            Event::OnStart => "ON_START",
            Event::OnResume => "ON_RESUME",
            Event::OnPause => "ON_PAUSE",
            Event::OnStop => "ON_STOP",
            Event::OnDestroy => "ON_DESTROY",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Event {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Event::ALL
            .into_iter()
            .find(|event| event.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseError::UnknownEvent(trimmed.to_string()))
    }
}
