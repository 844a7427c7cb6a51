//! Lifecycle states.
//!
//! States form a fixed, totally ordered set. The declaration order of the
//! variants is the rank order, so the derived `Ord` compares by rank.

use super::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the five lifecycle phases, ranked low to high.
///
/// ```text
/// [INITIALIZED] ──┐
///                 ↓
///         ┌── [CREATED] ──┐
///         ↓       ↑       ↓
///    [DESTROYED]  └── [STARTED] ──┐
///                         ↑       ↓
///                         └── [RESUMED]
/// ```
///
/// `Destroyed` is terminal: no event is ever derived moving away from it.
///
/// # Example
///
/// ```rust
/// use lifecycle::core::State;
///
/// assert!(State::Destroyed < State::Initialized);
/// assert!(State::Resumed > State::Started);
/// assert!(State::Resumed.is_at_least(State::Created));
/// assert_eq!(State::Created.next_up(), Some(State::Started));
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    Destroyed,
    #[default]
    Initialized,
    Created,
    Started,
    Resumed,
}

impl State {
    /// Every state, ordered from lowest to highest rank.
    pub const ALL: [State; 5] = [
        State::Destroyed,
        State::Initialized,
        State::Created,
        State::Started,
        State::Resumed,
    ];

    /// Position of the state in the rank order (`Destroyed` is 0).
    pub const fn rank(self) -> u8 {
        match self {
            State::Destroyed => 0,
            State::Initialized => 1,
            State::Created => 2,
            State::Started => 3,
            State::Resumed => 4,
        }
    }

    /// Stable, upper-case label used in logs and serialized forms.
    pub const fn name(self) -> &'static str {
        match self {
            State::Destroyed => "DESTROYED",
            State::Initialized => "INITIALIZED",
            State::Created => "CREATED",
            State::Started => "STARTED",
            State::Resumed => "RESUMED",
        }
    }

    /// True only for `Destroyed`.
    pub const fn is_final(self) -> bool {
        matches!(self, State::Destroyed)
    }

    /// True if this state ranks at or above `other`.
    pub fn is_at_least(self, other: State) -> bool {
        self >= other
    }

    /// The adjacent higher state, if an upward move from here exists.
    ///
    /// `Destroyed` is terminal and has no upward neighbour.
    pub const fn next_up(self) -> Option<State> {
        match self {
            State::Destroyed => None,
            State::Initialized => Some(State::Created),
            State::Created => Some(State::Started),
            State::Started => Some(State::Resumed),
            State::Resumed => None,
        }
    }

    /// The adjacent lower state, if a downward move from here exists.
    pub const fn next_down(self) -> Option<State> {
        match self {
            State::Destroyed => None,
            State::Initialized => Some(State::Destroyed),
            State::Created => Some(State::Destroyed),
            State::Started => Some(State::Created),
            State::Resumed => Some(State::Started),
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for State {
    type Err = ParseError;

    /// Parses the upper-case name, ignoring ASCII case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        State::ALL
            .into_iter()
            .find(|state| state.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseError::UnknownState(trimmed.to_string()))
    }
}
