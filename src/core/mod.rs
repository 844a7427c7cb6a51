//! Pure lifecycle values.
//!
//! This module contains everything that has no side effects:
//! - The ordered `State` enumeration
//! - The `Event` enumeration and its transition table
//! - Transition records and history
//!
//! Nothing here locks, allocates shared state, or logs.

mod error;
mod event;
mod history;
mod state;

pub use error::ParseError;
pub use event::Event;
pub use history::{TransitionHistory, TransitionRecord};
pub use state::State;
