//! Parse errors for lifecycle names.

use thiserror::Error;

/// Errors produced when parsing a `State` or `Event` from its name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown lifecycle state '{0}'")]
    UnknownState(String),

    #[error("Unknown lifecycle event '{0}'")]
    UnknownEvent(String),
}
