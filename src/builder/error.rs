//! Build errors for lifecycle registries.

use thiserror::Error;

/// Errors that can occur when building a `LifecycleRegistry`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Lifecycle name is empty. Call .name(..) with a non-blank label")]
    EmptyName,

    #[error("History limit must be at least 1. Call .unbounded_history() to disable the limit")]
    ZeroHistoryLimit,
}
