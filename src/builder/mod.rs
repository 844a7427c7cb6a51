//! Builder API for configuring lifecycle registries.
//!
//! # Example
//!
//! ```rust
//! use lifecycle::builder::LifecycleRegistryBuilder;
//! use lifecycle::core::State;
//! use lifecycle::observable::Lifecycle;
//!
//! let registry = LifecycleRegistryBuilder::new()
//!     .name("settings-screen")
//!     .history_limit(16)
//!     .release_observers_on_destroy(true)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(registry.name(), "settings-screen");
//! assert_eq!(registry.current_state(), State::Initialized);
//! ```

pub mod error;

pub use error::BuildError;

use crate::core::TransitionHistory;
use crate::observable::LifecycleRegistry;

/// Label used in log fields when no name is configured.
pub const DEFAULT_NAME: &str = "lifecycle";

/// Number of transitions a registry remembers by default.
pub const DEFAULT_HISTORY_LIMIT: usize = 64;

/// Builder for [`LifecycleRegistry`].
#[derive(Clone, Debug)]
pub struct LifecycleRegistryBuilder {
    name: String,
    history_limit: Option<usize>,
    release_observers_on_destroy: bool,
}

impl LifecycleRegistryBuilder {
    pub fn new() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            history_limit: Some(DEFAULT_HISTORY_LIMIT),
            release_observers_on_destroy: true,
        }
    }

    /// Set the label attached to every log line of this registry.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Keep at most `limit` most recent transitions.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    /// Keep every transition.
    pub fn unbounded_history(mut self) -> Self {
        self.history_limit = None;
        self
    }

    /// Drop every observer registration once `DESTROYED` is reached.
    pub fn release_observers_on_destroy(mut self, release: bool) -> Self {
        self.release_observers_on_destroy = release;
        self
    }

    /// Build the registry in `INITIALIZED`.
    pub fn build(self) -> Result<LifecycleRegistry, BuildError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(BuildError::EmptyName);
        }

        let history = match self.history_limit {
            Some(0) => return Err(BuildError::ZeroHistoryLimit),
            Some(limit) => TransitionHistory::with_limit(limit),
            None => TransitionHistory::new(),
        };

        Ok(LifecycleRegistry::from_parts(
            name.to_string(),
            history,
            self.release_observers_on_destroy,
        ))
    }
}

impl Default for LifecycleRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
