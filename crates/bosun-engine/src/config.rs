//! Orchestrator configuration
//!
//! Explicit configuration passed at construction time; the orchestrator
//! reads no ambient global state.

use std::time::Duration;

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Capacity of the execution event broadcast channel
    pub event_capacity: usize,

    /// Timeout applied to invoke and initiate calls when neither the
    /// executor nor the executor engine supplies one
    pub default_invoke_timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_capacity: 1024,
            default_invoke_timeout: None,
        }
    }
}

impl EngineConfig {
    /// Create a config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the event channel capacity
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Set the default invoke timeout
    pub fn with_default_invoke_timeout(mut self, timeout: Duration) -> Self {
        self.default_invoke_timeout = Some(timeout);
        self
    }
}
