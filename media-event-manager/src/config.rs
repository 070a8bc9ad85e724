//! Configuration for event managers

use crate::error::{EventManagerError, Result};

/// Configuration for an [`EventManager`](crate::EventManager)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventManagerConfig {
    /// Prefix for dispatch worker thread names; the resource kind and handle
    /// are appended
    /// Default: "media-events"
    pub thread_name: String,

    /// Upper bound on queued, undelivered events
    ///
    /// `None` is unbounded. When bounded and full, the native callback drops
    /// the event rather than waiting on listener code.
    /// Default: None
    pub queue_capacity: Option<usize>,
}

impl Default for EventManagerConfig {
    fn default() -> Self {
        Self {
            thread_name: "media-events".to_string(),
            queue_capacity: None,
        }
    }
}

impl EventManagerConfig {
    /// Create a new EventManagerConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounded queue suitable for high-rate sources such as time-changed events
    pub fn bounded(capacity: usize) -> Self {
        Self {
            queue_capacity: Some(capacity),
            ..Default::default()
        }
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<()> {
        if self.thread_name.trim().is_empty() {
            return Err(EventManagerError::Config(
                "thread name must not be empty".to_string(),
            ));
        }

        if self.queue_capacity == Some(0) {
            return Err(EventManagerError::Config(
                "queue capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
