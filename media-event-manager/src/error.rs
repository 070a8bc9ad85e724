use media_native::{NativeHandle, ResourceKind};
use thiserror::Error;

/// Errors that can occur in the Media Event Manager
#[derive(Error, Debug)]
pub enum EventManagerError {
    /// Invalid configuration provided
    #[error("Invalid event manager configuration: {0}")]
    Config(String),

    /// The dispatch worker thread could not be started
    #[error("Failed to spawn dispatch worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// The manager was already released and accepts no more events
    #[error("Event manager for {kind} {resource} has been released")]
    Released {
        kind: ResourceKind,
        resource: NativeHandle,
    },
}

/// Result type for Event Manager operations
pub type Result<T> = std::result::Result<T, EventManagerError>;
