use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdkError {
    /// The operation needs native state that is not there, e.g. a media on
    /// a player that has none, or any call on a released wrapper
    #[error("Invalid state: {0}")]
    InvalidState(&'static str),

    #[error("Event manager error: {0}")]
    EventManager(#[from] media_event_manager::EventManagerError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while loading or validating an [`SdkConfig`](crate::SdkConfig)
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, SdkError>;
