//! Error types for native engine calls

use thiserror::Error;

use crate::event::EventType;

/// A native operation reported a non-success code
///
/// The reason is opaque to this layer; callers above usually fold it into a
/// boolean result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NativeError {
    /// The engine returned a non-zero status code
    #[error("native call `{call}` failed with status {status}")]
    Status { call: &'static str, status: i32 },

    /// The engine refused to attach a callback for this event type
    #[error("native engine rejected attach for {0:?}")]
    AttachRejected(EventType),

    /// The resource does not support the requested operation
    #[error("native call `{0}` is not supported for this resource")]
    Unsupported(&'static str),
}

impl NativeError {
    /// Map a C-style status code to a result (0 is success)
    pub fn check(call: &'static str, status: i32) -> Result<()> {
        if status == 0 {
            Ok(())
        } else {
            Err(NativeError::Status { call, status })
        }
    }
}

/// Result type for native engine calls
pub type Result<T> = std::result::Result<T, NativeError>;
