//! Error types for the event hub.

use thiserror::Error;

/// Main error type for hub operations.
///
/// Dispatch failures never reach the emitting caller; they are built so the
/// hub can hand a single value to its logger.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Subscriber of '{event}' expects {expected} data type, but the emitted data is {actual}")]
    TypeMismatch {
        event: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Subscriber of '{event}' panicked: {message}")]
    CallbackPanicked { event: String, message: String },

    #[error("Main context is not running, cannot deliver '{0}'")]
    MainContextUnavailable(String),

    #[error("Event hub is shut down")]
    ShutDown,

    #[error("Failed to spawn dispatch thread: {0}")]
    WorkerSpawn(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for HubError {
    fn from(e: serde_json::Error) -> Self {
        HubError::InvalidConfig(e.to_string())
    }
}

/// Result type for hub operations.
pub type Result<T> = std::result::Result<T, HubError>;
