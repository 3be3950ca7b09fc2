//! Unified error types for the user import service.
//!
//! Error codes:
//! - VALID_001: Invalid upload input
//! - STORAGE_001: Upload could not be persisted
//! - NOT_FOUND_001: File or record does not exist
//! - QUEUE_001: Event queue is closed
//! - WORKER_001: Invalid worker lifecycle transition
//! - INTERNAL_001: Anything else

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the user import service.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller supplied something unusable (empty payload, bad filename).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The upload could not be written or verified on disk.
    #[error("storage failure: {0}")]
    StorageFailure(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("event queue is closed")]
    QueueClosed,

    #[error("worker state error: {0}")]
    WorkerState(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn storage_failure(msg: impl Into<String>) -> Self {
        Self::StorageFailure(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn worker_state(msg: impl Into<String>) -> Self {
        Self::WorkerState(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::NotFound(_) => 404,
            Self::QueueClosed => 503,
            Self::WorkerState(_) => 409,
            Self::StorageFailure(_) | Self::Io(_) | Self::Internal(_) => 500,
        }
    }

    /// Get the stable error code string.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "VALID_001",
            Self::StorageFailure(_) => "STORAGE_001",
            Self::NotFound(_) => "NOT_FOUND_001",
            Self::QueueClosed => "QUEUE_001",
            Self::WorkerState(_) => "WORKER_001",
            Self::Io(_) | Self::Internal(_) => "INTERNAL_001",
        }
    }
}
