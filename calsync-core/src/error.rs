//! Error types for calsync.

use thiserror::Error;

use crate::diff::DiffKind;

/// Errors that can occur during a sync pass.
///
/// Every variant aborts the pass it occurs in. [`SyncError::class`] tells
/// which statistics counter it belongs to.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Batch rejected while applying {kind:?} operations: {reason}")]
    BatchRejected { kind: DiffKind, reason: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Malformed event data: record #{position} has an invalid `{field}`")]
    MalformedEventData { position: usize, field: &'static str },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Statistics counter an error is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Io,
    Parse,
    Auth,
    Store,
}

impl SyncError {
    pub fn class(&self) -> ErrorClass {
        match self {
            SyncError::Transport(_) | SyncError::Io(_) => ErrorClass::Io,
            SyncError::MalformedPayload(_) | SyncError::MalformedEventData { .. } => {
                ErrorClass::Parse
            }
            SyncError::Auth(_) => ErrorClass::Auth,
            SyncError::StoreUnavailable(_)
            | SyncError::BatchRejected { .. }
            | SyncError::Config(_) => ErrorClass::Store,
        }
    }
}

impl From<sqlx::Error> for SyncError {
    fn from(e: sqlx::Error) -> Self {
        SyncError::StoreUnavailable(e.to_string())
    }
}

/// Result type alias for calsync operations.
pub type SyncResult<T> = Result<T, SyncError>;
