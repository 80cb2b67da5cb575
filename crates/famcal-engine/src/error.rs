//! Engine error types.

use std::io;
use thiserror::Error;

use famcal_backend::BackendError;
use famcal_core::{CoreError, EventId};

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur in the rescheduling engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The backend rejected or failed a mutation.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// A position or resize was invalid.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The conflict check failed and the policy is fail-closed.
    #[error("Conflict check for event {event_id} failed: {source}")]
    ConflictCheck {
        event_id: EventId,
        #[source]
        source: BackendError,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO error (configuration file).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl EngineError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a fail-closed conflict check error.
    pub fn conflict_check(event_id: EventId, source: BackendError) -> Self {
        Self::ConflictCheck { event_id, source }
    }

    /// Returns the backend error behind this error, if any.
    pub fn backend_error(&self) -> Option<&BackendError> {
        match self {
            Self::Backend(err) | Self::ConflictCheck { source: err, .. } => Some(err),
            _ => None,
        }
    }
}
