//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while encoding or decoding payloads.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Body exceeds the maximum accepted size.
    #[error("body too large: {size} bytes (max: {max})")]
    BodyTooLarge { size: usize, max: usize },

    /// JSON encoding or decoding failed.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Empty body where a payload was expected.
    #[error("empty body")]
    EmptyBody,

    /// Payload parsed but violates an invariant.
    #[error("invalid payload: {message}")]
    InvalidPayload { message: String },
}

impl ProtocolError {
    /// Creates an invalid payload error.
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            message: message.into(),
        }
    }
}
