//! Core error types.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while building or transforming calendar positions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A position whose end precedes its start.
    #[error("invalid position: end {end} is before start {start}")]
    InvalidPosition {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A resize that would shrink the event below the minimum duration.
    #[error("invalid resize: duration {requested_minutes}m is below the minimum of {minimum_minutes}m")]
    InvalidResize {
        requested_minutes: i64,
        minimum_minutes: i64,
    },

    /// A time grid whose bounds or slot length cannot produce any slot.
    #[error("invalid time grid: {message}")]
    InvalidGrid { message: String },
}

impl CoreError {
    /// Creates an invalid position error.
    pub fn invalid_position(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::InvalidPosition { start, end }
    }

    /// Creates an invalid resize error from the requested and minimum durations.
    pub fn invalid_resize(requested: Duration, minimum: Duration) -> Self {
        Self::InvalidResize {
            requested_minutes: requested.num_minutes(),
            minimum_minutes: minimum.num_minutes(),
        }
    }

    /// Creates an invalid grid error.
    pub fn invalid_grid(message: impl Into<String>) -> Self {
        Self::InvalidGrid {
            message: message.into(),
        }
    }
}
