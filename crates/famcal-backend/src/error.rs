//! Error types for backend operations.
//!
//! Every failure talking to the REST backend is a [`BackendError`] carrying a
//! [`BackendErrorCode`] for classification.

use std::fmt;
use thiserror::Error;

use famcal_protocol::ProtocolError;

/// The category of a backend error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendErrorCode {
    /// Connection failed, DNS resolution, reset.
    NetworkError,
    /// The request did not complete in time.
    Timeout,
    /// Missing or expired credentials (401).
    Unauthorized,
    /// Authenticated but not allowed (403).
    Forbidden,
    /// Event not found (404).
    NotFound,
    /// The backend refused the change because of a scheduling conflict (409).
    Conflict,
    /// Request was rejected as invalid (400, 422).
    BadRequest,
    /// Too many requests (429).
    RateLimited,
    /// Server error (5xx).
    ServerError,
    /// Response could not be understood.
    InvalidResponse,
    /// Missing or invalid client configuration.
    ConfigurationError,
    /// Unexpected client-side state.
    InternalError,
}

impl BackendErrorCode {
    /// Returns true if this error is transient and the call may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::Timeout | Self::RateLimited | Self::ServerError
        )
    }

    /// Returns a stable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "network_error",
            Self::Timeout => "timeout",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::BadRequest => "bad_request",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::ConfigurationError => "configuration_error",
            Self::InternalError => "internal_error",
        }
    }

    /// Maps an HTTP status code to an error code.
    ///
    /// Returns `None` for success statuses.
    pub fn from_http_status(status: u16) -> Option<Self> {
        let code = match status {
            200..=299 => return None,
            400 | 422 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            408 | 504 => Self::Timeout,
            409 => Self::Conflict,
            429 => Self::RateLimited,
            500..=599 => Self::ServerError,
            _ => Self::InvalidResponse,
        };
        Some(code)
    }
}

impl fmt::Display for BackendErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while talking to the calendar backend.
#[derive(Debug, Error)]
pub struct BackendError {
    code: BackendErrorCode,
    message: String,
    /// Name of the backend that failed (e.g. "http").
    backend: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl BackendError {
    /// Creates a new backend error with the given code and message.
    pub fn new(code: BackendErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            backend: None,
            source: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(BackendErrorCode::NetworkError, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(BackendErrorCode::Timeout, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(BackendErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(BackendErrorCode::Conflict, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(BackendErrorCode::ServerError, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(BackendErrorCode::InvalidResponse, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(BackendErrorCode::ConfigurationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(BackendErrorCode::InternalError, message)
    }

    /// Sets the backend name for this error.
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> BackendErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the backend name, if set.
    pub fn backend(&self) -> Option<&str> {
        self.backend.as_deref()
    }

    /// Returns true if this error is transient and may be retried.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref backend) = self.backend {
            write!(f, "[{}] ", backend)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<ProtocolError> for BackendError {
    fn from(err: ProtocolError) -> Self {
        Self::invalid_response(err.to_string()).with_source(err)
    }
}

/// A specialized Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_retryable() {
        assert!(BackendErrorCode::NetworkError.is_retryable());
        assert!(BackendErrorCode::Timeout.is_retryable());
        assert!(BackendErrorCode::ServerError.is_retryable());
        assert!(!BackendErrorCode::Conflict.is_retryable());
        assert!(!BackendErrorCode::NotFound.is_retryable());
    }

    #[test]
    fn http_status_mapping() {
        assert_eq!(BackendErrorCode::from_http_status(200), None);
        assert_eq!(BackendErrorCode::from_http_status(204), None);
        assert_eq!(
            BackendErrorCode::from_http_status(409),
            Some(BackendErrorCode::Conflict)
        );
        assert_eq!(
            BackendErrorCode::from_http_status(422),
            Some(BackendErrorCode::BadRequest)
        );
        assert_eq!(
            BackendErrorCode::from_http_status(503),
            Some(BackendErrorCode::ServerError)
        );
        assert_eq!(
            BackendErrorCode::from_http_status(302),
            Some(BackendErrorCode::InvalidResponse)
        );
    }

    #[test]
    fn display_includes_backend_and_code() {
        let err = BackendError::server("database unavailable").with_backend("http");
        let display = err.to_string();
        assert!(display.contains("[http]"));
        assert!(display.contains("server_error"));
        assert!(display.contains("database unavailable"));
    }

    #[test]
    fn protocol_errors_become_invalid_response() {
        use std::error::Error;
        let err: BackendError = ProtocolError::EmptyBody.into();
        assert_eq!(err.code(), BackendErrorCode::InvalidResponse);
        assert!(err.source().is_some());
    }
}
