//! Calendar backend access for the rescheduling flow.
//!
//! - [`CalendarBackend`] - the trait the engine talks to
//! - [`HttpBackend`] - JSON-over-HTTP implementation (feature `http`, on by default)
//! - [`ErrorBackend`] - a backend that fails every call
//! - [`BackendError`] - error type with a [`BackendErrorCode`] classification
//!
//! # Example
//!
//! ```ignore
//! use famcal_backend::{CalendarBackend, HttpBackend, HttpBackendConfig};
//!
//! let config = HttpBackendConfig::new("https://family.example.com/api")?
//!     .with_auth_token(token);
//! let backend = HttpBackend::new(config)?;
//! let response = backend.check_conflicts(request).await?;
//! ```

mod backend;
mod error;
#[cfg(feature = "http")]
pub mod http;

pub use backend::{BoxFuture, CalendarBackend, ErrorBackend};
pub use error::{BackendError, BackendErrorCode, BackendResult};
#[cfg(feature = "http")]
pub use http::{HttpBackend, HttpBackendConfig};
