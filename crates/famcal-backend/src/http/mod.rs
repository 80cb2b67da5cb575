//! REST implementation of [`CalendarBackend`](crate::CalendarBackend).
//!
//! Endpoints, relative to the configured base URL:
//!
//! - conflict check: `POST calendar/events/{id}/conflicts`
//! - event mutation: `PATCH calendar/events/{id}`

mod client;
mod config;

pub use client::HttpBackend;
pub use config::HttpBackendConfig;
