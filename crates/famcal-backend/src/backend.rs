//! The [`CalendarBackend`] trait.
//!
//! The backend is the source of truth for the family calendar. The
//! rescheduling flow needs exactly two things from it: a conflict check for a
//! candidate position, and a mutation that moves an event.

use std::future::Future;
use std::pin::Pin;

use famcal_core::EventId;
use famcal_protocol::{ConflictCheckRequest, ConflictCheckResponse, MutationRequest, UpdatedEvent};

use crate::error::{BackendError, BackendResult};

/// A boxed future for async trait methods.
///
/// Keeps [`CalendarBackend`] object-safe so engines can hold an
/// `Arc<dyn CalendarBackend>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The calendar backend seen by the rescheduling flow.
///
/// # Implementation Notes
///
/// - The conflict predicate is entirely the backend's; callers treat it as
///   opaque.
/// - `apply_mutation` must be atomic from the caller's point of view: either
///   the event moved and the stored event is returned, or an error is.
pub trait CalendarBackend: Send + Sync {
    /// Returns the name of this backend (e.g. "http").
    fn name(&self) -> &str;

    /// Asks whether `request`'s candidate position collides with other events.
    fn check_conflicts(
        &self,
        request: ConflictCheckRequest,
    ) -> BoxFuture<'_, BackendResult<ConflictCheckResponse>>;

    /// Moves `event_id` to the position described by `request`.
    fn apply_mutation(
        &self,
        event_id: EventId,
        request: MutationRequest,
    ) -> BoxFuture<'_, BackendResult<UpdatedEvent>>;
}

/// A backend that fails every call.
///
/// Stands in when the real backend could not be configured, and for
/// exercising failure paths.
#[derive(Debug)]
pub struct ErrorBackend {
    name: String,
    error: BackendError,
}

impl ErrorBackend {
    /// Creates a backend that always fails with a copy of `error`.
    pub fn new(name: impl Into<String>, error: BackendError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }

    fn failure(&self) -> BackendError {
        BackendError::new(self.error.code(), self.error.message()).with_backend(&self.name)
    }
}

impl CalendarBackend for ErrorBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn check_conflicts(
        &self,
        _request: ConflictCheckRequest,
    ) -> BoxFuture<'_, BackendResult<ConflictCheckResponse>> {
        let error = self.failure();
        Box::pin(async move { Err(error) })
    }

    fn apply_mutation(
        &self,
        _event_id: EventId,
        _request: MutationRequest,
    ) -> BoxFuture<'_, BackendResult<UpdatedEvent>> {
        let error = self.failure();
        Box::pin(async move { Err(error) })
    }
}
