//! Conflict validation of candidate positions.
//!
//! The backend owns the conflict predicate. The engine only asks, and when
//! something collides it suspends on a [`ConflictResolver`] (the confirmation
//! dialog) for a decision.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use famcal_backend::{BoxFuture, CalendarBackend};
use famcal_core::{EventId, Position};
use famcal_protocol::{ConflictCheckRequest, ConflictDescriptor};

use crate::error::{EngineError, EngineResult};

/// What to do when the conflict check itself fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Treat the failure as "no conflicts" and let the drop proceed.
    #[default]
    FailOpen,
    /// Abort the drop with [`EngineError::ConflictCheck`].
    FailClosed,
}

/// Outcome of a conflict check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictReport {
    /// Whether anything collides with the candidate.
    pub has_conflicts: bool,
    /// The colliding events, for display.
    pub conflicts: Vec<ConflictDescriptor>,
}

impl ConflictReport {
    /// A report with no conflicts.
    pub fn clear() -> Self {
        Self::default()
    }

    /// Returns true if nothing collides.
    pub fn is_clear(&self) -> bool {
        !self.has_conflicts
    }
}

/// The user's answer to a conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictDecision {
    /// Apply the candidate anyway.
    Proceed,
    /// Abort the drop.
    Cancel,
    /// Try this alternative position instead.
    Reschedule(Position),
}

/// Collaborator that asks the user how to handle a conflict.
///
/// The returned future may stay pending for as long as the dialog is open.
pub trait ConflictResolver: Send + Sync {
    /// Decides what to do about `report` for moving `event_id` to `candidate`.
    fn decide(
        &self,
        event_id: EventId,
        candidate: Position,
        report: ConflictReport,
    ) -> BoxFuture<'_, ConflictDecision>;
}

/// Resolver that always proceeds, for headless callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProceedOnConflict;

impl ConflictResolver for ProceedOnConflict {
    fn decide(
        &self,
        _event_id: EventId,
        _candidate: Position,
        _report: ConflictReport,
    ) -> BoxFuture<'_, ConflictDecision> {
        Box::pin(async { ConflictDecision::Proceed })
    }
}

/// Resolver that always cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct CancelOnConflict;

impl ConflictResolver for CancelOnConflict {
    fn decide(
        &self,
        _event_id: EventId,
        _candidate: Position,
        _report: ConflictReport,
    ) -> BoxFuture<'_, ConflictDecision> {
        Box::pin(async { ConflictDecision::Cancel })
    }
}

/// Asks the backend whether a candidate position collides with other events.
pub struct ConflictChecker {
    backend: Arc<dyn CalendarBackend>,
    policy: ConflictPolicy,
}

impl std::fmt::Debug for ConflictChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConflictChecker")
            .field("backend", &self.backend.name())
            .field("policy", &self.policy)
            .finish()
    }
}

impl ConflictChecker {
    /// Creates a checker with the given failure policy.
    pub fn new(backend: Arc<dyn CalendarBackend>, policy: ConflictPolicy) -> Self {
        Self { backend, policy }
    }

    /// Returns the failure policy.
    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Checks `candidate` for `event_id`.
    ///
    /// # Errors
    ///
    /// Only with [`ConflictPolicy::FailClosed`], when the backend call fails.
    pub async fn check(&self, event_id: EventId, candidate: &Position) -> EngineResult<ConflictReport> {
        let request = ConflictCheckRequest::new(event_id, candidate);
        match self.backend.check_conflicts(request).await {
            Ok(response) => {
                let report = ConflictReport {
                    has_conflicts: response.has_conflicts(),
                    conflicts: response.conflicts,
                };
                debug!(
                    %event_id,
                    has_conflicts = report.has_conflicts,
                    count = report.conflicts.len(),
                    "Conflict check completed"
                );
                Ok(report)
            }
            Err(err) => match self.policy {
                ConflictPolicy::FailOpen => {
                    warn!(%event_id, error = %err, "Conflict check failed, proceeding without it");
                    Ok(ConflictReport::clear())
                }
                ConflictPolicy::FailClosed => {
                    warn!(%event_id, error = %err, "Conflict check failed, aborting");
                    Err(EngineError::conflict_check(event_id, err))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use famcal_backend::{BackendError, BackendResult, ErrorBackend};
    use famcal_core::AssigneeId;
    use famcal_protocol::{ConflictCheckResponse, MutationRequest, UpdatedEvent};
    use std::sync::Mutex;

    fn utc(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, h, 0, 0).unwrap()
    }

    fn candidate() -> Position {
        Position::new(utc(14), utc(15)).unwrap().with_assignee(AssigneeId::new(7))
    }

    struct StubBackend {
        response: ConflictCheckResponse,
        requests: Mutex<Vec<ConflictCheckRequest>>,
    }

    impl CalendarBackend for StubBackend {
        fn name(&self) -> &str {
            "stub"
        }

        fn check_conflicts(
            &self,
            request: ConflictCheckRequest,
        ) -> BoxFuture<'_, BackendResult<ConflictCheckResponse>> {
            self.requests.lock().unwrap().push(request);
            let response = self.response.clone();
            Box::pin(async move { Ok(response) })
        }

        fn apply_mutation(
            &self,
            _event_id: EventId,
            _request: MutationRequest,
        ) -> BoxFuture<'_, BackendResult<UpdatedEvent>> {
            Box::pin(async { Err(BackendError::internal("not used")) })
        }
    }

    #[tokio::test]
    async fn reports_backend_conflicts() {
        let descriptor = ConflictDescriptor::new(EventId::new(99), &candidate()).with_title("Piano");
        let backend = Arc::new(StubBackend {
            response: ConflictCheckResponse::with_conflicts(vec![descriptor.clone()]),
            requests: Mutex::new(Vec::new()),
        });
        let checker = ConflictChecker::new(backend.clone(), ConflictPolicy::default());

        let report = checker.check(EventId::new(42), &candidate()).await.unwrap();
        assert!(report.has_conflicts);
        assert_eq!(report.conflicts, vec![descriptor]);

        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].event_id, EventId::new(42));
        assert_eq!(requests[0].candidate(), candidate());
    }

    #[tokio::test]
    async fn clear_response_is_clear() {
        let backend = Arc::new(StubBackend {
            response: ConflictCheckResponse::clear(),
            requests: Mutex::new(Vec::new()),
        });
        let checker = ConflictChecker::new(backend, ConflictPolicy::FailOpen);
        assert!(checker.check(EventId::new(1), &candidate()).await.unwrap().is_clear());
    }

    #[tokio::test]
    async fn fail_open_swallows_backend_failure() {
        let backend = Arc::new(ErrorBackend::new("down", BackendError::server("503")));
        let checker = ConflictChecker::new(backend, ConflictPolicy::FailOpen);

        let report = checker.check(EventId::new(42), &candidate()).await.unwrap();
        assert_eq!(report, ConflictReport::clear());
    }

    #[tokio::test]
    async fn fail_closed_surfaces_backend_failure() {
        let backend = Arc::new(ErrorBackend::new("down", BackendError::timeout("slow")));
        let checker = ConflictChecker::new(backend, ConflictPolicy::FailClosed);

        let err = checker.check(EventId::new(42), &candidate()).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::ConflictCheck { event_id, .. } if event_id == EventId::new(42)
        ));
    }

    #[tokio::test]
    async fn headless_resolvers() {
        let report = ConflictReport {
            has_conflicts: true,
            conflicts: Vec::new(),
        };
        assert_eq!(
            ProceedOnConflict
                .decide(EventId::new(1), candidate(), report.clone())
                .await,
            ConflictDecision::Proceed
        );
        assert_eq!(
            CancelOnConflict.decide(EventId::new(1), candidate(), report).await,
            ConflictDecision::Cancel
        );
    }

    #[test]
    fn policy_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: ConflictPolicy,
        }
        let parsed: Wrapper = toml::from_str(r#"policy = "fail_closed""#).unwrap();
        assert_eq!(parsed.policy, ConflictPolicy::FailClosed);
    }
}
