//! The drop pipeline.
//!
//! ```text
//! DragSession ─▶ DropZoneRegistry ─▶ PositionResolver ─▶ ConflictChecker
//!   (gesture)        (gate)              (compute)        (validate, may wait
//!                                                           on the dialog)
//!                                                               │
//!        RealtimeNotifier ◀── OperationLog ◀── backend mutation ┘
//!           (fan out)           (record)
//! ```
//!
//! A [`Rescheduler`] owns one drag session, its drop zones, the undo/redo
//! history and the notice channel. Dropping it discards the history.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use famcal_backend::CalendarBackend;
use famcal_core::{
    CoreError, DragAffordance, DragOperation, DragSession, DraggedItem, DropZone, DropZoneRegistry,
    EventId, OperationType, Position, PositionResolver,
};
use famcal_protocol::MutationRequest;

use crate::config::EngineConfig;
use crate::conflict::{ConflictChecker, ConflictDecision, ConflictResolver};
use crate::error::EngineResult;
use crate::history::{HistoryStep, OperationLog};
use crate::notifier::{NoticeOrigin, RealtimeNotifier, RealtimeTransport, RescheduleNotice};

/// How a drop, copy or resize ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// No drag was in progress.
    NoActiveDrag,
    /// The zone does not accept the dragged item.
    Rejected,
    /// The item would land where it already is.
    Unchanged,
    /// The user cancelled on a conflict, or ran out of alternatives.
    Cancelled,
    /// The backend applied this operation.
    Committed(DragOperation),
}

impl DropOutcome {
    /// Returns the committed operation, if any.
    pub fn committed(&self) -> Option<&DragOperation> {
        match self {
            Self::Committed(op) => Some(op),
            _ => None,
        }
    }
}

/// Drag-and-drop rescheduling for one calendar view.
pub struct Rescheduler {
    session: DragSession,
    zones: Mutex<DropZoneRegistry>,
    backend: Arc<dyn CalendarBackend>,
    checker: ConflictChecker,
    resolver: Arc<dyn ConflictResolver>,
    history: OperationLog,
    notifier: RealtimeNotifier,
    max_reschedule_attempts: u32,
    min_resize: chrono::Duration,
}

impl std::fmt::Debug for Rescheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rescheduler")
            .field("session", &self.session)
            .field("backend", &self.backend.name())
            .field("checker", &self.checker)
            .field("history", &self.history)
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}

impl Rescheduler {
    /// Creates a rescheduler with default settings.
    pub fn new(backend: Arc<dyn CalendarBackend>, resolver: Arc<dyn ConflictResolver>) -> Self {
        Self::from_config(&EngineConfig::default(), backend, resolver)
    }

    /// Creates a rescheduler from loaded configuration.
    pub fn from_config(
        config: &EngineConfig,
        backend: Arc<dyn CalendarBackend>,
        resolver: Arc<dyn ConflictResolver>,
    ) -> Self {
        Self {
            session: DragSession::new(),
            zones: Mutex::new(DropZoneRegistry::new()),
            checker: ConflictChecker::new(Arc::clone(&backend), config.conflicts.policy),
            history: OperationLog::new(Arc::clone(&backend))
                .with_max_depth(config.history.max_depth),
            notifier: RealtimeNotifier::new(config.notifier.channel_capacity),
            backend,
            resolver,
            max_reschedule_attempts: config.conflicts.max_reschedule_attempts,
            min_resize: config.resize.min_duration(),
        }
    }

    /// Builder: forward notices to other clients through `transport`.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn RealtimeTransport>) -> Self {
        self.notifier = self.notifier.with_transport(transport);
        self
    }

    fn zones(&self) -> MutexGuard<'_, DropZoneRegistry> {
        self.zones.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the drop zones of the current view.
    pub fn set_zones(&self, registry: DropZoneRegistry) {
        *self.zones() = registry;
    }

    /// Returns the zones the active item may be dropped on.
    pub fn available_zones(&self) -> Vec<DropZone> {
        match self.session.active_item() {
            Some(item) => self.zones().zones_for(&item),
            None => Vec::new(),
        }
    }

    /// Finds a registered zone by id.
    pub fn zone(&self, id: &str) -> Option<DropZone> {
        self.zones().find(id).cloned()
    }

    /// Starts dragging `item`. Returns `false` if a drag is already active.
    pub fn begin_drag(&self, item: DraggedItem, source: Arc<dyn DragAffordance>) -> bool {
        self.session.start(item, source)
    }

    /// Abandons the current drag without touching the backend.
    pub fn cancel_drag(&self) -> Option<DraggedItem> {
        let item = self.session.end()?;
        debug!(event_id = %item.event_id(), "Drag cancelled");
        Some(item)
    }

    /// Returns where the active item would land on `zone`, without side
    /// effects.
    pub fn preview(&self, zone: &DropZone) -> Option<Position> {
        let item = self.session.active_item()?;
        DropZoneRegistry::is_valid_target(&item, zone)
            .then(|| PositionResolver::resolve(&item, zone))
    }

    /// Drops the active item on `zone`, moving it.
    ///
    /// The drag ends as soon as the drop is taken, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the mutation fails (nothing is recorded),
    /// or a conflict-check error under the fail-closed policy.
    pub async fn drop_on(&self, zone: &DropZone) -> EngineResult<DropOutcome> {
        self.drop_with(zone, OperationType::Move).await
    }

    /// Drops a copy of the active item on `zone`.
    ///
    /// # Errors
    ///
    /// Same as [`Rescheduler::drop_on`].
    pub async fn copy_to(&self, zone: &DropZone) -> EngineResult<DropOutcome> {
        self.drop_with(zone, OperationType::Copy).await
    }

    async fn drop_with(&self, zone: &DropZone, op_type: OperationType) -> EngineResult<DropOutcome> {
        let Some(item) = self.session.end() else {
            debug!(zone = %zone.id, "Drop without an active drag");
            return Ok(DropOutcome::NoActiveDrag);
        };

        if !DropZoneRegistry::is_valid_target(&item, zone) {
            debug!(
                event_id = %item.event_id(),
                kind = %item.kind(),
                zone = %zone.id,
                "Drop rejected by zone"
            );
            return Ok(DropOutcome::Rejected);
        }

        let candidate = PositionResolver::resolve(&item, zone);
        self.apply_change(op_type, item.event_id(), *item.original_position(), candidate)
            .await
    }

    /// Moves the end of `event_id` from `original.end` to `new_end`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidResize`] for a duration below the
    /// configured minimum, plus the errors of [`Rescheduler::drop_on`].
    pub async fn resize(
        &self,
        event_id: EventId,
        original: Position,
        new_end: DateTime<Utc>,
    ) -> EngineResult<DropOutcome> {
        let candidate = PositionResolver::resize(&original, new_end, self.min_resize)?;
        self.apply_change(OperationType::Resize, event_id, original, candidate)
            .await
    }

    /// Validates, applies, records and announces one change.
    async fn apply_change(
        &self,
        mut op_type: OperationType,
        event_id: EventId,
        from: Position,
        mut candidate: Position,
    ) -> EngineResult<DropOutcome> {
        let mut alternatives = 0;
        loop {
            if candidate == from {
                debug!(%event_id, "Position unchanged");
                return Ok(DropOutcome::Unchanged);
            }

            let report = self.checker.check(event_id, &candidate).await?;
            if report.is_clear() {
                break;
            }

            debug!(%event_id, count = report.conflicts.len(), "Waiting on conflict decision");
            match self.resolver.decide(event_id, candidate, report).await {
                ConflictDecision::Proceed => break,
                ConflictDecision::Cancel => {
                    info!(%event_id, "Drop cancelled on conflict");
                    return Ok(DropOutcome::Cancelled);
                }
                ConflictDecision::Reschedule(alternative) => {
                    alternatives += 1;
                    if alternatives > self.max_reschedule_attempts {
                        warn!(
                            %event_id,
                            attempts = alternatives,
                            "Too many alternative positions, cancelling"
                        );
                        return Ok(DropOutcome::Cancelled);
                    }
                    if alternative.end < alternative.start {
                        return Err(
                            CoreError::invalid_position(alternative.start, alternative.end).into()
                        );
                    }
                    op_type = OperationType::Reschedule;
                    candidate = alternative;
                }
            }
        }

        let op = DragOperation::new(op_type, event_id, from, candidate);
        self.backend
            .apply_mutation(event_id, MutationRequest::for_operation(&op))
            .await?;

        self.history.commit(op.clone());
        self.notifier
            .notify(RescheduleNotice::new(op.clone(), NoticeOrigin::Commit));
        info!(
            op_id = %op.id(),
            %event_id,
            op_type = %op.op_type(),
            start = %op.to_position().start,
            "Operation committed"
        );
        Ok(DropOutcome::Committed(op))
    }

    /// Reverts the most recent operation.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the history is left unchanged.
    pub async fn undo(&self) -> EngineResult<HistoryStep> {
        let step = self.history.undo().await?;
        if let HistoryStep::Applied(op) = &step {
            self.notifier
                .notify(RescheduleNotice::new(op.clone(), NoticeOrigin::Undo));
        }
        Ok(step)
    }

    /// Re-applies the most recently undone operation.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the history is left unchanged.
    pub async fn redo(&self) -> EngineResult<HistoryStep> {
        let step = self.history.redo().await?;
        if let HistoryStep::Applied(op) = &step {
            self.notifier
                .notify(RescheduleNotice::new(op.clone(), NoticeOrigin::Redo));
        }
        Ok(step)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Subscribes to notices of applied operations.
    pub fn subscribe(&self) -> broadcast::Receiver<RescheduleNotice> {
        self.notifier.subscribe()
    }

    /// Subscribes to the dragging flag.
    pub fn drag_state(&self) -> watch::Receiver<bool> {
        self.session.subscribe()
    }

    pub fn session(&self) -> &DragSession {
        &self.session
    }

    pub fn history(&self) -> &OperationLog {
        &self.history
    }
}
