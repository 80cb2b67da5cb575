//! Request and response bodies for the rescheduling endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use famcal_core::{AssigneeId, DragOperation, EventId, OperationId, OperationType, Position};

use crate::error::{ProtocolError, ProtocolResult};

/// Body of a conflict-check call for one candidate position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictCheckRequest {
    /// Event being moved.
    pub event_id: EventId,
    /// Candidate start.
    pub new_start_time: DateTime<Utc>,
    /// Candidate end.
    pub new_end_time: DateTime<Utc>,
    /// Candidate assignee; `null` keeps the event unassigned.
    pub assignee_id: Option<AssigneeId>,
}

impl ConflictCheckRequest {
    /// Creates a request for moving `event_id` to `candidate`.
    pub fn new(event_id: EventId, candidate: &Position) -> Self {
        Self {
            event_id,
            new_start_time: candidate.start,
            new_end_time: candidate.end,
            assignee_id: candidate.assignee_id,
        }
    }

    /// Returns the candidate as a position.
    pub fn candidate(&self) -> Position {
        Position {
            start: self.new_start_time,
            end: self.new_end_time,
            assignee_id: self.assignee_id,
        }
    }
}

/// An existing event the candidate position collides with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictDescriptor {
    /// The conflicting event.
    pub event_id: EventId,
    /// Its title, for the confirmation dialog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Start of the conflicting event.
    pub start_time: DateTime<Utc>,
    /// End of the conflicting event.
    pub end_time: DateTime<Utc>,
    /// Member who is double-booked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<AssigneeId>,
}

impl ConflictDescriptor {
    /// Creates a descriptor for an untitled conflicting event.
    pub fn new(event_id: EventId, position: &Position) -> Self {
        Self {
            event_id,
            title: None,
            start_time: position.start,
            end_time: position.end,
            assignee_id: position.assignee_id,
        }
    }

    /// Builder: set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Result of a conflict check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictCheckResponse {
    /// Whether the backend found any conflict.
    pub has_conflicts: bool,
    /// The conflicts found.
    #[serde(default)]
    pub conflicts: Vec<ConflictDescriptor>,
}

impl ConflictCheckResponse {
    /// A response with no conflicts.
    pub fn clear() -> Self {
        Self::default()
    }

    /// A response listing `conflicts`.
    pub fn with_conflicts(conflicts: Vec<ConflictDescriptor>) -> Self {
        Self {
            has_conflicts: !conflicts.is_empty(),
            conflicts,
        }
    }

    /// Returns true if the backend flagged a conflict or listed any.
    pub fn has_conflicts(&self) -> bool {
        self.has_conflicts || !self.conflicts.is_empty()
    }
}

/// Body of an event-mutation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationRequest {
    /// New start.
    pub start_time: DateTime<Utc>,
    /// New end.
    pub end_time: DateTime<Utc>,
    /// New assignee; `null` clears the assignment.
    pub assignee_id: Option<AssigneeId>,
    /// Kind of change.
    pub operation_type: OperationType,
    /// Client-generated id of the change.
    pub operation_id: OperationId,
}

impl MutationRequest {
    /// Builds the mutation that applies `op` (moves the event to its target).
    pub fn for_operation(op: &DragOperation) -> Self {
        let target = op.to_position();
        Self {
            start_time: target.start,
            end_time: target.end,
            assignee_id: target.assignee_id,
            operation_type: op.op_type(),
            operation_id: op.id(),
        }
    }

    /// Returns the target as a position.
    pub fn target(&self) -> Position {
        Position {
            start: self.start_time,
            end: self.end_time,
            assignee_id: self.assignee_id,
        }
    }
}

/// The event as stored by the backend after a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedEvent {
    /// Event id.
    pub id: EventId,
    /// Stored start.
    pub start_time: DateTime<Utc>,
    /// Stored end.
    pub end_time: DateTime<Utc>,
    /// Stored assignee.
    #[serde(default)]
    pub assignee_id: Option<AssigneeId>,
    /// Event title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl UpdatedEvent {
    /// Returns the stored position.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidPayload`] if the backend sent an end
    /// before the start.
    pub fn position(&self) -> ProtocolResult<Position> {
        Position::new(self.start_time, self.end_time)
            .map(|p| p.with_assignee_id(self.assignee_id))
            .map_err(|e| ProtocolError::invalid_payload(e.to_string()))
    }
}

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message.
    #[serde(alias = "error")]
    pub message: String,
    /// Machine-readable code, if the backend provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorBody {
    /// Creates an error body without a code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }
}
