//! Committed reschedule operations, the unit of undo and redo.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::item::EventId;
use crate::time::Position;

/// Client-generated, time-ordered operation identifier (UUIDv7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(Uuid);

impl OperationId {
    /// Generates a fresh identifier from the current time.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wraps an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of change an operation made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    /// Moved in time and/or to another member.
    Move,
    /// End time changed.
    Resize,
    /// Copied to a new position.
    Copy,
    /// Moved to an alternative position after a conflict.
    Reschedule,
}

impl OperationType {
    /// Returns the wire name of this operation type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Resize => "resize",
            Self::Copy => "copy",
            Self::Reschedule => "reschedule",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reschedule that has been applied to the backend.
///
/// Operations are immutable; undoing one produces a new operation through
/// [`DragOperation::reversed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragOperation {
    id: OperationId,
    #[serde(rename = "type")]
    op_type: OperationType,
    event_id: EventId,
    from_position: Position,
    to_position: Position,
    timestamp: DateTime<Utc>,
}

impl DragOperation {
    /// Creates an operation with a fresh id stamped with the current time.
    pub fn new(op_type: OperationType, event_id: EventId, from: Position, to: Position) -> Self {
        Self {
            id: OperationId::generate(),
            op_type,
            event_id,
            from_position: from,
            to_position: to,
            timestamp: Utc::now(),
        }
    }

    /// Reassembles an operation from stored parts.
    pub fn from_parts(
        id: OperationId,
        op_type: OperationType,
        event_id: EventId,
        from: Position,
        to: Position,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            op_type,
            event_id,
            from_position: from,
            to_position: to,
            timestamp,
        }
    }

    /// Returns the inverse operation: positions swapped, fresh id and timestamp.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self::new(
            self.op_type,
            self.event_id,
            self.to_position,
            self.from_position,
        )
    }

    /// Returns the same change under a fresh id and timestamp, for re-applying
    /// an undone operation.
    #[must_use]
    pub fn replayed(&self) -> Self {
        Self::new(
            self.op_type,
            self.event_id,
            self.from_position,
            self.to_position,
        )
    }

    pub fn id(&self) -> OperationId {
        self.id
    }

    pub fn op_type(&self) -> OperationType {
        self.op_type
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    pub fn from_position(&self) -> &Position {
        &self.from_position
    }

    pub fn to_position(&self) -> &Position {
        &self.to_position
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
