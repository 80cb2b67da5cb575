//! Identifiers and the item being dragged.
//!
//! - [`EventId`] / [`AssigneeId`]: backend identifiers for calendar events and
//!   family members
//! - [`ItemKind`]: what sort of calendar entity is being moved
//! - [`DraggedItem`]: the entity in flight plus its position at drag start

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time::Position;

/// Identifier of a calendar event, unique per family calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(u64);

impl EventId {
    /// Wraps a raw backend identifier.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for EventId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a family member an event can be assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssigneeId(u64);

impl AssigneeId {
    /// Wraps a raw backend identifier.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for AssigneeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for AssigneeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of calendar entity being dragged.
///
/// Drop zones declare which kinds they accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    /// A regular calendar event.
    Event,
    /// A reserved time slot.
    TimeSlot,
    /// A block of member availability.
    AvailabilityBlock,
}

impl ItemKind {
    /// Returns the wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::TimeSlot => "timeSlot",
            Self::AvailabilityBlock => "availabilityBlock",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The calendar entity currently being moved.
///
/// The original position is captured when the drag starts and cannot be
/// changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraggedItem {
    event_id: EventId,
    kind: ItemKind,
    original_position: Position,
}

impl DraggedItem {
    /// Snapshots an item at drag start.
    pub fn new(event_id: EventId, kind: ItemKind, original_position: Position) -> Self {
        Self {
            event_id,
            kind,
            original_position,
        }
    }

    /// Shorthand for dragging a regular event.
    pub fn event(event_id: EventId, original_position: Position) -> Self {
        Self::new(event_id, ItemKind::Event, original_position)
    }

    /// Returns the underlying event identifier.
    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    /// Returns the kind of item.
    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Returns the position captured at drag start.
    pub fn original_position(&self) -> &Position {
        &self.original_position
    }
}
