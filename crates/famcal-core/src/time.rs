//! Calendar positions.
//!
//! A [`Position`] is where an event sits on the family calendar: a UTC time
//! range plus the member it is assigned to. Positions are compared and
//! shifted with millisecond precision, which is the precision the backend
//! stores.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::item::AssigneeId;

/// Where an event sits on the calendar.
///
/// Represents the half-open interval `[start, end)` in UTC together with an
/// optional assignee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Start of the event (inclusive).
    pub start: DateTime<Utc>,
    /// End of the event (exclusive).
    pub end: DateTime<Utc>,
    /// Family member the event is assigned to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<AssigneeId>,
}

impl Position {
    /// Creates an unassigned position.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPosition`] if `end` is before `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> CoreResult<Self> {
        if end < start {
            return Err(CoreError::invalid_position(start, end));
        }
        Ok(Self {
            start,
            end,
            assignee_id: None,
        })
    }

    /// Creates a position from a start time and a duration.
    ///
    /// Negative durations are clamped to zero.
    pub fn from_duration(start: DateTime<Utc>, duration: Duration) -> Self {
        let duration = duration.max(Duration::zero());
        Self {
            start,
            end: start + duration,
            assignee_id: None,
        }
    }

    /// Builder: assign the position to a member.
    #[must_use]
    pub fn with_assignee(mut self, assignee_id: AssigneeId) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    /// Builder: replace the assignee, including clearing it.
    #[must_use]
    pub fn with_assignee_id(mut self, assignee_id: Option<AssigneeId>) -> Self {
        self.assignee_id = assignee_id;
        self
    }

    /// Returns the duration of this position.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Returns the same duration and assignee starting at `start`.
    #[must_use]
    pub fn starting_at(&self, start: DateTime<Utc>) -> Self {
        Self {
            start,
            end: start + self.duration(),
            assignee_id: self.assignee_id,
        }
    }

    /// Returns true if both positions cover the same time range, ignoring
    /// the assignee.
    pub fn same_time_as(&self, other: &Position) -> bool {
        self.start == other.start && self.end == other.end
    }

    /// Checks if a datetime falls within this position.
    ///
    /// Uses half-open interval semantics: `[start, end)`.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt < self.end
    }

    /// Checks if two positions overlap in time.
    ///
    /// Touching ranges (one ends exactly when the other starts) do not overlap.
    pub fn overlaps(&self, other: &Position) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, h, min, 0).unwrap()
    }

    #[test]
    fn creation() {
        let pos = Position::new(utc(9, 0), utc(10, 0)).unwrap();
        assert_eq!(pos.duration(), Duration::hours(1));
        assert!(pos.assignee_id.is_none());
    }

    #[test]
    fn end_before_start_is_rejected() {
        let err = Position::new(utc(10, 0), utc(9, 0)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidPosition { .. }));
    }

    #[test]
    fn zero_length_is_allowed() {
        let pos = Position::new(utc(9, 0), utc(9, 0)).unwrap();
        assert_eq!(pos.duration(), Duration::zero());
    }

    #[test]
    fn from_duration_clamps_negative() {
        let pos = Position::from_duration(utc(9, 0), Duration::minutes(-5));
        assert_eq!(pos.end, utc(9, 0));
    }

    #[test]
    fn starting_at_keeps_duration_to_the_millisecond() {
        let start = utc(9, 0);
        let end = start + Duration::milliseconds(3_600_123);
        let pos = Position::new(start, end).unwrap().with_assignee(AssigneeId::new(3));

        let moved = pos.starting_at(utc(14, 0));
        assert_eq!(moved.duration(), Duration::milliseconds(3_600_123));
        assert_eq!(moved.assignee_id, Some(AssigneeId::new(3)));
    }

    #[test]
    fn same_time_ignores_assignee() {
        let a = Position::new(utc(9, 0), utc(10, 0)).unwrap().with_assignee(AssigneeId::new(1));
        let b = Position::new(utc(9, 0), utc(10, 0)).unwrap().with_assignee(AssigneeId::new(2));
        assert!(a.same_time_as(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn overlap_semantics() {
        let base = Position::new(utc(9, 0), utc(10, 0)).unwrap();

        let inside = Position::new(utc(9, 15), utc(9, 45)).unwrap();
        assert!(base.overlaps(&inside));

        let straddling = Position::new(utc(9, 30), utc(10, 30)).unwrap();
        assert!(base.overlaps(&straddling));

        let touching = Position::new(utc(10, 0), utc(11, 0)).unwrap();
        assert!(!base.overlaps(&touching));

        assert!(base.contains(utc(9, 0)));
        assert!(!base.contains(utc(10, 0)));
    }

    #[test]
    fn serde_uses_camel_case_and_omits_missing_assignee() {
        let pos = Position::new(utc(9, 0), utc(10, 0)).unwrap();
        let json = serde_json::to_value(pos).unwrap();
        assert!(json.get("assigneeId").is_none());

        let json = serde_json::to_value(pos.with_assignee(AssigneeId::new(7))).unwrap();
        assert_eq!(json["assigneeId"], 7);
    }
}
