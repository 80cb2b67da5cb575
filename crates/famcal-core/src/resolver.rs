//! Candidate position computation.
//!
//! The resolver is deterministic and side-effect free, so it can be called
//! while hovering to render previews before anything is committed.

use chrono::{DateTime, Duration, Utc};

use crate::error::{CoreError, CoreResult};
use crate::item::DraggedItem;
use crate::time::Position;
use crate::zone::DropZone;

/// Computes where a dropped item lands.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionResolver;

impl PositionResolver {
    /// Resolves the position `item` takes when dropped on `zone`.
    ///
    /// The original duration is preserved exactly. A zone without a target
    /// time keeps the original start and end, and a zone without a target
    /// assignee keeps the original assignee.
    pub fn resolve(item: &DraggedItem, zone: &DropZone) -> Position {
        let original = item.original_position();
        let moved = match zone.target_time {
            Some(target) => original.starting_at(target),
            None => *original,
        };
        moved.with_assignee_id(zone.target_assignee_id.or(original.assignee_id))
    }

    /// Moves the end of `original` to `new_end`, keeping start and assignee.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidResize`] if the resulting duration is
    /// shorter than `min_duration`.
    pub fn resize(
        original: &Position,
        new_end: DateTime<Utc>,
        min_duration: Duration,
    ) -> CoreResult<Position> {
        let requested = new_end - original.start;
        if requested < min_duration || requested <= Duration::zero() {
            return Err(CoreError::invalid_resize(requested, min_duration));
        }
        Ok(Position {
            start: original.start,
            end: new_end,
            assignee_id: original.assignee_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{AssigneeId, EventId, ItemKind};
    use crate::zone::ZoneKind;
    use chrono::TimeZone;

    fn utc(h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, h, min, 0).unwrap()
    }

    fn event_42() -> DraggedItem {
        DraggedItem::event(EventId::new(42), Position::new(utc(9, 0), utc(10, 0)).unwrap())
    }

    #[test]
    fn simple_move_onto_time_slot() {
        let zone = DropZone::time_slot("slot-14", utc(14, 0));
        let resolved = PositionResolver::resolve(&event_42(), &zone);

        assert_eq!(resolved.start, utc(14, 0));
        assert_eq!(resolved.end, utc(15, 0));
        assert!(resolved.assignee_id.is_none());
    }

    #[test]
    fn reassignment_keeps_time() {
        let zone = DropZone::member_column("member-7", AssigneeId::new(7));
        let resolved = PositionResolver::resolve(&event_42(), &zone);

        assert_eq!(resolved.start, utc(9, 0));
        assert_eq!(resolved.end, utc(10, 0));
        assert_eq!(resolved.assignee_id, Some(AssigneeId::new(7)));
    }

    #[test]
    fn duration_is_preserved_for_every_target() {
        let start = utc(9, 0);
        let end = start + Duration::milliseconds(5_400_999);
        let item = DraggedItem::new(
            EventId::new(1),
            ItemKind::TimeSlot,
            Position::new(start, end).unwrap(),
        );

        for minutes in [0, 15, 90, 600, 1439] {
            let zone = DropZone::time_slot("slot", utc(0, 0) + Duration::minutes(minutes));
            let resolved = PositionResolver::resolve(&item, &zone);
            assert_eq!(resolved.duration(), item.original_position().duration());
        }
    }

    #[test]
    fn original_assignee_kept_without_target() {
        let original = Position::new(utc(9, 0), utc(10, 0))
            .unwrap()
            .with_assignee(AssigneeId::new(3));
        let item = DraggedItem::event(EventId::new(5), original);
        let zone = DropZone::time_slot("slot", utc(11, 0));

        let resolved = PositionResolver::resolve(&item, &zone);
        assert_eq!(resolved.assignee_id, Some(AssigneeId::new(3)));
    }

    #[test]
    fn zone_with_both_targets_moves_and_reassigns() {
        let zone = DropZone::new("cell", ZoneKind::TimeSlot)
            .with_target_time(utc(16, 30))
            .with_target_assignee(AssigneeId::new(9));
        let resolved = PositionResolver::resolve(&event_42(), &zone);

        assert_eq!(resolved.start, utc(16, 30));
        assert_eq!(resolved.end, utc(17, 30));
        assert_eq!(resolved.assignee_id, Some(AssigneeId::new(9)));
    }

    #[test]
    fn resize_moves_end_only() {
        let original = Position::new(utc(9, 0), utc(10, 0))
            .unwrap()
            .with_assignee(AssigneeId::new(2));
        let resized = PositionResolver::resize(&original, utc(11, 15), Duration::minutes(15)).unwrap();

        assert_eq!(resized.start, utc(9, 0));
        assert_eq!(resized.end, utc(11, 15));
        assert_eq!(resized.assignee_id, Some(AssigneeId::new(2)));
    }

    #[test]
    fn resize_below_minimum_is_rejected() {
        let original = Position::new(utc(9, 0), utc(10, 0)).unwrap();
        let err = PositionResolver::resize(&original, utc(9, 10), Duration::minutes(15)).unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidResize {
                requested_minutes: 10,
                minimum_minutes: 15
            }
        );

        assert!(PositionResolver::resize(&original, utc(8, 0), Duration::zero()).is_err());
    }
}
