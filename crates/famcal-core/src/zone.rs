//! Drop zones and the registry that gates drops.
//!
//! A [`DropZone`] is a surface of the calendar that can receive a dragged
//! item. The [`DropZoneRegistry`] holds the zones of the current view and
//! answers which of them accept the item in flight.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{CoreError, CoreResult};
use crate::item::{AssigneeId, DraggedItem, ItemKind};

/// The kind of surface a zone represents.
///
/// Declaration order is the order zones are offered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ZoneKind {
    /// A time slot in a day or week grid.
    TimeSlot,
    /// A whole day cell in a month view.
    Day,
    /// A family member's column.
    MemberColumn,
}

impl ZoneKind {
    /// Item kinds a zone of this kind accepts unless told otherwise.
    pub fn default_accepted_kinds(&self) -> BTreeSet<ItemKind> {
        match self {
            Self::TimeSlot => [ItemKind::Event, ItemKind::TimeSlot].into(),
            Self::Day | Self::MemberColumn => [ItemKind::Event, ItemKind::AvailabilityBlock].into(),
        }
    }
}

/// A candidate drop target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropZone {
    /// Identifier of the zone within the current view.
    pub id: String,
    /// The surface kind.
    pub kind: ZoneKind,
    /// Item kinds this zone accepts.
    pub accepted_kinds: BTreeSet<ItemKind>,
    /// Start time an item dropped here moves to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_time: Option<DateTime<Utc>>,
    /// Member an item dropped here is reassigned to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_assignee_id: Option<AssigneeId>,
}

impl DropZone {
    /// Creates a zone with the default accepted kinds for `kind` and no targets.
    pub fn new(id: impl Into<String>, kind: ZoneKind) -> Self {
        Self {
            id: id.into(),
            kind,
            accepted_kinds: kind.default_accepted_kinds(),
            target_time: None,
            target_assignee_id: None,
        }
    }

    /// Creates a time-slot zone starting at `target_time`.
    pub fn time_slot(id: impl Into<String>, target_time: DateTime<Utc>) -> Self {
        Self::new(id, ZoneKind::TimeSlot).with_target_time(target_time)
    }

    /// Creates a day zone whose drops start at `target_time`.
    pub fn day(id: impl Into<String>, target_time: DateTime<Utc>) -> Self {
        Self::new(id, ZoneKind::Day).with_target_time(target_time)
    }

    /// Creates a member column that reassigns without changing time.
    pub fn member_column(id: impl Into<String>, assignee_id: AssigneeId) -> Self {
        Self::new(id, ZoneKind::MemberColumn).with_target_assignee(assignee_id)
    }

    /// Builder: set the target start time.
    #[must_use]
    pub fn with_target_time(mut self, target_time: DateTime<Utc>) -> Self {
        self.target_time = Some(target_time);
        self
    }

    /// Builder: set the target assignee.
    #[must_use]
    pub fn with_target_assignee(mut self, assignee_id: AssigneeId) -> Self {
        self.target_assignee_id = Some(assignee_id);
        self
    }

    /// Builder: replace the accepted item kinds.
    #[must_use]
    pub fn with_accepted_kinds(mut self, kinds: impl IntoIterator<Item = ItemKind>) -> Self {
        self.accepted_kinds = kinds.into_iter().collect();
        self
    }

    /// Returns true if items of `kind` may be dropped here.
    pub fn accepts(&self, kind: ItemKind) -> bool {
        self.accepted_kinds.contains(&kind)
    }
}

/// The drop zones of the current calendar view.
#[derive(Debug, Clone, Default)]
pub struct DropZoneRegistry {
    zones: Vec<DropZone>,
}

impl DropZoneRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a zone, replacing any zone with the same id.
    pub fn register(&mut self, zone: DropZone) {
        if let Some(existing) = self.zones.iter_mut().find(|z| z.id == zone.id) {
            trace!(zone = %zone.id, "Replacing drop zone");
            *existing = zone;
        } else {
            self.zones.push(zone);
        }
    }

    /// Registers one time-slot zone per `slot` between `day_start` and `day_end`
    /// on `date` (UTC). Returns the number of zones registered.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidGrid`] if the slot length is not positive or
    /// the day bounds are empty.
    pub fn time_grid(
        &mut self,
        date: NaiveDate,
        day_start: NaiveTime,
        day_end: NaiveTime,
        slot: Duration,
    ) -> CoreResult<usize> {
        if slot <= Duration::zero() {
            return Err(CoreError::invalid_grid("slot length must be positive"));
        }
        if day_end <= day_start {
            return Err(CoreError::invalid_grid(format!(
                "day end {} is not after day start {}",
                day_end, day_start
            )));
        }

        let end = date.and_time(day_end).and_utc();
        let mut cursor = date.and_time(day_start).and_utc();
        let mut count = 0;
        while cursor < end {
            let id = format!("slot-{}", cursor.format("%Y-%m-%dT%H:%M"));
            self.register(DropZone::time_slot(id, cursor));
            cursor += slot;
            count += 1;
        }

        debug!(%date, count, "Registered time grid");
        Ok(count)
    }

    /// Registers one member-column zone per assignee.
    pub fn member_columns(&mut self, assignees: impl IntoIterator<Item = AssigneeId>) {
        for assignee in assignees {
            self.register(DropZone::member_column(format!("member-{}", assignee), assignee));
        }
    }

    /// Looks up a zone by id.
    pub fn find(&self, id: &str) -> Option<&DropZone> {
        self.zones.iter().find(|z| z.id == id)
    }

    /// Returns the zones willing to accept `item`.
    ///
    /// Zones are ordered by kind (time slots, days, member columns) and then by
    /// registration order. The result depends only on the item's kind.
    pub fn zones_for(&self, item: &DraggedItem) -> Vec<DropZone> {
        let mut zones: Vec<DropZone> = self
            .zones
            .iter()
            .filter(|zone| Self::is_valid_target(item, zone))
            .cloned()
            .collect();
        zones.sort_by_key(|zone| zone.kind);
        zones
    }

    /// Returns true iff `zone` accepts the kind of `item`.
    pub fn is_valid_target(item: &DraggedItem, zone: &DropZone) -> bool {
        zone.accepts(item.kind())
    }

    /// Returns the number of registered zones.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Returns true if no zone is registered.
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Removes every zone, typically when the view changes.
    pub fn clear(&mut self) {
        self.zones.clear();
    }
}
