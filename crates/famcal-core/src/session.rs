//! Drag gesture state.
//!
//! A [`DragSession`] holds the item currently being dragged. At most one drag
//! is active per session, and every exit path (drop, cancel, a global
//! drag-end signal) goes through [`DragSession::end`], which is idempotent.
//!
//! The "is anything being dragged" flag is published on a
//! [`tokio::sync::watch`] channel so other components can decide whether to
//! render drop-zone affordances without reaching into the session.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, trace};

use crate::item::DraggedItem;

/// Visual feedback on the element a drag started from.
///
/// The element is owned by the caller; the session only toggles the
/// affordance on start and clears it on end.
pub trait DragAffordance: Send + Sync {
    /// Marks the source element as being dragged.
    fn apply(&self);

    /// Restores the source element.
    fn clear(&self);
}

/// An affordance that does nothing, for headless callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAffordance;

impl DragAffordance for NoAffordance {
    fn apply(&self) {}
    fn clear(&self) {}
}

struct ActiveDrag {
    item: DraggedItem,
    source: Arc<dyn DragAffordance>,
}

/// The state of one drag gesture.
pub struct DragSession {
    active: Mutex<Option<ActiveDrag>>,
    dragging: watch::Sender<bool>,
}

impl Default for DragSession {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DragSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragSession")
            .field("active_item", &self.active_item())
            .finish()
    }
}

impl DragSession {
    /// Creates an idle session.
    pub fn new() -> Self {
        let (dragging, _) = watch::channel(false);
        Self {
            active: Mutex::new(None),
            dragging,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<ActiveDrag>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts dragging `item` from `source`.
    ///
    /// Returns `false` without touching anything if a drag is already active.
    /// The affordance is applied under the session lock, so it must not call
    /// back into the session.
    pub fn start(&self, item: DraggedItem, source: Arc<dyn DragAffordance>) -> bool {
        let mut active = self.lock();
        if let Some(current) = active.as_ref() {
            debug!(
                active = %current.item.event_id(),
                ignored = %item.event_id(),
                "Drag already in progress"
            );
            return false;
        }
        trace!(event_id = %item.event_id(), kind = %item.kind(), "Drag started");
        source.apply();
        *active = Some(ActiveDrag { item, source });
        self.dragging.send_replace(true);
        true
    }

    /// Ends the current drag, returning the item that was being dragged.
    ///
    /// Safe to call when no drag is active.
    pub fn end(&self) -> Option<DraggedItem> {
        let mut active = self.lock();
        let ActiveDrag { item, source } = active.take()?;

        source.clear();
        self.dragging.send_replace(false);
        trace!(event_id = %item.event_id(), "Drag ended");
        Some(item)
    }

    /// Returns a copy of the item being dragged, if any.
    pub fn active_item(&self) -> Option<DraggedItem> {
        self.lock().as_ref().map(|drag| drag.item.clone())
    }

    /// Returns true while a drag is active.
    pub fn is_active(&self) -> bool {
        self.lock().is_some()
    }

    /// Subscribes to the dragging flag.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.dragging.subscribe()
    }
}
