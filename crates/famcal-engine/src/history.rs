//! Undo/redo history of committed operations.
//!
//! The log keeps two LIFO stacks. Undo and redo are backend mutations, so at
//! most one of them runs at a time: a call made while another is in flight
//! returns [`HistoryStep::Busy`] and is not queued.
//!
//! Stack state sits behind a `std::sync::Mutex` that is never held across an
//! `.await`; the processing flag is released by a guard, so a failed or
//! dropped undo/redo never leaves the log stuck.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use famcal_backend::CalendarBackend;
use famcal_core::DragOperation;
use famcal_protocol::{MutationRequest, UpdatedEvent};

use crate::error::EngineResult;

/// Outcome of an undo or redo call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryStep {
    /// The backend applied this operation.
    Applied(DragOperation),
    /// Nothing to undo or redo.
    Empty,
    /// Another undo/redo is in flight; the call was dropped.
    Busy,
}

impl HistoryStep {
    /// Returns the applied operation, if any.
    pub fn applied(&self) -> Option<&DragOperation> {
        match self {
            Self::Applied(op) => Some(op),
            _ => None,
        }
    }
}

/// Copy of both stacks, oldest entry first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistorySnapshot {
    pub undo: Vec<DragOperation>,
    pub redo: Vec<DragOperation>,
}

#[derive(Debug, Default)]
struct Stacks {
    undo: Vec<DragOperation>,
    redo: Vec<DragOperation>,
    // bumped by every commit and clear
    generation: u64,
}

struct ProcessingGuard<'a>(&'a AtomicBool);

impl<'a> ProcessingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Linear undo/redo history.
pub struct OperationLog {
    backend: Arc<dyn CalendarBackend>,
    stacks: Mutex<Stacks>,
    processing: AtomicBool,
    max_depth: Option<usize>,
}

impl std::fmt::Debug for OperationLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationLog")
            .field("undo_depth", &self.undo_depth())
            .field("redo_depth", &self.redo_depth())
            .field("processing", &self.is_processing())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl OperationLog {
    /// Creates an empty, unbounded log applying undo/redo through `backend`.
    pub fn new(backend: Arc<dyn CalendarBackend>) -> Self {
        Self {
            backend,
            stacks: Mutex::new(Stacks::default()),
            processing: AtomicBool::new(false),
            max_depth: None,
        }
    }

    /// Builder: cap the undo stack, dropping the oldest entries beyond it.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Stacks> {
        self.stacks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records an operation the backend has already applied.
    ///
    /// Clears the redo stack.
    pub fn commit(&self, op: DragOperation) {
        let mut stacks = self.lock();
        debug!(op_id = %op.id(), event_id = %op.event_id(), "Recording operation");
        stacks.undo.push(op);
        stacks.redo.clear();
        stacks.generation += 1;
        self.enforce_depth(&mut stacks);
    }

    fn enforce_depth(&self, stacks: &mut Stacks) {
        if let Some(max) = self.max_depth {
            let excess = stacks.undo.len().saturating_sub(max);
            if excess > 0 {
                stacks.undo.drain(..excess);
                debug!(dropped = excess, max, "History cap reached");
            }
        }
    }

    /// Reverts the most recent operation.
    ///
    /// The reverse operation (positions swapped, fresh id) is sent to the
    /// backend first; the stacks only change once it succeeds.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the stacks are left unchanged.
    pub async fn undo(&self) -> EngineResult<HistoryStep> {
        let Some(_guard) = ProcessingGuard::acquire(&self.processing) else {
            debug!("Undo ignored, history busy");
            return Ok(HistoryStep::Busy);
        };

        let (op, generation) = {
            let stacks = self.lock();
            match stacks.undo.last() {
                Some(op) => (op.clone(), stacks.generation),
                None => return Ok(HistoryStep::Empty),
            }
        };

        let reverse = op.reversed();
        self.apply(&reverse).await?;

        let mut stacks = self.lock();
        if let Some(index) = stacks.undo.iter().rposition(|o| o.id() == op.id()) {
            stacks.undo.remove(index);
        }
        // a commit landed while the mutation was in flight; history moved on
        if stacks.generation == generation {
            stacks.redo.push(op);
        }
        info!(op_id = %reverse.id(), event_id = %reverse.event_id(), "Operation undone");
        Ok(HistoryStep::Applied(reverse))
    }

    /// Re-applies the most recently undone operation.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the stacks are left unchanged.
    pub async fn redo(&self) -> EngineResult<HistoryStep> {
        let Some(_guard) = ProcessingGuard::acquire(&self.processing) else {
            debug!("Redo ignored, history busy");
            return Ok(HistoryStep::Busy);
        };

        let op = {
            let stacks = self.lock();
            match stacks.redo.last() {
                Some(op) => op.clone(),
                None => return Ok(HistoryStep::Empty),
            }
        };

        let replay = op.replayed();
        self.apply(&replay).await?;

        // the backend applied it, so it is undoable even if a commit
        // emptied the redo stack meanwhile
        let mut stacks = self.lock();
        if let Some(index) = stacks.redo.iter().rposition(|o| o.id() == op.id()) {
            stacks.redo.remove(index);
        }
        stacks.undo.push(op);
        self.enforce_depth(&mut stacks);
        info!(op_id = %replay.id(), event_id = %replay.event_id(), "Operation redone");
        Ok(HistoryStep::Applied(replay))
    }

    async fn apply(&self, op: &DragOperation) -> EngineResult<UpdatedEvent> {
        let request = MutationRequest::for_operation(op);
        let updated = self.backend.apply_mutation(op.event_id(), request).await?;
        Ok(updated)
    }

    /// Returns true if there is something to undo.
    pub fn can_undo(&self) -> bool {
        !self.lock().undo.is_empty()
    }

    /// Returns true if there is something to redo.
    pub fn can_redo(&self) -> bool {
        !self.lock().redo.is_empty()
    }

    /// Returns true while an undo or redo is in flight.
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    pub fn undo_depth(&self) -> usize {
        self.lock().undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.lock().redo.len()
    }

    /// Copies both stacks.
    pub fn snapshot(&self) -> HistorySnapshot {
        let stacks = self.lock();
        HistorySnapshot {
            undo: stacks.undo.clone(),
            redo: stacks.redo.clone(),
        }
    }

    /// Forgets all history.
    pub fn clear(&self) {
        let mut stacks = self.lock();
        stacks.undo.clear();
        stacks.redo.clear();
        stacks.generation += 1;
    }
}
