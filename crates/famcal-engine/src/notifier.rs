//! Fan-out of applied operations.
//!
//! Every operation the backend acknowledges produces exactly one
//! [`RescheduleNotice`]. Local observers (other calendar views, counters)
//! receive it over a [`tokio::sync::broadcast`] channel; an optional
//! [`RealtimeTransport`] forwards it to other clients.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

use famcal_core::DragOperation;

/// Why a notice was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeOrigin {
    /// A drop, copy or resize was committed.
    Commit,
    /// An operation was undone.
    Undo,
    /// An undone operation was re-applied.
    Redo,
}

/// An operation the backend has applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleNotice {
    pub operation: DragOperation,
    pub origin: NoticeOrigin,
}

impl RescheduleNotice {
    pub fn new(operation: DragOperation, origin: NoticeOrigin) -> Self {
        Self { operation, origin }
    }
}

/// Errors from a real-time transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection task is gone.
    #[error("real-time transport closed")]
    Closed,

    /// The outgoing queue is full.
    #[error("real-time transport queue full")]
    Full,

    /// Any other delivery failure.
    #[error("real-time delivery failed: {0}")]
    Delivery(String),
}

/// Outbound real-time channel to other clients.
///
/// `publish` must not block; implementations hand the notice to their own
/// connection task.
pub trait RealtimeTransport: Send + Sync {
    fn publish(&self, notice: &RescheduleNotice) -> Result<(), TransportError>;
}

/// Transport that queues notices on an mpsc channel drained by a connection
/// task.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::Sender<RescheduleNotice>,
}

impl ChannelTransport {
    /// Creates a transport and the receiver its connection task drains.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<RescheduleNotice>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl RealtimeTransport for ChannelTransport {
    fn publish(&self, notice: &RescheduleNotice) -> Result<(), TransportError> {
        self.tx.try_send(notice.clone()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => TransportError::Full,
            mpsc::error::TrySendError::Closed(_) => TransportError::Closed,
        })
    }
}

/// Broadcasts applied operations.
pub struct RealtimeNotifier {
    sender: broadcast::Sender<RescheduleNotice>,
    transport: Option<Arc<dyn RealtimeTransport>>,
}

impl std::fmt::Debug for RealtimeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeNotifier")
            .field("subscribers", &self.sender.receiver_count())
            .field("has_transport", &self.transport.is_some())
            .finish()
    }
}

impl RealtimeNotifier {
    /// Default broadcast capacity.
    pub const DEFAULT_CAPACITY: usize = 64;

    /// Creates a notifier whose subscribers may lag by up to `capacity`
    /// notices.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            transport: None,
        }
    }

    /// Builder: forward notices to `transport`.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn RealtimeTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Subscribes to notices emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<RescheduleNotice> {
        self.sender.subscribe()
    }

    /// Emits `notice` to local subscribers and the transport.
    ///
    /// Returns the number of local subscribers reached. Transport failures
    /// are logged and otherwise ignored.
    pub fn notify(&self, notice: RescheduleNotice) -> usize {
        if let Some(transport) = &self.transport {
            if let Err(err) = transport.publish(&notice) {
                warn!(op_id = %notice.operation.id(), error = %err, "Real-time publish failed");
            }
        }

        let op_id = notice.operation.id();
        let origin = notice.origin;
        let reached = self.sender.send(notice).unwrap_or(0);
        debug!(%op_id, ?origin, subscribers = reached, "Notice emitted");
        reached
    }
}

impl Default for RealtimeNotifier {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
