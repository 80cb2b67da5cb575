//! Drop pipeline: conflict checks, undo/redo history, real-time notices.
//!
//! This crate ties the famcal building blocks into one rescheduling flow:
//! - [`ConflictChecker`] asks the backend about collisions and defers to a
//!   [`ConflictResolver`] when there are some
//! - [`OperationLog`] keeps linear undo/redo history of applied operations
//! - [`RealtimeNotifier`] fans every applied operation out to observers
//! - [`Rescheduler`] owns a drag session and runs drops through all of it
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use chrono::{DateTime, Utc};
//! use famcal_backend::HttpBackend;
//! use famcal_core::{DraggedItem, DropZone, EventId, NoAffordance, Position};
//! use famcal_engine::{CancelOnConflict, EngineConfig, Rescheduler};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::load()?;
//!     let backend = HttpBackend::new(config.backend.http_config()?)?;
//!     let engine = Rescheduler::from_config(&config, Arc::new(backend), Arc::new(CancelOnConflict));
//!
//!     let start: DateTime<Utc> = "2025-01-10T09:00:00Z".parse()?;
//!     let end: DateTime<Utc> = "2025-01-10T10:00:00Z".parse()?;
//!     let item = DraggedItem::event(EventId::new(42), Position::new(start, end)?);
//!     engine.begin_drag(item, Arc::new(NoAffordance));
//!
//!     let target: DateTime<Utc> = "2025-01-10T14:00:00Z".parse()?;
//!     let slot = DropZone::time_slot("slot-14", target);
//!     let outcome = engine.drop_on(&slot).await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

mod config;
mod conflict;
mod error;
mod history;
mod notifier;
mod rescheduler;

pub use config::{
    BackendSettings, ConflictSettings, EngineConfig, HistorySettings, LoggingSettings,
    NotifierSettings, ResizeSettings,
};
pub use conflict::{
    CancelOnConflict, ConflictChecker, ConflictDecision, ConflictPolicy, ConflictReport,
    ConflictResolver, ProceedOnConflict,
};
pub use error::{EngineError, EngineResult};
pub use history::{HistorySnapshot, HistoryStep, OperationLog};
pub use notifier::{
    ChannelTransport, NoticeOrigin, RealtimeNotifier, RealtimeTransport, RescheduleNotice,
    TransportError,
};
pub use rescheduler::{DropOutcome, Rescheduler};
