//! Core types: positions, dragged items, drop zones, operations, drag session

pub mod error;
pub mod item;
pub mod operation;
pub mod resolver;
pub mod session;
pub mod time;
pub mod tracing;
pub mod zone;

pub use error::{CoreError, CoreResult};
pub use item::{AssigneeId, DraggedItem, EventId, ItemKind};
pub use operation::{DragOperation, OperationId, OperationType};
pub use resolver::PositionResolver;
pub use session::{DragAffordance, DragSession, NoAffordance};
pub use time::Position;
pub use crate::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use zone::{DropZone, DropZoneRegistry, ZoneKind};
