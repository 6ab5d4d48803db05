pub mod board;
pub mod drag;
pub mod filter;
pub mod ids;
pub mod task;
pub mod wire;

pub use board::{BoardSnapshot, Column, Swimlane};
pub use drag::{DragEnd, DragEntity, DropTarget};
pub use filter::TaskFilter;
pub use ids::{BoardId, CellKey, ColumnId, SwimlaneId, SwimlaneRef, TaskId};
pub use task::Task;
