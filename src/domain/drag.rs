use serde::{Deserialize, Serialize};

use super::ids::{CellKey, ColumnId, SwimlaneId, TaskId};

/// The entity picked up by the pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum DragEntity {
    Task(TaskId),
    Column(ColumnId),
    Swimlane(SwimlaneId),
}

/// What the entity was released over, decoded by the drag adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropTarget {
    /// Placeholder at the bottom of a cell.
    OnCell(CellKey),
    OnTask { id: TaskId },
    OnColumn { id: ColumnId },
    OnSwimlane { id: SwimlaneId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragEnd {
    pub active: DragEntity,
    pub over: Option<DropTarget>,
}

impl DragEnd {
    pub fn new(active: DragEntity, over: Option<DropTarget>) -> Self {
        Self { active, over }
    }

    pub fn task_onto_task(task: impl Into<TaskId>, target: impl Into<TaskId>) -> Self {
        Self::new(
            DragEntity::Task(task.into()),
            Some(DropTarget::OnTask { id: target.into() }),
        )
    }

    pub fn task_onto_cell(task: impl Into<TaskId>, cell: CellKey) -> Self {
        Self::new(DragEntity::Task(task.into()), Some(DropTarget::OnCell(cell)))
    }

    pub fn column_onto(column: impl Into<ColumnId>, target: impl Into<ColumnId>) -> Self {
        Self::new(
            DragEntity::Column(column.into()),
            Some(DropTarget::OnColumn { id: target.into() }),
        )
    }

    pub fn swimlane_onto(swimlane: impl Into<SwimlaneId>, target: impl Into<SwimlaneId>) -> Self {
        Self::new(
            DragEntity::Swimlane(swimlane.into()),
            Some(DropTarget::OnSwimlane { id: target.into() }),
        )
    }
}
