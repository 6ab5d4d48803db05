use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::board::BoardSnapshot;
use crate::domain::drag::{DragEnd, DragEntity, DropTarget};
use crate::domain::filter::TaskFilter;
use crate::domain::ids::{CellKey, ColumnId, SwimlaneId, TaskId};
use crate::domain::task::Task;
use crate::services::error_handling::ReorderError;
use crate::services::grouping::GroupingIndex;
use crate::services::sequencer::Sequencer;

/// Tasks directly around a moved task inside its destination cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborPair {
    pub previous: Option<TaskId>,
    pub next: Option<TaskId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskMove {
    /// Full task list after the move.
    pub tasks: Vec<Task>,
    pub task_id: TaskId,
    pub destination: CellKey,
    pub neighbors: NeighborPair,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    NoOp,
    Tasks(TaskMove),
    Columns(Vec<ColumnId>),
    Swimlanes(Vec<SwimlaneId>),
}

#[derive(Clone, Copy)]
enum Anchor<'a> {
    EndOfCell,
    Before(&'a TaskId),
    After(&'a TaskId),
}

/// Turns a drag-end event into a new arrangement without touching the inputs.
pub struct ReorderResolver;

impl ReorderResolver {
    pub fn resolve(
        board: &BoardSnapshot,
        tasks: &[Task],
        event: &DragEnd,
    ) -> Result<Resolution, ReorderError> {
        let Some(over) = &event.over else {
            return Ok(Resolution::NoOp);
        };

        match (&event.active, over) {
            (DragEntity::Task(id), DropTarget::OnCell(_) | DropTarget::OnTask { .. }) => {
                Self::resolve_task(board, tasks, id, over)
            }
            (DragEntity::Column(active), DropTarget::OnColumn { id }) => {
                let mut sequence = Sequencer::columns(&board.columns);
                Ok(if sequence.move_to(active, id) {
                    Resolution::Columns(sequence.into_ids())
                } else {
                    Resolution::NoOp
                })
            }
            (DragEntity::Swimlane(active), DropTarget::OnSwimlane { id }) => {
                let mut sequence = Sequencer::swimlanes(&board.swimlanes);
                Ok(if sequence.move_to(active, id) {
                    Resolution::Swimlanes(sequence.into_ids())
                } else {
                    Resolution::NoOp
                })
            }
            (active, over) => {
                debug!(active = ?active, over = ?over, "Drop target does not accept this entity");
                Ok(Resolution::NoOp)
            }
        }
    }

    fn resolve_task(
        board: &BoardSnapshot,
        tasks: &[Task],
        task_id: &TaskId,
        over: &DropTarget,
    ) -> Result<Resolution, ReorderError> {
        let Some(old_index) = tasks.iter().position(|t| &t.id == task_id) else {
            debug!(task_id = %task_id, "Dragged task is not on the board");
            return Ok(Resolution::NoOp);
        };

        let (destination, anchor) = match over {
            DropTarget::OnCell(cell) => {
                if !board.has_column(&cell.column) || !board.has_swimlane(&cell.swimlane) {
                    debug!(cell = %cell, "Drop cell is not on the board");
                    return Ok(Resolution::NoOp);
                }
                (cell.clone(), Anchor::EndOfCell)
            }
            DropTarget::OnTask { id } => {
                if id == task_id {
                    return Ok(Resolution::NoOp);
                }
                let Some(target_index) = tasks.iter().position(|t| &t.id == id) else {
                    return Ok(Resolution::NoOp);
                };
                // Dragging down lands after the target, dragging up before it.
                let anchor = if old_index < target_index {
                    Anchor::After(id)
                } else {
                    Anchor::Before(id)
                };
                (tasks[target_index].cell(), anchor)
            }
            _ => return Ok(Resolution::NoOp),
        };

        let mut working = tasks.to_vec();
        let mut moved = working.remove(old_index);

        let insert_at = match anchor {
            Anchor::EndOfCell => working
                .iter()
                .rposition(|t| t.is_in(&destination))
                .map(|i| i + 1)
                .unwrap_or(working.len()),
            Anchor::Before(target) | Anchor::After(target) => {
                let Some(target_index) = working.iter().position(|t| &t.id == target) else {
                    return Ok(Resolution::NoOp);
                };
                match anchor {
                    Anchor::After(_) => target_index + 1,
                    _ => target_index,
                }
            }
        };

        moved.place_in(&destination);
        working.insert(insert_at, moved);

        let neighbors = neighbors_of(&working, task_id, &destination)?;
        let order = display_order_key(&working, task_id, &destination, anchor);
        if let Some(task) = working.iter_mut().find(|t| &t.id == task_id) {
            task.order = order;
        }

        debug!(
            task_id = %task_id,
            destination = %destination,
            previous = ?neighbors.previous,
            next = ?neighbors.next,
            "Resolved task move"
        );

        Ok(Resolution::Tasks(TaskMove {
            tasks: working,
            task_id: task_id.clone(),
            destination,
            neighbors,
        }))
    }
}

/// Neighbours of `task_id` among the tasks of `cell`, in list order.
pub fn neighbors_of(tasks: &[Task], task_id: &TaskId, cell: &CellKey) -> Result<NeighborPair, ReorderError> {
    let position = tasks
        .iter()
        .position(|t| &t.id == task_id)
        .ok_or_else(|| ReorderError::StaleIndex { id: task_id.clone() })?;
    Ok(neighbors_at(tasks, position, cell))
}

fn previous_in_cell<'a>(tasks: &'a [Task], position: usize, cell: &CellKey) -> Option<&'a Task> {
    tasks[..position].iter().rev().find(|t| t.is_in(cell))
}

fn next_in_cell<'a>(tasks: &'a [Task], position: usize, cell: &CellKey) -> Option<&'a Task> {
    tasks[position + 1..].iter().find(|t| t.is_in(cell))
}

fn neighbors_at(tasks: &[Task], position: usize, cell: &CellKey) -> NeighborPair {
    NeighborPair {
        previous: previous_in_cell(tasks, position, cell).map(|t| t.id.clone()),
        next: next_in_cell(tasks, position, cell).map(|t| t.id.clone()),
    }
}

/// Sort key that shows the task where it was dropped, judged by the
/// cell's display order rather than list order, so the grouping reflects
/// the move before the backend has renumbered anything.
fn display_order_key(tasks: &[Task], task_id: &TaskId, cell: &CellKey, anchor: Anchor<'_>) -> Option<f64> {
    let current = tasks.iter().find(|t| &t.id == task_id).and_then(|t| t.order);
    let index = GroupingIndex::build(tasks, &TaskFilter::default());
    let shown: Vec<&Task> = index.cell(cell).iter().copied().filter(|t| &t.id != task_id).collect();
    let key_at = |i: usize| shown.get(i).map(|t| t.sort_key());

    let (previous, next) = match anchor {
        Anchor::EndOfCell => (shown.last().map(|t| t.sort_key()), None),
        Anchor::Before(target) | Anchor::After(target) => {
            let Some(at) = shown.iter().position(|t| &t.id == target) else {
                return current;
            };
            match anchor {
                Anchor::After(_) => (key_at(at), key_at(at + 1)),
                _ => (at.checked_sub(1).and_then(key_at), key_at(at)),
            }
        }
    };

    match (previous, next) {
        (Some(p), Some(n)) => Some((p + n) / 2.0),
        (Some(p), None) => Some(p + 1.0),
        (None, Some(n)) => Some(n - 1.0),
        (None, None) => current,
    }
}
