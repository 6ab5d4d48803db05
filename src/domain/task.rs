use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::ids::{CellKey, ColumnId, SwimlaneRef, TaskId};

/// Sort key used for tasks that have never been given an explicit order.
pub const UNORDERED_SENTINEL: f64 = 9999.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub column: ColumnId,
    pub swimlane: SwimlaneRef,
    pub order: Option<f64>, // Position within its cell, lower first
    pub tags: BTreeSet<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>, column: impl Into<ColumnId>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            column: column.into(),
            swimlane: SwimlaneRef::Unassigned,
            order: None,
            tags: BTreeSet::new(),
            updated_at: None,
        }
    }

    pub fn with_order(mut self, order: f64) -> Self {
        self.order = Some(order);
        self
    }

    pub fn in_swimlane(mut self, swimlane: SwimlaneRef) -> Self {
        self.swimlane = swimlane;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn cell(&self) -> CellKey {
        CellKey {
            swimlane: self.swimlane.clone(),
            column: self.column.clone(),
        }
    }

    pub fn is_in(&self, cell: &CellKey) -> bool {
        self.column == cell.column && self.swimlane == cell.swimlane
    }

    pub fn sort_key(&self) -> f64 {
        self.order.unwrap_or(UNORDERED_SENTINEL)
    }

    /// Moves the task into `cell`; an unassigned swimlane clears the lane.
    pub fn place_in(&mut self, cell: &CellKey) {
        self.column = cell.column.clone();
        self.swimlane = cell.swimlane.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::SwimlaneId;

    #[test]
    fn test_missing_order_uses_sentinel() {
        let task = Task::new("t1", "Write docs", "todo");
        assert_eq!(task.sort_key(), UNORDERED_SENTINEL);
        assert_eq!(task.with_order(3.0).sort_key(), 3.0);
    }

    #[test]
    fn test_place_in_overwrites_cell() {
        let mut task = Task::new("t1", "Write docs", "todo")
            .in_swimlane(SwimlaneRef::Assigned(SwimlaneId::new("s1")));
        let target = CellKey::new(SwimlaneRef::Unassigned, "done");

        task.place_in(&target);

        assert_eq!(task.column, ColumnId::new("done"));
        assert_eq!(task.swimlane, SwimlaneRef::Unassigned);
        assert!(task.is_in(&target));
    }
}
