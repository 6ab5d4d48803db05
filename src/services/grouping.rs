use ordered_float::OrderedFloat;
use std::collections::BTreeMap;

use crate::domain::board::BoardSnapshot;
use crate::domain::filter::TaskFilter;
use crate::domain::ids::{CellKey, ColumnId, SwimlaneRef};
use crate::domain::task::Task;

/// Tasks of one cell, in display order.
pub type CellTasks<'a> = Vec<&'a Task>;

/// Name of the lane holding tasks without a swimlane.
pub const DEFAULT_LANE_NAME: &str = "Default";

/// One swimlane row as the board renders it.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneView<'a> {
    pub swimlane: SwimlaneRef,
    pub name: String,
    pub collapsed: bool,
    /// Board columns in board order, then unknown columns used in this lane.
    pub cells: Vec<(ColumnId, CellTasks<'a>)>,
}

/// Swimlane -> column -> ordered tasks, derived from a flat task list.
///
/// The index borrows from the task list it was built from and is meant to be
/// rebuilt whenever the tasks, the board or the filter change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupingIndex<'a> {
    lanes: BTreeMap<SwimlaneRef, BTreeMap<ColumnId, CellTasks<'a>>>,
}

impl<'a> GroupingIndex<'a> {
    pub fn build(tasks: &'a [Task], filter: &TaskFilter) -> Self {
        let mut lanes: BTreeMap<SwimlaneRef, BTreeMap<ColumnId, CellTasks<'a>>> = BTreeMap::new();

        for task in tasks.iter().filter(|t| filter.matches(t)) {
            lanes
                .entry(task.swimlane.clone())
                .or_default()
                .entry(task.column.clone())
                .or_default()
                .push(task);
        }

        // Stable, so equal keys keep list order.
        for cells in lanes.values_mut() {
            for cell in cells.values_mut() {
                cell.sort_by_key(|t| OrderedFloat(t.sort_key()));
            }
        }

        Self { lanes }
    }

    pub fn cell(&self, key: &CellKey) -> &[&'a Task] {
        self.lanes
            .get(&key.swimlane)
            .and_then(|cells| cells.get(&key.column))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn lane(&self, swimlane: &SwimlaneRef) -> Option<&BTreeMap<ColumnId, CellTasks<'a>>> {
        self.lanes.get(swimlane)
    }

    pub fn swimlanes(&self) -> impl Iterator<Item = &SwimlaneRef> {
        self.lanes.keys()
    }

    pub fn cells(&self) -> impl Iterator<Item = (CellKey, &[&'a Task])> {
        self.lanes.iter().flat_map(|(lane, cells)| {
            cells
                .iter()
                .map(move |(column, tasks)| (CellKey::new(lane.clone(), column.clone()), tasks.as_slice()))
        })
    }

    pub fn task_count(&self) -> usize {
        self.lanes.values().flat_map(|c| c.values()).map(Vec::len).sum()
    }

    /// Rows in board order: the board's swimlanes, then the unassigned lane,
    /// then lanes only the tasks know about. Empty cells are included.
    pub fn layout(&self, board: &BoardSnapshot) -> Vec<LaneView<'a>> {
        let mut lanes: Vec<(SwimlaneRef, String, bool)> = board
            .swimlanes
            .iter()
            .filter(|s| !s.id.is_default_marker())
            .map(|s| (SwimlaneRef::Assigned(s.id.clone()), s.name.clone(), s.is_collapsed))
            .collect();

        let default_lane = board.swimlanes.iter().find(|s| s.id.is_default_marker());
        lanes.push((
            SwimlaneRef::Unassigned,
            default_lane.map_or_else(|| DEFAULT_LANE_NAME.to_string(), |s| s.name.clone()),
            default_lane.is_some_and(|s| s.is_collapsed),
        ));

        for lane in self.lanes.keys() {
            if !lanes.iter().any(|(known, _, _)| known == lane) {
                lanes.push((lane.clone(), lane.to_string(), false));
            }
        }

        let unknown = self.unknown_columns(board);
        lanes
            .into_iter()
            .map(|(swimlane, name, collapsed)| {
                let mut cells: Vec<(ColumnId, CellTasks<'a>)> = board
                    .columns
                    .iter()
                    .map(|c| {
                        let tasks = self.cell(&CellKey::new(swimlane.clone(), c.id.clone()));
                        (c.id.clone(), tasks.to_vec())
                    })
                    .collect();
                for column in &unknown {
                    let tasks = self.cell(&CellKey::new(swimlane.clone(), (*column).clone()));
                    if !tasks.is_empty() {
                        cells.push(((*column).clone(), tasks.to_vec()));
                    }
                }
                LaneView {
                    swimlane,
                    name,
                    collapsed,
                    cells,
                }
            })
            .collect()
    }

    /// Columns referenced by tasks that the board does not define.
    pub fn unknown_columns(&self, board: &BoardSnapshot) -> Vec<&ColumnId> {
        let mut unknown: Vec<&ColumnId> = self
            .lanes
            .values()
            .flat_map(|cells| cells.keys())
            .filter(|id| !board.has_column(id))
            .collect();
        unknown.sort();
        unknown.dedup();
        unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::{Column, Swimlane};
    use crate::domain::ids::SwimlaneId;

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.to_string()).collect()
    }

    fn sample() -> Vec<Task> {
        let s1 = SwimlaneRef::Assigned(SwimlaneId::new("s1"));
        vec![
            Task::new("t1", "Login", "todo").with_order(2.0),
            Task::new("t2", "Logout", "todo"),
            Task::new("t3", "Signup", "todo").with_order(1.0),
            Task::new("t4", "Profile", "todo").in_swimlane(s1.clone()).with_order(1.0),
            Task::new("t5", "Settings", "doing"),
            Task::new("t6", "Billing", "todo"),
        ]
    }

    #[test]
    fn test_orders_within_cell_with_sentinel_last() {
        let tasks = sample();
        let index = GroupingIndex::build(&tasks, &TaskFilter::default());

        let todo = index.cell(&CellKey::new(SwimlaneRef::Unassigned, "todo"));
        assert_eq!(ids(todo), vec!["t3", "t1", "t2", "t6"]);
        assert_eq!(index.task_count(), tasks.len());
    }

    #[test]
    fn test_groups_by_swimlane_then_column() {
        let tasks = sample();
        let index = GroupingIndex::build(&tasks, &TaskFilter::default());

        let s1 = SwimlaneRef::Assigned(SwimlaneId::new("s1"));
        assert_eq!(ids(index.cell(&CellKey::new(s1.clone(), "todo"))), vec!["t4"]);
        assert!(index.cell(&CellKey::new(s1, "doing")).is_empty());
        assert_eq!(index.swimlanes().count(), 2);
    }

    #[test]
    fn test_build_is_deterministic() {
        let tasks = sample();
        let filter = TaskFilter::search("o");
        let first = GroupingIndex::build(&tasks, &filter);
        let second = GroupingIndex::build(&tasks, &filter);
        assert_eq!(first, second);
    }

    #[test]
    fn test_filter_applies_before_grouping() {
        let tasks = sample();
        let index = GroupingIndex::build(&tasks, &TaskFilter::search("log"));
        let todo = index.cell(&CellKey::new(SwimlaneRef::Unassigned, "todo"));
        assert_eq!(ids(todo), vec!["t1", "t2"]);
        assert_eq!(index.task_count(), 2);
    }

    #[test]
    fn test_unknown_column_keeps_its_bucket() {
        let tasks = vec![
            Task::new("t1", "Known", "todo"),
            Task::new("t2", "Orphan", "archived"),
        ];
        let board = BoardSnapshot::new("b1").with_column(Column::new("todo", "To Do"));
        let index = GroupingIndex::build(&tasks, &TaskFilter::default());

        let orphan_cell = CellKey::new(SwimlaneRef::Unassigned, "archived");
        assert_eq!(ids(index.cell(&orphan_cell)), vec!["t2"]);
        assert_eq!(index.unknown_columns(&board), vec![&ColumnId::new("archived")]);
        assert_eq!(board.column_name(&orphan_cell.column), "unknown");
    }

    #[test]
    fn test_layout_follows_board_order() {
        let lane = |id: &str| SwimlaneRef::Assigned(SwimlaneId::new(id));
        let tasks = vec![
            Task::new("t1", "Login", "todo").in_swimlane(lane("s1")),
            Task::new("t2", "Logout", "done").in_swimlane(lane("s2")),
            Task::new("t3", "Signup", "archived").in_swimlane(lane("s2")),
            Task::new("t4", "Billing", "todo"),
            Task::new("t5", "Stray", "todo").in_swimlane(lane("ghost")),
        ];
        let mut board = BoardSnapshot::new("b1")
            .with_column(Column::new("todo", "To Do"))
            .with_column(Column::new("doing", "Doing"))
            .with_column(Column::new("done", "Done"))
            .with_swimlane(Swimlane::new("s1", "Frontend"))
            .with_swimlane(Swimlane::new("s2", "Backend"));
        board.reorder_columns(&[ColumnId::new("done"), ColumnId::new("todo"), ColumnId::new("doing")]);
        board.reorder_swimlanes(&[SwimlaneId::new("s2"), SwimlaneId::new("s1")]);
        board.toggle_collapsed(&SwimlaneId::new("s1"));

        let index = GroupingIndex::build(&tasks, &TaskFilter::default());
        let layout = index.layout(&board);

        let names: Vec<&str> = layout.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Backend", "Frontend", "Default", "ghost"]);
        assert!(layout[1].collapsed);
        assert!(!layout[0].collapsed);

        let columns = |view: &LaneView| -> Vec<String> { view.cells.iter().map(|(c, _)| c.to_string()).collect() };
        assert_eq!(columns(&layout[0]), vec!["done", "todo", "doing", "archived"]);
        assert_eq!(columns(&layout[1]), vec!["done", "todo", "doing"]);
        assert_eq!(ids(&layout[0].cells[0].1), vec!["t2"]);
        assert!(layout[0].cells[2].1.is_empty());
        assert_eq!(ids(&layout[2].cells[1].1), vec!["t4"]);
        assert_eq!(ids(&layout[3].cells[1].1), vec!["t5"]);
    }
}
