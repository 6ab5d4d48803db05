use serde::{Deserialize, Serialize};

use super::ids::{BoardId, ColumnId, SwimlaneId, SwimlaneRef};

/// Label shown for tasks that point at a column the board does not have.
pub const UNKNOWN_COLUMN_NAME: &str = "unknown";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Column {
    #[serde(alias = "_id")]
    pub id: ColumnId,
    pub name: String,
}

impl Column {
    pub fn new(id: impl Into<ColumnId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Swimlane {
    #[serde(alias = "_id")]
    pub id: SwimlaneId,
    pub name: String,
    #[serde(default)]
    pub is_collapsed: bool,
}

impl Swimlane {
    pub fn new(id: impl Into<SwimlaneId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_collapsed: false,
        }
    }
}

/// Columns and swimlanes of one board, each in board order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardSnapshot {
    #[serde(alias = "_id")]
    pub id: BoardId,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub swimlanes: Vec<Swimlane>,
}

impl BoardSnapshot {
    pub fn new(id: impl Into<BoardId>) -> Self {
        Self {
            id: id.into(),
            columns: Vec::new(),
            swimlanes: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_swimlane(mut self, swimlane: Swimlane) -> Self {
        self.swimlanes.push(swimlane);
        self
    }

    pub fn has_column(&self, id: &ColumnId) -> bool {
        self.columns.iter().any(|c| &c.id == id)
    }

    /// The unassigned lane always exists; assigned lanes must be on the board.
    pub fn has_swimlane(&self, swimlane: &SwimlaneRef) -> bool {
        match swimlane {
            SwimlaneRef::Unassigned => true,
            SwimlaneRef::Assigned(id) => self.swimlanes.iter().any(|s| &s.id == id),
        }
    }

    pub fn column_name(&self, id: &ColumnId) -> &str {
        self.columns
            .iter()
            .find(|c| &c.id == id)
            .map(|c| c.name.as_str())
            .unwrap_or(UNKNOWN_COLUMN_NAME)
    }

    pub fn column_ids(&self) -> Vec<ColumnId> {
        self.columns.iter().map(|c| c.id.clone()).collect()
    }

    /// Applies a new column order. Ids not in `order` keep their relative
    /// position at the end.
    pub fn reorder_columns(&mut self, order: &[ColumnId]) {
        reorder_by(&mut self.columns, order, |c| &c.id);
    }

    pub fn reorder_swimlanes(&mut self, order: &[SwimlaneId]) {
        reorder_by(&mut self.swimlanes, order, |s| &s.id);
    }

    pub fn toggle_collapsed(&mut self, id: &SwimlaneId) -> Option<bool> {
        let lane = self.swimlanes.iter_mut().find(|s| &s.id == id)?;
        lane.is_collapsed = !lane.is_collapsed;
        Some(lane.is_collapsed)
    }
}

fn reorder_by<T, K: PartialEq>(items: &mut Vec<T>, order: &[K], key: impl Fn(&T) -> &K) {
    let rank = |item: &T| {
        order
            .iter()
            .position(|k| k == key(item))
            .unwrap_or(order.len())
    };
    items.sort_by_key(|item| rank(item));
}
