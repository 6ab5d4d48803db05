use crate::domain::board::{Column, Swimlane};
use crate::domain::ids::{ColumnId, SwimlaneId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}

/// Moves the element at `from` so that it ends up at index `to`.
///
/// The element is removed first and then reinserted, so `[0, 1, 2, 3]`
/// with `from = 2, to = 0` becomes `[2, 0, 1, 3]`. Out of range indices
/// leave the list untouched.
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    true
}

/// Ordered id list for the board's columns or swimlanes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequencer<I> {
    ids: Vec<I>,
}

impl<I: Clone + PartialEq> Sequencer<I> {
    pub fn new(ids: Vec<I>) -> Self {
        Self { ids }
    }

    pub fn ids(&self) -> &[I] {
        &self.ids
    }

    pub fn into_ids(self) -> Vec<I> {
        self.ids
    }

    pub fn index_of(&self, id: &I) -> Option<usize> {
        self.ids.iter().position(|i| i == id)
    }

    /// Drag-and-drop move: `active` takes the index `over` currently has.
    /// Returns `false` when either id is unknown or they are the same.
    pub fn move_to(&mut self, active: &I, over: &I) -> bool {
        if active == over {
            return false;
        }
        match (self.index_of(active), self.index_of(over)) {
            (Some(from), Some(to)) => array_move(&mut self.ids, from, to),
            _ => false,
        }
    }

    /// Places `id` directly before or after `anchor`.
    pub fn move_relative(&mut self, id: &I, placement: Placement, anchor: &I) -> bool {
        if id == anchor || self.index_of(anchor).is_none() {
            return false;
        }
        let Some(from) = self.index_of(id) else {
            return false;
        };
        let item = self.ids.remove(from);
        // Anchor is known to be present; look it up again after removal.
        let anchor_index = self.ids.iter().position(|i| i == anchor).unwrap_or(self.ids.len());
        let at = match placement {
            Placement::Before => anchor_index,
            Placement::After => anchor_index + 1,
        };
        self.ids.insert(at, item);
        true
    }
}

impl Sequencer<ColumnId> {
    pub fn columns(columns: &[Column]) -> Self {
        Self::new(columns.iter().map(|c| c.id.clone()).collect())
    }
}

impl Sequencer<SwimlaneId> {
    /// The synthetic default lane is never sortable, even if the backend
    /// happens to return an entity with that id.
    pub fn swimlanes(swimlanes: &[Swimlane]) -> Self {
        Self::new(
            swimlanes
                .iter()
                .filter(|s| !s.id.is_default_marker())
                .map(|s| s.id.clone())
                .collect(),
        )
    }
}
