use tracing::{debug, warn};

use crate::domain::drag::DragEntity;
use crate::domain::task::Task;

/// The single drag currently in flight, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DragSession {
    active: Option<DragEntity>,
    preview: Option<Task>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `entity` as active. Task drags also capture the task for the
    /// drag overlay; column and swimlane headers render themselves in place.
    pub fn start(&mut self, entity: DragEntity, tasks: &[Task]) {
        if let Some(previous) = &self.active {
            warn!(previous = ?previous, next = ?entity, "Drag started while another drag was active");
        }

        self.preview = match &entity {
            DragEntity::Task(id) => tasks.iter().find(|t| &t.id == id).cloned(),
            DragEntity::Column(_) | DragEntity::Swimlane(_) => None,
        };
        debug!(entity = ?entity, has_preview = self.preview.is_some(), "Drag started");
        self.active = Some(entity);
    }

    /// Clears the session no matter how the drop turns out.
    pub fn end(&mut self) -> Option<DragEntity> {
        self.preview = None;
        self.active.take()
    }

    pub fn active(&self) -> Option<&DragEntity> {
        self.active.as_ref()
    }

    pub fn preview(&self) -> Option<&Task> {
        self.preview.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{ColumnId, TaskId};

    fn tasks() -> Vec<Task> {
        vec![Task::new("t1", "Login", "todo"), Task::new("t2", "Logout", "todo")]
    }

    #[test]
    fn test_task_drag_sets_preview() {
        let mut session = DragSession::new();
        session.start(DragEntity::Task(TaskId::new("t2")), &tasks());

        assert!(session.is_dragging());
        assert_eq!(session.preview().map(|t| t.title.as_str()), Some("Logout"));
    }

    #[test]
    fn test_column_drag_has_no_preview() {
        let mut session = DragSession::new();
        session.start(DragEntity::Column(ColumnId::new("todo")), &tasks());

        assert_eq!(session.active(), Some(&DragEntity::Column(ColumnId::new("todo"))));
        assert!(session.preview().is_none());
    }

    #[test]
    fn test_end_always_clears() {
        let mut session = DragSession::new();
        session.start(DragEntity::Task(TaskId::new("missing")), &tasks());
        assert!(session.preview().is_none());

        assert_eq!(session.end(), Some(DragEntity::Task(TaskId::new("missing"))));
        assert!(!session.is_dragging());
        assert_eq!(session.end(), None);
    }

    #[test]
    fn test_second_start_replaces_first() {
        let mut session = DragSession::new();
        session.start(DragEntity::Task(TaskId::new("t1")), &tasks());
        session.start(DragEntity::Task(TaskId::new("t2")), &tasks());

        assert_eq!(session.active(), Some(&DragEntity::Task(TaskId::new("t2"))));
        assert_eq!(session.preview().map(|t| t.id.as_str()), Some("t2"));
    }
}
