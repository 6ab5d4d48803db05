// Test helpers for integration testing and the offline demo board

use crate::domain::board::{BoardSnapshot, Column, Swimlane};
use crate::domain::ids::{SwimlaneId, SwimlaneRef};
use crate::domain::task::Task;
use crate::repository::InMemoryBoardApi;
use crate::services::{BoardController, BoardState};
use std::sync::Arc;
use std::time::Duration;

pub const TEST_RESYNC_DELAY: Duration = Duration::from_millis(500);

pub struct TestContext {
    pub api: Arc<InMemoryBoardApi>,
    pub controller: BoardController<InMemoryBoardApi>,
}

impl TestContext {
    pub fn new_for_test() -> Self {
        Self::with_board(sample_board(), sample_tasks())
    }

    pub fn with_board(board: BoardSnapshot, tasks: Vec<Task>) -> Self {
        let api = Arc::new(InMemoryBoardApi::new(board.clone(), tasks.clone()));
        let controller = BoardController::new(
            Arc::clone(&api),
            BoardState::new(board, tasks),
            TEST_RESYNC_DELAY,
        );
        Self { api, controller }
    }
}

pub fn sample_board() -> BoardSnapshot {
    BoardSnapshot::new("demo")
        .with_column(Column::new("todo", "To Do"))
        .with_column(Column::new("doing", "Doing"))
        .with_column(Column::new("done", "Done"))
        .with_swimlane(Swimlane::new("frontend", "Frontend"))
        .with_swimlane(Swimlane::new("backend", "Backend"))
}

pub fn sample_tasks() -> Vec<Task> {
    let frontend = SwimlaneRef::Assigned(SwimlaneId::new("frontend"));
    let backend = SwimlaneRef::Assigned(SwimlaneId::new("backend"));
    vec![
        Task::new("t1", "Design login form", "todo").in_swimlane(frontend.clone()).with_order(1.0).with_tag("ui"),
        Task::new("t2", "Session storage", "todo").in_swimlane(backend.clone()).with_order(1.0),
        Task::new("t3", "Password reset email", "todo").in_swimlane(backend.clone()).with_order(2.0),
        Task::new("t4", "Navbar polish", "doing").in_swimlane(frontend.clone()).with_order(1.0).with_tag("ui"),
        Task::new("t5", "Rate limiting", "doing").in_swimlane(backend).with_order(1.0).with_tag("security"),
        Task::new("t6", "Triage inbox", "todo"),
        Task::new("t7", "Release notes", "done").with_order(1.0),
    ]
}
