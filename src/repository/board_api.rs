use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::domain::board::BoardSnapshot;
use crate::domain::ids::{BoardId, ColumnId, SwimlaneId, TaskId};
use crate::domain::task::Task;

/// Body of the backend's "move task" call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTaskRequest {
    #[serde(skip)]
    pub task_id: TaskId,
    pub column_id: ColumnId,
    /// Empty for the unassigned lane.
    pub swimlane_id: String,
    pub previous_task_id: Option<TaskId>,
    pub next_task_id: Option<TaskId>,
}

/// Backend operations the board controller depends on - allows for mocking in tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BoardApi: Send + Sync {
    async fn move_task(&self, request: &MoveTaskRequest) -> Result<()>;

    async fn reorder_columns(&self, board_id: &BoardId, column_ids: &[ColumnId]) -> Result<()>;

    async fn reorder_swimlanes(&self, board_id: &BoardId, swimlane_ids: &[SwimlaneId]) -> Result<()>;

    async fn fetch_tasks(&self, board_id: &BoardId) -> Result<Vec<Task>>;

    async fn fetch_board(&self, board_id: &BoardId) -> Result<BoardSnapshot>;
}

pub mod mock {
    use super::*;
    use crate::domain::ids::SwimlaneRef;
    use crate::services::error_handling::BoardError;
    use std::sync::{Arc, Mutex};
    use tokio::time::{Duration, sleep};

    /// Recorded backend call
    #[derive(Debug, Clone, PartialEq)]
    pub enum ApiCall {
        MoveTask(MoveTaskRequest),
        ReorderColumns(BoardId, Vec<ColumnId>),
        ReorderSwimlanes(BoardId, Vec<SwimlaneId>),
        FetchTasks(BoardId),
        FetchBoard(BoardId),
    }

    #[derive(Default)]
    struct Inner {
        board: Option<BoardSnapshot>,
        tasks: Vec<Task>,
        calls: Vec<ApiCall>,
        fail_writes: bool,
        fail_fetches: bool,
        delay_ms: u64,
    }

    /// In-memory backend that applies writes to its own copy of the board.
    #[derive(Clone, Default)]
    pub struct InMemoryBoardApi {
        inner: Arc<Mutex<Inner>>,
    }

    impl InMemoryBoardApi {
        pub fn new(board: BoardSnapshot, tasks: Vec<Task>) -> Self {
            let api = Self::default();
            {
                let mut inner = api.inner.lock().unwrap();
                inner.board = Some(board);
                inner.tasks = tasks;
            }
            api
        }

        pub fn with_delay(self, delay_ms: u64) -> Self {
            self.inner.lock().unwrap().delay_ms = delay_ms;
            self
        }

        pub fn fail_writes(&self, fail: bool) {
            self.inner.lock().unwrap().fail_writes = fail;
        }

        pub fn fail_fetches(&self, fail: bool) {
            self.inner.lock().unwrap().fail_fetches = fail;
        }

        /// Replaces the server-side tasks, e.g. to simulate another user's edit.
        pub fn set_tasks(&self, tasks: Vec<Task>) {
            self.inner.lock().unwrap().tasks = tasks;
        }

        pub fn tasks(&self) -> Vec<Task> {
            self.inner.lock().unwrap().tasks.clone()
        }

        pub fn board(&self) -> Option<BoardSnapshot> {
            self.inner.lock().unwrap().board.clone()
        }

        pub fn calls(&self) -> Vec<ApiCall> {
            self.inner.lock().unwrap().calls.clone()
        }

        pub fn write_calls(&self) -> Vec<ApiCall> {
            self.calls()
                .into_iter()
                .filter(|c| !matches!(c, ApiCall::FetchTasks(_) | ApiCall::FetchBoard(_)))
                .collect()
        }

        pub fn fetch_count(&self) -> usize {
            self.calls()
                .iter()
                .filter(|c| matches!(c, ApiCall::FetchTasks(_)))
                .count()
        }

        async fn record(&self, call: ApiCall, is_write: bool) -> Result<()> {
            let (delay, fail) = {
                let mut inner = self.inner.lock().unwrap();
                inner.calls.push(call);
                let fail = if is_write { inner.fail_writes } else { inner.fail_fetches };
                (inner.delay_ms, fail)
            };
            if delay > 0 {
                sleep(Duration::from_millis(delay)).await;
            }
            if fail {
                anyhow::bail!("simulated backend failure");
            }
            Ok(())
        }
    }

    #[async_trait]
    impl BoardApi for InMemoryBoardApi {
        async fn move_task(&self, request: &MoveTaskRequest) -> Result<()> {
            self.record(ApiCall::MoveTask(request.clone()), true).await?;

            let mut inner = self.inner.lock().unwrap();
            let Some(from) = inner.tasks.iter().position(|t| t.id == request.task_id) else {
                return Err(BoardError::TaskNotFound {
                    id: request.task_id.clone(),
                }
                .into());
            };
            let mut task = inner.tasks.remove(from);
            task.column = request.column_id.clone();
            task.swimlane = SwimlaneRef::from_raw(Some(&request.swimlane_id));

            let index_of = |tasks: &[Task], id: &Option<TaskId>| {
                id.as_ref().and_then(|id| tasks.iter().position(|t| &t.id == id))
            };
            let at = match (
                index_of(&inner.tasks, &request.previous_task_id),
                index_of(&inner.tasks, &request.next_task_id),
            ) {
                (Some(prev), _) => prev + 1,
                (None, Some(next)) => next,
                (None, None) => inner.tasks.len(),
            };
            inner.tasks.insert(at, task);

            // Renumber the destination cell the way a neighbour-ordered backend would.
            let cell = inner.tasks[at].cell();
            let mut order = 0.0;
            for t in inner.tasks.iter_mut().filter(|t| t.is_in(&cell)) {
                order += 1.0;
                t.order = Some(order);
            }
            Ok(())
        }

        async fn reorder_columns(&self, board_id: &BoardId, column_ids: &[ColumnId]) -> Result<()> {
            self.record(ApiCall::ReorderColumns(board_id.clone(), column_ids.to_vec()), true)
                .await?;
            if let Some(board) = self.inner.lock().unwrap().board.as_mut() {
                board.reorder_columns(column_ids);
            }
            Ok(())
        }

        async fn reorder_swimlanes(&self, board_id: &BoardId, swimlane_ids: &[SwimlaneId]) -> Result<()> {
            self.record(ApiCall::ReorderSwimlanes(board_id.clone(), swimlane_ids.to_vec()), true)
                .await?;
            if let Some(board) = self.inner.lock().unwrap().board.as_mut() {
                board.reorder_swimlanes(swimlane_ids);
            }
            Ok(())
        }

        async fn fetch_tasks(&self, board_id: &BoardId) -> Result<Vec<Task>> {
            self.record(ApiCall::FetchTasks(board_id.clone()), false).await?;
            Ok(self.tasks())
        }

        async fn fetch_board(&self, board_id: &BoardId) -> Result<BoardSnapshot> {
            self.record(ApiCall::FetchBoard(board_id.clone()), false).await?;
            self.board()
                .ok_or_else(|| anyhow::anyhow!("board {} not found", board_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{ApiCall, InMemoryBoardApi};
    use super::*;
    use crate::domain::board::Column;
    use crate::services::error_handling::BoardError;

    fn api() -> InMemoryBoardApi {
        let board = BoardSnapshot::new("b1")
            .with_column(Column::new("todo", "To Do"))
            .with_column(Column::new("done", "Done"));
        InMemoryBoardApi::new(
            board,
            vec![
                Task::new("t1", "a", "todo").with_order(1.0),
                Task::new("t2", "b", "todo").with_order(2.0),
                Task::new("t3", "c", "done").with_order(1.0),
            ],
        )
    }

    #[test]
    fn test_move_request_json_shape() {
        let request = MoveTaskRequest {
            task_id: TaskId::new("t1"),
            column_id: ColumnId::new("done"),
            swimlane_id: String::new(),
            previous_task_id: None,
            next_task_id: Some(TaskId::new("t3")),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "columnId": "done",
                "swimlaneId": "",
                "previousTaskId": null,
                "nextTaskId": "t3"
            })
        );
    }

    #[tokio::test]
    async fn test_in_memory_move_places_between_neighbors() {
        let api = api();
        api.move_task(&MoveTaskRequest {
            task_id: TaskId::new("t1"),
            column_id: ColumnId::new("done"),
            swimlane_id: String::new(),
            previous_task_id: None,
            next_task_id: Some(TaskId::new("t3")),
        })
        .await
        .unwrap();

        let tasks = api.fetch_tasks(&BoardId::new("b1")).await.unwrap();
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t2", "t1", "t3"]);
        assert_eq!(tasks[1].order, Some(1.0));
        assert_eq!(tasks[2].order, Some(2.0));
        assert_eq!(api.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_in_memory_failure_injection() {
        let api = api();
        api.fail_writes(true);

        let result = api.reorder_columns(&BoardId::new("b1"), &[ColumnId::new("done")]).await;
        assert!(result.is_err());
        assert_eq!(
            api.write_calls(),
            vec![ApiCall::ReorderColumns(BoardId::new("b1"), vec![ColumnId::new("done")])]
        );
        assert_eq!(api.board().unwrap().columns[0].id, ColumnId::new("todo"));

        api.fail_fetches(true);
        assert!(api.fetch_tasks(&BoardId::new("b1")).await.is_err());
    }

    #[tokio::test]
    async fn test_in_memory_move_of_unknown_task() {
        let api = api();
        let err = api
            .move_task(&MoveTaskRequest {
                task_id: TaskId::new("ghost"),
                column_id: ColumnId::new("todo"),
                swimlane_id: String::new(),
                previous_task_id: None,
                next_task_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BoardError>(),
            Some(BoardError::TaskNotFound { .. })
        ));
    }
}
