use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::board::BoardSnapshot;
use crate::domain::drag::{DragEnd, DragEntity};
use crate::domain::filter::TaskFilter;
use crate::domain::ids::{BoardId, CellKey, ColumnId, SwimlaneId, TaskId};
use crate::domain::task::Task;
use crate::repository::{BoardApi, MoveTaskRequest};
use crate::services::drag_session::DragSession;
use crate::services::error_handling::{LogHelper, PerformanceMonitor};
use crate::services::grouping::GroupingIndex;
use crate::services::mutation::{Mutation, MutationKind, MutationState};
use crate::services::reorder_resolver::{ReorderResolver, Resolution};
use crate::services::sequencer::Sequencer;

const MUTATION_LOG_LIMIT: usize = 200;
const RESOLVE_THRESHOLD_MS: u64 = 16;

/// Local view of one board, shared between UI callbacks and background resyncs.
#[derive(Debug, Clone)]
pub struct BoardState {
    pub board: BoardSnapshot,
    pub tasks: Arc<Vec<Task>>,
    pub drag: DragSession,
    pub mutations: Vec<Mutation>,
}

impl BoardState {
    pub fn new(board: BoardSnapshot, tasks: Vec<Task>) -> Self {
        Self {
            board,
            tasks: Arc::new(tasks),
            drag: DragSession::new(),
            mutations: Vec::new(),
        }
    }

    fn record(&mut self, mutation: &Mutation) {
        match self.mutations.iter_mut().find(|m| m.id == mutation.id) {
            Some(existing) => *existing = mutation.clone(),
            None => {
                self.mutations.push(mutation.clone());
                if self.mutations.len() > MUTATION_LOG_LIMIT {
                    self.mutations.remove(0);
                }
            }
        }
    }
}

#[derive(Debug)]
pub struct MutationReport {
    pub mutation: Mutation,
    /// Delayed resync scheduled after a rollback.
    pub resync: Option<JoinHandle<()>>,
}

#[derive(Debug)]
pub enum DropOutcome {
    Ignored,
    Applied(MutationReport),
}

impl DropOutcome {
    pub fn mutation(&self) -> Option<&Mutation> {
        match self {
            DropOutcome::Applied(report) => Some(&report.mutation),
            DropOutcome::Ignored => None,
        }
    }
}

enum PendingWrite {
    Task {
        request: MoveTaskRequest,
        snapshot: Arc<Vec<Task>>,
    },
    Columns(Vec<ColumnId>),
    Swimlanes(Vec<SwimlaneId>),
}

/// Applies drag results locally first, then persists them through a [`BoardApi`].
pub struct BoardController<A: BoardApi + 'static> {
    api: Arc<A>,
    state: Arc<RwLock<BoardState>>,
    resync_delay: Duration,
}

impl<A: BoardApi + 'static> Clone for BoardController<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            state: Arc::clone(&self.state),
            resync_delay: self.resync_delay,
        }
    }
}

impl<A: BoardApi + 'static> BoardController<A> {
    pub fn new(api: Arc<A>, state: BoardState, resync_delay: Duration) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(state)),
            resync_delay,
        }
    }

    /// Fetches the board layout and its tasks.
    pub async fn open(api: Arc<A>, board_id: &BoardId, resync_delay: Duration) -> Result<Self> {
        let board = api.fetch_board(board_id).await?;
        let tasks = api.fetch_tasks(board_id).await?;
        info!(board_id = %board_id, tasks = tasks.len(), "Board opened");
        Ok(Self::new(api, BoardState::new(board, tasks), resync_delay))
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    pub async fn board(&self) -> BoardSnapshot {
        self.state.read().await.board.clone()
    }

    pub async fn tasks(&self) -> Arc<Vec<Task>> {
        Arc::clone(&self.state.read().await.tasks)
    }

    pub async fn mutations(&self) -> Vec<Mutation> {
        self.state.read().await.mutations.clone()
    }

    /// Replaces local tasks with the backend's list.
    pub async fn load(&self) -> Result<()> {
        let board_id = self.state.read().await.board.id.clone();
        let tasks = self.api.fetch_tasks(&board_id).await?;
        debug!(board_id = %board_id, tasks = tasks.len(), "Tasks reloaded");
        self.state.write().await.tasks = Arc::new(tasks);
        Ok(())
    }

    /// Idempotent reconciliation; failures are logged and leave state as is.
    pub async fn resync(&self) {
        if let Err(e) = self.load().await {
            LogHelper::log_resync_failure("reconcile", &e);
        }
    }

    pub async fn with_grouping<R>(
        &self,
        filter: &TaskFilter,
        f: impl FnOnce(&BoardSnapshot, &GroupingIndex<'_>) -> R,
    ) -> R {
        let state = self.state.read().await;
        let index = GroupingIndex::build(&state.tasks, filter);
        f(&state.board, &index)
    }

    /// Task ids of one cell in display order.
    pub async fn cell_task_ids(&self, cell: &CellKey) -> Vec<TaskId> {
        self.with_grouping(&TaskFilter::default(), |_, index| {
            index.cell(cell).iter().map(|t| t.id.clone()).collect()
        })
        .await
    }

    /// Ids offered to the swimlane drag handles.
    pub async fn sortable_swimlanes(&self) -> Vec<SwimlaneId> {
        Sequencer::swimlanes(&self.state.read().await.board.swimlanes).into_ids()
    }

    pub async fn sortable_columns(&self) -> Vec<ColumnId> {
        Sequencer::columns(&self.state.read().await.board.columns).into_ids()
    }

    /// Local display toggle, never persisted.
    pub async fn toggle_swimlane(&self, id: &SwimlaneId) -> Option<bool> {
        self.state.write().await.board.toggle_collapsed(id)
    }

    pub async fn drag_start(&self, entity: DragEntity) {
        let mut state = self.state.write().await;
        let tasks = Arc::clone(&state.tasks);
        state.drag.start(entity, &tasks);
    }

    pub async fn drag_preview(&self) -> Option<Task> {
        self.state.read().await.drag.preview().cloned()
    }

    pub async fn is_dragging(&self) -> bool {
        self.state.read().await.drag.is_dragging()
    }

    /// Handles a drop. Local state is updated before the backend is asked,
    /// and backend failures are settled here rather than returned.
    pub async fn drag_end(&self, event: DragEnd) -> DropOutcome {
        let (mut mutation, write, board_id) = {
            let mut state = self.state.write().await;
            state.drag.end();

            let resolution = {
                let _monitor = PerformanceMonitor::new("resolve_drop", RESOLVE_THRESHOLD_MS);
                ReorderResolver::resolve(&state.board, &state.tasks, &event)
            };

            let (mutation, write) = match resolution {
                Ok(Resolution::NoOp) => {
                    debug!(event = ?event, "Drop ignored");
                    return DropOutcome::Ignored;
                }
                Err(e) => {
                    warn!(error = %e, "Drop could not be resolved, skipping persistence");
                    return DropOutcome::Ignored;
                }
                Ok(Resolution::Tasks(task_move)) => {
                    let snapshot = Arc::clone(&state.tasks);
                    let request = MoveTaskRequest {
                        task_id: task_move.task_id.clone(),
                        column_id: task_move.destination.column.clone(),
                        swimlane_id: task_move.destination.swimlane.wire_value().to_string(),
                        previous_task_id: task_move.neighbors.previous.clone(),
                        next_task_id: task_move.neighbors.next.clone(),
                    };
                    state.tasks = Arc::new(task_move.tasks);
                    (
                        Mutation::pending(MutationKind::TaskMove, task_move.task_id.as_str()),
                        PendingWrite::Task { request, snapshot },
                    )
                }
                Ok(Resolution::Columns(order)) => {
                    state.board.reorder_columns(&order);
                    (
                        Mutation::pending(MutationKind::ColumnReorder, state.board.id.as_str()),
                        PendingWrite::Columns(order),
                    )
                }
                Ok(Resolution::Swimlanes(order)) => {
                    state.board.reorder_swimlanes(&order);
                    (
                        Mutation::pending(MutationKind::SwimlaneReorder, state.board.id.as_str()),
                        PendingWrite::Swimlanes(order),
                    )
                }
            };
            state.record(&mutation);
            (mutation, write, state.board.id.clone())
        };

        let result = match &write {
            PendingWrite::Task { request, .. } => self.api.move_task(request).await,
            PendingWrite::Columns(order) => self.api.reorder_columns(&board_id, order).await,
            PendingWrite::Swimlanes(order) => self.api.reorder_swimlanes(&board_id, order).await,
        };

        let resync = match result {
            Ok(()) => {
                mutation.confirm();
                LogHelper::log_confirmed(&mutation);
                self.settle(&mutation).await;
                self.resync().await;
                None
            }
            Err(e) => match mutation.fail() {
                MutationState::RolledBack => {
                    if let PendingWrite::Task { snapshot, .. } = write {
                        self.state.write().await.tasks = snapshot;
                    }
                    LogHelper::log_rolled_back(&mutation, &e);
                    self.settle(&mutation).await;
                    Some(self.schedule_resync(mutation.id))
                }
                _ => {
                    LogHelper::log_unreconciled(&mutation, &e);
                    self.settle(&mutation).await;
                    None
                }
            },
        };

        DropOutcome::Applied(MutationReport { mutation, resync })
    }

    async fn settle(&self, mutation: &Mutation) {
        self.state.write().await.record(mutation);
    }

    fn schedule_resync(&self, mutation_id: Uuid) -> JoinHandle<()> {
        let controller = self.clone();
        let delay = self.resync_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debug!(mutation_id = %mutation_id, "Running delayed resync");
            controller.resync().await;
        })
    }
}
