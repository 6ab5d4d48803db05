use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MutationKind {
    TaskMove,
    ColumnReorder,
    SwimlaneReorder,
}

/// What to do with the optimistic state when persisting it fails.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RollbackPolicy {
    /// Put the pre-move snapshot back and resync after a delay.
    RestoreSnapshot,
    /// Leave the optimistic order in place until the next full reload.
    KeepOptimistic,
}

impl RollbackPolicy {
    /// Per-cell task order is contended and rolls back; the coarse column and
    /// swimlane sequences are left to drift.
    pub fn for_kind(kind: MutationKind) -> Self {
        match kind {
            MutationKind::TaskMove => RollbackPolicy::RestoreSnapshot,
            MutationKind::ColumnReorder | MutationKind::SwimlaneReorder => {
                RollbackPolicy::KeepOptimistic
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MutationState {
    Pending,
    Confirmed,
    RolledBack,
    /// Persisting failed and local state was kept as-is.
    Unreconciled,
}

impl MutationState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MutationState::Pending)
    }
}

/// One optimistic change on its way to the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Mutation {
    pub id: Uuid,
    pub kind: MutationKind,
    pub subject: String, // Task id, or board id for sequence reorders
    pub state: MutationState,
    pub started_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl Mutation {
    pub fn pending(kind: MutationKind, subject: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            subject: subject.into(),
            state: MutationState::Pending,
            started_at: Utc::now(),
            settled_at: None,
        }
    }

    pub fn policy(&self) -> RollbackPolicy {
        RollbackPolicy::for_kind(self.kind)
    }

    pub fn confirm(&mut self) {
        self.settle(MutationState::Confirmed);
    }

    /// Settles a failed mutation according to its kind's policy and returns
    /// the state it ended in.
    pub fn fail(&mut self) -> MutationState {
        let state = match self.policy() {
            RollbackPolicy::RestoreSnapshot => MutationState::RolledBack,
            RollbackPolicy::KeepOptimistic => MutationState::Unreconciled,
        };
        self.settle(state);
        state
    }

    fn settle(&mut self, state: MutationState) {
        debug_assert!(!self.state.is_terminal(), "mutation settled twice");
        self.state = state;
        self.settled_at = Some(Utc::now());
    }
}
