pub mod board_controller;
pub mod drag_session;
pub mod error_handling;
pub mod grouping;
pub mod mutation;
pub mod reorder_resolver;
pub mod sequencer;

pub use board_controller::{BoardController, BoardState, DropOutcome, MutationReport};
pub use drag_session::DragSession;
pub use grouping::{GroupingIndex, LaneView};
pub use mutation::{Mutation, MutationKind, MutationState, RollbackPolicy};
pub use reorder_resolver::{NeighborPair, ReorderResolver, Resolution, TaskMove};
pub use sequencer::{Placement, Sequencer};
