pub mod board_api;
pub mod http_board_api;

pub use board_api::{BoardApi, MoveTaskRequest};
pub use board_api::mock::{ApiCall, InMemoryBoardApi};
pub use http_board_api::HttpBoardApi;
