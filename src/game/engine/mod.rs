//! Computer opponent backed by a UCI engine
//!
//! The engine runs as a child process spoken to over stdin/stdout. Searches
//! run asynchronously so the board keeps rendering while the engine thinks.
//!
//! # Architecture
//!
//! - [`EngineProcess`]: the child process, owned as a resource
//! - [`UciSession`]: the protocol conversation, a [`MoveSource`]
//! - [`ComputerOpponent`]: holds the idle move source and search limit
//! - [`PendingEngineMove`]: the running search task
//!
//! During a search the move source is moved into the task and handed back
//! with the reply, so only one search can run at a time. Each reply carries
//! the ply it was requested at and is dropped if the board has moved on.

pub mod resource;
pub mod systems;
pub mod uci;

pub use resource::{EngineKind, EngineSpec, SearchLimit};
pub use systems::{
    apply_engine_reply, computer_should_move, ComputerOpponent, EnginePlugin, EngineStatistics,
    PendingEngineMove,
};
pub use uci::{CancelToken, EngineProcess, MoveSource, ProcessSession, SearchRequest, UciSession};
