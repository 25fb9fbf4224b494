//! Chess session logic - board, selection, engine and game record
//!
//! Keeps pure game logic apart from the ECS systems that drive it: the board,
//! selection and recorder types are plain Rust and tested as such; the
//! systems only move data between them and Bevy resources.
//!
//! # Module Organization
//!
//! - `board_state` - Position, legal moves, history and result (shakmaty)
//! - `selection` - Confirm-press state machine
//! - `session` - Cursor, orientation, sides and last engine move
//! - `engine` - UCI engine subprocess and async search
//! - `recorder` - PGN file rewritten after every ply
//! - `system_sets` - Tick pacing and system ordering
//! - `plugin` - SessionPlugin that registers everything
//!
//! # Tick Order
//!
//! 1. Confirm presses (`apply_confirms_system`)
//! 2. Stick polling (`move_cursor_system`)
//! 3. Snapshot
//! 4. Engine (`poll_engine_move_system`, `request_engine_move_system`)
//! 5. Snapshot again
//! 6. Window title

pub mod board_state;
pub mod engine;
pub mod plugin;
pub mod recorder;
pub mod selection;
pub mod session;
pub mod system_sets;

pub use board_state::{BoardState, GameOutcome, PlayedMove};
pub use plugin::{launch_session, SessionPlugin};
pub use recorder::GameRecorder;
pub use selection::{ConfirmOutcome, Selection};
pub use session::{Cursor, HumanSide, LastComputerMove, Orientation};
