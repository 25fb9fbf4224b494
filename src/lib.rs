//! padchess - play chess against a UCI engine with a gamepad
//!
//! The binary in `main.rs` wires these modules into a Bevy app; the library
//! split lets the integration tests drive a headless session.

pub mod assets;
pub mod core;
pub mod game;
pub mod input;
pub mod rendering;
