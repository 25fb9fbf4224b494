//! Input module - gamepad polling for cursor movement and confirm presses
//!
//! # Architecture
//!
//! - `gamepad` - Stick-to-cursor mapping and button collection
//!
//! Any number of gamepads may be connected; each contributes its left stick
//! and any of its buttons. With none connected the session still runs, the
//! cursor just never moves.

pub mod gamepad;

pub use gamepad::*;
