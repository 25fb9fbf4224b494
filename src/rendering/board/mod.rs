//! Board rendering module
//!
//! Square tiles, piece sprites, highlights, the cursor ring and coordinate
//! labels.

pub mod board;
pub mod coordinates;

pub use board::*;
pub use coordinates::*;
