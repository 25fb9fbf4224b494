//! Per-session resources owned by the app
//!
//! The cursor, the human's side, the board orientation and the last computer
//! move. Together with [`crate::game::BoardState`] and
//! [`crate::game::Selection`] they form the whole mutable session context.

use bevy::prelude::*;
use shakmaty::{Color, File, Rank, Square};

/// Highest file/rank index on the board
pub const BOARD_MAX: i8 = 7;

/// Which side of the board is drawn at the bottom of the window
///
/// Fixed at startup from the human's colour so their own back rank is at
/// the bottom.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum Orientation {
    #[default]
    WhiteBottom,
    BlackBottom,
}

impl Orientation {
    pub fn for_human(human: Color) -> Self {
        match human {
            Color::White => Orientation::WhiteBottom,
            Color::Black => Orientation::BlackBottom,
        }
    }

    pub fn is_flipped(self) -> bool {
        self == Orientation::BlackBottom
    }

    pub fn flipped(self) -> Self {
        match self {
            Orientation::WhiteBottom => Orientation::BlackBottom,
            Orientation::BlackBottom => Orientation::WhiteBottom,
        }
    }

    /// Sign applied to stick deflection so "up" always points away from the human
    pub fn direction(self) -> i8 {
        if self.is_flipped() {
            -1
        } else {
            1
        }
    }
}

/// The colour the human plays; the engine plays the other one
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanSide(pub Color);

impl Default for HumanSide {
    fn default() -> Self {
        HumanSide(Color::White)
    }
}

impl HumanSide {
    pub fn computer(self) -> Color {
        !self.0
    }
}

/// Highlighted board square, always within the board
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Resource)]
pub struct Cursor {
    file: i8,
    rank: i8,
}

impl Cursor {
    pub fn new(file: i8, rank: i8) -> Self {
        Self {
            file: file.clamp(0, BOARD_MAX),
            rank: rank.clamp(0, BOARD_MAX),
        }
    }

    /// Starting cursor: on the king's pawn of the human's side (e2 or e7)
    pub fn starting(human: Color) -> Self {
        match human {
            Color::White => Self::new(4, 1),
            Color::Black => Self::new(4, 6),
        }
    }

    pub fn file(self) -> i8 {
        self.file
    }

    pub fn rank(self) -> i8 {
        self.rank
    }

    /// Move by a delta and clamp each coordinate into the board
    pub fn step(&mut self, file_delta: i32, rank_delta: i32) {
        let clamp = |value: i8, delta: i32| {
            (i32::from(value) + delta).clamp(0, i32::from(BOARD_MAX)) as i8
        };
        self.file = clamp(self.file, file_delta);
        self.rank = clamp(self.rank, rank_delta);
    }

    pub fn square(self) -> Square {
        Square::from_coords(File::new(self.file as u32), Rank::new(self.rank as u32))
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::starting(Color::White)
    }
}

/// Endpoints of the engine's latest move, for highlighting only
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LastComputerMove(pub Option<(Square, Square)>);

impl LastComputerMove {
    pub fn contains(&self, square: Square) -> bool {
        matches!(self.0, Some((from, to)) if from == square || to == square)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_flip_is_involution() {
        for orientation in [Orientation::WhiteBottom, Orientation::BlackBottom] {
            assert_eq!(orientation.flipped().flipped(), orientation);
            assert_eq!(orientation.flipped().direction(), -orientation.direction());
        }
    }

    #[test]
    fn test_orientation_for_human() {
        assert_eq!(Orientation::for_human(Color::White), Orientation::WhiteBottom);
        assert_eq!(Orientation::for_human(Color::Black), Orientation::BlackBottom);
    }

    #[test]
    fn test_cursor_starting_square() {
        assert_eq!(Cursor::starting(Color::White).square(), Square::E2);
        assert_eq!(Cursor::starting(Color::Black).square(), Square::E7);
    }

    #[test]
    fn test_cursor_step_clamps() {
        let mut cursor = Cursor::new(0, 7);
        cursor.step(-1, 1);
        assert_eq!((cursor.file(), cursor.rank()), (0, 7));
        cursor.step(100, -100);
        assert_eq!((cursor.file(), cursor.rank()), (7, 0));
        assert_eq!(cursor.square(), Square::H1);
    }

    #[test]
    fn test_last_computer_move_contains() {
        let last = LastComputerMove(Some((Square::E7, Square::E5)));
        assert!(last.contains(Square::E7));
        assert!(last.contains(Square::E5));
        assert!(!last.contains(Square::E6));
        assert!(!LastComputerMove::default().contains(Square::E7));
    }
}
