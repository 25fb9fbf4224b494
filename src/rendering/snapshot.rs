//! Read-only view of the session for drawing
//!
//! [`RenderSnapshot`] is rebuilt from the game resources twice per tick,
//! after human input and after the computer's move. Drawing systems read
//! nothing else, so what is on screen is always one consistent state.

use crate::game::board_state::{BoardState, GameOutcome};
use crate::game::selection::Selection;
use crate::game::session::{Cursor, LastComputerMove};
use bevy::prelude::*;
use shakmaty::{Piece, Square};

/// Base window title
pub const APP_TITLE: &str = "padchess";

/// Colour of the cursor ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorColor {
    /// Nothing selected
    Idle,
    /// Over a legal destination of the selected piece
    Target,
    /// A piece is selected but this square is not a destination
    Blocked,
}

impl CursorColor {
    pub fn color(self) -> Color {
        match self {
            CursorColor::Idle => Color::srgba_u8(0, 0, 255, 200),
            CursorColor::Target => Color::srgba_u8(0, 255, 0, 200),
            CursorColor::Blocked => Color::srgba_u8(255, 0, 0, 200),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SquareView {
    pub piece: Option<Piece>,
    /// Endpoint of the last computer move
    pub highlighted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorView {
    pub square: Square,
    pub color: CursorColor,
}

/// Everything the renderer draws, indexed by square
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct RenderSnapshot {
    squares: [SquareView; 64],
    /// `None` once the game is over
    pub cursor: Option<CursorView>,
    pub title: String,
}

impl Default for RenderSnapshot {
    fn default() -> Self {
        Self::build(
            &BoardState::default(),
            &Selection::default(),
            Cursor::default(),
            &LastComputerMove::default(),
        )
    }
}

impl RenderSnapshot {
    pub fn build(
        board: &BoardState,
        selection: &Selection,
        cursor: Cursor,
        last_move: &LastComputerMove,
    ) -> Self {
        let squares = std::array::from_fn(|index| {
            let square = Square::new(index as u32);
            SquareView {
                piece: board.piece_at(square),
                highlighted: last_move.contains(square),
            }
        });

        let outcome = board.outcome();
        let cursor = (!outcome.is_over()).then(|| {
            let square = cursor.square();
            let color = if !selection.is_selected() {
                CursorColor::Idle
            } else if selection.is_target(square) {
                CursorColor::Target
            } else {
                CursorColor::Blocked
            };
            CursorView { square, color }
        });

        Self {
            squares,
            cursor,
            title: window_title(outcome),
        }
    }

    pub fn square(&self, square: Square) -> &SquareView {
        &self.squares[usize::from(square)]
    }

    pub fn squares(&self) -> impl Iterator<Item = (Square, &SquareView)> {
        self.squares
            .iter()
            .enumerate()
            .map(|(index, view)| (Square::new(index as u32), view))
    }
}

/// Window title for a game result
pub fn window_title(outcome: GameOutcome) -> String {
    match outcome.message() {
        Some(message) => format!("{APP_TITLE} -- {message}"),
        None => APP_TITLE.to_string(),
    }
}

/// Rebuild the snapshot, touching the resource only when something changed
pub fn rebuild_snapshot_system(
    board: Res<BoardState>,
    selection: Res<Selection>,
    cursor: Res<Cursor>,
    last_move: Res<LastComputerMove>,
    mut snapshot: ResMut<RenderSnapshot>,
) {
    snapshot.set_if_neq(RenderSnapshot::build(
        &board,
        &selection,
        *cursor,
        &last_move,
    ));
}

/// Copy the snapshot title to the primary window
pub fn update_title_system(
    snapshot: Res<RenderSnapshot>,
    mut windows: Query<&mut Window, With<bevy::window::PrimaryWindow>>,
) {
    if !snapshot.is_changed() {
        return;
    }
    for mut window in &mut windows {
        if window.title != snapshot.title {
            info!("[SESSION] {}", snapshot.title);
            window.title = snapshot.title.clone();
        }
    }
}
