//! Piece selection state machine
//!
//! A single confirm press either picks up a piece or puts it down:
//!
//! ```text
//! Idle ──confirm on own piece with legal moves──▶ PieceSelected
//! PieceSelected ──confirm on a target square──▶ Idle (move played)
//! PieceSelected ──confirm anywhere else──▶ PieceSelected (no-op)
//! ```
//!
//! There is no deselect gesture. Presses are ignored while the game is over
//! or while it is not the human's turn.

use crate::game::board_state::BoardState;
use crate::game::recorder::GameRecorder;
use crate::game::session::{Cursor, HumanSide};
use crate::input::PendingConfirms;
use bevy::prelude::*;
use shakmaty::{Color, Move, Square};

/// Currently held piece, if any
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Idle,
    PieceSelected {
        from: Square,
        /// Legal destinations of `from`, never empty
        targets: Vec<Square>,
    },
}

/// What a confirm press did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Nothing changed
    Ignored,
    /// A piece was picked up
    Selected { from: Square },
    /// A move was played and the selection cleared
    Moved(Move),
}

impl Selection {
    pub fn clear(&mut self) {
        *self = Selection::Idle;
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, Selection::PieceSelected { .. })
    }

    pub fn selected_square(&self) -> Option<Square> {
        match self {
            Selection::PieceSelected { from, .. } => Some(*from),
            Selection::Idle => None,
        }
    }

    pub fn targets(&self) -> &[Square] {
        match self {
            Selection::PieceSelected { targets, .. } => targets,
            Selection::Idle => &[],
        }
    }

    pub fn is_target(&self, square: Square) -> bool {
        self.targets().contains(&square)
    }

    /// Handle one confirm press with the cursor on `cursor`
    ///
    /// On [`ConfirmOutcome::Moved`] the move has already been played on
    /// `board`; the caller is responsible for persisting the game record.
    pub fn confirm(&mut self, board: &mut BoardState, cursor: Square, human: Color) -> ConfirmOutcome {
        if board.outcome().is_over() || board.turn() != human {
            return ConfirmOutcome::Ignored;
        }

        match self {
            Selection::Idle => {
                let owned = board
                    .piece_at(cursor)
                    .is_some_and(|piece| piece.color == human);
                if !owned {
                    return ConfirmOutcome::Ignored;
                }
                let targets = board.legal_destinations(cursor);
                if targets.is_empty() {
                    return ConfirmOutcome::Ignored;
                }
                *self = Selection::PieceSelected {
                    from: cursor,
                    targets,
                };
                ConfirmOutcome::Selected { from: cursor }
            }
            Selection::PieceSelected { from, targets } => {
                if !targets.contains(&cursor) {
                    return ConfirmOutcome::Ignored;
                }
                let Some(m) = board.find_move(*from, cursor) else {
                    return ConfirmOutcome::Ignored;
                };
                if board.play(&m).is_none() {
                    return ConfirmOutcome::Ignored;
                }
                self.clear();
                ConfirmOutcome::Moved(m)
            }
        }
    }
}

/// Feed the presses collected since the last tick into the selection
///
/// Each press is applied against the same cursor square. A double press on
/// a piece selects it and the second press is ignored, since a piece's own
/// square is never one of its targets.
pub fn apply_confirms_system(
    mut presses: ResMut<PendingConfirms>,
    mut selection: ResMut<Selection>,
    mut board: ResMut<BoardState>,
    cursor: Res<Cursor>,
    human: Res<HumanSide>,
    recorder: Res<GameRecorder>,
) {
    for _ in 0..presses.drain() {
        match selection.confirm(&mut board, cursor.square(), human.0) {
            ConfirmOutcome::Ignored => {}
            ConfirmOutcome::Selected { from } => {
                debug!(
                    "[SELECTION] Picked up {} ({} target(s))",
                    from,
                    selection.targets().len()
                );
            }
            ConfirmOutcome::Moved(_) => {
                if let Some(played) = board.history().last() {
                    info!("[SELECTION] Human played {}", played.san);
                }
                recorder.write_or_log(&board);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::Role;

    #[test]
    fn test_select_pawn_then_move() {
        //! e2 → {e3, e4}, then e4 plays e2e4
        let mut board = BoardState::default();
        let mut selection = Selection::default();

        let outcome = selection.confirm(&mut board, Square::E2, Color::White);
        assert_eq!(outcome, ConfirmOutcome::Selected { from: Square::E2 });
        let mut targets = selection.targets().to_vec();
        targets.sort();
        assert_eq!(targets, vec![Square::E3, Square::E4]);

        let outcome = selection.confirm(&mut board, Square::E4, Color::White);
        assert!(matches!(outcome, ConfirmOutcome::Moved(_)));
        assert_eq!(selection, Selection::Idle);
        let pawn = board.piece_at(Square::E4).unwrap();
        assert_eq!(pawn.role, Role::Pawn);
        assert_eq!(pawn.color, Color::White);
        assert!(board.piece_at(Square::E2).is_none());
    }

    #[test]
    fn test_empty_square_stays_idle() {
        let mut board = BoardState::default();
        let mut selection = Selection::default();
        assert_eq!(
            selection.confirm(&mut board, Square::E4, Color::White),
            ConfirmOutcome::Ignored
        );
        assert_eq!(selection, Selection::Idle);
    }

    #[test]
    fn test_opponent_piece_stays_idle() {
        let mut board = BoardState::default();
        let mut selection = Selection::default();
        selection.confirm(&mut board, Square::E7, Color::White);
        assert_eq!(selection, Selection::Idle);
    }

    #[test]
    fn test_immobile_piece_stays_idle() {
        //! The king and rooks cannot move from the starting position
        let mut board = BoardState::default();
        let mut selection = Selection::default();
        for square in [Square::E1, Square::A1, Square::D1, Square::F1] {
            selection.confirm(&mut board, square, Color::White);
            assert_eq!(selection, Selection::Idle, "{square} should not be selectable");
        }
    }

    #[test]
    fn test_confirm_on_non_target_keeps_selection() {
        let mut board = BoardState::default();
        let mut selection = Selection::default();
        selection.confirm(&mut board, Square::G1, Color::White);
        assert_eq!(selection.selected_square(), Some(Square::G1));

        // Another own piece does not reselect
        let outcome = selection.confirm(&mut board, Square::B1, Color::White);
        assert_eq!(outcome, ConfirmOutcome::Ignored);
        assert_eq!(selection.selected_square(), Some(Square::G1));
        assert_eq!(board.ply(), 0);
    }

    #[test]
    fn test_not_human_turn_is_ignored() {
        let mut board = BoardState::default();
        let mut selection = Selection::default();
        assert_eq!(
            selection.confirm(&mut board, Square::E7, Color::Black),
            ConfirmOutcome::Ignored
        );
        assert_eq!(selection, Selection::Idle);
    }

    #[test]
    fn test_every_mobile_piece_selects_its_destinations() {
        let mut board = BoardState::default();
        for index in 0..64u32 {
            let square = Square::new(index);
            let mut selection = Selection::default();
            let expected = board.legal_destinations(square);
            let own = board
                .piece_at(square)
                .is_some_and(|piece| piece.color == Color::White);
            selection.confirm(&mut board, square, Color::White);
            if own && !expected.is_empty() {
                assert_eq!(selection.targets(), expected.as_slice());
            } else {
                assert_eq!(selection, Selection::Idle);
            }
        }
        assert_eq!(board.ply(), 0);
    }

    #[test]
    fn test_no_selection_after_game_over() {
        let mut board = BoardState::default();
        for (from, to) in [
            (Square::F2, Square::F3),
            (Square::E7, Square::E5),
            (Square::G2, Square::G4),
            (Square::D8, Square::H4),
        ] {
            let m = board.find_move(from, to).unwrap();
            board.play(&m);
        }
        let mut selection = Selection::default();
        assert_eq!(
            selection.confirm(&mut board, Square::E1, Color::White),
            ConfirmOutcome::Ignored
        );
    }
}
