//! Board state resource wrapping the `shakmaty` rules engine
//!
//! [`BoardState`] is the single source of truth for the game: the current
//! position, the moves played so far (as UCI for the engine and SAN for the
//! game record) and the game result. It is only mutated by playing a legal
//! move.
//!
//! # Game Result
//!
//! [`GameOutcome`] follows the automatic end conditions of the rules:
//! checkmate, stalemate, insufficient material, the seventy-five move rule
//! and fivefold repetition. Draws that a player would have to claim
//! (threefold, fifty moves) do not end the game.

use bevy::prelude::*;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{
    Bitboard, Board, CastlingMode, Chess, Color, EnPassantMode, Move, Outcome, Piece, Position,
    Role, Square,
};

/// Halfmove clock value at which the seventy-five move rule ends the game
const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;

/// Number of occurrences of a position that ends the game
const FIVEFOLD: usize = 5;

/// Result of the game as written to the PGN `Result` tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum GameOutcome {
    #[default]
    InProgress,
    WhiteWins,
    BlackWins,
    Draw,
}

impl GameOutcome {
    pub fn is_over(self) -> bool {
        self != GameOutcome::InProgress
    }

    /// PGN result token
    pub fn pgn_token(self) -> &'static str {
        match self {
            GameOutcome::InProgress => "*",
            GameOutcome::WhiteWins => "1-0",
            GameOutcome::BlackWins => "0-1",
            GameOutcome::Draw => "1/2-1/2",
        }
    }

    /// Human readable result, `None` while the game is running
    pub fn message(self) -> Option<&'static str> {
        match self {
            GameOutcome::InProgress => None,
            GameOutcome::WhiteWins => Some("White wins"),
            GameOutcome::BlackWins => Some("Black wins"),
            GameOutcome::Draw => Some("Draw"),
        }
    }

    pub fn winner(self) -> Option<Color> {
        match self {
            GameOutcome::WhiteWins => Some(Color::White),
            GameOutcome::BlackWins => Some(Color::Black),
            _ => None,
        }
    }
}

impl From<Outcome> for GameOutcome {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Decisive {
                winner: Color::White,
            } => GameOutcome::WhiteWins,
            Outcome::Decisive {
                winner: Color::Black,
            } => GameOutcome::BlackWins,
            Outcome::Draw => GameOutcome::Draw,
        }
    }
}

/// One move of the game as it was played
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedMove {
    /// Standard castling notation (`e1g1`), as engines expect it
    pub uci: UciMove,
    /// SAN with check/mate suffix, as PGN expects it
    pub san: SanPlus,
    pub from: Square,
    pub to: Square,
}

/// Position key used for repetition detection (ignores move counters)
#[derive(Debug, Clone, PartialEq, Eq)]
struct RepetitionKey {
    board: Board,
    turn: Color,
    castling_rights: Bitboard,
    ep_square: Option<Square>,
}

impl RepetitionKey {
    fn of(position: &Chess) -> Self {
        let setup = position.clone().into_setup(EnPassantMode::Legal);
        Self {
            board: setup.board,
            turn: setup.turn,
            castling_rights: setup.castling_rights,
            ep_square: setup.ep_square,
        }
    }
}

/// Current game: position, history and result
#[derive(Resource, Debug, Clone)]
pub struct BoardState {
    position: Chess,
    history: Vec<PlayedMove>,
    seen: Vec<RepetitionKey>,
}

impl Default for BoardState {
    fn default() -> Self {
        Self::from_position(Chess::default())
    }
}

impl BoardState {
    /// Start from an arbitrary position (tests and analysis setups)
    pub fn from_position(position: Chess) -> Self {
        let seen = vec![RepetitionKey::of(&position)];
        Self {
            position,
            history: Vec::new(),
            seen,
        }
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position.board().piece_at(square)
    }

    /// Number of plies played since the session started
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    pub fn history(&self) -> &[PlayedMove] {
        &self.history
    }

    pub fn has_legal_moves(&self) -> bool {
        !self.position.legal_moves().is_empty()
    }

    /// Destination squares of all legal moves starting on `from`
    ///
    /// Castling moves report the king's destination (g1/c1), matching how a
    /// player moves the king on a physical board.
    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        let mut targets = Vec::new();
        for m in self.position.legal_moves() {
            if let Some((src, dst)) = endpoints(&m) {
                if src == from && !targets.contains(&dst) {
                    targets.push(dst);
                }
            }
        }
        targets
    }

    /// Find the legal move going from `from` to `to`
    ///
    /// If several moves share the endpoints (promotions), the queen
    /// promotion is preferred.
    pub fn find_move(&self, from: Square, to: Square) -> Option<Move> {
        let mut candidates: Vec<Move> = self
            .position
            .legal_moves()
            .into_iter()
            .filter(|m| endpoints(m) == Some((from, to)))
            .collect();
        if let Some(index) = candidates
            .iter()
            .position(|m| m.promotion() == Some(Role::Queen))
        {
            return Some(candidates.swap_remove(index));
        }
        candidates.into_iter().next()
    }

    /// Resolve a UCI move from the engine against the current position
    pub fn resolve_uci(&self, uci: &UciMove) -> Option<Move> {
        uci.to_move(&self.position).ok()
    }

    /// Play a move that must be legal in the current position
    ///
    /// Returns `None` and leaves the position untouched if it is not.
    pub fn play(&mut self, m: &Move) -> Option<&PlayedMove> {
        if self.outcome().is_over() || !self.position.is_legal(m) {
            return None;
        }
        let (from, to) = endpoints(m)?;
        let uci = m.to_uci(CastlingMode::Standard);
        let san = SanPlus::from_move_and_play_unchecked(&mut self.position, m);
        self.seen.push(RepetitionKey::of(&self.position));
        self.history.push(PlayedMove { uci, san, from, to });
        self.history.last()
    }

    /// Current game result
    pub fn outcome(&self) -> GameOutcome {
        if let Some(outcome) = self.position.outcome() {
            return outcome.into();
        }
        if self.position.halfmoves() >= SEVENTY_FIVE_MOVE_PLIES {
            return GameOutcome::Draw;
        }
        if let Some(current) = self.seen.last() {
            if self.seen.iter().filter(|key| *key == current).count() >= FIVEFOLD {
                return GameOutcome::Draw;
            }
        }
        GameOutcome::InProgress
    }

    /// Moves played so far in UCI notation, oldest first
    pub fn uci_history(&self) -> Vec<UciMove> {
        self.history.iter().map(|played| played.uci.clone()).collect()
    }
}

/// (from, to) of a move with castling expressed as the king's two-square step
pub fn endpoints(m: &Move) -> Option<(Square, Square)> {
    match m.to_uci(CastlingMode::Standard) {
        UciMove::Normal { from, to, .. } => Some((from, to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::fen::Fen;

    fn position(fen: &str) -> Chess {
        let fen: Fen = fen.parse().unwrap();
        fen.into_position(CastlingMode::Standard).unwrap()
    }

    #[test]
    fn test_starting_position() {
        let board = BoardState::default();
        assert_eq!(board.turn(), Color::White);
        assert_eq!(board.ply(), 0);
        assert_eq!(board.outcome(), GameOutcome::InProgress);
        assert_eq!(board.position().legal_moves().len(), 20);
    }

    #[test]
    fn test_pawn_destinations() {
        let board = BoardState::default();
        let mut targets = board.legal_destinations(Square::E2);
        targets.sort();
        assert_eq!(targets, vec![Square::E3, Square::E4]);
        assert!(board.legal_destinations(Square::E1).is_empty());
        assert!(board.legal_destinations(Square::E4).is_empty());
    }

    #[test]
    fn test_play_records_uci_and_san() {
        let mut board = BoardState::default();
        let m = board.find_move(Square::E2, Square::E4).unwrap();
        let played = board.play(&m).unwrap().clone();
        assert_eq!(played.uci.to_string(), "e2e4");
        assert_eq!(played.san.to_string(), "e4");
        assert_eq!(board.turn(), Color::Black);
        assert_eq!(board.ply(), 1);
    }

    #[test]
    fn test_illegal_move_is_rejected() {
        let mut board = BoardState::default();
        let black_reply = {
            let mut after = board.clone();
            let e4 = after.find_move(Square::E2, Square::E4).unwrap();
            after.play(&e4);
            after.find_move(Square::E7, Square::E5).unwrap()
        };
        assert!(board.play(&black_reply).is_none());
        assert_eq!(board.ply(), 0);
    }

    #[test]
    fn test_castling_uses_king_destination() {
        let board = BoardState::from_position(position(
            "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1",
        ));
        let targets = board.legal_destinations(Square::E1);
        assert!(targets.contains(&Square::G1));
        assert!(targets.contains(&Square::C1));
        let castle = board.find_move(Square::E1, Square::G1).unwrap();
        assert!(castle.is_castle());
        assert_eq!(endpoints(&castle), Some((Square::E1, Square::G1)));
    }

    #[test]
    fn test_promotion_prefers_queen() {
        let board = BoardState::from_position(position("8/P7/8/8/8/8/8/k6K w - - 0 1"));
        let m = board.find_move(Square::A7, Square::A8).unwrap();
        assert_eq!(m.promotion(), Some(Role::Queen));
    }

    #[test]
    fn test_checkmate_outcome() {
        let mut board = BoardState::default();
        for (from, to) in [
            (Square::F2, Square::F3),
            (Square::E7, Square::E5),
            (Square::G2, Square::G4),
            (Square::D8, Square::H4),
        ] {
            let m = board.find_move(from, to).unwrap();
            board.play(&m).unwrap();
        }
        assert_eq!(board.outcome(), GameOutcome::BlackWins);
        assert_eq!(board.outcome().message(), Some("Black wins"));
        assert!(!board.has_legal_moves());
        assert_eq!(board.history().last().unwrap().san.to_string(), "Qh4#");
    }

    #[test]
    fn test_no_moves_after_game_over() {
        let mut board = BoardState::from_position(position("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1"));
        assert_eq!(board.outcome(), GameOutcome::WhiteWins);
        let m = Move::Normal {
            role: Role::King,
            from: Square::H8,
            capture: Some(Role::Queen),
            to: Square::G7,
            promotion: None,
        };
        assert!(board.play(&m).is_none());
    }

    #[test]
    fn test_stalemate_is_draw() {
        let board = BoardState::from_position(position("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1"));
        assert_eq!(board.outcome(), GameOutcome::Draw);
        assert_eq!(board.outcome().pgn_token(), "1/2-1/2");
    }

    #[test]
    fn test_fivefold_repetition_is_draw() {
        let mut board = BoardState::default();
        let shuffle = [
            (Square::G1, Square::F3),
            (Square::G8, Square::F6),
            (Square::F3, Square::G1),
            (Square::F6, Square::G8),
        ];
        for _ in 0..4 {
            assert_eq!(board.outcome(), GameOutcome::InProgress);
            for (from, to) in shuffle {
                let m = board.find_move(from, to).unwrap();
                board.play(&m).unwrap();
            }
        }
        assert_eq!(board.outcome(), GameOutcome::Draw);
    }

    #[test]
    fn test_seventy_five_move_rule() {
        let board = BoardState::from_position(position("8/8/8/3k4/8/3K4/8/7R w - - 150 120"));
        assert_eq!(board.outcome(), GameOutcome::Draw);
    }

    #[test]
    fn test_resolve_uci_from_engine() {
        let board = BoardState::default();
        let uci: UciMove = "g1f3".parse().unwrap();
        let m = board.resolve_uci(&uci).unwrap();
        assert_eq!(endpoints(&m), Some((Square::G1, Square::F3)));
        let bad: UciMove = "e2e5".parse().unwrap();
        assert!(board.resolve_uci(&bad).is_none());
    }
}
