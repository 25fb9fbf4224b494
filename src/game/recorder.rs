//! PGN game record
//!
//! After every ply the whole game is written to one file, replacing the
//! previous contents, so the file always holds the game up to the last move
//! even if the session is killed.
//!
//! # Format
//!
//! ```text
//! [Event "padchess game"]
//! [Site "?"]
//! [Date "2026.10.19"]
//! [Round "?"]
//! [White "Human"]
//! [Black "Stockfish 17"]
//! [Result "*"]
//!
//! 1. e4 e5 2. Nf3 *
//! ```
//!
//! Movetext is wrapped at 80 columns.

use crate::core::error::{SessionError, SessionResult};
use crate::game::board_state::BoardState;
use bevy::prelude::*;
use shakmaty::Color;
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum movetext line length
const LINE_WIDTH: usize = 80;

/// Tag pairs written above the movetext
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgnHeaders {
    pub event: String,
    pub site: String,
    pub date: String,
    pub round: String,
    pub white: String,
    pub black: String,
}

impl Default for PgnHeaders {
    fn default() -> Self {
        Self {
            event: "?".to_string(),
            site: "?".to_string(),
            date: "????.??.??".to_string(),
            round: "?".to_string(),
            white: "?".to_string(),
            black: "?".to_string(),
        }
    }
}

impl PgnHeaders {
    /// Headers for a human vs engine game started today
    pub fn for_session(human: Color, engine_name: &str) -> Self {
        let (white, black) = match human {
            Color::White => ("Human".to_string(), engine_name.to_string()),
            Color::Black => (engine_name.to_string(), "Human".to_string()),
        };
        Self {
            event: "padchess game".to_string(),
            date: chrono::Local::now().format("%Y.%m.%d").to_string(),
            white,
            black,
            ..Self::default()
        }
    }
}

/// Writes the game to a fixed path after every ply
#[derive(Resource, Debug, Clone)]
pub struct GameRecorder {
    path: PathBuf,
    headers: PgnHeaders,
}

impl GameRecorder {
    pub fn new(path: impl Into<PathBuf>, headers: PgnHeaders) -> Self {
        Self {
            path: path.into(),
            headers,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render the full game as PGN text
    pub fn render(&self, board: &BoardState) -> String {
        let result = board.outcome().pgn_token();
        let mut pgn = String::new();
        for (name, value) in [
            ("Event", &self.headers.event),
            ("Site", &self.headers.site),
            ("Date", &self.headers.date),
            ("Round", &self.headers.round),
            ("White", &self.headers.white),
            ("Black", &self.headers.black),
        ] {
            pgn.push_str(&format!("[{name} \"{}\"]\n", escape(value)));
        }
        pgn.push_str(&format!("[Result \"{result}\"]\n\n"));

        let mut tokens = Vec::with_capacity(board.ply() * 3 / 2 + 1);
        for (index, played) in board.history().iter().enumerate() {
            if index % 2 == 0 {
                tokens.push(format!("{}.", index / 2 + 1));
            }
            tokens.push(played.san.to_string());
        }
        tokens.push(result.to_string());

        pgn.push_str(&wrap(&tokens));
        pgn.push_str("\n\n\n");
        pgn
    }

    /// Overwrite the record file with the current game
    pub fn write(&self, board: &BoardState) -> SessionResult<()> {
        fs::write(&self.path, self.render(board)).map_err(|source| SessionError::RecordWrite {
            path: self.path.clone(),
            source,
        })
    }

    /// Write the record, logging instead of failing
    ///
    /// The in-memory game stays authoritative when the file cannot be written.
    pub fn write_or_log(&self, board: &BoardState) {
        match self.write(board) {
            Ok(()) => debug!("[PGN] Wrote ply {} to {:?}", board.ply(), self.path),
            Err(e) => error!("[PGN] {}", e),
        }
    }
}

/// Escape a tag value per PGN export rules
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Join tokens with spaces, breaking lines before they exceed [`LINE_WIDTH`]
fn wrap(tokens: &[String]) -> String {
    let mut out = String::new();
    let mut line_len = 0;
    for token in tokens {
        if line_len > 0 && line_len + 1 + token.len() > LINE_WIDTH {
            out.push('\n');
            line_len = 0;
        } else if line_len > 0 {
            out.push(' ');
            line_len += 1;
        }
        out.push_str(token);
        line_len += token.len();
    }
    out
}
