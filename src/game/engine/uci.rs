//! UCI engine subprocess
//!
//! Two halves with separate owners:
//!
//! - [`EngineProcess`] owns the child process. It stays in the app for the
//!   whole session and is the only thing that can terminate the engine.
//! - [`UciSession`] owns the engine's stdin/stdout and speaks the protocol.
//!   It is moved into the search task for each computer move and handed back
//!   with the reply, so it is never shared between threads.
//!
//! Killing the process closes stdout, which makes any blocked read in a
//! running search return; that is how shutdown cancels a search in flight.
//!
//! Lines are parsed and commands serialized with `vampirc_uci`. Moves cross
//! over to shakmaty's [`UciMove`] only at the board boundary.
//!
//! # Conversation
//!
//! ```text
//! > uci                         < id name Stockfish 17 ... uciok
//! > ucinewgame
//! > isready                     < readyok
//! > position startpos moves e2e4
//! > go movetime 1000            < info ... bestmove e7e5
//! > quit
//! ```

use super::resource::{EngineSpec, SearchLimit};
use crate::core::error::{SessionError, SessionResult};
use bevy::prelude::Resource;
use shakmaty::uci::UciMove;
use shakmaty::{File, Rank, Role, Square};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};
use vampirc_uci::{parse_one, UciMessage, UciPiece, UciSquare};

/// Time the engine gets to exit on its own after `quit`
const QUIT_GRACE: Duration = Duration::from_millis(500);

/// Shared flag telling a running search that the session is over
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One "find a move" request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Every move since the starting position, oldest first
    pub moves: Vec<UciMove>,
    pub limit: SearchLimit,
}

impl SearchRequest {
    /// The UCI `position startpos moves ...` message for this request
    pub fn position_message(&self) -> SessionResult<UciMessage> {
        Ok(UciMessage::Position {
            startpos: true,
            fen: None,
            moves: self.moves.iter().map(wire_move).collect::<SessionResult<_>>()?,
        })
    }
}

fn wire_square(square: Square) -> UciSquare {
    let index = u32::from(square);
    UciSquare {
        file: square.file().char(),
        rank: (index / 8) as u8 + 1,
    }
}

fn wire_move(m: &UciMove) -> SessionResult<vampirc_uci::UciMove> {
    let &UciMove::Normal {
        from,
        to,
        promotion,
    } = m
    else {
        return Err(SessionError::protocol(format!("cannot send move {m}")));
    };
    Ok(vampirc_uci::UciMove {
        from: wire_square(from),
        to: wire_square(to),
        promotion: promotion.map(|role| match role {
            Role::Pawn => UciPiece::Pawn,
            Role::Knight => UciPiece::Knight,
            Role::Bishop => UciPiece::Bishop,
            Role::Rook => UciPiece::Rook,
            Role::Queen => UciPiece::Queen,
            Role::King => UciPiece::King,
        }),
    })
}

/// An engine's `bestmove` as a board move
fn board_move(wire: &vampirc_uci::UciMove) -> SessionResult<UciMove> {
    let square = |s: &UciSquare| {
        let rank = char::from_digit(u32::from(s.rank), 10)?;
        Some(Square::from_coords(
            File::from_char(s.file)?,
            Rank::from_char(rank)?,
        ))
    };
    let (Some(from), Some(to)) = (square(&wire.from), square(&wire.to)) else {
        return Err(SessionError::protocol(format!("invalid bestmove '{wire}'")));
    };
    Ok(UciMove::Normal {
        from,
        to,
        promotion: wire.promotion.map(|piece| match piece {
            UciPiece::Pawn => Role::Pawn,
            UciPiece::Knight => Role::Knight,
            UciPiece::Bishop => Role::Bishop,
            UciPiece::Rook => Role::Rook,
            UciPiece::Queen => Role::Queen,
            UciPiece::King => Role::King,
        }),
    })
}

/// Anything that can answer a search request
///
/// Implemented by [`UciSession`]; tests substitute scripted opponents.
pub trait MoveSource: Send + Sync + 'static {
    /// Display name, used in logs and the PGN header
    fn name(&self) -> &str;

    /// Search the position after `request.moves` and return the chosen move
    fn best_move(&mut self, request: &SearchRequest, cancel: &CancelToken) -> SessionResult<UciMove>;

    /// Ask the engine to exit
    fn quit(&mut self);
}

/// UCI protocol over any line reader and writer
#[derive(Debug)]
pub struct UciSession<R, W> {
    reader: R,
    writer: W,
    name: String,
}

/// A session talking to a spawned engine process
pub type ProcessSession = UciSession<BufReader<ChildStdout>, BufWriter<ChildStdin>>;

impl<R: BufRead, W: Write> UciSession<R, W> {
    pub fn new(reader: R, writer: W, fallback_name: impl Into<String>) -> Self {
        Self {
            reader,
            writer,
            name: fallback_name.into(),
        }
    }

    /// `uci` … `uciok`, then `ucinewgame` and `isready` … `readyok`
    ///
    /// Picks up the engine's `id name` on the way.
    pub fn handshake(&mut self) -> SessionResult<()> {
        self.send(&UciMessage::Uci)?;
        loop {
            match parse_one(&self.read_line(None)?) {
                UciMessage::Id {
                    name: Some(name), ..
                } => self.name = name.trim().to_string(),
                UciMessage::UciOk => break,
                _ => {}
            }
        }
        self.send(&UciMessage::UciNewGame)?;
        self.send(&UciMessage::IsReady)?;
        while !matches!(parse_one(&self.read_line(None)?), UciMessage::ReadyOk) {}
        info!("[ENGINE] {} ready", self.name);
        Ok(())
    }

    fn search(&mut self, request: &SearchRequest, cancel: &CancelToken) -> SessionResult<UciMove> {
        self.send(&request.position_message()?)?;
        self.send(&request.limit.go_message())?;
        loop {
            let line = self.read_line(Some(cancel))?;
            match parse_one(&line) {
                UciMessage::BestMove { best_move, .. } => return board_move(&best_move),
                // `bestmove (none)` and `bestmove 0000` do not parse as a move
                UciMessage::Unknown(..) if line.starts_with("bestmove") => {
                    return Err(SessionError::protocol(format!(
                        "engine found no usable move: '{line}'"
                    )));
                }
                _ => {}
            }
        }
    }

    fn send(&mut self, message: &UciMessage) -> SessionResult<()> {
        let command = message.to_string();
        let command = command.trim_end();
        trace!("[ENGINE] > {}", command);
        writeln!(self.writer, "{command}")
            .and_then(|_| self.writer.flush())
            .map_err(|e| SessionError::crashed(format!("cannot write to engine: {e}")))
    }

    /// Next non-empty line, trimmed
    ///
    /// End of stream means the engine is gone: cancelled if the session asked
    /// for it, crashed otherwise.
    fn read_line(&mut self, cancel: Option<&CancelToken>) -> SessionResult<String> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = self.reader.read_line(&mut line);
            if cancel.is_some_and(CancelToken::is_cancelled) {
                return Err(SessionError::Cancelled);
            }
            match read {
                Ok(0) => return Err(SessionError::crashed("engine closed its output")),
                Ok(_) => {
                    let trimmed = line.trim();
                    if !trimmed.is_empty() {
                        trace!("[ENGINE] < {}", trimmed);
                        return Ok(trimmed.to_string());
                    }
                }
                Err(e) => return Err(SessionError::crashed(format!("cannot read from engine: {e}"))),
            }
        }
    }
}

impl<R, W> MoveSource for UciSession<R, W>
where
    R: BufRead + Send + Sync + 'static,
    W: Write + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn best_move(&mut self, request: &SearchRequest, cancel: &CancelToken) -> SessionResult<UciMove> {
        if cancel.is_cancelled() {
            return Err(SessionError::Cancelled);
        }
        self.search(request, cancel)
    }

    fn quit(&mut self) {
        if let Err(e) = self.send(&UciMessage::Quit) {
            debug!("[ENGINE] quit not delivered: {}", e);
        }
    }
}

/// The running engine child process
#[derive(Resource, Debug)]
pub struct EngineProcess {
    child: Child,
    path: PathBuf,
}

impl EngineProcess {
    /// Launch the engine and complete the UCI handshake
    pub fn spawn(spec: &EngineSpec) -> SessionResult<(Self, ProcessSession)> {
        info!("[ENGINE] Launching {:?} ({})", spec.path, spec.kind.display_name());
        let unavailable = |message: String| SessionError::EngineUnavailable {
            path: spec.path.clone(),
            message,
        };

        let mut child = Command::new(&spec.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| unavailable(e.to_string()))?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            return Err(unavailable("stdio not captured".to_string()));
        };

        let mut session = UciSession::new(
            BufReader::new(stdout),
            BufWriter::new(stdin),
            spec.kind.display_name(),
        );
        let mut process = Self {
            child,
            path: spec.path.clone(),
        };
        if let Err(e) = session.handshake() {
            process.terminate();
            return Err(unavailable(e.to_string()));
        }
        Ok((process, session))
    }

    /// Whether the process is still running
    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Give the engine [`QUIT_GRACE`] to exit after `quit`, then kill it
    pub fn shutdown(&mut self) {
        let deadline = Instant::now() + QUIT_GRACE;
        while Instant::now() < deadline {
            if !self.is_alive() {
                info!("[ENGINE] {:?} exited", self.path);
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        warn!("[ENGINE] {:?} did not exit after quit, killing it", self.path);
        self.terminate();
    }

    /// Kill the process immediately
    pub fn terminate(&mut self) {
        if self.is_alive() {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        self.terminate();
    }
}
