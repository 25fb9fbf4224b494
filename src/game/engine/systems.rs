use super::resource::SearchLimit;
use super::uci::{CancelToken, EngineProcess, MoveSource, SearchRequest};
use crate::core::error::{SessionError, SessionResult};
use crate::core::error_handling::report_session_error;
use crate::game::board_state::{endpoints, BoardState};
use crate::game::recorder::GameRecorder;
use crate::game::session::{HumanSide, LastComputerMove};
use crate::game::system_sets::SessionSystems;
use bevy::prelude::*;
use bevy::tasks::{block_on, AsyncComputeTaskPool, Task};
use futures_lite::future;
use shakmaty::uci::UciMove;
use shakmaty::Square;
use std::time::{Duration, Instant};

/// Plugin for engine systems
///
/// Expects a [`ComputerOpponent`] resource; [`EngineProcess`] is optional so
/// in-process move sources work too.
pub struct EnginePlugin;

impl Plugin for EnginePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EngineStatistics>()
            .register_type::<EngineStatistics>()
            .add_systems(
                Update,
                (poll_engine_move_system, request_engine_move_system)
                    .chain()
                    .in_set(SessionSystems::Engine),
            )
            .add_systems(Last, shutdown_engine_system);
    }
}

/// The engine side of the game
///
/// Holds the engine session while it is idle. During a search the session
/// lives inside the [`PendingEngineMove`] task and `source` is `None`.
#[derive(Resource)]
pub struct ComputerOpponent {
    source: Option<Box<dyn MoveSource>>,
    name: String,
    limit: SearchLimit,
    cancel: CancelToken,
    requests: u32,
    /// Set after a fatal engine error; no further searches are started
    halted: bool,
}

impl ComputerOpponent {
    pub fn new(source: impl MoveSource, limit: SearchLimit) -> Self {
        Self {
            name: source.name().to_string(),
            source: Some(Box::new(source)),
            limit,
            cancel: CancelToken::default(),
            requests: 0,
            halted: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn limit(&self) -> SearchLimit {
        self.limit
    }

    /// Number of searches started this session
    pub fn requests(&self) -> u32 {
        self.requests
    }

    /// Whether a search is currently running
    pub fn is_thinking(&self) -> bool {
        self.source.is_none()
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }
}

/// Resource holding the running search task
#[derive(Resource)]
pub struct PendingEngineMove {
    task: Task<EngineReply>,
    /// Board ply the request was made at; replies for any other ply are stale
    requested_at_ply: usize,
}

/// What a finished search task hands back
pub struct EngineReply {
    source: Box<dyn MoveSource>,
    result: SessionResult<UciMove>,
    thinking_time: Duration,
}

/// Resource to track engine statistics
#[derive(Resource, Default, Debug, Reflect)]
#[reflect(Resource)]
pub struct EngineStatistics {
    pub moves_played: u32,
    pub last_thinking_time: f32,
}

/// Whether the engine should be asked for a move now
///
/// Only on the computer's turn, while the game runs and a legal move exists;
/// a position without legal moves never reaches the engine.
pub fn computer_should_move(board: &BoardState, human: HumanSide) -> bool {
    board.turn() == human.computer() && !board.outcome().is_over() && board.has_legal_moves()
}

/// Play a finished engine reply on the board
///
/// Returns `Ok(None)` for a stale reply (the board moved on since the
/// request, or it is not the computer's turn), which is dropped unplayed.
pub fn apply_engine_reply(
    board: &mut BoardState,
    human: HumanSide,
    requested_at_ply: usize,
    uci: &UciMove,
) -> SessionResult<Option<(Square, Square)>> {
    if board.ply() != requested_at_ply || board.turn() != human.computer() {
        return Ok(None);
    }
    let illegal = || SessionError::IllegalEngineMove {
        uci: uci.to_string(),
    };
    let m = board.resolve_uci(uci).ok_or_else(illegal)?;
    let squares = endpoints(&m).ok_or_else(illegal)?;
    board.play(&m).ok_or_else(illegal)?;
    Ok(Some(squares))
}

/// System that starts a search when it's the computer's turn
pub fn request_engine_move_system(
    mut commands: Commands,
    board: Res<BoardState>,
    human: Res<HumanSide>,
    mut opponent: ResMut<ComputerOpponent>,
    pending: Option<Res<PendingEngineMove>>,
) {
    if opponent.halted || pending.is_some() || !computer_should_move(&board, *human) {
        return;
    }
    let Some(mut source) = opponent.source.take() else {
        return;
    };

    let request = SearchRequest {
        moves: board.uci_history(),
        limit: opponent.limit,
    };
    let cancel = opponent.cancel.clone();
    opponent.requests += 1;

    info!(
        "[ENGINE] {} thinking on ply {} ({})",
        opponent.name,
        board.ply(),
        opponent.limit
    );

    let task = AsyncComputeTaskPool::get().spawn(async move {
        let start = Instant::now();
        let result = source.best_move(&request, &cancel);
        EngineReply {
            source,
            result,
            thinking_time: start.elapsed(),
        }
    });

    commands.insert_resource(PendingEngineMove {
        task,
        requested_at_ply: board.ply(),
    });
}

/// System that plays the engine's move once its search finishes
#[allow(clippy::too_many_arguments)]
pub fn poll_engine_move_system(
    mut commands: Commands,
    pending: Option<ResMut<PendingEngineMove>>,
    mut opponent: ResMut<ComputerOpponent>,
    mut board: ResMut<BoardState>,
    human: Res<HumanSide>,
    mut last_move: ResMut<LastComputerMove>,
    mut stats: ResMut<EngineStatistics>,
    recorder: Res<GameRecorder>,
    mut exit: MessageWriter<AppExit>,
) {
    let Some(mut pending) = pending else {
        return;
    };
    if !pending.task.is_finished() {
        return;
    }
    let Some(reply) = block_on(future::poll_once(&mut pending.task)) else {
        warn!("[ENGINE] Task reported finished but result not available");
        return;
    };
    let requested_at_ply = pending.requested_at_ply;
    commands.remove_resource::<PendingEngineMove>();
    opponent.source = Some(reply.source);

    let uci = match reply.result {
        Ok(uci) => uci,
        Err(e) => {
            opponent.halted |= report_session_error(&e, &mut exit);
            return;
        }
    };

    match apply_engine_reply(&mut board, *human, requested_at_ply, &uci) {
        Ok(Some(squares)) => {
            last_move.0 = Some(squares);
            stats.moves_played += 1;
            stats.last_thinking_time = reply.thinking_time.as_secs_f32();
            info!(
                "[ENGINE] {} played {} after {:.2}s",
                opponent.name,
                uci,
                stats.last_thinking_time
            );
            recorder.write_or_log(&board);
        }
        Ok(None) => {
            warn!(
                "[ENGINE] Discarding stale reply {} requested at ply {} (now ply {})",
                uci,
                requested_at_ply,
                board.ply()
            );
        }
        Err(e) => opponent.halted |= report_session_error(&e, &mut exit),
    }
}

/// System that stops the engine when the app exits
///
/// An idle engine is sent `quit` and given a moment to exit; a searching
/// engine is cancelled and killed so the search task ends with it.
pub fn shutdown_engine_system(
    mut exits: MessageReader<AppExit>,
    opponent: Option<ResMut<ComputerOpponent>>,
    process: Option<ResMut<EngineProcess>>,
) {
    if exits.read().next().is_none() {
        return;
    }
    let Some(mut opponent) = opponent else {
        return;
    };
    opponent.cancel.cancel();
    let searching = opponent.is_thinking();
    if let Some(source) = opponent.source.as_mut() {
        source.quit();
    }
    if let Some(mut process) = process {
        if searching {
            info!("[ENGINE] Cancelling search in progress");
            process.terminate();
        } else {
            process.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::fen::Fen;
    use shakmaty::{CastlingMode, Chess, Color};

    fn uci(text: &str) -> UciMove {
        text.parse().unwrap()
    }

    fn after(moves: &[&str]) -> BoardState {
        let mut board = BoardState::default();
        for text in moves {
            let m = board.resolve_uci(&uci(text)).unwrap();
            board.play(&m).unwrap();
        }
        board
    }

    #[test]
    fn test_computer_moves_only_on_its_turn() {
        let human = HumanSide(Color::White);
        assert!(!computer_should_move(&BoardState::default(), human));
        assert!(computer_should_move(&after(&["e2e4"]), human));
        assert!(computer_should_move(&BoardState::default(), HumanSide(Color::Black)));
    }

    #[test]
    fn test_no_request_without_legal_moves() {
        //! Checkmated or stalemated computer never asks the engine
        let mated = after(&["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert!(!computer_should_move(&mated, HumanSide(Color::Black)));

        let fen: Fen = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1".parse().unwrap();
        let stalemate: Chess = fen.into_position(CastlingMode::Standard).unwrap();
        let board = BoardState::from_position(stalemate);
        assert!(!computer_should_move(&board, HumanSide(Color::White)));
    }

    #[test]
    fn test_apply_reply_plays_move() {
        let mut board = after(&["e2e4"]);
        let squares = apply_engine_reply(&mut board, HumanSide(Color::White), 1, &uci("e7e5"))
            .unwrap()
            .unwrap();
        assert_eq!(squares, (Square::E7, Square::E5));
        assert_eq!(board.ply(), 2);
    }

    #[test]
    fn test_stale_reply_is_dropped() {
        let mut board = after(&["e2e4", "e7e5"]);
        let result = apply_engine_reply(&mut board, HumanSide(Color::White), 1, &uci("e7e5"));
        assert!(matches!(result, Ok(None)));
        assert_eq!(board.ply(), 2);
    }

    #[test]
    fn test_illegal_reply_is_error() {
        let mut board = after(&["e2e4"]);
        let err = apply_engine_reply(&mut board, HumanSide(Color::White), 1, &uci("e7e4"))
            .unwrap_err();
        assert!(matches!(err, SessionError::IllegalEngineMove { .. }));
        assert_eq!(board.ply(), 1);
    }

    #[test]
    fn test_castling_reply_highlights_king_squares() {
        let mut board = after(&["e2e4", "e7e5", "g1f3", "g8f6", "f1c4", "f8c5", "a2a3"]);
        let squares = apply_engine_reply(&mut board, HumanSide(Color::White), 7, &uci("e8g8"))
            .unwrap()
            .unwrap();
        assert_eq!(squares, (Square::E8, Square::G8));
    }
}
