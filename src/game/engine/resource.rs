//! Engine selection and search limits
//!
//! Two engines are known by name:
//!
//! | Engine       | Default path            | Limit per move |
//! |--------------|-------------------------|----------------|
//! | `stockfish`  | `/usr/bin/stockfish`    | 1 s            |
//! | `ntc`        | `../nimTUROCHAMP/ntc`   | none           |
//!
//! nimTUROCHAMP searches a fixed depth on its own, so it is sent a bare `go`.

use crate::core::settings_persistence::Settings;
use clap::ValueEnum;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use vampirc_uci::{UciMessage, UciSearchControl, UciTimeControl};

/// Which engine executable to launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EngineKind {
    #[default]
    Stockfish,
    /// nimTUROCHAMP
    #[value(name = "ntc")]
    Turochamp,
}

impl EngineKind {
    pub fn display_name(self) -> &'static str {
        match self {
            EngineKind::Stockfish => "Stockfish",
            EngineKind::Turochamp => "nimTUROCHAMP",
        }
    }
}

/// How long the engine may think about one move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchLimit {
    pub movetime: Option<Duration>,
    pub depth: Option<u32>,
}

impl SearchLimit {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn movetime(duration: Duration) -> Self {
        Self {
            movetime: Some(duration),
            depth: None,
        }
    }

    /// The UCI `go` message for this limit; a bare `go` when unlimited
    pub fn go_message(&self) -> UciMessage {
        let time_control = self.movetime.map(|movetime| {
            let millis = i64::try_from(movetime.as_millis()).unwrap_or(i64::MAX);
            UciTimeControl::MoveTime(chrono::Duration::milliseconds(millis))
        });
        let search_control = self
            .depth
            .map(|depth| UciSearchControl::depth(u8::try_from(depth).unwrap_or(u8::MAX)));
        UciMessage::Go {
            time_control,
            search_control,
        }
    }
}

impl fmt::Display for SearchLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.movetime, self.depth) {
            (None, None) => write!(f, "unlimited"),
            (Some(time), None) => write!(f, "{:.1}s", time.as_secs_f32()),
            (None, Some(depth)) => write!(f, "depth {depth}"),
            (Some(time), Some(depth)) => write!(f, "depth {depth} / {:.1}s", time.as_secs_f32()),
        }
    }
}

/// Everything needed to launch and drive an engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSpec {
    pub kind: EngineKind,
    pub path: PathBuf,
    pub limit: SearchLimit,
}

impl EngineSpec {
    /// Default launch parameters for `kind` from the user's settings
    pub fn from_settings(kind: EngineKind, settings: &Settings) -> Self {
        match kind {
            EngineKind::Stockfish => Self {
                kind,
                path: settings.stockfish_path.clone(),
                limit: SearchLimit::movetime(Duration::from_millis(settings.stockfish_movetime_ms)),
            },
            EngineKind::Turochamp => Self {
                kind,
                path: settings.turochamp_path.clone(),
                limit: SearchLimit::unlimited(),
            },
        }
    }
}
