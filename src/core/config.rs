//! Command line and session configuration
//!
//! [`Cli`] is parsed with clap, then merged over the persisted [`Settings`]
//! into a [`SessionConfig`] resource that stays fixed for the whole session.
//!
//! The bare words `ntc` and `black` are accepted as positional arguments so
//! `padchess ntc black` keeps working next to `--engine ntc --black`.

use crate::core::error::{SessionError, SessionResult};
use crate::core::settings_persistence::Settings;
use crate::game::engine::{EngineKind, EngineSpec};
use crate::game::session::Orientation;
use bevy::prelude::*;
use clap::Parser;
use shakmaty::Color;
use std::path::PathBuf;
use std::time::Duration;

/// Slowest accepted session tick rate (one tick every 100 s)
pub const MIN_TICK_RATE: f32 = 0.01;

/// Play chess against a UCI engine with a joystick or gamepad
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "padchess", version, about)]
pub struct Cli {
    /// Engine to play against
    #[arg(long, value_enum)]
    pub engine: Option<EngineKind>,

    /// Play Black (the board is drawn from Black's side)
    #[arg(long)]
    pub black: bool,

    /// Override the engine executable
    #[arg(long, value_name = "PATH")]
    pub engine_path: Option<PathBuf>,

    /// Engine thinking time per move in milliseconds
    #[arg(long, value_name = "MS")]
    pub movetime: Option<u64>,

    /// Engine search depth per move
    #[arg(long, value_name = "N")]
    pub depth: Option<u32>,

    /// Game record file rewritten after every move
    #[arg(long, value_name = "PATH")]
    pub pgn: Option<PathBuf>,

    /// Session ticks per second
    #[arg(long, value_name = "HZ")]
    pub tick_rate: Option<f32>,

    /// Stick deflection (0..1) needed to move the cursor
    #[arg(long, value_name = "F")]
    pub threshold: Option<f32>,

    /// Short forms: `ntc` selects nimTUROCHAMP, `black` plays Black
    #[arg(value_name = "WORD")]
    pub words: Vec<String>,
}

/// Resolved configuration for one play session
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub human: Color,
    pub engine: EngineSpec,
    pub pgn_path: PathBuf,
    pub tick_rate: f32,
    pub deflection_threshold: f32,
    pub highlight_rgba: [u8; 4],
}

impl Default for SessionConfig {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            human: Color::White,
            engine: EngineSpec::from_settings(EngineKind::Stockfish, &settings),
            pgn_path: settings.pgn_path,
            tick_rate: settings.tick_rate,
            deflection_threshold: settings.deflection_threshold,
            highlight_rgba: settings.highlight_rgba,
        }
    }
}

impl SessionConfig {
    /// Merge command line flags over persisted settings
    pub fn resolve(cli: &Cli, settings: &Settings) -> SessionResult<Self> {
        let mut engine_kind = cli.engine;
        let mut black = cli.black;
        for word in &cli.words {
            match word.as_str() {
                "ntc" => engine_kind = Some(EngineKind::Turochamp),
                "black" => black = true,
                other => {
                    return Err(SessionError::Config {
                        message: format!("unknown argument '{other}' (expected 'ntc' or 'black')"),
                    })
                }
            }
        }

        let mut engine = EngineSpec::from_settings(engine_kind.unwrap_or_default(), settings);
        if let Some(path) = &cli.engine_path {
            engine.path = path.clone();
        }
        if let Some(ms) = cli.movetime {
            engine.limit.movetime = Some(Duration::from_millis(ms));
        }
        if let Some(depth) = cli.depth {
            engine.limit.depth = Some(depth);
        }

        let tick_rate = cli.tick_rate.unwrap_or(settings.tick_rate);
        if !tick_rate.is_finite() || tick_rate < MIN_TICK_RATE {
            return Err(SessionError::Config {
                message: format!("tick rate must be at least {MIN_TICK_RATE}, got {tick_rate}"),
            });
        }

        let deflection_threshold = cli.threshold.unwrap_or(settings.deflection_threshold);
        if !(0.0..1.0).contains(&deflection_threshold) {
            return Err(SessionError::Config {
                message: format!("threshold must be in 0..1, got {deflection_threshold}"),
            });
        }

        Ok(Self {
            human: if black { Color::Black } else { Color::White },
            engine,
            pgn_path: cli.pgn.clone().unwrap_or_else(|| settings.pgn_path.clone()),
            tick_rate,
            deflection_threshold,
            highlight_rgba: settings.highlight_rgba,
        })
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::for_human(self.human)
    }

    /// Time between session ticks; rates below [`MIN_TICK_RATE`] count as
    /// the minimum
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate.max(MIN_TICK_RATE)))
    }
}
