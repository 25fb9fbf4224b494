//! Settings persistence
//!
//! Loads [`Settings`] from a JSON file in the user's configuration directory.
//! Command line flags override whatever is found there (see
//! [`crate::core::config`]).
//!
//! # File Location
//!
//! `settings.json` inside the platform config dir, e.g.
//! `~/.config/padchess/settings.json` on Linux. Falls back to a local
//! `settings.json` when no config dir can be determined.
//!
//! # Error Handling
//!
//! A missing file is normal and silently yields defaults. An unreadable or
//! malformed file is logged and also yields defaults; it never stops the
//! session from starting.

use bevy::prelude::*;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings filename
const SETTINGS_FILENAME: &str = "settings.json";

/// Persistent user preferences
///
/// Every field has a default, so a partial file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Stockfish executable
    pub stockfish_path: PathBuf,
    /// Thinking time given to Stockfish per move, in milliseconds
    pub stockfish_movetime_ms: u64,
    /// nimTUROCHAMP executable (searches without a limit)
    pub turochamp_path: PathBuf,
    /// Game record rewritten after every ply
    pub pgn_path: PathBuf,
    /// Session ticks per second
    pub tick_rate: f32,
    /// Stick deflection needed to move the cursor
    pub deflection_threshold: f32,
    /// Last computer move highlight (RGBA)
    pub highlight_rgba: [u8; 4],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            stockfish_path: PathBuf::from("/usr/bin/stockfish"),
            stockfish_movetime_ms: 1000,
            turochamp_path: PathBuf::from("../nimTUROCHAMP/ntc"),
            pgn_path: PathBuf::from("game.pgn"),
            tick_rate: 5.0,
            deflection_threshold: 0.8,
            highlight_rgba: [100, 0, 100, 100],
        }
    }
}

/// Resolve the settings file path
pub fn settings_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("org", "padchess", "padchess") {
        proj_dirs.config_dir().join(SETTINGS_FILENAME)
    } else {
        PathBuf::from(SETTINGS_FILENAME)
    }
}

/// Load settings from the default location
pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

/// Load settings from `path`, falling back to defaults
pub fn load_settings_from(path: &Path) -> Settings {
    if !path.exists() {
        debug!("[SETTINGS] No settings file at {:?}. Using defaults.", path);
        return Settings::default();
    }

    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str::<Settings>(&contents) {
            Ok(settings) => {
                info!("[SETTINGS] Loaded settings from {:?}", path);
                settings
            }
            Err(e) => {
                warn!(
                    "[SETTINGS] Failed to parse settings file at {:?}: {}. Using defaults.",
                    path, e
                );
                Settings::default()
            }
        },
        Err(e) => {
            warn!(
                "[SETTINGS] Failed to read settings file at {:?}: {}. Using defaults.",
                path, e
            );
            Settings::default()
        }
    }
}
