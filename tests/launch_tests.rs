//! Launch Tests
//!
//! Starts a session the way `main` does, against a tiny shell-script engine
//! that answers the UCI handshake and always plays d2d4.

use bevy::prelude::*;
use clap::Parser;
use padchess::core::settings_persistence::load_settings_from;
use padchess::core::{Cli, SessionError, Settings};
use padchess::game::engine::{ComputerOpponent, EngineProcess};
use padchess::game::system_sets::SessionTick;
use padchess::game::{launch_session, BoardState};
use std::path::Path;
use std::time::Duration;

fn cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("padchess").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_missing_engine_fails_launch() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);

    let err = launch_session(
        &mut app,
        &cli(&["--engine-path", "/nonexistent/padchess-engine"]),
        &Settings::default(),
    )
    .unwrap_err();

    assert!(matches!(err, SessionError::EngineUnavailable { .. }));
    assert!(app.world().get_resource::<BoardState>().is_none());
    assert!(app.world().get_resource::<EngineProcess>().is_none());
}

#[cfg(unix)]
fn write_fake_engine(dir: &Path) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fakefish");
    std::fs::write(
        &path,
        "#!/bin/sh\n\
         while read -r line; do\n\
           case \"$line\" in\n\
             uci) echo \"id name FakeFish 1.0\"; echo uciok ;;\n\
             isready) echo readyok ;;\n\
             go*) echo \"info depth 1 score cp 10 pv d2d4\"; echo \"bestmove d2d4\" ;;\n\
             quit) exit 0 ;;\n\
           esac\n\
         done\n",
    )
    .unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
#[test]
fn test_launch_plays_engine_move_and_quits() {
    //! A malformed settings file falls back to defaults, the engine's own
    //! name reaches the PGN header and `AppExit` stops the process

    let dir = tempfile::tempdir().unwrap();
    let engine = write_fake_engine(dir.path());
    let settings_file = dir.path().join("settings.json");
    std::fs::write(&settings_file, "{ not json").unwrap();
    let pgn = dir.path().join("game.pgn");

    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    let settings = load_settings_from(&settings_file);
    assert_eq!(settings, Settings::default());

    let args = cli(&[
        "--engine-path",
        engine.to_str().unwrap(),
        "--pgn",
        pgn.to_str().unwrap(),
        "black",
    ]);
    launch_session(&mut app, &args, &settings).unwrap();
    app.insert_resource(SessionTick::every_frame());

    assert_eq!(app.world().resource::<ComputerOpponent>().name(), "FakeFish 1.0");

    let mut played = false;
    for _ in 0..500 {
        app.update();
        if app.world().resource::<BoardState>().ply() == 1 {
            played = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    assert!(played, "engine move was never applied");

    let contents = std::fs::read_to_string(&pgn).unwrap();
    assert!(contents.contains("[White \"FakeFish 1.0\"]"));
    assert!(contents.contains("1. d4 *"));

    app.world_mut().write_message(AppExit::Success);
    app.update();
    assert!(!app.world_mut().resource_mut::<EngineProcess>().is_alive());
}
