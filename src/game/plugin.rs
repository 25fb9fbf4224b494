//! Session plugin - game state and the fixed-rate session loop
//!
//! Registers the session resources and schedules every game system into the
//! [`SessionSystems`] sets.
//!
//! # Plugin Dependencies
//!
//! - A [`SessionConfig`] resource should be inserted before this plugin is
//!   added; defaults are used otherwise.
//! - A [`ComputerOpponent`] resource must exist before the first update.
//!   Its name is used for the PGN player tag when present at build time.
//! - [`crate::rendering::BoardRenderPlugin`] is optional; without it the
//!   session runs headless, which is how the integration tests drive it.
//!
//! # Resources
//!
//! | Resource            | Initial value                          |
//! |---------------------|----------------------------------------|
//! | [`BoardState`]      | standard starting position             |
//! | [`Selection`]       | `Idle`                                 |
//! | [`Cursor`]          | e2 (White) or e7 (Black)               |
//! | [`Orientation`]     | human's back rank at the bottom        |
//! | [`HumanSide`]       | from the config                        |
//! | [`GameRecorder`]    | writes to the configured PGN path      |
//! | [`RenderSnapshot`]  | built from the above                   |
//! | [`SessionTick`]     | one tick per `1 / tick_rate` seconds   |
//!
//! [`launch_session`] does the whole startup for a real engine: it resolves
//! the config, spawns the engine and then adds this plugin.

use super::board_state::BoardState;
use super::engine::{ComputerOpponent, EnginePlugin, EngineProcess};
use super::recorder::{GameRecorder, PgnHeaders};
use super::selection::{apply_confirms_system, Selection};
use super::session::{Cursor, HumanSide, LastComputerMove, Orientation};
use super::system_sets::{advance_session_tick, configure_system_sets, SessionSystems, SessionTick};
use crate::core::config::{Cli, SessionConfig};
use crate::core::error::SessionResult;
use crate::core::settings_persistence::Settings;
use crate::input::{
    collect_confirm_presses, move_cursor_system, report_missing_input_system, InputDeviceReport,
    PendingConfirms,
};
use crate::rendering::snapshot::{rebuild_snapshot_system, update_title_system, RenderSnapshot};
use bevy::prelude::*;

/// Session plugin for padchess
pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<SessionConfig>()
            .cloned()
            .unwrap_or_default();
        let engine_name = app
            .world()
            .get_resource::<ComputerOpponent>()
            .map(|opponent| opponent.name().to_string())
            .unwrap_or_else(|| config.engine.kind.display_name().to_string());

        info!(
            "[SESSION] Human plays {:?} against {} ({} ticks/s)",
            config.human, engine_name, config.tick_rate
        );

        let board = BoardState::default();
        let cursor = Cursor::starting(config.human);
        let snapshot = RenderSnapshot::build(
            &board,
            &Selection::default(),
            cursor,
            &LastComputerMove::default(),
        );

        app.insert_resource(board)
            .insert_resource(cursor)
            .insert_resource(config.orientation())
            .insert_resource(HumanSide(config.human))
            .insert_resource(GameRecorder::new(
                config.pgn_path.clone(),
                PgnHeaders::for_session(config.human, &engine_name),
            ))
            .insert_resource(snapshot)
            .insert_resource(SessionTick::every(config.tick_interval()))
            .init_resource::<Selection>()
            .init_resource::<LastComputerMove>()
            .init_resource::<PendingConfirms>()
            .init_resource::<InputDeviceReport>()
            .insert_resource(config);

        app.register_type::<Cursor>().register_type::<Orientation>();

        configure_system_sets(app);

        app.add_plugins(EnginePlugin)
            .add_systems(First, advance_session_tick)
            .add_systems(Update, collect_confirm_presses.in_set(SessionSystems::Input))
            .add_systems(
                Update,
                (
                    apply_confirms_system.in_set(SessionSystems::Selection),
                    (report_missing_input_system, move_cursor_system)
                        .chain()
                        .in_set(SessionSystems::Cursor),
                    rebuild_snapshot_system.in_set(SessionSystems::Snapshot),
                    rebuild_snapshot_system.in_set(SessionSystems::Resnapshot),
                    update_title_system.in_set(SessionSystems::Title),
                ),
            );
    }
}

/// Resolve the config, start the engine and add [`SessionPlugin`] to `app`
///
/// Call after `LogPlugin` is added so settings and engine startup messages
/// reach the log.
pub fn launch_session(app: &mut App, cli: &Cli, settings: &Settings) -> SessionResult<()> {
    let config = SessionConfig::resolve(cli, settings)?;
    let (process, session) = EngineProcess::spawn(&config.engine)?;
    let opponent = ComputerOpponent::new(session, config.engine.limit);

    app.insert_resource(process)
        .insert_resource(opponent)
        .insert_resource(config)
        .add_plugins(SessionPlugin);
    Ok(())
}
