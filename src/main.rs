use anyhow::Context;
use bevy::prelude::*;
use clap::Parser;
use padchess::core::{load_settings, Cli, CorePlugin, WindowConfig};
use padchess::game::launch_session;
use padchess::rendering::BoardRenderPlugin;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let window_config = WindowConfig::default();

    let mut app = App::new();
    // LogPlugin installs the tracing subscriber here; everything below logs
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(window_config.to_window()),
        ..default()
    }))
    .insert_resource(window_config)
    .add_plugins(CorePlugin);

    let settings = load_settings();
    launch_session(&mut app, &cli, &settings).context("cannot start the session")?;
    app.add_plugins(BoardRenderPlugin);

    match app.run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => anyhow::bail!("session ended with an error (code {code})"),
    }
}
