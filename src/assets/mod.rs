//! Asset management module
//!
//! Loads the board texture and the twelve piece images at startup and keeps
//! their handles alive for the whole session.
//!
//! # Layout
//!
//! Images are looked up under bevy's asset root: `assets/` in the crate root
//! under `cargo run`, next to the executable otherwise, or wherever
//! `BEVY_ASSET_ROOT` points. None ship with the repository:
//!
//! - `img/maple.png` - 800x800 board texture
//! - `img/wK.png`, `img/bQ.png`, ... - one 100x100 image per piece
//!
//! A missing or unreadable image is fatal: the session cannot be shown
//! without it, so the app exits with an error instead of drawing blanks.

use crate::core::error::SessionError;
use crate::core::error_handling::report_session_error;
use bevy::asset::{AssetLoadFailedEvent, LoadState};
use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use shakmaty::{Color as Side, Piece, Role};
use std::collections::HashMap;

/// Board texture path relative to the asset root
pub const BOARD_TEXTURE: &str = "img/maple.png";

/// Asset path of a piece image, e.g. `img/wN.png`
pub fn piece_image_path(piece: Piece) -> String {
    let side = match piece.color {
        Side::White => 'w',
        Side::Black => 'b',
    };
    format!("img/{}{}.png", side, piece.role.upper_char())
}

/// Resource storing handles to all board images
#[derive(Resource, Default)]
pub struct BoardAssets {
    pub board: Handle<Image>,
    pub pieces: HashMap<Piece, Handle<Image>>,
    /// Whether every image finished loading
    pub loaded: bool,
    /// Whether a failure was already reported
    pub failed: bool,
}

impl BoardAssets {
    pub fn piece(&self, piece: Piece) -> Option<Handle<Image>> {
        self.pieces.get(&piece).cloned()
    }

    /// Every tracked handle with its asset path
    fn tracked(&self) -> impl Iterator<Item = (String, &Handle<Image>)> {
        std::iter::once((BOARD_TEXTURE.to_string(), &self.board)).chain(
            self.pieces
                .iter()
                .map(|(piece, handle)| (piece_image_path(*piece), handle)),
        )
    }
}

/// Start loading all images
pub fn preload_board_assets(mut commands: Commands, asset_server: Res<AssetServer>) {
    info!("[ASSETS] Loading board and piece images");
    let mut pieces = HashMap::new();
    for color in [Side::White, Side::Black] {
        for role in Role::ALL {
            let piece = Piece { color, role };
            pieces.insert(piece, asset_server.load(piece_image_path(piece)));
        }
    }
    commands.insert_resource(BoardAssets {
        board: asset_server.load(BOARD_TEXTURE),
        pieces,
        loaded: false,
        failed: false,
    });
}

/// Watch load states until everything is loaded or something failed
pub fn check_asset_loading(
    asset_server: Res<AssetServer>,
    mut assets: ResMut<BoardAssets>,
    mut exit: MessageWriter<AppExit>,
) {
    if assets.loaded || assets.failed {
        return;
    }

    let mut pending = 0;
    let mut failed_path = None;
    for (path, handle) in assets.tracked() {
        match asset_server.load_state(handle) {
            LoadState::Loaded => {}
            LoadState::Failed(_) => {
                failed_path = Some(path);
                break;
            }
            LoadState::NotLoaded | LoadState::Loading => pending += 1,
        }
    }

    if let Some(path) = failed_path {
        assets.failed = true;
        report_session_error(&SessionError::MissingAsset { path }, &mut exit);
    } else if pending == 0 {
        assets.loaded = true;
        info!("[ASSETS] All images loaded");
    }
}

/// Backup failure detection via load failure messages
pub fn handle_asset_loading_errors(
    mut assets: ResMut<BoardAssets>,
    mut failed_events: MessageReader<AssetLoadFailedEvent<Image>>,
    mut exit: MessageWriter<AppExit>,
) {
    if assets.failed {
        failed_events.clear();
        return;
    }
    if let Some(event) = failed_events.read().next() {
        assets.failed = true;
        warn!("[ASSETS] {}", event.error);
        report_session_error(
            &SessionError::MissingAsset {
                path: event.path.to_string(),
            },
            &mut exit,
        );
    }
}

/// Plugin for board image loading
pub struct BoardAssetPlugin;

impl Plugin for BoardAssetPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreStartup, preload_board_assets)
            .add_systems(Update, (check_asset_loading, handle_asset_loading_errors));
    }
}
