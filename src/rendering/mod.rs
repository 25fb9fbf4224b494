//! Rendering module - 2D board view in a fixed window
//!
//! Draws the board from [`RenderSnapshot`] alone; no drawing system reads
//! the game resources directly.
//!
//! # Architecture
//!
//! - `layout` - Cell to pixel and world-space mapping for both orientations
//! - `snapshot` - The per-tick view of squares, cursor and title
//! - `board` - Sprite entities and the systems that sync them to the snapshot
//!
//! # Bevy Rendering
//!
//! - `Sprite` with `rect` to crop board tiles from one texture
//! - `Mesh2d` + `MeshMaterial2d<ColorMaterial>` for the cursor ring
//! - `Text2d` for coordinate labels

pub mod board;
pub mod layout;
pub mod snapshot;

pub use board::*;
pub use layout::*;
pub use snapshot::*;

use crate::assets::BoardAssetPlugin;
use crate::game::system_sets::SessionSystems;
use bevy::prelude::*;

/// Background behind the label border
const CLEAR_COLOR: Color = Color::srgb(0.12, 0.12, 0.12);

/// Plugin for the board view
///
/// Requires a window, an asset server and the session resources from
/// [`crate::game::SessionPlugin`].
pub struct BoardRenderPlugin;

impl Plugin for BoardRenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(BoardAssetPlugin)
            .insert_resource(ClearColor(CLEAR_COLOR))
            .add_systems(
                Startup,
                (spawn_camera, create_board, create_coordinate_labels),
            )
            .add_systems(
                Update,
                (
                    sync_pieces_system,
                    sync_highlights_system,
                    sync_cursor_ring_system,
                )
                    .after(SessionSystems::Title)
                    .run_if(resource_changed::<RenderSnapshot>),
            );
    }
}
