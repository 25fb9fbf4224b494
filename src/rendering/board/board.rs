//! Board drawing
//!
//! Every cell is a stack of sprites spawned once at startup:
//!
//! | z   | entity             | source                               |
//! |-----|--------------------|--------------------------------------|
//! | 0.0 | [`SquareTile`]     | board texture cropped at the cell    |
//! | 1.0 | [`SquareHighlight`]| translucent overlay, last engine move|
//! | 2.0 | [`PieceSprite`]    | piece image, hidden on empty squares |
//! | 3.0 | [`CursorRing`]     | single ring that follows the cursor  |
//!
//! The sync systems only run when [`RenderSnapshot`] changed and only touch
//! what differs from the snapshot.

use crate::assets::BoardAssets;
use crate::core::config::SessionConfig;
use crate::game::session::Orientation;
use crate::rendering::layout::{square_center, texture_rect, TILE_SIZE};
use crate::rendering::snapshot::{CursorColor, RenderSnapshot};
use bevy::prelude::*;
use shakmaty::Square;

/// Ring outline width in pixels
const RING_WIDTH: f32 = 7.0;

/// Background tile of a square
#[derive(Component, Debug, Clone, Copy)]
pub struct SquareTile {
    pub square: Square,
}

/// Last-move overlay of a square
#[derive(Component, Debug, Clone, Copy)]
pub struct SquareHighlight {
    pub square: Square,
}

/// Piece image slot of a square
#[derive(Component, Debug, Clone, Copy)]
pub struct PieceSprite {
    pub square: Square,
}

/// The cursor outline
#[derive(Component, Debug)]
pub struct CursorRing;

pub(crate) fn spawn_camera(mut commands: Commands) {
    commands.spawn((Camera2d, Name::new("Board Camera")));
}

pub(crate) fn create_board(
    mut commands: Commands,
    assets: Res<BoardAssets>,
    orientation: Res<Orientation>,
    config: Res<SessionConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let [r, g, b, a] = config.highlight_rgba;
    let highlight = Color::srgba_u8(r, g, b, a);
    let tile = Vec2::splat(TILE_SIZE);

    for index in 0..64u32 {
        let square = Square::new(index);
        let center = square_center(*orientation, square);
        let name = square.to_string();

        commands.spawn((
            Sprite {
                image: assets.board.clone(),
                rect: Some(texture_rect(*orientation, square)),
                custom_size: Some(tile),
                ..default()
            },
            Transform::from_translation(center.extend(0.0)),
            SquareTile { square },
            Name::new(format!("Tile {name}")),
        ));

        commands.spawn((
            Sprite::from_color(highlight, tile),
            Transform::from_translation(center.extend(1.0)),
            Visibility::Hidden,
            SquareHighlight { square },
            Name::new(format!("Highlight {name}")),
        ));

        commands.spawn((
            Sprite {
                custom_size: Some(tile),
                ..default()
            },
            Transform::from_translation(center.extend(2.0)),
            Visibility::Hidden,
            PieceSprite { square },
            Name::new(format!("Piece {name}")),
        ));
    }

    let outer = TILE_SIZE / 2.0;
    commands.spawn((
        Mesh2d(meshes.add(Annulus::new(outer - RING_WIDTH, outer))),
        MeshMaterial2d(materials.add(ColorMaterial::from(CursorColor::Idle.color()))),
        Transform::from_xyz(0.0, 0.0, 3.0),
        Visibility::Hidden,
        CursorRing,
        Name::new("Cursor Ring"),
    ));
}

/// Show each square's piece image, or hide the slot when empty
pub fn sync_pieces_system(
    snapshot: Res<RenderSnapshot>,
    assets: Res<BoardAssets>,
    mut sprites: Query<(&PieceSprite, &mut Sprite, &mut Visibility)>,
) {
    for (slot, mut sprite, mut visibility) in &mut sprites {
        match snapshot.square(slot.square).piece.and_then(|p| assets.piece(p)) {
            Some(image) => {
                if sprite.image != image {
                    sprite.image = image;
                }
                visibility.set_if_neq(Visibility::Inherited);
            }
            None => {
                visibility.set_if_neq(Visibility::Hidden);
            }
        }
    }
}

pub fn sync_highlights_system(
    snapshot: Res<RenderSnapshot>,
    mut overlays: Query<(&SquareHighlight, &mut Visibility)>,
) {
    for (overlay, mut visibility) in &mut overlays {
        let wanted = if snapshot.square(overlay.square).highlighted {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        visibility.set_if_neq(wanted);
    }
}

/// Move and recolour the ring; hide it once the game is over
pub fn sync_cursor_ring_system(
    snapshot: Res<RenderSnapshot>,
    orientation: Res<Orientation>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut rings: Query<
        (&mut Transform, &mut Visibility, &MeshMaterial2d<ColorMaterial>),
        With<CursorRing>,
    >,
) {
    for (mut transform, mut visibility, material) in &mut rings {
        let Some(cursor) = snapshot.cursor else {
            visibility.set_if_neq(Visibility::Hidden);
            continue;
        };
        let center = square_center(*orientation, cursor.square);
        transform.translation.x = center.x;
        transform.translation.y = center.y;
        visibility.set_if_neq(Visibility::Inherited);
        if let Some(mut ring) = materials.get_mut(&material.0) {
            ring.color = cursor.color.color();
        }
    }
}
