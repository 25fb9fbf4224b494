//! Board to screen mapping
//!
//! The window is a 10x10 grid of 100 px cells: the 8x8 board in the middle
//! and a one-cell label border around it. Board cells are addressed as
//! `(file, rank)`, with `-1` and `8` naming the border rows and columns.
//!
//! Pixel positions use the image convention (origin top-left, y down) so the
//! same numbers crop the board texture. [`world_center`] converts them into
//! Bevy world space (origin at the window centre, y up).

use crate::game::session::Orientation;
use bevy::prelude::*;
use shakmaty::Square;

/// Edge length of one square in pixels
pub const TILE_SIZE: f32 = 100.0;

/// Width of the label border around the board
pub const BORDER: i32 = 100;

/// Window edge length: 8 squares plus the border on both sides
pub const WINDOW_SIZE: u32 = 1000;

/// Top-left pixel of a cell relative to the board's top-left corner
pub fn board_pixel(orientation: Orientation, file: i8, rank: i8) -> IVec2 {
    let (file, rank) = (i32::from(file), i32::from(rank));
    match orientation {
        Orientation::WhiteBottom => IVec2::new(100 * file, 700 - 100 * rank),
        Orientation::BlackBottom => IVec2::new(700 - 100 * file, 100 * rank),
    }
}

/// Top-left pixel of a cell relative to the window's top-left corner
pub fn window_pixel(orientation: Orientation, file: i8, rank: i8) -> IVec2 {
    board_pixel(orientation, file, rank) + IVec2::splat(BORDER)
}

/// World-space centre of a cell
pub fn world_center(orientation: Orientation, file: i8, rank: i8) -> Vec2 {
    let pixel = window_pixel(orientation, file, rank).as_vec2();
    let half_window = WINDOW_SIZE as f32 / 2.0;
    let half_tile = TILE_SIZE / 2.0;
    Vec2::new(
        pixel.x + half_tile - half_window,
        half_window - (pixel.y + half_tile),
    )
}

/// Board coordinates of a square as `(file, rank)`
pub fn square_coords(square: Square) -> (i8, i8) {
    let index = u32::from(square);
    ((index % 8) as i8, (index / 8) as i8)
}

/// World-space centre of a board square
pub fn square_center(orientation: Orientation, square: Square) -> Vec2 {
    let (file, rank) = square_coords(square);
    world_center(orientation, file, rank)
}

/// Region of the board texture behind a square
///
/// The texture is cropped at the square's screen position, so the board
/// image stays fixed while the pieces flip with the orientation.
pub fn texture_rect(orientation: Orientation, square: Square) -> Rect {
    let (file, rank) = square_coords(square);
    let min = board_pixel(orientation, file, rank).as_vec2();
    Rect::from_corners(min, min + Vec2::splat(TILE_SIZE))
}
