//! Coordinate labels around the board
//!
//! Letters a-h above and below the board, numbers 1-8 left and right of it,
//! placed in the border cells so they follow the board orientation.

use crate::game::session::Orientation;
use crate::rendering::layout::world_center;
use bevy::prelude::*;

/// Marker component for coordinate labels
#[derive(Component)]
pub struct CoordinateLabel;

/// Label text and border cell `(file, rank)` for every label
pub fn label_cells() -> Vec<(String, i8, i8)> {
    let mut cells = Vec::with_capacity(32);
    for (file, letter) in ('a'..='h').enumerate() {
        let file = file as i8;
        cells.push((letter.to_string(), file, -1));
        cells.push((letter.to_string(), file, 8));
    }
    for rank in 0..8i8 {
        let number = (rank + 1).to_string();
        cells.push((number.clone(), -1, rank));
        cells.push((number, 8, rank));
    }
    cells
}

/// System to create coordinate labels
pub fn create_coordinate_labels(mut commands: Commands, orientation: Res<Orientation>) {
    let text_style = TextFont {
        font_size: 40.0,
        ..default()
    };

    for (text, file, rank) in label_cells() {
        let center = world_center(*orientation, file, rank);
        commands.spawn((
            Text2d::new(text.clone()),
            text_style.clone(),
            TextColor(Color::srgb(0.85, 0.85, 0.85)),
            Transform::from_translation(center.extend(0.0)),
            CoordinateLabel,
            Name::new(format!("Label {text} ({file},{rank})")),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_on_all_four_sides() {
        let cells = label_cells();
        assert_eq!(cells.len(), 32);
        assert_eq!(cells.iter().filter(|(t, _, _)| t == "a").count(), 2);
        assert_eq!(cells.iter().filter(|(t, _, _)| t == "8").count(), 2);
        assert!(cells
            .iter()
            .all(|&(_, f, r)| f == -1 || f == 8 || r == -1 || r == 8));
    }
}
