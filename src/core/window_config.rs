//! Window configuration resource
//!
//! The board is drawn at a fixed pixel size, so the window is fixed too.

use crate::rendering::layout::WINDOW_SIZE;
use crate::rendering::snapshot::APP_TITLE;
use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowResolution};

/// Configuration for the primary application window
#[derive(Resource, Debug, Clone, Reflect)]
#[reflect(Resource)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Window width in logical pixels
    pub width: u32,
    /// Window height in logical pixels
    pub height: u32,
    /// Whether the window should be resizable
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: APP_TITLE.to_string(),
            width: WINDOW_SIZE,
            height: WINDOW_SIZE,
            resizable: false,
        }
    }
}

impl WindowConfig {
    /// Create a Bevy Window from this configuration
    pub fn to_window(&self) -> Window {
        Window {
            title: self.title.clone(),
            resolution: WindowResolution::new(self.width, self.height),
            resizable: self.resizable,
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_window() {
        let window = WindowConfig::default().to_window();
        assert_eq!(window.title, "padchess");
        assert_eq!(window.resolution.width(), 1000.0);
        assert_eq!(window.resolution.height(), 1000.0);
        assert!(!window.resizable);
    }
}
