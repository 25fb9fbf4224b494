//! Core plugin - application infrastructure shared by every session
//!
//! Registers the window configuration and installs a panic hook that routes
//! panics through the log before the default hook prints them.

use super::WindowConfig;
use bevy::prelude::*;
use std::panic;

pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WindowConfig>()
            .register_type::<WindowConfig>();
    }

    fn finish(&self, _app: &mut App) {
        // after all plugins are built, so the log subscriber exists
        setup_panic_hook();
    }
}

fn setup_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "<unknown>".to_string()
        };
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "<unknown>".to_string());

        error!("[PANIC] {} at {}", message, location);
        default_hook(panic_info);
    }));
}
