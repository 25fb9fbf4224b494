//! Core module - configuration, errors and application infrastructure
//!
//! # Contents
//!
//! - [`error`] - [`SessionError`], the one error type of the crate
//! - [`error_handling`] - Logging and exit policy for errors raised in systems
//! - [`config`] - clap command line merged with settings into [`SessionConfig`]
//! - [`settings_persistence`] - JSON settings file in the platform config dir
//! - [`window_config`] - Fixed window parameters
//! - [`plugin`] - [`CorePlugin`]

pub mod config;
pub mod error;
pub mod error_handling;
pub mod plugin;
pub mod settings_persistence;
pub mod window_config;

pub use config::{Cli, SessionConfig};
pub use error::{SessionError, SessionResult};
pub use plugin::CorePlugin;
pub use settings_persistence::{load_settings, Settings};
pub use window_config::WindowConfig;
