//! Error types for the play session
//!
//! Each variant carries how the session reacts to it: see
//! [`SessionError::is_fatal`]. Non-fatal errors are logged and play continues,
//! fatal ones end the app through `AppExit::error()` after the engine has been
//! shut down.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running a play session
#[derive(Error, Debug)]
pub enum SessionError {
    /// No gamepad or joystick was found; the cursor cannot move
    #[error("No supported joysticks or gamepads found")]
    NoInputDevice,

    /// The engine executable could not be started or did not complete the UCI handshake
    #[error("Engine {path:?} unavailable: {message}")]
    EngineUnavailable { path: PathBuf, message: String },

    /// The engine process exited or closed its output mid-conversation
    #[error("Engine crashed: {message}")]
    EngineCrashed { message: String },

    /// The engine answered with something that is not valid UCI
    #[error("Engine protocol error: {message}")]
    EngineProtocol { message: String },

    /// The engine proposed a move that is not legal in the current position
    #[error("Engine played illegal move {uci} in the current position")]
    IllegalEngineMove { uci: String },

    /// The search was abandoned because the session is shutting down
    #[error("Engine search cancelled")]
    Cancelled,

    /// Writing the PGN game record failed
    #[error("Failed to write game record to {path:?}: {source}")]
    RecordWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An image asset failed to load
    #[error("Asset {path} failed to load")]
    MissingAsset { path: String },

    /// Invalid command line or settings combination
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl SessionError {
    /// Whether this error must end the session
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            SessionError::NoInputDevice | SessionError::RecordWrite { .. } | SessionError::Cancelled
        )
    }

    pub(crate) fn crashed(message: impl Into<String>) -> Self {
        SessionError::EngineCrashed {
            message: message.into(),
        }
    }

    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        SessionError::EngineProtocol {
            message: message.into(),
        }
    }
}

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;
