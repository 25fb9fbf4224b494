//! Error reporting for session systems
//!
//! Systems never panic on a [`SessionError`]. Recoverable errors are logged
//! and the session keeps running; fatal ones are logged and end the app with
//! a failure exit code.

use crate::core::error::SessionError;
use bevy::prelude::*;

/// Log `error` and request a failing exit when it is fatal
///
/// Returns `true` if an exit was requested.
pub fn report_session_error(error: &SessionError, exit: &mut MessageWriter<AppExit>) -> bool {
    match error {
        SessionError::Cancelled => {
            debug!("[ERROR_HANDLER] {}", error);
            false
        }
        e if e.is_fatal() => {
            error!("[ERROR_HANDLER] Fatal: {}", e);
            exit.write(AppExit::error());
            true
        }
        e => {
            warn!("[ERROR_HANDLER] {}", e);
            false
        }
    }
}
