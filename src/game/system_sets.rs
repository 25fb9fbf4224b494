//! System organization using SystemSets
//!
//! Defines execution order for session systems using Bevy's SystemSet feature.
//!
//! # Execution Order
//!
//! [`SessionSystems::Input`] runs every frame so no button press is lost.
//! The remaining sets run only on frames where the session tick fired:
//!
//! 1. **Selection** - Drain confirm presses into the selection state machine
//! 2. **Cursor** - Poll gamepad sticks and step the cursor
//! 3. **Snapshot** - Rebuild the render snapshot
//! 4. **Engine** - Start or finish the computer's search
//! 5. **Resnapshot** - Rebuild the snapshot again so the computer move shows
//! 6. **Title** - Update the window title from the game result

use bevy::prelude::*;
use std::time::Duration;

/// System execution order for one session tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SystemSet)]
pub enum SessionSystems {
    /// Per-frame input collection (button presses)
    Input,

    /// Confirm presses applied to the selection
    Selection,

    /// Stick polling and cursor movement
    Cursor,

    /// Snapshot after human input
    Snapshot,

    /// Engine request and reply handling
    Engine,

    /// Snapshot after the computer's move
    Resnapshot,

    /// Window title
    Title,
}

/// Fixed-rate pacing for the session loop
#[derive(Resource, Debug, Clone)]
pub struct SessionTick {
    /// `None` ticks on every frame
    timer: Option<Timer>,
    fired: bool,
}

impl SessionTick {
    pub fn every(interval: Duration) -> Self {
        Self {
            timer: Some(Timer::new(interval, TimerMode::Repeating)),
            fired: false,
        }
    }

    pub fn every_frame() -> Self {
        Self {
            timer: None,
            fired: false,
        }
    }

    pub fn advance(&mut self, delta: Duration) {
        self.fired = match self.timer.as_mut() {
            Some(timer) => {
                timer.tick(delta);
                timer.just_finished()
            }
            None => true,
        };
    }

    /// Whether the current frame is a session tick
    pub fn fired(&self) -> bool {
        self.fired
    }
}

/// Advances [`SessionTick`] by the frame time
pub fn advance_session_tick(time: Res<Time>, mut tick: ResMut<SessionTick>) {
    tick.advance(time.delta());
}

/// Run condition: true on frames where the session tick fired
pub fn session_tick_fired(tick: Res<SessionTick>) -> bool {
    tick.fired()
}

/// Configure system sets with proper ordering
pub fn configure_system_sets(app: &mut App) {
    app.configure_sets(
        Update,
        (
            SessionSystems::Input,
            SessionSystems::Selection,
            SessionSystems::Cursor,
            SessionSystems::Snapshot,
            SessionSystems::Engine,
            SessionSystems::Resnapshot,
            SessionSystems::Title,
        )
            .chain(),
    );
    app.configure_sets(
        Update,
        (
            SessionSystems::Selection,
            SessionSystems::Cursor,
            SessionSystems::Snapshot,
            SessionSystems::Engine,
            SessionSystems::Resnapshot,
            SessionSystems::Title,
        )
            .run_if(session_tick_fired),
    );
}
