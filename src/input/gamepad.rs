//! Gamepad input mapping
//!
//! Turns stick deflection into discrete cursor steps and button presses into
//! confirm requests.
//!
//! # Polling Model
//!
//! Sticks are polled once per session tick. A stick held past the threshold
//! moves the cursor one square *every tick* until it is released, so holding
//! it sweeps across the board at the tick rate. This is deliberate continuous
//! polling, not edge detection.
//!
//! Button presses are edge events and only live for one rendered frame, so
//! they are collected every frame into [`PendingConfirms`] and drained by the
//! next tick.
//!
//! # Axis Conventions
//!
//! Stick values are normalized to `-1.0..=1.0` with positive Y meaning "up"
//! (away from the player), which is Bevy's convention for
//! [`Gamepad::left_stick`].

use crate::core::config::SessionConfig;
use crate::core::error::SessionError;
use crate::game::session::{Cursor, Orientation};
use bevy::prelude::*;

/// Confirm presses collected since the last tick
#[derive(Resource, Debug, Default)]
pub struct PendingConfirms(pub u32);

impl PendingConfirms {
    /// Take all pending presses, leaving zero behind
    pub fn drain(&mut self) -> u32 {
        std::mem::take(&mut self.0)
    }
}

/// Whether the missing-device warning was already emitted
#[derive(Resource, Debug, Default)]
pub struct InputDeviceReport {
    pub reported: bool,
}

/// One step in the direction of an axis, or none inside the threshold
pub fn axis_step(value: f32, threshold: f32) -> i32 {
    if value > threshold {
        1
    } else if value < -threshold {
        -1
    } else {
        0
    }
}

/// Apply one tick of stick samples (one per device) to the cursor
///
/// Steps from all devices are summed first, then the cursor is clamped once.
pub fn apply_stick_samples(
    cursor: &mut Cursor,
    samples: impl IntoIterator<Item = Vec2>,
    orientation: Orientation,
    threshold: f32,
) {
    let direction = i32::from(orientation.direction());
    let (mut files, mut ranks) = (0i32, 0i32);
    for stick in samples {
        files += axis_step(stick.x, threshold) * direction;
        ranks += axis_step(stick.y, threshold) * direction;
    }
    cursor.step(files, ranks);
}

/// Count button presses every frame so none are lost between ticks
pub fn collect_confirm_presses(gamepads: Query<&Gamepad>, mut pending: ResMut<PendingConfirms>) {
    for gamepad in &gamepads {
        let presses = gamepad.get_just_pressed().count() as u32;
        if presses > 0 {
            debug!("[INPUT] {} confirm press(es) queued", presses);
            pending.0 += presses;
        }
    }
}

/// Move the cursor from all connected sticks
pub fn move_cursor_system(
    gamepads: Query<&Gamepad>,
    orientation: Res<Orientation>,
    config: Res<SessionConfig>,
    mut cursor: ResMut<Cursor>,
) {
    let before = *cursor;
    apply_stick_samples(
        &mut cursor,
        gamepads.iter().map(|gamepad| gamepad.left_stick()),
        *orientation,
        config.deflection_threshold,
    );
    if *cursor != before {
        debug!(
            "[INPUT] Cursor moved to {}",
            cursor.square()
        );
    }
}

/// Warn once if no gamepad is connected when the session starts ticking
pub fn report_missing_input_system(
    gamepads: Query<(), With<Gamepad>>,
    mut report: ResMut<InputDeviceReport>,
) {
    if report.reported {
        return;
    }
    report.reported = true;
    if gamepads.is_empty() {
        warn!("[INPUT] *** {} ***", SessionError::NoInputDevice);
    } else {
        info!("[INPUT] {} gamepad(s) connected", gamepads.iter().count());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: f32 = 0.8;

    #[test]
    fn test_axis_step_threshold() {
        assert_eq!(axis_step(0.0, THRESHOLD), 0);
        assert_eq!(axis_step(0.8, THRESHOLD), 0);
        assert_eq!(axis_step(-0.8, THRESHOLD), 0);
        assert_eq!(axis_step(0.81, THRESHOLD), 1);
        assert_eq!(axis_step(-1.0, THRESHOLD), -1);
    }

    #[test]
    fn test_stick_moves_one_square_per_tick() {
        //! Holding the stick keeps stepping on every tick
        let mut cursor = Cursor::new(4, 1);
        for expected_rank in 2..=4 {
            apply_stick_samples(
                &mut cursor,
                [Vec2::new(0.0, 1.0)],
                Orientation::WhiteBottom,
                THRESHOLD,
            );
            assert_eq!(cursor.rank(), expected_rank);
        }
        assert_eq!(cursor.file(), 4);
    }

    #[test]
    fn test_flipped_orientation_inverts_stick() {
        let mut white = Cursor::new(4, 4);
        let mut black = Cursor::new(4, 4);
        let stick = Vec2::new(1.0, 1.0);
        apply_stick_samples(&mut white, [stick], Orientation::WhiteBottom, THRESHOLD);
        apply_stick_samples(&mut black, [stick], Orientation::BlackBottom, THRESHOLD);
        assert_eq!((white.file(), white.rank()), (5, 5));
        assert_eq!((black.file(), black.rank()), (3, 3));

        let mut twice = Cursor::new(4, 4);
        apply_stick_samples(
            &mut twice,
            [stick],
            Orientation::BlackBottom.flipped(),
            THRESHOLD,
        );
        assert_eq!(twice, white);
    }

    #[test]
    fn test_cursor_stays_on_board() {
        //! Any amount of accumulated deflection stays within 0..=7
        let mut cursor = Cursor::new(0, 0);
        let sticks = [
            Vec2::new(1.0, 1.0),
            Vec2::new(-1.0, 1.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(-1.0, -1.0),
        ];
        for tick in 0..200 {
            let stick = sticks[(tick / 13) % sticks.len()];
            apply_stick_samples(
                &mut cursor,
                [stick, stick, stick],
                Orientation::WhiteBottom,
                THRESHOLD,
            );
            assert!((0..=7).contains(&cursor.file()));
            assert!((0..=7).contains(&cursor.rank()));
        }
    }

    #[test]
    fn test_devices_are_summed_before_clamping() {
        let mut cursor = Cursor::new(6, 0);
        apply_stick_samples(
            &mut cursor,
            [Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0)],
            Orientation::WhiteBottom,
            THRESHOLD,
        );
        assert_eq!(cursor.file(), 6);
    }

    #[test]
    fn test_pending_confirms_drain() {
        let mut pending = PendingConfirms(3);
        assert_eq!(pending.drain(), 3);
        assert_eq!(pending.drain(), 0);
    }

    fn input_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(SessionConfig::default())
            .insert_resource(Cursor::new(4, 1))
            .insert_resource(Orientation::WhiteBottom)
            .init_resource::<PendingConfirms>()
            .init_resource::<InputDeviceReport>()
            .add_systems(
                Update,
                (
                    collect_confirm_presses,
                    (report_missing_input_system, move_cursor_system).chain(),
                ),
            );
        app
    }

    fn stick(app: &mut App, entity: Entity, value: Vec2) {
        let mut gamepad = app.world_mut().get_mut::<Gamepad>(entity).unwrap();
        gamepad.analog_mut().set(GamepadAxis::LeftStickX, value.x);
        gamepad.analog_mut().set(GamepadAxis::LeftStickY, value.y);
    }

    #[test]
    fn test_gamepad_stick_drives_cursor() {
        let mut app = input_app();
        let pad = app.world_mut().spawn(Gamepad::default()).id();

        stick(&mut app, pad, Vec2::new(0.0, 1.0));
        app.update();
        app.update();
        assert_eq!(*app.world().resource::<Cursor>(), Cursor::new(4, 3));

        stick(&mut app, pad, Vec2::new(0.5, 0.0));
        app.update();
        assert_eq!(*app.world().resource::<Cursor>(), Cursor::new(4, 3));
    }

    #[test]
    fn test_opposite_gamepads_cancel() {
        let mut app = input_app();
        let left = app.world_mut().spawn(Gamepad::default()).id();
        let right = app.world_mut().spawn(Gamepad::default()).id();
        stick(&mut app, left, Vec2::new(-1.0, 0.0));
        stick(&mut app, right, Vec2::new(1.0, 1.0));

        app.update();
        assert_eq!(*app.world().resource::<Cursor>(), Cursor::new(4, 2));
    }

    #[test]
    fn test_button_press_queues_confirm() {
        let mut app = input_app();
        let mut gamepad = Gamepad::default();
        gamepad.digital_mut().press(GamepadButton::South);
        app.world_mut().spawn(gamepad);

        app.update();
        assert_eq!(app.world().resource::<PendingConfirms>().0, 1);
    }

    #[test]
    fn test_missing_device_reported_once_then_picked_up() {
        //! The warning fires on the first tick only; a gamepad connected
        //! later still drives the cursor
        let mut app = input_app();
        app.update();
        assert!(app.world().resource::<InputDeviceReport>().reported);
        assert_eq!(*app.world().resource::<Cursor>(), Cursor::new(4, 1));

        let pad = app.world_mut().spawn(Gamepad::default()).id();
        stick(&mut app, pad, Vec2::new(1.0, 0.0));
        app.update();
        assert!(app.world().resource::<InputDeviceReport>().reported);
        assert_eq!(*app.world().resource::<Cursor>(), Cursor::new(5, 1));
    }
}
