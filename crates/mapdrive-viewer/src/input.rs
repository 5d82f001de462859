//! Keyboard capture into the drive input flags.
//!
//! Raw key transitions from the host window are mapped through the key-code
//! naming scheme (`KeyW` → `w`) and replayed into the [`DriveInput`] flags.
//! Unrecognised keys are dropped silently. While the tuning panel owns the
//! keyboard, presses go to the panel but releases still land here; a flag
//! set before the panel took focus can never stick.

use bevy::ecs::message::MessageReader;
use bevy::input::keyboard::KeyboardInput;
use bevy::prelude::*;
use bevy_egui::input::egui_wants_any_keyboard_input;
use mapdrive::drive::{DriveInput, Key, KeyEvent};

/// Plugin for drive keyboard capture.
pub struct DriveInputPlugin;

impl Plugin for DriveInputPlugin {
    fn build(&self, app: &mut App) {
        // The two systems run under complementary conditions, so every
        // transition is replayed exactly once.
        app.init_resource::<CarInput>().add_systems(
            Update,
            (
                capture_drive_keys.run_if(not(egui_wants_any_keyboard_input)),
                release_drive_keys.run_if(egui_wants_any_keyboard_input),
            ),
        );
    }
}

/// The four drive key flags, replayed from keyboard events.
#[derive(Resource, Default)]
pub struct CarInput(pub DriveInput);

/// Replay one key transition into the drive flags.
fn replay_key(input: &mut DriveInput, key_code: KeyCode, pressed: bool) {
    let Some(key) = Key::from_code(&format!("{key_code:?}")) else {
        return;
    };
    input.apply(KeyEvent { key, pressed });
}

/// Replay this frame's key transitions into the drive flags.
pub fn capture_drive_keys(
    mut keyboard_events: MessageReader<KeyboardInput>,
    mut input: ResMut<CarInput>,
) {
    for event in keyboard_events.read() {
        // Key repeats re-assert the current flag value; applying them is
        // harmless and keeps the replay rule exact.
        replay_key(&mut input.0, event.key_code, event.state.is_pressed());
    }
}

/// Replay only key releases while the tuning panel owns the keyboard.
///
/// Presses belong to the panel on those frames, but a dropped release would
/// leave its drive flag stuck true until the key is pressed again.
pub fn release_drive_keys(
    mut keyboard_events: MessageReader<KeyboardInput>,
    mut input: ResMut<CarInput>,
) {
    for event in keyboard_events.read() {
        if event.state.is_pressed() {
            continue;
        }
        replay_key(&mut input.0, event.key_code, false);
    }
}
