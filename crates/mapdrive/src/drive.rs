//! Keyboard input tracking and the per-frame motion update.
//!
//! The host owns the animation loop; [`step`] is a single state transition
//! run once per frame. It reads the current [`DriveInput`] flags and the live
//! [`Tuning`] parameters, eases the scalar velocity towards a target speed,
//! and reports the resulting model-local displacement, heading change and
//! camera move. Simulation state lives in an explicit [`MotionState`] passed
//! in by the caller, never in module globals.

use glam::DVec3;

/// Fixed integration time-step constant.
pub const TIME_STEP: f64 = 0.01;

/// Target speed while the forward key is held (reverse is the negation).
pub const THROTTLE_SPEED: f64 = 0.01;

/// Magnitude of the fixed damping target when no throttle key is held.
///
/// Hard-coded independently of the `inertia` tuning parameter; see
/// [`Tuning::inertia`].
pub const DECAY_SPEED: f64 = 0.01;

/// Velocity band around zero inside which motion snaps to a full stop.
pub const VELOCITY_DEADBAND: f64 = 0.0008;

/// Heading change per frame while a turn key is held, in degrees.
pub const TURN_STEP_DEGREES: f64 = 1.0;

/// Tuning parameter bounds and quantisation exposed by the panel.
pub const ACCELERATION_MIN: f64 = 1.0;
pub const ACCELERATION_MAX: f64 = 10.0;
pub const INERTIA_MIN: f64 = 1.0;
pub const INERTIA_MAX: f64 = 5.0;
pub const TUNING_STEP: f64 = 0.5;

/// A recognised drive key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// W — accelerate forward.
    Forward,
    /// A — turn left.
    Left,
    /// S — accelerate backward.
    Back,
    /// D — turn right.
    Right,
}

impl Key {
    /// Map a host key code to a drive key.
    ///
    /// Codes of the form `KeyW` have the `Key` prefix stripped and the rest
    /// lowercased, so both `KeyW` and `w` are recognised. Anything else
    /// returns `None` and is ignored by the caller.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let name = code.strip_prefix("Key").unwrap_or(code);
        match name.to_ascii_lowercase().as_str() {
            "w" => Some(Self::Forward),
            "a" => Some(Self::Left),
            "s" => Some(Self::Back),
            "d" => Some(Self::Right),
            _ => None,
        }
    }
}

/// One key transition from the host environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    /// `true` on key-down, `false` on key-up.
    pub pressed: bool,
}

/// Four independent key flags read by the motion step every frame.
///
/// Flags follow the last event seen per key; there are no timers and no
/// debouncing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveInput {
    pub forward: bool,
    pub left: bool,
    pub back: bool,
    pub right: bool,
}

impl DriveInput {
    /// Apply one key transition.
    pub fn apply(&mut self, event: KeyEvent) {
        self.set(event.key, event.pressed);
    }

    /// Set or clear the flag for one key.
    pub fn set(&mut self, key: Key, pressed: bool) {
        match key {
            Key::Forward => self.forward = pressed,
            Key::Left => self.left = pressed,
            Key::Back => self.back = pressed,
            Key::Right => self.right = pressed,
        }
    }
}

/// Mutable simulation state carried between frames.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionState {
    /// Current scalar velocity in model-local units per frame.
    pub velocity: f64,
    /// Target velocity the easing pulls towards.
    pub speed: f64,
    /// The model's yaw around the vertical axis, in radians.
    pub heading: f64,
}

/// Live parameters exposed by the tuning panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    /// Velocity easing gain, range [1, 10] in steps of 0.5.
    pub acceleration: f64,
    /// Exposed for tuning but deliberately not consulted by the damping
    /// formula: the decay targets stay hard-coded at ±[`DECAY_SPEED`].
    /// Range [1, 5] in steps of 0.5.
    pub inertia: f64,
    /// Whether the 3D building layer should be on the map.
    pub buildings: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            acceleration: 5.0,
            inertia: 3.0,
            buildings: true,
        }
    }
}

impl Tuning {
    /// Set acceleration, clamped to its range and snapped to the 0.5 step.
    pub fn set_acceleration(&mut self, value: f64) {
        self.acceleration = quantize(value, ACCELERATION_MIN, ACCELERATION_MAX);
    }

    /// Set inertia, clamped to its range and snapped to the 0.5 step.
    pub fn set_inertia(&mut self, value: f64) {
        self.inertia = quantize(value, INERTIA_MIN, INERTIA_MAX);
    }
}

/// Clamp to `[min, max]` and snap to the nearest [`TUNING_STEP`].
fn quantize(value: f64, min: f64, max: f64) -> f64 {
    let snapped = (value / TUNING_STEP).round() * TUNING_STEP;
    snapped.clamp(min, max)
}

/// Camera transition easing, `t ↦ t(2 − t)`.
#[must_use]
pub fn ease_out(t: f64) -> f64 {
    t * (2.0 - t)
}

/// What one frame of motion produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepResult {
    /// Velocity decayed into the deadband (or the target speed was zero);
    /// state was zeroed and nothing moves this frame.
    Halted,
    /// The model moved; apply the step to the scene and recentre the camera.
    Moved(Step),
}

/// The movement computed for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// Displacement in model-local space, added to the current position.
    pub displacement: DVec3,
    /// New map bearing in degrees, present only when a turn key was held.
    pub bearing: Option<f64>,
}

/// Advance the simulation by one frame.
///
/// The decision rule, in order:
///
/// 1. With no throttle key held, the target speed becomes a fixed decrement
///    pulling velocity towards zero; once velocity is inside
///    ±[`VELOCITY_DEADBAND`] both scalars snap to exactly zero and the frame
///    halts.
/// 2. Forward sets the target to +[`THROTTLE_SPEED`], else back sets it to
///    the negation.
/// 3. Velocity eases exponentially towards the target:
///    `velocity += (speed − velocity) · acceleration · TIME_STEP`.
/// 4. A zero target at this point also zeroes velocity and halts.
/// 5. The displacement is `(0, −velocity, 0)` in model-local space; a held
///    turn key changes the heading by [`TURN_STEP_DEGREES`] (right wins when
///    both are held) and overrides the map bearing with `−heading` degrees.
pub fn step(state: &mut MotionState, input: &DriveInput, tuning: &Tuning) -> StepResult {
    if !(input.forward || input.back) {
        if state.velocity > 0.0 {
            state.speed = -DECAY_SPEED;
        } else if state.velocity < 0.0 {
            state.speed = DECAY_SPEED;
        }
        if state.velocity > -VELOCITY_DEADBAND && state.velocity < VELOCITY_DEADBAND {
            state.speed = 0.0;
            state.velocity = 0.0;
            return StepResult::Halted;
        }
    }

    if input.forward {
        state.speed = THROTTLE_SPEED;
    } else if input.back {
        state.speed = -THROTTLE_SPEED;
    }

    state.velocity += (state.speed - state.velocity) * tuning.acceleration * TIME_STEP;
    if state.speed == 0.0 {
        state.velocity = 0.0;
        return StepResult::Halted;
    }

    let displacement = DVec3::new(0.0, -state.velocity, 0.0);

    let bearing = if input.left || input.right {
        let sign = if input.right { -1.0 } else { 1.0 };
        state.heading += TURN_STEP_DEGREES.to_radians() * sign;
        Some(-state.heading.to_degrees())
    } else {
        None
    };

    StepResult::Moved(Step {
        displacement,
        bearing,
    })
}
