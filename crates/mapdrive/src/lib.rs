//! Simulation and geometry core for the map car demo.
//!
//! This crate holds everything about the demo that can be computed without a
//! window: the Web Mercator coordinate bridge, the model transform and the
//! per-frame overlay matrix composition, the keyboard-driven motion step, and
//! the building-extrusion layer descriptor with its toggle logic.
//!
//! # Design principles
//!
//! - **Pure**: no I/O and no rendering; every function is deterministic
//! - **Frame-driven**: the host owns the loop, [`drive::step`] is one state
//!   transition given the current input and tuning
//! - **Double precision**: Mercator-space work is done in `f64` (`glam`'s
//!   `DVec3`/`DMat4`); the projected unit square is far too small for `f32`

pub mod drive;
pub mod layers;
pub mod mercator;
pub mod transform;

pub use drive::{DriveInput, Key, KeyEvent, MotionState, Step, StepResult, Tuning, ease_out, step};
pub use layers::{ExtrusionLayer, FeatureState, StyleLayers};
pub use mercator::{LngLat, MercatorCoord};
pub use transform::{ModelTransform, compose_projection};
