//! Tuning panel and performance readout.
//!
//! One egui window: the buildings toggle, the acceleration and inertia
//! sliders, FPS from the frame-time diagnostics, and the car's live state.

use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPlugin, EguiPrimaryContextPass, egui};
use mapdrive::drive::{ACCELERATION_MAX, ACCELERATION_MIN, INERTIA_MAX, INERTIA_MIN, TUNING_STEP};

use crate::car::{Car, CarModel};
use crate::map::MapStyle;
use crate::motion::{CarMotion, TuningState};
use crate::overlay::OverlayFrame;

/// Plugin for the tuning panel overlay.
pub struct TuningUiPlugin;

impl Plugin for TuningUiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin::default())
            .add_plugins(FrameTimeDiagnosticsPlugin::default())
            .add_systems(EguiPrimaryContextPass, tuning_ui_system);
    }
}

/// Render the tuning panel.
#[allow(clippy::needless_pass_by_value)]
fn tuning_ui_system(
    mut contexts: EguiContexts,
    diagnostics: Res<DiagnosticsStore>,
    mut tuning: ResMut<TuningState>,
    mut style: ResMut<MapStyle>,
    motion: Res<CarMotion>,
    car_model: Res<CarModel>,
    frame: Res<OverlayFrame>,
    transforms: Query<&Transform, With<Car>>,
) -> Result {
    let ctx = contexts.ctx_mut()?;

    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(bevy::diagnostic::Diagnostic::smoothed)
        .unwrap_or(0.0);

    let car_position = car_model
        .entity()
        .and_then(|entity| transforms.get(entity).ok())
        .map(|transform| transform.translation);

    egui::Window::new("Tuning")
        .default_pos([10.0, 10.0])
        .show(ctx, |ui| {
            let mut buildings = tuning.0.buildings;
            if ui.checkbox(&mut buildings, "buildings").changed() {
                tuning.0.buildings = buildings;
                // The layer ops are guarded; repeated toggles stay no-ops.
                crate::map::sync_buildings_layer(&mut style, buildings);
            }

            let mut acceleration = tuning.0.acceleration;
            if ui
                .add(
                    egui::Slider::new(&mut acceleration, ACCELERATION_MIN..=ACCELERATION_MAX)
                        .step_by(TUNING_STEP)
                        .text("acceleration"),
                )
                .changed()
            {
                tuning.0.set_acceleration(acceleration);
            }

            let mut inertia = tuning.0.inertia;
            if ui
                .add(
                    egui::Slider::new(&mut inertia, INERTIA_MIN..=INERTIA_MAX)
                        .step_by(TUNING_STEP)
                        .text("inertia"),
                )
                .changed()
            {
                tuning.0.set_inertia(inertia);
            }

            ui.separator();
            ui.label(format!("FPS: {fps:.0}"));
            ui.label(format!("Velocity: {:+.5}", motion.0.velocity));
            ui.label(format!("Heading: {:.1}°", motion.0.heading.to_degrees()));
            match car_position {
                Some(position) => {
                    ui.label(format!(
                        "Position: ({:.3}, {:.3}, {:.3})",
                        position.x, position.y, position.z
                    ));
                }
                None => {
                    ui.label("Position: (car not loaded)");
                }
            }
            // Where the composed projection puts the car on screen.
            let on_screen =
                car_position.and_then(|position| frame.project_to_ndc(position.as_dvec3()));
            match on_screen {
                Some(ndc) => {
                    ui.label(format!("Screen: ({:+.3}, {:+.3})", ndc.x, ndc.y));
                }
                None => {
                    ui.label("Screen: (not projected)");
                }
            }

            ui.separator();
            ui.label("Controls:");
            ui.label("  W/S - Accelerate / reverse");
            ui.label("  A/D - Steer left / right");
        });

    Ok(())
}
