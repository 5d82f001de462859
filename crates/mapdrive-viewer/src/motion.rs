//! Per-frame motion update.
//!
//! Runs the drive simulation step once per frame, applies the resulting
//! displacement and heading to the car entity, and recentres the host map
//! camera on the car's position.

use bevy::prelude::*;
use glam::DVec3;
use mapdrive::drive::{MotionState, StepResult, Tuning, ease_out, step};
use mapdrive::mercator::MercatorCoord;

use crate::car::{Car, CarModel, CarPlacement};
use crate::input::{CarInput, capture_drive_keys, release_drive_keys};
use crate::map::{CameraMove, MapView};

/// Plugin for the motion updater.
pub struct MotionPlugin;

impl Plugin for MotionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CarMotion>()
            .init_resource::<TuningState>()
            .add_systems(
                Update,
                update_motion
                    .after(capture_drive_keys)
                    .after(release_drive_keys),
            );
    }
}

/// The car's simulation state, carried between frames.
#[derive(Resource, Default)]
pub struct CarMotion(pub MotionState);

/// Live tuning parameters, owned by the panel and read here every frame.
#[derive(Resource, Default)]
pub struct TuningState(pub Tuning);

/// Advance the simulation one frame and apply the result to the scene.
///
/// Skips cleanly while the car has not been spawned; a halted step leaves
/// both the car and the map camera untouched.
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn update_motion(
    input: Res<CarInput>,
    tuning: Res<TuningState>,
    car_model: Res<CarModel>,
    placement: Option<Res<CarPlacement>>,
    mut motion: ResMut<CarMotion>,
    mut view: ResMut<MapView>,
    mut transforms: Query<&mut Transform, With<Car>>,
) {
    let Some(placement) = placement else {
        return;
    };
    let Some(entity) = car_model.entity() else {
        return;
    };
    let Ok(mut transform) = transforms.get_mut(entity) else {
        return;
    };

    let StepResult::Moved(moved) = step(&mut motion.0, &input.0, &tuning.0) else {
        return;
    };

    // Integrate the model-local displacement into the current position.
    transform.translation += moved.displacement.as_vec3();
    #[allow(clippy::cast_possible_truncation)]
    {
        transform.rotation = Quat::from_rotation_z(motion.0.heading as f32);
    }

    // Recentre the map camera on the car, easing the transition.
    let center = car_lng_lat(&placement.0.local_matrix(), transform.translation.as_dvec3());
    view.jump_to(&CameraMove {
        center,
        bearing: moved.bearing,
        easing: ease_out,
    });
}

/// Convert a model-local position to geographic coordinates through the
/// model's placement matrix.
fn car_lng_lat(local_matrix: &glam::DMat4, local: DVec3) -> mapdrive::mercator::LngLat {
    let projected = local_matrix.transform_point3(local);
    MercatorCoord {
        x: projected.x,
        y: projected.y,
        z: projected.z,
    }
    .to_lng_lat()
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use mapdrive::mercator::LngLat;
    use mapdrive::transform::ModelTransform;

    use super::*;

    const ORIGIN: LngLat = LngLat::new(107.548529, -6.973064);

    #[test]
    fn test_car_at_local_origin_recenters_on_model_origin() {
        let model = ModelTransform::from_origin(ORIGIN, 0.0, DVec3::new(FRAC_PI_2, 0.0, 0.0));
        let center = car_lng_lat(&model.local_matrix(), DVec3::ZERO);

        assert!((center.lng - ORIGIN.lng).abs() < 1e-9);
        assert!((center.lat - ORIGIN.lat).abs() < 1e-9);
    }

    #[test]
    fn test_forward_displacement_keeps_the_center_stable() {
        // The π/2 tip maps the model's local Y onto the projected vertical
        // axis, so forward motion does not drag the centre sideways; the
        // recentre stays pinned to the origin, exactly as the host saw it.
        let model = ModelTransform::from_origin(ORIGIN, 0.0, DVec3::new(FRAC_PI_2, 0.0, 0.0));
        let matrix = model.local_matrix();

        let moved = car_lng_lat(&matrix, DVec3::new(0.0, -10.0, 0.0));
        let still = car_lng_lat(&matrix, DVec3::ZERO);

        assert!((moved.lng - still.lng).abs() < 1e-12);
        assert!((moved.lat - still.lat).abs() < 1e-12);

        // Lateral (local X) displacement does shift the centre.
        let lateral = car_lng_lat(&matrix, DVec3::new(10.0, 0.0, 0.0));
        assert!((lateral.lng - still.lng).abs() > 0.0);
    }
}
