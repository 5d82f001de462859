//! Model transform and overlay matrix composition.
//!
//! The model transform positions a 3D asset authored in real-world meters
//! onto the map: a one-time translate/rotate/scale computed from a fixed
//! geographic origin. Each displayed frame the overlay composes it with the
//! host map's current view matrix to produce the projection the 3D scene is
//! rendered with.

use glam::{DMat4, DVec3};

use crate::mercator::{LngLat, MercatorCoord};

/// Immutable placement of the 3D model in projected space.
///
/// Computed once at startup and never mutated; per-frame movement happens in
/// the model's local space, not here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelTransform {
    /// Translation in projected units.
    pub translation: DVec3,
    /// Rotation angles around the x, y and z axes, in radians.
    pub rotation: DVec3,
    /// Uniform scale converting model meters to projected units.
    pub scale: f64,
}

impl ModelTransform {
    /// Compute the transform for a model placed at `origin` with the given
    /// altitude (meters) and fixed rotation (radians per axis).
    #[must_use]
    pub fn from_origin(origin: LngLat, altitude_m: f64, rotation: DVec3) -> Self {
        let coord = MercatorCoord::from_lng_lat(origin, altitude_m);
        Self {
            translation: DVec3::new(coord.x, coord.y, coord.z),
            rotation,
            scale: coord.meters_to_units(),
        }
    }

    /// The model-to-world matrix `L = T · S(s, −s, s) · Rx · Ry · Rz`.
    ///
    /// The negative Y scale corrects for the map engine's inverted Y axis
    /// relative to the 3D renderer's convention. This asymmetry is required,
    /// not a bug.
    #[must_use]
    pub fn local_matrix(&self) -> DMat4 {
        let rotation_x = DMat4::from_rotation_x(self.rotation.x);
        let rotation_y = DMat4::from_rotation_y(self.rotation.y);
        let rotation_z = DMat4::from_rotation_z(self.rotation.z);

        DMat4::from_translation(self.translation)
            * DMat4::from_scale(DVec3::new(self.scale, -self.scale, self.scale))
            * rotation_x
            * rotation_y
            * rotation_z
    }
}

/// Compose the overlay camera projection `M = view · L` for one frame.
///
/// `view` is the host map's current 4×4 view/projection matrix; the result
/// maps model-local meters directly to clip space.
#[must_use]
pub fn compose_projection(view: DMat4, model: &ModelTransform) -> DMat4 {
    view * model.local_matrix()
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    const ORIGIN: LngLat = LngLat::new(107.548529, -6.973064);

    fn model() -> ModelTransform {
        ModelTransform::from_origin(ORIGIN, 0.0, DVec3::new(FRAC_PI_2, 0.0, 0.0))
    }

    #[test]
    fn test_from_origin_matches_bridge_output() {
        let m = model();
        let coord = MercatorCoord::from_lng_lat(ORIGIN, 0.0);

        assert!(m.translation.x == coord.x);
        assert!(m.translation.y == coord.y);
        assert!(m.translation.z == coord.z);
        assert!(m.scale == coord.meters_to_units());
        assert!(m.scale > 0.0);
    }

    #[test]
    fn test_local_matrix_places_model_origin_at_translation() {
        let m = model();
        let placed = m.local_matrix().transform_point3(DVec3::ZERO);

        assert!((placed.x - m.translation.x).abs() < 1e-15);
        assert!((placed.y - m.translation.y).abs() < 1e-15);
        assert!((placed.z - m.translation.z).abs() < 1e-15);
    }

    #[test]
    fn test_local_matrix_flips_y() {
        // A transform with no rotation isolates the scale column signs.
        let m = ModelTransform {
            translation: DVec3::ZERO,
            rotation: DVec3::ZERO,
            scale: 2.0,
        };
        let l = m.local_matrix();

        let unit_x = l.transform_vector3(DVec3::X);
        let unit_y = l.transform_vector3(DVec3::Y);
        let unit_z = l.transform_vector3(DVec3::Z);

        assert!((unit_x.x - 2.0).abs() < 1e-15);
        assert!((unit_y.y + 2.0).abs() < 1e-15);
        assert!((unit_z.z - 2.0).abs() < 1e-15);
    }

    #[test]
    fn test_rotation_order_is_x_then_y_then_z() {
        // With rx = π/2 and identity elsewhere, local +Z maps to -Y, and the
        // Y flip then lands it on +Y.
        let m = ModelTransform {
            translation: DVec3::ZERO,
            rotation: DVec3::new(FRAC_PI_2, 0.0, 0.0),
            scale: 1.0,
        };
        let out = m.local_matrix().transform_vector3(DVec3::Z);

        assert!(out.x.abs() < 1e-12);
        assert!((out.y - 1.0).abs() < 1e-12);
        assert!(out.z.abs() < 1e-12);
    }

    #[test]
    fn test_compose_projection_with_identity_view() {
        let m = model();
        let composed = compose_projection(DMat4::IDENTITY, &m);
        let local = m.local_matrix();

        assert!(composed.abs_diff_eq(local, 1e-15));
    }

    #[test]
    fn test_compose_projection_applies_view_last() {
        let m = model();
        let view = DMat4::from_translation(DVec3::new(1.0, 2.0, 3.0));

        let composed = compose_projection(view, &m);
        let direct = view * m.local_matrix();

        assert!(composed.abs_diff_eq(direct, 1e-15));
    }
}
