//! Per-frame overlay render hook.
//!
//! Rides the host map's frame loop: each displayed frame it takes the map's
//! current view matrix, composes it with the fixed model transform, records
//! the result for this frame's consumers, and asks the host to repaint. The composed
//! matrix is rebuilt from scratch every frame; nothing cached survives from
//! the previous draw, because the host renderer and the overlay share one
//! graphics context.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, RequestRedraw};
use glam::{DMat4, DVec3};
use mapdrive::mercator::MercatorCoord;
use mapdrive::transform::compose_projection;

use crate::car::CarPlacement;
use crate::map::MapView;
use crate::motion::update_motion;

/// Plugin for the overlay render hook.
pub struct OverlayPlugin;

impl Plugin for OverlayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OverlayFrame>()
            .add_systems(Update, (compose_overlay, follow_map_view).chain().after(update_motion));
    }
}

/// Marker component for the overlay scene camera.
#[derive(Component)]
pub struct OverlayCamera;

/// The projection composed for the current frame.
///
/// Cleared at the start of every hook invocation and rebuilt from the live
/// view matrix, so stale state can never leak into the next draw. Downstream
/// systems read it the same frame: the follow camera only moves on frames
/// that composed a projection, and the tuning panel projects the car through
/// it for the screen-position readout.
#[derive(Resource, Default)]
pub struct OverlayFrame {
    clip_from_model: Option<DMat4>,
}

impl OverlayFrame {
    /// Drop everything carried over from the previous draw.
    pub fn reset(&mut self) {
        self.clip_from_model = None;
    }

    /// Project a model-local point through the composed projection into
    /// normalised device coordinates.
    ///
    /// `None` when this frame composed no projection or the point sits
    /// behind the camera plane.
    #[must_use]
    pub fn project_to_ndc(&self, local: DVec3) -> Option<DVec3> {
        let clip_from_model = self.clip_from_model?;
        let clip = clip_from_model * local.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        Some(clip.truncate() / clip.w)
    }
}

/// Rebuild the composed projection `M = view · L` for this frame.
#[allow(clippy::needless_pass_by_value)]
fn compose_overlay(
    window: Single<&Window, With<PrimaryWindow>>,
    view: Res<MapView>,
    placement: Option<Res<CarPlacement>>,
    mut frame: ResMut<OverlayFrame>,
    mut redraw: MessageWriter<RequestRedraw>,
) {
    frame.reset();

    // No placement yet means no model this frame; nothing is rendered for it.
    let Some(placement) = placement else {
        return;
    };

    let view_matrix = view.view_projection(f64::from(window.width()), f64::from(window.height()));
    frame.clip_from_model = Some(compose_projection(view_matrix, &placement.0));

    // The overlay does not drive its own frame loop; ask the host to paint
    // the next frame.
    redraw.write(RequestRedraw);
}

/// Pose the overlay camera to match the host map's viewport.
///
/// Only runs on frames where the hook composed a projection; a frame with
/// nothing composed leaves the camera where the last drawn frame put it.
/// Works in the model's local meter space: the map centre is pulled back
/// through the placement matrix, and the camera orbits it at the map's pitch
/// and bearing from the zoom-derived distance.
#[allow(clippy::needless_pass_by_value, clippy::cast_possible_truncation)]
fn follow_map_view(
    window: Single<&Window, With<PrimaryWindow>>,
    view: Res<MapView>,
    frame: Res<OverlayFrame>,
    placement: Option<Res<CarPlacement>>,
    mut cameras: Query<&mut Transform, With<OverlayCamera>>,
) {
    if frame.clip_from_model.is_none() {
        return;
    }
    let Some(placement) = placement else {
        return;
    };
    let Ok(mut transform) = cameras.single_mut() else {
        return;
    };

    let center = MercatorCoord::from_lng_lat(view.center, 0.0);
    let target = placement
        .0
        .local_matrix()
        .inverse()
        .transform_point3(DVec3::new(center.x, center.y, center.z))
        .as_vec3();

    // Camera distance in local meters: pixels divided by pixels-per-meter.
    let pixels_per_meter = view.world_size() * placement.0.scale;
    let distance =
        (view.camera_to_center_distance(f64::from(window.height())) / pixels_per_meter) as f32;

    let pitch = view.pitch.to_radians();
    let bearing = view.bearing.to_radians();
    let horizontal = Vec3::new(bearing.sin() as f32, 0.0, bearing.cos() as f32);
    let offset = (horizontal * pitch.sin() as f32 + Vec3::Y * pitch.cos() as f32) * distance;

    *transform = Transform::from_translation(target + offset).looking_at(target, Vec3::Y);
}
