//! The host map engine's camera and style surface.
//!
//! The map renderer itself is an external collaborator; this module holds
//! the state the demo hands to it: the camera viewport (centre, zoom, pitch,
//! bearing, fog), the style descriptor, and the live layer set. It also
//! produces the per-frame view matrix the overlay render hook composes with
//! the model transform.

use bevy::prelude::*;
use glam::{DMat4, DVec3};
use mapdrive::layers::StyleLayers;
use mapdrive::mercator::{LngLat, MercatorCoord};

use crate::launch_params::LaunchParams;

/// Style descriptor consumed by the host map.
pub const STYLE_URL: &str = "https://api.maptiler.com/maps/streets/style.json";

/// Initial viewport, fixed in code.
pub const INITIAL_ZOOM: f64 = 30.0;
pub const INITIAL_PITCH: f64 = 45.0;
pub const INITIAL_BEARING: f64 = -90.0;

/// Fog effect range/colour pair handed to the host map.
pub const FOG_RANGE: [f64; 2] = [-5.0, 20.0];
pub const FOG_COLOR: &str = "white";

/// Meters per fog-range unit when the fog pair is applied to the overlay
/// scene's distance fog.
pub const FOG_DISTANCE_SCALE_M: f32 = 100.0;

/// The map camera's vertical field of view, `2·atan(1/3)`.
pub const CAMERA_FOV_RADIANS: f64 = 0.643_501_108_793_284_4;

/// Side length of one map tile in pixels.
pub const TILE_SIZE: f64 = 512.0;

/// Plugin for the host map surface.
pub struct MapPlugin;

impl Plugin for MapPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreStartup, init_map);
    }
}

/// Build the map resources from the launch parameters.
///
/// Runs in `PreStartup` so every other plugin can assume the map surface
/// exists, mirroring the host's "loaded" event before layer attachment.
fn init_map(mut commands: Commands, params: Res<LaunchParams>) {
    let origin = LngLat::new(params.lng, params.lat);

    commands.insert_resource(MapView::centered_on(origin));

    let mut style = MapStyle::new(params.access_token.clone());
    // The buildings toggle starts on; attach the extrusion layer up front.
    style.layers.set_buildings_visible(true);
    commands.insert_resource(style);

    tracing::info!(
        lng = origin.lng,
        lat = origin.lat,
        zoom = INITIAL_ZOOM,
        "map surface ready, custom layer attached"
    );
}

/// Re-apply the buildings toggle whenever the panel changes it.
///
/// The layer set's add/remove are guarded, so calling this every change (or
/// more often) cannot double-add or remove a missing layer.
pub fn sync_buildings_layer(style: &mut MapStyle, visible: bool) {
    style.layers.set_buildings_visible(visible);
    if visible {
        if let Some(layer) = style.layers.layer(mapdrive::layers::BUILDINGS_LAYER_ID) {
            tracing::debug!(descriptor = %layer.to_style_json(), "building layer active");
        }
    }
}

/// Fog effect parameters consumed by the host map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub range: [f64; 2],
    pub color: &'static str,
}

/// A camera move issued to the host map.
pub struct CameraMove {
    /// New camera centre.
    pub center: LngLat,
    /// New bearing in degrees; `None` keeps the current bearing.
    pub bearing: Option<f64>,
    /// Easing applied to the transition parameter.
    pub easing: fn(f64) -> f64,
}

/// The host map's camera state.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct MapView {
    /// Camera centre.
    pub center: LngLat,
    /// Zoom level.
    pub zoom: f64,
    /// Camera tilt from vertical, in degrees.
    pub pitch: f64,
    /// Compass heading of the camera, in degrees.
    pub bearing: f64,
    /// Fog effect handed to the host.
    pub fog: Fog,
}

impl MapView {
    /// The initial viewport centred on the given origin.
    #[must_use]
    pub fn centered_on(center: LngLat) -> Self {
        Self {
            center,
            zoom: INITIAL_ZOOM,
            pitch: INITIAL_PITCH,
            bearing: INITIAL_BEARING,
            fog: Fog {
                range: FOG_RANGE,
                color: FOG_COLOR,
            },
        }
    }

    /// Apply a camera move, easing the full transition in one step.
    ///
    /// Per-frame recentring issues one complete move per frame, so the
    /// transition parameter is evaluated at its end point.
    pub fn jump_to(&mut self, movement: &CameraMove) {
        let t = (movement.easing)(1.0);

        self.center = LngLat::new(
            self.center.lng + (movement.center.lng - self.center.lng) * t,
            self.center.lat + (movement.center.lat - self.center.lat) * t,
        );
        if let Some(bearing) = movement.bearing {
            self.bearing += (bearing - self.bearing) * t;
        }
    }

    /// Pixel extent of the projected world square at the current zoom.
    #[must_use]
    pub fn world_size(&self) -> f64 {
        TILE_SIZE * self.zoom.exp2()
    }

    /// Distance from the camera to the viewport centre, in pixels.
    #[must_use]
    pub fn camera_to_center_distance(&self, viewport_height: f64) -> f64 {
        0.5 * viewport_height / (CAMERA_FOV_RADIANS / 2.0).tan()
    }

    /// The 4×4 view/projection matrix handed to the overlay render hook.
    ///
    /// Maps projected (Mercator unit square) coordinates to clip space:
    /// perspective · translate(0, 0, −camDist) · Rx(pitch) · Rz(−bearing) ·
    /// scale(worldSize) · translate(−centre).
    #[must_use]
    pub fn view_projection(&self, viewport_width: f64, viewport_height: f64) -> DMat4 {
        let center = MercatorCoord::from_lng_lat(self.center, 0.0);
        let world = self.world_size();
        let cam_dist = self.camera_to_center_distance(viewport_height);

        let near = viewport_height / 50.0;
        let far = cam_dist * 10.0;
        let perspective = DMat4::perspective_rh_gl(
            CAMERA_FOV_RADIANS,
            viewport_width / viewport_height,
            near,
            far,
        );

        perspective
            * DMat4::from_translation(DVec3::new(0.0, 0.0, -cam_dist))
            * DMat4::from_rotation_x(self.pitch.to_radians())
            * DMat4::from_rotation_z(-self.bearing.to_radians())
            * DMat4::from_scale(DVec3::splat(world))
            * DMat4::from_translation(DVec3::new(-center.x, -center.y, 0.0))
    }
}

/// The host map's style surface: descriptor URL, access token and layers.
#[derive(Resource, Debug, Clone)]
pub struct MapStyle {
    /// Style descriptor URL (without the access key).
    pub style_url: String,
    /// Access token for the map service, if supplied.
    pub access_token: Option<String>,
    /// Live layer set; mutated by the buildings toggle.
    pub layers: StyleLayers,
}

impl MapStyle {
    /// A style surface for the demo's fixed style URL.
    #[must_use]
    pub fn new(access_token: Option<String>) -> Self {
        Self {
            style_url: STYLE_URL.to_string(),
            access_token,
            layers: StyleLayers::new(),
        }
    }

    /// The full style descriptor URL the host fetches, key included.
    #[must_use]
    pub fn descriptor_url(&self) -> String {
        match &self.access_token {
            Some(token) => format!("{}?key={token}", self.style_url),
            None => self.style_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use mapdrive::drive::ease_out;
    use mapdrive::layers::BUILDINGS_LAYER_ID;

    use super::*;

    const ORIGIN: LngLat = LngLat::new(107.548529, -6.973064);

    #[test]
    fn test_view_projection_centers_the_viewport() {
        let mut view = MapView::centered_on(ORIGIN);
        view.pitch = 0.0;
        view.bearing = 0.0;

        let matrix = view.view_projection(1280.0, 720.0);
        let center = MercatorCoord::from_lng_lat(ORIGIN, 0.0);
        let clip = matrix.project_point3(DVec3::new(center.x, center.y, 0.0));

        // The camera centre lands on the viewport centre.
        assert!(clip.x.abs() < 1e-9);
        assert!(clip.y.abs() < 1e-9);
    }

    #[test]
    fn test_view_projection_offsets_scale_with_world_size() {
        let mut view = MapView::centered_on(ORIGIN);
        view.pitch = 0.0;
        view.bearing = 0.0;
        view.zoom = 10.0;

        // A point east of centre projects to positive clip x.
        let matrix = view.view_projection(1280.0, 720.0);
        let center = MercatorCoord::from_lng_lat(ORIGIN, 0.0);
        let east = DVec3::new(center.x + 1e-5, center.y, 0.0);
        assert!(matrix.project_point3(east).x > 0.0);
    }

    #[test]
    fn test_jump_to_full_transition() {
        let mut view = MapView::centered_on(ORIGIN);
        let target = LngLat::new(ORIGIN.lng + 0.001, ORIGIN.lat - 0.002);

        view.jump_to(&CameraMove {
            center: target,
            bearing: Some(-42.0),
            easing: ease_out,
        });

        // ease_out(1) = 1, so a single move lands exactly on target.
        assert!((view.center.lng - target.lng).abs() < 1e-12);
        assert!((view.center.lat - target.lat).abs() < 1e-12);
        assert!((view.bearing + 42.0).abs() < 1e-12);
    }

    #[test]
    fn test_jump_to_keeps_bearing_when_absent() {
        let mut view = MapView::centered_on(ORIGIN);
        let before = view.bearing;

        view.jump_to(&CameraMove {
            center: ORIGIN,
            bearing: None,
            easing: ease_out,
        });

        assert!(view.bearing == before);
    }

    #[test]
    fn test_descriptor_url() {
        let with_token = MapStyle::new(Some("K156".to_string()));
        assert!(with_token.descriptor_url() == format!("{STYLE_URL}?key=K156"));

        let without = MapStyle::new(None);
        assert!(without.descriptor_url() == STYLE_URL);
    }

    #[test]
    fn test_initial_style_has_no_layers_until_toggled() {
        let mut style = MapStyle::new(None);
        assert!(style.layers.layer(BUILDINGS_LAYER_ID).is_none());
        style.layers.set_buildings_visible(true);
        assert!(style.layers.layer(BUILDINGS_LAYER_ID).is_some());
    }
}
