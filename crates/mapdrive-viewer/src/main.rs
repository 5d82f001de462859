//! Interactive map demo with a keyboard-driven 3D car, using Bevy.
//!
//! A car model sits on a real-world map position; W/A/S/D accelerate and
//! steer it with physics-like easing, and the map camera follows. The map
//! engine itself is an external collaborator: this application holds its
//! camera and style surface, drives it once per frame, and renders the 3D
//! overlay scene.

mod car;
mod input;
mod launch_params;
mod map;
mod motion;
mod overlay;
mod ui;

use bevy::prelude::*;
use car::CarPlugin;
use input::DriveInputPlugin;
use map::MapPlugin;
use motion::MotionPlugin;
use overlay::OverlayPlugin;
use ui::TuningUiPlugin;

/// Plugin for the main application.
pub struct AppPlugin;

impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            MapPlugin,
            CarPlugin,
            DriveInputPlugin,
            MotionPlugin,
            OverlayPlugin,
            TuningUiPlugin,
        ))
        .add_systems(Startup, setup_scene);
    }
}

/// Set up the 3D overlay scene: camera and lights.
fn setup_scene(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Camera {
            clear_color: bevy::camera::ClearColorConfig::Custom(Color::srgb(0.85, 0.85, 0.85)),
            ..default()
        },
        Transform::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: map::CAMERA_FOV_RADIANS as f32,
            near: 0.1,
            far: 100_000.0,
            ..Default::default()
        }),
        // The host map's fog pair: white, range [-5, 20].
        DistanceFog {
            color: Color::WHITE,
            falloff: FogFalloff::Linear {
                start: map::FOG_RANGE[0] as f32 * map::FOG_DISTANCE_SCALE_M,
                end: map::FOG_RANGE[1] as f32 * map::FOG_DISTANCE_SCALE_M,
            },
            ..default()
        },
        overlay::OverlayCamera,
    ));

    // Two opposed directional lights so the car reads from any heading.
    commands.spawn((
        DirectionalLight::default(),
        Transform::default().looking_to(-Vec3::new(0.0, -70.0, 100.0).normalize(), Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight::default(),
        Transform::default().looking_to(-Vec3::new(0.0, 70.0, 100.0).normalize(), Vec3::Y),
    ));

    tracing::info!("Scene setup complete - drive with W/A/S/D");
}

fn main() {
    // Initialize tracing for native platforms.
    #[cfg(not(target_family = "wasm"))]
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    // Initialize tracing for WASM (logs to browser console).
    #[cfg(target_family = "wasm")]
    {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    }

    let params = launch_params::parse();

    let mut app = App::new();

    #[allow(unused_mut)]
    let mut window = Window {
        title: "mapdrive-viewer".to_string(),
        resolution: (1280, 720).into(),
        ..Default::default()
    };

    // WASM: Fit canvas to parent element and prevent browser event handling.
    #[cfg(target_family = "wasm")]
    {
        window.fit_canvas_to_parent = true;
        window.prevent_default_event_handling = true;
    }

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(window),
        ..Default::default()
    }));

    app.insert_resource(params).add_plugins(AppPlugin).run();
}
