//! Car asset loading and placement.
//!
//! Spawns the car's GLTF scene at startup and records the entity in a
//! set-once cell read by the motion and overlay systems. A failed asset load
//! is logged and leaves the scene without the model; nothing else changes.

use std::f64::consts::FRAC_PI_2;

use bevy::asset::LoadState;
use bevy::prelude::*;
use glam::DVec3;
use mapdrive::mercator::LngLat;
use mapdrive::transform::ModelTransform;

use crate::launch_params::LaunchParams;

/// Asset path of the car model.
pub const CAR_MODEL_PATH: &str = "models/car.gltf";

/// Fixed model rotation: tipped upright onto the map plane.
pub const MODEL_ROTATION: DVec3 = DVec3::new(FRAC_PI_2, 0.0, 0.0);

/// Plugin for the car model.
pub struct CarPlugin;

impl Plugin for CarPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CarModel>()
            .add_systems(Startup, spawn_car)
            .add_systems(Update, watch_car_load);
    }
}

/// Marker component for the car's root entity.
#[derive(Component)]
pub struct Car;

/// The immutable model transform placing the car scene on the map.
///
/// Computed once at startup and never mutated afterwards.
#[derive(Resource, Debug, Clone, Copy)]
pub struct CarPlacement(pub ModelTransform);

/// Set-once reference to the car entity plus its scene load handle.
///
/// The entity is assigned exactly once when the car is spawned and read
/// thereafter; there is no other path that writes it.
#[derive(Resource, Default)]
pub struct CarModel {
    entity: Option<Entity>,
    scene: Option<Handle<Scene>>,
    load_reported: bool,
}

impl CarModel {
    /// Record the spawned car entity. Later calls are ignored.
    pub fn set_once(&mut self, entity: Entity, scene: Handle<Scene>) {
        if self.entity.is_none() {
            self.entity = Some(entity);
            self.scene = Some(scene);
        }
    }

    /// The car entity, if the model has been spawned.
    #[must_use]
    pub fn entity(&self) -> Option<Entity> {
        self.entity
    }
}

/// Compute the model transform and spawn the car scene.
fn spawn_car(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    params: Res<LaunchParams>,
    mut car_model: ResMut<CarModel>,
) {
    let origin = LngLat::new(params.lng, params.lat);
    let model = ModelTransform::from_origin(origin, 0.0, MODEL_ROTATION);
    tracing::info!(
        scale = model.scale,
        x = model.translation.x,
        y = model.translation.y,
        "computed model transform"
    );
    commands.insert_resource(CarPlacement(model));

    let scene: Handle<Scene> = asset_server.load(GltfAssetLabel::Scene(0).from_asset(CAR_MODEL_PATH));
    let entity = commands
        .spawn((Car, SceneRoot(scene.clone()), Transform::default()))
        .id();
    car_model.set_once(entity, scene);
}

/// Log the car asset's load outcome once.
///
/// A load failure is not fatal: the scene simply renders without the car.
fn watch_car_load(asset_server: Res<AssetServer>, mut car_model: ResMut<CarModel>) {
    if car_model.load_reported {
        return;
    }
    let Some(scene) = car_model.scene.clone() else {
        return;
    };

    match asset_server.get_load_state(scene.id()) {
        Some(LoadState::Loaded) => {
            tracing::info!(path = CAR_MODEL_PATH, "car model loaded");
            car_model.load_reported = true;
        }
        Some(LoadState::Failed(error)) => {
            tracing::warn!(path = CAR_MODEL_PATH, %error, "car model failed to load; continuing without it");
            car_model.load_reported = true;
        }
        _ => {}
    }
}
