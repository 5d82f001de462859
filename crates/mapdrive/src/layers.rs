//! Building-extrusion layer descriptor and style toggle logic.
//!
//! The 3D building layer is described here and added to / removed from the
//! map style by the panel's `buildings` checkbox. Adding a layer that is
//! already present, or removing one that is absent, is a guarded no-op rather
//! than an error.

use serde_json::{Value, json};

/// Identifier of the building-extrusion layer on the map style.
pub const BUILDINGS_LAYER_ID: &str = "3d-buildings";

/// Zoom level below which the layer is hidden entirely.
pub const BUILDINGS_MIN_ZOOM: f64 = 12.0;

/// Zoom span over which extrusions grow from flat to full height.
pub const GROW_IN_ZOOM_SPAN: f64 = 0.05;

/// Fill colours keyed by per-feature interaction state.
const COLOR_SELECTED: &str = "red";
const COLOR_HOVERED: &str = "lightblue";
const COLOR_DEFAULT: &str = "#aaa";

/// Per-feature interaction state used by the paint rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureState {
    pub selected: bool,
    pub hovered: bool,
}

/// The 3D building-extrusion layer of the map style.
///
/// Serialises to the host map's fill-extrusion layer schema via
/// [`ExtrusionLayer::to_style_json`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExtrusionLayer {
    pub id: String,
    pub source: String,
    pub source_layer: String,
    pub min_zoom: f64,
    pub opacity: f64,
}

impl ExtrusionLayer {
    /// The demo's building layer over the composite `building` source.
    #[must_use]
    pub fn buildings() -> Self {
        Self {
            id: BUILDINGS_LAYER_ID.to_string(),
            source: "composite".to_string(),
            source_layer: "building".to_string(),
            min_zoom: BUILDINGS_MIN_ZOOM,
            opacity: 0.9,
        }
    }

    /// Fill colour for a feature in the given interaction state.
    ///
    /// Selection takes precedence over hover; everything else is flat gray.
    #[must_use]
    pub fn fill_color(&self, state: FeatureState) -> &'static str {
        if state.selected {
            COLOR_SELECTED
        } else if state.hovered {
            COLOR_HOVERED
        } else {
            COLOR_DEFAULT
        }
    }

    /// Rendered extrusion height at `zoom` for a feature of `height` meters.
    ///
    /// Interpolates linearly from 0 at [`Self::min_zoom`] to the full height
    /// at `min_zoom + GROW_IN_ZOOM_SPAN`, producing the grow-in effect as the
    /// user zooms past the threshold.
    #[must_use]
    pub fn height_at_zoom(&self, zoom: f64, height: f64) -> f64 {
        self.grow_in(zoom) * height
    }

    /// Rendered base height at `zoom` for a feature with `min_height` meters.
    #[must_use]
    pub fn base_at_zoom(&self, zoom: f64, min_height: f64) -> f64 {
        self.grow_in(zoom) * min_height
    }

    /// Linear grow-in factor in [0, 1] for the given zoom.
    fn grow_in(&self, zoom: f64) -> f64 {
        ((zoom - self.min_zoom) / GROW_IN_ZOOM_SPAN).clamp(0.0, 1.0)
    }

    /// The layer in the host map's style JSON form, paint expressions
    /// included.
    #[must_use]
    pub fn to_style_json(&self) -> Value {
        json!({
            "id": self.id,
            "source": self.source,
            "source-layer": self.source_layer,
            "filter": ["==", "extrude", "true"],
            "type": "fill-extrusion",
            "minzoom": self.min_zoom,
            "paint": {
                "fill-extrusion-color": [
                    "case",
                    ["boolean", ["feature-state", "select"], false],
                    COLOR_SELECTED,
                    ["boolean", ["feature-state", "hover"], false],
                    COLOR_HOVERED,
                    COLOR_DEFAULT,
                ],
                "fill-extrusion-height": [
                    "interpolate",
                    ["linear"],
                    ["zoom"],
                    self.min_zoom,
                    0,
                    self.min_zoom + GROW_IN_ZOOM_SPAN,
                    ["get", "height"],
                ],
                "fill-extrusion-base": [
                    "interpolate",
                    ["linear"],
                    ["zoom"],
                    self.min_zoom,
                    0,
                    self.min_zoom + GROW_IN_ZOOM_SPAN,
                    ["get", "min_height"],
                ],
                "fill-extrusion-opacity": self.opacity,
            },
        })
    }
}

/// Ordered set of style layers owned by the host map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleLayers {
    layers: Vec<ExtrusionLayer>,
}

impl StyleLayers {
    /// An empty layer set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a layer by id.
    #[must_use]
    pub fn layer(&self, id: &str) -> Option<&ExtrusionLayer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    /// Add a layer unless one with the same id is already present.
    ///
    /// Returns whether the layer was added.
    pub fn add_layer(&mut self, layer: ExtrusionLayer) -> bool {
        if self.layer(&layer.id).is_some() {
            return false;
        }
        tracing::debug!(id = %layer.id, "adding style layer");
        self.layers.push(layer);
        true
    }

    /// Remove a layer by id if present.
    ///
    /// Returns whether a layer was removed.
    pub fn remove_layer(&mut self, id: &str) -> bool {
        let before = self.layers.len();
        self.layers.retain(|layer| layer.id != id);
        let removed = self.layers.len() != before;
        if removed {
            tracing::debug!(id, "removed style layer");
        }
        removed
    }

    /// Apply the panel's buildings toggle: ensure the extrusion layer is
    /// present when `visible`, absent otherwise. Idempotent both ways.
    pub fn set_buildings_visible(&mut self, visible: bool) {
        if visible {
            if self.layer(BUILDINGS_LAYER_ID).is_none() {
                self.add_layer(ExtrusionLayer::buildings());
            }
        } else if self.layer(BUILDINGS_LAYER_ID).is_some() {
            self.remove_layer(BUILDINGS_LAYER_ID);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    }

    #[test]
    fn test_toggle_is_idempotent() {
        init_tracing();
        let mut style = StyleLayers::new();

        // Toggling on twice adds the layer once.
        style.set_buildings_visible(true);
        style.set_buildings_visible(true);
        assert!(style.layer(BUILDINGS_LAYER_ID).is_some());
        assert!(style.layers.len() == 1);

        // Off when absent is a no-op.
        style.set_buildings_visible(false);
        style.set_buildings_visible(false);
        assert!(style.layer(BUILDINGS_LAYER_ID).is_none());

        // Round trip on → off → on matches a single on.
        let mut once = StyleLayers::new();
        once.set_buildings_visible(true);
        style.set_buildings_visible(true);
        assert!(style == once);
    }

    #[test]
    fn test_guarded_add_and_remove() {
        init_tracing();
        let mut style = StyleLayers::new();

        assert!(style.add_layer(ExtrusionLayer::buildings()));
        assert!(!style.add_layer(ExtrusionLayer::buildings()));

        assert!(style.remove_layer(BUILDINGS_LAYER_ID));
        assert!(!style.remove_layer(BUILDINGS_LAYER_ID));
    }

    #[test]
    fn test_fill_color_precedence() {
        let layer = ExtrusionLayer::buildings();

        assert!(layer.fill_color(FeatureState::default()) == "#aaa");
        assert!(
            layer.fill_color(FeatureState {
                hovered: true,
                ..FeatureState::default()
            }) == "lightblue"
        );
        assert!(
            layer.fill_color(FeatureState {
                selected: true,
                hovered: true,
            }) == "red"
        );
    }

    #[test]
    fn test_grow_in_interpolation() {
        let layer = ExtrusionLayer::buildings();
        let height = 40.0;

        // Flat at and below the zoom threshold.
        assert!(layer.height_at_zoom(10.0, height) == 0.0);
        assert!(layer.height_at_zoom(BUILDINGS_MIN_ZOOM, height) == 0.0);

        // Full height once the ramp completes, and beyond.
        assert!((layer.height_at_zoom(BUILDINGS_MIN_ZOOM + GROW_IN_ZOOM_SPAN, height) - height).abs() < 1e-12);
        assert!((layer.height_at_zoom(18.0, height) - height).abs() < 1e-12);

        // Halfway up the ramp is half the height.
        let mid = BUILDINGS_MIN_ZOOM + GROW_IN_ZOOM_SPAN / 2.0;
        assert!((layer.height_at_zoom(mid, height) - height / 2.0).abs() < 1e-9);

        // Base height ramps identically.
        assert!(layer.base_at_zoom(BUILDINGS_MIN_ZOOM, 5.0) == 0.0);
        assert!((layer.base_at_zoom(mid, 5.0) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_style_json_shape() {
        let value = ExtrusionLayer::buildings().to_style_json();

        assert!(value["id"] == "3d-buildings");
        assert!(value["type"] == "fill-extrusion");
        assert!(value["source"] == "composite");
        assert!(value["source-layer"] == "building");
        assert!(value["minzoom"] == 12.0);
        assert!(value["filter"] == json!(["==", "extrude", "true"]));

        let paint = &value["paint"];
        assert!(paint["fill-extrusion-opacity"] == 0.9);
        assert!(paint["fill-extrusion-color"][0] == "case");
        assert!(paint["fill-extrusion-height"][0] == "interpolate");
        assert!(paint["fill-extrusion-height"][3] == 12.0);
        assert!(paint["fill-extrusion-height"][5] == 12.05);
        assert!(paint["fill-extrusion-base"][6] == json!(["get", "min_height"]));
    }
}
