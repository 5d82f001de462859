//! Web Mercator coordinate bridge.
//!
//! Converts geographic longitude/latitude into the map engine's projected
//! coordinate space (the unit square covering the world) and back, and
//! provides the meters-to-projected-units scale factor at a given latitude.
//!
//! Uses the same spherical Earth model as the host map engine, so projected
//! coordinates line up exactly with what the map renders.

use std::f64::consts::PI;

/// Spherical Earth radius in meters (the host map engine's value).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Earth circumference at the equator in meters.
pub const EARTH_CIRCUMFERENCE_M: f64 = 2.0 * PI * EARTH_RADIUS_M;

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LngLat {
    /// Longitude in degrees, east positive.
    pub lng: f64,
    /// Latitude in degrees, north positive.
    pub lat: f64,
}

impl LngLat {
    /// Create a new position from longitude and latitude in degrees.
    #[must_use]
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

/// Earth circumference in meters at the given latitude (degrees).
#[must_use]
pub fn circumference_at_latitude(lat: f64) -> f64 {
    EARTH_CIRCUMFERENCE_M * lat.to_radians().cos()
}

/// Distortion of the Mercator projection at the given latitude (degrees).
///
/// 1.0 at the equator, growing towards the poles.
#[must_use]
pub fn mercator_scale(lat: f64) -> f64 {
    1.0 / lat.to_radians().cos()
}

/// A position in the map engine's projected coordinate space.
///
/// `x` and `y` are in the world unit square: (0, 0) is the north-west corner
/// and (1, 1) the south-east corner. `z` is altitude expressed in the same
/// units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MercatorCoord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl MercatorCoord {
    /// Project a geographic position and altitude (meters) into Mercator
    /// space.
    ///
    /// This is a pure function of its inputs; re-running it with the same
    /// origin yields bit-identical output.
    #[must_use]
    pub fn from_lng_lat(pos: LngLat, altitude_m: f64) -> Self {
        let x = (180.0 + pos.lng) / 360.0;
        let y = (180.0 - (PI / 4.0 + pos.lat.to_radians() / 2.0).tan().ln().to_degrees()) / 360.0;
        let z = altitude_m / circumference_at_latitude(pos.lat);
        Self { x, y, z }
    }

    /// Unproject back to longitude/latitude in degrees.
    #[must_use]
    pub fn to_lng_lat(self) -> LngLat {
        let lng = self.x * 360.0 - 180.0;
        let lat = (2.0 * ((180.0 - self.y * 360.0).to_radians()).exp().atan() - PI / 2.0).to_degrees();
        LngLat { lng, lat }
    }

    /// The distance of one meter in projected units at this coordinate's
    /// latitude.
    ///
    /// A 3D model authored in real-world meters is scaled uniformly by this
    /// factor to sit correctly on the map. Strictly positive for any latitude
    /// the projection covers.
    #[must_use]
    pub fn meters_to_units(self) -> f64 {
        mercator_scale(self.to_lng_lat().lat) / EARTH_CIRCUMFERENCE_M
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The demo's fixed model origin (Bandung, Indonesia).
    const ORIGIN: LngLat = LngLat::new(107.548529, -6.973064);

    #[test]
    fn test_projection_of_model_origin() {
        let coord = MercatorCoord::from_lng_lat(ORIGIN, 0.0);

        // Nonzero x/y translation, well inside the unit square.
        assert!(coord.x > 0.0 && coord.x < 1.0);
        assert!(coord.y > 0.0 && coord.y < 1.0);
        assert!((coord.x - (180.0 + 107.548529) / 360.0).abs() < 1e-12);

        // Southern hemisphere latitude lands south of the equator line.
        assert!(coord.y > 0.5);

        // Altitude 0 projects to z = 0.
        assert!(coord.z == 0.0);

        // Positive scale factor.
        assert!(coord.meters_to_units() > 0.0);
    }

    #[test]
    fn test_projection_is_pure() {
        let a = MercatorCoord::from_lng_lat(ORIGIN, 0.0);
        let b = MercatorCoord::from_lng_lat(ORIGIN, 0.0);

        // Bit-identical, not just approximately equal.
        assert!(a.x.to_bits() == b.x.to_bits());
        assert!(a.y.to_bits() == b.y.to_bits());
        assert!(a.z.to_bits() == b.z.to_bits());
        assert!(a.meters_to_units().to_bits() == b.meters_to_units().to_bits());
    }

    #[test]
    fn test_round_trip() {
        let coord = MercatorCoord::from_lng_lat(ORIGIN, 0.0);
        let back = coord.to_lng_lat();
        assert!((back.lng - ORIGIN.lng).abs() < 1e-9);
        assert!((back.lat - ORIGIN.lat).abs() < 1e-9);
    }

    #[test]
    fn test_equator_reference_points() {
        // Null island sits at the center of the world square.
        let coord = MercatorCoord::from_lng_lat(LngLat::new(0.0, 0.0), 0.0);
        assert!((coord.x - 0.5).abs() < 1e-12);
        assert!((coord.y - 0.5).abs() < 1e-12);

        // At the equator a meter is exactly 1/circumference units.
        let per_meter = coord.meters_to_units();
        assert!((per_meter - 1.0 / EARTH_CIRCUMFERENCE_M).abs() < 1e-20);
    }

    #[test]
    fn test_altitude_scales_with_latitude_circumference() {
        let lat = 60.0;
        let coord = MercatorCoord::from_lng_lat(LngLat::new(10.0, lat), 100.0);
        let expected = 100.0 / circumference_at_latitude(lat);
        assert!((coord.z - expected).abs() < 1e-15);
    }

    #[test]
    fn test_scale_grows_away_from_equator() {
        assert!(mercator_scale(0.0) < mercator_scale(45.0));
        assert!(mercator_scale(45.0) < mercator_scale(80.0));
    }
}
