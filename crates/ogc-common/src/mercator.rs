//! Spherical Web Mercator (EPSG:3857) forward and inverse projection.

use std::f64::consts::PI;

/// WGS84 semi-major axis used by the spherical Mercator.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Half the width of the projected world in meters.
pub const MAX_EXTENT: f64 = 20_037_508.342_789_244;

/// Latitude at which the projected world becomes square.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Project WGS84 lon/lat (degrees) to Web Mercator meters.
///
/// Latitude is clamped to the Mercator limits so the poles stay finite.
pub fn forward(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = EARTH_RADIUS * lon.to_radians();
    let y = EARTH_RADIUS * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

/// Convert Web Mercator meters back to WGS84 lon/lat (degrees).
pub fn inverse(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
    (lon, lat)
}
