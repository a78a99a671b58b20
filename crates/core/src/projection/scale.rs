//! Ground scale of geographic coordinates on the WGS84 ellipsoid

use std::f64::consts::PI;

/// WGS84 semi-major axis (metres)
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 first eccentricity squared
const WGS84_E2: f64 = 0.006_694_379_990_14;

/// Metres spanned by one degree of longitude and one degree of latitude
/// at `lat_deg`.
///
/// Returns `(xsize, ysize)`.
pub fn geographic_scale(lat_deg: f64) -> (f64, f64) {
    let phi = lat_deg.to_radians();
    let sin_phi = phi.sin();
    let w = 1.0 - WGS84_E2 * sin_phi * sin_phi;

    // Prime vertical and meridional radii of curvature
    let n = WGS84_A / w.sqrt();
    let m = WGS84_A * (1.0 - WGS84_E2) / (w * w.sqrt());

    let per_degree = PI / 180.0;
    (n * phi.cos() * per_degree, m * per_degree)
}

/// Ratio of east-west to north-south ground length of a 1°×1° cell.
pub fn geographic_aspect(lat_deg: f64) -> f64 {
    let (xsize, ysize) = geographic_scale(lat_deg);
    xsize / ysize
}
