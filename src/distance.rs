//! Great-circle distance on a spherical Earth.
//!
//! Haversine formula with the IUGG mean radius. Accuracy is within ~0.5% of
//! the ellipsoidal geodesic, which is plenty for ranking nearby places.

use crate::error::FilmapError;
use crate::location::Coordinate;

/// IUGG mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Great-circle distance between `a` and `b` in kilometres.
///
/// Fails with [`FilmapError::InvalidCoordinate`] if either point is NaN,
/// infinite, or outside the valid lat/lon ranges.
pub fn distance(a: Coordinate, b: Coordinate) -> Result<f64, FilmapError> {
    a.validate()?;
    b.validate()?;
    Ok(haversine_km(a, b))
}

fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lon - a.lon).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1.0 for antipodal points.
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}
