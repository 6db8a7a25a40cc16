//! Great-circle distance between coordinates.

use crate::Coordinate;

/// Mean Earth radius used by [`distance_meters`].
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance in metres between `a` and `b`.
///
/// # Examples
///
/// ```
/// use wayfinder_core::{Coordinate, distance_meters};
///
/// # fn main() -> Result<(), wayfinder_core::CoordinateError> {
/// let a = Coordinate::new(51.5007, -0.1246)?;
/// let b = Coordinate::new(51.5033, -0.1196)?;
/// let metres = distance_meters(a, b);
/// assert!((metres - 450.95).abs() < 0.5);
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let phi_a = a.lat().to_radians();
    let phi_b = b.lat().to_radians();
    let delta_phi = (b.lat() - a.lat()).to_radians();
    let delta_lambda = (b.lng() - a.lng()).to_radians();

    let half_chord = (delta_phi / 2.0).sin().powi(2)
        + phi_a.cos() * phi_b.cos() * (delta_lambda / 2.0).sin().powi(2);
    let angle = 2.0 * half_chord.sqrt().atan2((1.0 - half_chord).sqrt());

    EARTH_RADIUS_METERS * angle
}
