//! WGS84 coordinates in latitude-first order.
//!
//! Routing backends and `geo` both speak longitude-first (`x = lng`,
//! `y = lat`); [`Coordinate`] is the one place the two orders meet.

use geo::Coord;
use thiserror::Error;

/// A validated latitude/longitude pair in degrees.
///
/// # Examples
///
/// ```
/// use wayfinder_core::Coordinate;
///
/// # fn main() -> Result<(), wayfinder_core::CoordinateError> {
/// let big_ben = Coordinate::new(51.5007, -0.1246)?;
/// assert_eq!(big_ben.lat(), 51.5007);
/// assert!(Coordinate::new(91.0, 0.0).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawCoordinate"))]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

/// Errors returned by [`Coordinate::new`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    /// Latitude fell outside `[-90, 90]` or was not finite.
    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(f64),
    /// Longitude fell outside `[-180, 180]` or was not finite.
    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(f64),
}

impl Coordinate {
    /// Validate and construct a coordinate from latitude and longitude.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::Latitude(lat));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(CoordinateError::Longitude(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Construct from a longitude-first pair as emitted by GeoJSON geometry.
    pub fn from_lng_lat(pair: [f64; 2]) -> Result<Self, CoordinateError> {
        let [lng, lat] = pair;
        Self::new(lat, lng)
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.lng
    }
}

impl From<Coordinate> for Coord {
    fn from(value: Coordinate) -> Self {
        Self {
            x: value.lng,
            y: value.lat,
        }
    }
}

impl TryFrom<Coord> for Coordinate {
    type Error = CoordinateError;

    fn try_from(value: Coord) -> Result<Self, Self::Error> {
        Self::new(value.y, value.x)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawCoordinate {
    lat: f64,
    lng: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoordinateError;

    fn try_from(value: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(value.lat, value.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(90.0, 180.0)]
    #[case(-90.0, -180.0)]
    #[case(0.0, 0.0)]
    fn accepts_boundary_values(#[case] lat: f64, #[case] lng: f64) {
        assert!(Coordinate::new(lat, lng).is_ok());
    }

    #[rstest]
    #[case(90.5, 0.0)]
    #[case(f64::NAN, 0.0)]
    fn rejects_bad_latitude(#[case] lat: f64, #[case] lng: f64) {
        assert!(matches!(
            Coordinate::new(lat, lng),
            Err(CoordinateError::Latitude(_))
        ));
    }

    #[rstest]
    #[case(0.0, -180.5)]
    #[case(0.0, f64::INFINITY)]
    fn rejects_bad_longitude(#[case] lat: f64, #[case] lng: f64) {
        assert!(matches!(
            Coordinate::new(lat, lng),
            Err(CoordinateError::Longitude(_))
        ));
    }

    #[rstest]
    fn lng_lat_pairs_are_swapped() {
        let coordinate = Coordinate::from_lng_lat([-0.1246, 51.5007]).expect("valid pair");
        assert_eq!(coordinate.lat(), 51.5007);
        assert_eq!(coordinate.lng(), -0.1246);
    }

    #[rstest]
    fn converts_to_geo_coord_longitude_first() {
        let coordinate = Coordinate::new(51.5, -0.1).expect("valid");
        let coord: Coord = coordinate.into();
        assert_eq!(coord, Coord { x: -0.1, y: 51.5 });
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn deserialising_validates_range() {
        let parsed: Result<Coordinate, _> = serde_json::from_str(r#"{"lat": 120.0, "lng": 0.0}"#);
        assert!(parsed.is_err());
    }
}
