//! Destinations, transport modes and normalized routes.

use geo::{BoundingRect, LineString, Rect};

use crate::Coordinate;

/// How the user intends to travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TransportMode {
    /// Driving.
    #[default]
    Car,
    /// Cycling.
    Bicycle,
    /// Walking.
    Foot,
}

impl TransportMode {
    /// The routing backend's profile name for this mode.
    ///
    /// # Examples
    ///
    /// ```
    /// use wayfinder_core::TransportMode;
    ///
    /// assert_eq!(TransportMode::Bicycle.profile(), "cycling");
    /// ```
    #[must_use]
    pub const fn profile(self) -> &'static str {
        match self {
            Self::Car => "driving",
            Self::Bicycle => "cycling",
            Self::Foot => "walking",
        }
    }
}

/// A place the user has chosen to travel to.
#[derive(Debug, Clone, PartialEq)]
pub struct Destination {
    /// Where it is.
    pub coordinate: Coordinate,
    /// Short display name.
    pub name: String,
    /// Full address line.
    pub address: String,
}

/// One turn-by-turn step.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Text shown to the user.
    pub text: String,
    /// Length of the step in metres.
    pub distance_meters: f64,
    /// Expected time on the step in seconds.
    pub duration_seconds: f64,
    /// Backend maneuver vocabulary, for example `turn` or `arrive`.
    pub maneuver_type: String,
    /// Zero-based position in traversal order.
    pub index: usize,
}

/// A route normalized for presentation.
///
/// `instructions[i].index == i` for every step.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    /// Total length in metres.
    pub distance_meters: f64,
    /// Total expected travel time in seconds.
    pub duration_seconds: f64,
    /// Steps in traversal order.
    pub instructions: Vec<Instruction>,
    /// Latitude-first polyline through the route geometry.
    pub path: Vec<Coordinate>,
}

impl RouteResult {
    /// Bounding rectangle of the path (`x = lng`, `y = lat`), if there is one.
    ///
    /// # Examples
    ///
    /// ```
    /// use wayfinder_core::{Coordinate, RouteResult};
    ///
    /// # fn main() -> Result<(), wayfinder_core::CoordinateError> {
    /// let route = RouteResult {
    ///     distance_meters: 400.0,
    ///     duration_seconds: 300.0,
    ///     instructions: Vec::new(),
    ///     path: vec![Coordinate::new(51.50, -0.12)?, Coordinate::new(51.51, -0.11)?],
    /// };
    /// let bounds = route.bounds().expect("non-empty path");
    /// assert_eq!(bounds.min().y, 51.50);
    /// assert_eq!(bounds.max().x, -0.11);
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn bounds(&self) -> Option<Rect<f64>> {
        let line: LineString<f64> = self.path.iter().copied().map(geo::Coord::from).collect();
        line.bounding_rect()
    }
}
