//! OSRM API response types for the Route service.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use serde::Deserialize;
use wayfinder_core::{BackendLeg, BackendRoute, BackendStep, RouteResponse};

/// OSRM Route API response.
///
/// OSRM answers failures such as `NoRoute` with a 4xx status and the same
/// envelope, so this type is decoded regardless of the HTTP status.
#[derive(Debug, Deserialize)]
pub struct RouteServiceResponse {
    /// Status code from OSRM.
    ///
    /// Common values:
    /// - `"Ok"` - Request was successful
    /// - `"NoRoute"` - No route between the coordinates
    /// - `"NoSegment"` - A coordinate could not be snapped to the network
    /// - `"InvalidQuery"` - Invalid query parameters
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Candidate routes, best first.
    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
}

/// One route in an OSRM response.
#[derive(Debug, Deserialize)]
pub struct OsrmRoute {
    /// Length in metres.
    pub distance: f64,
    /// Duration in seconds.
    pub duration: f64,
    /// GeoJSON line string; requested with `geometries=geojson`.
    pub geometry: OsrmGeometry,
    #[serde(default)]
    pub legs: Vec<OsrmLeg>,
}

/// GeoJSON `LineString` geometry with `[lng, lat]` positions.
#[derive(Debug, Deserialize)]
pub struct OsrmGeometry {
    pub coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
pub struct OsrmLeg {
    #[serde(default)]
    pub steps: Vec<OsrmStep>,
}

#[derive(Debug, Deserialize)]
pub struct OsrmStep {
    pub distance: f64,
    pub duration: f64,
    /// Road name; empty for unnamed ways.
    #[serde(default)]
    pub name: String,
    pub maneuver: OsrmManeuver,
}

#[derive(Debug, Deserialize)]
pub struct OsrmManeuver {
    #[serde(rename = "type")]
    pub kind: String,
    pub modifier: Option<String>,
    /// Pre-rendered text. Only some OSRM deployments send it.
    pub instruction: Option<String>,
}

impl From<RouteServiceResponse> for RouteResponse {
    fn from(response: RouteServiceResponse) -> Self {
        Self {
            code: response.code,
            message: response.message,
            routes: response.routes.into_iter().map(BackendRoute::from).collect(),
        }
    }
}

impl From<OsrmRoute> for BackendRoute {
    fn from(route: OsrmRoute) -> Self {
        Self {
            distance_meters: route.distance,
            duration_seconds: route.duration,
            geometry: route.geometry.coordinates,
            legs: route
                .legs
                .into_iter()
                .map(|leg| BackendLeg {
                    steps: leg.steps.into_iter().map(BackendStep::from).collect(),
                })
                .collect(),
        }
    }
}

impl From<OsrmStep> for BackendStep {
    fn from(step: OsrmStep) -> Self {
        let instruction = step_text(&step);
        Self {
            instruction,
            distance_meters: step.distance,
            duration_seconds: step.duration,
            maneuver_type: step.maneuver.kind,
        }
    }
}

/// Text for a step: the service's own instruction when present, otherwise
/// a sentence assembled from the maneuver and road name.
fn step_text(step: &OsrmStep) -> String {
    if let Some(text) = step
        .maneuver
        .instruction
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
    {
        return text.to_owned();
    }

    let road = step.name.trim();
    let modifier = step.maneuver.modifier.as_deref().unwrap_or_default();
    match step.maneuver.kind.as_str() {
        "arrive" => return "Arrive at your destination".to_owned(),
        "depart" if road.is_empty() => return "Depart".to_owned(),
        "depart" => return format!("Depart on {road}"),
        _ => {}
    }
    if modifier == "uturn" {
        return with_road("Make a U-turn".to_owned(), "onto", road);
    }

    let verb = match step.maneuver.kind.as_str() {
        "continue" | "new name" => "Continue",
        "merge" => "Merge",
        "fork" => "Keep",
        "on ramp" => "Take the ramp",
        "off ramp" => "Take the exit",
        "roundabout" | "rotary" | "roundabout turn" => "Enter the roundabout",
        _ => "Turn",
    };
    let phrase = match modifier {
        "" => verb.to_owned(),
        "straight" if verb == "Turn" => "Continue straight".to_owned(),
        direction => format!("{verb} {direction}"),
    };
    with_road(phrase, "onto", road)
}

fn with_road(phrase: String, preposition: &str, road: &str) -> String {
    if road.is_empty() {
        phrase
    } else {
        format!("{phrase} {preposition} {road}")
    }
}
