//! Routing backend trait and its wire-neutral request and response shapes.

use async_trait::async_trait;

use super::error::RouteError;
use crate::{Coordinate, TransportMode};

/// Status code a backend reports for a usable answer.
pub const OK_CODE: &str = "Ok";

/// A single-route request between two points.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    /// Travel mode, mapped to the backend profile.
    pub mode: TransportMode,
    /// Start of the route.
    pub origin: Coordinate,
    /// End of the route.
    pub destination: Coordinate,
    /// Ask for per-step maneuvers.
    pub want_steps: bool,
    /// Ask for the full geometry rather than a simplified overview.
    pub full_geometry: bool,
    /// Ask for alternatives. The engine only ever uses the first route.
    pub alternatives: bool,
}

impl RouteRequest {
    /// Build the request the route orchestrator issues: steps, full geometry,
    /// no alternatives.
    #[must_use]
    pub const fn turn_by_turn(
        origin: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
    ) -> Self {
        Self {
            mode,
            origin,
            destination,
            want_steps: true,
            full_geometry: true,
            alternatives: false,
        }
    }
}

/// A backend response before normalization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteResponse {
    /// Backend status code; [`OK_CODE`] on success.
    pub code: String,
    /// Optional error detail accompanying a non-`Ok` code.
    pub message: Option<String>,
    /// Candidate routes, best first.
    pub routes: Vec<BackendRoute>,
}

impl RouteResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == OK_CODE
    }
}

/// One candidate route as the backend describes it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BackendRoute {
    /// Total length in metres.
    pub distance_meters: f64,
    /// Total duration in seconds.
    pub duration_seconds: f64,
    /// Geometry as longitude-first `[lng, lat]` pairs.
    pub geometry: Vec<[f64; 2]>,
    /// Legs between waypoints; a two-point request has one.
    pub legs: Vec<BackendLeg>,
}

/// Steps between two consecutive waypoints.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BackendLeg {
    /// Steps in traversal order.
    pub steps: Vec<BackendStep>,
}

/// A single maneuver.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BackendStep {
    /// Instruction text.
    pub instruction: String,
    /// Length in metres.
    pub distance_meters: f64,
    /// Duration in seconds.
    pub duration_seconds: f64,
    /// Maneuver type, for example `depart`, `turn` or `arrive`.
    pub maneuver_type: String,
}

/// Fetch routes from a routing service.
#[async_trait(?Send)]
pub trait RoutingBackend {
    /// Fetch candidate routes for `request`.
    ///
    /// A reachable backend that finds nothing should answer `Ok` with a
    /// non-`Ok` [`RouteResponse::code`] or no routes; `Err` is for transport
    /// and decoding failures.
    async fn fetch_route(&self, request: &RouteRequest) -> Result<RouteResponse, RouteError>;
}
