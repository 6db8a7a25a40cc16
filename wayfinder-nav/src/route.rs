//! Route computation and presentation.
//!
//! [`compute_route`] is the pure part: one backend call, normalized into a
//! [`RouteResult`], with no map access. [`RouteOrchestrator`] owns the
//! destination, the drawn polyline and the directions panel state, and
//! applies results in the order remove, draw, fit.
//!
//! Every recompute is tagged with a sequence number. Only the result of the
//! most recently issued request is applied; anything else is dropped, so a
//! slow answer for an old destination or mode can never overwrite a newer
//! one.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use log::{debug, info, warn};
use tokio::task::JoinHandle;
use wayfinder_core::{
    Coordinate, Destination, IconSpec, Instruction, LayerId, RouteError, RouteRequest,
    RouteResponse, RouteResult, RoutingBackend, TransportMode,
};

use crate::{Advisory, RouteStyle, SharedAdvisories, SharedMap};

/// Fetch and normalize a route from `origin` to `destination`.
///
/// # Errors
///
/// Returns [`RouteError::NoRouteFound`] when the backend answers with a
/// non-`Ok` code or no routes, and propagates transport and decoding errors.
pub async fn compute_route(
    backend: &dyn RoutingBackend,
    origin: Coordinate,
    destination: Coordinate,
    mode: TransportMode,
) -> Result<RouteResult, RouteError> {
    let request = RouteRequest::turn_by_turn(origin, destination, mode);
    let response = backend.fetch_route(&request).await?;
    normalize_route(response)
}

/// Turn a backend response into a [`RouteResult`].
///
/// Geometry is converted to latitude-first order. Instructions come from
/// the first leg, all or nothing: a single bad coordinate rejects the route.
///
/// # Errors
///
/// Returns [`RouteError::NoRouteFound`] for a non-`Ok` code or an empty
/// route list, and [`RouteError::Parse`] for out-of-range geometry.
pub fn normalize_route(response: RouteResponse) -> Result<RouteResult, RouteError> {
    if !response.is_ok() {
        return Err(RouteError::NoRouteFound {
            code: response.code,
        });
    }
    let Some(route) = response.routes.into_iter().next() else {
        return Err(RouteError::NoRouteFound {
            code: response.code,
        });
    };

    let path = route
        .geometry
        .iter()
        .map(|pair| Coordinate::from_lng_lat(*pair))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| RouteError::Parse {
            message: format!("route geometry: {err}"),
        })?;

    let instructions = route
        .legs
        .into_iter()
        .next()
        .map(|leg| leg.steps)
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, step)| Instruction {
            text: step.instruction,
            distance_meters: step.distance_meters,
            duration_seconds: step.duration_seconds,
            maneuver_type: step.maneuver_type,
            index,
        })
        .collect();

    Ok(RouteResult {
        distance_meters: route.distance_meters,
        duration_seconds: route.duration_seconds,
        instructions,
        path,
    })
}

#[derive(Debug, Default)]
struct RouteState {
    destination: Option<Destination>,
    mode: TransportMode,
    result: Option<RouteResult>,
    polyline: Option<LayerId>,
    directions_visible: bool,
}

struct RouteInner {
    backend: Rc<dyn RoutingBackend>,
    map: SharedMap,
    advisories: SharedAdvisories,
    style: RouteStyle,
    state: RefCell<RouteState>,
    latest_seq: Cell<u64>,
    routing: Cell<bool>,
}

/// Owner of the destination, the route polyline and the directions state.
#[derive(Clone)]
pub struct RouteOrchestrator {
    inner: Rc<RouteInner>,
}

impl fmt::Debug for RouteOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteOrchestrator")
            .field("state", &*self.inner.state.borrow())
            .field("latest_seq", &self.inner.latest_seq.get())
            .finish_non_exhaustive()
    }
}

impl RouteOrchestrator {
    /// Create an orchestrator with no destination.
    #[must_use]
    pub fn new(
        backend: Rc<dyn RoutingBackend>,
        map: SharedMap,
        advisories: SharedAdvisories,
        style: RouteStyle,
    ) -> Self {
        Self {
            inner: Rc::new(RouteInner {
                backend,
                map,
                advisories,
                style,
                state: RefCell::new(RouteState::default()),
                latest_seq: Cell::new(0),
                routing: Cell::new(false),
            }),
        }
    }

    /// Set the destination and place its marker.
    ///
    /// Any request still in flight is for the old destination and will be
    /// discarded.
    pub fn set_destination(&self, destination: Destination) {
        self.inner.map.borrow_mut().add_or_move_marker(
            &LayerId::destination_marker(),
            destination.coordinate,
            &IconSpec::DestinationPin {
                label: destination.name.clone(),
            },
        );
        self.inner.state.borrow_mut().destination = Some(destination);
        self.invalidate();
    }

    /// Change the transport mode. Returns whether it changed.
    #[must_use]
    pub fn set_mode(&self, mode: TransportMode) -> bool {
        let mut state = self.inner.state.borrow_mut();
        if state.mode == mode {
            return false;
        }
        state.mode = mode;
        true
    }

    /// Recompute the route from `origin` to the current destination on a
    /// local task. Returns `None` when there is no destination.
    ///
    /// # Panics
    ///
    /// Panics when called outside a [`tokio::task::LocalSet`].
    #[must_use = "dropping the handle detaches the route task"]
    pub fn recompute(&self, origin: Coordinate) -> Option<JoinHandle<()>> {
        let (destination, mode) = {
            let state = self.inner.state.borrow();
            let destination = state.destination.as_ref()?.coordinate;
            (destination, state.mode)
        };
        let seq = self.inner.latest_seq.get() + 1;
        self.inner.latest_seq.set(seq);
        self.inner.routing.set(true);
        debug!("route request {seq}: {} from {origin} to {destination}", mode.profile());

        let inner = Rc::clone(&self.inner);
        Some(tokio::task::spawn_local(async move {
            let backend = Rc::clone(&inner.backend);
            let outcome = compute_route(backend.as_ref(), origin, destination, mode).await;
            inner.apply(seq, outcome);
        }))
    }

    /// Remove the route and destination and discard in-flight requests.
    pub fn clear_route(&self) {
        let polyline = {
            let mut state = self.inner.state.borrow_mut();
            state.destination = None;
            state.result = None;
            state.directions_visible = false;
            state.polyline.take()
        };
        {
            let mut map = self.inner.map.borrow_mut();
            if let Some(layer) = polyline {
                map.remove_layer(&layer);
            }
            map.remove_layer(&LayerId::destination_marker());
        }
        self.invalidate();
        info!("route cleared");
    }

    /// Hide the directions panel, keeping the route.
    pub fn hide_directions(&self) {
        self.inner.state.borrow_mut().directions_visible = false;
    }

    /// The chosen destination.
    #[must_use]
    pub fn destination(&self) -> Option<Destination> {
        self.inner.state.borrow().destination.clone()
    }

    /// The chosen transport mode.
    #[must_use]
    pub fn mode(&self) -> TransportMode {
        self.inner.state.borrow().mode
    }

    /// The route on display.
    #[must_use]
    pub fn result(&self) -> Option<RouteResult> {
        self.inner.state.borrow().result.clone()
    }

    /// Handle of the drawn polyline.
    #[must_use]
    pub fn polyline(&self) -> Option<LayerId> {
        self.inner.state.borrow().polyline.clone()
    }

    /// Whether the directions panel is open.
    #[must_use]
    pub fn directions_visible(&self) -> bool {
        self.inner.state.borrow().directions_visible
    }

    /// Whether the latest request is still in flight.
    #[must_use]
    pub fn is_routing(&self) -> bool {
        self.inner.routing.get()
    }

    fn invalidate(&self) {
        self.inner.latest_seq.set(self.inner.latest_seq.get() + 1);
        self.inner.routing.set(false);
    }
}

impl RouteInner {
    fn apply(&self, seq: u64, outcome: Result<RouteResult, RouteError>) {
        if seq != self.latest_seq.get() {
            warn!(
                "discarding stale route {seq}; latest is {}",
                self.latest_seq.get()
            );
            return;
        }
        self.routing.set(false);

        let previous = self.state.borrow_mut().polyline.take();
        let mut map = self.map.borrow_mut();
        if let Some(layer) = previous {
            map.remove_layer(&layer);
        }

        match outcome {
            Ok(route) => {
                let layer = map.draw_polyline(&route.path, &self.style.polyline());
                map.fit_bounds(&layer, self.style.padding_px);
                info!(
                    "route {seq}: {:.0} m, {:.0} s, {} steps",
                    route.distance_meters,
                    route.duration_seconds,
                    route.instructions.len()
                );
                let mut state = self.state.borrow_mut();
                state.polyline = Some(layer);
                state.result = Some(route);
                state.directions_visible = true;
            }
            Err(err) => {
                warn!("route {seq} failed: {err}");
                self.advisories.borrow_mut().publish(Advisory::RouteFailed);
                let mut state = self.state.borrow_mut();
                state.result = None;
                state.directions_visible = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use wayfinder_core::test_support::{ok_route_response, status_route_response};

    #[rstest]
    #[case("NoRoute")]
    #[case("NoSegment")]
    fn non_ok_codes_are_no_route(#[case] code: &str) {
        let err = normalize_route(status_route_response(code))
            .err()
            .unwrap_or_else(|| panic!("expected an error"));
        assert_eq!(
            err,
            RouteError::NoRouteFound {
                code: code.to_owned()
            }
        );
    }

    #[rstest]
    fn ok_without_routes_is_no_route() {
        let mut response = ok_route_response(vec![[0.0, 0.0]], 1.0);
        response.routes.clear();
        assert!(matches!(
            normalize_route(response),
            Err(RouteError::NoRouteFound { .. })
        ));
    }

    #[rstest]
    fn geometry_is_flipped_to_lat_first() {
        let route = normalize_route(ok_route_response(
            vec![[-0.1278, 51.5074], [-0.1246, 51.5007]],
            412.0,
        ))
        .unwrap_or_else(|err| panic!("route should normalize: {err}"));

        let first = route.path.first().copied().unwrap_or_else(|| panic!("empty path"));
        assert_eq!(first.lat(), 51.5074);
        assert_eq!(first.lng(), -0.1278);
    }

    #[rstest]
    fn instruction_indices_match_positions() {
        let route = normalize_route(ok_route_response(vec![[0.0, 0.0], [0.001, 0.0]], 111.0))
            .unwrap_or_else(|err| panic!("route should normalize: {err}"));
        assert!(!route.instructions.is_empty());
        assert!(
            route
                .instructions
                .iter()
                .enumerate()
                .all(|(position, step)| step.index == position)
        );
    }

    #[rstest]
    fn out_of_range_geometry_rejects_the_route() {
        let err = normalize_route(ok_route_response(vec![[0.0, 0.0], [0.0, 95.0]], 1.0))
            .err()
            .unwrap_or_else(|| panic!("expected an error"));
        assert!(matches!(err, RouteError::Parse { .. }));
    }
}
