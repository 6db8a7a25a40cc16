//! Deterministic collaborators for unit and behaviour tests.
//!
//! Every double records what the engine asked of it so tests can assert on
//! call counts and ordering without a browser, a map or a network.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use geo::{BoundingRect, LineString, Rect};
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::{
    BackendLeg, BackendRoute, BackendStep, Coordinate, GeocodeError, GeocodingBackend, IconSpec,
    LayerId, MapView, Place, PolylineStyle, PositionError, PositionErrorCode, PositionOptions,
    PositionProvider, PositionSample, RouteError, RouteRequest, RouteResponse, RoutingBackend,
    SavedLocation, SavedLocationStore, StoreError, Watch, WatchEvent, WatchHandle,
};

/// Drive `future` to completion on a fresh single-threaded runtime.
///
/// # Panics
///
/// Panics when the runtime cannot be built.
pub fn block_on_for_tests<F: std::future::Future>(future: F) -> F::Output {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap_or_else(|err| panic!("failed to build test runtime: {err}"));
    tokio::task::LocalSet::new().block_on(&runtime, future)
}

/// Build a coordinate from known-good fixture values.
///
/// # Panics
///
/// Panics when the fixture is out of range.
#[must_use]
pub fn coordinate(lat: f64, lng: f64) -> Coordinate {
    Coordinate::new(lat, lng).unwrap_or_else(|err| panic!("invalid fixture coordinate: {err}"))
}

/// A sample at `(lat, lng)` with the given accuracy.
#[must_use]
pub fn sample(lat: f64, lng: f64, accuracy_meters: f64) -> PositionSample {
    PositionSample::new(coordinate(lat, lng), accuracy_meters)
}

#[derive(Debug, Clone)]
struct ScriptedReply {
    delay: Option<Duration>,
    /// `None` never resolves.
    outcome: Option<WatchEvent>,
}

#[derive(Debug, Default)]
struct WatchRegistry {
    next: u64,
    active: BTreeMap<WatchHandle, UnboundedSender<WatchEvent>>,
    started: Vec<PositionOptions>,
    stopped: Vec<WatchHandle>,
}

/// Scripted [`PositionProvider`].
///
/// One-shot requests consume replies in the order they were pushed; once
/// the script is exhausted the fallback reply (if any) repeats, otherwise
/// requests stay pending forever. Watches are driven by [`Self::emit`].
#[derive(Debug)]
pub struct ScriptedPositionProvider {
    available: Cell<bool>,
    script: RefCell<VecDeque<ScriptedReply>>,
    fallback: RefCell<Option<WatchEvent>>,
    requests: RefCell<Vec<PositionOptions>>,
    in_flight: Rc<Cell<usize>>,
    max_in_flight: Rc<Cell<usize>>,
    watches: RefCell<WatchRegistry>,
}

impl Default for ScriptedPositionProvider {
    fn default() -> Self {
        Self {
            available: Cell::new(true),
            script: RefCell::default(),
            fallback: RefCell::default(),
            requests: RefCell::default(),
            in_flight: Rc::default(),
            max_in_flight: Rc::default(),
            watches: RefCell::default(),
        }
    }
}

impl ScriptedPositionProvider {
    /// A provider with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A host without any position capability.
    #[must_use]
    pub fn unavailable() -> Self {
        let provider = Self::default();
        provider.available.set(false);
        provider
    }

    /// A provider whose every one-shot request fails with `code`.
    #[must_use]
    pub fn failing_with(code: PositionErrorCode) -> Self {
        let provider = Self::default();
        provider.set_fallback(Err(PositionError::new(code, format!("scripted {code}"))));
        provider
    }

    /// Queue a successful one-shot reply.
    pub fn push_fix(&self, fix: PositionSample) {
        self.push(None, Some(Ok(fix)));
    }

    /// Queue a failing one-shot reply.
    pub fn push_error(&self, code: PositionErrorCode) {
        self.push(
            None,
            Some(Err(PositionError::new(code, format!("scripted {code}")))),
        );
    }

    /// Queue a reply that resolves after `delay` of (tokio) time.
    pub fn push_delayed(&self, delay: Duration, outcome: WatchEvent) {
        self.push(Some(delay), Some(outcome));
    }

    /// Queue a reply that never resolves.
    pub fn push_pending(&self) {
        self.push(None, None);
    }

    /// Reply used once the script runs dry.
    pub fn set_fallback(&self, outcome: WatchEvent) {
        *self.fallback.borrow_mut() = Some(outcome);
    }

    fn push(&self, delay: Option<Duration>, outcome: Option<WatchEvent>) {
        self.script
            .borrow_mut()
            .push_back(ScriptedReply { delay, outcome });
    }

    /// Options of every one-shot request issued so far.
    #[must_use]
    pub fn requests(&self) -> Vec<PositionOptions> {
        self.requests.borrow().clone()
    }

    /// Number of one-shot requests issued so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    /// One-shot requests started but neither resolved nor dropped.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.get()
    }

    /// Highest number of simultaneously outstanding one-shot requests seen.
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.get()
    }

    /// Watches that have been started and not stopped.
    #[must_use]
    pub fn active_watches(&self) -> usize {
        self.watches.borrow().active.len()
    }

    /// Options of every watch started so far.
    #[must_use]
    pub fn watch_starts(&self) -> Vec<PositionOptions> {
        self.watches.borrow().started.clone()
    }

    /// Handles passed to [`PositionProvider::stop_watch`], including repeats.
    #[must_use]
    pub fn stopped_watches(&self) -> Vec<WatchHandle> {
        self.watches.borrow().stopped.clone()
    }

    /// The most recently started watch that is still active.
    #[must_use]
    pub fn current_watch(&self) -> Option<WatchHandle> {
        self.watches.borrow().active.keys().next_back().copied()
    }

    /// Deliver `event` to the newest active watch. Returns whether anyone
    /// was listening.
    pub fn emit(&self, event: WatchEvent) -> bool {
        self.current_watch()
            .is_some_and(|handle| self.emit_to(handle, event))
    }

    /// Deliver a sample to the newest active watch.
    pub fn emit_fix(&self, fix: PositionSample) -> bool {
        self.emit(Ok(fix))
    }

    /// Deliver an error to the newest active watch.
    pub fn emit_error(&self, code: PositionErrorCode) -> bool {
        self.emit(Err(PositionError::new(code, format!("scripted {code}"))))
    }

    /// End a watch from the host side, as when the platform drops it.
    /// Unlike [`PositionProvider::stop_watch`] this is not recorded as a
    /// stop. Returns whether the watch was active.
    pub fn close_watch(&self, handle: WatchHandle) -> bool {
        self.watches.borrow_mut().active.remove(&handle).is_some()
    }

    /// Deliver `event` to a specific watch.
    pub fn emit_to(&self, handle: WatchHandle, event: WatchEvent) -> bool {
        self.watches
            .borrow()
            .active
            .get(&handle)
            .is_some_and(|sender| sender.send(event).is_ok())
    }
}

/// Keeps the in-flight counter honest when a request future is dropped.
struct InFlightGuard(Rc<Cell<usize>>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

#[async_trait(?Send)]
impl PositionProvider for ScriptedPositionProvider {
    fn is_available(&self) -> bool {
        self.available.get()
    }

    async fn request_once(
        &self,
        options: PositionOptions,
    ) -> Result<PositionSample, PositionError> {
        self.requests.borrow_mut().push(options);
        self.in_flight.set(self.in_flight.get() + 1);
        self.max_in_flight
            .set(self.max_in_flight.get().max(self.in_flight.get()));
        let _guard = InFlightGuard(Rc::clone(&self.in_flight));

        let reply = self.script.borrow_mut().pop_front().or_else(|| {
            self.fallback.borrow().clone().map(|outcome| ScriptedReply {
                delay: None,
                outcome: Some(outcome),
            })
        });
        let Some(reply) = reply else {
            return std::future::pending().await;
        };
        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }
        match reply.outcome {
            Some(outcome) => outcome,
            None => std::future::pending().await,
        }
    }

    fn start_watch(&self, options: PositionOptions) -> Watch {
        let (sender, events) = mpsc::unbounded_channel();
        let mut registry = self.watches.borrow_mut();
        registry.next += 1;
        let handle = WatchHandle(registry.next);
        registry.active.insert(handle, sender);
        registry.started.push(options);
        Watch { handle, events }
    }

    fn stop_watch(&self, handle: WatchHandle) {
        let mut registry = self.watches.borrow_mut();
        registry.stopped.push(handle);
        registry.active.remove(&handle);
    }
}

/// One call made against a [`RecordingMapView`].
#[derive(Debug, Clone, PartialEq)]
pub enum MapCall {
    /// [`MapView::set_center`].
    SetCenter {
        /// Requested centre.
        center: Coordinate,
        /// Requested zoom.
        zoom: u8,
    },
    /// [`MapView::add_or_move_marker`].
    AddOrMoveMarker {
        /// Layer written.
        id: LayerId,
        /// Position.
        at: Coordinate,
        /// Icon.
        icon: IconSpec,
    },
    /// [`MapView::remove_layer`].
    RemoveLayer(LayerId),
    /// [`MapView::draw_polyline`].
    DrawPolyline {
        /// Handle returned.
        id: LayerId,
        /// Number of points drawn.
        points: usize,
    },
    /// [`MapView::fit_bounds`].
    FitBounds {
        /// Layer fitted.
        id: LayerId,
        /// Padding in pixels.
        padding_px: u32,
    },
    /// [`MapView::zoom_in`].
    ZoomIn,
    /// [`MapView::zoom_out`].
    ZoomOut,
}

/// [`MapView`] that keeps layers in memory and logs every call.
#[derive(Debug, Default)]
pub struct RecordingMapView {
    calls: Vec<MapCall>,
    markers: BTreeMap<LayerId, (Coordinate, IconSpec)>,
    polylines: BTreeMap<LayerId, Vec<Coordinate>>,
    next_polyline: u64,
    fitted: Vec<Rect<f64>>,
    center: Option<(Coordinate, u8)>,
}

impl RecordingMapView {
    /// An empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call in order.
    #[must_use]
    pub fn calls(&self) -> &[MapCall] {
        &self.calls
    }

    /// Forget recorded calls while keeping layer state.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Whether a marker or polyline with this id is on the map.
    #[must_use]
    pub fn has_layer(&self, id: &LayerId) -> bool {
        self.markers.contains_key(id) || self.polylines.contains_key(id)
    }

    /// Position and icon of a point layer.
    #[must_use]
    pub fn marker(&self, id: &LayerId) -> Option<&(Coordinate, IconSpec)> {
        self.markers.get(id)
    }

    /// Handles of all polylines currently drawn.
    #[must_use]
    pub fn polylines(&self) -> Vec<LayerId> {
        self.polylines.keys().cloned().collect()
    }

    /// Points of a drawn polyline.
    #[must_use]
    pub fn polyline(&self, id: &LayerId) -> Option<&[Coordinate]> {
        self.polylines.get(id).map(Vec::as_slice)
    }

    /// Bounds passed to every successful `fit_bounds`, `x = lng`.
    #[must_use]
    pub fn fitted_bounds(&self) -> &[Rect<f64>] {
        &self.fitted
    }

    /// Last centre and zoom requested.
    #[must_use]
    pub const fn center(&self) -> Option<(Coordinate, u8)> {
        self.center
    }
}

impl MapView for RecordingMapView {
    fn set_center(&mut self, center: Coordinate, zoom: u8) {
        self.center = Some((center, zoom));
        self.calls.push(MapCall::SetCenter { center, zoom });
    }

    fn add_or_move_marker(&mut self, id: &LayerId, at: Coordinate, icon: &IconSpec) {
        self.markers.insert(id.clone(), (at, icon.clone()));
        self.calls.push(MapCall::AddOrMoveMarker {
            id: id.clone(),
            at,
            icon: icon.clone(),
        });
    }

    fn remove_layer(&mut self, id: &LayerId) {
        self.markers.remove(id);
        self.polylines.remove(id);
        self.calls.push(MapCall::RemoveLayer(id.clone()));
    }

    fn draw_polyline(&mut self, points: &[Coordinate], _style: &PolylineStyle) -> LayerId {
        self.next_polyline += 1;
        let id = LayerId::new(format!("route-{}", self.next_polyline));
        self.polylines.insert(id.clone(), points.to_vec());
        self.calls.push(MapCall::DrawPolyline {
            id: id.clone(),
            points: points.len(),
        });
        id
    }

    fn fit_bounds(&mut self, layer: &LayerId, padding_px: u32) {
        if let Some(points) = self.polylines.get(layer) {
            let line: LineString<f64> = points.iter().copied().map(geo::Coord::from).collect();
            if let Some(rect) = line.bounding_rect() {
                self.fitted.push(rect);
            }
        }
        self.calls.push(MapCall::FitBounds {
            id: layer.clone(),
            padding_px,
        });
    }

    fn zoom_in(&mut self) {
        self.calls.push(MapCall::ZoomIn);
    }

    fn zoom_out(&mut self) {
        self.calls.push(MapCall::ZoomOut);
    }
}

/// A successful backend response through `geometry` (`[lng, lat]` pairs)
/// with a depart and an arrive step.
#[must_use]
pub fn ok_route_response(geometry: Vec<[f64; 2]>, distance_meters: f64) -> RouteResponse {
    let duration_seconds = distance_meters / 10.0;
    RouteResponse {
        code: crate::routing::OK_CODE.to_owned(),
        message: None,
        routes: vec![BackendRoute {
            distance_meters,
            duration_seconds,
            geometry,
            legs: vec![BackendLeg {
                steps: vec![
                    BackendStep {
                        instruction: "Head north".to_owned(),
                        distance_meters,
                        duration_seconds,
                        maneuver_type: "depart".to_owned(),
                    },
                    BackendStep {
                        instruction: "Arrive at your destination".to_owned(),
                        distance_meters: 0.0,
                        duration_seconds: 0.0,
                        maneuver_type: "arrive".to_owned(),
                    },
                ],
            }],
        }],
    }
}

/// A response carrying a backend status code and no routes.
#[must_use]
pub fn status_route_response(code: &str) -> RouteResponse {
    RouteResponse {
        code: code.to_owned(),
        message: Some(format!("scripted {code}")),
        routes: Vec::new(),
    }
}

#[derive(Debug, Clone)]
struct StubRouteReply {
    delay: Option<Duration>,
    outcome: Result<RouteResponse, RouteError>,
}

/// Stub [`RoutingBackend`] returning scripted responses.
///
/// Queued replies are consumed in order; afterwards the default reply
/// repeats.
#[derive(Debug)]
pub struct StubRoutingBackend {
    queued: RefCell<VecDeque<StubRouteReply>>,
    default: Result<RouteResponse, RouteError>,
    requests: RefCell<Vec<RouteRequest>>,
}

impl StubRoutingBackend {
    /// Always answer with `response`.
    #[must_use]
    pub fn with_response(response: RouteResponse) -> Self {
        Self {
            queued: RefCell::default(),
            default: Ok(response),
            requests: RefCell::default(),
        }
    }

    /// Always fail with `error`.
    #[must_use]
    pub fn with_error(error: RouteError) -> Self {
        Self {
            queued: RefCell::default(),
            default: Err(error),
            requests: RefCell::default(),
        }
    }

    /// Queue a one-off reply delivered after `delay` of (tokio) time.
    pub fn queue_delayed(&self, delay: Duration, outcome: Result<RouteResponse, RouteError>) {
        self.queued.borrow_mut().push_back(StubRouteReply {
            delay: Some(delay),
            outcome,
        });
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RouteRequest> {
        self.requests.borrow().clone()
    }

    /// Number of requests received so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

#[async_trait(?Send)]
impl RoutingBackend for StubRoutingBackend {
    async fn fetch_route(&self, request: &RouteRequest) -> Result<RouteResponse, RouteError> {
        self.requests.borrow_mut().push(request.clone());
        let reply = self.queued.borrow_mut().pop_front();
        match reply {
            Some(StubRouteReply { delay, outcome }) => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                outcome
            }
            None => self.default.clone(),
        }
    }
}

/// Stub [`GeocodingBackend`] counting its calls.
#[derive(Debug, Default)]
pub struct StubGeocodingBackend {
    places: Vec<Place>,
    reverse_name: Option<String>,
    error: Option<GeocodeError>,
    search_calls: Cell<usize>,
    reverse_calls: Cell<usize>,
}

impl StubGeocodingBackend {
    /// Answer every search with `places`.
    #[must_use]
    pub fn with_places(places: Vec<Place>) -> Self {
        Self {
            places,
            ..Self::default()
        }
    }

    /// Answer every reverse lookup with `name`.
    #[must_use]
    pub fn with_reverse(name: impl Into<String>) -> Self {
        Self {
            reverse_name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Fail every call with `error`.
    #[must_use]
    pub fn with_error(error: GeocodeError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    /// Number of forward searches received.
    #[must_use]
    pub fn search_calls(&self) -> usize {
        self.search_calls.get()
    }

    /// Number of reverse lookups received.
    #[must_use]
    pub fn reverse_calls(&self) -> usize {
        self.reverse_calls.get()
    }
}

#[async_trait(?Send)]
impl GeocodingBackend for StubGeocodingBackend {
    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<Place>, GeocodeError> {
        self.search_calls.set(self.search_calls.get() + 1);
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        Ok(self.places.iter().take(limit).cloned().collect())
    }

    async fn reverse(&self, _at: Coordinate) -> Result<Option<String>, GeocodeError> {
        self.reverse_calls.set(self.reverse_calls.get() + 1);
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        Ok(self.reverse_name.clone())
    }
}

/// In-memory [`SavedLocationStore`].
#[derive(Debug, Default)]
pub struct MemorySavedLocationStore {
    locations: Vec<SavedLocation>,
    fail_appends: bool,
}

impl MemorySavedLocationStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose appends always fail.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            locations: Vec::new(),
            fail_appends: true,
        }
    }
}

impl SavedLocationStore for MemorySavedLocationStore {
    fn list(&self) -> Result<Vec<SavedLocation>, StoreError> {
        Ok(self.locations.clone())
    }

    fn append(&mut self, location: SavedLocation) -> Result<(), StoreError> {
        if self.fail_appends {
            return Err(StoreError::new("append to", "scripted store failure"));
        }
        self.locations.push(location);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn options() -> PositionOptions {
        PositionOptions {
            high_accuracy: true,
            max_cache_age: Duration::ZERO,
            timeout: Duration::from_secs(1),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn scripted_replies_are_consumed_in_order() {
        let provider = ScriptedPositionProvider::new();
        provider.push_error(PositionErrorCode::Timeout);
        provider.push_fix(sample(1.0, 2.0, 10.0));

        let first = provider.request_once(options()).await;
        let second = provider.request_once(options()).await;

        assert!(matches!(first, Err(ref err) if err.code == PositionErrorCode::Timeout));
        assert!(second.is_ok());
        assert_eq!(provider.request_count(), 2);
        assert_eq!(provider.in_flight(), 0);
    }

    #[rstest]
    fn stopping_a_watch_is_idempotent() {
        let provider = ScriptedPositionProvider::new();
        let watch = provider.start_watch(options());
        provider.stop_watch(watch.handle);
        provider.stop_watch(watch.handle);
        provider.stop_watch(WatchHandle(999));
        assert_eq!(provider.active_watches(), 0);
        assert!(!provider.emit_fix(sample(0.0, 0.0, 1.0)));
    }

    #[rstest]
    fn map_remove_then_draw_tracks_layers() {
        let mut map = RecordingMapView::new();
        let first = map.draw_polyline(
            &[coordinate(0.0, 0.0), coordinate(1.0, 1.0)],
            &PolylineStyle::default(),
        );
        map.remove_layer(&first);
        let second = map.draw_polyline(&[coordinate(2.0, 2.0)], &PolylineStyle::default());
        assert_eq!(map.polylines(), vec![second]);
    }
}
