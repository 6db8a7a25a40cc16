//! The navigator facade.
//!
//! [`Navigator`] wires a [`PositionTracker`] to a [`RouteOrchestrator`] and
//! the geocoding and saved-location collaborators. Fresh fixes drive route
//! recomputation and, for the opening fix of a session, a reverse-geocoded
//! start address.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::SystemTime;

use log::{debug, info, warn};
use wayfinder_core::{
    ClientProfile, Coordinate, Destination, Geocoder, GeocodingBackend, PositionProvider,
    PositionSample, RouteResult, RoutingBackend, SavedLocation, SavedLocationIds,
    SavedLocationStore, SearchResult, StoreError, TransportMode,
};

use crate::{
    AcquisitionStatus, Advisory, AdvisoryBoard, FixNotice, NavigatorConfig, PositionTracker,
    RouteOrchestrator, SharedAdvisories, SharedMap,
};

/// Zoom level used when re-centring on the user.
const USER_ZOOM: u8 = 16;

/// The collaborators a [`Navigator`] talks to.
pub struct Collaborators {
    /// Host position capability.
    pub provider: Rc<dyn PositionProvider>,
    /// Map surface.
    pub map: SharedMap,
    /// Routing service.
    pub routing: Rc<dyn RoutingBackend>,
    /// Geocoding service.
    pub geocoding: Rc<dyn GeocodingBackend>,
    /// Saved destinations.
    pub store: Box<dyn SavedLocationStore>,
}

/// Plain-data view of everything a presentation layer renders.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigatorSnapshot {
    /// Acquisition status.
    pub status: AcquisitionStatus,
    /// Message on the advisory board.
    pub advisory: Option<Advisory>,
    /// Latest applied fix.
    pub position: Option<PositionSample>,
    /// Reverse-geocoded description of the session's opening fix.
    pub start_address: Option<String>,
    /// Address of the chosen destination.
    pub end_address: Option<String>,
    /// Chosen destination.
    pub destination: Option<Destination>,
    /// Route on display.
    pub route: Option<RouteResult>,
    /// Chosen transport mode.
    pub mode: TransportMode,
    /// Whether tracking is switched on.
    pub tracking_enabled: bool,
    /// Whether a route request is in flight.
    pub routing: bool,
    /// Whether the directions panel is open.
    pub directions_visible: bool,
    /// Whether the permission banner should be shown.
    pub permission_denied: bool,
}

struct NavigatorInner {
    tracker: PositionTracker,
    routes: RouteOrchestrator,
    geocoder: Geocoder,
    store: RefCell<Box<dyn SavedLocationStore>>,
    ids: SavedLocationIds,
    map: SharedMap,
    advisories: SharedAdvisories,
    start_address: RefCell<Option<String>>,
    end_address: RefCell<Option<String>>,
    address_generation: Cell<u64>,
}

/// Position tracking, destination selection and routing behind one handle.
///
/// Must be driven from inside a [`tokio::task::LocalSet`].
pub struct Navigator {
    inner: Rc<NavigatorInner>,
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("tracker", &self.inner.tracker)
            .field("routes", &self.inner.routes)
            .finish_non_exhaustive()
    }
}

impl Navigator {
    /// Assemble a navigator. Tracking starts switched off.
    #[must_use]
    pub fn new(
        collaborators: Collaborators,
        config: &NavigatorConfig,
        profile: ClientProfile,
    ) -> Self {
        let Collaborators {
            provider,
            map,
            routing,
            geocoding,
            store,
        } = collaborators;
        let advisories: SharedAdvisories = Rc::new(RefCell::new(AdvisoryBoard::new()));
        let tracker = PositionTracker::new(
            provider,
            Rc::clone(&map),
            Rc::clone(&advisories),
            config,
            profile,
        );
        let routes = RouteOrchestrator::new(
            routing,
            Rc::clone(&map),
            Rc::clone(&advisories),
            config.route_style.clone(),
        );
        let ids = seed_ids(store.as_ref());

        let inner = Rc::new(NavigatorInner {
            tracker,
            routes,
            geocoder: Geocoder::new(geocoding),
            store: RefCell::new(store),
            ids,
            map,
            advisories,
            start_address: RefCell::new(None),
            end_address: RefCell::new(None),
            address_generation: Cell::new(0),
        });
        let weak = Rc::downgrade(&inner);
        inner.tracker.set_fix_listener(move |notice| {
            if let Some(live) = weak.upgrade() {
                NavigatorInner::on_fix(&live, notice);
            }
        });
        Self { inner }
    }

    /// Switch tracking on, restarting any existing session.
    pub fn start_tracking(&self) {
        self.inner.tracker.start();
    }

    /// Switch tracking off and forget the start address.
    pub fn stop_tracking(&self) {
        self.inner.tracker.stop();
        self.inner.forget_start_address();
    }

    /// Flip tracking. Returns whether tracking is now on.
    #[must_use = "tracking may fail to start"]
    pub fn toggle_tracking(&self) -> bool {
        if self.inner.tracker.is_enabled() {
            self.stop_tracking();
            false
        } else {
            self.start_tracking();
            self.inner.tracker.is_enabled()
        }
    }

    /// Centre the map on the latest fix. Returns `false` when there is none.
    #[must_use = "there may be no fix to centre on"]
    pub fn center_on_user(&self) -> bool {
        let Some(sample) = self.inner.tracker.current_position() else {
            return false;
        };
        self.inner
            .map
            .borrow_mut()
            .set_center(sample.coordinate, USER_ZOOM);
        true
    }

    /// Search for destinations. Failures resolve to an empty list.
    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        let geocoder = self.inner.geocoder.clone();
        geocoder.search(query).await
    }

    /// Travel to a search match, remembering it as a saved location.
    pub fn select_destination(&self, result: SearchResult) {
        let SearchResult {
            name,
            address,
            coordinate,
            ..
        } = result;
        self.inner.remember(&name, &address, coordinate);
        self.inner.go_to(Destination {
            coordinate,
            name,
            address,
        });
    }

    /// Travel to a previously saved location. It is appended again with a
    /// fresh id and timestamp.
    pub fn select_saved_location(&self, location: SavedLocation) {
        let SavedLocation {
            name,
            address,
            coordinate,
            ..
        } = location;
        self.inner.remember(&name, &address, coordinate);
        self.inner.go_to(Destination {
            coordinate,
            name,
            address,
        });
    }

    /// Every saved location, oldest first.
    ///
    /// # Errors
    ///
    /// Propagates the store's error.
    pub fn saved_locations(&self) -> Result<Vec<SavedLocation>, StoreError> {
        self.inner.store.borrow().list()
    }

    /// Change the transport mode, recomputing the route when one can be.
    pub fn set_transport_mode(&self, mode: TransportMode) {
        if !self.inner.routes.set_mode(mode) {
            return;
        }
        if self.inner.recompute_from_current() {
            debug!("route recompute for {}", mode.profile());
        }
    }

    /// Remove the route, the destination and its address.
    pub fn clear_route(&self) {
        self.inner.routes.clear_route();
        *self.inner.end_address.borrow_mut() = None;
    }

    /// Hide the directions panel.
    pub fn hide_directions(&self) {
        self.inner.routes.hide_directions();
    }

    /// Zoom the map in one step.
    pub fn zoom_in(&self) {
        self.inner.map.borrow_mut().zoom_in();
    }

    /// Zoom the map out one step.
    pub fn zoom_out(&self) {
        self.inner.map.borrow_mut().zoom_out();
    }

    /// Clear the advisory board.
    pub fn dismiss_advisory(&self) {
        self.inner.advisories.borrow_mut().dismiss();
    }

    /// Hide the permission banner.
    pub fn acknowledge_permission_banner(&self) {
        self.inner.tracker.acknowledge_permission_banner();
    }

    /// The position tracker.
    #[must_use]
    pub fn tracker(&self) -> &PositionTracker {
        &self.inner.tracker
    }

    /// The route orchestrator.
    #[must_use]
    pub fn routes(&self) -> &RouteOrchestrator {
        &self.inner.routes
    }

    /// Message on the advisory board.
    #[must_use]
    pub fn advisory(&self) -> Option<Advisory> {
        self.inner.advisories.borrow().current().cloned()
    }

    /// Reverse-geocoded description of where the session started.
    #[must_use]
    pub fn start_address(&self) -> Option<String> {
        self.inner.start_address.borrow().clone()
    }

    /// Address of the chosen destination.
    #[must_use]
    pub fn end_address(&self) -> Option<String> {
        self.inner.end_address.borrow().clone()
    }

    /// Capture the current state as plain data.
    #[must_use]
    pub fn snapshot(&self) -> NavigatorSnapshot {
        let tracker = &self.inner.tracker;
        let routes = &self.inner.routes;
        NavigatorSnapshot {
            status: tracker.status(),
            advisory: self.advisory(),
            position: tracker.current_position(),
            start_address: self.start_address(),
            end_address: self.end_address(),
            destination: routes.destination(),
            route: routes.result(),
            mode: routes.mode(),
            tracking_enabled: tracker.is_enabled(),
            routing: routes.is_routing(),
            directions_visible: routes.directions_visible(),
            permission_denied: tracker.permission_denied(),
        }
    }
}

impl NavigatorInner {
    fn on_fix(this: &Rc<Self>, notice: FixNotice) {
        let at = notice.sample.coordinate;
        if notice.initial {
            Self::describe_start(this, at);
        }
        if this.routes.recompute(at).is_some() {
            debug!("route recompute after fix at {at}");
        }
    }

    fn describe_start(this: &Rc<Self>, at: Coordinate) {
        let generation = this.address_generation.get() + 1;
        this.address_generation.set(generation);
        let geocoder = this.geocoder.clone();
        let weak: Weak<Self> = Rc::downgrade(this);
        tokio::task::spawn_local(async move {
            let description = geocoder.reverse_geocode(at).await;
            let Some(live) = weak.upgrade() else {
                return;
            };
            if live.address_generation.get() == generation {
                *live.start_address.borrow_mut() = Some(description);
            }
        });
    }

    fn forget_start_address(&self) {
        self.address_generation
            .set(self.address_generation.get() + 1);
        *self.start_address.borrow_mut() = None;
    }

    fn go_to(&self, destination: Destination) {
        if !self.tracker.is_enabled() {
            self.tracker.start();
        }
        info!("destination set to {}", destination.name);
        *self.end_address.borrow_mut() = Some(destination.address.clone());
        self.routes.set_destination(destination);
        if !self.recompute_from_current() {
            debug!("route deferred until the first fix");
        }
    }

    fn remember(&self, name: &str, address: &str, coordinate: Coordinate) {
        let location = SavedLocation {
            id: self.ids.next_id(),
            name: name.to_owned(),
            address: address.to_owned(),
            coordinate,
            last_used_at: SystemTime::now(),
        };
        if let Err(err) = self.store.borrow_mut().append(location) {
            warn!("could not save {name:?}: {err}");
        }
    }

    fn recompute_from_current(&self) -> bool {
        self.tracker
            .current_position()
            .and_then(|sample| self.routes.recompute(sample.coordinate))
            .is_some()
    }
}

fn seed_ids(store: &dyn SavedLocationStore) -> SavedLocationIds {
    match store.list() {
        Ok(locations) => SavedLocationIds::continuing(&locations),
        Err(err) => {
            warn!("could not read saved locations: {err}");
            SavedLocationIds::default()
        }
    }
}
