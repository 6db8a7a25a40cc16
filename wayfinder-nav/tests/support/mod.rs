//! Shared wiring for the navigator integration tests.

use std::cell::RefCell;
use std::rc::Rc;

use wayfinder_core::ClientProfile;
use wayfinder_core::test_support::{
    MemorySavedLocationStore, RecordingMapView, ScriptedPositionProvider, StubGeocodingBackend,
    StubRoutingBackend,
};
use wayfinder_core::{SavedLocationStore, SearchResult};
use wayfinder_nav::{Collaborators, Navigator, NavigatorConfig};

pub const DESKTOP_FIREFOX: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";

pub const START_ADDRESS: &str = "Trafalgar Square, London";

/// A navigator over recording doubles, with handles to every double.
pub struct Harness {
    pub provider: Rc<ScriptedPositionProvider>,
    pub map: Rc<RefCell<RecordingMapView>>,
    pub routing: Rc<StubRoutingBackend>,
    pub geocoding: Rc<StubGeocodingBackend>,
    pub navigator: Navigator,
}

impl Harness {
    pub fn new(provider: ScriptedPositionProvider, routing: StubRoutingBackend) -> Self {
        Self::with_store(provider, routing, Box::new(MemorySavedLocationStore::new()))
    }

    pub fn with_store(
        provider: ScriptedPositionProvider,
        routing: StubRoutingBackend,
        store: Box<dyn SavedLocationStore>,
    ) -> Self {
        let provider = Rc::new(provider);
        let map = Rc::new(RefCell::new(RecordingMapView::new()));
        let routing = Rc::new(routing);
        let geocoding = Rc::new(StubGeocodingBackend::with_reverse(START_ADDRESS));
        let profile = ClientProfile::from_user_agent(DESKTOP_FIREFOX);
        let navigator = Navigator::new(
            Collaborators {
                provider: provider.clone(),
                map: map.clone(),
                routing: routing.clone(),
                geocoding: geocoding.clone(),
                store,
            },
            &NavigatorConfig::for_client(profile),
            profile,
        );
        Self {
            provider,
            map,
            routing,
            geocoding,
            navigator,
        }
    }
}

/// Let spawned local tasks run until they block.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

pub fn search_result(name: &str, lat: f64, lng: f64) -> SearchResult {
    SearchResult {
        id: format!("place-{name}"),
        name: name.to_owned(),
        address: format!("{name}, Westminster, London"),
        coordinate: wayfinder_core::test_support::coordinate(lat, lng),
    }
}
