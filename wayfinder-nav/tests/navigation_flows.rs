//! Destination selection, routing and saved-location flows through the
//! navigator.

mod support;

use std::time::Duration;

use tokio::task::LocalSet;
use tokio::time::sleep;
use wayfinder_core::test_support::{
    MapCall, MemorySavedLocationStore, ScriptedPositionProvider, StubRoutingBackend,
    ok_route_response, sample, status_route_response,
};
use wayfinder_core::{IconSpec, LayerId, RouteResponse, TransportMode};
use wayfinder_nav::Advisory;

use support::{Harness, START_ADDRESS, search_result, settle};

const ROUTE: [[f64; 2]; 2] = [[-0.1278, 51.5074], [-0.1270, 51.5194]];
const DETOUR: [[f64; 2]; 3] = [[-0.1278, 51.5074], [-0.1300, 51.5120], [-0.0994, 51.5076]];

fn route_response() -> RouteResponse {
    ok_route_response(ROUTE.to_vec(), 1_400.0)
}

fn provider_with_fix() -> ScriptedPositionProvider {
    let provider = ScriptedPositionProvider::new();
    provider.push_fix(sample(51.5074, -0.1278, 25.0));
    provider
}

async fn tracking(routing: StubRoutingBackend) -> Harness {
    let h = Harness::new(provider_with_fix(), routing);
    h.navigator.start_tracking();
    settle().await;
    h
}

#[tokio::test(start_paused = true)]
async fn selecting_a_destination_saves_it_and_draws_a_route() {
    LocalSet::new()
        .run_until(async {
            let h = tracking(StubRoutingBackend::with_response(route_response())).await;
            assert_eq!(h.routing.request_count(), 0);

            h.navigator
                .select_destination(search_result("British Museum", 51.5194, -0.1270));
            settle().await;

            assert_eq!(h.routing.request_count(), 1);
            let request = h
                .routing
                .requests()
                .into_iter()
                .next()
                .unwrap_or_else(|| panic!("a route request should be issued"));
            assert_eq!(request.mode, TransportMode::Car);
            assert_eq!(request.origin.lat(), 51.5074);
            assert!(request.want_steps && request.full_geometry && !request.alternatives);

            let snapshot = h.navigator.snapshot();
            let route = snapshot
                .route
                .unwrap_or_else(|| panic!("a route should be shown"));
            assert_eq!(route.path.len(), 2);
            assert!(snapshot.directions_visible);
            assert!(!snapshot.routing);
            assert_eq!(
                snapshot.end_address.as_deref(),
                Some("British Museum, Westminster, London")
            );
            assert_eq!(snapshot.start_address.as_deref(), Some(START_ADDRESS));
            assert_eq!(h.geocoding.reverse_calls(), 1);

            let saved = h
                .navigator
                .saved_locations()
                .unwrap_or_else(|err| panic!("memory store should list: {err}"));
            let names: Vec<&str> = saved.iter().map(|location| location.name.as_str()).collect();
            assert_eq!(names, ["British Museum"]);

            let map = h.map.borrow();
            assert_eq!(map.polylines(), [LayerId::new("route-1")]);
            assert!(matches!(
                map.marker(&LayerId::destination_marker()),
                Some((_, IconSpec::DestinationPin { label })) if label == "British Museum"
            ));
            assert_eq!(map.fitted_bounds().len(), 1);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn changing_mode_recomputes_once_and_replaces_the_polyline() {
    LocalSet::new()
        .run_until(async {
            let h = tracking(StubRoutingBackend::with_response(route_response())).await;
            h.navigator
                .select_destination(search_result("British Museum", 51.5194, -0.1270));
            settle().await;
            h.map.borrow_mut().clear_calls();

            h.navigator.set_transport_mode(TransportMode::Foot);
            settle().await;

            assert_eq!(h.routing.request_count(), 2);
            assert_eq!(
                h.routing.requests().last().map(|request| request.mode),
                Some(TransportMode::Foot)
            );
            assert_eq!(
                h.map.borrow().calls(),
                [
                    MapCall::RemoveLayer(LayerId::new("route-1")),
                    MapCall::DrawPolyline {
                        id: LayerId::new("route-2"),
                        points: 2,
                    },
                    MapCall::FitBounds {
                        id: LayerId::new("route-2"),
                        padding_px: 50,
                    },
                ]
            );

            h.navigator.set_transport_mode(TransportMode::Foot);
            settle().await;
            assert_eq!(h.routing.request_count(), 2);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn mode_changes_without_a_destination_do_not_route() {
    LocalSet::new()
        .run_until(async {
            let h = tracking(StubRoutingBackend::with_response(route_response())).await;

            h.navigator.set_transport_mode(TransportMode::Bicycle);
            settle().await;

            assert_eq!(h.routing.request_count(), 0);
            assert_eq!(h.navigator.snapshot().mode, TransportMode::Bicycle);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn clearing_the_route_removes_every_route_layer() {
    LocalSet::new()
        .run_until(async {
            let h = tracking(StubRoutingBackend::with_response(route_response())).await;
            h.navigator
                .select_destination(search_result("British Museum", 51.5194, -0.1270));
            settle().await;

            h.navigator.clear_route();

            let snapshot = h.navigator.snapshot();
            assert_eq!(snapshot.destination, None);
            assert_eq!(snapshot.route, None);
            assert_eq!(snapshot.end_address, None);
            assert!(!snapshot.directions_visible);
            let map = h.map.borrow();
            assert!(map.polylines().is_empty());
            assert!(!map.has_layer(&LayerId::destination_marker()));
            assert!(map.has_layer(&LayerId::tracking_marker()));
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn results_for_superseded_destinations_are_discarded() {
    LocalSet::new()
        .run_until(async {
            let routing = StubRoutingBackend::with_response(ok_route_response(
                DETOUR.to_vec(),
                2_100.0,
            ));
            routing.queue_delayed(Duration::from_secs(5), Ok(route_response()));
            let h = tracking(routing).await;

            h.navigator
                .select_destination(search_result("British Museum", 51.5194, -0.1270));
            h.navigator
                .select_destination(search_result("Tate Modern", 51.5076, -0.0994));
            settle().await;
            assert!(!h.navigator.snapshot().routing);

            sleep(Duration::from_secs(6)).await;

            assert_eq!(h.routing.request_count(), 2);
            let route = h
                .navigator
                .snapshot()
                .route
                .unwrap_or_else(|| panic!("the newer route should be shown"));
            assert_eq!(route.path.len(), 3);
            let drawn = h
                .map
                .borrow()
                .calls()
                .iter()
                .filter(|call| matches!(call, MapCall::DrawPolyline { .. }))
                .count();
            assert_eq!(drawn, 1);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn backend_refusals_keep_the_destination_and_report_failure() {
    LocalSet::new()
        .run_until(async {
            let h = tracking(StubRoutingBackend::with_response(status_route_response(
                "NoRoute",
            )))
            .await;

            h.navigator
                .select_destination(search_result("Lundy", 51.1781, -4.6673));
            settle().await;

            let snapshot = h.navigator.snapshot();
            assert_eq!(snapshot.advisory, Some(Advisory::RouteFailed));
            assert!(snapshot.destination.is_some());
            assert_eq!(snapshot.route, None);
            assert!(!snapshot.directions_visible);
            assert!(!snapshot.routing);
            assert!(
                !h.map
                    .borrow()
                    .calls()
                    .iter()
                    .any(|call| matches!(call, MapCall::DrawPolyline { .. }))
            );
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn store_failures_do_not_block_routing() {
    LocalSet::new()
        .run_until(async {
            let h = Harness::with_store(
                provider_with_fix(),
                StubRoutingBackend::with_response(route_response()),
                Box::new(MemorySavedLocationStore::failing()),
            );
            h.navigator.start_tracking();
            settle().await;

            h.navigator
                .select_destination(search_result("British Museum", 51.5194, -0.1270));
            settle().await;

            assert!(h.navigator.snapshot().route.is_some());
            let saved = h
                .navigator
                .saved_locations()
                .unwrap_or_else(|err| panic!("listing should still work: {err}"));
            assert!(saved.is_empty());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn selecting_while_idle_starts_tracking_and_routes_on_the_first_fix() {
    LocalSet::new()
        .run_until(async {
            let h = Harness::new(
                provider_with_fix(),
                StubRoutingBackend::with_response(route_response()),
            );

            h.navigator
                .select_destination(search_result("British Museum", 51.5194, -0.1270));
            assert!(h.navigator.tracker().is_enabled());
            assert_eq!(h.routing.request_count(), 0);

            settle().await;
            assert_eq!(h.routing.request_count(), 1);
            assert!(h.navigator.snapshot().route.is_some());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn watch_samples_refresh_the_route() {
    LocalSet::new()
        .run_until(async {
            let h = tracking(StubRoutingBackend::with_response(route_response())).await;
            h.navigator
                .select_destination(search_result("British Museum", 51.5194, -0.1270));
            settle().await;

            assert!(h.provider.emit_fix(sample(51.5090, -0.1275, 15.0)));
            settle().await;

            assert_eq!(h.routing.request_count(), 2);
            assert_eq!(
                h.routing.requests().last().map(|request| request.origin.lat()),
                Some(51.5090)
            );
            assert_eq!(h.geocoding.reverse_calls(), 1);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn saved_locations_replay_as_new_selections() {
    LocalSet::new()
        .run_until(async {
            let h = tracking(StubRoutingBackend::with_response(route_response())).await;
            h.navigator
                .select_destination(search_result("British Museum", 51.5194, -0.1270));
            settle().await;
            let first = h
                .navigator
                .saved_locations()
                .unwrap_or_else(|err| panic!("memory store should list: {err}"))
                .into_iter()
                .next()
                .unwrap_or_else(|| panic!("one location should be saved"));

            h.navigator.clear_route();
            h.navigator.select_saved_location(first.clone());
            settle().await;

            let saved = h
                .navigator
                .saved_locations()
                .unwrap_or_else(|err| panic!("memory store should list: {err}"));
            let ids: Vec<u64> = saved
                .iter()
                .map(|location| {
                    location
                        .id
                        .parse()
                        .unwrap_or_else(|err| panic!("id should be numeric: {err}"))
                })
                .collect();
            assert_eq!(ids.len(), 2);
            assert!(ids.windows(2).all(|pair| pair.first() < pair.last()));
            assert_eq!(
                h.navigator.snapshot().destination.map(|d| d.name),
                Some(first.name)
            );
            assert_eq!(h.routing.request_count(), 2);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn stopping_forgets_the_start_address_and_markers() {
    LocalSet::new()
        .run_until(async {
            let h = tracking(StubRoutingBackend::with_response(route_response())).await;
            assert_eq!(h.navigator.start_address().as_deref(), Some(START_ADDRESS));

            h.navigator.stop_tracking();

            let snapshot = h.navigator.snapshot();
            assert_eq!(snapshot.start_address, None);
            assert_eq!(snapshot.position, None);
            assert!(!snapshot.tracking_enabled);
            assert!(!h.map.borrow().has_layer(&LayerId::accuracy_circle()));
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn centring_needs_a_fix() {
    LocalSet::new()
        .run_until(async {
            let provider = ScriptedPositionProvider::new();
            provider.push_pending();
            let idle = Harness::new(provider, StubRoutingBackend::with_response(route_response()));
            assert!(!idle.navigator.center_on_user());

            let h = tracking(StubRoutingBackend::with_response(route_response())).await;
            assert!(h.navigator.center_on_user());
            assert_eq!(h.map.borrow().center().map(|(_, zoom)| zoom), Some(16));

            h.navigator.zoom_in();
            h.navigator.zoom_out();
            let calls = h.map.borrow().calls().to_vec();
            assert!(matches!(
                calls.as_slice(),
                [.., MapCall::ZoomIn, MapCall::ZoomOut]
            ));
        })
        .await;
}
