//! Core domain types for the wayfinder engine.
//!
//! This crate holds the value types that flow between position acquisition,
//! routing and presentation, together with the traits the engine uses to
//! reach its collaborators: the host position capability, the map surface,
//! the routing and geocoding backends and the saved-location store.
//! Constructors that can receive bad input return `Result` so invalid
//! coordinates are rejected at the edge.
#![forbid(unsafe_code)]

pub mod accuracy;
pub mod coordinate;
pub mod device;
pub mod distance;
pub mod format;
pub mod geocode;
pub mod map_view;
pub mod position;
pub mod route;
pub mod routing;
pub mod saved;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use accuracy::AccuracyClass;
pub use coordinate::{Coordinate, CoordinateError};
pub use device::{ClientFamily, ClientProfile, OsFamily};
pub use distance::{EARTH_RADIUS_METERS, distance_meters};
pub use format::{format_distance, format_duration};
pub use geocode::{
    GeocodeError, Geocoder, GeocodingBackend, MIN_QUERY_LEN, Place, SEARCH_LIMIT, SearchResult,
    UNKNOWN_LOCATION,
};
pub use map_view::{IconSpec, LayerId, MapView, PolylineStyle};
pub use position::{
    PositionError, PositionErrorCode, PositionOptions, PositionProvider, PositionSample, Watch,
    WatchEvent, WatchHandle,
};
pub use route::{Destination, Instruction, RouteResult, TransportMode};
pub use routing::{
    BackendLeg, BackendRoute, BackendStep, RouteError, RouteRequest, RouteResponse,
    RoutingBackend,
};
pub use saved::{SavedLocation, SavedLocationIds, SavedLocationStore, StoreError};
