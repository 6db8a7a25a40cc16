//! Facade crate for the wayfinder engine.
//!
//! This crate re-exports the core domain types and the navigator, and
//! exposes the HTTP and file-backed adapters behind the `http` feature.

#![forbid(unsafe_code)]

pub use wayfinder_core::{
    ClientProfile, Coordinate, CoordinateError, Destination, GeocodeError, Geocoder,
    GeocodingBackend, IconSpec, Instruction, LayerId, MapView, PolylineStyle, PositionError,
    PositionErrorCode, PositionOptions, PositionProvider, PositionSample, RouteError,
    RouteResult, RoutingBackend, SavedLocation, SavedLocationStore, SearchResult, StoreError,
    TransportMode, Watch, WatchEvent, WatchHandle, distance_meters, format_distance,
    format_duration,
};
pub use wayfinder_nav::{
    AcquisitionError, AcquisitionStatus, Advisory, Collaborators, ConfigError, Navigator,
    NavigatorConfig, NavigatorSnapshot,
};

#[cfg(feature = "http")]
pub use wayfinder_data::{
    HttpRoutingBackend, HttpRoutingBackendConfig, JsonSavedLocationStore, JsonStoreError,
    NominatimGeocoder, NominatimGeocoderConfig, ProviderBuildError,
};
