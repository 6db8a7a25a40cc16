//! I/O adapters for the wayfinder engine.
//!
//! This crate implements the collaborator traits from `wayfinder-core`
//! against real services: OSRM for routing, Nominatim for geocoding and a
//! JSON file for saved locations.
#![forbid(unsafe_code)]

mod client;
pub mod geocoding;
pub mod routing;
pub mod saved;

pub use client::ProviderBuildError;
pub use geocoding::{NominatimGeocoder, NominatimGeocoderConfig};
pub use routing::{HttpRoutingBackend, HttpRoutingBackendConfig};
pub use saved::{JsonSavedLocationStore, JsonStoreError};
