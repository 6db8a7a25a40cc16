//! Nominatim geocoding backend.
//!
//! [`NominatimGeocoder`] implements [`wayfinder_core::GeocodingBackend`];
//! wrap it in a [`wayfinder_core::Geocoder`] for the engine's best-effort
//! behaviour.
//!
//! # Example
//!
//! ```no_run
//! use std::rc::Rc;
//! use wayfinder_core::Geocoder;
//! use wayfinder_data::geocoding::{NominatimGeocoder, NominatimGeocoderConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = NominatimGeocoderConfig::default().with_user_agent("my-app/1.0 (me@example.org)");
//! let geocoder = Geocoder::new(Rc::new(NominatimGeocoder::with_config(config)?));
//! for result in geocoder.search("Trafalgar Square").await {
//!     println!("{} ({})", result.name, result.address);
//! }
//! # Ok(())
//! # }
//! ```

mod nominatim;
mod provider;

pub use provider::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT, NominatimGeocoder, NominatimGeocoderConfig};
