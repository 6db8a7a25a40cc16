//! Forward and reverse geocoding.
//!
//! [`GeocodingBackend`] is the I/O boundary and reports [`GeocodeError`].
//! [`Geocoder`] wraps a backend with the best-effort policy the rest of the
//! engine relies on: it never returns an error.

mod backend;
mod error;
mod geocoder;

pub use backend::{GeocodingBackend, Place};
pub use error::GeocodeError;
pub use geocoder::{Geocoder, MIN_QUERY_LEN, SEARCH_LIMIT, SearchResult, UNKNOWN_LOCATION};
