//! Best-effort geocoding on top of a [`GeocodingBackend`].

use std::rc::Rc;

use log::{debug, warn};

use super::backend::{GeocodingBackend, Place};
use crate::Coordinate;

/// Shortest trimmed query worth sending to the service.
pub const MIN_QUERY_LEN: usize = 3;

/// Maximum number of matches requested per search.
pub const SEARCH_LIMIT: usize = 5;

/// Placeholder returned whenever reverse geocoding fails.
pub const UNKNOWN_LOCATION: &str = "Unknown location";

/// A search match ready for display and for destination selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Service-assigned identifier.
    pub id: String,
    /// First component of the display name.
    pub name: String,
    /// Full display name.
    pub address: String,
    /// Where the match is.
    pub coordinate: Coordinate,
}

impl From<Place> for SearchResult {
    fn from(place: Place) -> Self {
        let name = place
            .display_name
            .split(',')
            .next()
            .map(str::trim)
            .unwrap_or_default()
            .to_owned();
        Self {
            id: place.id,
            name,
            address: place.display_name,
            coordinate: place.coordinate,
        }
    }
}

/// Geocoding that never fails: errors are logged and replaced by an empty
/// result or [`UNKNOWN_LOCATION`].
#[derive(Clone)]
pub struct Geocoder {
    backend: Rc<dyn GeocodingBackend>,
}

impl std::fmt::Debug for Geocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Geocoder")
            .field("backend", &"<dyn GeocodingBackend>")
            .finish()
    }
}

impl Geocoder {
    /// Wrap a backend.
    #[must_use]
    pub fn new(backend: Rc<dyn GeocodingBackend>) -> Self {
        Self { backend }
    }

    /// Search for places matching `query`.
    ///
    /// Queries shorter than [`MIN_QUERY_LEN`] after trimming resolve to an
    /// empty list without contacting the backend.
    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        let trimmed = query.trim();
        if trimmed.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }
        match self.backend.search(trimmed, SEARCH_LIMIT).await {
            Ok(places) => {
                debug!("search {trimmed:?} matched {} places", places.len());
                places.into_iter().map(SearchResult::from).collect()
            }
            Err(err) => {
                warn!("search {trimmed:?} failed: {err}");
                Vec::new()
            }
        }
    }

    /// Describe the place at `at`.
    pub async fn reverse_geocode(&self, at: Coordinate) -> String {
        match self.backend.reverse(at).await {
            Ok(Some(name)) if !name.trim().is_empty() => name,
            Ok(_) => UNKNOWN_LOCATION.to_owned(),
            Err(err) => {
                warn!("reverse geocoding {at} failed: {err}");
                UNKNOWN_LOCATION.to_owned()
            }
        }
    }
}
