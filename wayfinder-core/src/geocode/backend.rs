use async_trait::async_trait;

use super::error::GeocodeError;
use crate::Coordinate;

/// A match returned by a forward search.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    /// Service-assigned identifier.
    pub id: String,
    /// Full comma-separated display name.
    pub display_name: String,
    /// Where the match is.
    pub coordinate: Coordinate,
}

/// Text-to-place and place-to-text lookups against an external service.
#[async_trait(?Send)]
pub trait GeocodingBackend {
    /// Search for up to `limit` places matching `query`, best match first.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>, GeocodeError>;

    /// Describe the place at `at`. `None` means the service had no name.
    async fn reverse(&self, at: Coordinate) -> Result<Option<String>, GeocodeError>;
}
