//! Nominatim response types.
//!
//! See: <https://nominatim.org/release-docs/latest/api/Output/>

use serde::Deserialize;
use wayfinder_core::{Coordinate, Place};

/// One entry of a `/search` response.
///
/// Nominatim encodes coordinates as decimal strings.
#[derive(Debug, Deserialize)]
pub struct SearchEntry {
    pub place_id: PlaceId,
    pub display_name: String,
    pub lat: String,
    pub lon: String,
}

/// `place_id` is numeric on current servers and textual on some mirrors.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PlaceId {
    Number(u64),
    Text(String),
}

impl std::fmt::Display for PlaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

/// A `/reverse` response. A miss carries `error` instead of a name.
#[derive(Debug, Deserialize)]
pub struct ReverseEntry {
    pub display_name: Option<String>,
    pub error: Option<String>,
}

impl SearchEntry {
    /// Convert to a [`Place`], or `None` when the coordinates are unusable.
    pub fn into_place(self) -> Option<Place> {
        let lat = self.lat.trim().parse::<f64>().ok()?;
        let lng = self.lon.trim().parse::<f64>().ok()?;
        let coordinate = Coordinate::new(lat, lng).ok()?;
        Some(Place {
            id: self.place_id.to_string(),
            display_name: self.display_name,
            coordinate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialise_search_response() {
        let json = r#"[
            {"place_id": 240109189, "display_name": "Trafalgar Square, St James's, London",
             "lat": "51.5080", "lon": "-0.1281", "class": "place"},
            {"place_id": "abc", "display_name": "Nowhere", "lat": "north", "lon": "0"}
        ]"#;

        let entries: Vec<SearchEntry> = serde_json::from_str(json).expect("should deserialise");
        let places: Vec<Place> = entries.into_iter().filter_map(SearchEntry::into_place).collect();

        assert_eq!(places.len(), 1);
        assert_eq!(places[0].id, "240109189");
        assert_eq!(places[0].coordinate.lng(), -0.1281);
    }

    #[test]
    fn deserialise_reverse_miss() {
        let entry: ReverseEntry =
            serde_json::from_str(r#"{"error": "Unable to geocode"}"#).expect("should deserialise");
        assert!(entry.display_name.is_none());
        assert_eq!(entry.error.as_deref(), Some("Unable to geocode"));
    }
}
