//! Saved destinations.
//!
//! The engine appends a [`SavedLocation`] every time the user selects a
//! destination. The list is append-only from the engine's point of view; the
//! store may be backed by anything from a `Vec` to a JSON file.

use std::cell::Cell;
use std::error::Error as StdError;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::Coordinate;

/// A destination the user has selected before.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SavedLocation {
    /// Unique, increasing identifier.
    pub id: String,
    /// Short display name.
    pub name: String,
    /// Full address line.
    pub address: String,
    /// Where it is.
    pub coordinate: Coordinate,
    /// When the user last selected it.
    pub last_used_at: SystemTime,
}

/// Errors raised by a [`SavedLocationStore`].
#[derive(Debug, Error)]
#[error("failed to {operation} saved locations: {source}")]
pub struct StoreError {
    /// What the store was doing, for example `"read"` or `"append to"`.
    pub operation: &'static str,
    /// Underlying failure.
    #[source]
    pub source: Box<dyn StdError + Send + Sync>,
}

impl StoreError {
    /// Wrap an underlying error.
    pub fn new(operation: &'static str, source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            operation,
            source: source.into(),
        }
    }
}

/// Persistence collaborator for saved destinations.
pub trait SavedLocationStore {
    /// Every saved location in insertion order.
    fn list(&self) -> Result<Vec<SavedLocation>, StoreError>;

    /// Append a location. Existing entries are never touched.
    fn append(&mut self, location: SavedLocation) -> Result<(), StoreError>;
}

/// Millisecond-timestamp identifiers that never repeat within one generator.
///
/// Two selections inside the same millisecond still get distinct ids.
///
/// # Examples
///
/// ```
/// use wayfinder_core::SavedLocationIds;
///
/// let ids = SavedLocationIds::default();
/// let first: u64 = ids.next_id().parse().unwrap();
/// let second: u64 = ids.next_id().parse().unwrap();
/// assert!(second > first);
/// ```
#[derive(Debug, Default)]
pub struct SavedLocationIds {
    last: Cell<u64>,
}

impl SavedLocationIds {
    /// Continue after an existing id so reloaded stores stay increasing.
    #[must_use]
    pub fn starting_after(last: u64) -> Self {
        Self {
            last: Cell::new(last),
        }
    }

    /// Continue after the newest numeric id in `locations`. Ids that are
    /// not numeric are skipped.
    #[must_use]
    pub fn continuing(locations: &[SavedLocation]) -> Self {
        let newest = locations
            .iter()
            .filter_map(|location| location.id.parse::<u64>().ok())
            .max()
            .unwrap_or_default();
        Self::starting_after(newest)
    }

    /// Issue the next identifier.
    #[must_use]
    pub fn next_id(&self) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default();
        let next = now.max(self.last.get().saturating_add(1));
        self.last.set(next);
        next.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn ids_strictly_increase_within_a_millisecond() {
        let ids = SavedLocationIds::default();
        let issued: Vec<u64> = (0..50)
            .map(|_| ids.next_id().parse().expect("numeric id"))
            .collect();
        assert!(issued.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[rstest]
    fn ids_continue_after_a_future_seed() {
        let ids = SavedLocationIds::starting_after(u64::MAX - 1);
        assert_eq!(ids.next_id(), u64::MAX.to_string());
    }

    #[rstest]
    fn ids_continue_after_the_newest_saved_location() {
        let saved = |id: &str| SavedLocation {
            id: id.to_owned(),
            name: "Tate Modern".to_owned(),
            address: "Tate Modern, Bankside, London".to_owned(),
            coordinate: Coordinate::new(51.5076, -0.0994).expect("valid"),
            last_used_at: UNIX_EPOCH,
        };
        let ids = SavedLocationIds::continuing(&[
            saved("18000000000000000000"),
            saved("legacy"),
            saved("17999999999999999999"),
        ]);
        assert_eq!(ids.next_id(), "18000000000000000001");
    }

    #[rstest]
    fn store_error_names_the_operation() {
        let err = StoreError::new("read", "disk on fire");
        assert_eq!(err.to_string(), "failed to read saved locations: disk on fire");
    }
}
