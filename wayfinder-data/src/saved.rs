//! Saved locations persisted as a JSON document.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use thiserror::Error;
use wayfinder_core::{SavedLocation, SavedLocationStore, StoreError};

/// Failures reading or writing the saved-location file.
#[derive(Debug, Error)]
pub enum JsonStoreError {
    /// The file could not be read or replaced.
    #[error("saved location file {path}: {source}")]
    Io {
        /// File involved.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The file does not hold a JSON list of saved locations.
    #[error("saved location file {path} is malformed: {source}")]
    Serde {
        /// File involved.
        path: Utf8PathBuf,
        /// Decoder or encoder error.
        #[source]
        source: serde_json::Error,
    },
}

/// [`SavedLocationStore`] writing the whole list to one JSON file.
///
/// The list is loaded once on [`open`](Self::open) and rewritten on every
/// append. A missing file is an empty list.
#[derive(Debug)]
pub struct JsonSavedLocationStore {
    path: Utf8PathBuf,
    locations: Vec<SavedLocation>,
}

impl JsonSavedLocationStore {
    /// Load the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`JsonStoreError`] when the file exists but cannot be read or
    /// decoded.
    pub fn open(path: impl AsRef<Utf8Path>) -> Result<Self, JsonStoreError> {
        let path = path.as_ref().to_path_buf();
        let locations = match wayfinder_fs::read_optional_utf8(&path) {
            Ok(Some(contents)) => {
                serde_json::from_str(&contents).map_err(|source| JsonStoreError::Serde {
                    path: path.clone(),
                    source,
                })?
            }
            Ok(None) => Vec::new(),
            Err(source) => return Err(JsonStoreError::Io { path, source }),
        };
        debug!("loaded {} saved locations from {path}", locations.len());
        Ok(Self { path, locations })
    }

    /// File backing this store.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn persist(&self, locations: &[SavedLocation]) -> Result<(), JsonStoreError> {
        let contents =
            serde_json::to_string_pretty(locations).map_err(|source| JsonStoreError::Serde {
                path: self.path.clone(),
                source,
            })?;
        wayfinder_fs::replace_utf8(&self.path, &contents).map_err(|source| JsonStoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl SavedLocationStore for JsonSavedLocationStore {
    fn list(&self) -> Result<Vec<SavedLocation>, StoreError> {
        Ok(self.locations.clone())
    }

    fn append(&mut self, location: SavedLocation) -> Result<(), StoreError> {
        let mut next = self.locations.clone();
        next.push(location);
        self.persist(&next)
            .map_err(|err| StoreError::new("append to", err))?;
        self.locations = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::time::{Duration, UNIX_EPOCH};
    use tempfile::TempDir;
    use wayfinder_core::Coordinate;

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("create temp dir")
    }

    fn store_path(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join("nested/saved.json")).expect("utf-8 temp path")
    }

    fn location(id: &str) -> SavedLocation {
        SavedLocation {
            id: id.to_owned(),
            name: "Trafalgar Square".to_owned(),
            address: "Trafalgar Square, Westminster, London".to_owned(),
            coordinate: Coordinate::new(51.508, -0.128).expect("valid"),
            last_used_at: UNIX_EPOCH + Duration::from_millis(1_700_000_000_000),
        }
    }

    #[rstest]
    fn missing_file_is_empty(temp_dir: TempDir) {
        let store = JsonSavedLocationStore::open(store_path(&temp_dir)).expect("open");
        assert!(store.list().expect("list").is_empty());
    }

    #[rstest]
    fn appends_survive_reopening(temp_dir: TempDir) {
        let path = store_path(&temp_dir);
        let mut store = JsonSavedLocationStore::open(&path).expect("open");
        store.append(location("1700000000000")).expect("append");
        store.append(location("1700000000001")).expect("append");

        let reopened = JsonSavedLocationStore::open(&path).expect("reopen");
        let ids: Vec<String> = reopened
            .list()
            .expect("list")
            .into_iter()
            .map(|saved| saved.id)
            .collect();
        assert_eq!(ids, ["1700000000000", "1700000000001"]);
    }

    #[rstest]
    fn malformed_file_is_reported(temp_dir: TempDir) {
        let path = store_path(&temp_dir);
        wayfinder_fs::replace_utf8(&path, "{not json").expect("seed file");
        let err = JsonSavedLocationStore::open(&path).expect_err("malformed");
        assert!(matches!(err, JsonStoreError::Serde { .. }));
    }
}
