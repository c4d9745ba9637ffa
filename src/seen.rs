//! This module keeps track of the battle challenges the player has already been shown, across runs
//! of the game, so that a new game does not repeat the previous one.
//!
//! The record is a plain JSON array of challenge strings. It is read and written only when a battle
//! game starts.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// This enum holds the errors raised while reading or writing the seen-set.
#[derive(thiserror::Error, Debug)]
pub(crate) enum StoreError {
    /// The file could not be read, written or removed.
    #[error("could not access the seen challenges file: {0}")]
    Io(#[from] std::io::Error),
    /// The file does not hold a JSON array of strings.
    #[error("the seen challenges file is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

/// This trait abstracts the place the seen-set is persisted to.
pub(crate) trait SeenStore {
    /// This function forgets every challenge seen so far.
    fn clear(&mut self) -> Result<(), StoreError>;

    /// This function returns every challenge seen so far, in the order they were recorded.
    fn load(&self) -> Result<Vec<String>, StoreError>;

    /// This function replaces the recorded seen-set with the given one.
    fn save(&mut self, seen: &[String]) -> Result<(), StoreError>;
}

/// This struct persists the seen-set as a JSON file on disk.
#[derive(Debug, Clone)]
pub(crate) struct JsonFileStore {
    /// The location of the JSON file.
    path: PathBuf,
}

impl JsonFileStore {
    /// This function creates a store backed by the file at `path`. The file does not need to exist.
    pub(crate) const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// This function returns the default location of the seen-set, inside the user's data
    /// directory. It is `None` on platforms where no such directory is known.
    pub(crate) fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("ideagpt").join("seen_challenges.json"))
    }

    /// This function returns the location of the JSON file.
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl SeenStore for JsonFileStore {
    fn clear(&mut self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }

    fn load(&self) -> Result<Vec<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&mut self, seen: &[String]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string(seen)?)?;

        Ok(())
    }
}

/// This struct keeps the seen-set in memory only; it backs the tests of the game flow.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    /// The recorded challenges.
    pub(crate) seen: Vec<String>,
}

#[cfg(test)]
impl SeenStore for MemoryStore {
    fn clear(&mut self) -> Result<(), StoreError> {
        self.seen.clear();
        Ok(())
    }

    fn load(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.seen.clone())
    }

    fn save(&mut self, seen: &[String]) -> Result<(), StoreError> {
        self.seen = seen.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> JsonFileStore {
        JsonFileStore::new(dir.path().join("nested").join("seen.json"))
    }

    #[test]
    fn missing_file_is_an_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn saves_and_loads_a_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        let seen = vec!["first".to_owned(), "second".to_owned()];

        store.save(&seen).unwrap();

        assert_eq!(store.load().unwrap(), seen);
        let raw = fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, r#"["first","second"]"#);
    }

    #[test]
    fn clear_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.save(&["only".to_owned()]).unwrap();

        store.clear().unwrap();
        store.clear().unwrap();

        assert!(!store.path().exists());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.save(&[]).unwrap();
        fs::write(store.path(), "{not an array").unwrap();

        assert!(matches!(store.load(), Err(StoreError::Json(_))));
    }
}
