//! Local storage
//!
//! JSON documents kept under a directory, one file per key. This is where the
//! cart, wishlist and order history live between sessions.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Key holding the saved cart.
pub const CART_KEY: &str = "cart";

/// Key holding the saved wishlist.
pub const WISHLIST_KEY: &str = "wishlist";

/// Key holding the order history.
pub const ORDERS_KEY: &str = "orders";

/// Errors raised while reading or writing stored documents.
#[derive(Debug, Error)]
pub enum StorageError {
    /// IO error reading or writing a document.
    #[error("storage IO error for {path}: {source}")]
    Io {
        /// Document path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Document was not valid JSON for the requested type.
    #[error("stored document {key} is invalid: {source}")]
    Json {
        /// Document key
        key: String,
        /// Underlying error
        source: serde_json::Error,
    },
}

/// Directory of JSON documents.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: PathBuf,
}

impl LocalStorage {
    /// Store documents under `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory documents are stored in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Read the document stored under `key`, or `None` if nothing was stored.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the file cannot be read or does not parse.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let path = self.path(key);

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| StorageError::Json {
                key: key.to_string(),
                source,
            })
    }

    /// Store `value` under `key`, replacing any previous document.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the value cannot be serialised or written.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let contents = serde_json::to_string_pretty(value).map_err(|source| StorageError::Json {
            key: key.to_string(),
            source,
        })?;

        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path(key);

        fs::write(&path, contents).map_err(|source| StorageError::Io { path, source })
    }

    /// Delete the document stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the file exists but cannot be removed.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path(key);

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::cart::{CartSnapshot, CartSnapshotEntry};

    #[test]
    fn missing_document_is_none() -> TestResult {
        let dir = tempfile::tempdir()?;
        let storage = LocalStorage::new(dir.path());

        let loaded: Option<CartSnapshot> = storage.load(CART_KEY)?;

        assert!(loaded.is_none());

        Ok(())
    }

    #[test]
    fn save_then_load_returns_document() -> TestResult {
        let dir = tempfile::tempdir()?;
        let storage = LocalStorage::new(dir.path().join("nested"));
        let snapshot = CartSnapshot {
            entries: vec![CartSnapshotEntry {
                product_id: "p1".to_string(),
                quantity: 2,
                variant: None,
            }],
        };

        storage.save(CART_KEY, &snapshot)?;

        assert_eq!(storage.load::<CartSnapshot>(CART_KEY)?, Some(snapshot));

        Ok(())
    }

    #[test]
    fn invalid_document_is_an_error() -> TestResult {
        let dir = tempfile::tempdir()?;
        let storage = LocalStorage::new(dir.path());
        fs::write(dir.path().join("cart.json"), "not json")?;

        assert!(matches!(
            storage.load::<CartSnapshot>(CART_KEY),
            Err(StorageError::Json { .. })
        ));

        Ok(())
    }

    #[test]
    fn remove_is_idempotent() -> TestResult {
        let dir = tempfile::tempdir()?;
        let storage = LocalStorage::new(dir.path());

        storage.save(CART_KEY, &CartSnapshot::default())?;
        storage.remove(CART_KEY)?;
        storage.remove(CART_KEY)?;

        assert!(storage.load::<CartSnapshot>(CART_KEY)?.is_none());

        Ok(())
    }
}
