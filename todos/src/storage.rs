//! Durable storage for the persisted todo list.
//!
//! Storage is a single slot per key holding the whole collection as a JSON
//! array. Every write replaces the slot.

use crate::types::Todo;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Key used when the caller does not pick one
pub const DEFAULT_STORAGE_KEY: &str = "next-15-todos";

/// Errors raised by [`TodoStorage`] implementations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Key is empty or contains characters outside `[A-Za-z0-9._-]`
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    /// Reading or writing the backing file failed
    #[error("storage I/O failed for {path}: {source}")]
    Io {
        /// File that was being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Stored data is not a JSON array of todos
    #[error("stored todos are malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A slot of durable storage holding one todo collection
pub trait TodoStorage: Send + Sync {
    /// Key identifying the slot
    fn key(&self) -> &str;

    /// Reads the stored collection; `Ok(None)` when nothing was ever saved
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the slot cannot be read or does not hold
    /// a JSON array of todos.
    fn load(&self) -> Result<Option<Vec<Todo>>, StorageError>;

    /// Replaces the stored collection
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the slot cannot be written.
    fn save(&self, todos: &[Todo]) -> Result<(), StorageError>;
}

impl<T: TodoStorage + ?Sized> TodoStorage for Arc<T> {
    fn key(&self) -> &str {
        (**self).key()
    }

    fn load(&self) -> Result<Option<Vec<Todo>>, StorageError> {
        (**self).load()
    }

    fn save(&self, todos: &[Todo]) -> Result<(), StorageError> {
        (**self).save(todos)
    }
}

/// Checks that `key` is usable as a slot name (and as a file stem)
///
/// # Errors
///
/// Returns [`StorageError::InvalidKey`] for empty keys or keys containing
/// anything other than ASCII alphanumerics, `-`, `_` and `.`. The keys `.`
/// and `..` are rejected as well.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.');
    if key.is_empty() || key == "." || key == ".." || !key.chars().all(allowed) {
        return Err(StorageError::InvalidKey(key.to_owned()));
    }
    Ok(())
}

/// Stores the collection as `<dir>/<key>.json`
///
/// Saves go through a sibling temp file followed by a rename, so readers see
/// either the old or the new collection, never a torn write.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    key: String,
    path: PathBuf,
}

impl JsonFileStorage {
    /// Creates storage for `key` inside `dir` (created on first save)
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] if `key` is not a valid slot name.
    pub fn new(dir: impl AsRef<Path>, key: impl Into<String>) -> Result<Self, StorageError> {
        let key = key.into();
        validate_key(&key)?;
        let path = dir.as_ref().join(format!("{key}.json"));
        Ok(Self { key, path })
    }

    /// File the collection is stored in
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TodoStorage for JsonFileStorage {
    fn key(&self) -> &str {
        &self.key
    }

    fn load(&self) -> Result<Option<Vec<Todo>>, StorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, todos: &[Todo]) -> Result<(), StorageError> {
        let json = serde_json::to_string(todos)?;

        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;

        tracing::trace!(path = %self.path.display(), count = todos.len(), "Saved todos");
        Ok(())
    }
}

/// In-process storage slot holding the raw JSON text
///
/// Behaves like a browser's key/value storage: the slot holds a string, so
/// tests can plant malformed data and inspect exactly what was written.
#[derive(Debug)]
pub struct MemoryStorage {
    key: String,
    slot: Mutex<Option<String>>,
}

impl MemoryStorage {
    /// Creates an empty slot
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] if `key` is not a valid slot name.
    pub fn new(key: impl Into<String>) -> Result<Self, StorageError> {
        let key = key.into();
        validate_key(&key)?;
        Ok(Self {
            key,
            slot: Mutex::new(None),
        })
    }

    /// Creates a slot that already holds `raw`
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] if `key` is not a valid slot name.
    pub fn with_contents(key: impl Into<String>, raw: impl Into<String>) -> Result<Self, StorageError> {
        let storage = Self::new(key)?;
        *storage.lock() = Some(raw.into());
        Ok(storage)
    }

    /// Raw text currently in the slot
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TodoStorage for MemoryStorage {
    fn key(&self) -> &str {
        &self.key
    }

    fn load(&self) -> Result<Option<Vec<Todo>>, StorageError> {
        match self.lock().as_deref() {
            None => Ok(None),
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
        }
    }

    fn save(&self, todos: &[Todo]) -> Result<(), StorageError> {
        let json = serde_json::to_string(todos)?;
        *self.lock() = Some(json);
        Ok(())
    }
}
