//! Key-value persistence for the best network found so far.
//!
//! Values are stored as JSON. [`FileStore`] keeps one file per key on disk,
//! [`MemoryStore`] keeps the serialized strings in memory.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::brain::NeuralNetwork;

/// Key the best network is stored under unless configured otherwise.
pub const DEFAULT_STORE_KEY: &str = "bestBrain";

/// Storage error wrapper.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    /// The stored value could not be (de)serialized.
    #[error("stored value is not a valid network: {0}")]
    Json(#[from] serde_json::Error),
}

/// A persisted network together with how far it drove.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedNetwork {
    /// Weights, biases and last activations of every level.
    pub network: NeuralNetwork,
    /// Progress of the vehicle the network was driving when it was saved.
    pub progress: f32,
    /// Wall clock time of the save.
    pub saved_at: DateTime<Utc>,
}

impl SavedNetwork {
    /// Stamps `network` with the current time.
    pub fn new(network: NeuralNetwork, progress: f32) -> Self {
        Self {
            network,
            progress,
            saved_at: Utc::now(),
        }
    }
}

/// Durable key-value store for [`SavedNetwork`]s.
pub trait NetworkStore: Send {
    /// Reads the value under `key`; `Ok(None)` when nothing is stored.
    fn load(&self, key: &str) -> Result<Option<SavedNetwork>, StoreError>;

    /// Replaces the value under `key`.
    fn save(&mut self, key: &str, saved: &SavedNetwork) -> Result<(), StoreError>;

    /// Deletes the value under `key`; deleting a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Stores every key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl NetworkStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<SavedNetwork>, StoreError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn save(&mut self, key: &str, saved: &SavedNetwork) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(saved)?;

        // write beside the target and rename so readers never see half a file
        let path = self.path_for(key);
        let partial = path.with_extension("json.partial");
        fs::write(&partial, json)?;
        fs::rename(&partial, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// In-memory store keeping serialized JSON strings, like browser local storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts a raw string under `key`, bypassing serialization.
    #[must_use]
    pub fn with_raw(mut self, key: &str, raw: impl Into<String>) -> Self {
        self.entries.insert(key.to_owned(), raw.into());
        self
    }

    /// Raw string stored under `key`.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl NetworkStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<SavedNetwork>, StoreError> {
        self.entries
            .get(key)
            .map(|json| serde_json::from_str(json))
            .transpose()
            .map_err(StoreError::from)
    }

    fn save(&mut self, key: &str, saved: &SavedNetwork) -> Result<(), StoreError> {
        let json = serde_json::to_string(saved)?;
        self.entries.insert(key.to_owned(), json);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}
