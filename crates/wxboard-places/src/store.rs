//! Persistence of the place list.
//!
//! The list is stored wholesale as one JSON array under a single key.
//! Missing or unreadable data loads as an empty list.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use wxboard_core::StorageError;

use crate::place::Place;

/// Key-value storage backing the place list.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// One `<key>.json` file per key inside a directory.
    File(PathBuf),

    /// Process-local map. Clones share the same map.
    Memory(Arc<Mutex<HashMap<String, String>>>),
}

impl StorageBackend {
    pub fn file(dir: impl Into<PathBuf>) -> Self {
        Self::File(dir.into())
    }

    pub fn memory() -> Self {
        Self::Memory(Arc::new(Mutex::new(HashMap::new())))
    }

    pub fn read(&self, key: &str) -> Result<Option<String>> {
        match self {
            Self::File(dir) => {
                let path = key_path(dir, key);
                if !path.exists() {
                    return Ok(None);
                }
                let raw = std::fs::read_to_string(&path)
                    .map_err(|e| StorageError::Unavailable(e.to_string()))
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                Ok(Some(raw))
            }
            Self::Memory(map) => Ok(map.lock().get(key).cloned()),
        }
    }

    pub fn write(&self, key: &str, value: &str) -> Result<()> {
        match self {
            Self::File(dir) => {
                std::fs::create_dir_all(dir)
                    .map_err(|e| StorageError::Unavailable(e.to_string()))
                    .context("Failed to create data directory")?;

                // Write then rename so a crash never leaves a half-written list
                let path = key_path(dir, key);
                let tmp = path.with_extension("json.tmp");
                std::fs::write(&tmp, value)
                    .map_err(|e| StorageError::WriteFailed(e.to_string()))
                    .with_context(|| format!("Failed to write {}", tmp.display()))?;
                std::fs::rename(&tmp, &path)
                    .map_err(|e| StorageError::WriteFailed(e.to_string()))
                    .with_context(|| format!("Failed to replace {}", path.display()))?;
                Ok(())
            }
            Self::Memory(map) => {
                map.lock().insert(key.to_string(), value.to_string());
                Ok(())
            }
        }
    }
}

fn key_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{}.json", key))
}

/// Reads and writes the place list under one storage key.
#[derive(Debug, Clone)]
pub struct PlaceStore {
    backend: StorageBackend,
    key: String,
}

impl PlaceStore {
    pub fn new(backend: StorageBackend, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// Load the saved list. Absent, unreadable or malformed data yields an
    /// empty list.
    pub fn load(&self) -> Vec<Place> {
        let raw = match self.backend.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Could not read saved places: {:#}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Place>>(&raw) {
            Ok(places) => {
                tracing::info!("Loaded {} saved places", places.len());
                places
            }
            Err(e) => {
                tracing::warn!("{}", StorageError::Corruption(e.to_string()));
                Vec::new()
            }
        }
    }

    /// Replace the saved list.
    pub fn save(&self, places: &[Place]) -> Result<()> {
        let json = serde_json::to_string(places).context("Failed to serialize places")?;
        self.backend.write(&self.key, &json)
    }
}
