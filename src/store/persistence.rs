//! Saved Versions
//!
//! Named copies of the workspace. A `VersionStore` owns the raw list; the
//! `VersionBook` on top applies save/update/delete semantics and writes the
//! whole list back after each change.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::store::generate_id;
use crate::store::migration::deserialize_snapshot;
use crate::store::state::{AppSnapshot, AppState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedVersion {
    pub id: String,
    pub name: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Older layouts are migrated while reading
    #[serde(deserialize_with = "deserialize_snapshot")]
    pub state: AppSnapshot,
}

/// Backing storage for the version list
pub trait VersionStore {
    fn load_all(&self) -> Result<Vec<SavedVersion>, StoreError>;
    fn save_all(&mut self, versions: &[SavedVersion]) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryVersionStore {
    versions: Vec<SavedVersion>,
}

impl MemoryVersionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VersionStore for MemoryVersionStore {
    fn load_all(&self) -> Result<Vec<SavedVersion>, StoreError> {
        Ok(self.versions.clone())
    }

    fn save_all(&mut self, versions: &[SavedVersion]) -> Result<(), StoreError> {
        self.versions = versions.to_vec();
        Ok(())
    }
}

/// All versions in one JSON array file
#[derive(Debug, Clone)]
pub struct JsonFileVersionStore {
    path: PathBuf,
}

impl JsonFileVersionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VersionStore for JsonFileVersionStore {
    /// A missing file is an empty list
    fn load_all(&self) -> Result<Vec<SavedVersion>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!("No version file at {:?}", self.path);
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        let versions: Vec<SavedVersion> = serde_json::from_str(&contents)?;
        tracing::debug!("Loaded {} saved versions from {:?}", versions.len(), self.path);
        Ok(versions)
    }

    fn save_all(&mut self, versions: &[SavedVersion]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(versions)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Version list operations over a store
pub struct VersionBook<S: VersionStore> {
    store: S,
    versions: Vec<SavedVersion>,
}

impl<S: VersionStore> VersionBook<S> {
    pub fn open(store: S) -> Result<Self, StoreError> {
        let versions = store.load_all()?;
        Ok(Self { store, versions })
    }

    /// Save the workspace under `name`
    ///
    /// With an `id` that already exists the version is replaced in place;
    /// otherwise a new entry is appended. Returns the version id.
    pub fn save(&mut self, name: &str, id: Option<&str>, state: &AppState) -> Result<String, StoreError> {
        let version = SavedVersion {
            id: id.map(str::to_string).unwrap_or_else(generate_id),
            name: name.to_string(),
            timestamp: Utc::now().timestamp_millis(),
            state: state.snapshot(),
        };
        let saved_id = version.id.clone();

        match self.versions.iter_mut().find(|v| v.id == saved_id) {
            Some(existing) => *existing = version,
            None => self.versions.push(version),
        }

        self.store.save_all(&self.versions)?;
        tracing::info!("Saved version '{}' ({})", name, saved_id);
        Ok(saved_id)
    }

    /// Re-read the store and return the version with `id`
    pub fn load(&mut self, id: &str) -> Result<&SavedVersion, StoreError> {
        self.versions = self.store.load_all()?;
        self.get(id).ok_or_else(|| StoreError::UnknownVersion(id.to_string()))
    }

    /// Apply a saved version onto a workspace
    ///
    /// Mixes and catalog are replaced; totals only when the version has them.
    pub fn load_into(&mut self, id: &str, state: &mut AppState) -> Result<(), StoreError> {
        let snapshot = self.load(id)?.state.clone();
        state.import_snapshot(snapshot);
        Ok(())
    }

    pub fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let before = self.versions.len();
        self.versions.retain(|v| v.id != id);
        let removed = self.versions.len() != before;

        if removed {
            self.store.save_all(&self.versions)?;
            tracing::info!("Deleted version {}", id);
        }
        Ok(removed)
    }

    pub fn get(&self, id: &str) -> Option<&SavedVersion> {
        self.versions.iter().find(|v| v.id == id)
    }

    /// Newest first
    pub fn list(&self) -> Vec<&SavedVersion> {
        let mut listed: Vec<&SavedVersion> = self.versions.iter().collect();
        listed.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        listed
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
