//! # Save Stores
//!
//! Opaque storage for a single save blob. The engine only ever reads,
//! writes or clears the whole blob.

use crate::{DuelError, DuelResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Storage for one serialized save.
pub trait SaveStore: Send + Sync {
    /// Reads the stored blob, if any.
    fn read(&self) -> DuelResult<Option<String>>;

    /// Replaces the stored blob.
    fn write(&self, blob: &str) -> DuelResult<()>;

    /// Removes the stored blob.
    fn clear(&self) -> DuelResult<()>;

    /// Whether a blob is stored.
    fn exists(&self) -> bool {
        matches!(self.read(), Ok(Some(_)))
    }
}

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blob: RwLock<Option<String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `blob`.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: RwLock::new(Some(blob.into())),
        }
    }
}

fn poisoned<T>(_: T) -> DuelError {
    DuelError::InvalidState("save store lock poisoned".to_string())
}

impl SaveStore for MemoryStore {
    fn read(&self) -> DuelResult<Option<String>> {
        Ok(self.blob.read().map_err(poisoned)?.clone())
    }

    fn write(&self, blob: &str) -> DuelResult<()> {
        *self.blob.write().map_err(poisoned)? = Some(blob.to_string());
        Ok(())
    }

    fn clear(&self) -> DuelResult<()> {
        *self.blob.write().map_err(poisoned)? = None;
        Ok(())
    }
}

/// Store backed by a JSON file on disk.
///
/// Writes go to a sibling temp file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store at `path`, creating parent directories.
    pub fn new(path: impl AsRef<Path>) -> DuelResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self { path })
    }

    /// Path of the save file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SaveStore for FileStore {
    fn read(&self) -> DuelResult<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&self.path)?))
    }

    fn write(&self, blob: &str) -> DuelResult<()> {
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, blob)?;
        fs::rename(&temp_path, &self.path)?;
        log::debug!("Saved to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> DuelResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            log::debug!("Deleted save {}", self.path.display());
        }
        Ok(())
    }
}
