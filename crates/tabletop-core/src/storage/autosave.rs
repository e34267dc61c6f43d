//! Persist-on-mutation for the editor.
//!
//! Every mutating operation marks the manager dirty; the shell flushes once
//! per handled event so state is on disk before the next frame.

use crate::project::ProjectData;
use crate::storage::{Storage, StorageError, StorageResult};
use std::sync::Arc;

/// Writes the project blob under a single key whenever it is dirty.
pub struct AutoSaveManager<S: Storage> {
    storage: Arc<S>,
    key: String,
    dirty: bool,
    saves: u64,
}

impl<S: Storage> AutoSaveManager<S> {
    /// Create a new auto-save manager writing to `key`.
    pub fn new(storage: Arc<S>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            dirty: false,
            saves: 0,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Mark the project as having unsaved changes.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of successful writes so far.
    pub fn save_count(&self) -> u64 {
        self.saves
    }

    /// Write the project immediately.
    pub fn save(&mut self, project: &ProjectData) -> StorageResult<()> {
        self.storage.save_project(&self.key, project)?;
        self.dirty = false;
        self.saves += 1;
        Ok(())
    }

    /// Write the project if dirty. Returns true if a save was performed.
    pub fn flush(&mut self, project: &ProjectData) -> StorageResult<bool> {
        if !self.dirty {
            return Ok(false);
        }
        self.save(project)?;
        Ok(true)
    }

    /// Load the saved project. A missing or unreadable blob yields an empty
    /// project; it is never fatal.
    pub fn load_or_default(&mut self) -> ProjectData {
        self.dirty = false;
        match self.storage.load_project(&self.key) {
            Ok(project) => {
                log::info!(
                    "Restored {} images and {} drawings",
                    project.images.len(),
                    project.drawings.len()
                );
                project
            }
            Err(StorageError::NotFound(_)) => {
                log::info!("No saved scene under '{}', starting empty", self.key);
                ProjectData::default()
            }
            Err(e) => {
                log::warn!("Discarding unreadable saved scene: {e}");
                ProjectData::default()
            }
        }
    }

    /// Get a reference to the storage backend.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

/// Create the platform storage backend.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_storage() -> StorageResult<Arc<crate::storage::FileStorage>> {
    Ok(Arc::new(crate::storage::FileStorage::default_location()?))
}

/// Create the platform storage backend.
#[cfg(target_arch = "wasm32")]
pub fn create_default_storage() -> StorageResult<Arc<crate::storage::MemoryStorage>> {
    Ok(Arc::new(crate::storage::MemoryStorage::new()))
}
