//! Storage abstraction for persistence.
//!
//! Backends are plain key-value blob stores. The editor keeps a single key
//! holding the serialized [`ProjectData`].

mod autosave;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use autosave::{AutoSaveManager, create_default_storage};
pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::project::ProjectData;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Nothing stored under key: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for blob storage backends.
///
/// Implementations can keep blobs in memory or on the filesystem. Project
/// (de)serialization is provided on top of the raw blob operations.
pub trait Storage: Send + Sync {
    /// Store a blob, replacing any previous value.
    fn write(&self, key: &str, blob: &str) -> StorageResult<()>;

    /// Read a blob.
    fn read(&self, key: &str) -> StorageResult<String>;

    /// Delete a blob. Missing keys are not an error.
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// List all stored keys.
    fn list(&self) -> StorageResult<Vec<String>>;

    /// Check if a key exists.
    fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Serialize and store a project.
    fn save_project(&self, key: &str, project: &ProjectData) -> StorageResult<()> {
        let json = project
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.write(key, &json)
    }

    /// Load and parse a project.
    fn load_project(&self, key: &str) -> StorageResult<ProjectData> {
        let json = self.read(key)?;
        ProjectData::from_json(&json)
            .map_err(|e| StorageError::Serialization(format!("Failed to parse '{key}': {e}")))
    }
}
