//! Saved project format: `{ "images": [...], "drawings": [...] }`.
//!
//! The same blob is used for the autosave slot and for exported project
//! files. Imports also accept the older format, a bare array of images.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::annotations::Annotation;
use crate::scene::ImageEntity;

/// A project file that could not be loaded. The current scene is untouched.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Could not read project file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Unrecognized project file: expected an object or an array of images, found {0}")]
    UnexpectedShape(&'static str),
}

/// Persisted scene content.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectData {
    #[serde(default)]
    pub images: Vec<ImageEntity>,
    #[serde(default)]
    pub drawings: Vec<Annotation>,
}

impl ProjectData {
    pub fn new(images: Vec<ImageEntity>, drawings: Vec<Annotation>) -> Self {
        Self { images, drawings }
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.drawings.is_empty()
    }

    /// Compact JSON for the autosave slot.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Indented JSON for exported files.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Strict parse of the current format.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse a project file in either the current or the legacy format.
    pub fn import(json: &str) -> Result<Self, ImportError> {
        match serde_json::from_str::<Value>(json)? {
            Value::Array(items) => {
                let images = serde_json::from_value(Value::Array(items))?;
                Ok(Self::new(images, Vec::new()))
            }
            value @ Value::Object(_) => Ok(serde_json::from_value(value)?),
            Value::Null => Err(ImportError::UnexpectedShape("null")),
            Value::Bool(_) => Err(ImportError::UnexpectedShape("a boolean")),
            Value::Number(_) => Err(ImportError::UnexpectedShape("a number")),
            Value::String(_) => Err(ImportError::UnexpectedShape("a string")),
        }
    }

    /// Suggested file name for an export made at `timestamp_ms`.
    pub fn export_file_name(timestamp_ms: u64) -> String {
        format!("dnd-vtt-project-{timestamp_ms}.json")
    }
}
