//! Editor configuration.
//!
//! Every tunable constant of the interaction engine lives here so that shells
//! can override it from a JSON file. Missing fields fall back to the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scene::SerializableColor;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Default brush used by the drawing tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushDefaults {
    pub color: SerializableColor,
    pub size: f64,
    pub opacity: f64,
}

impl Default for BrushDefaults {
    fn default() -> Self {
        Self {
            color: SerializableColor::new(255, 0, 0, 255),
            size: 3.0,
            opacity: 1.0,
        }
    }
}

/// Tunables for the scene and interaction engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Grid spacing in world units (50 units = 0.5 m).
    pub grid_size: f64,
    /// Ruler and movement conversion ratio.
    pub pixels_per_foot: f64,
    /// Maximum number of annotation snapshots kept for undo.
    pub history_limit: usize,
    pub triple_click_window_ms: u64,
    /// Distance handles sit outside the entity bounds.
    pub handle_offset: f64,
    /// Pick radius in world units, independent of zoom.
    pub handle_pick_radius: f64,
    pub handle_draw_size: f64,
    pub duplicate_offset: f64,
    /// Newly placed images are scaled so neither side exceeds this.
    pub max_placed_size: f64,
    pub storage_key: String,
    pub float_lifetime_ms: f64,
    pub float_tick_ms: f64,
    pub float_drift: f64,
    pub brush: BrushDefaults,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 5.0,
            grid_size: 50.0,
            pixels_per_foot: 5.0,
            history_limit: 20,
            triple_click_window_ms: 600,
            handle_offset: 5.0,
            handle_pick_radius: 12.0,
            handle_draw_size: 8.0,
            duplicate_offset: 30.0,
            max_placed_size: 200.0,
            storage_key: "vtt-data".to_string(),
            float_lifetime_ms: 3000.0,
            float_tick_ms: 16.0,
            float_drift: 0.5,
            brush: BrushDefaults::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config file from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
