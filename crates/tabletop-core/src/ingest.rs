//! Image ingestion from paste, drop and OS clipboard reads.
//!
//! Decoding happens in the shell. The core only ever sees a handle plus the
//! decoded pixel size.

use thiserror::Error;

use crate::scene::MIN_SCALE;

/// A decoded bitmap ready to be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Opaque handle or URI the renderer can resolve.
    pub image_ref: String,
    pub width: u32,
    pub height: u32,
}

impl DecodedImage {
    pub fn new(image_ref: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            image_ref: image_ref.into(),
            width,
            height,
        }
    }
}

/// Why an OS clipboard read produced no image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    #[error("Clipboard access was denied. Copy an image, then press Ctrl+V on the canvas")]
    PermissionDenied,
    #[error("No image found in the clipboard. Copy an image first (Ctrl+C)")]
    Empty,
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
}

/// Initial scale so neither side exceeds `max_size`, never enlarging and
/// never below [`MIN_SCALE`].
pub fn fit_scale(width: u32, height: u32, max_size: f64) -> f64 {
    if width == 0 || height == 0 {
        return 1.0;
    }
    (max_size / width as f64)
        .min(max_size / height as f64)
        .min(1.0)
        .max(MIN_SCALE)
}
