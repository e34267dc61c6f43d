//! OS clipboard access for image paste.

use tabletop_core::ingest::{ClipboardError, DecodedImage};

/// Where Ctrl+V looks for an image when the paste event carried none.
pub trait ClipboardSource {
    fn read_image(&mut self) -> Result<DecodedImage, ClipboardError>;
}

/// A clipboard that never holds anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyClipboard;

impl ClipboardSource for EmptyClipboard {
    fn read_image(&mut self) -> Result<DecodedImage, ClipboardError> {
        Err(ClipboardError::Empty)
    }
}

/// The system clipboard.
///
/// Pixels stay in the clipboard; the placed entity gets a `clipboard:N`
/// handle that a drawing backend resolves.
#[cfg(feature = "native")]
#[derive(Debug, Default)]
pub struct SystemClipboard {
    reads: usize,
}

#[cfg(feature = "native")]
impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "native")]
impl ClipboardSource for SystemClipboard {
    fn read_image(&mut self) -> Result<DecodedImage, ClipboardError> {
        let mut clipboard = arboard::Clipboard::new().map_err(clipboard_error)?;
        let image = clipboard.get_image().map_err(clipboard_error)?;
        self.reads += 1;
        log::info!(
            "Read {}x{} image from clipboard",
            image.width,
            image.height
        );
        Ok(DecodedImage::new(
            format!("clipboard:{}", self.reads),
            image.width as u32,
            image.height as u32,
        ))
    }
}

#[cfg(feature = "native")]
fn clipboard_error(e: arboard::Error) -> ClipboardError {
    match e {
        arboard::Error::ContentNotAvailable => ClipboardError::Empty,
        other => ClipboardError::Unavailable(other.to_string()),
    }
}
