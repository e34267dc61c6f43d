//! Recorded sessions: a JSON list of user actions replayed against an
//! editor.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tabletop_core::input::{KeyEvent, PointerEvent};
use tabletop_core::interaction::MenuAction;
use tabletop_core::scene::{EntityId, NoteSize, SerializableColor};
use tabletop_core::tools::ToolKind;

use crate::app::AppError;

/// One recorded action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Pointer { event: PointerEvent },
    Key { event: KeyEvent },
    Resize { width: f64, height: f64 },
    /// An image finished decoding after a drop or a paste.
    Image {
        image_ref: String,
        width: u32,
        height: u32,
    },
    Rename { text: String },
    CancelRename,
    Note {
        text: String,
        #[serde(default)]
        size: NoteSize,
    },
    Hp { current: String, max: String },
    DisplayName { text: String },
    Roll { formula: String },
    Menu { id: EntityId, action: MenuAction },
    Select { id: EntityId },
    Tool { tool: ToolKind },
    Brush {
        #[serde(default)]
        color: Option<SerializableColor>,
        #[serde(default)]
        size: Option<f64>,
        #[serde(default)]
        opacity: Option<f64>,
    },
    ZoomIn,
    ZoomOut,
    ResetView,
    ToggleGrid,
    Undo,
    ClearDrawings,
    ClearScene,
    Import { path: PathBuf },
    Export { path: PathBuf },
}

/// A session file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub events: Vec<SessionEvent>,
}

impl Session {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
