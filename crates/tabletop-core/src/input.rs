//! Input events for mouse/touch/keyboard, and click counting.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::scene::EntityId;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer event in screen coordinates.
///
/// `time_ms` is a monotonic timestamp supplied by the shell; it drives
/// multi-click detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Down {
        position: Point,
        #[serde(default)]
        button: MouseButton,
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default)]
        time_ms: u64,
    },
    Up {
        position: Point,
    },
    Move {
        position: Point,
    },
    Wheel {
        position: Point,
        delta_y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    TouchStart {
        touches: Vec<Point>,
        #[serde(default)]
        time_ms: u64,
    },
    TouchMove {
        touches: Vec<Point>,
    },
    TouchEnd,
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Space,
    Delete,
    Escape,
    Character(char),
    Other(String),
}

/// Keyboard event type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KeyEvent {
    Pressed {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
        /// A text field owns the keyboard; only Escape gets through.
        #[serde(default)]
        text_input_focused: bool,
    },
    Released {
        key: Key,
    },
}

/// Counts rapid clicks on the same entity.
///
/// Keeps the timestamps of recent clicks on one entity that fall inside the
/// window. A click on a different entity starts over.
#[derive(Debug, Clone, Default)]
pub struct ClickTracker {
    last_id: Option<EntityId>,
    times: Vec<u64>,
}

impl ClickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a click and return how many clicks on `id` fall within
    /// `window_ms` of `time_ms`, this one included.
    pub fn register(&mut self, id: EntityId, time_ms: u64, window_ms: u64) -> usize {
        if self.last_id == Some(id) {
            self.times.push(time_ms);
            self.times
                .retain(|&t| time_ms.saturating_sub(t) < window_ms);
        } else {
            self.last_id = Some(id);
            self.times = vec![time_ms];
        }
        self.times.len()
    }

    pub fn reset(&mut self) {
        self.last_id = None;
        self.times.clear();
    }
}
