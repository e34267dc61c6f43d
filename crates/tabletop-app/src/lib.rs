//! Tabletop Application
//!
//! The application shell: replays recorded sessions against the editor,
//! answers its effects (clipboard reads, dialogs, animation) and renders
//! every frame through a backend.

mod app;
mod clipboard;
mod session;
mod shortcuts;
mod trace;

pub use app::{App, AppConfig, AppError};
#[cfg(feature = "native")]
pub use clipboard::SystemClipboard;
pub use clipboard::{ClipboardSource, EmptyClipboard};
pub use session::{Session, SessionEvent};
pub use shortcuts::{Shortcut, ShortcutRegistry};
pub use trace::{FrameStats, TraceRenderer};
