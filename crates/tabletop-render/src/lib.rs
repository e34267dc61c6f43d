//! Tabletop Render Library
//!
//! Turns canvas state into an ordered list of [`DrawCommand`]s. Building a
//! frame is pure; platform adapters implement [`Renderer`] to execute the
//! commands on whatever surface they own.

mod commands;
mod frame;
mod renderer;
pub mod text;

pub use commands::{DrawCommand, FontSpec, TextAlign, TextBaseline, TextStyle};
pub use frame::{BACKGROUND_COLOR, build_frame};
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError};
pub use text::{ApproxTextMeasure, TextMeasure, wrap_text};
