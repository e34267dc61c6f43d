//! Renderer trait abstraction.

use peniko::Color;
use tabletop_core::canvas::Canvas;
use tabletop_core::interaction::InteractionController;
use thiserror::Error;

use crate::commands::DrawCommand;
use crate::frame::{BACKGROUND_COLOR, build_frame};
use crate::text::TextMeasure;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Unknown image: {0}")]
    MissingImage(String),
    #[error("Unbalanced transform stack at command {0}")]
    UnbalancedTransform(usize),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Everything a frame is built from.
pub struct RenderContext<'a> {
    pub canvas: &'a Canvas,
    /// Gesture state, for the token movement trail.
    pub controller: Option<&'a InteractionController>,
    pub background_color: Color,
}

impl<'a> RenderContext<'a> {
    pub fn new(canvas: &'a Canvas) -> Self {
        Self {
            canvas,
            controller: None,
            background_color: BACKGROUND_COLOR,
        }
    }

    pub fn with_controller(mut self, controller: &'a InteractionController) -> Self {
        self.controller = Some(controller);
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }
}

/// Trait for rendering backends.
///
/// Backends receive the finished command list for a frame and draw it.
pub trait Renderer {
    fn execute(&mut self, commands: &[DrawCommand]) -> RenderResult<()>;

    /// Build and draw one frame.
    fn render_frame(&mut self, ctx: &RenderContext, measure: &dyn TextMeasure) -> RenderResult<()> {
        let commands = build_frame(ctx, measure);
        log::trace!("Rendering frame with {} commands", commands.len());
        self.execute(&commands)
    }
}
