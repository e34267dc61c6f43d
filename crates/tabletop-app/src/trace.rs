//! A renderer that validates and logs command lists instead of drawing.

use tabletop_render::{DrawCommand, RenderResult, Renderer, RendererError};

/// Counts from the last executed frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub commands: usize,
    pub images: usize,
    pub texts: usize,
    pub max_depth: usize,
}

/// Headless backend.
#[derive(Debug, Default)]
pub struct TraceRenderer {
    frames: usize,
    last: FrameStats,
}

impl TraceRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames executed successfully.
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn last_frame(&self) -> FrameStats {
        self.last
    }
}

impl Renderer for TraceRenderer {
    fn execute(&mut self, commands: &[DrawCommand]) -> RenderResult<()> {
        let mut stats = FrameStats {
            commands: commands.len(),
            ..FrameStats::default()
        };
        let mut depth = 0usize;

        for (i, command) in commands.iter().enumerate() {
            log::trace!("{i:4} {}", command.kind());
            match command {
                DrawCommand::PushTransform(_) => {
                    depth += 1;
                    stats.max_depth = stats.max_depth.max(depth);
                }
                DrawCommand::PopTransform => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or(RendererError::UnbalancedTransform(i))?;
                }
                DrawCommand::Image { image_ref, .. } => {
                    if image_ref.is_empty() {
                        return Err(RendererError::MissingImage(format!("command {i}")));
                    }
                    stats.images += 1;
                }
                DrawCommand::Text { .. } => stats.texts += 1,
                _ => {}
            }
        }
        if depth != 0 {
            return Err(RendererError::UnbalancedTransform(commands.len()));
        }

        self.frames += 1;
        self.last = stats;
        log::debug!(
            "Frame {}: {} commands, {} images, {} texts",
            self.frames,
            stats.commands,
            stats.images,
            stats.texts
        );
        Ok(())
    }
}
