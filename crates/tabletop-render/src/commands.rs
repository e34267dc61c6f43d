//! Draw commands.

use kurbo::{Affine, BezPath, Point, Rect};
use peniko::Color;

/// Horizontal placement of text relative to its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
}

/// Vertical placement of text relative to its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    #[default]
    Alphabetic,
    Middle,
    Top,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    /// Size in world units.
    pub size: f64,
    pub bold: bool,
}

impl FontSpec {
    pub const fn regular(size: f64) -> Self {
        Self { size, bold: false }
    }

    pub const fn bold(size: f64) -> Self {
        Self { size, bold: true }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub font: FontSpec,
    pub color: Color,
    pub align: TextAlign,
    pub baseline: TextBaseline,
    /// Stroke drawn under the fill, as (color, width).
    pub outline: Option<(Color, f64)>,
}

impl TextStyle {
    pub fn new(font: FontSpec, color: Color) -> Self {
        Self {
            font,
            color,
            align: TextAlign::Left,
            baseline: TextBaseline::Alphabetic,
            outline: None,
        }
    }

    pub fn centered(mut self) -> Self {
        self.align = TextAlign::Center;
        self
    }

    pub fn with_baseline(mut self, baseline: TextBaseline) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn with_outline(mut self, color: Color, width: f64) -> Self {
        self.outline = Some((color, width));
        self
    }
}

/// One drawing step. Coordinates are in the space set up by the enclosing
/// `PushTransform`s.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// Fill the whole surface, ignoring transforms.
    Clear(Color),
    /// Multiply the current transform by this one until the matching pop.
    PushTransform(Affine),
    PopTransform,
    /// Draw a bitmap stretched over `rect`.
    Image {
        image_ref: String,
        rect: Rect,
        opacity: f64,
    },
    Fill {
        path: BezPath,
        color: Color,
    },
    Stroke {
        path: BezPath,
        color: Color,
        width: f64,
        /// Dash pattern as alternating on/off lengths.
        dash: Option<Vec<f64>>,
    },
    Text {
        text: String,
        origin: Point,
        style: TextStyle,
    },
}

impl DrawCommand {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DrawCommand::Clear(_) => "clear",
            DrawCommand::PushTransform(_) => "push",
            DrawCommand::PopTransform => "pop",
            DrawCommand::Image { .. } => "image",
            DrawCommand::Fill { .. } => "fill",
            DrawCommand::Stroke { .. } => "stroke",
            DrawCommand::Text { .. } => "text",
        }
    }
}
