//! Tool system for the tabletop.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::annotations::{Annotation, PathSample, ShapeAnnotation, ShapeKind, StrokeTool};
use crate::config::BrushDefaults;
use crate::scene::SerializableColor;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Pan,
    Pen,
    Eraser,
    Line,
    Circle,
    Rect,
    Ruler,
}

impl ToolKind {
    /// Tool bound to a single-key shortcut.
    pub fn from_shortcut(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'r' => Some(ToolKind::Ruler),
            's' => Some(ToolKind::Select),
            'd' => Some(ToolKind::Pen),
            'e' => Some(ToolKind::Eraser),
            '1' => Some(ToolKind::Line),
            '2' => Some(ToolKind::Circle),
            '3' => Some(ToolKind::Rect),
            _ => None,
        }
    }

    /// Freehand tools record every pointer sample.
    pub fn stroke_tool(self) -> Option<StrokeTool> {
        match self {
            ToolKind::Pen => Some(StrokeTool::Pen),
            ToolKind::Eraser => Some(StrokeTool::Eraser),
            _ => None,
        }
    }

    /// Shape produced by a drag with this tool.
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            ToolKind::Line => Some(ShapeKind::Line),
            ToolKind::Circle => Some(ShapeKind::Circle),
            ToolKind::Rect => Some(ShapeKind::Rect),
            _ => None,
        }
    }

    /// Tools that draw on press-drag-release.
    pub fn is_drawing(self) -> bool {
        self.stroke_tool().is_some() || self.shape_kind().is_some()
    }
}

/// Brush applied to new strokes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushSettings {
    pub color: SerializableColor,
    pub size: f64,
    /// 0.0 to 1.0.
    pub opacity: f64,
}

impl From<&BrushDefaults> for BrushSettings {
    fn from(defaults: &BrushDefaults) -> Self {
        Self {
            color: defaults.color,
            size: defaults.size,
            opacity: defaults.opacity,
        }
    }
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self::from(&BrushDefaults::default())
    }
}

/// State of a tool interaction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ToolState {
    #[default]
    Idle,
    /// A drag-drawn stroke is in progress.
    Active { start: Point, current: Point },
}

/// Manages the current tool, the brush and in-progress strokes.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    pub current_tool: ToolKind,
    pub state: ToolState,
    pub brush: BrushSettings,
    /// Samples of the freehand path being drawn.
    path: Vec<PathSample>,
    /// Ruler clicks placed so far (0 or 1 between measurements).
    ruler_points: Vec<Point>,
    /// Last known pointer position in world space.
    cursor: Option<Point>,
}

impl ToolManager {
    pub fn new(brush: BrushSettings) -> Self {
        Self {
            brush,
            ..Self::default()
        }
    }

    /// Set the current tool, dropping any unfinished stroke or ruler point.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.current_tool != tool {
            log::debug!("Tool changed: {:?} -> {:?}", self.current_tool, tool);
        }
        self.current_tool = tool;
        self.cancel();
        self.ruler_points.clear();
    }

    pub fn set_cursor(&mut self, point: Point) {
        self.cursor = Some(point);
    }

    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }

    fn sample(&self, point: Point, tool: StrokeTool) -> PathSample {
        PathSample {
            x: point.x,
            y: point.y,
            tool,
            color: self.brush.color,
            size: self.brush.size,
            opacity: self.brush.opacity,
        }
    }

    /// Begin a stroke with the current tool.
    pub fn begin(&mut self, point: Point) {
        self.path.clear();
        if let Some(tool) = self.current_tool.stroke_tool() {
            self.path.push(self.sample(point, tool));
        }
        self.state = ToolState::Active {
            start: point,
            current: point,
        };
    }

    /// Extend the stroke in progress.
    pub fn update(&mut self, point: Point) {
        if let ToolState::Active { current, .. } = &mut self.state {
            *current = point;
            if let Some(tool) = self.current_tool.stroke_tool() {
                let sample = self.sample(point, tool);
                self.path.push(sample);
            }
        }
    }

    /// Finish the stroke in progress, returning what should be committed.
    pub fn end(&mut self) -> Option<Annotation> {
        let stroke = self.preview();
        self.cancel();
        stroke
    }

    /// Drop the stroke in progress.
    pub fn cancel(&mut self) {
        self.state = ToolState::Idle;
        self.path.clear();
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, ToolState::Active { .. })
    }

    /// What the stroke in progress would commit as right now.
    pub fn preview(&self) -> Option<Annotation> {
        let ToolState::Active { start, current } = self.state else {
            return None;
        };
        if self.current_tool.stroke_tool().is_some() {
            return (!self.path.is_empty()).then(|| Annotation::Path(self.path.clone()));
        }
        let kind = self.current_tool.shape_kind()?;
        Some(Annotation::Shape(ShapeAnnotation::new(
            kind,
            start,
            current,
            self.brush.color,
            self.brush.size,
            self.brush.opacity,
        )))
    }

    /// Samples of the freehand path in progress.
    pub fn path(&self) -> &[PathSample] {
        &self.path
    }

    pub fn ruler_points(&self) -> &[Point] {
        &self.ruler_points
    }

    /// Place a ruler point. The second point completes a measurement and
    /// empties the buffer.
    pub fn add_ruler_point(&mut self, point: Point, pixels_per_foot: f64) -> Option<ShapeAnnotation> {
        self.ruler_points.push(point);
        if self.ruler_points.len() < 2 {
            return None;
        }
        let start = self.ruler_points[0];
        let end = self.ruler_points[1];
        self.ruler_points.clear();
        Some(ShapeAnnotation::ruler(
            start,
            end,
            pixels_per_foot,
            self.brush.color,
            self.brush.size,
            self.brush.opacity,
        ))
    }
}
