//! Freehand paths, geometric shapes and ruler measurements drawn over the
//! scene, with a bounded undo history.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::scene::SerializableColor;

/// Tool that produced a path sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeTool {
    Pen,
    Eraser,
}

/// One point of a freehand path, carrying the brush it was drawn with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSample {
    pub x: f64,
    pub y: f64,
    pub tool: StrokeTool,
    pub color: SerializableColor,
    pub size: f64,
    pub opacity: f64,
}

impl PathSample {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Line,
    Rect,
    Circle,
    Ruler,
}

/// A two-point shape. Rectangles span start to end, circles are centered on
/// start with radius `|end - start|`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeAnnotation {
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub start: Point,
    pub end: Point,
    pub color: SerializableColor,
    pub size: f64,
    pub opacity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_px: Option<i64>,
    /// Feet with one decimal, kept as text exactly as displayed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_ft: Option<String>,
}

impl ShapeAnnotation {
    pub fn new(
        kind: ShapeKind,
        start: Point,
        end: Point,
        color: SerializableColor,
        size: f64,
        opacity: f64,
    ) -> Self {
        Self {
            kind,
            start,
            end,
            color,
            size,
            opacity,
            distance_px: None,
            distance_ft: None,
        }
    }

    /// A ruler measurement between two world points.
    pub fn ruler(
        start: Point,
        end: Point,
        pixels_per_foot: f64,
        color: SerializableColor,
        size: f64,
        opacity: f64,
    ) -> Self {
        let distance = start.distance(end);
        Self {
            distance_px: Some(distance.round() as i64),
            distance_ft: Some(format_feet(distance, pixels_per_foot)),
            ..Self::new(ShapeKind::Ruler, start, end, color, size, opacity)
        }
    }
}

/// World distance converted to feet, one decimal.
pub fn format_feet(distance: f64, pixels_per_foot: f64) -> String {
    format!("{:.1}", distance / pixels_per_foot)
}

/// A committed stroke.
///
/// Saved projects store paths as bare arrays and shapes as objects, so the
/// serialized form is untagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Annotation {
    Path(Vec<PathSample>),
    Shape(ShapeAnnotation),
}

/// Committed strokes plus the snapshot history used for undo.
#[derive(Debug, Clone)]
pub struct AnnotationLayer {
    strokes: Vec<Annotation>,
    history: Vec<Vec<Annotation>>,
    history_limit: usize,
}

impl Default for AnnotationLayer {
    fn default() -> Self {
        Self::new(20)
    }
}

impl AnnotationLayer {
    pub fn new(history_limit: usize) -> Self {
        Self {
            strokes: Vec::new(),
            history: Vec::new(),
            history_limit: history_limit.max(1),
        }
    }

    /// Live strokes in insertion order.
    pub fn strokes(&self) -> &[Annotation] {
        &self.strokes
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Append a stroke and snapshot the result. Empty paths are ignored.
    pub fn commit(&mut self, stroke: Annotation) -> bool {
        if matches!(&stroke, Annotation::Path(samples) if samples.is_empty()) {
            return false;
        }
        self.strokes.push(stroke);
        self.push_history();
        true
    }

    fn push_history(&mut self) {
        self.history.push(self.strokes.clone());
        if self.history.len() > self.history_limit {
            self.history.remove(0);
        }
    }

    /// Drop the newest snapshot and restore the one beneath it, or an empty
    /// list when none remains. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        if self.history.pop().is_none() {
            return false;
        }
        self.strokes = self.history.last().cloned().unwrap_or_default();
        true
    }

    /// Remove every stroke. History is left alone.
    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    /// Replace all strokes, e.g. after loading a project. History restarts.
    pub fn replace(&mut self, strokes: Vec<Annotation>) {
        self.strokes = strokes;
        self.history.clear();
    }
}
