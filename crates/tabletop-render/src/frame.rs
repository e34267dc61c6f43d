//! Frame building.
//!
//! Back to front: clear, camera transform, images with their labels and
//! note badges, the selection overlay, committed strokes, the stroke in
//! progress, ruler markers, floating dice numbers, the grid, and finally the
//! camera transform is popped again.

use kurbo::{Affine, BezPath, Circle, Point, Rect, Shape, Size, Vec2};
use peniko::Color;
use tabletop_core::annotations::{Annotation, PathSample, ShapeAnnotation, ShapeKind, StrokeTool, format_feet};
use tabletop_core::canvas::Canvas;
use tabletop_core::dice::FloatingNumber;
use tabletop_core::interaction::MovementTrack;
use tabletop_core::scene::{HitPoints, ImageEntity};
use tabletop_core::selection;
use tabletop_core::tools::ToolKind;

use crate::commands::{DrawCommand, FontSpec, TextBaseline, TextStyle};
use crate::renderer::RenderContext;
use crate::text::{TextMeasure, wrap_text};

/// Canvas background. Eraser strokes paint with it.
pub const BACKGROUND_COLOR: Color = Color::from_rgba8(42, 42, 42, 255);

const GOLD: Color = Color::from_rgba8(255, 215, 0, 255);
const GOLD_TRANSLUCENT: Color = Color::from_rgba8(255, 215, 0, 242);
const RED: Color = Color::from_rgba8(255, 0, 0, 255);
const GREEN: Color = Color::from_rgba8(0, 255, 0, 255);
const YELLOW: Color = Color::from_rgba8(255, 255, 0, 255);
const LABEL_BG: Color = Color::from_rgba8(0, 0, 0, 179);
const PANEL_BG: Color = Color::from_rgba8(0, 0, 0, 204);
const POPUP_BG: Color = Color::from_rgba8(50, 50, 50, 242);
const GRID_COLOR: Color = Color::from_rgba8(255, 255, 255, 26);

const NOTE_PADDING: f64 = 10.0;
const NOTE_LINE_HEIGHT: f64 = 1.4;
const SHAPE_PREVIEW_DASH: [f64; 2] = [5.0, 5.0];
const MOVEMENT_DASH: [f64; 2] = [10.0, 5.0];
const RULER_MARKER_RADIUS: f64 = 5.0;

const HINT_UNLOCKED: &str = "Drag handles to resize | Right-click: menu | Ctrl+Wheel: rotate";
const HINT_LOCKED: &str = "🔒 Locked | Drag handles to resize | Right-click: menu";

/// Build the draw commands for one frame.
pub fn build_frame(ctx: &RenderContext, measure: &dyn TextMeasure) -> Vec<DrawCommand> {
    let canvas = ctx.canvas;
    let mut frame = FrameBuilder {
        commands: Vec::new(),
        measure,
    };

    frame.commands.push(DrawCommand::Clear(ctx.background_color));
    frame.commands.push(DrawCommand::PushTransform(canvas.camera.transform()));

    for entity in canvas.scene.images() {
        frame.image(entity);
        frame.labels(entity);
        if entity.note_text().is_some() {
            frame.note_indicator(entity);
            if canvas.scene.is_selected(entity.id) {
                frame.note_popup(entity);
            }
        }
    }

    if let Some(entity) = canvas.scene.selected_entity() {
        let movement = ctx
            .controller
            .and_then(|c| c.movement())
            .filter(|m| m.id == entity.id && m.distance_px > 0.0);
        frame.selection_overlay(canvas, entity, movement);
    }

    for stroke in canvas.annotations.strokes() {
        frame.annotation(stroke, false);
    }

    if let Some(preview) = canvas.tools.preview() {
        frame.annotation(&preview, true);
    }

    if canvas.tools.current_tool == ToolKind::Ruler {
        frame.ruler_markers(canvas);
    }

    for number in canvas.floating.items() {
        frame.floating_number(number);
    }

    if canvas.show_grid {
        frame.grid(canvas);
    }

    frame.commands.push(DrawCommand::PopTransform);
    frame.commands
}

struct FrameBuilder<'m> {
    commands: Vec<DrawCommand>,
    measure: &'m dyn TextMeasure,
}

/// Box geometry for a label. `baseline` is measured from the box top.
#[derive(Clone, Copy)]
struct LabelBox {
    font: FontSpec,
    background: Color,
    foreground: Color,
    padding: f64,
    height: f64,
    baseline: f64,
}

impl LabelBox {
    const fn new(font: FontSpec, background: Color, foreground: Color) -> Self {
        Self {
            font,
            background,
            foreground,
            padding: 4.0,
            height: 18.0,
            baseline: 13.0,
        }
    }

    const fn sized(mut self, padding: f64, height: f64, baseline: f64) -> Self {
        self.padding = padding;
        self.height = height;
        self.baseline = baseline;
        self
    }
}

fn polyline(points: impl IntoIterator<Item = Point>) -> BezPath {
    let mut path = BezPath::new();
    for (i, p) in points.into_iter().enumerate() {
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path
}

fn circle_path(center: Point, radius: f64) -> BezPath {
    Circle::new(center, radius).to_path(0.1)
}

fn hp_color(hp: &HitPoints) -> Color {
    let ratio = hp.ratio();
    if ratio > 0.5 {
        GREEN
    } else if ratio > 0.25 {
        YELLOW
    } else {
        RED
    }
}

impl FrameBuilder<'_> {
    fn fill(&mut self, path: BezPath, color: Color) {
        self.commands.push(DrawCommand::Fill { path, color });
    }

    fn stroke(&mut self, path: BezPath, color: Color, width: f64, dash: Option<&[f64]>) {
        self.commands.push(DrawCommand::Stroke {
            path,
            color,
            width,
            dash: dash.map(<[f64]>::to_vec),
        });
    }

    fn text(&mut self, text: impl Into<String>, origin: Point, style: TextStyle) {
        self.commands.push(DrawCommand::Text {
            text: text.into(),
            origin,
            style,
        });
    }

    /// Text centered on `center_x` over a filled box whose top edge is `top`.
    fn boxed_label(&mut self, text: &str, center_x: f64, top: f64, label: LabelBox) {
        let width = self.measure.width(text, label.font);
        let rect = Rect::new(
            center_x - width / 2.0 - label.padding,
            top,
            center_x + width / 2.0 + label.padding,
            top + label.height,
        );
        self.fill(rect.to_path(0.1), label.background);
        self.text(
            text,
            Point::new(center_x, top + label.baseline),
            TextStyle::new(label.font, label.foreground).centered(),
        );
    }

    fn image(&mut self, entity: &ImageEntity) {
        let transform = Affine::translate(entity.center().to_vec2())
            * Affine::rotate(entity.rotation.to_radians())
            * Affine::scale(entity.scale);
        self.commands.push(DrawCommand::PushTransform(transform));
        self.commands.push(DrawCommand::Image {
            image_ref: entity.image_ref.clone(),
            rect: Rect::from_center_size(Point::ZERO, Size::new(entity.width, entity.height)),
            opacity: 1.0,
        });
        self.commands.push(DrawCommand::PopTransform);
    }

    /// Name above the entity, display name and HP below it.
    fn labels(&mut self, entity: &ImageEntity) {
        let half_height = entity.height * entity.scale / 2.0;

        let mut name = entity.name.clone();
        if entity.locked {
            name.push_str(" 🔒");
        }
        if entity.is_token {
            name.push_str(" 🎭");
        }
        let name_color = if entity.locked { GOLD } else { Color::WHITE };
        self.boxed_label(
            &name,
            entity.x,
            entity.y - half_height - 20.0,
            LabelBox::new(FontSpec::regular(12.0), LABEL_BG, name_color),
        );

        let mut offset = half_height + 5.0;
        let display_name = entity.display_name.trim();
        if !display_name.is_empty() {
            self.boxed_label(
                display_name,
                entity.x,
                entity.y + offset,
                LabelBox::new(FontSpec::bold(14.0), PANEL_BG, Color::WHITE).sized(4.0, 20.0, 15.0),
            );
            offset += 25.0;
        }

        if let Some(hp) = entity.hp.filter(|hp| !hp.is_empty()) {
            self.boxed_label(
                &format!("{}/{}", hp.current, hp.max),
                entity.x,
                entity.y + offset,
                LabelBox::new(FontSpec::regular(12.0), PANEL_BG, hp_color(&hp)),
            );
        }
    }

    fn note_indicator(&mut self, entity: &ImageEntity) {
        let bounds = entity.bounds();
        let center = Point::new(bounds.x1 - 12.0, bounds.y0 + 12.0);
        self.fill(circle_path(center, 12.0), GOLD_TRANSLUCENT);
        self.stroke(circle_path(center, 12.0), Color::WHITE, 2.0, None);
        self.text(
            "📖",
            center,
            TextStyle::new(FontSpec::bold(16.0), Color::BLACK)
                .centered()
                .with_baseline(TextBaseline::Middle),
        );
    }

    /// Word-wrapped note to the right of the selected entity.
    fn note_popup(&mut self, entity: &ImageEntity) {
        let Some(note) = entity.note.as_ref() else {
            return;
        };
        let font = FontSpec::regular(note.size.font_size());
        let width = note.size.width();
        let line_height = font.size * NOTE_LINE_HEIGHT;
        let lines = wrap_text(&note.text, width - NOTE_PADDING * 2.0, font, self.measure);

        let bounds = entity.bounds();
        let origin = Point::new(bounds.x1 + 20.0, bounds.y0);
        let height = lines.len() as f64 * line_height + NOTE_PADDING * 2.0;
        let rect = Rect::from_origin_size(origin, Size::new(width, height));
        self.fill(rect.to_path(0.1), POPUP_BG);
        self.stroke(rect.to_path(0.1), GOLD, 2.0, None);

        let style = TextStyle::new(font, Color::WHITE).with_baseline(TextBaseline::Top);
        for (i, line) in lines.into_iter().enumerate() {
            let at = origin + Vec2::new(NOTE_PADDING, NOTE_PADDING + i as f64 * line_height);
            self.text(line, at, style);
        }
    }

    fn selection_overlay(&mut self, canvas: &Canvas, entity: &ImageEntity, movement: Option<&MovementTrack>) {
        let bounds = entity.bounds();

        if let Some(track) = movement {
            self.stroke(
                polyline([track.start, entity.center()]),
                RED,
                3.0,
                Some(&MOVEMENT_DASH[..]),
            );
            self.fill(circle_path(track.start, 6.0), RED);
            self.stroke(circle_path(track.start, 6.0), Color::WHITE, 2.0, None);
        }

        let offset = canvas.config.handle_offset;
        self.stroke(bounds.inflate(offset, offset).to_path(0.1), GOLD, 2.0, None);

        let size = canvas.config.handle_draw_size;
        for handle in selection::handles(entity, offset) {
            let rect = Rect::from_center_size(handle.position, Size::new(size, size));
            self.fill(rect.to_path(0.1), GOLD);
        }

        if let Some(track) = movement {
            self.boxed_label(
                &format!("{} ft", track.distance_ft),
                entity.x,
                bounds.y0 - 45.0,
                LabelBox::new(FontSpec::bold(16.0), GOLD_TRANSLUCENT, Color::BLACK).sized(6.0, 24.0, 20.0),
            );
        }

        let (hint, hint_color) = if entity.locked {
            (HINT_LOCKED, GOLD)
        } else {
            (HINT_UNLOCKED, Color::WHITE)
        };
        self.boxed_label(
            hint,
            entity.x,
            bounds.y1 + 15.0,
            LabelBox::new(FontSpec::regular(11.0), PANEL_BG, hint_color).sized(4.0, 16.0, 12.0),
        );
    }

    fn annotation(&mut self, stroke: &Annotation, preview: bool) {
        match stroke {
            Annotation::Path(samples) => self.path(samples),
            Annotation::Shape(shape) => self.shape(shape, preview),
        }
    }

    /// Freehand path drawn with its first sample's brush.
    fn path(&mut self, samples: &[PathSample]) {
        let Some(first) = samples.first() else {
            return;
        };
        let color = match first.tool {
            StrokeTool::Eraser => BACKGROUND_COLOR,
            StrokeTool::Pen => first.color.with_opacity(first.opacity),
        };
        self.stroke(polyline(samples.iter().map(PathSample::point)), color, first.size, None);
    }

    fn shape(&mut self, shape: &ShapeAnnotation, preview: bool) {
        let color = shape.color.with_opacity(shape.opacity);
        let dash = preview.then_some(&SHAPE_PREVIEW_DASH[..]);
        let path = match shape.kind {
            ShapeKind::Line | ShapeKind::Ruler => polyline([shape.start, shape.end]),
            ShapeKind::Rect => Rect::from_points(shape.start, shape.end).to_path(0.1),
            ShapeKind::Circle => circle_path(shape.start, shape.start.distance(shape.end)),
        };
        self.stroke(path, color, shape.size, dash);

        if shape.kind == ShapeKind::Ruler {
            let px = shape
                .distance_px
                .unwrap_or_else(|| shape.start.distance(shape.end).round() as i64);
            let ft = shape.distance_ft.as_deref().unwrap_or("?");
            self.ruler_label(shape.start.midpoint(shape.end), &format!("{ft}ft ({px}px)"));
        }
    }

    fn ruler_label(&mut self, mid: Point, text: &str) {
        self.boxed_label(
            text,
            mid.x,
            mid.y - 12.0,
            LabelBox::new(FontSpec::bold(14.0), PANEL_BG, GOLD).sized(5.0, 20.0, 15.0),
        );
    }

    /// Placed ruler points, and a live measurement to the cursor while one
    /// point is down.
    fn ruler_markers(&mut self, canvas: &Canvas) {
        let brush = canvas.tools.brush;
        let points = canvas.tools.ruler_points();
        for &point in points {
            self.fill(circle_path(point, RULER_MARKER_RADIUS), brush.color.into());
            self.stroke(circle_path(point, RULER_MARKER_RADIUS), Color::WHITE, 2.0, None);
        }

        if let ([start], Some(cursor)) = (points, canvas.tools.cursor()) {
            let distance = start.distance(cursor);
            self.stroke(
                polyline([*start, cursor]),
                brush.color.with_opacity(brush.opacity),
                brush.size,
                Some(&SHAPE_PREVIEW_DASH[..]),
            );
            let ft = format_feet(distance, canvas.config.pixels_per_foot);
            let px = distance.round() as i64;
            self.ruler_label(start.midpoint(cursor), &format!("{ft}ft ({px}px)"));
        }
    }

    fn floating_number(&mut self, number: &FloatingNumber) {
        let alpha = number.opacity.clamp(0.0, 1.0) as f32;
        let total = TextStyle::new(FontSpec::bold(32.0), GOLD.multiply_alpha(alpha))
            .centered()
            .with_outline(Color::BLACK.multiply_alpha(alpha), 3.0);
        self.text(number.result.total.to_string(), number.position, total);

        let detail = TextStyle::new(FontSpec::regular(14.0), Color::WHITE.multiply_alpha(alpha)).centered();
        self.text(
            number.result.detail(),
            number.position + Vec2::new(0.0, 20.0),
            detail,
        );
    }

    /// Grid lines over the visible region, snapped to whole cells, plus one
    /// extra cell.
    fn grid(&mut self, canvas: &Canvas) {
        let size = canvas.config.grid_size;
        if size <= 0.0 {
            return;
        }
        let visible = canvas.camera.visible_world_rect(canvas.viewport_size);
        let start_x = (visible.x0 / size).floor() * size;
        let start_y = (visible.y0 / size).floor() * size;
        let end_x = start_x + visible.width() + size;
        let end_y = start_y + visible.height() + size;

        let mut path = BezPath::new();
        let mut x = start_x;
        while x < end_x {
            path.move_to(Point::new(x, start_y));
            path.line_to(Point::new(x, end_y));
            x += size;
        }
        let mut y = start_y;
        while y < end_y {
            path.move_to(Point::new(start_x, y));
            path.line_to(Point::new(end_x, y));
            y += size;
        }
        self.stroke(path, GRID_COLOR, 1.0 / canvas.camera.zoom, None);
    }
}
