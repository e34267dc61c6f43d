//! Hit testing and resize handles.
//!
//! Hit testing works on axis-aligned bounds and ignores entity rotation.
//! Handle pick radii are in world units, so handles get harder to pick at
//! high zoom.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

use crate::scene::{EntityId, ImageEntity, MIN_SCALE};

/// Scale change per world unit of pointer travel while resizing.
pub const RESIZE_SENSITIVITY: f64 = 0.003;

/// One of the 8 resize handles around a selected entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
    North,
    South,
    West,
    East,
}

impl HandleKind {
    pub const ALL: [HandleKind; 8] = [
        HandleKind::NorthWest,
        HandleKind::NorthEast,
        HandleKind::SouthWest,
        HandleKind::SouthEast,
        HandleKind::North,
        HandleKind::South,
        HandleKind::West,
        HandleKind::East,
    ];

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            HandleKind::NorthWest | HandleKind::NorthEast | HandleKind::SouthWest | HandleKind::SouthEast
        )
    }

    /// Compass abbreviation, also used to build resize cursor names.
    pub fn short_name(self) -> &'static str {
        match self {
            HandleKind::NorthWest => "nw",
            HandleKind::NorthEast => "ne",
            HandleKind::SouthWest => "sw",
            HandleKind::SouthEast => "se",
            HandleKind::North => "n",
            HandleKind::South => "s",
            HandleKind::West => "w",
            HandleKind::East => "e",
        }
    }
}

/// A resize handle with its position and type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Position in world coordinates.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    fn distance_to(&self, point: Point) -> f64 {
        self.position.distance(point)
    }
}

/// Inclusive bounds test. Rotation is ignored.
pub fn point_in_entity(point: Point, entity: &ImageEntity) -> bool {
    let bounds = entity.bounds();
    point.x >= bounds.x0 && point.x <= bounds.x1 && point.y >= bounds.y0 && point.y <= bounds.y1
}

/// Topmost entity containing `point`.
///
/// With `respect_lock`, locked entities are skipped so that whatever lies
/// beneath them can be picked. Without it, locked entities are hit like any
/// other (context menus use this).
pub fn top_hit_at(point: Point, entities: &[ImageEntity], respect_lock: bool) -> Option<EntityId> {
    entities
        .iter()
        .rev()
        .filter(|e| !(respect_lock && e.locked))
        .find(|e| point_in_entity(point, e))
        .map(|e| e.id)
}

/// Whether any entity above `id` in z-order contains `point`.
/// Locked entities occlude like any other.
pub fn is_occluded(point: Point, entities: &[ImageEntity], id: EntityId) -> bool {
    match entities.iter().position(|e| e.id == id) {
        Some(index) => entities[index + 1..]
            .iter()
            .any(|e| point_in_entity(point, e)),
        None => false,
    }
}

/// The 8 handles of an entity, pushed `offset` outside its bounds.
pub fn handles(entity: &ImageEntity, offset: f64) -> [Handle; 8] {
    handles_for_bounds(entity.bounds().inflate(offset, offset))
}

fn handles_for_bounds(r: Rect) -> [Handle; 8] {
    let mid_x = (r.x0 + r.x1) / 2.0;
    let mid_y = (r.y0 + r.y1) / 2.0;
    [
        Handle::new(Point::new(r.x0, r.y0), HandleKind::NorthWest),
        Handle::new(Point::new(r.x1, r.y0), HandleKind::NorthEast),
        Handle::new(Point::new(r.x0, r.y1), HandleKind::SouthWest),
        Handle::new(Point::new(r.x1, r.y1), HandleKind::SouthEast),
        Handle::new(Point::new(mid_x, r.y0), HandleKind::North),
        Handle::new(Point::new(mid_x, r.y1), HandleKind::South),
        Handle::new(Point::new(r.x0, mid_y), HandleKind::West),
        Handle::new(Point::new(r.x1, mid_y), HandleKind::East),
    ]
}

/// Closest handle strictly within `radius` of `point`.
pub fn resize_handle_at(
    point: Point,
    entity: &ImageEntity,
    offset: f64,
    radius: f64,
) -> Option<HandleKind> {
    handles(entity, offset)
        .iter()
        .map(|h| (h.kind, h.distance_to(point)))
        .filter(|(_, d)| *d < radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(kind, _)| kind)
}

/// Handle of the selected entity that a press at `point` would grab.
///
/// Requires the selection to exist and be unlocked, and the point to not be
/// covered by anything stacked above it.
pub fn actionable_handle_at(
    point: Point,
    entities: &[ImageEntity],
    selected: Option<EntityId>,
    offset: f64,
    radius: f64,
) -> Option<HandleKind> {
    let id = selected?;
    let entity = entities.iter().find(|e| e.id == id)?;
    if entity.locked {
        return None;
    }
    let kind = resize_handle_at(point, entity, offset, radius)?;
    if is_occluded(point, entities, id) {
        return None;
    }
    Some(kind)
}

/// Entity state captured when a resize starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeSnapshot {
    pub center: Point,
    pub scale: f64,
    pub rotation: f64,
    /// Pointer position in world space at press time.
    pub start_pointer: Point,
}

impl ResizeSnapshot {
    pub fn capture(entity: &ImageEntity, start_pointer: Point) -> Self {
        Self {
            center: entity.center(),
            scale: entity.scale,
            rotation: entity.rotation,
            start_pointer,
        }
    }
}

/// Scale resulting from dragging `handle` from the snapshot's start pointer
/// to `current`. Corners scale with travel distance, edges with travel along
/// their axis. Never below the scale floor.
pub fn resized_scale(snapshot: &ResizeSnapshot, handle: HandleKind, current: Point) -> f64 {
    let dx = current.x - snapshot.start_pointer.x;
    let dy = current.y - snapshot.start_pointer.y;
    let travel = match handle {
        HandleKind::SouthEast | HandleKind::NorthEast => dx.hypot(dy),
        HandleKind::NorthWest | HandleKind::SouthWest => -dx.hypot(dy),
        HandleKind::East => dx,
        HandleKind::West => -dx,
        HandleKind::South => dy,
        HandleKind::North => -dy,
    };
    (snapshot.scale * (1.0 + travel * RESIZE_SENSITIVITY)).max(MIN_SCALE)
}
