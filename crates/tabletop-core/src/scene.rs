//! Scene model: placed image entities, their z-order and the selection.

#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};
#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};

use kurbo::{Point, Rect, Size, Vec2};
use peniko::Color;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Unique identifier for a placed entity.
///
/// Derived from wall-clock milliseconds so that ids stay compatible with
/// saved projects, and bumped past the largest id already in the scene.
pub type EntityId = u64;

/// RGBA8 color stored as a CSS hex string (`#rrggbb` or `#rrggbbaa`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Format as `#rrggbb`, appending alpha only when not opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn parse_hex(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#')?;
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (slot, c) in out.iter_mut().zip(hex.chars()) {
                    let v = c.to_digit(16)? as u8;
                    *slot = v * 17;
                }
                Some(Self::rgb(out[0], out[1], out[2]))
            }
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    /// Same color with its alpha multiplied by `opacity` in [0, 1].
    pub fn with_opacity(self, opacity: f64) -> Color {
        let a = (self.a as f64 * opacity.clamp(0.0, 1.0)).round() as u8;
        Color::from_rgba8(self.r, self.g, self.b, a)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

impl Serialize for SerializableColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SerializableColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color '{s}'")))
    }
}

/// Hit points shown under a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HitPoints {
    pub current: u32,
    pub max: u32,
}

impl HitPoints {
    /// Build from signed values; negatives become zero.
    pub fn new(current: i64, max: i64) -> Self {
        let clamp = |v: i64| v.clamp(0, u32::MAX as i64) as u32;
        Self {
            current: clamp(current),
            max: clamp(max),
        }
    }

    /// Parse user-entered text. Leading integers are honored and anything
    /// unparsable counts as zero.
    pub fn parse(current: &str, max: &str) -> Self {
        Self::new(parse_leading_int(current), parse_leading_int(max))
    }

    /// The all-zero tuple means "no HP to show".
    pub fn is_empty(&self) -> bool {
        self.current == 0 && self.max == 0
    }

    /// current / max, or 0 when max is 0.
    pub fn ratio(&self) -> f64 {
        if self.max == 0 {
            0.0
        } else {
            self.current as f64 / self.max as f64
        }
    }
}

fn parse_leading_int(s: &str) -> i64 {
    let s = s.trim();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map(|v| v * sign).unwrap_or(0)
}

/// Note popup size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl NoteSize {
    /// Popup width in world units.
    pub fn width(self) -> f64 {
        match self {
            NoteSize::Small => 150.0,
            NoteSize::Medium => 200.0,
            NoteSize::Large => 300.0,
        }
    }

    pub fn font_size(self) -> f64 {
        match self {
            NoteSize::Small => 10.0,
            NoteSize::Medium => 12.0,
            NoteSize::Large => 14.0,
        }
    }
}

/// Free text attached to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub text: String,
    #[serde(default)]
    pub size: NoteSize,
}

/// A placed image (token or prop).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEntity {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    /// World-space center.
    pub x: f64,
    pub y: f64,
    /// Intrinsic pixel size.
    pub width: f64,
    pub height: f64,
    pub scale: f64,
    /// Degrees.
    #[serde(default)]
    pub rotation: f64,
    #[serde(rename = "imgSrc")]
    pub image_ref: String,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub is_token: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<HitPoints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<Note>,
}

/// Scale floor for wheel and handle resizing.
pub const MIN_SCALE: f64 = 0.1;

impl ImageEntity {
    /// Create an unlocked, unrotated entity centered at `center`.
    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        image_ref: impl Into<String>,
        size: Size,
        center: Point,
        scale: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            display_name: String::new(),
            x: center.x,
            y: center.y,
            width: size.width,
            height: size.height,
            scale,
            rotation: 0.0,
            image_ref: image_ref.into(),
            locked: false,
            is_token: false,
            hp: None,
            note: None,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_center(&mut self, center: Point) {
        self.x = center.x;
        self.y = center.y;
    }

    /// Size after scaling.
    pub fn scaled_size(&self) -> Size {
        Size::new(self.width * self.scale, self.height * self.scale)
    }

    /// Axis-aligned bounds. Rotation is not taken into account.
    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.center(), self.scaled_size())
    }

    /// Copy with a new id, moved by `offset` and always unlocked.
    pub fn duplicate_as(&self, id: EntityId, offset: Vec2) -> Self {
        let mut copy = self.clone();
        copy.id = id;
        copy.x += offset.x;
        copy.y += offset.y;
        copy.locked = false;
        copy
    }

    /// Note text, when a non-empty note exists.
    pub fn note_text(&self) -> Option<&str> {
        self.note
            .as_ref()
            .map(|n| n.text.as_str())
            .filter(|t| !t.is_empty())
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Ordered entity list. List order is z-order; the last entity is topmost.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    images: Vec<ImageEntity>,
    selected: Option<EntityId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene from loaded entities, with nothing selected.
    pub fn from_images(images: Vec<ImageEntity>) -> Self {
        Self {
            images,
            selected: None,
        }
    }

    /// Entities bottom to top.
    pub fn images(&self) -> &[ImageEntity] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Option<&ImageEntity> {
        self.images.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut ImageEntity> {
        self.images.iter_mut().find(|e| e.id == id)
    }

    /// Z-index of an entity (0 = bottom).
    pub fn index_of(&self, id: EntityId) -> Option<usize> {
        self.images.iter().position(|e| e.id == id)
    }

    /// A fresh id: current milliseconds, or one past the largest id in use.
    pub fn fresh_id(&self) -> EntityId {
        let max_existing = self.images.iter().map(|e| e.id).max();
        match max_existing {
            Some(max) => now_millis().max(max + 1),
            None => now_millis(),
        }
    }

    /// Default name for the next added image.
    pub fn next_default_name(&self) -> String {
        format!("Image {}", self.images.len() + 1)
    }

    /// Append an entity on top and select it.
    pub fn add(&mut self, entity: ImageEntity) -> EntityId {
        let id = entity.id;
        self.images.push(entity);
        self.selected = Some(id);
        id
    }

    /// Remove an entity. Clears the selection only if it pointed at `id`.
    pub fn remove(&mut self, id: EntityId) -> Option<ImageEntity> {
        let index = self.index_of(id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Some(self.images.remove(index))
    }

    /// Move an entity to the top of the z-order.
    pub fn bring_to_front(&mut self, id: EntityId) -> bool {
        match self.index_of(id) {
            Some(index) => {
                let entity = self.images.remove(index);
                self.images.push(entity);
                true
            }
            None => false,
        }
    }

    /// Move an entity to the bottom of the z-order.
    pub fn send_to_back(&mut self, id: EntityId) -> bool {
        match self.index_of(id) {
            Some(index) => {
                let entity = self.images.remove(index);
                self.images.insert(0, entity);
                true
            }
            None => false,
        }
    }

    /// Deep-copy `id` with a fresh id, offset position and `locked = false`.
    /// The copy is added on top and selected.
    pub fn duplicate(&mut self, id: EntityId, offset: Vec2) -> Option<EntityId> {
        let new_id = self.fresh_id();
        let copy = self.get(id)?.duplicate_as(new_id, offset);
        Some(self.add(copy))
    }

    /// Remove every entity and the selection.
    pub fn clear(&mut self) {
        self.images.clear();
        self.selected = None;
    }

    pub fn selected(&self) -> Option<EntityId> {
        self.selected
    }

    pub fn selected_entity(&self) -> Option<&ImageEntity> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn selected_entity_mut(&mut self) -> Option<&mut ImageEntity> {
        let id = self.selected?;
        self.get_mut(id)
    }

    /// Select an existing entity. Unknown ids are ignored.
    pub fn select(&mut self, id: EntityId) -> bool {
        if self.get(id).is_some() {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn is_selected(&self, id: EntityId) -> bool {
        self.selected == Some(id)
    }

    /// Flip the lock flag, returning the new value.
    pub fn toggle_lock(&mut self, id: EntityId) -> Option<bool> {
        let entity = self.get_mut(id)?;
        entity.locked = !entity.locked;
        Some(entity.locked)
    }

    /// Flip the token flag, returning the new value.
    pub fn toggle_token(&mut self, id: EntityId) -> Option<bool> {
        let entity = self.get_mut(id)?;
        entity.is_token = !entity.is_token;
        Some(entity.is_token)
    }
}
