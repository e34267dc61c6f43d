//! Canvas state: everything one tabletop session owns.

use kurbo::{Point, Size, Vec2};

use crate::annotations::{Annotation, AnnotationLayer};
use crate::camera::Camera;
use crate::config::EditorConfig;
use crate::dice::{self, DiceError, DieRoller, FloatAnimation, FloatingNumbers, RollResult};
use crate::ingest::{self, DecodedImage};
use crate::project::ProjectData;
use crate::scene::{EntityId, HitPoints, ImageEntity, Note, NoteSize, Scene};
use crate::tools::{BrushSettings, ToolKind, ToolManager};

/// Name given to an image when renaming with empty text.
pub const FALLBACK_IMAGE_NAME: &str = "Image";

/// Application state for one canvas.
///
/// Mutating methods mark the canvas dirty; whoever owns it persists the
/// project once the current event has been handled.
#[derive(Debug, Clone)]
pub struct Canvas {
    pub config: EditorConfig,
    pub scene: Scene,
    pub annotations: AnnotationLayer,
    pub camera: Camera,
    pub tools: ToolManager,
    pub floating: FloatingNumbers,
    pub show_grid: bool,
    /// Viewport size in screen pixels.
    pub viewport_size: Size,
    dirty: bool,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Canvas {
    /// Create an empty canvas.
    pub fn new(config: EditorConfig) -> Self {
        Self {
            scene: Scene::new(),
            annotations: AnnotationLayer::new(config.history_limit),
            camera: Camera::with_limits(config.min_zoom, config.max_zoom),
            tools: ToolManager::new(BrushSettings::from(&config.brush)),
            floating: FloatingNumbers::new(FloatAnimation {
                lifetime_ms: config.float_lifetime_ms,
                tick_ms: config.float_tick_ms,
                drift: config.float_drift,
            }),
            show_grid: true,
            viewport_size: Size::new(800.0, 600.0),
            dirty: false,
            config,
        }
    }

    /// Create a canvas holding a loaded project.
    pub fn with_project(config: EditorConfig, project: ProjectData) -> Self {
        let mut canvas = Self::new(config);
        canvas.scene = Scene::from_images(project.images);
        canvas.annotations.replace(project.drawings);
        canvas
    }

    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport_size = Size::new(width, height);
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Return and reset the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Snapshot of the persisted content.
    pub fn project(&self) -> ProjectData {
        ProjectData::new(
            self.scene.images().to_vec(),
            self.annotations.strokes().to_vec(),
        )
    }

    /// Replace images and drawings with a loaded project.
    pub fn load_project(&mut self, project: ProjectData) {
        log::info!(
            "Loaded project: {} images, {} drawings",
            project.images.len(),
            project.drawings.len()
        );
        self.scene = Scene::from_images(project.images);
        self.annotations.replace(project.drawings);
        self.mark_dirty();
    }

    /// World point at the middle of the viewport.
    pub fn viewport_center_world(&self) -> Point {
        self.camera.screen_to_world(Point::new(
            self.viewport_size.width / 2.0,
            self.viewport_size.height / 2.0,
        ))
    }

    /// Place a decoded image centered in the viewport, scaled down to fit.
    pub fn place_image(&mut self, image: &DecodedImage, name: &str) -> EntityId {
        let name = if name.trim().is_empty() {
            self.scene.next_default_name()
        } else {
            name.trim().to_string()
        };
        let scale = ingest::fit_scale(image.width, image.height, self.config.max_placed_size);
        let entity = ImageEntity::new(
            self.scene.fresh_id(),
            name,
            image.image_ref.clone(),
            Size::new(image.width as f64, image.height as f64),
            self.viewport_center_world(),
            scale,
        );
        let id = self.scene.add(entity);
        self.mark_dirty();
        id
    }

    /// Add a copy of `source` next to it, unlocked, under `name`.
    pub fn paste(&mut self, source: &ImageEntity, name: &str) -> EntityId {
        let offset = Vec2::new(self.config.duplicate_offset, self.config.duplicate_offset);
        let mut copy = source.duplicate_as(self.scene.fresh_id(), offset);
        if !name.trim().is_empty() {
            copy.name = name.trim().to_string();
        }
        let id = self.scene.add(copy);
        self.mark_dirty();
        id
    }

    /// Duplicate an entity in place. The copy keeps every visual field.
    pub fn duplicate(&mut self, id: EntityId) -> Option<EntityId> {
        let offset = Vec2::new(self.config.duplicate_offset, self.config.duplicate_offset);
        let new_id = self.scene.duplicate(id, offset)?;
        self.mark_dirty();
        Some(new_id)
    }

    pub fn delete(&mut self, id: EntityId) -> Option<ImageEntity> {
        let removed = self.scene.remove(id)?;
        self.mark_dirty();
        Some(removed)
    }

    pub fn delete_selected(&mut self) -> Option<ImageEntity> {
        let id = self.scene.selected()?;
        self.delete(id)
    }

    pub fn bring_to_front(&mut self, id: EntityId) -> bool {
        let moved = self.scene.bring_to_front(id);
        if moved {
            self.mark_dirty();
        }
        moved
    }

    pub fn send_to_back(&mut self, id: EntityId) -> bool {
        let moved = self.scene.send_to_back(id);
        if moved {
            self.mark_dirty();
        }
        moved
    }

    pub fn toggle_lock(&mut self, id: EntityId) -> Option<bool> {
        let locked = self.scene.toggle_lock(id)?;
        self.mark_dirty();
        Some(locked)
    }

    pub fn toggle_token(&mut self, id: EntityId) -> Option<bool> {
        let token = self.scene.toggle_token(id)?;
        self.mark_dirty();
        Some(token)
    }

    pub fn select(&mut self, id: EntityId) -> bool {
        self.scene.select(id)
    }

    pub fn deselect(&mut self) {
        self.scene.deselect();
    }

    /// Remove every image. Drawings stay.
    pub fn clear_scene(&mut self) {
        self.scene.clear();
        self.mark_dirty();
    }

    /// Rename the selected entity. Empty text falls back to a generic name.
    pub fn rename_selected(&mut self, name: &str) -> bool {
        let Some(entity) = self.scene.selected_entity_mut() else {
            return false;
        };
        let name = name.trim();
        entity.name = if name.is_empty() {
            FALLBACK_IMAGE_NAME.to_string()
        } else {
            name.to_string()
        };
        self.mark_dirty();
        true
    }

    /// Set or, with blank text, remove the selected entity's note.
    pub fn set_note(&mut self, text: &str, size: NoteSize) -> bool {
        let Some(entity) = self.scene.selected_entity_mut() else {
            return false;
        };
        let text = text.trim();
        entity.note = (!text.is_empty()).then(|| Note {
            text: text.to_string(),
            size,
        });
        self.mark_dirty();
        true
    }

    /// Set the selected entity's hit points from user-entered text.
    pub fn set_hp(&mut self, current: &str, max: &str) -> bool {
        let Some(entity) = self.scene.selected_entity_mut() else {
            return false;
        };
        entity.hp = Some(HitPoints::parse(current, max));
        self.mark_dirty();
        true
    }

    /// Set the selected entity's display name; blank text clears it.
    pub fn set_display_name(&mut self, text: &str) -> bool {
        let Some(entity) = self.scene.selected_entity_mut() else {
            return false;
        };
        entity.display_name = text.trim().to_string();
        self.mark_dirty();
        true
    }

    /// Move an unlocked entity so its center sits at `center`.
    pub fn move_entity(&mut self, id: EntityId, center: Point) -> bool {
        match self.scene.get_mut(id) {
            Some(entity) if !entity.locked => {
                entity.set_center(center);
                self.mark_dirty();
                true
            }
            _ => false,
        }
    }

    /// Set an unlocked entity's scale, floored at the minimum scale.
    pub fn set_entity_scale(&mut self, id: EntityId, scale: f64) -> bool {
        match self.scene.get_mut(id) {
            Some(entity) if !entity.locked => {
                entity.scale = scale.max(crate::scene::MIN_SCALE);
                self.mark_dirty();
                true
            }
            _ => false,
        }
    }

    /// Wheel rotation of the selected entity, in degrees.
    pub fn rotate_selected(&mut self, degrees: f64) -> bool {
        match self.scene.selected_entity_mut() {
            Some(entity) if !entity.locked => {
                entity.rotation += degrees;
                self.mark_dirty();
                true
            }
            _ => false,
        }
    }

    /// Wheel scaling of the selected entity, floored at the minimum scale.
    pub fn scale_selected(&mut self, delta: f64) -> bool {
        match self.scene.selected_entity_mut() {
            Some(entity) if !entity.locked => {
                entity.scale = (entity.scale + delta).max(crate::scene::MIN_SCALE);
                self.mark_dirty();
                true
            }
            _ => false,
        }
    }

    /// Commit a finished stroke to the annotation layer.
    pub fn commit_stroke(&mut self, stroke: Annotation) -> bool {
        let committed = self.annotations.commit(stroke);
        if committed {
            log::debug!("Committed stroke #{}", self.annotations.len());
            self.mark_dirty();
        }
        committed
    }

    pub fn undo_drawing(&mut self) -> bool {
        let undone = self.annotations.undo();
        if undone {
            self.mark_dirty();
        }
        undone
    }

    pub fn clear_drawings(&mut self) {
        self.annotations.clear();
        self.mark_dirty();
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tools.set_tool(tool);
    }

    pub fn set_brush_color(&mut self, color: crate::scene::SerializableColor) {
        self.tools.brush.color = color;
    }

    pub fn set_brush_size(&mut self, size: f64) {
        self.tools.brush.size = size.max(1.0);
    }

    /// Opacity in [0, 1].
    pub fn set_brush_opacity(&mut self, opacity: f64) {
        self.tools.brush.opacity = opacity.clamp(0.0, 1.0);
    }

    /// Roll `formula` for the selected entity and float the result above it.
    /// Does nothing when nothing is selected.
    pub fn roll(
        &mut self,
        formula: &str,
        roller: &mut dyn DieRoller,
    ) -> Result<Option<RollResult>, DiceError> {
        let result = dice::roll_formula(formula, roller)?;
        let Some(anchor) = self.scene.selected_entity() else {
            return Ok(None);
        };
        self.floating.spawn(anchor, result.clone());
        Ok(Some(result))
    }

    /// Advance floating numbers one frame. Returns whether more frames are
    /// needed.
    pub fn tick_animation(&mut self) -> bool {
        self.floating.tick()
    }

    pub fn toggle_grid(&mut self) -> bool {
        self.show_grid = !self.show_grid;
        self.show_grid
    }

    pub fn zoom_in(&mut self) {
        self.camera.zoom_in(self.viewport_size);
    }

    pub fn zoom_out(&mut self) {
        self.camera.zoom_out(self.viewport_size);
    }

    pub fn reset_view(&mut self) {
        self.camera.reset();
    }

    /// Images whose name contains `term`, ignoring case.
    pub fn search_assets(&self, term: &str) -> Vec<&ImageEntity> {
        let term = term.to_lowercase();
        self.scene
            .images()
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&term))
            .collect()
    }
}
