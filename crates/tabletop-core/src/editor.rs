//! The editor: canvas state, the interaction controller and autosave.
//!
//! Every entry point handles one event completely, then writes the project
//! back to storage if anything changed, before the shell renders again.

use std::sync::Arc;

use crate::canvas::Canvas;
use crate::config::EditorConfig;
use crate::dice::{DieRoller, ThreadRoller};
use crate::ingest::{ClipboardError, DecodedImage};
use crate::input::{KeyEvent, PointerEvent};
use crate::interaction::{Effect, InteractionController, MenuAction, Notice};
use crate::project::{ImportError, ProjectData};
use crate::scene::{EntityId, NoteSize, SerializableColor};
use crate::storage::{AutoSaveManager, Storage};
use crate::tools::ToolKind;

pub struct Editor<S: Storage> {
    canvas: Canvas,
    controller: InteractionController,
    autosave: AutoSaveManager<S>,
    roller: Box<dyn DieRoller>,
}

impl<S: Storage> Editor<S> {
    /// Open the editor, restoring the project saved under the configured key.
    pub fn open(storage: Arc<S>, config: EditorConfig) -> Self {
        let mut autosave = AutoSaveManager::new(storage, config.storage_key.clone());
        let project = autosave.load_or_default();
        Self {
            canvas: Canvas::with_project(config, project),
            controller: InteractionController::new(),
            autosave,
            roller: Box::new(ThreadRoller),
        }
    }

    /// Replace the dice source.
    pub fn with_roller(mut self, roller: Box<dyn DieRoller>) -> Self {
        self.roller = roller;
        self
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn autosave(&self) -> &AutoSaveManager<S> {
        &self.autosave
    }

    /// Write the project if the last event changed it. A failed write is
    /// reported but leaves the session running.
    fn persist(&mut self, mut effects: Vec<Effect>) -> Vec<Effect> {
        if !self.canvas.take_dirty() {
            return effects;
        }
        self.autosave.mark_dirty();
        if let Err(e) = self.autosave.flush(&self.canvas.project()) {
            log::error!("Failed to save project: {e}");
            effects.push(Effect::Notify(Notice::error(format!("Could not save: {e}"))));
        }
        effects
    }

    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.canvas.set_viewport_size(width, height);
    }

    pub fn handle_pointer(&mut self, event: &PointerEvent) -> Vec<Effect> {
        let effects = self.controller.handle_pointer(&mut self.canvas, event);
        self.persist(effects)
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> Vec<Effect> {
        let effects = self.controller.handle_key(&mut self.canvas, event);
        self.persist(effects)
    }

    pub fn set_tool(&mut self, tool: ToolKind) -> Vec<Effect> {
        self.controller.set_tool(&mut self.canvas, tool)
    }

    pub fn on_image_decoded(&mut self, image: DecodedImage) -> Vec<Effect> {
        self.controller.on_image_decoded(&self.canvas, image)
    }

    pub fn on_clipboard_image(&mut self, image: Result<DecodedImage, ClipboardError>) -> Vec<Effect> {
        self.controller.on_clipboard_image(&self.canvas, image)
    }

    pub fn rename(&mut self, text: &str) -> Vec<Effect> {
        let effects = self.controller.rename(&mut self.canvas, text);
        self.persist(effects)
    }

    pub fn cancel_rename(&mut self) {
        self.controller.cancel_rename();
    }

    pub fn set_note(&mut self, text: &str, size: NoteSize) -> Vec<Effect> {
        let changed = self.canvas.set_note(text, size);
        self.persist(redraw_if(changed))
    }

    pub fn set_hp(&mut self, current: &str, max: &str) -> Vec<Effect> {
        let changed = self.canvas.set_hp(current, max);
        self.persist(redraw_if(changed))
    }

    pub fn set_display_name(&mut self, text: &str) -> Vec<Effect> {
        let changed = self.canvas.set_display_name(text);
        self.persist(redraw_if(changed))
    }

    /// Roll for the selected entity.
    pub fn roll(&mut self, formula: &str) -> Vec<Effect> {
        self.controller.roll(&mut self.canvas, formula, self.roller.as_mut())
    }

    pub fn menu_action(&mut self, id: EntityId, action: MenuAction) -> Vec<Effect> {
        let effects = self.controller.menu_action(&mut self.canvas, id, action);
        self.persist(effects)
    }

    /// Select from the asset panel.
    pub fn select(&mut self, id: EntityId) -> Vec<Effect> {
        redraw_if(self.canvas.select(id))
    }

    pub fn clear_scene(&mut self) -> Vec<Effect> {
        self.canvas.clear_scene();
        self.persist(vec![Effect::Redraw])
    }

    pub fn clear_drawings(&mut self) -> Vec<Effect> {
        self.canvas.clear_drawings();
        self.persist(vec![Effect::Redraw])
    }

    pub fn undo_drawing(&mut self) -> Vec<Effect> {
        let undone = self.canvas.undo_drawing();
        self.persist(redraw_if(undone))
    }

    pub fn set_brush_color(&mut self, color: SerializableColor) {
        self.canvas.set_brush_color(color);
    }

    pub fn set_brush_size(&mut self, size: f64) {
        self.canvas.set_brush_size(size);
    }

    pub fn set_brush_opacity(&mut self, opacity: f64) {
        self.canvas.set_brush_opacity(opacity);
    }

    pub fn toggle_grid(&mut self) -> Vec<Effect> {
        self.canvas.toggle_grid();
        vec![Effect::Redraw]
    }

    pub fn zoom_in(&mut self) -> Vec<Effect> {
        self.canvas.zoom_in();
        vec![Effect::Redraw]
    }

    pub fn zoom_out(&mut self) -> Vec<Effect> {
        self.canvas.zoom_out();
        vec![Effect::Redraw]
    }

    pub fn reset_view(&mut self) -> Vec<Effect> {
        self.canvas.reset_view();
        vec![Effect::Redraw]
    }

    /// Advance the floating-number animation by one frame. Returns whether
    /// another frame is needed.
    pub fn tick(&mut self) -> bool {
        self.canvas.tick_animation()
    }

    /// Load a project file. On failure the current scene is left untouched.
    pub fn import_project(&mut self, json: &str) -> Result<Vec<Effect>, ImportError> {
        let project = ProjectData::import(json).inspect_err(|e| {
            log::warn!("Project import failed: {e}");
        })?;
        self.canvas.load_project(project);
        Ok(self.persist(vec![Effect::CloseMenus, Effect::Redraw]))
    }

    /// Serialize the current project for download.
    pub fn export_project(&self) -> Result<String, serde_json::Error> {
        self.canvas.project().to_json_pretty()
    }
}

fn redraw_if(changed: bool) -> Vec<Effect> {
    if changed {
        vec![Effect::Redraw]
    } else {
        Vec::new()
    }
}
