//! Headless application shell.
//!
//! Owns an [`Editor`], answers the effects it returns and renders after every
//! event that asked for it.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tabletop_core::config::{ConfigError, EditorConfig};
use tabletop_core::dice::DieRoller;
use tabletop_core::editor::Editor;
use tabletop_core::ingest::DecodedImage;
use tabletop_core::interaction::{CursorHint, Effect, Notice, NoticeLevel};
use tabletop_core::project::ImportError;
use tabletop_core::scene::SerializableColor;
use tabletop_core::storage::{Storage, StorageError};
use tabletop_render::{ApproxTextMeasure, RenderContext, Renderer, RendererError};
use thiserror::Error;

use crate::clipboard::ClipboardSource;
use crate::session::{Session, SessionEvent};
use crate::trace::TraceRenderer;

/// Upper bound on frames spent on one dice animation.
const MAX_ANIMATION_FRAMES: usize = 1000;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Import failed: {0}")]
    Import(#[from] ImportError),
    #[error("Render error: {0}")]
    Render(#[from] RendererError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    pub width: f64,
    pub height: f64,
    pub background_color: SerializableColor,
    /// Where the autosave slot lives. Defaults to the platform data dir.
    pub storage_dir: Option<PathBuf>,
    pub editor: EditorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Tabletop".to_string(),
            width: 1280.0,
            height: 800.0,
            background_color: SerializableColor::rgb(42, 42, 42),
            storage_dir: None,
            editor: EditorConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Main application struct.
pub struct App<S: Storage> {
    config: AppConfig,
    editor: Editor<S>,
    renderer: TraceRenderer,
    measure: ApproxTextMeasure,
    clipboard: Box<dyn ClipboardSource>,
    cursor: CursorHint,
    notices: Vec<Notice>,
    /// Dialog or menu the editor is waiting on.
    dialog: Option<Effect>,
}

impl<S: Storage> App<S> {
    pub fn new(config: AppConfig, storage: Arc<S>, clipboard: Box<dyn ClipboardSource>) -> Self {
        let mut editor = Editor::open(storage, config.editor.clone());
        editor.set_viewport_size(config.width, config.height);
        log::info!(
            "{}: opened with {} images",
            config.title,
            editor.canvas().scene.len()
        );
        Self {
            config,
            editor,
            renderer: TraceRenderer::new(),
            measure: ApproxTextMeasure::default(),
            clipboard,
            cursor: CursorHint::Default,
            notices: Vec::new(),
            dialog: None,
        }
    }

    /// Replace the dice source.
    pub fn with_roller(mut self, roller: Box<dyn DieRoller>) -> Self {
        self.editor = self.editor.with_roller(roller);
        self
    }

    pub fn editor(&self) -> &Editor<S> {
        &self.editor
    }

    pub fn renderer(&self) -> &TraceRenderer {
        &self.renderer
    }

    pub fn cursor(&self) -> CursorHint {
        self.cursor
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn dialog(&self) -> Option<&Effect> {
        self.dialog.as_ref()
    }

    /// Replay every event of a session in order.
    pub fn run(&mut self, session: &Session) -> Result<(), AppError> {
        self.render()?;
        for event in &session.events {
            self.apply(event)?;
        }
        Ok(())
    }

    /// Feed one event to the editor and handle what comes back.
    pub fn apply(&mut self, event: &SessionEvent) -> Result<(), AppError> {
        log::debug!("Session event: {event:?}");
        let effects = match event {
            SessionEvent::Pointer { event } => self.editor.handle_pointer(event),
            SessionEvent::Key { event } => self.editor.handle_key(event),
            SessionEvent::Resize { width, height } => {
                self.editor.set_viewport_size(*width, *height);
                vec![Effect::Redraw]
            }
            SessionEvent::Image {
                image_ref,
                width,
                height,
            } => self
                .editor
                .on_image_decoded(DecodedImage::new(image_ref.clone(), *width, *height)),
            SessionEvent::Rename { text } => self.editor.rename(text),
            SessionEvent::CancelRename => {
                self.editor.cancel_rename();
                vec![Effect::CloseMenus]
            }
            SessionEvent::Note { text, size } => self.editor.set_note(text, *size),
            SessionEvent::Hp { current, max } => self.editor.set_hp(current, max),
            SessionEvent::DisplayName { text } => self.editor.set_display_name(text),
            SessionEvent::Roll { formula } => self.editor.roll(formula),
            SessionEvent::Menu { id, action } => self.editor.menu_action(*id, *action),
            SessionEvent::Select { id } => self.editor.select(*id),
            SessionEvent::Tool { tool } => self.editor.set_tool(*tool),
            SessionEvent::Brush {
                color,
                size,
                opacity,
            } => {
                if let Some(color) = color {
                    self.editor.set_brush_color(*color);
                }
                if let Some(size) = size {
                    self.editor.set_brush_size(*size);
                }
                if let Some(opacity) = opacity {
                    self.editor.set_brush_opacity(*opacity);
                }
                Vec::new()
            }
            SessionEvent::ZoomIn => self.editor.zoom_in(),
            SessionEvent::ZoomOut => self.editor.zoom_out(),
            SessionEvent::ResetView => self.editor.reset_view(),
            SessionEvent::ToggleGrid => self.editor.toggle_grid(),
            SessionEvent::Undo => self.editor.undo_drawing(),
            SessionEvent::ClearDrawings => self.editor.clear_drawings(),
            SessionEvent::ClearScene => self.editor.clear_scene(),
            SessionEvent::Import { path } => self.import(path)?,
            SessionEvent::Export { path } => {
                let json = self.editor.export_project()?;
                std::fs::write(path, json)?;
                log::info!("Exported project to {}", path.display());
                Vec::new()
            }
        };
        self.handle_effects(effects)
    }

    /// A bad project file is reported to the user, not fatal.
    fn import(&mut self, path: &Path) -> Result<Vec<Effect>, AppError> {
        let json = std::fs::read_to_string(path)?;
        match self.editor.import_project(&json) {
            Ok(effects) => {
                log::info!("Imported project from {}", path.display());
                Ok(effects)
            }
            Err(e) => Ok(vec![Effect::Notify(Notice::error(e.to_string()))]),
        }
    }

    fn handle_effects(&mut self, effects: Vec<Effect>) -> Result<(), AppError> {
        let mut queue: VecDeque<Effect> = effects.into();
        let mut redraw = false;

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Redraw => redraw = true,
                Effect::SetCursor(cursor) => {
                    log::trace!("Cursor: {}", cursor.css_name());
                    self.cursor = cursor;
                }
                Effect::CloseMenus => self.dialog = None,
                Effect::ReadOsClipboard => {
                    let image = self.clipboard.read_image();
                    queue.extend(self.editor.on_clipboard_image(image));
                }
                Effect::StartAnimation => {
                    self.animate()?;
                    redraw = true;
                }
                Effect::Notify(notice) => {
                    match notice.level {
                        NoticeLevel::Info => log::info!("{}", notice.message),
                        NoticeLevel::Warning => log::warn!("{}", notice.message),
                        NoticeLevel::Error => log::error!("{}", notice.message),
                    }
                    self.notices.push(notice);
                }
                dialog => {
                    log::info!("Waiting on {dialog:?}");
                    self.dialog = Some(dialog);
                }
            }
        }

        if redraw {
            self.render()?;
        }
        Ok(())
    }

    /// Run the floating-number animation to completion, one frame per tick.
    fn animate(&mut self) -> Result<(), AppError> {
        let mut frames = 0;
        while self.editor.tick() && frames < MAX_ANIMATION_FRAMES {
            self.render()?;
            frames += 1;
        }
        log::debug!("Animation finished after {frames} frames");
        Ok(())
    }

    pub fn render(&mut self) -> Result<(), AppError> {
        let background = self.config.background_color.into();
        let ctx = RenderContext::new(self.editor.canvas())
            .with_controller(self.editor.controller())
            .with_background(background);
        self.renderer.render_frame(&ctx, &self.measure)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::EmptyClipboard;
    use kurbo::Point;
    use tabletop_core::input::{Key, KeyEvent, Modifiers, MouseButton, PointerEvent};
    use tabletop_core::interaction::MenuAction;
    use tabletop_core::storage::MemoryStorage;

    struct Fixed(u32);

    impl DieRoller for Fixed {
        fn roll(&mut self, _sides: u32) -> u32 {
            self.0
        }
    }

    struct OneImage(Option<DecodedImage>);

    impl ClipboardSource for OneImage {
        fn read_image(&mut self) -> Result<DecodedImage, tabletop_core::ingest::ClipboardError> {
            self.0
                .take()
                .ok_or(tabletop_core::ingest::ClipboardError::Empty)
        }
    }

    fn app(storage: &Arc<MemoryStorage>) -> App<MemoryStorage> {
        App::new(AppConfig::default(), Arc::clone(storage), Box::new(EmptyClipboard))
    }

    fn place(app: &mut App<MemoryStorage>, name: &str) {
        app.apply(&SessionEvent::Image {
            image_ref: "goblin.png".to_string(),
            width: 64,
            height: 64,
        })
        .unwrap();
        app.apply(&SessionEvent::Rename {
            text: name.to_string(),
        })
        .unwrap();
    }

    fn ctrl_v() -> SessionEvent {
        SessionEvent::Key {
            event: KeyEvent::Pressed {
                key: Key::Character('v'),
                modifiers: Modifiers {
                    ctrl: true,
                    ..Modifiers::default()
                },
                text_input_focused: false,
            },
        }
    }

    #[test]
    fn test_place_image_prompts_then_renders() {
        let storage = Arc::new(MemoryStorage::new());
        let mut app = app(&storage);
        app.apply(&SessionEvent::Image {
            image_ref: "goblin.png".to_string(),
            width: 64,
            height: 64,
        })
        .unwrap();
        assert!(matches!(app.dialog(), Some(Effect::PromptName { .. })));

        app.apply(&SessionEvent::Rename {
            text: "Goblin".to_string(),
        })
        .unwrap();
        assert_eq!(app.editor().canvas().scene.len(), 1);
        assert_eq!(app.renderer().last_frame().images, 1);
        assert_eq!(storage.load_project("vtt-data").unwrap().images.len(), 1);
    }

    #[test]
    fn test_context_menu_is_tracked() {
        let storage = Arc::new(MemoryStorage::new());
        let mut app = app(&storage);
        place(&mut app, "Goblin");
        let id = app.editor().canvas().scene.selected().unwrap();
        let screen = app
            .editor()
            .canvas()
            .camera
            .world_to_screen(app.editor().canvas().scene.images()[0].center());

        app.apply(&SessionEvent::Pointer {
            event: PointerEvent::Down {
                position: screen,
                button: MouseButton::Right,
                modifiers: Modifiers::default(),
                time_ms: 0,
            },
        })
        .unwrap();
        assert!(matches!(app.dialog(), Some(Effect::OpenContextMenu { id: menu_id, .. }) if *menu_id == id));

        app.apply(&SessionEvent::Menu {
            id,
            action: MenuAction::ToggleLock,
        })
        .unwrap();
        assert!(app.editor().canvas().scene.images()[0].locked);
    }

    #[test]
    fn test_empty_clipboard_notifies() {
        let storage = Arc::new(MemoryStorage::new());
        let mut app = app(&storage);
        app.apply(&ctrl_v()).unwrap();
        assert_eq!(app.notices().len(), 1);
        assert_eq!(app.notices()[0].level, NoticeLevel::Warning);
        assert!(app.editor().canvas().scene.is_empty());
    }

    #[test]
    fn test_clipboard_image_is_placed() {
        let storage = Arc::new(MemoryStorage::new());
        let clipboard = OneImage(Some(DecodedImage::new("clipboard:1", 400, 100)));
        let mut app = App::new(AppConfig::default(), Arc::clone(&storage), Box::new(clipboard));
        app.apply(&ctrl_v()).unwrap();
        assert!(matches!(app.dialog(), Some(Effect::PromptName { .. })));
        app.apply(&SessionEvent::Rename {
            text: String::new(),
        })
        .unwrap();
        let entity = &app.editor().canvas().scene.images()[0];
        assert_eq!(entity.image_ref, "clipboard:1");
        assert!((entity.scale - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roll_runs_animation() {
        let storage = Arc::new(MemoryStorage::new());
        let mut app = app(&storage).with_roller(Box::new(Fixed(4)));
        place(&mut app, "Goblin");
        let before = app.renderer().frames();

        app.apply(&SessionEvent::Roll {
            formula: "2d6+1".to_string(),
        })
        .unwrap();
        assert!(app.renderer().frames() > before + 100);
        assert!(!app.editor().canvas().floating.is_active());
    }

    #[test]
    fn test_bad_import_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "42").unwrap();

        let storage = Arc::new(MemoryStorage::new());
        let mut app = app(&storage);
        place(&mut app, "Goblin");
        app.apply(&SessionEvent::Import { path }).unwrap();
        assert_eq!(app.notices()[0].level, NoticeLevel::Error);
        assert_eq!(app.editor().canvas().scene.len(), 1);
    }

    #[test]
    fn test_export_then_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project.json");

        let storage = Arc::new(MemoryStorage::new());
        let mut app = app(&storage);
        place(&mut app, "Goblin");
        app.apply(&SessionEvent::Export { path: path.clone() }).unwrap();
        app.apply(&SessionEvent::ClearScene).unwrap();
        assert!(app.editor().canvas().scene.is_empty());

        app.apply(&SessionEvent::Import { path }).unwrap();
        assert_eq!(app.editor().canvas().scene.images()[0].name, "Goblin");
    }

    #[test]
    fn test_missing_import_file_is_an_error() {
        let storage = Arc::new(MemoryStorage::new());
        let mut app = app(&storage);
        let err = app
            .apply(&SessionEvent::Import {
                path: PathBuf::from("/nonexistent/project.json"),
            })
            .unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }

    #[test]
    fn test_run_session_with_ruler() {
        let storage = Arc::new(MemoryStorage::new());
        let mut app = app(&storage);
        let down = |x: f64| SessionEvent::Pointer {
            event: PointerEvent::Down {
                position: Point::new(x, 100.0),
                button: MouseButton::Left,
                modifiers: Modifiers::default(),
                time_ms: 0,
            },
        };
        let session = Session {
            events: vec![
                SessionEvent::Tool {
                    tool: tabletop_core::tools::ToolKind::Ruler,
                },
                down(100.0),
                down(150.0),
            ],
        };
        app.run(&session).unwrap();
        assert_eq!(app.editor().canvas().annotations.len(), 1);
        assert!(app.renderer().frames() >= 1);
    }

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let config: AppConfig = serde_json::from_str(r##"{"title": "Crypt", "background_color": "#000000"}"##).unwrap();
        assert_eq!(config.title, "Crypt");
        assert_eq!(config.width, 1280.0);
        assert_eq!(config.background_color, SerializableColor::rgb(0, 0, 0));
        assert_eq!(config.editor, EditorConfig::default());
    }
}
