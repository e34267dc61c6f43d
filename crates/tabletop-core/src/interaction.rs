//! Pointer and keyboard interaction.
//!
//! [`InteractionController`] turns input events into canvas mutations. It
//! never talks to a UI toolkit directly: anything the shell has to do (open a
//! dialog, change the cursor, read the OS clipboard) comes back as an
//! [`Effect`].

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

use crate::annotations::{Annotation, format_feet};
use crate::canvas::Canvas;
use crate::dice::{DEFAULT_FORMULA, DieRoller};
use crate::ingest::{ClipboardError, DecodedImage};
use crate::input::{ClickTracker, Key, KeyEvent, Modifiers, MouseButton, PointerEvent};
use crate::scene::{EntityId, HitPoints, ImageEntity, NoteSize};
use crate::selection::{self, HandleKind, ResizeSnapshot};
use crate::tools::ToolKind;

/// Degrees per wheel notch with Ctrl held.
pub const WHEEL_ROTATE_STEP: f64 = 5.0;
/// Scale change per wheel notch with Shift held.
pub const WHEEL_SCALE_STEP: f64 = 0.05;
/// Viewport zoom factor per wheel notch towards the user.
pub const WHEEL_ZOOM_OUT: f64 = 0.9;
/// Viewport zoom factor per wheel notch away from the user.
pub const WHEEL_ZOOM_IN: f64 = 1.1;

/// Current gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Panning {
        last_screen: Point,
    },
    /// Moving an entity. `offset` is the press point relative to its center.
    Dragging {
        id: EntityId,
        offset: Vec2,
    },
    Resizing {
        id: EntityId,
        handle: HandleKind,
        snapshot: ResizeSnapshot,
    },
    /// A pen, eraser or shape stroke is in progress.
    Drawing,
    /// One ruler point is placed; the next click completes the measurement.
    RulerPending,
}

/// Cursor the shell should show over the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorHint {
    #[default]
    Default,
    Grab,
    Grabbing,
    Crosshair,
    Move,
    Resize(HandleKind),
}

impl CursorHint {
    /// CSS cursor name.
    pub fn css_name(self) -> String {
        match self {
            CursorHint::Default => "default".to_string(),
            CursorHint::Grab => "grab".to_string(),
            CursorHint::Grabbing => "grabbing".to_string(),
            CursorHint::Crosshair => "crosshair".to_string(),
            CursorHint::Move => "move".to_string(),
            CursorHint::Resize(kind) => format!("{}-resize", kind.short_name()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Work handed back to the shell after an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Redraw,
    SetCursor(CursorHint),
    /// Ask for a name. Answered with `rename` or `cancel_rename`.
    PromptName { default_name: String },
    OpenNoteEditor { id: EntityId, text: String, size: NoteSize },
    OpenHpEditor { id: EntityId, hp: HitPoints },
    OpenDisplayNameEditor { id: EntityId, text: String },
    OpenRollDialog { id: EntityId, formula: String },
    OpenContextMenu {
        id: EntityId,
        screen: Point,
        locked: bool,
        is_token: bool,
    },
    CloseMenus,
    /// Read an image from the OS clipboard and answer with
    /// `on_clipboard_image`.
    ReadOsClipboard,
    /// Floating numbers are alive; keep calling `tick` every frame.
    StartAnimation,
    Notify(Notice),
}

/// Context menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuAction {
    Rename,
    EditNote,
    SetHp,
    SetDisplayName,
    RollDice,
    Duplicate,
    ToggleLock,
    ToggleToken,
    BringToFront,
    SendToBack,
    Delete,
}

/// Distance travelled by a token during the current drag.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementTrack {
    pub id: EntityId,
    /// Center of the token when the drag started.
    pub start: Point,
    pub distance_px: f64,
    pub distance_ft: String,
}

/// An addition waiting for the user to pick a name.
#[derive(Debug, Clone, PartialEq)]
enum PendingAction {
    NewImage(DecodedImage),
    Duplicate(EntityId),
    Paste(ImageEntity),
}

#[derive(Debug, Clone, PartialEq)]
struct PendingName {
    action: PendingAction,
    default_name: String,
}

/// Drives gestures on a [`Canvas`].
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    state: InteractionState,
    clicks: ClickTracker,
    space_held: bool,
    cursor: CursorHint,
    clipboard: Option<ImageEntity>,
    pending_name: Option<PendingName>,
    movement: Option<MovementTrack>,
    /// First touch point of the last touch event.
    last_touch: Option<Point>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn cursor(&self) -> CursorHint {
        self.cursor
    }

    pub fn is_space_held(&self) -> bool {
        self.space_held
    }

    /// Movement of the token being dragged, if any.
    pub fn movement(&self) -> Option<&MovementTrack> {
        self.movement.as_ref()
    }

    pub fn clipboard(&self) -> Option<&ImageEntity> {
        self.clipboard.as_ref()
    }

    pub fn has_pending_name(&self) -> bool {
        self.pending_name.is_some()
    }

    /// Whether any gesture is in progress.
    pub fn is_busy(&self) -> bool {
        !matches!(self.state, InteractionState::Idle)
    }

    pub fn handle_pointer(&mut self, canvas: &mut Canvas, event: &PointerEvent) -> Vec<Effect> {
        match *event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
                time_ms,
            } => self.handle_press(canvas, position, button, modifiers, time_ms),
            PointerEvent::Move { position } => self.handle_motion(canvas, position),
            PointerEvent::Up { position } => self.handle_release(canvas, Some(position)),
            PointerEvent::Wheel {
                position,
                delta_y,
                modifiers,
            } => self.handle_wheel(canvas, position, delta_y, modifiers),
            PointerEvent::TouchStart {
                ref touches,
                time_ms,
            } => self.handle_touch_start(canvas, touches, time_ms),
            PointerEvent::TouchMove { ref touches } => self.handle_touch_move(canvas, touches),
            PointerEvent::TouchEnd => {
                let last = self.last_touch.take();
                self.handle_release(canvas, last)
            }
        }
    }

    fn set_cursor(&mut self, cursor: CursorHint, effects: &mut Vec<Effect>) {
        if self.cursor != cursor {
            self.cursor = cursor;
            effects.push(Effect::SetCursor(cursor));
        }
    }

    /// Cursor for the current tool when nothing is under the pointer.
    fn resting_cursor(&self, tool: ToolKind) -> CursorHint {
        if self.space_held || tool == ToolKind::Pan {
            CursorHint::Grab
        } else if tool == ToolKind::Ruler || tool.is_drawing() {
            CursorHint::Crosshair
        } else {
            CursorHint::Default
        }
    }

    fn handle_press(
        &mut self,
        canvas: &mut Canvas,
        position: Point,
        button: MouseButton,
        _modifiers: Modifiers,
        time_ms: u64,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        let world = canvas.camera.screen_to_world(position);
        canvas.tools.set_cursor(world);
        let tool = canvas.tools.current_tool;

        if self.space_held || tool == ToolKind::Pan || button == MouseButton::Middle {
            self.state = InteractionState::Panning {
                last_screen: position,
            };
            self.set_cursor(CursorHint::Grabbing, &mut effects);
            return effects;
        }

        if button == MouseButton::Right {
            // Locked entities still get a context menu.
            if let Some(id) = selection::top_hit_at(world, canvas.scene.images(), false) {
                canvas.select(id);
                if let Some(entity) = canvas.scene.get(id) {
                    effects.push(Effect::OpenContextMenu {
                        id,
                        screen: position,
                        locked: entity.locked,
                        is_token: entity.is_token,
                    });
                }
                effects.push(Effect::Redraw);
            }
            return effects;
        }

        if tool == ToolKind::Ruler {
            let ppf = canvas.config.pixels_per_foot;
            match canvas.tools.add_ruler_point(world, ppf) {
                Some(ruler) => {
                    canvas.commit_stroke(Annotation::Shape(ruler));
                    self.state = InteractionState::Idle;
                }
                None => self.state = InteractionState::RulerPending,
            }
            effects.push(Effect::Redraw);
            return effects;
        }

        if tool.is_drawing() {
            canvas.tools.begin(world);
            self.state = InteractionState::Drawing;
            effects.push(Effect::Redraw);
            return effects;
        }

        let offset = canvas.config.handle_offset;
        let radius = canvas.config.handle_pick_radius;
        if let Some(handle) = selection::actionable_handle_at(
            world,
            canvas.scene.images(),
            canvas.scene.selected(),
            offset,
            radius,
        ) {
            if let Some(entity) = canvas.scene.selected_entity() {
                self.state = InteractionState::Resizing {
                    id: entity.id,
                    handle,
                    snapshot: ResizeSnapshot::capture(entity, world),
                };
                self.set_cursor(CursorHint::Resize(handle), &mut effects);
                return effects;
            }
        }

        match selection::top_hit_at(world, canvas.scene.images(), true) {
            Some(id) => {
                canvas.select(id);
                let window = canvas.config.triple_click_window_ms;
                if self.clicks.register(id, time_ms, window) >= 3 {
                    self.clicks.reset();
                    self.state = InteractionState::Idle;
                    if let Some(entity) = canvas.scene.get(id) {
                        let (text, size) = note_fields(entity);
                        effects.push(Effect::OpenNoteEditor { id, text, size });
                    }
                    effects.push(Effect::Redraw);
                    return effects;
                }
                if let Some(entity) = canvas.scene.get(id) {
                    let center = entity.center();
                    self.movement = entity.is_token.then(|| MovementTrack {
                        id,
                        start: center,
                        distance_px: 0.0,
                        distance_ft: format_feet(0.0, canvas.config.pixels_per_foot),
                    });
                    self.state = InteractionState::Dragging {
                        id,
                        offset: world - center,
                    };
                    self.set_cursor(CursorHint::Move, &mut effects);
                }
            }
            None => {
                canvas.deselect();
                self.clicks.reset();
                self.state = InteractionState::Idle;
            }
        }
        effects.push(Effect::Redraw);
        effects
    }

    fn handle_motion(&mut self, canvas: &mut Canvas, position: Point) -> Vec<Effect> {
        let mut effects = Vec::new();
        let world = canvas.camera.screen_to_world(position);
        canvas.tools.set_cursor(world);

        match self.state {
            InteractionState::Panning { last_screen } => {
                canvas.camera.pan(position - last_screen);
                self.state = InteractionState::Panning {
                    last_screen: position,
                };
                effects.push(Effect::Redraw);
            }
            InteractionState::Dragging { id, offset } => {
                if canvas.move_entity(id, world - offset) {
                    if let Some(track) = self.movement.as_mut() {
                        let ppf = canvas.config.pixels_per_foot;
                        track.distance_px = track.start.distance(world - offset);
                        track.distance_ft = format_feet(track.distance_px, ppf);
                    }
                    effects.push(Effect::Redraw);
                }
            }
            InteractionState::Resizing {
                id,
                handle,
                snapshot,
            } => {
                let scale = selection::resized_scale(&snapshot, handle, world);
                if canvas.set_entity_scale(id, scale) {
                    effects.push(Effect::Redraw);
                }
            }
            InteractionState::Drawing => {
                canvas.tools.update(world);
                effects.push(Effect::Redraw);
            }
            InteractionState::RulerPending => effects.push(Effect::Redraw),
            InteractionState::Idle => {
                let tool = canvas.tools.current_tool;
                let hover = if tool == ToolKind::Select && !self.space_held {
                    selection::actionable_handle_at(
                        world,
                        canvas.scene.images(),
                        canvas.scene.selected(),
                        canvas.config.handle_offset,
                        canvas.config.handle_pick_radius,
                    )
                    .map(CursorHint::Resize)
                } else {
                    None
                };
                let cursor = hover.unwrap_or_else(|| self.resting_cursor(tool));
                self.set_cursor(cursor, &mut effects);
            }
        }
        effects
    }

    fn handle_release(&mut self, canvas: &mut Canvas, position: Option<Point>) -> Vec<Effect> {
        let mut effects = Vec::new();
        if let Some(position) = position {
            let world = canvas.camera.screen_to_world(position);
            canvas.tools.set_cursor(world);
        }

        match std::mem::take(&mut self.state) {
            InteractionState::Idle => {}
            InteractionState::Panning { .. } => {
                let cursor = self.resting_cursor(canvas.tools.current_tool);
                self.set_cursor(cursor, &mut effects);
            }
            InteractionState::Drawing => {
                if let Some(position) = position {
                    let world = canvas.camera.screen_to_world(position);
                    let last = canvas.tools.path().last().map(|s| s.point());
                    if last != Some(world) {
                        canvas.tools.update(world);
                    }
                }
                if let Some(stroke) = canvas.tools.end() {
                    canvas.commit_stroke(stroke);
                }
                effects.push(Effect::Redraw);
            }
            InteractionState::RulerPending => {
                self.state = InteractionState::RulerPending;
            }
            InteractionState::Dragging { .. } | InteractionState::Resizing { .. } => {
                let cursor = self.resting_cursor(canvas.tools.current_tool);
                self.set_cursor(cursor, &mut effects);
                effects.push(Effect::Redraw);
            }
        }
        if self.movement.take().is_some() && !effects.contains(&Effect::Redraw) {
            effects.push(Effect::Redraw);
        }
        effects
    }

    fn handle_wheel(
        &mut self,
        canvas: &mut Canvas,
        position: Point,
        delta_y: f64,
        modifiers: Modifiers,
    ) -> Vec<Effect> {
        let towards_user = delta_y > 0.0;
        let unlocked_selection = canvas
            .scene
            .selected_entity()
            .is_some_and(|e| !e.locked);

        if unlocked_selection && !modifiers.alt {
            if modifiers.ctrl {
                let step = if towards_user {
                    -WHEEL_ROTATE_STEP
                } else {
                    WHEEL_ROTATE_STEP
                };
                canvas.rotate_selected(step);
                return vec![Effect::Redraw];
            }
            if modifiers.shift {
                let step = if towards_user {
                    -WHEEL_SCALE_STEP
                } else {
                    WHEEL_SCALE_STEP
                };
                canvas.scale_selected(step);
                return vec![Effect::Redraw];
            }
        }

        let factor = if towards_user {
            WHEEL_ZOOM_OUT
        } else {
            WHEEL_ZOOM_IN
        };
        canvas.camera.zoom_at(position, factor);
        vec![Effect::Redraw]
    }

    fn handle_touch_start(&mut self, canvas: &mut Canvas, touches: &[Point], time_ms: u64) -> Vec<Effect> {
        let Some(&first) = touches.first() else {
            return Vec::new();
        };
        self.last_touch = Some(first);
        if touches.len() >= 2 {
            // A second finger turns whatever was happening into a pan.
            canvas.tools.cancel();
            self.movement = None;
            self.state = InteractionState::Panning { last_screen: first };
            return Vec::new();
        }
        self.handle_press(canvas, first, MouseButton::Left, Modifiers::default(), time_ms)
    }

    fn handle_touch_move(&mut self, canvas: &mut Canvas, touches: &[Point]) -> Vec<Effect> {
        let Some(&first) = touches.first() else {
            return Vec::new();
        };
        self.last_touch = Some(first);
        if touches.len() >= 2 {
            if let InteractionState::Panning { last_screen } = self.state {
                canvas.camera.pan(first - last_screen);
                self.state = InteractionState::Panning { last_screen: first };
                return vec![Effect::Redraw];
            }
            return Vec::new();
        }
        self.handle_motion(canvas, first)
    }

    pub fn handle_key(&mut self, canvas: &mut Canvas, event: &KeyEvent) -> Vec<Effect> {
        let mut effects = Vec::new();
        match event {
            KeyEvent::Pressed {
                key,
                modifiers,
                text_input_focused,
            } => {
                if *text_input_focused {
                    if *key == Key::Escape {
                        self.pending_name = None;
                        effects.push(Effect::CloseMenus);
                    }
                    return effects;
                }
                match key {
                    Key::Space => {
                        if !self.space_held {
                            self.space_held = true;
                            if !matches!(self.state, InteractionState::Panning { .. }) {
                                self.set_cursor(CursorHint::Grab, &mut effects);
                            }
                        }
                    }
                    Key::Delete => {
                        if canvas.delete_selected().is_some() {
                            effects.push(Effect::Redraw);
                        }
                    }
                    Key::Escape => {
                        self.pending_name = None;
                        canvas.deselect();
                        effects.push(Effect::CloseMenus);
                        effects.push(Effect::Redraw);
                    }
                    Key::Character(c) if modifiers.command() => {
                        self.handle_command(canvas, c.to_ascii_lowercase(), &mut effects);
                    }
                    Key::Character(c) if c.eq_ignore_ascii_case(&'g') => {
                        canvas.deselect();
                        effects.push(Effect::Redraw);
                    }
                    Key::Character(c) => {
                        if let Some(tool) = ToolKind::from_shortcut(*c) {
                            effects.extend(self.set_tool(canvas, tool));
                        }
                    }
                    Key::Other(_) => {}
                }
            }
            KeyEvent::Released { key: Key::Space } => {
                self.space_held = false;
                if !matches!(self.state, InteractionState::Panning { .. }) {
                    let cursor = self.resting_cursor(canvas.tools.current_tool);
                    self.set_cursor(cursor, &mut effects);
                }
            }
            KeyEvent::Released { .. } => {}
        }
        effects
    }

    fn handle_command(&mut self, canvas: &mut Canvas, key: char, effects: &mut Vec<Effect>) {
        match key {
            'c' => {
                if let Some(entity) = canvas.scene.selected_entity() {
                    log::debug!("Copied '{}' to the clipboard", entity.name);
                    self.clipboard = Some(entity.clone());
                }
            }
            'd' => {
                if let Some(id) = canvas.scene.selected() {
                    effects.extend(self.request_duplicate(canvas, id));
                }
            }
            'v' => match self.clipboard.clone() {
                Some(snapshot) => {
                    let default_name = copy_name(&snapshot.name);
                    effects.push(self.request_name(PendingAction::Paste(snapshot), default_name));
                }
                None => effects.push(Effect::ReadOsClipboard),
            },
            'z' => {
                if canvas.undo_drawing() {
                    effects.push(Effect::Redraw);
                }
            }
            _ => {}
        }
    }

    /// Switch tools, abandoning any stroke or ruler measurement in progress.
    pub fn set_tool(&mut self, canvas: &mut Canvas, tool: ToolKind) -> Vec<Effect> {
        let mut effects = Vec::new();
        canvas.set_tool(tool);
        if matches!(
            self.state,
            InteractionState::Drawing | InteractionState::RulerPending
        ) {
            self.state = InteractionState::Idle;
        }
        let cursor = self.resting_cursor(tool);
        self.set_cursor(cursor, &mut effects);
        effects.push(Effect::Redraw);
        effects
    }

    fn request_name(&mut self, action: PendingAction, default_name: String) -> Effect {
        self.pending_name = Some(PendingName {
            action,
            default_name: default_name.clone(),
        });
        Effect::PromptName { default_name }
    }

    fn request_duplicate(&mut self, canvas: &Canvas, id: EntityId) -> Vec<Effect> {
        match canvas.scene.get(id) {
            Some(entity) => {
                let default_name = copy_name(&entity.name);
                vec![self.request_name(PendingAction::Duplicate(id), default_name)]
            }
            None => Vec::new(),
        }
    }

    /// A decoded image arrived from a paste, drop or clipboard read.
    pub fn on_image_decoded(&mut self, canvas: &Canvas, image: DecodedImage) -> Vec<Effect> {
        let default_name = canvas.scene.next_default_name();
        vec![self.request_name(PendingAction::NewImage(image), default_name)]
    }

    /// Answer to [`Effect::ReadOsClipboard`].
    pub fn on_clipboard_image(
        &mut self,
        canvas: &Canvas,
        image: Result<DecodedImage, ClipboardError>,
    ) -> Vec<Effect> {
        match image {
            Ok(image) => self.on_image_decoded(canvas, image),
            Err(e) => {
                log::warn!("Clipboard read failed: {e}");
                vec![Effect::Notify(Notice::warning(e.to_string()))]
            }
        }
    }

    /// Answer to a name prompt. Without a pending addition this renames the
    /// selected entity.
    pub fn rename(&mut self, canvas: &mut Canvas, text: &str) -> Vec<Effect> {
        let Some(pending) = self.pending_name.take() else {
            return if canvas.rename_selected(text) {
                vec![Effect::Redraw]
            } else {
                Vec::new()
            };
        };
        let name = match text.trim() {
            "" => pending.default_name,
            trimmed => trimmed.to_string(),
        };
        match pending.action {
            PendingAction::NewImage(image) => {
                canvas.place_image(&image, &name);
            }
            PendingAction::Duplicate(id) => {
                if canvas.duplicate(id).is_none() {
                    return vec![Effect::Notify(Notice::warning(
                        "The image to duplicate no longer exists",
                    ))];
                }
                canvas.rename_selected(&name);
            }
            PendingAction::Paste(snapshot) => {
                canvas.paste(&snapshot, &name);
            }
        }
        vec![Effect::Redraw]
    }

    /// The name prompt was dismissed.
    pub fn cancel_rename(&mut self) {
        self.pending_name = None;
    }

    /// Apply a context menu entry to `id`.
    pub fn menu_action(&mut self, canvas: &mut Canvas, id: EntityId, action: MenuAction) -> Vec<Effect> {
        if !canvas.select(id) {
            return vec![Effect::CloseMenus];
        }
        let mut effects = vec![Effect::CloseMenus];
        match action {
            MenuAction::Rename => {
                if let Some(entity) = canvas.scene.get(id) {
                    effects.push(Effect::PromptName {
                        default_name: entity.name.clone(),
                    });
                }
            }
            MenuAction::EditNote => {
                if let Some(entity) = canvas.scene.get(id) {
                    let (text, size) = note_fields(entity);
                    effects.push(Effect::OpenNoteEditor { id, text, size });
                }
            }
            MenuAction::SetHp => {
                if let Some(entity) = canvas.scene.get(id) {
                    effects.push(Effect::OpenHpEditor {
                        id,
                        hp: entity.hp.unwrap_or_default(),
                    });
                }
            }
            MenuAction::SetDisplayName => {
                if let Some(entity) = canvas.scene.get(id) {
                    effects.push(Effect::OpenDisplayNameEditor {
                        id,
                        text: entity.display_name.clone(),
                    });
                }
            }
            MenuAction::RollDice => effects.push(Effect::OpenRollDialog {
                id,
                formula: DEFAULT_FORMULA.to_string(),
            }),
            MenuAction::Duplicate => effects.extend(self.request_duplicate(canvas, id)),
            MenuAction::ToggleLock => {
                canvas.toggle_lock(id);
            }
            MenuAction::ToggleToken => {
                canvas.toggle_token(id);
            }
            MenuAction::BringToFront => {
                canvas.bring_to_front(id);
            }
            MenuAction::SendToBack => {
                canvas.send_to_back(id);
            }
            MenuAction::Delete => {
                canvas.delete(id);
            }
        }
        effects.push(Effect::Redraw);
        effects
    }

    /// Roll dice for the selected entity.
    pub fn roll(&mut self, canvas: &mut Canvas, formula: &str, roller: &mut dyn DieRoller) -> Vec<Effect> {
        match canvas.roll(formula, roller) {
            Ok(Some(_)) => vec![Effect::StartAnimation, Effect::Redraw],
            Ok(None) => vec![Effect::Notify(Notice::info("Select a token to roll for"))],
            Err(e) => vec![Effect::Notify(Notice::warning(e.to_string()))],
        }
    }
}

/// Default name for a copy of `name`.
pub fn copy_name(name: &str) -> String {
    format!("{name} (Copy)")
}

/// Current note text and size, for pre-filling the note editor.
fn note_fields(entity: &ImageEntity) -> (String, NoteSize) {
    entity
        .note
        .as_ref()
        .map(|n| (n.text.clone(), n.size))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::ShapeKind;
    use kurbo::Size;

    struct Fixed(u32);

    impl DieRoller for Fixed {
        fn roll(&mut self, _sides: u32) -> u32 {
            self.0
        }
    }

    fn add_entity(canvas: &mut Canvas, id: EntityId, center: Point, locked: bool) {
        let mut e = ImageEntity::new(id, format!("e{id}"), "ref", Size::new(100.0, 100.0), center, 1.0);
        e.locked = locked;
        canvas.scene.add(e);
    }

    fn down(x: f64, y: f64, time_ms: u64) -> PointerEvent {
        PointerEvent::Down {
            position: Point::new(x, y),
            button: MouseButton::Left,
            modifiers: Modifiers::default(),
            time_ms,
        }
    }

    fn button_down(x: f64, y: f64, button: MouseButton) -> PointerEvent {
        PointerEvent::Down {
            position: Point::new(x, y),
            button,
            modifiers: Modifiers::default(),
            time_ms: 0,
        }
    }

    fn moved(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Move {
            position: Point::new(x, y),
        }
    }

    fn up(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Up {
            position: Point::new(x, y),
        }
    }

    fn press(key: Key) -> KeyEvent {
        KeyEvent::Pressed {
            key,
            modifiers: Modifiers::default(),
            text_input_focused: false,
        }
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::Pressed {
            key: Key::Character(c),
            modifiers: Modifiers {
                ctrl: true,
                ..Modifiers::default()
            },
            text_input_focused: false,
        }
    }

    fn wheel(delta_y: f64, modifiers: Modifiers) -> PointerEvent {
        PointerEvent::Wheel {
            position: Point::new(400.0, 300.0),
            delta_y,
            modifiers,
        }
    }

    fn setup() -> (Canvas, InteractionController) {
        (Canvas::default(), InteractionController::new())
    }

    #[test]
    fn test_drag_moves_entity() {
        let (mut canvas, mut ctl) = setup();
        add_entity(&mut canvas, 1, Point::new(100.0, 100.0), false);
        canvas.deselect();

        ctl.handle_pointer(&mut canvas, &down(110.0, 120.0, 0));
        assert!(matches!(ctl.state(), InteractionState::Dragging { id: 1, .. }));
        assert_eq!(canvas.scene.selected(), Some(1));

        ctl.handle_pointer(&mut canvas, &moved(160.0, 170.0));
        assert_eq!(canvas.scene.get(1).unwrap().center(), Point::new(150.0, 150.0));

        ctl.handle_pointer(&mut canvas, &up(160.0, 170.0));
        assert_eq!(ctl.state(), InteractionState::Idle);
        assert!(canvas.is_dirty());
    }

    #[test]
    fn test_drag_respects_zoom() {
        let (mut canvas, mut ctl) = setup();
        add_entity(&mut canvas, 1, Point::new(100.0, 100.0), false);
        canvas.camera.zoom_at(Point::ZERO, 2.0);

        ctl.handle_pointer(&mut canvas, &down(200.0, 200.0, 0));
        ctl.handle_pointer(&mut canvas, &moved(260.0, 200.0));
        assert_eq!(canvas.scene.get(1).unwrap().center(), Point::new(130.0, 100.0));
    }

    #[test]
    fn test_locked_entity_not_draggable() {
        let (mut canvas, mut ctl) = setup();
        add_entity(&mut canvas, 1, Point::new(100.0, 100.0), true);

        ctl.handle_pointer(&mut canvas, &down(100.0, 100.0, 0));
        assert_eq!(ctl.state(), InteractionState::Idle);
        assert_eq!(canvas.scene.selected(), None);
        ctl.handle_pointer(&mut canvas, &moved(200.0, 200.0));
        ctl.handle_pointer(&mut canvas, &up(200.0, 200.0));
        assert_eq!(canvas.scene.get(1).unwrap().center(), Point::new(100.0, 100.0));
    }

    #[test]
    fn test_drag_through_locked_reaches_entity_beneath() {
        let (mut canvas, mut ctl) = setup();
        add_entity(&mut canvas, 1, Point::new(100.0, 100.0), false);
        add_entity(&mut canvas, 2, Point::new(100.0, 100.0), true);

        ctl.handle_pointer(&mut canvas, &down(100.0, 100.0, 0));
        assert!(matches!(ctl.state(), InteractionState::Dragging { id: 1, .. }));
        ctl.handle_pointer(&mut canvas, &moved(120.0, 100.0));
        assert_eq!(canvas.scene.get(1).unwrap().center(), Point::new(120.0, 100.0));
        assert_eq!(canvas.scene.get(2).unwrap().center(), Point::new(100.0, 100.0));
    }

    #[test]
    fn test_click_empty_space_deselects() {
        let (mut canvas, mut ctl) = setup();
        add_entity(&mut canvas, 1, Point::new(100.0, 100.0), false);
        assert_eq!(canvas.scene.selected(), Some(1));
        ctl.handle_pointer(&mut canvas, &down(500.0, 500.0, 0));
        assert_eq!(canvas.scene.selected(), None);
        assert_eq!(ctl.state(), InteractionState::Idle);
    }

    #[test]
    fn test_triple_click_opens_note_editor() {
        let (mut canvas, mut ctl) = setup();
        add_entity(&mut canvas, 1, Point::new(100.0, 100.0), false);

        for t in [0, 200] {
            ctl.handle_pointer(&mut canvas, &down(100.0, 100.0, t));
            ctl.handle_pointer(&mut canvas, &up(100.0, 100.0));
        }
        let effects = ctl.handle_pointer(&mut canvas, &down(100.0, 100.0, 400));
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::OpenNoteEditor { id: 1, size: NoteSize::Medium, .. }
        )));
        assert_eq!(ctl.state(), InteractionState::Idle);

        // Tracking was reset: a fourth click after the window starts over.
        let effects = ctl.handle_pointer(&mut canvas, &down(100.0, 100.0, 1100));
        assert!(!effects.iter().any(|e| matches!(e, Effect::OpenNoteEditor { .. })));
        assert!(matches!(ctl.state(), InteractionState::Dragging { .. }));
    }

    #[test]
    fn test_slow_clicks_do_not_open_note_editor() {
        let (mut canvas, mut ctl) = setup();
        add_entity(&mut canvas, 1, Point::new(100.0, 100.0), false);
        for t in [0, 400, 800] {
            let effects = ctl.handle_pointer(&mut canvas, &down(100.0, 100.0, t));
            ctl.handle_pointer(&mut canvas, &up(100.0, 100.0));
            assert!(!effects.iter().any(|e| matches!(e, Effect::OpenNoteEditor { .. })));
        }
    }

    #[test]
    fn test_resize_from_corner_handle() {
        let (mut canvas, mut ctl) = setup();
        add_entity(&mut canvas, 1, Point::new(100.0, 100.0), false);

        // South-east handle sits at (155, 155).
        ctl.handle_pointer(&mut canvas, &down(155.0, 155.0, 0));
        assert!(matches!(
            ctl.state(),
            InteractionState::Resizing { id: 1, handle: HandleKind::SouthEast, .. }
        ));
        ctl.handle_pointer(&mut canvas, &moved(185.0, 195.0));
        let scale = canvas.scene.get(1).unwrap().scale;
        assert!((scale - 1.15).abs() < 1e-9);

        ctl.handle_pointer(&mut canvas, &up(185.0, 195.0));
        assert_eq!(ctl.state(), InteractionState::Idle);
        // The center does not move while resizing.
        assert_eq!(canvas.scene.get(1).unwrap().center(), Point::new(100.0, 100.0));
    }

    #[test]
    fn test_hover_shows_resize_cursor() {
        let (mut canvas, mut ctl) = setup();
        add_entity(&mut canvas, 1, Point::new(100.0, 100.0), false);
        let effects = ctl.handle_pointer(&mut canvas, &moved(45.0, 45.0));
        assert_eq!(
            effects,
            vec![Effect::SetCursor(CursorHint::Resize(HandleKind::NorthWest))]
        );
        assert_eq!(ctl.cursor().css_name(), "nw-resize");
        assert_eq!(ctl.state(), InteractionState::Idle);
        ctl.handle_pointer(&mut canvas, &moved(400.0, 400.0));
        assert_eq!(ctl.cursor(), CursorHint::Default);
    }

    #[test]
    fn test_pan_with_middle_button_and_space() {
        let (mut canvas, mut ctl) = setup();
        ctl.handle_pointer(&mut canvas, &button_down(10.0, 10.0, MouseButton::Middle));
        ctl.handle_pointer(&mut canvas, &moved(30.0, 15.0));
        assert_eq!(canvas.camera.offset, Vec2::new(20.0, 5.0));
        ctl.handle_pointer(&mut canvas, &up(30.0, 15.0));
        assert_eq!(ctl.state(), InteractionState::Idle);

        ctl.handle_key(&mut canvas, &press(Key::Space));
        assert_eq!(ctl.cursor(), CursorHint::Grab);
        ctl.handle_pointer(&mut canvas, &down(0.0, 0.0, 0));
        assert_eq!(ctl.cursor(), CursorHint::Grabbing);
        ctl.handle_pointer(&mut canvas, &moved(-10.0, 0.0));
        ctl.handle_pointer(&mut canvas, &up(-10.0, 0.0));
        assert_eq!(canvas.camera.offset, Vec2::new(10.0, 5.0));
        assert_eq!(ctl.cursor(), CursorHint::Grab);

        ctl.handle_key(&mut canvas, &KeyEvent::Released { key: Key::Space });
        assert_eq!(ctl.cursor(), CursorHint::Default);
    }

    #[test]
    fn test_right_click_targets_locked_entity() {
        let (mut canvas, mut ctl) = setup();
        add_entity(&mut canvas, 1, Point::new(100.0, 100.0), true);
        canvas.deselect();
        let effects = ctl.handle_pointer(&mut canvas, &button_down(100.0, 100.0, MouseButton::Right));
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::OpenContextMenu { id: 1, locked: true, .. }
        )));
        assert_eq!(canvas.scene.selected(), Some(1));

        let effects = ctl.handle_pointer(&mut canvas, &button_down(900.0, 900.0, MouseButton::Right));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_pen_stroke_committed_on_release() {
        let (mut canvas, mut ctl) = setup();
        ctl.handle_key(&mut canvas, &press(Key::Character('d')));
        assert_eq!(canvas.tools.current_tool, ToolKind::Pen);

        ctl.handle_pointer(&mut canvas, &down(0.0, 0.0, 0));
        assert_eq!(ctl.state(), InteractionState::Drawing);
        ctl.handle_pointer(&mut canvas, &moved(10.0, 0.0));
        ctl.handle_pointer(&mut canvas, &moved(20.0, 5.0));
        ctl.handle_pointer(&mut canvas, &up(20.0, 5.0));

        assert_eq!(canvas.annotations.len(), 1);
        match &canvas.annotations.strokes()[0] {
            Annotation::Path(samples) => assert_eq!(samples.len(), 3),
            other => panic!("unexpected stroke {other:?}"),
        }
        assert_eq!(ctl.state(), InteractionState::Idle);
    }

    #[test]
    fn test_shape_tool_uses_start_and_current() {
        let (mut canvas, mut ctl) = setup();
        ctl.handle_key(&mut canvas, &press(Key::Character('3')));
        ctl.handle_pointer(&mut canvas, &down(10.0, 10.0, 0));
        ctl.handle_pointer(&mut canvas, &moved(60.0, 40.0));
        ctl.handle_pointer(&mut canvas, &up(60.0, 40.0));

        match &canvas.annotations.strokes()[0] {
            Annotation::Shape(shape) => {
                assert_eq!(shape.kind, ShapeKind::Rect);
                assert_eq!(shape.start, Point::new(10.0, 10.0));
                assert_eq!(shape.end, Point::new(60.0, 40.0));
            }
            other => panic!("unexpected stroke {other:?}"),
        }
    }

    #[test]
    fn test_shape_ends_at_release_point() {
        let (mut canvas, mut ctl) = setup();
        ctl.handle_key(&mut canvas, &press(Key::Character('1')));
        ctl.handle_pointer(&mut canvas, &down(0.0, 0.0, 0));
        ctl.handle_pointer(&mut canvas, &up(50.0, 0.0));

        match &canvas.annotations.strokes()[0] {
            Annotation::Shape(shape) => {
                assert_eq!(shape.start, Point::ZERO);
                assert_eq!(shape.end, Point::new(50.0, 0.0));
            }
            other => panic!("unexpected stroke {other:?}"),
        }
    }

    #[test]
    fn test_pen_release_point_appended_once() {
        let (mut canvas, mut ctl) = setup();
        ctl.handle_key(&mut canvas, &press(Key::Character('d')));
        ctl.handle_pointer(&mut canvas, &down(0.0, 0.0, 0));
        ctl.handle_pointer(&mut canvas, &moved(10.0, 0.0));
        ctl.handle_pointer(&mut canvas, &up(30.0, 0.0));

        match &canvas.annotations.strokes()[0] {
            Annotation::Path(samples) => {
                assert_eq!(samples.len(), 3);
                assert_eq!(samples[2].point(), Point::new(30.0, 0.0));
            }
            other => panic!("unexpected stroke {other:?}"),
        }
    }

    #[test]
    fn test_drawing_does_not_select() {
        let (mut canvas, mut ctl) = setup();
        add_entity(&mut canvas, 1, Point::new(100.0, 100.0), false);
        canvas.deselect();
        ctl.handle_key(&mut canvas, &press(Key::Character('1')));
        ctl.handle_pointer(&mut canvas, &down(100.0, 100.0, 0));
        assert_eq!(canvas.scene.selected(), None);
        assert_eq!(ctl.state(), InteractionState::Drawing);
    }

    #[test]
    fn test_ruler_two_clicks() {
        let (mut canvas, mut ctl) = setup();
        ctl.handle_key(&mut canvas, &press(Key::Character('r')));

        ctl.handle_pointer(&mut canvas, &down(0.0, 0.0, 0));
        ctl.handle_pointer(&mut canvas, &up(0.0, 0.0));
        assert_eq!(ctl.state(), InteractionState::RulerPending);
        assert!(canvas.annotations.is_empty());

        ctl.handle_pointer(&mut canvas, &down(15.0, 0.0, 100));
        ctl.handle_pointer(&mut canvas, &up(15.0, 0.0));
        assert_eq!(ctl.state(), InteractionState::Idle);

        match &canvas.annotations.strokes()[0] {
            Annotation::Shape(shape) => {
                assert_eq!(shape.kind, ShapeKind::Ruler);
                assert_eq!(shape.distance_px, Some(15));
                assert_eq!(shape.distance_ft.as_deref(), Some("3.0"));
            }
            other => panic!("unexpected stroke {other:?}"),
        }
        assert!(canvas.tools.ruler_points().is_empty());
    }

    #[test]
    fn test_tool_switch_abandons_ruler() {
        let (mut canvas, mut ctl) = setup();
        ctl.handle_key(&mut canvas, &press(Key::Character('r')));
        ctl.handle_pointer(&mut canvas, &down(0.0, 0.0, 0));
        ctl.handle_key(&mut canvas, &press(Key::Character('s')));
        assert_eq!(ctl.state(), InteractionState::Idle);
        assert!(canvas.tools.ruler_points().is_empty());
    }

    #[test]
    fn test_token_movement_tracking() {
        let (mut canvas, mut ctl) = setup();
        add_entity(&mut canvas, 1, Point::new(0.0, 0.0), false);
        canvas.toggle_token(1);

        ctl.handle_pointer(&mut canvas, &down(0.0, 0.0, 0));
        ctl.handle_pointer(&mut canvas, &moved(30.0, 40.0));
        let track = ctl.movement().unwrap();
        assert_eq!(track.start, Point::ZERO);
        assert!((track.distance_px - 50.0).abs() < 1e-9);
        assert_eq!(track.distance_ft, "10.0");

        ctl.handle_pointer(&mut canvas, &up(30.0, 40.0));
        assert!(ctl.movement().is_none());
    }

    #[test]
    fn test_non_token_not_tracked() {
        let (mut canvas, mut ctl) = setup();
        add_entity(&mut canvas, 1, Point::new(0.0, 0.0), false);
        ctl.handle_pointer(&mut canvas, &down(0.0, 0.0, 0));
        ctl.handle_pointer(&mut canvas, &moved(30.0, 40.0));
        assert!(ctl.movement().is_none());
    }

    #[test]
    fn test_wheel_zoom_rotate_scale() {
        let (mut canvas, mut ctl) = setup();
        ctl.handle_pointer(&mut canvas, &wheel(-1.0, Modifiers::default()));
        assert!((canvas.camera.zoom - 1.1).abs() < 1e-9);

        add_entity(&mut canvas, 1, Point::ZERO, false);
        let ctrl = Modifiers { ctrl: true, ..Modifiers::default() };
        ctl.handle_pointer(&mut canvas, &wheel(1.0, ctrl));
        assert_eq!(canvas.scene.get(1).unwrap().rotation, -5.0);

        let shift = Modifiers { shift: true, ..Modifiers::default() };
        ctl.handle_pointer(&mut canvas, &wheel(-1.0, shift));
        assert!((canvas.scene.get(1).unwrap().scale - 1.05).abs() < 1e-9);

        // Alt always zooms.
        let alt_ctrl = Modifiers { alt: true, ctrl: true, ..Modifiers::default() };
        ctl.handle_pointer(&mut canvas, &wheel(1.0, alt_ctrl));
        assert_eq!(canvas.scene.get(1).unwrap().rotation, -5.0);
        assert!((canvas.camera.zoom - 0.99).abs() < 1e-9);
    }

    #[test]
    fn test_wheel_on_locked_selection_zooms() {
        let (mut canvas, mut ctl) = setup();
        add_entity(&mut canvas, 1, Point::ZERO, true);
        let ctrl = Modifiers { ctrl: true, ..Modifiers::default() };
        ctl.handle_pointer(&mut canvas, &wheel(1.0, ctrl));
        assert_eq!(canvas.scene.get(1).unwrap().rotation, 0.0);
        assert!((canvas.camera.zoom - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_stays_clamped() {
        let (mut canvas, mut ctl) = setup();
        for _ in 0..200 {
            ctl.handle_pointer(&mut canvas, &wheel(-100.0, Modifiers::default()));
        }
        assert!((canvas.camera.zoom - 5.0).abs() < 1e-9);
        for _ in 0..200 {
            ctl.handle_pointer(&mut canvas, &wheel(100.0, Modifiers::default()));
        }
        assert!((canvas.camera.zoom - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_keys_ignored_while_typing() {
        let (mut canvas, mut ctl) = setup();
        add_entity(&mut canvas, 1, Point::ZERO, false);
        let typing = |key| KeyEvent::Pressed {
            key,
            modifiers: Modifiers::default(),
            text_input_focused: true,
        };
        assert!(ctl.handle_key(&mut canvas, &typing(Key::Delete)).is_empty());
        assert!(ctl.handle_key(&mut canvas, &typing(Key::Character('r'))).is_empty());
        assert_eq!(canvas.scene.len(), 1);
        assert_eq!(canvas.tools.current_tool, ToolKind::Select);
        assert_eq!(
            ctl.handle_key(&mut canvas, &typing(Key::Escape)),
            vec![Effect::CloseMenus]
        );
    }

    #[test]
    fn test_delete_and_escape() {
        let (mut canvas, mut ctl) = setup();
        add_entity(&mut canvas, 1, Point::ZERO, false);
        add_entity(&mut canvas, 2, Point::new(300.0, 0.0), false);
        ctl.handle_key(&mut canvas, &press(Key::Delete));
        assert_eq!(canvas.scene.len(), 1);
        assert_eq!(canvas.scene.selected(), None);

        canvas.select(1);
        let effects = ctl.handle_key(&mut canvas, &press(Key::Escape));
        assert!(effects.contains(&Effect::CloseMenus));
        assert_eq!(canvas.scene.selected(), None);

        canvas.select(1);
        ctl.handle_key(&mut canvas, &press(Key::Character('G')));
        assert_eq!(canvas.scene.selected(), None);
    }

    #[test]
    fn test_copy_paste_internal() {
        let (mut canvas, mut ctl) = setup();
        add_entity(&mut canvas, 1, Point::ZERO, true);

        ctl.handle_key(&mut canvas, &ctrl('c'));
        let effects = ctl.handle_key(&mut canvas, &ctrl('v'));
        assert_eq!(
            effects,
            vec![Effect::PromptName {
                default_name: "e1 (Copy)".to_string()
            }]
        );
        ctl.rename(&mut canvas, "");
        assert_eq!(canvas.scene.len(), 2);
        let copy = canvas.scene.selected_entity().unwrap();
        assert_ne!(copy.id, 1);
        assert_eq!(copy.name, "e1 (Copy)");
        assert!(!copy.locked);
        assert_eq!(copy.center(), Point::new(30.0, 30.0));
        assert!(!ctl.has_pending_name());
    }

    #[test]
    fn test_paste_without_clipboard_reads_os() {
        let (mut canvas, mut ctl) = setup();
        assert_eq!(
            ctl.handle_key(&mut canvas, &ctrl('v')),
            vec![Effect::ReadOsClipboard]
        );
        let effects = ctl.on_clipboard_image(&canvas, Err(ClipboardError::PermissionDenied));
        assert!(matches!(
            &effects[0],
            Effect::Notify(Notice { level: NoticeLevel::Warning, .. })
        ));
        assert!(canvas.scene.is_empty());
    }

    #[test]
    fn test_duplicate_prompts_then_copies() {
        let (mut canvas, mut ctl) = setup();
        add_entity(&mut canvas, 1, Point::ZERO, false);
        let effects = ctl.handle_key(&mut canvas, &ctrl('d'));
        assert!(matches!(&effects[0], Effect::PromptName { default_name } if default_name == "e1 (Copy)"));
        ctl.rename(&mut canvas, "  Twin ");
        assert_eq!(canvas.scene.len(), 2);
        assert_eq!(canvas.scene.selected_entity().unwrap().name, "Twin");
    }

    #[test]
    fn test_cancelled_rename_adds_nothing() {
        let (mut canvas, mut ctl) = setup();
        ctl.on_image_decoded(&canvas, DecodedImage::new("img", 100, 100));
        ctl.cancel_rename();
        ctl.rename(&mut canvas, "ignored");
        assert!(canvas.scene.is_empty());
    }

    #[test]
    fn test_escape_in_name_field_drops_pending_image() {
        let (mut canvas, mut ctl) = setup();
        add_entity(&mut canvas, 1, Point::ZERO, false);
        ctl.on_image_decoded(&canvas, DecodedImage::new("img", 100, 100));
        assert!(ctl.has_pending_name());

        let escape = KeyEvent::Pressed {
            key: Key::Escape,
            modifiers: Modifiers::default(),
            text_input_focused: true,
        };
        ctl.handle_key(&mut canvas, &escape);
        assert!(!ctl.has_pending_name());

        ctl.menu_action(&mut canvas, 1, MenuAction::Rename);
        ctl.rename(&mut canvas, "Dragon");
        assert_eq!(canvas.scene.len(), 1);
        assert_eq!(canvas.scene.get(1).unwrap().name, "Dragon");
    }

    #[test]
    fn test_new_image_default_name() {
        let (mut canvas, mut ctl) = setup();
        let effects = ctl.on_image_decoded(&canvas, DecodedImage::new("img", 100, 100));
        assert_eq!(
            effects,
            vec![Effect::PromptName {
                default_name: "Image 1".to_string()
            }]
        );
        ctl.rename(&mut canvas, "");
        assert_eq!(canvas.scene.images()[0].name, "Image 1");
    }

    #[test]
    fn test_rename_selected_without_pending() {
        let (mut canvas, mut ctl) = setup();
        add_entity(&mut canvas, 1, Point::ZERO, false);
        ctl.rename(&mut canvas, "Dragon");
        assert_eq!(canvas.scene.get(1).unwrap().name, "Dragon");
    }

    #[test]
    fn test_undo_shortcut() {
        let (mut canvas, mut ctl) = setup();
        ctl.handle_key(&mut canvas, &press(Key::Character('1')));
        ctl.handle_pointer(&mut canvas, &down(0.0, 0.0, 0));
        ctl.handle_pointer(&mut canvas, &up(0.0, 0.0));
        assert_eq!(canvas.annotations.len(), 1);
        ctl.handle_key(&mut canvas, &ctrl('z'));
        assert!(canvas.annotations.is_empty());
    }

    #[test]
    fn test_menu_actions() {
        let (mut canvas, mut ctl) = setup();
        add_entity(&mut canvas, 1, Point::ZERO, false);
        add_entity(&mut canvas, 2, Point::ZERO, false);

        ctl.menu_action(&mut canvas, 2, MenuAction::SendToBack);
        assert_eq!(canvas.scene.images()[0].id, 2);
        ctl.menu_action(&mut canvas, 2, MenuAction::ToggleLock);
        assert!(canvas.scene.get(2).unwrap().locked);

        let effects = ctl.menu_action(&mut canvas, 1, MenuAction::RollDice);
        assert!(effects.contains(&Effect::OpenRollDialog {
            id: 1,
            formula: "1d20+0".to_string()
        }));

        ctl.menu_action(&mut canvas, 1, MenuAction::Delete);
        assert!(canvas.scene.get(1).is_none());
        assert_eq!(ctl.menu_action(&mut canvas, 1, MenuAction::Delete), vec![Effect::CloseMenus]);
    }

    #[test]
    fn test_roll_effects() {
        let (mut canvas, mut ctl) = setup();
        add_entity(&mut canvas, 1, Point::ZERO, false);
        let effects = ctl.roll(&mut canvas, "2d6+3", &mut Fixed(3));
        assert!(effects.contains(&Effect::StartAnimation));
        assert_eq!(canvas.floating.items()[0].result.total, 9);

        let effects = ctl.roll(&mut canvas, "bad", &mut Fixed(3));
        assert!(matches!(&effects[0], Effect::Notify(_)));
        assert_eq!(canvas.floating.items().len(), 1);
    }

    #[test]
    fn test_two_finger_pan() {
        let (mut canvas, mut ctl) = setup();
        ctl.handle_pointer(
            &mut canvas,
            &PointerEvent::TouchStart {
                touches: vec![Point::new(10.0, 10.0), Point::new(50.0, 50.0)],
                time_ms: 0,
            },
        );
        ctl.handle_pointer(
            &mut canvas,
            &PointerEvent::TouchMove {
                touches: vec![Point::new(20.0, 30.0), Point::new(60.0, 70.0)],
            },
        );
        assert_eq!(canvas.camera.offset, Vec2::new(10.0, 20.0));
        ctl.handle_pointer(&mut canvas, &PointerEvent::TouchEnd);
        assert_eq!(ctl.state(), InteractionState::Idle);
    }

    #[test]
    fn test_single_touch_drags() {
        let (mut canvas, mut ctl) = setup();
        add_entity(&mut canvas, 1, Point::new(100.0, 100.0), false);
        ctl.handle_pointer(
            &mut canvas,
            &PointerEvent::TouchStart {
                touches: vec![Point::new(100.0, 100.0)],
                time_ms: 0,
            },
        );
        ctl.handle_pointer(
            &mut canvas,
            &PointerEvent::TouchMove {
                touches: vec![Point::new(110.0, 100.0)],
            },
        );
        ctl.handle_pointer(&mut canvas, &PointerEvent::TouchEnd);
        assert_eq!(canvas.scene.get(1).unwrap().center(), Point::new(110.0, 100.0));
        assert_eq!(ctl.state(), InteractionState::Idle);
    }
}
