//! Tabletop Core Library
//!
//! Scene model, hit testing, interaction state machine, annotations, dice and
//! persistence for the Tabletop virtual tabletop canvas. Nothing in this crate
//! touches a windowing system; platform shells feed it input events and read
//! its state back to render.

pub mod annotations;
pub mod camera;
pub mod canvas;
pub mod config;
pub mod dice;
pub mod editor;
pub mod ingest;
pub mod input;
pub mod interaction;
pub mod project;
pub mod scene;
pub mod selection;
pub mod storage;
pub mod tools;

pub use annotations::{Annotation, AnnotationLayer, PathSample, ShapeAnnotation, ShapeKind, StrokeTool};
pub use camera::Camera;
pub use canvas::Canvas;
pub use config::{ConfigError, EditorConfig};
pub use dice::{
    DiceError, DiceFormula, DieRoller, FloatAnimation, FloatingNumber, FloatingNumbers, RollResult,
    ThreadRoller,
};
pub use editor::Editor;
pub use ingest::{ClipboardError, DecodedImage};
pub use input::{Key, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use interaction::{
    CursorHint, Effect, InteractionController, InteractionState, MenuAction, MovementTrack, Notice,
    NoticeLevel,
};
pub use project::{ImportError, ProjectData};
pub use scene::{EntityId, HitPoints, ImageEntity, Note, NoteSize, Scene, SerializableColor};
pub use selection::{Handle, HandleKind};
#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
pub use storage::{AutoSaveManager, MemoryStorage, Storage, StorageError, StorageResult};
pub use tools::{BrushSettings, ToolKind};
