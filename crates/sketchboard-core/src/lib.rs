//! Sketchboard Core Library
//!
//! Canvas geometry engine for the sketchboard drawing board: item model,
//! hit-testing, group-aware selection, lasso selection, move/resize
//! transforms under a zoom/pan viewport, and board persistence.

pub mod board;
pub mod config;
pub mod factory;
pub mod geometry;
pub mod input;
pub mod items;
pub mod selection;
pub mod storage;
pub mod tools;
pub mod transform;
pub mod viewport;

pub use board::Board;
pub use config::{ConfigError, EngineConfig};
pub use factory::create_items;
pub use input::{InputState, PointerEvent, ZoomPan};
pub use items::{
    BoardItems, CanvasItem, DrawIntent, ItemHandle, ItemId, ItemKind, ItemRef, PALETTE, PathData,
    SerializableColor, ShapeData, ShapeKind, TextData, TextMeasurer,
};
pub use selection::{GroupIndex, Selection, SelectionEngine};
pub use storage::{
    BoardMeta, BoardRepository, MemoryStorage, PersistOp, PersistenceDispatcher, StorageError,
    StorageResult, ViewportSaver,
};
pub use tools::{DrawingMode, ToolManager};
pub use transform::{GestureStart, ResizeHandle, ResizeSnapshot, TransformController};
pub use viewport::Viewport;

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
