//! Storage abstraction for board persistence.

mod memory;
mod persist;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;
pub use persist::{PersistOp, PersistenceDispatcher, ViewportSaver};

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::items::{BoardItems, CanvasItem};
use crate::viewport::Viewport;
use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Board not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future returned by repository operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Board metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardMeta {
    pub id: String,
    pub title: String,
    /// Creation time, ms since the Unix epoch.
    pub created_at: u64,
    /// Last modification time, ms since the Unix epoch.
    pub updated_at: u64,
    /// Saved viewport scale.
    pub scale: f64,
    /// Saved viewport pan.
    pub pan: Vec2,
}

impl BoardMeta {
    /// Metadata for a new board with a fresh id.
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), title)
    }

    pub fn with_id(id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: id.into(),
            title: title.into(),
            created_at: now,
            updated_at: now,
            scale: 1.0,
            pan: Vec2::ZERO,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_millis().max(self.updated_at);
    }

    /// The saved viewport with the given zoom limits.
    pub fn viewport(&self, min_scale: f64, max_scale: f64) -> Viewport {
        let mut viewport = Viewport::with_limits(min_scale, max_scale);
        viewport.restore(self.scale, self.pan);
        viewport
    }

    pub fn set_viewport(&mut self, viewport: &Viewport) {
        self.scale = viewport.scale;
        self.pan = viewport.pan;
    }
}

/// A board and its items as one stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardDocument {
    pub meta: BoardMeta,
    #[serde(default)]
    pub items: BoardItems,
}

impl BoardDocument {
    pub fn new(meta: BoardMeta) -> Self {
        Self {
            meta,
            items: BoardItems::new(),
        }
    }

    /// Insert or fully replace the record with the item's id.
    pub fn upsert(&mut self, item: CanvasItem) {
        if !self.items.replace(item.clone()) {
            self.items.push(item);
        }
        self.meta.touch();
    }

    /// Remove the item with `id`. Returns false if it was not stored here.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(item_ref) = self.items.find(id).map(|h| h.item_ref()) else {
            return false;
        };
        self.items.remove(&item_ref);
        self.meta.touch();
        true
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Persistence collaborator for boards and their items.
///
/// Upserts are full-record replaces and may be repeated. Deleting an
/// unknown item succeeds.
pub trait BoardRepository: Send + Sync {
    /// Load a board's items. Unknown boards have none.
    fn load_board_items(&self, board_id: &str) -> BoxFuture<'_, StorageResult<BoardItems>>;

    /// Insert or replace one item, creating the board record if needed.
    fn upsert_item(&self, board_id: &str, item: &CanvasItem) -> BoxFuture<'_, StorageResult<()>>;

    /// Delete one item from whichever board holds it.
    fn delete_item(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Remove every item of a board, keeping its metadata.
    fn clear_board(&self, board_id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Create or update board metadata.
    fn save_board(&self, meta: &BoardMeta) -> BoxFuture<'_, StorageResult<()>>;

    fn load_board(&self, board_id: &str) -> BoxFuture<'_, StorageResult<BoardMeta>>;

    /// Metadata of every stored board.
    fn list_boards(&self) -> BoxFuture<'_, StorageResult<Vec<BoardMeta>>>;

    /// Delete a board and its items.
    fn delete_board(&self, board_id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Store the viewport on the board's metadata.
    fn save_viewport(
        &self,
        board_id: &str,
        viewport: &Viewport,
    ) -> BoxFuture<'_, StorageResult<()>>;
}

#[cfg(test)]
pub(crate) fn block_on<F: std::future::Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        match f.as_mut().poll(&mut cx) {
            Poll::Ready(result) => return result,
            Poll::Pending => {}
        }
    }
}
