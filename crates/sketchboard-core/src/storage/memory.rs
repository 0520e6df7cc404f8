//! In-memory storage implementation.

use super::{BoardDocument, BoardMeta, BoardRepository, BoxFuture, StorageError, StorageResult};
use crate::items::{BoardItems, CanvasItem};
use crate::viewport::Viewport;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    boards: RwLock<HashMap<String, BoardDocument>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, HashMap<String, BoardDocument>>> {
        self.boards
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, HashMap<String, BoardDocument>>> {
        self.boards
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))
    }
}

impl BoardRepository for MemoryStorage {
    fn load_board_items(&self, board_id: &str) -> BoxFuture<'_, StorageResult<BoardItems>> {
        let board_id = board_id.to_string();
        Box::pin(async move {
            let boards = self.read()?;
            Ok(boards
                .get(&board_id)
                .map(|doc| doc.items.clone())
                .unwrap_or_default())
        })
    }

    fn upsert_item(&self, board_id: &str, item: &CanvasItem) -> BoxFuture<'_, StorageResult<()>> {
        let board_id = board_id.to_string();
        let item = item.clone();
        Box::pin(async move {
            let mut boards = self.write()?;
            boards
                .entry(board_id.clone())
                .or_insert_with(|| BoardDocument::new(BoardMeta::with_id(board_id, "")))
                .upsert(item);
            Ok(())
        })
    }

    fn delete_item(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut boards = self.write()?;
            for doc in boards.values_mut() {
                if doc.remove(&id) {
                    break;
                }
            }
            Ok(())
        })
    }

    fn clear_board(&self, board_id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let board_id = board_id.to_string();
        Box::pin(async move {
            let mut boards = self.write()?;
            if let Some(doc) = boards.get_mut(&board_id) {
                doc.items.clear();
                doc.meta.touch();
            }
            Ok(())
        })
    }

    fn save_board(&self, meta: &BoardMeta) -> BoxFuture<'_, StorageResult<()>> {
        let meta = meta.clone();
        Box::pin(async move {
            let mut boards = self.write()?;
            match boards.get_mut(&meta.id) {
                Some(doc) => doc.meta = meta,
                None => {
                    boards.insert(meta.id.clone(), BoardDocument::new(meta));
                }
            }
            Ok(())
        })
    }

    fn load_board(&self, board_id: &str) -> BoxFuture<'_, StorageResult<BoardMeta>> {
        let board_id = board_id.to_string();
        Box::pin(async move {
            let boards = self.read()?;
            boards
                .get(&board_id)
                .map(|doc| doc.meta.clone())
                .ok_or(StorageError::NotFound(board_id))
        })
    }

    fn list_boards(&self) -> BoxFuture<'_, StorageResult<Vec<BoardMeta>>> {
        Box::pin(async move {
            let boards = self.read()?;
            let mut metas: Vec<BoardMeta> = boards.values().map(|doc| doc.meta.clone()).collect();
            metas.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
            Ok(metas)
        })
    }

    fn delete_board(&self, board_id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let board_id = board_id.to_string();
        Box::pin(async move {
            let mut boards = self.write()?;
            boards.remove(&board_id);
            Ok(())
        })
    }

    fn save_viewport(
        &self,
        board_id: &str,
        viewport: &Viewport,
    ) -> BoxFuture<'_, StorageResult<()>> {
        let board_id = board_id.to_string();
        let viewport = *viewport;
        Box::pin(async move {
            let mut boards = self.write()?;
            let doc = boards
                .get_mut(&board_id)
                .ok_or_else(|| StorageError::NotFound(board_id.clone()))?;
            doc.meta.set_viewport(&viewport);
            Ok(())
        })
    }
}
