//! Board repository backed by a directory of JSON documents.

use super::{BoardDocument, BoardMeta, BoardRepository, BoxFuture, StorageError, StorageResult};
use crate::items::{BoardItems, CanvasItem};
use crate::viewport::Viewport;
use std::fs;
use std::path::{Path, PathBuf};

/// One `<board-id>.json` document per board, holding its metadata and items.
pub struct FileStorage {
    /// Base directory for board storage.
    base_path: PathBuf,
}

impl FileStorage {
    /// Open `base_path`, creating it if missing.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        log::info!("Using board storage at {}", base_path.display());
        Ok(Self { base_path })
    }

    /// Open the per-user board directory.
    ///
    /// On Unix: `~/.local/share/sketchboard/boards/`
    /// On Windows: `%LOCALAPPDATA%\sketchboard\boards\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("sketchboard").join("boards"))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn board_path(&self, id: &str) -> PathBuf {
        // Anything outside [A-Za-z0-9_-] becomes '_'
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", safe_id))
    }

    fn read_document(path: &Path) -> StorageResult<BoardDocument> {
        let json = fs::read_to_string(path).map_err(|e| {
            StorageError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;
        BoardDocument::from_json(&json).map_err(|e| {
            StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    fn write_document(path: &Path, document: &BoardDocument) -> StorageResult<()> {
        let json = document
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(path, json).map_err(|e| {
            StorageError::Io(format!("Failed to write {}: {}", path.display(), e))
        })
    }

    /// Load a board document, or `None` if it was never stored.
    fn load_document(&self, id: &str) -> StorageResult<Option<BoardDocument>> {
        let path = self.board_path(id);
        if !path.exists() {
            return Ok(None);
        }
        Self::read_document(&path).map(Some)
    }

    /// Paths of every stored board file.
    fn document_paths(&self) -> StorageResult<Vec<PathBuf>> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.base_path)
            .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

        Ok(entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|e| e == "json"))
            .collect())
    }
}

impl BoardRepository for FileStorage {
    fn load_board_items(&self, board_id: &str) -> BoxFuture<'_, StorageResult<BoardItems>> {
        let board_id = board_id.to_string();
        Box::pin(async move {
            Ok(self
                .load_document(&board_id)?
                .map(|doc| doc.items)
                .unwrap_or_default())
        })
    }

    fn upsert_item(&self, board_id: &str, item: &CanvasItem) -> BoxFuture<'_, StorageResult<()>> {
        let board_id = board_id.to_string();
        let item = item.clone();
        Box::pin(async move {
            let mut doc = self
                .load_document(&board_id)?
                .unwrap_or_else(|| BoardDocument::new(BoardMeta::with_id(board_id.clone(), "")));
            doc.upsert(item);
            Self::write_document(&self.board_path(&board_id), &doc)
        })
    }

    fn delete_item(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            for path in self.document_paths()? {
                let mut doc = Self::read_document(&path)?;
                if doc.remove(&id) {
                    return Self::write_document(&path, &doc);
                }
            }
            Ok(())
        })
    }

    fn clear_board(&self, board_id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let board_id = board_id.to_string();
        Box::pin(async move {
            let Some(mut doc) = self.load_document(&board_id)? else {
                return Ok(());
            };
            doc.items.clear();
            doc.meta.touch();
            Self::write_document(&self.board_path(&board_id), &doc)
        })
    }

    fn save_board(&self, meta: &BoardMeta) -> BoxFuture<'_, StorageResult<()>> {
        let meta = meta.clone();
        Box::pin(async move {
            let doc = match self.load_document(&meta.id)? {
                Some(mut doc) => {
                    doc.meta = meta;
                    doc
                }
                None => BoardDocument::new(meta),
            };
            Self::write_document(&self.board_path(&doc.meta.id), &doc)
        })
    }

    fn load_board(&self, board_id: &str) -> BoxFuture<'_, StorageResult<BoardMeta>> {
        let board_id = board_id.to_string();
        Box::pin(async move {
            self.load_document(&board_id)?
                .map(|doc| doc.meta)
                .ok_or(StorageError::NotFound(board_id))
        })
    }

    fn list_boards(&self) -> BoxFuture<'_, StorageResult<Vec<BoardMeta>>> {
        Box::pin(async move {
            let mut metas = Vec::new();
            for path in self.document_paths()? {
                match Self::read_document(&path) {
                    Ok(doc) => metas.push(doc.meta),
                    Err(e) => log::warn!("Skipping unreadable board file: {}", e),
                }
            }
            metas.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
            Ok(metas)
        })
    }

    fn delete_board(&self, board_id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.board_path(board_id);
        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
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
            let mut doc = self
                .load_document(&board_id)?
                .ok_or_else(|| StorageError::NotFound(board_id.clone()))?;
            doc.meta.set_viewport(&viewport);
            Self::write_document(&self.board_path(&board_id), &doc)
        })
    }
}
