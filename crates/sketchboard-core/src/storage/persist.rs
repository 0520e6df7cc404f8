//! Persistence plumbing between a board and its repository.
//!
//! The board records [`PersistOp`]s synchronously; the host drains them and
//! hands them to a [`PersistenceDispatcher`]. Viewport changes go through a
//! [`ViewportSaver`] first so that a burst of pan/zoom steps becomes one write.

use super::BoardRepository;
use crate::items::{CanvasItem, ItemId};
use crate::viewport::Viewport;
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// A write the board wants the repository to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistOp {
    Upsert(CanvasItem),
    Delete(ItemId),
    ClearBoard,
    SaveViewport(Viewport),
}

impl PersistOp {
    pub fn name(&self) -> &'static str {
        match self {
            PersistOp::Upsert(_) => "upsert",
            PersistOp::Delete(_) => "delete",
            PersistOp::ClearBoard => "clear",
            PersistOp::SaveViewport(_) => "viewport save",
        }
    }
}

/// Debounces viewport saves.
#[derive(Debug, Clone)]
pub struct ViewportSaver {
    debounce: Duration,
    /// Viewport waiting to be written and when it was scheduled.
    pending: Option<(Viewport, Instant)>,
}

impl ViewportSaver {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            pending: None,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Schedule a save, cancelling and replacing any pending one.
    pub fn schedule(&mut self, viewport: Viewport, now: Instant) {
        self.pending = Some((viewport, now));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The pending viewport, once the debounce has elapsed since it was scheduled.
    pub fn poll(&mut self, now: Instant) -> Option<Viewport> {
        let (_, scheduled) = self.pending?;
        if now.saturating_duration_since(scheduled) < self.debounce {
            return None;
        }
        self.pending.take().map(|(viewport, _)| viewport)
    }

    /// The pending viewport, immediately.
    pub fn flush(&mut self) -> Option<Viewport> {
        self.pending.take().map(|(viewport, _)| viewport)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Runs persistence ops against a repository for one board.
///
/// Failures are logged and dropped; in-memory state is never rolled back.
pub struct PersistenceDispatcher<R: BoardRepository> {
    repository: Arc<R>,
    board_id: String,
}

impl<R: BoardRepository> PersistenceDispatcher<R> {
    pub fn new(repository: Arc<R>, board_id: impl Into<String>) -> Self {
        Self {
            repository,
            board_id: board_id.into(),
        }
    }

    pub fn board_id(&self) -> &str {
        &self.board_id
    }

    pub fn set_board_id(&mut self, board_id: impl Into<String>) {
        self.board_id = board_id.into();
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Perform one op. Returns whether it succeeded.
    pub async fn dispatch(&self, op: PersistOp) -> bool {
        let result = match &op {
            PersistOp::Upsert(item) => self.repository.upsert_item(&self.board_id, item).await,
            PersistOp::Delete(id) => self.repository.delete_item(id).await,
            PersistOp::ClearBoard => self.repository.clear_board(&self.board_id).await,
            PersistOp::SaveViewport(viewport) => {
                self.repository.save_viewport(&self.board_id, viewport).await
            }
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Dropped {} for board {}: {}", op.name(), self.board_id, e);
                false
            }
        }
    }

    /// Perform every op in order. Returns how many succeeded.
    pub async fn dispatch_all(&self, ops: Vec<PersistOp>) -> usize {
        let mut succeeded = 0;
        for op in ops {
            if self.dispatch(op).await {
                succeeded += 1;
            }
        }
        succeeded
    }
}
