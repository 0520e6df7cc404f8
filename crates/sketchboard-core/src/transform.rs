//! Move and resize of a multi-item selection.
//!
//! A gesture decides once, at pointer-down, whether it moves or resizes the
//! selection. Moves apply incremental deltas; resizes are always recomputed
//! from a [`ResizeSnapshot`] taken when the gesture started.

use crate::config::EngineConfig;
use crate::items::{BoardItems, CanvasItem, TextMeasurer, uniform_scale};
use crate::selection::{Selection, SelectionEngine, combined_bounds};
use crate::viewport::Viewport;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// The eight resize handles around a selection, clockwise from the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResizeHandle {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleRight,
    BottomRight,
    BottomCenter,
    BottomLeft,
    MiddleLeft,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::TopLeft,
        ResizeHandle::TopCenter,
        ResizeHandle::TopRight,
        ResizeHandle::MiddleRight,
        ResizeHandle::BottomRight,
        ResizeHandle::BottomCenter,
        ResizeHandle::BottomLeft,
        ResizeHandle::MiddleLeft,
    ];

    /// Anchor point of this handle on `bounds`.
    pub fn position(self, bounds: Rect) -> Point {
        let center = bounds.center();
        match self {
            ResizeHandle::TopLeft => Point::new(bounds.x0, bounds.y0),
            ResizeHandle::TopCenter => Point::new(center.x, bounds.y0),
            ResizeHandle::TopRight => Point::new(bounds.x1, bounds.y0),
            ResizeHandle::MiddleRight => Point::new(bounds.x1, center.y),
            ResizeHandle::BottomRight => Point::new(bounds.x1, bounds.y1),
            ResizeHandle::BottomCenter => Point::new(center.x, bounds.y1),
            ResizeHandle::BottomLeft => Point::new(bounds.x0, bounds.y1),
            ResizeHandle::MiddleLeft => Point::new(bounds.x0, center.y),
        }
    }

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            ResizeHandle::TopLeft
                | ResizeHandle::TopRight
                | ResizeHandle::BottomRight
                | ResizeHandle::BottomLeft
        )
    }

    /// Per-axis scale produced by dragging this handle of `initial` to `point`.
    ///
    /// The opposite corner or edge stays fixed. Edge handles leave the other
    /// axis at 1. New extents never drop below `min_extent`.
    pub fn scale_for(self, initial: Rect, point: Point, min_extent: f64) -> (f64, f64) {
        let w = initial.width().max(1.0);
        let h = initial.height().max(1.0);

        let from_left = (point.x - initial.x0).max(min_extent) / w;
        let from_right = (initial.x1 - point.x).max(min_extent) / w;
        let from_top = (point.y - initial.y0).max(min_extent) / h;
        let from_bottom = (initial.y1 - point.y).max(min_extent) / h;

        match self {
            ResizeHandle::BottomRight => (from_left, from_top),
            ResizeHandle::BottomLeft => (from_right, from_top),
            ResizeHandle::TopRight => (from_left, from_bottom),
            ResizeHandle::TopLeft => (from_right, from_bottom),
            ResizeHandle::TopCenter => (1.0, from_bottom),
            ResizeHandle::BottomCenter => (1.0, from_top),
            ResizeHandle::MiddleLeft => (from_right, 1.0),
            ResizeHandle::MiddleRight => (from_left, 1.0),
        }
    }
}

/// A resize handle placed on a selection box.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    /// Position in canvas coordinates.
    pub position: Point,
    pub kind: ResizeHandle,
}

impl Handle {
    pub fn new(position: Point, kind: ResizeHandle) -> Self {
        Self { position, kind }
    }

    /// Check if a canvas point lies within `radius` of this handle.
    pub fn hit_test(&self, point: Point, radius: f64) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= radius * radius
    }
}

/// The eight handles of a selection box.
pub fn get_handles(handle_box: Rect) -> Vec<Handle> {
    ResizeHandle::ALL
        .iter()
        .map(|kind| Handle::new(kind.position(handle_box), *kind))
        .collect()
}

/// First handle of `handle_box` within `radius` of `point`.
pub fn hit_test_handles(handle_box: Rect, point: Point, radius: f64) -> Option<ResizeHandle> {
    get_handles(handle_box)
        .into_iter()
        .find(|h| h.hit_test(point, radius))
        .map(|h| h.kind)
}

/// Immutable capture of the board taken when a resize starts.
#[derive(Debug, Clone)]
pub struct ResizeSnapshot {
    /// Every record at resize start.
    pub items: BoardItems,
    /// The selection at resize start.
    pub selection: Selection,
    /// Center of the selection's combined bounds.
    pub center: Point,
    /// Combined bounds inflated by the handle padding; handle drags scale relative to it.
    pub handle_box: Rect,
}

impl ResizeSnapshot {
    /// Capture the board. `None` if no selected item exists.
    pub fn capture(
        items: &BoardItems,
        selection: &Selection,
        measurer: Option<&dyn TextMeasurer>,
        handle_padding: f64,
    ) -> Option<Self> {
        let bounds = combined_bounds(selection, items, measurer)?;
        Some(Self {
            items: items.clone(),
            selection: selection.clone(),
            center: bounds.center(),
            handle_box: bounds.inflate(handle_padding, handle_padding),
        })
    }

    /// The selected records scaled uniformly about the snapshot center.
    pub fn scaled(&self, scale: f64) -> Vec<CanvasItem> {
        self.selection
            .iter()
            .filter_map(|r| self.items.get(r))
            .map(|h| h.resize(self.center, scale, scale))
            .collect()
    }
}

/// Outcome of the move-or-resize decision at pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureStart {
    /// A handle was hit; the selection will be resized.
    Resize(ResizeHandle),
    /// Pressed inside the selection; it will be moved.
    Move,
    /// Pressed on an unselected item; it was selected and will be moved.
    SelectAndMove,
    /// Pressed on empty canvas; the selection was cleared.
    Deselect,
}

/// State of the transform controller.
#[derive(Debug, Clone, Default)]
pub enum TransformState {
    #[default]
    Idle,
    Moving {
        /// Last pointer position in screen coordinates.
        last_screen: Point,
        /// Whether any delta has been applied.
        moved: bool,
    },
    Resizing {
        handle: ResizeHandle,
        snapshot: ResizeSnapshot,
    },
}

/// Everything the controller needs to read while handling a pointer event.
#[derive(Clone, Copy)]
pub struct TransformContext<'a> {
    pub viewport: &'a Viewport,
    pub config: &'a EngineConfig,
    pub measurer: Option<&'a dyn TextMeasurer>,
}

/// Drives move and resize gestures over the current selection.
#[derive(Debug, Clone, Default)]
pub struct TransformController {
    state: TransformState,
}

impl TransformController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &TransformState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, TransformState::Idle)
    }

    pub fn is_moving(&self) -> bool {
        matches!(self.state, TransformState::Moving { .. })
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self.state, TransformState::Resizing { .. })
    }

    /// Decide between resize, move, select-then-move and deselect.
    pub fn begin(
        &mut self,
        screen: Point,
        ctx: TransformContext<'_>,
        selection: &mut SelectionEngine,
        items: &BoardItems,
    ) -> GestureStart {
        let canvas = ctx.viewport.screen_to_canvas(screen);

        if let Some(bounds) = selection.combined_bounds(items, ctx.measurer) {
            let padding = ctx.config.handle_box_padding;
            let radius = ctx.config.handle_hit_radius_at(ctx.viewport.scale);
            let handle = hit_test_handles(bounds.inflate(padding, padding), canvas, radius);
            let snapshot = handle.and_then(|_| {
                ResizeSnapshot::capture(items, selection.selection(), ctx.measurer, padding)
            });
            if let (Some(handle), Some(snapshot)) = (handle, snapshot) {
                log::debug!("Resize started from {:?}", handle);
                self.state = TransformState::Resizing { handle, snapshot };
                return GestureStart::Resize(handle);
            }
            if bounds.contains(canvas) {
                log::debug!("Move started");
                self.start_moving(screen);
                return GestureStart::Move;
            }
        }

        if selection.select_at(canvas, items, ctx.measurer) {
            self.start_moving(screen);
            return GestureStart::SelectAndMove;
        }

        selection.deselect();
        self.state = TransformState::Idle;
        GestureStart::Deselect
    }

    fn start_moving(&mut self, screen: Point) {
        self.state = TransformState::Moving {
            last_screen: screen,
            moved: false,
        };
    }

    /// Apply a pointer move. Returns the number of records updated.
    pub fn update(
        &mut self,
        screen: Point,
        ctx: TransformContext<'_>,
        selection: &SelectionEngine,
        items: &mut BoardItems,
    ) -> usize {
        match &mut self.state {
            TransformState::Idle => 0,
            TransformState::Moving { last_screen, moved } => {
                let delta = ctx.viewport.screen_delta_to_canvas(screen - *last_screen);
                *last_screen = screen;
                if delta == Vec2::ZERO {
                    return 0;
                }
                *moved = true;
                translate_selection(selection.selection(), items, delta)
            }
            TransformState::Resizing { handle, snapshot } => {
                let canvas = ctx.viewport.screen_to_canvas(screen);
                let (sx, sy) =
                    handle.scale_for(snapshot.handle_box, canvas, ctx.config.min_resize_extent);
                let scale = uniform_scale(sx, sy);
                snapshot
                    .scaled(scale)
                    .into_iter()
                    .filter(|item| items.replace(item.clone()))
                    .count()
            }
        }
    }

    /// Finish the gesture. Returns the records to persist.
    pub fn end(&mut self, selection: &SelectionEngine, items: &BoardItems) -> Vec<CanvasItem> {
        match std::mem::take(&mut self.state) {
            TransformState::Idle => Vec::new(),
            TransformState::Moving { moved: false, .. } => Vec::new(),
            TransformState::Moving { moved: true, .. } => {
                current_records(selection.selection(), items)
            }
            TransformState::Resizing { snapshot, .. } => {
                log::debug!("Resize finished for {} item(s)", snapshot.selection.len());
                current_records(&snapshot.selection, items)
            }
        }
    }

    /// Drop any in-flight gesture without persisting.
    pub fn cancel(&mut self) {
        self.state = TransformState::Idle;
    }
}

fn current_records(selection: &Selection, items: &BoardItems) -> Vec<CanvasItem> {
    selection
        .iter()
        .filter_map(|r| items.get(r))
        .map(|h| h.to_item())
        .collect()
}

/// Translate every selected record by `delta`. Missing items are skipped.
pub fn translate_selection(selection: &Selection, items: &mut BoardItems, delta: Vec2) -> usize {
    let moved: Vec<CanvasItem> = selection
        .iter()
        .filter_map(|r| items.get(r))
        .map(|h| h.translate(delta))
        .collect();
    moved.into_iter().filter(|item| items.replace(item.clone())).count()
}
