//! Board state container.
//!
//! A [`Board`] owns the item collections, the selection, the viewport and the
//! gesture state of one drawing board. It is driven from a single thread:
//! every operation updates memory synchronously and records the writes it
//! implies as [`PersistOp`]s, which the host drains with
//! [`Board::take_persist_ops`].

use crate::config::{ConfigError, EngineConfig};
use crate::input::{InputState, PointerEvent, ZoomPan};
use crate::items::{
    BoardItems, CanvasItem, ItemHandle, ItemId, ItemKind, SerializableColor, ShapeKind,
    TextMeasurer,
};
use crate::selection::{Selection, SelectionEngine, hit_test};
use crate::storage::{BoardMeta, PersistOp, ViewportSaver};
use crate::tools::{DrawingMode, ToolManager};
use crate::transform::{GestureStart, TransformContext, TransformController};
use crate::viewport::Viewport;
use kurbo::{Point, Rect};

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// One drawing board and everything needed to edit it.
pub struct Board {
    config: EngineConfig,
    meta: BoardMeta,
    items: BoardItems,
    selection: SelectionEngine,
    viewport: Viewport,
    transform: TransformController,
    tools: ToolManager,
    input: InputState,
    /// Color of new items.
    current_color: SerializableColor,
    /// On-screen font size of new text.
    font_size: f64,
    /// Text item currently open in an editor; it is not drawn.
    editing_text: Option<ItemId>,
    measurer: Option<Box<dyn TextMeasurer>>,
    /// Decision taken at the last pointer-down in selection mode.
    gesture_start: Option<GestureStart>,
    viewport_saver: ViewportSaver,
    outbox: Vec<PersistOp>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board with the default configuration.
    pub fn new() -> Self {
        Self::from_valid_config(EngineConfig::default())
    }

    /// Create an empty board, rejecting a configuration that fails
    /// [`EngineConfig::validate`].
    pub fn with_config(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: EngineConfig) -> Self {
        Self {
            meta: BoardMeta::new(""),
            items: BoardItems::new(),
            selection: SelectionEngine::new(),
            viewport: Viewport::with_limits(config.min_scale, config.max_scale),
            transform: TransformController::new(),
            tools: ToolManager::new(),
            input: InputState::new(),
            current_color: SerializableColor::default(),
            font_size: config.default_font_size,
            editing_text: None,
            measurer: None,
            gesture_start: None,
            viewport_saver: ViewportSaver::new(config.viewport_save_debounce()),
            outbox: Vec::new(),
            config,
        }
    }

    /// Use exact text metrics instead of the estimate.
    pub fn set_measurer(&mut self, measurer: Box<dyn TextMeasurer>) {
        self.measurer = Some(measurer);
    }

    pub fn measurer(&self) -> Option<&dyn TextMeasurer> {
        self.measurer.as_deref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn meta(&self) -> &BoardMeta {
        &self.meta
    }

    pub fn id(&self) -> &str {
        &self.meta.id
    }

    pub fn items(&self) -> &BoardItems {
        &self.items
    }

    pub fn selection(&self) -> &Selection {
        self.selection.selection()
    }

    pub fn selection_engine(&self) -> &SelectionEngine {
        &self.selection
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn tools(&self) -> &ToolManager {
        &self.tools
    }

    pub fn transform(&self) -> &TransformController {
        &self.transform
    }

    pub fn current_color(&self) -> SerializableColor {
        self.current_color
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    pub fn editing_text(&self) -> Option<&str> {
        self.editing_text.as_deref()
    }

    /// Replace everything with a stored board.
    ///
    /// Returns the ops still undrained for the previous board, including its
    /// pending viewport save.
    pub fn load(&mut self, meta: BoardMeta, items: BoardItems) -> Vec<PersistOp> {
        self.flush_viewport_save();
        let previous = std::mem::take(&mut self.outbox);
        self.viewport = meta.viewport(self.config.min_scale, self.config.max_scale);
        self.items = items;
        self.selection.clear();
        self.selection.rebuild_groups(&self.items);
        self.reset_gestures();
        log::info!("Loaded board {} with {} item(s)", meta.id, self.items.len());
        self.meta = meta;
        previous
    }

    /// Remove every item from the board.
    pub fn clear_board(&mut self) {
        self.items.clear();
        self.selection.clear();
        self.reset_gestures();
        self.outbox.push(PersistOp::ClearBoard);
        self.meta.touch();
        log::info!("Cleared board {}", self.meta.id);
    }

    fn reset_gestures(&mut self) {
        self.transform.cancel();
        self.tools.cancel();
        self.input = InputState::new();
        self.gesture_start = None;
        self.editing_text = None;
    }

    /// Drain the writes recorded since the last call.
    pub fn take_persist_ops(&mut self) -> Vec<PersistOp> {
        std::mem::take(&mut self.outbox)
    }

    fn persist_upsert(&mut self, item: CanvasItem) {
        self.outbox.push(PersistOp::Upsert(item));
        self.meta.touch();
    }

    fn add_item(&mut self, item: CanvasItem) -> ItemId {
        let id = item.id().to_string();
        self.items.push(item.clone());
        self.persist_upsert(item);
        id
    }

    /// Switch drawing mode. Entering a mode clears the selection.
    pub fn set_drawing_mode(&mut self, mode: Option<DrawingMode>) {
        if mode.is_some() {
            self.selection.deselect();
            self.transform.cancel();
        }
        self.tools.set_mode(mode);
        log::debug!("Drawing mode {:?}", mode);
    }

    pub fn set_lasso(&mut self, enabled: bool) {
        self.tools.set_lasso(enabled);
    }

    pub fn set_shape_kind(&mut self, kind: ShapeKind) {
        self.tools.shape_kind = kind;
    }

    pub fn set_shape_filled(&mut self, filled: bool) {
        self.tools.shape_filled = filled;
    }

    /// Set the current color and recolor the selection.
    pub fn set_color(&mut self, color: SerializableColor) {
        self.current_color = color;
        let changed: Vec<CanvasItem> = self
            .selection
            .selection()
            .iter()
            .filter_map(|r| self.items.get(r))
            .map(|h| {
                let mut item = h.to_item();
                item.set_color(color);
                item
            })
            .collect();
        for item in changed {
            self.items.replace(item.clone());
            self.persist_upsert(item);
        }
    }

    /// Set the current font size and apply it to selected text.
    pub fn set_font_size(&mut self, size: f64) {
        if size.is_nan() || size <= 0.0 {
            return;
        }
        self.font_size = size;
        let changed: Vec<CanvasItem> = self
            .selection
            .selection()
            .ids_of(ItemKind::Text)
            .filter_map(|id| self.items.texts.iter().find(|t| t.id == id))
            .map(|t| {
                let mut text = t.clone();
                text.font_size = size;
                CanvasItem::Text(text)
            })
            .collect();
        for item in changed {
            self.items.replace(item.clone());
            self.persist_upsert(item);
        }
    }

    fn adopt_selection_color(&mut self) {
        let color = self
            .selection
            .selection()
            .first()
            .and_then(|r| self.items.get(r))
            .map(|h| h.color());
        if let Some(color) = color {
            self.current_color = color;
        }
    }

    /// Topmost item at a canvas point.
    pub fn item_at(&self, point: Point) -> Option<ItemHandle<'_>> {
        hit_test(point, &self.items.handles(), self.measurer())
    }

    /// Select the topmost item at a canvas point and adopt its color.
    pub fn select_at(&mut self, point: Point) -> bool {
        let selected = self.selection.select_at(point, &self.items, self.measurer.as_deref());
        if selected {
            self.adopt_selection_color();
        }
        selected
    }

    pub fn deselect(&mut self) {
        self.selection.deselect();
    }

    /// Replace the selection with the items inside a lasso stroke.
    pub fn lasso_select(&mut self, stroke: &[Point]) -> bool {
        let selected = self.selection.lasso_select(stroke, &self.items, self.measurer.as_deref());
        if selected {
            self.adopt_selection_color();
        }
        selected
    }

    pub fn combined_bounds(&self) -> Option<Rect> {
        self.selection.combined_bounds(&self.items, self.measurer())
    }

    /// Group the selection. Returns false below two items.
    pub fn group_selection(&mut self) -> bool {
        let changed = self.selection.group_selection(&mut self.items);
        let grouped = !changed.is_empty();
        for item in changed {
            self.persist_upsert(item);
        }
        grouped
    }

    pub fn ungroup_selection(&mut self) -> bool {
        let changed = self.selection.ungroup_selection(&mut self.items);
        let ungrouped = !changed.is_empty();
        for item in changed {
            self.persist_upsert(item);
        }
        ungrouped
    }

    /// Delete the selection. Returns the number of items removed.
    pub fn delete_selection(&mut self) -> usize {
        self.transform.cancel();
        let removed = self.selection.delete_selection(&mut self.items);
        for item in &removed {
            if self.editing_text.as_deref() == Some(item.id.as_str()) {
                self.editing_text = None;
            }
            self.outbox.push(PersistOp::Delete(item.id.clone()));
        }
        if !removed.is_empty() {
            self.meta.touch();
            log::debug!("Deleted {} item(s)", removed.len());
        }
        removed.len()
    }

    /// Start a freehand path with the current color.
    pub fn begin_path(&mut self) {
        let width = self.new_stroke_width();
        self.tools.begin_path(self.current_color, width);
    }

    pub fn add_path_point(&mut self, point: Point) {
        self.tools.add_path_point(point);
    }

    /// Finish the path. Empty paths are discarded.
    pub fn end_path(&mut self) -> Option<ItemId> {
        let path = self.tools.end_path()?;
        Some(self.add_item(path.into()))
    }

    pub fn begin_shape(&mut self, point: Point) {
        let width = self.new_stroke_width();
        self.tools.begin_shape(point, self.current_color, width);
    }

    pub fn update_shape(&mut self, point: Point) {
        self.tools.update_shape(point);
    }

    pub fn end_shape(&mut self) -> Option<ItemId> {
        let shape = self.tools.end_shape()?;
        Some(self.add_item(shape.into()))
    }

    /// Stroke width that looks like the default width at the current zoom.
    fn new_stroke_width(&self) -> f64 {
        self.config.default_stroke_width / self.viewport.scale
    }

    /// Record where the next text label goes.
    pub fn place_text(&mut self, point: Point) {
        self.tools.place_text(point, self.viewport.scale);
    }

    /// Create a text label at the recorded placement.
    pub fn commit_text(&mut self, content: &str) -> Option<ItemId> {
        let text = self.tools.commit_text(
            content,
            self.current_color,
            self.font_size,
            &self.config.placeholder_text,
        )?;
        Some(self.add_item(text.into()))
    }

    pub fn cancel_text(&mut self) {
        self.tools.cancel_text();
    }

    /// Open an existing text item for editing. It is hidden until the edit ends.
    pub fn begin_text_edit(&mut self, id: &str) -> bool {
        if !self.items.texts.iter().any(|t| t.id == id) {
            return false;
        }
        self.editing_text = Some(id.to_string());
        true
    }

    /// Replace the edited text's content. Blank content becomes the placeholder.
    pub fn commit_text_edit(&mut self, content: &str) -> bool {
        let Some(id) = self.editing_text.take() else {
            return false;
        };
        let Some(mut text) = self.items.texts.iter().find(|t| t.id == id).cloned() else {
            return false;
        };
        text.content = if content.trim().is_empty() {
            self.config.placeholder_text.clone()
        } else {
            content.to_string()
        };
        self.items.replace(text.clone().into());
        self.persist_upsert(text.into());
        true
    }

    pub fn cancel_text_edit(&mut self) {
        self.editing_text = None;
    }

    pub fn begin_lasso(&mut self, point: Point) {
        self.tools.begin_lasso(point);
    }

    pub fn add_lasso_point(&mut self, point: Point) {
        self.tools.add_lasso_point(point);
    }

    /// Finish the lasso and select what it encloses.
    pub fn end_lasso(&mut self) -> bool {
        let stroke = self.tools.end_lasso();
        self.lasso_select(&stroke)
    }

    /// Route a screen-space pointer event according to the current mode.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        self.input.handle_pointer_event(event);
        let screen = event.position();
        let canvas = self.viewport.screen_to_canvas(screen);

        if self.tools.lasso_enabled {
            match event {
                PointerEvent::Down { .. } => self.begin_lasso(canvas),
                PointerEvent::Move { .. } => self.add_lasso_point(canvas),
                PointerEvent::Up { .. } => {
                    self.end_lasso();
                }
            }
            return;
        }

        match self.tools.mode {
            Some(DrawingMode::Pen) => match event {
                PointerEvent::Down { .. } => {
                    self.begin_path();
                    self.add_path_point(canvas);
                }
                PointerEvent::Move { .. } => self.add_path_point(canvas),
                PointerEvent::Up { .. } => {
                    self.end_path();
                }
            },
            Some(DrawingMode::Shape) => match event {
                PointerEvent::Down { .. } => self.begin_shape(canvas),
                PointerEvent::Move { .. } => self.update_shape(canvas),
                PointerEvent::Up { .. } => {
                    self.end_shape();
                }
            },
            Some(DrawingMode::Text) => {
                if matches!(event, PointerEvent::Up { .. }) && self.input.is_tap() {
                    self.place_text(canvas);
                }
            }
            None => self.handle_selection_pointer(event, screen, canvas),
        }
    }

    fn handle_selection_pointer(&mut self, event: PointerEvent, screen: Point, canvas: Point) {
        match event {
            PointerEvent::Down { .. } => {
                if self.selection.selection().is_empty() {
                    self.gesture_start = None;
                    return;
                }
                let ctx = TransformContext {
                    viewport: &self.viewport,
                    config: &self.config,
                    measurer: self.measurer.as_deref(),
                };
                let start = self.transform.begin(screen, ctx, &mut self.selection, &self.items);
                if start == GestureStart::SelectAndMove {
                    self.adopt_selection_color();
                }
                self.gesture_start = Some(start);
            }
            PointerEvent::Move { .. } => {
                let ctx = TransformContext {
                    viewport: &self.viewport,
                    config: &self.config,
                    measurer: self.measurer.as_deref(),
                };
                self.transform.update(screen, ctx, &self.selection, &mut self.items);
            }
            PointerEvent::Up { .. } => {
                let records = self.transform.end(&self.selection, &self.items);
                for item in records {
                    self.persist_upsert(item);
                }
                let start = self.gesture_start.take();
                if self.input.is_tap() && matches!(start, None | Some(GestureStart::Move)) {
                    self.select_at(canvas);
                }
            }
        }
    }

    /// Apply a pinch/pan step. Only honored in selection mode with nothing selected.
    pub fn handle_zoom_pan(&mut self, gesture: ZoomPan, now: Instant) -> bool {
        if !self.tools.is_selection_mode() || !self.selection.selection().is_empty() {
            return false;
        }
        self.viewport
            .apply_zoom_pan(gesture.centroid, gesture.pan, gesture.zoom);
        self.viewport_saver.schedule(self.viewport, now);
        true
    }

    /// Record the debounced viewport save once it is due.
    pub fn poll_viewport_save(&mut self, now: Instant) -> bool {
        match self.viewport_saver.poll(now) {
            Some(viewport) => {
                self.record_viewport(viewport);
                true
            }
            None => false,
        }
    }

    /// Record any pending viewport save immediately.
    pub fn flush_viewport_save(&mut self) -> bool {
        match self.viewport_saver.flush() {
            Some(viewport) => {
                self.record_viewport(viewport);
                true
            }
            None => false,
        }
    }

    fn record_viewport(&mut self, viewport: Viewport) {
        self.meta.set_viewport(&viewport);
        self.outbox.push(PersistOp::SaveViewport(viewport));
    }

    /// Items overlapping `visible`, in draw order, without the text being edited.
    pub fn visible_items(&self, visible: Rect) -> Vec<ItemHandle<'_>> {
        let measurer = self.measurer();
        self.items
            .handles()
            .into_iter()
            .filter(|h| self.editing_text.as_deref() != Some(h.id()))
            .filter(|h| h.is_visible(visible, measurer))
            .collect()
    }

    /// Combined bounds of the selected items overlapping `visible`.
    pub fn visible_selection_bounds(&self, visible: Rect) -> Option<Rect> {
        let measurer = self.measurer();
        crate::geometry::union_all(
            self.selection
                .selection()
                .iter()
                .filter_map(|r| self.items.get(r))
                .filter(|h| h.is_visible(visible, measurer))
                .map(|h| h.bounds(measurer)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{ShapeData, TextData};
    use kurbo::Vec2;
    use std::time::Duration;

    fn square(x: f64, y: f64, size: f64, color: SerializableColor) -> ShapeData {
        ShapeData::new(
            ShapeKind::Rectangle,
            Point::new(x, y),
            Point::new(x + size, y + size),
            color,
            2.0,
        )
        .with_filled(true)
    }

    fn loaded_board() -> Board {
        let red = SerializableColor::new(255, 0, 0, 255);
        let mut a = square(0.0, 0.0, 40.0, red);
        a.group_id = Some("g1".to_string());
        let mut b = square(100.0, 0.0, 40.0, red);
        b.group_id = Some("g1".to_string());
        let c = square(300.0, 300.0, 40.0, SerializableColor::black());
        let text = TextData::new("hello", Point::new(500.0, 0.0), SerializableColor::black(), 20.0);

        let mut board = Board::new();
        board.load(
            BoardMeta::with_id("b1", "Test"),
            BoardItems::from_parts(Vec::new(), vec![a, b, c], vec![text]),
        );
        board
    }

    fn down(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down { position: Point::new(x, y) }
    }

    fn moved(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Move { position: Point::new(x, y) }
    }

    fn up(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Up { position: Point::new(x, y) }
    }

    #[test]
    fn test_load_rebuilds_groups() {
        let board = loaded_board();
        assert_eq!(board.id(), "b1");
        assert_eq!(board.items().len(), 4);
        assert_eq!(board.selection_engine().groups().len(), 2);
        assert!(board.selection().is_empty());
    }

    #[test]
    fn test_load_restores_viewport() {
        let mut meta = BoardMeta::with_id("b2", "Zoomed");
        meta.scale = 50.0;
        meta.pan = Vec2::new(5.0, 6.0);
        let mut board = Board::new();
        board.load(meta, BoardItems::new());
        assert!((board.viewport().scale - 10.0).abs() < f64::EPSILON);
        assert_eq!(board.viewport().pan, Vec2::new(5.0, 6.0));
    }

    #[test]
    fn test_load_returns_undrained_ops() {
        let mut board = loaded_board();
        board.clear_board();
        let gesture = ZoomPan {
            centroid: Point::ZERO,
            pan: Vec2::new(7.0, 0.0),
            zoom: 1.0,
        };
        assert!(board.handle_zoom_pan(gesture, Instant::now()));

        let previous = board.load(BoardMeta::with_id("b2", "Next"), BoardItems::new());
        assert_eq!(previous.len(), 2);
        assert!(matches!(previous[0], PersistOp::ClearBoard));
        let PersistOp::SaveViewport(saved) = &previous[1] else {
            panic!("expected the pending viewport save");
        };
        assert_eq!(saved.pan, Vec2::new(7.0, 0.0));

        assert!(board.take_persist_ops().is_empty());
        assert!(!board.flush_viewport_save());
        assert_eq!(board.id(), "b2");
    }

    #[test]
    fn test_with_config_rejects_invalid_limits() {
        let inverted = EngineConfig {
            min_scale: 5.0,
            max_scale: 2.0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            Board::with_config(inverted),
            Err(ConfigError::Invalid(_))
        ));

        let no_grid = EngineConfig {
            grid_size: 0.0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            Board::with_config(no_grid),
            Err(ConfigError::Invalid(_))
        ));

        let board = Board::with_config(EngineConfig {
            max_scale: 4.0,
            ..EngineConfig::default()
        })
        .unwrap();
        assert!((board.viewport().max_scale - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tap_selects_group_and_adopts_color() {
        let mut board = loaded_board();
        board.handle_pointer(down(10.0, 10.0));
        board.handle_pointer(up(10.0, 10.0));

        assert_eq!(board.selection().len(), 2);
        assert_eq!(board.current_color(), SerializableColor::new(255, 0, 0, 255));
        assert!(board.take_persist_ops().is_empty());
    }

    #[test]
    fn test_drag_without_selection_moves_nothing() {
        let mut board = loaded_board();
        board.handle_pointer(down(10.0, 10.0));
        board.handle_pointer(moved(40.0, 30.0));
        board.handle_pointer(up(60.0, 50.0));

        assert!(board.selection().is_empty());
        assert!(board.transform().is_idle());
        assert_eq!(board.items().shapes[0].start, Point::new(0.0, 0.0));
        assert!(board.take_persist_ops().is_empty());
    }

    #[test]
    fn test_drag_moves_selection_and_persists() {
        let mut board = loaded_board();
        board.select_at(Point::new(10.0, 10.0));

        board.handle_pointer(down(20.0, 20.0));
        board.handle_pointer(moved(30.0, 25.0));
        board.handle_pointer(moved(50.0, 40.0));
        board.handle_pointer(up(50.0, 40.0));

        assert_eq!(board.items().shapes[0].start, Point::new(30.0, 20.0));
        assert_eq!(board.items().shapes[1].start, Point::new(130.0, 20.0));
        assert_eq!(board.items().shapes[2].start, Point::new(300.0, 300.0));

        let ops = board.take_persist_ops();
        assert_eq!(ops.len(), 2);
        assert!(ops.iter().all(|op| matches!(op, PersistOp::Upsert(_))));
    }

    #[test]
    fn test_tap_on_empty_canvas_deselects() {
        let mut board = loaded_board();
        board.select_at(Point::new(310.0, 310.0));
        assert_eq!(board.selection().len(), 1);

        board.handle_pointer(down(900.0, 900.0));
        board.handle_pointer(up(900.0, 900.0));
        assert!(board.selection().is_empty());
    }

    #[test]
    fn test_resize_via_handle() {
        let mut board = loaded_board();
        board.select_at(Point::new(310.0, 310.0));
        // Bounds (300,300)-(340,340); handle box padded by 24.
        board.handle_pointer(down(364.0, 364.0));
        assert!(board.transform().is_resizing());

        // Box is 88 wide; drag the corner out by 88 to double it.
        board.handle_pointer(moved(452.0, 452.0));
        board.handle_pointer(up(452.0, 452.0));

        let shape = &board.items().shapes[2];
        assert!((shape.start.x - 280.0).abs() < 1e-9);
        assert!((shape.end.x - 360.0).abs() < 1e-9);
        assert_eq!(board.take_persist_ops().len(), 1);
    }

    #[test]
    fn test_pen_mode_creates_path() {
        let mut board = loaded_board();
        board.select_at(Point::new(10.0, 10.0));
        board.set_drawing_mode(Some(DrawingMode::Pen));
        assert!(board.selection().is_empty());

        board.handle_pointer(down(0.0, 0.0));
        board.handle_pointer(moved(10.0, 0.0));
        board.handle_pointer(moved(10.0, 10.0));
        assert!(board.tools().current_path().is_some());
        board.handle_pointer(up(10.0, 10.0));

        let path = &board.items().paths[0];
        assert_eq!(path.points.len(), 3);
        assert!((path.stroke_width - 8.0).abs() < f64::EPSILON);
        assert!(path.contains_point(Point::new(10.0, 5.0)));

        let ops = board.take_persist_ops();
        assert!(matches!(&ops[..], [PersistOp::Upsert(CanvasItem::Path(_))]));
    }

    #[test]
    fn test_new_stroke_width_follows_zoom() {
        let mut board = Board::new();
        board.handle_zoom_pan(
            ZoomPan {
                centroid: Point::ZERO,
                pan: Vec2::ZERO,
                zoom: 2.0,
            },
            Instant::now(),
        );
        board.set_drawing_mode(Some(DrawingMode::Shape));
        board.set_shape_kind(ShapeKind::Line);
        board.handle_pointer(down(0.0, 0.0));
        board.handle_pointer(moved(100.0, 0.0));
        board.handle_pointer(up(100.0, 0.0));

        let line = &board.items().shapes[0];
        assert_eq!(line.kind, ShapeKind::Line);
        assert_eq!(line.end, Point::new(50.0, 0.0));
        assert!((line.stroke_width - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_text_mode_tap_then_commit() {
        let mut board = Board::new();
        board.set_drawing_mode(Some(DrawingMode::Text));
        board.handle_pointer(down(40.0, 50.0));
        board.handle_pointer(up(40.0, 50.0));
        assert!(board.tools().text_placement().is_some());

        let id = board.commit_text("").unwrap();
        let text = &board.items().texts[0];
        assert_eq!(text.id, id);
        assert_eq!(text.content, "Text");
        assert_eq!(text.position, Point::new(40.0, 50.0));
        assert!((text.font_size - 24.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lasso_gesture() {
        let mut board = loaded_board();
        board.set_lasso(true);
        board.handle_pointer(down(250.0, 250.0));
        board.handle_pointer(moved(400.0, 250.0));
        board.handle_pointer(moved(400.0, 400.0));
        board.handle_pointer(moved(250.0, 400.0));
        board.handle_pointer(up(250.0, 400.0));

        assert_eq!(board.selection().len(), 1);
        assert!(board.tools().lasso_points().is_empty());
        assert_eq!(board.current_color(), SerializableColor::black());
    }

    #[test]
    fn test_set_color_recolors_selection() {
        let mut board = loaded_board();
        board.select_at(Point::new(10.0, 10.0));
        let blue = SerializableColor::new(0, 0, 255, 255);
        board.set_color(blue);

        assert_eq!(board.items().shapes[0].color, blue);
        assert_eq!(board.items().shapes[1].color, blue);
        assert_eq!(board.items().shapes[2].color, SerializableColor::black());
        assert_eq!(board.take_persist_ops().len(), 2);
    }

    #[test]
    fn test_set_font_size_only_touches_text() {
        let mut board = loaded_board();
        board.lasso_select(&[
            Point::new(-50.0, -50.0),
            Point::new(800.0, -50.0),
            Point::new(800.0, 100.0),
            Point::new(-50.0, 100.0),
        ]);
        assert_eq!(board.selection().len(), 3);

        board.set_font_size(32.0);
        assert!((board.items().texts[0].font_size - 32.0).abs() < f64::EPSILON);
        assert_eq!(board.take_persist_ops().len(), 1);
    }

    #[test]
    fn test_group_ungroup_delete_persist() {
        let mut board = loaded_board();
        board.select_at(Point::new(310.0, 310.0));
        assert!(!board.group_selection());

        board.select_at(Point::new(10.0, 10.0));
        assert!(board.ungroup_selection());
        assert_eq!(board.take_persist_ops().len(), 2);

        board.select_at(Point::new(10.0, 10.0));
        assert_eq!(board.selection().len(), 1);
        assert_eq!(board.delete_selection(), 1);
        let ops = board.take_persist_ops();
        assert!(matches!(&ops[..], [PersistOp::Delete(_)]));
        assert_eq!(board.items().shapes.len(), 2);
    }

    #[test]
    fn test_clear_board() {
        let mut board = loaded_board();
        board.select_at(Point::new(10.0, 10.0));
        board.clear_board();

        assert!(board.items().is_empty());
        assert!(board.selection().is_empty());
        assert!(board.selection_engine().groups().is_empty());
        assert_eq!(board.take_persist_ops(), vec![PersistOp::ClearBoard]);
    }

    #[test]
    fn test_zoom_pan_requires_empty_selection() {
        let mut board = loaded_board();
        let gesture = ZoomPan {
            centroid: Point::new(100.0, 100.0),
            pan: Vec2::new(10.0, 0.0),
            zoom: 1.5,
        };
        board.select_at(Point::new(10.0, 10.0));
        assert!(!board.handle_zoom_pan(gesture, Instant::now()));

        board.deselect();
        board.set_drawing_mode(Some(DrawingMode::Pen));
        assert!(!board.handle_zoom_pan(gesture, Instant::now()));

        board.set_drawing_mode(None);
        assert!(board.handle_zoom_pan(gesture, Instant::now()));
        assert!((board.viewport().scale - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_viewport_save_is_debounced() {
        let mut board = Board::new();
        let start = Instant::now();
        let gesture = ZoomPan {
            centroid: Point::ZERO,
            pan: Vec2::new(5.0, 5.0),
            zoom: 1.0,
        };
        board.handle_zoom_pan(gesture, start);
        board.handle_zoom_pan(gesture, start + Duration::from_millis(300));

        assert!(!board.poll_viewport_save(start + Duration::from_millis(600)));
        assert!(board.poll_viewport_save(start + Duration::from_millis(800)));

        let ops = board.take_persist_ops();
        assert_eq!(ops.len(), 1);
        let PersistOp::SaveViewport(saved) = &ops[0] else {
            panic!("expected a viewport save");
        };
        assert_eq!(saved.pan, Vec2::new(10.0, 10.0));
        assert_eq!(board.meta().pan, Vec2::new(10.0, 10.0));
        assert!(!board.flush_viewport_save());
    }

    #[test]
    fn test_text_edit_hides_item() {
        let mut board = loaded_board();
        let id = board.items().texts[0].id.clone();
        let visible = Rect::new(-1000.0, -1000.0, 1000.0, 1000.0);
        assert_eq!(board.visible_items(visible).len(), 4);

        assert!(board.begin_text_edit(&id));
        assert_eq!(board.visible_items(visible).len(), 3);

        assert!(board.commit_text_edit("updated"));
        assert_eq!(board.items().texts[0].content, "updated");
        assert_eq!(board.visible_items(visible).len(), 4);
    }

    #[test]
    fn test_visible_selection_bounds() {
        let mut board = loaded_board();
        board.select_at(Point::new(10.0, 10.0));
        let left_only = Rect::new(-10.0, -10.0, 50.0, 50.0);
        assert_eq!(
            board.visible_selection_bounds(left_only),
            Some(Rect::new(0.0, 0.0, 40.0, 40.0))
        );
        assert_eq!(
            board.combined_bounds(),
            Some(Rect::new(0.0, 0.0, 140.0, 40.0))
        );
    }

    #[test]
    fn test_empty_pen_tap_keeps_dot() {
        let mut board = Board::new();
        board.set_drawing_mode(Some(DrawingMode::Pen));
        board.handle_pointer(down(5.0, 5.0));
        board.handle_pointer(up(5.0, 5.0));
        assert_eq!(board.items().paths.len(), 1);
        assert_eq!(board.items().paths[0].points, vec![Point::new(5.0, 5.0)]);

        // A path begun outside a gesture with no points is dropped.
        board.begin_path();
        assert!(board.end_path().is_none());
        assert_eq!(board.items().paths.len(), 1);
    }
}
