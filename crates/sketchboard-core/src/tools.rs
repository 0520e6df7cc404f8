//! Drawing modes and the items under construction.

use crate::items::{PathData, SerializableColor, ShapeData, ShapeKind, TextData};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Active drawing mode. `None` on the [`ToolManager`] means selection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawingMode {
    Pen,
    Shape,
    Text,
}

/// Where a text label will be created, recorded when the user taps in text mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPlacement {
    /// Canvas position of the label's top-left corner.
    pub position: Point,
    /// Viewport scale at the time of the tap.
    pub scale: f64,
}

/// Manages the current drawing mode and its in-progress items.
///
/// In-progress items are drawn but never hit-tested; they join the board
/// only when their gesture ends.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Current drawing mode, `None` in selection mode.
    pub mode: Option<DrawingMode>,
    /// Whether drags draw a lasso instead.
    pub lasso_enabled: bool,
    /// Kind of shape created in shape mode.
    pub shape_kind: ShapeKind,
    /// Whether new shapes are filled.
    pub shape_filled: bool,
    current_path: Option<PathData>,
    current_shape: Option<ShapeData>,
    lasso_points: Vec<Point>,
    text_placement: Option<TextPlacement>,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch mode, dropping anything in progress.
    pub fn set_mode(&mut self, mode: Option<DrawingMode>) {
        self.mode = mode;
        self.cancel();
    }

    pub fn set_lasso(&mut self, enabled: bool) {
        self.lasso_enabled = enabled;
        self.lasso_points.clear();
    }

    /// True while the board is in selection mode.
    pub fn is_selection_mode(&self) -> bool {
        self.mode.is_none() && !self.lasso_enabled
    }

    /// Check if an item or lasso is being drawn.
    pub fn is_active(&self) -> bool {
        self.current_path.is_some() || self.current_shape.is_some() || !self.lasso_points.is_empty()
    }

    /// Start a freehand path.
    pub fn begin_path(&mut self, color: SerializableColor, stroke_width: f64) {
        self.current_path = Some(PathData::new(color, stroke_width));
    }

    pub fn add_path_point(&mut self, point: Point) {
        if let Some(path) = &mut self.current_path {
            path.add_point(point);
        }
    }

    /// Finish the path. Paths without points are discarded.
    pub fn end_path(&mut self) -> Option<PathData> {
        self.current_path.take().filter(|p| !p.is_empty())
    }

    /// Start a shape of the current kind with start = end = `point`.
    pub fn begin_shape(&mut self, point: Point, color: SerializableColor, stroke_width: f64) {
        self.current_shape = Some(
            ShapeData::new(self.shape_kind, point, point, color, stroke_width)
                .with_filled(self.shape_filled),
        );
    }

    pub fn update_shape(&mut self, point: Point) {
        if let Some(shape) = &mut self.current_shape {
            shape.end = point;
        }
    }

    pub fn end_shape(&mut self) -> Option<ShapeData> {
        self.current_shape.take()
    }

    /// Record where the next text label goes.
    pub fn place_text(&mut self, position: Point, scale: f64) {
        self.text_placement = Some(TextPlacement { position, scale });
    }

    pub fn text_placement(&self) -> Option<&TextPlacement> {
        self.text_placement.as_ref()
    }

    /// Create the label at the recorded placement.
    ///
    /// Blank content becomes `placeholder`. The font size is divided by the
    /// scale at placement time so the label appears at `font_size` on screen.
    pub fn commit_text(
        &mut self,
        content: &str,
        color: SerializableColor,
        font_size: f64,
        placeholder: &str,
    ) -> Option<TextData> {
        let placement = self.text_placement.take()?;
        let content = if content.trim().is_empty() { placeholder } else { content };
        Some(TextData::new(
            content,
            placement.position,
            color,
            font_size / placement.scale.max(f64::MIN_POSITIVE),
        ))
    }

    pub fn cancel_text(&mut self) {
        self.text_placement = None;
    }

    pub fn begin_lasso(&mut self, point: Point) {
        self.lasso_points.clear();
        self.lasso_points.push(point);
    }

    pub fn add_lasso_point(&mut self, point: Point) {
        if !self.lasso_points.is_empty() {
            self.lasso_points.push(point);
        }
    }

    /// Take the finished lasso stroke.
    pub fn end_lasso(&mut self) -> Vec<Point> {
        std::mem::take(&mut self.lasso_points)
    }

    pub fn current_path(&self) -> Option<&PathData> {
        self.current_path.as_ref()
    }

    pub fn current_shape(&self) -> Option<&ShapeData> {
        self.current_shape.as_ref()
    }

    pub fn lasso_points(&self) -> &[Point] {
        &self.lasso_points
    }

    /// Drop every in-progress item and any pending text placement.
    pub fn cancel(&mut self) {
        self.current_path = None;
        self.current_shape = None;
        self.lasso_points.clear();
        self.text_placement = None;
    }
}
