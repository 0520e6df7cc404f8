//! Geometric shapes spanned by a start and end point.

use super::{GroupId, HIT_PADDING, ItemId, SerializableColor, new_item_id, uniform_scale};
use crate::geometry::{point_in_triangle, point_segment_distance, scale_about};
use kurbo::{BezPath, Circle, Line, Point, Rect, Shape as _, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Kinds of shape the shape tool can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Circle,
    Line,
    Triangle,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Rectangle,
        ShapeKind::Circle,
        ShapeKind::Line,
        ShapeKind::Triangle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Circle => "Circle",
            ShapeKind::Line => "Line",
            ShapeKind::Triangle => "Triangle",
        }
    }
}

/// A shape defined by the drag that created it.
///
/// Only the two drag points are stored; size and corners are always derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeData {
    pub id: ItemId,
    pub kind: ShapeKind,
    pub start: Point,
    pub end: Point,
    pub color: SerializableColor,
    pub stroke_width: f64,
    #[serde(default)]
    pub filled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
}

impl ShapeData {
    /// Create a new shape with a fresh id.
    pub fn new(
        kind: ShapeKind,
        start: Point,
        end: Point,
        color: SerializableColor,
        stroke_width: f64,
    ) -> Self {
        Self {
            id: new_item_id(),
            kind,
            start,
            end,
            color,
            stroke_width,
            filled: false,
            group_id: None,
        }
    }

    pub fn with_filled(mut self, filled: bool) -> Self {
        self.filled = filled;
        self
    }

    /// Normalized rectangle spanned by the two drag points.
    pub fn rect(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }

    pub fn top_left(&self) -> Point {
        self.rect().origin()
    }

    pub fn size(&self) -> Size {
        self.rect().size()
    }

    fn padding(&self) -> f64 {
        if self.filled { 0.0 } else { self.stroke_width / 2.0 }
    }

    pub fn bounds(&self) -> Rect {
        let padding = self.padding();
        self.rect().inflate(padding, padding)
    }

    /// Top-middle, bottom-left and bottom-right corners of the bounds.
    pub fn triangle_vertices(&self) -> [Point; 3] {
        let b = self.bounds();
        [
            Point::new(b.center().x, b.y0),
            Point::new(b.x0, b.y1),
            Point::new(b.x1, b.y1),
        ]
    }

    pub fn contains_point(&self, point: Point) -> bool {
        let bounds = self.bounds();
        match self.kind {
            ShapeKind::Rectangle => bounds.contains(point),
            ShapeKind::Circle => {
                let radius = bounds.width().min(bounds.height()) / 2.0;
                point.distance(bounds.center()) <= radius
            }
            ShapeKind::Line => {
                let tolerance = self.stroke_width / 2.0 + HIT_PADDING;
                point_segment_distance(point, self.start, self.end) <= tolerance
            }
            ShapeKind::Triangle => {
                let [v1, v2, v3] = self.triangle_vertices();
                point_in_triangle(point, v1, v2, v3)
            }
        }
    }

    pub fn translate(&self, delta: Vec2) -> Self {
        Self {
            start: self.start + delta,
            end: self.end + delta,
            ..self.clone()
        }
    }

    pub fn resize(&self, pivot: Point, sx: f64, sy: f64) -> Self {
        Self {
            start: scale_about(self.start, pivot, sx, sy),
            end: scale_about(self.end, pivot, sx, sy),
            stroke_width: self.stroke_width * uniform_scale(sx, sy),
            ..self.clone()
        }
    }

    /// Outline to stroke (or fill, for filled shapes).
    pub fn to_path(&self) -> BezPath {
        let rect = self.rect();
        match self.kind {
            ShapeKind::Rectangle => rect.to_path(0.1),
            ShapeKind::Circle => {
                let radius = rect.width().min(rect.height()) / 2.0;
                Circle::new(rect.center(), radius).to_path(0.1)
            }
            ShapeKind::Line => Line::new(self.start, self.end).to_path(0.1),
            ShapeKind::Triangle => {
                let mut path = BezPath::new();
                path.move_to(Point::new(rect.center().x, rect.y0));
                path.line_to(Point::new(rect.x0, rect.y1));
                path.line_to(Point::new(rect.x1, rect.y1));
                path.close_path();
                path
            }
        }
    }
}
