//! Freehand pen strokes.

use super::{GroupId, HIT_PADDING, ItemId, SerializableColor, new_item_id, uniform_scale};
use crate::geometry::{point_segment_distance, rect_from_extremes, scale_about};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A freehand stroke made of sampled points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathData {
    pub id: ItemId,
    /// Sample points in canvas space, in drawing order.
    pub points: Vec<Point>,
    pub color: SerializableColor,
    pub stroke_width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
}

impl PathData {
    /// Create an empty stroke with a fresh id.
    pub fn new(color: SerializableColor, stroke_width: f64) -> Self {
        Self::from_points(Vec::new(), color, stroke_width)
    }

    /// Create a stroke from existing points.
    pub fn from_points(points: Vec<Point>, color: SerializableColor, stroke_width: f64) -> Self {
        Self {
            id: new_item_id(),
            points,
            color,
            stroke_width,
            group_id: None,
        }
    }

    /// Append a sample point.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Extremes of the points, padded by half the stroke width.
    pub fn bounds(&self) -> Rect {
        rect_from_extremes(&self.points, self.stroke_width / 2.0)
    }

    pub fn contains_point(&self, point: Point) -> bool {
        if self.points.is_empty() {
            return false;
        }
        if !self.bounds().inflate(HIT_PADDING, HIT_PADDING).contains(point) {
            return false;
        }

        let tolerance = self.stroke_width / 2.0 + HIT_PADDING;
        self.points
            .windows(2)
            .any(|w| point_segment_distance(point, w[0], w[1]) <= tolerance)
    }

    pub fn translate(&self, delta: Vec2) -> Self {
        Self {
            points: self.points.iter().map(|p| *p + delta).collect(),
            ..self.clone()
        }
    }

    pub fn resize(&self, pivot: Point, sx: f64, sy: f64) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|p| scale_about(*p, pivot, sx, sy))
                .collect(),
            stroke_width: self.stroke_width * uniform_scale(sx, sy),
            ..self.clone()
        }
    }

    /// Smoothed outline: each sample is reached by a quadratic curve whose
    /// control point is the midpoint of the previous segment.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let Some((first, rest)) = self.points.split_first() else {
            return path;
        };
        path.move_to(*first);
        let mut previous = *first;
        for p in rest {
            path.quad_to(previous.midpoint(*p), *p);
            previous = *p;
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke() -> PathData {
        PathData::from_points(
            vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
            ],
            SerializableColor::black(),
            8.0,
        )
    }

    #[test]
    fn test_path_creation() {
        let mut path = PathData::new(SerializableColor::black(), 4.0);
        assert!(path.is_empty());
        path.add_point(Point::new(1.0, 2.0));
        assert_eq!(path.len(), 1);
        assert!(path.group_id.is_none());
    }

    #[test]
    fn test_bounds_padded_by_half_stroke() {
        let bounds = stroke().bounds();
        assert!((bounds.x0 - -4.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - -4.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 14.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 14.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_bounds() {
        let path = PathData::new(SerializableColor::black(), 8.0);
        assert_eq!(path.bounds(), Rect::ZERO);
        assert!(!path.contains_point(Point::ZERO));
    }

    #[test]
    fn test_hit_test() {
        let path = stroke();
        // On the second segment.
        assert!(path.contains_point(Point::new(10.0, 5.0)));
        // Within stroke half-width plus padding.
        assert!(path.contains_point(Point::new(5.0, 27.0)));
        assert!(!path.contains_point(Point::new(100.0, 100.0)));
        assert!(!path.contains_point(Point::new(5.0, 40.0)));
    }

    #[test]
    fn test_single_point_has_no_segment_to_hit() {
        let path =
            PathData::from_points(vec![Point::new(50.0, 50.0)], SerializableColor::black(), 8.0);
        assert!(!path.contains_point(Point::new(50.0, 50.0)));
        assert!(!path.contains_point(Point::new(60.0, 50.0)));
        // Still has bounds, so it can be drawn and lasso-selected.
        assert!(path.bounds().contains(Point::new(50.0, 50.0)));
    }

    #[test]
    fn test_translate_round_trip() {
        let path = stroke();
        let moved = path.translate(Vec2::new(12.5, -3.0));
        assert!((moved.points[1].x - 22.5).abs() < f64::EPSILON);
        assert_eq!(moved.translate(Vec2::new(-12.5, 3.0)), path);
    }

    #[test]
    fn test_resize_scales_stroke() {
        let path = stroke();
        let resized = path.resize(Point::new(0.0, 0.0), 2.0, 2.0);
        assert!((resized.points[2].x - 20.0).abs() < f64::EPSILON);
        assert!((resized.points[2].y - 20.0).abs() < f64::EPSILON);
        assert!((resized.stroke_width - 16.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resize_round_trip() {
        let path = stroke();
        let pivot = Point::new(3.0, 7.0);
        for s in [0.2, 0.5, 1.5, 3.0, 5.0] {
            let back = path.resize(pivot, s, s).resize(pivot, 1.0 / s, 1.0 / s);
            for (a, b) in back.points.iter().zip(&path.points) {
                assert!((a.x - b.x).abs() < 1e-9);
                assert!((a.y - b.y).abs() < 1e-9);
            }
            assert!((back.stroke_width - path.stroke_width).abs() < 1e-9);
        }
    }

    #[test]
    fn test_to_path_smoothing() {
        let path = stroke().to_path();
        // One move plus a quadratic per following point.
        assert_eq!(path.elements().len(), 3);
        assert!(PathData::new(SerializableColor::black(), 1.0).to_path().elements().is_empty());
    }
}
