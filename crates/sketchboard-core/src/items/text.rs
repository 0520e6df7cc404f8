//! Single-line text labels.

use super::{GroupId, ItemId, SerializableColor, TextMeasurer, new_item_id, uniform_scale};
use crate::geometry::scale_about;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Estimated glyph advance as a fraction of the font size.
pub const TEXT_WIDTH_FACTOR: f64 = 0.65;
/// Estimated line height as a fraction of the font size.
pub const TEXT_HEIGHT_FACTOR: f64 = 1.4;
/// Extra margin around text when hit-testing.
pub const TEXT_HIT_INFLATE: f64 = 8.0;

/// A text label anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextData {
    pub id: ItemId,
    pub content: String,
    pub position: Point,
    pub color: SerializableColor,
    pub font_size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
}

impl TextData {
    /// Create a new label with a fresh id.
    pub fn new(
        content: impl Into<String>,
        position: Point,
        color: SerializableColor,
        font_size: f64,
    ) -> Self {
        Self {
            id: new_item_id(),
            content: content.into(),
            position,
            color,
            font_size,
            group_id: None,
        }
    }

    /// Size estimated from the character count when no measurer is available.
    pub fn estimated_size(&self) -> Size {
        let chars = self.content.chars().count() as f64;
        Size::new(
            (chars * self.font_size * TEXT_WIDTH_FACTOR).max(self.font_size * 0.5),
            self.font_size * TEXT_HEIGHT_FACTOR,
        )
    }

    pub fn size(&self, measurer: Option<&dyn TextMeasurer>) -> Size {
        match measurer {
            Some(m) => m.measure(&self.content, self.font_size),
            None => self.estimated_size(),
        }
    }

    pub fn bounds(&self, measurer: Option<&dyn TextMeasurer>) -> Rect {
        Rect::from_origin_size(self.position, self.size(measurer))
    }

    pub fn contains_point(&self, point: Point, measurer: Option<&dyn TextMeasurer>) -> bool {
        self.bounds(measurer)
            .inflate(TEXT_HIT_INFLATE, TEXT_HIT_INFLATE)
            .contains(point)
    }

    pub fn translate(&self, delta: Vec2) -> Self {
        Self {
            position: self.position + delta,
            ..self.clone()
        }
    }

    /// Scale the anchor about `pivot` and the font size by the uniform factor.
    pub fn resize(&self, pivot: Point, sx: f64, sy: f64) -> Self {
        Self {
            position: scale_about(self.position, pivot, sx, sy),
            font_size: self.font_size * uniform_scale(sx, sy),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedMeasurer;

    impl TextMeasurer for FixedMeasurer {
        fn measure(&self, text: &str, font_size: f64) -> Size {
            Size::new(text.len() as f64 * 10.0, font_size)
        }
    }

    fn label() -> TextData {
        TextData::new("Hello", Point::new(10.0, 20.0), SerializableColor::black(), 20.0)
    }

    #[test]
    fn test_estimated_bounds() {
        let bounds = label().bounds(None);
        // 5 chars * 20 * 0.65 = 65 wide, 20 * 1.4 = 28 tall.
        assert!((bounds.width() - 65.0).abs() < 1e-10);
        assert!((bounds.height() - 28.0).abs() < 1e-10);
        assert_eq!(bounds.origin(), Point::new(10.0, 20.0));
    }

    #[test]
    fn test_estimate_has_minimum_width() {
        let empty = TextData::new("", Point::ZERO, SerializableColor::black(), 24.0);
        assert!((empty.estimated_size().width - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_measurer_overrides_estimate() {
        let bounds = label().bounds(Some(&FixedMeasurer));
        assert!((bounds.width() - 50.0).abs() < f64::EPSILON);
        assert!((bounds.height() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test_inflated() {
        let text = label();
        assert!(text.contains_point(Point::new(40.0, 30.0), None));
        // Inside the 8px margin.
        assert!(text.contains_point(Point::new(4.0, 14.0), None));
        assert!(!text.contains_point(Point::new(0.0, 0.0), None));
        assert!(!text.contains_point(Point::new(200.0, 30.0), None));
    }

    #[test]
    fn test_translate_round_trip() {
        let text = label();
        let moved = text.translate(Vec2::new(5.0, 5.0));
        assert_eq!(moved.position, Point::new(15.0, 25.0));
        assert_eq!(moved.translate(Vec2::new(-5.0, -5.0)), text);
    }

    #[test]
    fn test_resize_round_trip() {
        let text = label();
        let pivot = Point::new(30.0, -4.0);
        for scale in [0.2, 0.5, 3.0, 5.0] {
            let back = text
                .resize(pivot, scale, scale)
                .resize(pivot, 1.0 / scale, 1.0 / scale);
            assert!((back.position.x - text.position.x).abs() < 1e-9);
            assert!((back.position.y - text.position.y).abs() < 1e-9);
            assert!((back.font_size - text.font_size).abs() < 1e-9);
            assert_eq!(back.content, text.content);
        }
    }

    #[test]
    fn test_resize_keeps_relative_center() {
        let text = label();
        let pivot = Point::new(0.0, 0.0);
        let resized = text.resize(pivot, 2.0, 2.0);
        assert!((resized.font_size - 40.0).abs() < f64::EPSILON);
        // Scaling the anchor and the size together scales the whole box.
        let before = text.bounds(None).center();
        let after = resized.bounds(None).center();
        assert!((after.x - before.x * 2.0).abs() < 1e-9);
        assert!((after.y - before.y * 2.0).abs() < 1e-9);
    }
}
