//! Drawable items on a board.
//!
//! Items are plain records ([`PathData`], [`ShapeData`], [`TextData`]). The
//! closed set of variants is wrapped by [`CanvasItem`] when owned and by
//! [`ItemHandle`] when borrowed; every capability dispatches with a single
//! match in [`ItemHandle`].

mod collection;
mod path;
mod shape;
mod text;

pub use collection::BoardItems;
pub use path::PathData;
pub use shape::{ShapeData, ShapeKind};
pub use text::{TEXT_HEIGHT_FACTOR, TEXT_HIT_INFLATE, TEXT_WIDTH_FACTOR, TextData};

use crate::geometry::rects_overlap;
use kurbo::{BezPath, Point, Rect, Size, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an item on a board.
pub type ItemId = String;

/// Identifier shared by the members of a group.
pub type GroupId = String;

/// Generate a fresh item id.
pub fn new_item_id() -> ItemId {
    Uuid::new_v4().to_string()
}

/// Generate a fresh group id.
pub fn new_group_id() -> GroupId {
    Uuid::new_v4().to_string()
}

/// Touch margin added around strokes and lines when hit-testing.
pub const HIT_PADDING: f64 = 24.0;
/// Smallest factor a resize applies to stroke widths and font sizes.
pub const MIN_ITEM_SCALE: f64 = 0.2;
/// Largest factor a resize applies to stroke widths and font sizes.
pub const MAX_ITEM_SCALE: f64 = 5.0;

/// Average of the two axis scales, clamped to the item scale range.
pub fn uniform_scale(sx: f64, sy: f64) -> f64 {
    ((sx + sy) / 2.0).clamp(MIN_ITEM_SCALE, MAX_ITEM_SCALE)
}

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }
}

impl Default for SerializableColor {
    fn default() -> Self {
        Self::black()
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Colors offered by the color picker. The first entry is the default.
pub const PALETTE: [SerializableColor; 7] = [
    SerializableColor::new(0, 0, 0, 255),
    SerializableColor::new(255, 0, 0, 255),
    SerializableColor::new(0, 0, 255, 255),
    SerializableColor::new(0, 255, 0, 255),
    SerializableColor::new(255, 255, 0, 255),
    SerializableColor::new(255, 0, 255, 255),
    SerializableColor::new(0, 255, 255, 255),
];

/// Exact text metrics supplied by the host's text layout engine.
pub trait TextMeasurer {
    /// Rendered size of `text` at `font_size`.
    fn measure(&self, text: &str, font_size: f64) -> Size;
}

/// Item variant tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Path,
    Shape,
    Text,
}

/// Reference to an item by variant and id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRef {
    pub kind: ItemKind,
    pub id: ItemId,
}

impl ItemRef {
    pub fn new(kind: ItemKind, id: impl Into<ItemId>) -> Self {
        Self { kind, id: id.into() }
    }

    pub fn path(id: impl Into<ItemId>) -> Self {
        Self::new(ItemKind::Path, id)
    }

    pub fn shape(id: impl Into<ItemId>) -> Self {
        Self::new(ItemKind::Shape, id)
    }

    pub fn text(id: impl Into<ItemId>) -> Self {
        Self::new(ItemKind::Text, id)
    }
}

/// An owned item record of any variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CanvasItem {
    Path(PathData),
    Shape(ShapeData),
    Text(TextData),
}

impl CanvasItem {
    pub fn as_handle(&self) -> ItemHandle<'_> {
        match self {
            CanvasItem::Path(p) => ItemHandle::Path(p),
            CanvasItem::Shape(s) => ItemHandle::Shape(s),
            CanvasItem::Text(t) => ItemHandle::Text(t),
        }
    }

    pub fn id(&self) -> &str {
        self.as_handle().id()
    }

    pub fn kind(&self) -> ItemKind {
        self.as_handle().kind()
    }

    pub fn item_ref(&self) -> ItemRef {
        self.as_handle().item_ref()
    }

    pub fn group_id(&self) -> Option<&str> {
        self.as_handle().group_id()
    }

    pub fn set_group_id(&mut self, group_id: Option<GroupId>) {
        match self {
            CanvasItem::Path(p) => p.group_id = group_id,
            CanvasItem::Shape(s) => s.group_id = group_id,
            CanvasItem::Text(t) => t.group_id = group_id,
        }
    }

    pub fn set_color(&mut self, color: SerializableColor) {
        match self {
            CanvasItem::Path(p) => p.color = color,
            CanvasItem::Shape(s) => s.color = color,
            CanvasItem::Text(t) => t.color = color,
        }
    }
}

impl From<PathData> for CanvasItem {
    fn from(path: PathData) -> Self {
        CanvasItem::Path(path)
    }
}

impl From<ShapeData> for CanvasItem {
    fn from(shape: ShapeData) -> Self {
        CanvasItem::Shape(shape)
    }
}

impl From<TextData> for CanvasItem {
    fn from(text: TextData) -> Self {
        CanvasItem::Text(text)
    }
}

/// What the rendering collaborator needs to draw an item.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawIntent {
    Stroke {
        path: BezPath,
        color: SerializableColor,
        width: f64,
    },
    Fill {
        path: BezPath,
        color: SerializableColor,
    },
    Text {
        content: String,
        position: Point,
        font_size: f64,
        color: SerializableColor,
    },
}

/// A borrowed view of an item record.
#[derive(Debug, Clone, Copy)]
pub enum ItemHandle<'a> {
    Path(&'a PathData),
    Shape(&'a ShapeData),
    Text(&'a TextData),
}

impl<'a> ItemHandle<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            ItemHandle::Path(p) => &p.id,
            ItemHandle::Shape(s) => &s.id,
            ItemHandle::Text(t) => &t.id,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            ItemHandle::Path(_) => ItemKind::Path,
            ItemHandle::Shape(_) => ItemKind::Shape,
            ItemHandle::Text(_) => ItemKind::Text,
        }
    }

    pub fn item_ref(&self) -> ItemRef {
        ItemRef::new(self.kind(), self.id())
    }

    pub fn group_id(&self) -> Option<&'a str> {
        match self {
            ItemHandle::Path(p) => p.group_id.as_deref(),
            ItemHandle::Shape(s) => s.group_id.as_deref(),
            ItemHandle::Text(t) => t.group_id.as_deref(),
        }
    }

    pub fn color(&self) -> SerializableColor {
        match self {
            ItemHandle::Path(p) => p.color,
            ItemHandle::Shape(s) => s.color,
            ItemHandle::Text(t) => t.color,
        }
    }

    pub fn bounds(&self, measurer: Option<&dyn TextMeasurer>) -> Rect {
        match self {
            ItemHandle::Path(p) => p.bounds(),
            ItemHandle::Shape(s) => s.bounds(),
            ItemHandle::Text(t) => t.bounds(measurer),
        }
    }

    pub fn contains_point(&self, point: Point, measurer: Option<&dyn TextMeasurer>) -> bool {
        match self {
            ItemHandle::Path(p) => p.contains_point(point),
            ItemHandle::Shape(s) => s.contains_point(point),
            ItemHandle::Text(t) => t.contains_point(point, measurer),
        }
    }

    /// A copy of the record shifted by `delta`.
    pub fn translate(&self, delta: Vec2) -> CanvasItem {
        match self {
            ItemHandle::Path(p) => p.translate(delta).into(),
            ItemHandle::Shape(s) => s.translate(delta).into(),
            ItemHandle::Text(t) => t.translate(delta).into(),
        }
    }

    /// A copy of the record scaled about `pivot`.
    pub fn resize(&self, pivot: Point, sx: f64, sy: f64) -> CanvasItem {
        match self {
            ItemHandle::Path(p) => p.resize(pivot, sx, sy).into(),
            ItemHandle::Shape(s) => s.resize(pivot, sx, sy).into(),
            ItemHandle::Text(t) => t.resize(pivot, sx, sy).into(),
        }
    }

    pub fn is_visible(&self, viewport: Rect, measurer: Option<&dyn TextMeasurer>) -> bool {
        rects_overlap(self.bounds(measurer), viewport)
    }

    pub fn draw_intent(&self) -> DrawIntent {
        match self {
            ItemHandle::Path(p) => DrawIntent::Stroke {
                path: p.to_path(),
                color: p.color,
                width: p.stroke_width,
            },
            ItemHandle::Shape(s) if s.filled => DrawIntent::Fill {
                path: s.to_path(),
                color: s.color,
            },
            ItemHandle::Shape(s) => DrawIntent::Stroke {
                path: s.to_path(),
                color: s.color,
                width: s.stroke_width,
            },
            ItemHandle::Text(t) => DrawIntent::Text {
                content: t.content.clone(),
                position: t.position,
                font_size: t.font_size,
                color: t.color,
            },
        }
    }

    pub fn to_item(&self) -> CanvasItem {
        match self {
            ItemHandle::Path(p) => CanvasItem::Path((*p).clone()),
            ItemHandle::Shape(s) => CanvasItem::Shape((*s).clone()),
            ItemHandle::Text(t) => CanvasItem::Text((*t).clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_scale() {
        assert!((uniform_scale(2.0, 1.0) - 1.5).abs() < f64::EPSILON);
        assert!((uniform_scale(0.01, 0.01) - MIN_ITEM_SCALE).abs() < f64::EPSILON);
        assert!((uniform_scale(100.0, 1.0) - MAX_ITEM_SCALE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_color_conversion() {
        let color = SerializableColor::new(10, 20, 30, 255);
        let peniko_color: Color = color.into();
        assert_eq!(SerializableColor::from(peniko_color), color);
    }

    #[test]
    fn test_palette_default_is_black() {
        assert_eq!(PALETTE[0], SerializableColor::default());
    }

    #[test]
    fn test_item_serde_tagged() {
        let item = CanvasItem::Text(TextData::new(
            "hi",
            Point::new(1.0, 2.0),
            SerializableColor::black(),
            12.0,
        ));
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"type\":\"text\""));
        let back: CanvasItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_handle_dispatch() {
        let shape = ShapeData::new(
            ShapeKind::Rectangle,
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            SerializableColor::black(),
            2.0,
        );
        let handle = ItemHandle::Shape(&shape);
        assert_eq!(handle.kind(), ItemKind::Shape);
        assert_eq!(handle.id(), shape.id);
        assert!(handle.contains_point(Point::new(5.0, 5.0), None));
        assert!(handle.is_visible(Rect::new(5.0, 5.0, 50.0, 50.0), None));
        assert!(!handle.is_visible(Rect::new(50.0, 50.0, 100.0, 100.0), None));

        let moved = handle.translate(Vec2::new(1.0, 0.0));
        assert_eq!(moved.id(), shape.id);
        assert!(matches!(moved, CanvasItem::Shape(ref s) if s.start.x == 1.0));
    }

    #[test]
    fn test_set_group_id() {
        let mut item: CanvasItem =
            PathData::from_points(vec![Point::ZERO], SerializableColor::black(), 1.0).into();
        item.set_group_id(Some("g1".to_string()));
        assert_eq!(item.group_id(), Some("g1"));
        item.set_group_id(None);
        assert!(item.group_id().is_none());
    }
}
