//! The per-variant item collections owned by a board.

use super::{CanvasItem, ItemHandle, ItemKind, ItemRef, PathData, ShapeData, TextData};
use crate::factory::create_items;
use serde::{Deserialize, Serialize};

/// Paths, shapes and texts of one board, each in creation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardItems {
    #[serde(default)]
    pub paths: Vec<PathData>,
    #[serde(default)]
    pub shapes: Vec<ShapeData>,
    #[serde(default)]
    pub texts: Vec<TextData>,
}

impl BoardItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(paths: Vec<PathData>, shapes: Vec<ShapeData>, texts: Vec<TextData>) -> Self {
        Self { paths, shapes, texts }
    }

    pub fn len(&self) -> usize {
        self.paths.len() + self.shapes.len() + self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Handles in draw order: paths, then shapes, then texts.
    pub fn handles(&self) -> Vec<ItemHandle<'_>> {
        create_items(&self.paths, &self.shapes, &self.texts)
    }

    /// Owned copies of every item in draw order.
    pub fn to_items(&self) -> Vec<CanvasItem> {
        self.handles().iter().map(ItemHandle::to_item).collect()
    }

    pub fn get(&self, item: &ItemRef) -> Option<ItemHandle<'_>> {
        match item.kind {
            ItemKind::Path => self.paths.iter().find(|p| p.id == item.id).map(ItemHandle::Path),
            ItemKind::Shape => self.shapes.iter().find(|s| s.id == item.id).map(ItemHandle::Shape),
            ItemKind::Text => self.texts.iter().find(|t| t.id == item.id).map(ItemHandle::Text),
        }
    }

    /// Look an item up by id alone.
    pub fn find(&self, id: &str) -> Option<ItemHandle<'_>> {
        self.handles().into_iter().find(|h| h.id() == id)
    }

    pub fn push(&mut self, item: CanvasItem) {
        match item {
            CanvasItem::Path(p) => self.paths.push(p),
            CanvasItem::Shape(s) => self.shapes.push(s),
            CanvasItem::Text(t) => self.texts.push(t),
        }
    }

    /// Replace the record with the same id. Returns false if it no longer exists.
    pub fn replace(&mut self, item: CanvasItem) -> bool {
        match item {
            CanvasItem::Path(p) => replace_by_id(&mut self.paths, p, |x| &x.id),
            CanvasItem::Shape(s) => replace_by_id(&mut self.shapes, s, |x| &x.id),
            CanvasItem::Text(t) => replace_by_id(&mut self.texts, t, |x| &x.id),
        }
    }

    /// Remove an item, returning its record.
    pub fn remove(&mut self, item: &ItemRef) -> Option<CanvasItem> {
        match item.kind {
            ItemKind::Path => {
                remove_by_id(&mut self.paths, &item.id, |x| &x.id).map(CanvasItem::Path)
            }
            ItemKind::Shape => {
                remove_by_id(&mut self.shapes, &item.id, |x| &x.id).map(CanvasItem::Shape)
            }
            ItemKind::Text => {
                remove_by_id(&mut self.texts, &item.id, |x| &x.id).map(CanvasItem::Text)
            }
        }
    }

    pub fn clear(&mut self) {
        self.paths.clear();
        self.shapes.clear();
        self.texts.clear();
    }
}

fn replace_by_id<T>(records: &mut [T], record: T, id: impl Fn(&T) -> &String) -> bool {
    match records.iter_mut().find(|r| id(r) == id(&record)) {
        Some(slot) => {
            *slot = record;
            true
        }
        None => false,
    }
}

fn remove_by_id<T>(records: &mut Vec<T>, target: &str, id: impl Fn(&T) -> &String) -> Option<T> {
    let index = records.iter().position(|r| id(r) == target)?;
    Some(records.remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{SerializableColor, ShapeKind};
    use kurbo::Point;

    fn board() -> BoardItems {
        BoardItems::from_parts(
            vec![PathData::from_points(vec![Point::ZERO], SerializableColor::black(), 2.0)],
            vec![ShapeData::new(
                ShapeKind::Line,
                Point::ZERO,
                Point::new(5.0, 5.0),
                SerializableColor::black(),
                2.0,
            )],
            vec![TextData::new("a", Point::ZERO, SerializableColor::black(), 10.0)],
        )
    }

    #[test]
    fn test_handles_in_variant_order() {
        let items = board();
        let kinds: Vec<_> = items.handles().iter().map(|h| h.kind()).collect();
        assert_eq!(kinds, vec![ItemKind::Path, ItemKind::Shape, ItemKind::Text]);
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_replace_and_remove() {
        let mut items = board();
        let mut text = items.texts[0].clone();
        text.content = "b".to_string();
        assert!(items.replace(text.clone().into()));
        assert_eq!(items.texts[0].content, "b");

        let removed = items.remove(&ItemRef::text(text.id.clone()));
        assert_eq!(removed, Some(CanvasItem::Text(text.clone())));
        assert!(items.texts.is_empty());

        // Replacing a deleted item is a no-op.
        assert!(!items.replace(text.into()));
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_get_checks_variant() {
        let items = board();
        let id = items.paths[0].id.clone();
        assert!(items.get(&ItemRef::path(id.clone())).is_some());
        assert!(items.get(&ItemRef::shape(id.clone())).is_none());
        assert!(items.find(&id).is_some());
    }
}
