//! Builds item handles from plain records.

use crate::items::{ItemHandle, PathData, ShapeData, TextData};

/// One handle per record: paths, then shapes, then texts.
///
/// Later handles draw on top and win hit-test ties.
pub fn create_items<'a>(
    paths: &'a [PathData],
    shapes: &'a [ShapeData],
    texts: &'a [TextData],
) -> Vec<ItemHandle<'a>> {
    let mut items = Vec::with_capacity(paths.len() + shapes.len() + texts.len());
    items.extend(paths.iter().map(ItemHandle::Path));
    items.extend(shapes.iter().map(ItemHandle::Shape));
    items.extend(texts.iter().map(ItemHandle::Text));
    items
}
