//! Selection set, group index and lasso selection.

use crate::geometry::{point_in_polygon, union_all};
use crate::items::{
    BoardItems, CanvasItem, GroupId, ItemHandle, ItemId, ItemKind, ItemRef, TextMeasurer,
    new_group_id,
};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Ordered set of selected items, unique by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    items: Vec<ItemRef>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_refs(refs: impl IntoIterator<Item = ItemRef>) -> Self {
        let mut selection = Self::new();
        for item in refs {
            selection.insert(item);
        }
        selection
    }

    /// Add an item. Returns false if its id is already selected.
    pub fn insert(&mut self, item: ItemRef) -> bool {
        if self.contains(&item.id) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|i| i.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&ItemRef> {
        self.items.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ItemRef> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[ItemRef] {
        &self.items
    }

    /// Ids of selected items of one variant.
    pub fn ids_of(&self, kind: ItemKind) -> impl Iterator<Item = &str> {
        self.items
            .iter()
            .filter(move |i| i.kind == kind)
            .map(|i| i.id.as_str())
    }

    pub fn remove(&mut self, id: &str) {
        self.items.retain(|i| i.id != id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = &'a ItemRef;
    type IntoIter = std::slice::Iter<'a, ItemRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Mapping from item id to group id, derived from the items' `group_id` fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupIndex {
    groups: HashMap<ItemId, GroupId>,
}

impl GroupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from the records' `group_id` fields.
    pub fn from_items(items: &BoardItems) -> Self {
        let groups = items
            .handles()
            .into_iter()
            .filter_map(|h| h.group_id().map(|g| (h.id().to_string(), g.to_string())))
            .collect();
        Self { groups }
    }

    pub fn group_of(&self, id: &str) -> Option<&str> {
        self.groups.get(id).map(String::as_str)
    }

    pub fn assign(&mut self, id: impl Into<ItemId>, group: impl Into<GroupId>) {
        self.groups.insert(id.into(), group.into());
    }

    pub fn remove(&mut self, id: &str) -> Option<GroupId> {
        self.groups.remove(id)
    }

    /// Number of grouped items.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of distinct groups.
    pub fn group_count(&self) -> usize {
        self.groups.values().collect::<HashSet<_>>().len()
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }
}

/// Topmost item containing `point`: the last match in draw order.
pub fn hit_test<'a>(
    point: Point,
    items: &[ItemHandle<'a>],
    measurer: Option<&dyn TextMeasurer>,
) -> Option<ItemHandle<'a>> {
    items
        .iter()
        .rev()
        .find(|h| h.contains_point(point, measurer))
        .copied()
}

/// `item` together with every other member of its group, in draw order.
pub fn expand_group(item: &ItemRef, items: &BoardItems, groups: &GroupIndex) -> Selection {
    let Some(group) = groups.group_of(&item.id) else {
        return Selection::from_refs([item.clone()]);
    };
    let members = Selection::from_refs(
        items
            .handles()
            .into_iter()
            .filter(|h| groups.group_of(h.id()) == Some(group))
            .map(|h| h.item_ref()),
    );
    if members.is_empty() {
        Selection::from_refs([item.clone()])
    } else {
        members
    }
}

/// Items captured by a lasso stroke, or `None` for fewer than three points.
///
/// Paths match when any sample lies inside the closed stroke; shapes and
/// texts match on the center of their bounds.
pub fn lasso_matches(
    stroke: &[Point],
    items: &BoardItems,
    measurer: Option<&dyn TextMeasurer>,
) -> Option<Selection> {
    if stroke.len() < 3 {
        return None;
    }
    let mut polygon = stroke.to_vec();
    polygon.push(stroke[0]);

    Some(Selection::from_refs(
        items
            .handles()
            .into_iter()
            .filter(|h| lasso_hit(h, &polygon, measurer))
            .map(|h| h.item_ref()),
    ))
}

fn lasso_hit(
    handle: &ItemHandle<'_>,
    polygon: &[Point],
    measurer: Option<&dyn TextMeasurer>,
) -> bool {
    match handle {
        ItemHandle::Path(p) => p.points.iter().any(|pt| point_in_polygon(*pt, polygon)),
        ItemHandle::Shape(_) | ItemHandle::Text(_) => {
            point_in_polygon(handle.bounds(measurer).center(), polygon)
        }
    }
}

/// Union of the bounds of every selected item that still exists.
pub fn combined_bounds(
    selection: &Selection,
    items: &BoardItems,
    measurer: Option<&dyn TextMeasurer>,
) -> Option<Rect> {
    union_all(
        selection
            .iter()
            .filter_map(|r| items.get(r))
            .map(|h| h.bounds(measurer)),
    )
}

/// Current selection plus the group index.
#[derive(Debug, Clone, Default)]
pub struct SelectionEngine {
    selection: Selection,
    groups: GroupIndex,
}

impl SelectionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn groups(&self) -> &GroupIndex {
        &self.groups
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    /// Rebuild the group index after the collections were replaced.
    pub fn rebuild_groups(&mut self, items: &BoardItems) {
        self.groups = GroupIndex::from_items(items);
    }

    /// Select the topmost item at `point`, expanding to its group.
    ///
    /// Leaves the selection untouched and returns false when nothing is hit.
    pub fn select_at(
        &mut self,
        point: Point,
        items: &BoardItems,
        measurer: Option<&dyn TextMeasurer>,
    ) -> bool {
        let handles = items.handles();
        match hit_test(point, &handles, measurer) {
            Some(hit) => self.select(&hit.item_ref(), items),
            None => false,
        }
    }

    /// Select `item` and the rest of its group.
    pub fn select(&mut self, item: &ItemRef, items: &BoardItems) -> bool {
        if items.get(item).is_none() {
            return false;
        }
        self.selection = expand_group(item, items, &self.groups);
        log::debug!("Selected {} item(s)", self.selection.len());
        true
    }

    pub fn deselect(&mut self) {
        self.selection.clear();
    }

    /// Replace the selection with the lasso matches.
    ///
    /// Strokes with fewer than three points leave the selection unchanged.
    pub fn lasso_select(
        &mut self,
        stroke: &[Point],
        items: &BoardItems,
        measurer: Option<&dyn TextMeasurer>,
    ) -> bool {
        match lasso_matches(stroke, items, measurer) {
            Some(selection) => {
                log::debug!("Lasso selected {} item(s)", selection.len());
                self.selection = selection;
                true
            }
            None => false,
        }
    }

    pub fn combined_bounds(
        &self,
        items: &BoardItems,
        measurer: Option<&dyn TextMeasurer>,
    ) -> Option<Rect> {
        combined_bounds(&self.selection, items, measurer)
    }

    /// Put every selected item into one fresh group.
    ///
    /// Returns the changed records; empty when fewer than two selected items exist.
    pub fn group_selection(&mut self, items: &mut BoardItems) -> Vec<CanvasItem> {
        let records: Vec<CanvasItem> = self
            .selection
            .iter()
            .filter_map(|r| items.get(r).map(|h| h.to_item()))
            .collect();
        if records.len() < 2 {
            return Vec::new();
        }

        let group = new_group_id();
        let changed: Vec<CanvasItem> = records
            .into_iter()
            .map(|mut item| {
                item.set_group_id(Some(group.clone()));
                self.groups.assign(item.id(), group.clone());
                items.replace(item.clone());
                item
            })
            .collect();
        log::debug!("Grouped {} items into {}", changed.len(), group);
        changed
    }

    /// Clear the group of every selected item. Returns the changed records.
    pub fn ungroup_selection(&mut self, items: &mut BoardItems) -> Vec<CanvasItem> {
        let mut changed = Vec::new();
        for item_ref in self.selection.iter() {
            self.groups.remove(&item_ref.id);
            let Some(handle) = items.get(item_ref) else {
                continue;
            };
            if handle.group_id().is_none() {
                continue;
            }
            let mut item = handle.to_item();
            item.set_group_id(None);
            changed.push(item);
        }
        for item in &changed {
            items.replace(item.clone());
        }
        changed
    }

    /// Remove every selected item. Returns the refs that were removed.
    pub fn delete_selection(&mut self, items: &mut BoardItems) -> Vec<ItemRef> {
        let removed: Vec<ItemRef> = self
            .selection
            .iter()
            .filter(|r| items.remove(r).is_some())
            .cloned()
            .collect();
        for item_ref in self.selection.iter() {
            self.groups.remove(&item_ref.id);
        }
        self.selection.clear();
        removed
    }

    /// Drop a single item from the selection and the group index.
    pub fn forget(&mut self, id: &str) {
        self.selection.remove(id);
        self.groups.remove(id);
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.selection.clear();
        self.groups.clear();
    }
}
