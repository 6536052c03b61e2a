//! Element storage.
//!
//! Owns the live elements of the current image. Lookups go through an id
//! index; iteration order is the render order (later elements are drawn and
//! hit-tested on top). Removal leaves a tombstone in the render order which is
//! compacted away once tombstones outnumber live elements, or on reorder.

use std::collections::HashMap;

use crate::element::Element;
use crate::error::EditorError;
use crate::geometry::Point;
use crate::model::LabelId;

/// The live element collection.
#[derive(Debug, Clone, Default)]
pub struct ElementStore {
    /// Elements in render order. `None` marks a removed slot.
    slots: Vec<Option<Element>>,
    /// Position of each live element in `slots`.
    index: HashMap<LabelId, usize>,
    /// Dirty flag - set when elements, selection or hover change.
    /// Used to avoid redrawing when nothing happened.
    dirty: bool,
}

impl ElementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the store has been modified since last clear_dirty().
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag. Call after redrawing.
    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Mark the store as dirty.
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Add an element on top of the render order.
    ///
    /// An element whose id is already present is rejected; that only happens
    /// when the caller lost track of identity.
    pub fn add(&mut self, element: Element) -> Result<(), EditorError> {
        if self.index.contains_key(element.id()) {
            log::error!("Refusing duplicate element {}", element.id());
            return Err(EditorError::DuplicateId(element.id().clone()));
        }
        self.index.insert(element.id().clone(), self.slots.len());
        self.slots.push(Some(element));
        self.mark_dirty();
        Ok(())
    }

    /// Remove an element by id. Amortized O(1).
    pub fn remove(&mut self, id: &LabelId) -> Option<Element> {
        let position = self.index.remove(id)?;
        let removed = self.slots.get_mut(position)?.take()?;
        if self.slots.len() > 2 * self.index.len() {
            self.compact();
        }
        self.mark_dirty();
        Some(removed)
    }

    pub fn get(&self, id: &LabelId) -> Option<&Element> {
        let &i = self.index.get(id)?;
        self.slots.get(i)?.as_ref()
    }

    /// Mutable access marks the store dirty.
    pub fn get_mut(&mut self, id: &LabelId) -> Option<&mut Element> {
        let &i = self.index.get(id)?;
        self.dirty = true;
        self.slots.get_mut(i)?.as_mut()
    }

    pub fn contains(&self, id: &LabelId) -> bool {
        self.index.contains_key(id)
    }

    /// All elements in render order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Element> {
        self.slots.iter().flatten()
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.slots.iter_mut().flatten()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Take every element out, leaving the store empty.
    pub fn take_all(&mut self) -> Vec<Element> {
        if !self.is_empty() {
            self.mark_dirty();
        }
        self.index.clear();
        std::mem::take(&mut self.slots).into_iter().flatten().collect()
    }

    /// Replace the contents with `elements`, in the given order.
    ///
    /// Later duplicates of an id are dropped and returned so the caller can
    /// detach them from the render surface.
    pub fn replace(&mut self, elements: Vec<Element>) -> Vec<Element> {
        let mut rejected = Vec::new();
        self.slots.clear();
        self.index.clear();
        for element in elements {
            if self.index.contains_key(element.id()) {
                log::error!("Dropping duplicate element {} during replace", element.id());
                rejected.push(element);
                continue;
            }
            self.index.insert(element.id().clone(), self.slots.len());
            self.slots.push(Some(element));
        }
        self.mark_dirty();
        rejected
    }

    /// Destroy all elements. Returns the removed elements; empty (and not
    /// dirty) if there was nothing to clear.
    pub fn clear(&mut self) -> Vec<Element> {
        if self.is_empty() {
            return Vec::new();
        }
        self.take_all()
    }

    /// Select exactly one element, or none. Returns true if any flag changed.
    pub fn select(&mut self, id: Option<&LabelId>) -> bool {
        if let Some(id) = id.filter(|id| !self.contains(id)) {
            log::warn!("Cannot select unknown element {}, clearing selection", id);
        }
        let mut changed = false;
        for element in self.iter_mut() {
            let selected = Some(element.id()) == id;
            if element.selected != selected {
                element.selected = selected;
                changed = true;
            }
        }
        if changed {
            self.mark_dirty();
        }
        changed
    }

    /// First selected element in render order.
    pub fn selected(&self) -> Option<&Element> {
        self.iter().find(|e| e.selected)
    }

    /// Every selected element. Usually one, but labels may arrive with several
    /// selection flags set.
    pub fn selected_elements(&self) -> impl Iterator<Item = &Element> {
        self.iter().filter(|e| e.selected)
    }

    /// Hover exactly one element, or none. Returns true if any flag changed.
    pub fn hover(&mut self, id: Option<&LabelId>) -> bool {
        let mut changed = false;
        for element in self.iter_mut() {
            let hovered = Some(element.id()) == id;
            if element.hovered != hovered {
                element.hovered = hovered;
                changed = true;
            }
        }
        if changed {
            self.mark_dirty();
        }
        changed
    }

    pub fn hovered(&self) -> Option<&Element> {
        self.iter().find(|e| e.hovered)
    }

    /// Sort by area, largest first, so nested shapes end up on top.
    /// Equal areas keep their relative order.
    pub fn reorder(&mut self) {
        let mut elements = self.take_all();
        // sort_by is stable
        elements.sort_by(|a, b| b.area().total_cmp(&a.area()));
        self.slots = elements.into_iter().map(Some).collect();
        self.rebuild_index();
        self.mark_dirty();
    }

    /// Find the top-most element at a given point.
    pub fn hit_test(&self, point: Point, tolerance: f32) -> Option<&LabelId> {
        self.iter()
            .rev()
            .find(|e| e.contains(point, tolerance))
            .map(Element::id)
    }

    /// Update the zoom factor of every element.
    pub fn set_zoom(&mut self, zoom: f32) {
        for element in self.iter_mut() {
            element.zoom_factor = zoom;
        }
        self.mark_dirty();
    }

    /// Drop tombstones and reindex.
    fn compact(&mut self) {
        self.slots.retain(Option::is_some);
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|e| (e.id().clone(), i)))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(id: u64, size: f32) -> Element {
        Element::new_box(LabelId::from(id), Point::new(0.0, 0.0), Point::new(size, size))
    }

    fn ids(store: &ElementStore) -> Vec<String> {
        store.iter().map(|e| e.id().to_string()).collect()
    }

    #[test]
    fn test_add_and_remove() {
        let mut store = ElementStore::new();
        store.add(element(1, 10.0)).unwrap();
        store.add(element(2, 5.0)).unwrap();
        store.add(element(3, 7.0)).unwrap();
        assert_eq!(store.len(), 3);

        let removed = store.remove(&LabelId::from(2)).unwrap();
        assert_eq!(removed.id(), &LabelId::from(2));
        assert_eq!(ids(&store), vec!["1", "3"]);
        assert_eq!(store.get(&LabelId::from(3)).map(|e| e.width()), Some(7.0));
        assert!(store.remove(&LabelId::from(2)).is_none());
    }

    #[test]
    fn test_removal_keeps_order_and_lookups_across_compaction() {
        let mut store = ElementStore::new();
        for id in 1..=6 {
            store.add(element(id, id as f32)).unwrap();
        }
        for id in [2, 4, 5] {
            assert!(store.remove(&LabelId::from(id)).is_some());
        }
        // Six slots, three live; the next removal compacts
        assert_eq!(ids(&store), vec!["1", "3", "6"]);
        assert!(store.remove(&LabelId::from(1)).is_some());

        assert_eq!(ids(&store), vec!["3", "6"]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&LabelId::from(6)).map(|e| e.width()), Some(6.0));
        assert_eq!(store.hit_test(Point::new(1.0, 1.0), 0.0), Some(&LabelId::from(6)));

        store.add(element(7, 1.0)).unwrap();
        assert_eq!(ids(&store), vec!["3", "6", "7"]);
        assert!(store.select(Some(&LabelId::from(7))));
        assert_eq!(store.selected().map(|e| e.id().clone()), Some(LabelId::from(7)));
    }

    #[test]
    fn test_duplicate_add_is_rejected() {
        let mut store = ElementStore::new();
        store.add(element(1, 10.0)).unwrap();
        let err = store.add(element(1, 20.0)).unwrap_err();
        assert_eq!(err, EditorError::DuplicateId(LabelId::from(1)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&LabelId::from(1)).map(|e| e.width()), Some(10.0));
    }

    #[test]
    fn test_single_selection() {
        let mut store = ElementStore::new();
        for id in 1..=3 {
            store.add(element(id, 10.0)).unwrap();
        }

        assert!(store.select(Some(&LabelId::from(2))));
        assert_eq!(store.selected_elements().count(), 1);
        assert_eq!(store.selected().map(|e| e.id().clone()), Some(LabelId::from(2)));

        assert!(store.select(Some(&LabelId::from(3))));
        assert_eq!(store.selected_elements().count(), 1);
        assert!(!store.select(Some(&LabelId::from(3))));

        assert!(store.select(None));
        assert_eq!(store.selected_elements().count(), 0);
    }

    #[test]
    fn test_hover_is_independent_of_selection() {
        let mut store = ElementStore::new();
        store.add(element(1, 10.0)).unwrap();
        store.add(element(2, 10.0)).unwrap();
        store.select(Some(&LabelId::from(1)));
        store.hover(Some(&LabelId::from(2)));

        assert_eq!(store.selected().map(|e| e.id().clone()), Some(LabelId::from(1)));
        assert_eq!(store.hovered().map(|e| e.id().clone()), Some(LabelId::from(2)));
        assert!(store.hover(None));
        assert!(store.selected().is_some());
    }

    #[test]
    fn test_reorder_is_stable() {
        let mut store = ElementStore::new();
        // areas 100, 100, 25
        store.add(element(1, 10.0)).unwrap();
        store.add(element(2, 10.0)).unwrap();
        store.add(element(3, 5.0)).unwrap();
        store.reorder();
        assert_eq!(ids(&store), vec!["1", "2", "3"]);

        let mut store = ElementStore::new();
        // areas 25, 100, 100
        store.add(element(3, 5.0)).unwrap();
        store.add(element(1, 10.0)).unwrap();
        store.add(element(2, 10.0)).unwrap();
        store.reorder();
        assert_eq!(ids(&store), vec!["1", "2", "3"]);
        assert_eq!(store.get(&LabelId::from(3)).map(|e| e.area()), Some(25.0));
    }

    #[test]
    fn test_hit_test_prefers_top_most() {
        let mut store = ElementStore::new();
        store.add(element(1, 100.0)).unwrap();
        store.add(element(2, 20.0)).unwrap();
        store.reorder();

        assert_eq!(store.hit_test(Point::new(10.0, 10.0), 0.0), Some(&LabelId::from(2)));
        assert_eq!(store.hit_test(Point::new(50.0, 50.0), 0.0), Some(&LabelId::from(1)));
        assert_eq!(store.hit_test(Point::new(150.0, 50.0), 0.0), None);
    }

    #[test]
    fn test_clear_on_empty_store_is_silent() {
        let mut store = ElementStore::new();
        assert!(store.clear().is_empty());
        assert!(!store.is_dirty());

        store.add(element(1, 10.0)).unwrap();
        store.clear_dirty();
        assert_eq!(store.clear().len(), 1);
        assert!(store.is_dirty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_replace_drops_duplicates() {
        let mut store = ElementStore::new();
        let rejected = store.replace(vec![element(1, 10.0), element(2, 5.0), element(1, 3.0)]);
        assert_eq!(rejected.len(), 1);
        assert_eq!(ids(&store), vec!["1", "2"]);
        assert_eq!(store.get(&LabelId::from(1)).map(|e| e.width()), Some(10.0));
    }
}
