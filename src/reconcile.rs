//! Label to element reconciliation.
//!
//! Given the authoritative label list and the current elements, compute the
//! element list that represents the labels:
//! - visible labels without an element get a new one
//! - elements whose label is gone or hidden are destroyed
//! - every other element is overwritten from its label
//!
//! Output order is new elements first, then surviving ones in their previous
//! order. The store re-sorts by area afterwards.

use std::collections::{HashMap, HashSet};

use crate::element::Element;
use crate::model::{Label, LabelId, ObjectClass};

/// Inputs that shape how elements are built from labels.
#[derive(Debug, Clone, Copy)]
pub struct ReconcileOptions<'a> {
    pub classes: &'a [ObjectClass],
    /// Build back planes for boxes.
    pub spatial: bool,
    /// Offset ratio for derived back planes.
    pub back_offset: f32,
    /// Zoom factor given to new elements.
    pub zoom: f32,
    /// Element under interactive edit; left exactly as it is.
    pub exclude: Option<&'a LabelId>,
}

impl<'a> ReconcileOptions<'a> {
    pub fn new(classes: &'a [ObjectClass]) -> Self {
        Self {
            classes,
            spatial: false,
            back_offset: crate::constants::DEFAULT_BACK_PLANE_OFFSET,
            zoom: 1.0,
            exclude: None,
        }
    }
}

/// Result of one reconciliation pass.
#[derive(Debug, Default)]
pub struct Reconciliation {
    /// The new element list.
    pub elements: Vec<Element>,
    /// Ids of elements created in this pass.
    pub created: Vec<LabelId>,
    /// Ids of surviving elements whose state changed.
    pub updated: Vec<LabelId>,
    /// Elements to detach from the render surface.
    pub destroyed: Vec<Element>,
}

impl Reconciliation {
    /// True when nothing was created or destroyed.
    pub fn is_structurally_unchanged(&self) -> bool {
        self.created.is_empty() && self.destroyed.is_empty()
    }
}

/// Reconcile `existing` against `labels`.
pub fn diff(labels: &[Label], existing: Vec<Element>, options: &ReconcileOptions<'_>) -> Reconciliation {
    let mut by_id: HashMap<&LabelId, &Label> = HashMap::with_capacity(labels.len());
    let mut unique_labels = Vec::with_capacity(labels.len());
    for label in labels {
        if by_id.contains_key(&label.id) {
            log::error!("Duplicate label id {} in label list, ignoring later entry", label.id);
            continue;
        }
        by_id.insert(&label.id, label);
        unique_labels.push(label);
    }

    let existing_ids: HashSet<LabelId> = existing.iter().map(|e| e.id().clone()).collect();
    let mut result = Reconciliation::default();

    // Pass 1: create
    for label in unique_labels {
        if !label.is_visible || existing_ids.contains(&label.id) || options.exclude == Some(&label.id) {
            continue;
        }
        let element = Element::from_label(label, options.classes, options.spatial, options.back_offset, options.zoom);
        log::debug!("Reconcile: created element {}", label.id);
        result.created.push(label.id.clone());
        result.elements.push(element);
    }

    // Pass 2: update or destroy
    let mut seen: HashSet<LabelId> = HashSet::with_capacity(existing.len());
    for mut element in existing {
        if !seen.insert(element.id().clone()) {
            log::error!("Duplicate element {} in element list, destroying it", element.id());
            result.destroyed.push(element);
            continue;
        }

        if options.exclude == Some(element.id()) {
            result.elements.push(element);
            continue;
        }

        match by_id.get(element.id()) {
            Some(label) if label.is_visible => {
                element.zoom_factor = options.zoom;
                if element.update_from_label(label, options.classes, options.spatial, options.back_offset) {
                    result.updated.push(element.id().clone());
                }
                result.elements.push(element);
            }
            _ => {
                log::debug!("Reconcile: destroyed element {}", element.id());
                result.destroyed.push(element);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[test]
    fn test_creates_element_for_new_visible_label() {
        let labels = vec![Label::new(1, 10, 10, 50, 40)];
        let result = diff(&labels, Vec::new(), &ReconcileOptions::new(&[]));

        assert_eq!(result.elements.len(), 1);
        assert_eq!(result.created, vec![LabelId::from(1)]);
        let element = &result.elements[0];
        assert_eq!(element.start, Point::new(10.0, 10.0));
        assert_eq!(element.end, Point::new(50.0, 40.0));
    }

    #[test]
    fn test_hidden_label_destroys_element() {
        let labels = vec![Label::new(1, 10, 10, 50, 40)];
        let first = diff(&labels, Vec::new(), &ReconcileOptions::new(&[]));

        let hidden = vec![Label::new(1, 10, 10, 50, 40).visible(false)];
        let second = diff(&hidden, first.elements, &ReconcileOptions::new(&[]));
        assert!(second.elements.is_empty());
        assert_eq!(second.destroyed.len(), 1);

        let third = diff(&hidden, second.elements, &ReconcileOptions::new(&[]));
        assert!(third.elements.is_empty());
        assert!(third.created.is_empty());
    }

    #[test]
    fn test_removed_label_destroys_element() {
        let labels = vec![Label::new(1, 0, 0, 5, 5), Label::new(2, 0, 0, 8, 8)];
        let first = diff(&labels, Vec::new(), &ReconcileOptions::new(&[]));
        let second = diff(&labels[1..], first.elements, &ReconcileOptions::new(&[]));

        assert_eq!(second.elements.len(), 1);
        assert_eq!(second.elements[0].id(), &LabelId::from(2));
        assert_eq!(second.destroyed[0].id(), &LabelId::from(1));
    }

    #[test]
    fn test_label_geometry_overwrites_element() {
        let labels = vec![Label::new(1, 0, 0, 5, 5)];
        let mut first = diff(&labels, Vec::new(), &ReconcileOptions::new(&[]));
        first.elements[0].set_end(Point::new(90.0, 90.0));

        let second = diff(&labels, first.elements, &ReconcileOptions::new(&[]));
        assert_eq!(second.updated, vec![LabelId::from(1)]);
        assert_eq!(second.elements[0].end, Point::new(5.0, 5.0));
    }

    #[test]
    fn test_output_order_is_new_then_existing() {
        let labels = vec![Label::new(1, 0, 0, 5, 5)];
        let first = diff(&labels, Vec::new(), &ReconcileOptions::new(&[]));

        let labels = vec![Label::new(1, 0, 0, 5, 5), Label::new(2, 0, 0, 9, 9)];
        let second = diff(&labels, first.elements, &ReconcileOptions::new(&[]));
        let ids: Vec<_> = second.elements.iter().map(|e| e.id().clone()).collect();
        assert_eq!(ids, vec![LabelId::from(2), LabelId::from(1)]);
    }

    #[test]
    fn test_excluded_element_is_left_alone() {
        let labels = vec![Label::new(1, 0, 0, 5, 5)];
        let mut first = diff(&labels, Vec::new(), &ReconcileOptions::new(&[]));
        first.elements[0].set_end(Point::new(30.0, 30.0));

        let exclude = LabelId::from(1);
        let mut options = ReconcileOptions::new(&[]);
        options.exclude = Some(&exclude);

        // Even a removal does not touch the element being edited.
        let second = diff(&[], first.elements, &options);
        assert_eq!(second.elements.len(), 1);
        assert_eq!(second.elements[0].end, Point::new(30.0, 30.0));
        assert!(second.destroyed.is_empty());
    }

    #[test]
    fn test_duplicate_label_ids_create_one_element() {
        let labels = vec![Label::new(1, 0, 0, 5, 5), Label::new(1, 0, 0, 50, 50)];
        let result = diff(&labels, Vec::new(), &ReconcileOptions::new(&[]));
        assert_eq!(result.elements.len(), 1);
        assert_eq!(result.elements[0].end, Point::new(5.0, 5.0));
    }

    #[test]
    fn test_object_class_color_is_applied() {
        let classes = vec![ObjectClass::new(3, "tree", "00aa00")];
        let labels = vec![Label::new(1, 0, 0, 5, 5).with_class(3, "tree")];
        let result = diff(&labels, Vec::new(), &ReconcileOptions::new(&classes));
        assert_eq!(result.elements[0].color, crate::color_utils::Color::new(0, 0xaa, 0));
    }
}
