//! Events emitted by the editor towards the owner of the label list.
//!
//! Events are plain values returned from the input handlers. The owner folds
//! them into its labels (see [`crate::session::fold_event`]) and pushes the
//! result back through the reconciler.

use serde::{Deserialize, Serialize};

use crate::model::{LabelId, LabelPatch};

/// One-way notification of a committed change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "label", rename_all = "camelCase")]
pub enum EditorEvent {
    /// A new element was drawn and committed.
    ElementAdded(LabelPatch),
    /// An existing element was resized, moved or nudged.
    ElementChanged(LabelPatch),
    /// An element was deleted from the selection.
    ElementRemoved(LabelPatch),
    /// The selection moved to another element, or was cleared.
    Selected(Option<LabelPatch>),
    /// The hovered element changed.
    Hovered(Option<LabelPatch>),
}

impl EditorEvent {
    /// Id of the label the event is about, if any.
    pub fn label_id(&self) -> Option<&LabelId> {
        match self {
            EditorEvent::ElementAdded(patch)
            | EditorEvent::ElementChanged(patch)
            | EditorEvent::ElementRemoved(patch) => Some(&patch.id),
            EditorEvent::Selected(patch) | EditorEvent::Hovered(patch) => patch.as_ref().map(|p| &p.id),
        }
    }
}
