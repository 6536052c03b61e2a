//! Label ownership outside the editor, and recorded replay sessions.
//!
//! [`fold_event`] is the reference owner of a label list: it applies editor
//! events so the next reconciliation finds every element already in place.
//! A [`Session`] bundles an image, labels and a list of input steps; replaying
//! it drives an [`Editor`] exactly as a UI event loop would.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::editor::Editor;
use crate::event::EditorEvent;
use crate::geometry::{Point, Size};
use crate::input::{KeyEvent, PointerEvent};
use crate::model::{Label, LabelShape, ObjectClass};
use crate::render::RecordingSurface;

/// Apply one editor event to a label list.
pub fn fold_event(labels: &mut Vec<Label>, event: &EditorEvent) {
    match event {
        EditorEvent::ElementAdded(patch) => match labels.iter_mut().find(|l| l.id == patch.id) {
            Some(label) => {
                log::warn!("Label {} already present, treating add as change", patch.id);
                label.apply_patch(patch);
            }
            None => labels.push(Label::from_patch(patch)),
        },
        EditorEvent::ElementChanged(patch) => match labels.iter_mut().find(|l| l.id == patch.id) {
            Some(label) => label.apply_patch(patch),
            None => log::warn!("Change for unknown label {}, ignoring", patch.id),
        },
        EditorEvent::ElementRemoved(patch) => labels.retain(|l| l.id != patch.id),
        EditorEvent::Selected(selected) => {
            for label in labels.iter_mut() {
                label.is_selected = selected.as_ref().is_some_and(|p| p.id == label.id);
            }
        }
        EditorEvent::Hovered(hovered) => {
            for label in labels.iter_mut() {
                label.is_hovered = hovered.as_ref().is_some_and(|p| p.id == label.id);
            }
        }
    }
}

/// One recorded input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    Pointer(PointerEvent),
    Key(KeyEvent),
    /// External replacement of the label list.
    Labels { labels: Vec<Label> },
    /// Zoom around a device-space cursor position.
    Zoom {
        zoom: f32,
        #[serde(default)]
        cursor: Point,
    },
    /// Shape for subsequent draws.
    Shape { shape: LabelShape },
    /// Object class for subsequent draws.
    Class { class_id: Option<u32> },
    /// Window lost focus.
    Blur,
}

fn default_zoom() -> f32 {
    1.0
}

/// A recorded editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Natural image size.
    pub image: Size,
    #[serde(default = "default_zoom")]
    pub zoom: f32,
    #[serde(default)]
    pub classes: Vec<ObjectClass>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Result of a replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayOutcome {
    /// Every event in emission order.
    pub events: Vec<EditorEvent>,
    /// Labels after all events were folded in.
    pub labels: Vec<Label>,
}

impl Session {
    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let json = std::fs::read_to_string(path)?;
        let session = Self::from_json(&json)?;
        log::info!("Loaded session from {:?} with {} steps", path, session.steps.len());
        Ok(session)
    }

    /// Run every step through an editor, folding events back into the labels
    /// after each one.
    pub fn replay(&self, config: EditorConfig) -> ReplayOutcome {
        let mut editor = Editor::new(config, RecordingSurface::new());
        editor.set_image_size(self.image);
        editor.set_zoom(self.zoom);
        editor.set_object_classes(self.classes.clone());

        let mut labels = self.labels.clone();
        editor.set_labels(labels.clone());

        let mut events = Vec::new();
        for (i, step) in self.steps.iter().enumerate() {
            log::trace!("Step {}: {:?}", i, step);
            let emitted = match step {
                Step::Pointer(event) => editor.pointer(event),
                Step::Key(event) => editor.key(event),
                Step::Labels { labels: replacement } => {
                    labels = replacement.clone();
                    editor.set_labels(labels.clone());
                    Vec::new()
                }
                Step::Zoom { zoom, cursor } => {
                    editor.zoom_at(*zoom, *cursor);
                    Vec::new()
                }
                Step::Shape { shape } => {
                    editor.set_draw_shape(*shape);
                    Vec::new()
                }
                Step::Class { class_id } => {
                    editor.set_draw_class(*class_id);
                    Vec::new()
                }
                Step::Blur => {
                    editor.cancel();
                    Vec::new()
                }
            };

            if emitted.is_empty() {
                continue;
            }
            for event in &emitted {
                fold_event(&mut labels, event);
            }
            editor.set_labels(labels.clone());
            events.extend(emitted);
        }

        ReplayOutcome { events, labels }
    }
}

/// Errors that can occur when loading a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse session: {0}")]
    Json(#[from] serde_json::Error),
}
