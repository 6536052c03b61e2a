//! Annotator - interactive geometric annotation editor
//!
//! Turns pointer and keyboard input into boxes and lines over an image, and
//! keeps those shapes in sync with an externally owned list of labels.

pub mod color_utils;
pub mod config;
pub mod constants;
pub mod controller;
pub mod editor;
pub mod element;
pub mod error;
pub mod event;
pub mod geometry;
pub mod input;
pub mod keybindings;
pub mod model;
pub mod positioner;
pub mod reconcile;
pub mod render;
pub mod session;
pub mod store;

#[cfg(test)]
mod tests;

pub use config::{ConfigError, EditorConfig};
pub use controller::{Interaction, InteractionController};
pub use editor::{Editor, ReconcileReport};
pub use element::{Element, ElementKind, Handle};
pub use error::EditorError;
pub use event::EditorEvent;
pub use geometry::{CoordinateSpace, Point, Size, Viewbox};
pub use input::{Key, KeyEvent, PointerDevice, PointerEvent, PointerPhase};
pub use model::{Label, LabelId, LabelPatch, LabelShape, ObjectClass};
pub use render::{RecordingSurface, RenderCommand, RenderSurface};
pub use session::{Session, SessionError, fold_event};
pub use store::ElementStore;
