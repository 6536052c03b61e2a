//! Data models shared with the label owner.

mod label;
mod object_class;

pub use label::{BackPlane, Label, LabelId, LabelPatch, LabelShape};
pub use object_class::{ObjectClass, resolve_color};
