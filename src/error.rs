//! Error types for editor operations.

use thiserror::Error;

use crate::model::LabelId;

/// Errors that can occur while editing the element collection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// An element with this id is already present in the store
    #[error("Duplicate element id: {0}")]
    DuplicateId(LabelId),

    /// No element with this id is present in the store
    #[error("Unknown element id: {0}")]
    UnknownElement(LabelId),

    /// Object class color code is not a 6-hex-digit string
    #[error("Invalid color code: {0:?}")]
    InvalidColor(String),
}
