//! Object class data model.

use serde::{Deserialize, Serialize};

use crate::color_utils::Color;

/// A classification a label can reference. Read-only to the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectClass {
    /// Unique identifier for the class
    pub id: u32,
    /// Display name of the class
    pub name: String,
    /// Display color as a 6-hex-digit string
    pub color_code: String,
}

impl ObjectClass {
    /// Create a new object class with the given ID, name, and color code.
    pub fn new(id: u32, name: &str, color_code: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            color_code: color_code.to_string(),
        }
    }

    /// Resolve the display color, generating one if the code is malformed.
    pub fn color(&self) -> Color {
        Color::from_hex(&self.color_code).unwrap_or_else(|e| {
            log::warn!("Object class {} ({}): {}", self.id, self.name, e);
            Color::generated(self.id)
        })
    }
}

/// Resolve the display color for an optional class reference.
pub fn resolve_color(classes: &[ObjectClass], class_id: Option<u32>) -> Color {
    match class_id {
        Some(id) => classes
            .iter()
            .find(|class| class.id == id)
            .map(ObjectClass::color)
            .unwrap_or_else(|| Color::generated(id)),
        None => Color::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_class() {
        let classes = vec![ObjectClass::new(1, "car", "ff0000"), ObjectClass::new(2, "person", "00ff00")];
        assert_eq!(resolve_color(&classes, Some(2)), Color::new(0, 255, 0));
    }

    #[test]
    fn test_resolve_unknown_or_missing_class() {
        let classes = vec![ObjectClass::new(1, "car", "not-a-color")];
        assert_eq!(resolve_color(&classes, Some(1)), Color::generated(1));
        assert_eq!(resolve_color(&classes, Some(9)), Color::generated(9));
        assert_eq!(resolve_color(&classes, None), Color::default());
    }
}
