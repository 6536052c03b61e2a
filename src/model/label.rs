//! Label records exchanged with the label owner.
//!
//! Labels are owned outside the editor. The editor consumes them through
//! reconciliation and hands changes back as [`LabelPatch`] values.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Stable label identifier, unique within one image's label set.
///
/// Backends may hand out numeric ids; they are kept in their decimal string form.
/// Labels drawn in the editor get a locally generated UUID until the backend
/// confirms them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(String);

impl LabelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh local identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LabelId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for LabelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

macro_rules! label_id_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for LabelId {
                fn from(id: $ty) -> Self {
                    Self(id.to_string())
                }
            }
        )*
    };
}

label_id_from_integer!(i32, i64, u32, u64);

impl Serialize for LabelId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for LabelId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(id) => Self(id),
            RawId::Signed(id) => Self(id.to_string()),
            RawId::Unsigned(id) => Self(id.to_string()),
        })
    }
}

/// Which two-point shape a label describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LabelShape {
    /// Axis-aligned bounding box; Left/Top/Right/Bottom are its corners
    #[default]
    Box,
    /// Line segment; Left/Top is the start point, Right/Bottom the end point
    Line,
}

/// Back-plane rectangle of a spatial (3D) box, in natural image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackPlane {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// A label record as held by the label owner.
///
/// Coordinates are integer pixels in natural image space. The presentation
/// flags (`is_visible`, `is_selected`, `is_hovered`) are client-only and are
/// never serialized back out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Label {
    pub id: LabelId,
    #[serde(default)]
    pub object_class_id: Option<u32>,
    #[serde(default)]
    pub object_class_name: String,
    #[serde(default)]
    pub shape: LabelShape,
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_back: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_back: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_back: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom_back: Option<i32>,
    #[serde(rename = "isVisible", default = "default_visible", skip_serializing)]
    pub is_visible: bool,
    #[serde(rename = "isSelected", default, skip_serializing)]
    pub is_selected: bool,
    #[serde(rename = "isHovered", default, skip_serializing)]
    pub is_hovered: bool,
}

fn default_visible() -> bool {
    true
}

impl Label {
    /// Create a visible box label without an object class.
    pub fn new(id: impl Into<LabelId>, left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            id: id.into(),
            object_class_id: None,
            object_class_name: String::new(),
            shape: LabelShape::Box,
            left,
            top,
            right,
            bottom,
            left_back: None,
            top_back: None,
            right_back: None,
            bottom_back: None,
            is_visible: true,
            is_selected: false,
            is_hovered: false,
        }
    }

    /// Build a label from a patch emitted by the editor.
    pub fn from_patch(patch: &LabelPatch) -> Self {
        let mut label = Self::new(patch.id.clone(), patch.left, patch.top, patch.right, patch.bottom);
        label.shape = patch.shape;
        label.object_class_id = patch.object_class_id;
        label.is_selected = patch.is_selected;
        label
    }

    pub fn with_shape(mut self, shape: LabelShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_class(mut self, id: u32, name: impl Into<String>) -> Self {
        self.object_class_id = Some(id);
        self.object_class_name = name.into();
        self
    }

    pub fn with_back_plane(mut self, back: BackPlane) -> Self {
        self.left_back = Some(back.left);
        self.top_back = Some(back.top);
        self.right_back = Some(back.right);
        self.bottom_back = Some(back.bottom);
        self
    }

    pub fn visible(mut self, is_visible: bool) -> Self {
        self.is_visible = is_visible;
        self
    }

    pub fn selected(mut self, is_selected: bool) -> Self {
        self.is_selected = is_selected;
        self
    }

    /// The back plane, present only when all four back coordinates are set.
    pub fn back_plane(&self) -> Option<BackPlane> {
        Some(BackPlane {
            left: self.left_back?,
            top: self.top_back?,
            right: self.right_back?,
            bottom: self.bottom_back?,
        })
    }

    /// Overwrite geometry and selection from an editor patch.
    pub fn apply_patch(&mut self, patch: &LabelPatch) {
        self.left = patch.left;
        self.top = patch.top;
        self.right = patch.right;
        self.bottom = patch.bottom;
        self.is_selected = patch.is_selected;
        if let Some(back) = patch.back {
            self.left_back = Some(back.left);
            self.top_back = Some(back.top);
            self.right_back = Some(back.right);
            self.bottom_back = Some(back.bottom);
        }
    }
}

/// Label-shaped partial record emitted by the editor.
///
/// For boxes Left/Top/Right/Bottom are normalized corners; for lines they are
/// the start and end points in drawing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LabelPatch {
    pub id: LabelId,
    pub shape: LabelShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_class_id: Option<u32>,
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    #[serde(skip)]
    pub back: Option<BackPlane>,
    #[serde(rename = "isSelected")]
    pub is_selected: bool,
}
