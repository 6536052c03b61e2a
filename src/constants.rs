//! Global constants for the annotation editor

use crate::color_utils::Color;

/// Color used for elements whose object class is unknown
pub const DEFAULT_ELEMENT_COLOR: Color = Color::new(0x33, 0x99, 0xff);

/// Stroke width of element outlines, in screen pixels
pub const DEFAULT_STROKE_WIDTH: f32 = 2.0;

/// Edge length of resize handles, in screen pixels
pub const DEFAULT_HANDLE_SIZE: f32 = 8.0;

/// Radius around a handle that still grabs it, in screen pixels
pub const DEFAULT_HANDLE_HIT_RADIUS: f32 = 10.0;

/// Distance a grabbed element must travel before it counts as moved (document pixels)
pub const DEFAULT_MIN_DRAG_DISTANCE: f32 = 1.0;

/// Arrow key translation step (document pixels)
pub const DEFAULT_NUDGE_STEP: f32 = 1.0;

/// Arrow key translation step with Shift held (document pixels)
pub const DEFAULT_NUDGE_STEP_LARGE: f32 = 10.0;

/// Back plane offset as a fraction of the front box size
pub const DEFAULT_BACK_PLANE_OFFSET: f32 = 0.2;

/// Gap between a selected box and its option panel, in screen pixels
pub const DEFAULT_PANEL_MARGIN: f32 = 8.0;

/// Hit radius around a line segment, in screen pixels
pub const LINE_HIT_RADIUS: f32 = 6.0;
