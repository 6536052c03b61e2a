//! Placement of the contextual option panel for a selected label.
//!
//! The panel sits just below the box. If that would run past the bottom of the
//! document it flips above; if neither fits it is centered vertically beside
//! the box. All results are screen-space offsets from the document's top-left
//! corner.

use crate::geometry::Size;

/// Where the panel ended up relative to the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Below,
    Above,
    Beside,
}

/// Translate offset for the panel, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelPosition {
    pub x: f32,
    pub y: f32,
    pub placement: Placement,
}

/// Box bounds in natural image pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxBounds {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

/// Everything the placement depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelLayout {
    pub bounds: BoxBounds,
    /// Natural document size.
    pub document: Size,
    pub zoom: f32,
    /// Measured panel size in screen pixels.
    pub panel: Size,
    /// Gap between box and panel in screen pixels.
    pub margin: f32,
}

/// Compute the panel offset.
pub fn position_panel(layout: &PanelLayout) -> PanelPosition {
    let zoom = if layout.zoom > 0.0 { layout.zoom } else { 1.0 };
    let doc_width = layout.document.width * zoom;
    let doc_height = layout.document.height * zoom;

    let left = layout.bounds.left.min(layout.bounds.right) * zoom;
    let right = layout.bounds.left.max(layout.bounds.right) * zoom;
    let top = layout.bounds.top.min(layout.bounds.bottom) * zoom;
    let bottom = layout.bounds.top.max(layout.bounds.bottom) * zoom;

    let panel = layout.panel;
    let max_x = (doc_width - panel.width).max(0.0);

    let below = bottom + layout.margin;
    if below + panel.height <= doc_height {
        return PanelPosition {
            x: left.clamp(0.0, max_x),
            y: below,
            placement: Placement::Below,
        };
    }

    let above = top - layout.margin - panel.height;
    if above >= 0.0 {
        return PanelPosition {
            x: left.clamp(0.0, max_x),
            y: above,
            placement: Placement::Above,
        };
    }

    let mut x = right + layout.margin;
    if x + panel.width > doc_width {
        x = left - layout.margin - panel.width;
    }
    let max_y = (doc_height - panel.height).max(0.0);
    let y = ((top + bottom) / 2.0 - panel.height / 2.0).clamp(0.0, max_y);

    PanelPosition {
        x: x.clamp(0.0, max_x),
        y,
        placement: Placement::Beside,
    }
}
