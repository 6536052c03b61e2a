//! Coordinate space mathematics.
//!
//! Maps raw input-device coordinates (screen pixels) onto document space
//! (natural image pixels) through the current viewbox and zoom factor.
//! Stored geometry is never scaled by zoom; only rendering weights are.

use serde::{Deserialize, Serialize};

/// A 2D point. Depending on context this is in device or document space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Offset the point by a delta.
    pub fn offset(&self, dx: f32, dy: f32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Round both coordinates to whole pixels.
    pub fn rounded(&self) -> Point {
        Point::new(self.x.round(), self.y.round())
    }
}

/// Width and height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// The region of document space currently mapped onto the render surface.
///
/// `x`/`y` is the document point shown at the surface origin, `width`/`height`
/// is the extent of the document (the natural image size). Drag input is
/// clamped to `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewbox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewbox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Viewbox covering a whole image of the given size.
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Clamp a document point into `[0, width] x [0, height]`.
    pub fn clamp(&self, point: Point) -> Point {
        Point::new(
            point.x.clamp(0.0, self.width.max(0.0)),
            point.y.clamp(0.0, self.height.max(0.0)),
        )
    }

    /// Clamp a translation so that the axis-aligned extent `[min, max]` stays inside.
    ///
    /// Returns the largest delta (towards the requested one) that keeps the
    /// extent within the document bounds. An extent already sticking out is
    /// never pushed further out, and never forced to move.
    pub fn clamp_translation(&self, min: Point, max: Point, dx: f32, dy: f32) -> (f32, f32) {
        let dx = dx.clamp((-min.x).min(0.0), (self.width - max.x).max(0.0));
        let dy = dy.clamp((-min.y).min(0.0), (self.height - max.y).max(0.0));
        (dx, dy)
    }
}

impl Default for Viewbox {
    fn default() -> Self {
        Self::from_size(0.0, 0.0)
    }
}

/// Transform from device coordinates into document coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateSpace {
    /// Device-space position of the render surface's top-left corner.
    pub origin: Point,
    /// Currently mapped document region.
    pub viewbox: Viewbox,
    /// Magnification; always positive.
    pub zoom: f32,
}

impl CoordinateSpace {
    pub fn new(origin: Point, viewbox: Viewbox, zoom: f32) -> Self {
        Self {
            origin,
            viewbox,
            zoom: sanitize_zoom(zoom),
        }
    }

    /// Unzoomed space for an image of the given size placed at the device origin.
    pub fn for_image(width: f32, height: f32) -> Self {
        Self::new(Point::default(), Viewbox::from_size(width, height), 1.0)
    }

    /// Convert a raw input coordinate into document space.
    pub fn to_document_point(&self, device_x: f32, device_y: f32) -> Point {
        Point::new(
            (device_x - self.origin.x) / self.zoom + self.viewbox.x,
            (device_y - self.origin.y) / self.zoom + self.viewbox.y,
        )
    }

    /// Convert a document point back into device space.
    pub fn to_device_point(&self, point: Point) -> Point {
        Point::new(
            (point.x - self.viewbox.x) * self.zoom + self.origin.x,
            (point.y - self.viewbox.y) * self.zoom + self.origin.y,
        )
    }

    /// Convert a device-space length into document units.
    pub fn to_document_length(&self, device_length: f32) -> f32 {
        device_length / self.zoom
    }

    /// Set a new zoom level, keeping the document point under `cursor` fixed.
    ///
    /// 1. Find the document point under the cursor
    /// 2. After zooming, shift the viewbox origin so that same point stays under the cursor
    pub fn zoom_at(&self, new_zoom: f32, cursor: Point) -> CoordinateSpace {
        let new_zoom = sanitize_zoom(new_zoom);
        let anchor = self.to_document_point(cursor.x, cursor.y);

        let mut viewbox = self.viewbox;
        viewbox.x = anchor.x - (cursor.x - self.origin.x) / new_zoom;
        viewbox.y = anchor.y - (cursor.y - self.origin.y) / new_zoom;

        CoordinateSpace {
            origin: self.origin,
            viewbox,
            zoom: new_zoom,
        }
    }
}

impl Default for CoordinateSpace {
    fn default() -> Self {
        Self::for_image(0.0, 0.0)
    }
}

fn sanitize_zoom(zoom: f32) -> f32 {
    if zoom.is_finite() && zoom > 0.0 {
        zoom
    } else {
        log::warn!("Ignoring non-positive zoom factor {}, using 1.0", zoom);
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_identity_space() {
        let space = CoordinateSpace::for_image(640.0, 480.0);
        let p = space.to_document_point(120.0, 80.0);
        assert_eq!(p, Point::new(120.0, 80.0));
    }

    #[test]
    fn test_zoom_and_origin() {
        let space = CoordinateSpace::new(Point::new(100.0, 50.0), Viewbox::from_size(640.0, 480.0), 2.0);
        let p = space.to_document_point(300.0, 250.0);
        assert!(approx_eq(p.x, 100.0));
        assert!(approx_eq(p.y, 100.0));

        let back = space.to_device_point(p);
        assert!(approx_eq(back.x, 300.0));
        assert!(approx_eq(back.y, 250.0));
    }

    #[test]
    fn test_panned_viewbox() {
        let space = CoordinateSpace::new(Point::default(), Viewbox::new(40.0, 30.0, 640.0, 480.0), 4.0);
        let p = space.to_document_point(80.0, 40.0);
        assert!(approx_eq(p.x, 60.0));
        assert!(approx_eq(p.y, 40.0));
    }

    #[test]
    fn test_non_positive_zoom_falls_back() {
        let space = CoordinateSpace::new(Point::default(), Viewbox::from_size(10.0, 10.0), 0.0);
        assert_eq!(space.zoom, 1.0);
        let space = CoordinateSpace::new(Point::default(), Viewbox::from_size(10.0, 10.0), -3.0);
        assert_eq!(space.zoom, 1.0);
    }

    #[test]
    fn test_zoom_at_preserves_cursor_point() {
        let space = CoordinateSpace::new(Point::new(20.0, 10.0), Viewbox::new(5.0, 5.0, 800.0, 600.0), 1.5);
        let cursor = Point::new(210.0, 130.0);
        let before = space.to_document_point(cursor.x, cursor.y);

        let zoomed = space.zoom_at(3.0, cursor);
        let after = zoomed.to_document_point(cursor.x, cursor.y);

        assert_eq!(zoomed.zoom, 3.0);
        assert!(approx_eq(before.x, after.x));
        assert!(approx_eq(before.y, after.y));
    }

    #[test]
    fn test_document_length_scales_with_zoom() {
        let space = CoordinateSpace::new(Point::default(), Viewbox::from_size(100.0, 100.0), 4.0);
        assert!(approx_eq(space.to_document_length(8.0), 2.0));
    }

    #[test]
    fn test_clamp_to_viewbox() {
        let viewbox = Viewbox::from_size(200.0, 100.0);
        assert_eq!(viewbox.clamp(Point::new(-5.0, 50.0)), Point::new(0.0, 50.0));
        assert_eq!(viewbox.clamp(Point::new(250.0, 120.0)), Point::new(200.0, 100.0));
        assert_eq!(viewbox.clamp(Point::new(20.0, 30.0)), Point::new(20.0, 30.0));
    }

    #[test]
    fn test_clamp_translation() {
        let viewbox = Viewbox::from_size(100.0, 100.0);
        let min = Point::new(10.0, 10.0);
        let max = Point::new(95.0, 50.0);

        assert_eq!(viewbox.clamp_translation(min, max, 10.0, 0.0), (5.0, 0.0));
        assert_eq!(viewbox.clamp_translation(min, max, -20.0, -3.0), (-10.0, -3.0));
        assert_eq!(viewbox.clamp_translation(min, max, 1.0, 1.0), (1.0, 1.0));
    }

    #[test]
    fn test_clamp_translation_out_of_bounds_extent() {
        let viewbox = Viewbox::from_size(100.0, 100.0);
        let min = Point::new(-5.0, 10.0);
        let max = Point::new(20.0, 30.0);

        assert_eq!(viewbox.clamp_translation(min, max, -3.0, 0.0), (0.0, 0.0));
        assert_eq!(viewbox.clamp_translation(min, max, 4.0, 0.0), (4.0, 0.0));
    }
}
