//! Geometric elements: the visual counterpart of a label.
//!
//! Every element is a two-point shape. A [`ElementKind::Box`] spans the
//! rectangle between its points, a [`ElementKind::Line`] connects them.
//! `start`/`end` are kept in drawing order while the user drags; only
//! [`Element::normalize`] reorders them.

use crate::color_utils::Color;
use crate::geometry::Point;
use crate::model::{BackPlane, Label, LabelId, LabelPatch, LabelShape, ObjectClass, resolve_color};
use crate::render::{BackProjection, Primitive, RenderCommand, RenderStyle};

// ============================================================================
// Handles
// ============================================================================

/// Which of the two element points a handle coordinate is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    Start,
    End,
}

/// A resize handle. Each axis is bound to either the start or the end point,
/// so a box has four corner handles and a line has two endpoint handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    pub x: Anchor,
    pub y: Anchor,
}

impl Handle {
    pub const START: Handle = Handle { x: Anchor::Start, y: Anchor::Start };
    pub const END: Handle = Handle { x: Anchor::End, y: Anchor::End };
    pub const START_X_END_Y: Handle = Handle { x: Anchor::Start, y: Anchor::End };
    pub const END_X_START_Y: Handle = Handle { x: Anchor::End, y: Anchor::Start };

    const BOX: [Handle; 4] = [Self::START, Self::END_X_START_Y, Self::END, Self::START_X_END_Y];
    const LINE: [Handle; 2] = [Self::START, Self::END];
}

// ============================================================================
// Back plane
// ============================================================================

/// Back-plane rectangle of a spatial box, in document space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackGeometry {
    pub start: Point,
    pub end: Point,
    /// Offset ratio when derived from the front box rather than taken from a
    /// label. Derived planes follow the front box and are never reported back.
    pub derived_offset: Option<f32>,
}

impl BackGeometry {
    fn from_plane(plane: BackPlane) -> Self {
        Self {
            start: Point::new(plane.left as f32, plane.top as f32),
            end: Point::new(plane.right as f32, plane.bottom as f32),
            derived_offset: None,
        }
    }

    pub fn is_derived(&self) -> bool {
        self.derived_offset.is_some()
    }

    fn to_plane(self) -> BackPlane {
        let (min, max) = ordered(self.start, self.end);
        BackPlane {
            left: min.x.round() as i32,
            top: min.y.round() as i32,
            right: max.x.round() as i32,
            bottom: max.y.round() as i32,
        }
    }
}

// ============================================================================
// Element
// ============================================================================

/// The shape variant of an element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementKind {
    /// Axis-aligned box, optionally with a back plane in spatial mode.
    Box { back: Option<BackGeometry> },
    /// Line segment.
    Line,
}

/// A live two-point shape. Identity is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    id: LabelId,
    pub kind: ElementKind,
    /// First point, in document space.
    pub start: Point,
    /// Second point, in document space.
    pub end: Point,
    pub object_class_id: Option<u32>,
    pub color: Color,
    pub selected: bool,
    pub hovered: bool,
    /// Affects only rendered stroke and handle thickness, never geometry.
    pub zoom_factor: f32,
}

impl Element {
    /// Create a box element.
    pub fn new_box(id: LabelId, start: Point, end: Point) -> Self {
        Self::with_kind(id, ElementKind::Box { back: None }, start, end)
    }

    /// Create a line element.
    pub fn new_line(id: LabelId, start: Point, end: Point) -> Self {
        Self::with_kind(id, ElementKind::Line, start, end)
    }

    /// Create an element of the given shape.
    pub fn of_shape(shape: LabelShape, id: LabelId, start: Point, end: Point) -> Self {
        match shape {
            LabelShape::Box => Self::new_box(id, start, end),
            LabelShape::Line => Self::new_line(id, start, end),
        }
    }

    fn with_kind(id: LabelId, kind: ElementKind, start: Point, end: Point) -> Self {
        Self {
            id,
            kind,
            start,
            end,
            object_class_id: None,
            color: Color::default(),
            selected: false,
            hovered: false,
            zoom_factor: 1.0,
        }
    }

    /// Element factory: build the element representing a label.
    pub fn from_label(label: &Label, classes: &[ObjectClass], spatial: bool, back_offset: f32, zoom: f32) -> Self {
        let start = Point::new(label.left as f32, label.top as f32);
        let end = Point::new(label.right as f32, label.bottom as f32);
        let mut element = Self::of_shape(label.shape, label.id.clone(), start, end);
        element.object_class_id = label.object_class_id;
        element.color = resolve_color(classes, label.object_class_id);
        element.selected = label.is_selected;
        element.hovered = label.is_hovered;
        element.zoom_factor = zoom;
        element.sync_back_plane(label.back_plane(), spatial, back_offset);
        element
    }

    /// Overwrite geometry, selection and color from the label.
    ///
    /// Returns true if anything visible changed.
    pub fn update_from_label(&mut self, label: &Label, classes: &[ObjectClass], spatial: bool, back_offset: f32) -> bool {
        let before = self.clone();

        self.start = Point::new(label.left as f32, label.top as f32);
        self.end = Point::new(label.right as f32, label.bottom as f32);
        self.object_class_id = label.object_class_id;
        self.color = resolve_color(classes, label.object_class_id);
        self.selected = label.is_selected;
        self.sync_back_plane(label.back_plane(), spatial, back_offset);

        *self != before
    }

    fn sync_back_plane(&mut self, plane: Option<BackPlane>, spatial: bool, back_offset: f32) {
        if !matches!(self.kind, ElementKind::Box { .. }) {
            return;
        }
        let back = spatial.then(|| match plane {
            Some(plane) => BackGeometry::from_plane(plane),
            None => self.create_back_element(back_offset),
        });
        self.kind = ElementKind::Box { back };
    }

    pub fn id(&self) -> &LabelId {
        &self.id
    }

    pub fn shape(&self) -> LabelShape {
        match self.kind {
            ElementKind::Box { .. } => LabelShape::Box,
            ElementKind::Line => LabelShape::Line,
        }
    }

    pub fn back(&self) -> Option<&BackGeometry> {
        match &self.kind {
            ElementKind::Box { back } => back.as_ref(),
            ElementKind::Line => None,
        }
    }

    pub fn width(&self) -> f32 {
        (self.end.x - self.start.x).abs()
    }

    pub fn height(&self) -> f32 {
        (self.end.y - self.start.y).abs()
    }

    /// Covered area; always zero for lines.
    pub fn area(&self) -> f32 {
        match self.kind {
            ElementKind::Box { .. } => self.width() * self.height(),
            ElementKind::Line => 0.0,
        }
    }

    /// Whether the element may be committed.
    ///
    /// Boxes must be strictly non-degenerate. Lines are always valid, a
    /// single-point line serves as an anchor marker.
    pub fn is_valid(&self) -> bool {
        match self.kind {
            ElementKind::Box { .. } => self.width() > 0.0 && self.height() > 0.0,
            ElementKind::Line => true,
        }
    }

    /// Round the geometry to the whole pixels labels are stored in.
    ///
    /// Commit paths snap before validating, so a sub-pixel box is seen as the
    /// degenerate label it would become.
    pub fn snap_to_pixels(&mut self) {
        self.start = self.start.rounded();
        self.end = self.end.rounded();
        if let ElementKind::Box { back: Some(back) } = &mut self.kind {
            back.start = back.start.rounded();
            back.end = back.end.rounded();
        }
        self.refresh_derived_back();
    }

    /// Order the points so that `start <= end` componentwise. No-op for lines.
    pub fn normalize(&mut self) {
        if let ElementKind::Box { back } = &mut self.kind {
            let (min, max) = ordered(self.start, self.end);
            self.start = min;
            self.end = max;
            if let Some(back) = back {
                let (min, max) = ordered(back.start, back.end);
                back.start = min;
                back.end = max;
            }
        }
    }

    /// Set the end point. Ordering is left untouched.
    pub fn set_end(&mut self, point: Point) {
        self.end = point;
        self.refresh_derived_back();
    }

    /// Move one handle to `point`.
    pub fn set_handle(&mut self, handle: Handle, point: Point) {
        match handle.x {
            Anchor::Start => self.start.x = point.x,
            Anchor::End => self.end.x = point.x,
        }
        match handle.y {
            Anchor::Start => self.start.y = point.y,
            Anchor::End => self.end.y = point.y,
        }
        self.refresh_derived_back();
    }

    /// Current position of a handle.
    pub fn handle_position(&self, handle: Handle) -> Point {
        let x = match handle.x {
            Anchor::Start => self.start.x,
            Anchor::End => self.end.x,
        };
        let y = match handle.y {
            Anchor::Start => self.start.y,
            Anchor::End => self.end.y,
        };
        Point::new(x, y)
    }

    /// All handles of this element with their positions.
    pub fn handles(&self) -> Vec<(Handle, Point)> {
        let handles: &[Handle] = match self.kind {
            ElementKind::Box { .. } => &Handle::BOX,
            ElementKind::Line => &Handle::LINE,
        };
        handles.iter().map(|&h| (h, self.handle_position(h))).collect()
    }

    /// Find the handle within `radius` (document units) of `point`, closest first.
    pub fn hit_test_handle(&self, point: Point, radius: f32) -> Option<Handle> {
        self.handles()
            .into_iter()
            .map(|(handle, pos)| (handle, pos.distance_to(&point)))
            .filter(|(_, distance)| *distance <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(handle, _)| handle)
    }

    /// Check if a point is on the element body. `tolerance` widens lines.
    pub fn contains(&self, point: Point, tolerance: f32) -> bool {
        match self.kind {
            ElementKind::Box { .. } => {
                let (min, max) = ordered(self.start, self.end);
                point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
            }
            ElementKind::Line => distance_to_segment(point, self.start, self.end) <= tolerance,
        }
    }

    /// Translate both points, and the back plane if any.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.start = self.start.offset(dx, dy);
        self.end = self.end.offset(dx, dy);
        if let ElementKind::Box { back: Some(back) } = &mut self.kind {
            back.start = back.start.offset(dx, dy);
            back.end = back.end.offset(dx, dy);
        }
    }

    /// Bounding extent of the front shape.
    pub fn extent(&self) -> (Point, Point) {
        ordered(self.start, self.end)
    }

    /// Extent that must stay inside the document when the element is moved.
    ///
    /// Covers the front shape and a back plane taken from a label. Derived
    /// back planes are presentational and do not constrain movement.
    pub fn movement_extent(&self) -> (Point, Point) {
        let (mut min, mut max) = self.extent();
        if let Some(back) = self.back().filter(|back| !back.is_derived()) {
            let (back_min, back_max) = ordered(back.start, back.end);
            min = Point::new(min.x.min(back_min.x), min.y.min(back_min.y));
            max = Point::new(max.x.max(back_max.x), max.y.max(back_max.y));
        }
        (min, max)
    }

    /// Give a box a back plane derived from its current geometry. No-op for
    /// lines and for boxes that already have one.
    pub fn attach_derived_back(&mut self, offset: f32) {
        if let ElementKind::Box { back: None } = self.kind {
            self.kind = ElementKind::Box {
                back: Some(self.create_back_element(offset)),
            };
        }
    }

    /// Derive an offset back plane from the front box.
    ///
    /// The plane has the front box's size and is shifted right and up by
    /// `offset` times its width and height.
    pub fn create_back_element(&self, offset: f32) -> BackGeometry {
        let dx = self.width() * offset;
        let dy = -self.height() * offset;
        BackGeometry {
            start: self.start.offset(dx, dy),
            end: self.end.offset(dx, dy),
            derived_offset: Some(offset),
        }
    }

    fn refresh_derived_back(&mut self) {
        let Some(offset) = self.back().and_then(|back| back.derived_offset) else {
            return;
        };
        let derived = self.create_back_element(offset);
        self.kind = ElementKind::Box { back: Some(derived) };
    }

    /// Translate the element into a label-shaped record.
    ///
    /// Box coordinates are reported normalized, line endpoints in drawing order.
    pub fn data(&self) -> LabelPatch {
        let (a, b) = match self.kind {
            ElementKind::Box { .. } => ordered(self.start, self.end),
            ElementKind::Line => (self.start, self.end),
        };
        LabelPatch {
            id: self.id.clone(),
            shape: self.shape(),
            object_class_id: self.object_class_id,
            left: a.x.round() as i32,
            top: a.y.round() as i32,
            right: b.x.round() as i32,
            bottom: b.y.round() as i32,
            back: self.back().filter(|back| !back.is_derived()).map(|back| back.to_plane()),
            is_selected: self.selected,
        }
    }

    /// Project the element into a render command.
    pub fn draw(&self, style: &RenderStyle) -> RenderCommand {
        let zoom = if self.zoom_factor > 0.0 { self.zoom_factor } else { 1.0 };
        let primitive = match self.kind {
            ElementKind::Box { .. } => {
                let (min, max) = self.extent();
                Primitive::Rect {
                    x: min.x,
                    y: min.y,
                    width: max.x - min.x,
                    height: max.y - min.y,
                }
            }
            ElementKind::Line => Primitive::Line {
                from: self.start,
                to: self.end,
            },
        };

        let back = self.back().map(|back| {
            let (front_min, front_max) = self.extent();
            let (back_min, back_max) = ordered(back.start, back.end);
            let front = corners(front_min, front_max);
            let rear = corners(back_min, back_max);
            BackProjection {
                start: back_min,
                end: back_max,
                edges: [(front[0], rear[0]), (front[1], rear[1]), (front[2], rear[2]), (front[3], rear[3])],
            }
        });

        let handles = if self.selected {
            self.handles().into_iter().map(|(_, p)| p).collect()
        } else {
            Vec::new()
        };

        RenderCommand {
            id: self.id.clone(),
            primitive,
            back,
            color: self.color,
            stroke_width: style.stroke_width / zoom,
            handle_size: style.handle_size / zoom,
            handles,
            selected: self.selected,
            hovered: self.hovered,
        }
    }
}

fn ordered(a: Point, b: Point) -> (Point, Point) {
    (Point::new(a.x.min(b.x), a.y.min(b.y)), Point::new(a.x.max(b.x), a.y.max(b.y)))
}

/// Corners clockwise from top-left.
fn corners(min: Point, max: Point) -> [Point; 4] {
    [min, Point::new(max.x, min.y), max, Point::new(min.x, max.y)]
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let length_sq = dx * dx + dy * dy;
    if length_sq == 0.0 {
        return p.distance_to(&a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0);
    p.distance_to(&Point::new(a.x + t * dx, a.y + t * dy))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(x1: f32, y1: f32, x2: f32, y2: f32) -> Element {
        Element::new_box(LabelId::from(1), Point::new(x1, y1), Point::new(x2, y2))
    }

    #[test]
    fn test_box_area_and_validity() {
        let element = boxed(10.0, 10.0, 50.0, 40.0);
        assert_eq!(element.width(), 40.0);
        assert_eq!(element.height(), 30.0);
        assert_eq!(element.area(), 1200.0);
        assert!(element.is_valid());

        assert!(!boxed(10.0, 10.0, 10.0, 40.0).is_valid());
        assert!(!boxed(10.0, 10.0, 50.0, 10.0).is_valid());
        assert!(!boxed(5.0, 5.0, 5.0, 5.0).is_valid());
    }

    #[test]
    fn test_line_is_always_valid_with_zero_area() {
        let line = Element::new_line(LabelId::from(2), Point::new(3.0, 3.0), Point::new(3.0, 3.0));
        assert!(line.is_valid());
        assert_eq!(line.area(), 0.0);

        let line = Element::new_line(LabelId::from(2), Point::new(0.0, 0.0), Point::new(30.0, 40.0));
        assert_eq!(line.area(), 0.0);
    }

    #[test]
    fn test_setters_do_not_normalize() {
        let mut element = boxed(50.0, 50.0, 50.0, 50.0);
        element.set_end(Point::new(20.0, 10.0));
        assert_eq!(element.start, Point::new(50.0, 50.0));
        assert_eq!(element.end, Point::new(20.0, 10.0));
        assert_eq!(element.width(), 30.0);
        assert_eq!(element.height(), 40.0);

        element.normalize();
        assert_eq!(element.start, Point::new(20.0, 10.0));
        assert_eq!(element.end, Point::new(50.0, 50.0));
    }

    #[test]
    fn test_normalize_leaves_lines_alone() {
        let mut line = Element::new_line(LabelId::from(1), Point::new(40.0, 40.0), Point::new(0.0, 0.0));
        line.normalize();
        assert_eq!(line.start, Point::new(40.0, 40.0));
        assert_eq!(line.end, Point::new(0.0, 0.0));

        let data = line.data();
        assert_eq!((data.left, data.top, data.right, data.bottom), (40, 40, 0, 0));
    }

    #[test]
    fn test_data_reports_normalized_box() {
        let mut element = boxed(50.4, 40.6, 10.0, 10.0);
        element.selected = true;
        let data = element.data();
        assert_eq!(data.id, LabelId::from(1));
        assert_eq!((data.left, data.top, data.right, data.bottom), (10, 10, 50, 41));
        assert!(data.is_selected);
        assert_eq!(data.shape, LabelShape::Box);
    }

    #[test]
    fn test_handle_hit_and_drag() {
        let mut element = boxed(10.0, 10.0, 50.0, 40.0);
        assert_eq!(element.hit_test_handle(Point::new(49.0, 11.0), 3.0), Some(Handle::END_X_START_Y));
        assert_eq!(element.hit_test_handle(Point::new(30.0, 25.0), 3.0), None);

        element.set_handle(Handle::END_X_START_Y, Point::new(60.0, 5.0));
        assert_eq!(element.start, Point::new(10.0, 5.0));
        assert_eq!(element.end, Point::new(60.0, 40.0));
    }

    #[test]
    fn test_contains() {
        let element = boxed(50.0, 40.0, 10.0, 10.0);
        assert!(element.contains(Point::new(30.0, 20.0), 0.0));
        assert!(!element.contains(Point::new(60.0, 20.0), 0.0));

        let line = Element::new_line(LabelId::from(2), Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!(line.contains(Point::new(50.0, 2.0), 3.0));
        assert!(!line.contains(Point::new(50.0, 5.0), 3.0));
        assert!(!line.contains(Point::new(110.0, 0.0), 3.0));
    }

    #[test]
    fn test_from_label_spatial_back_plane() {
        let classes = vec![ObjectClass::new(4, "car", "ff0000")];
        let label = Label::new(7, 10, 20, 110, 70).with_class(4, "car");

        let flat = Element::from_label(&label, &classes, false, 0.2, 1.0);
        assert!(flat.back().is_none());
        assert_eq!(flat.color, Color::new(255, 0, 0));

        let spatial = Element::from_label(&label, &classes, true, 0.2, 1.0);
        let back = spatial.back().copied().unwrap();
        assert!(back.is_derived());
        assert_eq!(back.start, Point::new(30.0, 10.0));
        assert_eq!(back.end, Point::new(130.0, 60.0));
        assert!(spatial.data().back.is_none());

        let explicit = label.with_back_plane(BackPlane { left: 15, top: 15, right: 100, bottom: 60 });
        let spatial = Element::from_label(&explicit, &classes, true, 0.2, 1.0);
        assert!(!spatial.back().unwrap().is_derived());
        assert_eq!(spatial.data().back.map(|b| b.right), Some(100));
    }

    #[test]
    fn test_derived_back_plane_follows_resize() {
        let label = Label::new(1, 0, 50, 100, 100);
        let mut element = Element::from_label(&label, &[], true, 0.2, 1.0);
        element.set_end(Point::new(200.0, 100.0));
        let back = element.back().copied().unwrap();
        assert_eq!(back.start, Point::new(40.0, 40.0));
        assert_eq!(back.end, Point::new(240.0, 90.0));
    }

    #[test]
    fn test_movement_extent_ignores_derived_back() {
        let label = Label::new(1, 10, 10, 20, 20);
        let derived = Element::from_label(&label, &[], true, 0.5, 1.0);
        assert_eq!(derived.movement_extent(), (Point::new(10.0, 10.0), Point::new(20.0, 20.0)));

        let explicit = label.with_back_plane(BackPlane { left: 5, top: 12, right: 15, bottom: 30 });
        let explicit = Element::from_label(&explicit, &[], true, 0.5, 1.0);
        assert_eq!(explicit.movement_extent(), (Point::new(5.0, 10.0), Point::new(20.0, 30.0)));
    }

    #[test]
    fn test_snap_exposes_subpixel_box_as_degenerate() {
        let mut element = Element::new_box(LabelId::from(1), Point::new(10.0, 10.0), Point::new(10.25, 10.4));
        assert!(element.is_valid());
        element.snap_to_pixels();
        assert!(!element.is_valid());
        let patch = element.data();
        assert_eq!((patch.left, patch.top, patch.right, patch.bottom), (10, 10, 10, 10));
    }

    #[test]
    fn test_snap_keeps_derived_back_attached() {
        let mut element = Element::new_box(LabelId::from(1), Point::new(0.4, 0.4), Point::new(9.6, 9.6));
        element.attach_derived_back(0.5);
        element.snap_to_pixels();
        assert_eq!((element.start, element.end), (Point::new(0.0, 0.0), Point::new(10.0, 10.0)));
        let back = element.back().unwrap();
        assert!(back.is_derived());
        assert_eq!(back.start, Point::new(5.0, -5.0));
    }

    #[test]
    fn test_update_from_label_reports_change() {
        let label = Label::new(1, 0, 0, 10, 10);
        let mut element = Element::from_label(&label, &[], false, 0.2, 1.0);
        assert!(!element.update_from_label(&label, &[], false, 0.2));

        let moved = Label::new(1, 5, 0, 15, 10).selected(true);
        assert!(element.update_from_label(&moved, &[], false, 0.2));
        assert_eq!(element.start, Point::new(5.0, 0.0));
        assert!(element.selected);
    }

    #[test]
    fn test_draw_scales_weights_by_zoom() {
        let mut element = boxed(40.0, 30.0, 10.0, 10.0);
        element.zoom_factor = 2.0;
        element.selected = true;
        let style = RenderStyle {
            stroke_width: 2.0,
            handle_size: 8.0,
        };
        let command = element.draw(&style);
        assert_eq!(command.stroke_width, 1.0);
        assert_eq!(command.handle_size, 4.0);
        assert_eq!(command.handles.len(), 4);
        assert_eq!(
            command.primitive,
            Primitive::Rect {
                x: 10.0,
                y: 10.0,
                width: 30.0,
                height: 20.0
            }
        );
    }
}
