//! Render surface capability.
//!
//! The editor never holds a live handle per element. It projects elements into
//! [`RenderCommand`]s and hands them to whatever implements [`RenderSurface`].

use std::collections::HashMap;

use crate::color_utils::Color;
use crate::geometry::{Point, Size};
use crate::model::LabelId;

/// Base rendering weights in screen pixels; divided by the zoom factor when drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    pub stroke_width: f32,
    pub handle_size: f32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            stroke_width: crate::constants::DEFAULT_STROKE_WIDTH,
            handle_size: crate::constants::DEFAULT_HANDLE_SIZE,
        }
    }
}

/// Geometry of the front shape, in document space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Rect { x: f32, y: f32, width: f32, height: f32 },
    Line { from: Point, to: Point },
}

/// Back plane of a spatial box and the edges joining it to the front box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackProjection {
    pub start: Point,
    pub end: Point,
    /// Front corner to back corner, clockwise from top-left.
    pub edges: [(Point, Point); 4],
}

/// Everything needed to draw one element.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCommand {
    pub id: LabelId,
    pub primitive: Primitive,
    pub back: Option<BackProjection>,
    pub color: Color,
    pub stroke_width: f32,
    pub handle_size: f32,
    /// Handle centers; empty unless the element is selected.
    pub handles: Vec<Point>,
    pub selected: bool,
    pub hovered: bool,
}

/// What the editor needs from a drawing backend.
pub trait RenderSurface {
    /// Draw or redraw one element.
    fn draw(&mut self, command: &RenderCommand);

    /// Detach an element from the surface.
    fn destroy(&mut self, id: &LabelId);

    /// Measured size of the option panel shown for an element, if any.
    fn measure(&self, id: &LabelId) -> Option<Size>;
}

/// Surface that keeps the latest command per element.
///
/// Used by the replay binary and in tests; also handy for headless backends.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: HashMap<LabelId, RenderCommand>,
    panel_size: Option<Size>,
    draw_calls: usize,
    destroy_calls: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report this size for every option panel.
    pub fn with_panel_size(mut self, size: Size) -> Self {
        self.panel_size = Some(size);
        self
    }

    pub fn get(&self, id: &LabelId) -> Option<&RenderCommand> {
        self.commands.get(id)
    }

    /// Number of elements currently attached.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn draw_calls(&self) -> usize {
        self.draw_calls
    }

    pub fn destroy_calls(&self) -> usize {
        self.destroy_calls
    }
}

impl RenderSurface for RecordingSurface {
    fn draw(&mut self, command: &RenderCommand) {
        self.draw_calls += 1;
        self.commands.insert(command.id.clone(), command.clone());
    }

    fn destroy(&mut self, id: &LabelId) {
        self.destroy_calls += 1;
        self.commands.remove(id);
    }

    fn measure(&self, id: &LabelId) -> Option<Size> {
        self.commands.get(id).and(self.panel_size)
    }
}
