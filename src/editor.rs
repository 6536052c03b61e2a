//! The editor: single dispatcher for external inputs and user input.
//!
//! Owns the element store, the interaction controller and the render surface.
//! Every public operation runs to completion and renders once at the end, so
//! the surface never sees a half-applied handler.

use crate::config::EditorConfig;
use crate::controller::{EditContext, InteractionController};
use crate::error::EditorError;
use crate::event::EditorEvent;
use crate::geometry::{CoordinateSpace, Point, Size, Viewbox};
use crate::input::{KeyEvent, PointerEvent};
use crate::model::{Label, LabelId, LabelShape, ObjectClass};
use crate::positioner::{BoxBounds, PanelLayout, PanelPosition, position_panel};
use crate::reconcile::{ReconcileOptions, diff};
use crate::render::RenderSurface;
use crate::store::ElementStore;

/// What a reconciliation pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: Vec<LabelId>,
    pub updated: Vec<LabelId>,
    pub destroyed: Vec<LabelId>,
}

impl ReconcileReport {
    /// True when nothing was created or destroyed.
    pub fn is_structurally_unchanged(&self) -> bool {
        self.created.is_empty() && self.destroyed.is_empty()
    }
}

/// Interactive annotation editor bound to a render surface.
pub struct Editor<S: RenderSurface> {
    store: ElementStore,
    controller: InteractionController,
    space: CoordinateSpace,
    config: EditorConfig,
    classes: Vec<ObjectClass>,
    labels: Vec<Label>,
    surface: S,
}

impl<S: RenderSurface> Editor<S> {
    pub fn new(config: EditorConfig, surface: S) -> Self {
        let controller = InteractionController::new(config.editor.default_shape);
        Self {
            store: ElementStore::new(),
            controller,
            space: CoordinateSpace::default(),
            config,
            classes: Vec::new(),
            labels: Vec::new(),
            surface,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn space(&self) -> &CoordinateSpace {
        &self.space
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The labels of the last external update.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn object_classes(&self) -> &[ObjectClass] {
        &self.classes
    }

    // ========================================================================
    // External inputs
    // ========================================================================

    /// Replace the label list and reconcile the elements against it.
    pub fn set_labels(&mut self, labels: Vec<Label>) -> ReconcileReport {
        self.labels = labels;
        self.reconcile()
    }

    /// Replace the object classes. Colors of existing elements follow.
    pub fn set_object_classes(&mut self, classes: Vec<ObjectClass>) -> ReconcileReport {
        self.classes = classes;
        self.reconcile()
    }

    /// Set the natural size of the displayed image.
    pub fn set_image_size(&mut self, size: Size) {
        self.space.viewbox.width = size.width;
        self.space.viewbox.height = size.height;
        self.store.mark_dirty();
        self.render();
    }

    pub fn set_viewbox(&mut self, viewbox: Viewbox) {
        self.space.viewbox = viewbox;
        self.store.mark_dirty();
        self.render();
    }

    /// Device position of the surface's top-left corner.
    pub fn set_origin(&mut self, origin: Point) {
        self.space.origin = origin;
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.apply_space(CoordinateSpace::new(self.space.origin, self.space.viewbox, zoom));
    }

    /// Zoom keeping the document point under the device-space `cursor` fixed.
    pub fn zoom_at(&mut self, zoom: f32, cursor: Point) {
        self.apply_space(self.space.zoom_at(zoom, cursor));
    }

    fn apply_space(&mut self, space: CoordinateSpace) {
        log::debug!("Zoom {:.2} -> {:.2}", self.space.zoom, space.zoom);
        self.space = space;
        self.store.set_zoom(space.zoom);
        self.render();
    }

    /// Shape used for the next draw.
    pub fn set_draw_shape(&mut self, shape: LabelShape) {
        self.controller.set_shape(shape);
    }

    /// Object class used for the next draw.
    pub fn set_draw_class(&mut self, class_id: Option<u32>) {
        self.controller.set_object_class(class_id);
    }

    // ========================================================================
    // User input
    // ========================================================================

    pub fn pointer(&mut self, event: &PointerEvent) -> Vec<EditorEvent> {
        let drawing = self.controller.in_progress().map(|e| e.id().clone());
        let mut ctx = EditContext {
            store: &mut self.store,
            space: &self.space,
            settings: &self.config.editor,
            keybindings: &self.config.keybindings,
            classes: &self.classes,
        };
        let events = self.controller.handle_pointer(event, &mut ctx);

        // A draw that ended without being committed leaves the surface
        if let Some(id) = drawing.filter(|id| self.controller.active_id() != Some(id) && !self.store.contains(id)) {
            self.surface.destroy(&id);
        }
        self.after_input(&events);
        events
    }

    pub fn key(&mut self, event: &KeyEvent) -> Vec<EditorEvent> {
        let mut ctx = EditContext {
            store: &mut self.store,
            space: &self.space,
            settings: &self.config.editor,
            keybindings: &self.config.keybindings,
            classes: &self.classes,
        };
        let events = self.controller.handle_key(event, &mut ctx);
        self.after_input(&events);
        events
    }

    /// Abandon any gesture in progress, as on window blur.
    pub fn cancel(&mut self) {
        let drawing = self.controller.in_progress().map(|e| e.id().clone());
        let mut ctx = EditContext {
            store: &mut self.store,
            space: &self.space,
            settings: &self.config.editor,
            keybindings: &self.config.keybindings,
            classes: &self.classes,
        };
        self.controller.cancel(&mut ctx);
        if let Some(id) = drawing {
            self.surface.destroy(&id);
        }
        self.render();
    }

    /// Select one element, or none.
    pub fn select(&mut self, id: Option<&LabelId>) -> Result<Vec<EditorEvent>, EditorError> {
        if let Some(id) = id.filter(|id| !self.store.contains(id)) {
            return Err(EditorError::UnknownElement(id.clone()));
        }
        if !self.store.select(id) {
            return Ok(Vec::new());
        }
        let selected = self.store.selected().map(|e| e.data());
        self.render();
        Ok(vec![EditorEvent::Selected(selected)])
    }

    /// Remove every element. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.store.clear();
        for element in &removed {
            self.surface.destroy(element.id());
        }
        if !removed.is_empty() {
            log::debug!("Cleared {} elements", removed.len());
        }
        removed.len()
    }

    fn after_input(&mut self, events: &[EditorEvent]) {
        for event in events {
            if let EditorEvent::ElementRemoved(patch) = event {
                self.surface.destroy(&patch.id);
            }
        }
        if events
            .iter()
            .any(|e| matches!(e, EditorEvent::ElementAdded(_) | EditorEvent::ElementChanged(_)))
        {
            self.store.reorder();
        }
        self.render();
    }

    // ========================================================================
    // Reconciliation and rendering
    // ========================================================================

    /// Bring the elements in line with the current labels and classes.
    ///
    /// The element under interactive edit is left alone until it is committed.
    pub fn reconcile(&mut self) -> ReconcileReport {
        let exclude = self.controller.active_id().cloned();
        let options = ReconcileOptions {
            classes: &self.classes,
            spatial: self.config.editor.spatial_mode,
            back_offset: self.config.editor.back_plane_offset,
            zoom: self.space.zoom,
            exclude: exclude.as_ref(),
        };

        let existing = self.store.take_all();
        let result = diff(&self.labels, existing, &options);

        let mut report = ReconcileReport {
            created: result.created,
            updated: result.updated,
            destroyed: result.destroyed.iter().map(|e| e.id().clone()).collect(),
        };
        for element in &result.destroyed {
            self.surface.destroy(element.id());
        }
        for element in self.store.replace(result.elements) {
            self.surface.destroy(element.id());
            report.destroyed.push(element.id().clone());
        }
        self.store.reorder();

        log::debug!(
            "Reconciled {} labels: {} created, {} updated, {} destroyed",
            self.labels.len(),
            report.created.len(),
            report.updated.len(),
            report.destroyed.len()
        );
        self.render();
        report
    }

    /// Push the current state to the surface if anything changed. A draw in
    /// progress is always pushed.
    pub fn render(&mut self) {
        let drawing = self.controller.in_progress().is_some();
        if !self.store.is_dirty() && !drawing {
            return;
        }
        let style = self.config.editor.render_style();
        for element in self.store.iter() {
            self.surface.draw(&element.draw(&style));
        }
        if let Some(element) = self.controller.in_progress() {
            self.surface.draw(&element.draw(&style));
        }
        self.store.clear_dirty();
    }

    /// Where to put the option panel of the selected element.
    ///
    /// `None` when nothing is selected, a gesture is in progress or the
    /// surface has no panel to measure.
    pub fn label_options_position(&self) -> Option<PanelPosition> {
        if self.controller.is_working() {
            return None;
        }
        let selected = self.store.selected()?;
        let panel = self.surface.measure(selected.id())?;
        let (min, max) = selected.extent();
        Some(position_panel(&PanelLayout {
            bounds: BoxBounds {
                left: min.x,
                top: min.y,
                right: max.x,
                bottom: max.y,
            },
            document: Size::new(self.space.viewbox.width, self.space.viewbox.height),
            zoom: self.space.zoom,
            panel,
            margin: self.config.editor.panel_margin,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingSurface;

    fn editor() -> Editor<RecordingSurface> {
        let mut editor = Editor::new(EditorConfig::new(), RecordingSurface::new().with_panel_size(Size::new(100.0, 40.0)));
        editor.set_image_size(Size::new(400.0, 300.0));
        editor
    }

    #[test]
    fn test_set_labels_renders_visible() {
        let mut editor = editor();
        let report = editor.set_labels(vec![
            Label::new(1, 10, 10, 50, 40),
            Label::new(2, 60, 60, 90, 90).visible(false),
        ]);
        assert_eq!(report.created, vec![LabelId::from(1)]);
        assert_eq!(editor.surface().len(), 1);
        assert!(editor.surface().get(&LabelId::from(1)).is_some());
    }

    #[test]
    fn test_hidden_label_is_detached() {
        let mut editor = editor();
        editor.set_labels(vec![Label::new(1, 10, 10, 50, 40)]);
        let report = editor.set_labels(vec![Label::new(1, 10, 10, 50, 40).visible(false)]);
        assert_eq!(report.destroyed, vec![LabelId::from(1)]);
        assert!(editor.surface().is_empty());
        assert!(editor.store().is_empty());
    }

    #[test]
    fn test_transient_element_is_drawn_then_detached() {
        let mut editor = editor();
        editor.pointer(&PointerEvent::down(10.0, 10.0));
        editor.pointer(&PointerEvent::moved(30.0, 30.0));
        let id = editor.controller().active_id().cloned().unwrap();
        assert!(editor.surface().get(&id).is_some());

        editor.pointer(&PointerEvent::leave());
        assert!(editor.surface().get(&id).is_none());
        assert!(editor.surface().is_empty());
    }

    #[test]
    fn test_committed_element_stays_on_surface() {
        let mut editor = editor();
        editor.pointer(&PointerEvent::down(10.0, 10.0));
        editor.pointer(&PointerEvent::moved(30.0, 30.0));
        let events = editor.pointer(&PointerEvent::up(30.0, 30.0));
        let id = events[0].label_id().cloned().unwrap();
        assert!(editor.store().contains(&id));
        assert!(editor.surface().get(&id).is_some());
    }

    #[test]
    fn test_external_update_skips_element_under_edit() {
        let mut editor = editor();
        editor.set_labels(vec![
            Label::new(1, 10, 10, 50, 40).selected(true),
            Label::new(2, 100, 100, 150, 150),
        ]);

        editor.pointer(&PointerEvent::down(50.0, 40.0));
        editor.pointer(&PointerEvent::moved(80.0, 70.0));
        editor.set_labels(vec![
            Label::new(1, 10, 10, 50, 40).selected(true),
            Label::new(2, 110, 110, 160, 160),
        ]);

        let first = editor.store().get(&LabelId::from(1)).unwrap();
        assert_eq!(first.end, Point::new(80.0, 70.0));
        let second = editor.store().get(&LabelId::from(2)).unwrap();
        assert_eq!(second.start, Point::new(110.0, 110.0));
    }

    #[test]
    fn test_delete_detaches_from_surface() {
        let mut editor = editor();
        editor.set_labels(vec![Label::new(1, 10, 10, 50, 40).selected(true)]);
        let events = editor.key(&KeyEvent::new(crate::input::Key::Delete));
        assert_eq!(events.len(), 1);
        assert!(editor.surface().is_empty());
    }

    #[test]
    fn test_zoom_scales_render_weights_only() {
        let mut editor = editor();
        editor.set_labels(vec![Label::new(1, 10, 10, 50, 40)]);
        editor.set_zoom(4.0);

        let command = editor.surface().get(&LabelId::from(1)).unwrap();
        assert_eq!(command.stroke_width, crate::constants::DEFAULT_STROKE_WIDTH / 4.0);
        let element = editor.store().get(&LabelId::from(1)).unwrap();
        assert_eq!(element.end, Point::new(50.0, 40.0));
    }

    #[test]
    fn test_label_options_position() {
        let mut editor = editor();
        editor.set_labels(vec![Label::new(1, 10, 10, 50, 40)]);
        assert!(editor.label_options_position().is_none());

        editor.select(Some(&LabelId::from(1))).unwrap();
        let position = editor.label_options_position().unwrap();
        assert_eq!((position.x, position.y), (10.0, 48.0));
    }

    #[test]
    fn test_select_unknown_is_error() {
        let mut editor = editor();
        editor.set_labels(vec![Label::new(1, 10, 10, 50, 40).selected(true)]);
        let err = editor.select(Some(&LabelId::from(9))).unwrap_err();
        assert_eq!(err, EditorError::UnknownElement(LabelId::from(9)));
        assert!(editor.store().selected().is_some());

        let events = editor.select(None).unwrap();
        assert_eq!(events, vec![EditorEvent::Selected(None)]);
    }

    #[test]
    fn test_clear_is_silent_when_empty() {
        let mut editor = editor();
        assert_eq!(editor.clear(), 0);
        assert_eq!(editor.surface().destroy_calls(), 0);

        editor.set_labels(vec![Label::new(1, 10, 10, 50, 40)]);
        assert_eq!(editor.clear(), 1);
        assert!(editor.surface().is_empty());
    }
}
