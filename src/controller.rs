//! Interaction state machine.
//!
//! Turns pointer and keyboard input into element mutations and returns the
//! resulting [`EditorEvent`]s. At most one element is under interactive edit
//! at a time; while one is, new gestures are refused.
//!
//! A pointer-down on a handle of a selected element starts a resize, on an
//! element body it selects the element and arms a move, and anywhere else it
//! clears the selection and starts drawing a new element.

use crate::config::EditorSettings;
use crate::constants::LINE_HIT_RADIUS;
use crate::element::{Element, Handle};
use crate::event::EditorEvent;
use crate::geometry::{CoordinateSpace, Point};
use crate::input::{KeyEvent, PointerEvent, PointerPhase};
use crate::keybindings::{KeyAction, KeyBindings};
use crate::model::{LabelId, LabelShape, ObjectClass, resolve_color};
use crate::store::ElementStore;

/// Everything a handler may read or mutate while processing one event.
pub struct EditContext<'a> {
    pub store: &'a mut ElementStore,
    pub space: &'a CoordinateSpace,
    pub settings: &'a EditorSettings,
    pub keybindings: &'a KeyBindings,
    pub classes: &'a [ObjectClass],
}

/// Current interaction state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interaction {
    /// Nothing in progress.
    #[default]
    Idle,
    /// A new element is being drawn. It is not in the store yet.
    Drawing { element: Element },
    /// A handle of a stored element is being dragged.
    Resizing {
        id: LabelId,
        handle: Handle,
        original: Element,
    },
    /// A stored element is grabbed. It only starts moving once the pointer
    /// has travelled the minimum drag distance.
    Dragging {
        id: LabelId,
        grab: Point,
        original: Element,
        moved: bool,
    },
}

/// Drives [`Interaction`] from input events.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    state: Interaction,
    /// Shape given to newly drawn elements.
    shape: LabelShape,
    /// Object class given to newly drawn elements.
    object_class_id: Option<u32>,
}

impl InteractionController {
    pub fn new(shape: LabelShape) -> Self {
        Self {
            shape,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &Interaction {
        &self.state
    }

    /// True while an element is being drawn, resized or moved.
    pub fn is_working(&self) -> bool {
        !matches!(self.state, Interaction::Idle)
    }

    /// Id of the element under interactive edit.
    pub fn active_id(&self) -> Option<&LabelId> {
        match &self.state {
            Interaction::Idle => None,
            Interaction::Drawing { element } => Some(element.id()),
            Interaction::Resizing { id, .. } | Interaction::Dragging { id, .. } => Some(id),
        }
    }

    /// The transient element of an ongoing draw.
    pub fn in_progress(&self) -> Option<&Element> {
        match &self.state {
            Interaction::Drawing { element } => Some(element),
            _ => None,
        }
    }

    pub fn shape(&self) -> LabelShape {
        self.shape
    }

    /// Shape used for the next draw. Does not affect a draw in progress.
    pub fn set_shape(&mut self, shape: LabelShape) {
        self.shape = shape;
    }

    pub fn object_class_id(&self) -> Option<u32> {
        self.object_class_id
    }

    /// Object class used for the next draw.
    pub fn set_object_class(&mut self, id: Option<u32>) {
        self.object_class_id = id;
    }

    /// Handle one pointer event.
    pub fn handle_pointer(&mut self, event: &PointerEvent, ctx: &mut EditContext<'_>) -> Vec<EditorEvent> {
        if !event.is_annotation_contact() {
            // A second finger turns the gesture into pinch/pan.
            if event.contacts > 1 && self.is_working() {
                log::debug!("Multi-touch gesture started, cancelling {:?}", self.active_id());
                self.cancel(ctx);
            }
            return Vec::new();
        }

        let point = ctx.space.to_document_point(event.x, event.y);
        match event.phase {
            PointerPhase::Down => self.pointer_down(point, ctx),
            PointerPhase::Move => self.pointer_move(point, ctx),
            PointerPhase::Up => self.pointer_up(point, ctx),
            PointerPhase::Leave => {
                self.cancel(ctx);
                let mut events = Vec::new();
                if ctx.store.hover(None) {
                    events.push(EditorEvent::Hovered(None));
                }
                events
            }
        }
    }

    /// Handle one key press.
    pub fn handle_key(&mut self, event: &KeyEvent, ctx: &mut EditContext<'_>) -> Vec<EditorEvent> {
        let Some(action) =
            ctx.keybindings
                .action_for(event, ctx.settings.nudge_step, ctx.settings.nudge_step_large)
        else {
            return Vec::new();
        };

        match action {
            KeyAction::Nudge { dx, dy } => {
                if self.is_working() {
                    log::debug!("Ignoring nudge during {:?}", self.active_id());
                    return Vec::new();
                }
                nudge_selected(dx, dy, ctx)
            }
            KeyAction::DeleteSelected => {
                if self.is_working() {
                    log::debug!("Ignoring delete during {:?}", self.active_id());
                    return Vec::new();
                }
                delete_selected(ctx)
            }
            KeyAction::Cancel => {
                if self.is_working() {
                    self.cancel(ctx);
                    Vec::new()
                } else if ctx.store.select(None) {
                    vec![EditorEvent::Selected(None)]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Abandon the current gesture. A draw is discarded, a resize or move is
    /// reverted to the geometry it started from. Never emits events.
    pub fn cancel(&mut self, ctx: &mut EditContext<'_>) {
        match std::mem::take(&mut self.state) {
            Interaction::Idle => {}
            Interaction::Drawing { element } => {
                log::debug!("Discarding draw of {}", element.id());
            }
            Interaction::Resizing { id, original, .. } | Interaction::Dragging { id, original, .. } => {
                log::debug!("Reverting edit of {}", id);
                restore_geometry(ctx.store, &id, &original);
            }
        }
    }

    fn pointer_down(&mut self, point: Point, ctx: &mut EditContext<'_>) -> Vec<EditorEvent> {
        if self.is_working() {
            log::warn!("Pointer down while {:?} is active, ignoring", self.active_id());
            return Vec::new();
        }

        let clamped = ctx.space.viewbox.clamp(point);
        let hit_radius = ctx.space.to_document_length(ctx.settings.handle_hit_radius);

        // Handles of the selected element take priority over bodies
        let handle_hit = ctx
            .store
            .selected_elements()
            .filter_map(|element| {
                element
                    .hit_test_handle(point, hit_radius)
                    .map(|handle| (element.id().clone(), handle, element.clone()))
            })
            .last();
        if let Some((id, handle, original)) = handle_hit {
            log::debug!("Resizing {} by {:?}", id, handle);
            self.state = Interaction::Resizing { id, handle, original };
            return Vec::new();
        }

        let tolerance = ctx.space.to_document_length(LINE_HIT_RADIUS);
        if let Some(id) = ctx.store.hit_test(point, tolerance).cloned() {
            let mut events = Vec::new();
            if ctx.store.select(Some(&id)) {
                events.push(EditorEvent::Selected(ctx.store.get(&id).map(Element::data)));
            }
            if let Some(original) = ctx.store.get(&id).cloned() {
                log::debug!("Grabbed {}", id);
                self.state = Interaction::Dragging {
                    id,
                    grab: clamped,
                    original,
                    moved: false,
                };
            }
            return events;
        }

        let mut events = Vec::new();
        if ctx.store.select(None) {
            events.push(EditorEvent::Selected(None));
        }

        let mut element = Element::of_shape(self.shape, LabelId::generate(), clamped, clamped);
        element.object_class_id = self.object_class_id;
        element.color = resolve_color(ctx.classes, self.object_class_id);
        element.zoom_factor = ctx.space.zoom;
        if ctx.settings.spatial_mode {
            element.attach_derived_back(ctx.settings.back_plane_offset);
        }
        log::debug!("Drawing {} from ({:.1}, {:.1})", element.id(), clamped.x, clamped.y);
        self.state = Interaction::Drawing { element };
        events
    }

    fn pointer_move(&mut self, point: Point, ctx: &mut EditContext<'_>) -> Vec<EditorEvent> {
        let clamped = ctx.space.viewbox.clamp(point);
        match &mut self.state {
            Interaction::Idle => {
                let tolerance = ctx.space.to_document_length(LINE_HIT_RADIUS);
                let target = ctx.store.hit_test(point, tolerance).cloned();
                if ctx.store.hover(target.as_ref()) {
                    let hovered = target.as_ref().and_then(|id| ctx.store.get(id)).map(Element::data);
                    return vec![EditorEvent::Hovered(hovered)];
                }
            }
            Interaction::Drawing { element } => {
                element.set_end(clamped);
            }
            Interaction::Resizing { id, handle, .. } => {
                if let Some(element) = ctx.store.get_mut(id) {
                    element.set_handle(*handle, clamped);
                }
            }
            Interaction::Dragging {
                id,
                grab,
                original,
                moved,
            } => {
                *moved = drag_to(id, *grab, original, *moved, clamped, ctx);
            }
        }
        Vec::new()
    }

    fn pointer_up(&mut self, point: Point, ctx: &mut EditContext<'_>) -> Vec<EditorEvent> {
        let clamped = ctx.space.viewbox.clamp(point);
        match std::mem::take(&mut self.state) {
            Interaction::Idle => Vec::new(),
            Interaction::Drawing { mut element } => {
                element.set_end(clamped);
                element.snap_to_pixels();
                if !element.is_valid() {
                    log::debug!("Discarding degenerate draw of {}", element.id());
                    return Vec::new();
                }
                element.normalize();
                let patch = element.data();
                match ctx.store.add(element) {
                    Ok(()) => {
                        log::info!("Added {} at ({}, {}, {}, {})", patch.id, patch.left, patch.top, patch.right, patch.bottom);
                        vec![EditorEvent::ElementAdded(patch)]
                    }
                    Err(e) => {
                        log::error!("Failed to commit drawn element: {}", e);
                        Vec::new()
                    }
                }
            }
            Interaction::Resizing { id, handle, original } => {
                let Some(element) = ctx.store.get_mut(&id) else {
                    return Vec::new();
                };
                element.set_handle(handle, clamped);
                element.snap_to_pixels();
                if !element.is_valid() {
                    log::debug!("Reverting degenerate resize of {}", id);
                    restore_geometry(ctx.store, &id, &original);
                    return Vec::new();
                }
                element.normalize();
                changed_event(element, &original)
            }
            Interaction::Dragging {
                id,
                grab,
                original,
                moved,
            } => {
                if !drag_to(&id, grab, &original, moved, clamped, ctx) {
                    return Vec::new();
                }
                match ctx.store.get_mut(&id) {
                    Some(element) => {
                        element.snap_to_pixels();
                        element.normalize();
                        changed_event(element, &original)
                    }
                    None => Vec::new(),
                }
            }
        }
    }
}

/// Emit `ElementChanged` if the committed geometry differs from `original`.
fn changed_event(element: &Element, original: &Element) -> Vec<EditorEvent> {
    let patch = element.data();
    let mut before = original.data();
    before.is_selected = patch.is_selected;
    if patch == before {
        return Vec::new();
    }
    log::info!("Changed {} to ({}, {}, {}, {})", patch.id, patch.left, patch.top, patch.right, patch.bottom);
    vec![EditorEvent::ElementChanged(patch)]
}

/// Move a grabbed element so it follows `point`. Returns whether the drag
/// threshold has been passed.
fn drag_to(
    id: &LabelId,
    grab: Point,
    original: &Element,
    moved: bool,
    point: Point,
    ctx: &mut EditContext<'_>,
) -> bool {
    if !moved && grab.distance_to(&point) < ctx.settings.min_drag_distance {
        return false;
    }
    let (min, max) = original.movement_extent();
    let (dx, dy) = ctx
        .space
        .viewbox
        .clamp_translation(min, max, point.x - grab.x, point.y - grab.y);
    restore_geometry(ctx.store, id, original);
    if let Some(element) = ctx.store.get_mut(id) {
        element.translate(dx, dy);
    }
    true
}

fn restore_geometry(store: &mut ElementStore, id: &LabelId, original: &Element) {
    if let Some(element) = store.get_mut(id) {
        element.start = original.start;
        element.end = original.end;
        element.kind = original.kind;
    }
}

fn nudge_selected(dx: f32, dy: f32, ctx: &mut EditContext<'_>) -> Vec<EditorEvent> {
    let ids: Vec<LabelId> = ctx.store.selected_elements().map(|e| e.id().clone()).collect();
    let viewbox = ctx.space.viewbox;

    let mut events = Vec::new();
    for id in ids {
        let Some(element) = ctx.store.get_mut(&id) else {
            continue;
        };
        let (min, max) = element.movement_extent();
        let (dx, dy) = viewbox.clamp_translation(min, max, dx, dy);
        if dx == 0.0 && dy == 0.0 {
            continue;
        }
        element.translate(dx, dy);
        events.push(EditorEvent::ElementChanged(element.data()));
    }
    events
}

fn delete_selected(ctx: &mut EditContext<'_>) -> Vec<EditorEvent> {
    let ids: Vec<LabelId> = ctx.store.selected_elements().map(|e| e.id().clone()).collect();
    ids.iter()
        .filter_map(|id| ctx.store.remove(id))
        .map(|element| {
            log::info!("Removed {}", element.id());
            EditorEvent::ElementRemoved(element.data())
        })
        .collect()
}
