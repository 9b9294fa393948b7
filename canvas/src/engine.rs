use std::time::{SystemTime, UNIX_EPOCH};

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::camera::{Camera, Point};
use crate::consts::MIN_ELEMENT_SIZE;
use crate::doc::{Element, ElementId, ElementKind, ElementPatch, Scene};
use crate::hit::{HitPart, hit_test};
use crate::input::{Button, InputState, Key, Modifiers};
use crate::render;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Cursor shown while the camera is being dragged.
pub const CURSOR_PANNING: &str = "grabbing";
/// Cursor shown at all other times.
pub const CURSOR_DEFAULT: &str = "crosshair";

/// Millisecond clock used to mint element ids.
pub type Clock = fn() -> u64;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ElementCreated(Element),
    ElementUpdated { id: ElementId },
    ElementDeleted { id: ElementId },
    SelectionChanged(Option<ElementId>),
    SetCursor(String),
    RenderNeeded,
}

/// Core editor state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EditorCore {
    pub scene: Scene,
    pub camera: Camera,
    pub input: InputState,
    pub viewport_width: f64,
    pub viewport_height: f64,
    clock: Clock,
}

impl Default for EditorCore {
    fn default() -> Self {
        Self::with_clock(system_clock)
    }
}

impl EditorCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a core that mints element ids from `clock`.
    #[must_use]
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            scene: Scene::new(),
            camera: Camera::default(),
            input: InputState::default(),
            viewport_width: 0.0,
            viewport_height: 0.0,
            clock,
        }
    }

    // --- Data inputs ---

    /// Replace the layout with freshly loaded elements. Any gesture in
    /// progress is dropped and the selection is cleared.
    pub fn load_elements(&mut self, elements: Vec<Element>) -> Vec<Action> {
        self.scene.load(elements);
        self.input = InputState::Idle;
        vec![Action::SelectionChanged(None), Action::SetCursor(CURSOR_DEFAULT.into()), Action::RenderNeeded]
    }

    /// Append a new element of `kind` with kind defaults and select it.
    pub fn add_element(&mut self, kind: ElementKind) -> Vec<Action> {
        let el = self.scene.add_element(kind, (self.clock)());
        let id = el.id.clone();
        vec![Action::ElementCreated(el), Action::SelectionChanged(Some(id)), Action::RenderNeeded]
    }

    /// Merge `patch` into element `id`. Stale ids are a no-op.
    pub fn update_element(&mut self, id: &str, patch: &ElementPatch) -> Vec<Action> {
        if !self.scene.update_element(id, patch) {
            return Vec::new();
        }
        vec![Action::ElementUpdated { id: id.to_owned() }, Action::RenderNeeded]
    }

    /// Property edit of the selected element.
    pub fn update_selected(&mut self, patch: &ElementPatch) -> Vec<Action> {
        match self.scene.selected_id().map(str::to_owned) {
            Some(id) => self.update_element(&id, patch),
            None => Vec::new(),
        }
    }

    /// Remove element `id`. Stale ids are a no-op.
    pub fn delete_element(&mut self, id: &str) -> Vec<Action> {
        let was_selected = self.scene.selected_id() == Some(id);
        let Some(removed) = self.scene.remove_element(id) else {
            return Vec::new();
        };
        if self.gesture_target() == Some(id) {
            self.input = InputState::Idle;
        }
        let mut actions = vec![Action::ElementDeleted { id: removed.id }];
        if was_selected {
            actions.push(Action::SelectionChanged(None));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn delete_selected(&mut self) -> Vec<Action> {
        match self.scene.selected_id().map(str::to_owned) {
            Some(id) => self.delete_element(&id),
            None => Vec::new(),
        }
    }

    /// Select `id`. Unknown ids leave the selection unchanged.
    pub fn select(&mut self, id: &str) -> Vec<Action> {
        if self.scene.selected_id() == Some(id) || !self.scene.select(id) {
            return Vec::new();
        }
        vec![Action::SelectionChanged(Some(id.to_owned())), Action::RenderNeeded]
    }

    pub fn clear_selection(&mut self) -> Vec<Action> {
        if self.scene.selected_id().is_none() {
            return Vec::new();
        }
        self.scene.clear_selection();
        vec![Action::SelectionChanged(None), Action::RenderNeeded]
    }

    pub fn bring_to_front(&mut self, id: &str) -> Vec<Action> {
        if self.scene.bring_to_front(id) { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    pub fn send_to_back(&mut self, id: &str) -> Vec<Action> {
        if self.scene.send_to_back(id) { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    // --- Viewport ---

    pub fn set_viewport(&mut self, width: f64, height: f64) -> Vec<Action> {
        self.viewport_width = width;
        self.viewport_height = height;
        vec![Action::RenderNeeded]
    }

    pub fn zoom_in(&mut self) -> Vec<Action> {
        self.camera.zoom_in();
        vec![Action::RenderNeeded]
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        self.camera.zoom_out();
        vec![Action::RenderNeeded]
    }

    pub fn set_zoom(&mut self, zoom: f64) -> Vec<Action> {
        self.camera.set_zoom(zoom);
        vec![Action::RenderNeeded]
    }

    // --- Input events ---

    /// Start a gesture: resize from the selected element's handle, drag an
    /// element body, or pan on empty canvas. Only the primary button starts
    /// gestures.
    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        let world = self.camera.screen_to_world(screen_pt);

        match hit_test(world, &self.scene, &self.camera) {
            Some(hit) if hit.part == HitPart::ResizeHandle => {
                let Some(el) = self.scene.get(&hit.element_id) else {
                    return Vec::new();
                };
                self.input = InputState::ResizingElement {
                    id: hit.element_id,
                    start_world: world,
                    orig_w: el.width,
                    orig_h: el.height,
                };
                Vec::new()
            }
            Some(hit) => {
                let Some(el) = self.scene.get(&hit.element_id) else {
                    return Vec::new();
                };
                let (orig_x, orig_y) = (el.x, el.y);
                let actions = self.select(&hit.element_id);
                self.input = InputState::DraggingElement { id: hit.element_id, start_world: world, orig_x, orig_y };
                actions
            }
            None => {
                let mut actions = self.clear_selection();
                self.input = InputState::Panning {
                    start_screen: screen_pt,
                    orig_pan: Point::new(self.camera.pan_x, self.camera.pan_y),
                };
                actions.push(Action::SetCursor(CURSOR_PANNING.into()));
                actions
            }
        }
    }

    /// Advance the active gesture. Each move is computed from the values
    /// captured at pointer-down.
    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        let world = self.camera.screen_to_world(screen_pt);
        match &self.input {
            InputState::Idle => Vec::new(),
            InputState::Panning { start_screen, orig_pan } => {
                self.camera.pan_x = orig_pan.x + (screen_pt.x - start_screen.x);
                self.camera.pan_y = orig_pan.y + (screen_pt.y - start_screen.y);
                vec![Action::RenderNeeded]
            }
            InputState::DraggingElement { id, start_world, orig_x, orig_y } => {
                let patch = ElementPatch::position(orig_x + (world.x - start_world.x), orig_y + (world.y - start_world.y));
                let id = id.clone();
                self.update_element(&id, &patch)
            }
            InputState::ResizingElement { id, start_world, orig_w, orig_h } => {
                let patch = ElementPatch::size(
                    (orig_w + (world.x - start_world.x)).max(MIN_ELEMENT_SIZE),
                    (orig_h + (world.y - start_world.y)).max(MIN_ELEMENT_SIZE),
                );
                let id = id.clone();
                self.update_element(&id, &patch)
            }
        }
    }

    /// End the active gesture.
    pub fn on_pointer_up(&mut self, _screen_pt: Point) -> Vec<Action> {
        self.end_gesture()
    }

    /// The pointer left the canvas: ends the gesture like pointer-up.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.end_gesture()
    }

    /// Delete/Backspace removes the selected element; Escape clears the
    /// selection. Keys chorded with Ctrl or Meta are left to the host.
    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        if modifiers.ctrl || modifiers.meta {
            return Vec::new();
        }
        if key.is_delete() {
            self.delete_selected()
        } else if key.is_escape() {
            self.clear_selection()
        } else {
            Vec::new()
        }
    }

    fn end_gesture(&mut self) -> Vec<Action> {
        let was_panning = self.input.is_panning();
        self.input = InputState::Idle;
        if was_panning { vec![Action::SetCursor(CURSOR_DEFAULT.into())] } else { Vec::new() }
    }

    fn gesture_target(&self) -> Option<&str> {
        match &self.input {
            InputState::DraggingElement { id, .. } | InputState::ResizingElement { id, .. } => Some(id),
            InputState::Idle | InputState::Panning { .. } => None,
        }
    }

    // --- Queries ---

    /// Elements in z-order, ready to hand to the persistence bridge.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        self.scene.elements()
    }

    #[must_use]
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.scene.get(id)
    }

    /// The currently selected element id, if any.
    #[must_use]
    pub fn selection(&self) -> Option<&str> {
        self.scene.selected_id()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// CSS cursor for the current gesture.
    #[must_use]
    pub fn cursor(&self) -> &'static str {
        if self.input.is_panning() { CURSOR_PANNING } else { CURSOR_DEFAULT }
    }
}

/// The full canvas engine. Wraps `EditorCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    pub core: EditorCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas, core: EditorCore::with_clock(browser_clock) }
    }

    // --- Delegated data inputs ---

    pub fn load_elements(&mut self, elements: Vec<Element>) -> Vec<Action> {
        self.core.load_elements(elements)
    }

    pub fn add_element(&mut self, kind: ElementKind) -> Vec<Action> {
        self.core.add_element(kind)
    }

    pub fn update_selected(&mut self, patch: &ElementPatch) -> Vec<Action> {
        self.core.update_selected(patch)
    }

    pub fn delete_selected(&mut self) -> Vec<Action> {
        self.core.delete_selected()
    }

    // --- Viewport ---

    /// Resize the canvas backing store to `width` x `height` pixels.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_viewport(&mut self, width: f64, height: f64) -> Vec<Action> {
        let (width, height) = (width.max(0.0).round(), height.max(0.0).round());
        self.canvas.set_width(width as u32);
        self.canvas.set_height(height as u32);
        self.core.set_viewport(width, height)
    }

    pub fn zoom_in(&mut self) -> Vec<Action> {
        self.core.zoom_in()
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        self.core.zoom_out()
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        self.core.on_pointer_down(screen_pt, button)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point) -> Vec<Action> {
        self.core.on_pointer_up(screen_pt)
    }

    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.core.on_pointer_leave()
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context cannot be acquired or a draw call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let mut ctx: CanvasRenderingContext2d = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;
        render::draw(&mut ctx, &self.core.scene, &self.core.camera)
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn elements(&self) -> &[Element] {
        self.core.elements()
    }

    #[must_use]
    pub fn selection(&self) -> Option<&str> {
        self.core.selection()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.core.camera()
    }

    #[must_use]
    pub fn cursor(&self) -> &'static str {
        self.core.cursor()
    }
}

fn system_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn browser_clock() -> u64 {
    js_sys::Date::now() as u64
}
