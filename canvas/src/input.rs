//! Input model: modifier keys, mouse buttons, keys, and the gesture state machine.
//!
//! `InputState` is the active gesture tracked between pointer-down and
//! pointer-up. Each variant records the values captured at pointer-down so
//! every pointer-move can recompute the result from the start of the gesture
//! rather than accumulating per-event deltas.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::doc::ElementId;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    Middle,
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    /// Keys that delete the current selection.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        matches!(self.0.as_str(), "Delete" | "Backspace")
    }

    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0 == "Escape"
    }
}

/// Gesture state machine. Exactly one gesture can be active at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging empty canvas to move the camera.
    Panning {
        /// Screen-space pointer position at pointer-down.
        start_screen: Point,
        /// Camera pan at pointer-down.
        orig_pan: Point,
    },
    /// Moving an element across the canvas.
    DraggingElement {
        id: ElementId,
        /// World-space pointer position at pointer-down.
        start_world: Point,
        orig_x: f64,
        orig_y: f64,
    },
    /// Resizing an element from its bottom-right handle.
    ResizingElement {
        id: ElementId,
        /// World-space pointer position at pointer-down.
        start_world: Point,
        orig_w: f64,
        orig_h: f64,
    },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub fn is_panning(&self) -> bool {
        matches!(self, Self::Panning { .. })
    }
}
