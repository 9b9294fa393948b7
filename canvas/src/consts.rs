//! Shared numeric constants for the canvas crate.

// ── Camera ──────────────────────────────────────────────────────

/// Lower zoom bound. Keeps the world-to-screen scale away from zero.
pub const MIN_ZOOM: f64 = 0.2;

/// Upper zoom bound.
pub const MAX_ZOOM: f64 = 3.0;

/// Zoom increment applied by the toolbar zoom buttons.
pub const ZOOM_STEP: f64 = 0.1;

/// Initial pan offset in screen pixels (both axes).
pub const DEFAULT_PAN_PX: f64 = 50.0;

// ── Scene ───────────────────────────────────────────────────────

/// Spacing of the background grid in world units.
pub const GRID_SIZE: f64 = 20.0;

/// Smallest width or height an element may be resized to, in world units.
pub const MIN_ELEMENT_SIZE: f64 = 10.0;

/// World-space position given to newly added elements.
pub const NEW_ELEMENT_ORIGIN: f64 = 100.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space slop around the bottom-right resize handle, in pixels.
pub const RESIZE_HANDLE_SLOP_PX: f64 = 15.0;

// ── Selection UI ────────────────────────────────────────────────

/// Gap between an element's bounds and its selection outline, in world units.
pub const SELECTION_INSET: f64 = 2.0;

/// Side length of the drawn resize handle, in screen pixels.
pub const HANDLE_SIZE_PX: f64 = 10.0;
