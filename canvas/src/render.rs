//! Rendering: redraws the whole layout onto a [`Surface`].
//!
//! This module receives read-only views of the scene and camera and produces
//! pixels. It does not mutate application state. Every call repaints from
//! scratch: clear, grid, elements bottom to top, then the selection overlay
//! of the selected element, all under the camera transform. The surface is
//! left with the transform it had on entry.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::camera::{Camera, Point, Rect};
use crate::consts::{GRID_SIZE, HANDLE_SIZE_PX, SELECTION_INSET};
use crate::doc::{Element, ElementKind, FontWeight, PlotStatus, Scene};
use crate::surface::{StrokeStyle, Surface, TextStyle};

pub const GRID_COLOR: &str = "#e2e8f0";
pub const ROAD_FILL: &str = "#334155";
pub const ROAD_CENTERLINE: &str = "#cbd5e1";
pub const ROAD_LABEL: &str = "#ffffff";
pub const SELECTION_COLOR: &str = "#3b82f6";

/// Grid line width in screen pixels.
const GRID_LINE_PX: f64 = 0.5;
/// Plot outline and road centerline width in screen pixels.
const OUTLINE_PX: f64 = 2.0;
/// Selection outline width in screen pixels.
const SELECTION_LINE_PX: f64 = 4.0;
const CENTERLINE_DASH: [f64; 2] = [10.0, 10.0];
const SELECTION_DASH: [f64; 2] = [5.0, 5.0];

/// Fill and stroke colors for a plot, keyed by status. Unknown or missing
/// statuses use the active palette.
#[must_use]
pub fn plot_palette(status: Option<&PlotStatus>) -> (&'static str, &'static str) {
    match status {
        Some(PlotStatus::Booked) => ("#ffedd5", "#f97316"),
        Some(PlotStatus::Closed) => ("#fee2e2", "#ef4444"),
        _ => ("#dcfce7", "#22c55e"),
    }
}

/// Draw the full scene.
///
/// # Errors
///
/// Returns `Err` if any surface call fails (e.g. invalid context state).
pub fn draw<S: Surface>(surface: &mut S, scene: &Scene, camera: &Camera) -> Result<(), S::Error> {
    surface.clear()?;
    surface.save();
    let result = draw_world(surface, scene, camera);
    surface.restore();
    result
}

fn draw_world<S: Surface>(surface: &mut S, scene: &Scene, camera: &Camera) -> Result<(), S::Error> {
    surface.translate(camera.pan_x, camera.pan_y)?;
    surface.scale(camera.zoom, camera.zoom)?;

    let visible = camera.visible_world_rect(surface.width(), surface.height());
    draw_grid(surface, visible, camera.zoom)?;

    let selected = scene.selected_id();
    for el in scene.elements().iter().filter(|el| el.visible) {
        surface.save();
        let result = draw_element(surface, el, camera.zoom, selected == Some(el.id.as_str()));
        surface.restore();
        result?;
    }
    Ok(())
}

// =============================================================
// Grid
// =============================================================

/// Grid line segments covering `visible`, aligned to world multiples of the grid unit.
#[must_use]
pub fn grid_segments(visible: Rect) -> Vec<(Point, Point)> {
    let mut segments = Vec::new();
    for x in grid_lines(visible.x, visible.right()) {
        segments.push((Point::new(x, visible.y), Point::new(x, visible.bottom())));
    }
    for y in grid_lines(visible.y, visible.bottom()) {
        segments.push((Point::new(visible.x, y), Point::new(visible.right(), y)));
    }
    segments
}

/// Grid multiples in `[lo, hi]`. Empty when the span is not finite or when
/// one grid step is below float resolution at this offset.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn grid_lines(lo: f64, hi: f64) -> Vec<f64> {
    let first = (lo / GRID_SIZE).ceil();
    let last = (hi / GRID_SIZE).floor();
    if !first.is_finite() || !last.is_finite() || last < first || first + 1.0 == first {
        return Vec::new();
    }
    let count = (last - first) as usize + 1;
    (0..count).map(|i| (first + i as f64) * GRID_SIZE).collect()
}

fn draw_grid<S: Surface>(surface: &mut S, visible: Rect, zoom: f64) -> Result<(), S::Error> {
    let stroke = StrokeStyle { color: GRID_COLOR, width: GRID_LINE_PX / zoom, dash: None };
    surface.stroke_segments(&grid_segments(visible), &stroke)
}

// =============================================================
// Elements
// =============================================================

fn draw_element<S: Surface>(surface: &mut S, el: &Element, zoom: f64, selected: bool) -> Result<(), S::Error> {
    rotate_about_center(surface, el)?;

    match el.kind {
        ElementKind::Plot => draw_plot(surface, el, zoom)?,
        ElementKind::Road => draw_road(surface, el, zoom)?,
        ElementKind::Text => draw_label(surface, el, el.text_color(), el.font_weight == FontWeight::Bold)?,
        ElementKind::Other(_) => {}
    }

    if selected {
        draw_selection(surface, el, zoom)?;
    }
    Ok(())
}

fn draw_plot<S: Surface>(surface: &mut S, el: &Element, zoom: f64) -> Result<(), S::Error> {
    let (fill, stroke) = plot_palette(el.status.as_ref());
    surface.fill_rect(el.bounds(), fill)?;
    surface.stroke_rect(el.bounds(), &StrokeStyle { color: stroke, width: OUTLINE_PX / zoom, dash: None })?;
    draw_label(surface, el, el.text_color(), el.font_weight == FontWeight::Bold)
}

fn draw_road<S: Surface>(surface: &mut S, el: &Element, zoom: f64) -> Result<(), S::Error> {
    surface.fill_rect(el.bounds(), ROAD_FILL)?;

    // Centerline runs along the long axis.
    let c = el.center();
    let centerline = if el.width > el.height {
        (Point::new(el.x, c.y), Point::new(el.x + el.width, c.y))
    } else {
        (Point::new(c.x, el.y), Point::new(c.x, el.y + el.height))
    };
    let stroke = StrokeStyle { color: ROAD_CENTERLINE, width: OUTLINE_PX / zoom, dash: Some(CENTERLINE_DASH) };
    surface.stroke_segments(&[centerline], &stroke)?;

    draw_label(surface, el, ROAD_LABEL, true)
}

fn draw_label<S: Surface>(surface: &mut S, el: &Element, color: &str, bold: bool) -> Result<(), S::Error> {
    let Some(text) = el.display_label() else {
        return Ok(());
    };
    let style = TextStyle { color, size: el.effective_font_size(), bold };
    surface.fill_text(text, el.center(), &style)
}

fn draw_selection<S: Surface>(surface: &mut S, el: &Element, zoom: f64) -> Result<(), S::Error> {
    let outline = Rect::new(
        el.x - SELECTION_INSET,
        el.y - SELECTION_INSET,
        el.width + SELECTION_INSET * 2.0,
        el.height + SELECTION_INSET * 2.0,
    );
    let stroke = StrokeStyle { color: SELECTION_COLOR, width: SELECTION_LINE_PX / zoom, dash: Some(SELECTION_DASH) };
    surface.stroke_rect(outline, &stroke)?;

    let handle = HANDLE_SIZE_PX / zoom;
    let corner = el.bottom_right();
    surface.fill_rect(Rect::new(corner.x - handle / 2.0, corner.y - handle / 2.0, handle, handle), SELECTION_COLOR)
}

// =============================================================
// Helpers
// =============================================================

/// Rotate the surface about the element's center so it can be drawn at its
/// world position.
fn rotate_about_center<S: Surface>(surface: &mut S, el: &Element) -> Result<(), S::Error> {
    if el.rotation.abs() < f64::EPSILON {
        return Ok(());
    }
    let c = el.center();
    surface.translate(c.x, c.y)?;
    surface.rotate(el.rotation.to_radians())?;
    surface.translate(-c.x, -c.y)
}
