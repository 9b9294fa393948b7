#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Camera, Point};
use crate::consts::RESIZE_HANDLE_SLOP_PX;
use crate::doc::{Element, ElementId, Scene};

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    /// The bottom-right resize handle of the selected element.
    ResizeHandle,
}

/// Result of a hit test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub element_id: ElementId,
    pub part: HitPart,
}

/// Whether `world_pt` is within the resize slop of `el`'s bottom-right corner.
///
/// The slop is fixed in screen pixels, so it is divided by `zoom` to stay the
/// same size on screen at any zoom level.
#[must_use]
pub fn resize_handle_contains(world_pt: Point, el: &Element, zoom: f64) -> bool {
    let corner = el.bottom_right();
    let slop = RESIZE_HANDLE_SLOP_PX / zoom;
    (world_pt.x - corner.x).abs() < slop && (world_pt.y - corner.y).abs() < slop
}

/// Test what lies under `world_pt`: the selected element's resize handle
/// first, then the topmost visible element body. Invisible elements are
/// never hit, even when selected.
#[must_use]
pub fn hit_test(world_pt: Point, scene: &Scene, camera: &Camera) -> Option<Hit> {
    if let Some(sel) = scene.selected().filter(|sel| sel.visible) {
        if resize_handle_contains(world_pt, sel, camera.zoom) {
            return Some(Hit { element_id: sel.id.clone(), part: HitPart::ResizeHandle });
        }
    }
    scene
        .find_at(world_pt)
        .map(|el| Hit { element_id: el.id.clone(), part: HitPart::Body })
}
