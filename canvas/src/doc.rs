//! Scene model: layout elements, their styling, and the ordered scene.
//!
//! A layout is a flat, ordered list of independent rectangles. List order is
//! z-order: later elements are drawn on top and win hit-tests. This module
//! defines the element schema (`Element`, `ElementKind`, `PlotStatus`), a
//! sparse-update type for property edits and gestures (`ElementPatch`), and
//! the store that owns the list plus the single selection (`Scene`).
//!
//! Every mutation is total over the id space: an unknown id is a silent
//! no-op, so a stale id from the UI never turns into an error.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::camera::{Point, Rect};
use crate::consts::{MIN_ELEMENT_SIZE, NEW_ELEMENT_ORIGIN};

/// Unique identifier for a layout element.
pub type ElementId = String;

/// Default label size for plot and road labels.
const DEFAULT_LABEL_FONT_SIZE: f64 = 12.0;
/// Default size for free-standing text elements.
const DEFAULT_TEXT_FONT_SIZE: f64 = 18.0;
/// Default text color.
pub const DEFAULT_TEXT_COLOR: &str = "#000000";

/// The kind of a layout element.
///
/// Unrecognized kinds are kept verbatim so they survive a load/save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementKind {
    /// A saleable plot, colored by its status.
    Plot,
    /// A road strip with a dashed centerline.
    Road,
    /// A free-standing text label.
    Text,
    /// Any kind this editor does not know how to draw.
    Other(String),
}

impl ElementKind {
    /// Parse a wire discriminant. Case and surrounding whitespace are ignored.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "plot" => Self::Plot,
            "road" => Self::Road,
            "text" => Self::Text,
            _ => Self::Other(raw.to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Plot => "plot",
            Self::Road => "road",
            Self::Text => "text",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for ElementKind {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<ElementKind> for String {
    fn from(kind: ElementKind) -> Self {
        kind.as_str().to_owned()
    }
}

/// Sale status of a plot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PlotStatus {
    Active,
    Booked,
    Closed,
    /// Unrecognized status; drawn with the active palette.
    Other(String),
}

impl PlotStatus {
    /// Parse a wire status. Case and surrounding whitespace are ignored.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => Self::Active,
            "booked" => Self::Booked,
            "closed" => Self::Closed,
            _ => Self::Other(raw.to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Booked => "booked",
            Self::Closed => "closed",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for PlotStatus {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<PlotStatus> for String {
    fn from(status: PlotStatus) -> Self {
        status.as_str().to_owned()
    }
}

/// Label font weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    /// Parse a CSS-style weight. `bold`, `bolder`, and numeric weights of 600
    /// and above are bold; anything else is normal.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim().to_ascii_lowercase();
        match trimmed.as_str() {
            "bold" | "bolder" => Self::Bold,
            other => match other.parse::<u32>() {
                Ok(weight) if weight >= 600 => Self::Bold,
                _ => Self::Normal,
            },
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Bold => "bold",
        }
    }
}

/// A layout element: one rectangle on the plot plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Unique within the layout.
    pub id: ElementId,
    pub kind: ElementKind,
    /// Left edge of the bounding box in world coordinates.
    pub x: f64,
    /// Top edge of the bounding box in world coordinates.
    pub y: f64,
    /// Always at least [`MIN_ELEMENT_SIZE`].
    pub width: f64,
    /// Always at least [`MIN_ELEMENT_SIZE`].
    pub height: f64,
    /// Clockwise rotation in degrees around the bounding-box center, in [0, 360).
    pub rotation: f64,
    /// Free-text name shown centered in the shape.
    pub label: String,
    /// Plot number assigned at creation; shown when a plot has no label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_number: Option<String>,
    /// Sale status. Only meaningful for plots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PlotStatus>,
    /// Explicit label size; the kind's default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default)]
    pub font_weight: FontWeight,
    /// CSS hex color for the label; black when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Invisible elements are neither drawn nor hit-tested.
    pub visible: bool,
    /// Stored fields the editor does not interpret, carried through unchanged.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Element {
    /// Build a new element with the defaults for `kind`.
    ///
    /// `ordinal` is the 1-based position the element takes in the layout and
    /// becomes the label of a new plot.
    #[must_use]
    pub fn with_defaults(id: ElementId, kind: ElementKind, ordinal: usize) -> Self {
        let (width, height, label, plot_number, status) = match kind {
            ElementKind::Plot => (60.0, 80.0, ordinal.to_string(), Some(ordinal.to_string()), Some(PlotStatus::Active)),
            ElementKind::Road => (200.0, 40.0, "Main Road".to_owned(), None, None),
            ElementKind::Text => (200.0, 40.0, "Double Click to Edit".to_owned(), None, None),
            ElementKind::Other(_) => (200.0, 40.0, String::new(), None, None),
        };
        Self {
            id,
            kind,
            x: NEW_ELEMENT_ORIGIN,
            y: NEW_ELEMENT_ORIGIN,
            width,
            height,
            rotation: 0.0,
            label,
            plot_number,
            status,
            font_size: None,
            font_weight: FontWeight::Normal,
            color: None,
            visible: true,
            extra: serde_json::Map::new(),
        }
    }

    /// Axis-aligned bounds, ignoring rotation.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Bottom-right corner, where the resize handle sits.
    #[must_use]
    pub fn bottom_right(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    /// Text drawn inside the element, or `None` when nothing should be drawn.
    #[must_use]
    pub fn display_label(&self) -> Option<&str> {
        match self.kind {
            ElementKind::Plot => Some(
                non_empty(&self.label)
                    .or_else(|| self.plot_number.as_deref().and_then(non_empty))
                    .unwrap_or("N/A"),
            ),
            ElementKind::Road => non_empty(&self.label),
            ElementKind::Text => Some(non_empty(&self.label).unwrap_or("Double Click to Edit")),
            ElementKind::Other(_) => None,
        }
    }

    /// Label font size with the kind's default applied.
    #[must_use]
    pub fn effective_font_size(&self) -> f64 {
        match self.font_size {
            Some(size) if size.is_finite() && size > 0.0 => size,
            _ if self.kind == ElementKind::Text => DEFAULT_TEXT_FONT_SIZE,
            _ => DEFAULT_LABEL_FONT_SIZE,
        }
    }

    /// Label color with the black default applied.
    #[must_use]
    pub fn text_color(&self) -> &str {
        self.color.as_deref().and_then(non_empty).unwrap_or(DEFAULT_TEXT_COLOR)
    }

    /// Merge a sparse patch. Sizes are floored, rotation is wrapped into
    /// [0, 360), and non-finite numbers are ignored.
    pub fn apply_patch(&mut self, patch: &ElementPatch) {
        if let Some(x) = finite(patch.x) {
            self.x = x;
        }
        if let Some(y) = finite(patch.y) {
            self.y = y;
        }
        if let Some(w) = finite(patch.width) {
            self.width = w.max(MIN_ELEMENT_SIZE);
        }
        if let Some(h) = finite(patch.height) {
            self.height = h.max(MIN_ELEMENT_SIZE);
        }
        if let Some(r) = finite(patch.rotation) {
            self.rotation = normalize_rotation(r);
        }
        if let Some(ref label) = patch.label {
            self.label.clone_from(label);
        }
        if let Some(ref number) = patch.plot_number {
            self.plot_number = Some(number.clone());
        }
        if let Some(ref status) = patch.status {
            self.status = Some(status.clone());
        }
        if let Some(size) = finite(patch.font_size) {
            self.font_size = Some(size);
        }
        if let Some(weight) = patch.font_weight {
            self.font_weight = weight;
        }
        if let Some(ref color) = patch.color {
            self.color = Some(color.clone());
        }
        if let Some(visible) = patch.visible {
            self.visible = visible;
        }
    }
}

/// Sparse update for an element. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PlotStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

impl ElementPatch {
    /// A patch that moves an element to `(x, y)`.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Default::default() }
    }

    /// A patch that resizes an element to `width` × `height`.
    #[must_use]
    pub fn size(width: f64, height: f64) -> Self {
        Self { width: Some(width), height: Some(height), ..Default::default() }
    }
}

/// Ordered element list plus the current selection.
///
/// Invariants: ids are unique, and the selection (if any) names an element
/// that is in the list.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    elements: Vec<Element>,
    selected_id: Option<ElementId>,
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole element list. Clears the selection. Later elements
    /// reusing an id already seen are dropped.
    pub fn load(&mut self, elements: Vec<Element>) {
        let mut seen = HashSet::with_capacity(elements.len());
        self.elements = elements
            .into_iter()
            .filter(|el| {
                let fresh = seen.insert(el.id.clone());
                if !fresh {
                    tracing::warn!(id = %el.id, "dropping element with duplicate id");
                }
                fresh
            })
            .collect();
        self.selected_id = None;
    }

    /// Elements in z-order (bottom first).
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|el| el.id == id)
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.elements.iter().position(|el| el.id == id)
    }

    /// Append a new element of `kind` on top of the stack and select it.
    ///
    /// The id is derived from `now_ms` (`UNIT-<millis>`), with a numeric
    /// suffix when that id is already taken.
    pub fn add_element(&mut self, kind: ElementKind, now_ms: u64) -> Element {
        let id = self.unique_id(now_ms);
        let element = Element::with_defaults(id, kind, self.elements.len() + 1);
        self.elements.push(element.clone());
        self.selected_id = Some(element.id.clone());
        element
    }

    fn unique_id(&self, now_ms: u64) -> ElementId {
        let base = format!("UNIT-{now_ms}");
        if self.get(&base).is_none() {
            return base;
        }
        let mut n = 1_u64;
        loop {
            let candidate = format!("{base}-{n}");
            if self.get(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    /// Merge `patch` into the element with `id`. Returns false (and changes
    /// nothing) when no such element exists.
    pub fn update_element(&mut self, id: &str, patch: &ElementPatch) -> bool {
        let Some(el) = self.elements.iter_mut().find(|el| el.id == id) else {
            return false;
        };
        el.apply_patch(patch);
        true
    }

    /// Remove the element with `id`, clearing the selection if it pointed there.
    pub fn remove_element(&mut self, id: &str) -> Option<Element> {
        let idx = self.index_of(id)?;
        if self.selected_id.as_deref() == Some(id) {
            self.selected_id = None;
        }
        Some(self.elements.remove(idx))
    }

    /// Topmost visible element whose unrotated bounds contain `world_pt`.
    #[must_use]
    pub fn find_at(&self, world_pt: Point) -> Option<&Element> {
        self.elements
            .iter()
            .rev()
            .find(|el| el.visible && el.bounds().contains(world_pt))
    }

    /// Select `id` if it exists. Unknown ids leave the selection unchanged.
    pub fn select(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.selected_id = Some(id.to_owned());
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected_id = None;
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Element> {
        self.selected_id.as_deref().and_then(|id| self.get(id))
    }

    /// Move an element to the top of the z-order.
    pub fn bring_to_front(&mut self, id: &str) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        let el = self.elements.remove(idx);
        self.elements.push(el);
        true
    }

    /// Move an element to the bottom of the z-order.
    pub fn send_to_back(&mut self, id: &str) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        let el = self.elements.remove(idx);
        self.elements.insert(0, el);
        true
    }
}

/// Wrap degrees into [0, 360).
#[must_use]
pub fn normalize_rotation(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn non_empty(s: &str) -> Option<&str> {
    if s.trim().is_empty() { None } else { Some(s) }
}
