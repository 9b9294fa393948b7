//! Wire shape for layout elements.
//!
//! DESIGN
//! ======
//! The layout service stores elements as loose JSON records. Older records
//! carry their id as `element_id` (or plain `id`) instead of `plot_unit_id`,
//! numbers often arrive as strings, and optional fields may be null or
//! missing. `WireElement` accepts all of that; [`WireElement::normalize`]
//! turns it into a canvas [`Element`] with defaults applied.
//!
//! Fields the editor does not interpret are kept in `Element::extra` and
//! written back by [`to_wire`], so a load followed by a save preserves them.

#[cfg(test)]
#[path = "wire_test.rs"]
mod wire_test;

use plot_canvas::consts::MIN_ELEMENT_SIZE;
use plot_canvas::doc::{Element, ElementKind, FontWeight, PlotStatus, normalize_rotation};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value, json};
use uuid::Uuid;

/// Canonical id field written on save.
pub const ID_FIELD: &str = "plot_unit_id";

/// Older id fields, read in this order when `plot_unit_id` is empty.
const LEGACY_ID_KEYS: [&str; 2] = ["element_id", "id"];

/// Top-level keys a load response may nest the element array under.
const ENVELOPE_KEYS: [&str; 3] = ["elements", "layout", "data"];

/// Camel-case duplicates of styling fields written by older editors. The
/// snake-case fields are canonical; these are read as fallbacks and dropped.
const LEGACY_STYLE_KEYS: [&str; 2] = ["fontSize", "fontWeight"];

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The response body is neither an element array nor an object wrapping one.
    #[error("unexpected layout shape: {0}")]
    UnexpectedShape(&'static str),
}

// =============================================================================
// WIRE ELEMENT
// =============================================================================

/// One element as stored by the layout service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireElement {
    #[serde(default, deserialize_with = "lenient_string")]
    pub plot_unit_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub element_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub x: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub y: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub width: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub height: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub rotation: Option<f64>,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub plot_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub font_size: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub font_weight: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub visible: Option<bool>,
    /// Everything else on the record.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WireElement {
    /// Take the id: `plot_unit_id`, else the first non-empty legacy field.
    /// Legacy id fields that were not promoted move into `extra` so they are
    /// written back on save.
    fn take_id(&mut self) -> Option<String> {
        let canonical = self.plot_unit_id.take();
        let legacy = [(LEGACY_ID_KEYS[0], self.element_id.take()), (LEGACY_ID_KEYS[1], self.id.take())];

        let mut resolved = canonical.filter(|s| !s.trim().is_empty());
        for (key, value) in legacy {
            let Some(value) = value else { continue };
            if resolved.is_none() && !value.trim().is_empty() {
                resolved = Some(value);
            } else {
                self.extra.insert(key.to_owned(), Value::String(value));
            }
        }
        resolved
    }

    /// Convert into a canvas element.
    ///
    /// Missing or unparseable numbers become 0, sizes are raised to the
    /// minimum element size, rotation is wrapped into [0, 360), and an
    /// element with no id gets a fresh one.
    #[must_use]
    pub fn normalize(mut self) -> Element {
        let id = match self.take_id() {
            Some(id) => id,
            None => {
                let id = generated_id();
                tracing::warn!(%id, "layout element has no id; assigned one");
                id
            }
        };

        let legacy_size = self.extra.get("fontSize").and_then(number_from_value);
        let legacy_weight = self.extra.get("fontWeight").and_then(string_from_value);
        for key in LEGACY_STYLE_KEYS {
            self.extra.remove(key);
        }

        Element {
            id,
            kind: self.kind.as_deref().map_or_else(|| ElementKind::Other(String::new()), ElementKind::parse),
            x: self.x.unwrap_or(0.0),
            y: self.y.unwrap_or(0.0),
            width: self.width.unwrap_or(0.0).max(MIN_ELEMENT_SIZE),
            height: self.height.unwrap_or(0.0).max(MIN_ELEMENT_SIZE),
            rotation: normalize_rotation(self.rotation.unwrap_or(0.0)),
            label: self.name.unwrap_or_default(),
            plot_number: self.plot_number,
            status: self.status.as_deref().map(PlotStatus::parse),
            font_size: self.font_size.or(legacy_size).filter(|s| *s > 0.0),
            font_weight: self.font_weight.or(legacy_weight).as_deref().map_or(FontWeight::Normal, FontWeight::parse),
            color: self.color.filter(|c| !c.trim().is_empty()),
            visible: self.visible.unwrap_or(true),
            extra: self.extra,
        }
    }
}

fn generated_id() -> String {
    format!("UNIT-{}", Uuid::new_v4().simple())
}

// =============================================================================
// LOAD / SAVE
// =============================================================================

/// Parse a load response into normalized elements, in stored order.
///
/// Accepts a bare array, or an object holding the array under `elements`,
/// `layout`, or `data`. A null body is an empty layout. Entries that are not
/// objects are skipped with a warning.
///
/// # Errors
///
/// Returns [`WireError::UnexpectedShape`] if no element array can be found.
pub fn parse_layout(body: Value) -> Result<Vec<Element>, WireError> {
    let items = match body {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        Value::Object(mut obj) => {
            let Some(nested) = ENVELOPE_KEYS.iter().find_map(|key| obj.remove(*key)) else {
                return Err(WireError::UnexpectedShape("object without an element array"));
            };
            match nested {
                Value::Array(items) => items,
                Value::Null => return Ok(Vec::new()),
                _ => return Err(WireError::UnexpectedShape("element list is not an array")),
            }
        }
        _ => return Err(WireError::UnexpectedShape("expected an array or object")),
    };

    let mut elements = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<WireElement>(item) {
            Ok(wire) => elements.push(wire.normalize()),
            Err(e) => tracing::warn!(index, error = %e, "skipping malformed layout element"),
        }
    }
    Ok(elements)
}

/// Serialize one element in the canonical stored shape.
#[must_use]
pub fn to_wire(el: &Element) -> Value {
    let mut obj = el.extra.clone();
    obj.insert(ID_FIELD.into(), json!(el.id));
    if !el.kind.as_str().is_empty() {
        obj.insert("type".into(), json!(el.kind.as_str()));
    }
    obj.insert("x".into(), json!(el.x));
    obj.insert("y".into(), json!(el.y));
    obj.insert("width".into(), json!(el.width));
    obj.insert("height".into(), json!(el.height));
    obj.insert("rotation".into(), json!(el.rotation));
    obj.insert("name".into(), json!(el.label));
    if let Some(number) = &el.plot_number {
        obj.insert("plot_number".into(), json!(number));
    }
    if let Some(status) = &el.status {
        obj.insert("status".into(), json!(status.as_str()));
    }
    if let Some(size) = el.font_size {
        obj.insert("font_size".into(), json!(size));
    }
    obj.insert("font_weight".into(), json!(el.font_weight.as_str()));
    if let Some(color) = &el.color {
        obj.insert("color".into(), json!(color));
    }
    obj.insert("visible".into(), json!(el.visible));
    Value::Object(obj)
}

/// The save request body: `{"elements": [...]}` in z-order.
#[must_use]
pub fn save_payload(elements: &[Element]) -> Value {
    json!({ "elements": elements.iter().map(to_wire).collect::<Vec<_>>() })
}

// =============================================================================
// LENIENT FIELD PARSING
// =============================================================================

fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let raw = Option::<Value>::deserialize(d)?;
    Ok(raw.as_ref().and_then(number_from_value))
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<Value>::deserialize(d)?;
    Ok(raw.as_ref().and_then(string_from_value))
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    let raw = Option::<Value>::deserialize(d)?;
    Ok(match raw {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0),
        _ => None,
    })
}

/// Finite number from a JSON number or numeric string.
fn number_from_value(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// String from a JSON string or number.
fn string_from_value(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
