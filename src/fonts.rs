//! System font lookup for raster label text.
//!
//! Faces are found through fontdb's system database and parsed with
//! rusttype. When no bold face is installed the raster surface draws a
//! synthetic bold from the regular face.

#[cfg(test)]
#[path = "fonts_test.rs"]
mod fonts_test;

use std::path::Path;

use fontdb::{Database, Family, Query, Source, Stretch, Style, Weight};
use plot_canvas::surface::Fonts;
use rusttype::Font;

/// Lowest weight accepted as a real bold face.
const MIN_BOLD_WEIGHT: u16 = 600;

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("failed to read font {path}: {message}")]
    Read { path: String, message: String },
    #[error("{0} is not a usable font file")]
    Invalid(String),
}

/// Look up regular and bold faces for `family` (sans-serif when `None`),
/// falling back to the system sans-serif.
#[must_use]
pub fn system_fonts(family: Option<&str>) -> Fonts {
    let mut db = Database::new();
    db.load_system_fonts();

    let fonts = Fonts { regular: query(&db, family, false), bold: query(&db, family, true) };
    if fonts.regular.is_none() && fonts.bold.is_none() {
        tracing::warn!(family = family.unwrap_or("sans-serif"), "no system font found; labels will not be drawn");
    }
    fonts
}

/// Load a single font file as the regular face.
///
/// # Errors
///
/// Returns [`FontError`] if the file cannot be read or parsed.
pub fn font_file(path: &Path) -> Result<Fonts, FontError> {
    let display = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|e| FontError::Read { path: display.clone(), message: e.to_string() })?;
    let font = Font::try_from_vec(bytes).ok_or(FontError::Invalid(display))?;
    Ok(Fonts { regular: Some(font), bold: None })
}

fn query(db: &Database, family: Option<&str>, bold: bool) -> Option<Font<'static>> {
    let families: Vec<Family<'_>> = match family.map(str::trim) {
        None | Some("") => vec![Family::SansSerif],
        Some(name) => vec![Family::Name(name), Family::SansSerif],
    };
    let query = Query {
        families: &families,
        weight: if bold { Weight::BOLD } else { Weight::NORMAL },
        stretch: Stretch::Normal,
        style: Style::Normal,
    };

    let id = db.query(&query)?;
    let face = db.face(id)?;
    if bold && face.weight.0 < MIN_BOLD_WEIGHT {
        return None;
    }

    let bytes = match &face.source {
        Source::File(path) | Source::SharedFile(path, _) => match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read font file");
                return None;
            }
        },
        Source::Binary(data) => data.as_ref().as_ref().to_vec(),
    };
    Font::try_from_vec_and_index(bytes, face.index)
}
