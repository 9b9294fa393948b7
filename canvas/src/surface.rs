//! Drawing surfaces: the small Canvas2D-shaped API the renderer draws through.
//!
//! [`Surface`] is stateful the way a browser 2D context is: `translate`,
//! `rotate`, and `scale` compose onto the current transform, `save` /
//! `restore` push and pop it, and every draw call is interpreted in the
//! current transform. Two backends are provided:
//!
//! - [`PixmapSurface`], a tiny-skia raster for native rendering, PNG export,
//!   and pixel-level tests. Text is drawn from rusttype glyph outlines.
//! - [`web_sys::CanvasRenderingContext2d`], used by the browser engine.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use std::convert::Infallible;

use rusttype::{Font, OutlineBuilder, Scale, point as rt_point};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::camera::{Point, Rect};
use crate::color::{Rgba, parse_hex_or_black};

/// Stroke parameters. `width` and `dash` are in the current (local) units.
#[derive(Debug, Clone, Copy)]
pub struct StrokeStyle<'a> {
    pub color: &'a str,
    pub width: f64,
    /// `[on, off]` dash lengths; `None` for a solid line.
    pub dash: Option<[f64; 2]>,
}

/// Text parameters. Text is always centered horizontally and vertically on
/// the anchor point.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle<'a> {
    pub color: &'a str,
    pub size: f64,
    pub bold: bool,
}

/// A 2D drawing target with a transform stack.
pub trait Surface {
    type Error;

    /// Surface width in device pixels.
    fn width(&self) -> f64;
    /// Surface height in device pixels.
    fn height(&self) -> f64;

    /// Erase every pixel, ignoring the current transform.
    fn clear(&mut self) -> Result<(), Self::Error>;
    /// Push the current transform.
    fn save(&mut self);
    /// Pop the transform pushed by the matching [`Surface::save`].
    fn restore(&mut self);

    fn translate(&mut self, dx: f64, dy: f64) -> Result<(), Self::Error>;
    fn rotate(&mut self, radians: f64) -> Result<(), Self::Error>;
    fn scale(&mut self, sx: f64, sy: f64) -> Result<(), Self::Error>;

    fn fill_rect(&mut self, rect: Rect, color: &str) -> Result<(), Self::Error>;
    fn stroke_rect(&mut self, rect: Rect, stroke: &StrokeStyle<'_>) -> Result<(), Self::Error>;
    /// Stroke a batch of independent line segments as one path.
    fn stroke_segments(&mut self, segments: &[(Point, Point)], stroke: &StrokeStyle<'_>) -> Result<(), Self::Error>;
    fn fill_text(&mut self, text: &str, center: Point, style: &TextStyle<'_>) -> Result<(), Self::Error>;
}

// =============================================================
// tiny-skia raster
// =============================================================

/// Regular and (optionally) bold faces for raster text.
#[derive(Default)]
pub struct Fonts {
    pub regular: Option<Font<'static>>,
    pub bold: Option<Font<'static>>,
}

/// Raster surface backed by a tiny-skia [`Pixmap`].
pub struct PixmapSurface {
    pixmap: Pixmap,
    transform: Transform,
    stack: Vec<Transform>,
    fonts: Fonts,
}

impl PixmapSurface {
    /// Create a transparent surface. Returns `None` for a zero-sized surface.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Option<Self> {
        let pixmap = Pixmap::new(width, height)?;
        Some(Self { pixmap, transform: Transform::identity(), stack: Vec::new(), fonts: Fonts::default() })
    }

    /// Attach fonts for text rendering. Without fonts, text draws are skipped.
    #[must_use]
    pub fn with_fonts(mut self, fonts: Fonts) -> Self {
        self.fonts = fonts;
        self
    }

    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    #[must_use]
    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }

    /// Un-premultiplied color of the pixel at `(x, y)`, if in bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        let px = self.pixmap.pixel(x, y)?.demultiply();
        Some(Rgba { r: px.red(), g: px.green(), b: px.blue(), a: px.alpha() })
    }

    /// Current transform depth; zero when every `save` has been restored.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Whether the current transform is the identity.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.transform.is_identity()
    }

    fn stroke_path(&mut self, path: &tiny_skia::Path, style: &StrokeStyle<'_>) {
        let stroke = Stroke {
            width: to_f32(style.width),
            dash: style.dash.and_then(|[on, off]| StrokeDash::new(vec![to_f32(on), to_f32(off)], 0.0)),
            ..Stroke::default()
        };
        let paint = paint_for(style.color);
        self.pixmap.stroke_path(path, &paint, &stroke, self.transform, None);
    }
}

impl Surface for PixmapSurface {
    type Error = Infallible;

    fn width(&self) -> f64 {
        f64::from(self.pixmap.width())
    }

    fn height(&self) -> f64 {
        f64::from(self.pixmap.height())
    }

    fn clear(&mut self) -> Result<(), Infallible> {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
        Ok(())
    }

    fn save(&mut self) {
        self.stack.push(self.transform);
    }

    fn restore(&mut self) {
        if let Some(t) = self.stack.pop() {
            self.transform = t;
        }
    }

    fn translate(&mut self, dx: f64, dy: f64) -> Result<(), Infallible> {
        self.transform = self.transform.pre_translate(to_f32(dx), to_f32(dy));
        Ok(())
    }

    fn rotate(&mut self, radians: f64) -> Result<(), Infallible> {
        self.transform = self
            .transform
            .pre_concat(Transform::from_rotate(to_f32(radians.to_degrees())));
        Ok(())
    }

    fn scale(&mut self, sx: f64, sy: f64) -> Result<(), Infallible> {
        self.transform = self.transform.pre_scale(to_f32(sx), to_f32(sy));
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) -> Result<(), Infallible> {
        if let Some(r) = skia_rect(rect) {
            self.pixmap.fill_rect(r, &paint_for(color), self.transform, None);
        }
        Ok(())
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: &StrokeStyle<'_>) -> Result<(), Infallible> {
        if let Some(r) = skia_rect(rect) {
            let path = PathBuilder::from_rect(r);
            self.stroke_path(&path, stroke);
        }
        Ok(())
    }

    fn stroke_segments(&mut self, segments: &[(Point, Point)], stroke: &StrokeStyle<'_>) -> Result<(), Infallible> {
        let mut pb = PathBuilder::new();
        for (from, to) in segments {
            pb.move_to(to_f32(from.x), to_f32(from.y));
            pb.line_to(to_f32(to.x), to_f32(to.y));
        }
        if let Some(path) = pb.finish() {
            self.stroke_path(&path, stroke);
        }
        Ok(())
    }

    fn fill_text(&mut self, text: &str, center: Point, style: &TextStyle<'_>) -> Result<(), Infallible> {
        let (font, synthetic_bold) = match (style.bold, &self.fonts.bold, &self.fonts.regular) {
            (true, Some(bold), _) => (bold, false),
            (bold, _, Some(regular)) => (regular, bold),
            (_, Some(bold), None) => (bold, false),
            (_, None, None) => {
                tracing::trace!(text, "no font loaded; skipping text");
                return Ok(());
            }
        };

        let size = to_f32(style.size);
        let scale = Scale::uniform(size);
        let v_metrics = font.v_metrics(scale);
        let glyphs: Vec<_> = font.layout(text, scale, rt_point(0.0, 0.0)).collect();
        let width = glyphs
            .last()
            .map_or(0.0, |g| g.position().x + g.unpositioned().h_metrics().advance_width);

        let mut builder = GlyphPathBuilder {
            pb: PathBuilder::new(),
            dx: to_f32(center.x) - width / 2.0,
            dy: to_f32(center.y) + (v_metrics.ascent + v_metrics.descent) / 2.0,
        };
        for glyph in &glyphs {
            glyph.build_outline(&mut builder);
        }
        let Some(path) = builder.pb.finish() else {
            return Ok(());
        };

        let paint = paint_for(style.color);
        self.pixmap.fill_path(&path, &paint, FillRule::Winding, self.transform, None);
        if synthetic_bold {
            let stroke = Stroke { width: size * 0.05, ..Stroke::default() };
            self.pixmap.stroke_path(&path, &paint, &stroke, self.transform, None);
        }
        Ok(())
    }
}

/// Collects rusttype glyph outlines into a tiny-skia path, offset to the text origin.
struct GlyphPathBuilder {
    pb: PathBuilder,
    dx: f32,
    dy: f32,
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.pb.move_to(x + self.dx, y + self.dy);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.pb.line_to(x + self.dx, y + self.dy);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.pb.quad_to(x1 + self.dx, y1 + self.dy, x + self.dx, y + self.dy);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.pb
            .cubic_to(x1 + self.dx, y1 + self.dy, x2 + self.dx, y2 + self.dy, x + self.dx, y + self.dy);
    }

    fn close(&mut self) {
        self.pb.close();
    }
}

fn paint_for(color: &str) -> Paint<'static> {
    let c = parse_hex_or_black(color);
    let mut paint = Paint::default();
    paint.set_color_rgba8(c.r, c.g, c.b, c.a);
    paint.anti_alias = true;
    paint
}

fn skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_xywh(to_f32(rect.x), to_f32(rect.y), to_f32(rect.width), to_f32(rect.height))
}

#[allow(clippy::cast_possible_truncation)]
fn to_f32(v: f64) -> f32 {
    v as f32
}

// =============================================================
// Browser Canvas2D
// =============================================================

impl Surface for CanvasRenderingContext2d {
    type Error = JsValue;

    fn width(&self) -> f64 {
        self.canvas().map_or(0.0, |c| f64::from(c.width()))
    }

    fn height(&self) -> f64 {
        self.canvas().map_or(0.0, |c| f64::from(c.height()))
    }

    fn clear(&mut self) -> Result<(), JsValue> {
        let (w, h) = (Surface::width(self), Surface::height(self));
        CanvasRenderingContext2d::save(self);
        self.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
        self.clear_rect(0.0, 0.0, w, h);
        CanvasRenderingContext2d::restore(self);
        Ok(())
    }

    fn save(&mut self) {
        CanvasRenderingContext2d::save(self);
    }

    fn restore(&mut self) {
        CanvasRenderingContext2d::restore(self);
    }

    fn translate(&mut self, dx: f64, dy: f64) -> Result<(), JsValue> {
        CanvasRenderingContext2d::translate(self, dx, dy)
    }

    fn rotate(&mut self, radians: f64) -> Result<(), JsValue> {
        CanvasRenderingContext2d::rotate(self, radians)
    }

    fn scale(&mut self, sx: f64, sy: f64) -> Result<(), JsValue> {
        CanvasRenderingContext2d::scale(self, sx, sy)
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) -> Result<(), JsValue> {
        self.set_fill_style_str(color);
        CanvasRenderingContext2d::fill_rect(self, rect.x, rect.y, rect.width, rect.height);
        Ok(())
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: &StrokeStyle<'_>) -> Result<(), JsValue> {
        apply_stroke_style(self, stroke)?;
        CanvasRenderingContext2d::stroke_rect(self, rect.x, rect.y, rect.width, rect.height);
        self.set_line_dash(&js_sys::Array::new())
    }

    fn stroke_segments(&mut self, segments: &[(Point, Point)], stroke: &StrokeStyle<'_>) -> Result<(), JsValue> {
        apply_stroke_style(self, stroke)?;
        self.begin_path();
        for (from, to) in segments {
            self.move_to(from.x, from.y);
            self.line_to(to.x, to.y);
        }
        self.stroke();
        self.set_line_dash(&js_sys::Array::new())
    }

    fn fill_text(&mut self, text: &str, center: Point, style: &TextStyle<'_>) -> Result<(), JsValue> {
        let weight = if style.bold { "bold " } else { "" };
        self.set_fill_style_str(style.color);
        self.set_font(&format!("{weight}{}px sans-serif", style.size));
        self.set_text_align("center");
        self.set_text_baseline("middle");
        CanvasRenderingContext2d::fill_text(self, text, center.x, center.y)
    }
}

fn apply_stroke_style(ctx: &CanvasRenderingContext2d, stroke: &StrokeStyle<'_>) -> Result<(), JsValue> {
    ctx.set_stroke_style_str(stroke.color);
    ctx.set_line_width(stroke.width);
    let dash_array = js_sys::Array::new();
    if let Some([on, off]) = stroke.dash {
        dash_array.push(&on.into());
        dash_array.push(&off.into());
    }
    ctx.set_line_dash(&dash_array)
}
