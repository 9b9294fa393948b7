use super::*;
use crate::color::parse_hex;

fn surface() -> PixmapSurface {
    PixmapSurface::new(100, 100).unwrap()
}

#[test]
fn zero_sized_surface_is_rejected() {
    assert!(PixmapSurface::new(0, 10).is_none());
    assert!(PixmapSurface::new(10, 0).is_none());
}

#[test]
fn new_surface_is_transparent() {
    let s = surface();
    assert_eq!(s.pixel(0, 0).map(|p| p.a), Some(0));
    assert_eq!(s.pixel(99, 99).map(|p| p.a), Some(0));
    assert!(s.pixel(100, 0).is_none());
    assert_eq!(Surface::width(&s), 100.0);
    assert_eq!(Surface::height(&s), 100.0);
}

#[test]
fn fill_rect_paints_covered_pixels() {
    let mut s = surface();
    let Ok(()) = s.fill_rect(Rect::new(10.0, 10.0, 20.0, 20.0), "#ff0000");
    assert_eq!(s.pixel(15, 15), Some(Rgba::rgb(255, 0, 0)));
    assert_eq!(s.pixel(35, 35).map(|p| p.a), Some(0));
}

#[test]
fn unparseable_color_falls_back_to_black() {
    let mut s = surface();
    let Ok(()) = s.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), "tomato");
    assert_eq!(s.pixel(5, 5), Some(Rgba::BLACK));
}

#[test]
fn degenerate_rect_is_ignored() {
    let mut s = surface();
    let Ok(()) = s.fill_rect(Rect::new(10.0, 10.0, 0.0, 20.0), "#ff0000");
    assert_eq!(s.pixel(10, 15).map(|p| p.a), Some(0));
}

#[test]
fn translate_and_scale_compose() {
    let mut s = surface();
    let Ok(()) = s.translate(20.0, 30.0);
    let Ok(()) = s.scale(2.0, 2.0);
    let Ok(()) = s.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), "#00ff00");
    // Local (0..10) maps to screen 20..40 / 30..50.
    assert_eq!(s.pixel(35, 45), Some(Rgba::rgb(0, 255, 0)));
    assert_eq!(s.pixel(15, 45).map(|p| p.a), Some(0));
    assert_eq!(s.pixel(35, 55).map(|p| p.a), Some(0));
}

#[test]
fn rotate_turns_about_origin() {
    let mut s = surface();
    let Ok(()) = s.translate(50.0, 50.0);
    let Ok(()) = s.rotate(std::f64::consts::FRAC_PI_2);
    // A bar along +x becomes a bar along +y.
    let Ok(()) = s.fill_rect(Rect::new(0.0, -2.0, 40.0, 4.0), "#0000ff");
    assert_eq!(s.pixel(50, 80), Some(Rgba::rgb(0, 0, 255)));
    assert_eq!(s.pixel(80, 50).map(|p| p.a), Some(0));
}

#[test]
fn save_restore_round_trips_transform() {
    let mut s = surface();
    s.save();
    let Ok(()) = s.translate(5.0, 5.0);
    s.save();
    let Ok(()) = s.scale(3.0, 3.0);
    assert_eq!(s.depth(), 2);
    s.restore();
    s.restore();
    assert_eq!(s.depth(), 0);
    assert!(s.is_identity());
}

#[test]
fn unbalanced_restore_is_harmless() {
    let mut s = surface();
    let Ok(()) = s.translate(5.0, 5.0);
    s.restore();
    assert_eq!(s.depth(), 0);
    assert!(!s.is_identity());
}

#[test]
fn clear_ignores_transform() {
    let mut s = surface();
    let Ok(()) = s.fill_rect(Rect::new(0.0, 0.0, 100.0, 100.0), "#ff0000");
    let Ok(()) = s.translate(50.0, 50.0);
    let Ok(()) = s.clear();
    assert_eq!(s.pixel(0, 0).map(|p| p.a), Some(0));
    assert_eq!(s.pixel(99, 99).map(|p| p.a), Some(0));
}

#[test]
fn dashed_stroke_leaves_gaps() {
    let mut s = surface();
    let style = StrokeStyle { color: "#000000", width: 2.0, dash: Some([10.0, 10.0]) };
    let Ok(()) = s.stroke_segments(&[(Point::new(0.0, 50.0), Point::new(100.0, 50.0))], &style);
    assert_eq!(s.pixel(5, 50), Some(Rgba::BLACK));
    assert_eq!(s.pixel(15, 50).map(|p| p.a), Some(0));
    assert_eq!(s.pixel(25, 50), Some(Rgba::BLACK));
}

#[test]
fn stroke_rect_outlines_without_filling() {
    let mut s = surface();
    let style = StrokeStyle { color: "#22c55e", width: 2.0, dash: None };
    let Ok(()) = s.stroke_rect(Rect::new(10.0, 10.0, 40.0, 40.0), &style);
    assert_eq!(s.pixel(10, 30), parse_hex("#22c55e"));
    assert_eq!(s.pixel(30, 30).map(|p| p.a), Some(0));
}

#[test]
fn text_without_fonts_is_skipped() {
    let mut s = surface();
    let style = TextStyle { color: "#000000", size: 12.0, bold: true };
    let Ok(()) = s.fill_text("Plot 7", Point::new(50.0, 50.0), &style);
    let painted = (0..100).flat_map(|y| (0..100).map(move |x| (x, y))).any(|(x, y)| {
        s.pixel(x, y).is_some_and(|p| p.a > 0)
    });
    assert!(!painted);
}
