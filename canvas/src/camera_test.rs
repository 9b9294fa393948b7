#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

// --- Point / Rect ---

#[test]
fn point_new() {
    let p = Point::new(3.0, 4.0);
    assert_eq!(p.x, 3.0);
    assert_eq!(p.y, 4.0);
}

#[test]
fn rect_contains_is_inclusive_on_edges() {
    let r = Rect::new(10.0, 10.0, 20.0, 30.0);
    assert!(r.contains(Point::new(10.0, 10.0)));
    assert!(r.contains(Point::new(30.0, 40.0)));
    assert!(r.contains(Point::new(20.0, 25.0)));
    assert!(!r.contains(Point::new(9.99, 20.0)));
    assert!(!r.contains(Point::new(20.0, 40.01)));
}

#[test]
fn rect_right_and_bottom() {
    let r = Rect::new(5.0, 6.0, 10.0, 20.0);
    assert_eq!(r.right(), 15.0);
    assert_eq!(r.bottom(), 26.0);
}

// --- Camera defaults ---

#[test]
fn camera_default_pan_is_fifty() {
    let cam = Camera::default();
    assert_eq!(cam.pan_x, 50.0);
    assert_eq!(cam.pan_y, 50.0);
}

#[test]
fn camera_default_zoom_is_one() {
    let cam = Camera::default();
    assert_eq!(cam.zoom, 1.0);
}

// --- screen_to_world / world_to_screen ---

#[test]
fn screen_to_world_subtracts_pan_then_divides_zoom() {
    let cam = Camera { pan_x: 50.0, pan_y: 20.0, zoom: 2.0 };
    let world = cam.screen_to_world(Point::new(150.0, 60.0));
    assert!(point_approx_eq(world, Point::new(50.0, 20.0)));
}

#[test]
fn world_to_screen_scales_then_adds_pan() {
    let cam = Camera { pan_x: 50.0, pan_y: 20.0, zoom: 2.0 };
    let screen = cam.world_to_screen(Point::new(50.0, 20.0));
    assert!(point_approx_eq(screen, Point::new(150.0, 60.0)));
}

#[test]
fn round_trip_holds_across_zoom_range() {
    let points = [
        Point::new(0.0, 0.0),
        Point::new(123.456, -78.9),
        Point::new(-1000.0, 2500.5),
        Point::new(0.001, 99_999.0),
    ];
    let mut zoom = 0.2;
    while zoom <= 3.0 {
        let cam = Camera { pan_x: -37.5, pan_y: 412.25, zoom };
        for p in points {
            let back = cam.screen_to_world(cam.world_to_screen(p));
            assert!((back.x - p.x).abs() < 1e-6, "zoom {zoom}: {back:?} != {p:?}");
            assert!((back.y - p.y).abs() < 1e-6, "zoom {zoom}: {back:?} != {p:?}");
        }
        zoom += 0.05;
    }
}

#[test]
fn screen_dist_to_world_divides_by_zoom() {
    let cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 0.5 };
    assert!(approx_eq(cam.screen_dist_to_world(15.0), 30.0));
}

// --- zoom ---

#[test]
fn zoom_by_adds_delta() {
    let mut cam = Camera::default();
    cam.zoom_by(0.5);
    assert!(approx_eq(cam.zoom, 1.5));
}

#[test]
fn zoom_by_clamps_upper_bound() {
    let mut cam = Camera::default();
    cam.zoom_by(100.0);
    assert_eq!(cam.zoom, 3.0);
}

#[test]
fn zoom_by_clamps_lower_bound() {
    let mut cam = Camera::default();
    cam.zoom_by(-100.0);
    assert_eq!(cam.zoom, 0.2);
}

#[test]
fn set_zoom_ignores_nan() {
    let mut cam = Camera::default();
    cam.set_zoom(f64::NAN);
    assert_eq!(cam.zoom, 1.0);
}

#[test]
fn zoom_out_repeatedly_stops_at_floor() {
    let mut cam = Camera::default();
    for _ in 0..50 {
        cam.zoom_out();
    }
    assert_eq!(cam.zoom, 0.2);
    assert_eq!(cam.zoom_percent(), 20);
}

#[test]
fn zoom_in_steps_by_tenth() {
    let mut cam = Camera::default();
    cam.zoom_in();
    assert_eq!(cam.zoom_percent(), 110);
}

// --- pan ---

#[test]
fn pan_by_is_additive_and_unbounded() {
    let mut cam = Camera::default();
    cam.pan_by(-10_000.0, 25.0);
    assert_eq!(cam.pan_x, -9_950.0);
    assert_eq!(cam.pan_y, 75.0);
}

#[test]
fn pan_by_is_independent_of_zoom() {
    let mut cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 2.5 };
    cam.pan_by(10.0, 10.0);
    assert_eq!(cam.pan_x, 10.0);
    assert_eq!(cam.pan_y, 10.0);
}

// --- visible region ---

#[test]
fn visible_world_rect_accounts_for_pan_and_zoom() {
    let cam = Camera { pan_x: 100.0, pan_y: 40.0, zoom: 2.0 };
    let r = cam.visible_world_rect(800.0, 600.0);
    assert!(approx_eq(r.x, -50.0));
    assert!(approx_eq(r.y, -20.0));
    assert!(approx_eq(r.width, 400.0));
    assert!(approx_eq(r.height, 300.0));
}
