use cgmath::Deg;
use scene_ngin::{
    PhysicalSize,
    camera::Projection,
    viewport::{Viewport, logical_size},
};

fn resize(viewport: &mut Viewport, projection: &mut Projection, width: u32, height: u32, dpr: f64) {
    viewport.resize(width, height, dpr);
    projection.set_viewport(viewport);
}

#[test]
fn aspect_follows_viewport() {
    let mut viewport = Viewport::default();
    let mut projection = Projection::new(viewport.width, viewport.height, Deg(75.0), 0.1, 100.0);

    resize(&mut viewport, &mut projection, 1920, 1080, 1.0);
    assert!((projection.aspect() - 1920.0 / 1080.0).abs() < 1e-6);

    resize(&mut viewport, &mut projection, 800, 600, 1.0);
    assert!((projection.aspect() - 800.0 / 600.0).abs() < 1e-6);
    assert_eq!(projection.aspect(), viewport.aspect());
}

#[test]
fn resizing_twice_is_idempotent() {
    let mut viewport = Viewport::default();
    let mut projection = Projection::new(viewport.width, viewport.height, Deg(75.0), 0.1, 100.0);

    assert!(viewport.resize(1280, 720, 1.0));
    projection.set_viewport(&viewport);
    let first = (projection.aspect(), projection.calc_matrix());

    assert!(!viewport.resize(1280, 720, 1.0));
    projection.set_viewport(&viewport);
    assert_eq!(first, (projection.aspect(), projection.calc_matrix()));
    assert!((first.0 - 1280.0 / 720.0).abs() < 1e-6);
}

#[test]
fn pixel_ratio_is_clamped_to_two() {
    let mut viewport = Viewport::new(800, 600, 3.0);
    assert_eq!(viewport.pixel_ratio(), 2.0);
    assert_eq!(viewport.drawing_buffer_size(), (1600, 1200));

    viewport.resize(800, 600, 1.5);
    assert_eq!(viewport.pixel_ratio(), 1.5);
    assert_eq!(viewport.drawing_buffer_size(), (1200, 900));

    viewport.resize(800, 600, 1.0);
    assert_eq!(viewport.drawing_buffer_size(), (800, 600));
}

#[test]
fn projection_matrix_changes_with_aspect() {
    let mut projection = Projection::new(800, 600, Deg(75.0), 0.1, 100.0);
    let before = projection.calc_matrix();
    projection.resize(1920, 1080);
    assert_ne!(before, projection.calc_matrix());
    // the vertical field of view is untouched
    assert_eq!(before.y.y, projection.calc_matrix().y.y);
}

#[test]
fn empty_viewport_keeps_a_drawable_buffer() {
    let viewport = Viewport::new(0, 0, 2.0);
    assert!(viewport.is_empty());
    assert_eq!(viewport.aspect(), 1.0);
    assert_eq!(viewport.drawing_buffer_size(), (1, 1));
}

#[test]
fn physical_size_is_divided_by_the_scale_factor() {
    assert_eq!(logical_size(PhysicalSize::new(1920, 1080), 1.0), Some((1920, 1080)));
    assert_eq!(logical_size(PhysicalSize::new(2400, 1800), 3.0), Some((800, 600)));
    assert_eq!(logical_size(PhysicalSize::new(2400, 1800), 1.5), Some((1600, 1200)));
}

#[test]
fn dense_display_is_drawn_at_the_clamped_ratio() {
    let mut viewport = Viewport::default();
    assert_eq!(viewport.resize_physical(PhysicalSize::new(2400, 1800), 3.0), Some(true));
    assert_eq!((viewport.width, viewport.height), (800, 600));
    assert_eq!(viewport.device_pixel_ratio, 3.0);
    assert_eq!(viewport.pixel_ratio(), 2.0);
    // smaller than the 2400x1800 surface, so the frame gets blitted
    assert_eq!(viewport.drawing_buffer_size(), (1600, 1200));

    assert_eq!(viewport.resize_physical(PhysicalSize::new(2400, 1800), 3.0), Some(false));
}

#[test]
fn minimised_window_leaves_the_viewport_alone() {
    let mut viewport = Viewport::new(1280, 720, 2.0);
    assert_eq!(logical_size(PhysicalSize::new(0, 0), 2.0), None);
    assert_eq!(viewport.resize_physical(PhysicalSize::new(0, 0), 2.0), None);
    assert_eq!(viewport.resize_physical(PhysicalSize::new(1280, 0), 2.0), None);
    assert_eq!(viewport, Viewport::new(1280, 720, 2.0));
}
