use std::f32::consts::PI;

use cgmath::{Deg, InnerSpace, Point3, Vector3};
use scene_ngin::{
    camera::{Camera, OrbitControls, Projection},
    viewport::Viewport,
};

fn camera_at(x: f32, y: f32, z: f32) -> Camera {
    let mut camera = Camera::new((x, y, z));
    camera.look_at((0.0, 0.0, 0.0));
    camera
}

#[test]
fn rotation_keeps_the_distance_to_the_target() {
    let mut camera = camera_at(1.0, 1.0, 2.0);
    let distance = camera.distance_to_target();
    let mut controls = OrbitControls::new((0.0, 0.0, 0.0));

    controls.rotate_left(0.7);
    controls.rotate_up(0.2);
    assert!(controls.update(&mut camera));

    assert!((camera.distance_to_target() - distance).abs() < 1e-5);
    assert_eq!(camera.target, Point3::new(0.0, 0.0, 0.0));
}

#[test]
fn without_damping_motion_is_applied_once() {
    let mut camera = camera_at(0.0, 0.0, 3.0);
    let mut controls = OrbitControls::new((0.0, 0.0, 0.0));
    controls.rotate_left(PI / 2.0);
    controls.update(&mut camera);
    // a quarter turn to the left around the up axis
    assert!((camera.position - Point3::new(-3.0, 0.0, 0.0)).magnitude() < 1e-4);
    assert!(!controls.update(&mut camera));
}

#[test]
fn damping_spreads_motion_over_frames() {
    let mut camera = camera_at(0.0, 0.0, 3.0);
    let mut controls = OrbitControls::new((0.0, 0.0, 0.0)).with_damping(true);
    controls.rotate_left(1.0);

    let mut steps = Vec::new();
    let mut previous = camera.position;
    for _ in 0..20 {
        controls.update(&mut camera);
        steps.push((camera.position - previous).magnitude());
        previous = camera.position;
    }
    assert!(steps[0] > 0.0);
    assert!(steps.windows(2).all(|w| w[1] < w[0]), "{steps:?}");
    assert!((camera.distance_to_target() - 3.0).abs() < 1e-4);
}

#[test]
fn dolly_changes_the_distance_only() {
    let mut camera = camera_at(0.0, 0.0, 4.0);
    let mut controls = OrbitControls::new((0.0, 0.0, 0.0));
    controls.dolly_in(2.0);
    controls.update(&mut camera);
    assert!((camera.position - Point3::new(0.0, 0.0, 2.0)).magnitude() < 1e-4);

    controls.min_distance = 3.0;
    controls.dolly_in(2.0);
    controls.update(&mut camera);
    assert!((camera.distance_to_target() - 3.0).abs() < 1e-4);
}

#[test]
fn pan_moves_camera_and_target_together() {
    let mut camera = camera_at(0.0, 0.0, 3.0);
    let mut controls = OrbitControls::new((0.0, 0.0, 0.0));
    controls.set_viewport(&Viewport::new(800, 600, 2.0));
    controls.pan(Vector3::new(1.0, 0.5, 0.0));
    controls.update(&mut camera);
    assert_eq!(controls.target, Point3::new(1.0, 0.5, 0.0));
    assert_eq!(camera.target, controls.target);
    assert!((camera.position - Point3::new(1.0, 0.5, 3.0)).magnitude() < 1e-4);
}

#[test]
fn looking_straight_down_stays_finite() {
    let mut camera = camera_at(0.0, 5.0, 0.0);
    let mut controls = OrbitControls::new((0.0, 0.0, 0.0));
    controls.rotate_up(-1.0);
    controls.update(&mut camera);
    assert!(camera.position.x.is_finite() && camera.position.y.is_finite());
    assert!((camera.distance_to_target() - 5.0).abs() < 1e-3);
}

#[test]
fn pan_speed_follows_the_field_of_view() {
    let viewport = Viewport::new(800, 600, 1.0);
    let pan_with = |fovy: f32| {
        let mut camera = camera_at(0.0, 0.0, 3.0);
        let mut controls = OrbitControls::new((0.0, 0.0, 0.0));
        controls.set_viewport(&viewport);
        controls.set_projection(&Projection::new(800, 600, Deg(fovy), 0.1, 100.0));
        controls.pan_pixels(&camera, -60.0, 0.0);
        controls.update(&mut camera);
        controls.target.x
    };

    let wide = pan_with(75.0);
    let narrow = pan_with(35.0);
    assert!(wide > 0.0 && narrow > 0.0);
    let expected = (37.5f32.to_radians().tan()) / (17.5f32.to_radians().tan());
    assert!((wide / narrow - expected).abs() < 1e-4, "{wide} {narrow}");
    // at 75 degrees the target follows the cursor: 60px of a 600px high view
    let visible_height = 2.0 * 3.0 * 37.5f32.to_radians().tan();
    assert!((wide - visible_height * 60.0 / 600.0).abs() < 1e-4);
}
