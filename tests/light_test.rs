use std::f32::consts::PI;

use cgmath::{InnerSpace, Matrix4, Point3, SquareMatrix, Vector3, Vector4};
use scene_ngin::{
    color::Color,
    data_structures::{
        light::{Light, LightsUniform, MAX_LIGHTS},
        scene_graph::spot_cone_vertices,
    },
};

fn at(x: f32, y: f32, z: f32) -> Matrix4<f32> {
    Matrix4::from_translation(Vector3::new(x, y, z))
}

fn lesson_spot() -> Light {
    Light::spot(Color::parse("orange").unwrap(), 4.5, 10.0, PI * 0.1, 0.25, 1.0).with_shadow(true)
}

#[test]
fn spot_light_packs_cone_and_falloff() {
    let raw = lesson_spot().to_raw(&at(0.0, 3.0, 5.0));
    assert_eq!(&raw.position[..3], &[0.0, 3.0, 5.0]);
    assert_eq!(raw.position[3], 4.0);
    // cutoff distance and decay
    assert_eq!(raw.color[3], 10.0);
    assert_eq!(raw.direction[3], 1.0);
    // pointing from (0, 3, 5) at the origin
    let dir = Vector3::new(raw.direction[0], raw.direction[1], raw.direction[2]);
    let expected = Vector3::new(0.0, -3.0, -5.0) / 34f32.sqrt();
    assert!((dir - expected).magnitude() < 1e-6);
    // outer cone before the inner cone
    assert!((raw.cone[0] - (PI * 0.1).cos()).abs() < 1e-6);
    assert!((raw.cone[1] - (PI * 0.1 * 0.75).cos()).abs() < 1e-6);
    assert!(raw.cone[1] > raw.cone[0]);
}

#[test]
fn intensity_scales_the_colour() {
    let raw = Light::point(0xffffff, 30.0, 0.0, 2.0).to_raw(&Matrix4::identity());
    assert!((raw.color[0] - 30.0).abs() < 1e-3);
    assert_eq!(raw.color[3], 0.0);
    let hemisphere = Light::hemisphere(0xffffff, 0x000000, 0.5).to_raw(&Matrix4::identity());
    assert!((hemisphere.color[1] - 0.5).abs() < 1e-3);
    assert_eq!(&hemisphere.ground[..3], &[0.0, 0.0, 0.0]);
}

#[test]
fn first_shadow_caster_owns_the_shadow_map() {
    let lights = vec![
        (Light::ambient(0xffffff, 1.0), Matrix4::identity()),
        (lesson_spot(), at(0.0, 3.0, 5.0)),
        (
            Light::directional(0xffffff, 1.0).with_shadow(true),
            at(1.0, 2.0, 0.0),
        ),
    ];
    let uniform = LightsUniform::pack(&lights, true, false);
    assert_eq!(uniform.count, 3);
    assert_eq!(uniform.shadow_light, 1);
    assert!(uniform.has_shadow());

    let disabled = LightsUniform::pack(&lights, false, true);
    assert!(!disabled.has_shadow());
    assert_eq!(disabled.has_environment, 1);
}

#[test]
fn shadow_camera_sees_the_target() {
    let view_proj = lesson_spot().shadow_view_proj(&at(0.0, 3.0, 5.0)).unwrap();
    let clip = view_proj * Vector4::new(0.0, 0.0, 0.0, 1.0);
    let ndc = clip.truncate() / clip.w;
    assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
    assert!((0.0..1.0).contains(&ndc.z));
    assert!(Light::ambient(0xffffff, 1.0).shadow_view_proj(&Matrix4::identity()).is_none());
    assert!(Light::point(0xffffff, 1.0, 0.0, 2.0).shadow_view_proj(&Matrix4::identity()).is_none());
}

#[test]
fn extra_lights_are_dropped() {
    let lights: Vec<_> = (0..MAX_LIGHTS + 3)
        .map(|i| (Light::point(0xffffff, 1.0, 0.0, 2.0), at(i as f32, 0.0, 0.0)))
        .collect();
    let uniform = LightsUniform::pack(&lights, true, false);
    assert_eq!(uniform.count as usize, MAX_LIGHTS);
    assert!(!uniform.has_shadow());
}

#[test]
fn spot_helper_outlines_the_cone() {
    let light = lesson_spot();
    let world = at(0.0, 3.0, 5.0);
    let vertices = spot_cone_vertices(&light, &world);
    // axis, four rays and a 32 segment rim, two vertices per line
    assert_eq!(vertices.len(), (1 + 4 + 32) * 2);
    assert_eq!(vertices[0].position, [0.0, 3.0, 5.0]);
    let rim = Point3::from(vertices[3].position);
    let apex = Point3::new(0.0, 3.0, 5.0);
    let slant = (rim - apex).magnitude();
    assert!((slant - 10.0 / (PI * 0.1).cos()).abs() < 1e-3);
    assert_eq!(vertices[0].color, light.color.to_array());

    assert!(spot_cone_vertices(&Light::ambient(0xffffff, 1.0), &world).is_empty());
}
