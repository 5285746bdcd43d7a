use cgmath::{InnerSpace, Vector3};
use scene_ngin::data_structures::geometry::Geometry;

fn assert_outward_winding(geometry: &Geometry) {
    for tri in geometry.indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| {
            Vector3::from(geometry.vertices[i as usize].position)
        });
        let face = (b - a).cross(c - a);
        if face.magnitude2() < 1e-12 {
            continue;
        }
        let normal: Vector3<f32> = tri
            .iter()
            .map(|&i| Vector3::from(geometry.vertices[i as usize].normal))
            .fold(Vector3::new(0.0, 0.0, 0.0), |acc, n| acc + n);
        assert!(
            face.dot(normal) > 0.0,
            "{} triangle {tri:?} winds inwards",
            geometry.name
        );
    }
}

#[test]
fn box_has_four_vertices_per_face() {
    let cube = Geometry::cuboid(1.0, 1.0, 1.0);
    assert_eq!(cube.vertices.len(), 24);
    assert_eq!(cube.triangle_count(), 12);
    for v in &cube.vertices {
        assert!(v.position.iter().all(|c| c.abs() <= 0.5 + 1e-6));
    }
    assert_outward_winding(&cube);
}

#[test]
fn box_extents_follow_its_size() {
    let cube = Geometry::cuboid(0.75, 2.0, 4.0);
    let max = |axis: usize| {
        cube.vertices
            .iter()
            .map(|v| v.position[axis])
            .fold(f32::NEG_INFINITY, f32::max)
    };
    assert!((max(0) - 0.375).abs() < 1e-6);
    assert!((max(1) - 1.0).abs() < 1e-6);
    assert!((max(2) - 2.0).abs() < 1e-6);
}

#[test]
fn plane_faces_positive_z() {
    let plane = Geometry::plane(5.0, 5.0);
    assert_eq!(plane.vertices.len(), 4);
    assert_eq!(plane.triangle_count(), 2);
    assert!(plane.vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
    assert_outward_winding(&plane);
}

#[test]
fn sphere_vertices_lie_on_the_surface() {
    let sphere = Geometry::sphere(0.5, 16, 16);
    assert_eq!(sphere.vertices.len(), 17 * 17);
    // the rows at the poles lose one triangle per quad
    assert_eq!(sphere.triangle_count(), 16 * (2 * 16 - 2));
    for v in &sphere.vertices {
        assert!((Vector3::from(v.position).magnitude() - 0.5).abs() < 1e-5);
        assert!((Vector3::from(v.normal).magnitude() - 1.0).abs() < 1e-5);
    }
    assert_outward_winding(&sphere);
}

#[test]
fn torus_counts_and_normals() {
    let torus = Geometry::torus(0.3, 0.2, 16, 32);
    assert_eq!(torus.vertices.len(), 17 * 33);
    assert_eq!(torus.triangle_count(), 16 * 32 * 2);
    for v in &torus.vertices {
        let p = Vector3::from(v.position);
        let ring = (p.x * p.x + p.y * p.y).sqrt();
        let tube_distance = ((ring - 0.3).powi(2) + p.z * p.z).sqrt();
        assert!((tube_distance - 0.2).abs() < 1e-5);
    }
    assert_outward_winding(&torus);
}

#[test]
fn tangents_are_unit_and_orthogonal_to_normals() {
    // unit sized faces map one uv unit to one world unit
    for geometry in [Geometry::cuboid(1.0, 1.0, 1.0), Geometry::plane(1.0, 1.0)] {
        for v in &geometry.vertices {
            let t = Vector3::from(v.tangent);
            let n = Vector3::from(v.normal);
            assert!((t.magnitude() - 1.0).abs() < 1e-3, "{}", geometry.name);
            assert!(t.dot(n).abs() < 1e-3, "{}", geometry.name);
        }
    }
}

#[test]
fn degenerate_segment_counts_are_raised() {
    let sphere = Geometry::sphere(1.0, 0, 0);
    assert_eq!(sphere.vertices.len(), 4 * 3);
    let torus = Geometry::torus(1.0, 0.5, 0, 0);
    assert_eq!(torus.vertices.len(), 3 * 4);
}
