use cgmath::Point3;
use scene_ngin::{
    data_structures::material::{Material, MaterialParams},
    render::back_to_front,
};

#[test]
fn farthest_transparent_draw_comes_first() {
    let eye = Point3::new(1.0, 1.0, 2.0);
    let positions = [
        Point3::new(-1.5, 0.0, 0.0),
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.5, 0.0, 0.0),
    ];
    // the torus at +x is nearest to a camera at (1, 1, 2)
    assert_eq!(back_to_front(&positions, eye), vec![0, 1, 2]);

    let eye = Point3::new(-3.0, 0.0, 0.0);
    assert_eq!(back_to_front(&positions, eye), vec![2, 1, 0]);
}

#[test]
fn empty_and_single_batches() {
    let eye = Point3::new(0.0, 0.0, 3.0);
    assert!(back_to_front(&[], eye).is_empty());
    assert_eq!(back_to_front(&[Point3::new(0.0, 0.0, 0.0)], eye), vec![0]);
}

#[test]
fn only_flagged_materials_are_drawn_blended() {
    assert!(!Material::new(MaterialParams::standard()).is_transparent());

    let mut params = MaterialParams::physical();
    params.transparent = true;
    let mut material = Material::new(params);
    assert!(material.is_transparent());

    // toggling the flag moves the mesh between batches on the next frame
    material.params.transparent = false;
    assert!(!material.is_transparent());
}
