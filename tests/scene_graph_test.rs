use std::f32::consts::PI;

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, SquareMatrix, Transform as _, Vector3};
use scene_ngin::data_structures::{
    instance::Transform,
    light::Light,
    scene_graph::{Group, LightNode, NodeId, Scene, SceneNode},
};

fn assert_point_eq(actual: Point3<f32>, expected: [f32; 3]) {
    let expected = Point3::from(expected);
    assert!(
        (actual - expected).magnitude2() < 1e-8,
        "{actual:?} != {expected:?}"
    );
}

/// The grouped cubes of the transform lesson.
fn lesson_group() -> Group {
    let mut group = Group::new();
    group.add_child(Box::new(Group::new()));
    group.add_child(Box::new(Group::new().at(-2.0, 0.0, 0.0)));
    group.add_child(Box::new(Group::new().at(0.0, 1.0, 0.0)));
    let transform = group.local_transform_mut();
    transform.position.x = 1.0;
    transform.scale.y = 1.5;
    transform.rotate_z(-PI * 0.5);
    group
}

#[test]
fn children_inherit_the_group_transform() {
    let mut scene = Scene::new();
    let id = scene.add(lesson_group());
    scene.update_world_transforms();

    let group = scene.node(id).unwrap();
    let children = group.children();
    assert_point_eq(children[0].world_position(), [1.0, 0.0, 0.0]);
    // rotated a quarter turn clockwise around Z, then moved by the group
    assert_point_eq(children[1].world_position(), [1.0, 2.0, 0.0]);
    // scaled along the group's Y before the rotation
    assert_point_eq(children[2].world_position(), [2.5, 0.0, 0.0]);
}

#[test]
fn world_is_parent_times_local() {
    let mut parent = Transform::from_position(0.0, 1.0, 0.0);
    parent.set_euler(0.3, -0.2, 0.7);
    parent.scale = Vector3::new(2.0, 1.0, 0.5);
    let mut child = Transform::from_position(1.0, 2.0, 3.0);
    child.rotate_y(0.4);

    let mut group = Group::new();
    *group.local_transform_mut() = parent;
    let mut inner = Group::new();
    *inner.local_transform_mut() = child;
    group.add_child(Box::new(inner));
    group.update_world_transforms(&Matrix4::identity());

    let expected = &parent * &child;
    let actual = group.children()[0].world_matrix();
    let probe = Point3::new(0.5, -1.0, 2.0);
    let diff = expected.transform_point(probe) - actual.transform_point(probe);
    assert!(diff.magnitude2() < 1e-8);
}

#[test]
fn moving_a_node_after_update_needs_another_update() {
    let mut scene = Scene::new();
    let id = scene.add(Group::new());
    scene.update_world_transforms();
    scene.transform_mut(id).unwrap().position = Vector3::new(0.0, 0.0, 5.0);
    assert_point_eq(scene.node(id).unwrap().world_position(), [0.0, 0.0, 0.0]);
    scene.update_world_transforms();
    assert_point_eq(scene.node(id).unwrap().world_position(), [0.0, 0.0, 5.0]);
}

#[test]
fn lights_are_collected_with_their_world_matrix() {
    let mut scene = Scene::new();
    let mut rig = Group::new().at(1.0, 0.0, 0.0);
    rig.add_child(Box::new(
        LightNode::new(Light::point(0xffffff, 30.0, 0.0, 2.0)).at(2.0, 3.0, 4.0),
    ));
    scene.add(rig);
    scene.add(LightNode::new(Light::ambient(0xffffff, 1.0)));
    scene.update_world_transforms();

    let lights = scene.lights();
    assert_eq!(lights.len(), 2);
    let position = Point3::from_vec(lights[0].1.w.truncate());
    assert_point_eq(position, [3.0, 3.0, 4.0]);
    assert_eq!(lights[1].0, Light::ambient(0xffffff, 1.0));
}

#[test]
fn hidden_nodes_hide_their_subtree() {
    let mut scene = Scene::new();
    let mut rig = Group::new();
    rig.add_child(Box::new(LightNode::new(Light::ambient(0xffffff, 1.0))));
    let id = scene.add(rig);
    scene.node_mut(id).unwrap().base_mut().visible = false;
    scene.update_world_transforms();
    assert!(scene.lights().is_empty());
}

#[test]
fn node_ids_index_the_root_children() {
    let mut scene = Scene::new();
    assert_eq!(scene.add(Group::new()), NodeId(0));
    assert_eq!(scene.add(Group::new()), NodeId(1));
    assert!(scene.node(NodeId(2)).is_none());
    assert!(scene.transform_mut(NodeId(5)).is_none());
}
