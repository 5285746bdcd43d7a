//! Two cubes moved, scaled and rotated together through a group, next to
//! the world axes.

use std::f32::consts::PI;

use cgmath::{Deg, Point3};

use crate::{
    color::Color,
    context::{Context, WindowOptions},
    data_structures::{
        geometry::Geometry,
        material::{Material, MaterialParams},
        scene_graph::{Group, LineNode, MeshNode, Scene, SceneNode},
    },
    flow::{self, SceneFlow},
};

/// Logical size of the lesson's fixed window.
pub const SIZE: (u32, u32) = (800, 600);

pub struct TransformObjects {
    scene: Scene,
}

impl TransformObjects {
    pub fn new(ctx: &mut Context) -> anyhow::Result<Self> {
        let mut scene = Scene::new();
        let cube = Geometry::cuboid(1.0, 1.0, 1.0);

        let mut group = Group::new();
        let red = Material::shared(MaterialParams::basic().with_color(Color::parse("red")?));
        let orange = Material::shared(MaterialParams::basic().with_color(Color::parse("orange")?));
        group.add_child(Box::new(MeshNode::new(&ctx.device, &cube, red)));
        group.add_child(Box::new(
            MeshNode::new(&ctx.device, &cube, orange).at(-2.0, 0.0, 0.0),
        ));

        let transform = group.local_transform_mut();
        transform.position.x = 1.0;
        transform.scale.y = 1.5;
        transform.rotate_z(-PI * 0.5);
        scene.add(group);

        scene.add(LineNode::axes_helper(&ctx.device, 100_000.0));

        ctx.set_projection(Deg(75.0), 0.1, 2000.0);
        ctx.camera.camera.position = Point3::new(0.0, 0.0, 3.0);
        ctx.camera.camera.look_at(Point3::new(0.0, 0.0, 0.0));

        Ok(Self { scene })
    }
}

impl SceneFlow for TransformObjects {
    fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }
}

pub fn window_options() -> WindowOptions {
    WindowOptions {
        title: "Transform objects".to_string(),
        fixed_size: Some(SIZE),
    }
}

pub fn run() -> anyhow::Result<()> {
    flow::run(
        window_options(),
        Box::new(|ctx| Ok(Box::new(TransformObjects::new(ctx)?) as Box<dyn SceneFlow>)),
    )
}
