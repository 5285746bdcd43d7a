//! A red cube seen from a corner. No animation and no controls.

use cgmath::{Deg, Point3};

use crate::{
    context::{Context, WindowOptions},
    data_structures::{
        geometry::Geometry,
        material::{Material, MaterialParams},
        scene_graph::{MeshNode, Scene},
    },
    flow::{self, SceneFlow},
};

pub struct FirstProject {
    scene: Scene,
}

impl FirstProject {
    pub fn new(ctx: &mut Context) -> anyhow::Result<Self> {
        let mut scene = Scene::new();
        let material = Material::shared(MaterialParams::basic().with_color(0xff0000));
        let mesh = MeshNode::new(&ctx.device, &Geometry::cuboid(1.0, 1.0, 1.0), material);
        scene.add(mesh);

        ctx.set_projection(Deg(75.0), 0.1, 2000.0);
        ctx.camera.camera.position = Point3::new(3.0, 3.0, 3.0);
        ctx.camera.camera.look_at(Point3::new(0.0, 0.0, 0.0));

        Ok(Self { scene })
    }
}

impl SceneFlow for FirstProject {
    fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }
}

pub fn window_options() -> WindowOptions {
    WindowOptions {
        title: "First project".to_string(),
        ..Default::default()
    }
}

pub fn run() -> anyhow::Result<()> {
    flow::run(
        window_options(),
        Box::new(|ctx| Ok(Box::new(FirstProject::new(ctx)?) as Box<dyn SceneFlow>)),
    )
}
