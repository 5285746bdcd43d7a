//! Five thousand pink sprites scattered around a white cube.

use cgmath::Point3;

use crate::{
    camera::OrbitControls,
    color::Color,
    context::{Context, WindowOptions},
    data_structures::{
        geometry::Geometry,
        material::{Material, MaterialParams, PointsMaterial},
        scene_graph::{MeshNode, PointsNode, Scene},
    },
    flow::{self, SceneFlow},
    particles,
};

pub const COUNT: usize = 5000;

pub struct Particles {
    scene: Scene,
}

impl Particles {
    pub fn new(ctx: &mut Context) -> anyhow::Result<Self> {
        let sprite = ctx.texture_loader().load("textures/particles/2.png");
        let material = PointsMaterial {
            size: 0.1,
            size_attenuation: true,
            color: Color::parse("#ff88cc")?,
            alpha_map: Some(sprite),
            transparent: true,
            depth_write: false,
            ..Default::default()
        };

        let mut scene = Scene::new();
        scene.add(PointsNode::new(
            &ctx.device,
            &particles::scatter(COUNT),
            material,
        ));
        scene.add(MeshNode::new(
            &ctx.device,
            &Geometry::cuboid(1.0, 1.0, 1.0),
            Material::shared(MaterialParams::basic()),
        ));

        ctx.camera.camera.position = Point3::new(0.0, 0.0, 3.0);
        ctx.enable_orbit_controls(OrbitControls::new((0.0, 0.0, 0.0)).with_damping(true));

        Ok(Self { scene })
    }
}

impl SceneFlow for Particles {
    fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }
}

pub fn window_options() -> WindowOptions {
    WindowOptions {
        title: "Particles".to_string(),
        ..Default::default()
    }
}

pub fn run() -> anyhow::Result<()> {
    flow::run(
        window_options(),
        Box::new(|ctx| Ok(Box::new(Particles::new(ctx)?) as Box<dyn SceneFlow>)),
    )
}
