//! A spot light casting shadows over a few standard material shapes.

use std::f32::consts::PI;

use cgmath::{Matrix4, Point3, Vector3};

use crate::{
    camera::OrbitControls,
    color::Color,
    context::{Context, WindowOptions},
    data_structures::{
        geometry::Geometry,
        light::Light,
        material::{Material, MaterialParams},
        scene_graph::{LightNode, LineNode, MeshNode, NodeId, Scene, SceneNode},
    },
    flow::{self, FrameTime, SceneFlow},
};

pub const SPOT_POSITION: Vector3<f32> = Vector3::new(0.0, 3.0, 5.0);

pub fn spot_light() -> anyhow::Result<Light> {
    Ok(Light::spot(Color::parse("orange")?, 4.5, 10.0, PI * 0.1, 0.25, 1.0).with_shadow(true))
}

pub struct Lights {
    scene: Scene,
    spinning: [NodeId; 3],
}

impl Lights {
    pub fn new(ctx: &mut Context) -> anyhow::Result<Self> {
        ctx.options.shadows = true;
        let mut scene = Scene::new();

        let spot = spot_light()?;
        let helper = LineNode::spot_light_helper(
            &ctx.device,
            &spot,
            &Matrix4::from_translation(SPOT_POSITION),
        );
        scene.add(LightNode::new(spot).at(SPOT_POSITION.x, SPOT_POSITION.y, SPOT_POSITION.z));
        scene.add(helper);

        let mut params = MaterialParams::standard();
        params.roughness = 0.4;
        let material = Material::shared(params);
        let mesh = |geometry: Geometry| {
            MeshNode::new(&ctx.device, &geometry, material.clone()).with_shadows(true, true)
        };

        let sphere = scene.add(mesh(Geometry::sphere(0.5, 32, 32)).at(-1.5, 0.0, 0.0));
        let cube = scene.add(mesh(Geometry::cuboid(0.75, 0.75, 0.75)));
        let torus = scene.add(mesh(Geometry::torus(0.3, 0.2, 32, 64)).at(1.5, 0.0, 0.0));

        let mut plane = mesh(Geometry::plane(5.0, 5.0)).at(0.0, -0.65, 0.0);
        plane.local_transform_mut().rotate_x(-PI * 0.5);
        scene.add(plane);

        ctx.camera.camera.position = Point3::new(1.0, 1.0, 2.0);
        ctx.enable_orbit_controls(OrbitControls::new((0.0, 0.0, 0.0)).with_damping(true));

        Ok(Self {
            scene,
            spinning: [sphere, cube, torus],
        })
    }
}

impl SceneFlow for Lights {
    fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    fn on_update(&mut self, _ctx: &Context, time: FrameTime) {
        let t = time.elapsed_secs();
        for id in self.spinning {
            if let Some(transform) = self.scene.transform_mut(id) {
                transform.set_euler(0.15 * t, 0.1 * t, 0.0);
            }
        }
    }
}

pub fn window_options() -> WindowOptions {
    WindowOptions {
        title: "Lights".to_string(),
        ..Default::default()
    }
}

pub fn run() -> anyhow::Result<()> {
    flow::run(
        window_options(),
        Box::new(|ctx| Ok(Box::new(Lights::new(ctx)?) as Box<dyn SceneFlow>)),
    )
}
