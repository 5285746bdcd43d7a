//! One physically based material with every door map, clearcoat and
//! iridescence, shared by a sphere, a plane and a torus inside an HDR
//! environment.

use cgmath::Point3;

use crate::{
    camera::OrbitControls,
    context::{Context, WindowOptions},
    data_structures::{
        geometry::Geometry,
        light::Light,
        material::{Material, MaterialParams},
        scene_graph::{LightNode, MeshNode, NodeId, Scene, SceneNode},
        texture::TextureOptions,
    },
    flow::{self, FrameTime, SceneFlow},
    resources::loader::TextureLoader,
};

pub const ENVIRONMENT_MAP: &str = "textures/environmentMap/2k.hdr";

/// Shared physical material of the lesson.
pub fn door_material(loader: &TextureLoader) -> MaterialParams {
    let color = loader.load("textures/door/color.jpg");
    color.set_options(TextureOptions::srgb());

    let mut params = MaterialParams::physical();
    params.metalness = 0.7;
    params.roughness = 0.2;
    params.maps.map = Some(color);
    params.maps.ao_map = Some(loader.load("textures/door/ambientOcclusion.jpg"));
    params.ao_map_intensity = 1.0;
    params.maps.metalness_map = Some(loader.load("textures/door/metalness.jpg"));
    params.maps.roughness_map = Some(loader.load("textures/door/roughness.jpg"));
    params.maps.normal_map = Some(loader.load("textures/door/normal.jpg"));
    params.transparent = true;
    params.maps.alpha_map = Some(loader.load("textures/door/alpha.jpg"));
    params.clearcoat = 1.0;
    params.clearcoat_roughness = 0.0;
    params.iridescence = 1.0;
    params.iridescence_ior = 1.0;
    params.iridescence_thickness_range = [100.0, 800.0];
    params
}

pub struct Materials {
    scene: Scene,
    spinning: [NodeId; 3],
}

impl Materials {
    pub fn new(ctx: &mut Context) -> anyhow::Result<Self> {
        let loader = ctx.texture_loader();
        let material = Material::shared(door_material(&loader));

        let mut scene = Scene::new();
        let sphere = scene.add(
            MeshNode::new(&ctx.device, &Geometry::sphere(0.5, 16, 16), material.clone())
                .at(-1.5, 0.0, 0.0),
        );
        let plane = scene.add(MeshNode::new(
            &ctx.device,
            &Geometry::plane(1.0, 1.0),
            material.clone(),
        ));
        let torus = scene.add(
            MeshNode::new(&ctx.device, &Geometry::torus(0.3, 0.2, 16, 32), material)
                .at(1.5, 0.0, 0.0),
        );

        scene.add(LightNode::new(Light::ambient(0xffffff, 1.0)));
        scene.add(LightNode::new(Light::point(0xffffff, 30.0, 0.0, 2.0)).at(2.0, 3.0, 4.0));

        let environment = loader.load_environment(ENVIRONMENT_MAP);
        scene.background = Some(environment.clone());
        scene.environment = Some(environment);

        ctx.camera.camera.position = Point3::new(1.0, 1.0, 2.0);
        ctx.enable_orbit_controls(OrbitControls::new((0.0, 0.0, 0.0)).with_damping(true));

        Ok(Self {
            scene,
            spinning: [sphere, plane, torus],
        })
    }
}

impl SceneFlow for Materials {
    fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    fn on_update(&mut self, _ctx: &Context, time: FrameTime) {
        let t = time.elapsed_secs();
        for id in self.spinning {
            if let Some(transform) = self.scene.transform_mut(id) {
                transform.set_euler(-0.15 * t, 0.1 * t, 0.0);
            }
        }
    }
}

pub fn window_options() -> WindowOptions {
    WindowOptions {
        title: "Materials".to_string(),
        ..Default::default()
    }
}

pub fn run() -> anyhow::Result<()> {
    flow::run(
        window_options(),
        Box::new(|ctx| Ok(Box::new(Materials::new(ctx)?) as Box<dyn SceneFlow>)),
    )
}
