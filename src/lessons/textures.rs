//! A textured cube. All textures go through one loading manager which logs
//! the loading progress.

use cgmath::Point3;

use crate::{
    camera::OrbitControls,
    context::{Context, WindowOptions},
    data_structures::{
        geometry::Geometry,
        material::{Material, MaterialParams},
        scene_graph::{MeshNode, Scene},
        texture::{ColorSpace, MagFilter, MinFilter},
    },
    flow::{self, SceneFlow},
    resources::loader::LoadingManager,
};

/// Door maps loaded next to the colour texture.
pub const DOOR_MAPS: [&str; 6] = [
    "textures/door/alpha.jpg",
    "textures/door/height.jpg",
    "textures/door/normal.jpg",
    "textures/door/ambientOcclusion.jpg",
    "textures/door/metalness.jpg",
    "textures/door/roughness.jpg",
];

pub fn loading_manager() -> LoadingManager {
    LoadingManager::new()
        .on_start(|_, _, _| log::info!("onStart"))
        .on_progress(|_, loaded, total| log::info!("loaded {loaded} out of {total}"))
        .on_load(|| log::info!("loaded!"))
        .on_error(|url| log::error!("could not load {url}"))
}

pub struct Textures {
    scene: Scene,
}

impl Textures {
    pub fn new(ctx: &mut Context) -> anyhow::Result<Self> {
        let loader = ctx.texture_loader().with_manager(loading_manager());
        let color = loader.load("textures/minecraft.png");
        for path in DOOR_MAPS {
            loader.load(path);
        }
        // Pixel art: no mipmaps and no smoothing in either direction.
        color.update_options(|options| {
            options.color_space = ColorSpace::Srgb;
            options.generate_mipmaps = false;
            options.min_filter = MinFilter::Nearest;
            options.mag_filter = MagFilter::Nearest;
        });

        let mut scene = Scene::new();
        let mut params = MaterialParams::basic();
        params.maps.map = Some(color);
        let mesh = MeshNode::new(
            &ctx.device,
            &Geometry::cuboid(1.0, 1.0, 1.0),
            Material::shared(params),
        );
        scene.add(mesh);

        ctx.camera.camera.position = Point3::new(1.0, 1.0, 1.0);
        ctx.enable_orbit_controls(OrbitControls::new((0.0, 0.0, 0.0)).with_damping(true));

        Ok(Self { scene })
    }
}

impl SceneFlow for Textures {
    fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }
}

pub fn window_options() -> WindowOptions {
    WindowOptions {
        title: "Textures".to_string(),
        ..Default::default()
    }
}

pub fn run() -> anyhow::Result<()> {
    flow::run(
        window_options(),
        Box::new(|ctx| Ok(Box::new(Textures::new(ctx)?) as Box<dyn SceneFlow>)),
    )
}
