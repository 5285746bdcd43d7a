use std::sync::Arc;

use anyhow::Context as _;
use cgmath::Deg;
use winit::window::Window;

use crate::{
    camera::{self, Camera, CameraResources, OrbitControls, Projection},
    color::Color,
    flow::StopSignal,
    data_structures::{
        material::{mk_material_layout, mk_points_layout},
        texture::DefaultTextures,
    },
    pipelines::{background::mk_equirect_layout, blit::mk_blit_layout, standard::mk_environment_layout},
    resources::loader::{Spawner, TextureLoader},
    viewport::{MAX_PIXEL_RATIO, Viewport},
};

/// Renderer wide settings a lesson may change before the first frame.
#[derive(Clone, Copy, Debug)]
pub struct RendererOptions {
    /// Used when the scene sets neither a background colour nor a texture.
    pub clear_color: Color,
    pub shadows: bool,
    pub max_pixel_ratio: f64,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            clear_color: Color::BLACK,
            shadows: false,
            max_pixel_ratio: MAX_PIXEL_RATIO,
        }
    }
}

/// How the native window is created. The web canvas ignores both.
#[derive(Clone, Debug)]
pub struct WindowOptions {
    pub title: String,
    /// Fixed, non-resizable logical size. `None` follows the host.
    pub fixed_size: Option<(u32, u32)>,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            title: "scene-ngin".to_string(),
            fixed_size: None,
        }
    }
}

/// Bind group layouts shared by scene nodes and pipelines.
#[derive(Debug)]
pub struct Layouts {
    pub camera: wgpu::BindGroupLayout,
    pub environment: wgpu::BindGroupLayout,
    pub material: wgpu::BindGroupLayout,
    pub points: wgpu::BindGroupLayout,
    pub equirect: wgpu::BindGroupLayout,
    pub blit: wgpu::BindGroupLayout,
}

impl Layouts {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            camera: camera::mk_bind_group_layout(device),
            environment: mk_environment_layout(device),
            material: mk_material_layout(device),
            points: mk_points_layout(device),
            equirect: mk_equirect_layout(device),
            blit: mk_blit_layout(device),
        }
    }
}

/// GPU device, surface, camera and viewport of the running lesson.
#[derive(Debug)]
pub struct Context {
    pub window: Arc<Window>,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub viewport: Viewport,
    pub projection: Projection,
    pub camera: CameraResources,
    pub controls: Option<OrbitControls>,
    pub layouts: Layouts,
    pub defaults: DefaultTextures,
    pub options: RendererOptions,
    pub spawner: Spawner,
    /// Raise to end the render loop before its next frame.
    pub stop: StopSignal,
}

impl Context {
    pub async fn new(window: Arc<Window>, spawner: Spawner) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let viewport = Viewport::from_physical(size, window.scale_factor());

        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no compatible GPU adapter")?;
        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to open the GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders output linear colour and rely on an sRGB surface for
        // the conversion.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("the surface supports no texture format")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let projection = Projection::new(viewport.width, viewport.height, Deg(75.0), 0.1, 100.0);
        let camera = CameraResources::new(&device, Camera::default());
        let layouts = Layouts::new(&device);
        let defaults = DefaultTextures::new(&device, &queue);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            viewport,
            projection,
            camera,
            controls: None,
            layouts,
            defaults,
            options: RendererOptions::default(),
            spawner,
            stop: StopSignal::new(),
        })
    }

    /// Replace the lens; the aspect always follows the viewport.
    pub fn set_projection(&mut self, fovy: Deg<f32>, znear: f32, zfar: f32) {
        self.projection = Projection::new(
            self.viewport.width,
            self.viewport.height,
            fovy,
            znear,
            zfar,
        );
        if let Some(controls) = &mut self.controls {
            controls.set_projection(&self.projection);
        }
    }

    /// Attach orbit controls around `target`.
    pub fn enable_orbit_controls(&mut self, controls: OrbitControls) {
        let mut controls = controls;
        controls.set_viewport(&self.viewport);
        controls.set_projection(&self.projection);
        self.camera.camera.look_at(controls.target);
        self.controls = Some(controls);
    }

    pub fn texture_loader(&self) -> TextureLoader {
        TextureLoader::new(self.spawner.clone())
    }

    /// Apply a size notification from the host: viewport, camera aspect,
    /// projection matrix, pixel ratio and the surface. Returns `false` if
    /// nothing changed or the window is minimised.
    pub fn resize(&mut self, physical: winit::dpi::PhysicalSize<u32>, scale_factor: f64) -> bool {
        self.viewport.max_pixel_ratio = self.options.max_pixel_ratio;
        let Some(viewport_changed) = self.viewport.resize_physical(physical, scale_factor) else {
            return false;
        };
        let surface_changed =
            self.config.width != physical.width || self.config.height != physical.height;
        if !viewport_changed && !surface_changed {
            return false;
        }
        self.projection.set_viewport(&self.viewport);
        if let Some(controls) = &mut self.controls {
            controls.set_viewport(&self.viewport);
        }
        self.config.width = physical.width;
        self.config.height = physical.height;
        self.surface.configure(&self.device, &self.config);
        log::debug!(
            "Resized to {}x{} at pixel ratio {}",
            self.viewport.width,
            self.viewport.height,
            self.viewport.pixel_ratio()
        );
        true
    }

    /// Configure the surface again with the current size, after it was lost
    /// or became outdated.
    pub fn reconfigure(&mut self) {
        let size = self.window.inner_size();
        if size.width > 0 && size.height > 0 {
            self.config.width = size.width;
            self.config.height = size.height;
        }
        self.surface.configure(&self.device, &self.config);
    }

    /// Write the camera uniform for the coming frame.
    pub fn write_camera(&mut self) {
        self.camera
            .write_to_buffer(&self.queue, &self.projection, &self.viewport);
    }
}
