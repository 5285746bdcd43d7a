//! Render composition and the frame renderer.
//!
//! Scene nodes describe what they want drawn with a [`Render`]. The
//! [`Renderer`] flattens the scene's renders into batches per pipeline and
//! records one frame:
//!
//! 1. a depth only pass from the shadow casting light, if any
//! 2. the main pass: background, opaque meshes, transparent meshes sorted
//!    back to front, point clouds and helper lines
//! 3. a blit onto the surface when the drawing buffer has another size
//!
//! # Key types
//!
//! - [`Render<'a>`] is the enum scene nodes hand to the renderer
//! - [`Instanced<'a>`] is a mesh with its instance buffer and material
//! - [`Points<'a>`] and [`Lines<'a>`] are point clouds and helper lines

use std::iter;

use cgmath::{InnerSpace, Matrix4, Point3};
use wgpu::util::DeviceExt;

use crate::{
    camera::CameraUniform,
    context::Context,
    data_structures::{
        light::LightsUniform,
        model::{DrawModel, Mesh},
        scene_graph::{Scene, SceneNode},
        texture::{self, Texture},
    },
    pipelines::{
        Pipelines, background::mk_equirect_bind_group, blit::mk_blit_bind_group,
        shadow::SHADOW_MAP_SIZE,
    },
    resources::loader::TextureHandle,
};

/// A mesh drawn `amount` times from its instance buffer.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub mesh: &'a Mesh,
    pub material: &'a wgpu::BindGroup,
    pub amount: u32,
    pub depth_write: bool,
    pub cast_shadow: bool,
    /// Used to sort transparent draws.
    pub world_position: Point3<f32>,
}

/// A point cloud, one billboard per vertex.
pub struct Points<'a> {
    pub vertex: &'a wgpu::Buffer,
    pub group: &'a wgpu::BindGroup,
    pub amount: u32,
    pub depth_write: bool,
}

/// A line list with its model matrix as a single instance.
pub struct Lines<'a> {
    pub vertex: &'a wgpu::Buffer,
    pub instance: &'a wgpu::Buffer,
    pub amount: u32,
}

/// Specifies how a scene object should be rendered.
///
/// - `None` renders nothing
/// - `Opaque(Instanced)` renders a mesh with depth writes and no blending
/// - `Transparent(Instanced)` renders a blended mesh after all opaque ones
/// - `Points(Points)` renders a point cloud
/// - `Lines(Lines)` renders helper lines
/// - `Composed(Vec<Render>)` recursively renders a composition of renders
pub enum Render<'a> {
    None,
    Opaque(Instanced<'a>),
    Transparent(Instanced<'a>),
    Points(Points<'a>),
    Lines(Lines<'a>),
    Composed(Vec<Render<'a>>),
}

/// Draws grouped by the pipeline they need.
#[derive(Default)]
pub struct Batches<'a> {
    pub opaque: Vec<Instanced<'a>>,
    pub transparent: Vec<Instanced<'a>>,
    pub points: Vec<Points<'a>>,
    pub lines: Vec<Lines<'a>>,
}

impl<'a> Render<'a> {
    pub(crate) fn set_pipelines(self, batches: &mut Batches<'a>) {
        match self {
            Render::Opaque(instanced) => batches.opaque.push(instanced),
            Render::Transparent(instanced) => batches.transparent.push(instanced),
            Render::Points(points) => batches.points.push(points),
            Render::Lines(lines) => batches.lines.push(lines),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(batches)),
            Render::None => (),
        }
    }
}

impl<'a> From<Render<'a>> for Batches<'a> {
    fn from(render: Render<'a>) -> Self {
        let mut batches = Batches::default();
        render.set_pipelines(&mut batches);
        batches
    }
}

/// Indices of `positions` ordered from farthest to nearest to `eye`.
pub fn back_to_front(positions: &[Point3<f32>], eye: Point3<f32>) -> Vec<usize> {
    let distances: Vec<f32> = positions
        .iter()
        .map(|p| (p - eye).magnitude2())
        .collect();
    let mut order: Vec<usize> = (0..positions.len()).collect();
    order.sort_by(|&a, &b| distances[b].total_cmp(&distances[a]));
    order
}

struct Offscreen {
    target: Texture,
    group: wgpu::BindGroup,
}

struct BoundTexture {
    handle: TextureHandle,
    version: u64,
}

impl BoundTexture {
    fn matches(bound: &Option<BoundTexture>, handle: Option<&TextureHandle>) -> bool {
        match (bound, handle) {
            (None, None) => true,
            (Some(bound), Some(handle)) => {
                bound.handle.ptr_eq(handle) && bound.version == handle.version()
            }
            _ => false,
        }
    }
}

/// Owns everything needed to draw a [`Scene`] besides the scene's own
/// buffers: pipelines, depth and shadow maps, lights and environment.
pub struct Renderer {
    pipelines: Pipelines,
    depth_texture: Texture,
    offscreen: Option<Offscreen>,
    shadow_map: Texture,
    shadow_camera_buffer: wgpu::Buffer,
    shadow_camera_group: wgpu::BindGroup,
    lights_buffer: wgpu::Buffer,
    environment_sampler: wgpu::Sampler,
    environment_group: wgpu::BindGroup,
    environment: Option<BoundTexture>,
    background: Option<(BoundTexture, wgpu::BindGroup)>,
}

impl Renderer {
    pub fn new(ctx: &Context) -> Self {
        let device = &ctx.device;
        let pipelines = Pipelines::new(device, ctx.config.format, &ctx.layouts);
        let (width, height) = ctx.viewport.drawing_buffer_size();
        let depth_texture = Texture::create_depth_texture(device, [width, height], "depth_texture");
        let shadow_map =
            Texture::create_depth_texture(device, [SHADOW_MAP_SIZE, SHADOW_MAP_SIZE], "shadow_map");

        let shadow_camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Shadow Camera Buffer"),
            contents: bytemuck::cast_slice(&[CameraUniform::new()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let shadow_camera_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &ctx.layouts.camera,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: shadow_camera_buffer.as_entire_binding(),
            }],
            label: Some("shadow_camera_bind_group"),
        });
        let lights_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Lights Buffer"),
            contents: bytemuck::cast_slice(&[LightsUniform::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let environment_sampler = texture::create_non_filtering_sampler(device);
        let environment_group = mk_environment_group(
            ctx,
            &lights_buffer,
            &shadow_map,
            &ctx.defaults.environment,
            &environment_sampler,
        );

        let mut renderer = Self {
            pipelines,
            depth_texture,
            offscreen: None,
            shadow_map,
            shadow_camera_buffer,
            shadow_camera_group,
            lights_buffer,
            environment_sampler,
            environment_group,
            environment: None,
            background: None,
        };
        renderer.resize(ctx);
        renderer
    }

    /// Recreate the size dependent targets after the viewport or the surface
    /// changed. Draws go to an offscreen buffer whenever the clamped drawing
    /// buffer differs from the surface.
    pub fn resize(&mut self, ctx: &Context) {
        let (width, height) = ctx.viewport.drawing_buffer_size();
        self.depth_texture =
            Texture::create_depth_texture(&ctx.device, [width, height], "depth_texture");
        self.offscreen = if (width, height) != (ctx.config.width, ctx.config.height) {
            log::debug!(
                "Drawing buffer {}x{} on a {}x{} surface",
                width,
                height,
                ctx.config.width,
                ctx.config.height
            );
            let target = Texture::create_render_target(
                &ctx.device,
                (width, height),
                ctx.config.format,
                "drawing_buffer",
            );
            let group =
                mk_blit_bind_group(&ctx.device, &ctx.layouts.blit, &target, &ctx.defaults.sampler);
            Some(Offscreen { target, group })
        } else {
            None
        };
    }

    /// Rebind the environment map when it changed. Returns whether a decoded
    /// environment is bound.
    fn bind_environment(&mut self, ctx: &Context, handle: Option<&TextureHandle>) -> bool {
        let uploaded = handle.and_then(|h| h.gpu_texture(&ctx.device, &ctx.queue).map(|t| (h, t)));
        let bound_handle = uploaded.as_ref().map(|(h, _)| *h);
        if !BoundTexture::matches(&self.environment, bound_handle) {
            let texture = uploaded
                .as_ref()
                .map_or(&ctx.defaults.environment, |(_, t)| t);
            self.environment_group = mk_environment_group(
                ctx,
                &self.lights_buffer,
                &self.shadow_map,
                texture,
                &self.environment_sampler,
            );
            self.environment = uploaded.as_ref().map(|(h, _)| BoundTexture {
                handle: (*h).clone(),
                version: h.version(),
            });
        }
        uploaded.is_some()
    }

    fn bind_background(&mut self, ctx: &Context, handle: Option<&TextureHandle>) {
        let uploaded = handle.and_then(|h| h.gpu_texture(&ctx.device, &ctx.queue).map(|t| (h, t)));
        let Some((handle, texture)) = uploaded else {
            self.background = None;
            return;
        };
        let current = self.background.take().filter(|(bound, _)| {
            bound.handle.ptr_eq(handle) && bound.version == handle.version()
        });
        self.background = Some(current.unwrap_or_else(|| {
            let group = mk_equirect_bind_group(&ctx.device, &ctx.layouts.equirect, &texture);
            (
                BoundTexture {
                    handle: handle.clone(),
                    version: handle.version(),
                },
                group,
            )
        }));
    }

    /// Draw one frame of `scene` from the context's camera. The camera
    /// uniform must be written before.
    pub fn render(&mut self, ctx: &Context, scene: &mut Scene) -> Result<(), wgpu::SurfaceError> {
        scene.update_world_transforms();
        scene.root.write_to_buffers(ctx);

        let has_environment = self.bind_environment(ctx, scene.environment.as_ref());
        self.bind_background(ctx, scene.background.as_ref());
        let lights = LightsUniform::pack(&scene.lights(), ctx.options.shadows, has_environment);
        ctx.queue
            .write_buffer(&self.lights_buffer, 0, bytemuck::cast_slice(&[lights]));
        if lights.has_shadow() {
            let uniform = CameraUniform::from_view_proj(Matrix4::from(lights.shadow_view_proj));
            ctx.queue.write_buffer(
                &self.shadow_camera_buffer,
                0,
                bytemuck::cast_slice(&[uniform]),
            );
        }

        let output = ctx.surface.get_current_texture()?;
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let scene = &*scene;
        let mut batches = Batches::from(scene.root.get_render());
        let eye = ctx.camera.camera.position;
        let positions: Vec<Point3<f32>> = batches
            .transparent
            .iter()
            .map(|instanced| instanced.world_position)
            .collect();
        let mut transparent: Vec<Option<Instanced>> =
            batches.transparent.drain(..).map(Some).collect();
        let transparent: Vec<Instanced> = back_to_front(&positions, eye)
            .into_iter()
            .filter_map(|idx| transparent[idx].take())
            .collect();

        if lights.has_shadow() {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                multiview_mask: None,
                timestamp_writes: None,
            });
            shadow_pass.set_pipeline(&self.pipelines.shadow);
            shadow_pass.set_bind_group(0, &self.shadow_camera_group, &[]);
            for instanced in batches
                .opaque
                .iter()
                .chain(transparent.iter())
                .filter(|instanced| instanced.cast_shadow)
            {
                shadow_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                shadow_pass.draw_mesh_instanced(instanced.mesh, 0..instanced.amount);
            }
        }

        let clear: wgpu::Color = scene
            .background_color
            .unwrap_or(ctx.options.clear_color)
            .into();
        {
            let target_view = match &self.offscreen {
                Some(offscreen) => &offscreen.target.view,
                None => &surface_view,
            };
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                multiview_mask: None,
                timestamp_writes: None,
            });
            render_pass.set_bind_group(0, &ctx.camera.bind_group, &[]);

            if let Some((_, group)) = &self.background {
                render_pass.set_pipeline(&self.pipelines.background);
                render_pass.set_bind_group(1, group, &[]);
                render_pass.draw(0..3, 0..1);
            }

            render_pass.set_bind_group(1, &self.environment_group, &[]);
            render_pass.set_pipeline(&self.pipelines.standard.opaque);
            for instanced in &batches.opaque {
                if instanced.amount == 0 {
                    log::warn!("you attemted to render something with zero instances");
                    continue;
                }
                render_pass.set_bind_group(2, instanced.material, &[]);
                render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                render_pass.draw_mesh_instanced(instanced.mesh, 0..instanced.amount);
            }

            for instanced in &transparent {
                render_pass.set_pipeline(
                    self.pipelines
                        .standard
                        .select(true, instanced.depth_write),
                );
                render_pass.set_bind_group(2, instanced.material, &[]);
                render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                render_pass.draw_mesh_instanced(instanced.mesh, 0..instanced.amount);
            }

            for points in &batches.points {
                render_pass.set_pipeline(self.pipelines.points.select(points.depth_write));
                render_pass.set_bind_group(1, points.group, &[]);
                render_pass.set_vertex_buffer(0, points.vertex.slice(..));
                render_pass.draw(0..6, 0..points.amount);
            }

            if !batches.lines.is_empty() {
                render_pass.set_pipeline(&self.pipelines.lines);
                for lines in &batches.lines {
                    render_pass.set_vertex_buffer(0, lines.vertex.slice(..));
                    render_pass.set_vertex_buffer(1, lines.instance.slice(..));
                    render_pass.draw(0..lines.amount, 0..1);
                }
            }
        }

        if let Some(offscreen) = &self.offscreen {
            let mut blit_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Blit Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                multiview_mask: None,
                timestamp_writes: None,
            });
            blit_pass.set_pipeline(&self.pipelines.blit);
            blit_pass.set_bind_group(0, &offscreen.group, &[]);
            blit_pass.draw(0..3, 0..1);
        }

        ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

fn mk_environment_group(
    ctx: &Context,
    lights_buffer: &wgpu::Buffer,
    shadow_map: &Texture,
    environment: &Texture,
    environment_sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    let shadow_sampler = shadow_map
        .sampler
        .as_ref()
        .unwrap_or(&ctx.defaults.sampler);
    ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: &ctx.layouts.environment,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: lights_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&shadow_map.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(shadow_sampler),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(&environment.view),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: wgpu::BindingResource::Sampler(environment_sampler),
            },
        ],
        label: Some("environment_bind_group"),
    })
}
