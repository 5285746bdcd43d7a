use crate::{
    data_structures::{
        model::{PointVertex, Vertex},
        texture::Texture,
    },
    pipelines::basic::{Depth, Primitive, mk_pipeline_layout, mk_render_pipeline},
};

pub struct PointsPipelines {
    pub depth_write: wgpu::RenderPipeline,
    pub no_depth_write: wgpu::RenderPipeline,
}

impl PointsPipelines {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        camera_layout: &wgpu::BindGroupLayout,
        points_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let layout = mk_pipeline_layout(
            device,
            &[camera_layout, points_layout],
            "Points Pipeline Layout",
        );
        let mk = |depth: Depth, label: &str| {
            mk_render_pipeline(
                device,
                &layout,
                Some(color_format),
                Some(wgpu::BlendState::ALPHA_BLENDING),
                Some(depth),
                Primitive {
                    cull_mode: None,
                    ..Default::default()
                },
                &[PointVertex::desc()],
                wgpu::ShaderModuleDescriptor {
                    label: Some("Points Shader"),
                    source: wgpu::ShaderSource::Wgsl(include_str!("points.wgsl").into()),
                },
                label,
            )
        };
        let depth = Depth::new(Texture::DEPTH_FORMAT);
        Self {
            depth_write: mk(depth, "Points Pipeline"),
            no_depth_write: mk(depth.read_only(), "Points Read Only Depth Pipeline"),
        }
    }

    pub fn select(&self, depth_write: bool) -> &wgpu::RenderPipeline {
        if depth_write {
            &self.depth_write
        } else {
            &self.no_depth_write
        }
    }
}
