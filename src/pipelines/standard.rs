//! Mesh pipelines for [`crate::data_structures::material::Material`]s.
//!
//! One shader covers the basic, standard and physical shading models; the
//! model is picked per material through its uniform. Three variants differ in
//! blending and depth writes.

use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::{ModelVertex, Vertex},
        texture::Texture,
    },
    pipelines::basic::{Depth, Primitive, mk_pipeline_layout, mk_render_pipeline},
};

pub struct StandardPipelines {
    pub opaque: wgpu::RenderPipeline,
    pub transparent: wgpu::RenderPipeline,
    /// Transparent materials with `depth_write` disabled.
    pub transparent_no_depth_write: wgpu::RenderPipeline,
}

impl StandardPipelines {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        camera_layout: &wgpu::BindGroupLayout,
        environment_layout: &wgpu::BindGroupLayout,
        material_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let layout = mk_pipeline_layout(
            device,
            &[camera_layout, environment_layout, material_layout],
            "Standard Pipeline Layout",
        );
        let mk = |blend: wgpu::BlendState, depth: Depth, label: &str| {
            mk_render_pipeline(
                device,
                &layout,
                Some(color_format),
                Some(blend),
                Some(depth),
                Primitive::default(),
                &[ModelVertex::desc(), InstanceRaw::desc()],
                wgpu::ShaderModuleDescriptor {
                    label: Some("Standard Shader"),
                    source: wgpu::ShaderSource::Wgsl(include_str!("standard.wgsl").into()),
                },
                label,
            )
        };
        let depth = Depth::new(Texture::DEPTH_FORMAT);
        Self {
            opaque: mk(wgpu::BlendState::REPLACE, depth, "Opaque Pipeline"),
            transparent: mk(
                wgpu::BlendState::ALPHA_BLENDING,
                depth,
                "Transparent Pipeline",
            ),
            transparent_no_depth_write: mk(
                wgpu::BlendState::ALPHA_BLENDING,
                depth.read_only(),
                "Transparent Read Only Depth Pipeline",
            ),
        }
    }

    pub fn select(&self, transparent: bool, depth_write: bool) -> &wgpu::RenderPipeline {
        match (transparent, depth_write) {
            (false, _) => &self.opaque,
            (true, true) => &self.transparent,
            (true, false) => &self.transparent_no_depth_write,
        }
    }
}

/// Per frame lighting state shared by every lit mesh: lights uniform, the
/// shadow map with its comparison sampler, the environment map and its sampler.
pub fn mk_environment_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("environment_bind_group_layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Depth,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 3,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 4,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                count: None,
            },
        ],
    })
}
