use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::{ModelVertex, Vertex},
        texture::Texture,
    },
    pipelines::basic::{Depth, Primitive, mk_pipeline_layout, mk_render_pipeline},
};

/// Side length of the square shadow map.
pub const SHADOW_MAP_SIZE: u32 = 2048;

/// Depth only pipeline rendering shadow casters from the light's camera.
/// The light camera uses the regular camera bind group layout.
pub fn mk_shadow_pipeline(
    device: &wgpu::Device,
    camera_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = mk_pipeline_layout(device, &[camera_layout], "Shadow Pipeline Layout");
    let depth = Depth {
        bias: wgpu::DepthBiasState {
            constant: 2,
            slope_scale: 2.0,
            clamp: 0.0,
        },
        ..Depth::new(Texture::DEPTH_FORMAT)
    };
    mk_render_pipeline(
        device,
        &layout,
        None,
        None,
        Some(depth),
        Primitive {
            cull_mode: None,
            ..Default::default()
        },
        &[ModelVertex::desc(), InstanceRaw::desc()],
        wgpu::ShaderModuleDescriptor {
            label: Some("Shadow Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shadow.wgsl").into()),
        },
        "Shadow Pipeline",
    )
}
