use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::{LineVertex, Vertex},
        texture::Texture,
    },
    pipelines::basic::{Depth, Primitive, mk_pipeline_layout, mk_render_pipeline},
};

pub fn mk_lines_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    camera_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = mk_pipeline_layout(device, &[camera_layout], "Lines Pipeline Layout");
    mk_render_pipeline(
        device,
        &layout,
        Some(color_format),
        Some(wgpu::BlendState::REPLACE),
        Some(Depth::new(Texture::DEPTH_FORMAT)),
        Primitive {
            topology: wgpu::PrimitiveTopology::LineList,
            cull_mode: None,
        },
        &[LineVertex::desc(), InstanceRaw::desc()],
        wgpu::ShaderModuleDescriptor {
            label: Some("Lines Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("lines.wgsl").into()),
        },
        "Lines Pipeline",
    )
}
