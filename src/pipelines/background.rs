use crate::{
    data_structures::texture::Texture,
    pipelines::basic::{Depth, Primitive, mk_pipeline_layout, mk_render_pipeline},
};

/// An unfiltered equirectangular texture read with `textureLoad`, so HDR
/// float formats work without filtering support.
pub fn mk_equirect_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("equirect_bind_group_layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2,
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
            },
            count: None,
        }],
    })
}

pub fn mk_equirect_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::TextureView(&texture.view),
        }],
        label: Some("background_bind_group"),
    })
}

/// Fullscreen pass drawn first; it never writes depth.
pub fn mk_background_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    camera_layout: &wgpu::BindGroupLayout,
    equirect_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = mk_pipeline_layout(
        device,
        &[camera_layout, equirect_layout],
        "Background Pipeline Layout",
    );
    let depth = Depth {
        compare: wgpu::CompareFunction::Always,
        ..Depth::new(Texture::DEPTH_FORMAT).read_only()
    };
    mk_render_pipeline(
        device,
        &layout,
        Some(color_format),
        Some(wgpu::BlendState::REPLACE),
        Some(depth),
        Primitive {
            cull_mode: None,
            ..Default::default()
        },
        &[],
        wgpu::ShaderModuleDescriptor {
            label: Some("Background Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("background.wgsl").into()),
        },
        "Background Pipeline",
    )
}
