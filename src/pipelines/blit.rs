use crate::{
    data_structures::texture::Texture,
    pipelines::basic::{Primitive, mk_pipeline_layout, mk_render_pipeline},
};

pub fn mk_blit_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("blit_bind_group_layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

pub fn mk_blit_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    source: &Texture,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&source.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(source.sampler.as_ref().unwrap_or(sampler)),
            },
        ],
        label: Some("blit_bind_group"),
    })
}

/// Copies the offscreen drawing buffer onto a surface of another size.
pub fn mk_blit_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    blit_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = mk_pipeline_layout(device, &[blit_layout], "Blit Pipeline Layout");
    mk_render_pipeline(
        device,
        &layout,
        Some(surface_format),
        None,
        None,
        Primitive {
            cull_mode: None,
            ..Default::default()
        },
        &[],
        wgpu::ShaderModuleDescriptor {
            label: Some("Blit Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("blit.wgsl").into()),
        },
        "Blit Pipeline",
    )
}
