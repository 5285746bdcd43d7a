//! Render pipelines and the bind group layouts only they use.

pub mod background;
pub mod basic;
pub mod blit;
pub mod lines;
pub mod points;
pub mod shadow;
pub mod standard;

use crate::context::Layouts;

/// Every pipeline the renderer needs, built once for a color format.
pub struct Pipelines {
    pub standard: standard::StandardPipelines,
    pub points: points::PointsPipelines,
    pub lines: wgpu::RenderPipeline,
    pub shadow: wgpu::RenderPipeline,
    pub background: wgpu::RenderPipeline,
    pub blit: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, layouts: &Layouts) -> Self {
        Self {
            standard: standard::StandardPipelines::new(
                device,
                format,
                &layouts.camera,
                &layouts.environment,
                &layouts.material,
            ),
            points: points::PointsPipelines::new(device, format, &layouts.camera, &layouts.points),
            lines: lines::mk_lines_pipeline(device, format, &layouts.camera),
            shadow: shadow::mk_shadow_pipeline(device, &layouts.camera),
            background: background::mk_background_pipeline(
                device,
                format,
                &layouts.camera,
                &layouts.equirect,
            ),
            blit: blit::mk_blit_pipeline(device, format, &layouts.blit),
        }
    }
}
