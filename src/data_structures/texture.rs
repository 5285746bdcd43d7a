//! GPU textures and texture creation utilities.
//!
//! This module provides [`Texture`], a wrapper around WGPU GPU texture resources,
//! the sampling configuration [`TextureOptions`] a texture is uploaded with, and
//! helpers for depth targets, shadow maps, placeholders and mipmap generation.

use image::{Rgba32FImage, RgbaImage, imageops::FilterType};

/// How texture coordinates outside `[0, 1]` are resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Wrapping {
    #[default]
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

impl From<Wrapping> for wgpu::AddressMode {
    fn from(value: Wrapping) -> Self {
        match value {
            Wrapping::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            Wrapping::Repeat => wgpu::AddressMode::Repeat,
            Wrapping::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
        }
    }
}

/// Magnification filter, used when a texel covers more than one pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MagFilter {
    Nearest,
    #[default]
    Linear,
}

impl From<MagFilter> for wgpu::FilterMode {
    fn from(value: MagFilter) -> Self {
        match value {
            MagFilter::Nearest => wgpu::FilterMode::Nearest,
            MagFilter::Linear => wgpu::FilterMode::Linear,
        }
    }
}

/// Minification filter. The `*Mipmap*` variants name the filter within a
/// level first and the filter between levels second.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MinFilter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapNearest,
    #[default]
    LinearMipmapLinear,
}

impl MinFilter {
    /// Whether sampling reads levels other than the base level.
    pub fn uses_mipmaps(self) -> bool {
        !matches!(self, MinFilter::Nearest | MinFilter::Linear)
    }

    /// `(min_filter, mipmap_filter)` for the sampler descriptor.
    pub fn filters(self) -> (wgpu::FilterMode, wgpu::MipmapFilterMode) {
        use wgpu::{FilterMode, MipmapFilterMode};
        match self {
            MinFilter::Nearest | MinFilter::NearestMipmapNearest => {
                (FilterMode::Nearest, MipmapFilterMode::Nearest)
            }
            MinFilter::Linear | MinFilter::LinearMipmapNearest => {
                (FilterMode::Linear, MipmapFilterMode::Nearest)
            }
            MinFilter::NearestMipmapLinear => (FilterMode::Nearest, MipmapFilterMode::Linear),
            MinFilter::LinearMipmapLinear => (FilterMode::Linear, MipmapFilterMode::Linear),
        }
    }
}

/// Colour space the texel data is encoded in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorSpace {
    /// Colour images authored for display. Decoded to linear on sampling.
    Srgb,
    /// Data textures (normals, roughness, alpha, ...).
    #[default]
    Linear,
}

/// Sampling configuration of a texture.
///
/// Combinations are not validated: a mipmapped min filter on a texture
/// without generated mipmaps simply samples the single base level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureOptions {
    pub wrap_u: Wrapping,
    pub wrap_v: Wrapping,
    pub mag_filter: MagFilter,
    pub min_filter: MinFilter,
    pub generate_mipmaps: bool,
    pub color_space: ColorSpace,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            wrap_u: Wrapping::ClampToEdge,
            wrap_v: Wrapping::ClampToEdge,
            mag_filter: MagFilter::Linear,
            min_filter: MinFilter::LinearMipmapLinear,
            generate_mipmaps: true,
            color_space: ColorSpace::Linear,
        }
    }
}

impl TextureOptions {
    pub fn srgb() -> Self {
        Self {
            color_space: ColorSpace::Srgb,
            ..Default::default()
        }
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        match self.color_space {
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
        }
    }

    pub fn sampler_descriptor(&self) -> wgpu::SamplerDescriptor<'static> {
        let (min_filter, mipmap_filter) = self.min_filter.filters();
        wgpu::SamplerDescriptor {
            label: Some("texture sampler"),
            address_mode_u: self.wrap_u.into(),
            address_mode_v: self.wrap_v.into(),
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: self.mag_filter.into(),
            min_filter,
            mipmap_filter,
            lod_min_clamp: 0.0,
            // pin non-mipmapped filters to the base level
            lod_max_clamp: if self.min_filter.uses_mipmaps() { 32.0 } else { 0.0 },
            ..Default::default()
        }
    }
}

/// Number of levels in a full mip chain for the given base size.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Base level followed by successively halved levels down to 1x1. Returns
/// only the base level when `generate` is false.
pub fn mip_chain(base: &RgbaImage, generate: bool) -> Vec<RgbaImage> {
    let mut levels = vec![base.clone()];
    if !generate {
        return levels;
    }
    let count = mip_level_count(base.width(), base.height());
    for level in 1..count {
        let width = (base.width() >> level).max(1);
        let height = (base.height() >> level).max(1);
        let previous = &levels[level as usize - 1];
        let next = image::imageops::resize(previous, width, height, FilterType::Triangle);
        levels.push(next);
    }
    levels
}

/// A GPU texture with a view and optional sampler.
///
/// Wraps WGPU texture objects along with associated views and samplers.
/// Textures are used for color maps, normal maps, depth, and other data
/// bound to shaders.
#[derive(Clone, Debug)]
pub struct Texture {
    #[allow(unused)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: Option<wgpu::Sampler>,
}

impl Texture {
    /// Standard depth buffer texture format (32-bit float).
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
    pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

    /// Create a depth texture for depth-testing during rendering.
    ///
    /// The sampler is a comparison sampler, so the same texture doubles as a
    /// shadow map when rendered from a light.
    ///
    /// # Arguments
    ///
    /// * `size` is [width, height] of the texture in pixels
    /// * `label` is used as a debug label for the GPU resource
    pub fn create_depth_texture(device: &wgpu::Device, size: [u32; 2], label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let desc = wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        };
        let texture = device.create_texture(&desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Some(device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow comparison sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        }));

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Offscreen colour target the scene is drawn into when the drawing
    /// buffer does not match the surface size.
    pub fn create_render_target(
        device: &wgpu::Device,
        size: (u32, u32),
        format: wgpu::TextureFormat,
        label: &str,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.0.max(1),
                height: size.1.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Some(create_default_sampler(device));
        Self {
            texture,
            view,
            sampler,
        }
    }

    /// 1x1 texture of a single colour. Stands in for maps that are not set or
    /// not loaded yet, so the shaders never need a different layout.
    pub fn solid(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: [u8; 4],
        format: wgpu::TextureFormat,
        label: &str,
    ) -> Texture {
        let image = RgbaImage::from_pixel(1, 1, image::Rgba(rgba));
        let texture = create_texture(device, (1, 1), 1, format, label);
        write_level(queue, &texture, 0, &image);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Texture {
            texture,
            view,
            sampler: Some(create_default_sampler(device)),
        }
    }

    /// Create a default normal map (neutral blue, representing no deformation).
    pub fn create_default_normal_map(device: &wgpu::Device, queue: &wgpu::Queue) -> Texture {
        // The blue/purple-ish colour that represents the default for normal maps
        Self::solid(
            device,
            queue,
            [127, 127, 255, 255],
            wgpu::TextureFormat::Rgba8Unorm,
            "default normal map",
        )
    }

    /// Upload an 8-bit image with the given sampling options, generating the
    /// mip chain on the CPU when requested.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &RgbaImage,
        options: &TextureOptions,
        label: &str,
    ) -> Self {
        let levels = mip_chain(img, options.generate_mipmaps);
        let texture = create_texture(
            device,
            img.dimensions(),
            levels.len() as u32,
            options.format(),
            label,
        );
        for (level, data) in levels.iter().enumerate() {
            write_level(queue, &texture, level as u32, data);
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Some(device.create_sampler(&options.sampler_descriptor()));
        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Upload a floating point image (equirectangular environment maps).
    /// Float32 textures are not filterable everywhere, so the sampler is a
    /// nearest one.
    pub fn from_hdr(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &Rgba32FImage,
        label: &str,
    ) -> Self {
        let (width, height) = img.dimensions();
        let texture = create_texture(device, (width, height), 1, Self::HDR_FORMAT, label);
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            bytemuck::cast_slice(img.as_raw()),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(16 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            sampler: Some(create_non_filtering_sampler(device)),
        }
    }

    /// Black environment used while no environment map is bound.
    pub fn empty_environment(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_hdr(
            device,
            queue,
            &Rgba32FImage::from_pixel(1, 1, image::Rgba([0.0, 0.0, 0.0, 1.0])),
            "empty environment",
        )
    }
}

fn create_texture(
    device: &wgpu::Device,
    (width, height): (u32, u32),
    mip_level_count: u32,
    format: wgpu::TextureFormat,
    label: &str,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    })
}

fn write_level(queue: &wgpu::Queue, texture: &wgpu::Texture, level: u32, data: &RgbaImage) {
    let (width, height) = data.dimensions();
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture,
            mip_level: level,
            origin: wgpu::Origin3d::ZERO,
        },
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

pub fn create_default_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::MipmapFilterMode::Linear,
        ..Default::default()
    })
}

pub fn create_non_filtering_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("non-filtering sampler"),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    })
}

/// Placeholders bound wherever a map is unset or still loading.
#[derive(Clone, Debug)]
pub struct DefaultTextures {
    pub white: Texture,
    pub normal: Texture,
    pub environment: Texture,
    pub sampler: wgpu::Sampler,
}

impl DefaultTextures {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            white: Texture::solid(
                device,
                queue,
                [255, 255, 255, 255],
                wgpu::TextureFormat::Rgba8Unorm,
                "default white",
            ),
            normal: Texture::create_default_normal_map(device, queue),
            environment: Texture::empty_environment(device, queue),
            sampler: create_default_sampler(device),
        }
    }
}
