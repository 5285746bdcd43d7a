//! Materials: named shading parameters plus the textures they sample.
//!
//! A [`Material`] is independent of any geometry and is usually shared
//! between meshes through [`SharedMaterial`]. Its GPU side (uniform buffer and
//! bind group) is built lazily by [`Material::prepare`] and rebuilt only when a
//! bound texture changes, e.g. because it finished loading.

use std::{cell::RefCell, rc::Rc};

use cgmath::Matrix4;
use wgpu::util::DeviceExt;

use crate::{
    color::Color,
    data_structures::texture::{DefaultTextures, Texture},
    resources::loader::TextureHandle,
};

/// Lighting model a material is shaded with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Shading {
    /// Unlit: colour times map.
    Basic,
    /// Metallic/roughness PBR.
    #[default]
    Standard,
    /// Standard plus clearcoat and iridescence.
    Physical,
}

impl Shading {
    fn id(self) -> f32 {
        match self {
            Shading::Basic => 0.0,
            Shading::Standard => 1.0,
            Shading::Physical => 2.0,
        }
    }
}

/// Texture slots of a material.
#[derive(Clone, Debug, Default)]
pub struct MaterialMaps {
    pub map: Option<TextureHandle>,
    pub alpha_map: Option<TextureHandle>,
    pub ao_map: Option<TextureHandle>,
    pub metalness_map: Option<TextureHandle>,
    pub roughness_map: Option<TextureHandle>,
    pub normal_map: Option<TextureHandle>,
}

impl MaterialMaps {
    fn slots(&self) -> [&Option<TextureHandle>; 6] {
        [
            &self.map,
            &self.alpha_map,
            &self.ao_map,
            &self.metalness_map,
            &self.roughness_map,
            &self.normal_map,
        ]
    }
}

pub const FLAG_MAP: u32 = 1 << 0;
pub const FLAG_ALPHA_MAP: u32 = 1 << 1;
pub const FLAG_AO_MAP: u32 = 1 << 2;
pub const FLAG_METALNESS_MAP: u32 = 1 << 3;
pub const FLAG_ROUGHNESS_MAP: u32 = 1 << 4;
pub const FLAG_NORMAL_MAP: u32 = 1 << 5;

const SLOT_FLAGS: [u32; 6] = [
    FLAG_MAP,
    FLAG_ALPHA_MAP,
    FLAG_AO_MAP,
    FLAG_METALNESS_MAP,
    FLAG_ROUGHNESS_MAP,
    FLAG_NORMAL_MAP,
];

#[derive(Clone, Debug)]
pub struct MaterialParams {
    pub shading: Shading,
    pub color: Color,
    pub opacity: f32,
    pub transparent: bool,
    pub depth_write: bool,
    pub metalness: f32,
    pub roughness: f32,
    pub ao_map_intensity: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub iridescence: f32,
    pub iridescence_ior: f32,
    /// Thin film thickness in nanometres, `[min, max]`.
    pub iridescence_thickness_range: [f32; 2],
    /// Scales the contribution of the scene environment map.
    pub env_map_intensity: f32,
    pub maps: MaterialMaps,
}

impl MaterialParams {
    pub fn basic() -> Self {
        Self {
            shading: Shading::Basic,
            ..Self::standard()
        }
    }

    pub fn standard() -> Self {
        Self {
            shading: Shading::Standard,
            color: Color::WHITE,
            opacity: 1.0,
            transparent: false,
            depth_write: true,
            metalness: 0.0,
            roughness: 1.0,
            ao_map_intensity: 1.0,
            clearcoat: 0.0,
            clearcoat_roughness: 0.0,
            iridescence: 0.0,
            iridescence_ior: 1.3,
            iridescence_thickness_range: [100.0, 400.0],
            env_map_intensity: 1.0,
            maps: MaterialMaps::default(),
        }
    }

    pub fn physical() -> Self {
        Self {
            shading: Shading::Physical,
            ..Self::standard()
        }
    }

    pub fn with_color(mut self, color: impl Into<Color>) -> Self {
        self.color = color.into();
        self
    }
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self::standard()
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    color: [f32; 4],
    // metalness, roughness, ao intensity, shading model
    pbr: [f32; 4],
    // clearcoat, clearcoat roughness, iridescence, iridescence ior
    coat: [f32; 4],
    // thickness min, thickness max, env intensity, unused
    film: [f32; 4],
    flags: u32,
    _padding: [u32; 3],
}

impl MaterialUniform {
    pub fn new(params: &MaterialParams, flags: u32) -> Self {
        let c = params.color;
        Self {
            color: [c.r, c.g, c.b, params.opacity],
            pbr: [
                params.metalness,
                params.roughness,
                params.ao_map_intensity,
                params.shading.id(),
            ],
            coat: [
                params.clearcoat,
                params.clearcoat_roughness,
                params.iridescence,
                params.iridescence_ior,
            ],
            film: [
                params.iridescence_thickness_range[0],
                params.iridescence_thickness_range[1],
                params.env_map_intensity,
                0.0,
            ],
            flags,
            _padding: [0; 3],
        }
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }
}

/// Bind group layout of [`Material`]: the uniform at 0 followed by a
/// texture/sampler pair per map slot (map, alpha, ao, metalness, roughness,
/// normal).
pub fn mk_material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let mut entries = vec![wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }];
    for slot in 0..6 {
        entries.extend(texture_entries(1 + slot * 2));
    }
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("material_bind_group_layout"),
        entries: &entries,
    })
}

fn texture_entries(binding: u32) -> [wgpu::BindGroupLayoutEntry; 2] {
    [
        wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2,
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
            },
            count: None,
        },
        wgpu::BindGroupLayoutEntry {
            binding: binding + 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        },
    ]
}

/// What a map slot resolved to this frame.
fn resolve(
    handle: &Option<TextureHandle>,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> Option<(u64, Texture)> {
    let handle = handle.as_ref()?;
    // float textures are not filterable and only valid as environment maps
    if handle.is_hdr() {
        return None;
    }
    let texture = handle.gpu_texture(device, queue)?;
    Some((handle.version(), texture))
}

#[derive(Debug)]
struct MaterialGpu {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    uniform: MaterialUniform,
    texture_keys: [Option<u64>; 6],
}

#[derive(Debug)]
pub struct Material {
    pub params: MaterialParams,
    gpu: Option<MaterialGpu>,
}

pub type SharedMaterial = Rc<RefCell<Material>>;

impl Material {
    pub fn new(params: MaterialParams) -> Self {
        Self { params, gpu: None }
    }

    pub fn shared(params: MaterialParams) -> SharedMaterial {
        Rc::new(RefCell::new(Self::new(params)))
    }

    pub fn is_transparent(&self) -> bool {
        self.params.transparent
    }

    /// Upload parameters and (re)build the bind group if anything changed
    /// since the last call.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        defaults: &DefaultTextures,
    ) -> wgpu::BindGroup {
        let resolved: Vec<Option<(u64, Texture)>> = self
            .params
            .maps
            .slots()
            .iter()
            .map(|handle| resolve(handle, device, queue))
            .collect();
        let mut texture_keys = [None; 6];
        let mut flags = 0;
        for (slot, entry) in resolved.iter().enumerate() {
            if let Some((version, _)) = entry {
                texture_keys[slot] = Some(*version);
                flags |= SLOT_FLAGS[slot];
            }
        }
        let uniform = MaterialUniform::new(&self.params, flags);

        match &mut self.gpu {
            Some(gpu) if gpu.texture_keys == texture_keys => {
                if gpu.uniform != uniform {
                    queue.write_buffer(&gpu.buffer, 0, bytemuck::cast_slice(&[uniform]));
                    gpu.uniform = uniform;
                }
                gpu.bind_group.clone()
            }
            _ => {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Material Buffer"),
                    contents: bytemuck::cast_slice(&[uniform]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                let textures: Vec<&Texture> = resolved
                    .iter()
                    .enumerate()
                    .map(|(slot, entry)| match entry {
                        Some((_, texture)) => texture,
                        None if SLOT_FLAGS[slot] == FLAG_NORMAL_MAP => &defaults.normal,
                        None => &defaults.white,
                    })
                    .collect();
                let bind_group = texture_bind_group(
                    device,
                    layout,
                    &buffer,
                    &textures,
                    &defaults.sampler,
                    "material_bind_group",
                );
                self.gpu = Some(MaterialGpu {
                    buffer,
                    bind_group: bind_group.clone(),
                    uniform,
                    texture_keys,
                });
                bind_group
            }
        }
    }
}

fn texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    textures: &[&Texture],
    fallback_sampler: &wgpu::Sampler,
    label: &str,
) -> wgpu::BindGroup {
    let mut entries = vec![wgpu::BindGroupEntry {
        binding: 0,
        resource: buffer.as_entire_binding(),
    }];
    for (slot, texture) in textures.iter().enumerate() {
        let binding = 1 + slot as u32 * 2;
        let sampler = texture.sampler.as_ref().unwrap_or(fallback_sampler);
        entries.push(wgpu::BindGroupEntry {
            binding,
            resource: wgpu::BindingResource::TextureView(&texture.view),
        });
        entries.push(wgpu::BindGroupEntry {
            binding: binding + 1,
            resource: wgpu::BindingResource::Sampler(sampler),
        });
    }
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &entries,
        label: Some(label),
    })
}

/// Material of a point cloud. Each point is drawn as a camera facing square.
#[derive(Clone, Debug)]
pub struct PointsMaterial {
    /// Point size; world units with attenuation, otherwise pixels.
    pub size: f32,
    pub size_attenuation: bool,
    pub color: Color,
    pub opacity: f32,
    pub map: Option<TextureHandle>,
    pub alpha_map: Option<TextureHandle>,
    pub transparent: bool,
    pub depth_write: bool,
}

impl Default for PointsMaterial {
    fn default() -> Self {
        Self {
            size: 1.0,
            size_attenuation: true,
            color: Color::WHITE,
            opacity: 1.0,
            map: None,
            alpha_map: None,
            transparent: false,
            depth_write: true,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointsUniform {
    model: [[f32; 4]; 4],
    color: [f32; 4],
    // size, attenuation, map flag, alpha map flag
    params: [f32; 4],
}

impl PointsUniform {
    pub fn new(material: &PointsMaterial, world: &Matrix4<f32>, map: bool, alpha: bool) -> Self {
        let c = material.color;
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        Self {
            model: (*world).into(),
            color: [c.r, c.g, c.b, material.opacity],
            params: [
                material.size,
                flag(material.size_attenuation),
                flag(map),
                flag(alpha),
            ],
        }
    }
}

/// Bind group layout of [`PointsMaterial`]: uniform, map pair, alpha map pair.
pub fn mk_points_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let mut entries = vec![wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }];
    entries.extend(texture_entries(1));
    entries.extend(texture_entries(3));
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("points_bind_group_layout"),
        entries: &entries,
    })
}

/// GPU state of a [`PointsMaterial`] owned by one point cloud.
#[derive(Debug)]
pub struct PointsGpu {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    texture_keys: [Option<u64>; 2],
}

impl PointsMaterial {
    pub fn prepare(
        &self,
        gpu: &mut Option<PointsGpu>,
        world: &Matrix4<f32>,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        defaults: &DefaultTextures,
    ) -> wgpu::BindGroup {
        let map = resolve(&self.map, device, queue);
        let alpha = resolve(&self.alpha_map, device, queue);
        let texture_keys = [
            map.as_ref().map(|(v, _)| *v),
            alpha.as_ref().map(|(v, _)| *v),
        ];
        let uniform = PointsUniform::new(self, world, map.is_some(), alpha.is_some());

        match gpu {
            Some(gpu) if gpu.texture_keys == texture_keys => {
                queue.write_buffer(&gpu.buffer, 0, bytemuck::cast_slice(&[uniform]));
                gpu.bind_group.clone()
            }
            _ => {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Points Buffer"),
                    contents: bytemuck::cast_slice(&[uniform]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                let textures = [
                    map.as_ref().map_or(&defaults.white, |(_, t)| t),
                    alpha.as_ref().map_or(&defaults.white, |(_, t)| t),
                ];
                let bind_group = texture_bind_group(
                    device,
                    layout,
                    &buffer,
                    &textures,
                    &defaults.sampler,
                    "points_bind_group",
                );
                *gpu = Some(PointsGpu {
                    buffer,
                    bind_group: bind_group.clone(),
                    texture_keys,
                });
                bind_group
            }
        }
    }
}
