//! Scene graph and hierarchical scene organization.
//!
//! Every node owns a local [`Transform`] and its children. Dropping a node
//! drops its whole subtree. Before each draw the renderer folds the local
//! transforms into world matrices ([`SceneNode::update_world_transforms`]),
//! lets every node upload what it needs ([`SceneNode::write_to_buffers`]) and
//! collects the draws ([`SceneNode::get_render`]) and lights
//! ([`SceneNode::collect_lights`]).

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, SquareMatrix, Vector3};
use wgpu::util::DeviceExt;

use crate::{
    color::Color,
    context::Context,
    data_structures::{
        geometry::Geometry,
        instance::{InstanceRaw, Transform},
        light::{Light, LightKind},
        material::{PointsGpu, PointsMaterial, SharedMaterial},
        model::{LineVertex, Mesh, PointVertex},
    },
    render::{Instanced, Lines, Points, Render},
    resources::loader::TextureHandle,
};

/// State every node carries: local transform, cached world matrix and the
/// owned children.
pub struct NodeBase {
    pub local: Transform,
    pub visible: bool,
    world: Matrix4<f32>,
    children: Vec<Box<dyn SceneNode>>,
}

impl NodeBase {
    pub fn new() -> Self {
        Self {
            local: Transform::new(),
            visible: true,
            world: Matrix4::identity(),
            children: Vec::new(),
        }
    }
}

impl Default for NodeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NodeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeBase")
            .field("local", &self.local)
            .field("visible", &self.visible)
            .field("children", &self.children.len())
            .finish()
    }
}

pub trait SceneNode {
    fn base(&self) -> &NodeBase;

    fn base_mut(&mut self) -> &mut NodeBase;

    /// Upload this node's own GPU data. Children are handled by
    /// [`Self::write_to_buffers`].
    fn write_own_buffers(&mut self, _ctx: &Context) {}

    /// This node's own draw, without children.
    fn own_render(&self) -> Render<'_> {
        Render::None
    }

    fn own_light(&self) -> Option<&Light> {
        None
    }

    fn local_transform(&self) -> &Transform {
        &self.base().local
    }

    fn local_transform_mut(&mut self) -> &mut Transform {
        &mut self.base_mut().local
    }

    /// World matrix as of the last [`Self::update_world_transforms`].
    fn world_matrix(&self) -> Matrix4<f32> {
        self.base().world
    }

    fn world_position(&self) -> Point3<f32> {
        Point3::from_vec(self.base().world.w.truncate())
    }

    /// Attach `child` and return its index among this node's children.
    fn add_child(&mut self, child: Box<dyn SceneNode>) -> usize {
        let children = &mut self.base_mut().children;
        children.push(child);
        children.len() - 1
    }

    fn children(&self) -> &[Box<dyn SceneNode>] {
        &self.base().children
    }

    fn children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.base_mut().children
    }

    /// World = parent * local, applied recursively.
    fn update_world_transforms(&mut self, parent: &Matrix4<f32>) {
        let base = self.base_mut();
        base.world = parent * base.local.to_matrix();
        let world = base.world;
        for child in base.children.iter_mut() {
            child.update_world_transforms(&world);
        }
    }

    fn write_to_buffers(&mut self, ctx: &Context) {
        self.write_own_buffers(ctx);
        for child in self.base_mut().children.iter_mut() {
            child.write_to_buffers(ctx);
        }
    }

    /// Draws of this subtree. Invisible nodes hide their children too.
    fn get_render(&self) -> Render<'_> {
        if !self.base().visible {
            return Render::None;
        }
        let mut renders = vec![self.own_render()];
        renders.extend(self.base().children.iter().map(|child| child.get_render()));
        Render::Composed(renders)
    }

    fn collect_lights(&self, out: &mut Vec<(Light, Matrix4<f32>)>) {
        if !self.base().visible {
            return;
        }
        if let Some(light) = self.own_light() {
            out.push((light.clone(), self.base().world));
        }
        for child in self.base().children.iter() {
            child.collect_lights(out);
        }
    }

    /// Builder shortcut to place a node before adding it to the scene.
    fn at(mut self, x: f32, y: f32, z: f32) -> Self
    where
        Self: Sized,
    {
        self.local_transform_mut().position = Vector3::new(x, y, z);
        self
    }
}

/// Node without own content, used to transform its children together.
#[derive(Debug, Default)]
pub struct Group {
    base: NodeBase,
}

impl Group {
    pub fn new() -> Self {
        Self {
            base: NodeBase::new(),
        }
    }
}

impl SceneNode for Group {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }
}

/// Geometry drawn with a (possibly shared) material.
pub struct MeshNode {
    base: NodeBase,
    mesh: Mesh,
    pub material: SharedMaterial,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    instance_buffer: wgpu::Buffer,
    material_group: Option<wgpu::BindGroup>,
    transparent: bool,
    depth_write: bool,
}

impl MeshNode {
    pub fn new(device: &wgpu::Device, geometry: &Geometry, material: SharedMaterial) -> Self {
        let raw = InstanceRaw::new(&Matrix4::identity(), false);
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Instance Buffer", geometry.name)),
            contents: bytemuck::cast_slice(&[raw]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            base: NodeBase::new(),
            mesh: Mesh::new(device, geometry),
            material,
            cast_shadow: false,
            receive_shadow: false,
            instance_buffer,
            material_group: None,
            transparent: false,
            depth_write: true,
        }
    }

    pub fn with_shadows(mut self, cast: bool, receive: bool) -> Self {
        self.cast_shadow = cast;
        self.receive_shadow = receive;
        self
    }
}

impl SceneNode for MeshNode {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn write_own_buffers(&mut self, ctx: &Context) {
        let raw = InstanceRaw::new(&self.base.world, self.receive_shadow);
        ctx.queue
            .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&[raw]));
        let mut material = self.material.borrow_mut();
        self.material_group = Some(material.prepare(
            &ctx.device,
            &ctx.queue,
            &ctx.layouts.material,
            &ctx.defaults,
        ));
        self.transparent = material.is_transparent();
        self.depth_write = material.params.depth_write;
    }

    fn own_render(&self) -> Render<'_> {
        let Some(material) = &self.material_group else {
            return Render::None;
        };
        let instanced = Instanced {
            instance: &self.instance_buffer,
            mesh: &self.mesh,
            material,
            amount: 1,
            depth_write: self.depth_write,
            cast_shadow: self.cast_shadow,
            world_position: self.world_position(),
        };
        if self.transparent {
            Render::Transparent(instanced)
        } else {
            Render::Opaque(instanced)
        }
    }
}

/// Point cloud: one camera facing sprite per position, no connectivity.
pub struct PointsNode {
    base: NodeBase,
    pub material: PointsMaterial,
    vertex_buffer: wgpu::Buffer,
    count: u32,
    gpu: Option<PointsGpu>,
    group: Option<wgpu::BindGroup>,
}

impl PointsNode {
    /// `positions` is a flat `[x0, y0, z0, x1, ...]` buffer; a trailing
    /// incomplete triple is ignored.
    pub fn new(device: &wgpu::Device, positions: &[f32], material: PointsMaterial) -> Self {
        let points: Vec<PointVertex> = positions
            .chunks_exact(3)
            .map(|p| PointVertex {
                position: [p[0], p[1], p[2]],
            })
            .collect();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Points Vertex Buffer"),
            // an empty buffer is not a valid binding
            contents: if points.is_empty() {
                bytemuck::cast_slice(&[0.0f32; 3])
            } else {
                bytemuck::cast_slice(&points)
            },
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            base: NodeBase::new(),
            material,
            vertex_buffer,
            count: points.len() as u32,
            gpu: None,
            group: None,
        }
    }

    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl SceneNode for PointsNode {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn write_own_buffers(&mut self, ctx: &Context) {
        self.group = Some(self.material.prepare(
            &mut self.gpu,
            &self.base.world,
            &ctx.device,
            &ctx.queue,
            &ctx.layouts.points,
            &ctx.defaults,
        ));
    }

    fn own_render(&self) -> Render<'_> {
        match &self.group {
            Some(group) if self.count > 0 => Render::Points(Points {
                vertex: &self.vertex_buffer,
                group,
                amount: self.count,
                depth_write: self.material.depth_write,
            }),
            _ => Render::None,
        }
    }
}

/// Coloured line segments, used for helpers.
pub struct LineNode {
    base: NodeBase,
    vertex_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    count: u32,
}

impl LineNode {
    /// `vertices` are consumed in pairs, one segment per pair.
    pub fn new(device: &wgpu::Device, vertices: &[LineVertex]) -> Self {
        let placeholder = [LineVertex {
            position: [0.0; 3],
            color: [0.0; 3],
        }];
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Line Vertex Buffer"),
            contents: bytemuck::cast_slice(if vertices.is_empty() {
                &placeholder[..]
            } else {
                vertices
            }),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Line Instance Buffer"),
            contents: bytemuck::cast_slice(&[InstanceRaw::new(&Matrix4::identity(), false)]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            base: NodeBase::new(),
            vertex_buffer,
            instance_buffer,
            count: (vertices.len() / 2 * 2) as u32,
        }
    }

    /// Red, green and blue lines along +X, +Y and +Z.
    pub fn axes_helper(device: &wgpu::Device, size: f32) -> Self {
        Self::new(device, &axes_vertices(size))
    }

    /// Outline of a spot light's cone. The light at `light_world` must be
    /// placed before calling this; the helper is drawn in world space.
    pub fn spot_light_helper(device: &wgpu::Device, light: &Light, light_world: &Matrix4<f32>) -> Self {
        Self::new(device, &spot_cone_vertices(light, light_world))
    }

    pub fn segment_count(&self) -> u32 {
        self.count / 2
    }
}

impl SceneNode for LineNode {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn write_own_buffers(&mut self, ctx: &Context) {
        let raw = InstanceRaw::new(&self.base.world, false);
        ctx.queue
            .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&[raw]));
    }

    fn own_render(&self) -> Render<'_> {
        if self.count == 0 {
            return Render::None;
        }
        Render::Lines(Lines {
            vertex: &self.vertex_buffer,
            instance: &self.instance_buffer,
            amount: self.count,
        })
    }
}

pub fn axes_vertices(size: f32) -> Vec<LineVertex> {
    let line = |to: [f32; 3], from_color: [f32; 3], to_color: [f32; 3]| {
        [
            LineVertex {
                position: [0.0; 3],
                color: from_color,
            },
            LineVertex {
                position: to,
                color: to_color,
            },
        ]
    };
    [
        line([size, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.6, 0.0]),
        line([0.0, size, 0.0], [0.0, 1.0, 0.0], [0.6, 1.0, 0.0]),
        line([0.0, 0.0, size], [0.0, 0.0, 1.0], [0.0, 0.6, 1.0]),
    ]
    .concat()
}

const CONE_RAYS: usize = 5;
const CONE_SEGMENTS: usize = 32;

/// Five rays from the apex plus the rim circle of a spot light's cone, in
/// world space. Lights other than spot lights yield no lines.
pub fn spot_cone_vertices(light: &Light, light_world: &Matrix4<f32>) -> Vec<LineVertex> {
    let LightKind::Spot {
        distance,
        angle,
        target,
        ..
    } = &light.kind
    else {
        return Vec::new();
    };
    let apex = Point3::from_vec(light_world.w.truncate());
    let dir = *target - apex;
    if dir.magnitude2() <= f32::EPSILON {
        return Vec::new();
    }
    let dir = dir.normalize();
    let length = if *distance > 0.0 { *distance } else { 1000.0 };
    let radius = length * angle.tan();
    let helper = if dir.y.abs() > 0.999 {
        Vector3::unit_z()
    } else {
        Vector3::unit_y()
    };
    let side = helper.cross(dir).normalize();
    let up = dir.cross(side);
    let rim = |t: f32| {
        let (s, c) = t.sin_cos();
        apex + dir * length + side * (c * radius) + up * (s * radius)
    };
    let color = light.color.to_array();
    let vertex = |p: Point3<f32>| LineVertex {
        position: p.into(),
        color,
    };

    let mut vertices = Vec::with_capacity((CONE_RAYS + CONE_SEGMENTS) * 2);
    vertices.push(vertex(apex));
    vertices.push(vertex(apex + dir * length));
    for i in 0..CONE_RAYS - 1 {
        let t = i as f32 / (CONE_RAYS - 1) as f32 * std::f32::consts::TAU;
        vertices.push(vertex(apex));
        vertices.push(vertex(rim(t)));
    }
    for i in 0..CONE_SEGMENTS {
        let t0 = i as f32 / CONE_SEGMENTS as f32 * std::f32::consts::TAU;
        let t1 = (i + 1) as f32 / CONE_SEGMENTS as f32 * std::f32::consts::TAU;
        vertices.push(vertex(rim(t0)));
        vertices.push(vertex(rim(t1)));
    }
    vertices
}

/// A light placed in the scene graph.
#[derive(Debug)]
pub struct LightNode {
    base: NodeBase,
    pub light: Light,
}

impl LightNode {
    pub fn new(light: Light) -> Self {
        Self {
            base: NodeBase::new(),
            light,
        }
    }
}

impl SceneNode for LightNode {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn own_light(&self) -> Option<&Light> {
        Some(&self.light)
    }
}

/// Index of a node added directly to the scene root.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// Root of the scene graph plus scene wide settings.
#[derive(Debug, Default)]
pub struct Scene {
    pub root: Group,
    /// Clear colour used when no background texture is set.
    pub background_color: Option<Color>,
    /// Equirectangular map drawn behind everything.
    pub background: Option<TextureHandle>,
    /// Equirectangular map standard materials reflect.
    pub environment: Option<TextureHandle>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: impl SceneNode + 'static) -> NodeId {
        self.add_boxed(Box::new(node))
    }

    pub fn add_boxed(&mut self, node: Box<dyn SceneNode>) -> NodeId {
        NodeId(self.root.add_child(node))
    }

    pub fn node(&self, id: NodeId) -> Option<&dyn SceneNode> {
        self.root.children().get(id.0).map(|node| node.as_ref())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut (dyn SceneNode + 'static)> {
        self.root.children_mut().get_mut(id.0).map(|node| node.as_mut())
    }

    /// Shortcut for mutating a node's local transform.
    pub fn transform_mut(&mut self, id: NodeId) -> Option<&mut Transform> {
        self.node_mut(id).map(|node| node.local_transform_mut())
    }

    pub fn update_world_transforms(&mut self) {
        self.root.update_world_transforms(&Matrix4::identity());
    }

    pub fn lights(&self) -> Vec<(Light, Matrix4<f32>)> {
        let mut lights = Vec::new();
        self.root.collect_lights(&mut lights);
        lights
    }
}
