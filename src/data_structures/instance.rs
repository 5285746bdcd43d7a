//! Node transforms and their GPU representation.
//!
//! Every scene node carries a local [`Transform`]. Before drawing, the scene
//! graph folds the locals into world matrices which are packed as
//! [`InstanceRaw`] into a per-node instance buffer and read by the vertex
//! shaders.

use std::ops::Mul;

use cgmath::{
    EuclideanSpace, Euler, InnerSpace, Matrix, Matrix3, Matrix4, One, Point3, Quaternion, Rad,
    Rotation3, SquareMatrix, Vector3,
};

use crate::data_structures::model;

/// Position, rotation (as quaternion) and non-uniform scale of a node
/// relative to its parent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    /// Identity transform (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn from_position(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            ..Self::new()
        }
    }

    /// Set the rotation from Euler angles in radians, applied in X, Y, Z order
    /// (the rotation matrix is `Rx * Ry * Rz`).
    pub fn set_euler(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Quaternion::from(Euler::new(Rad(x), Rad(y), Rad(z)));
    }

    /// Rotate around the local Z axis on top of the current rotation.
    pub fn rotate_z(&mut self, angle: f32) {
        self.rotation = self.rotation * Quaternion::from_angle_z(Rad(angle));
    }

    pub fn rotate_x(&mut self, angle: f32) {
        self.rotation = self.rotation * Quaternion::from_angle_x(Rad(angle));
    }

    pub fn rotate_y(&mut self, angle: f32) {
        self.rotation = self.rotation * Quaternion::from_angle_y(Rad(angle));
    }

    /// Orient the node so that its +Z axis points at `target`.
    pub fn look_at(&mut self, target: Point3<f32>) {
        let eye = Point3::from_vec(self.position);
        let dir = target - eye;
        if dir.magnitude2() < 1e-12 {
            return;
        }
        let dir = dir.normalize();
        let up = if dir.y.abs() > 0.999 {
            Vector3::unit_z()
        } else {
            Vector3::unit_y()
        };
        let side = up.cross(dir).normalize();
        let up = dir.cross(side);
        self.rotation = Quaternion::from(Matrix3::from_cols(side, up, dir));
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vector3<f32>> for Transform {
    fn from(position: Vector3<f32>) -> Self {
        Transform {
            position,
            ..Default::default()
        }
    }
}

impl<'a, 'b> Mul<&'b Transform> for &'a Transform {
    type Output = Matrix4<f32>;

    fn mul(self, rhs: &'b Transform) -> Self::Output {
        self.to_matrix() * rhs.to_matrix()
    }
}

/**
 * The raw instance is the actual data stored on the GPU
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 3]; 3],
    handedness: f32,
    receive_shadow: f32,
}

impl InstanceRaw {
    pub fn new(world: &Matrix4<f32>, receive_shadow: bool) -> Self {
        let handedness = world.determinant().signum();
        Self {
            model: (*world).into(),
            normal: normal_matrix(world).into(),
            handedness,
            receive_shadow: if receive_shadow { 1.0 } else { 0.0 },
        }
    }
}

/// Inverse transpose of the upper 3x3, so normals survive non-uniform scale.
pub fn normal_matrix(world: &Matrix4<f32>) -> Matrix3<f32> {
    let upper = Matrix3::from_cols(world.x.truncate(), world.y.truncate(), world.z.truncate());
    upper
        .invert()
        .map(|inv| inv.transpose())
        .unwrap_or(upper)
}

/**
 * As we store vertex data directly in the GPU memory we need to tell what the bytes refer to:
 *
 * stride: model matrix (four vec4s) + normal matrix (three vec3s) + handedness + shadow flag
 */
impl model::Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            // the shader moves to the next instance per instance, not per vertex
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // A mat4 takes up 4 vertex slots as it is technically 4 vec4s.
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 19]>() as wgpu::BufferAddress,
                    shader_location: 10,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 22]>() as wgpu::BufferAddress,
                    shader_location: 11,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 25]>() as wgpu::BufferAddress,
                    shader_location: 12,
                    format: wgpu::VertexFormat::Float32,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 26]>() as wgpu::BufferAddress,
                    shader_location: 13,
                    format: wgpu::VertexFormat::Float32,
                },
            ],
        }
    }
}
