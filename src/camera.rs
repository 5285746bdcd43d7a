//! Perspective camera, its GPU uniform and the orbit controller.
//!
//! The camera is split in two halves: [`Camera`] is the transform (where it
//! sits and what it looks at) and [`Projection`] holds the lens. Only the
//! projection depends on the viewport, so a resize never touches the camera
//! transform.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3, perspective};
use wgpu::util::DeviceExt;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::viewport::Viewport;

/// wgpu uses a 0..1 depth range while cgmath builds OpenGL style -1..1 matrices.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>>(position: P) -> Self {
        Self {
            position: position.into(),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::unit_y(),
        }
    }

    pub fn look_at<P: Into<Point3<f32>>>(&mut self, target: P) {
        self.target = target.into();
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn distance_to_target(&self) -> f32 {
        (self.position - self.target).magnitude()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new((0.0, 0.0, 5.0))
    }
}

#[derive(Clone, Debug)]
pub struct Projection {
    aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    matrix: Matrix4<f32>,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        let mut projection = Self {
            aspect: 1.0,
            fovy: fovy.into(),
            znear,
            zfar,
            matrix: Matrix4::identity(),
        };
        projection.resize(width, height);
        projection
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Recompute aspect and the cached projection matrix.
    pub fn resize(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
        self.update_projection_matrix();
    }

    pub fn set_viewport(&mut self, viewport: &Viewport) {
        self.resize(viewport.width, viewport.height);
    }

    /// Call after touching `fovy`, `znear` or `zfar` directly.
    pub fn update_projection_matrix(&mut self) {
        self.matrix =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        self.matrix
    }

    /// Scale from world units at distance 1 to NDC height.
    pub fn focal_scale(&self) -> f32 {
        self.matrix.y.y
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view: [[f32; 4]; 4],
    view_proj: [[f32; 4]; 4],
    inv_view_proj: [[f32; 4]; 4],
    // drawing buffer width, height, pixel ratio, focal scale
    viewport: [f32; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view: Matrix4::identity().into(),
            view_proj: Matrix4::identity().into(),
            inv_view_proj: Matrix4::identity().into(),
            viewport: [1.0, 1.0, 1.0, 1.0],
        }
    }

    /// Uniform of a camera that only needs a view projection, e.g. a light's
    /// shadow camera.
    pub fn from_view_proj(view_proj: Matrix4<f32>) -> Self {
        Self {
            view_proj: view_proj.into(),
            inv_view_proj: view_proj.invert().unwrap_or(Matrix4::identity()).into(),
            ..Self::new()
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection, viewport: &Viewport) {
        let view = camera.calc_matrix();
        let view_proj = projection.calc_matrix() * view;
        self.view_position = camera.position.to_homogeneous().into();
        self.view = view.into();
        self.view_proj = view_proj.into();
        self.inv_view_proj = view_proj.invert().unwrap_or(Matrix4::identity()).into();
        let (width, height) = viewport.drawing_buffer_size();
        self.viewport = [
            width as f32,
            height as f32,
            viewport.pixel_ratio() as f32,
            projection.focal_scale(),
        ];
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device, camera: Camera) -> Self {
        let uniform = CameraUniform::new();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });
        Self {
            camera,
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn write_to_buffer(&mut self, queue: &wgpu::Queue, projection: &Projection, viewport: &Viewport) {
        self.uniform
            .update_view_proj(&self.camera, projection, viewport);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("camera_bind_group_layout"),
    })
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum DragMode {
    None,
    Rotate,
    Pan,
}

/// Orbit the camera around a target: left drag rotates, right drag pans,
/// the wheel dollies in and out.
///
/// With damping enabled the user's motion is applied over several frames,
/// each update consuming `damping_factor` of what is left.
#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    // pending motion
    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    pan_offset: Vector3<f32>,
    drag: DragMode,
    cursor: Option<(f64, f64)>,
    viewport_height: f32,
    half_fovy_tan: f32,
}

impl OrbitControls {
    pub fn new<P: Into<Point3<f32>>>(target: P) -> Self {
        Self {
            target: target.into(),
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            pan_offset: Vector3::new(0.0, 0.0, 0.0),
            drag: DragMode::None,
            cursor: None,
            viewport_height: 600.0,
            half_fovy_tan: (PI / 180.0 * 37.5).tan(),
        }
    }

    pub fn with_damping(mut self, enable: bool) -> Self {
        self.enable_damping = enable;
        self
    }

    pub fn set_viewport(&mut self, viewport: &Viewport) {
        self.viewport_height = viewport.height.max(1) as f32;
    }

    /// Pan speed follows the lens so the target tracks the cursor.
    pub fn set_projection(&mut self, projection: &Projection) {
        self.half_fovy_tan = (projection.fovy.0 * 0.5).tan();
    }

    /// Rotate around the up axis, in radians.
    pub fn rotate_left(&mut self, angle: f32) {
        self.theta_delta -= angle;
    }

    /// Rotate over the top, in radians.
    pub fn rotate_up(&mut self, angle: f32) {
        self.phi_delta -= angle;
    }

    pub fn dolly_in(&mut self, scale: f32) {
        self.scale /= scale;
    }

    pub fn dolly_out(&mut self, scale: f32) {
        self.scale *= scale;
    }

    pub fn pan(&mut self, offset: Vector3<f32>) {
        self.pan_offset += offset;
    }

    fn zoom_scale(&self) -> f32 {
        0.95f32.powf(self.zoom_speed)
    }

    pub fn handle_window_events(&mut self, camera: &Camera, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                self.drag = match (state, button) {
                    (ElementState::Pressed, MouseButton::Left) => DragMode::Rotate,
                    (ElementState::Pressed, MouseButton::Right) => DragMode::Pan,
                    (ElementState::Pressed, MouseButton::Middle) => DragMode::Pan,
                    (ElementState::Released, _) => DragMode::None,
                    _ => self.drag,
                };
            }
            WindowEvent::CursorMoved { position, .. } => {
                let current = (position.x, position.y);
                if let Some((x, y)) = self.cursor {
                    let dx = (current.0 - x) as f32;
                    let dy = (current.1 - y) as f32;
                    self.handle_drag(camera, dx, dy);
                }
                self.cursor = Some(current);
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.drag = DragMode::None;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                if scroll > 0.0 {
                    self.dolly_in(self.zoom_scale());
                } else if scroll < 0.0 {
                    self.dolly_out(self.zoom_scale());
                }
            }
            _ => (),
        }
    }

    fn handle_drag(&mut self, camera: &Camera, dx: f32, dy: f32) {
        let height = self.viewport_height;
        match self.drag {
            DragMode::Rotate => {
                self.rotate_left(2.0 * PI * dx / height * self.rotate_speed);
                self.rotate_up(2.0 * PI * dy / height * self.rotate_speed);
            }
            DragMode::Pan => self.pan_pixels(camera, dx, dy),
            DragMode::None => (),
        }
    }

    /// Pan by a cursor movement in physical pixels, moving as far as the
    /// cursor would at the target's depth.
    pub fn pan_pixels(&mut self, camera: &Camera, dx: f32, dy: f32) {
        let height = self.viewport_height;
        let offset = camera.position - self.target;
        let distance = offset.magnitude() * self.half_fovy_tan;
        let forward = (self.target - camera.position).normalize();
        let right = forward.cross(camera.up).normalize();
        let up = right.cross(forward);
        let pan = right * (-2.0 * dx * distance / height * self.pan_speed)
            + up * (2.0 * dy * distance / height * self.pan_speed);
        self.pan(pan);
    }

    /// Apply pending motion to the camera. Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        const EPS: f32 = 1e-6;
        let offset = camera.position - self.target;
        let mut radius = offset.magnitude();
        if radius < EPS {
            radius = EPS;
        }
        // spherical coordinates around the y axis
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        let factor = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        theta += self.theta_delta * factor;
        phi += self.phi_delta * factor;
        phi = phi.clamp(EPS, PI - EPS);
        radius = (radius * self.scale).clamp(self.min_distance.max(EPS), self.max_distance);
        self.target += self.pan_offset * factor;

        let new_offset = Vector3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        let old_position = camera.position;
        camera.position = self.target + new_offset;
        camera.target = self.target;

        if self.enable_damping {
            self.theta_delta *= 1.0 - self.damping_factor;
            self.phi_delta *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.theta_delta = 0.0;
            self.phi_delta = 0.0;
            self.pan_offset = Vector3::new(0.0, 0.0, 0.0);
        }
        self.scale = 1.0;

        (camera.position - old_position).magnitude2() > EPS
    }
}
