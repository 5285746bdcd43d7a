//! Light sources and their packed GPU form.
//!
//! Lights live in the scene graph as [`crate::data_structures::scene_graph::LightNode`]s.
//! Every frame the renderer collects them together with their world matrix and
//! packs up to [`MAX_LIGHTS`] of them into a [`LightsUniform`].

use cgmath::{
    EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Transform as _, Vector3,
    perspective,
};

use crate::{camera::OPENGL_TO_WGPU_MATRIX, color::Color};

pub const MAX_LIGHTS: usize = 8;

/// Half extent of the box a directional light casts shadows in.
pub const DIRECTIONAL_SHADOW_EXTENT: f32 = 5.0;

#[derive(Clone, Debug, PartialEq)]
pub enum LightKind {
    /// Uniform light from every direction; no shadows.
    Ambient,
    /// Parallel rays from the light's position towards `target`.
    Directional { target: Point3<f32> },
    /// Sky colour from above blended into `ground` colour from below.
    Hemisphere { ground: Color },
    /// Omnidirectional. `distance == 0` means no cutoff.
    Point { distance: f32, decay: f32 },
    /// Cone towards `target` with half angle `angle`; `penumbra` in `[0, 1]`
    /// is the fraction of the cone that fades out.
    Spot {
        distance: f32,
        angle: f32,
        penumbra: f32,
        decay: f32,
        target: Point3<f32>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub color: Color,
    pub intensity: f32,
    pub kind: LightKind,
    pub cast_shadow: bool,
}

impl Light {
    fn with_kind(color: impl Into<Color>, intensity: f32, kind: LightKind) -> Self {
        Self {
            color: color.into(),
            intensity,
            kind,
            cast_shadow: false,
        }
    }

    pub fn ambient(color: impl Into<Color>, intensity: f32) -> Self {
        Self::with_kind(color, intensity, LightKind::Ambient)
    }

    pub fn directional(color: impl Into<Color>, intensity: f32) -> Self {
        Self::with_kind(
            color,
            intensity,
            LightKind::Directional {
                target: Point3::origin(),
            },
        )
    }

    pub fn hemisphere(sky: impl Into<Color>, ground: impl Into<Color>, intensity: f32) -> Self {
        Self::with_kind(
            sky,
            intensity,
            LightKind::Hemisphere {
                ground: ground.into(),
            },
        )
    }

    pub fn point(color: impl Into<Color>, intensity: f32, distance: f32, decay: f32) -> Self {
        Self::with_kind(color, intensity, LightKind::Point { distance, decay })
    }

    pub fn spot(
        color: impl Into<Color>,
        intensity: f32,
        distance: f32,
        angle: f32,
        penumbra: f32,
        decay: f32,
    ) -> Self {
        Self::with_kind(
            color,
            intensity,
            LightKind::Spot {
                distance,
                angle,
                penumbra,
                decay,
                target: Point3::origin(),
            },
        )
    }

    pub fn with_shadow(mut self, cast_shadow: bool) -> Self {
        self.cast_shadow = cast_shadow;
        self
    }

    /// Point the light at `target`. Only directional and spot lights aim.
    pub fn with_target(mut self, new_target: Point3<f32>) -> Self {
        match &mut self.kind {
            LightKind::Directional { target } | LightKind::Spot { target, .. } => {
                *target = new_target
            }
            _ => log::warn!("Light {:?} has no target", self.kind),
        }
        self
    }

    pub fn can_cast_shadow(&self) -> bool {
        matches!(
            self.kind,
            LightKind::Directional { .. } | LightKind::Spot { .. }
        )
    }

    fn kind_id(&self) -> f32 {
        match self.kind {
            LightKind::Ambient => 0.0,
            LightKind::Directional { .. } => 1.0,
            LightKind::Hemisphere { .. } => 2.0,
            LightKind::Point { .. } => 3.0,
            LightKind::Spot { .. } => 4.0,
        }
    }

    pub fn to_raw(&self, world: &Matrix4<f32>) -> LightRaw {
        let position = world.transform_point(Point3::origin());
        let radiance = self.color.scaled(self.intensity);
        let direction_to = |target: Point3<f32>| {
            let dir = target - position;
            if dir.magnitude2() > 0.0 {
                dir.normalize()
            } else {
                -Vector3::unit_y()
            }
        };

        let mut raw = LightRaw {
            position: [position.x, position.y, position.z, self.kind_id()],
            color: [radiance.r, radiance.g, radiance.b, 0.0],
            direction: [0.0, -1.0, 0.0, 0.0],
            cone: [0.0, 0.0, if self.cast_shadow { 1.0 } else { 0.0 }, 0.0],
            ground: [0.0; 4],
        };
        match &self.kind {
            LightKind::Ambient => {}
            LightKind::Directional { target } => {
                let dir = direction_to(*target);
                raw.direction = [dir.x, dir.y, dir.z, 0.0];
            }
            LightKind::Hemisphere { ground } => {
                let ground = ground.scaled(self.intensity);
                raw.direction = [0.0, 1.0, 0.0, 0.0];
                raw.ground = [ground.r, ground.g, ground.b, 0.0];
            }
            LightKind::Point { distance, decay } => {
                raw.color[3] = *distance;
                raw.direction[3] = *decay;
            }
            LightKind::Spot {
                distance,
                angle,
                penumbra,
                decay,
                target,
            } => {
                let dir = direction_to(*target);
                raw.color[3] = *distance;
                raw.direction = [dir.x, dir.y, dir.z, *decay];
                raw.cone[0] = angle.cos();
                raw.cone[1] = (angle * (1.0 - penumbra)).cos();
            }
        }
        raw
    }

    /// View projection of the light's shadow camera, `None` for lights that
    /// cannot cast shadows.
    pub fn shadow_view_proj(&self, world: &Matrix4<f32>) -> Option<Matrix4<f32>> {
        let position = world.transform_point(Point3::origin());
        let (target, proj) = match &self.kind {
            LightKind::Spot {
                distance,
                angle,
                target,
                ..
            } => {
                let far = if *distance > 0.0 { *distance } else { 500.0 };
                (*target, perspective(Rad(2.0 * angle), 1.0, 0.5, far))
            }
            LightKind::Directional { target } => {
                let e = DIRECTIONAL_SHADOW_EXTENT;
                (*target, cgmath::ortho(-e, e, -e, e, 0.5, 500.0))
            }
            _ => return None,
        };
        let dir = target - position;
        if dir.magnitude2() <= f32::EPSILON {
            return None;
        }
        let up = if dir.normalize().y.abs() > 0.999 {
            Vector3::unit_z()
        } else {
            Vector3::unit_y()
        };
        let view = Matrix4::look_at_rh(position, target, up);
        Some(OPENGL_TO_WGPU_MATRIX * proj * view)
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightRaw {
    // xyz, kind
    pub position: [f32; 4],
    // premultiplied radiance, cutoff distance
    pub color: [f32; 4],
    // normalised direction, decay
    pub direction: [f32; 4],
    // cos outer, cos inner, casts shadow, unused
    pub cone: [f32; 4],
    // hemisphere ground radiance
    pub ground: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    pub shadow_view_proj: [[f32; 4]; 4],
    pub count: u32,
    pub has_environment: u32,
    pub shadow_light: i32,
    pub _padding: u32,
    pub lights: [LightRaw; MAX_LIGHTS],
}

impl Default for LightsUniform {
    fn default() -> Self {
        Self {
            shadow_view_proj: Matrix4::identity().into(),
            count: 0,
            has_environment: 0,
            shadow_light: -1,
            _padding: 0,
            lights: [LightRaw::default(); MAX_LIGHTS],
        }
    }
}

impl LightsUniform {
    /// Pack the collected lights. Lights beyond [`MAX_LIGHTS`] are dropped
    /// with a warning. The first shadow casting directional or spot light
    /// owns the shadow map, provided `shadows` is enabled.
    pub fn pack(lights: &[(Light, Matrix4<f32>)], shadows: bool, has_environment: bool) -> Self {
        if lights.len() > MAX_LIGHTS {
            log::warn!(
                "{} lights in scene, only the first {} are used",
                lights.len(),
                MAX_LIGHTS
            );
        }
        let mut uniform = Self {
            has_environment: has_environment as u32,
            ..Self::default()
        };
        for (idx, (light, world)) in lights.iter().take(MAX_LIGHTS).enumerate() {
            uniform.lights[idx] = light.to_raw(world);
            uniform.count += 1;
            if shadows && uniform.shadow_light < 0 && light.cast_shadow {
                if let Some(view_proj) = light.shadow_view_proj(world) {
                    uniform.shadow_view_proj = view_proj.into();
                    uniform.shadow_light = idx as i32;
                }
            }
        }
        uniform
    }

    pub fn has_shadow(&self) -> bool {
        self.shadow_light >= 0
    }
}
