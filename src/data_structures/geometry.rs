//! Procedural geometry: boxes, planes, spheres and tori.
//!
//! Texture coordinates follow wgpu's convention (origin at the top left), and
//! every generator winds its triangles counter-clockwise when seen from the
//! outside.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Vector2, Vector3};

use crate::data_structures::model::ModelVertex;

/// CPU side vertex and index data, uploaded with [`crate::data_structures::model::Mesh::new`].
#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Axis aligned box centred at the origin.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let size = Vector3::new(width, height, depth);
        // (normal, u direction, v direction) with u x v == normal
        let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ];
        let extent = |axis: Vector3<f32>| {
            axis.x.abs() * size.x + axis.y.abs() * size.y + axis.z.abs() * size.z
        };

        let mut geometry = Geometry {
            name: "box".to_string(),
            ..Default::default()
        };
        for (normal, u, v) in faces {
            let (normal, u, v) = (Vector3::from(normal), Vector3::from(u), Vector3::from(v));
            let centre = normal * extent(normal) * 0.5;
            let base = geometry.vertices.len() as u32;
            for (i, j) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
                let position = centre
                    + u * ((i - 0.5) * extent(u))
                    + v * ((j - 0.5) * extent(v));
                geometry.vertices.push(ModelVertex {
                    position: position.into(),
                    tex_coords: [i, 1.0 - j],
                    normal: normal.into(),
                    ..Default::default()
                });
            }
            geometry
                .indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        geometry.compute_tangents();
        geometry
    }

    /// Plane in the XY plane facing +Z.
    pub fn plane(width: f32, height: f32) -> Self {
        let mut geometry = Geometry {
            name: "plane".to_string(),
            ..Default::default()
        };
        for (i, j) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            geometry.vertices.push(ModelVertex {
                position: [(i - 0.5) * width, (j - 0.5) * height, 0.0],
                tex_coords: [i, 1.0 - j],
                normal: [0.0, 0.0, 1.0],
                ..Default::default()
            });
        }
        geometry.indices = vec![0, 1, 2, 0, 2, 3];
        geometry.compute_tangents();
        geometry
    }

    /// UV sphere. Segment counts are clamped to the minimum that still
    /// encloses a volume.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);
        let mut geometry = Geometry {
            name: "sphere".to_string(),
            ..Default::default()
        };

        let mut grid = Vec::with_capacity(height_segments as usize + 1);
        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            let mut row = Vec::with_capacity(width_segments as usize + 1);
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let position = Vector3::new(
                    -radius * (u * 2.0 * PI).cos() * (v * PI).sin(),
                    radius * (v * PI).cos(),
                    radius * (u * 2.0 * PI).sin() * (v * PI).sin(),
                );
                let normal = if position.magnitude2() > 0.0 {
                    position.normalize()
                } else {
                    Vector3::unit_y()
                };
                row.push(geometry.vertices.len() as u32);
                geometry.vertices.push(ModelVertex {
                    position: position.into(),
                    tex_coords: [u, v],
                    normal: normal.into(),
                    ..Default::default()
                });
            }
            grid.push(row);
        }

        for iy in 0..height_segments as usize {
            for ix in 0..width_segments as usize {
                let a = grid[iy][ix + 1];
                let b = grid[iy][ix];
                let c = grid[iy + 1][ix];
                let d = grid[iy + 1][ix + 1];
                // the poles collapse one triangle of each quad
                if iy != 0 {
                    geometry.indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments as usize - 1 {
                    geometry.indices.extend_from_slice(&[b, c, d]);
                }
            }
        }
        geometry.compute_tangents();
        geometry
    }

    /// Torus around the Z axis.
    pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        let radial_segments = radial_segments.max(2);
        let tubular_segments = tubular_segments.max(3);
        let mut geometry = Geometry {
            name: "torus".to_string(),
            ..Default::default()
        };

        for j in 0..=radial_segments {
            for i in 0..=tubular_segments {
                let u = i as f32 / tubular_segments as f32 * 2.0 * PI;
                let v = j as f32 / radial_segments as f32 * 2.0 * PI;
                let position = Vector3::new(
                    (radius + tube * v.cos()) * u.cos(),
                    (radius + tube * v.cos()) * u.sin(),
                    tube * v.sin(),
                );
                let centre = Vector3::new(radius * u.cos(), radius * u.sin(), 0.0);
                geometry.vertices.push(ModelVertex {
                    position: position.into(),
                    tex_coords: [
                        i as f32 / tubular_segments as f32,
                        1.0 - j as f32 / radial_segments as f32,
                    ],
                    normal: (position - centre).normalize().into(),
                    ..Default::default()
                });
            }
        }

        let stride = tubular_segments + 1;
        for j in 1..=radial_segments {
            for i in 1..=tubular_segments {
                let a = stride * j + i - 1;
                let b = stride * (j - 1) + i - 1;
                let c = stride * (j - 1) + i;
                let d = stride * j + i;
                geometry.indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
        geometry.compute_tangents();
        geometry
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Tangents and bitangents are needed for normal maps and none of the
    /// generators produce them directly.
    pub fn compute_tangents(&mut self) {
        let vertices = &mut self.vertices;
        let mut triangles_included = vec![0u32; vertices.len()];
        for v in vertices.iter_mut() {
            v.tangent = [0.0; 3];
            v.bitangent = [0.0; 3];
        }

        for c in self.indices.chunks_exact(3) {
            let (i0, i1, i2) = (c[0] as usize, c[1] as usize, c[2] as usize);
            let v0 = vertices[i0];
            let v1 = vertices[i1];
            let v2 = vertices[i2];

            let pos0: Vector3<_> = v0.position.into();
            let pos1: Vector3<_> = v1.position.into();
            let pos2: Vector3<_> = v2.position.into();

            let uv0: Vector2<_> = v0.tex_coords.into();
            let uv1: Vector2<_> = v1.tex_coords.into();
            let uv2: Vector2<_> = v2.tex_coords.into();

            let delta_pos1 = pos1 - pos0;
            let delta_pos2 = pos2 - pos0;
            let delta_uv1 = uv1 - uv0;
            let delta_uv2 = uv2 - uv0;

            //     delta_pos1 = delta_uv1.x * T + delta_uv1.y * B
            //     delta_pos2 = delta_uv2.x * T + delta_uv2.y * B
            let det = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
            if det.abs() < f32::EPSILON {
                continue;
            }
            let r = 1.0 / det;
            let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) * r;
            // flipped so right-handed normal maps work with wgpu's texture origin
            let bitangent = (delta_pos2 * delta_uv1.x - delta_pos1 * delta_uv2.x) * -r;

            for idx in [i0, i1, i2] {
                vertices[idx].tangent = (tangent + Vector3::from(vertices[idx].tangent)).into();
                vertices[idx].bitangent =
                    (bitangent + Vector3::from(vertices[idx].bitangent)).into();
                triangles_included[idx] += 1;
            }
        }

        for (v, n) in vertices.iter_mut().zip(triangles_included) {
            if n == 0 {
                continue;
            }
            let denom = 1.0 / n as f32;
            v.tangent = (Vector3::from(v.tangent) * denom).into();
            v.bitangent = (Vector3::from(v.bitangent) * denom).into();
        }
    }
}
