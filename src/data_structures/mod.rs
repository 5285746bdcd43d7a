//! Engine data structures: geometry, materials, lights, textures and the
//! scene graph.
//!
//! - `geometry` generates box, plane, sphere and torus vertex data on the CPU
//! - `model` holds vertex layouts and the GPU mesh built from a geometry
//! - `material` describes how a surface or point cloud is shaded
//! - `light` holds light sources and their packed GPU form
//! - `texture` contains the GPU texture wrapper and sampling options
//! - `instance` holds node transforms and per-draw instance data
//! - `scene_graph` enables hierarchical scene organization

pub mod geometry;
pub mod instance;
pub mod light;
pub mod material;
pub mod model;
pub mod scene_graph;
pub mod texture;
