//! scene-ngin
//!
//! Small, self-contained real-time 3D lessons on top of a retained-mode scene
//! graph, running natively and in the browser. Every lesson builds a scene, a
//! camera and a renderer and then hands control to the shared render loop.
//!
//! High-level modules
//! - `camera`: perspective camera, uniforms and orbit controls
//! - `color`: sRGB authored colours converted to linear
//! - `context`: GPU device, surface, viewport and renderer options
//! - `data_structures`: geometry, materials, lights, textures, scene graph
//! - `flow`: render loop, frame clock and stop signal
//! - `lessons`: the tutorial scenes
//! - `particles`: random point cloud generation
//! - `pipelines`: the render pipelines and their shaders
//! - `render`: draw batching and the per-frame renderer
//! - `resources`: asynchronous texture loading
//! - `viewport`: drawing surface size and pixel ratio
//!

pub mod camera;
pub mod color;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod lessons;
pub mod particles;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod viewport;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use winit::dpi::PhysicalSize;
pub use winit::event::WindowEvent;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Web entry point: run the lesson named `lesson` on the `canvas.webgl`
/// element of the page.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start(lesson: &str) -> Result<(), JsValue> {
    lessons::run(lesson).map_err(|e| JsValue::from_str(&format!("{e:#}")))
}
