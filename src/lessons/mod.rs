//! The tutorial scenes. Each lesson is independent: it builds its own scene,
//! places the camera, configures the renderer and animates its objects.
//!
//! Natively every lesson is started by its cargo example in `demos/`, on the
//! web through [`crate::start`].

pub mod first_project;
pub mod lights;
pub mod materials;
pub mod particles;
pub mod textures;
pub mod transform_objects;

use anyhow::bail;

/// Names accepted by [`run`].
pub const LESSONS: [&str; 6] = [
    "first-project",
    "transform-objects",
    "textures",
    "materials",
    "lights",
    "particles",
];

/// Run the lesson called `name` until its window closes.
pub fn run(name: &str) -> anyhow::Result<()> {
    match name {
        "first-project" => first_project::run(),
        "transform-objects" => transform_objects::run(),
        "textures" => textures::run(),
        "materials" => materials::run(),
        "lights" => lights::run(),
        "particles" => particles::run(),
        other => bail!("unknown lesson {other}, expected one of {LESSONS:?}"),
    }
}
