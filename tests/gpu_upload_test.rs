#[cfg(feature = "integration-tests")]
use crate::common::test_utils::headless_device;
#[cfg(feature = "integration-tests")]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn decoded_images_upload_with_their_options() {
    use image::{Rgba, RgbaImage};
    use scene_ngin::{
        data_structures::texture::{MinFilter, TextureOptions, mip_level_count},
        resources::loader::TextureHandle,
    };

    let (device, queue) = headless_device();
    let image = RgbaImage::from_pixel(64, 32, Rgba([255, 255, 255, 255]));
    let handle = TextureHandle::from_image("minecraft", image, TextureOptions::srgb());

    let texture = handle.gpu_texture(&device, &queue).unwrap();
    assert_eq!(texture.texture.mip_level_count(), mip_level_count(64, 32));
    assert_eq!(
        texture.texture.format(),
        wgpu::TextureFormat::Rgba8UnormSrgb
    );

    handle.update_options(|options| {
        options.generate_mipmaps = false;
        options.min_filter = MinFilter::Nearest;
    });
    let texture = handle.gpu_texture(&device, &queue).unwrap();
    assert_eq!(texture.texture.mip_level_count(), 1);
}

#[test]
#[cfg(feature = "integration-tests")]
fn pending_handles_have_no_gpu_texture() {
    use scene_ngin::resources::loader::TextureHandle;

    let (device, queue) = headless_device();
    assert!(TextureHandle::pending("door").gpu_texture(&device, &queue).is_none());
}

#[test]
#[cfg(feature = "integration-tests")]
fn scene_nodes_build_their_gpu_buffers() {
    use scene_ngin::{
        data_structures::{
            geometry::Geometry,
            material::{Material, MaterialParams, PointsMaterial},
            scene_graph::{LineNode, MeshNode, PointsNode, Scene, SceneNode},
        },
        particles::scatter,
    };

    let (device, _queue) = headless_device();
    let mut scene = Scene::new();
    let material = Material::shared(MaterialParams::standard());
    scene.add(MeshNode::new(&device, &Geometry::sphere(0.5, 16, 16), material.clone()));
    scene.add(MeshNode::new(&device, &Geometry::torus(0.3, 0.2, 16, 32), material));

    let points = PointsNode::new(&device, &scatter(5000), PointsMaterial::default());
    assert_eq!(points.len(), 5000);
    scene.add(points);
    assert!(PointsNode::new(&device, &[], PointsMaterial::default()).is_empty());

    let axes = LineNode::axes_helper(&device, 2.0);
    assert_eq!(axes.segment_count(), 3);
    scene.add(axes);

    scene.update_world_transforms();
    assert_eq!(scene.root.children().len(), 4);
}
