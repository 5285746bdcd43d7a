use image::{Rgba, RgbaImage};
use scene_ngin::data_structures::texture::{
    ColorSpace, MagFilter, MinFilter, TextureOptions, Wrapping, mip_chain, mip_level_count,
};

#[test]
fn full_mip_chain_length() {
    assert_eq!(mip_level_count(1, 1), 1);
    assert_eq!(mip_level_count(2, 2), 2);
    assert_eq!(mip_level_count(16, 16), 5);
    assert_eq!(mip_level_count(1024, 512), 11);
    assert_eq!(mip_level_count(300, 17), 9);
}

#[test]
fn each_level_halves_down_to_one_pixel() {
    let base = RgbaImage::from_pixel(16, 4, Rgba([10, 20, 30, 255]));
    let levels = mip_chain(&base, true);
    let sizes: Vec<(u32, u32)> = levels.iter().map(|l| l.dimensions()).collect();
    assert_eq!(sizes, [(16, 4), (8, 2), (4, 1), (2, 1), (1, 1)]);
    // a flat colour stays flat through filtering
    assert_eq!(levels[4].get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
}

#[test]
fn disabled_generation_keeps_only_the_base_level() {
    let base = RgbaImage::new(64, 64);
    let levels = mip_chain(&base, false);
    assert_eq!(levels.len(), 1);
    assert_eq!(levels[0].dimensions(), (64, 64));
}

#[test]
fn colour_space_picks_the_format() {
    assert_eq!(
        TextureOptions::default().format(),
        wgpu::TextureFormat::Rgba8Unorm
    );
    assert_eq!(
        TextureOptions::srgb().format(),
        wgpu::TextureFormat::Rgba8UnormSrgb
    );
    assert_eq!(TextureOptions::srgb().color_space, ColorSpace::Srgb);
}

#[test]
fn nearest_filters_without_mipmaps() {
    let options = TextureOptions {
        min_filter: MinFilter::Nearest,
        mag_filter: MagFilter::Nearest,
        generate_mipmaps: false,
        ..TextureOptions::srgb()
    };
    let sampler = options.sampler_descriptor();
    assert_eq!(sampler.min_filter, wgpu::FilterMode::Nearest);
    assert_eq!(sampler.mag_filter, wgpu::FilterMode::Nearest);
    assert_eq!(sampler.lod_max_clamp, 0.0);
}

#[test]
fn mipmapped_filters_and_wrapping() {
    let options = TextureOptions {
        wrap_u: Wrapping::Repeat,
        wrap_v: Wrapping::MirroredRepeat,
        min_filter: MinFilter::NearestMipmapLinear,
        ..Default::default()
    };
    assert!(options.min_filter.uses_mipmaps());
    let sampler = options.sampler_descriptor();
    assert_eq!(sampler.address_mode_u, wgpu::AddressMode::Repeat);
    assert_eq!(sampler.address_mode_v, wgpu::AddressMode::MirrorRepeat);
    assert_eq!(sampler.min_filter, wgpu::FilterMode::Nearest);
    assert_eq!(sampler.mipmap_filter, wgpu::MipmapFilterMode::Linear);
    assert!(sampler.lod_max_clamp > 0.0);
}

#[test]
fn inconsistent_combinations_are_accepted() {
    // a mipmapped filter over a texture without mipmaps is not an error
    let options = TextureOptions {
        generate_mipmaps: false,
        min_filter: MinFilter::LinearMipmapLinear,
        ..Default::default()
    };
    assert_eq!(mip_chain(&RgbaImage::new(8, 8), options.generate_mipmaps).len(), 1);
    let _ = options.sampler_descriptor();
}
