//! Integration tests for the wgpu texture backend.
//!
//! These tests require a GPU. Run with:
//! ```
//! cargo test --package horizon-lattice-text -- --ignored
//! ```

mod common;

use common::MockEngine;
use horizon_lattice_text::{
    Font, FontConfig, FontError, TextureBackend, TextureFilter, WgpuTextures, rasterize_glyphs,
};

fn create_device() -> (wgpu::Device, wgpu::Queue) {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::LowPower,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .expect("no GPU adapter available");

    pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default(), None))
        .expect("failed to create device")
}

#[test]
#[ignore = "requires GPU"]
fn test_wgpu_font_upload_and_release() {
    let (device, queue) = create_device();
    let mut textures = WgpuTextures::new(&device, &queue);

    let config = FontConfig::default().with_filter(TextureFilter::Bilinear);
    let codepoints = config.glyph_set.codepoints();
    let glyphs = rasterize_glyphs(&MockEngine::default(), config.base_size, &codepoints, config.font_type);
    let mut font = Font::from_glyphs(glyphs, &config, &mut textures).unwrap();

    let texture = *font.texture().unwrap();
    assert_eq!(textures.live_count(), 1);
    assert!(textures.view(texture.id).is_some());

    let layout = WgpuTextures::bind_group_layout(&device);
    assert!(textures.bind_group(texture.id, &layout).is_some());

    font.unload(&mut textures);
    assert_eq!(textures.live_count(), 0);
    assert!(matches!(
        textures.release(&texture),
        Err(FontError::UnknownTexture(_))
    ));
}

#[test]
#[ignore = "requires GPU"]
fn test_wgpu_rejects_oversized_atlas() {
    let (device, queue) = create_device();
    let mut textures = WgpuTextures::new(&device, &queue);

    let side = device.limits().max_texture_dimension_2d + 1;
    let image = image::DynamicImage::ImageLuma8(image::GrayImage::new(side, 1));
    assert!(matches!(textures.upload(&image), Err(FontError::TextureUpload(_))));
    assert_eq!(textures.live_count(), 0);
}
