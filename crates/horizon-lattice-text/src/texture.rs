//! Texture handles and upload backends.
//!
//! Fonts never own GPU objects directly. They hold a [`Texture`] handle issued
//! by a [`TextureBackend`], which performs the actual upload, filter change and
//! release. Two backends are provided:
//!
//! - [`HeadlessTextures`] keeps images in memory. It needs no GPU and records
//!   every release, which makes it the backend of choice for tests and tools.
//! - [`WgpuTextures`] uploads to a `wgpu` device.
//!
//! Texture ids are drawn from a process-wide counter, so handles issued by
//! different backends never compare equal.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};

use image::DynamicImage;
use tracing::debug;

use crate::error::{FontError, FontResult};

/// Global texture ID counter.
static TEXTURE_ID_COUNTER: AtomicU32 = AtomicU32::new(1);

/// Identifier of an uploaded texture. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(NonZeroU32);

impl TextureId {
    /// Wrap a raw id. Returns `None` for zero.
    pub fn new(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(Self)
    }

    /// The raw id.
    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Allocate a fresh id.
    fn next() -> Self {
        let id = TEXTURE_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(NonZeroU32::new(id).unwrap_or(NonZeroU32::MIN))
    }
}

/// Pixel layout of an uploaded texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// One 8-bit channel.
    Grayscale,
    /// Two 8-bit channels: gray and alpha.
    GrayAlpha,
    /// Four 8-bit channels.
    Rgba8,
}

impl PixelFormat {
    /// Bytes per pixel.
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            Self::Grayscale => 1,
            Self::GrayAlpha => 2,
            Self::Rgba8 => 4,
        }
    }

    fn of(image: &DynamicImage) -> Self {
        match image {
            DynamicImage::ImageLuma8(_) => Self::Grayscale,
            DynamicImage::ImageLumaA8(_) => Self::GrayAlpha,
            _ => Self::Rgba8,
        }
    }
}

/// Sampling filter of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFilter {
    /// Nearest neighbor.
    #[default]
    Point,
    /// Linear interpolation.
    Bilinear,
}

/// Handle to an uploaded texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Texture {
    /// Backend-assigned id.
    pub id: TextureId,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel layout.
    pub format: PixelFormat,
}

/// Uploads images and manages their lifetime.
pub trait TextureBackend {
    /// Upload an image and return a handle to it.
    ///
    /// # Errors
    ///
    /// Returns [`FontError::EmptyImage`] for zero-sized images and
    /// [`FontError::TextureUpload`] when the backend cannot hold the image.
    fn upload(&mut self, image: &DynamicImage) -> FontResult<Texture>;

    /// Change the sampling filter of a texture.
    fn set_filter(&mut self, texture: &Texture, filter: TextureFilter) -> FontResult<()>;

    /// Release a texture. The handle must not be used afterwards.
    fn release(&mut self, texture: &Texture) -> FontResult<()>;
}

fn check_not_empty(image: &DynamicImage) -> FontResult<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(FontError::EmptyImage);
    }
    Ok(())
}

struct HeadlessTexture {
    image: DynamicImage,
    filter: TextureFilter,
}

/// In-memory texture backend.
#[derive(Default)]
pub struct HeadlessTextures {
    textures: HashMap<TextureId, HeadlessTexture>,
    released: Vec<TextureId>,
}

impl HeadlessTextures {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pixels of a live texture.
    pub fn image(&self, id: TextureId) -> Option<&DynamicImage> {
        self.textures.get(&id).map(|t| &t.image)
    }

    /// Filter of a live texture.
    pub fn filter(&self, id: TextureId) -> Option<TextureFilter> {
        self.textures.get(&id).map(|t| t.filter)
    }

    /// Check whether a texture is still alive.
    pub fn contains(&self, id: TextureId) -> bool {
        self.textures.contains_key(&id)
    }

    /// Number of live textures.
    pub fn live_count(&self) -> usize {
        self.textures.len()
    }

    /// Ids released so far, in release order.
    pub fn released(&self) -> &[TextureId] {
        &self.released
    }
}

impl TextureBackend for HeadlessTextures {
    fn upload(&mut self, image: &DynamicImage) -> FontResult<Texture> {
        check_not_empty(image)?;

        let texture = Texture {
            id: TextureId::next(),
            width: image.width(),
            height: image.height(),
            format: PixelFormat::of(image),
        };
        self.textures.insert(
            texture.id,
            HeadlessTexture {
                image: image.clone(),
                filter: TextureFilter::default(),
            },
        );
        Ok(texture)
    }

    fn set_filter(&mut self, texture: &Texture, filter: TextureFilter) -> FontResult<()> {
        let entry = self
            .textures
            .get_mut(&texture.id)
            .ok_or(FontError::UnknownTexture(texture.id))?;
        entry.filter = filter;
        Ok(())
    }

    fn release(&mut self, texture: &Texture) -> FontResult<()> {
        self.textures
            .remove(&texture.id)
            .ok_or(FontError::UnknownTexture(texture.id))?;
        self.released.push(texture.id);
        Ok(())
    }
}

impl std::fmt::Debug for HeadlessTextures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessTextures")
            .field("live", &self.textures.len())
            .field("released", &self.released.len())
            .finish()
    }
}

struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

/// Texture backend uploading to a `wgpu` device.
pub struct WgpuTextures<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    textures: HashMap<TextureId, GpuTexture>,
}

impl<'a> WgpuTextures<'a> {
    /// Create a backend on the given device and queue.
    pub fn new(device: &'a wgpu::Device, queue: &'a wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            textures: HashMap::new(),
        }
    }

    /// Texture view of a live texture.
    pub fn view(&self, id: TextureId) -> Option<&wgpu::TextureView> {
        self.textures.get(&id).map(|t| &t.view)
    }

    /// Sampler of a live texture.
    pub fn sampler(&self, id: TextureId) -> Option<&wgpu::Sampler> {
        self.textures.get(&id).map(|t| &t.sampler)
    }

    /// Number of live textures.
    pub fn live_count(&self) -> usize {
        self.textures.len()
    }

    /// Get the bind group layout for font textures.
    pub fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("font_texture_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
    }

    /// Create a bind group for a live texture.
    pub fn bind_group(&self, id: TextureId, layout: &wgpu::BindGroupLayout) -> Option<wgpu::BindGroup> {
        let texture = self.textures.get(&id)?;
        Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("font_texture_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        }))
    }

    fn create_sampler(&self, filter: TextureFilter) -> wgpu::Sampler {
        let mode = match filter {
            TextureFilter::Point => wgpu::FilterMode::Nearest,
            TextureFilter::Bilinear => wgpu::FilterMode::Linear,
        };
        self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("font_texture_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: mode,
            min_filter: mode,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        })
    }
}

impl TextureBackend for WgpuTextures<'_> {
    fn upload(&mut self, image: &DynamicImage) -> FontResult<Texture> {
        check_not_empty(image)?;

        let max_dimension = self.device.limits().max_texture_dimension_2d;
        if image.width() > max_dimension || image.height() > max_dimension {
            return Err(FontError::TextureUpload(format!(
                "{}x{} exceeds the device limit of {max_dimension}",
                image.width(),
                image.height()
            )));
        }

        let format = PixelFormat::of(image);
        let (wgpu_format, data): (wgpu::TextureFormat, Vec<u8>) = match image {
            DynamicImage::ImageLuma8(gray) => (wgpu::TextureFormat::R8Unorm, gray.as_raw().clone()),
            DynamicImage::ImageLumaA8(gray_alpha) => {
                (wgpu::TextureFormat::Rg8Unorm, gray_alpha.as_raw().clone())
            }
            other => (wgpu::TextureFormat::Rgba8UnormSrgb, other.to_rgba8().into_raw()),
        };

        let (width, height) = (image.width(), image.height());
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("font_texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu_format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(format.bytes_per_pixel() * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = self.create_sampler(TextureFilter::default());
        let id = TextureId::next();

        debug!(
            target: "horizon_lattice_text::texture",
            id = id.get(),
            width,
            height,
            ?format,
            "uploaded font texture"
        );

        self.textures.insert(
            id,
            GpuTexture {
                texture,
                view,
                sampler,
            },
        );

        Ok(Texture {
            id,
            width,
            height,
            format,
        })
    }

    fn set_filter(&mut self, texture: &Texture, filter: TextureFilter) -> FontResult<()> {
        let sampler = self.create_sampler(filter);
        let entry = self
            .textures
            .get_mut(&texture.id)
            .ok_or(FontError::UnknownTexture(texture.id))?;
        entry.sampler = sampler;
        Ok(())
    }

    fn release(&mut self, texture: &Texture) -> FontResult<()> {
        let gpu = self
            .textures
            .remove(&texture.id)
            .ok_or(FontError::UnknownTexture(texture.id))?;
        gpu.texture.destroy();

        debug!(
            target: "horizon_lattice_text::texture",
            id = texture.id.get(),
            "released font texture"
        );
        Ok(())
    }
}

impl std::fmt::Debug for WgpuTextures<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WgpuTextures")
            .field("live", &self.textures.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use image::{GrayAlphaImage, GrayImage};

    use super::*;

    #[test]
    fn ids_are_unique_across_backends() {
        let image = DynamicImage::ImageLuma8(GrayImage::new(1, 1));
        let mut a = HeadlessTextures::new();
        let mut b = HeadlessTextures::new();
        let ta = a.upload(&image).unwrap();
        let tb = b.upload(&image).unwrap();
        assert_ne!(ta.id, tb.id);
    }

    #[test]
    fn headless_lifecycle() {
        let mut textures = HeadlessTextures::new();
        let image = DynamicImage::ImageLumaA8(GrayAlphaImage::new(4, 2));

        let texture = textures.upload(&image).unwrap();
        assert_eq!((texture.width, texture.height), (4, 2));
        assert_eq!(texture.format, PixelFormat::GrayAlpha);
        assert_eq!(textures.filter(texture.id), Some(TextureFilter::Point));

        textures.set_filter(&texture, TextureFilter::Bilinear).unwrap();
        assert_eq!(textures.filter(texture.id), Some(TextureFilter::Bilinear));

        textures.release(&texture).unwrap();
        assert!(!textures.contains(texture.id));
        assert_eq!(textures.released(), &[texture.id]);

        // A second release is reported, not ignored.
        assert!(matches!(
            textures.release(&texture),
            Err(FontError::UnknownTexture(id)) if id == texture.id
        ));
    }

    #[test]
    fn empty_image_is_rejected() {
        let mut textures = HeadlessTextures::new();
        let image = DynamicImage::ImageLuma8(GrayImage::new(0, 3));
        assert!(matches!(textures.upload(&image), Err(FontError::EmptyImage)));
    }

    #[test]
    fn texture_id_zero_is_invalid() {
        assert!(TextureId::new(0).is_none());
        assert_eq!(TextureId::new(7).map(TextureId::get), Some(7));
    }
}
