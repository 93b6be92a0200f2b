//! Per-glyph data shared by the loader, the atlas packer and the renderer.

use std::borrow::Cow;

use image::{DynamicImage, GrayImage, Luma};

use crate::types::Rect;

/// A rasterized glyph and its metrics.
///
/// The loader produces glyphs whose `image` is a standalone single-channel
/// (`Luma8`) bitmap. Once a font is assembled, `image` is replaced with a
/// freshly allocated two-channel (`LumaA8`) copy of the glyph's region in the
/// finished atlas, so it matches what was uploaded to the GPU.
#[derive(Debug, Clone)]
pub struct GlyphInfo {
    /// The codepoint this glyph represents.
    pub codepoint: char,
    /// Horizontal advance in pixels at the font's base size.
    pub advance_x: i32,
    /// Offset from the pen position to the left edge of the bitmap.
    pub offset_x: i32,
    /// Offset from the top of the line to the top edge of the bitmap.
    pub offset_y: i32,
    /// Pixel data.
    pub image: DynamicImage,
}

impl GlyphInfo {
    /// Create a glyph from a single-channel bitmap.
    pub fn new(codepoint: char, advance_x: i32, offset_x: i32, offset_y: i32, image: GrayImage) -> Self {
        Self {
            codepoint,
            advance_x,
            offset_x,
            offset_y,
            image: DynamicImage::ImageLuma8(image),
        }
    }

    /// Bitmap width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Bitmap height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Check whether the glyph has no visible pixels.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Single-channel coverage of this glyph.
    ///
    /// Standalone bitmaps are borrowed as-is. Glyphs re-sliced from an atlas
    /// carry coverage in their alpha channel, which is extracted.
    pub fn coverage(&self) -> Cow<'_, GrayImage> {
        match &self.image {
            DynamicImage::ImageLuma8(gray) => Cow::Borrowed(gray),
            DynamicImage::ImageLumaA8(gray_alpha) => {
                Cow::Owned(GrayImage::from_fn(gray_alpha.width(), gray_alpha.height(), |x, y| {
                    Luma([gray_alpha.get_pixel(x, y)[1]])
                }))
            }
            other => Cow::Owned(other.to_luma8()),
        }
    }
}

/// Placement of a glyph inside an atlas, in atlas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GlyphRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl GlyphRect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check whether the rectangle covers no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Check whether two rectangles share any pixel.
    ///
    /// Empty rectangles cover no pixels and never overlap.
    pub fn overlaps(&self, other: &GlyphRect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.right() && other.x < self.right() && self.y < other.bottom() && other.y < self.bottom()
    }

    /// Convert to a float rectangle for drawing.
    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
        )
    }

    /// Get normalized UV coordinates for this rectangle.
    ///
    /// Returns (u_min, v_min, u_max, v_max).
    pub fn uv_rect(&self, atlas_size: u32) -> (f32, f32, f32, f32) {
        let size = atlas_size as f32;
        (
            self.x as f32 / size,
            self.y as f32 / size,
            (self.x + self.width) as f32 / size,
            (self.y + self.height) as f32 / size,
        )
    }
}

#[cfg(test)]
mod tests {
    use image::{GrayAlphaImage, LumaA};

    use super::*;

    #[test]
    fn test_glyph_rect_uv() {
        let rect = GlyphRect::new(100, 200, 50, 60);

        let (u_min, v_min, u_max, v_max) = rect.uv_rect(1000);
        assert_eq!(u_min, 0.1);
        assert_eq!(v_min, 0.2);
        assert_eq!(u_max, 0.15);
        assert_eq!(v_max, 0.26);
    }

    #[test]
    fn test_glyph_rect_overlap() {
        let a = GlyphRect::new(0, 0, 10, 10);
        assert!(a.overlaps(&GlyphRect::new(5, 5, 10, 10)));
        assert!(!a.overlaps(&GlyphRect::new(10, 0, 10, 10)));
        assert!(!a.overlaps(&GlyphRect::new(0, 10, 10, 10)));
        // Empty rectangles never overlap anything.
        assert!(!a.overlaps(&GlyphRect::new(5, 5, 0, 0)));
        assert!(!GlyphRect::new(5, 5, 0, 3).overlaps(&a));
        assert!(GlyphRect::default().is_empty());
    }

    #[test]
    fn test_coverage_from_gray() {
        let glyph = GlyphInfo::new('a', 8, 0, 0, GrayImage::from_pixel(2, 2, Luma([42])));
        let coverage = glyph.coverage();
        assert!(matches!(coverage, Cow::Borrowed(_)));
        assert_eq!(coverage.get_pixel(1, 1)[0], 42);
    }

    #[test]
    fn test_coverage_from_atlas_slice() {
        let slice = GrayAlphaImage::from_pixel(3, 1, LumaA([255, 77]));
        let glyph = GlyphInfo {
            codepoint: 'b',
            advance_x: 8,
            offset_x: 0,
            offset_y: 0,
            image: DynamicImage::ImageLumaA8(slice),
        };
        let coverage = glyph.coverage();
        assert_eq!(coverage.dimensions(), (3, 1));
        assert!(coverage.pixels().all(|p| p[0] == 77));
    }

    #[test]
    fn test_empty_glyph() {
        let glyph = GlyphInfo::new(' ', 8, 0, 0, GrayImage::new(0, 0));
        assert!(glyph.is_empty());
    }
}
