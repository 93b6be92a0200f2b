//! Vector-font engine used to rasterize glyphs.
//!
//! The loader talks to fonts exclusively through the [`OutlineEngine`] trait:
//! a scale factor for a pixel height, the shared vertical metrics, a bitmap
//! (plain or signed distance field) per codepoint and a horizontal advance.
//!
//! [`TrueTypeEngine`] is the shipped implementation. It reads metrics and
//! outlines with `ttf-parser` and produces anti-aliased coverage bitmaps with
//! `fontdue`. Distance fields are computed directly from the `ttf-parser`
//! outline.

use image::GrayImage;
use ttf_parser::{Face, GlyphId};

use crate::error::{FontError, FontResult};
use crate::sdf;

/// Unscaled vertical metrics of a font face, in font units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VerticalMetrics {
    /// Distance from the baseline to the top of the tallest glyph.
    pub ascent: i32,
    /// Distance from the baseline to the bottom of the lowest glyph (negative).
    pub descent: i32,
    /// Recommended extra spacing between lines.
    pub line_gap: i32,
}

/// Integer pixel bounding box of a glyph at some scale, y pointing down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BitmapBox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl BitmapBox {
    /// Width of the box in pixels.
    pub fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    /// Height of the box in pixels.
    pub fn height(&self) -> i32 {
        self.y1 - self.y0
    }
}

/// A rasterized glyph as produced by an engine.
#[derive(Debug, Clone)]
pub struct GlyphBitmap {
    /// Single-channel coverage (or distance) values.
    pub image: GrayImage,
    /// Horizontal offset from the pen position to the left edge of the bitmap.
    pub offset_x: i32,
    /// Vertical offset from the baseline to the top edge of the bitmap, y down.
    pub offset_y: i32,
}

impl GlyphBitmap {
    /// A glyph with no ink.
    pub fn empty() -> Self {
        Self {
            image: GrayImage::new(0, 0),
            offset_x: 0,
            offset_y: 0,
        }
    }

    /// Check whether the bitmap has no pixels.
    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }
}

/// Tuning constants for signed distance field generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SdfParams {
    /// Extra pixels added around the glyph box on every side.
    pub padding: u32,
    /// Value written for pixels exactly on the outline.
    pub on_edge_value: u8,
    /// Value change per pixel of distance from the outline.
    pub pixel_dist_scale: f32,
}

impl Default for SdfParams {
    fn default() -> Self {
        Self {
            padding: 4,
            on_edge_value: 128,
            pixel_dist_scale: 64.0,
        }
    }
}

/// A vector font that can be measured and rasterized per codepoint.
pub trait OutlineEngine {
    /// Scale factor mapping font units to pixels for the given pixel height.
    fn scale_for_pixel_height(&self, pixel_height: f32) -> f32;

    /// Unscaled vertical metrics shared by every glyph.
    fn vertical_metrics(&self) -> VerticalMetrics;

    /// Anti-aliased coverage bitmap for a codepoint.
    fn codepoint_bitmap(&self, codepoint: char, scale: f32) -> GlyphBitmap;

    /// Signed distance field for a codepoint.
    fn codepoint_sdf(&self, codepoint: char, scale: f32, params: &SdfParams) -> GlyphBitmap;

    /// Pixel bounding box of a codepoint's outline.
    fn codepoint_bitmap_box(&self, codepoint: char, scale: f32) -> BitmapBox;

    /// Unscaled horizontal advance of a codepoint, in font units.
    fn horizontal_advance(&self, codepoint: char) -> i32;
}

/// TrueType/OpenType engine backed by `ttf-parser` and `fontdue`.
///
/// Borrows the font file bytes for its whole lifetime; dropping the engine
/// releases nothing but the parsed tables.
pub struct TrueTypeEngine<'a> {
    face: Face<'a>,
    raster: fontdue::Font,
}

impl<'a> TrueTypeEngine<'a> {
    /// Initialize the engine from the raw bytes of a font file.
    pub fn new(data: &'a [u8]) -> FontResult<Self> {
        let face = Face::parse(data, 0).map_err(|e| FontError::InvalidFont(e.to_string()))?;
        let raster = fontdue::Font::from_bytes(data, fontdue::FontSettings::default())
            .map_err(|e| FontError::InvalidFont(e.to_string()))?;

        Ok(Self { face, raster })
    }

    /// Font units per em square.
    pub fn units_per_em(&self) -> u16 {
        self.face.units_per_em()
    }

    /// Number of glyphs in the face.
    pub fn glyph_count(&self) -> u16 {
        self.face.number_of_glyphs()
    }

    /// Glyph for a codepoint, falling back to `.notdef` when the font lacks it.
    fn glyph_id(&self, codepoint: char) -> GlyphId {
        self.face.glyph_index(codepoint).unwrap_or(GlyphId(0))
    }
}

impl OutlineEngine for TrueTypeEngine<'_> {
    fn scale_for_pixel_height(&self, pixel_height: f32) -> f32 {
        let height = i32::from(self.face.ascender()) - i32::from(self.face.descender());
        if height == 0 {
            return 0.0;
        }
        pixel_height / height as f32
    }

    fn vertical_metrics(&self) -> VerticalMetrics {
        VerticalMetrics {
            ascent: i32::from(self.face.ascender()),
            descent: i32::from(self.face.descender()),
            line_gap: i32::from(self.face.line_gap()),
        }
    }

    fn codepoint_bitmap(&self, codepoint: char, scale: f32) -> GlyphBitmap {
        // fontdue sizes glyphs by em, the engine contract scales by pixel height.
        let px = scale * f32::from(self.face.units_per_em());
        let (metrics, coverage) = self.raster.rasterize(codepoint, px);
        if metrics.width == 0 || metrics.height == 0 {
            return GlyphBitmap::empty();
        }

        let (Ok(width), Ok(height)) = (u32::try_from(metrics.width), u32::try_from(metrics.height))
        else {
            return GlyphBitmap::empty();
        };
        let Some(image) = GrayImage::from_raw(width, height, coverage) else {
            return GlyphBitmap::empty();
        };

        GlyphBitmap {
            image,
            offset_x: metrics.xmin,
            // fontdue reports the bottom edge with y up.
            offset_y: -(metrics.ymin + height as i32),
        }
    }

    fn codepoint_sdf(&self, codepoint: char, scale: f32, params: &SdfParams) -> GlyphBitmap {
        sdf::glyph_sdf(&self.face, self.glyph_id(codepoint), scale, params)
            .unwrap_or_else(GlyphBitmap::empty)
    }

    fn codepoint_bitmap_box(&self, codepoint: char, scale: f32) -> BitmapBox {
        self.face
            .glyph_bounding_box(self.glyph_id(codepoint))
            .map(|bbox| sdf::bitmap_box(bbox, scale))
            .unwrap_or_default()
    }

    fn horizontal_advance(&self, codepoint: char) -> i32 {
        self.face
            .glyph_hor_advance(self.glyph_id(codepoint))
            .map(i32::from)
            .unwrap_or(0)
    }
}

impl std::fmt::Debug for TrueTypeEngine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrueTypeEngine")
            .field("units_per_em", &self.face.units_per_em())
            .field("glyph_count", &self.face.number_of_glyphs())
            .finish_non_exhaustive()
    }
}
