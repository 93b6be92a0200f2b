//! Shared helpers for integration tests.

#![allow(dead_code)]

use horizon_lattice_text::image::{GrayImage, Luma};
use horizon_lattice_text::{
    BitmapBox, GlyphBitmap, OutlineEngine, SdfParams, VerticalMetrics,
};

/// Install a test-friendly tracing subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A fake font with 1000 units per pixel-height em.
///
/// Every glyph except space is a solid box 10px wide and 16px tall at 32px,
/// scaled linearly with the requested size. Each glyph advances 625 units
/// (20px at 32px).
pub struct MockEngine {
    pub advance: i32,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self { advance: 625 }
    }
}

impl MockEngine {
    fn box_size(scale: f32) -> (u32, u32) {
        let width = (312.5 * scale).round() as u32;
        let height = (500.0 * scale).round() as u32;
        (width, height)
    }
}

impl OutlineEngine for MockEngine {
    fn scale_for_pixel_height(&self, pixel_height: f32) -> f32 {
        pixel_height / 1000.0
    }

    fn vertical_metrics(&self) -> VerticalMetrics {
        VerticalMetrics {
            ascent: 800,
            descent: -200,
            line_gap: 0,
        }
    }

    fn codepoint_bitmap(&self, codepoint: char, scale: f32) -> GlyphBitmap {
        if codepoint.is_whitespace() {
            return GlyphBitmap::empty();
        }
        let (width, height) = Self::box_size(scale);
        GlyphBitmap {
            image: GrayImage::from_pixel(width, height, Luma([200])),
            offset_x: 1,
            offset_y: -(height as i32),
        }
    }

    fn codepoint_sdf(&self, _codepoint: char, scale: f32, params: &SdfParams) -> GlyphBitmap {
        let (width, height) = Self::box_size(scale);
        let pad = params.padding;
        GlyphBitmap {
            image: GrayImage::from_pixel(
                width + 2 * pad,
                height + 2 * pad,
                Luma([params.on_edge_value]),
            ),
            offset_x: 1 - pad as i32,
            offset_y: -(height as i32) - pad as i32,
        }
    }

    fn codepoint_bitmap_box(&self, codepoint: char, scale: f32) -> BitmapBox {
        if codepoint.is_whitespace() {
            return BitmapBox::default();
        }
        let (width, height) = Self::box_size(scale);
        BitmapBox {
            x0: 1,
            y0: -(height as i32),
            x1: 1 + width as i32,
            y1: 0,
        }
    }

    fn horizontal_advance(&self, _codepoint: char) -> i32 {
        self.advance
    }
}
