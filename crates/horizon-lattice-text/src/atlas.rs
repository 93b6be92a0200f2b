//! Font atlas generation.
//!
//! Packs glyph bitmaps into a single square, power-of-two image. The side is
//! estimated from the summed padded area of all glyphs with some slack, so
//! the atlas is never smaller than the tightest square that could hold them.
//!
//! Two strategies are available:
//!
//! - [`PackStrategy::RowFill`] places glyphs left to right in fixed-height
//!   rows of `base_size + 2 * padding` pixels, in input order. When vertical
//!   space runs out the remaining glyphs are left out. A glyph wider than
//!   the atlas is placed at the start of a row and clipped.
//! - [`PackStrategy::ShelfPack`] hands padded rectangles to a
//!   [`ShelfPacker`]. Glyphs that do not fit are reported as warnings and
//!   their pixels are skipped.
//!
//! The atlas is assembled as single-channel coverage and converted to
//! gray+alpha at the end: gray is forced to 255 and alpha carries coverage.

use image::imageops;
use image::{GrayAlphaImage, GrayImage, LumaA};
use tracing::{debug, warn};

use crate::glyph::{GlyphInfo, GlyphRect};
use crate::shelf::ShelfPacker;

/// Slack applied to the square root of the summed glyph area.
pub const ATLAS_SIZE_SLACK: f32 = 1.3;

/// How glyphs are laid out in the atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PackStrategy {
    /// Fixed-height rows filled in input order.
    #[default]
    RowFill,
    /// Shelf packing, tallest glyphs first.
    ShelfPack,
}

/// A generated atlas image and the placement of every glyph.
#[derive(Debug, Clone)]
pub struct FontAtlas {
    /// Square gray+alpha image. Gray is 255 everywhere, alpha is coverage.
    pub image: GrayAlphaImage,
    /// One rectangle per input glyph, in input order, excluding padding.
    pub rects: Vec<GlyphRect>,
}

impl FontAtlas {
    /// Side length of the atlas in pixels.
    #[inline]
    pub fn size(&self) -> u32 {
        self.image.width()
    }
}

/// Side length of the atlas needed for `glyphs` with `padding` on every side.
///
/// Always a power of two and at least 1.
pub fn atlas_size_for(glyphs: &[GlyphInfo], padding: u32) -> u32 {
    let required_area: f64 = glyphs
        .iter()
        .map(|g| {
            let w = f64::from(g.width()) + 2.0 * f64::from(padding);
            let h = f64::from(g.height()) + 2.0 * f64::from(padding);
            w * h
        })
        .sum();

    let guess = required_area.sqrt() * f64::from(ATLAS_SIZE_SLACK);
    let side = guess.ceil().clamp(1.0, f64::from(1u32 << 31)) as u32;
    side.next_power_of_two()
}

/// Pack `glyphs` into a new atlas.
///
/// `base_size` is the font's pixel size, used as the row height of
/// [`PackStrategy::RowFill`]. The returned rectangles are index-aligned with
/// `glyphs`; glyphs that could not be placed get an empty rectangle (row
/// fill) or a rectangle at [`ShelfPacker::UNPLACED`] (shelf pack).
pub fn gen_image_font_atlas(
    glyphs: &[GlyphInfo],
    base_size: u32,
    padding: u32,
    strategy: PackStrategy,
) -> FontAtlas {
    let size = atlas_size_for(glyphs, padding);
    let mut coverage = GrayImage::new(size, size);

    let rects = match strategy {
        PackStrategy::RowFill => pack_rows(glyphs, base_size, padding, &mut coverage),
        PackStrategy::ShelfPack => pack_shelves(glyphs, padding, &mut coverage),
    };

    debug!(
        target: "horizon_lattice_text::atlas",
        size,
        glyph_count = glyphs.len(),
        ?strategy,
        padding,
        "generated font atlas"
    );

    FontAtlas {
        image: to_gray_alpha(&coverage),
        rects,
    }
}

fn pack_rows(glyphs: &[GlyphInfo], base_size: u32, padding: u32, atlas: &mut GrayImage) -> Vec<GlyphRect> {
    let side = i64::from(atlas.width());
    let pad = i64::from(padding);
    let row_height = i64::from(base_size) + 2 * pad;

    let mut rects = vec![GlyphRect::default(); glyphs.len()];
    let mut offset_x = pad;
    let mut offset_y = pad;

    for (idx, glyph) in glyphs.iter().enumerate() {
        let width = i64::from(glyph.width());

        if offset_x + width + pad > side && offset_x > pad {
            offset_x = pad;
            offset_y += row_height;

            if offset_y > side - i64::from(base_size) - pad {
                warn!(
                    target: "horizon_lattice_text::atlas",
                    placed = idx,
                    skipped = glyphs.len() - idx,
                    "atlas rows exhausted"
                );
                break;
            }
        }

        if offset_x + width + pad > side {
            warn!(
                target: "horizon_lattice_text::atlas",
                index = idx,
                codepoint = ?glyph.codepoint,
                width = glyph.width(),
                side,
                "glyph wider than atlas, clipped"
            );
        }

        imageops::replace(atlas, &*glyph.coverage(), offset_x, offset_y);
        rects[idx] = GlyphRect::new(offset_x as u32, offset_y as u32, glyph.width(), glyph.height());

        offset_x += width + 2 * pad;
    }

    rects
}

fn pack_shelves(glyphs: &[GlyphInfo], padding: u32, atlas: &mut GrayImage) -> Vec<GlyphRect> {
    let sizes: Vec<(u32, u32)> = glyphs
        .iter()
        .map(|g| (g.width() + 2 * padding, g.height() + 2 * padding))
        .collect();

    let mut packer = ShelfPacker::new(atlas.width(), atlas.height());
    let placements = packer.pack(&sizes);

    let rects = glyphs
        .iter()
        .zip(&placements)
        .enumerate()
        .map(|(idx, (glyph, placement))| {
            let rect = GlyphRect::new(
                placement.x + padding,
                placement.y + padding,
                glyph.width(),
                glyph.height(),
            );

            if placement.packed {
                imageops::replace(atlas, &*glyph.coverage(), i64::from(rect.x), i64::from(rect.y));
            } else {
                warn!(
                    target: "horizon_lattice_text::atlas",
                    index = idx,
                    codepoint = ?glyph.codepoint,
                    "glyph did not fit in atlas"
                );
            }

            rect
        })
        .collect();

    debug!(
        target: "horizon_lattice_text::atlas",
        usage = packer.usage(),
        "shelf packing finished"
    );

    rects
}

/// Expand single-channel coverage into gray+alpha with gray fixed at 255.
pub fn to_gray_alpha(coverage: &GrayImage) -> GrayAlphaImage {
    GrayAlphaImage::from_fn(coverage.width(), coverage.height(), |x, y| {
        LumaA([255, coverage.get_pixel(x, y)[0]])
    })
}

#[cfg(test)]
mod tests {
    use image::Luma;

    use super::*;

    fn glyph(codepoint: char, width: u32, height: u32, value: u8) -> GlyphInfo {
        GlyphInfo::new(codepoint, width as i32, 0, 0, GrayImage::from_pixel(width, height, Luma([value])))
    }

    #[test]
    fn size_is_power_of_two_and_covers_area() {
        let glyphs: Vec<_> = (0..20).map(|i| glyph('a', 10 + i, 12, 1)).collect();
        let size = atlas_size_for(&glyphs, 2);
        assert!(size.is_power_of_two());

        let area: u32 = glyphs.iter().map(|g| (g.width() + 4) * (g.height() + 4)).sum();
        assert!(size * size >= area);
    }

    #[test]
    fn size_of_nothing() {
        assert_eq!(atlas_size_for(&[], 2), 1);
    }

    #[test]
    fn gray_alpha_conversion() {
        let mut coverage = GrayImage::new(2, 1);
        coverage.put_pixel(1, 0, Luma([200]));
        let converted = to_gray_alpha(&coverage);
        assert_eq!(converted.get_pixel(0, 0), &LumaA([255, 0]));
        assert_eq!(converted.get_pixel(1, 0), &LumaA([255, 200]));
    }

    #[test]
    fn row_fill_starts_at_padding() {
        let glyphs = vec![glyph('a', 6, 8, 255), glyph('b', 6, 8, 255)];
        let atlas = gen_image_font_atlas(&glyphs, 8, 2, PackStrategy::RowFill);

        assert_eq!(atlas.rects[0], GlyphRect::new(2, 2, 6, 8));
        assert_eq!(atlas.rects[1], GlyphRect::new(12, 2, 6, 8));
        assert_eq!(atlas.image.get_pixel(2, 2)[1], 255);
        assert_eq!(atlas.image.get_pixel(0, 0)[1], 0);
        assert!(atlas.image.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn row_fill_wraps_before_overflowing() {
        let glyphs: Vec<_> = (0..8).map(|_| glyph('x', 10, 10, 9)).collect();
        let atlas = gen_image_font_atlas(&glyphs, 10, 1, PackStrategy::RowFill);
        let size = atlas.size();

        for rect in &atlas.rects {
            assert!(rect.right() + 1 <= size, "{rect:?} exceeds {size}");
        }
        assert!(atlas.rects.iter().any(|r| r.y > 1));
    }

    #[test]
    fn row_fill_drops_glyphs_when_rows_run_out() {
        let glyphs: Vec<_> = (0..100).map(|_| glyph('x', 4, 1, 255)).collect();
        let atlas = gen_image_font_atlas(&glyphs, 32, 0, PackStrategy::RowFill);

        assert_eq!(atlas.size(), 32);
        assert_eq!(atlas.rects.len(), 100);
        for (i, rect) in atlas.rects[..8].iter().enumerate() {
            assert_eq!(*rect, GlyphRect::new(i as u32 * 4, 0, 4, 1));
        }
        assert!(atlas.rects[8..].iter().all(|r| *r == GlyphRect::default()));
        assert_eq!(atlas.image.pixels().filter(|p| p[1] == 255).count(), 32);
    }

    #[test]
    fn row_fill_clips_glyph_wider_than_atlas() {
        let glyphs = vec![glyph('w', 100, 1, 255)];
        let atlas = gen_image_font_atlas(&glyphs, 1, 0, PackStrategy::RowFill);

        assert_eq!(atlas.size(), 16);
        assert_eq!(atlas.rects[0], GlyphRect::new(0, 0, 100, 1));
        assert!((0..16).all(|x| atlas.image.get_pixel(x, 0)[1] == 255));
    }

    #[test]
    fn shelf_pack_marks_unplaced_glyph() {
        let glyphs = vec![glyph('w', 100, 1, 255)];
        let atlas = gen_image_font_atlas(&glyphs, 1, 1, PackStrategy::ShelfPack);

        let unplaced = ShelfPacker::UNPLACED + 1;
        assert_eq!(atlas.rects[0], GlyphRect::new(unplaced, unplaced, 100, 1));
        assert!(atlas.image.pixels().all(|p| p[1] == 0));
    }

    #[test]
    fn shelf_pack_places_every_glyph() {
        let glyphs: Vec<_> = (0..30u32).map(|i| glyph('x', 4 + i % 7, 6 + i % 5, 50)).collect();
        let atlas = gen_image_font_atlas(&glyphs, 12, 2, PackStrategy::ShelfPack);

        assert_eq!(atlas.rects.len(), glyphs.len());
        for (i, a) in atlas.rects.iter().enumerate() {
            assert!(a.right() <= atlas.size() && a.bottom() <= atlas.size());
            assert_eq!(atlas.image.get_pixel(a.x, a.y)[1], 50);
            for b in &atlas.rects[i + 1..] {
                assert!(!a.overlaps(b));
            }
        }
    }
}
