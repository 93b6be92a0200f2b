//! Glyph data loading.
//!
//! Turns a font file into per-glyph bitmaps and metrics at a fixed pixel
//! size. Three rendering modes are supported:
//!
//! - [`FontType::Default`]: anti-aliased coverage.
//! - [`FontType::Bitmap`]: coverage thresholded to fully on or off.
//! - [`FontType::Sdf`]: a signed distance field, with the space glyph left
//!   empty.
//!
//! Vertical offsets are measured from the top of the line: the scaled ascent
//! is added to the engine's baseline-relative offset, so every glyph of a line
//! shares the same origin.

use std::borrow::Cow;
use std::path::Path;

use image::GrayImage;
use tracing::{debug, warn};

use crate::engine::{GlyphBitmap, OutlineEngine, SdfParams, TrueTypeEngine};
use crate::error::{FontError, FontResult};
use crate::glyph::GlyphInfo;

/// Pixel height used when no size is requested.
pub const DEFAULT_FONT_SIZE: u32 = 32;

/// First codepoint of the default glyph set.
pub const DEFAULT_FIRST_CHAR: char = ' ';

/// Number of glyphs in the default set (printable ASCII).
pub const DEFAULT_GLYPH_COUNT: usize = 95;

/// Coverage below this value is cleared in [`FontType::Bitmap`] mode.
pub const BITMAP_ALPHA_THRESHOLD: u8 = 80;

const MAX_CODEPOINT: u32 = char::MAX as u32;

/// How glyph bitmaps are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontType {
    /// Anti-aliased coverage.
    #[default]
    Default,
    /// Coverage thresholded to 0 or 255.
    Bitmap,
    /// Signed distance field.
    Sdf,
}

/// The codepoints to rasterize.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GlyphSet {
    /// Printable ASCII, `' '` through `'~'`.
    #[default]
    Default,
    /// `count` consecutive codepoints starting at `first`.
    ///
    /// A count of zero selects [`DEFAULT_GLYPH_COUNT`]. Values that are not
    /// Unicode scalars (surrogates) are skipped, and the range stops at
    /// U+10FFFF.
    Consecutive { first: char, count: usize },
    /// An explicit list. An empty list selects the default set.
    Explicit(Vec<char>),
}

impl GlyphSet {
    /// Resolve the set into its codepoints, in rasterization order.
    pub fn codepoints(&self) -> Cow<'_, [char]> {
        match self {
            Self::Default => Cow::Owned(consecutive(DEFAULT_FIRST_CHAR, DEFAULT_GLYPH_COUNT)),
            Self::Consecutive { first, count: 0 } => Cow::Owned(consecutive(*first, DEFAULT_GLYPH_COUNT)),
            Self::Consecutive { first, count } => Cow::Owned(consecutive(*first, *count)),
            Self::Explicit(chars) if chars.is_empty() => {
                Cow::Owned(consecutive(DEFAULT_FIRST_CHAR, DEFAULT_GLYPH_COUNT))
            }
            Self::Explicit(chars) => Cow::Borrowed(chars),
        }
    }
}

fn consecutive(first: char, count: usize) -> Vec<char> {
    let start = first as u32;
    let end = start.saturating_add(u32::try_from(count).unwrap_or(u32::MAX)).min(MAX_CODEPOINT + 1);
    (start..end).filter_map(char::from_u32).collect()
}

/// Load glyph data from a font file.
///
/// Failures are logged as warnings and produce an empty list. Use
/// [`try_load_font_data`] to observe the error.
pub fn load_font_data(
    path: impl AsRef<Path>,
    font_size: u32,
    glyph_set: &GlyphSet,
    font_type: FontType,
) -> Vec<GlyphInfo> {
    let path = path.as_ref();
    match try_load_font_data(path, font_size, glyph_set, font_type) {
        Ok(glyphs) => glyphs,
        Err(e) => {
            warn!(
                target: "horizon_lattice_text::loader",
                path = %path.display(),
                error = %e,
                "failed to load font data"
            );
            Vec::new()
        }
    }
}

/// Load glyph data from a font file, reporting failures.
///
/// # Errors
///
/// - [`FontError::Io`] if the file cannot be read
/// - [`FontError::InvalidFont`] if the data is not a usable font
pub fn try_load_font_data(
    path: impl AsRef<Path>,
    font_size: u32,
    glyph_set: &GlyphSet,
    font_type: FontType,
) -> FontResult<Vec<GlyphInfo>> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| FontError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let engine = TrueTypeEngine::new(&data)?;
    let codepoints = glyph_set.codepoints();

    debug!(
        target: "horizon_lattice_text::loader",
        path = %path.display(),
        font_size,
        glyph_count = codepoints.len(),
        ?font_type,
        "loading font data"
    );

    Ok(rasterize_glyphs(&engine, font_size, &codepoints, font_type))
}

/// Rasterize `codepoints` with an already initialized engine.
///
/// Output order matches `codepoints`. Codepoints the font does not cover
/// still produce an entry, rendered from the font's fallback glyph.
pub fn rasterize_glyphs<E>(
    engine: &E,
    font_size: u32,
    codepoints: &[char],
    font_type: FontType,
) -> Vec<GlyphInfo>
where
    E: OutlineEngine + ?Sized,
{
    let scale = engine.scale_for_pixel_height(font_size as f32);
    let metrics = engine.vertical_metrics();
    let ascent = (metrics.ascent as f32 * scale) as i32;
    let sdf = SdfParams::default();

    codepoints
        .iter()
        .map(|&codepoint| {
            let mut bitmap = match font_type {
                FontType::Sdf if codepoint == ' ' => GlyphBitmap::empty(),
                FontType::Sdf => engine.codepoint_sdf(codepoint, scale, &sdf),
                FontType::Default | FontType::Bitmap => engine.codepoint_bitmap(codepoint, scale),
            };

            if font_type == FontType::Bitmap {
                apply_threshold(&mut bitmap.image, BITMAP_ALPHA_THRESHOLD);
            }

            let bbox = engine.codepoint_bitmap_box(codepoint, scale);
            let offset_y = bitmap.offset_y + ascent;
            let advance_x = (engine.horizontal_advance(codepoint) as f32 * scale) as i32;

            debug!(
                target: "horizon_lattice_text::loader",
                ?codepoint,
                x0 = bbox.x0,
                y0 = bbox.y0,
                width = bbox.width(),
                height = bbox.height(),
                offset_y,
                advance_x,
                "rasterized glyph"
            );

            GlyphInfo::new(codepoint, advance_x, bitmap.offset_x, offset_y, bitmap.image)
        })
        .collect()
}

/// Clear pixels below `cutoff` and saturate the rest.
pub fn apply_threshold(image: &mut GrayImage, cutoff: u8) {
    for pixel in image.pixels_mut() {
        pixel[0] = if pixel[0] < cutoff { 0 } else { 255 };
    }
}

#[cfg(test)]
mod tests {
    use image::Luma;

    use super::*;
    use crate::engine::{BitmapBox, VerticalMetrics};

    /// Engine whose glyphs are solid 10x16 boxes sitting on the baseline.
    struct BoxEngine;

    impl OutlineEngine for BoxEngine {
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

        fn codepoint_bitmap(&self, codepoint: char, _scale: f32) -> GlyphBitmap {
            if codepoint == ' ' {
                return GlyphBitmap::empty();
            }
            let image = GrayImage::from_fn(10, 16, |x, _| Luma([(x * 25) as u8]));
            GlyphBitmap {
                image,
                offset_x: 1,
                offset_y: -16,
            }
        }

        fn codepoint_sdf(&self, _codepoint: char, _scale: f32, params: &SdfParams) -> GlyphBitmap {
            let pad = params.padding;
            GlyphBitmap {
                image: GrayImage::from_pixel(10 + 2 * pad, 16 + 2 * pad, Luma([params.on_edge_value])),
                offset_x: 1 - pad as i32,
                offset_y: -16 - pad as i32,
            }
        }

        fn codepoint_bitmap_box(&self, _codepoint: char, _scale: f32) -> BitmapBox {
            BitmapBox {
                x0: 1,
                y0: -16,
                x1: 11,
                y1: 0,
            }
        }

        fn horizontal_advance(&self, _codepoint: char) -> i32 {
            625
        }
    }

    #[test]
    fn default_set_is_printable_ascii() {
        let default = GlyphSet::default();
        let set = default.codepoints();
        assert_eq!(set.len(), DEFAULT_GLYPH_COUNT);
        assert_eq!(set[0], ' ');
        assert_eq!(set[DEFAULT_GLYPH_COUNT - 1], '~');
    }

    #[test]
    fn empty_explicit_set_falls_back_to_default() {
        assert_eq!(GlyphSet::Explicit(Vec::new()).codepoints().len(), DEFAULT_GLYPH_COUNT);
        let explicit = GlyphSet::Explicit(vec!['x', 'é']);
        assert_eq!(&*explicit.codepoints(), &['x', 'é']);
    }

    #[test]
    fn consecutive_set_skips_surrogates() {
        let set = GlyphSet::Consecutive {
            first: '\u{D7FF}',
            count: 3,
        };
        // U+D800 and U+D801 are surrogates.
        assert_eq!(&*set.codepoints(), &['\u{D7FF}']);

        let cyrillic = GlyphSet::Consecutive {
            first: 'А',
            count: 0,
        };
        let codepoints = cyrillic.codepoints();
        assert_eq!(codepoints.len(), DEFAULT_GLYPH_COUNT);
        assert_eq!(codepoints[0], 'А');
    }

    #[test]
    fn consecutive_set_stops_at_last_scalar() {
        let set = GlyphSet::Consecutive {
            first: '\u{10FFFE}',
            count: usize::MAX,
        };
        assert_eq!(&*set.codepoints(), &['\u{10FFFE}', '\u{10FFFF}']);
    }

    #[test]
    fn rasterize_preserves_order_and_metrics() {
        let glyphs = rasterize_glyphs(&BoxEngine, 32, &['A', ' ', 'B'], FontType::Default);
        assert_eq!(glyphs.len(), 3);
        assert_eq!(glyphs[0].codepoint, 'A');
        assert_eq!(glyphs[2].codepoint, 'B');

        // 625 units at 32 / 1000 px per unit.
        assert_eq!(glyphs[0].advance_x, 20);
        // Ascent of 800 units is 25 px; the box top sits 16 px above the baseline.
        assert_eq!(glyphs[0].offset_y, 25 - 16);
        assert_eq!(glyphs[0].offset_x, 1);
        assert_eq!((glyphs[0].width(), glyphs[0].height()), (10, 16));
        assert!(glyphs[1].is_empty());
    }

    #[test]
    fn bitmap_mode_thresholds_coverage() {
        let glyphs = rasterize_glyphs(&BoxEngine, 32, &['A'], FontType::Bitmap);
        let coverage = glyphs[0].coverage();
        // Column 3 has coverage 75, column 4 has 100.
        assert_eq!(coverage.get_pixel(3, 0)[0], 0);
        assert_eq!(coverage.get_pixel(4, 0)[0], 255);
        assert!(coverage.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn sdf_mode_pads_and_skips_space() {
        let glyphs = rasterize_glyphs(&BoxEngine, 32, &[' ', 'A'], FontType::Sdf);
        assert!(glyphs[0].is_empty());
        assert_eq!((glyphs[1].width(), glyphs[1].height()), (18, 24));
        assert_eq!(glyphs[1].offset_x, -3);
        assert_eq!(glyphs[1].offset_y, 25 - 20);
        assert_eq!(glyphs[1].coverage().get_pixel(0, 0)[0], 128);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.ttf");

        let result = try_load_font_data(&path, 32, &GlyphSet::Default, FontType::Default);
        assert!(matches!(result, Err(FontError::Io { .. })));
        assert!(load_font_data(&path, 32, &GlyphSet::Default, FontType::Default).is_empty());
    }

    #[test]
    fn garbage_file_is_invalid_font() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.ttf");
        std::fs::write(&path, b"not a font").unwrap();

        let result = try_load_font_data(&path, 32, &GlyphSet::Default, FontType::Default);
        assert!(matches!(result, Err(FontError::InvalidFont(_))));
    }
}
