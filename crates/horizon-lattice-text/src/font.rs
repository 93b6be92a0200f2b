//! Font assembly, lookup and unloading.

use std::path::Path;

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::atlas::{PackStrategy, gen_image_font_atlas};
use crate::default_font;
use crate::error::{FontError, FontResult};
use crate::glyph::{GlyphInfo, GlyphRect};
use crate::loader::{self, DEFAULT_FONT_SIZE, FontType, GlyphSet};
use crate::texture::{Texture, TextureBackend, TextureFilter};

/// Default padding around each glyph in the atlas, in pixels.
pub const DEFAULT_GLYPH_PADDING: u32 = 2;

/// Configuration for loading a font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontConfig {
    /// Pixel height glyphs are rasterized at.
    pub base_size: u32,
    /// Codepoints to include.
    pub glyph_set: GlyphSet,
    /// Rendering mode.
    pub font_type: FontType,
    /// Empty pixels around each glyph in the atlas.
    pub padding: u32,
    /// Atlas packing strategy.
    pub pack_strategy: PackStrategy,
    /// Sampling filter applied to the atlas texture.
    pub filter: TextureFilter,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            base_size: DEFAULT_FONT_SIZE,
            glyph_set: GlyphSet::Default,
            font_type: FontType::Default,
            padding: DEFAULT_GLYPH_PADDING,
            pack_strategy: PackStrategy::RowFill,
            filter: TextureFilter::Point,
        }
    }
}

impl FontConfig {
    /// Set the base pixel size.
    pub fn with_base_size(mut self, base_size: u32) -> Self {
        self.base_size = base_size;
        self
    }

    /// Set the glyph set.
    pub fn with_glyph_set(mut self, glyph_set: GlyphSet) -> Self {
        self.glyph_set = glyph_set;
        self
    }

    /// Set the rendering mode.
    pub fn with_font_type(mut self, font_type: FontType) -> Self {
        self.font_type = font_type;
        self
    }

    /// Set the atlas padding.
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    /// Set the packing strategy.
    pub fn with_pack_strategy(mut self, pack_strategy: PackStrategy) -> Self {
        self.pack_strategy = pack_strategy;
        self
    }

    /// Set the texture filter.
    pub fn with_filter(mut self, filter: TextureFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// A rasterized font: glyph metrics, atlas rectangles and the atlas texture.
///
/// `glyphs` and `rects` are index-aligned. After assembly each glyph's image
/// is a gray+alpha copy of its atlas region.
#[derive(Debug, Clone, Default)]
pub struct Font {
    base_size: u32,
    glyphs: Vec<GlyphInfo>,
    rects: Vec<GlyphRect>,
    texture: Option<Texture>,
}

impl Font {
    /// Load a font with the default configuration.
    ///
    /// Returns an empty font and logs a warning on failure.
    pub fn load(path: impl AsRef<Path>, textures: &mut dyn TextureBackend) -> Font {
        Self::load_ex(path, &FontConfig::default(), textures)
    }

    /// Load a font with an explicit configuration.
    ///
    /// Returns an empty font and logs a warning on failure.
    pub fn load_ex(path: impl AsRef<Path>, config: &FontConfig, textures: &mut dyn TextureBackend) -> Font {
        let path = path.as_ref();
        match Self::try_load_ex(path, config, textures) {
            Ok(font) => font,
            Err(e) => {
                warn!(
                    target: "horizon_lattice_text::font",
                    path = %path.display(),
                    error = %e,
                    "failed to load font"
                );
                Font::default()
            }
        }
    }

    /// Load a font, reporting failures.
    ///
    /// # Errors
    ///
    /// Any error of [`loader::try_load_font_data`] or [`Font::from_glyphs`].
    pub fn try_load_ex(
        path: impl AsRef<Path>,
        config: &FontConfig,
        textures: &mut dyn TextureBackend,
    ) -> FontResult<Font> {
        let glyphs =
            loader::try_load_font_data(path, config.base_size, &config.glyph_set, config.font_type)?;
        Self::from_glyphs(glyphs, config, textures)
    }

    /// Assemble a font from already rasterized glyphs.
    ///
    /// Packs the glyphs into an atlas, uploads it and replaces every glyph's
    /// image with its region of the atlas. Uses `base_size`, `padding`,
    /// `pack_strategy` and `filter` from `config`.
    ///
    /// # Errors
    ///
    /// - [`FontError::EmptyGlyphSet`] if `glyphs` is empty
    /// - any error of [`TextureBackend::upload`]
    pub fn from_glyphs(
        glyphs: Vec<GlyphInfo>,
        config: &FontConfig,
        textures: &mut dyn TextureBackend,
    ) -> FontResult<Font> {
        if glyphs.is_empty() {
            return Err(FontError::EmptyGlyphSet);
        }

        let atlas = gen_image_font_atlas(&glyphs, config.base_size, config.padding, config.pack_strategy);
        let rects = atlas.rects;
        let atlas_image = DynamicImage::ImageLumaA8(atlas.image);

        let texture = textures.upload(&atlas_image)?;
        if let Err(e) = textures.set_filter(&texture, config.filter) {
            warn!(
                target: "horizon_lattice_text::font",
                error = %e,
                "failed to set atlas filter"
            );
        }

        let glyphs: Vec<GlyphInfo> = glyphs
            .into_iter()
            .zip(&rects)
            .map(|(glyph, rect)| GlyphInfo {
                image: atlas_image.crop_imm(rect.x, rect.y, rect.width, rect.height),
                ..glyph
            })
            .collect();

        info!(
            target: "horizon_lattice_text::font",
            texture_id = texture.id.get(),
            atlas_size = texture.width,
            glyph_count = glyphs.len(),
            base_size = config.base_size,
            "font assembled"
        );

        Ok(Font {
            base_size: config.base_size,
            glyphs,
            rects,
            texture: Some(texture),
        })
    }

    /// Release the font's texture and glyph data.
    ///
    /// Does nothing for the default font, which stays valid until
    /// [`default_font::teardown`]. Otherwise the texture is released once and
    /// the font is left empty, so calling this again is harmless.
    pub fn unload(&mut self, textures: &mut dyn TextureBackend) {
        if default_font::is_default(self) {
            debug!(
                target: "horizon_lattice_text::font",
                "ignoring unload of the default font"
            );
            return;
        }

        if let Some(texture) = self.texture.take() {
            if let Err(e) = textures.release(&texture) {
                warn!(
                    target: "horizon_lattice_text::font",
                    texture_id = texture.id.get(),
                    error = %e,
                    "failed to release font texture"
                );
            }
            debug!(
                target: "horizon_lattice_text::font",
                texture_id = texture.id.get(),
                "unloaded font"
            );
        }

        self.glyphs.clear();
        self.rects.clear();
    }

    /// Index of the glyph for `codepoint`.
    ///
    /// Falls back to the glyph for `'?'`, then to index 0, when the font does
    /// not contain the codepoint. Callers must check [`Font::is_empty`] before
    /// indexing with the result.
    pub fn glyph_index(&self, codepoint: char) -> usize {
        self.find(codepoint)
            .or_else(|| self.find('?'))
            .unwrap_or(0)
    }

    fn find(&self, codepoint: char) -> Option<usize> {
        self.glyphs.iter().position(|g| g.codepoint == codepoint)
    }

    /// Glyph and atlas rectangle for `codepoint`, with the same fallback as
    /// [`Font::glyph_index`].
    pub fn glyph(&self, codepoint: char) -> Option<(&GlyphInfo, &GlyphRect)> {
        let index = self.glyph_index(codepoint);
        Some((self.glyphs.get(index)?, self.rects.get(index)?))
    }

    /// Pixel size glyphs were rasterized at.
    #[inline]
    pub fn base_size(&self) -> u32 {
        self.base_size
    }

    /// Number of glyphs.
    #[inline]
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// All glyphs, index-aligned with [`Font::rects`].
    #[inline]
    pub fn glyphs(&self) -> &[GlyphInfo] {
        &self.glyphs
    }

    /// Atlas rectangles, index-aligned with [`Font::glyphs`].
    #[inline]
    pub fn rects(&self) -> &[GlyphRect] {
        &self.rects
    }

    /// Atlas texture, if the font is loaded.
    #[inline]
    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    /// Check whether the font has no glyphs.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Check whether the font owns a live atlas texture.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.texture.is_some()
    }
}
