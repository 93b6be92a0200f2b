//! Tests against a real font file.
//!
//! Set `HORIZON_LATTICE_TEST_FONT` to a TrueType file, or install DejaVu Sans,
//! then run with:
//! ```
//! cargo test --package horizon-lattice-text -- --ignored
//! ```

mod common;

use std::path::PathBuf;

use horizon_lattice_text::{
    Font, FontConfig, FontType, GlyphSet, HeadlessTextures, PackStrategy, load_font_data,
    measure_text_ex,
};

fn font_path() -> PathBuf {
    std::env::var_os("HORIZON_LATTICE_TEST_FONT")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"))
}

#[test]
#[ignore = "requires a system font"]
fn test_load_system_font() {
    common::init_tracing();
    let mut textures = HeadlessTextures::new();
    let font = Font::load(font_path(), &mut textures);

    assert_eq!(font.glyph_count(), 95);
    assert!(font.is_loaded());

    let a = &font.glyphs()[font.glyph_index('A')];
    assert!(a.advance_x > 0);
    assert!(!a.is_empty());

    let size = measure_text_ex(&font, "Hello", 32.0, 0.0);
    assert!(size.width > 0.0);
    assert_eq!(size.height, 32.0);
}

#[test]
#[ignore = "requires a system font"]
fn test_load_system_font_sdf_shelf() {
    let mut textures = HeadlessTextures::new();
    let config = FontConfig::default()
        .with_base_size(48)
        .with_font_type(FontType::Sdf)
        .with_pack_strategy(PackStrategy::ShelfPack)
        .with_glyph_set(GlyphSet::Explicit("AgÅ€".chars().collect()));
    let font = Font::load_ex(font_path(), &config, &mut textures);

    assert_eq!(font.glyph_count(), 4);
    for glyph in font.glyphs() {
        // SDF glyphs carry 4 pixels of padding on every side.
        assert!(glyph.width() > 8 && glyph.height() > 8);
    }
}

#[test]
#[ignore = "requires a system font"]
fn test_bitmap_mode_is_binary() {
    let glyphs = load_font_data(font_path(), 20, &GlyphSet::Default, FontType::Bitmap);
    assert_eq!(glyphs.len(), 95);
    for glyph in &glyphs {
        assert!(glyph.coverage().pixels().all(|p| p[0] == 0 || p[0] == 255));
    }
}
