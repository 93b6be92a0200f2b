//! Font atlas generation and bitmap text rendering for Horizon Lattice.
//!
//! This crate turns TrueType/OpenType fonts into a single texture atlas plus
//! per-glyph metrics, and lays out text against that atlas. It covers:
//!
//! - Decoding UTF-8 text with recovery from malformed bytes ([`codepoint`])
//! - Rasterizing glyphs as anti-aliased, thresholded or SDF bitmaps ([`loader`])
//! - Packing glyphs into a power-of-two atlas ([`atlas`])
//! - Uploading the atlas through a [`TextureBackend`]
//! - Measuring and drawing text ([`measure_text_ex`], [`draw_text_ex`])
//!
//! # Loading a Font
//!
//! ```no_run
//! use horizon_lattice_text::{Font, FontConfig, FontType, HeadlessTextures, PackStrategy};
//!
//! let mut textures = HeadlessTextures::new();
//!
//! // 32px, printable ASCII, row-fill packing
//! let font = Font::load("assets/fonts/Inter-Regular.ttf", &mut textures);
//!
//! // Custom configuration
//! let config = FontConfig::default()
//!     .with_base_size(48)
//!     .with_font_type(FontType::Sdf)
//!     .with_pack_strategy(PackStrategy::ShelfPack);
//! let sdf_font = Font::load_ex("assets/fonts/Inter-Regular.ttf", &config, &mut textures);
//! ```
//!
//! # Drawing Text
//!
//! Drawing emits [`GlyphQuad`]s into a [`GlyphSink`]. A `Vec<GlyphQuad>` is
//! the simplest sink:
//!
//! ```no_run
//! use horizon_lattice_text::{measure_text_ex, text_quads, Color, Font, HeadlessTextures, Point};
//!
//! # let mut textures = HeadlessTextures::new();
//! let font = Font::load("assets/fonts/Inter-Regular.ttf", &mut textures);
//!
//! let size = measure_text_ex(&font, "Hello, World!", 24.0, 1.0);
//! let quads = text_quads(&font, "Hello, World!", Point::new(10.0, 10.0), 24.0, 1.0, Color::WHITE);
//! println!("{} glyphs in {}x{}", quads.len(), size.width, size.height);
//! ```

pub mod atlas;
pub mod codepoint;
pub mod default_font;
mod engine;
mod error;
mod font;
mod glyph;
pub mod loader;
mod sdf;
mod shelf;
mod text;
mod texture;
mod types;

// Core types
pub use error::{FontError, FontResult};
pub use font::{DEFAULT_GLYPH_PADDING, Font, FontConfig};
pub use glyph::{GlyphInfo, GlyphRect};
pub use types::{Color, Point, Rect, Size};

// Rasterization and packing
pub use atlas::{FontAtlas, PackStrategy, gen_image_font_atlas};
pub use codepoint::{REPLACEMENT_CODEPOINT, codepoint_to_utf8, get_next_codepoint};
pub use engine::{BitmapBox, GlyphBitmap, OutlineEngine, SdfParams, TrueTypeEngine, VerticalMetrics};
pub use loader::{FontType, GlyphSet, load_font_data, rasterize_glyphs, try_load_font_data};
pub use shelf::{Placement, ShelfPacker};

// Textures
pub use texture::{
    HeadlessTextures, PixelFormat, Texture, TextureBackend, TextureFilter, TextureId, WgpuTextures,
};

// Text layout
pub use text::{
    GlyphQuad, GlyphSink, GlyphVertex, LINE_SPACING_FACTOR, draw_text_ex, measure_text_ex, text_quads,
};

// Re-export image for callers that build glyphs by hand
pub use image;
