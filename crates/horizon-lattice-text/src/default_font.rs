//! Process-wide default font.
//!
//! One font can be registered as the default. While registered it is shared
//! through [`get`], and [`Font::unload`](crate::Font::unload) refuses to
//! release its texture, so copies held by callers stay drawable. The font is
//! released only by [`teardown`].
//!
//! A font is recognized as the default by its texture id.
//!
//! # Example
//!
//! ```no_run
//! use horizon_lattice_text::{default_font, Font, HeadlessTextures};
//!
//! let mut textures = HeadlessTextures::new();
//! let font = Font::load("assets/fonts/default.ttf", &mut textures);
//! default_font::init(font)?;
//!
//! let shared = default_font::get().expect("initialized above");
//! assert!(default_font::is_default(&shared));
//!
//! default_font::teardown(&mut textures);
//! # Ok::<(), horizon_lattice_text::FontError>(())
//! ```

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::error::{FontError, FontResult};
use crate::font::Font;
use crate::texture::{TextureBackend, TextureId};

/// The registered default font.
static DEFAULT_FONT: RwLock<Option<Arc<Font>>> = RwLock::new(None);

/// Register `font` as the default font.
///
/// # Errors
///
/// Returns [`FontError::DefaultFontAlreadyInitialized`] if a default font is
/// already registered. The rejected font is dropped without releasing its
/// texture.
pub fn init(font: Font) -> FontResult<Arc<Font>> {
    let mut slot = DEFAULT_FONT.write();
    if slot.is_some() {
        return Err(FontError::DefaultFontAlreadyInitialized);
    }

    let font = Arc::new(font);
    info!(
        target: "horizon_lattice_text::default_font",
        texture_id = font.texture().map(|t| t.id.get()),
        glyph_count = font.glyph_count(),
        "default font initialized"
    );
    *slot = Some(Arc::clone(&font));
    Ok(font)
}

/// The default font, if one is registered.
pub fn get() -> Option<Arc<Font>> {
    DEFAULT_FONT.read().clone()
}

/// Check if a default font is registered.
pub fn is_initialized() -> bool {
    DEFAULT_FONT.read().is_some()
}

/// Texture id of the default font.
pub fn texture_id() -> Option<TextureId> {
    DEFAULT_FONT
        .read()
        .as_ref()
        .and_then(|font| font.texture())
        .map(|t| t.id)
}

/// Check whether `font` is (a copy of) the default font.
///
/// Fonts without a texture are never the default.
pub fn is_default(font: &Font) -> bool {
    match (font.texture(), texture_id()) {
        (Some(texture), Some(default)) => texture.id == default,
        _ => false,
    }
}

/// Unregister the default font and release its texture.
///
/// Returns `true` if a font was registered. Copies of the font obtained
/// through [`get`] keep their glyph data but their texture handle is dead.
pub fn teardown(textures: &mut dyn TextureBackend) -> bool {
    let Some(font) = DEFAULT_FONT.write().take() else {
        return false;
    };

    if let Some(texture) = font.texture() {
        if let Err(e) = textures.release(texture) {
            warn!(
                target: "horizon_lattice_text::default_font",
                texture_id = texture.id.get(),
                error = %e,
                "failed to release default font texture"
            );
        }
    }

    info!(
        target: "horizon_lattice_text::default_font",
        "default font torn down"
    );
    true
}
