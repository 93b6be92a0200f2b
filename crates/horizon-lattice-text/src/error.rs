//! Error types for the text crate.

use std::path::PathBuf;

use thiserror::Error;

use crate::texture::TextureId;

/// Errors that can occur while loading fonts or managing their textures.
///
/// Most public entry points are "soft": they log these errors as warnings and
/// hand back an empty value instead. The `try_*` variants surface them.
#[derive(Error, Debug)]
pub enum FontError {
    /// The font file could not be read.
    #[error("failed to read font file {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The outline engine rejected the font data.
    #[error("invalid font data: {0}")]
    InvalidFont(String),

    /// No glyphs were requested or produced.
    #[error("glyph set is empty")]
    EmptyGlyphSet,

    /// An image with zero width or height was passed to the texture subsystem.
    #[error("cannot upload an empty image")]
    EmptyImage,

    /// The texture backend failed to upload an image.
    #[error("texture upload failed: {0}")]
    TextureUpload(String),

    /// The texture handle is not known to the backend.
    #[error("unknown texture {0:?}")]
    UnknownTexture(TextureId),

    /// The process-wide default font was initialized twice.
    #[error("default font already initialized")]
    DefaultFontAlreadyInitialized,
}

/// Result type for font operations.
pub type FontResult<T> = Result<T, FontError>;
