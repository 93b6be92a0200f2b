//! Text measurement and drawing.
//!
//! Both walk the text with the renderer's decoding rules (see
//! [`codepoints`](crate::codepoint::codepoints)): malformed bytes show up as
//! `'?'`, one byte at a time, and a NUL byte ends the text.
//!
//! Layout is deliberately simple. A line feed returns the pen to the left
//! edge and moves it down by 1.5 times the font size. Every other codepoint
//! advances the pen by its glyph's advance (or atlas width when the advance is
//! zero) plus `spacing`. Spaces and tabs advance without drawing.
//!
//! Drawing does not talk to a GPU. It emits one [`GlyphQuad`] per visible
//! glyph into a [`GlyphSink`]; batching and submission belong to the sink.

use bytemuck::{Pod, Zeroable};

use crate::codepoint::codepoints;
use crate::font::Font;
use crate::texture::Texture;
use crate::types::{Color, Point, Rect, Size};

/// Line height as a multiple of the font size.
pub const LINE_SPACING_FACTOR: f32 = 1.5;

/// One glyph to draw: where it is in the atlas and where it goes on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphQuad {
    /// Codepoint the glyph was drawn for.
    pub codepoint: char,
    /// Source rectangle in atlas pixels.
    pub source: Rect,
    /// Destination rectangle in target pixels.
    pub dest: Rect,
    /// Tint color.
    pub tint: Color,
}

impl GlyphQuad {
    /// Vertices of this quad as two triangles' worth of corners.
    ///
    /// Corners are ordered top-left, top-right, bottom-right, bottom-left;
    /// index with `[0, 1, 2, 0, 2, 3]`.
    pub fn vertices(&self, atlas_size: Size) -> [GlyphVertex; 4] {
        let (u0, v0) = (
            self.source.left() / atlas_size.width,
            self.source.top() / atlas_size.height,
        );
        let (u1, v1) = (
            self.source.right() / atlas_size.width,
            self.source.bottom() / atlas_size.height,
        );
        let d = &self.dest;

        [
            GlyphVertex::new([d.left(), d.top()], [u0, v0], self.tint),
            GlyphVertex::new([d.right(), d.top()], [u1, v0], self.tint),
            GlyphVertex::new([d.right(), d.bottom()], [u1, v1], self.tint),
            GlyphVertex::new([d.left(), d.bottom()], [u0, v1], self.tint),
        ]
    }
}

/// Vertex for textured glyph quads.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GlyphVertex {
    /// Position in pixels.
    pub position: [f32; 2],
    /// Texture coordinates.
    pub uv: [f32; 2],
    /// Color (premultiplied alpha).
    pub color: [f32; 4],
}

impl GlyphVertex {
    fn new(position: [f32; 2], uv: [f32; 2], color: Color) -> Self {
        Self {
            position,
            uv,
            color: color.to_array(),
        }
    }

    const ATTRIBS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x2, // uv
        2 => Float32x4, // color
    ];

    /// Vertex buffer layout matching this struct.
    pub fn buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Receives glyph quads produced by [`draw_text_ex`].
pub trait GlyphSink {
    /// Draw one glyph from `texture`.
    fn draw_glyph(&mut self, texture: &Texture, quad: &GlyphQuad);
}

impl GlyphSink for Vec<GlyphQuad> {
    fn draw_glyph(&mut self, _texture: &Texture, quad: &GlyphQuad) {
        self.push(*quad);
    }
}

/// Scale from the font's base size to `font_size`, or `None` for fonts that
/// cannot be laid out.
fn layout_scale(font: &Font, font_size: f32) -> Option<f32> {
    if font.is_empty() || font.base_size() == 0 {
        return None;
    }
    Some(font_size / font.base_size() as f32)
}

/// Draw `text` with its top-left corner at `position`.
///
/// Nothing is emitted for an empty or unloaded font.
pub fn draw_text_ex<T, S>(
    font: &Font,
    text: &T,
    position: Point,
    font_size: f32,
    spacing: f32,
    tint: Color,
    sink: &mut S,
) where
    T: AsRef<[u8]> + ?Sized,
    S: GlyphSink + ?Sized,
{
    let (Some(scale), Some(texture)) = (layout_scale(font, font_size), font.texture()) else {
        return;
    };
    let line_advance = font.base_size() as f32 * LINE_SPACING_FACTOR * scale;

    let mut offset_x = 0.0;
    let mut offset_y = 0.0;

    for decoded in codepoints(text) {
        let codepoint = decoded.codepoint;
        if codepoint == '\n' {
            offset_x = 0.0;
            offset_y += line_advance;
            continue;
        }

        let index = font.glyph_index(codepoint);
        let (Some(glyph), Some(rect)) = (font.glyphs().get(index), font.rects().get(index)) else {
            continue;
        };

        if codepoint != ' ' && codepoint != '\t' {
            let dest = Rect::new(
                position.x + offset_x + glyph.offset_x as f32 * scale,
                position.y + offset_y + glyph.offset_y as f32 * scale,
                rect.width as f32 * scale,
                rect.height as f32 * scale,
            );
            let quad = GlyphQuad {
                codepoint,
                source: rect.to_rect(),
                dest,
                tint,
            };
            sink.draw_glyph(texture, &quad);
        }

        let advance = if glyph.advance_x == 0 {
            rect.width as f32
        } else {
            glyph.advance_x as f32
        };
        offset_x += advance * scale + spacing;
    }
}

/// Lay out `text` and collect the resulting quads.
pub fn text_quads<T>(
    font: &Font,
    text: &T,
    position: Point,
    font_size: f32,
    spacing: f32,
    tint: Color,
) -> Vec<GlyphQuad>
where
    T: AsRef<[u8]> + ?Sized,
{
    let mut quads = Vec::new();
    draw_text_ex(font, text, position, font_size, spacing, tint, &mut quads);
    quads
}

/// Measure the size `text` would occupy when drawn.
///
/// The width is the widest line plus `spacing` for every gap on the line with
/// the most codepoints. The height grows by 1.5 times the font size per line
/// feed. Empty text, or an empty font, measures as zero.
pub fn measure_text_ex<T>(font: &Font, text: &T, font_size: f32, spacing: f32) -> Size
where
    T: AsRef<[u8]> + ?Sized,
{
    let Some(scale) = layout_scale(font, font_size) else {
        return Size::ZERO;
    };

    let base_size = font.base_size() as f32;
    let mut line_width = 0.0f32;
    let mut max_width = 0.0f32;
    let mut line_len = 0usize;
    let mut max_len = 0usize;
    let mut height = base_size;
    let mut empty = true;

    for decoded in codepoints(text) {
        empty = false;
        line_len += 1;

        if decoded.codepoint == '\n' {
            max_width = max_width.max(line_width);
            line_width = 0.0;
            line_len = 0;
            height += base_size * LINE_SPACING_FACTOR;
        } else {
            let index = font.glyph_index(decoded.codepoint);
            if let (Some(glyph), Some(rect)) = (font.glyphs().get(index), font.rects().get(index)) {
                line_width += if glyph.advance_x == 0 {
                    rect.width as f32
                } else {
                    glyph.advance_x as f32
                };
            }
        }

        max_len = max_len.max(line_len);
    }

    if empty {
        return Size::ZERO;
    }

    max_width = max_width.max(line_width);
    let gaps = max_len.saturating_sub(1) as f32;

    Size::new(max_width * scale + gaps * spacing, height * scale)
}
