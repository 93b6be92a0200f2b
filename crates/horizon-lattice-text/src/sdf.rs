//! Signed distance field generation from glyph outlines.
//!
//! The outline is flattened into line segments in pixel space (y down). Every
//! output pixel stores `on_edge + dist_scale * d`, clamped to `0..=255`, where
//! `d` is the distance from the pixel center to the nearest segment, positive
//! inside the glyph and negative outside. Inside-ness uses the non-zero
//! winding rule.

use image::GrayImage;
use ttf_parser::{Face, GlyphId, OutlineBuilder};

use crate::engine::{BitmapBox, GlyphBitmap, SdfParams};

/// Upper bound on segments emitted per curve.
const MAX_CURVE_STEPS: f32 = 32.0;

/// Target length in pixels of one flattened curve segment.
const CURVE_STEP_PX: f32 = 1.5;

#[derive(Debug, Clone, Copy)]
struct Segment {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
}

impl Segment {
    fn distance_to(&self, px: f32, py: f32) -> f32 {
        let dx = self.x1 - self.x0;
        let dy = self.y1 - self.y0;
        let len_sq = dx * dx + dy * dy;

        let t = if len_sq > 0.0 {
            (((px - self.x0) * dx + (py - self.y0) * dy) / len_sq).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let cx = self.x0 + t * dx - px;
        let cy = self.y0 + t * dy - py;
        (cx * cx + cy * cy).sqrt()
    }

    /// Winding contribution of a ray cast from `(px, py)` towards +x.
    fn winding(&self, px: f32, py: f32) -> i32 {
        let upward = self.y0 <= py && py < self.y1;
        let downward = self.y1 <= py && py < self.y0;
        if !upward && !downward {
            return 0;
        }

        let t = (py - self.y0) / (self.y1 - self.y0);
        let x = self.x0 + t * (self.x1 - self.x0);
        if x <= px {
            return 0;
        }

        if upward { 1 } else { -1 }
    }
}

/// Collects an outline as line segments, scaled to pixels with y flipped.
struct Flattener {
    scale: f32,
    segments: Vec<Segment>,
    start: (f32, f32),
    current: (f32, f32),
}

impl Flattener {
    fn new(scale: f32) -> Self {
        Self {
            scale,
            segments: Vec::new(),
            start: (0.0, 0.0),
            current: (0.0, 0.0),
        }
    }

    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.scale, -y * self.scale)
    }

    fn push_line(&mut self, to: (f32, f32)) {
        let from = self.current;
        if from != to {
            self.segments.push(Segment {
                x0: from.0,
                y0: from.1,
                x1: to.0,
                y1: to.1,
            });
        }
        self.current = to;
    }

    fn steps_for(points: &[(f32, f32)]) -> usize {
        let length: f32 = points
            .windows(2)
            .map(|w| ((w[1].0 - w[0].0).powi(2) + (w[1].1 - w[0].1).powi(2)).sqrt())
            .sum();
        (length / CURVE_STEP_PX).ceil().clamp(1.0, MAX_CURVE_STEPS) as usize
    }
}

impl OutlineBuilder for Flattener {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.map(x, y);
        self.start = p;
        self.current = p;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.map(x, y);
        self.push_line(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let p0 = self.current;
        let p1 = self.map(x1, y1);
        let p2 = self.map(x, y);
        let steps = Self::steps_for(&[p0, p1, p2]);

        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            let mt = 1.0 - t;
            let px = mt * mt * p0.0 + 2.0 * mt * t * p1.0 + t * t * p2.0;
            let py = mt * mt * p0.1 + 2.0 * mt * t * p1.1 + t * t * p2.1;
            self.push_line((px, py));
        }
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let p0 = self.current;
        let p1 = self.map(x1, y1);
        let p2 = self.map(x2, y2);
        let p3 = self.map(x, y);
        let steps = Self::steps_for(&[p0, p1, p2, p3]);

        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            let mt = 1.0 - t;
            let a = mt * mt * mt;
            let b = 3.0 * mt * mt * t;
            let c = 3.0 * mt * t * t;
            let d = t * t * t;
            let px = a * p0.0 + b * p1.0 + c * p2.0 + d * p3.0;
            let py = a * p0.1 + b * p1.1 + c * p2.1 + d * p3.1;
            self.push_line((px, py));
        }
    }

    fn close(&mut self) {
        let start = self.start;
        self.push_line(start);
    }
}

/// Pixel box of a font-unit bounding box at `scale`, y pointing down.
pub(crate) fn bitmap_box(bbox: ttf_parser::Rect, scale: f32) -> BitmapBox {
    BitmapBox {
        x0: (f32::from(bbox.x_min) * scale).floor() as i32,
        y0: (-f32::from(bbox.y_max) * scale).floor() as i32,
        x1: (f32::from(bbox.x_max) * scale).ceil() as i32,
        y1: (-f32::from(bbox.y_min) * scale).ceil() as i32,
    }
}

/// Render the distance field of `glyph`.
///
/// Returns `None` for glyphs without an outline or with an empty pixel box.
pub(crate) fn glyph_sdf(
    face: &Face<'_>,
    glyph: GlyphId,
    scale: f32,
    params: &SdfParams,
) -> Option<GlyphBitmap> {
    if scale <= 0.0 {
        return None;
    }

    let mut flattener = Flattener::new(scale);
    let bbox = face.outline_glyph(glyph, &mut flattener)?;
    let pixel_box = bitmap_box(bbox, scale);
    if pixel_box.width() <= 0 || pixel_box.height() <= 0 {
        return None;
    }

    let padding = params.padding as i32;
    let x0 = pixel_box.x0 - padding;
    let y0 = pixel_box.y0 - padding;
    let width = (pixel_box.width() + 2 * padding) as u32;
    let height = (pixel_box.height() + 2 * padding) as u32;

    let image = render_field(&flattener.segments, x0, y0, width, height, params);

    Some(GlyphBitmap {
        image,
        offset_x: x0,
        offset_y: y0,
    })
}

fn render_field(
    segments: &[Segment],
    x0: i32,
    y0: i32,
    width: u32,
    height: u32,
    params: &SdfParams,
) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let px = (x0 + x as i32) as f32 + 0.5;
        let py = (y0 + y as i32) as f32 + 0.5;

        let mut min_dist = f32::MAX;
        let mut winding = 0;
        for segment in segments {
            min_dist = min_dist.min(segment.distance_to(px, py));
            winding += segment.winding(px, py);
        }
        if segments.is_empty() {
            min_dist = 0.0;
        }

        let signed = if winding != 0 { min_dist } else { -min_dist };
        let value = f32::from(params.on_edge_value) + params.pixel_dist_scale * signed;
        image::Luma([value.clamp(0.0, 255.0) as u8])
    })
}
