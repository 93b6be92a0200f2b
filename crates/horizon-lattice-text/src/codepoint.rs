//! Strict, recovery-oriented UTF-8 decoding.
//!
//! Text handed to the measurement and drawing routines is treated as raw
//! bytes. Malformed sequences never fail: they decode to the replacement
//! codepoint `'?'` together with a partial byte count, so a caller walking the
//! buffer always makes forward progress and resynchronizes on the next byte
//! instead of skipping the whole malformed run.
//!
//! A NUL byte in continuation position, or the end of the slice, both count as
//! an absent byte. Nothing past either is ever read.
//!
//! ```
//! use horizon_lattice_text::codepoint::get_next_codepoint;
//!
//! assert_eq!(get_next_codepoint(b"A"), ('A', 1));
//! assert_eq!(get_next_codepoint("é".as_bytes()), ('é', 2));
//! // Truncated three byte sequence.
//! assert_eq!(get_next_codepoint(&[0xE2]), ('?', 2));
//! ```

/// Codepoint substituted for malformed input.
///
/// The Unicode replacement character U+FFFD is not used because bitmap fonts
/// built from the default ASCII set do not contain it.
pub const REPLACEMENT_CODEPOINT: char = '?';

/// Highest valid Unicode scalar value.
const MAX_CODEPOINT: u32 = 0x10FFFF;

/// Byte at `index`, or NUL when the slice ends first.
#[inline]
fn byte_at(bytes: &[u8], index: usize) -> u8 {
    bytes.get(index).copied().unwrap_or(0)
}

/// Returns true for a non-NUL `10xxxxxx` continuation byte.
#[inline]
fn is_tail(byte: u8) -> bool {
    byte != 0 && (byte >> 6) == 0b10
}

/// Decode the next codepoint from `bytes`.
///
/// Returns the codepoint and the number of bytes to advance. Malformed
/// sequences return [`REPLACEMENT_CODEPOINT`] and advance only up to the first
/// offending byte:
///
/// | Input                                    | Result       |
/// |------------------------------------------|--------------|
/// | `0x00..=0x7F`                            | ASCII, 1     |
/// | 2-byte lead, bad or absent tail          | `'?'`, 2     |
/// | `0xC0`/`0xC1` lead (overlong)            | `'?'`, 1     |
/// | 3/4-byte lead, n-th tail bad or absent   | `'?'`, n + 1 |
/// | `0xE0`, `0xED`, `0xF0`, `0xF4` range miss | `'?'`, 2     |
/// | `0xF5..=0xF7` lead                       | `'?'`, 1     |
/// | stray continuation or `0xF8..`           | `'?'`, 1     |
///
/// An empty slice returns `('?', 0)`.
pub fn get_next_codepoint(bytes: &[u8]) -> (char, usize) {
    let Some(&octet) = bytes.first() else {
        return (REPLACEMENT_CODEPOINT, 0);
    };

    let (code, processed) = if octet <= 0x7F {
        (u32::from(octet), 1)
    } else if octet & 0xE0 == 0xC0 {
        decode_two(bytes, octet)
    } else if octet & 0xF0 == 0xE0 {
        decode_three(bytes, octet)
    } else if octet & 0xF8 == 0xF0 {
        decode_four(bytes, octet)
    } else {
        return (REPLACEMENT_CODEPOINT, 1);
    };

    if code > MAX_CODEPOINT {
        return (REPLACEMENT_CODEPOINT, processed);
    }

    (
        char::from_u32(code).unwrap_or(REPLACEMENT_CODEPOINT),
        processed,
    )
}

const REPLACEMENT: u32 = REPLACEMENT_CODEPOINT as u32;

fn decode_two(bytes: &[u8], octet: u8) -> (u32, usize) {
    // [0]xC2-DF [1]tail
    let octet1 = byte_at(bytes, 1);
    if !is_tail(octet1) {
        return (REPLACEMENT, 2);
    }

    if (0xC2..=0xDF).contains(&octet) {
        let code = (u32::from(octet & 0x1F) << 6) | u32::from(octet1 & 0x3F);
        (code, 2)
    } else {
        (REPLACEMENT, 1)
    }
}

fn decode_three(bytes: &[u8], octet: u8) -> (u32, usize) {
    // [0]xE0    [1]xA0-BF [2]tail
    // [0]xE1-EC [1]tail   [2]tail
    // [0]xED    [1]x80-9F [2]tail
    // [0]xEE-EF [1]tail   [2]tail
    let octet1 = byte_at(bytes, 1);
    if !is_tail(octet1) {
        return (REPLACEMENT, 2);
    }

    let octet2 = byte_at(bytes, 2);
    if !is_tail(octet2) {
        return (REPLACEMENT, 3);
    }

    let out_of_range = match octet {
        0xE0 => !(0xA0..=0xBF).contains(&octet1),
        0xED => !(0x80..=0x9F).contains(&octet1),
        _ => false,
    };
    if out_of_range {
        return (REPLACEMENT, 2);
    }

    let code = (u32::from(octet & 0x0F) << 12)
        | (u32::from(octet1 & 0x3F) << 6)
        | u32::from(octet2 & 0x3F);
    (code, 3)
}

fn decode_four(bytes: &[u8], octet: u8) -> (u32, usize) {
    // [0]xF0    [1]x90-BF [2]tail [3]tail
    // [0]xF1-F3 [1]tail   [2]tail [3]tail
    // [0]xF4    [1]x80-8F [2]tail [3]tail
    if octet > 0xF4 {
        return (REPLACEMENT, 1);
    }

    let octet1 = byte_at(bytes, 1);
    if !is_tail(octet1) {
        return (REPLACEMENT, 2);
    }

    let octet2 = byte_at(bytes, 2);
    if !is_tail(octet2) {
        return (REPLACEMENT, 3);
    }

    let octet3 = byte_at(bytes, 3);
    if !is_tail(octet3) {
        return (REPLACEMENT, 4);
    }

    let out_of_range = match octet {
        0xF0 => !(0x90..=0xBF).contains(&octet1),
        0xF4 => !(0x80..=0x8F).contains(&octet1),
        _ => false,
    };
    if out_of_range {
        return (REPLACEMENT, 2);
    }

    let code = (u32::from(octet & 0x07) << 18)
        | (u32::from(octet1 & 0x3F) << 12)
        | (u32::from(octet2 & 0x3F) << 6)
        | u32::from(octet3 & 0x3F);
    (code, 4)
}

/// Encode a codepoint as UTF-8.
///
/// Returns the encoded bytes in a fixed buffer and the number of bytes used.
pub fn codepoint_to_utf8(codepoint: char) -> ([u8; 4], usize) {
    let mut buf = [0u8; 4];
    let len = codepoint.encode_utf8(&mut buf).len();
    (buf, len)
}

/// A decoded codepoint together with its position in the source bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedCodepoint {
    /// Byte offset of the sequence in the source text.
    pub offset: usize,
    /// The decoded codepoint.
    pub codepoint: char,
    /// Number of bytes consumed.
    pub len: usize,
}

/// Iterator walking a byte string codepoint by codepoint.
///
/// Every [`REPLACEMENT_CODEPOINT`] consumes exactly one byte, whatever the
/// decoder reported, so a run of garbage bytes yields a run of `'?'` rather
/// than collapsing into fewer replacements. Iteration stops at the first NUL
/// byte.
#[derive(Debug, Clone)]
pub struct Codepoints<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Codepoints<'a> {
    /// Create an iterator over `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }
}

impl Iterator for Codepoints<'_> {
    type Item = DecodedCodepoint;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self
            .bytes
            .get(self.offset..)
            .filter(|r| r.first().is_some_and(|&b| b != 0))?;
        let (codepoint, len) = get_next_codepoint(rest);
        let len = if codepoint == REPLACEMENT_CODEPOINT { 1 } else { len };

        let decoded = DecodedCodepoint {
            offset: self.offset,
            codepoint,
            len,
        };
        self.offset += len;
        Some(decoded)
    }
}

/// Walk `text` codepoint by codepoint with the renderer's recovery rules.
pub fn codepoints<T: AsRef<[u8]> + ?Sized>(text: &T) -> Codepoints<'_> {
    Codepoints::new(text.as_ref())
}

/// Count the codepoints the renderer would see in `text`.
pub fn codepoint_count<T: AsRef<[u8]> + ?Sized>(text: &T) -> usize {
    codepoints(text).count()
}
