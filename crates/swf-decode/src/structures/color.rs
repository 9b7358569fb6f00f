use crate::bits::{BitCursor, BitPosition, Located};
use crate::error::Result;
use crate::primitives::{read_flag, read_sb, read_ub};

/// `RGB`, `RGBA` and `ARGB` all decode into this; `alpha` is `None` for `RGB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub position: BitPosition,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: Option<u8>,
}

impl Color {
    pub fn alpha_or_opaque(&self) -> u8 {
        self.alpha.unwrap_or(0xFF)
    }
}

pub fn decode_rgb(c: &mut BitCursor<'_>) -> Result<Color> {
    let position = c.position();
    let [red, green, blue] = {
        let b = c.read_aligned_bytes(3)?;
        [b[0], b[1], b[2]]
    };
    Ok(Color {
        position,
        red,
        green,
        blue,
        alpha: None,
    })
}

pub fn decode_rgba(c: &mut BitCursor<'_>) -> Result<Color> {
    let position = c.position();
    let b = c.read_aligned_bytes(4)?;
    Ok(Color {
        position,
        red: b[0],
        green: b[1],
        blue: b[2],
        alpha: Some(b[3]),
    })
}

pub fn decode_argb(c: &mut BitCursor<'_>) -> Result<Color> {
    let position = c.position();
    let b = c.read_aligned_bytes(4)?;
    Ok(Color {
        position,
        red: b[1],
        green: b[2],
        blue: b[3],
        alpha: Some(b[0]),
    })
}

/// One set of per-channel terms of a color transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorTerms {
    pub red: Located<i32>,
    pub green: Located<i32>,
    pub blue: Located<i32>,
    /// Present only in `CXFORMWITHALPHA`.
    pub alpha: Option<Located<i32>>,
}

/// `CXFORM` / `CXFORMWITHALPHA`. Byte-aligned after decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorTransform {
    pub has_add_terms: Located<bool>,
    pub has_mult_terms: Located<bool>,
    pub nbits: Located<u32>,
    pub mult: Option<ColorTerms>,
    pub add: Option<ColorTerms>,
}

fn decode_terms(c: &mut BitCursor<'_>, nbits: u32, with_alpha: bool) -> Result<ColorTerms> {
    Ok(ColorTerms {
        red: read_sb(c, nbits)?,
        green: read_sb(c, nbits)?,
        blue: read_sb(c, nbits)?,
        alpha: if with_alpha {
            Some(read_sb(c, nbits)?)
        } else {
            None
        },
    })
}

fn decode_transform(c: &mut BitCursor<'_>, with_alpha: bool) -> Result<ColorTransform> {
    let has_add_terms = read_flag(c)?;
    let has_mult_terms = read_flag(c)?;
    let nbits = read_ub(c, 4)?;
    let mult = if has_mult_terms.value {
        Some(decode_terms(c, nbits.value, with_alpha)?)
    } else {
        None
    };
    let add = if has_add_terms.value {
        Some(decode_terms(c, nbits.value, with_alpha)?)
    } else {
        None
    };
    c.align();
    Ok(ColorTransform {
        has_add_terms,
        has_mult_terms,
        nbits,
        mult,
        add,
    })
}

pub fn decode_cxform(c: &mut BitCursor<'_>) -> Result<ColorTransform> {
    decode_transform(c, false)
}

pub fn decode_cxform_with_alpha(c: &mut BitCursor<'_>) -> Result<ColorTransform> {
    decode_transform(c, true)
}
