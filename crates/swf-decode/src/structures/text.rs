//! Static text records and font-side records (kerning, alignment zones).

use crate::bits::{BitCursor, BitPosition, Located};
use crate::error::Result;
use crate::primitives::{
    check_count, read_float16, read_flag, read_sb, read_si16, read_ub, read_ui16, read_ui8,
    Float16,
};
use crate::structures::color::{decode_rgb, decode_rgba, Color};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphEntry {
    pub index: Located<u32>,
    pub advance: Located<i32>,
}

/// One `TEXTRECORD` of a `DefineText`/`DefineText2` body.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRecord {
    pub position: BitPosition,
    pub font_id: Option<Located<u16>>,
    pub color: Option<Color>,
    pub x_offset: Option<Located<i16>>,
    pub y_offset: Option<Located<i16>>,
    pub height: Option<Located<u16>>,
    pub glyphs: Vec<GlyphEntry>,
}

/// Decodes text records up to and including the `0` end byte.
///
/// `with_alpha` selects `RGBA` colors (`DefineText2`).
pub fn decode_text_records(
    c: &mut BitCursor<'_>,
    glyph_bits: u32,
    advance_bits: u32,
    with_alpha: bool,
) -> Result<Vec<TextRecord>> {
    let mut records = Vec::new();
    loop {
        let position = c.position();
        let flags = c.read_u8()?;
        if flags == 0 {
            break;
        }

        let has_font = flags & 0b1000 != 0;
        let has_color = flags & 0b0100 != 0;
        let has_y_offset = flags & 0b0010 != 0;
        let has_x_offset = flags & 0b0001 != 0;

        let font_id = has_font.then(|| read_ui16(c)).transpose()?;
        let color = if has_color {
            Some(if with_alpha { decode_rgba(c)? } else { decode_rgb(c)? })
        } else {
            None
        };
        let x_offset = has_x_offset.then(|| read_si16(c)).transpose()?;
        let y_offset = has_y_offset.then(|| read_si16(c)).transpose()?;
        let height = has_font.then(|| read_ui16(c)).transpose()?;

        let count = usize::from(read_ui8(c)?.value);
        let entry_bits = u64::from(glyph_bits + advance_bits) * count as u64;
        if entry_bits > c.remaining_bits() {
            return Err(c.out_of_bounds(entry_bits));
        }
        let mut glyphs = Vec::with_capacity(count);
        for _ in 0..count {
            glyphs.push(GlyphEntry {
                index: read_ub(c, glyph_bits)?,
                advance: read_sb(c, advance_bits)?,
            });
        }
        c.align();

        records.push(TextRecord {
            position,
            font_id,
            color,
            x_offset,
            y_offset,
            height,
            glyphs,
        });
    }
    Ok(records)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KerningRecord {
    pub left: Located<u16>,
    pub right: Located<u16>,
    pub adjustment: Located<i16>,
}

/// Character code in the width selected by the font's `WideCodes` flag.
pub(crate) fn read_code(c: &mut BitCursor<'_>, wide_codes: bool) -> Result<Located<u16>> {
    if wide_codes {
        read_ui16(c)
    } else {
        Ok(read_ui8(c)?.map(u16::from))
    }
}

pub fn decode_kerning_records(
    c: &mut BitCursor<'_>,
    count: usize,
    wide_codes: bool,
) -> Result<Vec<KerningRecord>> {
    let code_len = if wide_codes { 2 } else { 1 };
    check_count(c, count, code_len * 2 + 2, "kerning count")?;
    let mut records = Vec::with_capacity(count);
    for _ in 0..count {
        records.push(KerningRecord {
            left: read_code(c, wide_codes)?,
            right: read_code(c, wide_codes)?,
            adjustment: read_si16(c)?,
        });
    }
    Ok(records)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneData {
    pub alignment_coordinate: Located<Float16>,
    pub range: Located<Float16>,
}

/// Alignment zones of one glyph in `DefineFontAlignZones`.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneRecord {
    pub position: BitPosition,
    pub zones: Vec<ZoneData>,
    pub mask_y: Located<bool>,
    pub mask_x: Located<bool>,
}

pub fn decode_zone_record(c: &mut BitCursor<'_>) -> Result<ZoneRecord> {
    let position = c.position();
    let count = usize::from(read_ui8(c)?.value);
    check_count(c, count, 4, "zone data count")?;
    let mut zones = Vec::with_capacity(count);
    for _ in 0..count {
        zones.push(ZoneData {
            alignment_coordinate: read_float16(c)?,
            range: read_float16(c)?,
        });
    }
    let _reserved = read_ub(c, 6)?;
    let mask_y = read_flag(c)?;
    let mask_x = read_flag(c)?;
    Ok(ZoneRecord {
        position,
        zones,
        mask_y,
        mask_x,
    })
}
