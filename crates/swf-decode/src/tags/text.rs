//! Font and text tags.
//!
//! Font glyph tables are addressed through offset tables. Glyphs are decoded
//! in order, seeking forward to each recorded offset; an offset pointing
//! behind data already decoded is rejected.

use bitflags::bitflags;

use crate::bits::{BitCursor, Located};
use crate::error::{DecodeError, Result};
use crate::primitives::{
    check_count, read_counted_string, read_flag, read_float, read_rest, read_si16, read_string,
    read_ub, read_ui16, read_ui32, read_ui8, SwfString,
};
use crate::structures::color::{decode_rgba, Color};
use crate::structures::geometry::{decode_matrix, decode_rect, Matrix, Rect};
use crate::structures::shape::{decode_shape, Shape, ShapeVersion};
use crate::structures::text::{
    decode_kerning_records, decode_text_records, decode_zone_record, read_code, KerningRecord,
    TextRecord, ZoneRecord,
};

use super::{resolve_offset, seek_forward};

/// Reads glyph shapes at `offsets`, each relative to `table_start`.
fn decode_glyphs(
    c: &mut BitCursor<'_>,
    table_start: usize,
    offsets: &[Located<u32>],
    version: ShapeVersion,
) -> Result<Vec<Shape>> {
    let mut glyphs = Vec::with_capacity(offsets.len());
    for offset in offsets {
        let target = resolve_offset(c, table_start, *offset, "glyph offset")?;
        seek_forward(c, target, "glyph offset")?;
        glyphs.push(decode_shape(c, version)?);
    }
    Ok(glyphs)
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefineFont {
    pub font_id: Located<u16>,
    pub offsets: Vec<Located<u32>>,
    pub glyphs: Vec<Shape>,
}

pub(super) fn decode_define_font(c: &mut BitCursor<'_>) -> Result<DefineFont> {
    let font_id = read_ui16(c)?;
    if c.is_empty() {
        return Ok(DefineFont {
            font_id,
            offsets: Vec::new(),
            glyphs: Vec::new(),
        });
    }

    // The first offset also gives the table size.
    let table_start = c.position().byte;
    let first = read_ui16(c)?;
    let count = usize::from(first.value / 2);
    check_count(c, count.saturating_sub(1), 2, "glyph count")?;
    let mut offsets = Vec::with_capacity(count);
    if count > 0 {
        offsets.push(first.map(u32::from));
    }
    for _ in 1..count {
        offsets.push(read_ui16(c)?.map(u32::from));
    }
    let glyphs = decode_glyphs(c, table_start, &offsets, ShapeVersion::Shape1)?;
    Ok(DefineFont {
        font_id,
        offsets,
        glyphs,
    })
}

bitflags! {
    /// `DefineFont2`/`DefineFont3` flag byte.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct FontFlags: u8 {
        const HAS_LAYOUT = 1 << 7;
        const SHIFT_JIS = 1 << 6;
        const SMALL_TEXT = 1 << 5;
        const ANSI = 1 << 4;
        const WIDE_OFFSETS = 1 << 3;
        const WIDE_CODES = 1 << 2;
        const ITALIC = 1 << 1;
        const BOLD = 1 << 0;
    }
}

bitflags! {
    /// `DefineFontInfo`/`DefineFontInfo2` flag byte.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct FontInfoFlags: u8 {
        const SMALL_TEXT = 1 << 5;
        const SHIFT_JIS = 1 << 4;
        const ANSI = 1 << 3;
        const ITALIC = 1 << 2;
        const BOLD = 1 << 1;
        const WIDE_CODES = 1 << 0;
    }
}

/// Metrics present when `FontFlags::HAS_LAYOUT` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct FontLayout {
    pub ascent: Located<u16>,
    pub descent: Located<u16>,
    pub leading: Located<i16>,
    pub advances: Vec<Located<i16>>,
    pub bounds: Vec<Rect>,
    pub kerning: Vec<KerningRecord>,
}

fn decode_font_layout(
    c: &mut BitCursor<'_>,
    glyph_count: usize,
    wide_codes: bool,
) -> Result<FontLayout> {
    let ascent = read_ui16(c)?;
    let descent = read_ui16(c)?;
    let leading = read_si16(c)?;
    check_count(c, glyph_count, 3, "font advance count")?;
    let mut advances = Vec::with_capacity(glyph_count);
    for _ in 0..glyph_count {
        advances.push(read_si16(c)?);
    }
    let mut bounds = Vec::with_capacity(glyph_count);
    for _ in 0..glyph_count {
        bounds.push(decode_rect(c)?);
    }
    let kerning_count = usize::from(read_ui16(c)?.value);
    let kerning = decode_kerning_records(c, kerning_count, wide_codes)?;
    Ok(FontLayout {
        ascent,
        descent,
        leading,
        advances,
        bounds,
        kerning,
    })
}

fn read_offset(c: &mut BitCursor<'_>, wide_offsets: bool) -> Result<Located<u32>> {
    if wide_offsets {
        read_ui32(c)
    } else {
        Ok(read_ui16(c)?.map(u32::from))
    }
}

/// `DefineFont2` or `DefineFont3`.
#[derive(Debug, Clone, PartialEq)]
pub struct DefineFont2 {
    pub version: u8,
    pub font_id: Located<u16>,
    pub flags: Located<FontFlags>,
    pub language_code: Located<u8>,
    pub name: Located<SwfString>,
    pub offsets: Vec<Located<u32>>,
    pub code_table_offset: Option<Located<u32>>,
    pub glyphs: Vec<Shape>,
    pub codes: Vec<Located<u16>>,
    pub layout: Option<FontLayout>,
}

pub(super) fn decode_define_font2(c: &mut BitCursor<'_>, version: u8) -> Result<DefineFont2> {
    let font_id = read_ui16(c)?;
    let flags = read_ui8(c)?.map(FontFlags::from_bits_retain);
    let wide_offsets = flags.value.contains(FontFlags::WIDE_OFFSETS);
    let wide_codes = flags.value.contains(FontFlags::WIDE_CODES);
    let language_code = read_ui8(c)?;
    let name_len = usize::from(read_ui8(c)?.value);
    let name = read_counted_string(c, name_len)?;
    let glyph_count = usize::from(read_ui16(c)?.value);

    let table_start = c.position().byte;
    let offset_len = if wide_offsets { 4 } else { 2 };
    check_count(c, glyph_count, offset_len, "glyph count")?;
    let mut offsets = Vec::with_capacity(glyph_count);
    for _ in 0..glyph_count {
        offsets.push(read_offset(c, wide_offsets)?);
    }

    // Fonts without glyphs may omit the code table offset.
    let code_table_offset = if glyph_count > 0 || !c.is_empty() {
        Some(read_offset(c, wide_offsets)?)
    } else {
        None
    };
    let glyphs = decode_glyphs(c, table_start, &offsets, ShapeVersion::Shape1)?;
    if let Some(offset) = code_table_offset {
        let target = resolve_offset(c, table_start, offset, "code table offset")?;
        seek_forward(c, target, "code table offset")?;
    }

    let mut codes = Vec::with_capacity(glyph_count);
    for _ in 0..glyph_count {
        codes.push(read_code(c, wide_codes)?);
    }
    let layout = if flags.value.contains(FontFlags::HAS_LAYOUT) {
        Some(decode_font_layout(c, glyph_count, wide_codes)?)
    } else {
        None
    };

    Ok(DefineFont2 {
        version,
        font_id,
        flags,
        language_code,
        name,
        offsets,
        code_table_offset,
        glyphs,
        codes,
        layout,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineFont4 {
    pub font_id: Located<u16>,
    pub has_font_data: Located<bool>,
    pub italic: Located<bool>,
    pub bold: Located<bool>,
    pub name: Located<SwfString>,
    /// Embedded CFF font, when `has_font_data` is set.
    pub data: Located<Vec<u8>>,
}

pub(super) fn decode_define_font4(c: &mut BitCursor<'_>) -> Result<DefineFont4> {
    let font_id = read_ui16(c)?;
    let _reserved = c.read_bits(5)?;
    let has_font_data = read_flag(c)?;
    let italic = read_flag(c)?;
    let bold = read_flag(c)?;
    Ok(DefineFont4 {
        font_id,
        has_font_data,
        italic,
        bold,
        name: read_string(c)?,
        data: read_rest(c)?,
    })
}

/// `DefineFontInfo` or `DefineFontInfo2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineFontInfo {
    pub version: u8,
    pub font_id: Located<u16>,
    pub name: Located<SwfString>,
    pub flags: Located<FontInfoFlags>,
    /// `DefineFontInfo2` only.
    pub language_code: Option<Located<u8>>,
    pub codes: Vec<Located<u16>>,
}

pub(super) fn decode_define_font_info(
    c: &mut BitCursor<'_>,
    version: u8,
) -> Result<DefineFontInfo> {
    let font_id = read_ui16(c)?;
    let name_len = usize::from(read_ui8(c)?.value);
    let name = read_counted_string(c, name_len)?;
    let flags = read_ui8(c)?.map(FontInfoFlags::from_bits_retain);
    let language_code = if version >= 2 {
        Some(read_ui8(c)?)
    } else {
        None
    };

    // The code table fills the rest of the body.
    let wide_codes = flags.value.contains(FontInfoFlags::WIDE_CODES);
    let code_len = if wide_codes { 2 } else { 1 };
    let count = c.remaining_bytes() / code_len;
    let mut codes = Vec::with_capacity(count);
    for _ in 0..count {
        codes.push(read_code(c, wide_codes)?);
    }
    Ok(DefineFontInfo {
        version,
        font_id,
        name,
        flags,
        language_code,
        codes,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefineFontAlignZones {
    pub font_id: Located<u16>,
    pub csm_table_hint: Located<u32>,
    pub zones: Vec<ZoneRecord>,
}

pub(super) fn decode_define_font_align_zones(
    c: &mut BitCursor<'_>,
) -> Result<DefineFontAlignZones> {
    let font_id = read_ui16(c)?;
    let csm_table_hint = read_ub(c, 2)?;
    let _reserved = c.read_bits(6)?;
    let mut zones = Vec::new();
    while !c.is_empty() {
        zones.push(decode_zone_record(c)?);
    }
    Ok(DefineFontAlignZones {
        font_id,
        csm_table_hint,
        zones,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineFontName {
    pub font_id: Located<u16>,
    pub name: Located<SwfString>,
    pub copyright: Located<SwfString>,
}

pub(super) fn decode_define_font_name(c: &mut BitCursor<'_>) -> Result<DefineFontName> {
    Ok(DefineFontName {
        font_id: read_ui16(c)?,
        name: read_string(c)?,
        copyright: read_string(c)?,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsmTextSettings {
    pub text_id: Located<u16>,
    pub use_flash_type: Located<u32>,
    pub grid_fit: Located<u32>,
    pub thickness: Located<f32>,
    pub sharpness: Located<f32>,
}

pub(super) fn decode_csm_text_settings(c: &mut BitCursor<'_>) -> Result<CsmTextSettings> {
    let text_id = read_ui16(c)?;
    let use_flash_type = read_ub(c, 2)?;
    let grid_fit = read_ub(c, 3)?;
    let _reserved = c.read_bits(3)?;
    let thickness = read_float(c)?;
    let sharpness = read_float(c)?;
    let _reserved = read_ui8(c)?;
    Ok(CsmTextSettings {
        text_id,
        use_flash_type,
        grid_fit,
        thickness,
        sharpness,
    })
}

/// `DefineText` or `DefineText2`.
#[derive(Debug, Clone, PartialEq)]
pub struct DefineText {
    pub version: u8,
    pub character_id: Located<u16>,
    pub bounds: Rect,
    pub matrix: Matrix,
    pub glyph_bits: Located<u8>,
    pub advance_bits: Located<u8>,
    pub records: Vec<TextRecord>,
}

fn check_bit_width(width: Located<u8>, field: &'static str) -> Result<u32> {
    let n = u32::from(width.value);
    if n > 32 {
        return Err(DecodeError::InvalidValue {
            field,
            value: n,
            position: width.position,
        });
    }
    Ok(n)
}

pub(super) fn decode_define_text(c: &mut BitCursor<'_>, version: u8) -> Result<DefineText> {
    let character_id = read_ui16(c)?;
    let bounds = decode_rect(c)?;
    let matrix = decode_matrix(c)?;
    let glyph_bits = read_ui8(c)?;
    let advance_bits = read_ui8(c)?;
    let records = decode_text_records(
        c,
        check_bit_width(glyph_bits, "glyph bits")?,
        check_bit_width(advance_bits, "advance bits")?,
        version >= 2,
    )?;
    Ok(DefineText {
        version,
        character_id,
        bounds,
        matrix,
        glyph_bits,
        advance_bits,
        records,
    })
}

bitflags! {
    /// `DefineEditText` flag word, first byte in the high bits.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct EditTextFlags: u16 {
        const HAS_TEXT = 1 << 15;
        const WORD_WRAP = 1 << 14;
        const MULTILINE = 1 << 13;
        const PASSWORD = 1 << 12;
        const READ_ONLY = 1 << 11;
        const HAS_TEXT_COLOR = 1 << 10;
        const HAS_MAX_LENGTH = 1 << 9;
        const HAS_FONT = 1 << 8;
        const HAS_FONT_CLASS = 1 << 7;
        const AUTO_SIZE = 1 << 6;
        const HAS_LAYOUT = 1 << 5;
        const NO_SELECT = 1 << 4;
        const BORDER = 1 << 3;
        const WAS_STATIC = 1 << 2;
        const HTML = 1 << 1;
        const USE_OUTLINES = 1 << 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditTextLayout {
    pub align: Located<u8>,
    pub left_margin: Located<u16>,
    pub right_margin: Located<u16>,
    pub indent: Located<u16>,
    pub leading: Located<i16>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefineEditText {
    pub character_id: Located<u16>,
    pub bounds: Rect,
    pub flags: Located<EditTextFlags>,
    pub font_id: Option<Located<u16>>,
    pub font_class: Option<Located<SwfString>>,
    pub font_height: Option<Located<u16>>,
    pub text_color: Option<Color>,
    pub max_length: Option<Located<u16>>,
    pub layout: Option<EditTextLayout>,
    pub variable_name: Located<SwfString>,
    pub initial_text: Option<Located<SwfString>>,
}

pub(super) fn decode_define_edit_text(c: &mut BitCursor<'_>) -> Result<DefineEditText> {
    let character_id = read_ui16(c)?;
    let bounds = decode_rect(c)?;
    let position = c.position();
    let raw = c.read_bits(16)? as u16;
    let flags = Located::new(EditTextFlags::from_bits_retain(raw), position);
    let has = |flag: EditTextFlags| flags.value.contains(flag);

    let font_id = has(EditTextFlags::HAS_FONT).then(|| read_ui16(c)).transpose()?;
    let font_class = has(EditTextFlags::HAS_FONT_CLASS)
        .then(|| read_string(c))
        .transpose()?;
    let font_height = (has(EditTextFlags::HAS_FONT) || has(EditTextFlags::HAS_FONT_CLASS))
        .then(|| read_ui16(c))
        .transpose()?;
    let text_color = has(EditTextFlags::HAS_TEXT_COLOR)
        .then(|| decode_rgba(c))
        .transpose()?;
    let max_length = has(EditTextFlags::HAS_MAX_LENGTH)
        .then(|| read_ui16(c))
        .transpose()?;
    let layout = if has(EditTextFlags::HAS_LAYOUT) {
        Some(EditTextLayout {
            align: read_ui8(c)?,
            left_margin: read_ui16(c)?,
            right_margin: read_ui16(c)?,
            indent: read_ui16(c)?,
            leading: read_si16(c)?,
        })
    } else {
        None
    };
    let variable_name = read_string(c)?;
    let initial_text = has(EditTextFlags::HAS_TEXT)
        .then(|| read_string(c))
        .transpose()?;

    Ok(DefineEditText {
        character_id,
        bounds,
        flags,
        font_id,
        font_class,
        font_height,
        text_color,
        max_length,
        layout,
        variable_name,
        initial_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::BitWriter;

    #[test]
    fn define_font_follows_offsets() {
        let bytes = [
            0x01, 0x00, // font id
            0x04, 0x00, 0x06, 0x00, // two offsets
            0x00, 0x00, // glyph 0: empty shape
            0x00, 0x00, // glyph 1: empty shape
        ];
        let mut c = BitCursor::new(&bytes);
        let font = decode_define_font(&mut c).unwrap();
        assert!(c.is_empty());
        assert_eq!(font.offsets.len(), 2);
        assert_eq!(font.glyphs.len(), 2);
    }

    #[test]
    fn define_font_rejects_backward_offset() {
        let bytes = [0x01, 0x00, 0x04, 0x00, 0x02, 0x00, 0x00, 0x00];
        let mut c = BitCursor::new(&bytes);
        assert!(matches!(
            decode_define_font(&mut c),
            Err(DecodeError::InvalidValue {
                field: "glyph offset",
                ..
            })
        ));
    }

    #[test]
    fn define_font3_without_glyphs() {
        let mut bytes = vec![0x02, 0x00, 0x00, 0x01, 0x03];
        bytes.extend_from_slice(b"Foo");
        bytes.extend_from_slice(&[0x00, 0x00]); // no glyphs
        bytes.extend_from_slice(&[0x02, 0x00]); // code table offset
        let mut c = BitCursor::new(&bytes);
        let font = decode_define_font2(&mut c, 3).unwrap();
        assert!(c.is_empty());
        assert_eq!(font.name.value, "Foo");
        assert_eq!(font.language_code.value, 1);
        assert!(font.glyphs.is_empty());
        assert!(font.layout.is_none());
    }

    #[test]
    fn define_font2_with_layout() {
        let mut bytes = vec![0x02, 0x00];
        bytes.push((FontFlags::HAS_LAYOUT | FontFlags::WIDE_CODES).bits());
        bytes.extend_from_slice(&[0x00, 0x01, b'A']);
        bytes.extend_from_slice(&[0x01, 0x00]); // one glyph
        bytes.extend_from_slice(&[0x04, 0x00, 0x06, 0x00]); // offset, code table offset
        bytes.extend_from_slice(&[0x10, 0x00]); // glyph: one fill bit, end record
        bytes.extend_from_slice(&[0x41, 0x00]); // code 'A'
        bytes.extend_from_slice(&[0x20, 0x03, 0x80, 0x00, 0x00, 0x00]); // ascent, descent, leading
        bytes.extend_from_slice(&[0x00, 0x04]); // advance
        bytes.push(0x00); // empty bounds
        bytes.extend_from_slice(&[0x00, 0x00]); // no kerning
        let mut c = BitCursor::new(&bytes);
        let font = decode_define_font2(&mut c, 2).unwrap();
        assert!(c.is_empty());
        assert_eq!(font.codes[0].value, 0x41);
        assert_eq!(font.glyphs[0].num_fill_bits.value, 1);
        let layout = font.layout.unwrap();
        assert_eq!(layout.ascent.value, 800);
        assert_eq!(layout.descent.value, 128);
        assert_eq!(layout.advances[0].value, 1024);
        assert!(layout.kerning.is_empty());
    }

    #[test]
    fn font_info_code_table_fills_body() {
        let mut bytes = vec![0x01, 0x00, 0x02];
        bytes.extend_from_slice(b"Hi");
        bytes.push(0x00); // narrow codes
        bytes.extend_from_slice(&[0x41, 0x42, 0x43]);
        let mut c = BitCursor::new(&bytes);
        let info = decode_define_font_info(&mut c, 1).unwrap();
        assert!(c.is_empty());
        let codes: Vec<_> = info.codes.iter().map(|c| c.value).collect();
        assert_eq!(codes, vec![0x41, 0x42, 0x43]);
    }

    #[test]
    fn define_text_rejects_wide_glyph_bits() {
        let bytes = [0x01, 0x00, 0x00, 0x00, 40, 8, 0x00];
        let mut c = BitCursor::new(&bytes);
        assert!(matches!(
            decode_define_text(&mut c, 1),
            Err(DecodeError::InvalidValue {
                field: "glyph bits",
                value: 40,
                ..
            })
        ));
    }

    #[test]
    fn edit_text_with_font_and_text() {
        let mut w = BitWriter::new();
        w.write_bytes(&[0x03, 0x00]);
        w.write_bits(0, 5);
        w.align();
        let flags = EditTextFlags::HAS_TEXT | EditTextFlags::HAS_FONT | EditTextFlags::HTML;
        w.write_bits(u32::from(flags.bits()), 16);
        w.write_bytes(&[0x01, 0x00, 0xF0, 0x00]);
        w.write_bytes(b"field\0<b>hi</b>\0");
        let bytes = w.finish();

        let mut c = BitCursor::new(&bytes);
        let edit = decode_define_edit_text(&mut c).unwrap();
        assert!(c.is_empty());
        assert_eq!(edit.font_id.map(|f| f.value), Some(1));
        assert_eq!(edit.font_height.map(|h| h.value), Some(240));
        assert_eq!(edit.variable_name.value, "field");
        assert_eq!(edit.initial_text.unwrap().value, "<b>hi</b>");
        assert!(edit.layout.is_none());
    }

    #[test]
    fn csm_settings() {
        let mut bytes = vec![0x07, 0x00, 0b0100_1000];
        bytes.extend_from_slice(&1.5f32.to_le_bytes());
        bytes.extend_from_slice(&(-2.0f32).to_le_bytes());
        bytes.push(0);
        let mut c = BitCursor::new(&bytes);
        let csm = decode_csm_text_settings(&mut c).unwrap();
        assert!(c.is_empty());
        assert_eq!(csm.use_flash_type.value, 1);
        assert_eq!(csm.grid_fit.value, 1);
        assert_eq!(csm.thickness.value, 1.5);
        assert_eq!(csm.sharpness.value, -2.0);
    }
}
