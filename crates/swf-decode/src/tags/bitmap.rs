//! Bitmap definitions. Image payloads are kept as raw bytes.

use crate::bits::{BitCursor, Located};
use crate::error::{DecodeError, Result};
use crate::primitives::{
    read_bytes, read_fixed8, read_rest, read_ui16, read_ui32, read_ui8, Fixed8,
};

pub const BITMAP_FORMAT_COLORMAPPED: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineBits {
    pub character_id: Located<u16>,
    /// JPEG data without tables; see `JPEGTables`.
    pub jpeg_data: Located<Vec<u8>>,
}

pub(super) fn decode_define_bits(c: &mut BitCursor<'_>) -> Result<DefineBits> {
    Ok(DefineBits {
        character_id: read_ui16(c)?,
        jpeg_data: read_rest(c)?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JpegTables {
    pub data: Located<Vec<u8>>,
}

pub(super) fn decode_jpeg_tables(c: &mut BitCursor<'_>) -> Result<JpegTables> {
    Ok(JpegTables {
        data: read_rest(c)?,
    })
}

/// `DefineBitsJPEG2`, `DefineBitsJPEG3` or `DefineBitsJPEG4`.
#[derive(Debug, Clone, PartialEq)]
pub struct DefineBitsJpeg {
    pub version: u8,
    pub character_id: Located<u16>,
    /// Length of `image_data`; JPEG3 and later.
    pub alpha_data_offset: Option<Located<u32>>,
    /// JPEG4 only.
    pub deblock: Option<Located<Fixed8>>,
    pub image_data: Located<Vec<u8>>,
    /// zlib-compressed alpha plane; JPEG3 and later.
    pub alpha_data: Option<Located<Vec<u8>>>,
}

pub(super) fn decode_define_bits_jpeg(
    c: &mut BitCursor<'_>,
    version: u8,
) -> Result<DefineBitsJpeg> {
    let character_id = read_ui16(c)?;
    if version < 3 {
        return Ok(DefineBitsJpeg {
            version,
            character_id,
            alpha_data_offset: None,
            deblock: None,
            image_data: read_rest(c)?,
            alpha_data: None,
        });
    }

    let alpha_data_offset = read_ui32(c)?;
    let deblock = if version >= 4 {
        Some(read_fixed8(c)?)
    } else {
        None
    };
    let image_len = usize::try_from(alpha_data_offset.value)
        .ok()
        .filter(|&n| n <= c.remaining_bytes())
        .ok_or(DecodeError::InvalidValue {
            field: "alpha data offset",
            value: alpha_data_offset.value,
            position: alpha_data_offset.position,
        })?;
    let image_data = read_bytes(c, image_len)?;
    let alpha_data = read_rest(c)?;
    Ok(DefineBitsJpeg {
        version,
        character_id,
        alpha_data_offset: Some(alpha_data_offset),
        deblock,
        image_data,
        alpha_data: Some(alpha_data),
    })
}

/// `DefineBitsLossless` or `DefineBitsLossless2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineBitsLossless {
    pub version: u8,
    pub character_id: Located<u16>,
    pub format: Located<u8>,
    pub width: Located<u16>,
    pub height: Located<u16>,
    /// Colormapped images only; the table holds this value plus one entries.
    pub color_table_size: Option<Located<u8>>,
    /// zlib-compressed pixel data.
    pub data: Located<Vec<u8>>,
}

pub(super) fn decode_define_bits_lossless(
    c: &mut BitCursor<'_>,
    version: u8,
) -> Result<DefineBitsLossless> {
    let character_id = read_ui16(c)?;
    let format = read_ui8(c)?;
    let width = read_ui16(c)?;
    let height = read_ui16(c)?;
    let color_table_size = if format.value == BITMAP_FORMAT_COLORMAPPED {
        Some(read_ui8(c)?)
    } else {
        None
    };
    Ok(DefineBitsLossless {
        version,
        character_id,
        format,
        width,
        height,
        color_table_size,
        data: read_rest(c)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jpeg3_splits_image_and_alpha() {
        let mut bytes = vec![0x01, 0x00];
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(&[0xFF, 0xD8, 0xFF, 0x78, 0x9C]);
        let mut c = BitCursor::new(&bytes);
        let tag = decode_define_bits_jpeg(&mut c, 3).unwrap();
        assert_eq!(tag.image_data.value, vec![0xFF, 0xD8, 0xFF]);
        assert_eq!(tag.alpha_data.unwrap().value, vec![0x78, 0x9C]);
        assert!(tag.deblock.is_none());
    }

    #[test]
    fn jpeg4_reads_deblock() {
        let mut bytes = vec![0x01, 0x00];
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&[0x00, 0x01, 0xAA]);
        let mut c = BitCursor::new(&bytes);
        let tag = decode_define_bits_jpeg(&mut c, 4).unwrap();
        assert_eq!(tag.deblock.map(|d| d.value), Some(Fixed8(0x0100)));
        assert_eq!(tag.image_data.value, vec![0xAA]);
        assert!(tag.alpha_data.unwrap().value.is_empty());
    }

    #[test]
    fn alpha_offset_past_body_is_rejected() {
        let mut bytes = vec![0x01, 0x00];
        bytes.extend_from_slice(&50u32.to_le_bytes());
        let mut c = BitCursor::new(&bytes);
        assert!(matches!(
            decode_define_bits_jpeg(&mut c, 3),
            Err(DecodeError::InvalidValue { value: 50, .. })
        ));
    }

    #[test]
    fn colormapped_lossless_has_table_size() {
        let bytes = [0x02, 0x00, 3, 0x10, 0x00, 0x08, 0x00, 0xFF, 0x78];
        let mut c = BitCursor::new(&bytes);
        let tag = decode_define_bits_lossless(&mut c, 1).unwrap();
        assert_eq!(tag.width.value, 16);
        assert_eq!(tag.height.value, 8);
        assert_eq!(tag.color_table_size.map(|s| s.value), Some(0xFF));
        assert_eq!(tag.data.value, vec![0x78]);
    }
}
