//! Movie header and per-tag record header decoding.

use crate::bits::{BitCursor, BitPosition, Located};
use crate::error::{DecodeError, Result};
use crate::primitives::{read_fixed8, read_ui16, read_ui32, read_ui8, Fixed8};
use crate::structures::geometry::{decode_rect, Rect};

/// Short-length value that selects the following 32-bit length field.
pub const SHORT_LENGTH_ESCAPE: u16 = 0x3F;
/// Bits of the combined code/length field holding the short length.
pub const SHORT_LENGTH_BITS: u32 = 6;

/// How the movie body after the 8-byte prefix is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
    /// `FWS`
    None,
    /// `CWS`, SWF 6+.
    Zlib,
    /// `ZWS`, SWF 13+.
    Lzma,
}

impl Compression {
    pub fn from_signature(signature: [u8; 3]) -> Option<Self> {
        match &signature {
            b"FWS" => Some(Self::None),
            b"CWS" => Some(Self::Zlib),
            b"ZWS" => Some(Self::Lzma),
            _ => None,
        }
    }
}

/// Fixed header at the start of every movie, including the frame geometry
/// block that follows the 8-byte prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieHeader {
    pub signature: Located<[u8; 3]>,
    pub compression: Compression,
    pub version: Located<u8>,
    /// Declared length of the whole (uncompressed) file.
    pub file_length: Located<u32>,
    pub frame_size: Rect,
    pub frame_rate: Located<Fixed8>,
    pub frame_count: Located<u16>,
}

pub fn decode_movie_header(c: &mut BitCursor<'_>) -> Result<MovieHeader> {
    let position = c.position();
    let raw = c.read_aligned_bytes(3)?;
    let signature = [raw[0], raw[1], raw[2]];
    let compression =
        Compression::from_signature(signature).ok_or(DecodeError::InvalidSignature(signature))?;
    match compression {
        Compression::None => {}
        Compression::Zlib => return Err(DecodeError::UnsupportedCompression { signature: 'C' }),
        Compression::Lzma => return Err(DecodeError::UnsupportedCompression { signature: 'Z' }),
    }

    Ok(MovieHeader {
        signature: Located::new(signature, position),
        compression,
        version: read_ui8(c)?,
        file_length: read_ui32(c)?,
        frame_size: decode_rect(c)?,
        frame_rate: read_fixed8(c)?,
        frame_count: read_ui16(c)?,
    })
}

/// Header of one tag: code, declared body length, and where the header began.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordHeader {
    pub tag_code: u16,
    /// Declared body length in bytes.
    pub length: u32,
    pub position: BitPosition,
    /// Whether the length came from the escaped 32-bit field.
    pub long_form: bool,
}

impl RecordHeader {
    /// Encoded size of the header itself.
    pub fn header_len(&self) -> usize {
        if self.long_form {
            6
        } else {
            2
        }
    }

    /// Byte offset of the first body byte.
    pub fn body_start(&self) -> usize {
        self.position.byte + self.header_len()
    }

    /// Byte offset one past the last body byte.
    pub fn body_end(&self) -> usize {
        self.body_start().saturating_add(self.length as usize)
    }
}

pub fn decode_record_header(c: &mut BitCursor<'_>) -> Result<RecordHeader> {
    let position = c.position();
    let code_and_length = c.read_u16()?;
    let tag_code = code_and_length >> SHORT_LENGTH_BITS;
    let short_length = code_and_length & SHORT_LENGTH_ESCAPE;

    let (length, long_form) = if short_length == SHORT_LENGTH_ESCAPE {
        (c.read_u32()?, true)
    } else {
        (u32::from(short_length), false)
    };

    Ok(RecordHeader {
        tag_code,
        length,
        position,
        long_form,
    })
}

/// Decodes the next record header without moving `c`.
pub fn peek_record_header(c: &BitCursor<'_>) -> Result<RecordHeader> {
    let mut fork = c.fork();
    decode_record_header(&mut fork)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_form_header() {
        // ShowFrame: code 1, length 0.
        let mut c = BitCursor::new(&[0x40, 0x00]);
        let h = decode_record_header(&mut c).unwrap();
        assert_eq!(h.tag_code, 1);
        assert_eq!(h.length, 0);
        assert!(!h.long_form);
        assert_eq!(h.body_start(), 2);
    }

    #[test]
    fn length_just_below_escape_stays_short() {
        // code 9, short length 0x3E, followed by bytes that must not be read.
        let word = (9u16 << 6) | 0x3E;
        let mut bytes = word.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF]);
        let mut c = BitCursor::new(&bytes);
        let h = decode_record_header(&mut c).unwrap();
        assert_eq!(h.tag_code, 9);
        assert_eq!(h.length, 0x3E);
        assert!(!h.long_form);
        assert_eq!(c.position(), BitPosition::at_byte(2));
    }

    #[test]
    fn escape_reads_wide_length() {
        let word = (12u16 << 6) | SHORT_LENGTH_ESCAPE;
        let mut bytes = word.to_le_bytes().to_vec();
        bytes.extend_from_slice(&5u32.to_le_bytes());
        let mut c = BitCursor::new(&bytes);
        let h = decode_record_header(&mut c).unwrap();
        assert_eq!(h.tag_code, 12);
        assert_eq!(h.length, 5);
        assert!(h.long_form);
        assert_eq!(h.body_start(), 6);
    }

    #[test]
    fn peek_does_not_advance() {
        let c = BitCursor::new(&[0x40, 0x00]);
        let h = peek_record_header(&c).unwrap();
        assert_eq!(h.tag_code, 1);
        assert_eq!(c.position(), BitPosition::default());
    }

    #[test]
    fn compressed_signatures_are_rejected() {
        let mut c = BitCursor::new(b"CWS\x0a\0\0\0\0");
        assert_eq!(
            decode_movie_header(&mut c).unwrap_err(),
            DecodeError::UnsupportedCompression { signature: 'C' }
        );
        let mut c = BitCursor::new(b"GIF89a");
        assert!(matches!(
            decode_movie_header(&mut c),
            Err(DecodeError::InvalidSignature(_))
        ));
    }
}
