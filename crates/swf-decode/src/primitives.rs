//! Named SWF primitive types decoded on top of [`BitCursor`].
//!
//! Every reader records the cursor position before consuming anything, so the
//! returned [`Located`] points at the first bit of the encoding.

use std::borrow::Cow;
use core::fmt;

use tracing::debug;

use crate::bits::{BitCursor, Located};
use crate::error::{DecodeError, Result};

/// Signed 16.16 fixed-point value (`FIXED`, and `FB` bit fields).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Fixed(pub i32);

impl Fixed {
    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / 65536.0
    }
}

/// Signed 8.8 fixed-point value (`FIXED8`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Fixed8(pub i16);

impl Fixed8 {
    pub fn to_f32(self) -> f32 {
        f32::from(self.0) / 256.0
    }
}

/// Half-precision float (`FLOAT16`), kept as its raw bit pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Float16(pub u16);

impl Float16 {
    pub fn to_f32(self) -> f32 {
        let bits = self.0;
        let sign = if bits & 0x8000 != 0 { -1.0 } else { 1.0 };
        let exponent = i32::from((bits >> 10) & 0x1F);
        let mantissa = f32::from(bits & 0x3FF);
        match exponent {
            0 => sign * mantissa * 2f32.powi(-24),
            0x1F if mantissa == 0.0 => sign * f32::INFINITY,
            0x1F => f32::NAN,
            e => sign * (1.0 + mantissa / 1024.0) * 2f32.powi(e - 15),
        }
    }
}

/// A NUL-terminated SWF string, without its terminator.
///
/// SWF 6+ strings are UTF-8; older movies use a locale-dependent encoding, so
/// the raw bytes are kept and converted on demand.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct SwfString(Vec<u8>);

impl SwfString {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SwfString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.to_string_lossy(), f)
    }
}

impl fmt::Display for SwfString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl From<&str> for SwfString {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl PartialEq<str> for SwfString {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for SwfString {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

macro_rules! aligned_reader {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $read:ident) => {
        $(#[$doc])*
        pub fn $name(c: &mut BitCursor<'_>) -> Result<Located<$ty>> {
            let position = c.position();
            Ok(Located::new(c.$read()?, position))
        }
    };
}

aligned_reader!(read_ui8, u8, read_u8);
aligned_reader!(read_ui16, u16, read_u16);
aligned_reader!(read_ui32, u32, read_u32);
aligned_reader!(read_si8, i8, read_i8);
aligned_reader!(read_si16, i16, read_i16);
aligned_reader!(read_si32, i32, read_i32);
aligned_reader!(
    /// IEEE-754 single precision, little-endian.
    read_float,
    f32,
    read_f32
);
aligned_reader!(
    /// IEEE-754 double precision, little-endian.
    read_double,
    f64,
    read_f64
);

pub fn read_fixed(c: &mut BitCursor<'_>) -> Result<Located<Fixed>> {
    let position = c.position();
    Ok(Located::new(Fixed(c.read_i32()?), position))
}

pub fn read_fixed8(c: &mut BitCursor<'_>) -> Result<Located<Fixed8>> {
    let position = c.position();
    Ok(Located::new(Fixed8(c.read_i16()?), position))
}

pub fn read_float16(c: &mut BitCursor<'_>) -> Result<Located<Float16>> {
    let position = c.position();
    Ok(Located::new(Float16(c.read_u16()?), position))
}

/// `EncodedU32`: 1 to 5 bytes, 7 payload bits each, low group first.
pub fn read_encoded_u32(c: &mut BitCursor<'_>) -> Result<Located<u32>> {
    let position = c.position();
    let mut value: u32 = 0;
    for i in 0..5 {
        let byte = c.read_u8()?;
        value |= u32::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            break;
        }
    }
    Ok(Located::new(value, position))
}

/// NUL-terminated string. A missing terminator is an overrun of the
/// enclosing record.
pub fn read_string(c: &mut BitCursor<'_>) -> Result<Located<SwfString>> {
    let position = c.position();
    let rest = c.peek_rest()?;
    let Some(nul) = rest.iter().position(|&b| b == 0) else {
        return Err(DecodeError::OutOfBounds {
            position,
            bits: (rest.len() as u64 + 1) * 8,
            end: c.end(),
        });
    };
    let bytes = c.read_aligned_bytes(nul + 1)?;
    Ok(Located::new(SwfString::from_bytes(&bytes[..nul]), position))
}

/// Fixed-length byte string (used by `DefineFontInfo` and `DefineFont2` names).
pub fn read_counted_string(c: &mut BitCursor<'_>, len: usize) -> Result<Located<SwfString>> {
    let position = c.position();
    let bytes = c.read_aligned_bytes(len)?;
    Ok(Located::new(SwfString::from_bytes(bytes), position))
}

pub fn read_bytes(c: &mut BitCursor<'_>, len: usize) -> Result<Located<Vec<u8>>> {
    let position = c.position();
    Ok(Located::new(c.read_aligned_bytes(len)?.to_vec(), position))
}

/// Remaining bytes of the enclosing record, verbatim.
pub fn read_rest(c: &mut BitCursor<'_>) -> Result<Located<Vec<u8>>> {
    let position = c.position();
    Ok(Located::new(c.read_rest()?.to_vec(), position))
}

/// `UB[n]`
pub fn read_ub(c: &mut BitCursor<'_>, n: u32) -> Result<Located<u32>> {
    let position = c.position();
    Ok(Located::new(c.read_bits(n)?, position))
}

/// `SB[n]`
pub fn read_sb(c: &mut BitCursor<'_>, n: u32) -> Result<Located<i32>> {
    let position = c.position();
    Ok(Located::new(c.read_signed_bits(n)?, position))
}

/// `FB[n]`: signed 16.16 fixed-point bit field.
pub fn read_fb(c: &mut BitCursor<'_>, n: u32) -> Result<Located<Fixed>> {
    let position = c.position();
    Ok(Located::new(Fixed(c.read_signed_bits(n)?), position))
}

/// `UB[1]` interpreted as a boolean.
pub fn read_flag(c: &mut BitCursor<'_>) -> Result<Located<bool>> {
    let position = c.position();
    Ok(Located::new(c.read_flag()?, position))
}

/// Checks that at least `min_element_size` bytes per element remain before a
/// counted list is allocated. A count the record cannot hold is an overrun of
/// the record, reported at its end like any other short read.
pub(crate) fn check_count(
    c: &BitCursor<'_>,
    count: usize,
    min_element_size: usize,
    field: &'static str,
) -> Result<()> {
    let needed = count.saturating_mul(min_element_size);
    if needed > c.remaining_bytes() {
        debug!(field, count, remaining = c.remaining_bytes(), "count exceeds record");
        return Err(c.out_of_bounds((needed as u64).saturating_mul(8)));
    }
    Ok(())
}
