//! Bit-granular cursor over an immutable byte buffer.
//!
//! SWF mixes byte-aligned little-endian fields with MSB-first bit-packed runs
//! inside the same record. [`BitCursor`] tracks both the byte offset and the bit
//! offset within the current byte so both kinds of read can be served from one
//! position, and so every decoded value can report where it came from.

use core::fmt;

use crate::error::{DecodeError, Result};

/// Logical coordinate of a decoded value inside the source buffer.
///
/// `bit` counts from the most significant bit of `byte` (0..=7).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BitPosition {
    pub byte: usize,
    pub bit: u8,
}

impl BitPosition {
    pub const fn new(byte: usize, bit: u8) -> Self {
        Self { byte, bit }
    }

    pub const fn at_byte(byte: usize) -> Self {
        Self { byte, bit: 0 }
    }

    pub const fn is_aligned(&self) -> bool {
        self.bit == 0
    }

    /// Absolute offset in bits from the start of the buffer.
    pub const fn total_bits(&self) -> u64 {
        (self.byte as u64) * 8 + self.bit as u64
    }
}

impl fmt::Display for BitPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}.{}", self.byte, self.bit)
    }
}

/// A decoded value together with the position its encoding started at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Located<T> {
    pub value: T,
    pub position: BitPosition,
}

impl<T> Located<T> {
    pub const fn new(value: T, position: BitPosition) -> Self {
        Self { value, position }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Located<U> {
        Located {
            value: f(self.value),
            position: self.position,
        }
    }

    pub fn as_ref(&self) -> Located<&T> {
        Located {
            value: &self.value,
            position: self.position,
        }
    }
}

impl<T: Copy> Located<T> {
    pub fn get(&self) -> T {
        self.value
    }
}

/// Read position over a borrowed buffer.
///
/// The cursor is `Copy`: forking for lookahead is a plain copy, and nothing is
/// committed until the caller writes the fork back. `end` may be smaller than
/// the buffer length when the cursor was produced by [`BitCursor::sub_cursor`];
/// reads never cross it.
#[derive(Clone, Copy)]
pub struct BitCursor<'a> {
    data: &'a [u8],
    end: usize,
    byte: usize,
    bit: u8,
}

impl fmt::Debug for BitCursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitCursor")
            .field("position", &self.position())
            .field("end", &self.end)
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl<'a> BitCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            end: data.len(),
            byte: 0,
            bit: 0,
        }
    }

    pub fn position(&self) -> BitPosition {
        BitPosition::new(self.byte, self.bit)
    }

    /// Exclusive byte offset this cursor may not read past.
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn is_aligned(&self) -> bool {
        self.bit == 0
    }

    pub fn remaining_bits(&self) -> u64 {
        let bytes = self.end.saturating_sub(self.byte) as u64;
        (bytes * 8).saturating_sub(self.bit as u64)
    }

    /// Whole bytes left after the current (possibly partial) byte is discarded.
    pub fn remaining_bytes(&self) -> usize {
        let start = if self.bit == 0 { self.byte } else { self.byte + 1 };
        self.end.saturating_sub(start)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining_bits() == 0
    }

    /// Non-committing copy for lookahead.
    pub fn fork(&self) -> Self {
        *self
    }

    /// The error for a read of `bits` starting at the current position.
    pub(crate) fn out_of_bounds(&self, bits: u64) -> DecodeError {
        DecodeError::OutOfBounds {
            position: self.position(),
            bits,
            end: self.end,
        }
    }

    fn ensure_aligned(&self) -> Result<()> {
        if self.bit != 0 {
            return Err(DecodeError::Alignment {
                position: self.position(),
            });
        }
        Ok(())
    }

    /// Reads `n` bits MSB-first as an unsigned integer. `n == 0` yields 0.
    pub fn read_bits(&mut self, n: u32) -> Result<u32> {
        if n == 0 {
            return Ok(0);
        }
        if n > 32 {
            return Err(DecodeError::InvalidValue {
                field: "bit field width",
                value: n,
                position: self.position(),
            });
        }
        if self.remaining_bits() < u64::from(n) {
            return Err(self.out_of_bounds(u64::from(n)));
        }

        let mut value: u64 = 0;
        let mut left = n as u8;
        while left > 0 {
            let available = 8 - self.bit;
            let take = left.min(available);
            let shift = available - take;
            let mask = ((1u16 << take) - 1) as u8;
            let bits = (self.data[self.byte] >> shift) & mask;
            value = (value << take) | u64::from(bits);

            self.bit += take;
            if self.bit == 8 {
                self.bit = 0;
                self.byte += 1;
            }
            left -= take;
        }
        Ok(value as u32)
    }

    /// Reads `n` bits MSB-first and sign-extends from bit `n - 1`.
    pub fn read_signed_bits(&mut self, n: u32) -> Result<i32> {
        let raw = self.read_bits(n)?;
        if n == 0 || n == 32 {
            return Ok(raw as i32);
        }
        let shift = 32 - n;
        Ok(((raw << shift) as i32) >> shift)
    }

    pub fn read_flag(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    /// Discards the rest of a partially consumed byte.
    pub fn align(&mut self) {
        if self.bit != 0 {
            self.bit = 0;
            self.byte += 1;
        }
    }

    pub fn read_aligned_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure_aligned()?;
        let available = self.end.saturating_sub(self.byte);
        if n > available {
            return Err(DecodeError::OutOfBounds {
                position: self.position(),
                bits: (n as u64) * 8,
                end: self.end,
            });
        }
        let out = &self.data[self.byte..self.byte + n];
        self.byte += n;
        Ok(out)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_aligned_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.read_array()?))
    }

    pub fn skip_bytes(&mut self, n: usize) -> Result<()> {
        self.read_aligned_bytes(n).map(|_| ())
    }

    /// Every byte left in this cursor, without consuming them.
    pub fn peek_rest(&self) -> Result<&'a [u8]> {
        self.ensure_aligned()?;
        Ok(&self.data[self.byte.min(self.end)..self.end])
    }

    /// Consumes every byte left in this cursor.
    pub fn read_rest(&mut self) -> Result<&'a [u8]> {
        let n = self.end.saturating_sub(self.byte);
        self.read_aligned_bytes(n)
    }

    /// Returns a cursor over the next `len` bytes without advancing `self`.
    ///
    /// Fails with `OutOfBounds` (reported at this cursor's end) when fewer than
    /// `len` bytes remain.
    pub fn sub_cursor(&self, len: usize) -> Result<BitCursor<'a>> {
        self.ensure_aligned()?;
        let available = self.end.saturating_sub(self.byte);
        if len > available {
            return Err(DecodeError::OutOfBounds {
                position: self.position(),
                bits: (len as u64) * 8,
                end: self.end,
            });
        }
        Ok(BitCursor {
            data: self.data,
            end: self.byte + len,
            byte: self.byte,
            bit: 0,
        })
    }
}
