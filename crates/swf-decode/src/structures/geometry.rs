use crate::bits::{BitCursor, Located};
use crate::error::Result;
use crate::primitives::{read_fb, read_flag, read_sb, read_ub, Fixed};

/// `RECT`: bounding box in twips. Byte-aligned after decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub nbits: Located<u32>,
    pub x_min: Located<i32>,
    pub x_max: Located<i32>,
    pub y_min: Located<i32>,
    pub y_max: Located<i32>,
}

impl Rect {
    pub fn width(&self) -> i64 {
        i64::from(self.x_max.value) - i64::from(self.x_min.value)
    }

    pub fn height(&self) -> i64 {
        i64::from(self.y_max.value) - i64::from(self.y_min.value)
    }
}

pub fn decode_rect(c: &mut BitCursor<'_>) -> Result<Rect> {
    let nbits = read_ub(c, 5)?;
    let n = nbits.value;
    let rect = Rect {
        nbits,
        x_min: read_sb(c, n)?,
        x_max: read_sb(c, n)?,
        y_min: read_sb(c, n)?,
        y_max: read_sb(c, n)?,
    };
    c.align();
    Ok(rect)
}

/// Scale or rotate/skew pair of a `MATRIX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixTerms {
    pub nbits: Located<u32>,
    pub a: Located<Fixed>,
    pub b: Located<Fixed>,
}

/// `MATRIX`: 2x3 affine transform. Byte-aligned after decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matrix {
    pub has_scale: Located<bool>,
    /// `ScaleX`, `ScaleY`.
    pub scale: Option<MatrixTerms>,
    pub has_rotate: Located<bool>,
    /// `RotateSkew0`, `RotateSkew1`.
    pub rotate_skew: Option<MatrixTerms>,
    pub translate_bits: Located<u32>,
    pub translate_x: Located<i32>,
    pub translate_y: Located<i32>,
}

fn decode_matrix_terms(c: &mut BitCursor<'_>) -> Result<MatrixTerms> {
    let nbits = read_ub(c, 5)?;
    let n = nbits.value;
    Ok(MatrixTerms {
        nbits,
        a: read_fb(c, n)?,
        b: read_fb(c, n)?,
    })
}

pub fn decode_matrix(c: &mut BitCursor<'_>) -> Result<Matrix> {
    let has_scale = read_flag(c)?;
    let scale = if has_scale.value {
        Some(decode_matrix_terms(c)?)
    } else {
        None
    };
    let has_rotate = read_flag(c)?;
    let rotate_skew = if has_rotate.value {
        Some(decode_matrix_terms(c)?)
    } else {
        None
    };
    let translate_bits = read_ub(c, 5)?;
    let translate_x = read_sb(c, translate_bits.value)?;
    let translate_y = read_sb(c, translate_bits.value)?;
    c.align();
    Ok(Matrix {
        has_scale,
        scale,
        has_rotate,
        rotate_skew,
        translate_bits,
        translate_x,
        translate_y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::BitPosition;

    #[test]
    fn rect_from_movie_header() {
        // nbits = 15, 0, 11000, 0, 8000 (the classic 550x400 stage).
        let bytes = [0x78, 0x00, 0x05, 0x5F, 0x00, 0x00, 0x0F, 0xA0, 0x00];
        let mut c = BitCursor::new(&bytes);
        let rect = decode_rect(&mut c).unwrap();
        assert_eq!(rect.nbits.value, 15);
        assert_eq!(rect.x_min.value, 0);
        assert_eq!(rect.x_max.value, 11000);
        assert_eq!(rect.y_min.value, 0);
        assert_eq!(rect.y_max.value, 8000);
        assert_eq!(rect.x_max.position, BitPosition::new(2, 4));
        assert_eq!(c.position(), BitPosition::at_byte(9));
    }

    #[test]
    fn identity_translation_matrix() {
        // has_scale=0, has_rotate=0, nbits=0 -> one byte.
        let mut c = BitCursor::new(&[0x00, 0xAA]);
        let m = decode_matrix(&mut c).unwrap();
        assert!(m.scale.is_none());
        assert!(m.rotate_skew.is_none());
        assert_eq!(m.translate_x.value, 0);
        assert_eq!(c.position(), BitPosition::at_byte(1));
    }
}
