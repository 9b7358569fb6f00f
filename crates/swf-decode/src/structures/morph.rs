//! Start/end style pairs used by `DefineMorphShape` and `DefineMorphShape2`.

use crate::bits::{BitCursor, Located};
use crate::error::{DecodeError, Result};
use crate::primitives::{
    check_count, read_fixed8, read_flag, read_ub, read_ui16, read_ui8, Fixed8,
};
use crate::structures::color::{decode_rgba, Color};
use crate::structures::geometry::{decode_matrix, Matrix};
use crate::structures::shape::{
    read_style_count, FILL_CLIPPED_BITMAP, FILL_FOCAL_RADIAL_GRADIENT, FILL_LINEAR_GRADIENT,
    FILL_NON_SMOOTHED_CLIPPED_BITMAP, FILL_NON_SMOOTHED_REPEATING_BITMAP, FILL_RADIAL_GRADIENT,
    FILL_REPEATING_BITMAP, FILL_SOLID, JOIN_STYLE_MITER,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MorphGradientRecord {
    pub start_ratio: Located<u8>,
    pub start_color: Color,
    pub end_ratio: Located<u8>,
    pub end_color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MorphGradient {
    pub records: Vec<MorphGradientRecord>,
    pub start_focal_point: Option<Located<Fixed8>>,
    pub end_focal_point: Option<Located<Fixed8>>,
}

fn decode_morph_gradient(c: &mut BitCursor<'_>, focal: bool) -> Result<MorphGradient> {
    // The header byte carries spread/interpolation bits in newer files; only
    // the low nibble counts records.
    let header = read_ui8(c)?;
    let count = usize::from(header.value & 0x0F);
    let mut records = Vec::with_capacity(count);
    for _ in 0..count {
        records.push(MorphGradientRecord {
            start_ratio: read_ui8(c)?,
            start_color: decode_rgba(c)?,
            end_ratio: read_ui8(c)?,
            end_color: decode_rgba(c)?,
        });
    }
    let (start_focal_point, end_focal_point) = if focal {
        (Some(read_fixed8(c)?), Some(read_fixed8(c)?))
    } else {
        (None, None)
    };
    Ok(MorphGradient {
        records,
        start_focal_point,
        end_focal_point,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum MorphFillStyle {
    Solid {
        fill_type: Located<u8>,
        start_color: Color,
        end_color: Color,
    },
    Gradient {
        fill_type: Located<u8>,
        start_matrix: Matrix,
        end_matrix: Matrix,
        gradient: MorphGradient,
    },
    Bitmap {
        fill_type: Located<u8>,
        bitmap_id: Located<u16>,
        start_matrix: Matrix,
        end_matrix: Matrix,
    },
}

pub fn decode_morph_fill_style(c: &mut BitCursor<'_>) -> Result<MorphFillStyle> {
    let fill_type = read_ui8(c)?;
    let style = match fill_type.value {
        FILL_SOLID => MorphFillStyle::Solid {
            fill_type,
            start_color: decode_rgba(c)?,
            end_color: decode_rgba(c)?,
        },
        FILL_LINEAR_GRADIENT | FILL_RADIAL_GRADIENT | FILL_FOCAL_RADIAL_GRADIENT => {
            MorphFillStyle::Gradient {
                fill_type,
                start_matrix: decode_matrix(c)?,
                end_matrix: decode_matrix(c)?,
                gradient: decode_morph_gradient(
                    c,
                    fill_type.value == FILL_FOCAL_RADIAL_GRADIENT,
                )?,
            }
        }
        FILL_REPEATING_BITMAP
        | FILL_CLIPPED_BITMAP
        | FILL_NON_SMOOTHED_REPEATING_BITMAP
        | FILL_NON_SMOOTHED_CLIPPED_BITMAP => MorphFillStyle::Bitmap {
            fill_type,
            bitmap_id: read_ui16(c)?,
            start_matrix: decode_matrix(c)?,
            end_matrix: decode_matrix(c)?,
        },
        other => {
            return Err(DecodeError::InvalidValue {
                field: "morph fill style type",
                value: u32::from(other),
                position: fill_type.position,
            })
        }
    };
    Ok(style)
}

/// `MORPHLINESTYLE2` fields beyond the widths.
#[derive(Debug, Clone, PartialEq)]
pub struct MorphLineStyleExt {
    pub start_cap_style: Located<u32>,
    pub join_style: Located<u32>,
    pub has_fill: Located<bool>,
    pub no_h_scale: Located<bool>,
    pub no_v_scale: Located<bool>,
    pub pixel_hinting: Located<bool>,
    pub no_close: Located<bool>,
    pub end_cap_style: Located<u32>,
    pub miter_limit_factor: Option<Located<Fixed8>>,
    pub fill: Option<MorphFillStyle>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MorphLineStyle {
    pub start_width: Located<u16>,
    pub end_width: Located<u16>,
    /// `None` for a `MORPHLINESTYLE2` carrying a fill.
    pub colors: Option<(Color, Color)>,
    pub ext: Option<MorphLineStyleExt>,
}

pub fn decode_morph_line_style(c: &mut BitCursor<'_>, v2: bool) -> Result<MorphLineStyle> {
    let start_width = read_ui16(c)?;
    let end_width = read_ui16(c)?;
    if !v2 {
        return Ok(MorphLineStyle {
            start_width,
            end_width,
            colors: Some((decode_rgba(c)?, decode_rgba(c)?)),
            ext: None,
        });
    }

    let start_cap_style = read_ub(c, 2)?;
    let join_style = read_ub(c, 2)?;
    let has_fill = read_flag(c)?;
    let no_h_scale = read_flag(c)?;
    let no_v_scale = read_flag(c)?;
    let pixel_hinting = read_flag(c)?;
    let _reserved = c.read_bits(5)?;
    let no_close = read_flag(c)?;
    let end_cap_style = read_ub(c, 2)?;
    let miter_limit_factor = if join_style.value == JOIN_STYLE_MITER {
        Some(read_fixed8(c)?)
    } else {
        None
    };
    let (colors, fill) = if has_fill.value {
        (None, Some(decode_morph_fill_style(c)?))
    } else {
        (Some((decode_rgba(c)?, decode_rgba(c)?)), None)
    };
    Ok(MorphLineStyle {
        start_width,
        end_width,
        colors,
        ext: Some(MorphLineStyleExt {
            start_cap_style,
            join_style,
            has_fill,
            no_h_scale,
            no_v_scale,
            pixel_hinting,
            no_close,
            end_cap_style,
            miter_limit_factor,
            fill,
        }),
    })
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MorphStyleArrays {
    pub fill_styles: Vec<MorphFillStyle>,
    pub line_styles: Vec<MorphLineStyle>,
}

pub fn decode_morph_style_arrays(c: &mut BitCursor<'_>, v2: bool) -> Result<MorphStyleArrays> {
    let fill_count = usize::from(read_style_count(c, true)?.value);
    check_count(c, fill_count, 1, "morph fill style count")?;
    let mut fill_styles = Vec::with_capacity(fill_count);
    for _ in 0..fill_count {
        fill_styles.push(decode_morph_fill_style(c)?);
    }

    let line_count = usize::from(read_style_count(c, true)?.value);
    check_count(c, line_count, 4, "morph line style count")?;
    let mut line_styles = Vec::with_capacity(line_count);
    for _ in 0..line_count {
        line_styles.push(decode_morph_line_style(c, v2)?);
    }
    Ok(MorphStyleArrays {
        fill_styles,
        line_styles,
    })
}
