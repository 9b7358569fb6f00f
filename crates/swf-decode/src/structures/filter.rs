//! `FILTERLIST` used by `PlaceObject3` and `DefineButton2` records.

use crate::bits::{BitCursor, Located};
use crate::error::{DecodeError, Result};
use crate::primitives::{
    check_count, read_fixed, read_fixed8, read_flag, read_float, read_ub, read_ui8, Fixed, Fixed8,
};
use crate::structures::color::{decode_rgba, Color};

pub const FILTER_DROP_SHADOW: u8 = 0;
pub const FILTER_BLUR: u8 = 1;
pub const FILTER_GLOW: u8 = 2;
pub const FILTER_BEVEL: u8 = 3;
pub const FILTER_GRADIENT_GLOW: u8 = 4;
pub const FILTER_CONVOLUTION: u8 = 5;
pub const FILTER_COLOR_MATRIX: u8 = 6;
pub const FILTER_GRADIENT_BEVEL: u8 = 7;

/// Blur, placement and compositing parameters shared by the shadow, glow and
/// bevel families.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowParams {
    pub blur_x: Located<Fixed>,
    pub blur_y: Located<Fixed>,
    /// Absent for glow filters.
    pub angle: Option<Located<Fixed>>,
    pub distance: Option<Located<Fixed>>,
    pub strength: Located<Fixed8>,
    pub inner: Located<bool>,
    pub knockout: Located<bool>,
    pub composite_source: Located<bool>,
    /// Bevel and gradient filters only.
    pub on_top: Option<Located<bool>>,
    pub passes: Located<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub color: Color,
    pub ratio: Located<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    DropShadow {
        color: Color,
        params: ShadowParams,
    },
    Blur {
        blur_x: Located<Fixed>,
        blur_y: Located<Fixed>,
        passes: Located<u32>,
    },
    Glow {
        color: Color,
        params: ShadowParams,
    },
    Bevel {
        shadow_color: Color,
        highlight_color: Color,
        params: ShadowParams,
    },
    GradientGlow {
        stops: Vec<GradientStop>,
        params: ShadowParams,
    },
    Convolution {
        matrix_x: Located<u8>,
        matrix_y: Located<u8>,
        divisor: Located<f32>,
        bias: Located<f32>,
        matrix: Vec<Located<f32>>,
        default_color: Color,
        clamp: Located<bool>,
        preserve_alpha: Located<bool>,
    },
    ColorMatrix {
        matrix: Vec<Located<f32>>,
    },
    GradientBevel {
        stops: Vec<GradientStop>,
        params: ShadowParams,
    },
}

#[derive(Debug, Clone, Copy)]
struct ShadowLayout {
    placed: bool,
    on_top: bool,
    pass_bits: u32,
}

const DROP_SHADOW: ShadowLayout = ShadowLayout {
    placed: true,
    on_top: false,
    pass_bits: 5,
};
const GLOW: ShadowLayout = ShadowLayout {
    placed: false,
    on_top: false,
    pass_bits: 5,
};
const BEVEL: ShadowLayout = ShadowLayout {
    placed: true,
    on_top: true,
    pass_bits: 4,
};

fn decode_shadow_params(c: &mut BitCursor<'_>, layout: ShadowLayout) -> Result<ShadowParams> {
    let blur_x = read_fixed(c)?;
    let blur_y = read_fixed(c)?;
    let (angle, distance) = if layout.placed {
        (Some(read_fixed(c)?), Some(read_fixed(c)?))
    } else {
        (None, None)
    };
    let strength = read_fixed8(c)?;
    let inner = read_flag(c)?;
    let knockout = read_flag(c)?;
    let composite_source = read_flag(c)?;
    let on_top = layout.on_top.then(|| read_flag(c)).transpose()?;
    let passes = read_ub(c, layout.pass_bits)?;
    Ok(ShadowParams {
        blur_x,
        blur_y,
        angle,
        distance,
        strength,
        inner,
        knockout,
        composite_source,
        on_top,
        passes,
    })
}

fn decode_gradient_stops(c: &mut BitCursor<'_>) -> Result<Vec<GradientStop>> {
    let count = usize::from(read_ui8(c)?.value);
    check_count(c, count, 5, "gradient filter color count")?;
    let mut colors = Vec::with_capacity(count);
    for _ in 0..count {
        colors.push(decode_rgba(c)?);
    }
    let mut stops = Vec::with_capacity(count);
    for color in colors {
        stops.push(GradientStop {
            color,
            ratio: read_ui8(c)?,
        });
    }
    Ok(stops)
}

fn decode_floats(c: &mut BitCursor<'_>, count: usize) -> Result<Vec<Located<f32>>> {
    check_count(c, count, 4, "filter matrix size")?;
    (0..count).map(|_| read_float(c)).collect()
}

pub fn decode_filter(c: &mut BitCursor<'_>) -> Result<Filter> {
    let id = read_ui8(c)?;
    let filter = match id.value {
        FILTER_DROP_SHADOW => Filter::DropShadow {
            color: decode_rgba(c)?,
            params: decode_shadow_params(c, DROP_SHADOW)?,
        },
        FILTER_BLUR => {
            let blur_x = read_fixed(c)?;
            let blur_y = read_fixed(c)?;
            let passes = read_ub(c, 5)?;
            let _reserved = c.read_bits(3)?;
            Filter::Blur {
                blur_x,
                blur_y,
                passes,
            }
        }
        FILTER_GLOW => Filter::Glow {
            color: decode_rgba(c)?,
            params: decode_shadow_params(c, GLOW)?,
        },
        FILTER_BEVEL => Filter::Bevel {
            shadow_color: decode_rgba(c)?,
            highlight_color: decode_rgba(c)?,
            params: decode_shadow_params(c, BEVEL)?,
        },
        FILTER_GRADIENT_GLOW => Filter::GradientGlow {
            stops: decode_gradient_stops(c)?,
            params: decode_shadow_params(c, BEVEL)?,
        },
        FILTER_CONVOLUTION => {
            let matrix_x = read_ui8(c)?;
            let matrix_y = read_ui8(c)?;
            let divisor = read_float(c)?;
            let bias = read_float(c)?;
            let cells = usize::from(matrix_x.value) * usize::from(matrix_y.value);
            let matrix = decode_floats(c, cells)?;
            let default_color = decode_rgba(c)?;
            let _reserved = c.read_bits(6)?;
            Filter::Convolution {
                matrix_x,
                matrix_y,
                divisor,
                bias,
                matrix,
                default_color,
                clamp: read_flag(c)?,
                preserve_alpha: read_flag(c)?,
            }
        }
        FILTER_COLOR_MATRIX => Filter::ColorMatrix {
            matrix: decode_floats(c, 20)?,
        },
        FILTER_GRADIENT_BEVEL => Filter::GradientBevel {
            stops: decode_gradient_stops(c)?,
            params: decode_shadow_params(c, BEVEL)?,
        },
        other => {
            return Err(DecodeError::InvalidValue {
                field: "filter id",
                value: u32::from(other),
                position: id.position,
            })
        }
    };
    Ok(filter)
}

/// Count-prefixed filter list.
pub fn decode_filter_list(c: &mut BitCursor<'_>) -> Result<Vec<Filter>> {
    let count = usize::from(read_ui8(c)?.value);
    check_count(c, count, 1, "filter count")?;
    let mut filters = Vec::with_capacity(count);
    for _ in 0..count {
        filters.push(decode_filter(c)?);
    }
    Ok(filters)
}
