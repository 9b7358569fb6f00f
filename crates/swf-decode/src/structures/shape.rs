//! Fill/line styles, gradients and shape records shared by `DefineShape*`,
//! morph shapes and font glyphs.

use crate::bits::{BitCursor, BitPosition, Located};
use crate::error::{DecodeError, Result};
use crate::primitives::{
    check_count, read_fixed8, read_flag, read_sb, read_ub, read_ui16, read_ui8, Fixed8,
};
use crate::structures::color::{decode_rgb, decode_rgba, Color};
use crate::structures::geometry::{decode_matrix, Matrix};

/// Which `DefineShape` revision a style or record belongs to. Later revisions
/// widen colors to RGBA, allow extended fill counts and richer line styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShapeVersion {
    Shape1 = 1,
    Shape2 = 2,
    Shape3 = 3,
    Shape4 = 4,
}

impl ShapeVersion {
    fn has_alpha(self) -> bool {
        self >= ShapeVersion::Shape3
    }

    fn decode_color(self, c: &mut BitCursor<'_>) -> Result<Color> {
        if self.has_alpha() {
            decode_rgba(c)
        } else {
            decode_rgb(c)
        }
    }
}

pub const FILL_SOLID: u8 = 0x00;
pub const FILL_LINEAR_GRADIENT: u8 = 0x10;
pub const FILL_RADIAL_GRADIENT: u8 = 0x12;
pub const FILL_FOCAL_RADIAL_GRADIENT: u8 = 0x13;
pub const FILL_REPEATING_BITMAP: u8 = 0x40;
pub const FILL_CLIPPED_BITMAP: u8 = 0x41;
pub const FILL_NON_SMOOTHED_REPEATING_BITMAP: u8 = 0x42;
pub const FILL_NON_SMOOTHED_CLIPPED_BITMAP: u8 = 0x43;

/// Count byte value that selects a following `u16` count.
const EXTENDED_COUNT: u8 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradientRecord {
    pub ratio: Located<u8>,
    pub color: Color,
}

/// `GRADIENT` / `FOCALGRADIENT`.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub spread_mode: Located<u32>,
    pub interpolation_mode: Located<u32>,
    pub records: Vec<GradientRecord>,
    /// Only present for focal radial gradients.
    pub focal_point: Option<Located<Fixed8>>,
}

pub fn decode_gradient(c: &mut BitCursor<'_>, version: ShapeVersion, focal: bool) -> Result<Gradient> {
    let spread_mode = read_ub(c, 2)?;
    let interpolation_mode = read_ub(c, 2)?;
    let count = c.read_bits(4)? as usize;
    let mut records = Vec::with_capacity(count);
    for _ in 0..count {
        records.push(GradientRecord {
            ratio: read_ui8(c)?,
            color: version.decode_color(c)?,
        });
    }
    let focal_point = if focal { Some(read_fixed8(c)?) } else { None };
    Ok(Gradient {
        spread_mode,
        interpolation_mode,
        records,
        focal_point,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum FillStyle {
    Solid {
        fill_type: Located<u8>,
        color: Color,
    },
    Gradient {
        fill_type: Located<u8>,
        matrix: Matrix,
        gradient: Gradient,
    },
    Bitmap {
        fill_type: Located<u8>,
        bitmap_id: Located<u16>,
        matrix: Matrix,
    },
}

impl FillStyle {
    pub fn fill_type(&self) -> u8 {
        match self {
            FillStyle::Solid { fill_type, .. }
            | FillStyle::Gradient { fill_type, .. }
            | FillStyle::Bitmap { fill_type, .. } => fill_type.value,
        }
    }
}

pub fn decode_fill_style(c: &mut BitCursor<'_>, version: ShapeVersion) -> Result<FillStyle> {
    let fill_type = read_ui8(c)?;
    let style = match fill_type.value {
        FILL_SOLID => FillStyle::Solid {
            fill_type,
            color: version.decode_color(c)?,
        },
        FILL_LINEAR_GRADIENT | FILL_RADIAL_GRADIENT | FILL_FOCAL_RADIAL_GRADIENT => {
            let matrix = decode_matrix(c)?;
            let gradient =
                decode_gradient(c, version, fill_type.value == FILL_FOCAL_RADIAL_GRADIENT)?;
            FillStyle::Gradient {
                fill_type,
                matrix,
                gradient,
            }
        }
        FILL_REPEATING_BITMAP
        | FILL_CLIPPED_BITMAP
        | FILL_NON_SMOOTHED_REPEATING_BITMAP
        | FILL_NON_SMOOTHED_CLIPPED_BITMAP => FillStyle::Bitmap {
            fill_type,
            bitmap_id: read_ui16(c)?,
            matrix: decode_matrix(c)?,
        },
        other => {
            return Err(DecodeError::InvalidValue {
                field: "fill style type",
                value: u32::from(other),
                position: fill_type.position,
            })
        }
    };
    Ok(style)
}

/// `LINESTYLE2` extras, present from `DefineShape4` on.
#[derive(Debug, Clone, PartialEq)]
pub struct LineStyleExt {
    pub start_cap_style: Located<u32>,
    pub join_style: Located<u32>,
    pub has_fill: Located<bool>,
    pub no_h_scale: Located<bool>,
    pub no_v_scale: Located<bool>,
    pub pixel_hinting: Located<bool>,
    pub no_close: Located<bool>,
    pub end_cap_style: Located<u32>,
    /// Present when `join_style` is miter (2).
    pub miter_limit_factor: Option<Located<Fixed8>>,
    pub fill: Option<FillStyle>,
}

pub const JOIN_STYLE_MITER: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub width: Located<u16>,
    /// Absent only for a `LINESTYLE2` that carries a fill instead.
    pub color: Option<Color>,
    pub ext: Option<LineStyleExt>,
}

pub fn decode_line_style(c: &mut BitCursor<'_>, version: ShapeVersion) -> Result<LineStyle> {
    let width = read_ui16(c)?;
    if version < ShapeVersion::Shape4 {
        return Ok(LineStyle {
            width,
            color: Some(version.decode_color(c)?),
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
    let (color, fill) = if has_fill.value {
        (None, Some(decode_fill_style(c, version)?))
    } else {
        (Some(decode_rgba(c)?), None)
    };
    Ok(LineStyle {
        width,
        color,
        ext: Some(LineStyleExt {
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

/// Reads a style array count: a `u8`, widened to a following `u16` when it
/// holds `0xFF` and `extended` allows it.
pub(crate) fn read_style_count(c: &mut BitCursor<'_>, extended: bool) -> Result<Located<u16>> {
    let count = read_ui8(c)?;
    if extended && count.value == EXTENDED_COUNT {
        return read_ui16(c);
    }
    Ok(count.map(u16::from))
}

/// `FILLSTYLEARRAY` followed by `LINESTYLEARRAY`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleArrays {
    pub fill_styles: Vec<FillStyle>,
    pub line_styles: Vec<LineStyle>,
}

pub fn decode_style_arrays(c: &mut BitCursor<'_>, version: ShapeVersion) -> Result<StyleArrays> {
    let fill_count = read_style_count(c, version >= ShapeVersion::Shape2)?;
    let fill_count = usize::from(fill_count.value);
    check_count(c, fill_count, 1, "fill style count")?;
    let mut fill_styles = Vec::with_capacity(fill_count);
    for _ in 0..fill_count {
        fill_styles.push(decode_fill_style(c, version)?);
    }

    let line_count = read_style_count(c, true)?;
    let line_count = usize::from(line_count.value);
    check_count(c, line_count, 2, "line style count")?;
    let mut line_styles = Vec::with_capacity(line_count);
    for _ in 0..line_count {
        line_styles.push(decode_line_style(c, version)?);
    }

    Ok(StyleArrays {
        fill_styles,
        line_styles,
    })
}

/// Style selection and/or pen move.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleChange {
    pub position: BitPosition,
    /// Bit width and target of a `MoveTo`.
    pub move_to: Option<(Located<u32>, Located<i32>, Located<i32>)>,
    pub fill_style0: Option<Located<u32>>,
    pub fill_style1: Option<Located<u32>>,
    pub line_style: Option<Located<u32>>,
    /// New style arrays with the fill/line index widths that follow them.
    pub new_styles: Option<(StyleArrays, Located<u32>, Located<u32>)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeRecord {
    StyleChange(StyleChange),
    StraightEdge {
        position: BitPosition,
        num_bits: Located<u32>,
        delta_x: Located<i32>,
        delta_y: Located<i32>,
    },
    CurvedEdge {
        position: BitPosition,
        num_bits: Located<u32>,
        control_delta_x: Located<i32>,
        control_delta_y: Located<i32>,
        anchor_delta_x: Located<i32>,
        anchor_delta_y: Located<i32>,
    },
}

/// `SHAPE`: index widths and records, terminated by an end-of-shape record.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub num_fill_bits: Located<u32>,
    pub num_line_bits: Located<u32>,
    pub records: Vec<ShapeRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeWithStyle {
    pub styles: StyleArrays,
    pub shape: Shape,
}

fn decode_edge(c: &mut BitCursor<'_>, position: BitPosition) -> Result<ShapeRecord> {
    let straight = c.read_flag()?;
    let num_bits = read_ub(c, 4)?;
    let n = num_bits.value + 2;
    if !straight {
        return Ok(ShapeRecord::CurvedEdge {
            position,
            num_bits,
            control_delta_x: read_sb(c, n)?,
            control_delta_y: read_sb(c, n)?,
            anchor_delta_x: read_sb(c, n)?,
            anchor_delta_y: read_sb(c, n)?,
        });
    }

    let general = c.read_flag()?;
    let (delta_x, delta_y) = if general {
        (read_sb(c, n)?, read_sb(c, n)?)
    } else {
        let vertical = c.read_flag()?;
        let here = c.position();
        if vertical {
            (Located::new(0, here), read_sb(c, n)?)
        } else {
            (read_sb(c, n)?, Located::new(0, here))
        }
    };
    Ok(ShapeRecord::StraightEdge {
        position,
        num_bits,
        delta_x,
        delta_y,
    })
}

/// Decodes shape records with the given starting index widths. Style changes
/// that carry new arrays update the widths for the records that follow.
fn decode_shape_records(
    c: &mut BitCursor<'_>,
    version: ShapeVersion,
    mut fill_bits: u32,
    mut line_bits: u32,
) -> Result<Vec<ShapeRecord>> {
    let mut records = Vec::new();
    loop {
        let position = c.position();
        let is_edge = c.read_flag()?;
        if is_edge {
            records.push(decode_edge(c, position)?);
            continue;
        }

        let flags = c.read_bits(5)?;
        if flags == 0 {
            break;
        }
        let new_styles = flags & 0b10000 != 0;
        let has_line_style = flags & 0b01000 != 0;
        let has_fill_style1 = flags & 0b00100 != 0;
        let has_fill_style0 = flags & 0b00010 != 0;
        let has_move_to = flags & 0b00001 != 0;

        let move_to = if has_move_to {
            let bits = read_ub(c, 5)?;
            let x = read_sb(c, bits.value)?;
            let y = read_sb(c, bits.value)?;
            Some((bits, x, y))
        } else {
            None
        };
        let fill_style0 = has_fill_style0.then(|| read_ub(c, fill_bits)).transpose()?;
        let fill_style1 = has_fill_style1.then(|| read_ub(c, fill_bits)).transpose()?;
        let line_style = has_line_style.then(|| read_ub(c, line_bits)).transpose()?;
        let new_styles = if new_styles {
            c.align();
            let styles = decode_style_arrays(c, version)?;
            let nf = read_ub(c, 4)?;
            let nl = read_ub(c, 4)?;
            fill_bits = nf.value;
            line_bits = nl.value;
            Some((styles, nf, nl))
        } else {
            None
        };

        records.push(ShapeRecord::StyleChange(StyleChange {
            position,
            move_to,
            fill_style0,
            fill_style1,
            line_style,
            new_styles,
        }));
    }
    c.align();
    Ok(records)
}

pub fn decode_shape(c: &mut BitCursor<'_>, version: ShapeVersion) -> Result<Shape> {
    let num_fill_bits = read_ub(c, 4)?;
    let num_line_bits = read_ub(c, 4)?;
    let records = decode_shape_records(c, version, num_fill_bits.value, num_line_bits.value)?;
    Ok(Shape {
        num_fill_bits,
        num_line_bits,
        records,
    })
}

pub fn decode_shape_with_style(c: &mut BitCursor<'_>, version: ShapeVersion) -> Result<ShapeWithStyle> {
    let styles = decode_style_arrays(c, version)?;
    let shape = decode_shape(c, version)?;
    Ok(ShapeWithStyle { styles, shape })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::BitWriter;

    #[test]
    fn solid_fill_uses_version_color_width() {
        let mut c = BitCursor::new(&[0x00, 1, 2, 3]);
        let style = decode_fill_style(&mut c, ShapeVersion::Shape1).unwrap();
        assert!(matches!(style, FillStyle::Solid { color, .. } if color.alpha.is_none()));
        assert!(c.is_empty());

        let mut c = BitCursor::new(&[0x00, 1, 2, 3, 4]);
        let style = decode_fill_style(&mut c, ShapeVersion::Shape3).unwrap();
        assert!(matches!(style, FillStyle::Solid { color, .. } if color.alpha == Some(4)));
    }

    #[test]
    fn unknown_fill_type_is_rejected() {
        let mut c = BitCursor::new(&[0x20, 0, 0, 0]);
        assert!(matches!(
            decode_fill_style(&mut c, ShapeVersion::Shape1),
            Err(DecodeError::InvalidValue { value: 0x20, .. })
        ));
    }

    #[test]
    fn extended_fill_count_only_from_shape2() {
        // 0xFF with Shape1 is a literal count of 255, which cannot fit.
        let mut c = BitCursor::new(&[0xFF, 0x00, 0x00, 0x00]);
        assert!(matches!(
            decode_style_arrays(&mut c, ShapeVersion::Shape1),
            Err(DecodeError::OutOfBounds { end: 4, .. })
        ));

        // With Shape2 the same byte escapes to a u16 count of zero.
        let mut c = BitCursor::new(&[0xFF, 0x00, 0x00, 0x00]);
        let styles = decode_style_arrays(&mut c, ShapeVersion::Shape2).unwrap();
        assert!(styles.fill_styles.is_empty());
        assert!(styles.line_styles.is_empty());
        assert!(c.is_empty());
    }

    #[test]
    fn style_change_bit_widths_follow_new_styles() {
        let mut w = BitWriter::new();
        // num fill bits 1, num line bits 0
        w.write_bits(1, 4);
        w.write_bits(0, 4);
        // style change: new styles + fill style 0, fill0 index 1
        w.write_bits(0, 1);
        w.write_bits(0b10010, 5);
        w.write_bits(1, 1);
        w.align();
        // new arrays: one solid RGB fill, zero line styles
        w.write_bytes(&[0x01, 0x00, 0xFF, 0x00, 0x00, 0x00]);
        // new widths: fill 2, line 0
        w.write_bits(2, 4);
        w.write_bits(0, 4);
        // style change selecting fill1 with the wider index
        w.write_bits(0, 1);
        w.write_bits(0b00100, 5);
        w.write_bits(0b11, 2);
        // straight vertical edge, num bits 0 -> 2-bit delta of -1
        w.write_bits(1, 1);
        w.write_bits(1, 1);
        w.write_bits(0, 4);
        w.write_bits(0, 1);
        w.write_bits(1, 1);
        w.write_bits(0b11, 2);
        // end of shape
        w.write_bits(0, 6);
        let bytes = w.finish();

        let mut c = BitCursor::new(&bytes);
        let shape = decode_shape(&mut c, ShapeVersion::Shape2).unwrap();
        assert!(c.is_empty());
        assert_eq!(shape.records.len(), 3);

        let ShapeRecord::StyleChange(first) = &shape.records[0] else {
            panic!("expected style change");
        };
        assert_eq!(first.fill_style0.map(|f| f.value), Some(1));
        let (styles, nf, _) = first.new_styles.as_ref().unwrap();
        assert_eq!(styles.fill_styles.len(), 1);
        assert_eq!(nf.value, 2);

        let ShapeRecord::StyleChange(second) = &shape.records[1] else {
            panic!("expected style change");
        };
        assert_eq!(second.fill_style1.map(|f| f.value), Some(3));

        let ShapeRecord::StraightEdge { delta_x, delta_y, .. } = &shape.records[2] else {
            panic!("expected straight edge");
        };
        assert_eq!(delta_x.value, 0);
        assert_eq!(delta_y.value, -1);
    }

    #[test]
    fn line_style2_with_miter_and_fill() {
        let mut w = BitWriter::new();
        w.write_bytes(&20u16.to_le_bytes());
        w.write_bits(0, 2); // round caps
        w.write_bits(JOIN_STYLE_MITER, 2);
        w.write_bits(1, 1); // has fill
        w.write_bits(0, 3);
        w.write_bits(0, 5);
        w.write_bits(1, 1); // no close
        w.write_bits(1, 2);
        w.write_bytes(&0x0300u16.to_le_bytes());
        w.write_bytes(&[FILL_SOLID, 9, 8, 7, 6]);
        let bytes = w.finish();

        let mut c = BitCursor::new(&bytes);
        let style = decode_line_style(&mut c, ShapeVersion::Shape4).unwrap();
        assert!(c.is_empty());
        assert!(style.color.is_none());
        let ext = style.ext.unwrap();
        assert!(ext.no_close.value);
        assert_eq!(ext.end_cap_style.value, 1);
        assert_eq!(ext.miter_limit_factor.unwrap().value.to_f32(), 3.0);
        assert_eq!(ext.fill.unwrap().fill_type(), FILL_SOLID);
    }

    #[test]
    fn focal_gradient_reads_focal_point() {
        let mut w = BitWriter::new();
        w.write_bytes(&[FILL_FOCAL_RADIAL_GRADIENT]);
        w.write_bits(0, 7); // identity-ish matrix: no scale, no rotate, 0-bit translate
        w.align();
        w.write_bits(1, 2); // reflect
        w.write_bits(0, 2);
        w.write_bits(1, 4);
        w.write_bytes(&[0x80, 1, 2, 3, 4]);
        w.write_bytes(&0x0080u16.to_le_bytes());
        let bytes = w.finish();

        let mut c = BitCursor::new(&bytes);
        let FillStyle::Gradient { gradient, .. } =
            decode_fill_style(&mut c, ShapeVersion::Shape4).unwrap()
        else {
            panic!("expected gradient");
        };
        assert_eq!(gradient.spread_mode.value, 1);
        assert_eq!(gradient.records.len(), 1);
        assert_eq!(gradient.focal_point.unwrap().value.to_f32(), 0.5);
        assert!(c.is_empty());
    }
}
