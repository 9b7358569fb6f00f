use tracing::debug;

use crate::bits::{BitCursor, Located};
use crate::error::Result;
use crate::primitives::{read_flag, read_ub, read_ui16, read_ui32};
use crate::structures::geometry::{decode_rect, Rect};
use crate::structures::morph::{decode_morph_style_arrays, MorphStyleArrays};
use crate::structures::shape::{
    decode_shape, decode_shape_with_style, Shape, ShapeVersion, ShapeWithStyle,
};

use super::{resolve_offset, seek_forward};

/// `DefineShape4` stroke and winding flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape4Flags {
    pub uses_fill_winding_rule: Located<bool>,
    pub uses_non_scaling_strokes: Located<bool>,
    pub uses_scaling_strokes: Located<bool>,
}

fn decode_shape4_flags(c: &mut BitCursor<'_>) -> Result<Shape4Flags> {
    let _reserved = c.read_bits(5)?;
    Ok(Shape4Flags {
        uses_fill_winding_rule: read_flag(c)?,
        uses_non_scaling_strokes: read_flag(c)?,
        uses_scaling_strokes: read_flag(c)?,
    })
}

/// `DefineShape` through `DefineShape4`.
#[derive(Debug, Clone, PartialEq)]
pub struct DefineShape {
    pub version: ShapeVersion,
    pub shape_id: Located<u16>,
    pub bounds: Rect,
    /// `DefineShape4` only.
    pub edge_bounds: Option<Rect>,
    pub flags: Option<Shape4Flags>,
    pub shape: ShapeWithStyle,
}

fn shape_version(version: u8) -> ShapeVersion {
    match version {
        1 => ShapeVersion::Shape1,
        2 => ShapeVersion::Shape2,
        3 => ShapeVersion::Shape3,
        _ => ShapeVersion::Shape4,
    }
}

pub(super) fn decode_define_shape(c: &mut BitCursor<'_>, version: u8) -> Result<DefineShape> {
    let version = shape_version(version);
    let shape_id = read_ui16(c)?;
    let bounds = decode_rect(c)?;
    let (edge_bounds, flags) = if version == ShapeVersion::Shape4 {
        (Some(decode_rect(c)?), Some(decode_shape4_flags(c)?))
    } else {
        (None, None)
    };
    let shape = decode_shape_with_style(c, version)?;
    Ok(DefineShape {
        version,
        shape_id,
        bounds,
        edge_bounds,
        flags,
        shape,
    })
}

/// `DefineMorphShape` or `DefineMorphShape2`.
#[derive(Debug, Clone, PartialEq)]
pub struct DefineMorphShape {
    pub is_v2: bool,
    pub character_id: Located<u16>,
    pub start_bounds: Rect,
    pub end_bounds: Rect,
    pub start_edge_bounds: Option<Rect>,
    pub end_edge_bounds: Option<Rect>,
    pub uses_non_scaling_strokes: Option<Located<bool>>,
    pub uses_scaling_strokes: Option<Located<bool>>,
    /// Distance from the end of this field to `end_edges`.
    pub offset: Located<u32>,
    pub styles: MorphStyleArrays,
    pub start_edges: Shape,
    pub end_edges: Shape,
}

pub(super) fn decode_define_morph_shape(
    c: &mut BitCursor<'_>,
    is_v2: bool,
) -> Result<DefineMorphShape> {
    let character_id = read_ui16(c)?;
    let start_bounds = decode_rect(c)?;
    let end_bounds = decode_rect(c)?;
    let (start_edge_bounds, end_edge_bounds, uses_non_scaling_strokes, uses_scaling_strokes) =
        if is_v2 {
            let start = decode_rect(c)?;
            let end = decode_rect(c)?;
            let _reserved = read_ub(c, 6)?;
            let non_scaling = read_flag(c)?;
            let scaling = read_flag(c)?;
            (Some(start), Some(end), Some(non_scaling), Some(scaling))
        } else {
            (None, None, None, None)
        };

    let offset = read_ui32(c)?;
    let offset_base = c.position().byte;
    let styles = decode_morph_style_arrays(c, is_v2)?;
    let version = if is_v2 {
        ShapeVersion::Shape4
    } else {
        ShapeVersion::Shape3
    };
    let start_edges = decode_shape(c, version)?;

    if offset.value != 0 {
        let target = resolve_offset(c, offset_base, offset, "morph end edges offset")?;
        if target != c.position().byte {
            debug!(
                target,
                here = c.position().byte,
                "morph end edges offset differs from decoded start edges"
            );
        }
        seek_forward(c, target, "morph end edges offset")?;
    }
    let end_edges = decode_shape(c, version)?;

    Ok(DefineMorphShape {
        is_v2,
        character_id,
        start_bounds,
        end_bounds,
        start_edge_bounds,
        end_edge_bounds,
        uses_non_scaling_strokes,
        uses_scaling_strokes,
        offset,
        styles,
        start_edges,
        end_edges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use crate::structures::shape::ShapeRecord;
    use crate::test_utils::BitWriter;

    fn empty_rect(w: &mut BitWriter) {
        w.write_bits(0, 5);
        w.align();
    }

    #[test]
    fn define_shape1_with_one_edge() {
        let mut w = BitWriter::new();
        w.write_bytes(&[0x01, 0x00]);
        empty_rect(&mut w);
        w.write_bytes(&[0x00, 0x00]); // no fills, no lines
        w.write_bits(0, 4);
        w.write_bits(0, 4);
        // Straight horizontal edge, nbits 2+2.
        w.write_bits(1, 1);
        w.write_bits(1, 1);
        w.write_bits(2, 4);
        w.write_bits(0, 1);
        w.write_bits(0, 1);
        w.write_signed_bits(5, 4);
        w.write_bits(0, 6); // end of shape
        let bytes = w.finish();

        let mut c = BitCursor::new(&bytes);
        let tag = decode_define_shape(&mut c, 1).unwrap();
        assert!(c.is_empty());
        assert_eq!(tag.shape_id.value, 1);
        assert!(tag.edge_bounds.is_none());
        let ShapeRecord::StraightEdge { delta_x, delta_y, .. } = &tag.shape.shape.records[0] else {
            panic!("expected straight edge");
        };
        assert_eq!((delta_x.value, delta_y.value), (5, 0));
    }

    #[test]
    fn define_shape4_reads_edge_bounds_and_flags() {
        let mut w = BitWriter::new();
        w.write_bytes(&[0x02, 0x00]);
        empty_rect(&mut w);
        empty_rect(&mut w);
        w.write_bits(0, 5);
        w.write_bits(1, 1);
        w.write_bits(0, 1);
        w.write_bits(1, 1);
        w.write_bytes(&[0x00, 0x00, 0x00, 0x00]);
        let bytes = w.finish();

        let mut c = BitCursor::new(&bytes);
        let tag = decode_define_shape(&mut c, 4).unwrap();
        assert_eq!(tag.version, ShapeVersion::Shape4);
        let flags = tag.flags.unwrap();
        assert!(flags.uses_fill_winding_rule.value);
        assert!(!flags.uses_non_scaling_strokes.value);
        assert!(flags.uses_scaling_strokes.value);
        assert!(tag.shape.shape.records.is_empty());
    }

    #[test]
    fn morph_shape_follows_end_edges_offset() {
        let mut w = BitWriter::new();
        w.write_bytes(&[0x03, 0x00]);
        empty_rect(&mut w);
        empty_rect(&mut w);
        // Style counts, a two-byte empty start shape, then one padding byte.
        w.write_bytes(&5u32.to_le_bytes());
        w.write_bytes(&[0x00, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x00]);
        let bytes = w.finish();

        let mut c = BitCursor::new(&bytes);
        let tag = decode_define_morph_shape(&mut c, false).unwrap();
        assert!(c.is_empty());
        assert_eq!(tag.offset.value, 5);
        assert!(tag.start_edges.records.is_empty());
        assert!(tag.end_edges.records.is_empty());
    }

    #[test]
    fn morph_offset_past_body_is_rejected() {
        let mut w = BitWriter::new();
        w.write_bytes(&[0x03, 0x00]);
        empty_rect(&mut w);
        empty_rect(&mut w);
        w.write_bytes(&100u32.to_le_bytes());
        w.write_bytes(&[0x00, 0x00, 0x00, 0x00]);
        let bytes = w.finish();

        let mut c = BitCursor::new(&bytes);
        assert!(matches!(
            decode_define_morph_shape(&mut c, false),
            Err(DecodeError::InvalidValue {
                field: "morph end edges offset",
                ..
            })
        ));
    }
}
