//! Display list tags.

use bitflags::bitflags;

use crate::bits::{BitCursor, Located};
use crate::context::DecodeContext;
use crate::error::Result;
use crate::primitives::{read_string, read_ui16, read_ui8, SwfString};
use crate::structures::clip::{decode_clip_actions, ClipActions};
use crate::structures::color::{
    decode_cxform, decode_cxform_with_alpha, decode_rgba, Color, ColorTransform,
};
use crate::structures::filter::{decode_filter_list, Filter};
use crate::structures::geometry::{decode_matrix, Matrix};

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceObject {
    pub character_id: Located<u16>,
    pub depth: Located<u16>,
    pub matrix: Matrix,
    /// Optional trailing `CXFORM`.
    pub color_transform: Option<ColorTransform>,
}

pub(super) fn decode_place_object(c: &mut BitCursor<'_>) -> Result<PlaceObject> {
    let character_id = read_ui16(c)?;
    let depth = read_ui16(c)?;
    let matrix = decode_matrix(c)?;
    let color_transform = if c.is_empty() {
        None
    } else {
        Some(decode_cxform(c)?)
    };
    Ok(PlaceObject {
        character_id,
        depth,
        matrix,
        color_transform,
    })
}

bitflags! {
    /// `PlaceObject2`/`PlaceObject3` flags. The high byte is the
    /// `PlaceObject2` flag byte; the low byte only exists in `PlaceObject3`.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct PlaceFlags: u16 {
        const HAS_CLIP_ACTIONS = 1 << 15;
        const HAS_CLIP_DEPTH = 1 << 14;
        const HAS_NAME = 1 << 13;
        const HAS_RATIO = 1 << 12;
        const HAS_COLOR_TRANSFORM = 1 << 11;
        const HAS_MATRIX = 1 << 10;
        const HAS_CHARACTER = 1 << 9;
        const MOVE = 1 << 8;
        const OPAQUE_BACKGROUND = 1 << 6;
        const HAS_VISIBLE = 1 << 5;
        const HAS_IMAGE = 1 << 4;
        const HAS_CLASS_NAME = 1 << 3;
        const HAS_CACHE_AS_BITMAP = 1 << 2;
        const HAS_BLEND_MODE = 1 << 1;
        const HAS_FILTER_LIST = 1 << 0;
    }
}

/// `PlaceObject2` or `PlaceObject3`; fields absent from the wire are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceObject2 {
    /// 2 or 3.
    pub version: u8,
    pub flags: Located<PlaceFlags>,
    pub depth: Located<u16>,
    pub class_name: Option<Located<SwfString>>,
    pub character_id: Option<Located<u16>>,
    pub matrix: Option<Matrix>,
    pub color_transform: Option<ColorTransform>,
    pub ratio: Option<Located<u16>>,
    pub name: Option<Located<SwfString>>,
    pub clip_depth: Option<Located<u16>>,
    pub filters: Option<Vec<Filter>>,
    pub blend_mode: Option<Located<u8>>,
    pub cache_as_bitmap: Option<Located<u8>>,
    pub visible: Option<Located<u8>>,
    pub background_color: Option<Color>,
    pub clip_actions: Option<ClipActions>,
}

impl PlaceObject2 {
    pub fn is_move(&self) -> bool {
        self.flags.value.contains(PlaceFlags::MOVE)
    }
}

pub(super) fn decode_place_object2(
    c: &mut BitCursor<'_>,
    ctx: &mut DecodeContext,
    version: u8,
) -> Result<PlaceObject2> {
    let position = c.position();
    let raw = if version >= 3 {
        c.read_bits(16)?
    } else {
        c.read_bits(8)? << 8
    };
    let flags = PlaceFlags::from_bits_truncate(raw as u16);
    let has = |flag: PlaceFlags| flags.contains(flag);

    let depth = read_ui16(c)?;
    let class_name = if version >= 3
        && (has(PlaceFlags::HAS_CLASS_NAME)
            || (has(PlaceFlags::HAS_IMAGE) && has(PlaceFlags::HAS_CHARACTER)))
    {
        Some(read_string(c)?)
    } else {
        None
    };
    let character_id = has(PlaceFlags::HAS_CHARACTER)
        .then(|| read_ui16(c))
        .transpose()?;
    let matrix = has(PlaceFlags::HAS_MATRIX)
        .then(|| decode_matrix(c))
        .transpose()?;
    let color_transform = has(PlaceFlags::HAS_COLOR_TRANSFORM)
        .then(|| decode_cxform_with_alpha(c))
        .transpose()?;
    let ratio = has(PlaceFlags::HAS_RATIO).then(|| read_ui16(c)).transpose()?;
    let name = has(PlaceFlags::HAS_NAME).then(|| read_string(c)).transpose()?;
    let clip_depth = has(PlaceFlags::HAS_CLIP_DEPTH)
        .then(|| read_ui16(c))
        .transpose()?;
    let filters = has(PlaceFlags::HAS_FILTER_LIST)
        .then(|| decode_filter_list(c))
        .transpose()?;
    let blend_mode = has(PlaceFlags::HAS_BLEND_MODE)
        .then(|| read_ui8(c))
        .transpose()?;
    let cache_as_bitmap = has(PlaceFlags::HAS_CACHE_AS_BITMAP)
        .then(|| read_ui8(c))
        .transpose()?;
    let visible = has(PlaceFlags::HAS_VISIBLE).then(|| read_ui8(c)).transpose()?;
    let background_color = has(PlaceFlags::OPAQUE_BACKGROUND)
        .then(|| decode_rgba(c))
        .transpose()?;
    let clip_actions = if has(PlaceFlags::HAS_CLIP_ACTIONS) {
        Some(ctx.nested(position, |ctx| decode_clip_actions(c, ctx))?)
    } else {
        None
    };

    Ok(PlaceObject2 {
        version,
        flags: Located::new(flags, position),
        depth,
        class_name,
        character_id,
        matrix,
        color_transform,
        ratio,
        name,
        clip_depth,
        filters,
        blend_mode,
        cache_as_bitmap,
        visible,
        background_color,
        clip_actions,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveObject {
    pub character_id: Located<u16>,
    pub depth: Located<u16>,
}

pub(super) fn decode_remove_object(c: &mut BitCursor<'_>) -> Result<RemoveObject> {
    Ok(RemoveObject {
        character_id: read_ui16(c)?,
        depth: read_ui16(c)?,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveObject2 {
    pub depth: Located<u16>,
}

pub(super) fn decode_remove_object2(c: &mut BitCursor<'_>) -> Result<RemoveObject2> {
    Ok(RemoveObject2 {
        depth: read_ui16(c)?,
    })
}
