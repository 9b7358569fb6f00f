use tracing::debug;

use crate::bits::{BitCursor, Located};
use crate::context::DecodeContext;
use crate::error::Result;
use crate::header::RecordHeader;
use crate::primitives::read_ui16;

use super::{decode_tag, Tag};

/// A movie clip: its own frame count and control tag list.
#[derive(Debug, Clone, PartialEq)]
pub struct DefineSprite {
    pub sprite_id: Located<u16>,
    pub frame_count: Located<u16>,
    /// Nested tags, including the closing `End` when present.
    pub tags: Vec<Tag>,
}

impl DefineSprite {
    pub fn has_end(&self) -> bool {
        self.tags.last().is_some_and(Tag::is_end)
    }
}

pub(super) fn decode_define_sprite(
    c: &mut BitCursor<'_>,
    ctx: &mut DecodeContext,
    header: RecordHeader,
) -> Result<DefineSprite> {
    let sprite_id = read_ui16(c)?;
    let frame_count = read_ui16(c)?;
    let tags = ctx.nested(header.position, |ctx| {
        let mut tags = Vec::new();
        while !c.is_empty() {
            let tag = decode_tag(c, ctx)?;
            let is_end = tag.is_end();
            tags.push(tag);
            if is_end {
                break;
            }
        }
        Ok(tags)
    })?;

    let sprite = DefineSprite {
        sprite_id,
        frame_count,
        tags,
    };
    if !sprite.has_end() {
        debug!(
            sprite_id = sprite_id.value,
            position = %header.position,
            "sprite tag list ends without End tag"
        );
    }
    Ok(sprite)
}
