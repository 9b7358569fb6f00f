//! `CLIPACTIONS` attached to sprite instances by `PlaceObject2`/`PlaceObject3`.

use bitflags::bitflags;

use crate::actions::{decode_action_stream, ActionList};
use crate::bits::{BitCursor, BitPosition, Located};
use crate::context::DecodeContext;
use crate::error::Result;
use crate::primitives::{read_ui16, read_ui32, read_ui8};

bitflags! {
    /// `CLIPEVENTFLAGS`, normalized to the 32-bit SWF 6+ layout. SWF 5 files
    /// store only the upper 16 bits.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct ClipEventFlags: u32 {
        const KEY_UP = 1 << 31;
        const KEY_DOWN = 1 << 30;
        const MOUSE_UP = 1 << 29;
        const MOUSE_DOWN = 1 << 28;
        const MOUSE_MOVE = 1 << 27;
        const UNLOAD = 1 << 26;
        const ENTER_FRAME = 1 << 25;
        const LOAD = 1 << 24;
        const DRAG_OVER = 1 << 23;
        const ROLL_OUT = 1 << 22;
        const ROLL_OVER = 1 << 21;
        const RELEASE_OUTSIDE = 1 << 20;
        const RELEASE = 1 << 19;
        const PRESS = 1 << 18;
        const INITIALIZE = 1 << 17;
        const DATA = 1 << 16;
        const CONSTRUCT = 1 << 10;
        const KEY_PRESS = 1 << 9;
        const DRAG_OUT = 1 << 8;
    }
}

/// Reads the event flag field, whose width depends on the movie version.
fn read_event_flags(c: &mut BitCursor<'_>, version: u8) -> Result<Located<ClipEventFlags>> {
    let position = c.position();
    let raw = if version <= 5 {
        c.read_bits(16)? << 16
    } else {
        c.read_bits(32)?
    };
    Ok(Located::new(ClipEventFlags::from_bits_retain(raw), position))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClipActionRecord {
    pub position: BitPosition,
    pub event_flags: Located<ClipEventFlags>,
    /// Bytes following this field that belong to the record.
    pub size: Located<u32>,
    /// Present when `KEY_PRESS` is set.
    pub key_code: Option<Located<u8>>,
    pub actions: ActionList,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClipActions {
    pub all_event_flags: Located<ClipEventFlags>,
    pub records: Vec<ClipActionRecord>,
}

/// Decodes clip actions through the terminating all-zero event flags.
pub fn decode_clip_actions(c: &mut BitCursor<'_>, ctx: &mut DecodeContext) -> Result<ClipActions> {
    let _reserved = read_ui16(c)?;
    let version = ctx.version();
    let all_event_flags = read_event_flags(c, version)?;

    let mut records = Vec::new();
    loop {
        let position = c.position();
        let event_flags = read_event_flags(c, version)?;
        if event_flags.value.bits() == 0 {
            break;
        }

        let size = read_ui32(c)?;
        let len = usize::try_from(size.value).unwrap_or(usize::MAX);
        let mut body = c.sub_cursor(len)?;
        let key_code = if event_flags.value.contains(ClipEventFlags::KEY_PRESS) {
            Some(read_ui8(&mut body)?)
        } else {
            None
        };
        let actions = ctx.nested(position, |ctx| decode_action_stream(&mut body, ctx))?;
        c.skip_bytes(len)?;

        records.push(ClipActionRecord {
            position,
            event_flags,
            size,
            key_code,
            actions,
        });
    }

    Ok(ClipActions {
        all_event_flags,
        records,
    })
}
