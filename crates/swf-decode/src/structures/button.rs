//! Button character records and condition/action pairs.

use bitflags::bitflags;

use crate::actions::{decode_action_stream, ActionList};
use crate::bits::{BitCursor, BitPosition, Located};
use crate::context::DecodeContext;
use crate::error::{DecodeError, Result};
use crate::primitives::{read_ui16, read_ui8};
use crate::structures::color::{decode_cxform_with_alpha, ColorTransform};
use crate::structures::filter::{decode_filter_list, Filter};
use crate::structures::geometry::{decode_matrix, Matrix};

bitflags! {
    /// Leading flag byte of a `BUTTONRECORD`.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct ButtonStateFlags: u8 {
        const HAS_BLEND_MODE = 1 << 5;
        const HAS_FILTER_LIST = 1 << 4;
        const HIT_TEST = 1 << 3;
        const DOWN = 1 << 2;
        const OVER = 1 << 1;
        const UP = 1 << 0;
    }
}

bitflags! {
    /// State transitions of a `BUTTONCONDACTION`. The key-press code shares
    /// the low byte and is kept separately.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct ButtonConditions: u16 {
        const IDLE_TO_OVER_DOWN = 1 << 15;
        const OUT_DOWN_TO_IDLE = 1 << 14;
        const OUT_DOWN_TO_OVER_DOWN = 1 << 13;
        const OVER_DOWN_TO_OUT_DOWN = 1 << 12;
        const OVER_DOWN_TO_OVER_UP = 1 << 11;
        const OVER_UP_TO_OVER_DOWN = 1 << 10;
        const OVER_UP_TO_IDLE = 1 << 9;
        const IDLE_TO_OVER_UP = 1 << 8;
        const OVER_DOWN_TO_IDLE = 1 << 0;
    }
}

const KEY_PRESS_MASK: u16 = 0x00FE;

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonRecord {
    pub position: BitPosition,
    pub states: Located<ButtonStateFlags>,
    pub character_id: Located<u16>,
    pub depth: Located<u16>,
    pub matrix: Matrix,
    /// `DefineButton2` only.
    pub color_transform: Option<ColorTransform>,
    pub filters: Vec<Filter>,
    pub blend_mode: Option<Located<u8>>,
}

/// Decodes button records up to and including the `0` end byte.
pub fn decode_button_records(c: &mut BitCursor<'_>, button2: bool) -> Result<Vec<ButtonRecord>> {
    let mut records = Vec::new();
    loop {
        let position = c.position();
        let flags = c.fork().read_u8()?;
        if flags == 0 {
            c.read_u8()?;
            break;
        }

        let raw = read_ui8(c)?;
        let states = raw.map(ButtonStateFlags::from_bits_truncate);
        let character_id = read_ui16(c)?;
        let depth = read_ui16(c)?;
        let matrix = decode_matrix(c)?;

        let mut record = ButtonRecord {
            position,
            states,
            character_id,
            depth,
            matrix,
            color_transform: None,
            filters: Vec::new(),
            blend_mode: None,
        };
        if button2 {
            record.color_transform = Some(decode_cxform_with_alpha(c)?);
            if states.value.contains(ButtonStateFlags::HAS_FILTER_LIST) {
                record.filters = decode_filter_list(c)?;
            }
            if states.value.contains(ButtonStateFlags::HAS_BLEND_MODE) {
                record.blend_mode = Some(read_ui8(c)?);
            }
        }
        records.push(record);
    }
    Ok(records)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonCondAction {
    /// Offset to the next record; `0` on the last one.
    pub size: Located<u16>,
    pub conditions: Located<ButtonConditions>,
    /// `CondKeyPress`, `0` when no key is bound.
    pub key_code: Located<u8>,
    pub actions: ActionList,
}

fn decode_cond_action_body(
    c: &mut BitCursor<'_>,
    ctx: &mut DecodeContext,
    size: Located<u16>,
) -> Result<ButtonCondAction> {
    let position = c.position();
    let raw = c.read_bits(16)? as u16;
    let conditions = Located::new(ButtonConditions::from_bits_truncate(raw), position);
    let key_code = Located::new(
        ((raw & KEY_PRESS_MASK) >> 1) as u8,
        BitPosition::at_byte(position.byte + 1),
    );
    let actions = ctx.nested(position, |ctx| decode_action_stream(c, ctx))?;
    Ok(ButtonCondAction {
        size,
        conditions,
        key_code,
        actions,
    })
}

/// Decodes the chained `BUTTONCONDACTION` list filling the rest of `c`.
pub fn decode_button_cond_actions(
    c: &mut BitCursor<'_>,
    ctx: &mut DecodeContext,
) -> Result<Vec<ButtonCondAction>> {
    let mut out = Vec::new();
    loop {
        let start = c.position();
        let size = read_ui16(c)?;
        if size.value == 0 {
            out.push(decode_cond_action_body(c, ctx, size)?);
            break;
        }

        let body_len = usize::from(size.value).checked_sub(2).ok_or(
            DecodeError::InvalidValue {
                field: "button condition action size",
                value: u32::from(size.value),
                position: size.position,
            },
        )?;
        let mut body = c.sub_cursor(body_len)?;
        out.push(decode_cond_action_body(&mut body, ctx, size)?);
        c.skip_bytes(body_len)?;
        debug_assert_eq!(c.position().byte, start.byte + usize::from(size.value));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Action;
    use crate::context::DecodeOptions;

    fn ctx() -> DecodeContext {
        DecodeContext::new(8, DecodeOptions::default())
    }

    #[test]
    fn records_stop_at_zero_byte() {
        let bytes = [
            0x01, 0x02, 0x00, 0x01, 0x00, 0x00, // up state, char 2, depth 1, empty matrix
            0x00, // end
            0xAA,
        ];
        let mut c = BitCursor::new(&bytes);
        let records = decode_button_records(&mut c, false).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].states.value, ButtonStateFlags::UP);
        assert_eq!(records[0].character_id.value, 2);
        assert_eq!(c.position(), BitPosition::at_byte(7));
    }

    #[test]
    fn chained_cond_actions() {
        let bytes = [
            0x07, 0x00, // size to next
            0x00, 0x08, // OverDownToIdle=0, key 4
            0x07, 0x00, // Stop, End
            0x00, // padding inside the record
            0x00, 0x00, // last
            0x01, 0x00, // IdleToOverUp
            0x06, 0x00, // Play, End
        ];
        let mut c = BitCursor::new(&bytes);
        let conds = decode_button_cond_actions(&mut c, &mut ctx()).unwrap();
        assert_eq!(conds.len(), 2);
        assert_eq!(conds[0].key_code.value, 4);
        assert!(conds[0].conditions.value.is_empty());
        assert_eq!(conds[0].actions[0].action, Action::Stop);
        assert_eq!(conds[1].conditions.value, ButtonConditions::IDLE_TO_OVER_UP);
        assert_eq!(conds[1].actions[0].action, Action::Play);
        assert!(c.is_empty());
    }

    #[test]
    fn cond_action_size_past_body() {
        let mut c = BitCursor::new(&[0x40, 0x00, 0x00, 0x00, 0x00]);
        assert!(matches!(
            decode_button_cond_actions(&mut c, &mut ctx()),
            Err(DecodeError::OutOfBounds { end: 5, .. })
        ));
    }

    #[test]
    fn cond_action_size_below_header_is_invalid() {
        let mut c = BitCursor::new(&[0x01, 0x00, 0x00, 0x00, 0x00]);
        assert!(matches!(
            decode_button_cond_actions(&mut c, &mut ctx()),
            Err(DecodeError::InvalidValue { value: 1, .. })
        ));
    }
}
