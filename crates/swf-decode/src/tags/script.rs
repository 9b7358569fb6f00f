use crate::actions::{decode_action_stream, ActionList};
use crate::bits::{BitCursor, Located};
use crate::context::DecodeContext;
use crate::error::Result;
use crate::primitives::{read_rest, read_string, read_ui16, read_ui32, SwfString};

#[derive(Debug, Clone, PartialEq)]
pub struct DoAction {
    pub actions: ActionList,
}

pub(super) fn decode_do_action(
    c: &mut BitCursor<'_>,
    ctx: &mut DecodeContext,
) -> Result<DoAction> {
    Ok(DoAction {
        actions: decode_action_stream(c, ctx)?,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoInitAction {
    pub sprite_id: Located<u16>,
    pub actions: ActionList,
}

pub(super) fn decode_do_init_action(
    c: &mut BitCursor<'_>,
    ctx: &mut DecodeContext,
) -> Result<DoInitAction> {
    Ok(DoInitAction {
        sprite_id: read_ui16(c)?,
        actions: decode_action_stream(c, ctx)?,
    })
}

/// ActionScript 3 bytecode; the ABC file itself is not decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoAbc {
    /// Bit 0 is `kDoAbcLazyInitializeFlag`.
    pub flags: Located<u32>,
    pub name: Located<SwfString>,
    pub data: Located<Vec<u8>>,
}

pub(super) fn decode_do_abc(c: &mut BitCursor<'_>) -> Result<DoAbc> {
    Ok(DoAbc {
        flags: read_ui32(c)?,
        name: read_string(c)?,
        data: read_rest(c)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{Action, PushValue};
    use crate::context::DecodeOptions;
    use crate::error::DecodeError;

    fn ctx() -> DecodeContext {
        DecodeContext::new(6, DecodeOptions::default())
    }

    #[test]
    fn do_init_action_reads_sprite_id() {
        let bytes = [0x03, 0x00, 0x96, 0x02, 0x00, 0x05, 0x01, 0x07, 0x00];
        let mut c = BitCursor::new(&bytes);
        let init = decode_do_init_action(&mut c, &mut ctx()).unwrap();
        assert_eq!(init.sprite_id.value, 3);
        assert_eq!(init.actions.len(), 2);
        let Action::Push(values) = &init.actions[0].action else {
            panic!("expected push");
        };
        assert_eq!(values[0].value, PushValue::Boolean(true));
        assert!(c.is_empty());
    }

    #[test]
    fn do_action_requires_end() {
        let mut c = BitCursor::new(&[0x07]);
        assert!(matches!(
            decode_do_action(&mut c, &mut ctx()),
            Err(DecodeError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn do_abc_name_and_payload() {
        let mut bytes = 1u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"frame1\0");
        bytes.extend_from_slice(&[0x10, 0x00, 0x2E, 0x00]);
        let mut c = BitCursor::new(&bytes);
        let abc = decode_do_abc(&mut c).unwrap();
        assert_eq!(abc.flags.value, 1);
        assert_eq!(abc.name.value, "frame1");
        assert_eq!(abc.data.value.len(), 4);
    }
}
