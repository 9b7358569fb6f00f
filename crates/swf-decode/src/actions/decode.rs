use tracing::debug;

use super::push::decode_push_operands;
use super::*;
use crate::bits::{BitCursor, Located};
use crate::context::DecodeContext;
use crate::error::{DecodeError, RecordKind, Result};
use crate::primitives::{
    check_count, read_flag, read_si16, read_string, read_ub, read_ui16, read_ui8,
};

/// How a finished action stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// An `End` opcode was consumed.
    EndOpcode,
    /// A length-delimited block ran out of bytes without an `End` opcode.
    Boundary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Reading,
    Done(Termination),
    Failed,
}

/// Lazily decodes one action stream.
///
/// Yields each decoded action; the `End` opcode moves the stream to its done
/// state without producing an item. After the first error the stream is failed
/// and yields nothing more.
pub struct ActionStream<'a, 'c> {
    cursor: BitCursor<'a>,
    ctx: &'c mut DecodeContext,
    /// Blocks are delimited by their enclosing size field and may omit `End`.
    block: bool,
    state: State,
}

impl<'a, 'c> ActionStream<'a, 'c> {
    /// Stream that must be closed by an `End` opcode before `cursor` runs out.
    pub fn new(cursor: BitCursor<'a>, ctx: &'c mut DecodeContext) -> Self {
        Self {
            cursor,
            ctx,
            block: false,
            state: State::Reading,
        }
    }

    /// Stream bounded by `cursor`, where running out of bytes also ends it.
    pub fn block(cursor: BitCursor<'a>, ctx: &'c mut DecodeContext) -> Self {
        Self {
            block: true,
            ..Self::new(cursor, ctx)
        }
    }

    /// Position just past the last consumed byte.
    pub fn cursor(&self) -> BitCursor<'a> {
        self.cursor
    }

    /// `None` while reading or after a failure.
    pub fn termination(&self) -> Option<Termination> {
        match self.state {
            State::Done(t) => Some(t),
            State::Reading | State::Failed => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.state == State::Failed
    }
}

impl Iterator for ActionStream<'_, '_> {
    type Item = Result<DecodedAction>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state != State::Reading {
            return None;
        }
        if self.block && self.cursor.is_empty() {
            self.state = State::Done(Termination::Boundary);
            return None;
        }
        match decode_action(&mut self.cursor, self.ctx) {
            Ok(Some(action)) => Some(Ok(action)),
            Ok(None) => {
                self.state = State::Done(Termination::EndOpcode);
                None
            }
            Err(err) => {
                self.state = State::Failed;
                Some(Err(err))
            }
        }
    }
}

/// Decodes actions up to and including the `End` opcode.
///
/// A stream that reaches the end of `c` without `End` fails with the
/// cursor's `OutOfBounds`, so it never reads past the enclosing record.
pub fn decode_action_stream(c: &mut BitCursor<'_>, ctx: &mut DecodeContext) -> Result<ActionList> {
    let mut stream = ActionStream::new(*c, ctx);
    let actions = stream.by_ref().collect::<Result<ActionList>>()?;
    *c = stream.cursor();
    Ok(actions)
}

/// Decodes a size-delimited action block such as a function body.
pub fn decode_action_block(c: &mut BitCursor<'_>, ctx: &mut DecodeContext) -> Result<ActionList> {
    let mut stream = ActionStream::block(*c, ctx);
    let actions = stream.by_ref().collect::<Result<ActionList>>()?;
    *c = stream.cursor();
    Ok(actions)
}

/// Decodes one action. `Ok(None)` means the `End` opcode was consumed.
fn decode_action(c: &mut BitCursor<'_>, ctx: &mut DecodeContext) -> Result<Option<DecodedAction>> {
    let position = c.position();
    ctx.count_record(position)?;
    let opcode = c.read_u8()?;

    if opcode == OPCODE_END {
        return Ok(None);
    }

    if opcode < COMPLEX_OPCODE_THRESHOLD {
        let action = match Action::from_simple_opcode(opcode) {
            Some(action) => action,
            None => {
                debug!(opcode, %position, "unknown simple action");
                Action::Unknown {
                    data: Located::new(Vec::new(), c.position()),
                }
            }
        };
        return Ok(Some(DecodedAction {
            position,
            opcode,
            length: None,
            action,
        }));
    }

    let length = read_ui16(c)?;
    let declared = usize::from(length.value);
    let violation = DecodeError::LengthViolation {
        record: RecordKind::Action,
        code: u16::from(opcode),
        position,
        declared: u32::from(length.value),
    };
    if declared > c.remaining_bytes() {
        return Err(violation);
    }

    let mut operands = c.sub_cursor(declared)?;
    let operands_end = operands.end();
    let action = decode_operands(opcode, &mut operands).map_err(|err| match err {
        DecodeError::OutOfBounds { end, .. } if end == operands_end => violation,
        other => other,
    })?;
    c.skip_bytes(declared)?;

    let action = attach_bodies(action, opcode, position, c, ctx)?;

    Ok(Some(DecodedAction {
        position,
        opcode,
        length: Some(length),
        action,
    }))
}

fn decode_operands(opcode: u8, c: &mut BitCursor<'_>) -> Result<Action> {
    let action = match opcode {
        OPCODE_GOTO_FRAME => Action::GotoFrame {
            frame: read_ui16(c)?,
        },
        OPCODE_GET_URL => Action::GetUrl {
            url: read_string(c)?,
            target: read_string(c)?,
        },
        OPCODE_STORE_REGISTER => Action::StoreRegister {
            register: read_ui8(c)?,
        },
        OPCODE_CONSTANT_POOL => {
            let count = read_ui16(c)?;
            check_count(c, usize::from(count.value), 1, "constant pool size")?;
            let mut constants = Vec::with_capacity(usize::from(count.value));
            for _ in 0..count.value {
                constants.push(read_string(c)?);
            }
            Action::ConstantPool { constants }
        }
        OPCODE_WAIT_FOR_FRAME => Action::WaitForFrame {
            frame: read_ui16(c)?,
            skip_count: read_ui8(c)?,
        },
        OPCODE_SET_TARGET => Action::SetTarget {
            target: read_string(c)?,
        },
        OPCODE_GO_TO_LABEL => Action::GoToLabel {
            label: read_string(c)?,
        },
        OPCODE_WAIT_FOR_FRAME2 => Action::WaitForFrame2 {
            skip_count: read_ui8(c)?,
        },
        OPCODE_DEFINE_FUNCTION2 => Action::DefineFunction2(decode_define_function2(c)?),
        OPCODE_TRY => Action::Try(decode_try(c)?),
        OPCODE_WITH => Action::With(With {
            size: read_ui16(c)?,
            body: Vec::new(),
        }),
        OPCODE_PUSH => Action::Push(decode_push_operands(c)?),
        OPCODE_JUMP => Action::Jump {
            offset: read_si16(c)?,
        },
        OPCODE_GET_URL2 => {
            let send_vars_method = read_ub(c, 2)?;
            let _reserved = c.read_bits(4)?;
            Action::GetUrl2 {
                send_vars_method,
                load_target: read_flag(c)?,
                load_variables: read_flag(c)?,
            }
        }
        OPCODE_DEFINE_FUNCTION => {
            let name = read_string(c)?;
            let count = read_ui16(c)?;
            check_count(c, usize::from(count.value), 1, "function parameter count")?;
            let mut params = Vec::with_capacity(usize::from(count.value));
            for _ in 0..count.value {
                params.push(read_string(c)?);
            }
            Action::DefineFunction(DefineFunction {
                name,
                params,
                code_size: read_ui16(c)?,
                body: Vec::new(),
            })
        }
        OPCODE_IF => Action::If {
            offset: read_si16(c)?,
        },
        OPCODE_CALL => Action::Call,
        OPCODE_GOTO_FRAME2 => {
            let _reserved = c.read_bits(6)?;
            let scene_bias_flag = read_flag(c)?;
            let play = read_flag(c)?;
            let scene_bias = if scene_bias_flag.value {
                Some(read_ui16(c)?)
            } else {
                None
            };
            Action::GotoFrame2 {
                scene_bias_flag,
                play,
                scene_bias,
            }
        }
        _ => {
            let data = crate::primitives::read_rest(c)?;
            debug!(opcode, len = data.value.len(), "unknown action captured opaquely");
            return Ok(Action::Unknown { data });
        }
    };
    Ok(action)
}

fn decode_define_function2(c: &mut BitCursor<'_>) -> Result<DefineFunction2> {
    let name = read_string(c)?;
    let count = read_ui16(c)?;
    let register_count = read_ui8(c)?;
    let flags_position = c.position();
    let flags = FunctionFlags::from_bits_retain(c.read_bits(16)? as u16);

    // Each parameter is at least a register byte and an empty name.
    check_count(c, usize::from(count.value), 2, "function parameter count")?;
    let mut params = Vec::with_capacity(usize::from(count.value));
    for _ in 0..count.value {
        params.push(RegisterParam {
            register: read_ui8(c)?,
            name: read_string(c)?,
        });
    }

    Ok(DefineFunction2 {
        name,
        register_count,
        flags: Located::new(flags, flags_position),
        params,
        code_size: read_ui16(c)?,
        body: Vec::new(),
    })
}

fn decode_try(c: &mut BitCursor<'_>) -> Result<Try> {
    let _reserved = c.read_bits(5)?;
    let catch_in_register = read_flag(c)?;
    let has_finally = read_flag(c)?;
    let has_catch = read_flag(c)?;
    let try_size = read_ui16(c)?;
    let catch_size = read_ui16(c)?;
    let finally_size = read_ui16(c)?;
    let catch_target = if catch_in_register.value {
        CatchTarget::Register(read_ui8(c)?)
    } else {
        CatchTarget::Variable(read_string(c)?)
    };
    Ok(Try {
        catch_in_register,
        has_finally,
        has_catch,
        try_size,
        catch_size,
        finally_size,
        catch_target,
        try_body: Vec::new(),
        catch_body: Vec::new(),
        finally_body: Vec::new(),
    })
}

/// Decodes the `size` bytes following an action record as a nested block and
/// moves `c` past them.
fn decode_body(
    c: &mut BitCursor<'_>,
    ctx: &mut DecodeContext,
    opcode: u8,
    position: crate::bits::BitPosition,
    size: u16,
) -> Result<ActionList> {
    if usize::from(size) > c.remaining_bytes() {
        return Err(DecodeError::LengthViolation {
            record: RecordKind::Action,
            code: u16::from(opcode),
            position,
            declared: u32::from(size),
        });
    }
    let mut body = c.sub_cursor(usize::from(size))?;
    let actions = ctx.nested(position, |ctx| decode_action_block(&mut body, ctx))?;
    c.skip_bytes(usize::from(size))?;
    Ok(actions)
}

fn attach_bodies(
    action: Action,
    opcode: u8,
    position: crate::bits::BitPosition,
    c: &mut BitCursor<'_>,
    ctx: &mut DecodeContext,
) -> Result<Action> {
    let action = match action {
        Action::DefineFunction(mut f) => {
            f.body = decode_body(c, ctx, opcode, position, f.code_size.value)?;
            Action::DefineFunction(f)
        }
        Action::DefineFunction2(mut f) => {
            f.body = decode_body(c, ctx, opcode, position, f.code_size.value)?;
            Action::DefineFunction2(f)
        }
        Action::With(mut w) => {
            w.body = decode_body(c, ctx, opcode, position, w.size.value)?;
            Action::With(w)
        }
        Action::Try(mut t) => {
            t.try_body = decode_body(c, ctx, opcode, position, t.try_size.value)?;
            t.catch_body = decode_body(c, ctx, opcode, position, t.catch_size.value)?;
            t.finally_body = decode_body(c, ctx, opcode, position, t.finally_size.value)?;
            Action::Try(t)
        }
        other => other,
    };
    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::BitPosition;
    use crate::context::DecodeOptions;
    use pretty_assertions::assert_eq;

    fn ctx() -> DecodeContext {
        DecodeContext::new(8, DecodeOptions::default())
    }

    fn decode(bytes: &[u8]) -> Result<ActionList> {
        let mut c = BitCursor::new(bytes);
        decode_action_stream(&mut c, &mut ctx())
    }

    #[test]
    fn push_records_each_literal() {
        let bytes = [0x96, 0x02, 0x00, PUSH_TYPE_NULL, PUSH_TYPE_UNDEFINED, 0x00];
        let mut c = BitCursor::new(&bytes);
        let actions = decode_action_stream(&mut c, &mut ctx()).unwrap();
        assert_eq!(actions.len(), 1);
        let push = &actions[0];
        assert_eq!(push.position, BitPosition::at_byte(0));
        assert_eq!(push.opcode, OPCODE_PUSH);
        assert_eq!(push.length.map(|l| l.value), Some(2));
        assert_eq!(
            push.action,
            Action::Push(vec![
                PushedValue {
                    position: BitPosition::at_byte(3),
                    value: PushValue::Null,
                },
                PushedValue {
                    position: BitPosition::at_byte(4),
                    value: PushValue::Undefined,
                },
            ])
        );
        assert!(c.is_empty());
    }

    #[test]
    fn push_of_two_zero_bytes_is_an_empty_string() {
        let actions = decode(&[0x96, 0x02, 0x00, 0x00, 0x00, 0x00]).unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(
            actions[0].action,
            Action::Push(vec![PushedValue {
                position: BitPosition::at_byte(3),
                value: PushValue::String("".into()),
            }])
        );
    }

    #[test]
    fn simple_and_unknown_opcodes() {
        let actions = decode(&[0x07, 0x7F, 0x06, 0x00]).unwrap();
        let ops: Vec<_> = actions.iter().map(|a| (a.opcode, &a.action)).collect();
        assert_eq!(
            ops,
            vec![
                (0x07, &Action::Stop),
                (
                    0x7F,
                    &Action::Unknown {
                        data: Located::new(Vec::new(), BitPosition::at_byte(2)),
                    }
                ),
                (0x06, &Action::Play),
            ]
        );
        assert!(actions.iter().all(|a| a.length.is_none()));
    }

    #[test]
    fn unknown_complex_opcode_keeps_operand_bytes() {
        let actions = decode(&[0xC0, 0x03, 0x00, 0xAA, 0xBB, 0xCC, 0x00]).unwrap();
        assert_eq!(
            actions[0].action,
            Action::Unknown {
                data: Located::new(vec![0xAA, 0xBB, 0xCC], BitPosition::at_byte(3)),
            }
        );
    }

    #[test]
    fn short_operand_grammar_skips_the_rest() {
        // GotoFrame declares 4 bytes but only needs 2.
        let actions = decode(&[0x81, 0x04, 0x00, 0x05, 0x00, 0xEE, 0xEE, 0x07, 0x00]).unwrap();
        assert_eq!(actions.len(), 2);
        assert!(matches!(
            actions[0].action,
            Action::GotoFrame { frame } if frame.value == 5
        ));
        assert_eq!(actions[1].action, Action::Stop);
    }

    #[test]
    fn operand_overrun_is_a_length_violation() {
        // GotoFrame with a 1-byte operand cannot hold its u16.
        let err = decode(&[0x81, 0x01, 0x00, 0x05, 0x00, 0x00]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::LengthViolation {
                record: RecordKind::Action,
                code: 0x81,
                position: BitPosition::at_byte(0),
                declared: 1,
            }
        );
    }

    #[test]
    fn declared_length_past_enclosing_body_fails() {
        let err = decode(&[0x96, 0x10, 0x00, 0x02, 0x00]).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::LengthViolation {
                record: RecordKind::Action,
                declared: 16,
                ..
            }
        ));
    }

    #[test]
    fn missing_end_opcode_overruns() {
        let err = decode(&[0x07, 0x06]).unwrap_err();
        assert!(matches!(err, DecodeError::OutOfBounds { end: 2, .. }));
    }

    #[test]
    fn stream_reports_termination_state() {
        let bytes = [0x07, 0x00, 0xFF];
        let mut context = ctx();
        let mut stream = ActionStream::new(BitCursor::new(&bytes), &mut context);
        assert!(stream.next().unwrap().is_ok());
        assert!(stream.next().is_none());
        assert_eq!(stream.termination(), Some(Termination::EndOpcode));
        assert_eq!(stream.cursor().position(), BitPosition::at_byte(2));
        assert!(stream.next().is_none());

        let mut context = ctx();
        let mut failed = ActionStream::new(BitCursor::new(&[0x96]), &mut context);
        assert!(failed.next().unwrap().is_err());
        assert!(failed.is_failed());
        assert!(failed.next().is_none());
    }

    #[test]
    fn constant_pool_and_get_url() {
        let bytes = [
            0x88, 0x07, 0x00, 0x02, 0x00, b'a', 0x00, b'b', b'c', 0x00, //
            0x83, 0x04, 0x00, b'u', 0x00, b't', 0x00, //
            0x00,
        ];
        let actions = decode(&bytes).unwrap();
        match &actions[0].action {
            Action::ConstantPool { constants } => {
                let names: Vec<_> = constants.iter().map(|s| s.value.to_string()).collect();
                assert_eq!(names, vec!["a", "bc"]);
                assert_eq!(constants[1].position, BitPosition::at_byte(7));
            }
            other => panic!("unexpected {other:?}"),
        }
        match &actions[1].action {
            Action::GetUrl { url, target } => {
                assert_eq!(url.value, "u");
                assert_eq!(target.value, "t");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn hostile_constant_pool_count_is_rejected() {
        let err = decode(&[0x88, 0x02, 0x00, 0xFF, 0xFF, 0x00]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::LengthViolation {
                record: RecordKind::Action,
                code: 0x88,
                position: BitPosition::at_byte(0),
                declared: 2,
            }
        );
    }

    #[test]
    fn get_url2_and_goto_frame2_bit_fields() {
        let bytes = [
            0x9A, 0x01, 0x00, 0b1000_0011, //
            0x9F, 0x03, 0x00, 0b0000_0011, 0x02, 0x00, //
            0x00,
        ];
        let actions = decode(&bytes).unwrap();
        match &actions[0].action {
            Action::GetUrl2 {
                send_vars_method,
                load_target,
                load_variables,
            } => {
                assert_eq!(send_vars_method.value, 2);
                assert!(load_target.value);
                assert!(load_variables.value);
                assert_eq!(load_variables.position, BitPosition::new(3, 7));
            }
            other => panic!("unexpected {other:?}"),
        }
        match &actions[1].action {
            Action::GotoFrame2 {
                scene_bias_flag,
                play,
                scene_bias,
            } => {
                assert!(scene_bias_flag.value);
                assert!(play.value);
                assert_eq!(scene_bias.map(|b| b.value), Some(2));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn define_function_carries_its_body() {
        let bytes = [
            0x9B, 0x08, 0x00, b'f', 0x00, 0x01, 0x00, b'x', 0x00, 0x02, 0x00, // header
            0x17, 0x3E, // body: Pop, Return
            0x07, 0x00,
        ];
        let actions = decode(&bytes).unwrap();
        assert_eq!(actions.len(), 2);
        match &actions[0].action {
            Action::DefineFunction(f) => {
                assert_eq!(f.name.value, "f");
                assert_eq!(f.params.len(), 1);
                assert_eq!(f.code_size.value, 2);
                let body: Vec<_> = f.body.iter().map(|a| &a.action).collect();
                assert_eq!(body, vec![&Action::Pop, &Action::Return]);
                assert_eq!(f.body[0].position, BitPosition::at_byte(11));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(actions[1].action, Action::Stop);
    }

    #[test]
    fn define_function2_flags_and_registers() {
        let bytes = [
            0x8E, 0x0B, 0x00, 0x00, // empty name
            0x01, 0x00, // one param
            0x04, // registers
            0b0010_1010, 0b0000_0001, // SUPPRESS_SUPER | SUPPRESS_ARGUMENTS | SUPPRESS_THIS | PRELOAD_GLOBAL
            0x01, b'a', 0x00, // param r1 "a"
            0x00, 0x00, // empty body
            0x00,
        ];
        let actions = decode(&bytes).unwrap();
        match &actions[0].action {
            Action::DefineFunction2(f) => {
                assert_eq!(f.register_count.value, 4);
                assert_eq!(
                    f.flags.value,
                    FunctionFlags::SUPPRESS_SUPER
                        | FunctionFlags::SUPPRESS_ARGUMENTS
                        | FunctionFlags::SUPPRESS_THIS
                        | FunctionFlags::PRELOAD_GLOBAL
                );
                assert_eq!(f.params[0].register.value, 1);
                assert_eq!(f.params[0].name.value, "a");
                assert!(f.body.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn function_body_past_the_stream_fails() {
        let bytes = [0x9B, 0x05, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00];
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::LengthViolation {
                code: 0x9B,
                declared: 16,
                ..
            }
        ));
    }

    #[test]
    fn try_blocks_are_consecutive() {
        let bytes = [
            0x8F, 0x08, 0x00, 0b0000_0011, // has_finally, has_catch
            0x01, 0x00, 0x01, 0x00, 0x01, 0x00, // sizes
            b'e', 0x00, // catch variable
            0x06, 0x07, 0x2A, 0x00,
        ];
        // A declared length of 8 cuts the catch name's terminator off.
        assert!(matches!(
            decode(&bytes),
            Err(DecodeError::LengthViolation { code: 0x8F, .. })
        ));

        let mut fixed = bytes.to_vec();
        fixed[1] = 0x09;
        let actions = decode(&fixed).unwrap();
        assert_eq!(actions.len(), 1);
        match &actions[0].action {
            Action::Try(t) => {
                assert!(t.has_catch.value && t.has_finally.value);
                assert!(matches!(&t.catch_target, CatchTarget::Variable(name) if name.value == "e"));
                assert_eq!(t.try_body[0].action, Action::Play);
                assert_eq!(t.catch_body[0].action, Action::Stop);
                assert_eq!(t.finally_body[0].action, Action::Throw);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn nested_bodies_respect_depth_limit() {
        // With { With { Stop } }
        let bytes = [
            0x94, 0x02, 0x00, 0x06, 0x00, //
            0x94, 0x02, 0x00, 0x01, 0x00, //
            0x07, 0x00,
        ];
        let mut c = BitCursor::new(&bytes);
        let mut shallow = DecodeContext::new(
            8,
            DecodeOptions {
                max_depth: 1,
                ..DecodeOptions::default()
            },
        );
        assert!(matches!(
            decode_action_stream(&mut c, &mut shallow),
            Err(DecodeError::DepthExceeded { depth: 2, .. })
        ));

        let actions = decode(&bytes).unwrap();
        let Action::With(outer) = &actions[0].action else {
            panic!("expected With");
        };
        let Action::With(inner) = &outer.body[0].action else {
            panic!("expected nested With");
        };
        assert_eq!(inner.body[0].action, Action::Stop);
    }

    #[test]
    fn block_mode_stops_at_boundary() {
        let bytes = [0x07, 0x06];
        let mut c = BitCursor::new(&bytes);
        let actions = decode_action_block(&mut c, &mut ctx()).unwrap();
        assert_eq!(actions.len(), 2);
        assert!(c.is_empty());
    }
}
