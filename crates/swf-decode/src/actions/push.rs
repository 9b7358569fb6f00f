use crate::bits::{BitCursor, BitPosition};
use crate::error::{DecodeError, Result};
use crate::primitives::{read_string, SwfString};

pub const PUSH_TYPE_STRING: u8 = 0;
pub const PUSH_TYPE_FLOAT: u8 = 1;
pub const PUSH_TYPE_NULL: u8 = 2;
pub const PUSH_TYPE_UNDEFINED: u8 = 3;
pub const PUSH_TYPE_REGISTER: u8 = 4;
pub const PUSH_TYPE_BOOLEAN: u8 = 5;
pub const PUSH_TYPE_DOUBLE: u8 = 6;
pub const PUSH_TYPE_INTEGER: u8 = 7;
pub const PUSH_TYPE_CONSTANT8: u8 = 8;
pub const PUSH_TYPE_CONSTANT16: u8 = 9;

/// Literal carried by one entry of an `ActionPush`.
#[derive(Debug, Clone, PartialEq)]
pub enum PushValue {
    String(SwfString),
    Float(f32),
    Null,
    Undefined,
    Register(u8),
    Boolean(bool),
    Double(f64),
    Integer(i32),
    /// Index into the active constant pool.
    Constant8(u8),
    Constant16(u16),
}

impl PushValue {
    /// The one-byte type discriminator this literal is encoded with.
    pub fn type_code(&self) -> u8 {
        match self {
            PushValue::String(_) => PUSH_TYPE_STRING,
            PushValue::Float(_) => PUSH_TYPE_FLOAT,
            PushValue::Null => PUSH_TYPE_NULL,
            PushValue::Undefined => PUSH_TYPE_UNDEFINED,
            PushValue::Register(_) => PUSH_TYPE_REGISTER,
            PushValue::Boolean(_) => PUSH_TYPE_BOOLEAN,
            PushValue::Double(_) => PUSH_TYPE_DOUBLE,
            PushValue::Integer(_) => PUSH_TYPE_INTEGER,
            PushValue::Constant8(_) => PUSH_TYPE_CONSTANT8,
            PushValue::Constant16(_) => PUSH_TYPE_CONSTANT16,
        }
    }
}

/// One literal pushed onto the evaluation stack. `position` is the type byte.
#[derive(Debug, Clone, PartialEq)]
pub struct PushedValue {
    pub position: BitPosition,
    pub value: PushValue,
}

/// Doubles in push records are stored as two little-endian words, high word
/// first.
fn read_push_double(c: &mut BitCursor<'_>) -> Result<f64> {
    let high = c.read_u32()?;
    let low = c.read_u32()?;
    Ok(f64::from_bits((u64::from(high) << 32) | u64::from(low)))
}

pub(crate) fn decode_pushed_value(c: &mut BitCursor<'_>) -> Result<PushedValue> {
    let position = c.position();
    let type_code = c.read_u8()?;
    let value = match type_code {
        PUSH_TYPE_STRING => PushValue::String(read_string(c)?.value),
        PUSH_TYPE_FLOAT => PushValue::Float(c.read_f32()?),
        PUSH_TYPE_NULL => PushValue::Null,
        PUSH_TYPE_UNDEFINED => PushValue::Undefined,
        PUSH_TYPE_REGISTER => PushValue::Register(c.read_u8()?),
        PUSH_TYPE_BOOLEAN => PushValue::Boolean(c.read_u8()? != 0),
        PUSH_TYPE_DOUBLE => PushValue::Double(read_push_double(c)?),
        PUSH_TYPE_INTEGER => PushValue::Integer(c.read_i32()?),
        PUSH_TYPE_CONSTANT8 => PushValue::Constant8(c.read_u8()?),
        PUSH_TYPE_CONSTANT16 => PushValue::Constant16(c.read_u16()?),
        other => {
            return Err(DecodeError::InvalidValue {
                field: "push value type",
                value: u32::from(other),
                position,
            })
        }
    };
    Ok(PushedValue { position, value })
}

/// Decodes every literal in a push operand; the operand length bounds `c`.
pub(crate) fn decode_push_operands(c: &mut BitCursor<'_>) -> Result<Vec<PushedValue>> {
    let mut values = Vec::new();
    while !c.is_empty() {
        values.push(decode_pushed_value(c)?);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_uses_swapped_words() {
        let bits = 1.5f64.to_bits();
        let mut bytes = vec![PUSH_TYPE_DOUBLE];
        bytes.extend_from_slice(&((bits >> 32) as u32).to_le_bytes());
        bytes.extend_from_slice(&(bits as u32).to_le_bytes());
        let mut c = BitCursor::new(&bytes);
        let v = decode_pushed_value(&mut c).unwrap();
        assert_eq!(v.value, PushValue::Double(1.5));
        assert!(c.is_empty());
    }

    #[test]
    fn mixed_literals_keep_positions() {
        let bytes = [
            PUSH_TYPE_NULL,
            PUSH_TYPE_REGISTER,
            3,
            PUSH_TYPE_STRING,
            b'x',
            0,
            PUSH_TYPE_CONSTANT16,
            0x34,
            0x12,
        ];
        let mut c = BitCursor::new(&bytes);
        let values = decode_push_operands(&mut c).unwrap();
        let got: Vec<_> = values.iter().map(|v| (v.position.byte, &v.value)).collect();
        assert_eq!(
            got,
            vec![
                (0, &PushValue::Null),
                (1, &PushValue::Register(3)),
                (3, &PushValue::String("x".into())),
                (6, &PushValue::Constant16(0x1234)),
            ]
        );
    }

    #[test]
    fn unknown_type_is_invalid() {
        let mut c = BitCursor::new(&[0x0A]);
        assert!(matches!(
            decode_pushed_value(&mut c),
            Err(DecodeError::InvalidValue { value: 10, .. })
        ));
    }
}
