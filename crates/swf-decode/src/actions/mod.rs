//! ActionScript 2 bytecode ("actions") embedded in `DoAction`, `DoInitAction`,
//! button and clip-event records.
//!
//! An action is one opcode byte. Opcodes at or above
//! [`COMPLEX_OPCODE_THRESHOLD`] are followed by a little-endian `u16` operand
//! length and that many operand bytes; lower opcodes carry nothing. Streams end
//! with [`OPCODE_END`], which is consumed but never reported.

mod decode;
mod push;

pub use decode::{decode_action_block, decode_action_stream, ActionStream, Termination};
pub use push::{
    PushValue, PushedValue, PUSH_TYPE_BOOLEAN, PUSH_TYPE_CONSTANT16, PUSH_TYPE_CONSTANT8,
    PUSH_TYPE_DOUBLE, PUSH_TYPE_FLOAT, PUSH_TYPE_INTEGER, PUSH_TYPE_NULL, PUSH_TYPE_REGISTER,
    PUSH_TYPE_STRING, PUSH_TYPE_UNDEFINED,
};

use bitflags::bitflags;

use crate::bits::{BitPosition, Located};
use crate::primitives::SwfString;

pub const OPCODE_END: u8 = 0x00;
pub const COMPLEX_OPCODE_THRESHOLD: u8 = 0x80;

pub const OPCODE_GOTO_FRAME: u8 = 0x81;
pub const OPCODE_GET_URL: u8 = 0x83;
pub const OPCODE_STORE_REGISTER: u8 = 0x87;
pub const OPCODE_CONSTANT_POOL: u8 = 0x88;
pub const OPCODE_WAIT_FOR_FRAME: u8 = 0x8A;
pub const OPCODE_SET_TARGET: u8 = 0x8B;
pub const OPCODE_GO_TO_LABEL: u8 = 0x8C;
pub const OPCODE_WAIT_FOR_FRAME2: u8 = 0x8D;
pub const OPCODE_DEFINE_FUNCTION2: u8 = 0x8E;
pub const OPCODE_TRY: u8 = 0x8F;
pub const OPCODE_WITH: u8 = 0x94;
pub const OPCODE_PUSH: u8 = 0x96;
pub const OPCODE_JUMP: u8 = 0x99;
pub const OPCODE_GET_URL2: u8 = 0x9A;
pub const OPCODE_DEFINE_FUNCTION: u8 = 0x9B;
pub const OPCODE_IF: u8 = 0x9D;
pub const OPCODE_CALL: u8 = 0x9E;
pub const OPCODE_GOTO_FRAME2: u8 = 0x9F;

/// Decoded actions in stream order, terminator excluded.
pub type ActionList = Vec<DecodedAction>;

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAction {
    /// Position of the opcode byte.
    pub position: BitPosition,
    pub opcode: u8,
    /// Declared operand length; `None` below the complex threshold.
    pub length: Option<Located<u16>>,
    pub action: Action,
}

impl DecodedAction {
    pub fn is_complex(&self) -> bool {
        self.opcode >= COMPLEX_OPCODE_THRESHOLD
    }
}

bitflags! {
    /// `DefineFunction2` register preload/suppress flags, in encoding order.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct FunctionFlags: u16 {
        const PRELOAD_PARENT = 1 << 15;
        const PRELOAD_ROOT = 1 << 14;
        const SUPPRESS_SUPER = 1 << 13;
        const PRELOAD_SUPER = 1 << 12;
        const SUPPRESS_ARGUMENTS = 1 << 11;
        const PRELOAD_ARGUMENTS = 1 << 10;
        const SUPPRESS_THIS = 1 << 9;
        const PRELOAD_THIS = 1 << 8;
        const PRELOAD_GLOBAL = 1 << 0;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefineFunction {
    pub name: Located<SwfString>,
    pub params: Vec<Located<SwfString>>,
    pub code_size: Located<u16>,
    pub body: ActionList,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegisterParam {
    /// 0 means the parameter is not bound to a register.
    pub register: Located<u8>,
    pub name: Located<SwfString>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefineFunction2 {
    pub name: Located<SwfString>,
    pub register_count: Located<u8>,
    pub flags: Located<FunctionFlags>,
    pub params: Vec<RegisterParam>,
    pub code_size: Located<u16>,
    pub body: ActionList,
}

#[derive(Debug, Clone, PartialEq)]
pub struct With {
    pub size: Located<u16>,
    pub body: ActionList,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatchTarget {
    Variable(Located<SwfString>),
    Register(Located<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Try {
    pub catch_in_register: Located<bool>,
    pub has_finally: Located<bool>,
    pub has_catch: Located<bool>,
    pub try_size: Located<u16>,
    pub catch_size: Located<u16>,
    pub finally_size: Located<u16>,
    pub catch_target: CatchTarget,
    pub try_body: ActionList,
    pub catch_body: ActionList,
    pub finally_body: ActionList,
}

/// The action catalog. Operand-less opcodes are unit variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // SWF 3
    NextFrame,
    PreviousFrame,
    Play,
    Stop,
    ToggleQuality,
    StopSounds,
    GotoFrame {
        frame: Located<u16>,
    },
    GetUrl {
        url: Located<SwfString>,
        target: Located<SwfString>,
    },
    WaitForFrame {
        frame: Located<u16>,
        skip_count: Located<u8>,
    },
    SetTarget {
        target: Located<SwfString>,
    },
    GoToLabel {
        label: Located<SwfString>,
    },

    // SWF 4
    Push(Vec<PushedValue>),
    Pop,
    Add,
    Subtract,
    Multiply,
    Divide,
    Equals,
    Less,
    And,
    Or,
    Not,
    StringEquals,
    StringLength,
    StringAdd,
    StringExtract,
    StringLess,
    MbStringLength,
    MbStringExtract,
    ToInteger,
    CharToAscii,
    AsciiToChar,
    MbCharToAscii,
    MbAsciiToChar,
    Jump {
        offset: Located<i16>,
    },
    If {
        offset: Located<i16>,
    },
    Call,
    GetVariable,
    SetVariable,
    GetUrl2 {
        send_vars_method: Located<u32>,
        load_target: Located<bool>,
        load_variables: Located<bool>,
    },
    GotoFrame2 {
        scene_bias_flag: Located<bool>,
        play: Located<bool>,
        scene_bias: Option<Located<u16>>,
    },
    SetTarget2,
    GetProperty,
    SetProperty,
    CloneSprite,
    RemoveSprite,
    StartDrag,
    EndDrag,
    WaitForFrame2 {
        skip_count: Located<u8>,
    },
    Trace,
    GetTime,
    RandomNumber,

    // SWF 5
    CallFunction,
    CallMethod,
    ConstantPool {
        constants: Vec<Located<SwfString>>,
    },
    DefineFunction(DefineFunction),
    DefineLocal,
    DefineLocal2,
    Delete,
    Delete2,
    Enumerate,
    Equals2,
    GetMember,
    InitArray,
    InitObject,
    NewMethod,
    NewObject,
    SetMember,
    TargetPath,
    With(With),
    ToNumber,
    ToString,
    TypeOf,
    Add2,
    Less2,
    Modulo,
    BitAnd,
    BitLShift,
    BitOr,
    BitRShift,
    BitURShift,
    BitXor,
    Decrement,
    Increment,
    PushDuplicate,
    Return,
    StackSwap,
    StoreRegister {
        register: Located<u8>,
    },

    // SWF 6
    InstanceOf,
    Enumerate2,
    StrictEquals,
    Greater,
    StringGreater,

    // SWF 7
    DefineFunction2(DefineFunction2),
    Extends,
    CastOp,
    ImplementsOp,
    Try(Try),
    Throw,

    /// Unrecognized opcode. Simple opcodes capture no bytes; complex ones
    /// capture their whole operand.
    Unknown {
        data: Located<Vec<u8>>,
    },
}

impl Action {
    /// Operand-less action for a simple opcode, or `None` if the opcode is not
    /// in the catalog.
    pub fn from_simple_opcode(opcode: u8) -> Option<Action> {
        let action = match opcode {
            0x04 => Action::NextFrame,
            0x05 => Action::PreviousFrame,
            0x06 => Action::Play,
            0x07 => Action::Stop,
            0x08 => Action::ToggleQuality,
            0x09 => Action::StopSounds,
            0x0A => Action::Add,
            0x0B => Action::Subtract,
            0x0C => Action::Multiply,
            0x0D => Action::Divide,
            0x0E => Action::Equals,
            0x0F => Action::Less,
            0x10 => Action::And,
            0x11 => Action::Or,
            0x12 => Action::Not,
            0x13 => Action::StringEquals,
            0x14 => Action::StringLength,
            0x15 => Action::StringExtract,
            0x17 => Action::Pop,
            0x18 => Action::ToInteger,
            0x1C => Action::GetVariable,
            0x1D => Action::SetVariable,
            0x20 => Action::SetTarget2,
            0x21 => Action::StringAdd,
            0x22 => Action::GetProperty,
            0x23 => Action::SetProperty,
            0x24 => Action::CloneSprite,
            0x25 => Action::RemoveSprite,
            0x26 => Action::Trace,
            0x27 => Action::StartDrag,
            0x28 => Action::EndDrag,
            0x29 => Action::StringLess,
            0x2A => Action::Throw,
            0x2B => Action::CastOp,
            0x2C => Action::ImplementsOp,
            0x30 => Action::RandomNumber,
            0x31 => Action::MbStringLength,
            0x32 => Action::CharToAscii,
            0x33 => Action::AsciiToChar,
            0x34 => Action::GetTime,
            0x35 => Action::MbStringExtract,
            0x36 => Action::MbCharToAscii,
            0x37 => Action::MbAsciiToChar,
            0x3A => Action::Delete,
            0x3B => Action::Delete2,
            0x3C => Action::DefineLocal,
            0x3D => Action::CallFunction,
            0x3E => Action::Return,
            0x3F => Action::Modulo,
            0x40 => Action::NewObject,
            0x41 => Action::DefineLocal2,
            0x42 => Action::InitArray,
            0x43 => Action::InitObject,
            0x44 => Action::TypeOf,
            0x45 => Action::TargetPath,
            0x46 => Action::Enumerate,
            0x47 => Action::Add2,
            0x48 => Action::Less2,
            0x49 => Action::Equals2,
            0x4A => Action::ToNumber,
            0x4B => Action::ToString,
            0x4C => Action::PushDuplicate,
            0x4D => Action::StackSwap,
            0x4E => Action::GetMember,
            0x4F => Action::SetMember,
            0x50 => Action::Increment,
            0x51 => Action::Decrement,
            0x52 => Action::CallMethod,
            0x53 => Action::NewMethod,
            0x54 => Action::InstanceOf,
            0x55 => Action::Enumerate2,
            0x60 => Action::BitAnd,
            0x61 => Action::BitOr,
            0x62 => Action::BitXor,
            0x63 => Action::BitLShift,
            0x64 => Action::BitRShift,
            0x65 => Action::BitURShift,
            0x66 => Action::StrictEquals,
            0x67 => Action::Greater,
            0x68 => Action::StringGreater,
            0x69 => Action::Extends,
            _ => return None,
        };
        Some(action)
    }

    /// Nested action lists carried by this action, in encoding order.
    pub fn bodies(&self) -> Vec<&ActionList> {
        match self {
            Action::DefineFunction(f) => vec![&f.body],
            Action::DefineFunction2(f) => vec![&f.body],
            Action::With(w) => vec![&w.body],
            Action::Try(t) => vec![&t.try_body, &t.catch_body, &t.finally_body],
            _ => Vec::new(),
        }
    }
}
