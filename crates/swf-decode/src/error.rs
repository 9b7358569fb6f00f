use core::fmt;

use thiserror::Error;

use crate::bits::BitPosition;
use crate::tags::{Tag, TagCode};

pub type Result<T> = std::result::Result<T, DecodeError>;

/// The kind of self-delimited record a [`DecodeError::LengthViolation`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Tag,
    Action,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Tag => f.write_str("tag"),
            RecordKind::Action => f.write_str("action"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("read of {bits} bit(s) at {position} runs past end of input at byte {end:#x}")]
    OutOfBounds {
        position: BitPosition,
        bits: u64,
        end: usize,
    },

    #[error("byte-aligned read at {position} is not on a byte boundary")]
    Alignment { position: BitPosition },

    #[error("{record} {code:#04x} at {position} declares {declared} byte(s) but its body needs more")]
    LengthViolation {
        record: RecordKind,
        code: u16,
        position: BitPosition,
        declared: u32,
    },

    #[error("nesting depth {depth} at {position} exceeds limit {limit}")]
    DepthExceeded {
        position: BitPosition,
        depth: usize,
        limit: usize,
    },

    #[error("invalid movie signature {0:02x?}")]
    InvalidSignature([u8; 3]),

    #[error("compressed movie (signature '{signature}') must be inflated before decoding")]
    UnsupportedCompression { signature: char },

    #[error("invalid {field} {value} at {position}")]
    InvalidValue {
        field: &'static str,
        value: u32,
        position: BitPosition,
    },

    #[error("record budget of {limit} exhausted at {position}")]
    BudgetExceeded { position: BitPosition, limit: usize },
}

impl DecodeError {
    /// Byte offset the failure is attributed to.
    ///
    /// For `OutOfBounds` this is the first byte that was needed but not
    /// available, not the start of the failed read.
    pub fn offset(&self) -> usize {
        match self {
            DecodeError::OutOfBounds { end, .. } => *end,
            DecodeError::Alignment { position }
            | DecodeError::LengthViolation { position, .. }
            | DecodeError::DepthExceeded { position, .. }
            | DecodeError::InvalidValue { position, .. }
            | DecodeError::BudgetExceeded { position, .. } => position.byte,
            DecodeError::InvalidSignature(_) | DecodeError::UnsupportedCompression { .. } => 0,
        }
    }
}

/// The top-level tag that was being decoded when a [`ParseError`] occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagContext {
    pub code: u16,
    pub position: BitPosition,
}

/// Failure of a whole-movie parse.
///
/// `decoded` holds every top-level tag that decoded successfully before the
/// failing one; those nodes are complete and may be reported alongside the
/// error.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub error: DecodeError,
    pub tag: Option<TagContext>,
    pub decoded: Vec<Tag>,
}

impl ParseError {
    pub(crate) fn header(error: DecodeError) -> Self {
        Self {
            error,
            tag: None,
            decoded: Vec::new(),
        }
    }

    pub fn offset(&self) -> usize {
        self.error.offset()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag {
            Some(ctx) => write!(
                f,
                "failed to decode {} tag ({}) at {}: {}",
                TagCode::from_raw(ctx.code).name(),
                ctx.code,
                ctx.position,
                self.error
            ),
            None => write!(f, "failed to decode movie header: {}", self.error),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
