//! A safe decoder for uncompressed Adobe Flash movies (`SWF`, signature `FWS`).
//!
//! The decoder turns a byte buffer into an owned tree: a [`MovieHeader`]
//! followed by every top-level [`Tag`], down to individual shape records and
//! ActionScript 2 actions. Every decoded field carries the [`BitPosition`] it
//! was read from, so tooling can map any node back to the exact bit in the
//! input.
//!
//! Inputs are treated as **untrusted**:
//!
//! - reads are bounds-checked and never panic;
//! - each tag body is decoded inside its declared length, and trailing bytes
//!   are skipped rather than reinterpreted;
//! - unknown tag codes and action opcodes are kept verbatim instead of failing;
//! - recursion (sprites, function bodies, clip actions) and the total number
//!   of records are bounded by [`DecodeOptions`].
//!
//! Compressed movies (`CWS`, `ZWS`) are rejected with
//! [`DecodeError::UnsupportedCompression`]; inflate them first.

#![forbid(unsafe_code)]

pub mod actions;
pub mod bits;
mod context;
mod error;
pub mod header;
mod movie;
pub mod primitives;
pub mod structures;
pub mod tags;

/// Builders for hand-assembled movies, tags and action streams.
///
/// Only available to this crate's own tests, or with the `test-utils`
/// feature. Not part of the stable decoding API.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::actions::{
    decode_action_block, decode_action_stream, Action, ActionList, ActionStream, DecodedAction,
    PushValue, PushedValue,
};
pub use crate::bits::{BitCursor, BitPosition, Located};
pub use crate::context::{DecodeContext, DecodeOptions, DEFAULT_MAX_DEPTH, DEFAULT_MAX_RECORDS};
pub use crate::error::{DecodeError, ParseError, RecordKind, Result, TagContext};
pub use crate::header::{
    decode_movie_header, decode_record_header, peek_record_header, Compression, MovieHeader,
    RecordHeader,
};
pub use crate::movie::{Movie, TagStream};
pub use crate::primitives::SwfString;
pub use crate::tags::{decode_tag, decode_tag_body, OpaqueTag, Tag, TagBody, TagCode};
