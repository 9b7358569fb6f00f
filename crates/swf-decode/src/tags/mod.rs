//! Tag catalog and per-tag body decoding.
//!
//! Every tag body is decoded inside a cursor bounded by the header's declared
//! length. A grammar that finishes early has its trailing bytes skipped; one
//! that needs more than the declared length fails with
//! [`DecodeError::LengthViolation`]. Codes outside the catalog are kept as
//! [`OpaqueTag`]s holding the raw body.

mod bitmap;
mod button;
mod control;
mod display;
mod script;
mod shape;
mod sound;
mod sprite;
mod text;
mod video;

pub use bitmap::{
    DefineBits, DefineBitsJpeg, DefineBitsLossless, JpegTables, BITMAP_FORMAT_COLORMAPPED,
};
pub use button::{
    ButtonSound, DefineButton, DefineButton2, DefineButtonCxform, DefineButtonSound,
};
pub use control::{
    AssetRef, DefineBinaryData, DefineScalingGrid, DefineSceneAndFrameLabelData, ExportAssets,
    FileAttributeFlags, FileAttributes, FrameLabel, FrameLabelEntry, ImportAssets, Metadata,
    Password, Scene, ScriptLimits, SetBackgroundColor, SetTabIndex, SymbolClass,
};
pub use display::{PlaceFlags, PlaceObject, PlaceObject2, RemoveObject, RemoveObject2};
pub use script::{DoAbc, DoAction, DoInitAction};
pub use shape::{DefineMorphShape, DefineShape, Shape4Flags};
pub use sound::{DefineSound, SoundStreamBlock, SoundStreamHead, StartSound, StartSound2};
pub use sprite::DefineSprite;
pub use text::{
    CsmTextSettings, DefineEditText, DefineFont, DefineFont2, DefineFont4, DefineFontAlignZones,
    DefineFontInfo, DefineFontName, DefineText, EditTextFlags, EditTextLayout, FontFlags,
    FontInfoFlags, FontLayout,
};
pub use video::{DefineVideoStream, VideoFrame};

use tracing::{debug, trace};

use crate::bits::{BitCursor, BitPosition, Located};
use crate::context::DecodeContext;
use crate::error::{DecodeError, RecordKind, Result};
use crate::header::{decode_record_header, RecordHeader};

macro_rules! tag_codes {
    ($($variant:ident = $code:literal,)*) => {
        /// Numeric tag codes known to the decoder. Variant names follow the
        /// format's own tag names.
        #[allow(clippy::upper_case_acronyms)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum TagCode {
            $($variant,)*
            Unknown(u16),
        }

        impl TagCode {
            pub fn from_raw(code: u16) -> Self {
                match code {
                    $($code => Self::$variant,)*
                    other => Self::Unknown(other),
                }
            }

            pub fn raw(&self) -> u16 {
                match self {
                    $(Self::$variant => $code,)*
                    Self::Unknown(code) => *code,
                }
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)*
                    Self::Unknown(_) => "Unknown",
                }
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, Self::Unknown(_))
            }
        }
    };
}

tag_codes! {
    End = 0,
    ShowFrame = 1,
    DefineShape = 2,
    PlaceObject = 4,
    RemoveObject = 5,
    DefineBits = 6,
    DefineButton = 7,
    JPEGTables = 8,
    SetBackgroundColor = 9,
    DefineFont = 10,
    DefineText = 11,
    DoAction = 12,
    DefineFontInfo = 13,
    DefineSound = 14,
    StartSound = 15,
    DefineButtonSound = 17,
    SoundStreamHead = 18,
    SoundStreamBlock = 19,
    DefineBitsLossless = 20,
    DefineBitsJPEG2 = 21,
    DefineShape2 = 22,
    DefineButtonCxform = 23,
    Protect = 24,
    PlaceObject2 = 26,
    RemoveObject2 = 28,
    DefineShape3 = 32,
    DefineText2 = 33,
    DefineButton2 = 34,
    DefineBitsJPEG3 = 35,
    DefineBitsLossless2 = 36,
    DefineEditText = 37,
    DefineSprite = 39,
    FrameLabel = 43,
    SoundStreamHead2 = 45,
    DefineMorphShape = 46,
    DefineFont2 = 48,
    ExportAssets = 56,
    ImportAssets = 57,
    EnableDebugger = 58,
    DoInitAction = 59,
    DefineVideoStream = 60,
    VideoFrame = 61,
    DefineFontInfo2 = 62,
    EnableDebugger2 = 64,
    ScriptLimits = 65,
    SetTabIndex = 66,
    FileAttributes = 69,
    PlaceObject3 = 70,
    ImportAssets2 = 71,
    DefineFontAlignZones = 73,
    CSMTextSettings = 74,
    DefineFont3 = 75,
    SymbolClass = 76,
    Metadata = 77,
    DefineScalingGrid = 78,
    DoABC = 82,
    DefineShape4 = 83,
    DefineMorphShape2 = 84,
    DefineSceneAndFrameLabelData = 86,
    DefineBinaryData = 87,
    DefineFontName = 88,
    StartSound2 = 89,
    DefineBitsJPEG4 = 90,
    DefineFont4 = 91,
}

/// Body of a tag whose code is not in the catalog, captured verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueTag {
    pub data: Located<Vec<u8>>,
}

/// Decoded body of one tag.
///
/// Tag families that share a grammar across revisions (`DefineShape`..
/// `DefineShape4`, `PlaceObject2`/`PlaceObject3`, ...) share a variant; the
/// revision is recorded in the payload and in the tag's header.
#[derive(Debug, Clone, PartialEq)]
pub enum TagBody {
    End,
    ShowFrame,
    DefineShape(DefineShape),
    DefineMorphShape(DefineMorphShape),
    PlaceObject(PlaceObject),
    PlaceObject2(PlaceObject2),
    RemoveObject(RemoveObject),
    RemoveObject2(RemoveObject2),
    DefineBits(DefineBits),
    JpegTables(JpegTables),
    DefineBitsJpeg(DefineBitsJpeg),
    DefineBitsLossless(DefineBitsLossless),
    DefineButton(DefineButton),
    DefineButton2(DefineButton2),
    DefineButtonCxform(DefineButtonCxform),
    DefineButtonSound(DefineButtonSound),
    SetBackgroundColor(SetBackgroundColor),
    DefineFont(DefineFont),
    DefineFont2(DefineFont2),
    DefineFont4(DefineFont4),
    DefineFontInfo(DefineFontInfo),
    DefineFontAlignZones(DefineFontAlignZones),
    DefineFontName(DefineFontName),
    CsmTextSettings(CsmTextSettings),
    DefineText(DefineText),
    DefineEditText(DefineEditText),
    DoAction(DoAction),
    DoInitAction(DoInitAction),
    DoAbc(DoAbc),
    DefineSound(DefineSound),
    StartSound(StartSound),
    StartSound2(StartSound2),
    SoundStreamHead(SoundStreamHead),
    SoundStreamBlock(SoundStreamBlock),
    DefineSprite(DefineSprite),
    FrameLabel(FrameLabel),
    Protect(Password),
    EnableDebugger(Password),
    ScriptLimits(ScriptLimits),
    SetTabIndex(SetTabIndex),
    FileAttributes(FileAttributes),
    ExportAssets(ExportAssets),
    ImportAssets(ImportAssets),
    SymbolClass(SymbolClass),
    Metadata(Metadata),
    DefineScalingGrid(DefineScalingGrid),
    DefineSceneAndFrameLabelData(DefineSceneAndFrameLabelData),
    DefineBinaryData(DefineBinaryData),
    DefineVideoStream(DefineVideoStream),
    VideoFrame(VideoFrame),
    Unknown(OpaqueTag),
}

/// One decoded tag: its header and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub header: RecordHeader,
    pub body: TagBody,
}

impl Tag {
    pub fn code(&self) -> TagCode {
        TagCode::from_raw(self.header.tag_code)
    }

    /// Position of the tag's record header.
    pub fn position(&self) -> BitPosition {
        self.header.position
    }

    pub fn is_end(&self) -> bool {
        matches!(self.body, TagBody::End)
    }
}

/// Decodes the record header at `c` and then the tag body it describes.
pub fn decode_tag(c: &mut BitCursor<'_>, ctx: &mut DecodeContext) -> Result<Tag> {
    let header = decode_record_header(c)?;
    decode_tag_body(header, c, ctx)
}

/// Decodes the body described by `header`, starting at `c`, and moves `c`
/// exactly `header.length` bytes forward.
///
/// A body that extends past the end of `c` fails with `OutOfBounds` pointing
/// at the first byte that is missing.
pub fn decode_tag_body(
    header: RecordHeader,
    c: &mut BitCursor<'_>,
    ctx: &mut DecodeContext,
) -> Result<Tag> {
    ctx.count_record(header.position)?;
    let len = usize::try_from(header.length).unwrap_or(usize::MAX);
    let mut body = c.sub_cursor(len)?;
    let body_end = body.end();

    let decoded = match TagCode::from_raw(header.tag_code) {
        TagCode::DefineSprite => decode_sprite_body(header, &mut body, ctx).map(Some),
        _ => decode_known_body(header, &mut body, ctx),
    }
    .map_err(|err| match err {
        DecodeError::OutOfBounds { end, .. } if end == body_end => DecodeError::LengthViolation {
            record: RecordKind::Tag,
            code: header.tag_code,
            position: header.position,
            declared: header.length,
        },
        other => other,
    })?;

    let body = match decoded {
        Some(body_value) => {
            let trailing = body.remaining_bytes();
            if trailing > 0 {
                debug!(
                    code = header.tag_code,
                    position = %header.position,
                    trailing,
                    "skipping unread tag bytes"
                );
            }
            body_value
        }
        None => {
            debug!(
                code = header.tag_code,
                position = %header.position,
                len,
                "unknown tag captured opaquely"
            );
            TagBody::Unknown(OpaqueTag {
                data: crate::primitives::read_rest(&mut body)?,
            })
        }
    };
    c.skip_bytes(len)?;

    trace!(code = header.tag_code, position = %header.position, "decoded tag");
    Ok(Tag { header, body })
}

/// Sprites recurse back into [`decode_tag_body`], so they are dispatched here
/// instead of through [`decode_known_body`], whose frame holds every body type.
fn decode_sprite_body(
    header: RecordHeader,
    c: &mut BitCursor<'_>,
    ctx: &mut DecodeContext,
) -> Result<TagBody> {
    Ok(TagBody::DefineSprite(sprite::decode_define_sprite(c, ctx, header)?))
}

/// `Ok(None)` for codes outside the catalog.
#[inline(never)]
fn decode_known_body(
    header: RecordHeader,
    c: &mut BitCursor<'_>,
    ctx: &mut DecodeContext,
) -> Result<Option<TagBody>> {
    let body = match TagCode::from_raw(header.tag_code) {
        TagCode::End => TagBody::End,
        TagCode::ShowFrame => TagBody::ShowFrame,
        TagCode::DefineShape => TagBody::DefineShape(shape::decode_define_shape(c, 1)?),
        TagCode::DefineShape2 => TagBody::DefineShape(shape::decode_define_shape(c, 2)?),
        TagCode::DefineShape3 => TagBody::DefineShape(shape::decode_define_shape(c, 3)?),
        TagCode::DefineShape4 => TagBody::DefineShape(shape::decode_define_shape(c, 4)?),
        TagCode::DefineMorphShape => {
            TagBody::DefineMorphShape(shape::decode_define_morph_shape(c, false)?)
        }
        TagCode::DefineMorphShape2 => {
            TagBody::DefineMorphShape(shape::decode_define_morph_shape(c, true)?)
        }
        TagCode::PlaceObject => TagBody::PlaceObject(display::decode_place_object(c)?),
        TagCode::PlaceObject2 => TagBody::PlaceObject2(display::decode_place_object2(c, ctx, 2)?),
        TagCode::PlaceObject3 => TagBody::PlaceObject2(display::decode_place_object2(c, ctx, 3)?),
        TagCode::RemoveObject => TagBody::RemoveObject(display::decode_remove_object(c)?),
        TagCode::RemoveObject2 => TagBody::RemoveObject2(display::decode_remove_object2(c)?),
        TagCode::DefineBits => TagBody::DefineBits(bitmap::decode_define_bits(c)?),
        TagCode::JPEGTables => TagBody::JpegTables(bitmap::decode_jpeg_tables(c)?),
        TagCode::DefineBitsJPEG2 => TagBody::DefineBitsJpeg(bitmap::decode_define_bits_jpeg(c, 2)?),
        TagCode::DefineBitsJPEG3 => TagBody::DefineBitsJpeg(bitmap::decode_define_bits_jpeg(c, 3)?),
        TagCode::DefineBitsJPEG4 => TagBody::DefineBitsJpeg(bitmap::decode_define_bits_jpeg(c, 4)?),
        TagCode::DefineBitsLossless => {
            TagBody::DefineBitsLossless(bitmap::decode_define_bits_lossless(c, 1)?)
        }
        TagCode::DefineBitsLossless2 => {
            TagBody::DefineBitsLossless(bitmap::decode_define_bits_lossless(c, 2)?)
        }
        TagCode::DefineButton => TagBody::DefineButton(button::decode_define_button(c, ctx)?),
        TagCode::DefineButton2 => TagBody::DefineButton2(button::decode_define_button2(c, ctx)?),
        TagCode::DefineButtonCxform => {
            TagBody::DefineButtonCxform(button::decode_define_button_cxform(c)?)
        }
        TagCode::DefineButtonSound => {
            TagBody::DefineButtonSound(button::decode_define_button_sound(c)?)
        }
        TagCode::SetBackgroundColor => {
            TagBody::SetBackgroundColor(control::decode_set_background_color(c)?)
        }
        TagCode::DefineFont => TagBody::DefineFont(text::decode_define_font(c)?),
        TagCode::DefineFont2 => TagBody::DefineFont2(text::decode_define_font2(c, 2)?),
        TagCode::DefineFont3 => TagBody::DefineFont2(text::decode_define_font2(c, 3)?),
        TagCode::DefineFont4 => TagBody::DefineFont4(text::decode_define_font4(c)?),
        TagCode::DefineFontInfo => TagBody::DefineFontInfo(text::decode_define_font_info(c, 1)?),
        TagCode::DefineFontInfo2 => TagBody::DefineFontInfo(text::decode_define_font_info(c, 2)?),
        TagCode::DefineFontAlignZones => {
            TagBody::DefineFontAlignZones(text::decode_define_font_align_zones(c)?)
        }
        TagCode::DefineFontName => TagBody::DefineFontName(text::decode_define_font_name(c)?),
        TagCode::CSMTextSettings => TagBody::CsmTextSettings(text::decode_csm_text_settings(c)?),
        TagCode::DefineText => TagBody::DefineText(text::decode_define_text(c, 1)?),
        TagCode::DefineText2 => TagBody::DefineText(text::decode_define_text(c, 2)?),
        TagCode::DefineEditText => TagBody::DefineEditText(text::decode_define_edit_text(c)?),
        TagCode::DoAction => TagBody::DoAction(script::decode_do_action(c, ctx)?),
        TagCode::DoInitAction => TagBody::DoInitAction(script::decode_do_init_action(c, ctx)?),
        TagCode::DoABC => TagBody::DoAbc(script::decode_do_abc(c)?),
        TagCode::DefineSound => TagBody::DefineSound(sound::decode_define_sound(c)?),
        TagCode::StartSound => TagBody::StartSound(sound::decode_start_sound(c)?),
        TagCode::StartSound2 => TagBody::StartSound2(sound::decode_start_sound2(c)?),
        TagCode::SoundStreamHead => {
            TagBody::SoundStreamHead(sound::decode_sound_stream_head(c, 1)?)
        }
        TagCode::SoundStreamHead2 => {
            TagBody::SoundStreamHead(sound::decode_sound_stream_head(c, 2)?)
        }
        TagCode::SoundStreamBlock => {
            TagBody::SoundStreamBlock(sound::decode_sound_stream_block(c)?)
        }
        TagCode::DefineSprite => decode_sprite_body(header, c, ctx)?,
        TagCode::FrameLabel => TagBody::FrameLabel(control::decode_frame_label(c)?),
        TagCode::Protect => TagBody::Protect(control::decode_password(c, false)?),
        TagCode::EnableDebugger => TagBody::EnableDebugger(control::decode_password(c, false)?),
        TagCode::EnableDebugger2 => TagBody::EnableDebugger(control::decode_password(c, true)?),
        TagCode::ScriptLimits => TagBody::ScriptLimits(control::decode_script_limits(c)?),
        TagCode::SetTabIndex => TagBody::SetTabIndex(control::decode_set_tab_index(c)?),
        TagCode::FileAttributes => TagBody::FileAttributes(control::decode_file_attributes(c)?),
        TagCode::ExportAssets => TagBody::ExportAssets(control::decode_export_assets(c)?),
        TagCode::ImportAssets => TagBody::ImportAssets(control::decode_import_assets(c, 1)?),
        TagCode::ImportAssets2 => TagBody::ImportAssets(control::decode_import_assets(c, 2)?),
        TagCode::SymbolClass => TagBody::SymbolClass(control::decode_symbol_class(c)?),
        TagCode::Metadata => TagBody::Metadata(control::decode_metadata(c)?),
        TagCode::DefineScalingGrid => {
            TagBody::DefineScalingGrid(control::decode_define_scaling_grid(c)?)
        }
        TagCode::DefineSceneAndFrameLabelData => TagBody::DefineSceneAndFrameLabelData(
            control::decode_define_scene_and_frame_label_data(c)?,
        ),
        TagCode::DefineBinaryData => {
            TagBody::DefineBinaryData(control::decode_define_binary_data(c)?)
        }
        TagCode::DefineVideoStream => {
            TagBody::DefineVideoStream(video::decode_define_video_stream(c)?)
        }
        TagCode::VideoFrame => TagBody::VideoFrame(video::decode_video_frame(c)?),
        TagCode::Unknown(_) => return Ok(None),
    };
    Ok(Some(body))
}

/// Resolves an offset field relative to absolute byte `base`, rejecting
/// targets outside `c`.
pub(crate) fn resolve_offset(
    c: &BitCursor<'_>,
    base: usize,
    offset: Located<u32>,
    field: &'static str,
) -> Result<usize> {
    usize::try_from(offset.value)
        .ok()
        .and_then(|o| o.checked_add(base))
        .filter(|&target| target <= c.end())
        .ok_or(DecodeError::InvalidValue {
            field,
            value: offset.value,
            position: offset.position,
        })
}

/// Moves `c` forward to absolute byte `target`, which must not lie behind it.
pub(crate) fn seek_forward(c: &mut BitCursor<'_>, target: usize, field: &'static str) -> Result<()> {
    c.align();
    let here = c.position().byte;
    if target < here {
        return Err(DecodeError::InvalidValue {
            field,
            value: u32::try_from(target).unwrap_or(u32::MAX),
            position: c.position(),
        });
    }
    c.skip_bytes(target - here)
}
