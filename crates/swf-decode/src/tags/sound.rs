use crate::bits::{BitCursor, Located};
use crate::error::Result;
use crate::primitives::{read_rest, read_si16, read_string, read_ui16, read_ui32, SwfString};
use crate::structures::sound::{
    decode_playback_format, decode_sound_format, decode_sound_info, PlaybackFormat, SoundFormat,
    SoundInfo, SOUND_FORMAT_MP3,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineSound {
    pub sound_id: Located<u16>,
    pub format: SoundFormat,
    pub sample_count: Located<u32>,
    pub data: Located<Vec<u8>>,
}

pub(super) fn decode_define_sound(c: &mut BitCursor<'_>) -> Result<DefineSound> {
    Ok(DefineSound {
        sound_id: read_ui16(c)?,
        format: decode_sound_format(c)?,
        sample_count: read_ui32(c)?,
        data: read_rest(c)?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartSound {
    pub sound_id: Located<u16>,
    pub info: SoundInfo,
}

pub(super) fn decode_start_sound(c: &mut BitCursor<'_>) -> Result<StartSound> {
    Ok(StartSound {
        sound_id: read_ui16(c)?,
        info: decode_sound_info(c)?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartSound2 {
    pub class_name: Located<SwfString>,
    pub info: SoundInfo,
}

pub(super) fn decode_start_sound2(c: &mut BitCursor<'_>) -> Result<StartSound2> {
    Ok(StartSound2 {
        class_name: read_string(c)?,
        info: decode_sound_info(c)?,
    })
}

/// `SoundStreamHead` or `SoundStreamHead2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundStreamHead {
    pub version: u8,
    pub playback: PlaybackFormat,
    pub stream: SoundFormat,
    pub sample_count: Located<u16>,
    /// MP3 streams only, and only when the body carries it.
    pub latency_seek: Option<Located<i16>>,
}

pub(super) fn decode_sound_stream_head(
    c: &mut BitCursor<'_>,
    version: u8,
) -> Result<SoundStreamHead> {
    let _reserved = c.read_bits(4)?;
    let playback = decode_playback_format(c)?;
    let stream = decode_sound_format(c)?;
    let sample_count = read_ui16(c)?;
    let latency_seek = if stream.format.value == SOUND_FORMAT_MP3 && !c.is_empty() {
        Some(read_si16(c)?)
    } else {
        None
    };
    Ok(SoundStreamHead {
        version,
        playback,
        stream,
        sample_count,
        latency_seek,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundStreamBlock {
    pub data: Located<Vec<u8>>,
}

pub(super) fn decode_sound_stream_block(c: &mut BitCursor<'_>) -> Result<SoundStreamBlock> {
    Ok(SoundStreamBlock {
        data: read_rest(c)?,
    })
}
