use crate::bits::{BitCursor, Located};
use crate::error::Result;
use crate::primitives::{check_count, read_flag, read_ub, read_ui16, read_ui32, read_ui8};

pub const SOUND_FORMAT_MP3: u32 = 2;

/// Packed format/rate/size/type nibble used by sound definitions and stream
/// heads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundFormat {
    pub format: Located<u32>,
    pub rate: Located<u32>,
    /// `true` for 16-bit samples.
    pub is_16_bit: Located<bool>,
    pub is_stereo: Located<bool>,
}

pub fn decode_sound_format(c: &mut BitCursor<'_>) -> Result<SoundFormat> {
    Ok(SoundFormat {
        format: read_ub(c, 4)?,
        rate: read_ub(c, 2)?,
        is_16_bit: read_flag(c)?,
        is_stereo: read_flag(c)?,
    })
}

/// Rate/size/type bits without the format nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackFormat {
    pub rate: Located<u32>,
    pub is_16_bit: Located<bool>,
    pub is_stereo: Located<bool>,
}

pub fn decode_playback_format(c: &mut BitCursor<'_>) -> Result<PlaybackFormat> {
    Ok(PlaybackFormat {
        rate: read_ub(c, 2)?,
        is_16_bit: read_flag(c)?,
        is_stereo: read_flag(c)?,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopePoint {
    pub pos44: Located<u32>,
    pub left_level: Located<u16>,
    pub right_level: Located<u16>,
}

/// `SOUNDINFO`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundInfo {
    pub sync_stop: Located<bool>,
    pub sync_no_multiple: Located<bool>,
    pub in_point: Option<Located<u32>>,
    pub out_point: Option<Located<u32>>,
    pub loop_count: Option<Located<u16>>,
    /// Present when the envelope flag is set, possibly empty.
    pub envelope: Option<Vec<EnvelopePoint>>,
}

pub fn decode_sound_info(c: &mut BitCursor<'_>) -> Result<SoundInfo> {
    let _reserved = c.read_bits(2)?;
    let sync_stop = read_flag(c)?;
    let sync_no_multiple = read_flag(c)?;
    let has_envelope = c.read_flag()?;
    let has_loops = c.read_flag()?;
    let has_out_point = c.read_flag()?;
    let has_in_point = c.read_flag()?;

    let in_point = has_in_point.then(|| read_ui32(c)).transpose()?;
    let out_point = has_out_point.then(|| read_ui32(c)).transpose()?;
    let loop_count = has_loops.then(|| read_ui16(c)).transpose()?;
    let envelope = if has_envelope {
        let count = usize::from(read_ui8(c)?.value);
        check_count(c, count, 8, "envelope point count")?;
        let mut points = Vec::with_capacity(count);
        for _ in 0..count {
            points.push(EnvelopePoint {
                pos44: read_ui32(c)?,
                left_level: read_ui16(c)?,
                right_level: read_ui16(c)?,
            });
        }
        Some(points)
    } else {
        None
    };

    Ok(SoundInfo {
        sync_stop,
        sync_no_multiple,
        in_point,
        out_point,
        loop_count,
        envelope,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sound_info_with_loops_and_envelope() {
        let mut bytes = vec![0b0010_1100];
        bytes.extend_from_slice(&3u16.to_le_bytes());
        bytes.push(1);
        bytes.extend_from_slice(&44u32.to_le_bytes());
        bytes.extend_from_slice(&[0x00, 0x80, 0xFF, 0x7F]);
        let mut c = BitCursor::new(&bytes);
        let info = decode_sound_info(&mut c).unwrap();
        assert!(c.is_empty());
        assert!(info.sync_stop.value);
        assert_eq!(info.loop_count.map(|l| l.value), Some(3));
        assert!(info.in_point.is_none());
        let env = info.envelope.unwrap();
        assert_eq!(env[0].pos44.value, 44);
        assert_eq!(env[0].left_level.value, 0x8000);
        assert_eq!(env[0].right_level.value, 0x7FFF);
    }

    #[test]
    fn format_nibbles() {
        let mut c = BitCursor::new(&[0b0010_1111]);
        let f = decode_sound_format(&mut c).unwrap();
        assert_eq!(f.format.value, SOUND_FORMAT_MP3);
        assert_eq!(f.rate.value, 3);
        assert!(f.is_16_bit.value && f.is_stereo.value);
    }
}
