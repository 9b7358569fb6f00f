use crate::bits::{BitCursor, Located};
use crate::error::Result;
use crate::primitives::{read_flag, read_rest, read_ub, read_ui16, read_ui8};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefineVideoStream {
    pub character_id: Located<u16>,
    pub frame_count: Located<u16>,
    pub width: Located<u16>,
    pub height: Located<u16>,
    pub deblocking: Located<u32>,
    pub smoothing: Located<bool>,
    pub codec_id: Located<u8>,
}

pub(super) fn decode_define_video_stream(c: &mut BitCursor<'_>) -> Result<DefineVideoStream> {
    let character_id = read_ui16(c)?;
    let frame_count = read_ui16(c)?;
    let width = read_ui16(c)?;
    let height = read_ui16(c)?;
    let _reserved = c.read_bits(4)?;
    let deblocking = read_ub(c, 3)?;
    let smoothing = read_flag(c)?;
    Ok(DefineVideoStream {
        character_id,
        frame_count,
        width,
        height,
        deblocking,
        smoothing,
        codec_id: read_ui8(c)?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    pub stream_id: Located<u16>,
    pub frame_num: Located<u16>,
    pub data: Located<Vec<u8>>,
}

pub(super) fn decode_video_frame(c: &mut BitCursor<'_>) -> Result<VideoFrame> {
    Ok(VideoFrame {
        stream_id: read_ui16(c)?,
        frame_num: read_ui16(c)?,
        data: read_rest(c)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_stream_bit_fields() {
        let bytes = [
            0x01, 0x00, 0x0A, 0x00, 0x40, 0x01, 0xF0, 0x00, 0b0000_0101, 0x02,
        ];
        let mut c = BitCursor::new(&bytes);
        let stream = decode_define_video_stream(&mut c).unwrap();
        assert!(c.is_empty());
        assert_eq!(stream.frame_count.value, 10);
        assert_eq!((stream.width.value, stream.height.value), (320, 240));
        assert_eq!(stream.deblocking.value, 2);
        assert!(stream.smoothing.value);
        assert_eq!(stream.codec_id.value, 2);
    }
}
