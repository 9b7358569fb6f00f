//! Builders for hand-assembled movies, used by tests and benches.

use crate::header::SHORT_LENGTH_ESCAPE;

/// 550x400 stage in twips: `Nbits = 15`, then `0, 11000, 0, 8000`.
pub const STAGE_RECT: [u8; 9] = [0x78, 0x00, 0x05, 0x5F, 0x00, 0x00, 0x0F, 0xA0, 0x00];

/// MSB-first bit packer mirroring [`crate::bits::BitCursor`].
#[derive(Debug, Default)]
pub struct BitWriter {
    out: Vec<u8>,
    bit: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the low `n` bits of `value`, most significant first.
    pub fn write_bits(&mut self, value: u32, n: u32) {
        for i in (0..n).rev() {
            if self.bit == 0 {
                self.out.push(0);
            }
            let bit = ((value >> i) & 1) as u8;
            if let Some(last) = self.out.last_mut() {
                *last |= bit << (7 - self.bit);
            }
            self.bit = (self.bit + 1) % 8;
        }
    }

    /// Two's-complement form of `value` in `n` bits.
    pub fn write_signed_bits(&mut self, value: i32, n: u32) {
        self.write_bits(value as u32, n);
    }

    pub fn align(&mut self) {
        self.bit = 0;
    }

    /// Aligns, then appends whole bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.align();
        self.out.extend_from_slice(bytes);
    }

    pub fn finish(self) -> Vec<u8> {
        self.out
    }
}

/// Encodes a tag, using the short header form whenever the body allows it.
pub fn tag(code: u16, body: &[u8]) -> Vec<u8> {
    if body.len() < usize::from(SHORT_LENGTH_ESCAPE) {
        let word = (code << 6) | body.len() as u16;
        let mut out = word.to_le_bytes().to_vec();
        out.extend_from_slice(body);
        out
    } else {
        long_tag(code, body)
    }
}

/// Encodes a tag with the escaped 32-bit length field, whatever its size.
pub fn long_tag(code: u16, body: &[u8]) -> Vec<u8> {
    let word = (code << 6) | SHORT_LENGTH_ESCAPE;
    let len = u32::try_from(body.len()).expect("tag body does not fit in u32");
    let mut out = word.to_le_bytes().to_vec();
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(body);
    out
}

/// Builds an uncompressed movie with a 550x400 stage at 24 fps and one frame,
/// followed by the already-encoded `tags`.
///
/// The declared file length matches the returned buffer.
pub fn movie(version: u8, tags: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"FWS");
    out.push(version);
    out.extend_from_slice(&0u32.to_le_bytes()); // file length placeholder
    out.extend_from_slice(&STAGE_RECT);
    out.extend_from_slice(&[0x00, 0x18]); // 24.0 fps
    out.extend_from_slice(&1u16.to_le_bytes());
    for t in tags {
        out.extend_from_slice(t);
    }

    let file_length = u32::try_from(out.len()).expect("movie does not fit in u32");
    out[4..8].copy_from_slice(&file_length.to_le_bytes());
    out
}

/// Encodes one action record: bare opcode below `0x80`, otherwise opcode,
/// operand length and operands.
pub fn action(opcode: u8, operands: &[u8]) -> Vec<u8> {
    if opcode < 0x80 {
        assert!(operands.is_empty(), "simple action {opcode:#04x} takes no operands");
        return vec![opcode];
    }
    let len = u16::try_from(operands.len()).expect("action operands do not fit in u16");
    let mut out = vec![opcode];
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(operands);
    out
}

/// Concatenates `actions` and appends the `End` opcode.
pub fn action_stream(actions: &[Vec<u8>]) -> Vec<u8> {
    let mut out = actions.concat();
    out.push(0x00);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Action;
    use crate::bits::BitCursor;
    use crate::movie::Movie;
    use crate::tags::TagBody;

    #[test]
    fn bit_writer_matches_cursor() {
        let mut w = BitWriter::new();
        w.write_bits(0b101, 3);
        w.write_signed_bits(-3, 5);
        w.write_bits(0x1FF, 9);
        let bytes = w.finish();
        assert_eq!(bytes.len(), 3);

        let mut c = BitCursor::new(&bytes);
        assert_eq!(c.read_bits(3).unwrap(), 0b101);
        assert_eq!(c.read_signed_bits(5).unwrap(), -3);
        assert_eq!(c.read_bits(9).unwrap(), 0x1FF);
    }

    #[test]
    fn built_movie_parses() {
        let do_action = action_stream(&[action(0x07, &[])]);
        let bytes = movie(
            6,
            &[tag(12, &do_action), long_tag(1, &[]), tag(0, &[])],
        );
        let parsed = Movie::parse(&bytes).unwrap();
        assert_eq!(parsed.header.file_length.value as usize, bytes.len());
        assert_eq!(parsed.header.frame_rate.value.to_f32(), 24.0);
        assert_eq!(parsed.tags.len(), 3);
        assert!(parsed.tags[1].header.long_form);

        let TagBody::DoAction(ref body) = parsed.tags[0].body else {
            panic!("expected DoAction");
        };
        assert_eq!(body.actions[0].action, Action::Stop);
    }
}
