#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use swf_decode::{decode_tag, BitCursor, DecodeContext, DecodeOptions};

const MAX_INPUT_SIZE_BYTES: usize = 256 * 1024;

#[derive(Debug, Arbitrary)]
struct Limits {
    version: u8,
    max_depth: u8,
    max_records: u16,
}

fuzz_target!(|data: &[u8]| {
    if data.len() > MAX_INPUT_SIZE_BYTES {
        return;
    }
    let mut u = Unstructured::new(data);
    let Ok(limits) = Limits::arbitrary(&mut u) else {
        return;
    };
    let Ok(tags) = u.bytes(u.len()) else {
        return;
    };

    let options = DecodeOptions {
        max_depth: usize::from(limits.max_depth),
        max_records: usize::from(limits.max_records),
        require_end_tag: false,
    };
    let mut ctx = DecodeContext::new(limits.version, options);
    let mut c = BitCursor::new(tags);
    while !c.is_empty() {
        let before = c.position();
        let Ok(tag) = decode_tag(&mut c, &mut ctx) else {
            break;
        };
        // Every decoded tag consumes exactly its header and declared body.
        assert_eq!(before, tag.position());
        assert_eq!(c.position().byte, tag.header.body_end());
        assert!(ctx.depth() == 0);
    }
});
