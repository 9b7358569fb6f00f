#![no_main]

use libfuzzer_sys::fuzz_target;
use swf_decode::{
    decode_action_block, decode_action_stream, BitCursor, DecodeContext, DecodeOptions,
};

const MAX_INPUT_SIZE_BYTES: usize = 64 * 1024;

fuzz_target!(|data: &[u8]| {
    if data.len() > MAX_INPUT_SIZE_BYTES {
        return;
    }

    let mut ctx = DecodeContext::new(10, DecodeOptions::default());
    let mut c = BitCursor::new(data);
    if decode_action_stream(&mut c, &mut ctx).is_ok() {
        assert!(c.position().byte <= data.len());
    }

    let mut ctx = DecodeContext::new(10, DecodeOptions::default());
    let mut c = BitCursor::new(data);
    if decode_action_block(&mut c, &mut ctx).is_ok() {
        assert!(c.position().byte <= data.len());
        assert_eq!(ctx.depth(), 0);
    }
});
