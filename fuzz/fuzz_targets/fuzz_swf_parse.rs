#![no_main]

use libfuzzer_sys::fuzz_target;
use swf_decode::{DecodeOptions, Movie};

/// Max fuzz input size to keep per-case runtime predictable.
const MAX_INPUT_SIZE_BYTES: usize = 1024 * 1024; // 1 MiB

fuzz_target!(|data: &[u8]| {
    if data.len() > MAX_INPUT_SIZE_BYTES {
        return;
    }

    // Raw input, including whatever the fuzzer does to the signature.
    let _ = Movie::parse(data);

    // Same bytes behind a fixed `FWS` prefix so mutations land in the tag stream.
    let mut movie = Vec::with_capacity(data.len() + 8);
    movie.extend_from_slice(b"FWS\x0a");
    movie.extend_from_slice(&((data.len() + 8) as u32).to_le_bytes());
    movie.extend_from_slice(data);

    let options = DecodeOptions {
        require_end_tag: true,
        ..DecodeOptions::default()
    };
    match Movie::parse_with_options(&movie, options) {
        Ok(parsed) => assert!(parsed.has_end()),
        Err(err) => assert!(err.offset() <= movie.len()),
    }
});
