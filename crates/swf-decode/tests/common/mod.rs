#![allow(dead_code)]

pub use swf_decode::test_utils::{movie, tag};

/// Byte offset of the first tag header in a movie built by [`movie`].
pub const FIRST_TAG_OFFSET: usize = 21;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
