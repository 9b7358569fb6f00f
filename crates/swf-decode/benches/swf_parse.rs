#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
#[cfg(not(target_arch = "wasm32"))]
use swf_decode::test_utils::{action, action_stream, long_tag, movie, tag};
#[cfg(not(target_arch = "wasm32"))]
use swf_decode::Movie;

#[cfg(not(target_arch = "wasm32"))]
fn criterion_config() -> Criterion {
    match std::env::var("SWF_BENCH_PROFILE").as_deref() {
        Ok("ci") => Criterion::default()
            .warm_up_time(Duration::from_millis(150))
            .measurement_time(Duration::from_millis(400))
            .sample_size(10)
            .noise_threshold(0.05),
        _ => Criterion::default()
            .warm_up_time(Duration::from_secs(1))
            .measurement_time(Duration::from_secs(2))
            .sample_size(50)
            .noise_threshold(0.03),
    }
}

/// One frame: place a character, run a short script, show the frame.
#[cfg(not(target_arch = "wasm32"))]
fn frame_tags(frame: u16) -> Vec<Vec<u8>> {
    // PlaceObject2 with a character id at depth `frame`.
    let mut place = vec![0x02];
    place.extend_from_slice(&frame.to_le_bytes());
    place.extend_from_slice(&1u16.to_le_bytes());

    // push "frame", 1.0; SetVariable; Stop
    let mut push = vec![0x00];
    push.extend_from_slice(b"frame\0");
    push.push(0x06);
    push.extend_from_slice(&0x3FF0_0000u32.to_le_bytes());
    push.extend_from_slice(&0u32.to_le_bytes());
    let script = action_stream(&[action(0x96, &push), action(0x1D, &[]), action(0x07, &[])]);

    vec![tag(26, &place), tag(12, &script), tag(1, &[])]
}

#[cfg(not(target_arch = "wasm32"))]
fn synthetic_movie(frames: u16) -> Vec<u8> {
    let mut tags = Vec::new();
    // Opaque payload to exercise the long header form.
    tags.push(long_tag(1000, &vec![0xAB; 4096]));
    for frame in 0..frames {
        tags.extend(frame_tags(frame));
    }
    tags.push(tag(0, &[]));
    movie(10, &tags)
}

#[cfg(not(target_arch = "wasm32"))]
fn bench_movie_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("swf_parse");

    for frames in [16u16, 256, 4096] {
        let bytes = synthetic_movie(frames);
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_function(BenchmarkId::new("movie", frames), |b| {
            b.iter(|| {
                let parsed = Movie::parse(black_box(&bytes)).expect("synthetic movie parses");
                black_box(parsed.tags.len());
            })
        });
    }

    group.finish();
}

#[cfg(not(target_arch = "wasm32"))]
criterion_group! {
    name = benches;
    config = criterion_config();
    targets = bench_movie_parse
}
#[cfg(not(target_arch = "wasm32"))]
criterion_main!(benches);
