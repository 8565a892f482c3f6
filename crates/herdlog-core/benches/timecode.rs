//! Benchmarks for herdlog-core timecode conversions.
//!
//! Run with: cargo bench -p herdlog-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use herdlog_core::{frames_to_time_string, time_string_to_frames, FrameRate};

fn bench_format(c: &mut Criterion) {
    c.bench_function("frames_to_time_string_25fps", |bencher| {
        bencher.iter(|| frames_to_time_string(black_box(2500), black_box(FrameRate::FPS_25)));
    });

    c.bench_function("frames_to_time_string_29.97fps", |bencher| {
        bencher.iter(|| frames_to_time_string(black_box(123_456), black_box(FrameRate::FPS_29_97)));
    });
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("time_string_to_frames", |bencher| {
        bencher.iter(|| time_string_to_frames(black_box("01:02:03.040"), black_box(FrameRate::FPS_25)));
    });
}

criterion_group!(benches, bench_format, bench_parse);
criterion_main!(benches);
