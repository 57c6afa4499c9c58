//! Benchmarks for the voice engine's block rendering.
//!
//! Run with: cargo bench
//!
//! Reference deadlines at 48kHz:
//!   - 64 samples  = 1.33ms
//!   - 128 samples = 2.67ms
//!   - 256 samples = 5.33ms
//!   - 512 samples = 10.67ms
//! A render must come in far under its deadline to leave headroom for the
//! rest of the host's processing.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use subvox::config::EngineConfig;
use subvox::engine::SynthEngine;
use subvox::io::midi::RawMidi;

const SAMPLE_RATE: f32 = 48_000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

fn note_on(timestamp: u32, key: u8) -> RawMidi {
    RawMidi::new(timestamp, &[0x90, key, 100])
}

fn engine_with_notes(voices: usize, sounding: usize, block: usize) -> SynthEngine {
    let config = EngineConfig {
        max_voices: voices,
        ..Default::default()
    };
    let mut engine = SynthEngine::new(config).expect("valid config");
    engine.prepare(SAMPLE_RATE, block).expect("valid prepare");

    let events: Vec<RawMidi> = (0..sounding).map(|i| note_on(0, 40 + i as u8)).collect();
    let mut warmup = vec![0.0f32; block];
    let mut channels: [&mut [f32]; 1] = [&mut warmup];
    engine.render_block(&mut channels, &events);
    engine
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/render");

    for &size in BLOCK_SIZES {
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        // Single sustained voice: the per-voice baseline.
        let mut solo = engine_with_notes(8, 1, size);
        group.bench_with_input(BenchmarkId::new("1_voice", size), &size, |b, _| {
            b.iter(|| {
                let mut channels: [&mut [f32]; 2] = [&mut left, &mut right];
                solo.render_block(black_box(&mut channels), &[]);
            })
        });

        // Full pool sustained: worst-case steady-state cost.
        let mut full = engine_with_notes(8, 8, size);
        group.bench_with_input(BenchmarkId::new("8_voices", size), &size, |b, _| {
            b.iter(|| {
                let mut channels: [&mut [f32]; 2] = [&mut left, &mut right];
                full.render_block(black_box(&mut channels), &[]);
            })
        });
    }

    group.finish();
}

fn bench_event_splitting(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/events");

    // A block peppered with events exercises the segment walk.
    let size = 512;
    let mut left = vec![0.0f32; size];
    let events: Vec<RawMidi> = (0..16)
        .map(|i| note_on(i * 32, 40 + (i % 12) as u8))
        .collect();

    let mut engine = engine_with_notes(8, 0, size);
    group.bench_function("16_events_512", |b| {
        b.iter(|| {
            let mut channels: [&mut [f32]; 1] = [&mut left];
            engine.render_block(black_box(&mut channels), black_box(&events));
        })
    });

    group.finish();
}

criterion_group!(benches, bench_render, bench_event_splitting);
criterion_main!(benches);
