// SPDX-License-Identifier: LGPL-3.0-or-later

//! Criterion benchmarks for the equalizer chain.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use simple_eq_units::analyzer::ResponseAnalyzer;
use simple_eq_units::engine::EngineState;
use simple_eq_units::settings::{ChainSettings, Slope};

const SR: f64 = 48000.0;

/// Every section active, steepest slopes.
fn full_chain() -> ChainSettings {
    ChainSettings {
        low_cut_freq: 80.0,
        low_cut_slope: Slope::Db48,
        peak_freq: 1000.0,
        peak_gain_db: 6.0,
        peak_quality: 1.0,
        high_cut_freq: 12000.0,
        high_cut_slope: Slope::Db48,
        ..ChainSettings::default()
    }
}

/// Generate a white noise buffer with deterministic seed.
fn white_noise(len: usize) -> Vec<f32> {
    let mut state: u64 = 0x1234_5678_9ABC_DEF0;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((state >> 33) as i32) as f32 / (i32::MAX as f32)
        })
        .collect()
}

fn bench_process_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_split");
    for &buf_size in &[64, 256, 1024, 4096] {
        let mut left = white_noise(buf_size);
        let mut right = white_noise(buf_size);
        let mut engine = EngineState::new(SR);
        let _ = engine.update(&full_chain());

        group.bench_with_input(BenchmarkId::from_parameter(buf_size), &buf_size, |b, _| {
            b.iter(|| engine.process(black_box(&mut left), black_box(&mut right)));
        });
    }
    group.finish();
}

fn bench_process_interleaved(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_interleaved");
    for &buf_size in &[64, 256, 1024, 4096] {
        let mut frames = white_noise(buf_size * 2);
        let mut engine = EngineState::new(SR);
        let _ = engine.update(&full_chain());

        group.bench_with_input(BenchmarkId::from_parameter(buf_size), &buf_size, |b, _| {
            b.iter(|| engine.process_interleaved(black_box(&mut frames)));
        });
    }
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut engine = EngineState::new(SR);
    let settings = full_chain();
    c.bench_function("engine_update", |b| {
        b.iter(|| engine.update(black_box(&settings)));
    });
}

fn bench_response_curve(c: &mut Criterion) {
    let mut analyzer = ResponseAnalyzer::new(SR);
    let _ = analyzer.update(&full_chain());
    let mut group = c.benchmark_group("response_curve");
    for &points in &[128, 512, 2048] {
        group.bench_with_input(BenchmarkId::from_parameter(points), &points, |b, &n| {
            b.iter(|| analyzer.response_curve(black_box(n)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_process_split,
    bench_process_interleaved,
    bench_update,
    bench_response_curve
);
criterion_main!(benches);
