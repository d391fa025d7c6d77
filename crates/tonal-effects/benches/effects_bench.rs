//! Criterion benchmarks for tonal effects
//!
//! Run with: cargo bench
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tonal_core::{Buffer, ProcessSpec};
use tonal_effects::{EqBand, EqFilterKind, EqProcessor, GainComputer, MonoCompressor};

const SAMPLE_RATE: f64 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f64 / SAMPLE_RATE;
            (libm::sin(2.0 * core::f64::consts::PI * 440.0 * t) * 0.5) as f32
        })
        .collect()
}

fn stereo(block_size: usize) -> Buffer<f32> {
    let signal = generate_test_signal(block_size);
    Buffer::from_channels(&[signal.as_slice(), signal.as_slice()])
}

fn spec(block_size: usize) -> ProcessSpec {
    ProcessSpec {
        sample_rate: SAMPLE_RATE,
        max_block_size: block_size,
        num_channels: 2,
    }
}

fn bench_eq_band_steady(c: &mut Criterion) {
    let mut group = c.benchmark_group("EqBand/steady");

    for kind in [
        EqFilterKind::Bell,
        EqFilterKind::SvfBell,
        EqFilterKind::ButterworthLowpass(8),
        EqFilterKind::EllipticLowpass(8),
    ] {
        for &block_size in BLOCK_SIZES {
            let mut band = EqBand::<f32>::with_filter_types(&[kind]);
            band.set_gain_db(6.0);
            band.prepare(&spec(block_size));
            let input = stereo(block_size);

            group.bench_with_input(
                BenchmarkId::new(kind.label(), block_size),
                &block_size,
                |b, _| {
                    let mut buffer = input.clone();
                    b.iter(|| {
                        band.process_block(black_box(&mut buffer));
                        black_box(buffer.sample(0, 0))
                    })
                },
            );
        }
    }

    group.finish();
}

fn bench_eq_band_smoothing(c: &mut Criterion) {
    let mut group = c.benchmark_group("EqBand/smoothing");

    for &block_size in BLOCK_SIZES {
        let mut band = EqBand::<f32>::default_band();
        band.prepare(&spec(block_size));
        let input = stereo(block_size);

        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, _| {
                let mut buffer = input.clone();
                let mut high = false;
                b.iter(|| {
                    // Alternate targets so every block runs the per-sample path
                    high = !high;
                    band.set_cutoff_frequency(if high { 4000.0 } else { 500.0 });
                    band.process_block(black_box(&mut buffer));
                    black_box(buffer.sample(0, 0))
                })
            },
        );
    }

    group.finish();
}

fn bench_eq_processor(c: &mut Criterion) {
    let mut group = c.benchmark_group("EqProcessor/8 bands");

    for &block_size in BLOCK_SIZES {
        let mut eq = EqProcessor::<f32, 8>::new();
        for index in 0..8 {
            eq.set_band_on_off(index, true);
            eq.set_filter_type(index, index);
            eq.set_cutoff_frequency(index, 100.0 * (index + 1) as f32);
            eq.set_gain_db(index, 3.0);
        }
        eq.prepare(&spec(block_size));
        let input = stereo(block_size);

        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, _| {
                let mut buffer = input.clone();
                b.iter(|| {
                    eq.process_block(black_box(&mut buffer));
                    black_box(buffer.sample(0, 0))
                })
            },
        );
    }

    group.finish();
}

fn bench_gain_computer(c: &mut Criterion) {
    let mut group = c.benchmark_group("GainComputer");

    for &block_size in BLOCK_SIZES {
        let mut computer = GainComputer::<f32>::new();
        computer.set_threshold(-20.0);
        computer.set_ratio(4.0);
        computer.set_knee(6.0);
        computer.prepare(SAMPLE_RATE, block_size);
        let level: Vec<f32> = generate_test_signal(block_size)
            .into_iter()
            .map(f32::abs)
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, _| {
                let mut gain = vec![0.0; block_size];
                b.iter(|| {
                    computer.process_block(black_box(&level), &mut gain);
                    black_box(gain[0])
                })
            },
        );
    }

    group.finish();
}

fn bench_compressor(c: &mut Criterion) {
    let mut group = c.benchmark_group("MonoCompressor");

    for &block_size in BLOCK_SIZES {
        let mut comp = MonoCompressor::<f32>::new();
        comp.set_threshold_db(-18.0);
        comp.set_ratio(4.0);
        comp.set_auto_makeup(true);
        comp.prepare(&spec(block_size));
        let input = stereo(block_size);

        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, _| {
                let mut buffer = input.clone();
                b.iter(|| {
                    comp.process_block(black_box(&mut buffer));
                    black_box(buffer.sample(0, 0))
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_eq_band_steady,
    bench_eq_band_smoothing,
    bench_eq_processor,
    bench_gain_computer,
    bench_compressor,
);
criterion_main!(benches);
