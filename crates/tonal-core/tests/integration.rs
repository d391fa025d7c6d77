//! Integration tests for tonal-core filters.
//!
//! Filters are verified with signal-level measurements: a two second sine is
//! run through the filter and the gain is read from the RMS of the second
//! half, by which point every section has settled. All test frequencies
//! complete a whole number of cycles in one second, so RMS * sqrt(2) is the
//! exact steady-state magnitude.

use approx::assert_abs_diff_eq;
use tonal_core::{
    Buffer, ButterworthFilter, ButterworthKind, CascadeKind, ChebyshevIIFilter, EllipticFilter,
    HighShelfFilter, IirFilter, LowShelfFilter, NotchFilter, PeakingFilter, SecondOrderBpf,
    SecondOrderHpf, SecondOrderLpf, StateVariableFilter, SvfMode, buffer_math,
    filters::coefficients,
};

const FS: f64 = 48000.0;
const FC: f64 = 500.0;
const Q: f64 = 0.7071;
const GAIN_DB: f64 = 6.0;

/// Returns the gain in dB of `process` at `freq_hz`.
fn measure_response(freq_hz: f64, mut process: impl FnMut(f64) -> f64) -> f64 {
    let num_samples = 2 * FS as usize;
    let output: Vec<f64> = (0..num_samples)
        .map(|n| process(libm::sin(core::f64::consts::TAU * freq_hz * n as f64 / FS)))
        .collect();
    let tail = &output[num_samples / 2..];
    let rms = libm::sqrt(tail.iter().map(|y| y * y).sum::<f64>() / tail.len() as f64);
    20.0 * libm::log10((rms * core::f64::consts::SQRT_2).max(1.0e-10))
}

fn assert_db(actual: f64, expected: f64, tolerance: f64, what: &str) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "{what}: expected {expected} dB (+/- {tolerance}), got {actual:.4} dB"
    );
}

// ============================================================================
// 1. Second-order responses at design points
// ============================================================================

#[test]
fn lowpass_response() {
    let check = |freq, expected, tol| {
        let mut f = SecondOrderLpf::<f64>::new();
        f.calc_coefs(FC, Q, FS);
        assert_db(measure_response(freq, |x| f.process_sample(x, 0)), expected, tol, "LPF");
    };
    check(1.0, 0.0, 0.01);
    check(FC, -3.01, 0.01);
    check(4.0 * FC, -24.2, 0.1);
}

#[test]
fn highpass_response() {
    let check = |freq, expected, tol| {
        let mut f = SecondOrderHpf::<f64>::new();
        f.calc_coefs(FC, Q, FS);
        assert_db(measure_response(freq, |x| f.process_sample(x, 0)), expected, tol, "HPF");
    };
    check(FC / 4.0, -24.1, 0.1);
    check(FC, -3.01, 0.01);
    check(0.498 * FS, 0.0, 0.01);
}

#[test]
fn bandpass_response() {
    let check = |freq, expected, tol| {
        let mut f = SecondOrderBpf::<f64>::new();
        f.calc_coefs(FC, Q, FS);
        assert_db(measure_response(freq, |x| f.process_sample(x, 0)), expected, tol, "BPF");
    };
    check(FC / 4.0, -9.0, 0.1);
    check(FC, 0.0, 0.01);
    check(4.0 * FC, -9.1, 0.1);
}

#[test]
fn notch_response() {
    let measure = |freq| {
        let mut f = NotchFilter::<f64>::new();
        f.calc_coefs(FC, Q, FS);
        measure_response(freq, |x| f.process_sample(x, 0))
    };
    assert_db(measure(1.0), 0.0, 0.01, "notch low");
    assert!(measure(FC) < -40.0, "notch centre not rejected");
    assert_db(measure(0.498 * FS), 0.0, 0.01, "notch high");
}

#[test]
fn notch_response_single_precision() {
    let mut f = NotchFilter::<f32>::new();
    f.calc_coefs(FC as f32, Q as f32, FS as f32);
    let gain = measure_response(FC, |x| f64::from(f.process_sample(x as f32, 0)));
    assert!(gain < -40.0, "f32 notch centre at {gain} dB");
}

#[test]
fn peaking_response() {
    let check = |freq, expected, tol| {
        let mut f = PeakingFilter::<f64>::new();
        f.calc_coefs_db(FC, Q, GAIN_DB, FS);
        assert_db(measure_response(freq, |x| f.process_sample(x, 0)), expected, tol, "bell");
    };
    check(1.0, 0.0, 0.01);
    check(FC, GAIN_DB, 0.01);
    check(0.498 * FS, 0.0, 0.01);
}

#[test]
fn low_shelf_response() {
    let check = |freq, expected, tol| {
        let mut f = LowShelfFilter::<f64>::new();
        f.calc_coefs_db(FC, Q, GAIN_DB, FS);
        assert_db(measure_response(freq, |x| f.process_sample(x, 0)), expected, tol, "low shelf");
    };
    check(1.0, GAIN_DB, 0.01);
    check(FC, GAIN_DB / 2.0, 0.01);
    check(0.498 * FS, 0.0, 0.01);
}

#[test]
fn high_shelf_response() {
    let check = |freq, expected, tol| {
        let mut f = HighShelfFilter::<f64>::new();
        f.calc_coefs_db(FC, Q, GAIN_DB, FS);
        assert_db(measure_response(freq, |x| f.process_sample(x, 0)), expected, tol, "high shelf");
    };
    check(1.0, 0.0, 0.01);
    check(FC, GAIN_DB / 2.0, 0.01);
    check(0.498 * FS, GAIN_DB, 0.01);
}

// ============================================================================
// 2. Higher-order and state variable filters
// ============================================================================

#[test]
fn butterworth_is_three_db_down_at_cutoff() {
    for order in [2, 3, 4, 5, 8] {
        let mut lpf = ButterworthFilter::<f64>::new(ButterworthKind::Lowpass, order);
        lpf.calc_coefs(FC, Q, FS);
        let gain = measure_response(FC, |x| lpf.process_sample(x, 0));
        assert_db(gain, -3.01, 0.02, "butterworth lowpass");

        let mut hpf = ButterworthFilter::<f64>::new(ButterworthKind::Highpass, order);
        hpf.calc_coefs(FC, Q, FS);
        let gain = measure_response(FC, |x| hpf.process_sample(x, 0));
        assert_db(gain, -3.01, 0.02, "butterworth highpass");
    }
}

#[test]
fn butterworth_rolls_off_with_order() {
    let stopband = |order| {
        let mut f = ButterworthFilter::<f64>::new(ButterworthKind::Lowpass, order);
        f.calc_coefs(FC, Q, FS);
        measure_response(4.0 * FC, |x| f.process_sample(x, 0))
    };
    let (second, fourth) = (stopband(2), stopband(4));
    assert!(fourth < second - 20.0, "order 4 {fourth} dB vs order 2 {second} dB");
}

fn assert_stopband(gain: f64, freq: f64, what: &str) {
    assert!(gain <= -59.9, "{what}: {gain:.3} dB at {freq} Hz is above the stopband floor");
}

#[test]
fn chebyshev_is_three_db_down_at_cutoff() {
    for order in [4, 8] {
        let mut lpf = ChebyshevIIFilter::<f64>::new(CascadeKind::Lowpass, order);
        lpf.calc_coefs(FC, Q, FS);
        assert_db(measure_response(1.0, |x| lpf.process_sample(x, 0)), 0.0, 0.01, "cheby LPF");
        assert_db(measure_response(FC, |x| lpf.process_sample(x, 0)), -3.0, 0.02, "cheby LPF");

        let mut hpf = ChebyshevIIFilter::<f64>::new(CascadeKind::Highpass, order);
        hpf.calc_coefs(FC, Q, FS);
        let passband = measure_response(10000.0, |x| hpf.process_sample(x, 0));
        assert_db(passband, 0.0, 0.01, "cheby HPF");
        assert_db(measure_response(FC, |x| hpf.process_sample(x, 0)), -3.0, 0.02, "cheby HPF");
    }
}

#[test]
fn chebyshev_stopband_holds_attenuation() {
    let mut lpf = ChebyshevIIFilter::<f64>::new(CascadeKind::Lowpass, 8);
    lpf.calc_coefs(FC, Q, FS);
    for freq in [2.0 * FC, 4.0 * FC, 10.0 * FC] {
        assert_stopband(measure_response(freq, |x| lpf.process_sample(x, 0)), freq, "cheby LPF");
    }

    let mut hpf = ChebyshevIIFilter::<f64>::new(CascadeKind::Highpass, 8);
    hpf.calc_coefs(FC, Q, FS);
    for freq in [FC / 2.0, FC / 4.0, 10.0] {
        assert_stopband(measure_response(freq, |x| hpf.process_sample(x, 0)), freq, "cheby HPF");
    }
}

#[test]
fn chebyshev_stopband_edge_cutoff() {
    let mut lpf = ChebyshevIIFilter::<f64>::with_stopband_edge(CascadeKind::Lowpass, 8, 60.0);
    lpf.calc_coefs(FC, Q, FS);
    assert_db(measure_response(100.0, |x| lpf.process_sample(x, 0)), 0.0, 0.01, "edge LPF");
    for freq in [FC, 1.2 * FC, 2.0 * FC, 10.0 * FC] {
        assert_stopband(measure_response(freq, |x| lpf.process_sample(x, 0)), freq, "edge LPF");
    }

    let mut hpf = ChebyshevIIFilter::<f64>::with_stopband_edge(CascadeKind::Highpass, 8, 60.0);
    hpf.calc_coefs(FC, Q, FS);
    assert_db(measure_response(5000.0, |x| hpf.process_sample(x, 0)), 0.0, 0.01, "edge HPF");
    for freq in [FC, 0.8 * FC, FC / 2.0] {
        assert_stopband(measure_response(freq, |x| hpf.process_sample(x, 0)), freq, "edge HPF");
    }
}

#[test]
fn elliptic_passband_stays_within_ripple() {
    let in_ripple = |gain: f64, freq: f64, what: &str| {
        assert!(
            (-0.11..=0.01).contains(&gain),
            "{what}: {gain:.4} dB at {freq} Hz is outside the 0.1 dB ripple"
        );
    };

    let mut lpf = EllipticFilter::<f64>::new(CascadeKind::Lowpass, 8);
    lpf.calc_coefs(FC, Q, FS);
    for freq in [1.0, 100.0, 250.0, 400.0, 490.0, FC] {
        in_ripple(measure_response(freq, |x| lpf.process_sample(x, 0)), freq, "elliptic LPF");
    }

    let mut hpf = EllipticFilter::<f64>::new(CascadeKind::Highpass, 8);
    hpf.calc_coefs(FC, Q, FS);
    for freq in [10000.0, 2000.0, 1000.0, 600.0, 510.0, FC] {
        in_ripple(measure_response(freq, |x| hpf.process_sample(x, 0)), freq, "elliptic HPF");
    }
}

#[test]
fn elliptic_stopband_holds_attenuation() {
    let mut lpf = EllipticFilter::<f64>::new(CascadeKind::Lowpass, 8);
    lpf.calc_coefs(FC, Q, FS);
    for freq in [1.2 * FC, 2.0 * FC, 4.0 * FC, 20.0 * FC] {
        let gain = measure_response(freq, |x| lpf.process_sample(x, 0));
        assert_stopband(gain, freq, "elliptic LPF");
    }

    let mut hpf = EllipticFilter::<f64>::new(CascadeKind::Highpass, 8);
    hpf.calc_coefs(FC, Q, FS);
    for freq in [0.8 * FC, 0.6 * FC, FC / 5.0, 10.0] {
        let gain = measure_response(freq, |x| hpf.process_sample(x, 0));
        assert_stopband(gain, freq, "elliptic HPF");
    }
}

#[test]
fn elliptic_transition_is_narrowest() {
    // One fifth of an octave past the passband edge
    let freq = 1.2 * FC;
    let mut elliptic = EllipticFilter::<f64>::new(CascadeKind::Lowpass, 8);
    elliptic.calc_coefs(FC, Q, FS);
    let mut chebyshev = ChebyshevIIFilter::<f64>::new(CascadeKind::Lowpass, 8);
    chebyshev.calc_coefs(FC, Q, FS);
    let mut butterworth = ButterworthFilter::<f64>::new(ButterworthKind::Lowpass, 8);
    butterworth.calc_coefs(FC, Q, FS);

    let e = measure_response(freq, |x| elliptic.process_sample(x, 0));
    let c = measure_response(freq, |x| chebyshev.process_sample(x, 0));
    let b = measure_response(freq, |x| butterworth.process_sample(x, 0));
    assert!(e < c && c < b, "elliptic {e:.2} dB, chebyshev {c:.2} dB, butterworth {b:.2} dB");
}

#[test]
fn elliptic_q_adds_resonance_at_cutoff() {
    let mut flat = EllipticFilter::<f64>::new(CascadeKind::Lowpass, 8);
    flat.calc_coefs(FC, Q, FS);
    let mut peaked = EllipticFilter::<f64>::new(CascadeKind::Lowpass, 8);
    peaked.calc_coefs(FC, 2.0, FS);

    assert_db(measure_response(FC, |x| peaked.process_sample(x, 0)), 4.36, 0.05, "resonant");
    let low = measure_response(100.0, |x| peaked.process_sample(x, 0));
    let flat_low = measure_response(100.0, |x| flat.process_sample(x, 0));
    assert_abs_diff_eq!(low, flat_low, epsilon = 0.01);
}

#[test]
fn svf_matches_design_points() {
    let measure = |mode, gain: f64, freq| {
        let mut svf = StateVariableFilter::<f64>::new(mode);
        svf.calc_coefs(FC, Q, gain, FS);
        measure_response(freq, |x| svf.process_sample(x, 0))
    };
    let gain = tonal_core::db_to_gain(GAIN_DB);
    assert_db(measure(SvfMode::Lowpass, 1.0, FC), -3.01, 0.01, "svf lowpass");
    assert_db(measure(SvfMode::Highpass, 1.0, FC), -3.01, 0.01, "svf highpass");
    assert_db(measure(SvfMode::Allpass, 1.0, FC), 0.0, 0.01, "svf allpass");
    assert_db(measure(SvfMode::Bell, gain, FC), GAIN_DB, 0.01, "svf bell");
    assert_db(measure(SvfMode::LowShelf, gain, 1.0), GAIN_DB, 0.01, "svf low shelf");
    assert_db(measure(SvfMode::HighShelf, gain, 0.498 * FS), GAIN_DB, 0.05, "svf high shelf");
    assert!(measure(SvfMode::Notch, 1.0, FC) < -40.0);
}

// ============================================================================
// 3. Block processing, modulation and buffers
// ============================================================================

#[test]
fn sine_through_lowpass_keeps_passband_magnitude() {
    let num_samples = 48000;
    let sine: Vec<f32> = (0..num_samples)
        .map(|n| libm::sinf(core::f32::consts::TAU * 100.0 * n as f32 / 48000.0))
        .collect();
    let mut buffer = Buffer::from_channels(&[sine.clone(), sine]);

    let mut lpf = SecondOrderLpf::<f32>::new();
    lpf.prepare(2);
    lpf.calc_coefs(500.0, 0.7071, 48000.0);
    lpf.process_block(&mut buffer);

    let settled: Vec<Vec<f32>> = buffer.channels().map(|c| c[num_samples / 2..].to_vec()).collect();
    let tail = Buffer::from_channels(&settled);
    for ch in 0..2 {
        let magnitude = buffer_math::get_magnitude(&tail, Some(ch));
        assert_abs_diff_eq!(magnitude, 1.0, epsilon = 0.01);
    }
}

#[test]
fn modulated_block_matches_per_sample_design() {
    let mut input = Buffer::<f64>::new(1, 256);
    for n in 0..256 {
        input.set_sample(0, n, if n % 32 == 0 { 1.0 } else { 0.0 });
    }
    let cutoff = |n: usize| 200.0 + 20.0 * n as f64;

    let mut modulated = input.clone();
    let mut filter = IirFilter::<f64, 3>::new();
    filter.process_block_with_modulation(&mut modulated, |f, n| {
        f.set_coefs(&coefficients::second_order_lpf(cutoff(n), Q, FS));
    });

    let mut reference = SecondOrderLpf::<f64>::new();
    for n in 0..256 {
        reference.calc_coefs(cutoff(n), Q, FS);
        let y = reference.process_sample(input.sample(0, n), 0);
        assert_eq!(modulated.sample(0, n), y, "sample {n}");
    }
}
