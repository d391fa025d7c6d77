//! Integration tests for tonal-effects.
//!
//! Gain computer curves are checked against tabulated dB values, the EQ band
//! against steady-state sine levels and type-switch continuity, and the
//! compressor end to end.

use approx::assert_abs_diff_eq;
use tonal_core::{Buffer, ProcessSpec, db_to_gain, gain_to_db};
use tonal_effects::{
    CompressorParams, EqBand, EqBandParams, EqFilterKind, EqParams, EqProcessor, GainComputer,
    GainComputerMode, LevelDetectorMode, MonoCompressor,
};

const FS: f64 = 48000.0;
const BLOCK: usize = 8;

fn db_buffer(dbs: &[f32]) -> Buffer<f32> {
    let gains: Vec<f32> = dbs.iter().map(|&db| db_to_gain(db)).collect();
    Buffer::from_channels(&[gains])
}

fn assert_db(expected: &[f32], actual: &[f32]) {
    for (n, (&e, &a)) in expected.iter().zip(actual).enumerate() {
        let a_db = gain_to_db(a);
        assert!((a_db - e).abs() <= 0.1, "sample {n}: expected {e} dB, got {a_db} dB");
    }
}

fn sine(freq: f64, amplitude: f64, num_samples: usize) -> Vec<f64> {
    (0..num_samples)
        .map(|n| amplitude * libm::sin(core::f64::consts::TAU * freq * n as f64 / FS))
        .collect()
}

fn peak(signal: &[f64]) -> f64 {
    signal.iter().fold(0.0_f64, |m, &x| m.max(x.abs()))
}

// ---------------------------------------------------------------------------
// 1. Gain computer curves
// ---------------------------------------------------------------------------

const LEVELS_DB: [f32; BLOCK] = [-30.0, -20.0, -15.0, -12.0, -9.0, -6.0, 0.0, 6.0];

fn reference_computer(mode: GainComputerMode) -> GainComputer<f32> {
    let mut computer = GainComputer::new();
    computer.prepare(FS, BLOCK);
    computer.set_threshold(-12.0);
    computer.set_ratio(4.0);
    computer.set_knee(6.0);
    computer.set_mode(mode);
    computer.reset();
    computer
}

fn run_curve(mode: GainComputerMode, makeup: bool) -> Vec<f32> {
    let mut computer = reference_computer(mode);
    let level = db_buffer(&LEVELS_DB);
    let mut gain = Buffer::<f32>::new(1, BLOCK);
    computer.process_block(level.channel(0), gain.channel_mut(0));
    if makeup {
        computer.apply_auto_makeup(&mut gain, 0.0);
    }
    gain.channel(0).to_vec()
}

#[test]
fn feed_forward_curve() {
    let gain = run_curve(GainComputerMode::FeedForward, false);
    assert_db(&[0.0, 0.0, 0.0, -0.5, -2.25, -4.5, -9.0, -13.5], &gain);
}

#[test]
fn feed_forward_curve_with_makeup() {
    let gain = run_curve(GainComputerMode::FeedForward, true);
    assert_db(&[9.0, 9.0, 9.0, 8.5, 6.75, 4.5, 0.0, -4.5], &gain);
}

#[test]
fn feed_back_curve() {
    let gain = run_curve(GainComputerMode::FeedBack, false);
    assert_db(&[0.0, 0.0, 0.0, -2.25, -9.0, -18.0, -36.0, -54.0], &gain);
}

#[test]
fn feed_back_curve_with_makeup() {
    let gain = run_curve(GainComputerMode::FeedBack, true);
    assert_db(&[36.0, 36.0, 36.0, 33.75, 27.0, 18.0, 0.0, -18.0], &gain);
}

// ---------------------------------------------------------------------------
// 2. Auto makeup against fixed and gliding thresholds
// ---------------------------------------------------------------------------

const GLIDE_SECONDS: f64 = 0.000_167;

/// Ratio 2:1, threshold -6 dB, hard knee. With `glide_to` set the threshold
/// ramps there over exactly one block.
fn makeup_computer(mode: GainComputerMode, glide_to: Option<f32>) -> GainComputer<f32> {
    let mut computer = GainComputer::new();
    computer.set_mode(mode);
    computer.set_threshold(-6.0);
    computer.set_ratio(2.0);
    computer.set_knee(0.0);
    computer.prepare(FS, BLOCK);
    computer.set_smoothing_time(GLIDE_SECONDS);
    if let Some(threshold) = glide_to {
        computer.set_threshold(threshold);
    }
    let mut gain = [0.0; BLOCK];
    computer.process_block(&[0.0; BLOCK], &mut gain);
    computer
}

#[test]
fn feed_forward_makeup_fixed_threshold() {
    let computer = makeup_computer(GainComputerMode::FeedForward, None);
    let mut buffer = db_buffer(&[4.0, -3.0, 4.0, -3.0, 4.0, -3.0, 4.0, -3.0]);
    computer.apply_auto_makeup(&mut buffer, 0.0);
    assert_db(&[7.0, 0.0, 7.0, 0.0, 7.0, 0.0, 7.0, 0.0], buffer.channel(0));
}

#[test]
fn feed_forward_makeup_gliding_threshold() {
    let computer = makeup_computer(GainComputerMode::FeedForward, Some(-4.0));
    let mut buffer = db_buffer(&[-2.875, -2.75, -2.625, -2.5, -2.375, -2.25, -2.125, -2.0]);
    computer.apply_auto_makeup(&mut buffer, 0.0);
    assert_db(&[0.0; BLOCK], buffer.channel(0));
}

#[test]
fn feed_back_makeup_fixed_threshold() {
    let computer = makeup_computer(GainComputerMode::FeedBack, None);
    let mut buffer = db_buffer(&[-6.0, 4.0, -6.0, 4.0, -6.0, 4.0, -6.0, 4.0]);
    computer.apply_auto_makeup(&mut buffer, 0.0);
    assert_db(&[0.0, 10.0, 0.0, 10.0, 0.0, 10.0, 0.0, 10.0], buffer.channel(0));
}

#[test]
fn feed_back_makeup_gliding_threshold() {
    let computer = makeup_computer(GainComputerMode::FeedBack, Some(-4.0));
    let mut buffer = db_buffer(&[-5.75, -5.5, -5.25, -5.0, -4.75, -4.49, -4.24, -4.0]);
    computer.apply_auto_makeup(&mut buffer, 0.0);
    assert_db(&[0.0; BLOCK], buffer.channel(0));
}

#[test]
fn compression_then_makeup() {
    let mut computer = GainComputer::<f32>::new();
    computer.set_threshold(-3.0);
    computer.set_ratio(2.0);
    computer.set_knee(0.0);
    computer.prepare(FS, BLOCK);

    let mut signal = db_buffer(&[16.0; BLOCK]);
    let mut gain = [0.0_f32; BLOCK];
    computer.process_block(signal.channel(0), &mut gain);
    assert_db(&[-9.5; BLOCK], &gain);

    for (x, g) in signal.channel_mut(0).iter_mut().zip(gain) {
        *x *= g;
    }
    assert_db(&[6.5; BLOCK], signal.channel(0));

    computer.apply_auto_makeup(&mut signal, 0.0);
    assert_db(&[8.0; BLOCK], signal.channel(0));
}

// ---------------------------------------------------------------------------
// 3. EQ band
// ---------------------------------------------------------------------------

fn spec(block: usize, channels: usize) -> ProcessSpec {
    ProcessSpec {
        sample_rate: FS,
        max_block_size: block,
        num_channels: channels,
    }
}

/// Runs `signal` through `band` in blocks of `block` samples.
fn run_band(band: &mut EqBand<f64>, signal: &[f64], block: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(signal.len());
    for chunk in signal.chunks(block) {
        let mut buffer = Buffer::from_channels(&[chunk]);
        band.process_block(&mut buffer);
        out.extend_from_slice(buffer.channel(0));
    }
    out
}

#[test]
fn bell_reproduces_gain_at_centre() {
    for kind in [EqFilterKind::Bell, EqFilterKind::SvfBell] {
        let mut band = EqBand::<f64>::with_filter_types(&[kind]);
        band.set_cutoff_frequency(1000.0);
        band.set_q_value(1.0);
        band.set_gain_db(6.0);
        band.prepare(&spec(512, 1));

        let out = run_band(&mut band, &sine(1000.0, 1.0, 24000), 512);
        let level = gain_to_db(peak(&out[19200..]));
        assert!((level - 6.0).abs() < 0.1, "{kind:?}: {level} dB");
    }
}

#[test]
fn lowpass_passes_low_sine() {
    let mut band = EqBand::<f64>::with_filter_types(&[EqFilterKind::SecondOrderLowpass]);
    band.set_cutoff_frequency(500.0);
    band.set_q_value(0.7071);
    band.prepare(&spec(480, 1));

    let out = run_band(&mut band, &sine(100.0, 1.0, 48000), 480);
    assert_abs_diff_eq!(peak(&out[38400..]), 1.0, epsilon = 0.01);
}

#[test]
fn type_switch_crossfades_without_jumps() {
    const SWITCH_BLOCK: usize = 256;
    let mut band = EqBand::<f64>::default_band();
    band.set_gain_db(12.0);
    band.prepare(&spec(SWITCH_BLOCK, 1));

    let input = sine(1000.0, 1.0, SWITCH_BLOCK * 40);
    let (before, after) = input.split_at(SWITCH_BLOCK * 20);
    let steady = run_band(&mut band, before, SWITCH_BLOCK);
    let steady_tail = &steady[steady.len() - SWITCH_BLOCK * 4..];
    let steady_step = steady_tail
        .windows(2)
        .fold(0.0_f64, |m, w| m.max((w[1] - w[0]).abs()));

    // bell -> notch at the same frequency
    band.set_filter_type(4);
    let faded = run_band(&mut band, &after[..SWITCH_BLOCK], SWITCH_BLOCK);

    let mut joined = vec![*steady.last().unwrap_or(&0.0)];
    joined.extend_from_slice(&faded);
    for (n, w) in joined.windows(2).enumerate() {
        let step = (w[1] - w[0]).abs();
        assert!(step <= steady_step * 1.1, "sample {n}: step {step} vs steady {steady_step}");
    }
    assert!(!band.is_crossfading());

    // The notch then settles close to silence
    let settled = run_band(&mut band, &after[SWITCH_BLOCK..], SWITCH_BLOCK);
    assert!(peak(&settled[settled.len() - 1024..]) < 0.01);
}

#[test]
fn gliding_cutoff_lands_on_target_response() {
    let mut swept = EqBand::<f64>::with_filter_types(&[EqFilterKind::SvfLowpass]);
    swept.set_cutoff_frequency(1000.0);
    swept.prepare(&spec(256, 1));
    swept.set_cutoff_frequency(4000.0);

    let mut fixed = EqBand::<f64>::with_filter_types(&[EqFilterKind::SvfLowpass]);
    fixed.set_cutoff_frequency(4000.0);
    fixed.prepare(&spec(256, 1));

    let input = sine(3000.0, 1.0, 48000);
    let swept_out = run_band(&mut swept, &input, 256);
    let fixed_out = run_band(&mut fixed, &input, 256);

    assert!(swept_out.iter().all(|x| x.is_finite()));
    // Mid-glide the two differ, once settled they agree
    assert!((swept_out[600] - fixed_out[600]).abs() > 1.0e-3);
    for (a, b) in swept_out[40000..].iter().zip(&fixed_out[40000..]) {
        assert!((a - b).abs() < 1.0e-6);
    }
}

#[test]
fn bypass_resets_on_every_call() {
    let noise: Vec<f64> = (0..256)
        .map(|n| libm::sin(n as f64 * 1.7) * libm::cos(n as f64 * 0.31))
        .collect();
    let signal = sine(440.0, 0.5, 256);

    let mut used = EqBand::<f64>::default_band();
    used.set_gain_db(-9.0);
    used.prepare(&spec(256, 1));
    let mut fresh = used.clone();

    run_band(&mut used, &noise, 256);
    let mut bypassed = Buffer::from_channels(&[noise.clone()]);
    used.process(&mut bypassed, true);
    assert_eq!(bypassed.channel(0), noise.as_slice());

    assert_eq!(run_band(&mut used, &signal, 256), run_band(&mut fresh, &signal, 256));
}

#[test]
fn processor_applies_snapshot() {
    let mut params = EqParams::with_bands(2);
    params.bands[0] = EqBandParams {
        freq_hz: 200.0,
        q: 0.7071,
        gain_db: 0.0,
        filter_type: 0,
        on: true,
    };
    let mut eq = EqProcessor::<f64, 2>::new();
    eq.set_parameters(&params);
    eq.prepare(&spec(480, 1));

    // 1-pole HPF at 200 Hz knocks a 20 Hz sine down by ~20 dB
    let input = sine(20.0, 1.0, 48000);
    let mut out = Vec::new();
    for chunk in input.chunks(480) {
        let mut buffer = Buffer::from_channels(&[chunk]);
        eq.process_block(&mut buffer);
        out.extend_from_slice(buffer.channel(0));
    }
    let level = gain_to_db(peak(&out[24000..]));
    assert!(level < -15.0, "{level} dB");
}

// ---------------------------------------------------------------------------
// 4. Compressor end to end
// ---------------------------------------------------------------------------

#[test]
fn compressor_settles_on_static_curve() {
    let mut comp = MonoCompressor::<f64>::new();
    CompressorParams {
        threshold_db: -20.0,
        ratio: 4.0,
        knee_db: 0.0,
        attack_ms: 1.0,
        release_ms: 200.0,
        ..CompressorParams::default()
    }
    .apply_to(&mut comp);
    comp.prepare(&spec(480, 2));

    let input = sine(1000.0, 1.0, 48000);
    let mut left = Vec::new();
    for chunk in input.chunks(480) {
        let mut buffer = Buffer::from_channels(&[chunk, chunk]);
        comp.process_block(&mut buffer);
        assert_eq!(buffer.channel(0), buffer.channel(1));
        left.extend_from_slice(buffer.channel(0));
    }

    let level = gain_to_db(peak(&left[43200..]));
    assert_abs_diff_eq!(level, -15.0, epsilon = 1.0);
}

#[test]
fn auto_makeup_keeps_target_level() {
    let mut comp = MonoCompressor::<f64>::new();
    comp.set_threshold_db(-12.0);
    comp.set_ratio(3.0);
    comp.set_knee_db(0.0);
    comp.set_attack_ms(0.0);
    comp.set_auto_makeup(true);
    comp.prepare(&spec(64, 1));

    // A constant 0 dB input is compressed by 8 dB, which makeup gives back
    let mut buffer = Buffer::from_channels(&[vec![1.0; 64]]);
    comp.process_block(&mut buffer);
    assert!((buffer.sample(0, 63) - 1.0).abs() < 1.0e-9);

    comp.set_auto_makeup(false);
    let mut buffer = Buffer::from_channels(&[vec![1.0; 64]]);
    comp.process_block(&mut buffer);
    assert!((gain_to_db(buffer.sample(0, 63)) + 8.0).abs() < 1.0e-6);
}

#[test]
fn sidechain_ducks_main_signal() {
    let mut comp = MonoCompressor::<f32>::new();
    comp.set_threshold_db(-30.0);
    comp.set_ratio(20.0);
    comp.set_knee_db(0.0);
    comp.set_attack_ms(0.0);
    comp.prepare(&spec(128, 2));

    let mut main = Buffer::from_channels(&[vec![0.5_f32; 128], vec![0.5; 128]]);
    let quiet = Buffer::from_channels(&[vec![0.0_f32; 128]]);
    comp.process_block_with_key(&mut main, &quiet);
    assert_eq!(main.sample(0, 127), 0.5);

    let loud = Buffer::from_channels(&[vec![0.8_f32; 128]]);
    comp.process_block_with_key(&mut main, &loud);
    assert!(main.sample(1, 127) < 0.05);
}

// ---------------------------------------------------------------------------
// 5. Settings and logging
// ---------------------------------------------------------------------------

#[test]
fn params_round_trip_through_toml() {
    let comp = CompressorParams {
        detector_mode: LevelDetectorMode::PeakRtT,
        gain_computer_mode: GainComputerMode::FeedBack,
        auto_makeup: true,
        ..CompressorParams::default()
    };
    let text = toml::to_string(&comp).expect("serialize compressor params");
    assert!(text.contains("detector_mode = \"peak_rtt\""));
    let back: CompressorParams = toml::from_str(&text).expect("parse compressor params");
    assert_eq!(back, comp);

    let eq: EqParams = toml::from_str(
        r#"
        [[bands]]
        freq_hz = 120.0
        filter_type = 2
        on = true

        [[bands]]
        gain_db = -4.5
        "#,
    )
    .expect("parse eq params");
    assert_eq!(eq.bands.len(), 2);
    assert_eq!(eq.bands[0].q, 0.7071);
    assert!(eq.bands[0].on);
    assert_eq!(eq.bands[1].filter_type, 3);
    assert_eq!(eq.validate(), Ok(()));
}

#[test]
fn mode_changes_are_traced() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut comp = MonoCompressor::<f32>::new();
        comp.prepare(&spec(64, 2));
        comp.set_detector_mode(LevelDetectorMode::Rms);
        comp.set_gain_computer_mode(GainComputerMode::FeedBack);

        let mut band = EqBand::<f32>::default_band();
        band.prepare(&spec(64, 2));
        band.set_filter_type(0);
        let mut buffer = Buffer::<f32>::new(2, 64);
        band.process_block(&mut buffer);
        assert!(buffer.channel(0).iter().all(|x| x.is_finite()));
    });
}
