//! Metering hooks for the compressor.
//!
//! Both traits are implemented for `()`, which compiles every push away, so
//! an unmetered compressor pays nothing. Implementations are called from
//! the audio thread and must not block or allocate.

use tonal_core::{Buffer, Float, gain_to_db};

use super::detector::BallisticCoeffs;

/// Receives the level detector's input and output every block.
pub trait LevelVisualizer<F: Float> {
    /// Called from the detector's `prepare`.
    fn prepare(&mut self, _sample_rate: f64, _max_block_size: usize) {}

    /// The mono key signal, before envelope following.
    fn push_input(&mut self, data: &[F]);

    /// The envelope the detector produced.
    fn push_output(&mut self, data: &[F]);
}

impl<F: Float> LevelVisualizer<F> for () {
    #[inline]
    fn push_input(&mut self, _data: &[F]) {}

    #[inline]
    fn push_output(&mut self, _data: &[F]) {}
}

/// Receives the compressor's main buffer before and after gain is applied.
pub trait GainReductionMeter<F: Float> {
    /// Called from the compressor's `prepare`.
    fn prepare(&mut self, _sample_rate: f64, _max_block_size: usize) {}

    /// The uncompressed block.
    fn push_input(&mut self, buffer: &Buffer<F>);

    /// The same block after gain reduction.
    fn push_output(&mut self, buffer: &Buffer<F>);
}

impl<F: Float> GainReductionMeter<F> for () {
    #[inline]
    fn push_input(&mut self, _buffer: &Buffer<F>) {}

    #[inline]
    fn push_output(&mut self, _buffer: &Buffer<F>) {}
}

/// Block peaks of the detector input and envelope.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeakLevelVisualizer<F> {
    /// Largest magnitude of the last pushed input block.
    pub input_peak: F,
    /// Largest value of the last pushed envelope block.
    pub output_peak: F,
}

fn block_peak<F: Float>(data: &[F]) -> F {
    data.iter().fold(F::zero(), |m, &x| m.max_of(x.abs()))
}

impl<F: Float> LevelVisualizer<F> for PeakLevelVisualizer<F> {
    fn prepare(&mut self, _sample_rate: f64, _max_block_size: usize) {
        self.input_peak = F::zero();
        self.output_peak = F::zero();
    }

    fn push_input(&mut self, data: &[F]) {
        self.input_peak = block_peak(data);
    }

    fn push_output(&mut self, data: &[F]) {
        self.output_peak = block_peak(data);
    }
}

/// Attack time of [`BallisticGainReductionMeter`], in milliseconds.
pub const METER_ATTACK_MS: f64 = 10.0;

/// Release time of [`BallisticGainReductionMeter`], in milliseconds.
pub const METER_RELEASE_MS: f64 = 500.0;

/// Peak meter reading the gain reduction in dB.
///
/// Input and output are each averaged to mono and run through a
/// 10 ms / 500 ms peak follower; the reading is the ratio of the two
/// envelopes. Zero while the input envelope is silent.
#[derive(Debug, Clone)]
pub struct BallisticGainReductionMeter<F> {
    attack: BallisticCoeffs<F>,
    release: BallisticCoeffs<F>,
    input_env: F,
    output_env: F,
    pending_input: F,
    gain_reduction_db: F,
}

impl<F: Float> BallisticGainReductionMeter<F> {
    /// A meter prepared for 48 kHz.
    pub fn new() -> Self {
        let mut meter = Self {
            attack: BallisticCoeffs::new(F::from_f64(METER_ATTACK_MS), F::from_f64(48000.0)),
            release: BallisticCoeffs::new(F::from_f64(METER_RELEASE_MS), F::from_f64(48000.0)),
            input_env: F::zero(),
            output_env: F::zero(),
            pending_input: F::zero(),
            gain_reduction_db: F::zero(),
        };
        GainReductionMeter::prepare(&mut meter, 48000.0, 0);
        meter
    }

    /// Latest gain reduction in dB (zero or negative while compressing).
    pub fn gain_reduction_db(&self) -> F {
        self.gain_reduction_db
    }

    fn follow(&self, mut env: F, buffer: &Buffer<F>) -> F {
        let num_channels = buffer.num_channels();
        if num_channels == 0 {
            return env;
        }
        let scale = F::one() / F::from_usize(num_channels);
        for n in 0..buffer.num_samples() {
            let mut mono = F::zero();
            for channel in buffer.channels() {
                mono = mono + channel[n];
            }
            let level = (mono * scale).abs();
            let coeffs = if level > env { self.attack } else { self.release };
            env = coeffs.a1 * env + coeffs.b0 * level;
        }
        env
    }
}

impl<F: Float> Default for BallisticGainReductionMeter<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> GainReductionMeter<F> for BallisticGainReductionMeter<F> {
    fn prepare(&mut self, sample_rate: f64, _max_block_size: usize) {
        let fs = F::from_f64(sample_rate);
        self.attack = BallisticCoeffs::new(F::from_f64(METER_ATTACK_MS), fs);
        self.release = BallisticCoeffs::new(F::from_f64(METER_RELEASE_MS), fs);
        self.input_env = F::zero();
        self.output_env = F::zero();
        self.pending_input = F::zero();
        self.gain_reduction_db = F::zero();
    }

    fn push_input(&mut self, buffer: &Buffer<F>) {
        self.pending_input = self.follow(self.input_env, buffer);
    }

    fn push_output(&mut self, buffer: &Buffer<F>) {
        self.input_env = self.pending_input;
        self.output_env = self.follow(self.output_env, buffer);
        self.gain_reduction_db = if self.input_env == F::zero() {
            F::zero()
        } else {
            gain_to_db(self.output_env / self.input_env)
        };
    }
}
