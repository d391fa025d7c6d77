//! Mono-keyed compressor: sidechain sum, detector, gain computer, gain.

use tonal_core::{Buffer, Float, ProcessSpec, Processor, buffer_math};

use super::detector::{LevelDetector, LevelDetectorMode};
use super::gain_computer::{GainComputer, GainComputerMode};
use super::meter::GainReductionMeter;

/// Compressor that derives one gain curve from a mono key signal and applies
/// it to every channel.
///
/// The key is the main input itself ([`process_block`](Self::process_block))
/// or an external sidechain
/// ([`process_block_with_key`](Self::process_block_with_key)) of any channel
/// count. It is summed to mono, scaled by `1 / channels` unless an override
/// is set.
///
/// # Example
///
/// ```rust
/// use tonal_core::{Buffer, ProcessSpec};
/// use tonal_effects::MonoCompressor;
///
/// let mut comp = MonoCompressor::<f32>::new();
/// comp.set_threshold_db(-20.0);
/// comp.set_ratio(4.0);
/// comp.prepare(&ProcessSpec::new(48000.0, 256, 2).unwrap());
///
/// let mut buffer = Buffer::from_channels(&[vec![0.9_f32; 256], vec![0.9; 256]]);
/// comp.process_block(&mut buffer);
/// assert!(buffer.sample(0, 255) < 0.9);
/// ```
#[derive(Debug, Clone)]
pub struct MonoCompressor<F, M = ()> {
    detector: LevelDetector<F>,
    gain_computer: GainComputer<F>,
    meter: M,
    key: Buffer<F>,
    gain: Buffer<F>,
    key_normalization: Option<F>,
    auto_makeup: bool,
    makeup_target_db: F,
}

impl<F: Float> MonoCompressor<F> {
    /// An unmetered compressor.
    pub fn new() -> Self {
        Self::with_meter(())
    }
}

impl<F: Float, M: GainReductionMeter<F>> MonoCompressor<F, M> {
    /// A compressor that reports every block to `meter`.
    pub fn with_meter(meter: M) -> Self {
        Self {
            detector: LevelDetector::new(),
            gain_computer: GainComputer::new(),
            meter,
            key: Buffer::new(1, 0),
            gain: Buffer::new(1, 0),
            key_normalization: None,
            auto_makeup: false,
            makeup_target_db: F::zero(),
        }
    }

    /// Sizes the scratch buffers and prepares every stage.
    pub fn prepare(&mut self, spec: &ProcessSpec) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            sample_rate = spec.sample_rate,
            max_block_size = spec.max_block_size,
            num_channels = spec.num_channels,
            "mono_compressor: prepare"
        );
        self.key.set_max_size(1, spec.max_block_size);
        self.gain.set_max_size(1, spec.max_block_size);
        self.detector.prepare(spec.sample_rate, spec.max_block_size);
        self.gain_computer
            .prepare(spec.sample_rate, spec.max_block_size);
        self.meter.prepare(spec.sample_rate, spec.max_block_size);
    }

    /// Clears the detector envelope and snaps the smoothed parameters.
    pub fn reset(&mut self) {
        self.detector.reset();
        self.gain_computer.reset();
    }

    /// Threshold in dB. Also the level the peak-return-to-threshold detector
    /// releases to.
    pub fn set_threshold_db(&mut self, threshold_db: F) {
        self.gain_computer.set_threshold(threshold_db);
        self.detector.set_threshold_db(threshold_db);
    }

    /// Compression ratio (`x:1`).
    pub fn set_ratio(&mut self, ratio: F) {
        self.gain_computer.set_ratio(ratio);
    }

    /// Knee width in dB.
    pub fn set_knee_db(&mut self, knee_db: F) {
        self.gain_computer.set_knee(knee_db);
    }

    /// Detector attack in milliseconds.
    pub fn set_attack_ms(&mut self, attack_ms: F) {
        self.detector.set_attack_ms(attack_ms);
    }

    /// Detector release in milliseconds.
    pub fn set_release_ms(&mut self, release_ms: F) {
        self.detector.set_release_ms(release_ms);
    }

    /// Envelope follower flavour.
    pub fn set_detector_mode(&mut self, mode: LevelDetectorMode) {
        self.detector.set_mode(mode);
    }

    /// Curve topology.
    pub fn set_gain_computer_mode(&mut self, mode: GainComputerMode) {
        self.gain_computer.set_mode(mode);
    }

    /// Turns auto makeup on or off.
    pub fn set_auto_makeup(&mut self, enabled: bool) {
        self.auto_makeup = enabled;
    }

    /// Level in dB a signal at threshold is restored to by auto makeup.
    pub fn set_makeup_target_db(&mut self, target_db: F) {
        self.makeup_target_db = target_db;
    }

    /// Overrides the `1 / channels` scaling of the mono key sum.
    /// `None` restores the default.
    pub fn set_key_normalization(&mut self, normalization: Option<F>) {
        self.key_normalization = normalization;
    }

    /// The level detector.
    pub fn detector(&self) -> &LevelDetector<F> {
        &self.detector
    }

    /// The gain computer.
    pub fn gain_computer(&self) -> &GainComputer<F> {
        &self.gain_computer
    }

    /// The attached meter.
    pub fn meter(&self) -> &M {
        &self.meter
    }

    /// Gain curve applied by the last processed block.
    pub fn gain_curve(&self) -> &[F] {
        self.gain.channel(0)
    }

    /// Compresses `buffer` keyed by itself.
    pub fn process_block(&mut self, buffer: &mut Buffer<F>) {
        self.load_key(buffer);
        self.compress(buffer);
    }

    /// Compresses `main` keyed by `key`. Both must have the same number of
    /// samples; channel counts may differ.
    pub fn process_block_with_key(&mut self, main: &mut Buffer<F>, key: &Buffer<F>) {
        debug_assert_eq!(main.num_samples(), key.num_samples());
        self.load_key(key);
        self.compress(main);
    }

    fn load_key(&mut self, key: &Buffer<F>) {
        let num_samples = key.num_samples().min(self.key.max_samples());
        debug_assert_eq!(num_samples, key.num_samples(), "block exceeds prepared size");
        self.key.set_current_size(1, num_samples);
        if num_samples == key.num_samples() {
            buffer_math::sum_to_mono(key, &mut self.key, self.key_normalization);
        } else {
            self.key.clear();
        }
    }

    fn compress(&mut self, main: &mut Buffer<F>) {
        let num_samples = self.key.num_samples();
        self.detector.process_block(&mut self.key);

        self.gain.set_current_size(1, num_samples);
        self.gain_computer
            .process_block(self.key.channel(0), self.gain.channel_mut(0));

        self.meter.push_input(main);
        buffer_math::multiply_by_mono(main, self.gain.channel(0));
        if self.auto_makeup {
            self.gain_computer
                .apply_auto_makeup(main, self.makeup_target_db);
        }
        self.meter.push_output(main);
    }
}

impl<F: Float> Default for MonoCompressor<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float, M: GainReductionMeter<F>> Processor<F> for MonoCompressor<F, M> {
    fn prepare(&mut self, spec: &ProcessSpec) {
        MonoCompressor::prepare(self, spec);
    }

    fn reset(&mut self) {
        MonoCompressor::reset(self);
    }

    fn process(&mut self, buffer: &mut Buffer<F>) {
        self.process_block(buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BallisticGainReductionMeter;
    use tonal_core::gain_to_db;

    fn spec(block: usize, channels: usize) -> ProcessSpec {
        ProcessSpec {
            sample_rate: 48000.0,
            max_block_size: block,
            num_channels: channels,
        }
    }

    #[test]
    fn quiet_signal_passes_untouched() {
        let mut comp = MonoCompressor::<f64>::new();
        comp.set_threshold_db(-6.0);
        comp.set_ratio(4.0);
        comp.prepare(&spec(128, 2));

        let input = vec![0.1; 128];
        let mut buffer = Buffer::from_channels(&[input.clone(), input.clone()]);
        comp.process_block(&mut buffer);
        assert_eq!(buffer.channel(0), input.as_slice());
        assert_eq!(buffer.channel(1), input.as_slice());
    }

    #[test]
    fn hard_knee_steady_state_matches_ratio() {
        let mut comp = MonoCompressor::<f64>::new();
        comp.set_threshold_db(-20.0);
        comp.set_ratio(4.0);
        comp.set_knee_db(0.0);
        comp.prepare(&spec(512, 1));

        let mut buffer = Buffer::from_channels(&[vec![1.0; 512]]);
        comp.process_block(&mut buffer);
        // 0 dB in, 20 dB over threshold, 15 dB of reduction at 4:1
        let out_db = gain_to_db(buffer.sample(0, 511));
        assert!((out_db + 15.0).abs() < 1.0e-6, "{out_db}");
    }

    #[test]
    fn external_key_drives_gain() {
        let mut comp = MonoCompressor::<f32>::new();
        comp.set_threshold_db(-20.0);
        comp.set_ratio(10.0);
        comp.set_knee_db(0.0);
        comp.prepare(&spec(64, 2));

        let mut main = Buffer::from_channels(&[vec![0.01_f32; 64], vec![0.01; 64]]);
        let loud_key = Buffer::from_channels(&[vec![1.0_f32; 64]]);
        comp.process_block_with_key(&mut main, &loud_key);
        assert!(main.sample(0, 63) < 0.01 * 0.5);
        assert_eq!(main.sample(0, 63), main.sample(1, 63));
    }

    #[test]
    fn key_normalization_override() {
        let mut comp = MonoCompressor::<f64>::new();
        comp.set_threshold_db(-6.0);
        comp.set_knee_db(0.0);
        comp.set_ratio(2.0);
        comp.prepare(&spec(16, 2));

        // Averaged key sits below threshold, summed key above it
        let key = Buffer::from_channels(&[vec![0.3; 16], vec![0.3; 16]]);
        let mut main = Buffer::from_channels(&[vec![1.0; 16]]);
        comp.process_block_with_key(&mut main, &key);
        assert_eq!(main.sample(0, 15), 1.0);

        comp.set_key_normalization(Some(1.0));
        comp.process_block_with_key(&mut main, &key);
        assert!(main.sample(0, 15) < 1.0);
    }

    #[test]
    fn meter_sees_reduction() {
        let mut comp = MonoCompressor::with_meter(BallisticGainReductionMeter::<f64>::new());
        comp.set_threshold_db(-20.0);
        comp.set_ratio(4.0);
        comp.prepare(&spec(4800, 1));

        let mut buffer = Buffer::from_channels(&[vec![1.0; 4800]]);
        comp.process_block(&mut buffer);
        assert!(comp.meter().gain_reduction_db() < -10.0);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut comp = MonoCompressor::<f32>::new();
        comp.set_attack_ms(5.0);
        comp.prepare(&spec(32, 1));
        let mut buffer = Buffer::from_channels(&[vec![0.8_f32; 32]]);
        comp.process_block(&mut buffer);

        comp.reset();
        let mut once = Buffer::from_channels(&[vec![0.8_f32; 32]]);
        comp.clone().process_block(&mut once);
        comp.reset();
        let mut twice = Buffer::from_channels(&[vec![0.8_f32; 32]]);
        comp.process_block(&mut twice);
        assert_eq!(once.channel(0), twice.channel(0));
    }
}
