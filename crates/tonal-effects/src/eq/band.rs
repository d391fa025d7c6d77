//! A single EQ band with smoothed parameters and click-free type switching.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use tonal_core::{
    Buffer, Float, Multiplicative, ProcessSpec, Processor, SmoothedBufferValue, buffer_math,
    db_to_gain,
};

use super::filter::{EqFilter, EqFilterKind};

/// Default cutoff in Hz.
pub const DEFAULT_CUTOFF_HZ: f64 = 1000.0;

/// Default Q.
pub const DEFAULT_Q: f64 = 0.7071;

/// Ramp length of the cutoff, Q and gain smoothers, in seconds.
pub const EQ_RAMP_SECONDS: f64 = 0.05;

/// Lowest cutoff the band designs for, in Hz.
const MIN_CUTOFF_HZ: f64 = 1.0e-3;

/// Highest cutoff as a fraction of the sample rate.
const MAX_CUTOFF_RATIO: f64 = 0.4999;

/// Floor for Q and linear gain.
const MIN_POSITIVE: f64 = 1.0e-6;

/// The filter choices of [`EqBand::default_band`], in index order.
pub const DEFAULT_BAND_TYPES: [EqFilterKind; 8] = [
    EqFilterKind::FirstOrderHighpass,
    EqFilterKind::SvfHighpass,
    EqFilterKind::SvfLowShelf,
    EqFilterKind::SvfBell,
    EqFilterKind::SvfNotch,
    EqFilterKind::SvfHighShelf,
    EqFilterKind::FirstOrderLowpass,
    EqFilterKind::SvfLowpass,
];

/// One EQ band: a fixed set of filter alternatives, one of them active.
///
/// Every alternative stays allocated so a type change can crossfade: for
/// the one block after [`set_filter_type`](Self::set_filter_type) the new
/// filter fades in while the previous one fades out, after which the
/// previous filter is reset.
///
/// Cutoff, Q and gain glide multiplicatively. While any of them is gliding
/// the active filter is redesigned every sample; otherwise once per block.
///
/// # Example
///
/// ```rust
/// use tonal_core::{Buffer, ProcessSpec};
/// use tonal_effects::{EqBand, EqFilterKind};
///
/// let mut band = EqBand::<f32>::with_filter_types(&[EqFilterKind::Bell, EqFilterKind::Notch]);
/// band.set_cutoff_frequency(2000.0);
/// band.set_gain_db(6.0);
/// band.prepare(&ProcessSpec::new(48000.0, 128, 2).unwrap());
///
/// let mut buffer = Buffer::<f32>::new(2, 128);
/// band.process_block(&mut buffer);
/// band.set_filter_type(1);
/// band.process_block(&mut buffer);
/// ```
#[derive(Debug, Clone)]
pub struct EqBand<F> {
    filters: Vec<EqFilter<F>>,
    filter_type: usize,
    prev_filter_type: usize,
    freq_hz: F,
    q: F,
    gain: F,
    freq_smooth: SmoothedBufferValue<F, Multiplicative>,
    q_smooth: SmoothedBufferValue<F, Multiplicative>,
    gain_smooth: SmoothedBufferValue<F, Multiplicative>,
    fade_buffer: Buffer<F>,
    fs: F,
}

impl<F: Float> EqBand<F> {
    /// A band offering `kinds`, the first one active.
    ///
    /// # Panics
    ///
    /// If `kinds` is empty.
    pub fn with_filter_types(kinds: &[EqFilterKind]) -> Self {
        assert!(!kinds.is_empty(), "an EQ band needs at least one filter type");
        let mut band = Self {
            filters: kinds.iter().map(|&kind| EqFilter::new(kind)).collect(),
            filter_type: 0,
            prev_filter_type: 0,
            freq_hz: F::from_f64(DEFAULT_CUTOFF_HZ),
            q: F::from_f64(DEFAULT_Q),
            gain: F::one(),
            freq_smooth: SmoothedBufferValue::new(),
            q_smooth: SmoothedBufferValue::new(),
            gain_smooth: SmoothedBufferValue::new(),
            fade_buffer: Buffer::new(0, 0),
            fs: F::from_f64(48000.0),
        };
        for smoother in [&mut band.freq_smooth, &mut band.q_smooth, &mut band.gain_smooth] {
            smoother.set_ramp_length(EQ_RAMP_SECONDS);
        }
        band.reset();
        band
    }

    /// The standard eight-way band ([`DEFAULT_BAND_TYPES`]) with the bell
    /// selected.
    pub fn default_band() -> Self {
        let mut band = Self::with_filter_types(&DEFAULT_BAND_TYPES);
        band.filter_type = 3;
        band.prev_filter_type = 3;
        band
    }

    /// Number of filter alternatives.
    pub fn num_filter_types(&self) -> usize {
        self.filters.len()
    }

    /// Kind of the alternative at `index`.
    pub fn filter_kind(&self, index: usize) -> Option<EqFilterKind> {
        self.filters.get(index).map(EqFilter::kind)
    }

    /// Target cutoff in Hz.
    pub fn set_cutoff_frequency(&mut self, freq_hz: F) {
        self.freq_hz = freq_hz;
    }

    /// Target Q.
    pub fn set_q_value(&mut self, q: F) {
        self.q = q;
    }

    /// Target linear gain.
    pub fn set_gain(&mut self, gain: F) {
        self.gain = gain;
    }

    /// Target gain in dB.
    pub fn set_gain_db(&mut self, gain_db: F) {
        self.gain = db_to_gain(gain_db);
    }

    /// Selects the active alternative. Out-of-range indices select the last
    /// one (and panic in debug builds).
    pub fn set_filter_type(&mut self, index: usize) {
        debug_assert!(
            index < self.filters.len(),
            "filter type {index} out of range for {} choices",
            self.filters.len()
        );
        let index = index.min(self.filters.len() - 1);
        if index != self.filter_type {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                from = self.filter_type,
                to = index,
                kind = self.filters[index].kind().label(),
                "eq_band: filter type change"
            );
        }
        self.filter_type = index;
    }

    /// Index of the active alternative.
    pub fn filter_type(&self) -> usize {
        self.filter_type
    }

    /// Target cutoff in Hz.
    pub fn cutoff_frequency(&self) -> F {
        self.freq_hz
    }

    /// Target Q.
    pub fn q_value(&self) -> F {
        self.q
    }

    /// Target linear gain.
    pub fn gain(&self) -> F {
        self.gain
    }

    /// True while the next block will crossfade between two alternatives.
    pub fn is_crossfading(&self) -> bool {
        self.filter_type != self.prev_filter_type
    }

    /// Prepares every alternative and the smoothers, then resets.
    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.fs = F::from_f64(spec.sample_rate);
        for filter in &mut self.filters {
            filter.prepare(spec.num_channels);
        }
        for smoother in [&mut self.freq_smooth, &mut self.q_smooth, &mut self.gain_smooth] {
            smoother.prepare(spec.sample_rate, spec.max_block_size);
            smoother.set_ramp_length(EQ_RAMP_SECONDS);
        }
        self.fade_buffer
            .set_max_size(spec.num_channels, spec.max_block_size);
        self.reset();
    }

    /// Clears every alternative, snaps the smoothers to their targets and
    /// abandons any pending crossfade.
    pub fn reset(&mut self) {
        for filter in &mut self.filters {
            filter.reset();
        }
        self.freq_smooth.reset_to(self.freq_hz);
        self.q_smooth.reset_to(self.q);
        self.gain_smooth.reset_to(self.gain);
        self.prev_filter_type = self.filter_type;
    }

    /// Runs the band, or resets it and leaves `buffer` untouched when
    /// `bypassed`.
    pub fn process(&mut self, buffer: &mut Buffer<F>, bypassed: bool) {
        if bypassed {
            self.reset();
            return;
        }
        self.process_block(buffer);
    }

    /// Filters `buffer` in place.
    pub fn process_block(&mut self, buffer: &mut Buffer<F>) {
        let num_channels = buffer.num_channels();
        let num_samples = buffer.num_samples();

        self.freq_smooth.process(self.freq_hz, num_samples);
        self.q_smooth.process(self.q, num_samples);
        self.gain_smooth.process(self.gain, num_samples);

        let needs_fade = self.filter_type != self.prev_filter_type;
        if needs_fade {
            self.fade_buffer.set_current_size(num_channels, num_samples);
            buffer_math::copy_buffer_data(buffer, &mut self.fade_buffer);
        }

        let params = BandParams {
            freq: &self.freq_smooth,
            q: &self.q_smooth,
            gain: &self.gain_smooth,
            fs: self.fs,
        };
        params.run(&mut self.filters[self.filter_type], buffer);

        if needs_fade {
            let prev = &mut self.filters[self.prev_filter_type];
            params.run(prev, &mut self.fade_buffer);
            prev.reset();
            crossfade(buffer, &self.fade_buffer);
        }

        self.prev_filter_type = self.filter_type;
    }
}

impl<F: Float> Default for EqBand<F> {
    fn default() -> Self {
        Self::default_band()
    }
}

impl<F: Float> Processor<F> for EqBand<F> {
    fn prepare(&mut self, spec: &ProcessSpec) {
        EqBand::prepare(self, spec);
    }

    fn reset(&mut self) {
        EqBand::reset(self);
    }

    fn process(&mut self, buffer: &mut Buffer<F>) {
        self.process_block(buffer);
    }
}

/// The smoothed parameter blocks, borrowed for one `process_block`.
struct BandParams<'a, F> {
    freq: &'a SmoothedBufferValue<F, Multiplicative>,
    q: &'a SmoothedBufferValue<F, Multiplicative>,
    gain: &'a SmoothedBufferValue<F, Multiplicative>,
    fs: F,
}

impl<F: Float> BandParams<'_, F> {
    fn is_smoothing(&self) -> bool {
        self.freq.is_smoothing() || self.q.is_smoothing() || self.gain.is_smoothing()
    }

    /// Cutoff, Q and gain clamped to the range every design is stable in.
    fn clamped(&self, fc: F, q: F, gain: F) -> (F, F, F) {
        let floor = F::from_f64(MIN_POSITIVE);
        let max_fc = self.fs * F::from_f64(MAX_CUTOFF_RATIO);
        (
            fc.clamp_to(F::from_f64(MIN_CUTOFF_HZ), max_fc),
            q.max_of(floor),
            gain.max_of(floor),
        )
    }

    fn run(&self, filter: &mut EqFilter<F>, buffer: &mut Buffer<F>) {
        if self.is_smoothing() {
            let (freq, q, gain) = (
                self.freq.smoothed_buffer(),
                self.q.smoothed_buffer(),
                self.gain.smoothed_buffer(),
            );
            filter.process_block_with_modulation(buffer, self.fs, |n| {
                self.clamped(freq[n], q[n], gain[n])
            });
        } else {
            let (fc, q, gain) = self.clamped(
                self.freq.current_value(),
                self.q.current_value(),
                self.gain.current_value(),
            );
            filter.calc_coefs(fc, q, gain, self.fs);
            filter.process_block(buffer);
        }
    }
}

/// `target = fade_in * target + fade_out * fade_out_buffer`, with the
/// fade-in gain rising linearly from 0 and the fade-out gain falling from 1.
fn crossfade<F: Float>(target: &mut Buffer<F>, fade_out: &Buffer<F>) {
    let num_samples = target.num_samples();
    if num_samples == 0 {
        return;
    }
    let increment = F::one() / F::from_usize(num_samples);
    for (out, old) in target.channels_mut().zip(fade_out.channels()) {
        let mut gain_in = F::zero();
        let mut gain_out = F::one();
        for (y, &x_old) in out.iter_mut().zip(old) {
            *y = gain_in * *y + gain_out * x_old;
            gain_in = gain_in + increment;
            gain_out = gain_out - increment;
        }
    }
}
