//! Static compression curves with a quadratic soft knee.
//!
//! | Regime                    | Feed-forward gain           | Feed-back gain            |
//! |---------------------------|-----------------------------|---------------------------|
//! | `level <= knee_lower`     | 1                           | 1                         |
//! | `level >= knee_upper`     | `(level/thr)^(1/ratio - 1)` | `(level/thr)^(1 - ratio)` |
//! | inside the knee           | `-a_ff * c^2` dB            | `-a_fb * c^2` dB          |
//!
//! with `c = dB(level) - dB(thr) + knee/2`, `a_ff = (1 - 1/ratio) / (2 knee)`
//! and `a_fb = (ratio - 1) / (2 knee)`.

use tonal_core::{
    Buffer, Float, Multiplicative, SmoothedBufferValue, buffer_math, db_to_gain, gain_to_db,
};

/// Smallest ratio accepted; anything lower would expand.
const MIN_RATIO: f64 = 1.0;

/// Ramp length of the threshold and ratio smoothers, in seconds.
pub const GAIN_COMPUTER_RAMP_SECONDS: f64 = 0.05;

/// Compressor topology the curve is designed for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GainComputerMode {
    /// Gain computed from the input level.
    #[default]
    FeedForward,
    /// Gain computed from the output level; the curve is steeper so the
    /// closed loop lands on the requested ratio.
    FeedBack,
}

impl GainComputerMode {
    /// Every mode, in index order.
    pub const ALL: [Self; 2] = [Self::FeedForward, Self::FeedBack];

    /// Exponent applied to `level / threshold` above the knee.
    #[inline]
    fn exponent<F: Float>(self, ratio: F) -> F {
        match self {
            Self::FeedForward => F::one() / ratio - F::one(),
            Self::FeedBack => F::one() - ratio,
        }
    }

    /// Exponent applied to `target / threshold` by the auto makeup.
    #[inline]
    fn makeup_exponent<F: Float>(self, ratio: F) -> F {
        -self.exponent(ratio)
    }

    /// Soft-knee curvature for `ratio` and `knee_db`.
    #[inline]
    fn curvature<F: Float>(self, ratio: F, knee_db: F) -> F {
        let two_knee = F::from_f64(2.0) * knee_db;
        match self {
            Self::FeedForward => (F::one() - F::one() / ratio) / two_knee,
            Self::FeedBack => (ratio - F::one()) / two_knee,
        }
    }
}

/// Maps a detected level to a linear gain.
///
/// Threshold and ratio glide multiplicatively over
/// [`GAIN_COMPUTER_RAMP_SECONDS`]; the knee applies immediately.
///
/// # Example
///
/// ```rust
/// use tonal_effects::{GainComputer, GainComputerMode};
///
/// let mut computer = GainComputer::<f64>::new();
/// computer.set_mode(GainComputerMode::FeedForward);
/// computer.set_threshold(-12.0);
/// computer.set_ratio(4.0);
/// computer.set_knee(6.0);
/// computer.prepare(48000.0, 4);
///
/// let level = [0.01, 0.1, 1.0, 2.0];
/// let mut gain = [0.0; 4];
/// computer.process_block(&level, &mut gain);
/// assert_eq!(gain[0], 1.0);
/// assert!(gain[2] < 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct GainComputer<F> {
    mode: GainComputerMode,
    threshold_db: F,
    ratio: F,
    knee_db: F,
    knee_lower: F,
    knee_upper: F,
    curvature: F,
    thresh_smooth: SmoothedBufferValue<F, Multiplicative>,
    ratio_smooth: SmoothedBufferValue<F, Multiplicative>,
}

impl<F: Float> GainComputer<F> {
    /// A 0 dB threshold, 1:1 ratio, 1 dB knee feed-forward curve.
    pub fn new() -> Self {
        let mut computer = Self {
            mode: GainComputerMode::FeedForward,
            threshold_db: F::zero(),
            ratio: F::one(),
            knee_db: F::one(),
            knee_lower: F::one(),
            knee_upper: F::one(),
            curvature: F::zero(),
            thresh_smooth: SmoothedBufferValue::new(),
            ratio_smooth: SmoothedBufferValue::new(),
        };
        computer.thresh_smooth.set_ramp_length(GAIN_COMPUTER_RAMP_SECONDS);
        computer.ratio_smooth.set_ramp_length(GAIN_COMPUTER_RAMP_SECONDS);
        computer.recalc_knees();
        computer.recalc_curvature();
        computer.reset();
        computer
    }

    /// Sizes the smoothers and snaps them to the current settings.
    pub fn prepare(&mut self, sample_rate: f64, max_block_size: usize) {
        self.thresh_smooth.prepare(sample_rate, max_block_size);
        self.ratio_smooth.prepare(sample_rate, max_block_size);
        self.reset();
    }

    /// Snaps threshold and ratio to their targets.
    pub fn reset(&mut self) {
        self.thresh_smooth.reset_to(db_to_gain(self.threshold_db));
        self.ratio_smooth.reset_to(self.ratio);
    }

    /// Changes the threshold and ratio glide time. Snaps both to their
    /// targets.
    pub fn set_smoothing_time(&mut self, ramp_seconds: f64) {
        self.thresh_smooth.set_ramp_length(ramp_seconds);
        self.ratio_smooth.set_ramp_length(ramp_seconds);
        self.reset();
    }

    /// Selects the curve topology.
    pub fn set_mode(&mut self, mode: GainComputerMode) {
        if mode != self.mode {
            #[cfg(feature = "tracing")]
            tracing::debug!(?mode, "gain_computer: mode change");
            self.mode = mode;
            self.recalc_curvature();
        }
    }

    /// Current topology.
    pub fn mode(&self) -> GainComputerMode {
        self.mode
    }

    /// Sets the threshold in dB.
    pub fn set_threshold(&mut self, threshold_db: F) {
        if threshold_db != self.threshold_db {
            self.threshold_db = threshold_db;
            self.recalc_knees();
        }
    }

    /// Sets the compression ratio (`x:1`). Values below 1 are raised to 1.
    pub fn set_ratio(&mut self, ratio: F) {
        let ratio = ratio.max_of(F::from_f64(MIN_RATIO));
        if ratio != self.ratio {
            self.ratio = ratio;
            self.recalc_curvature();
        }
    }

    /// Sets the knee width in dB. Negative widths are treated as hard knees.
    pub fn set_knee(&mut self, knee_db: F) {
        let knee_db = knee_db.max_of(F::zero());
        if knee_db != self.knee_db {
            self.knee_db = knee_db;
            self.recalc_knees();
            self.recalc_curvature();
        }
    }

    /// Threshold target in dB.
    pub fn threshold(&self) -> F {
        self.threshold_db
    }

    /// Ratio target.
    pub fn ratio(&self) -> F {
        self.ratio
    }

    /// Knee width in dB.
    pub fn knee(&self) -> F {
        self.knee_db
    }

    /// Linear level where the knee starts.
    pub fn knee_lower(&self) -> F {
        self.knee_lower
    }

    /// Linear level where the knee ends.
    pub fn knee_upper(&self) -> F {
        self.knee_upper
    }

    /// Writes the gain for every entry of `level` into `gain`.
    ///
    /// Both slices must have the same length, no longer than the prepared
    /// block size.
    pub fn process_block(&mut self, level: &[F], gain: &mut [F]) {
        debug_assert_eq!(level.len(), gain.len());
        let num_samples = level.len().min(gain.len());
        self.thresh_smooth
            .process(db_to_gain(self.threshold_db), num_samples);
        self.ratio_smooth.process(self.ratio, num_samples);

        let thresh = self.thresh_smooth.smoothed_buffer();
        let ratio = self.ratio_smooth.smoothed_buffer();
        let mode = self.mode;
        let half_knee = F::from_f64(0.5) * self.knee_db;

        for ((y, &x), (&thr, &r)) in gain
            .iter_mut()
            .zip(level)
            .zip(thresh.iter().zip(ratio))
        {
            let x_abs = x.abs();
            *y = if x_abs <= self.knee_lower {
                F::one()
            } else if x_abs >= self.knee_upper {
                (x_abs / thr).powf(mode.exponent(r))
            } else {
                let correction = gain_to_db(x_abs) - gain_to_db(thr) + half_knee;
                db_to_gain(-self.curvature * correction * correction)
            };
        }
    }

    /// Multiplies `buffer` by the gain that brings a signal at threshold back
    /// up to `target_db` after compression.
    ///
    /// Uses the per-sample threshold and ratio of the last
    /// [`process_block`](Self::process_block) while either is gliding.
    pub fn apply_auto_makeup(&self, buffer: &mut Buffer<F>, target_db: F) {
        let target = db_to_gain(target_db);
        let mode = self.mode;

        if self.thresh_smooth.is_smoothing() || self.ratio_smooth.is_smoothing() {
            let thresh = self.thresh_smooth.smoothed_buffer();
            let ratio = self.ratio_smooth.smoothed_buffer();
            for channel in buffer.channels_mut() {
                for (x, (&thr, &r)) in channel.iter_mut().zip(thresh.iter().zip(ratio)) {
                    *x = *x * (target / thr).powf(mode.makeup_exponent(r));
                }
            }
        } else {
            let thr = self.thresh_smooth.current_value();
            let r = self.ratio_smooth.current_value();
            buffer_math::apply_gain(buffer, (target / thr).powf(mode.makeup_exponent(r)));
        }
    }

    fn recalc_knees(&mut self) {
        let half_knee = F::from_f64(0.5) * self.knee_db;
        self.knee_lower = db_to_gain(self.threshold_db - half_knee);
        self.knee_upper = db_to_gain(self.threshold_db + half_knee);
    }

    fn recalc_curvature(&mut self) {
        self.curvature = self.mode.curvature(self.ratio, self.knee_db);
    }
}

impl<F: Float> Default for GainComputer<F> {
    fn default() -> Self {
        Self::new()
    }
}
