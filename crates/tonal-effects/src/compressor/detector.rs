//! Ballistic level detection for compressors.

use tonal_core::{Buffer, Float, db_to_gain};

use super::meter::LevelVisualizer;

/// Envelope follower flavour used by [`LevelDetector`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LevelDetectorMode {
    /// Peak follower that releases towards zero.
    #[default]
    Peak,
    /// Peak follower that releases towards the threshold level.
    #[cfg_attr(feature = "serde", serde(rename = "peak_rtt"))]
    PeakRtT,
    /// Follows `x^2`, square root taken once per block.
    Rms,
}

impl LevelDetectorMode {
    /// Every mode, in index order.
    pub const ALL: [Self; 3] = [Self::Peak, Self::PeakRtT, Self::Rms];

    /// Time constant actually used for a nominal attack of `attack_ms`.
    ///
    /// The RMS follower tracks the squared signal, whose envelope moves
    /// twice as fast in dB; halving the time constant restores the nominal
    /// ballistics after the square root.
    #[inline]
    pub fn modify_attack<F: Float>(self, attack_ms: F) -> F {
        match self {
            Self::Rms => attack_ms * F::from_f64(0.5),
            Self::Peak | Self::PeakRtT => attack_ms,
        }
    }

    /// Time constant actually used for a nominal release of `release_ms`.
    #[inline]
    pub fn modify_release<F: Float>(self, release_ms: F) -> F {
        match self {
            Self::Rms => release_ms * F::from_f64(0.5),
            Self::Peak | Self::PeakRtT => release_ms,
        }
    }
}

/// One-pole smoothing coefficients `y = a1 * y + b0 * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallisticCoeffs<F> {
    /// Feedback coefficient.
    pub a1: F,
    /// Input coefficient, `1 - a1`.
    pub b0: F,
}

impl<F: Float> BallisticCoeffs<F> {
    /// Coefficients reaching `1 - 1/e` of a step in `time_ms` at
    /// `sample_rate`. A zero time gives an instantaneous follower.
    pub fn new(time_ms: F, sample_rate: F) -> Self {
        let a1 = (-F::one() / (sample_rate * time_ms * F::from_f64(0.001))).exp();
        Self {
            a1,
            b0: F::one() - a1,
        }
    }

    #[inline]
    fn step(self, z: F, x: F) -> F {
        self.a1 * z + self.b0 * x
    }
}

/// Asymmetric one-pole level detector with selectable mode.
///
/// Runs in place on channel 0 of the buffer it is handed: the input is
/// replaced by its envelope. Attack coefficients are used while the input
/// rises above the envelope, release coefficients otherwise.
///
/// `V` receives the detector input and output each block; `()` compiles the
/// hooks away.
///
/// # Example
///
/// ```rust
/// use tonal_core::Buffer;
/// use tonal_effects::{LevelDetector, LevelDetectorMode};
///
/// let mut detector = LevelDetector::<f32>::new();
/// detector.prepare(48000.0, 256);
/// detector.set_mode(LevelDetectorMode::Peak);
/// detector.set_attack_ms(1.0);
/// detector.set_release_ms(100.0);
///
/// let mut block = Buffer::from_channels(&[vec![1.0_f32; 256]]);
/// detector.process_block(&mut block);
/// assert!(block.sample(0, 255) > 0.99);
/// ```
#[derive(Debug, Clone)]
pub struct LevelDetector<F, V = ()> {
    mode: LevelDetectorMode,
    attack: BallisticCoeffs<F>,
    release: BallisticCoeffs<F>,
    attack_ms: F,
    release_ms: F,
    threshold_linear: F,
    fs: F,
    z1: F,
    visualizer: V,
}

impl<F: Float> LevelDetector<F> {
    /// A peak detector with instantaneous ballistics at 48 kHz.
    pub fn new() -> Self {
        Self::with_visualizer(())
    }
}

impl<F: Float, V: LevelVisualizer<F>> LevelDetector<F, V> {
    /// A detector that reports every block to `visualizer`.
    pub fn with_visualizer(visualizer: V) -> Self {
        let instant = BallisticCoeffs {
            a1: F::zero(),
            b0: F::one(),
        };
        Self {
            mode: LevelDetectorMode::Peak,
            attack: instant,
            release: instant,
            attack_ms: F::zero(),
            release_ms: F::zero(),
            threshold_linear: F::one(),
            fs: F::from_f64(48000.0),
            z1: F::zero(),
            visualizer,
        }
    }

    /// Sets the sample rate, recomputes the ballistics and clears the state.
    pub fn prepare(&mut self, sample_rate: f64, max_block_size: usize) {
        self.fs = F::from_f64(sample_rate);
        self.visualizer.prepare(sample_rate, max_block_size);
        self.recalc_attack();
        self.recalc_release();
        self.reset();
    }

    /// Clears the envelope.
    pub fn reset(&mut self) {
        self.z1 = F::zero();
    }

    /// Selects the detector mode; attack and release are re-derived for it.
    pub fn set_mode(&mut self, mode: LevelDetectorMode) {
        if mode == self.mode {
            return;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(?mode, "level_detector: mode change");
        self.mode = mode;
        self.recalc_attack();
        self.recalc_release();
    }

    /// Current mode.
    pub fn mode(&self) -> LevelDetectorMode {
        self.mode
    }

    /// Sets the attack time in milliseconds (negative values clamp to zero).
    pub fn set_attack_ms(&mut self, attack_ms: F) {
        self.attack_ms = attack_ms.max_of(F::zero());
        self.recalc_attack();
    }

    /// Sets the release time in milliseconds (negative values clamp to zero).
    pub fn set_release_ms(&mut self, release_ms: F) {
        self.release_ms = release_ms.max_of(F::zero());
        self.recalc_release();
    }

    /// Sets the level the peak-return-to-threshold mode releases to.
    pub fn set_threshold_db(&mut self, threshold_db: F) {
        self.threshold_linear = db_to_gain(threshold_db);
    }

    /// Attack coefficients in use.
    pub fn attack_coeffs(&self) -> BallisticCoeffs<F> {
        self.attack
    }

    /// Release coefficients in use.
    pub fn release_coeffs(&self) -> BallisticCoeffs<F> {
        self.release
    }

    /// The attached visualizer.
    pub fn visualizer(&self) -> &V {
        &self.visualizer
    }

    /// Mutable access to the attached visualizer.
    pub fn visualizer_mut(&mut self) -> &mut V {
        &mut self.visualizer
    }

    /// Replaces channel 0 of `buffer` with its envelope. Other channels are
    /// left alone.
    pub fn process_block(&mut self, buffer: &mut Buffer<F>) {
        if buffer.num_channels() == 0 {
            return;
        }
        let data = buffer.channel_mut(0);
        self.visualizer.push_input(data);

        let (attack, release) = (self.attack, self.release);
        let mut z = self.z1;
        match self.mode {
            LevelDetectorMode::Peak => {
                for x in data.iter_mut() {
                    let level = x.abs();
                    z = if level > z {
                        attack.step(z, level)
                    } else {
                        release.step(z, level)
                    };
                    *x = z;
                }
            }
            LevelDetectorMode::PeakRtT => {
                let threshold = self.threshold_linear;
                for x in data.iter_mut() {
                    let level = x.abs();
                    z = if level > z {
                        attack.step(z, level)
                    } else {
                        release.step(z, threshold)
                    };
                    *x = z;
                }
            }
            LevelDetectorMode::Rms => {
                for x in data.iter_mut() {
                    let power = *x * *x;
                    z = if power > z {
                        attack.step(z, power)
                    } else {
                        release.step(z, power)
                    };
                    *x = z;
                }
                for x in data.iter_mut() {
                    *x = x.sqrt();
                }
            }
        }
        self.z1 = z;

        self.visualizer.push_output(data);
    }

    fn recalc_attack(&mut self) {
        let time = self.mode.modify_attack(self.attack_ms);
        self.attack = BallisticCoeffs::new(time, self.fs);
    }

    fn recalc_release(&mut self) {
        let time = self.mode.modify_release(self.release_ms);
        self.release = BallisticCoeffs::new(time, self.fs);
    }
}

impl<F: Float> Default for LevelDetector<F> {
    fn default() -> Self {
        Self::new()
    }
}
