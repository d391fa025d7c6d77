//! State Variable Filter.
//!
//! Trapezoidal (TPT) state variable filter after Andy Simper, "Linear
//! Trap Integrated SVF" (Cytomic technical paper, 2013). The two integrator
//! states are updated with the trapezoidal rule, so the filter keeps the
//! analog response shape and can be swept at audio rate without the
//! zipper and blow-up problems of Direct Form sections.
//!
//! # Outputs
//!
//! Every response is a linear mix of the three core taps `v0` (highpass),
//! `v1` (bandpass) and `v2` (lowpass):
//!
//! | Mode      | Output                          |
//! |-----------|---------------------------------|
//! | Lowpass   | `v2`                            |
//! | Bandpass  | `v1`                            |
//! | Highpass  | `v0`                            |
//! | Notch     | `v2 + v0`                       |
//! | Allpass   | `v2 + v0 - k v1`                |
//! | Bell      | `v2 + v0 + k0 A v1`             |
//! | LowShelf  | `A^2 v2 + k0 A v1 + v0`         |
//! | HighShelf | `A^2 v0 + k0 A v1 + v2`         |
//!
//! with `A = sqrt(gain)`. The gain only affects the last three modes.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::buffer::Buffer;
use crate::sample::{Float, Sample};

/// Response of a [`StateVariableFilter`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SvfMode {
    /// 12 dB/oct lowpass.
    #[default]
    Lowpass,
    /// 12 dB/oct highpass.
    Highpass,
    /// Bandpass with unity gain at the cutoff for `Q = 1`.
    Bandpass,
    /// Band-reject.
    Notch,
    /// Flat magnitude, phase shift around the cutoff.
    Allpass,
    /// Peaking boost or cut of `gain` at the cutoff.
    Bell,
    /// `gain` below the cutoff.
    LowShelf,
    /// `gain` above the cutoff.
    HighShelf,
}

impl SvfMode {
    /// True for the modes whose response depends on the gain parameter.
    pub fn uses_gain(self) -> bool {
        matches!(self, Self::Bell | Self::LowShelf | Self::HighShelf)
    }
}

/// Multi-channel TPT state variable filter.
///
/// # Example
///
/// ```rust
/// use tonal_core::filters::{StateVariableFilter, SvfMode};
///
/// let mut svf = StateVariableFilter::<f32>::new(SvfMode::Bell);
/// svf.prepare(2);
/// svf.calc_coefs(1000.0, 0.7071, 2.0, 48000.0);
/// let y = svf.process_sample(0.5, 1);
/// assert!(y.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct StateVariableFilter<S> {
    mode: SvfMode,
    // Integrator states, one pair per channel.
    state: Vec<[S; 2]>,

    k: S,
    a1: S,
    a2: S,
    a3: S,
    ak: S,
    k0a: S,
    a_sq: S,
}

impl<S: Sample> StateVariableFilter<S> {
    /// Creates a filter prepared for one channel, designed for 1 kHz at
    /// 48 kHz with `Q = 0.7071` and unity gain.
    pub fn new(mode: SvfMode) -> Self {
        let zero = S::default();
        let mut svf = Self {
            mode,
            state: Vec::new(),
            k: zero,
            a1: zero,
            a2: zero,
            a3: zero,
            ak: zero,
            k0a: zero,
            a_sq: zero,
        };
        svf.prepare(1);
        svf.calc_coefs(
            S::splat_f64(1000.0),
            S::splat_f64(core::f64::consts::FRAC_1_SQRT_2),
            S::splat_f64(1.0),
            <S::Scalar as Float>::from_f64(48000.0),
        );
        svf
    }

    /// Current mode.
    pub fn mode(&self) -> SvfMode {
        self.mode
    }

    /// Switches the output mix. Coefficients must be recomputed with
    /// [`calc_coefs`](Self::calc_coefs) because the gain modes warp `g`
    /// and `k`.
    pub fn set_mode(&mut self, mode: SvfMode) {
        self.mode = mode;
    }

    /// Allocates per-channel state and zeroes it.
    pub fn prepare(&mut self, num_channels: usize) {
        self.state.clear();
        self.state.resize(num_channels, [S::default(); 2]);
    }

    /// Zeroes the integrator states.
    pub fn reset(&mut self) {
        for s in &mut self.state {
            *s = [S::default(); 2];
        }
    }

    /// Designs the filter. `gain` is linear and ignored by the modes that
    /// do not use it.
    pub fn calc_coefs(&mut self, fc: S, q: S, gain: S, fs: S::Scalar) {
        let one = S::splat_f64(1.0);
        let g0 = (S::splat_f64(core::f64::consts::PI) * fc / S::splat(fs)).tan();
        let k0 = one / q;

        let (a, g, k) = if self.mode.uses_gain() {
            let a = gain.sqrt();
            match self.mode {
                SvfMode::Bell => (a, g0, k0 / a),
                SvfMode::LowShelf => (a, g0 / a.sqrt(), k0),
                _ => (a, g0 * a.sqrt(), k0),
            }
        } else {
            (one, g0, k0)
        };

        self.k = k;
        self.k0a = k0 * a;
        self.a_sq = a * a;
        self.a1 = one / (one + g * (g + k));
        self.a2 = g * self.a1;
        self.a3 = g * self.a2;
        self.ak = (g + k) * self.a1;
    }

    /// Processes one sample on `channel`.
    #[inline]
    pub fn process_sample(&mut self, x: S, channel: usize) -> S {
        let two = S::splat_f64(2.0);
        let [s1, s2] = self.state[channel];

        let v3 = x - s2;
        let v0 = self.a1 * v3 - self.ak * s1;
        let v1 = self.a2 * v3 + self.a1 * s1;
        let v2 = self.a3 * v3 + self.a2 * s1 + s2;

        self.state[channel] = [two * v1 - s1, two * v2 - s2];

        match self.mode {
            SvfMode::Lowpass => v2,
            SvfMode::Bandpass => v1,
            SvfMode::Highpass => v0,
            SvfMode::Notch => v2 + v0,
            SvfMode::Allpass => v2 + v0 - self.k * v1,
            SvfMode::Bell => v2 + v0 + self.k0a * v1,
            SvfMode::LowShelf => self.a_sq * v2 + self.k0a * v1 + v0,
            SvfMode::HighShelf => self.a_sq * v0 + self.k0a * v1 + v2,
        }
    }

    /// Processes every active channel of `buffer` in place.
    pub fn process_block(&mut self, buffer: &mut Buffer<S>) {
        debug_assert!(buffer.num_channels() <= self.state.len());
        for ch in 0..buffer.num_channels() {
            for sample in buffer.channel_mut(ch).iter_mut() {
                *sample = self.process_sample(*sample, ch);
            }
        }
    }
}

impl<S: Sample> Default for StateVariableFilter<S> {
    fn default() -> Self {
        Self::new(SvfMode::Lowpass)
    }
}
