//! Four modal resonators in one `f32x4`.
//!
//! Complex values are kept as split real / imaginary registers, so every
//! complex multiply is four lane-wise multiplies and two adds. Transcendental
//! coefficient math runs per lane through `libm`; it only happens on
//! parameter changes.

use tonal_core::{map_lanes, set_lane};
use wide::f32x4;

/// Four [`ModalFilter`](super::ModalFilter)s evaluated in parallel, one per
/// lane.
#[derive(Debug, Clone)]
pub struct VecModalFilter {
    filt_re: f32x4,
    filt_im: f32x4,
    decay_factor: f32x4,
    osc_re: f32x4,
    osc_im: f32x4,
    y1_re: f32x4,
    y1_im: f32x4,

    freq: f32x4,
    t60: f32x4,
    amp_re: f32x4,
    amp_im: f32x4,
    fs: f32,
}

impl VecModalFilter {
    /// Lanes per register.
    pub const LANES: usize = 4;

    /// Four silent resonators at 1 Hz, `T60 = 1 s`, 44.1 kHz.
    pub fn new() -> Self {
        let zero = f32x4::splat(0.0);
        let mut filter = Self {
            filt_re: zero,
            filt_im: zero,
            decay_factor: zero,
            osc_re: zero,
            osc_im: zero,
            y1_re: zero,
            y1_im: zero,
            freq: f32x4::splat(1.0),
            t60: f32x4::splat(1.0),
            amp_re: zero,
            amp_im: zero,
            fs: 44100.0,
        };
        filter.prepare(filter.fs);
        filter
    }

    /// Recomputes every lane's coefficients for `sample_rate` and clears the
    /// state.
    pub fn prepare(&mut self, sample_rate: f32) {
        self.fs = sample_rate;
        self.decay_factor = self.calc_decay_factor();
        self.calc_osc_coef();
        self.update_params();
        self.reset();
    }

    /// Clears every lane's state.
    #[inline]
    pub fn reset(&mut self) {
        self.y1_re = f32x4::splat(0.0);
        self.y1_im = f32x4::splat(0.0);
    }

    /// Clears the state of lanes `from..LANES`, leaving lower lanes ringing.
    pub fn clear_lanes(&mut self, from: usize) {
        for lane in from..Self::LANES {
            set_lane(&mut self.y1_re, lane, 0.0);
            set_lane(&mut self.y1_im, lane, 0.0);
        }
    }

    /// Sets real amplitudes (zero phase).
    #[inline]
    pub fn set_amp_real(&mut self, amp: f32x4) {
        self.amp_re = amp;
        self.amp_im = f32x4::splat(0.0);
    }

    /// Sets complex amplitudes from split real / imaginary parts.
    #[inline]
    pub fn set_amp(&mut self, re: f32x4, im: f32x4) {
        self.amp_re = re;
        self.amp_im = im;
    }

    /// Sets amplitudes from magnitude and phase (radians).
    pub fn set_amp_polar(&mut self, amp: f32x4, phase: f32x4) {
        self.amp_re = amp * map_lanes(phase, libm::cosf);
        self.amp_im = amp * map_lanes(phase, libm::sinf);
    }

    /// Real and imaginary amplitude registers.
    pub fn amp(&self) -> (f32x4, f32x4) {
        (self.amp_re, self.amp_im)
    }

    /// Sets per-lane decay times in seconds to -60 dB.
    #[inline]
    pub fn set_decay(&mut self, t60: f32x4) {
        self.t60 = t60;
        self.decay_factor = self.calc_decay_factor();
        self.update_params();
    }

    /// Per-lane decay times.
    pub fn decay(&self) -> f32x4 {
        self.t60
    }

    /// Sets per-lane resonant frequencies in Hz.
    #[inline]
    pub fn set_freq(&mut self, freq: f32x4) {
        self.freq = freq;
        self.calc_osc_coef();
        self.update_params();
    }

    /// Per-lane resonant frequencies.
    #[inline]
    pub fn freq(&self) -> f32x4 {
        self.freq
    }

    /// Feeds `x` to all four lanes; returns each lane's output.
    #[inline]
    pub fn process_sample(&mut self, x: f32) -> f32x4 {
        let x = f32x4::splat(x);
        let re = self.filt_re * self.y1_re - self.filt_im * self.y1_im + self.amp_re * x;
        let im = self.filt_re * self.y1_im + self.filt_im * self.y1_re + self.amp_im * x;
        self.y1_re = re;
        self.y1_im = im;
        im
    }

    #[inline]
    fn update_params(&mut self) {
        self.filt_re = self.osc_re * self.decay_factor;
        self.filt_im = self.osc_im * self.decay_factor;
    }

    fn calc_decay_factor(&self) -> f32x4 {
        let fs = self.fs;
        map_lanes(self.t60, |t60| libm::powf(0.001, 1.0 / (t60 * fs)))
    }

    fn calc_osc_coef(&mut self) {
        let w = self.freq / f32x4::splat(self.fs) * f32x4::splat(core::f32::consts::TAU);
        self.osc_re = map_lanes(w, libm::cosf);
        self.osc_im = map_lanes(w, libm::sinf);
    }
}

impl Default for VecModalFilter {
    fn default() -> Self {
        Self::new()
    }
}
