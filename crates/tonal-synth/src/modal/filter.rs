//! Scalar modal resonator.

use num_complex::Complex;
use tonal_core::Float;

/// `0.001`, i.e. -60 dB: the level a mode reaches after its T60.
const T60_LEVEL: f64 = 0.001;

/// Max Mathews phasor filter: a complex one-pole resonator tuned to a single
/// frequency.
///
/// ```text
/// y[n] = (d * e^(j w)) * y[n-1] + A * x[n]
/// out  = Im(y[n])
/// ```
///
/// `d = 0.001^(1 / (T60 fs))` makes the ring decay by 60 dB in `T60`
/// seconds. The complex amplitude `A` sets both the level and the phase of
/// the mode. The pole radius never exceeds one for a positive `T60`, so the
/// filter is unconditionally stable and tolerates parameter changes at
/// audio rate.
///
/// Reference: Mathews and Smith, "Methods for Synthesizing Very High Q
/// Parametrically Well Behaved Two Pole Filters" (SMAC 2003).
///
/// # Example
///
/// ```rust
/// use tonal_synth::ModalFilter;
///
/// let mut mode = ModalFilter::<f32>::new();
/// mode.prepare(48000.0);
/// mode.set_freq(440.0);
/// mode.set_decay(0.5);
/// mode.set_amp_polar(1.0, 0.0);
///
/// let first = mode.process_sample(1.0);
/// assert_eq!(first, 0.0); // the imaginary part of a real impulse
/// assert!(mode.process_sample(0.0) > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct ModalFilter<F> {
    filt_coef: Complex<F>,
    decay_factor: F,
    osc_coef: Complex<F>,
    y1: Complex<F>,

    freq: F,
    t60: F,
    amplitude: Complex<F>,
    fs: F,
}

impl<F: Float> ModalFilter<F> {
    /// Creates a silent resonator at 1 Hz, `T60 = 1 s`, 44.1 kHz.
    pub fn new() -> Self {
        let zero = Complex::new(F::zero(), F::zero());
        let mut filter = Self {
            filt_coef: zero,
            decay_factor: F::zero(),
            osc_coef: zero,
            y1: zero,
            freq: F::one(),
            t60: F::one(),
            amplitude: zero,
            fs: F::from_f64(44100.0),
        };
        filter.prepare(filter.fs);
        filter
    }

    /// Recomputes the coefficients for `sample_rate` and clears the state.
    pub fn prepare(&mut self, sample_rate: F) {
        self.fs = sample_rate;
        self.decay_factor = self.calc_decay_factor();
        self.osc_coef = self.calc_osc_coef();
        self.update_params();
        self.reset();
    }

    /// Clears the resonator state.
    #[inline]
    pub fn reset(&mut self) {
        self.y1 = Complex::new(F::zero(), F::zero());
    }

    /// Sets the complex amplitude.
    #[inline]
    pub fn set_amp(&mut self, amp: Complex<F>) {
        self.amplitude = amp;
    }

    /// Sets the amplitude from magnitude and phase (radians).
    #[inline]
    pub fn set_amp_polar(&mut self, amp: F, phase: F) {
        self.amplitude = Complex::new(amp * phase.cos(), amp * phase.sin());
    }

    /// Complex amplitude.
    pub fn amp(&self) -> Complex<F> {
        self.amplitude
    }

    /// Sets the decay time in seconds to -60 dB.
    #[inline]
    pub fn set_decay(&mut self, t60: F) {
        self.t60 = t60;
        self.decay_factor = self.calc_decay_factor();
        self.update_params();
    }

    /// Decay time in seconds.
    pub fn decay(&self) -> F {
        self.t60
    }

    /// Sets the resonant frequency in Hz.
    #[inline]
    pub fn set_freq(&mut self, freq: F) {
        self.freq = freq;
        self.osc_coef = self.calc_osc_coef();
        self.update_params();
    }

    /// Resonant frequency in Hz.
    #[inline]
    pub fn freq(&self) -> F {
        self.freq
    }

    /// Processes one sample and returns the imaginary part of the state.
    #[inline]
    pub fn process_sample(&mut self, x: F) -> F {
        let y = self.filt_coef * self.y1 + self.amplitude * x;
        self.y1 = y;
        y.im
    }

    /// Processes a slice in place.
    pub fn process_block(&mut self, block: &mut [F]) {
        for x in block.iter_mut() {
            *x = self.process_sample(*x);
        }
    }

    #[inline]
    fn update_params(&mut self) {
        self.filt_coef = self.osc_coef * self.decay_factor;
    }

    #[inline]
    fn calc_decay_factor(&self) -> F {
        F::from_f64(T60_LEVEL).powf(F::one() / (self.t60 * self.fs))
    }

    #[inline]
    fn calc_osc_coef(&self) -> Complex<F> {
        let w = F::from_f64(core::f64::consts::TAU) * (self.freq / self.fs);
        Complex::new(w.cos(), w.sin())
    }
}

impl<F: Float> Default for ModalFilter<F> {
    fn default() -> Self {
        Self::new()
    }
}
