//! Chebyshev type II lowpass / highpass of runtime (even) order.
//!
//! The passband is maximally flat and the stopband is equiripple at a fixed
//! attenuation. By default the cutoff is the natural `-3 dB` point; with
//! [`ChebyshevIIFilter::with_stopband_edge`] it marks where the stopband
//! starts instead. The user Q scales the first section by `q * sqrt(2)`.

use super::cascade::{CascadeKind, MAX_CASCADE_ORDER, SectionCascade, SectionDesign, even_order};
use crate::buffer::Buffer;
use crate::sample::Sample;

/// Stopband attenuation used by [`ChebyshevIIFilter::new`].
pub const DEFAULT_STOPBAND_DB: f64 = 60.0;

const MAX_SECTIONS: usize = MAX_CASCADE_ORDER / 2;

/// Prototype sections for an order-`order` filter with `stopband_db` of
/// attenuation, normalised to the stopband edge.
///
/// `shift` rescales the pole radii; pass [`natural_cutoff_shift`] to put the
/// `-3 dB` point at the cutoff.
pub fn chebyshev2_sections(
    order: usize,
    stopband_db: f64,
    shift: f64,
) -> [SectionDesign; MAX_SECTIONS] {
    let n = order as f64;
    let ripple = 1.0 / libm::sqrt(libm::pow(10.0, 0.1 * stopband_db) - 1.0);
    let mu = libm::asinh(1.0 / ripple) / n;
    let (sinh_mu, cosh_mu) = (libm::sinh(mu), libm::cosh(mu));
    let step = core::f64::consts::PI / (2.0 * n);

    let mut designs = [SectionDesign::default(); MAX_SECTIONS];
    for (i, design) in designs[..order / 2].iter_mut().enumerate() {
        let k = (2 * i + 1) as f64;
        let re = sinh_mu * libm::cos((k - n) * step);
        let im = cosh_mu * libm::sin((k - n) * step);
        let d2 = re * re + im * im;
        let zero = 1.0 / libm::cos(k * step);
        *design = SectionDesign::from_zero_pole(re / d2, im / d2, zero, shift);
    }
    designs
}

/// Ratio of stopband edge to `-3 dB` frequency.
pub fn natural_cutoff_shift(order: usize, stopband_db: f64) -> f64 {
    let g_pass = libm::pow(10.0, 0.3);
    let g_stop = libm::pow(10.0, 0.1 * stopband_db);
    libm::cosh(libm::acosh(libm::sqrt((g_stop - 1.0) / (g_pass - 1.0))) / order as f64)
}

/// Cascaded Chebyshev type II filter, even order 2 to 16.
#[derive(Debug, Clone)]
pub struct ChebyshevIIFilter<S> {
    cascade: SectionCascade<S>,
    stopband_db: f64,
    natural_cutoff: bool,
}

impl<S: Sample> ChebyshevIIFilter<S> {
    /// Creates a filter with 60 dB of stopband attenuation and the cutoff at
    /// `-3 dB`. Odd orders round up; the result is clamped to `2..=16`.
    pub fn new(kind: CascadeKind, order: usize) -> Self {
        Self::build(kind, order, DEFAULT_STOPBAND_DB, true)
    }

    /// Like [`new`](Self::new) with the cutoff at the start of a stopband of
    /// `stopband_db` attenuation.
    pub fn with_stopband_edge(kind: CascadeKind, order: usize, stopband_db: f64) -> Self {
        Self::build(kind, order, stopband_db, false)
    }

    fn build(kind: CascadeKind, order: usize, stopband_db: f64, natural_cutoff: bool) -> Self {
        let order = even_order(order);
        let designs = Self::design(order, stopband_db, natural_cutoff);
        Self {
            cascade: SectionCascade::new(kind, order, &designs[..order / 2]),
            stopband_db,
            natural_cutoff,
        }
    }

    fn design(
        order: usize,
        stopband_db: f64,
        natural_cutoff: bool,
    ) -> [SectionDesign; MAX_SECTIONS] {
        let shift = if natural_cutoff {
            natural_cutoff_shift(order, stopband_db)
        } else {
            1.0
        };
        chebyshev2_sections(order, stopband_db, shift)
    }

    /// Response shape.
    pub fn kind(&self) -> CascadeKind {
        self.cascade.kind()
    }

    /// Filter order.
    pub fn order(&self) -> usize {
        self.cascade.order()
    }

    /// Stopband attenuation in dB.
    pub fn stopband_db(&self) -> f64 {
        self.stopband_db
    }

    /// Prototype sections in processing order.
    pub fn sections(&self) -> &[SectionDesign] {
        self.cascade.designs()
    }

    /// Changes the order (even, clamped to `2..=16`) and clears state.
    ///
    /// Call `calc_coefs` afterwards.
    pub fn set_order(&mut self, order: usize) {
        let order = even_order(order);
        let designs = Self::design(order, self.stopband_db, self.natural_cutoff);
        #[cfg(feature = "tracing")]
        tracing::debug!(order, stopband_db = self.stopband_db, "chebyshev: set order");
        self.cascade.set_designs(order, &designs[..order / 2]);
    }

    /// Allocates per-channel state for every section.
    pub fn prepare(&mut self, num_channels: usize) {
        self.cascade.prepare(num_channels);
    }

    /// Zeroes the state of every section.
    pub fn reset(&mut self) {
        self.cascade.reset();
    }

    /// Designs every section for cutoff `fc` and resonance `q`.
    pub fn calc_coefs(&mut self, fc: S, q: S, fs: S::Scalar) {
        let stopband_gain = libm::pow(10.0, -self.stopband_db / 20.0);
        self.cascade.calc_coefs(fc, q, fs, stopband_gain, 0);
    }

    /// Processes one sample on `channel`.
    #[inline]
    pub fn process_sample(&mut self, x: S, channel: usize) -> S {
        self.cascade.process_sample(x, channel)
    }

    /// Processes every active channel of `buffer` in place.
    pub fn process_block(&mut self, buffer: &mut Buffer<S>) {
        self.cascade.process_block(buffer);
    }
}

impl<S: Sample> Default for ChebyshevIIFilter<S> {
    fn default() -> Self {
        Self::new(CascadeKind::Lowpass, 4)
    }
}
