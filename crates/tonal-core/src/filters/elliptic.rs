//! Elliptic (Cauer) lowpass / highpass of runtime (even) order.
//!
//! Equiripple in both bands: the passband stays within the ripple and the
//! stopband below the attenuation, giving the narrowest transition band of
//! any filter of the same order. The cutoff marks the end of the passband.
//! The user Q scales the last (highest-Q) section by `q * sqrt(2)`.
//!
//! The prototype needs Jacobi elliptic functions. They are evaluated here
//! in `f64` with the arithmetic-geometric mean and Carlson's symmetric form,
//! once per design rather than per sample.

use core::f64::consts::PI;

use super::cascade::{CascadeKind, MAX_CASCADE_ORDER, SectionCascade, SectionDesign, even_order};
use crate::buffer::Buffer;
use crate::sample::Sample;

/// Stopband attenuation used by [`EllipticFilter::new`].
pub const DEFAULT_ELLIPTIC_STOPBAND_DB: f64 = 60.0;

/// Passband ripple used by [`EllipticFilter::new`].
pub const DEFAULT_PASSBAND_RIPPLE_DB: f64 = 0.1;

const MAX_SECTIONS: usize = MAX_CASCADE_ORDER / 2;
const MAX_ITERATIONS: usize = 32;

/// Complete elliptic integral of the first kind, `K(k)`, for modulus `k`.
fn complete_k(k: f64) -> f64 {
    let mut a = 1.0;
    let mut b = libm::sqrt(1.0 - k * k);
    for _ in 0..MAX_ITERATIONS {
        if a - b <= f64::EPSILON * a {
            break;
        }
        (a, b) = (0.5 * (a + b), libm::sqrt(a * b));
    }
    PI / (2.0 * a)
}

/// Carlson's symmetric integral `R_F(x, y, z)`.
fn carlson_rf(mut x: f64, mut y: f64, mut z: f64) -> f64 {
    let mut mean = (x + y + z) / 3.0;
    let (mut dx, mut dy, mut dz) = (0.0, 0.0, 0.0);
    for _ in 0..MAX_ITERATIONS {
        let (sx, sy, sz) = (libm::sqrt(x), libm::sqrt(y), libm::sqrt(z));
        let lambda = sx * sy + sy * sz + sz * sx;
        x = 0.25 * (x + lambda);
        y = 0.25 * (y + lambda);
        z = 0.25 * (z + lambda);
        mean = (x + y + z) / 3.0;
        dx = 1.0 - x / mean;
        dy = 1.0 - y / mean;
        dz = 1.0 - z / mean;
        if libm::fabs(dx).max(libm::fabs(dy)).max(libm::fabs(dz)) < 1.0e-3 {
            break;
        }
    }
    let e2 = dx * dy - dz * dz;
    let e3 = dx * dy * dz;
    (1.0 - e2 / 10.0 + e3 / 14.0 + e2 * e2 / 24.0 - 3.0 * e2 * e3 / 44.0) / libm::sqrt(mean)
}

/// Incomplete elliptic integral of the first kind, `F(phi | m)`, for
/// `0 <= phi <= pi / 2`.
fn incomplete_f(phi: f64, m: f64) -> f64 {
    let (s, c) = (libm::sin(phi), libm::cos(phi));
    s * carlson_rf(c * c, 1.0 - m * s * s, 1.0)
}

/// Jacobi elliptic functions `(sn, cn, dn)` of `u` with parameter `m`.
fn jacobi(u: f64, m: f64) -> (f64, f64, f64) {
    if m >= 1.0 {
        let sech = 1.0 / libm::cosh(u);
        return (libm::tanh(u), sech, sech);
    }

    // Descending Landen sequence, then back-substitute the amplitude
    let mut a = [0.0; MAX_ITERATIONS + 1];
    let mut c = [0.0; MAX_ITERATIONS + 1];
    a[0] = 1.0;
    c[0] = libm::sqrt(m);
    let mut b = libm::sqrt(1.0 - m);
    let mut n = 0;
    while n < MAX_ITERATIONS && libm::fabs(c[n]) > f64::EPSILON * a[n] {
        a[n + 1] = 0.5 * (a[n] + b);
        c[n + 1] = 0.5 * (a[n] - b);
        b = libm::sqrt(a[n] * b);
        n += 1;
    }

    let mut phi = libm::scalbn(a[n] * u, n as i32);
    for i in (1..=n).rev() {
        phi = 0.5 * (phi + libm::asin(c[i] * libm::sin(phi) / a[i]));
    }
    let sn = libm::sin(phi);
    (sn, libm::cos(phi), libm::sqrt(1.0 - m * sn * sn))
}

/// Solves the degree equation `n K(m) / K'(m) = K(m1) / K'(m1)` for the
/// selectivity parameter `m`, using nome series.
fn degree(n: f64, m1: f64) -> f64 {
    let k1 = complete_k(libm::sqrt(m1));
    let k1_prime = complete_k(libm::sqrt(1.0 - m1));
    let q = libm::pow(libm::exp(-PI * k1_prime / k1), 1.0 / n);

    let (mut num, mut den) = (0.0, 0.0);
    for i in 0..8 {
        let i = i as f64;
        num += libm::pow(q, i * (i + 1.0));
        den += libm::pow(q, (i + 1.0) * (i + 1.0));
    }
    16.0 * q * libm::pow(num / (1.0 + 2.0 * den), 4.0)
}

/// Prototype sections for an order-`order` elliptic filter normalised to
/// the passband edge.
pub fn elliptic_sections(
    order: usize,
    stopband_db: f64,
    ripple_db: f64,
) -> [SectionDesign; MAX_SECTIONS] {
    let n = order as f64;
    let eps_sq = libm::pow(10.0, 0.1 * ripple_db) - 1.0;
    let eps = libm::sqrt(eps_sq);
    let ck1_sq = eps_sq / (libm::pow(10.0, 0.1 * stopband_db) - 1.0);

    let val0 = complete_k(libm::sqrt(ck1_sq));
    let m = degree(n, ck1_sq);
    let capk = complete_k(libm::sqrt(m));

    // sc(v, 1 - m1) = 1 / eps  <=>  v = F(atan(1 / eps) | 1 - m1)
    let r = incomplete_f(libm::atan(1.0 / eps), 1.0 - ck1_sq);
    let v0 = capk * r / (n * val0);
    let (sv, cv, dv) = jacobi(v0, 1.0 - m);

    let mut designs = [SectionDesign::default(); MAX_SECTIONS];
    for (i, design) in designs[..order / 2].iter_mut().enumerate() {
        let (s, c, d) = jacobi((2 * i + 1) as f64 * capk / n, m);
        let zero = 1.0 / (libm::sqrt(m) * s);
        let den = (d * sv) * (d * sv) - 1.0;
        *design = SectionDesign::from_zero_pole(c * d * sv * cv / den, s * dv / den, zero, 1.0);
    }
    designs
}

/// Cascaded elliptic filter, even order 2 to 16.
#[derive(Debug, Clone)]
pub struct EllipticFilter<S> {
    cascade: SectionCascade<S>,
    stopband_db: f64,
    ripple_db: f64,
}

impl<S: Sample> EllipticFilter<S> {
    /// Creates a filter with 60 dB of stopband attenuation and 0.1 dB of
    /// passband ripple. Odd orders round up; the result is clamped to
    /// `2..=16`.
    pub fn new(kind: CascadeKind, order: usize) -> Self {
        Self::with_limits(kind, order, DEFAULT_ELLIPTIC_STOPBAND_DB, DEFAULT_PASSBAND_RIPPLE_DB)
    }

    /// Creates a filter with the given stopband attenuation and passband
    /// ripple, both positive dB values with `ripple_db < stopband_db`.
    pub fn with_limits(kind: CascadeKind, order: usize, stopband_db: f64, ripple_db: f64) -> Self {
        debug_assert!(ripple_db > 0.0 && ripple_db < stopband_db);
        let order = even_order(order);
        let designs = elliptic_sections(order, stopband_db, ripple_db);
        Self {
            cascade: SectionCascade::new(kind, order, &designs[..order / 2]),
            stopband_db,
            ripple_db,
        }
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

    /// Passband ripple in dB.
    pub fn ripple_db(&self) -> f64 {
        self.ripple_db
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
        let designs = elliptic_sections(order, self.stopband_db, self.ripple_db);
        #[cfg(feature = "tracing")]
        tracing::debug!(order, ripple_db = self.ripple_db, "elliptic: set order");
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
        let resonant = self.cascade.num_sections() - 1;
        self.cascade.calc_coefs(fc, q, fs, stopband_gain, resonant);
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

impl<S: Sample> Default for EllipticFilter<S> {
    fn default() -> Self {
        Self::new(CascadeKind::Lowpass, 4)
    }
}
