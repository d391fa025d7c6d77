//! Bilinear transform with frequency pre-warping.
//!
//! Analog prototypes are written as polynomials in `s`, highest power first:
//! `H(s) = (bs[0] s^2 + bs[1] s + bs[2]) / (as[0] s^2 + as[1] s + as[2])`.
//! Substituting `s = K (z - 1) / (z + 1)` gives the digital section. `K` is
//! chosen by [`compute_k_value`] so the analog and digital responses agree
//! exactly at the design frequency.
//!
//! The results are always normalised so `a[0] == 1`; the IIR filters never
//! divide by it.

use crate::sample::Sample;

/// Feed-forward (`b`) and feed-back (`a`) coefficients of an `N - 1` order
/// section, with `a[0] == 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients<S, const N: usize> {
    /// Numerator, lowest delay first.
    pub b: [S; N],
    /// Denominator, lowest delay first. `a[0]` is always one.
    pub a: [S; N],
}

impl<S: Sample, const N: usize> Coefficients<S, N> {
    /// A section that passes its input through unchanged.
    pub fn identity() -> Self {
        let mut b = [S::default(); N];
        let mut a = [S::default(); N];
        b[0] = S::splat_f64(1.0);
        a[0] = S::splat_f64(1.0);
        Self { b, a }
    }

    /// A section that only scales its input.
    pub fn gain(gain: S) -> Self {
        let mut coefs = Self::identity();
        coefs.b[0] = gain;
        coefs
    }
}

impl<S: Sample, const N: usize> Default for Coefficients<S, N> {
    fn default() -> Self {
        Self::identity()
    }
}

/// Warping constant that maps analog `2 pi fc` onto digital `fc`.
///
/// `K = wc / tan(wc / (2 fs))`
#[inline]
pub fn compute_k_value<S: Sample>(fc: S, fs: S::Scalar) -> S {
    let wc = S::splat_f64(core::f64::consts::TAU) * fc;
    wc / (wc / S::splat(fs + fs)).tan()
}

/// Bilinear transform of a first-order prototype `[s, 1]`.
#[inline]
pub fn bilinear_first_order<S: Sample>(bs: [S; 2], a_s: [S; 2], k: S) -> Coefficients<S, 2> {
    let a0 = a_s[0] * k + a_s[1];
    Coefficients {
        b: [(bs[0] * k + bs[1]) / a0, (-bs[0] * k + bs[1]) / a0],
        a: [S::splat_f64(1.0), (-a_s[0] * k + a_s[1]) / a0],
    }
}

/// Bilinear transform of a second-order prototype `[s^2, s, 1]`.
#[inline]
pub fn bilinear_second_order<S: Sample>(bs: [S; 3], a_s: [S; 3], k: S) -> Coefficients<S, 3> {
    let two = S::splat_f64(2.0);
    let k_sq = k * k;
    let a0 = a_s[0] * k_sq + a_s[1] * k + a_s[2];
    let a0_inv = S::splat_f64(1.0) / a0;

    Coefficients {
        b: [
            (bs[0] * k_sq + bs[1] * k + bs[2]) * a0_inv,
            two * (bs[2] - bs[0] * k_sq) * a0_inv,
            (bs[0] * k_sq - bs[1] * k + bs[2]) * a0_inv,
        ],
        a: [
            S::splat_f64(1.0),
            two * (a_s[2] - a_s[0] * k_sq) * a0_inv,
            (a_s[0] * k_sq - a_s[1] * k + a_s[2]) * a0_inv,
        ],
    }
}
