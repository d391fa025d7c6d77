//! Second-order (biquad) filters, one type per analog prototype.
//!
//! Each type owns a [`SecondOrderIir`] and a `calc_coefs` that designs it.
//! Peaking and shelf filters take linear gain; the `calc_coefs_db` adapters
//! on scalar types convert from dB first.

use super::coefficients::{
    high_shelf, high_shelf_matched, low_shelf, low_shelf_matched, notch, peaking,
    peaking_matched, second_order_bpf, second_order_hpf, second_order_hpf_matched,
    second_order_lpf, second_order_lpf_matched,
};
use super::iir::SecondOrderIir;
use crate::math::db_to_gain;
use crate::sample::{Float, Sample};

/// 12 dB/oct lowpass.
///
/// # Example
///
/// ```rust
/// use tonal_core::filters::SecondOrderLpf;
///
/// let mut lpf = SecondOrderLpf::<f32>::new();
/// lpf.calc_coefs(500.0, 0.7071, 48000.0);
/// let y = lpf.process_sample(1.0, 0);
/// assert!(y > 0.0 && y < 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct SecondOrderLpf<S> {
    iir: SecondOrderIir<S>,
}

impl_iir_wrapper!(SecondOrderLpf, 2);

impl<S: Sample> SecondOrderLpf<S> {
    /// Designs the filter.
    #[inline]
    pub fn calc_coefs(&mut self, fc: S, q: S, fs: S::Scalar) {
        self.iir.set_coefs(&second_order_lpf(fc, q, fs));
    }

    /// Designs the filter, pre-warped at `matched_fc`.
    #[inline]
    pub fn calc_coefs_matched(&mut self, fc: S, q: S, fs: S::Scalar, matched_fc: S) {
        self.iir
            .set_coefs(&second_order_lpf_matched(fc, q, fs, matched_fc));
    }
}

/// 12 dB/oct highpass.
#[derive(Debug, Clone)]
pub struct SecondOrderHpf<S> {
    iir: SecondOrderIir<S>,
}

impl_iir_wrapper!(SecondOrderHpf, 2);

impl<S: Sample> SecondOrderHpf<S> {
    /// Designs the filter.
    #[inline]
    pub fn calc_coefs(&mut self, fc: S, q: S, fs: S::Scalar) {
        self.iir.set_coefs(&second_order_hpf(fc, q, fs));
    }

    /// Designs the filter, pre-warped at `matched_fc`.
    #[inline]
    pub fn calc_coefs_matched(&mut self, fc: S, q: S, fs: S::Scalar, matched_fc: S) {
        self.iir
            .set_coefs(&second_order_hpf_matched(fc, q, fs, matched_fc));
    }
}

/// Constant-peak bandpass (0 dB at `fc`).
#[derive(Debug, Clone)]
pub struct SecondOrderBpf<S> {
    iir: SecondOrderIir<S>,
}

impl_iir_wrapper!(SecondOrderBpf, 2);

impl<S: Sample> SecondOrderBpf<S> {
    /// Designs the filter.
    #[inline]
    pub fn calc_coefs(&mut self, fc: S, q: S, fs: S::Scalar) {
        self.iir.set_coefs(&second_order_bpf(fc, q, fs));
    }
}

/// Band-reject filter.
#[derive(Debug, Clone)]
pub struct NotchFilter<S> {
    iir: SecondOrderIir<S>,
}

impl_iir_wrapper!(NotchFilter, 2);

impl<S: Sample> NotchFilter<S> {
    /// Designs the filter.
    #[inline]
    pub fn calc_coefs(&mut self, fc: S, q: S, fs: S::Scalar) {
        self.iir.set_coefs(&notch(fc, q, fs));
    }
}

/// Bell (peaking) filter.
#[derive(Debug, Clone)]
pub struct PeakingFilter<S> {
    iir: SecondOrderIir<S>,
}

impl_iir_wrapper!(PeakingFilter, 2);

impl<S: Sample> PeakingFilter<S> {
    /// Designs the filter with a linear gain.
    #[inline]
    pub fn calc_coefs(&mut self, fc: S, q: S, gain: S, fs: S::Scalar) {
        self.iir.set_coefs(&peaking(fc, q, gain, fs));
    }

    /// Designs the filter, pre-warped at `matched_fc`.
    #[inline]
    pub fn calc_coefs_matched(&mut self, fc: S, q: S, gain: S, fs: S::Scalar, matched_fc: S) {
        self.iir
            .set_coefs(&peaking_matched(fc, q, gain, fs, matched_fc));
    }
}

impl<F: Float> PeakingFilter<F> {
    /// Designs the filter with a gain in dB.
    pub fn calc_coefs_db(&mut self, fc: F, q: F, gain_db: F, fs: F) {
        self.calc_coefs(fc, q, db_to_gain(gain_db), fs);
    }
}

/// Low shelf: `gain` below `fc`.
#[derive(Debug, Clone)]
pub struct LowShelfFilter<S> {
    iir: SecondOrderIir<S>,
}

impl_iir_wrapper!(LowShelfFilter, 2);

impl<S: Sample> LowShelfFilter<S> {
    /// Designs the filter with a linear gain.
    #[inline]
    pub fn calc_coefs(&mut self, fc: S, q: S, gain: S, fs: S::Scalar) {
        self.iir.set_coefs(&low_shelf(fc, q, gain, fs));
    }

    /// Designs the filter, pre-warped at `matched_fc`.
    #[inline]
    pub fn calc_coefs_matched(&mut self, fc: S, q: S, gain: S, fs: S::Scalar, matched_fc: S) {
        self.iir
            .set_coefs(&low_shelf_matched(fc, q, gain, fs, matched_fc));
    }
}

impl<F: Float> LowShelfFilter<F> {
    /// Designs the filter with a gain in dB.
    pub fn calc_coefs_db(&mut self, fc: F, q: F, gain_db: F, fs: F) {
        self.calc_coefs(fc, q, db_to_gain(gain_db), fs);
    }
}

/// High shelf: `gain` above `fc`.
#[derive(Debug, Clone)]
pub struct HighShelfFilter<S> {
    iir: SecondOrderIir<S>,
}

impl_iir_wrapper!(HighShelfFilter, 2);

impl<S: Sample> HighShelfFilter<S> {
    /// Designs the filter with a linear gain.
    #[inline]
    pub fn calc_coefs(&mut self, fc: S, q: S, gain: S, fs: S::Scalar) {
        self.iir.set_coefs(&high_shelf(fc, q, gain, fs));
    }

    /// Designs the filter, pre-warped at `matched_fc`.
    #[inline]
    pub fn calc_coefs_matched(&mut self, fc: S, q: S, gain: S, fs: S::Scalar, matched_fc: S) {
        self.iir
            .set_coefs(&high_shelf_matched(fc, q, gain, fs, matched_fc));
    }
}

impl<F: Float> HighShelfFilter<F> {
    /// Designs the filter with a gain in dB.
    pub fn calc_coefs_db(&mut self, fc: F, q: F, gain_db: F, fs: F) {
        self.calc_coefs(fc, q, db_to_gain(gain_db), fs);
    }
}
