//! First-order filters: 6 dB/oct lowpass, highpass and shelf.

use super::coefficients::{first_order_hpf, first_order_lpf, first_order_shelf};
use super::iir::FirstOrderIir;
use crate::math::db_to_gain;
use crate::sample::{Float, Sample};

/// One-pole lowpass.
#[derive(Debug, Clone)]
pub struct FirstOrderLpf<S> {
    iir: FirstOrderIir<S>,
}

impl_iir_wrapper!(FirstOrderLpf, 1);

impl<S: Sample> FirstOrderLpf<S> {
    /// Designs the filter for cutoff `fc` at sample rate `fs`.
    #[inline]
    pub fn calc_coefs(&mut self, fc: S, fs: S::Scalar) {
        self.iir.set_coefs(&first_order_lpf(fc, fs));
    }
}

/// One-pole highpass.
#[derive(Debug, Clone)]
pub struct FirstOrderHpf<S> {
    iir: FirstOrderIir<S>,
}

impl_iir_wrapper!(FirstOrderHpf, 1);

impl<S: Sample> FirstOrderHpf<S> {
    /// Designs the filter for cutoff `fc` at sample rate `fs`.
    #[inline]
    pub fn calc_coefs(&mut self, fc: S, fs: S::Scalar) {
        self.iir.set_coefs(&first_order_hpf(fc, fs));
    }
}

/// One-pole shelf between a low and a high gain.
#[derive(Debug, Clone)]
pub struct FirstOrderShelf<S> {
    iir: FirstOrderIir<S>,
}

impl_iir_wrapper!(FirstOrderShelf, 1);

impl<S: Sample> FirstOrderShelf<S> {
    /// Designs the shelf with linear gains.
    #[inline]
    pub fn calc_coefs(&mut self, low_gain: S, high_gain: S, fc: S, fs: S::Scalar) {
        self.iir
            .set_coefs(&first_order_shelf(low_gain, high_gain, fc, fs));
    }
}

impl<F: Float> FirstOrderShelf<F> {
    /// Designs the shelf with gains in dB.
    pub fn calc_coefs_db(&mut self, low_db: F, high_db: F, fc: F, fs: F) {
        self.calc_coefs(db_to_gain(low_db), db_to_gain(high_db), fc, fs);
    }
}
