//! Butterworth lowpass / highpass of runtime order.
//!
//! An order-`N` filter is built from `N / 2` second-order sections with the
//! Butterworth pole Q values, plus one first-order section when `N` is odd.
//! The user Q scales the lowest-Q stage by `q * sqrt(2)`, so `q = 0.7071`
//! gives the maximally flat response and larger values add a resonant bump
//! near the cutoff.

use core::f64::consts::{PI, SQRT_2};

use super::coefficients::{
    first_order_hpf, first_order_lpf, second_order_hpf, second_order_lpf,
};
use super::iir::{FirstOrderIir, SecondOrderIir};
use crate::buffer::Buffer;
use crate::sample::Sample;

/// Highest supported order.
pub const MAX_BUTTERWORTH_ORDER: usize = 16;

const MAX_SECTIONS: usize = MAX_BUTTERWORTH_ORDER / 2;

/// Response shape of a [`ButterworthFilter`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ButterworthKind {
    /// Passes frequencies below the cutoff.
    #[default]
    Lowpass,
    /// Passes frequencies above the cutoff.
    Highpass,
}

/// Butterworth Q of stage `stage` in an order-`order` filter, lowest first.
pub fn butterworth_q(order: usize, stage: usize) -> f64 {
    let n = order as f64;
    let k = stage as f64;
    let theta = if order % 2 == 0 {
        PI * (2.0 * k + 1.0) / (2.0 * n)
    } else {
        PI * (k + 1.0) / n
    };
    1.0 / (2.0 * libm::cos(theta))
}

/// Cascaded Butterworth filter, order 1 to [`MAX_BUTTERWORTH_ORDER`].
#[derive(Debug, Clone)]
pub struct ButterworthFilter<S> {
    kind: ButterworthKind,
    order: usize,
    sections: [SecondOrderIir<S>; MAX_SECTIONS],
    first_order: FirstOrderIir<S>,
}

impl<S: Sample> ButterworthFilter<S> {
    /// Creates a passthrough filter. `order` is clamped to `1..=16`.
    pub fn new(kind: ButterworthKind, order: usize) -> Self {
        Self {
            kind,
            order: order.clamp(1, MAX_BUTTERWORTH_ORDER),
            sections: core::array::from_fn(|_| SecondOrderIir::new()),
            first_order: FirstOrderIir::new(),
        }
    }

    /// Response shape.
    pub fn kind(&self) -> ButterworthKind {
        self.kind
    }

    /// Filter order.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Changes the order (clamped to `1..=16`) and clears state.
    ///
    /// Call `calc_coefs` afterwards.
    pub fn set_order(&mut self, order: usize) {
        self.order = order.clamp(1, MAX_BUTTERWORTH_ORDER);
        #[cfg(feature = "tracing")]
        tracing::debug!(requested = order, order = self.order, "butterworth: set order");
        self.reset();
    }

    fn num_sections(&self) -> usize {
        self.order / 2
    }

    fn has_first_order(&self) -> bool {
        self.order % 2 == 1
    }

    /// Allocates per-channel state for every section.
    pub fn prepare(&mut self, num_channels: usize) {
        for section in &mut self.sections {
            section.prepare(num_channels);
        }
        self.first_order.prepare(num_channels);
    }

    /// Zeroes the state of every section.
    pub fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
        self.first_order.reset();
    }

    /// Designs every section for cutoff `fc` and resonance `q`.
    pub fn calc_coefs(&mut self, fc: S, q: S, fs: S::Scalar) {
        let kind = self.kind;
        let order = self.order;
        for (stage, section) in self.sections[..order / 2].iter_mut().enumerate() {
            let mut stage_q = S::splat_f64(butterworth_q(order, stage));
            if stage == 0 {
                stage_q = stage_q * q * S::splat_f64(SQRT_2);
            }
            let coefs = match kind {
                ButterworthKind::Lowpass => second_order_lpf(fc, stage_q, fs),
                ButterworthKind::Highpass => second_order_hpf(fc, stage_q, fs),
            };
            section.set_coefs(&coefs);
        }

        if self.has_first_order() {
            let coefs = match kind {
                ButterworthKind::Lowpass => first_order_lpf(fc, fs),
                ButterworthKind::Highpass => first_order_hpf(fc, fs),
            };
            self.first_order.set_coefs(&coefs);
        }
    }

    /// Processes one sample on `channel`.
    #[inline]
    pub fn process_sample(&mut self, x: S, channel: usize) -> S {
        let num_sections = self.num_sections();
        let mut y = x;
        for section in &mut self.sections[..num_sections] {
            y = section.process_sample(y, channel);
        }
        if self.has_first_order() {
            y = self.first_order.process_sample(y, channel);
        }
        y
    }

    /// Processes every active channel of `buffer` in place.
    pub fn process_block(&mut self, buffer: &mut Buffer<S>) {
        let num_sections = self.num_sections();
        for section in &mut self.sections[..num_sections] {
            section.process_block(buffer);
        }
        if self.has_first_order() {
            self.first_order.process_block(buffer);
        }
    }
}

impl<S: Sample> Default for ButterworthFilter<S> {
    fn default() -> Self {
        Self::new(ButterworthKind::Lowpass, 2)
    }
}
