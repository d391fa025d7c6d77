//! Second-order section cascades with finite transmission zeros.
//!
//! Chebyshev type II and elliptic filters put their zeros on the imaginary
//! axis, so every section is a lowpass and a highpass sharing one
//! denominator:
//!
//! ```text
//! H(s) = (s^2 + g) / (s^2 + s / Q + 1)     (lowpass, s scaled by w0)
//! ```
//!
//! where `g` is the squared ratio of zero to pole radius. Each section is
//! described by a [`SectionDesign`] computed once from the analog prototype;
//! `calc_coefs` only maps those onto the requested cutoff, so it is cheap
//! enough to run per sample.

use super::coefficients::{second_order_hpf_matched, second_order_lpf_matched};
use super::conformal::Coefficients;
use super::iir::SecondOrderIir;
use crate::buffer::Buffer;
use crate::sample::Sample;

/// Highest supported order for zero/pole cascades.
pub const MAX_CASCADE_ORDER: usize = 16;

const MAX_SECTIONS: usize = MAX_CASCADE_ORDER / 2;

/// Response shape of a zero/pole cascade.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CascadeKind {
    /// Passes frequencies below the cutoff.
    #[default]
    Lowpass,
    /// Passes frequencies above the cutoff.
    Highpass,
}

/// One second-order section of a normalised prototype.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SectionDesign {
    /// Pole radius relative to the cutoff.
    pub freq_offset: f64,
    /// Pole quality factor.
    pub q: f64,
    /// Gain of the lowpass branch, `(|zero| / |pole|)^2`.
    pub lp_gain: f64,
}

impl SectionDesign {
    /// Section for the analog pole `pole_re + j pole_im` and the zero at
    /// `j zero_im`, with the pole radius scaled by `shift`.
    pub fn from_zero_pole(pole_re: f64, pole_im: f64, zero_im: f64, shift: f64) -> Self {
        let radius = libm::hypot(pole_re, pole_im);
        Self {
            freq_offset: radius * shift,
            q: radius / (2.0 * libm::fabs(pole_re)),
            lp_gain: (zero_im * zero_im) / (radius * radius),
        }
    }
}

/// Rounds `order` into `2..=MAX_CASCADE_ORDER`, odd values up.
pub(crate) fn even_order(order: usize) -> usize {
    let order = order.clamp(2, MAX_CASCADE_ORDER);
    order + order % 2
}

/// Cascade of up to eight sections sharing one cutoff.
#[derive(Debug, Clone)]
pub(crate) struct SectionCascade<S> {
    kind: CascadeKind,
    order: usize,
    designs: [SectionDesign; MAX_SECTIONS],
    sections: [SecondOrderIir<S>; MAX_SECTIONS],
}

impl<S: Sample> SectionCascade<S> {
    /// `designs` must hold `order / 2` entries.
    pub(crate) fn new(kind: CascadeKind, order: usize, designs: &[SectionDesign]) -> Self {
        let mut cascade = Self {
            kind,
            order,
            designs: [SectionDesign::default(); MAX_SECTIONS],
            sections: core::array::from_fn(|_| SecondOrderIir::new()),
        };
        cascade.set_designs(order, designs);
        cascade
    }

    pub(crate) fn kind(&self) -> CascadeKind {
        self.kind
    }

    pub(crate) fn order(&self) -> usize {
        self.order
    }

    pub(crate) fn num_sections(&self) -> usize {
        self.order / 2
    }

    pub(crate) fn designs(&self) -> &[SectionDesign] {
        &self.designs[..self.num_sections()]
    }

    /// Replaces the prototype and clears state.
    pub(crate) fn set_designs(&mut self, order: usize, designs: &[SectionDesign]) {
        debug_assert_eq!(designs.len(), order / 2);
        self.order = order;
        self.designs = [SectionDesign::default(); MAX_SECTIONS];
        self.designs[..designs.len()].copy_from_slice(designs);
        self.reset();
    }

    pub(crate) fn prepare(&mut self, num_channels: usize) {
        for section in &mut self.sections {
            section.prepare(num_channels);
        }
    }

    pub(crate) fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
    }

    /// Places every section relative to `fc`.
    ///
    /// The user Q scales section `resonant` by `q * sqrt(2)`, and the first
    /// section's numerator is scaled by `stopband_gain` to bring the
    /// passband back to unity.
    pub(crate) fn calc_coefs(
        &mut self,
        fc: S,
        q: S,
        fs: S::Scalar,
        stopband_gain: f64,
        resonant: usize,
    ) {
        let kind = self.kind;
        let num_sections = self.num_sections();
        let sections = self.sections[..num_sections].iter_mut();
        for (index, (section, design)) in sections.zip(&self.designs).enumerate() {
            let mut stage_q = S::splat_f64(design.q);
            if index == resonant {
                stage_q = stage_q * q * S::splat_f64(core::f64::consts::SQRT_2);
            }
            let offset = S::splat_f64(design.freq_offset);
            let lp_gain = S::splat_f64(design.lp_gain);

            let (plain, scaled) = match kind {
                CascadeKind::Lowpass => {
                    let stage_fc = fc * offset;
                    (
                        second_order_hpf_matched(stage_fc, stage_q, fs, fc),
                        second_order_lpf_matched(stage_fc, stage_q, fs, fc),
                    )
                }
                CascadeKind::Highpass => {
                    let stage_fc = fc / offset;
                    (
                        second_order_lpf_matched(stage_fc, stage_q, fs, fc),
                        second_order_hpf_matched(stage_fc, stage_q, fs, fc),
                    )
                }
            };

            let scale = if index == 0 { S::splat_f64(stopband_gain) } else { S::splat_f64(1.0) };
            let b = core::array::from_fn(|i| (plain.b[i] + lp_gain * scaled.b[i]) * scale);
            section.set_coefs(&Coefficients { b, a: plain.a });
        }
    }

    #[inline]
    pub(crate) fn process_sample(&mut self, x: S, channel: usize) -> S {
        let num_sections = self.num_sections();
        self.sections[..num_sections]
            .iter_mut()
            .fold(x, |y, section| section.process_sample(y, channel))
    }

    pub(crate) fn process_block(&mut self, buffer: &mut Buffer<S>) {
        let num_sections = self.num_sections();
        for section in &mut self.sections[..num_sections] {
            section.process_block(buffer);
        }
    }
}
