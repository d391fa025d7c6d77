//! The filter alternatives an EQ band can switch between.

use tonal_core::filters::MAX_BUTTERWORTH_ORDER;
use tonal_core::{
    Buffer, ButterworthFilter, ButterworthKind, CascadeKind, ChebyshevIIFilter, EllipticFilter,
    FirstOrderHpf, FirstOrderLpf, Float, HighShelfFilter, LowShelfFilter, NotchFilter,
    PeakingFilter, SecondOrderBpf, SecondOrderHpf, SecondOrderLpf, StateVariableFilter, SvfMode,
};

/// Filter response offered by an EQ band.
///
/// Butterworth variants carry their order, clamped to
/// `1..=MAX_BUTTERWORTH_ORDER` when instantiated. Chebyshev and elliptic
/// orders are rounded up to even and clamped to `2..=MAX_CASCADE_ORDER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EqFilterKind {
    /// 6 dB/oct lowpass.
    FirstOrderLowpass,
    /// 6 dB/oct highpass.
    FirstOrderHighpass,
    /// 12 dB/oct biquad lowpass.
    SecondOrderLowpass,
    /// 12 dB/oct biquad highpass.
    SecondOrderHighpass,
    /// Biquad bandpass, unity at the centre.
    Bandpass,
    /// Biquad band-reject.
    Notch,
    /// Biquad peaking bell.
    Bell,
    /// Biquad low shelf.
    LowShelf,
    /// Biquad high shelf.
    HighShelf,
    /// State variable lowpass.
    SvfLowpass,
    /// State variable highpass.
    SvfHighpass,
    /// State variable bell.
    SvfBell,
    /// State variable notch.
    SvfNotch,
    /// State variable low shelf.
    SvfLowShelf,
    /// State variable high shelf.
    SvfHighShelf,
    /// Butterworth lowpass of the given order.
    ButterworthLowpass(usize),
    /// Butterworth highpass of the given order.
    ButterworthHighpass(usize),
    /// Chebyshev type II lowpass, `-3 dB` at the cutoff.
    ChebyshevLowpass(usize),
    /// Chebyshev type II highpass, `-3 dB` at the cutoff.
    ChebyshevHighpass(usize),
    /// Elliptic lowpass, passband ends at the cutoff.
    EllipticLowpass(usize),
    /// Elliptic highpass, passband starts at the cutoff.
    EllipticHighpass(usize),
}

impl EqFilterKind {
    /// True if the response depends on the band's Q.
    pub fn uses_q(self) -> bool {
        !matches!(self, Self::FirstOrderLowpass | Self::FirstOrderHighpass)
    }

    /// True if the response depends on the band's gain.
    pub fn uses_gain(self) -> bool {
        match self {
            Self::Bell | Self::LowShelf | Self::HighShelf => true,
            Self::SvfBell | Self::SvfLowShelf | Self::SvfHighShelf => true,
            _ => false,
        }
    }

    /// Short display name.
    pub fn label(self) -> &'static str {
        match self {
            Self::FirstOrderLowpass => "1-Pole LPF",
            Self::FirstOrderHighpass => "1-Pole HPF",
            Self::SecondOrderLowpass | Self::SvfLowpass => "2-Pole LPF",
            Self::SecondOrderHighpass | Self::SvfHighpass => "2-Pole HPF",
            Self::Bandpass => "Bandpass",
            Self::Notch | Self::SvfNotch => "Notch",
            Self::Bell | Self::SvfBell => "Bell",
            Self::LowShelf | Self::SvfLowShelf => "Low-Shelf",
            Self::HighShelf | Self::SvfHighShelf => "High-Shelf",
            Self::ButterworthLowpass(_) => "Butterworth LPF",
            Self::ButterworthHighpass(_) => "Butterworth HPF",
            Self::ChebyshevLowpass(_) => "Chebyshev LPF",
            Self::ChebyshevHighpass(_) => "Chebyshev HPF",
            Self::EllipticLowpass(_) => "Elliptic LPF",
            Self::EllipticHighpass(_) => "Elliptic HPF",
        }
    }
}

/// A live instance of one [`EqFilterKind`].
#[derive(Debug, Clone)]
pub enum EqFilter<F> {
    /// First-order lowpass.
    FirstOrderLowpass(FirstOrderLpf<F>),
    /// First-order highpass.
    FirstOrderHighpass(FirstOrderHpf<F>),
    /// Biquad lowpass.
    SecondOrderLowpass(SecondOrderLpf<F>),
    /// Biquad highpass.
    SecondOrderHighpass(SecondOrderHpf<F>),
    /// Biquad bandpass.
    Bandpass(SecondOrderBpf<F>),
    /// Biquad notch.
    Notch(NotchFilter<F>),
    /// Biquad bell.
    Bell(PeakingFilter<F>),
    /// Biquad low shelf.
    LowShelf(LowShelfFilter<F>),
    /// Biquad high shelf.
    HighShelf(HighShelfFilter<F>),
    /// Any state variable response.
    Svf(StateVariableFilter<F>),
    /// Butterworth cascade.
    Butterworth(ButterworthFilter<F>),
    /// Chebyshev type II cascade.
    Chebyshev(ChebyshevIIFilter<F>),
    /// Elliptic cascade.
    Elliptic(EllipticFilter<F>),
}

impl<F: Float> EqFilter<F> {
    /// A passthrough instance of `kind`.
    pub fn new(kind: EqFilterKind) -> Self {
        let order = |n: usize| n.clamp(1, MAX_BUTTERWORTH_ORDER);
        match kind {
            EqFilterKind::FirstOrderLowpass => Self::FirstOrderLowpass(FirstOrderLpf::new()),
            EqFilterKind::FirstOrderHighpass => Self::FirstOrderHighpass(FirstOrderHpf::new()),
            EqFilterKind::SecondOrderLowpass => Self::SecondOrderLowpass(SecondOrderLpf::new()),
            EqFilterKind::SecondOrderHighpass => {
                Self::SecondOrderHighpass(SecondOrderHpf::new())
            }
            EqFilterKind::Bandpass => Self::Bandpass(SecondOrderBpf::new()),
            EqFilterKind::Notch => Self::Notch(NotchFilter::new()),
            EqFilterKind::Bell => Self::Bell(PeakingFilter::new()),
            EqFilterKind::LowShelf => Self::LowShelf(LowShelfFilter::new()),
            EqFilterKind::HighShelf => Self::HighShelf(HighShelfFilter::new()),
            EqFilterKind::SvfLowpass => Self::Svf(StateVariableFilter::new(SvfMode::Lowpass)),
            EqFilterKind::SvfHighpass => Self::Svf(StateVariableFilter::new(SvfMode::Highpass)),
            EqFilterKind::SvfBell => Self::Svf(StateVariableFilter::new(SvfMode::Bell)),
            EqFilterKind::SvfNotch => Self::Svf(StateVariableFilter::new(SvfMode::Notch)),
            EqFilterKind::SvfLowShelf => Self::Svf(StateVariableFilter::new(SvfMode::LowShelf)),
            EqFilterKind::SvfHighShelf => {
                Self::Svf(StateVariableFilter::new(SvfMode::HighShelf))
            }
            EqFilterKind::ButterworthLowpass(n) => {
                Self::Butterworth(ButterworthFilter::new(ButterworthKind::Lowpass, order(n)))
            }
            EqFilterKind::ButterworthHighpass(n) => {
                Self::Butterworth(ButterworthFilter::new(ButterworthKind::Highpass, order(n)))
            }
            EqFilterKind::ChebyshevLowpass(n) => {
                Self::Chebyshev(ChebyshevIIFilter::new(CascadeKind::Lowpass, n))
            }
            EqFilterKind::ChebyshevHighpass(n) => {
                Self::Chebyshev(ChebyshevIIFilter::new(CascadeKind::Highpass, n))
            }
            EqFilterKind::EllipticLowpass(n) => {
                Self::Elliptic(EllipticFilter::new(CascadeKind::Lowpass, n))
            }
            EqFilterKind::EllipticHighpass(n) => {
                Self::Elliptic(EllipticFilter::new(CascadeKind::Highpass, n))
            }
        }
    }

    /// The kind this instance was built from.
    pub fn kind(&self) -> EqFilterKind {
        match self {
            Self::FirstOrderLowpass(_) => EqFilterKind::FirstOrderLowpass,
            Self::FirstOrderHighpass(_) => EqFilterKind::FirstOrderHighpass,
            Self::SecondOrderLowpass(_) => EqFilterKind::SecondOrderLowpass,
            Self::SecondOrderHighpass(_) => EqFilterKind::SecondOrderHighpass,
            Self::Bandpass(_) => EqFilterKind::Bandpass,
            Self::Notch(_) => EqFilterKind::Notch,
            Self::Bell(_) => EqFilterKind::Bell,
            Self::LowShelf(_) => EqFilterKind::LowShelf,
            Self::HighShelf(_) => EqFilterKind::HighShelf,
            Self::Svf(f) => match f.mode() {
                SvfMode::Lowpass => EqFilterKind::SvfLowpass,
                SvfMode::Highpass => EqFilterKind::SvfHighpass,
                SvfMode::Notch => EqFilterKind::SvfNotch,
                SvfMode::LowShelf => EqFilterKind::SvfLowShelf,
                SvfMode::HighShelf => EqFilterKind::SvfHighShelf,
                SvfMode::Bell | SvfMode::Bandpass | SvfMode::Allpass => EqFilterKind::SvfBell,
            },
            Self::Butterworth(f) => match f.kind() {
                ButterworthKind::Lowpass => EqFilterKind::ButterworthLowpass(f.order()),
                ButterworthKind::Highpass => EqFilterKind::ButterworthHighpass(f.order()),
            },
            Self::Chebyshev(f) => match f.kind() {
                CascadeKind::Lowpass => EqFilterKind::ChebyshevLowpass(f.order()),
                CascadeKind::Highpass => EqFilterKind::ChebyshevHighpass(f.order()),
            },
            Self::Elliptic(f) => match f.kind() {
                CascadeKind::Lowpass => EqFilterKind::EllipticLowpass(f.order()),
                CascadeKind::Highpass => EqFilterKind::EllipticHighpass(f.order()),
            },
        }
    }

    /// Allocates per-channel state.
    pub fn prepare(&mut self, num_channels: usize) {
        match self {
            Self::FirstOrderLowpass(f) => f.prepare(num_channels),
            Self::FirstOrderHighpass(f) => f.prepare(num_channels),
            Self::SecondOrderLowpass(f) => f.prepare(num_channels),
            Self::SecondOrderHighpass(f) => f.prepare(num_channels),
            Self::Bandpass(f) => f.prepare(num_channels),
            Self::Notch(f) => f.prepare(num_channels),
            Self::Bell(f) => f.prepare(num_channels),
            Self::LowShelf(f) => f.prepare(num_channels),
            Self::HighShelf(f) => f.prepare(num_channels),
            Self::Svf(f) => f.prepare(num_channels),
            Self::Butterworth(f) => f.prepare(num_channels),
            Self::Chebyshev(f) => f.prepare(num_channels),
            Self::Elliptic(f) => f.prepare(num_channels),
        }
    }

    /// Zeroes the filter state.
    pub fn reset(&mut self) {
        match self {
            Self::FirstOrderLowpass(f) => f.reset(),
            Self::FirstOrderHighpass(f) => f.reset(),
            Self::SecondOrderLowpass(f) => f.reset(),
            Self::SecondOrderHighpass(f) => f.reset(),
            Self::Bandpass(f) => f.reset(),
            Self::Notch(f) => f.reset(),
            Self::Bell(f) => f.reset(),
            Self::LowShelf(f) => f.reset(),
            Self::HighShelf(f) => f.reset(),
            Self::Svf(f) => f.reset(),
            Self::Butterworth(f) => f.reset(),
            Self::Chebyshev(f) => f.reset(),
            Self::Elliptic(f) => f.reset(),
        }
    }

    /// Designs the filter. Parameters the kind does not use are ignored;
    /// `gain` is linear.
    pub fn calc_coefs(&mut self, fc: F, q: F, gain: F, fs: F) {
        match self {
            Self::FirstOrderLowpass(f) => f.calc_coefs(fc, fs),
            Self::FirstOrderHighpass(f) => f.calc_coefs(fc, fs),
            Self::SecondOrderLowpass(f) => f.calc_coefs(fc, q, fs),
            Self::SecondOrderHighpass(f) => f.calc_coefs(fc, q, fs),
            Self::Bandpass(f) => f.calc_coefs(fc, q, fs),
            Self::Notch(f) => f.calc_coefs(fc, q, fs),
            Self::Bell(f) => f.calc_coefs(fc, q, gain, fs),
            Self::LowShelf(f) => f.calc_coefs(fc, q, gain, fs),
            Self::HighShelf(f) => f.calc_coefs(fc, q, gain, fs),
            Self::Svf(f) => f.calc_coefs(fc, q, gain, fs),
            Self::Butterworth(f) => f.calc_coefs(fc, q, fs),
            Self::Chebyshev(f) => f.calc_coefs(fc, q, fs),
            Self::Elliptic(f) => f.calc_coefs(fc, q, fs),
        }
    }

    /// Processes one sample on `channel`.
    #[inline]
    pub fn process_sample(&mut self, x: F, channel: usize) -> F {
        match self {
            Self::FirstOrderLowpass(f) => f.process_sample(x, channel),
            Self::FirstOrderHighpass(f) => f.process_sample(x, channel),
            Self::SecondOrderLowpass(f) => f.process_sample(x, channel),
            Self::SecondOrderHighpass(f) => f.process_sample(x, channel),
            Self::Bandpass(f) => f.process_sample(x, channel),
            Self::Notch(f) => f.process_sample(x, channel),
            Self::Bell(f) => f.process_sample(x, channel),
            Self::LowShelf(f) => f.process_sample(x, channel),
            Self::HighShelf(f) => f.process_sample(x, channel),
            Self::Svf(f) => f.process_sample(x, channel),
            Self::Butterworth(f) => f.process_sample(x, channel),
            Self::Chebyshev(f) => f.process_sample(x, channel),
            Self::Elliptic(f) => f.process_sample(x, channel),
        }
    }

    /// Processes every active channel of `buffer` in place.
    pub fn process_block(&mut self, buffer: &mut Buffer<F>) {
        match self {
            Self::FirstOrderLowpass(f) => f.process_block(buffer),
            Self::FirstOrderHighpass(f) => f.process_block(buffer),
            Self::SecondOrderLowpass(f) => f.process_block(buffer),
            Self::SecondOrderHighpass(f) => f.process_block(buffer),
            Self::Bandpass(f) => f.process_block(buffer),
            Self::Notch(f) => f.process_block(buffer),
            Self::Bell(f) => f.process_block(buffer),
            Self::LowShelf(f) => f.process_block(buffer),
            Self::HighShelf(f) => f.process_block(buffer),
            Self::Svf(f) => f.process_block(buffer),
            Self::Butterworth(f) => f.process_block(buffer),
            Self::Chebyshev(f) => f.process_block(buffer),
            Self::Elliptic(f) => f.process_block(buffer),
        }
    }

    /// Processes `buffer` sample by sample, redesigning the filter from
    /// `params(n)` before every sample index `n`.
    pub fn process_block_with_modulation(
        &mut self,
        buffer: &mut Buffer<F>,
        fs: F,
        mut params: impl FnMut(usize) -> (F, F, F),
    ) {
        let num_channels = buffer.num_channels();
        for n in 0..buffer.num_samples() {
            let (fc, q, gain) = params(n);
            self.calc_coefs(fc, q, gain, fs);
            for ch in 0..num_channels {
                let y = self.process_sample(buffer.sample(ch, n), ch);
                buffer.set_sample(ch, n, y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonal_core::filters::MAX_CASCADE_ORDER;

    const ALL_KINDS: [EqFilterKind; 21] = [
        EqFilterKind::FirstOrderLowpass,
        EqFilterKind::FirstOrderHighpass,
        EqFilterKind::SecondOrderLowpass,
        EqFilterKind::SecondOrderHighpass,
        EqFilterKind::Bandpass,
        EqFilterKind::Notch,
        EqFilterKind::Bell,
        EqFilterKind::LowShelf,
        EqFilterKind::HighShelf,
        EqFilterKind::SvfLowpass,
        EqFilterKind::SvfHighpass,
        EqFilterKind::SvfBell,
        EqFilterKind::SvfNotch,
        EqFilterKind::SvfLowShelf,
        EqFilterKind::SvfHighShelf,
        EqFilterKind::ButterworthLowpass(4),
        EqFilterKind::ButterworthHighpass(3),
        EqFilterKind::ChebyshevLowpass(8),
        EqFilterKind::ChebyshevHighpass(4),
        EqFilterKind::EllipticLowpass(6),
        EqFilterKind::EllipticHighpass(2),
    ];

    #[test]
    fn kind_round_trips_through_instance() {
        for kind in ALL_KINDS {
            assert_eq!(EqFilter::<f32>::new(kind).kind(), kind);
        }
    }

    #[test]
    fn butterworth_order_is_clamped() {
        let filter = EqFilter::<f64>::new(EqFilterKind::ButterworthLowpass(99));
        assert_eq!(
            filter.kind(),
            EqFilterKind::ButterworthLowpass(MAX_BUTTERWORTH_ORDER)
        );
    }

    #[test]
    fn cascade_orders_round_up_to_even() {
        let filter = EqFilter::<f32>::new(EqFilterKind::EllipticLowpass(5));
        assert_eq!(filter.kind(), EqFilterKind::EllipticLowpass(6));
        let filter = EqFilter::<f32>::new(EqFilterKind::ChebyshevHighpass(0));
        assert_eq!(filter.kind(), EqFilterKind::ChebyshevHighpass(2));
        let filter = EqFilter::<f32>::new(EqFilterKind::ChebyshevLowpass(99));
        assert_eq!(filter.kind(), EqFilterKind::ChebyshevLowpass(MAX_CASCADE_ORDER));
    }

    #[test]
    fn only_shelves_and_bells_use_gain() {
        let with_gain: Vec<_> = ALL_KINDS.iter().filter(|k| k.uses_gain()).collect();
        assert_eq!(with_gain.len(), 6);
        assert!(!EqFilterKind::FirstOrderLowpass.uses_q());
        assert!(EqFilterKind::ButterworthHighpass(2).uses_q());
        assert!(EqFilterKind::EllipticLowpass(8).uses_q());
        assert!(!EqFilterKind::ChebyshevHighpass(4).uses_gain());
    }

    #[test]
    fn modulated_matches_block_for_constant_params() {
        for kind in ALL_KINDS {
            let mut block = EqFilter::<f64>::new(kind);
            block.prepare(2);
            let mut modulated = block.clone();

            let signal: Vec<f64> = (0..64).map(|n| libm::sin(n as f64 * 0.3)).collect();
            let mut a = Buffer::from_channels(&[signal.clone(), signal.clone()]);
            let mut b = a.clone();

            block.calc_coefs(2000.0, 0.9, 2.0, 48000.0);
            block.process_block(&mut a);
            modulated.process_block_with_modulation(&mut b, 48000.0, |_| (2000.0, 0.9, 2.0));

            for ch in 0..2 {
                for (x, y) in a.channel(ch).iter().zip(b.channel(ch)) {
                    assert!((x - y).abs() < 1.0e-12, "{kind:?}: {x} vs {y}");
                }
            }
        }
    }
}
