//! Filter design and processing.
//!
//! - [`conformal`]: bilinear transform with pre-warping
//! - [`coefficients`]: analog prototypes for first- and second-order sections
//! - [`IirFilter`]: Transposed Direct Form II section, any order
//! - typed first/second-order filters that pair a calculator with an
//!   [`IirFilter`]
//! - [`ButterworthFilter`]: cascaded sections, runtime order
//! - [`ChebyshevIIFilter`] / [`EllipticFilter`]: cascades with stopband
//!   zeros, built on [`cascade`]
//! - [`StateVariableFilter`]: TPT state variable filter with eight outputs

/// Implements the shared multi-channel plumbing for a typed filter that
/// wraps an `IirFilter` in a field named `iir`.
macro_rules! impl_iir_wrapper {
    ($filter:ident, $order:literal) => {
        impl<S: $crate::Sample> $filter<S> {
            /// Creates a passthrough filter prepared for one channel.
            pub fn new() -> Self {
                Self {
                    iir: $crate::filters::IirFilter::new(),
                }
            }

            /// Allocates per-channel state and zeroes it.
            pub fn prepare(&mut self, num_channels: usize) {
                self.iir.prepare(num_channels);
            }

            /// Zeroes all channel state.
            pub fn reset(&mut self) {
                self.iir.reset();
            }

            /// Processes one sample on `channel`.
            #[inline]
            pub fn process_sample(&mut self, x: S, channel: usize) -> S {
                self.iir.process_sample(x, channel)
            }

            /// Processes every active channel of `buffer` in place.
            pub fn process_block(&mut self, buffer: &mut $crate::Buffer<S>) {
                self.iir.process_block(buffer);
            }

            /// The underlying section.
            pub fn iir(&self) -> &$crate::filters::IirFilter<S, { $order + 1 }> {
                &self.iir
            }

            /// Mutable access to the underlying section.
            pub fn iir_mut(&mut self) -> &mut $crate::filters::IirFilter<S, { $order + 1 }> {
                &mut self.iir
            }
        }

        impl<S: $crate::Sample> Default for $filter<S> {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

pub mod butterworth;
pub mod cascade;
pub mod chebyshev;
pub mod coefficients;
pub mod conformal;
pub mod elliptic;
pub mod first_order;
pub mod iir;
pub mod second_order;
pub mod svf;

pub use butterworth::{ButterworthFilter, ButterworthKind, MAX_BUTTERWORTH_ORDER};
pub use cascade::{CascadeKind, MAX_CASCADE_ORDER, SectionDesign};
pub use chebyshev::ChebyshevIIFilter;
pub use conformal::Coefficients;
pub use elliptic::EllipticFilter;
pub use first_order::{FirstOrderHpf, FirstOrderLpf, FirstOrderShelf};
pub use iir::{FirstOrderIir, IirFilter, SecondOrderIir};
pub use second_order::{
    HighShelfFilter, LowShelfFilter, NotchFilter, PeakingFilter, SecondOrderBpf, SecondOrderHpf,
    SecondOrderLpf,
};
pub use svf::{StateVariableFilter, SvfMode};
