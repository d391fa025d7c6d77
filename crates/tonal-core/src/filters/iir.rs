//! Transposed Direct Form II IIR section of arbitrary order.
//!
//! `IirFilter<S, N>` holds `N` coefficients per side (order `N - 1`) and one
//! block of `N - 1` state values per channel. The recursion for the
//! second-order case reads
//!
//! ```text
//! y  = z1 + b0 x
//! z1 = z2 + b1 x - a1 y
//! z2 =      b2 x - a2 y
//! ```
//!
//! and generalises by shifting through the state array. Coefficients are
//! assumed normalised (`a[0] == 1`), which every calculator in this crate
//! guarantees.
//!
//! Transposed Direct Form II keeps only `order` state values per channel and
//! is well behaved under per-sample coefficient changes, which the EQ band
//! relies on while parameters ramp.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use super::conformal::Coefficients;
use crate::buffer::Buffer;
use crate::sample::Sample;

/// Multi-channel IIR section with `N` coefficients per side.
#[derive(Debug, Clone)]
pub struct IirFilter<S, const N: usize> {
    b: [S; N],
    a: [S; N],
    // Slot N-1 is never read; it keeps the array length expressible as N.
    state: Vec<[S; N]>,
}

/// First-order section.
pub type FirstOrderIir<S> = IirFilter<S, 2>;
/// Second-order section (biquad).
pub type SecondOrderIir<S> = IirFilter<S, 3>;

impl<S: Sample, const N: usize> IirFilter<S, N> {
    /// Filter order.
    pub const ORDER: usize = N - 1;

    /// Creates a passthrough section prepared for one channel.
    pub fn new() -> Self {
        let identity = Coefficients::<S, N>::identity();
        Self {
            b: identity.b,
            a: identity.a,
            state: vec_of_zeroed(1),
        }
    }

    /// Allocates state for `num_channels` channels and zeroes it.
    pub fn prepare(&mut self, num_channels: usize) {
        self.state = vec_of_zeroed(num_channels);
    }

    /// Number of channels with state.
    pub fn num_channels(&self) -> usize {
        self.state.len()
    }

    /// Zeroes all channel state. Coefficients are kept.
    pub fn reset(&mut self) {
        for z in &mut self.state {
            *z = [S::default(); N];
        }
    }

    /// Installs new coefficients without touching state.
    #[inline]
    pub fn set_coefs(&mut self, coefs: &Coefficients<S, N>) {
        debug_assert!(coefs.a[0] == S::splat_f64(1.0), "a[0] must be normalised");
        self.b = coefs.b;
        self.a = coefs.a;
    }

    /// Current coefficients.
    pub fn coefs(&self) -> Coefficients<S, N> {
        Coefficients {
            b: self.b,
            a: self.a,
        }
    }

    /// Processes one sample on `channel`.
    #[inline]
    pub fn process_sample(&mut self, x: S, channel: usize) -> S {
        let z = &mut self.state[channel];
        let y = z[0] + self.b[0] * x;
        for i in 1..N - 1 {
            z[i - 1] = z[i] + self.b[i] * x - self.a[i] * y;
        }
        z[N - 2] = self.b[N - 1] * x - self.a[N - 1] * y;
        y
    }

    /// Processes a slice in place on `channel`.
    pub fn process_slice(&mut self, block: &mut [S], channel: usize) {
        for sample in block.iter_mut() {
            *sample = self.process_sample(*sample, channel);
        }
    }

    /// Processes every active channel of `buffer` in place.
    pub fn process_block(&mut self, buffer: &mut Buffer<S>) {
        debug_assert!(buffer.num_channels() <= self.state.len());
        for ch in 0..buffer.num_channels() {
            self.process_slice(buffer.channel_mut(ch), ch);
        }
    }

    /// Processes `buffer` sample by sample, calling `modulator(self, n)`
    /// before sample `n` is run through every channel.
    ///
    /// The modulator typically installs per-sample coefficients.
    pub fn process_block_with_modulation(
        &mut self,
        buffer: &mut Buffer<S>,
        mut modulator: impl FnMut(&mut Self, usize),
    ) {
        let num_channels = buffer.num_channels();
        for n in 0..buffer.num_samples() {
            modulator(self, n);
            for ch in 0..num_channels {
                let x = buffer.sample(ch, n);
                let y = self.process_sample(x, ch);
                buffer.set_sample(ch, n, y);
            }
        }
    }
}

impl<S: Sample, const N: usize> Default for IirFilter<S, N> {
    fn default() -> Self {
        Self::new()
    }
}

fn vec_of_zeroed<S: Sample, const N: usize>(num_channels: usize) -> Vec<[S; N]> {
    let mut v = Vec::with_capacity(num_channels);
    v.resize(num_channels, [S::default(); N]);
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::coefficients::{first_order_lpf, second_order_lpf};

    #[test]
    fn identity_passes_through() {
        let mut f = SecondOrderIir::<f32>::new();
        for x in [1.0, -0.5, 0.25] {
            assert_eq!(f.process_sample(x, 0), x);
        }
    }

    #[test]
    fn impulse_response_matches_difference_equation() {
        let coefs = second_order_lpf(1000.0_f64, 0.7071, 48000.0);
        let mut f = SecondOrderIir::new();
        f.set_coefs(&coefs);

        // Direct Form I reference
        let (b, a) = (coefs.b, coefs.a);
        let (mut x1, mut x2, mut y1, mut y2) = (0.0, 0.0, 0.0, 0.0);
        for n in 0..64 {
            let x = if n == 0 { 1.0 } else { 0.0 };
            let y_ref = b[0] * x + b[1] * x1 + b[2] * x2 - a[1] * y1 - a[2] * y2;
            x2 = x1;
            x1 = x;
            y2 = y1;
            y1 = y_ref;
            let y = f.process_sample(x, 0);
            assert!((y - y_ref).abs() < 1.0e-12, "n={n}: {y} vs {y_ref}");
        }
    }

    #[test]
    fn first_order_steps_to_unity() {
        let mut f = FirstOrderIir::<f64>::new();
        f.set_coefs(&first_order_lpf(100.0, 48000.0));
        let mut y = 0.0;
        for _ in 0..48000 {
            y = f.process_sample(1.0, 0);
        }
        assert!((y - 1.0).abs() < 1.0e-9);
    }

    #[test]
    fn channels_are_independent() {
        let mut f = SecondOrderIir::<f32>::new();
        f.prepare(2);
        f.set_coefs(&second_order_lpf(500.0, 0.7071, 48000.0));
        let mut buffer = Buffer::new(2, 16);
        buffer.set_sample(0, 0, 1.0);
        f.process_block(&mut buffer);
        assert!(buffer.channel(0).iter().any(|&x| x != 0.0));
        assert!(buffer.channel(1).iter().all(|&x| x == 0.0));
    }

    #[test]
    fn reset_is_idempotent() {
        let mut f = SecondOrderIir::<f64>::new();
        f.set_coefs(&second_order_lpf(500.0, 0.7071, 48000.0));
        f.process_sample(1.0, 0);
        f.reset();
        let mut once = f.clone();
        f.reset();
        assert_eq!(once.process_sample(0.3, 0), f.process_sample(0.3, 0));
    }
}
