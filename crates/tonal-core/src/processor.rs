//! Block processor trait and static chaining.
//!
//! [`Processor`] is the lifecycle every stateful component in tonal follows:
//!
//! 1. [`prepare`](Processor::prepare) with a [`ProcessSpec`] whenever the
//!    audio engine (re)configures. All allocation happens here.
//! 2. [`process`](Processor::process) once per block, in place, allocation
//!    and lock free.
//! 3. [`reset`](Processor::reset) on transport stop or any discontinuity.
//!
//! Processors compose with [`ProcessorExt::chain`], which builds a
//! statically dispatched series connection. `dyn Processor<F>` also works
//! for runtime graphs.

use crate::buffer::Buffer;
use crate::sample::Float;
use crate::spec::ProcessSpec;

/// A stateful, in-place block processor.
///
/// # Example
///
/// ```rust
/// use tonal_core::{Buffer, ProcessSpec, Processor, ProcessorExt};
///
/// struct Gain(f32);
///
/// impl Processor<f32> for Gain {
///     fn prepare(&mut self, _spec: &ProcessSpec) {}
///     fn reset(&mut self) {}
///     fn process(&mut self, buffer: &mut Buffer<f32>) {
///         for channel in buffer.channels_mut() {
///             channel.iter_mut().for_each(|x| *x *= self.0);
///         }
///     }
/// }
///
/// let mut chain = Gain(2.0).chain(Gain(0.25));
/// chain.prepare(&ProcessSpec::default());
/// let mut buffer = Buffer::from_channels(&[[1.0_f32, -2.0]]);
/// chain.process(&mut buffer);
/// assert_eq!(buffer.channel(0), &[0.5, -1.0]);
/// ```
pub trait Processor<F: Float> {
    /// Sizes internal state for `spec`. May be called any number of times.
    fn prepare(&mut self, spec: &ProcessSpec);

    /// Clears internal state without changing parameters.
    fn reset(&mut self);

    /// Processes `buffer` in place.
    fn process(&mut self, buffer: &mut Buffer<F>);
}

impl<F: Float, P: Processor<F> + ?Sized> Processor<F> for &mut P {
    fn prepare(&mut self, spec: &ProcessSpec) {
        (**self).prepare(spec);
    }

    fn reset(&mut self) {
        (**self).reset();
    }

    fn process(&mut self, buffer: &mut Buffer<F>) {
        (**self).process(buffer);
    }
}

/// Fluent chaining for any [`Processor`].
pub trait ProcessorExt<F: Float>: Processor<F> + Sized {
    /// Runs `self`, then `next`, on the same buffer.
    fn chain<P: Processor<F>>(self, next: P) -> Chain<Self, P> {
        Chain {
            first: self,
            second: next,
        }
    }
}

impl<F: Float, T: Processor<F>> ProcessorExt<F> for T {}

/// Two processors in series. Built by [`ProcessorExt::chain`].
#[derive(Debug, Clone)]
pub struct Chain<A, B> {
    first: A,
    second: B,
}

impl<F: Float, A: Processor<F>, B: Processor<F>> Processor<F> for Chain<A, B> {
    fn prepare(&mut self, spec: &ProcessSpec) {
        self.first.prepare(spec);
        self.second.prepare(spec);
    }

    fn reset(&mut self) {
        self.first.reset();
        self.second.reset();
    }

    fn process(&mut self, buffer: &mut Buffer<F>) {
        self.first.process(buffer);
        self.second.process(buffer);
    }
}

impl<A, B> Chain<A, B> {
    /// The processor that runs first.
    pub fn first(&self) -> &A {
        &self.first
    }

    /// Mutable access to the first processor.
    pub fn first_mut(&mut self) -> &mut A {
        &mut self.first
    }

    /// The processor that runs second.
    pub fn second(&self) -> &B {
        &self.second
    }

    /// Mutable access to the second processor.
    pub fn second_mut(&mut self) -> &mut B {
        &mut self.second
    }
}
