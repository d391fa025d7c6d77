//! Parameter smoothing for zipper-free changes.
//!
//! Parameters such as cutoff, Q, threshold and ratio need smooth transitions
//! to avoid audible zipper noise when they change. This module provides a
//! per-sample ramp, [`SmoothedValue`], and a block-rate wrapper,
//! [`SmoothedBufferValue`], that renders one block of the ramp at a time so a
//! processor can index it per sample.
//!
//! ## Ramp shapes
//!
//! - [`Linear`]: constant rate of change, good for crossfades and gains near
//!   zero
//! - [`Multiplicative`]: constant *ratio* per sample, i.e. linear in the log
//!   domain. Use this for frequency, Q and linear gain: a linear sweep of a
//!   log-scale quantity is audibly lopsided.
//!
//! Both ramps reach the target in exactly the configured number of samples.
//!
//! ## Usage
//!
//! ```rust
//! use tonal_core::{Multiplicative, SmoothedBufferValue};
//!
//! let mut cutoff = SmoothedBufferValue::<f32, Multiplicative>::new();
//! cutoff.prepare(48000.0, 256);
//! cutoff.reset_to(1000.0);
//!
//! // Host moved the knob: the next blocks ramp towards 2 kHz over 50 ms.
//! cutoff.process(2000.0, 256);
//! assert!(cutoff.is_smoothing());
//! let ramp = cutoff.smoothed_buffer();
//! assert!(ramp[0] > 1000.0 && ramp[255] < 2000.0);
//! ```

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::marker::PhantomData;

use crate::sample::Float;

/// Ramp shape used by [`SmoothedValue`].
pub trait SmoothingKind: Copy + Default + core::fmt::Debug {
    /// Per-sample step that takes `current` to `target` in `steps` samples.
    fn step<F: Float>(current: F, target: F, steps: usize) -> F;

    /// Applies one step.
    fn apply<F: Float>(current: F, step: F) -> F;

    /// Applies `n` steps at once.
    fn apply_n<F: Float>(current: F, step: F, n: usize) -> F;

    /// Whether a ramp between the two values is defined at all.
    #[inline]
    fn can_ramp<F: Float>(_current: F, _target: F) -> bool {
        true
    }
}

/// Linear ramp: `current += step`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Linear;

/// Exponential ramp: `current *= step`.
///
/// Only defined between two non-zero values of the same sign; anything else
/// jumps straight to the target.
#[derive(Debug, Clone, Copy, Default)]
pub struct Multiplicative;

impl SmoothingKind for Linear {
    #[inline]
    fn step<F: Float>(current: F, target: F, steps: usize) -> F {
        (target - current) / F::from_usize(steps)
    }

    #[inline]
    fn apply<F: Float>(current: F, step: F) -> F {
        current + step
    }

    #[inline]
    fn apply_n<F: Float>(current: F, step: F, n: usize) -> F {
        current + step * F::from_usize(n)
    }
}

impl SmoothingKind for Multiplicative {
    #[inline]
    fn step<F: Float>(current: F, target: F, steps: usize) -> F {
        ((target.abs().ln() - current.abs().ln()) / F::from_usize(steps)).exp()
    }

    #[inline]
    fn apply<F: Float>(current: F, step: F) -> F {
        current * step
    }

    #[inline]
    fn apply_n<F: Float>(current: F, step: F, n: usize) -> F {
        current * step.powf(F::from_usize(n))
    }

    #[inline]
    fn can_ramp<F: Float>(current: F, target: F) -> bool {
        let zero = F::zero();
        (current > zero && target > zero) || (current < zero && target < zero)
    }
}

/// A value that ramps towards its target over a fixed number of samples.
#[derive(Debug, Clone)]
pub struct SmoothedValue<F, K = Linear> {
    current: F,
    target: F,
    step: F,
    countdown: usize,
    steps_to_target: usize,
    _kind: PhantomData<K>,
}

impl<F: Float, K: SmoothingKind> SmoothedValue<F, K> {
    /// Creates a settled value. Ramping is off until [`reset`](Self::reset).
    pub fn new(initial: F) -> Self {
        Self {
            current: initial,
            target: initial,
            step: F::zero(),
            countdown: 0,
            steps_to_target: 0,
            _kind: PhantomData,
        }
    }

    /// Sets the ramp length and snaps to the current target.
    pub fn reset(&mut self, sample_rate: f64, ramp_seconds: f64) {
        debug_assert!(sample_rate > 0.0 && ramp_seconds >= 0.0);
        self.reset_steps(libm::floor(ramp_seconds.max(0.0) * sample_rate.max(0.0)) as usize);
    }

    /// Sets the ramp length in samples and snaps to the current target.
    pub fn reset_steps(&mut self, steps: usize) {
        self.steps_to_target = steps;
        self.set_immediate(self.target);
    }

    /// Ramp length in samples.
    pub fn ramp_steps(&self) -> usize {
        self.steps_to_target
    }

    /// Starts a ramp towards `target`. A repeated target is a no-op.
    #[inline]
    pub fn set_target(&mut self, target: F) {
        if target == self.target {
            return;
        }
        if self.steps_to_target == 0 || !K::can_ramp(self.current, target) {
            self.set_immediate(target);
            return;
        }
        self.target = target;
        self.countdown = self.steps_to_target;
        self.step = K::step(self.current, self.target, self.countdown);
    }

    /// Sets current and target together (no ramp).
    #[inline]
    pub fn set_immediate(&mut self, value: F) {
        self.current = value;
        self.target = value;
        self.countdown = 0;
    }

    /// Jumps to the end of any ramp in progress.
    #[inline]
    pub fn snap_to_target(&mut self) {
        self.set_immediate(self.target);
    }

    /// Next value in the ramp (advances by one sample).
    #[inline]
    pub fn advance(&mut self) -> F {
        if self.countdown == 0 {
            return self.target;
        }
        self.countdown -= 1;
        self.current = if self.countdown > 0 {
            K::apply(self.current, self.step)
        } else {
            self.target
        };
        self.current
    }

    /// Advances by `n` samples at once and returns the new value.
    pub fn skip(&mut self, n: usize) -> F {
        if n >= self.countdown {
            self.snap_to_target();
            return self.target;
        }
        self.current = K::apply_n(self.current, self.step, n);
        self.countdown -= n;
        self.current
    }

    /// Current value without advancing.
    #[inline]
    pub fn get(&self) -> F {
        self.current
    }

    /// Value being ramped towards.
    #[inline]
    pub fn target(&self) -> F {
        self.target
    }

    /// True while a ramp is in progress.
    #[inline]
    pub fn is_smoothing(&self) -> bool {
        self.countdown > 0
    }
}

impl<F: Float, K: SmoothingKind> Default for SmoothedValue<F, K> {
    fn default() -> Self {
        Self::new(F::zero())
    }
}

/// Ramp length used when none is configured.
pub const DEFAULT_RAMP_SECONDS: f64 = 0.05;

/// A [`SmoothedValue`] rendered one block at a time into an internal buffer.
///
/// The buffer is allocated in [`prepare`](Self::prepare); [`process`]
/// only writes into it.
///
/// [`process`]: Self::process
#[derive(Debug, Clone)]
pub struct SmoothedBufferValue<F, K = Linear> {
    smoother: SmoothedValue<F, K>,
    buffer: Vec<F>,
    num_rendered: usize,
    sample_rate: f64,
    ramp_seconds: f64,
    currently_smoothing: bool,
    mapping: fn(F) -> F,
}

impl<F: Float, K: SmoothingKind> SmoothedBufferValue<F, K> {
    /// Creates an unprepared value with the default 50 ms ramp.
    pub fn new() -> Self {
        Self {
            smoother: SmoothedValue::new(F::zero()),
            buffer: Vec::new(),
            num_rendered: 0,
            sample_rate: 48000.0,
            ramp_seconds: DEFAULT_RAMP_SECONDS,
            currently_smoothing: false,
            mapping: |x| x,
        }
    }

    /// Creates a value whose inputs pass through `mapping` first
    /// (e.g. dB to linear gain).
    pub fn with_mapping(mapping: fn(F) -> F) -> Self {
        Self {
            mapping,
            ..Self::new()
        }
    }

    /// Sizes the render buffer and snaps to the current target.
    pub fn prepare(&mut self, sample_rate: f64, max_block_size: usize) {
        self.sample_rate = sample_rate;
        self.buffer.clear();
        self.buffer.resize(max_block_size, F::zero());
        self.num_rendered = 0;
        self.reset();
    }

    /// Snaps to the current target, keeping the ramp length.
    pub fn reset(&mut self) {
        self.smoother.reset(self.sample_rate, self.ramp_seconds);
        self.currently_smoothing = false;
    }

    /// Snaps to `value` (after mapping).
    pub fn reset_to(&mut self, value: F) {
        self.smoother.set_immediate((self.mapping)(value));
        self.reset();
    }

    /// Changes the ramp length. Snaps to the current target.
    pub fn set_ramp_length(&mut self, ramp_seconds: f64) {
        self.ramp_seconds = ramp_seconds;
        self.reset();
    }

    /// Renders `num_samples` of the ramp towards `value`.
    ///
    /// When nothing is ramping the buffer is filled with the settled value
    /// and [`is_smoothing`](Self::is_smoothing) reports `false`.
    pub fn process(&mut self, value: F, num_samples: usize) {
        debug_assert!(
            num_samples <= self.buffer.len(),
            "block of {num_samples} exceeds prepared size {}",
            self.buffer.len()
        );
        let num_samples = num_samples.min(self.buffer.len());
        let mapped = (self.mapping)(value);
        self.smoother.set_target(mapped);
        self.num_rendered = num_samples;

        let out = &mut self.buffer[..num_samples];
        if !self.smoother.is_smoothing() {
            self.currently_smoothing = false;
            out.fill(mapped);
            return;
        }

        self.currently_smoothing = true;
        for sample in out.iter_mut() {
            *sample = self.smoother.advance();
        }
    }

    /// The block rendered by the last [`process`](Self::process) call.
    #[inline]
    pub fn smoothed_buffer(&self) -> &[F] {
        &self.buffer[..self.num_rendered]
    }

    /// True if the last rendered block contained a ramp.
    #[inline]
    pub fn is_smoothing(&self) -> bool {
        self.currently_smoothing
    }

    /// Value at the end of the last rendered block.
    #[inline]
    pub fn current_value(&self) -> F {
        self.smoother.get()
    }

    /// Ramp length in seconds.
    pub fn ramp_length(&self) -> f64 {
        self.ramp_seconds
    }
}

impl<F: Float, K: SmoothingKind> Default for SmoothedBufferValue<F, K> {
    fn default() -> Self {
        Self::new()
    }
}
