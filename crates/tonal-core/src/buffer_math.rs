//! Arithmetic over whole [`Buffer`]s.
//!
//! Functions operate on the active view of each buffer. Where two buffers
//! are involved, the source and destination must agree on sample count;
//! channel counts are reconciled as documented per function.

use crate::buffer::Buffer;
use crate::sample::{Float, Sample};
use crate::smoothing::{SmoothedBufferValue, SmoothingKind};

/// Copies every channel of `src` into `dst`.
pub fn copy_buffer_data<S: Sample>(src: &Buffer<S>, dst: &mut Buffer<S>) {
    debug_assert_eq!(src.num_channels(), dst.num_channels());
    debug_assert_eq!(src.num_samples(), dst.num_samples());
    for ch in 0..src.num_channels().min(dst.num_channels()) {
        dst.channel_mut(ch).copy_from_slice(src.channel(ch));
    }
}

/// Copies `num_channels` channels from `src` (starting at `src_start`) to
/// `dst` (starting at `dst_start`).
pub fn copy_buffer_channels<S: Sample>(
    src: &Buffer<S>,
    dst: &mut Buffer<S>,
    src_start: usize,
    dst_start: usize,
    num_channels: usize,
) {
    debug_assert!(src_start + num_channels <= src.num_channels());
    debug_assert!(dst_start + num_channels <= dst.num_channels());
    debug_assert_eq!(src.num_samples(), dst.num_samples());
    for i in 0..num_channels {
        dst.channel_mut(dst_start + i)
            .copy_from_slice(src.channel(src_start + i));
    }
}

/// Adds `src` into `dst`, sample by sample.
pub fn add_buffer_data<S: Sample>(src: &Buffer<S>, dst: &mut Buffer<S>) {
    debug_assert_eq!(src.num_channels(), dst.num_channels());
    debug_assert_eq!(src.num_samples(), dst.num_samples());
    for ch in 0..src.num_channels().min(dst.num_channels()) {
        for (d, &s) in dst.channel_mut(ch).iter_mut().zip(src.channel(ch)) {
            *d = *d + s;
        }
    }
}

/// Multiplies every sample by `gain`.
pub fn apply_gain<S: Sample>(buffer: &mut Buffer<S>, gain: S) {
    for channel in buffer.channels_mut() {
        for x in channel.iter_mut() {
            *x = *x * gain;
        }
    }
}

/// Ramps `gain` towards `target` over the block and applies it per sample.
///
/// When the smoother is settled this falls back to [`apply_gain`].
pub fn apply_gain_smoothed<F: Float, K: SmoothingKind>(
    buffer: &mut Buffer<F>,
    gain: &mut SmoothedBufferValue<F, K>,
    target: F,
) {
    gain.process(target, buffer.num_samples());
    if !gain.is_smoothing() {
        apply_gain(buffer, gain.current_value());
        return;
    }

    let ramp = gain.smoothed_buffer();
    for channel in buffer.channels_mut() {
        for (x, &g) in channel.iter_mut().zip(ramp) {
            *x = *x * g;
        }
    }
}

/// Multiplies every channel of `buffer` by the single-channel `mono`.
pub fn multiply_by_mono<S: Sample>(buffer: &mut Buffer<S>, mono: &[S]) {
    debug_assert!(mono.len() >= buffer.num_samples());
    for channel in buffer.channels_mut() {
        for (x, &g) in channel.iter_mut().zip(mono) {
            *x = *x * g;
        }
    }
}

/// Sums every channel of `src` into channel 0 of `dst`.
///
/// The sum is scaled by `normalization`, defaulting to `1 / num_channels`.
/// A mono `src` is copied unscaled unless a normalization is given.
pub fn sum_to_mono<F: Float>(src: &Buffer<F>, dst: &mut Buffer<F>, normalization: Option<F>) {
    debug_assert!(dst.num_channels() >= 1);
    debug_assert_eq!(src.num_samples(), dst.num_samples());
    let num_channels = src.num_channels();
    let out = dst.channel_mut(0);
    if num_channels == 0 {
        out.fill(F::zero());
        return;
    }

    out.copy_from_slice(src.channel(0));
    for ch in 1..num_channels {
        for (o, &x) in out.iter_mut().zip(src.channel(ch)) {
            *o = *o + x;
        }
    }

    let scale = normalization.unwrap_or_else(|| F::one() / F::from_usize(num_channels));
    if scale != F::one() {
        for o in out.iter_mut() {
            *o = *o * scale;
        }
    }
}

/// Largest absolute sample value.
///
/// `channel = None` scans every active channel.
pub fn get_magnitude<F: Float>(buffer: &Buffer<F>, channel: Option<usize>) -> F {
    let peak = |data: &[F]| data.iter().fold(F::zero(), |m, &x| m.max_of(x.abs()));
    match channel {
        Some(ch) => peak(buffer.channel(ch)),
        None => buffer.channels().fold(F::zero(), |m, data| m.max_of(peak(data))),
    }
}

/// Root-mean-square level of one channel.
pub fn get_rms_level<F: Float>(buffer: &Buffer<F>, channel: usize) -> F {
    let data = buffer.channel(channel);
    if data.is_empty() {
        return F::zero();
    }
    let sum_sq = data.iter().fold(F::zero(), |acc, &x| acc + x * x);
    (sum_sq / F::from_usize(data.len())).sqrt()
}

/// Replaces NaN and infinite samples with zero.
pub fn sanitize<S: Sample>(buffer: &mut Buffer<S>) {
    for channel in buffer.channels_mut() {
        for x in channel.iter_mut() {
            *x = x.sanitize();
        }
    }
}
