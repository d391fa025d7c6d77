//! Multi-channel audio buffer.
//!
//! [`Buffer`] owns channel-major storage sized once by
//! [`set_max_size`](Buffer::set_max_size) and then viewed at any smaller
//! size with [`set_current_size`](Buffer::set_current_size), which never
//! allocates. That split is what lets processors reserve scratch space in
//! `prepare()` and still accept whatever block length the host hands them.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::sample::Sample;

/// Channel-major buffer of samples with a max and a current size.
#[derive(Debug, Clone, Default)]
pub struct Buffer<S> {
    data: Vec<S>,
    max_channels: usize,
    max_samples: usize,
    num_channels: usize,
    num_samples: usize,
}

impl<S: Sample> Buffer<S> {
    /// Creates a zeroed buffer, current size equal to max size.
    pub fn new(num_channels: usize, num_samples: usize) -> Self {
        let mut buffer = Self {
            data: Vec::new(),
            max_channels: 0,
            max_samples: 0,
            num_channels: 0,
            num_samples: 0,
        };
        buffer.set_max_size(num_channels, num_samples);
        buffer
    }

    /// Builds a buffer by copying one slice per channel.
    ///
    /// All channels must have the same length.
    pub fn from_channels<C: AsRef<[S]>>(channels: &[C]) -> Self {
        let num_samples = channels.first().map_or(0, |c| c.as_ref().len());
        let mut buffer = Self::new(channels.len(), num_samples);
        for (ch, src) in channels.iter().enumerate() {
            let src = src.as_ref();
            debug_assert_eq!(src.len(), num_samples, "ragged channel {ch}");
            buffer.channel_mut(ch).copy_from_slice(&src[..num_samples]);
        }
        buffer
    }

    /// Reallocates storage and zeroes it. Not real-time safe.
    pub fn set_max_size(&mut self, num_channels: usize, num_samples: usize) {
        self.data = vec![S::default(); num_channels * num_samples];
        self.max_channels = num_channels;
        self.max_samples = num_samples;
        self.num_channels = num_channels;
        self.num_samples = num_samples;
    }

    /// Selects the active view. Does not allocate or clear.
    ///
    /// Sizes larger than the max size are clamped (and flagged in debug
    /// builds).
    #[inline]
    pub fn set_current_size(&mut self, num_channels: usize, num_samples: usize) {
        debug_assert!(
            num_channels <= self.max_channels && num_samples <= self.max_samples,
            "requested {num_channels}x{num_samples}, allocated {}x{}",
            self.max_channels,
            self.max_samples
        );
        self.num_channels = num_channels.min(self.max_channels);
        self.num_samples = num_samples.min(self.max_samples);
    }

    /// Active channel count.
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Active length in samples.
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Allocated sample capacity per channel.
    #[inline]
    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    /// Allocated channel capacity.
    #[inline]
    pub fn max_channels(&self) -> usize {
        self.max_channels
    }

    /// Read view of one channel at the current length.
    #[inline]
    pub fn channel(&self, channel: usize) -> &[S] {
        debug_assert!(
            channel < self.num_channels,
            "channel {channel} out of {} active",
            self.num_channels
        );
        let start = channel * self.max_samples;
        &self.data[start..start + self.num_samples]
    }

    /// Write view of one channel at the current length.
    #[inline]
    pub fn channel_mut(&mut self, channel: usize) -> &mut [S] {
        debug_assert!(
            channel < self.num_channels,
            "channel {channel} out of {} active",
            self.num_channels
        );
        let start = channel * self.max_samples;
        &mut self.data[start..start + self.num_samples]
    }

    /// Iterates over the active channels.
    pub fn channels(&self) -> impl Iterator<Item = &[S]> {
        let n = self.num_samples;
        self.data
            .chunks(self.max_samples.max(1))
            .take(self.num_channels)
            .map(move |c| &c[..n])
    }

    /// Iterates mutably over the active channels.
    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [S]> {
        let n = self.num_samples;
        self.data
            .chunks_mut(self.max_samples.max(1))
            .take(self.num_channels)
            .map(move |c| &mut c[..n])
    }

    /// Zeroes the active view.
    pub fn clear(&mut self) {
        for channel in self.channels_mut() {
            channel.fill(S::default());
        }
    }

    /// Sample at `(channel, index)`.
    #[inline]
    pub fn sample(&self, channel: usize, index: usize) -> S {
        self.channel(channel)[index]
    }

    /// Overwrites the sample at `(channel, index)`.
    #[inline]
    pub fn set_sample(&mut self, channel: usize, index: usize, value: S) {
        self.channel_mut(channel)[index] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_size_is_a_view() {
        let mut buffer = Buffer::<f32>::new(2, 8);
        buffer.channel_mut(1).fill(1.0);
        buffer.set_current_size(2, 4);
        assert_eq!(buffer.channel(1), &[1.0; 4]);
        buffer.clear();
        buffer.set_current_size(2, 8);
        assert_eq!(&buffer.channel(1)[..4], &[0.0; 4]);
        assert_eq!(&buffer.channel(1)[4..], &[1.0; 4]);
    }

    #[test]
    fn from_channels_copies() {
        let buffer = Buffer::from_channels(&[vec![1.0_f64, 2.0], vec![3.0, 4.0]]);
        assert_eq!(buffer.num_channels(), 2);
        assert_eq!(buffer.num_samples(), 2);
        assert_eq!(buffer.sample(1, 0), 3.0);
        assert_eq!(buffer.channels().count(), 2);
    }

    #[test]
    fn channels_mut_respects_view() {
        let mut buffer = Buffer::<f32>::new(3, 4);
        buffer.set_current_size(2, 3);
        for ch in buffer.channels_mut() {
            ch.fill(2.0);
        }
        buffer.set_current_size(3, 4);
        assert_eq!(buffer.channel(0), &[2.0, 2.0, 2.0, 0.0]);
        assert_eq!(buffer.channel(2), &[0.0; 4]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "channel 1 out of 1 active")]
    fn shrunk_channel_is_not_readable() {
        let mut buffer = Buffer::<f32>::new(2, 8);
        buffer.set_current_size(1, 8);
        let _ = buffer.channel(1);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "channel 2 out of 2 active")]
    fn channel_mut_past_active_count_panics() {
        let mut buffer = Buffer::<f64>::new(2, 4);
        buffer.channel_mut(2)[0] = 1.0;
    }
}
