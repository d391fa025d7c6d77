//! Stream configuration handed to every `prepare()`.

use thiserror::Error;

/// Reasons a [`ProcessSpec`] is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SpecError {
    /// Sample rate was zero, negative, NaN or infinite.
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(f64),

    /// Maximum block size was zero.
    #[error("maximum block size must be at least one sample")]
    ZeroBlockSize,

    /// Channel count was zero.
    #[error("channel count must be at least one")]
    ZeroChannels,
}

/// Sample rate, largest block and channel count of an audio stream.
///
/// Processors size every internal buffer from this in `prepare()`, so
/// `process()` never allocates. `prepare()` may be called again at any time
/// (for example on a sample-rate change) to fully reinitialise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSpec {
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Largest number of samples any single `process()` call will see.
    pub max_block_size: usize,
    /// Number of channels in the main buffer.
    pub num_channels: usize,
}

impl ProcessSpec {
    /// Builds a validated spec.
    ///
    /// # Example
    /// ```rust
    /// use tonal_core::{ProcessSpec, SpecError};
    ///
    /// let spec = ProcessSpec::new(48000.0, 512, 2).unwrap();
    /// assert_eq!(spec.num_channels, 2);
    /// assert_eq!(ProcessSpec::new(0.0, 512, 2), Err(SpecError::InvalidSampleRate(0.0)));
    /// ```
    pub fn new(
        sample_rate: f64,
        max_block_size: usize,
        num_channels: usize,
    ) -> Result<Self, SpecError> {
        Self {
            sample_rate,
            max_block_size,
            num_channels,
        }
        .validate()
    }

    /// Checks an already-built spec (e.g. one filled in field by field).
    pub fn validate(self) -> Result<Self, SpecError> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(SpecError::InvalidSampleRate(self.sample_rate));
        }
        if self.max_block_size == 0 {
            return Err(SpecError::ZeroBlockSize);
        }
        if self.num_channels == 0 {
            return Err(SpecError::ZeroChannels);
        }
        Ok(self)
    }

    /// Same stream with a different channel count.
    pub fn with_channels(self, num_channels: usize) -> Self {
        Self {
            num_channels,
            ..self
        }
    }
}

impl Default for ProcessSpec {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            max_block_size: 512,
            num_channels: 2,
        }
    }
}
