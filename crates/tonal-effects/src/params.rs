//! Plain parameter snapshots for the compressor and the EQ.
//!
//! These are what a host stores and reloads (with the `serde` feature) and
//! hands to the audio thread between blocks. `validate` reports values
//! outside the documented ranges; `apply_to` pushes a snapshot through the
//! regular setters, which clamp on their own.
//!
//! | Parameter         | Range          | Default |
//! |-------------------|----------------|---------|
//! | threshold_db      | -80 to 0       | -12     |
//! | ratio             | 1 to 20        | 4       |
//! | knee_db           | 0 to 24        | 6       |
//! | attack_ms         | 0 to 500       | 10      |
//! | release_ms        | 0 to 5000      | 100     |
//! | makeup_target_db  | -24 to 24      | 0       |
//! | band freq_hz      | 20 to 20000    | 1000    |
//! | band q            | 0.1 to 10      | 0.7071  |
//! | band gain_db      | -18 to 18      | 0       |

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, vec::Vec};

use thiserror::Error;
use tonal_core::Float;

use crate::compressor::{
    GainComputerMode, GainReductionMeter, LevelDetectorMode, MonoCompressor,
};
use crate::eq::{DEFAULT_BAND_TYPES, EqProcessor};

/// Reasons a parameter snapshot is rejected.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParamError {
    /// Value outside its documented range.
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the parameter.
        param: &'static str,
        /// The offending value.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// NaN or infinite value.
    #[error("parameter '{param}' is not finite")]
    NotFinite {
        /// Name of the parameter.
        param: &'static str,
    },

    /// Filter type index past the band's choices.
    #[error("filter type {index} out of range for {choices} choices")]
    UnknownFilterType {
        /// Requested index.
        index: usize,
        /// Number of choices the band offers.
        choices: usize,
    },

    /// A band of an EQ snapshot failed validation.
    #[error("band {band}: {source}")]
    Band {
        /// Index of the band.
        band: usize,
        /// What was wrong with it.
        #[source]
        source: Box<ParamError>,
    },
}

fn check_range(param: &'static str, value: f32, min: f32, max: f32) -> Result<(), ParamError> {
    if !value.is_finite() {
        return Err(ParamError::NotFinite { param });
    }
    if value < min || value > max {
        return Err(ParamError::OutOfRange {
            param,
            value,
            min,
            max,
        });
    }
    Ok(())
}

#[inline]
fn to_float<F: Float>(value: f32) -> F {
    F::from_f64(f64::from(value))
}

/// Snapshot of every [`MonoCompressor`] setting.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CompressorParams {
    /// Threshold in dB.
    pub threshold_db: f32,
    /// Ratio (`x:1`).
    pub ratio: f32,
    /// Knee width in dB.
    pub knee_db: f32,
    /// Attack in milliseconds.
    pub attack_ms: f32,
    /// Release in milliseconds.
    pub release_ms: f32,
    /// Envelope follower.
    pub detector_mode: LevelDetectorMode,
    /// Curve topology.
    pub gain_computer_mode: GainComputerMode,
    /// Auto makeup on/off.
    pub auto_makeup: bool,
    /// Auto makeup target in dB.
    pub makeup_target_db: f32,
}

impl Default for CompressorParams {
    fn default() -> Self {
        Self {
            threshold_db: -12.0,
            ratio: 4.0,
            knee_db: 6.0,
            attack_ms: 10.0,
            release_ms: 100.0,
            detector_mode: LevelDetectorMode::Peak,
            gain_computer_mode: GainComputerMode::FeedForward,
            auto_makeup: false,
            makeup_target_db: 0.0,
        }
    }
}

impl CompressorParams {
    /// Checks every value against its range.
    pub fn validate(&self) -> Result<(), ParamError> {
        check_range("threshold_db", self.threshold_db, -80.0, 0.0)?;
        check_range("ratio", self.ratio, 1.0, 20.0)?;
        check_range("knee_db", self.knee_db, 0.0, 24.0)?;
        check_range("attack_ms", self.attack_ms, 0.0, 500.0)?;
        check_range("release_ms", self.release_ms, 0.0, 5000.0)?;
        check_range("makeup_target_db", self.makeup_target_db, -24.0, 24.0)
    }

    /// Pushes the snapshot into `compressor`.
    pub fn apply_to<F: Float, M: GainReductionMeter<F>>(
        &self,
        compressor: &mut MonoCompressor<F, M>,
    ) {
        compressor.set_threshold_db(to_float(self.threshold_db));
        compressor.set_ratio(to_float(self.ratio));
        compressor.set_knee_db(to_float(self.knee_db));
        compressor.set_attack_ms(to_float(self.attack_ms));
        compressor.set_release_ms(to_float(self.release_ms));
        compressor.set_detector_mode(self.detector_mode);
        compressor.set_gain_computer_mode(self.gain_computer_mode);
        compressor.set_auto_makeup(self.auto_makeup);
        compressor.set_makeup_target_db(to_float(self.makeup_target_db));
    }
}

/// Snapshot of one EQ band.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EqBandParams {
    /// Cutoff or centre frequency in Hz.
    pub freq_hz: f32,
    /// Q.
    pub q: f32,
    /// Gain in dB.
    pub gain_db: f32,
    /// Index into the band's filter choices.
    pub filter_type: usize,
    /// Band on/off.
    pub on: bool,
}

impl Default for EqBandParams {
    /// A bell at 1 kHz, switched off.
    fn default() -> Self {
        Self {
            freq_hz: 1000.0,
            q: 0.7071,
            gain_db: 0.0,
            filter_type: 3,
            on: false,
        }
    }
}

impl EqBandParams {
    /// Checks the values against their ranges and the filter type against
    /// `num_filter_types` choices.
    pub fn validate(&self, num_filter_types: usize) -> Result<(), ParamError> {
        check_range("freq_hz", self.freq_hz, 20.0, 20000.0)?;
        check_range("q", self.q, 0.1, 10.0)?;
        check_range("gain_db", self.gain_db, -18.0, 18.0)?;
        if self.filter_type >= num_filter_types {
            return Err(ParamError::UnknownFilterType {
                index: self.filter_type,
                choices: num_filter_types,
            });
        }
        Ok(())
    }

    /// Pushes the snapshot into band `index` of `eq`.
    pub fn apply_to<F: Float, const BANDS: usize>(
        &self,
        eq: &mut EqProcessor<F, BANDS>,
        index: usize,
    ) {
        eq.set_band_on_off(index, self.on);
        eq.set_cutoff_frequency(index, to_float(self.freq_hz));
        eq.set_q_value(index, to_float(self.q));
        eq.set_gain_db(index, to_float(self.gain_db));
        eq.set_filter_type(index, self.filter_type);
    }
}

/// Snapshot of an [`EqProcessor`], one entry per band.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EqParams {
    /// Band settings, in processing order.
    pub bands: Vec<EqBandParams>,
}

impl EqParams {
    /// `num_bands` default bands.
    pub fn with_bands(num_bands: usize) -> Self {
        Self {
            bands: (0..num_bands).map(|_| EqBandParams::default()).collect(),
        }
    }

    /// Validates every band against the standard eight filter choices.
    pub fn validate(&self) -> Result<(), ParamError> {
        self.validate_with_choices(DEFAULT_BAND_TYPES.len())
    }

    /// Validates every band against `num_filter_types` choices.
    pub fn validate_with_choices(&self, num_filter_types: usize) -> Result<(), ParamError> {
        for (band, params) in self.bands.iter().enumerate() {
            params
                .validate(num_filter_types)
                .map_err(|source| ParamError::Band {
                    band,
                    source: Box::new(source),
                })?;
        }
        Ok(())
    }

    /// Pushes the snapshot into `eq`. See [`EqProcessor::set_parameters`].
    pub fn apply_to<F: Float, const BANDS: usize>(&self, eq: &mut EqProcessor<F, BANDS>) {
        eq.set_parameters(self);
    }
}
