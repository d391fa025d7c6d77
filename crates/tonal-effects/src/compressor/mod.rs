//! Dynamic range compression.
//!
//! The pipeline is split into reusable stages:
//!
//! | Stage              | Type                | Role                                       |
//! |--------------------|---------------------|--------------------------------------------|
//! | Level detection    | [`LevelDetector`]   | Peak, peak-return-to-threshold or RMS      |
//! | Gain computation   | [`GainComputer`]    | Feed-forward or feed-back soft-knee curve  |
//! | Orchestration      | [`MonoCompressor`]  | Key sum, detector, curve, gain, makeup     |
//! | Metering           | [`GainReductionMeter`], [`LevelVisualizer`] | Optional hooks, `()` is free |
//!
//! Only [`MonoCompressor`] allocates, and only in `prepare`.

mod detector;
mod gain_computer;
mod meter;
mod mono;

pub use detector::{BallisticCoeffs, LevelDetector, LevelDetectorMode};
pub use gain_computer::{GAIN_COMPUTER_RAMP_SECONDS, GainComputer, GainComputerMode};
pub use meter::{
    BallisticGainReductionMeter, GainReductionMeter, LevelVisualizer, METER_ATTACK_MS,
    METER_RELEASE_MS, PeakLevelVisualizer,
};
pub use mono::MonoCompressor;
