//! Tonal Effects - EQ bands and compressors
//!
//! Block processors built on the filters and smoothers of tonal-core:
//!
//! - [`EqBand`] - one band, many filter types, click-free switching
//! - [`EqProcessor`] - bands in series with per-band on/off
//! - [`LevelDetector`] - peak, peak-return-to-threshold and RMS followers
//! - [`GainComputer`] - feed-forward / feed-back soft-knee curves
//! - [`MonoCompressor`] - the full sidechain-keyed compressor
//! - [`CompressorParams`] / [`EqParams`] - validated parameter snapshots
//!   (serializable with the `serde` feature)
//!
//! Everything follows the tonal-core lifecycle: allocate in `prepare`, then
//! `process` in place without allocation. Each processor also implements
//! [`tonal_core::Processor`], so they chain:
//!
//! ```rust
//! use tonal_core::{Buffer, ProcessSpec, Processor, ProcessorExt};
//! use tonal_effects::{EqBand, MonoCompressor};
//!
//! let mut band = EqBand::<f32>::default_band();
//! band.set_gain_db(4.0);
//! let mut comp = MonoCompressor::<f32>::new();
//! comp.set_threshold_db(-18.0);
//!
//! let mut chain = band.chain(comp);
//! chain.prepare(&ProcessSpec::new(48000.0, 64, 2).unwrap());
//!
//! let mut buffer = Buffer::<f32>::new(2, 64);
//! chain.process(&mut buffer);
//! ```
//!
//! # Features
//!
//! - `std` (default): link the standard library
//! - `serde`: `Serialize`/`Deserialize` for the parameter snapshots and mode
//!   enums
//! - `tracing`: `debug!` events from `prepare` and mode / filter-type
//!   changes, never from the sample loop

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod compressor;
pub mod eq;
pub mod params;

pub use compressor::{
    BallisticCoeffs, BallisticGainReductionMeter, GainComputer, GainComputerMode,
    GainReductionMeter, LevelDetector, LevelDetectorMode, LevelVisualizer, MonoCompressor,
    PeakLevelVisualizer,
};
pub use eq::{DEFAULT_BAND_TYPES, EqBand, EqFilter, EqFilterKind, EqProcessor};
pub use params::{CompressorParams, EqBandParams, EqParams, ParamError};
