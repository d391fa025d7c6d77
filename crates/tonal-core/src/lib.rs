//! Tonal Core - filter design and processing primitives
//!
//! This crate holds the leaf building blocks of the tonal DSP engine. Every
//! type here is real-time safe once prepared: buffers and per-channel state
//! are sized in `prepare()`, and nothing in a `process` path allocates.
//!
//! # Core Abstractions
//!
//! ## Numeric model
//!
//! - [`Sample`] - anything a filter runs on (`f32`, `f64`, `wide::f32x4`)
//! - [`Float`] - the scalar subset used by smoothers and dynamics
//!
//! ## Processing
//!
//! - [`ProcessSpec`] - sample rate, block size and channel count handed to
//!   `prepare()`
//! - [`Buffer`] - multi-channel buffer with a max and a current size
//! - [`buffer_math`] - gain, mono summing and level measurement helpers
//! - [`Processor`] / [`ProcessorExt`] / [`Chain`] - block processor lifecycle
//!   and static chaining
//!
//! ## Parameter Smoothing
//!
//! - [`SmoothedValue`] - per-sample ramp, [`Linear`] or [`Multiplicative`]
//! - [`SmoothedBufferValue`] - the same ramp rendered one block at a time
//!
//! ## Filters
//!
//! - [`filters::coefficients`] - bilinear-transform coefficient calculators
//! - [`IirFilter`] - Transposed Direct Form II section of any order
//! - typed first- and second-order filters ([`SecondOrderLpf`],
//!   [`PeakingFilter`], ...)
//! - [`ButterworthFilter`] - runtime-order Butterworth cascade
//! - [`ChebyshevIIFilter`] / [`EllipticFilter`] - even-order cascades with
//!   stopband zeros
//! - [`StateVariableFilter`] - TPT SVF with eight responses
//!
//! # no_std Support
//!
//! Disable the default `std` feature for embedded targets:
//!
//! ```toml
//! [dependencies]
//! tonal-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use tonal_core::{Buffer, SecondOrderLpf};
//!
//! let mut lpf = SecondOrderLpf::<f32>::new();
//! lpf.prepare(2);
//! lpf.calc_coefs(500.0, 0.7071, 48000.0);
//!
//! let mut buffer = Buffer::<f32>::new(2, 64);
//! buffer.set_sample(0, 0, 1.0);
//! lpf.process_block(&mut buffer);
//! assert!(buffer.sample(0, 0) > 0.0);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod buffer;
pub mod buffer_math;
pub mod filters;
pub mod math;
pub mod processor;
pub mod sample;
pub mod smoothing;
pub mod spec;

pub use buffer::Buffer;
pub use filters::{
    ButterworthFilter, ButterworthKind, CascadeKind, ChebyshevIIFilter, Coefficients,
    EllipticFilter, FirstOrderHpf, FirstOrderLpf, FirstOrderShelf, HighShelfFilter, IirFilter,
    LowShelfFilter, NotchFilter, PeakingFilter, SecondOrderBpf, SecondOrderHpf, SecondOrderLpf,
    StateVariableFilter, SvfMode,
};
pub use math::{MINUS_INFINITY_DB, ceiling_divide, db_to_gain, gain_to_db, ms_to_seconds};
pub use processor::{Chain, Processor, ProcessorExt};
pub use sample::{Float, Sample, map_lanes, set_lane};
pub use smoothing::{
    DEFAULT_RAMP_SECONDS, Linear, Multiplicative, SmoothedBufferValue, SmoothedValue,
    SmoothingKind,
};
pub use spec::{ProcessSpec, SpecError};
