//! Multi-type equalizer bands.
//!
//! An [`EqBand`] owns every filter alternative it offers and switches
//! between them with a one-block crossfade. [`EqProcessor`] chains bands.
//!
//! | Kind family          | Q | Gain |
//! |----------------------|---|------|
//! | first-order LPF/HPF  |   |      |
//! | biquad LPF/HPF/BPF/notch | x |  |
//! | biquad bell/shelves  | x | x    |
//! | SVF LPF/HPF/notch    | x |      |
//! | SVF bell/shelves     | x | x    |
//! | Butterworth LPF/HPF  | x |      |

mod band;
mod filter;
mod processor;

pub use band::{DEFAULT_BAND_TYPES, DEFAULT_CUTOFF_HZ, DEFAULT_Q, EQ_RAMP_SECONDS, EqBand};
pub use filter::{EqFilter, EqFilterKind};
pub use processor::EqProcessor;
