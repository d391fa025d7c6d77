//! Level conversions and small integer helpers.
//!
//! # Level Conversions
//!
//! - [`db_to_gain`] / [`gain_to_db`] - Convert between dB and linear gain,
//!   with a `-100 dB` floor treated as silence
//!
//! # Utilities
//!
//! - [`ceiling_divide`] - Integer division rounding up (SIMD lane packing)
//! - [`ms_to_seconds`] - Time conversion used by the ballistics code

use crate::sample::Float;

/// Level treated as silence by [`db_to_gain`] and [`gain_to_db`].
pub const MINUS_INFINITY_DB: f64 = -100.0;

/// Convert decibels to linear gain.
///
/// Anything at or below [`MINUS_INFINITY_DB`] maps to exactly zero.
///
/// # Example
/// ```rust
/// use tonal_core::db_to_gain;
///
/// assert!((db_to_gain(0.0_f32) - 1.0).abs() < 1.0e-6);
/// assert!((db_to_gain(-6.0206_f64) - 0.5).abs() < 1.0e-4);
/// assert_eq!(db_to_gain(-120.0_f32), 0.0);
/// ```
#[inline]
pub fn db_to_gain<F: Float>(db: F) -> F {
    if db > F::from_f64(MINUS_INFINITY_DB) {
        F::from_f64(10.0).powf(db * F::from_f64(0.05))
    } else {
        F::zero()
    }
}

/// Convert linear gain to decibels, floored at [`MINUS_INFINITY_DB`].
///
/// # Example
/// ```rust
/// use tonal_core::gain_to_db;
///
/// assert!((gain_to_db(2.0_f64) - 6.0206).abs() < 1.0e-3);
/// assert_eq!(gain_to_db(0.0_f32), -100.0);
/// ```
#[inline]
pub fn gain_to_db<F: Float>(gain: F) -> F {
    let floor = F::from_f64(MINUS_INFINITY_DB);
    if gain > F::zero() {
        (F::from_f64(20.0) * gain.log10()).max_of(floor)
    } else {
        floor
    }
}

/// Integer division rounding towards positive infinity.
#[inline]
pub const fn ceiling_divide(num: usize, den: usize) -> usize {
    num.div_ceil(den)
}

/// Milliseconds to seconds.
#[inline]
pub fn ms_to_seconds<F: Float>(ms: F) -> F {
    ms * F::from_f64(0.001)
}
