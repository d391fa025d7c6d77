//! Numeric types the processors are generic over.
//!
//! Two traits split the numeric world:
//!
//! - [`Sample`]: anything a filter can run on. That is the scalar floats
//!   (`f32`, `f64`) and the 4-lane SIMD register [`f32x4`]. Filter design code
//!   is written once against this trait so the same calculator produces
//!   coefficients for one channel or four lanes at a time.
//! - [`Float`]: the scalar subset. Smoothers, the EQ band and the compressor
//!   work on these.
//!
//! SIMD conditionals never branch per lane: [`Sample::select_gt`] and
//! [`Sample::select_lt`] resolve to a compare + blend on [`f32x4`].
//!
//! ```rust
//! use tonal_core::Sample;
//! use wide::f32x4;
//!
//! let x = f32x4::from([0.5, 2.0, 1.5, 0.25]);
//! let one = f32x4::splat(1.0);
//! let clamped = f32x4::select_gt(x, one, one, x);
//! assert_eq!(clamped.to_array(), [0.5, 1.0, 1.0, 0.25]);
//! ```

use core::fmt::Debug;
use core::ops::{Add, Div, Mul, Neg, Sub};

#[allow(clippy::wildcard_imports)]
use wide::*;

/// A value that filters and buffers can process: scalar or SIMD register.
pub trait Sample:
    Copy
    + Default
    + Debug
    + PartialEq
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// Element type of each lane.
    type Scalar: Float;

    /// Number of lanes (1 for scalars).
    const LANES: usize;

    /// Broadcasts a scalar to every lane.
    fn splat(value: Self::Scalar) -> Self;

    /// Broadcasts an `f64` constant to every lane.
    #[inline]
    fn splat_f64(value: f64) -> Self {
        Self::splat(Self::Scalar::from_f64(value))
    }

    /// Lane-wise square root.
    fn sqrt(self) -> Self;

    /// Lane-wise tangent.
    fn tan(self) -> Self;

    /// Lane-wise absolute value.
    fn abs(self) -> Self;

    /// Per lane: `if lhs > rhs { if_true } else { if_false }`.
    fn select_gt(lhs: Self, rhs: Self, if_true: Self, if_false: Self) -> Self;

    /// Per lane: `if lhs < rhs { if_true } else { if_false }`.
    fn select_lt(lhs: Self, rhs: Self, if_true: Self, if_false: Self) -> Self;

    /// Sum of all lanes.
    fn reduce_add(self) -> Self::Scalar;

    /// Replaces NaN and infinite lanes with zero.
    fn sanitize(self) -> Self;
}

/// Scalar floating point type (`f32` or `f64`).
pub trait Float: Sample<Scalar = Self> + PartialOrd + num_traits::Num {
    /// Converts from `f64`, rounding if needed.
    fn from_f64(value: f64) -> Self;

    /// Widens to `f64`.
    fn to_f64(self) -> f64;

    /// Converts a count (sample index, block length) to this type.
    #[inline]
    fn from_usize(value: usize) -> Self {
        Self::from_f64(value as f64)
    }

    /// `e^self`.
    fn exp(self) -> Self;

    /// Natural logarithm.
    fn ln(self) -> Self;

    /// Base-10 logarithm.
    fn log10(self) -> Self;

    /// `self^exponent`.
    fn powf(self, exponent: Self) -> Self;

    /// Sine.
    fn sin(self) -> Self;

    /// Cosine.
    fn cos(self) -> Self;

    /// Larger of two values.
    #[inline]
    fn max_of(self, other: Self) -> Self {
        if self > other { self } else { other }
    }

    /// Smaller of two values.
    #[inline]
    fn min_of(self, other: Self) -> Self {
        if self < other { self } else { other }
    }

    /// Clamps into `[lo, hi]`.
    #[inline]
    fn clamp_to(self, lo: Self, hi: Self) -> Self {
        self.max_of(lo).min_of(hi)
    }

    /// True unless NaN or infinite.
    fn is_finite_value(self) -> bool;
}

impl Sample for f32 {
    type Scalar = f32;
    const LANES: usize = 1;

    #[inline]
    fn splat(value: f32) -> Self {
        value
    }

    #[inline]
    fn sqrt(self) -> Self {
        libm::sqrtf(self)
    }

    #[inline]
    fn tan(self) -> Self {
        libm::tanf(self)
    }

    #[inline]
    fn abs(self) -> Self {
        libm::fabsf(self)
    }

    #[inline]
    fn select_gt(lhs: Self, rhs: Self, if_true: Self, if_false: Self) -> Self {
        if lhs > rhs { if_true } else { if_false }
    }

    #[inline]
    fn select_lt(lhs: Self, rhs: Self, if_true: Self, if_false: Self) -> Self {
        if lhs < rhs { if_true } else { if_false }
    }

    #[inline]
    fn reduce_add(self) -> f32 {
        self
    }

    #[inline]
    fn sanitize(self) -> Self {
        if self.is_finite() { self } else { 0.0 }
    }
}

impl Float for f32 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    fn exp(self) -> Self {
        libm::expf(self)
    }

    #[inline]
    fn ln(self) -> Self {
        libm::logf(self)
    }

    #[inline]
    fn log10(self) -> Self {
        libm::log10f(self)
    }

    #[inline]
    fn powf(self, exponent: Self) -> Self {
        libm::powf(self, exponent)
    }

    #[inline]
    fn sin(self) -> Self {
        libm::sinf(self)
    }

    #[inline]
    fn cos(self) -> Self {
        libm::cosf(self)
    }

    #[inline]
    fn is_finite_value(self) -> bool {
        self.is_finite()
    }
}

impl Sample for f64 {
    type Scalar = f64;
    const LANES: usize = 1;

    #[inline]
    fn splat(value: f64) -> Self {
        value
    }

    #[inline]
    fn sqrt(self) -> Self {
        libm::sqrt(self)
    }

    #[inline]
    fn tan(self) -> Self {
        libm::tan(self)
    }

    #[inline]
    fn abs(self) -> Self {
        libm::fabs(self)
    }

    #[inline]
    fn select_gt(lhs: Self, rhs: Self, if_true: Self, if_false: Self) -> Self {
        if lhs > rhs { if_true } else { if_false }
    }

    #[inline]
    fn select_lt(lhs: Self, rhs: Self, if_true: Self, if_false: Self) -> Self {
        if lhs < rhs { if_true } else { if_false }
    }

    #[inline]
    fn reduce_add(self) -> f64 {
        self
    }

    #[inline]
    fn sanitize(self) -> Self {
        if self.is_finite() { self } else { 0.0 }
    }
}

impl Float for f64 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn exp(self) -> Self {
        libm::exp(self)
    }

    #[inline]
    fn ln(self) -> Self {
        libm::log(self)
    }

    #[inline]
    fn log10(self) -> Self {
        libm::log10(self)
    }

    #[inline]
    fn powf(self, exponent: Self) -> Self {
        libm::pow(self, exponent)
    }

    #[inline]
    fn sin(self) -> Self {
        libm::sin(self)
    }

    #[inline]
    fn cos(self) -> Self {
        libm::cos(self)
    }

    #[inline]
    fn is_finite_value(self) -> bool {
        self.is_finite()
    }
}

/// Applies a scalar function to every lane of an [`f32x4`].
#[inline]
pub fn map_lanes(v: f32x4, f: impl Fn(f32) -> f32) -> f32x4 {
    f32x4::from(v.to_array().map(f))
}

/// Writes one lane of an [`f32x4`], leaving the others untouched.
#[inline]
pub fn set_lane(v: &mut f32x4, lane: usize, value: f32) {
    let mut lanes = v.to_array();
    lanes[lane] = value;
    *v = f32x4::from(lanes);
}

impl Sample for f32x4 {
    type Scalar = f32;
    const LANES: usize = 4;

    #[inline]
    fn splat(value: f32) -> Self {
        f32x4::splat(value)
    }

    #[inline]
    fn sqrt(self) -> Self {
        map_lanes(self, libm::sqrtf)
    }

    #[inline]
    fn tan(self) -> Self {
        map_lanes(self, libm::tanf)
    }

    #[inline]
    fn abs(self) -> Self {
        map_lanes(self, libm::fabsf)
    }

    #[inline]
    fn select_gt(lhs: Self, rhs: Self, if_true: Self, if_false: Self) -> Self {
        lhs.cmp_gt(rhs).blend(if_true, if_false)
    }

    #[inline]
    fn select_lt(lhs: Self, rhs: Self, if_true: Self, if_false: Self) -> Self {
        lhs.cmp_lt(rhs).blend(if_true, if_false)
    }

    #[inline]
    fn reduce_add(self) -> f32 {
        let [a, b, c, d] = self.to_array();
        (a + b) + (c + d)
    }

    #[inline]
    fn sanitize(self) -> Self {
        map_lanes(self, |x| if x.is_finite() { x } else { 0.0 })
    }
}
