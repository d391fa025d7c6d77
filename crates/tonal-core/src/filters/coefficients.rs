//! Coefficient calculators for first- and second-order sections.
//!
//! Each calculator writes down an analog prototype and runs it through the
//! bilinear transform in [`conformal`](super::conformal). Inputs are not
//! validated: `fc` must lie in `(0, fs / 2)`, `q` and `gain` must be
//! positive. Gains are linear; convert dB with [`db_to_gain`] first.
//!
//! The `_matched` variants pre-warp at `matched_fc` instead of `fc`, so the
//! response is exact at some other frequency of interest (a non-positive
//! `matched_fc` falls back to `fc`). All lane-dependent choices go through
//! [`Sample::select_gt`] / [`Sample::select_lt`], so the SIMD path never
//! branches.
//!
//! [`db_to_gain`]: crate::db_to_gain

use super::conformal::{Coefficients, bilinear_first_order, bilinear_second_order, compute_k_value};
use crate::sample::Sample;

/// First-order section (two coefficients each side).
pub type FirstOrderCoefs<S> = Coefficients<S, 2>;
/// Second-order section (three coefficients each side).
pub type SecondOrderCoefs<S> = Coefficients<S, 3>;

#[inline]
fn omega<S: Sample>(fc: S) -> S {
    S::splat_f64(core::f64::consts::TAU) * fc
}

#[inline]
fn matched_k<S: Sample>(fc: S, matched_fc: S, fs: S::Scalar) -> S {
    let zero = S::splat_f64(0.0);
    compute_k_value(S::select_gt(matched_fc, zero, matched_fc, fc), fs)
}

/// `H(s) = 1 / (s + 1)`
pub fn first_order_lpf<S: Sample>(fc: S, fs: S::Scalar) -> FirstOrderCoefs<S> {
    let one = S::splat_f64(1.0);
    let wc = omega(fc);
    bilinear_first_order([S::default(), one], [one / wc, one], compute_k_value(fc, fs))
}

/// `H(s) = s / (s + 1)`
pub fn first_order_hpf<S: Sample>(fc: S, fs: S::Scalar) -> FirstOrderCoefs<S> {
    let one = S::splat_f64(1.0);
    let wc = omega(fc);
    bilinear_first_order([one / wc, S::default()], [one / wc, one], compute_k_value(fc, fs))
}

/// First-order shelf from `low_gain` (DC) to `high_gain` (Nyquist) with its
/// transition at `fc`.
///
/// Equal gains reduce to a plain gain element.
pub fn first_order_shelf<S: Sample>(
    low_gain: S,
    high_gain: S,
    fc: S,
    fs: S::Scalar,
) -> FirstOrderCoefs<S> {
    if low_gain == high_gain {
        return Coefficients::gain(low_gain);
    }

    let one = S::splat_f64(1.0);
    let rho = (high_gain / low_gain).sqrt();
    let k = one / (S::splat_f64(core::f64::consts::PI) * fc / S::splat(fs)).tan();
    bilinear_first_order([high_gain / rho, low_gain], [one / rho, one], k)
}

/// `H(s) = 1 / (s^2 + s/Q + 1)`
pub fn second_order_lpf<S: Sample>(fc: S, q: S, fs: S::Scalar) -> SecondOrderCoefs<S> {
    second_order_lpf_matched(fc, q, fs, fc)
}

/// [`second_order_lpf`] pre-warped at `matched_fc`.
pub fn second_order_lpf_matched<S: Sample>(
    fc: S,
    q: S,
    fs: S::Scalar,
    matched_fc: S,
) -> SecondOrderCoefs<S> {
    let (zero, one) = (S::default(), S::splat_f64(1.0));
    let wc = omega(fc);
    let k_sq = one / (wc * wc);
    let k_t = one / (q * wc);
    bilinear_second_order([zero, zero, one], [k_sq, k_t, one], matched_k(fc, matched_fc, fs))
}

/// `H(s) = s^2 / (s^2 + s/Q + 1)`
pub fn second_order_hpf<S: Sample>(fc: S, q: S, fs: S::Scalar) -> SecondOrderCoefs<S> {
    second_order_hpf_matched(fc, q, fs, fc)
}

/// [`second_order_hpf`] pre-warped at `matched_fc`.
pub fn second_order_hpf_matched<S: Sample>(
    fc: S,
    q: S,
    fs: S::Scalar,
    matched_fc: S,
) -> SecondOrderCoefs<S> {
    let (zero, one) = (S::default(), S::splat_f64(1.0));
    let wc = omega(fc);
    let k_sq = one / (wc * wc);
    let k_t = one / (q * wc);
    bilinear_second_order([k_sq, zero, zero], [k_sq, k_t, one], matched_k(fc, matched_fc, fs))
}

/// `H(s) = (s/Q) / (s^2 + s/Q + 1)`, unity gain at `fc`.
pub fn second_order_bpf<S: Sample>(fc: S, q: S, fs: S::Scalar) -> SecondOrderCoefs<S> {
    let (zero, one) = (S::default(), S::splat_f64(1.0));
    let wc = omega(fc);
    let k_sq = one / (wc * wc);
    let k_t = one / (q * wc);
    bilinear_second_order([zero, k_t, zero], [k_sq, k_t, one], compute_k_value(fc, fs))
}

/// `H(s) = (s^2 + 1) / (s^2 + s/Q + 1)`
pub fn notch<S: Sample>(fc: S, q: S, fs: S::Scalar) -> SecondOrderCoefs<S> {
    let (zero, one) = (S::default(), S::splat_f64(1.0));
    let wc = omega(fc);
    let k_sq = one / (wc * wc);
    let k_t = one / (q * wc);
    bilinear_second_order([k_sq, zero, one], [k_sq, k_t, one], compute_k_value(fc, fs))
}

/// `H(s) = (s^2 + G s/Q + 1) / (s^2 + s/Q + 1)` for boosts; cuts move the
/// gain to the denominator so the bandwidth stays symmetric.
pub fn peaking<S: Sample>(fc: S, q: S, gain: S, fs: S::Scalar) -> SecondOrderCoefs<S> {
    peaking_matched(fc, q, gain, fs, fc)
}

/// [`peaking`] pre-warped at `matched_fc`.
pub fn peaking_matched<S: Sample>(
    fc: S,
    q: S,
    gain: S,
    fs: S::Scalar,
    matched_fc: S,
) -> SecondOrderCoefs<S> {
    let one = S::splat_f64(1.0);
    let wc = omega(fc);
    let k_sq = one / (wc * wc);
    let k_t = one / (q * wc);
    let k_num = S::select_gt(gain, one, k_t * gain, k_t);
    let k_den = S::select_lt(gain, one, k_t / gain, k_t);
    bilinear_second_order(
        [k_sq, k_num, one],
        [k_sq, k_den, one],
        matched_k(fc, matched_fc, fs),
    )
}

/// Low shelf: `gain` below `fc`, unity above.
///
/// `gain == 1` short-circuits to a passthrough section.
pub fn low_shelf<S: Sample>(fc: S, q: S, gain: S, fs: S::Scalar) -> SecondOrderCoefs<S> {
    low_shelf_matched(fc, q, gain, fs, fc)
}

/// [`low_shelf`] pre-warped at `matched_fc`.
pub fn low_shelf_matched<S: Sample>(
    fc: S,
    q: S,
    gain: S,
    fs: S::Scalar,
    matched_fc: S,
) -> SecondOrderCoefs<S> {
    let one = S::splat_f64(1.0);
    if gain == one {
        return Coefficients::identity();
    }

    let wc = omega(fc);
    let a = gain.sqrt();
    let a_root = a.sqrt();
    let k_sq = one / (wc * wc);
    let k_t = a_root / (q * wc);
    bilinear_second_order(
        [a * k_sq, a * k_t, a * a],
        [a * k_sq, k_t, one],
        matched_k(fc, matched_fc, fs),
    )
}

/// High shelf: unity below `fc`, `gain` above.
///
/// `gain == 1` short-circuits to a passthrough section.
pub fn high_shelf<S: Sample>(fc: S, q: S, gain: S, fs: S::Scalar) -> SecondOrderCoefs<S> {
    high_shelf_matched(fc, q, gain, fs, fc)
}

/// [`high_shelf`] pre-warped at `matched_fc`.
pub fn high_shelf_matched<S: Sample>(
    fc: S,
    q: S,
    gain: S,
    fs: S::Scalar,
    matched_fc: S,
) -> SecondOrderCoefs<S> {
    let one = S::splat_f64(1.0);
    if gain == one {
        return Coefficients::identity();
    }

    let wc = omega(fc);
    let a = gain.sqrt();
    let a_root = a.sqrt();
    let k_sq = one / (wc * wc);
    let k_t = a_root / (q * wc);
    bilinear_second_order(
        [a * a * k_sq, a * k_t, a],
        [k_sq, k_t, a],
        matched_k(fc, matched_fc, fs),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use wide::f32x4;

    fn dc_gain(c: &SecondOrderCoefs<f64>) -> f64 {
        c.b.iter().sum::<f64>() / c.a.iter().sum::<f64>()
    }

    fn nyquist_gain(c: &SecondOrderCoefs<f64>) -> f64 {
        (c.b[0] - c.b[1] + c.b[2]) / (c.a[0] - c.a[1] + c.a[2])
    }

    #[test]
    fn lpf_hpf_edge_gains() {
        let lpf = second_order_lpf(1000.0, 0.7071, 48000.0);
        assert!((dc_gain(&lpf) - 1.0).abs() < 1.0e-12);
        assert!(nyquist_gain(&lpf).abs() < 1.0e-12);

        let hpf = second_order_hpf(1000.0, 0.7071, 48000.0);
        assert!(dc_gain(&hpf).abs() < 1.0e-12);
        assert!((nyquist_gain(&hpf) - 1.0).abs() < 1.0e-12);
    }

    #[test]
    fn shelves_reach_their_gains() {
        let low = low_shelf(500.0, 0.7071, 2.0, 48000.0);
        assert!((dc_gain(&low) - 2.0).abs() < 1.0e-9);
        assert!((nyquist_gain(&low) - 1.0).abs() < 1.0e-9);

        let high = high_shelf(500.0, 0.7071, 2.0, 48000.0);
        assert!((dc_gain(&high) - 1.0).abs() < 1.0e-9);
        assert!((nyquist_gain(&high) - 2.0).abs() < 1.0e-9);
    }

    #[test]
    fn unity_shelf_is_passthrough() {
        assert_eq!(low_shelf(500.0_f32, 0.7, 1.0, 48000.0), Coefficients::identity());
        assert_eq!(high_shelf(500.0_f64, 0.7, 1.0, 48000.0), Coefficients::identity());
    }

    #[test]
    fn first_order_shelf_equal_gains_is_gain() {
        let c = first_order_shelf(0.5_f64, 0.5, 1000.0, 48000.0);
        assert_eq!(c.b, [0.5, 0.0]);
        assert_eq!(c.a, [1.0, 0.0]);
    }

    #[test]
    fn first_order_shelf_edges() {
        let c = first_order_shelf(0.5_f64, 2.0, 1000.0, 48000.0);
        let dc = (c.b[0] + c.b[1]) / (c.a[0] + c.a[1]);
        let ny = (c.b[0] - c.b[1]) / (c.a[0] - c.a[1]);
        assert!((dc - 0.5).abs() < 1.0e-9);
        assert!((ny - 2.0).abs() < 1.0e-9);
    }

    #[test]
    fn matched_with_non_positive_target_falls_back() {
        let plain = second_order_lpf(800.0_f64, 1.2, 44100.0);
        let matched = second_order_lpf_matched(800.0_f64, 1.2, 44100.0, -1.0);
        assert_eq!(plain, matched);
    }

    #[test]
    fn simd_lanes_match_scalar() {
        let fcs = [100.0_f32, 1000.0, 5000.0, 15000.0];
        let gains = [0.5_f32, 1.0, 2.0, 4.0];
        let simd = peaking(
            f32x4::from(fcs),
            f32x4::splat(0.9),
            f32x4::from(gains),
            48000.0,
        );
        for lane in 0..4 {
            let scalar = peaking(fcs[lane], 0.9, gains[lane], 48000.0);
            for i in 0..3 {
                assert!((simd.b[i].to_array()[lane] - scalar.b[i]).abs() < 1.0e-5);
                assert!((simd.a[i].to_array()[lane] - scalar.a[i]).abs() < 1.0e-5);
            }
        }
    }
}
