use std::f64::consts::PI;

use crate::util::float_ext::FloatExt;

pub const fn bpm_to_milliseconds(bpm: f64, delimiter: Option<i32>) -> f64 {
    60_000.0 / delimiter_or_quarter(delimiter) as f64 / bpm
}

pub const fn milliseconds_to_bpm(ms: f64, delimiter: Option<i32>) -> f64 {
    60_000.0 / (ms * delimiter_or_quarter(delimiter) as f64)
}

const fn delimiter_or_quarter(delimiter: Option<i32>) -> i32 {
    match delimiter {
        Some(value) => value,
        None => 4,
    }
}

pub fn logistic(x: f64, midpoint_offset: f64, multiplier: f64, max_value: Option<f64>) -> f64 {
    max_value.unwrap_or(1.0) / (1.0 + f64::exp(multiplier * (midpoint_offset - x)))
}

/// Bell curve built out of two mirrored [`smoothstep`]s, peaking at `mean`.
pub fn smoothstep_bell_curve(x: f64, mean: f64, width: f64) -> f64 {
    let offset = x - mean;

    let x = if offset > 0.0 {
        width - offset
    } else {
        width + offset
    };

    smoothstep(x, 0.0, width)
}

pub fn smoothstep(x: f64, start: f64, end: f64) -> f64 {
    let x = reverse_lerp(x, start, end);

    x * x * (3.0 - 2.0 * x)
}

pub fn smootherstep(x: f64, start: f64, end: f64) -> f64 {
    let x = reverse_lerp(x, start, end);

    x * x * x * (x * (6.0 * x - 15.0) + 10.0)
}

pub fn reverse_lerp(x: f64, start: f64, end: f64) -> f64 {
    ((x - start) / (end - start)).clamp(0.0, 1.0)
}

/// Error function approximation (Abramowitz and Stegun 7.1.26).
#[allow(clippy::unreadable_literal)]
pub fn erf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }

    if FloatExt::eq(x, 0.0) {
        return 0.0;
    }

    if x.is_infinite() {
        return x.signum();
    }

    let t = 1.0 / (1.0 + 0.3275911 * x.abs());

    let tau = t
        * (0.254829592
            + t * (-0.284496736 + t * (1.421413741 + t * (-1.453152027 + t * 1.061405429))));

    let erf = 1.0 - tau * f64::exp(-x * x);

    if x >= 0.0 {
        erf
    } else {
        -erf
    }
}

/// Inverse of [`erf`]. Returns infinity at the domain edges.
pub fn erf_inv(x: f64) -> f64 {
    const A: f64 = 0.147;

    if x <= -1.0 {
        return f64::NEG_INFINITY;
    }

    if x >= 1.0 {
        return f64::INFINITY;
    }

    if FloatExt::eq(x, 0.0) {
        return 0.0;
    }

    let sgn = x.signum();
    let x = x.abs();

    let ln = f64::ln(1.0 - x * x);
    let t1 = 2.0 / (PI * A) + ln / 2.0;
    let t2 = ln / A;
    let base_approx = f64::sqrt(t1 * t1 - t2) - t1;

    // Reduces the max error from -0.005 to -0.00045
    let correction = if x >= 0.85 {
        f64::powf((x - 0.85) / 0.293, 8.0)
    } else {
        0.0
    };

    sgn * (f64::sqrt(base_approx) + correction)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn bpm_conversions() {
        assert!((milliseconds_to_bpm(75.0, None) - 200.0).abs() < 1e-9);
        assert!((bpm_to_milliseconds(200.0, None) - 75.0).abs() < 1e-9);
        assert!((milliseconds_to_bpm(100.0, Some(2)) - 300.0).abs() < 1e-9);
    }

    #[test]
    fn erf_edges() {
        assert!(erf(0.0).abs() < f64::EPSILON);
        assert!((erf(f64::INFINITY) - 1.0).abs() < f64::EPSILON);
        assert!((erf(f64::NEG_INFINITY) + 1.0).abs() < f64::EPSILON);
        assert!((erf(1.0) - 0.842_700_79).abs() < 1e-6);
        assert!(erf_inv(1.0).is_infinite());
        assert!(erf_inv(-1.0).is_infinite());
    }

    #[test]
    fn steps_are_clamped() {
        assert!(smoothstep(-5.0, 0.0, 1.0).abs() < f64::EPSILON);
        assert!((smoothstep(5.0, 0.0, 1.0) - 1.0).abs() < f64::EPSILON);
        assert!((smootherstep(0.5, 0.0, 1.0) - 0.5).abs() < f64::EPSILON);
        assert!((smoothstep_bell_curve(0.5, 0.5, 0.5) - 1.0).abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn erf_inv_inverts_erf(x in -0.99_f64..0.99) {
            let y = erf(erf_inv(x));
            prop_assert!((y - x).abs() < 5e-3, "erf(erf_inv({x})) = {y}");
        }

        #[test]
        fn reverse_lerp_in_unit_range(x in -1e6_f64..1e6, start in -100.0_f64..0.0, end in 1.0_f64..100.0) {
            let t = reverse_lerp(x, start, end);
            prop_assert!((0.0..=1.0).contains(&t));
        }
    }
}
