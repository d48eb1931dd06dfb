//! Rounding policy for the profile pipeline.
//!
//! Every quantity the pipeline accumulates is rounded at a fixed point:
//! per-candle volume, per-field volume contributions, bin positions, weight
//! percentages and midpoints. All of them go through the helpers below so the
//! accumulators only ever hold integer-valued `f64`s and results do not depend
//! on summation order.

/// Round half away from zero (2.5 -> 3, -2.5 -> -3).
#[inline]
pub fn round_half_away(value: f64) -> f64 {
    value.round()
}

/// Round to `decimals` places by shifting the decimal exponent through the
/// shortest round-trip text form, so `1.0000005` rounds up to `1.000001`.
pub fn round_to_decimals(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let shifted = format!("{}e{}", value, decimals)
        .parse::<f64>()
        .unwrap_or(value * 10f64.powi(decimals as i32));
    let rounded = round_half_away(shifted);

    format!("{}e-{}", rounded, decimals)
        .parse::<f64>()
        .unwrap_or(rounded / 10f64.powi(decimals as i32))
}

/// Rounded bin offset of `price` above `floor`, in units of `step`.
///
/// Callers guard `step == 0`; a non-finite ratio saturates at the `i64` bounds.
#[inline]
pub fn bin_position(price: f64, floor: f64, step: f64) -> i64 {
    round_half_away((price - floor) / step) as i64
}

/// Integer percentage of `part` over `total`; zero when `total` is zero.
#[inline]
pub fn rounded_percentage(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    round_half_away(part * 100.0 / total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_away() {
        assert_eq!(round_half_away(2.5), 3.0);
        assert_eq!(round_half_away(2.4999), 2.0);
        assert_eq!(round_half_away(-2.5), -3.0);
        assert_eq!(round_half_away(33.333), 33.0);
        assert_eq!(round_half_away(16.666), 17.0);
    }

    #[test]
    fn test_round_to_decimals() {
        assert_eq!(round_to_decimals(9.5, 6), 9.5);
        assert_eq!(round_to_decimals(1.23456789, 6), 1.234568);
        assert_eq!(round_to_decimals(1.0000005, 6), 1.000001);
        assert_eq!(round_to_decimals(0.1 + 0.2, 6), 0.3);
        assert_eq!(round_to_decimals(42000.123456449, 6), 42000.123456);
    }

    #[test]
    fn test_round_to_decimals_passes_through_non_finite() {
        assert!(round_to_decimals(f64::NAN, 6).is_nan());
        assert_eq!(round_to_decimals(f64::INFINITY, 6), f64::INFINITY);
    }

    #[test]
    fn test_bin_position() {
        assert_eq!(bin_position(9.0, 9.0, 1.0), 0);
        assert_eq!(bin_position(10.5, 9.0, 1.0), 2);
        assert_eq!(bin_position(10.49, 9.0, 1.0), 1);
        assert_eq!(bin_position(12.0, 9.0, 1.0), 3);
    }

    #[test]
    fn test_rounded_percentage() {
        assert_eq!(rounded_percentage(33.0, 150.0), 22.0);
        assert_eq!(rounded_percentage(167.0, 150.0), 111.0);
        assert_eq!(rounded_percentage(10.0, 0.0), 0.0);
    }
}
