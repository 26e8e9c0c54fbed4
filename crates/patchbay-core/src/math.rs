//! Level conversions used by the built-in nodes.

use libm::{expf, logf};

/// Lowest level the gain law reaches, in dB.
pub const GAIN_FLOOR_DB: f32 = -60.0;

/// Span of the gain law, in dB.
pub const GAIN_RANGE_DB: f32 = 60.0;

/// Convert decibels to linear gain.
///
/// ```rust
/// use patchbay_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 1e-6);
/// assert!((db_to_linear(-6.0) - 0.501187).abs() < 1e-5);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels. Inputs below 1e-10 are floored.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Map a normalized control value in [0, 1] onto the gain law in dB.
#[inline]
pub fn normalized_to_db(normalized: f32) -> f32 {
    normalized * GAIN_RANGE_DB + GAIN_FLOOR_DB
}

/// Exact inverse of [`normalized_to_db`].
#[inline]
pub fn db_to_normalized(db: f32) -> f32 {
    (db - GAIN_FLOOR_DB) / GAIN_RANGE_DB
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_conversions() {
        assert!((db_to_linear(-30.0) - 0.031_622_8).abs() < 1e-6);
        assert!((db_to_linear(-60.0) - 0.001).abs() < 1e-6);
        assert!((linear_to_db(0.5) - (-6.0206)).abs() < 1e-3);
        assert!(linear_to_db(0.0) < -190.0);
    }

    #[test]
    fn test_gain_law_endpoints() {
        assert_eq!(normalized_to_db(0.0), -60.0);
        assert_eq!(normalized_to_db(1.0), 0.0);
        assert_eq!(normalized_to_db(0.5), -30.0);
        assert_eq!(db_to_normalized(-30.0), 0.5);
    }
}
