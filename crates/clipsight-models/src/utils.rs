//! Numeric helpers shared across the pipeline.
//!
//! Scores, confidences and rates are clamped to their documented ranges
//! before they are placed into a result, and rounded for presentation.

/// Clamp a value to [0, 1].
pub fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Clamp a percentage rate to [0, 100].
pub fn clamp_rate(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to three decimal places.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_unit() {
        assert_eq!(clamp_unit(-0.5), 0.0);
        assert_eq!(clamp_unit(0.5), 0.5);
        assert_eq!(clamp_unit(1.5), 1.0);
    }

    #[test]
    fn test_clamp_rate() {
        assert_eq!(clamp_rate(-3.0), 0.0);
        assert_eq!(clamp_rate(42.0), 42.0);
        assert_eq!(clamp_rate(104.2), 100.0);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round1(33.3333), 33.3);
        assert_eq!(round2(0.98765), 0.99);
        assert_eq!(round3(0.12345), 0.123);
    }
}
