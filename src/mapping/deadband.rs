//! # Deadband Filter
//!
//! Zeroes axis readings whose magnitude is below a threshold, to suppress
//! stick drift around center.
//!
//! Unlike a rescaling deadzone, readings at or above the threshold pass
//! through unchanged: `0.3` with a `0.05` deadband stays `0.3`.
//!
//! ## Usage
//!
//! ```
//! use hmi_agent::mapping::deadband::DeadbandFilter;
//!
//! let filter = DeadbandFilter::new(0.05);
//!
//! assert_eq!(filter.apply(0.02), 0.0);
//! assert_eq!(filter.apply(-0.04), 0.0);
//! assert_eq!(filter.apply(0.3), 0.3);
//! ```

/// Default deadband applied to drive axes.
pub const DEFAULT_DEADBAND: f64 = 0.05;

/// Zeroes small axis readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeadbandFilter {
    deadband: f64,
}

impl Default for DeadbandFilter {
    fn default() -> Self {
        Self {
            deadband: DEFAULT_DEADBAND,
        }
    }
}

impl DeadbandFilter {
    /// Creates a filter with the given threshold.
    ///
    /// Negative or NaN thresholds are rejected by configuration validation
    /// before they get here; if one slips through it is treated as `0.0` so
    /// the filter stays a pass-through rather than failing mid-loop.
    #[must_use]
    pub fn new(deadband: f64) -> Self {
        let deadband = if deadband.is_nan() { 0.0 } else { deadband.max(0.0) };
        Self { deadband }
    }

    /// Returns the configured threshold.
    #[must_use]
    pub fn deadband(&self) -> f64 {
        self.deadband
    }

    /// Applies the filter to a single reading.
    #[must_use]
    pub fn apply(&self, raw_value: f64) -> f64 {
        apply_deadband(raw_value, self.deadband)
    }
}

/// Returns `0.0` when `|raw_value| < deadband`, otherwise `raw_value` as is.
///
/// # Examples
///
/// ```
/// use hmi_agent::mapping::deadband::apply_deadband;
///
/// assert_eq!(apply_deadband(0.049, 0.05), 0.0);
/// assert_eq!(apply_deadband(0.05, 0.05), 0.05);
/// assert_eq!(apply_deadband(-0.8, 0.05), -0.8);
/// ```
#[inline]
#[must_use]
pub fn apply_deadband(raw_value: f64, deadband: f64) -> f64 {
    if raw_value.abs() < deadband {
        0.0
    } else {
        raw_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_deadband() {
        assert_eq!(DeadbandFilter::default().deadband(), 0.05);
    }

    #[test]
    fn test_below_threshold_is_zero() {
        let filter = DeadbandFilter::new(0.1);
        for value in [0.0, 0.01, -0.01, 0.0999, -0.0999] {
            assert_eq!(filter.apply(value), 0.0, "{} should be zeroed", value);
        }
    }

    #[test]
    fn test_at_threshold_passes_through() {
        let filter = DeadbandFilter::new(0.1);
        assert_eq!(filter.apply(0.1), 0.1);
        assert_eq!(filter.apply(-0.1), -0.1);
    }

    #[test]
    fn test_no_rescaling_above_threshold() {
        let filter = DeadbandFilter::new(0.05);
        for value in [0.06, 0.3, -0.5, 0.999, 1.0, -1.0] {
            assert_eq!(filter.apply(value), value);
        }
    }

    #[test]
    fn test_zero_deadband_is_identity() {
        let filter = DeadbandFilter::new(0.0);
        assert_eq!(filter.apply(0.0001), 0.0001);
        assert_eq!(filter.apply(-0.0001), -0.0001);
    }

    #[test]
    fn test_negative_deadband_treated_as_zero() {
        let filter = DeadbandFilter::new(-0.2);
        assert_eq!(filter.deadband(), 0.0);
        assert_eq!(filter.apply(0.01), 0.01);
    }

    #[test]
    fn test_nan_deadband_treated_as_zero() {
        let filter = DeadbandFilter::new(f64::NAN);
        assert_eq!(filter.deadband(), 0.0);
    }

    #[test]
    fn test_sweep_matches_threshold_rule() {
        let deadband = 0.05;
        for step in -100..=100 {
            let value = step as f64 / 100.0;
            let out = apply_deadband(value, deadband);
            if value.abs() < deadband {
                assert_eq!(out, 0.0);
            } else {
                assert_eq!(out, value);
            }
        }
    }
}
