//! # Polar Mapper
//!
//! Converts the forward-back (`x`) and left-right (`y`) axes into a swerve
//! travel direction and magnitude.
//!
//! - `magnitude = sqrt(x² + y²)`, clamped to `0.0..=1.0` (a saturated
//!   diagonal would otherwise reach `sqrt(2)`).
//! - `angle = atan2(y, x)` in radians, reported in `(-π, π]`.
//!
//! With the stick centered (`x == y == 0`) the angle is undefined. The
//! [`CenteredDirection`] policy picks what gets reported; the default holds
//! the previous frame's direction so wheels do not snap back to zero when
//! the driver lets go.

use serde::Deserialize;
use std::f64::consts::PI;

/// What direction to report while the translation stick is centered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CenteredDirection {
    /// Report the previous frame's direction (`0.0` before any frame).
    #[default]
    Hold,
    /// Report `atan2(0, 0)`, i.e. `0.0`.
    Recompute,
}

/// Direction/magnitude pair for the commanded translation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolarVector {
    /// Radians, `(-π, π]`.
    pub angle: f64,
    /// `0.0..=1.0`.
    pub magnitude: f64,
}

/// Stateless polar conversion with the centered case resolving to `0.0`.
///
/// # Examples
///
/// ```
/// use hmi_agent::mapping::polar::to_polar;
/// use std::f64::consts::FRAC_PI_4;
///
/// let polar = to_polar(0.6, 0.6);
/// assert!((polar.angle - FRAC_PI_4).abs() < 1e-12);
/// assert!((polar.magnitude - 0.848528).abs() < 1e-6);
///
/// // Saturated diagonal is clamped
/// assert_eq!(to_polar(1.0, 1.0).magnitude, 1.0);
/// ```
#[must_use]
pub fn to_polar(x: f64, y: f64) -> PolarVector {
    PolarVector {
        angle: direction(x, y),
        magnitude: clamp_magnitude(x.hypot(y)),
    }
}

#[inline]
fn direction(x: f64, y: f64) -> f64 {
    if x == 0.0 && y == 0.0 {
        return 0.0;
    }
    let angle = y.atan2(x);
    // atan2(-0.0, negative) lands on -π; fold it onto π
    if angle <= -PI {
        PI
    } else if angle.is_nan() {
        0.0
    } else {
        angle
    }
}

#[inline]
fn clamp_magnitude(magnitude: f64) -> f64 {
    if magnitude.is_nan() {
        0.0
    } else {
        magnitude.clamp(0.0, 1.0)
    }
}

/// Polar conversion that remembers the last reported direction.
#[derive(Debug, Clone, Default)]
pub struct PolarMapper {
    policy: CenteredDirection,
    last_angle: f64,
}

impl PolarMapper {
    #[must_use]
    pub fn new(policy: CenteredDirection) -> Self {
        Self {
            policy,
            last_angle: 0.0,
        }
    }

    #[must_use]
    pub fn policy(&self) -> CenteredDirection {
        self.policy
    }

    /// Direction reported by the most recent call.
    #[must_use]
    pub fn last_angle(&self) -> f64 {
        self.last_angle
    }

    /// Converts one frame's filtered axes.
    ///
    /// # Examples
    ///
    /// ```
    /// use hmi_agent::mapping::polar::{CenteredDirection, PolarMapper};
    /// use std::f64::consts::FRAC_PI_2;
    ///
    /// let mut mapper = PolarMapper::new(CenteredDirection::Hold);
    /// mapper.to_polar(0.0, 0.8);
    ///
    /// let centered = mapper.to_polar(0.0, 0.0);
    /// assert_eq!(centered.magnitude, 0.0);
    /// assert!((centered.angle - FRAC_PI_2).abs() < 1e-12);
    /// ```
    pub fn to_polar(&mut self, x: f64, y: f64) -> PolarVector {
        let centered = x == 0.0 && y == 0.0;
        let mut polar = to_polar(x, y);

        if centered && self.policy == CenteredDirection::Hold {
            polar.angle = self.last_angle;
        }

        self.last_angle = polar.angle;
        polar
    }
}
