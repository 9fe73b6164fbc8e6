//! # Rotation Shaper
//!
//! Sign-preserving square curve for the rotation axis.
//!
//! The formula used is: `output = sign(z) * z²`, computed as `z * |z|`.
//! Small deflections are compressed for fine heading control while full
//! deflection still reaches `±1.0`.
//!
//! | Input | Output |
//! |-------|--------|
//! | 0.1   | 0.01   |
//! | 0.3   | 0.09   |
//! | 0.5   | 0.25   |
//! | 1.0   | 1.0    |

use super::frame::sanitize_axis;

/// Applies the square curve to an already deadbanded rotation reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationShaper;

impl RotationShaper {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Shapes a rotation reading.
    ///
    /// Input is clamped to `-1.0..=1.0` (NaN reads as `0.0`), so the output
    /// is always in `-1.0..=1.0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hmi_agent::mapping::rotation::RotationShaper;
    ///
    /// let shaper = RotationShaper::new();
    /// assert!((shaper.shape(0.3) - 0.09).abs() < 1e-12);
    /// assert!((shaper.shape(-0.3) + 0.09).abs() < 1e-12);
    /// assert_eq!(shaper.shape(1.0), 1.0);
    /// ```
    #[must_use]
    pub fn shape(&self, z: f64) -> f64 {
        let z = sanitize_axis(z);
        z * z.abs()
    }
}
