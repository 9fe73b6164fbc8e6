//! # Raw Input Frame
//!
//! A snapshot of one joystick's axes and buttons, plus the ids used to look
//! channels up in it.
//!
//! Axis values are nominally in `-1.0..=1.0`. Reads go through
//! [`RawInputFrame::axis`], which never fails: an unbound id, an id past the
//! end of the frame, or a NaN sample all read as `0.0`, and anything outside
//! the nominal range is clamped.
//!
//! ## Usage
//!
//! ```
//! use hmi_agent::mapping::frame::{AxisId, ButtonId, RawInputFrame};
//!
//! let frame = RawInputFrame::new(vec![0.6, -0.6], vec![false, true]);
//!
//! assert_eq!(frame.axis(AxisId::new(1)), -0.6);
//! assert_eq!(frame.axis(AxisId::UNBOUND), 0.0);
//! assert!(frame.button(ButtonId::new(1)));
//! assert!(!frame.button(ButtonId::UNBOUND));
//! ```

use serde::{Deserialize, Serialize};

/// Lower bound of a normalized axis reading.
pub const AXIS_MIN: f64 = -1.0;
/// Upper bound of a normalized axis reading.
pub const AXIS_MAX: f64 = 1.0;

/// Identifies a physical input axis. `-1` means unbound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AxisId(i32);

impl AxisId {
    /// An axis that is not wired to anything; always reads `0.0`.
    pub const UNBOUND: Self = Self(-1);

    #[must_use]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Channel index, or `None` when unbound (or otherwise negative).
    #[must_use]
    pub fn index(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl Default for AxisId {
    fn default() -> Self {
        Self::UNBOUND
    }
}

/// Identifies a physical input button. `-1` means unbound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ButtonId(i32);

impl ButtonId {
    /// A button that is not wired to anything; always reads not-pressed.
    pub const UNBOUND: Self = Self(-1);

    #[must_use]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Channel index, or `None` when unbound (or otherwise negative).
    #[must_use]
    pub fn index(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl Default for ButtonId {
    fn default() -> Self {
        Self::UNBOUND
    }
}

/// All axis values and button states of one joystick at one instant.
///
/// The default frame has no channels, so every read is neutral.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawInputFrame {
    #[serde(default)]
    axes: Vec<f64>,

    #[serde(default)]
    buttons: Vec<bool>,
}

impl RawInputFrame {
    #[must_use]
    pub fn new(axes: Vec<f64>, buttons: Vec<bool>) -> Self {
        Self { axes, buttons }
    }

    /// A frame where every axis reads `0.0` and every button is released.
    #[must_use]
    pub fn neutral() -> Self {
        Self::default()
    }

    /// Reads an axis, sanitized to `-1.0..=1.0`.
    #[must_use]
    pub fn axis(&self, id: AxisId) -> f64 {
        id.index()
            .and_then(|index| self.axes.get(index))
            .map_or(0.0, |&value| sanitize_axis(value))
    }

    /// Reads a button; unbound or missing buttons are never pressed.
    #[must_use]
    pub fn button(&self, id: ButtonId) -> bool {
        id.index()
            .and_then(|index| self.buttons.get(index))
            .copied()
            .unwrap_or(false)
    }

    #[must_use]
    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }

    #[must_use]
    pub fn button_count(&self) -> usize {
        self.buttons.len()
    }

    pub(crate) fn axes_mut(&mut self) -> &mut Vec<f64> {
        &mut self.axes
    }

    pub(crate) fn buttons_mut(&mut self) -> &mut Vec<bool> {
        &mut self.buttons
    }
}

/// Maps NaN to `0.0` and clamps everything else into the axis range.
#[inline]
#[must_use]
pub fn sanitize_axis(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(AXIS_MIN, AXIS_MAX)
    }
}
