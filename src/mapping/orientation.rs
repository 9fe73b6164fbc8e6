//! # Orientation Mode Latch
//!
//! Two-state latch selecting whether translation commands are robot-relative
//! or field-relative.
//!
//! Evaluated once per frame, in priority order:
//!
//! 1. robot-orient button pressed → [`OrientationMode::RobotRelative`]
//! 2. else field-orient button pressed → [`OrientationMode::FieldRelative`]
//! 3. else → unchanged
//!
//! Pressing both buttons in the same frame selects robot-relative. The latch
//! starts field-relative and is never reset automatically.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Frame of reference for translation commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrientationMode {
    /// Relative to the robot's own heading.
    RobotRelative,
    /// Relative to a fixed field frame.
    FieldRelative,
}

impl Default for OrientationMode {
    fn default() -> Self {
        Self::FieldRelative
    }
}

/// Latched orientation mode, toggled by two momentary buttons.
#[derive(Debug, Clone, Default)]
pub struct OrientationModeLatch {
    mode: OrientationMode,
}

impl OrientationModeLatch {
    /// Creates a latch in field-relative mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> OrientationMode {
        self.mode
    }

    /// Applies one frame's button states and returns the resulting mode.
    ///
    /// # Examples
    ///
    /// ```
    /// use hmi_agent::mapping::orientation::{OrientationMode, OrientationModeLatch};
    ///
    /// let mut latch = OrientationModeLatch::new();
    /// assert_eq!(latch.update(true, false), OrientationMode::RobotRelative);
    /// assert_eq!(latch.update(false, false), OrientationMode::RobotRelative);
    /// assert_eq!(latch.update(false, true), OrientationMode::FieldRelative);
    /// ```
    pub fn update(
        &mut self,
        robot_orient_pressed: bool,
        field_orient_pressed: bool,
    ) -> OrientationMode {
        let both_pressed = robot_orient_pressed && field_orient_pressed;
        if both_pressed && self.mode != OrientationMode::RobotRelative {
            warn!("Both orientation buttons pressed, robot-relative wins");
        }

        let next = if robot_orient_pressed {
            OrientationMode::RobotRelative
        } else if field_orient_pressed {
            OrientationMode::FieldRelative
        } else {
            self.mode
        };

        if next != self.mode {
            info!("Drivetrain orientation changed: {:?} -> {:?}", self.mode, next);
            self.mode = next;
        }

        self.mode
    }
}
