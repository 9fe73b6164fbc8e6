//! # Input Mapping Pipeline
//!
//! Turns one [`RawInputFrame`] from the drive joystick into a
//! [`DriveCommand`] and, on a reset-button rising edge, a [`PoseResetEvent`].
//!
//! ## Per-frame steps
//!
//! | Step | Field | Source |
//! |------|-------|--------|
//! | 1 | `brake` | brake button, unfiltered |
//! | 2 | `forward_back`, `left_right` | inverted then deadbanded translation axes |
//! | 3 | `swerve_direction`, `swerve_percent_forward_velocity` | [`PolarMapper`] over step 2 |
//! | 4 | `swerve_percent_angular_rotation` | own deadband, then [`RotationShaper`] |
//! | 5 | `orientation_mode` | [`OrientationModeLatch`] |
//! | 6 | reset event | [`ResetEventDetector`] |
//!
//! The pipeline owns all state carried between frames, so one instance
//! belongs to one control loop. Calls must be serialized; the
//! [`MappingConfig`] itself is shared read-only through an `Arc`.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use hmi_agent::config::MappingConfig;
//! use hmi_agent::mapping::frame::{AxisId, RawInputFrame};
//! use hmi_agent::mapping::pipeline::InputMappingPipeline;
//!
//! let config = MappingConfig {
//!     drive_fwd_back_axis_id: AxisId::new(1),
//!     drive_fwd_back_axis_inverted: true,
//!     drive_left_right_axis_id: AxisId::new(0),
//!     ..MappingConfig::default()
//! };
//! let mut pipeline = InputMappingPipeline::new(Arc::new(config));
//!
//! let output = pipeline.process(&RawInputFrame::new(vec![0.6, -0.6], vec![]));
//! assert!((output.command.forward_back - 0.6).abs() < 1e-12);
//! assert!((output.command.left_right - 0.6).abs() < 1e-12);
//! assert!(output.reset.is_none());
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::deadband::DeadbandFilter;
use super::frame::{AxisId, RawInputFrame};
use super::orientation::{OrientationMode, OrientationModeLatch};
use super::polar::PolarMapper;
use super::reset::{PoseResetEvent, ResetEventDetector};
use super::rotation::RotationShaper;
use crate::config::MappingConfig;

/// Operating state reported by the robot controller.
///
/// Passed through to the host; it does not change the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotMode {
    #[default]
    Disabled,
    Teleop,
    Autonomous,
    Test,
}

/// Drivetrain command produced for every frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DriveCommand {
    #[serde(rename = "drivetrain_brake")]
    pub brake: bool,

    #[serde(rename = "drivetrain_fwd_back")]
    pub forward_back: f64,

    #[serde(rename = "drivetrain_left_right")]
    pub left_right: f64,

    /// Radians, `(-π, π]`.
    #[serde(rename = "drivetrain_swerve_direction")]
    pub swerve_direction: f64,

    /// `0.0..=1.0`.
    #[serde(rename = "drivetrain_swerve_percent_fwd_vel")]
    pub swerve_percent_forward_velocity: f64,

    /// `-1.0..=1.0`.
    #[serde(rename = "drivetrain_swerve_percent_angular_rot")]
    pub swerve_percent_angular_rotation: f64,

    #[serde(rename = "drivetrain_orientation")]
    pub orientation_mode: OrientationMode,
}

/// Everything one frame produces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappingOutput {
    pub command: DriveCommand,
    pub reset: Option<PoseResetEvent>,
}

/// Per-robot mapping state plus the shared configuration.
#[derive(Debug, Clone)]
pub struct InputMappingPipeline {
    config: Arc<MappingConfig>,
    translation_deadband: DeadbandFilter,
    rotation_deadband: DeadbandFilter,
    rotation: RotationShaper,
    polar: PolarMapper,
    orientation: OrientationModeLatch,
    reset: ResetEventDetector,
    robot_mode: RobotMode,
}

impl InputMappingPipeline {
    #[must_use]
    pub fn new(config: Arc<MappingConfig>) -> Self {
        Self {
            translation_deadband: DeadbandFilter::new(config.drive_axis_deadband),
            rotation_deadband: DeadbandFilter::new(config.drive_z_axis_deadband),
            rotation: RotationShaper::new(),
            polar: PolarMapper::new(config.centered_direction),
            orientation: OrientationModeLatch::new(),
            reset: ResetEventDetector::new(),
            robot_mode: RobotMode::default(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    #[must_use]
    pub fn orientation_mode(&self) -> OrientationMode {
        self.orientation.mode()
    }

    #[must_use]
    pub fn robot_mode(&self) -> RobotMode {
        self.robot_mode
    }

    #[must_use]
    pub fn is_autonomous(&self) -> bool {
        self.robot_mode == RobotMode::Autonomous
    }

    /// Records the robot state reported by the host.
    pub fn set_robot_mode(&mut self, mode: RobotMode) {
        if mode != self.robot_mode {
            info!("Robot mode changed: {:?} -> {:?}", self.robot_mode, mode);
            self.robot_mode = mode;
        }
    }

    /// Maps one frame. Never fails; every frame yields a command.
    pub fn process(&mut self, frame: &RawInputFrame) -> MappingOutput {
        let config = &*self.config;

        let brake = frame.button(config.brake_button_id);

        let forward_back = self.translation_deadband.apply(read_axis(
            frame,
            config.drive_fwd_back_axis_id,
            config.drive_fwd_back_axis_inverted,
        ));
        let left_right = self.translation_deadband.apply(read_axis(
            frame,
            config.drive_left_right_axis_id,
            config.drive_left_right_axis_inverted,
        ));

        let polar = self.polar.to_polar(forward_back, left_right);

        let z = self.rotation_deadband.apply(read_axis(
            frame,
            config.drive_z_axis_id,
            config.drive_z_axis_inverted,
        ));
        let rotation = self.rotation.shape(z);

        let orientation_mode = self.orientation.update(
            frame.button(config.robot_orient_button_id),
            frame.button(config.field_orient_button_id),
        );

        let reset = self.reset.update(frame.button(config.reset_odometry_button_id));

        let command = DriveCommand {
            brake,
            forward_back,
            left_right,
            swerve_direction: polar.angle,
            swerve_percent_forward_velocity: polar.magnitude,
            swerve_percent_angular_rotation: rotation,
            orientation_mode,
        };

        debug!(
            "Mapped frame: dir={:.3} vel={:.3} rot={:.3} brake={} mode={:?}",
            command.swerve_direction,
            command.swerve_percent_forward_velocity,
            command.swerve_percent_angular_rotation,
            command.brake,
            command.orientation_mode
        );

        MappingOutput { command, reset }
    }
}

/// Reads an axis and applies its inversion flag.
#[inline]
fn read_axis(frame: &RawInputFrame, id: AxisId, inverted: bool) -> f64 {
    let value = frame.axis(id);
    if inverted {
        -value
    } else {
        value
    }
}
