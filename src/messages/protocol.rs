//! # Message Definitions
//!
//! Input lines are tagged with `type`:
//!
//! ```text
//! {"type":"joystick_status","joysticks":[{"axes":[0.0,-0.6],"buttons":[false,true]}]}
//! {"type":"robot_status","robot_state":"autonomous"}
//! ```
//!
//! Output lines are tagged with `topic`:
//!
//! ```text
//! {"topic":"hmi_signals","drivetrain_brake":false,"drivetrain_fwd_back":0.6,...}
//! {"topic":"reset_heading","header":{...},"child_frame_id":"base_link",...}
//! ```

use serde::{Deserialize, Serialize};

use super::odometry::Odometry;
use crate::mapping::frame::RawInputFrame;
use crate::mapping::pipeline::{DriveCommand, RobotMode};

/// Input topic carrying joystick frames.
pub const TOPIC_JOYSTICK_STATUS: &str = "joystick_status";
/// Input topic carrying the robot state.
pub const TOPIC_ROBOT_STATUS: &str = "robot_status";
/// Output topic carrying drive commands.
pub const TOPIC_HMI_SIGNALS: &str = "hmi_signals";
/// Output topic carrying pose reset odometry.
pub const TOPIC_RESET_HEADING: &str = "reset_heading";

/// Snapshot of every connected joystick, indexed by joystick number.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JoystickStatus {
    #[serde(default)]
    pub joysticks: Vec<RawInputFrame>,
}

impl JoystickStatus {
    /// Frame for one joystick, if present.
    #[must_use]
    pub fn joystick(&self, index: usize) -> Option<&RawInputFrame> {
        self.joysticks.get(index)
    }
}

/// Robot controller state notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotStatus {
    pub robot_state: RobotMode,
}

/// A decoded input line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputMessage {
    JoystickStatus(JoystickStatus),
    RobotStatus(RobotStatus),
}

/// A message to publish.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "topic", rename_all = "snake_case")]
pub enum OutputMessage {
    HmiSignals(DriveCommand),
    ResetHeading(Odometry),
}

impl OutputMessage {
    #[must_use]
    pub fn topic(&self) -> &'static str {
        match self {
            Self::HmiSignals(_) => TOPIC_HMI_SIGNALS,
            Self::ResetHeading(_) => TOPIC_RESET_HEADING,
        }
    }
}
