//! # Input Module
//!
//! Input delivery for the control loop.
//!
//! This module handles:
//! - Reading JSON Lines joystick/robot status messages from stdin or a file
//! - Reading a Linux joystick directly through evdev
//! - Selecting the drive joystick's frame out of a multi-joystick status
//! - Forwarding frames and robot-mode changes over a single mpsc queue, so
//!   the control loop is the only consumer and mapping calls stay serialized

pub mod evdev_source;
pub mod stream;

use crate::mapping::frame::RawInputFrame;
use crate::mapping::pipeline::RobotMode;

/// Capacity of the queue between input sources and the control loop.
pub const INPUT_QUEUE_CAPACITY: usize = 64;

/// Something an input source delivers to the control loop.
#[derive(Debug, Clone, PartialEq)]
pub enum HostInput {
    /// A new frame from the drive joystick
    Frame(RawInputFrame),
    /// The robot controller changed state
    RobotMode(RobotMode),
}
