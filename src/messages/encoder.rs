//! # Message Encoder
//!
//! Encodes output messages as JSON Lines.

use bytes::{BufMut, Bytes, BytesMut};

use super::protocol::OutputMessage;
use crate::error::Result;

/// Typical encoded size of an HMI signals line.
const LINE_CAPACITY: usize = 320;

/// Encode a message into one newline-terminated JSON line
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use hmi_agent::config::MappingConfig;
/// use hmi_agent::mapping::frame::RawInputFrame;
/// use hmi_agent::mapping::pipeline::InputMappingPipeline;
/// use hmi_agent::messages::encoder::encode_line;
/// use hmi_agent::messages::protocol::OutputMessage;
///
/// let mut pipeline = InputMappingPipeline::new(Arc::new(MappingConfig::default()));
/// let command = pipeline.process(&RawInputFrame::neutral()).command;
///
/// let line = encode_line(&OutputMessage::HmiSignals(command))?;
/// assert!(line.starts_with(b"{\"topic\":\"hmi_signals\""));
/// assert_eq!(line.last(), Some(&b'\n'));
/// # Ok::<(), hmi_agent::error::HmiAgentError>(())
/// ```
pub fn encode_line(message: &OutputMessage) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(LINE_CAPACITY);
    serde_json::to_writer((&mut buf).writer(), message)?;
    buf.put_u8(b'\n');
    Ok(buf.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::orientation::OrientationMode;
    use crate::mapping::pipeline::DriveCommand;
    use crate::messages::odometry::Odometry;
    use chrono::Utc;

    fn command() -> DriveCommand {
        DriveCommand {
            brake: true,
            forward_back: 0.6,
            left_right: 0.6,
            swerve_direction: std::f64::consts::FRAC_PI_4,
            swerve_percent_forward_velocity: 0.848528,
            swerve_percent_angular_rotation: 0.09,
            orientation_mode: OrientationMode::RobotRelative,
        }
    }

    #[test]
    fn test_single_line() {
        let line = encode_line(&OutputMessage::HmiSignals(command())).unwrap();
        assert_eq!(line.iter().filter(|&&b| b == b'\n').count(), 1);
        assert_eq!(line.last(), Some(&b'\n'));
    }

    #[test]
    fn test_hmi_signals_fields() {
        let line = encode_line(&OutputMessage::HmiSignals(command())).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&line).unwrap();
        assert_eq!(json["topic"], "hmi_signals");
        assert_eq!(json["drivetrain_brake"], true);
        assert_eq!(json["drivetrain_fwd_back"], 0.6);
        assert_eq!(json["drivetrain_swerve_percent_angular_rot"], 0.09);
        assert_eq!(json["drivetrain_orientation"], "robot_relative");
    }

    #[test]
    fn test_reset_heading_fields() {
        let odom = Odometry::reset_template(Utc::now(), "odom", "base_link");
        let line = encode_line(&OutputMessage::ResetHeading(odom)).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&line).unwrap();
        assert_eq!(json["topic"], "reset_heading");
        assert_eq!(json["child_frame_id"], "base_link");
        assert_eq!(json["pose"]["pose"]["orientation"]["w"], 1.0);
        assert_eq!(json["pose"]["covariance"].as_array().unwrap().len(), 36);
    }
}
