//! # Reset Heading Odometry
//!
//! The pose published when the driver requests a pose reset. Nothing in it
//! is computed: it is identity orientation, zero position, zero velocity and
//! a small fixed covariance, stamped with the current time.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Diagonal of the 6x6 pose covariance (x, y, z, roll, pitch, yaw).
pub const POSE_COVARIANCE_DIAGONAL: [f64; 6] = [0.001, 0.001, 0.001, 0.001, 0.001, 0.00001];

/// Diagonal of the 6x6 twist covariance.
pub const TWIST_COVARIANCE_DIAGONAL: [f64; 6] = [0.001; 6];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub stamp: DateTime<Utc>,
    pub frame_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pose {
    pub position: Vector3,
    pub orientation: Quaternion,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Twist {
    pub linear: Vector3,
    pub angular: Vector3,
}

/// Row-major 6x6 covariance is serialized as a flat 36 element list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoseWithCovariance {
    pub pose: Pose,
    pub covariance: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwistWithCovariance {
    pub twist: Twist,
    pub covariance: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Odometry {
    pub header: Header,
    pub child_frame_id: String,
    pub pose: PoseWithCovariance,
    pub twist: TwistWithCovariance,
}

impl Odometry {
    /// Builds the zero-pose reset message.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use hmi_agent::messages::odometry::{Odometry, Quaternion};
    ///
    /// let odom = Odometry::reset_template(Utc::now(), "odom", "base_link");
    /// assert_eq!(odom.pose.pose.orientation, Quaternion::IDENTITY);
    /// assert_eq!(odom.pose.covariance.len(), 36);
    /// ```
    #[must_use]
    pub fn reset_template(stamp: DateTime<Utc>, frame_id: &str, child_frame_id: &str) -> Self {
        Self {
            header: Header {
                stamp,
                frame_id: frame_id.to_string(),
            },
            child_frame_id: child_frame_id.to_string(),
            pose: PoseWithCovariance {
                pose: Pose {
                    position: Vector3::default(),
                    orientation: Quaternion::IDENTITY,
                },
                covariance: diagonal_covariance(&POSE_COVARIANCE_DIAGONAL),
            },
            twist: TwistWithCovariance {
                twist: Twist::default(),
                covariance: diagonal_covariance(&TWIST_COVARIANCE_DIAGONAL),
            },
        }
    }
}

/// Expands a 6 element diagonal into a row-major 6x6 matrix.
fn diagonal_covariance(diagonal: &[f64; 6]) -> Vec<f64> {
    let mut matrix = vec![0.0; 36];
    for (i, &value) in diagonal.iter().enumerate() {
        matrix[i * 6 + i] = value;
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn template() -> Odometry {
        let stamp = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        Odometry::reset_template(stamp, "odom", "base_link")
    }

    #[test]
    fn test_frame_ids() {
        let odom = template();
        assert_eq!(odom.header.frame_id, "odom");
        assert_eq!(odom.child_frame_id, "base_link");
    }

    #[test]
    fn test_zero_pose_and_twist() {
        let odom = template();
        assert_eq!(odom.pose.pose.position, Vector3::default());
        assert_eq!(odom.pose.pose.orientation, Quaternion::IDENTITY);
        assert_eq!(odom.twist.twist, Twist::default());
    }

    #[test]
    fn test_pose_covariance_diagonal() {
        let covariance = template().pose.covariance;
        assert_eq!(covariance.len(), 36);
        for row in 0..6 {
            for col in 0..6 {
                let value = covariance[row * 6 + col];
                if row == col {
                    assert_eq!(value, POSE_COVARIANCE_DIAGONAL[row]);
                } else {
                    assert_eq!(value, 0.0);
                }
            }
        }
        assert_eq!(covariance[35], 0.00001);
    }

    #[test]
    fn test_twist_covariance_diagonal() {
        let covariance = template().twist.covariance;
        assert_eq!(covariance.len(), 36);
        assert_eq!(covariance.iter().filter(|&&v| v != 0.0).count(), 6);
        assert!(covariance.iter().all(|&v| v == 0.0 || v == 0.001));
    }

    #[test]
    fn test_stamp_serialized_as_rfc3339() {
        let json = serde_json::to_value(template()).unwrap();
        assert_eq!(json["header"]["stamp"], "2024-03-01T12:00:00Z");
    }
}
