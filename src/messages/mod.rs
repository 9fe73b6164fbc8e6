//! # Messages Module
//!
//! Host-side message schema and its JSON Lines encoding.
//!
//! This module handles:
//! - Joystick status and robot status messages coming in
//! - HMI signal and reset-heading messages going out
//! - The fixed zero-pose odometry template published on pose reset
//! - One JSON object per line, tagged by `type` (in) or `topic` (out)

pub mod decoder;
pub mod encoder;
pub mod odometry;
pub mod protocol;
