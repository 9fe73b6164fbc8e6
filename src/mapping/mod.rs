//! # Mapping Module
//!
//! Joystick input mapping for the swerve drivetrain.
//!
//! This module handles:
//! - Reading axes and buttons from a raw frame (unbound ids read neutral)
//! - Deadband filtering of the drive axes
//! - Cartesian to polar conversion of the translation stick
//! - Square shaping of the rotation axis
//! - The robot/field orientation latch
//! - Rising-edge detection of the pose-reset button
//!
//! Everything here is synchronous arithmetic with no I/O.

pub mod deadband;
pub mod frame;
pub mod orientation;
pub mod pipeline;
pub mod polar;
pub mod reset;
pub mod rotation;
