//! # HMI Agent Library
//!
//! Maps joystick axes and buttons to swerve drivetrain HMI signals.
//!
//! The mapping core ([`mapping`]) is pure and synchronous: one
//! [`RawInputFrame`](mapping::frame::RawInputFrame) in, one
//! [`DriveCommand`](mapping::pipeline::DriveCommand) out, plus an optional
//! pose reset event. Everything around it (config, input sources, message
//! encoding, output sinks, the control loop) is host plumbing.

pub mod config;
pub mod control_loop;
pub mod error;
pub mod input;
pub mod mapping;
pub mod messages;
pub mod output;
