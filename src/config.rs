//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and every field is optional. A missing axis or button id
//! defaults to `-1` (unbound) and both deadbands default to `0.05`.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{HmiAgentError, Result};
use crate::mapping::frame::{AxisId, ButtonId};
use crate::mapping::polar::CenteredDirection;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub drive: MappingConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Axis/button bindings, inversion flags and deadbands for the drive joystick.
///
/// Built once at startup and read-only afterwards. It holds no interior
/// mutability, so it can be shared across threads behind an `Arc` without
/// locking.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MappingConfig {
    #[serde(default)]
    pub drive_fwd_back_axis_id: AxisId,

    #[serde(default)]
    pub drive_fwd_back_axis_inverted: bool,

    #[serde(default)]
    pub drive_left_right_axis_id: AxisId,

    #[serde(default)]
    pub drive_left_right_axis_inverted: bool,

    #[serde(default)]
    pub drive_z_axis_id: AxisId,

    #[serde(default)]
    pub drive_z_axis_inverted: bool,

    #[serde(default = "default_deadband")]
    pub drive_axis_deadband: f64,

    #[serde(default = "default_deadband")]
    pub drive_z_axis_deadband: f64,

    #[serde(default)]
    pub robot_orient_button_id: ButtonId,

    #[serde(default)]
    pub field_orient_button_id: ButtonId,

    #[serde(default)]
    pub brake_button_id: ButtonId,

    #[serde(default)]
    pub reset_odometry_button_id: ButtonId,

    #[serde(default)]
    pub centered_direction: CenteredDirection,
}

/// Where input frames come from
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputSourceKind {
    /// JSON Lines messages on stdin or a file
    #[default]
    Stream,
    /// A Linux joystick read through evdev
    Evdev,
}

/// What the control loop feeds the pipeline when input goes stale
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StalePolicy {
    /// Feed a neutral frame (all axes 0, all buttons released)
    #[default]
    Zero,
    /// Re-feed the last frame that arrived
    Hold,
}

/// Input delivery configuration
#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    #[serde(default)]
    pub source: InputSourceKind,

    /// Stream path; empty reads stdin.
    #[serde(default)]
    pub stream_path: String,

    /// Evdev device path; empty auto-detects.
    #[serde(default)]
    pub device_path: String,

    #[serde(default)]
    pub drive_joystick_index: usize,

    #[serde(default = "default_axis_min")]
    pub axis_min: i32,

    #[serde(default = "default_axis_max")]
    pub axis_max: i32,

    #[serde(default = "default_stale_timeout_ms")]
    pub stale_timeout_ms: u64,

    #[serde(default)]
    pub stale_policy: StalePolicy,
}

/// Output sink selection
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Stdout,
    File,
}

/// Output delivery configuration
#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default)]
    pub sink: SinkKind,

    #[serde(default)]
    pub path: String,

    #[serde(default = "default_odom_frame_id")]
    pub odom_frame_id: String,

    #[serde(default = "default_child_frame_id")]
    pub child_frame_id: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily rolling log files; empty logs to stderr only.
    #[serde(default)]
    pub log_dir: String,
}

// Default value functions
fn default_deadband() -> f64 { 0.05 }

fn default_axis_min() -> i32 { 0 }
fn default_axis_max() -> i32 { 255 }
fn default_stale_timeout_ms() -> u64 { 500 }

fn default_odom_frame_id() -> String { "odom".to_string() }
fn default_child_frame_id() -> String { "base_link".to_string() }

fn default_log_level() -> String { "info".to_string() }

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            drive_fwd_back_axis_id: AxisId::UNBOUND,
            drive_fwd_back_axis_inverted: false,
            drive_left_right_axis_id: AxisId::UNBOUND,
            drive_left_right_axis_inverted: false,
            drive_z_axis_id: AxisId::UNBOUND,
            drive_z_axis_inverted: false,
            drive_axis_deadband: default_deadband(),
            drive_z_axis_deadband: default_deadband(),
            robot_orient_button_id: ButtonId::UNBOUND,
            field_orient_button_id: ButtonId::UNBOUND,
            brake_button_id: ButtonId::UNBOUND,
            reset_odometry_button_id: ButtonId::UNBOUND,
            centered_direction: CenteredDirection::default(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            source: InputSourceKind::default(),
            stream_path: String::new(),
            device_path: String::new(),
            drive_joystick_index: 0,
            axis_min: default_axis_min(),
            axis_max: default_axis_max(),
            stale_timeout_ms: default_stale_timeout_ms(),
            stale_policy: StalePolicy::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sink: SinkKind::default(),
            path: String::new(),
            odom_frame_id: default_odom_frame_id(),
            child_frame_id: default_child_frame_id(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: String::new(),
        }
    }
}

fn invalid(msg: impl Into<String>) -> HmiAgentError {
    HmiAgentError::InvalidConfig(msg.into())
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use hmi_agent::config::Config;
    ///
    /// let config = Config::load("config/hmi_agent.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        self.drive.validate()?;

        if self.input.axis_min >= self.input.axis_max {
            return Err(invalid("axis_min must be less than axis_max"));
        }

        if self.input.stale_timeout_ms == 0 || self.input.stale_timeout_ms > 60000 {
            return Err(invalid("stale_timeout_ms must be between 1 and 60000"));
        }

        if self.output.sink == SinkKind::File && self.output.path.is_empty() {
            return Err(invalid("output path cannot be empty when sink is 'file'"));
        }

        if self.output.odom_frame_id.is_empty() || self.output.child_frame_id.is_empty() {
            return Err(invalid("odom_frame_id and child_frame_id cannot be empty"));
        }

        if self.logging.level.is_empty() {
            return Err(invalid("logging level cannot be empty"));
        }

        Ok(())
    }
}

impl MappingConfig {
    /// Validate deadbands and id ranges.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a negative, non-finite or greater than 1
    /// deadband, or for an id below `-1`.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("drive_axis_deadband", self.drive_axis_deadband),
            ("drive_z_axis_deadband", self.drive_z_axis_deadband),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("{} must be between 0.0 and 1.0", name)));
            }
        }

        for (name, id) in self.axis_bindings() {
            if id.raw() < AxisId::UNBOUND.raw() {
                return Err(invalid(format!("{} must be -1 (unbound) or >= 0", name)));
            }
        }

        for (name, id) in self.button_bindings() {
            if id.raw() < ButtonId::UNBOUND.raw() {
                return Err(invalid(format!("{} must be -1 (unbound) or >= 0", name)));
            }
        }

        Ok(())
    }

    /// Check every bound id against the channels an input source provides.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first binding that references an
    /// axis or button the source does not have.
    pub fn validate_bindings(&self, axis_count: usize, button_count: usize) -> Result<()> {
        for (name, id) in self.axis_bindings() {
            if let Some(index) = id.index() {
                if index >= axis_count {
                    return Err(invalid(format!(
                        "{} = {} but the input source provides {} axes",
                        name, index, axis_count
                    )));
                }
            }
        }

        for (name, id) in self.button_bindings() {
            if let Some(index) = id.index() {
                if index >= button_count {
                    return Err(invalid(format!(
                        "{} = {} but the input source provides {} buttons",
                        name, index, button_count
                    )));
                }
            }
        }

        Ok(())
    }

    fn axis_bindings(&self) -> [(&'static str, AxisId); 3] {
        [
            ("drive_fwd_back_axis_id", self.drive_fwd_back_axis_id),
            ("drive_left_right_axis_id", self.drive_left_right_axis_id),
            ("drive_z_axis_id", self.drive_z_axis_id),
        ]
    }

    fn button_bindings(&self) -> [(&'static str, ButtonId); 4] {
        [
            ("robot_orient_button_id", self.robot_orient_button_id),
            ("field_orient_button_id", self.field_orient_button_id),
            ("brake_button_id", self.brake_button_id),
            ("reset_odometry_button_id", self.reset_odometry_button_id),
        ]
    }
}
