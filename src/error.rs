//! # Error Types
//!
//! Custom error types for HMI Agent using `thiserror`.
//!
//! Only configuration and host I/O can fail. The input mapping core never
//! returns an error: malformed axis samples are sanitized instead.

use thiserror::Error;

/// Main error type for HMI Agent
#[derive(Debug, Error)]
pub enum HmiAgentError {
    /// TOML parsing errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration values that parse but are out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Message encoding or decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input source errors (device read failures, closed streams)
    #[error("Input error: {0}")]
    Input(String),

    /// No joystick device could be found
    #[error("No joystick device found")]
    DeviceNotFound,

    /// Output sink errors
    #[error("Output error: {0}")]
    Output(String),
}

/// Result type alias for HMI Agent
pub type Result<T> = std::result::Result<T, HmiAgentError>;
