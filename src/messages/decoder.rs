//! # Message Decoder
//!
//! Decodes JSON Lines input messages.

use super::protocol::InputMessage;
use crate::error::Result;

/// Decode one input line
///
/// # Returns
///
/// * `Ok(None)` - blank line or `#` comment
/// * `Ok(Some(message))` - decoded message
///
/// # Errors
///
/// Returns `Json` error if the line is not a valid input message.
pub fn decode_line(line: &str) -> Result<Option<InputMessage>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let message = serde_json::from_str(trimmed)?;
    Ok(Some(message))
}
