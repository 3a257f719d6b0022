//! Message parser for agent process output
//!
//! One wire line in, one [`Message`] out. A missing or unrecognized `type`
//! field is a protocol error; the raw line travels with the error so the
//! caller can log it.

use crate::error::{BridgeError, Result};
use crate::types::messages::Message;

/// Decode a single wire line into a typed [`Message`]
///
/// # Errors
/// Returns `BridgeError::MessageParse` carrying the raw line when it is not
/// JSON, has no `type` field, or a recognized type's required fields are
/// absent or mistyped
pub fn decode_line(line: &str) -> Result<Message> {
    let value: serde_json::Value = serde_json::from_str(line).map_err(|e| {
        BridgeError::message_parse(
            format!("Invalid JSON line: {e}"),
            Some(serde_json::Value::String(line.to_string())),
        )
    })?;
    parse_message(value)
}

/// Parse a JSON value into a typed [`Message`]
///
/// # Errors
/// Returns `BridgeError::MessageParse` if the value cannot be parsed into a
/// valid message; the offending value is retained on the error
pub fn parse_message(data: serde_json::Value) -> Result<Message> {
    serde_json::from_value(data.clone()).map_err(|e| {
        BridgeError::message_parse(format!("Failed to parse message: {e}"), Some(data))
    })
}
