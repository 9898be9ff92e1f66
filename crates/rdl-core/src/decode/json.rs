use super::DecodeError;
use serde_json::Value;

/// Parses `bytes` as a single JSON document of any shape.
pub fn decode_json(bytes: &[u8]) -> Result<Value, DecodeError> {
    Ok(serde_json::from_slice(bytes)?)
}
