//! JSON codec for the host channel
//!
//! The host exchanges one JSON document per message. Requests are decoded
//! into [`Request`], replies encoded from [`Reply`]; results are turned into
//! payload values with [`to_payload`].

use serde::Serialize;
use serde_json::Value;

use crate::envelope::{Reply, Request};
use crate::BridgeError;

/// Decode one request document
pub fn decode_request(text: &str) -> Result<Request, BridgeError> {
    Ok(serde_json::from_str(text)?)
}

/// Encode one reply document
pub fn encode_reply(reply: &Reply) -> Result<String, BridgeError> {
    Ok(serde_json::to_string(reply)?)
}

/// Convert a result into a reply payload
pub fn to_payload<T: Serialize>(value: &T) -> Result<Value, BridgeError> {
    Ok(serde_json::to_value(value)?)
}

/// Integer-boolean used by `isAvailable` and `isCalibrationNeeded`
pub fn flag(value: bool) -> Value {
    Value::from(if value { 1 } else { 0 })
}
