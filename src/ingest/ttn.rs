use crate::error::{Result, WifiLocError};
use base64::Engine;
use serde_json::Value;

/// Largest webhook body accepted before parsing
pub const MAX_WEBHOOK_BODY_SIZE: usize = 1024 * 1024; // 1MB

/// TTN v3 uplink webhook body.
///
/// Kept as raw JSON: only `uplink_message.frm_payload` decides the outcome,
/// the other fields are read leniently for log context.
#[derive(Debug, Clone)]
pub struct TtnUplink {
    body: Value,
}

impl TtnUplink {
    /// Parse a raw webhook body
    pub fn parse(body: &[u8]) -> Result<Self> {
        if body.len() > MAX_WEBHOOK_BODY_SIZE {
            return Err(WifiLocError::PayloadTooLarge {
                size: body.len(),
                max: MAX_WEBHOOK_BODY_SIZE,
            });
        }
        Ok(Self {
            body: serde_json::from_slice(body)?,
        })
    }

    /// Base64 `frm_payload`; `Ok(None)` when the field is absent.
    ///
    /// A field that is present but not a string (including `null`) is an error.
    pub fn frm_payload(&self) -> Result<Option<&str>> {
        match self.body.pointer("/uplink_message/frm_payload") {
            None => Ok(None),
            Some(Value::String(encoded)) => Ok(Some(encoded.as_str())),
            Some(other) => Err(WifiLocError::InvalidPayload(format!(
                "frm_payload must be a Base64 string, got {}",
                json_kind(other)
            ))),
        }
    }

    /// Device name for log context
    pub fn device_id(&self) -> Option<&str> {
        self.body
            .pointer("/end_device_ids/device_id")
            .or_else(|| self.body.pointer("/end_device_ids/dev_eui"))
            .and_then(Value::as_str)
    }

    pub fn f_cnt(&self) -> Option<u64> {
        self.body
            .pointer("/uplink_message/f_cnt")
            .and_then(Value::as_u64)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Decode a Base64 `frm_payload` into the raw frame bytes
pub fn decode_frm_payload(encoded: &str) -> Result<Vec<u8>> {
    Ok(base64::engine::general_purpose::STANDARD.decode(encoded.trim())?)
}
