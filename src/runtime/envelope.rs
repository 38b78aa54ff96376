//! The `{ "type": ..., "payload": ... }` wire envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ClientError;

/// An inbound message routed by its `type` discriminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub payload: Value,
}

impl Envelope {
    pub fn new(message_type: impl Into<String>, payload: Value) -> Self {
        Self {
            message_type: message_type.into(),
            payload,
        }
    }
}

#[derive(Serialize)]
struct OutboundEnvelope<'a, T: ?Sized> {
    #[serde(rename = "type")]
    message_type: &'a str,
    payload: &'a T,
}

/// Serialize `payload` inside an envelope, `type` first.
pub fn encode_envelope<T>(message_type: &str, payload: &T) -> Result<String, ClientError>
where
    T: Serialize + ?Sized,
{
    serde_json::to_string(&OutboundEnvelope {
        message_type,
        payload,
    })
    .map_err(|e| ClientError::SendFailure {
        reason: e.to_string(),
    })
}

/// Decode one text frame.
///
/// Invalid JSON is a [`ClientError::DecodeFailure`]. Valid JSON that is not an
/// object with a string `type` field yields `Ok(None)`; such frames are not
/// routable. A missing `payload` decodes as `null`.
pub fn decode_frame(text: &str) -> Result<Option<Envelope>, ClientError> {
    let value: Value = serde_json::from_str(text).map_err(|e| ClientError::DecodeFailure {
        reason: e.to_string(),
    })?;
    let Value::Object(mut object) = value else {
        return Ok(None);
    };
    let Some(Value::String(message_type)) = object.remove("type") else {
        return Ok(None);
    };
    let payload = object.remove("payload").unwrap_or(Value::Null);
    Ok(Some(Envelope {
        message_type,
        payload,
    }))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_puts_type_first() {
        let text = encode_envelope("GpioMessage", &json!({ "status": "high" })).unwrap();
        assert_eq!(text, r#"{"type":"GpioMessage","payload":{"status":"high"}}"#);
    }

    #[test]
    fn test_decode_envelope() {
        let envelope = decode_frame(r#"{"type":"GpioMessage","payload":{"status":"high"}}"#)
            .unwrap()
            .unwrap();
        assert_eq!(envelope.message_type, "GpioMessage");
        assert_eq!(envelope.payload, json!({ "status": "high" }));
    }

    #[test]
    fn test_missing_payload_is_null() {
        let envelope = decode_frame(r#"{"type":"ping"}"#).unwrap().unwrap();
        assert_eq!(envelope, Envelope::new("ping", Value::Null));
    }

    #[test]
    fn test_unroutable_frames() {
        assert_eq!(decode_frame(r#"{"payload":1}"#).unwrap(), None);
        assert_eq!(decode_frame(r#"{"type":7}"#).unwrap(), None);
        assert_eq!(decode_frame("[1,2]").unwrap(), None);
        assert_eq!(decode_frame("\"text\"").unwrap(), None);
    }

    #[test]
    fn test_invalid_json_is_decode_failure() {
        let err = decode_frame("{not json").unwrap_err();
        assert!(matches!(err, ClientError::DecodeFailure { .. }));
    }
}
