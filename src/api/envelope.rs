// Response envelope module
// Every API answer is wrapped as {code, success, message, result}

use hyper::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::logger;

/// Uniform response wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub code: u16,
    pub success: bool,
    pub message: String,
    /// Payload, keyed by the name of the data it carries
    pub result: Option<Map<String, Value>>,
}

/// Envelope plus the HTTP status the transport should send
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: StatusCode,
    pub envelope: Envelope,
}

impl Reply {
    /// Serialize the envelope to JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.envelope).unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to serialize envelope: {e}"));
            crate::http::response::INTERNAL_ERROR_BODY.to_string()
        })
    }
}

/// Payload handed to the envelope builder was not a JSON object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    NotAMapping(&'static str),
}

impl fmt::Display for EnvelopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAMapping(kind) => {
                write!(f, "envelope result must be an object or absent, got {kind}")
            }
        }
    }
}

impl std::error::Error for EnvelopeError {}

/// Wrap `data` in the uniform envelope.
///
/// `success` is derived from `status` (any 2xx). `data` must be a JSON
/// object when present.
pub fn create_response(
    data: Option<Value>,
    status: StatusCode,
    message: &str,
) -> Result<Reply, EnvelopeError> {
    let result = match data {
        None => None,
        Some(Value::Object(map)) => Some(map),
        Some(other) => return Err(EnvelopeError::NotAMapping(value_kind(&other))),
    };

    Ok(Reply {
        status,
        envelope: Envelope {
            code: status.as_u16(),
            success: status.is_success(),
            message: message.to_string(),
            result,
        },
    })
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_follows_status() {
        for (status, success) in [
            (StatusCode::OK, true),
            (StatusCode::CREATED, true),
            (StatusCode::NOT_FOUND, false),
            (StatusCode::UNPROCESSABLE_ENTITY, false),
            (StatusCode::PERMANENT_REDIRECT, false),
        ] {
            let reply = create_response(None, status, "").unwrap();
            assert_eq!(reply.envelope.success, success, "status {status}");
            assert_eq!(reply.envelope.code, status.as_u16());
            assert_eq!(reply.status, status);
        }
    }

    #[test]
    fn test_object_payload() {
        let reply = create_response(Some(json!({"content": "hi"})), StatusCode::OK, "ok").unwrap();
        assert_eq!(
            serde_json::to_value(&reply.envelope).unwrap(),
            json!({"code": 200, "success": true, "message": "ok", "result": {"content": "hi"}})
        );
    }

    #[test]
    fn test_absent_payload_serializes_as_null() {
        let reply = create_response(None, StatusCode::OK, "Show deleted").unwrap();
        let json: Value = serde_json::from_str(&reply.to_json()).unwrap();
        assert!(json["result"].is_null());
        assert_eq!(json["message"], "Show deleted");
    }

    #[test]
    fn test_non_mapping_payload_is_rejected() {
        let err = create_response(Some(json!([1, 2])), StatusCode::OK, "").unwrap_err();
        assert_eq!(err, EnvelopeError::NotAMapping("an array"));

        let err = create_response(Some(json!("text")), StatusCode::OK, "").unwrap_err();
        assert!(err.to_string().contains("a string"));
    }
}
