//! Wire format serializer

use crate::error::{OctowireError, Result};
use bytes::Bytes;
use serde_json::Value;

/// Encodes request payloads and decodes response bodies
pub trait JsonSerializer: Send + Sync {
    fn serialize(&self, value: &Value) -> Result<Bytes>;
    fn deserialize(&self, body: &[u8]) -> Result<Value>;
}

/// serde_json backed serializer, used whenever none is registered
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleJsonSerializer;

impl JsonSerializer for SimpleJsonSerializer {
    fn serialize(&self, value: &Value) -> Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(value)?))
    }

    fn deserialize(&self, body: &[u8]) -> Result<Value> {
        // 204 and friends carry no body at all
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(body).map_err(|e| {
            OctowireError::Response(format!(
                "Failed to parse response: {}. Body: {}",
                e,
                String::from_utf8_lossy(&body[..body.len().min(500)])
            ))
        })
    }
}
