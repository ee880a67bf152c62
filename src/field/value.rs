//! Column values
//!
//! The decoded form of every field codec.

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use serde::Serialize;

use crate::blob::BlobRef;
use crate::error::{Result, RowDbError};

/// A single column value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer for `Num` integer kinds
    Int(i64),

    /// Float for `Num` float kinds
    Float(f64),

    /// Wide integer for `Big` kinds (covers both i64 and u64)
    Big(i128),

    /// Milliseconds since the unix epoch
    DateTime(i64),

    /// Text for `InlineText` and blob-backed `Text`
    Text(String),

    /// Payload to store in a `Binary` column
    Bytes(Bytes),

    /// Committed payload of a `Binary` column
    Blob(BlobRef),

    /// Document for `Json` columns
    Json(serde_json::Value),
}

impl Value {
    /// Current wall-clock time as a `DateTime`
    pub fn now() -> Self {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        Value::DateTime(ms)
    }

    /// Serialize any value into a `Json` column value
    pub fn json<T: Serialize>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Value::Json)
            .map_err(|e| RowDbError::Encoding(format!("json: {}", e)))
    }

    /// Name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Big(_) => "big",
            Value::DateTime(_) => "datetime",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Blob(_) => "blob",
            Value::Json(_) => "json",
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Big(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_big(&self) -> Option<i128> {
        match self {
            Value::Big(n) => Some(*n),
            Value::Int(n) => Some(*n as i128),
            _ => None,
        }
    }

    /// Milliseconds since the epoch
    pub fn as_datetime(&self) -> Option<i64> {
        match self {
            Value::DateTime(ms) => Some(*ms),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&BlobRef> {
        match self {
            Value::Blob(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Render the value for display (CLI output, logs)
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as J;
        match self {
            Value::Int(n) => J::from(*n),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(J::Number)
                .unwrap_or(J::Null),
            Value::Big(n) => match (i64::try_from(*n), u64::try_from(*n)) {
                (Ok(v), _) => J::from(v),
                (_, Ok(v)) => J::from(v),
                _ => J::String(n.to_string()),
            },
            Value::DateTime(ms) => J::from(*ms),
            Value::Text(s) => J::String(s.clone()),
            Value::Bytes(b) => J::String(hex::encode(b)),
            Value::Blob(b) => J::String(b.digest().to_hex()),
            Value::Json(v) => v.clone(),
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Big(n as i128)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(Bytes::from(b))
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(Bytes::copy_from_slice(b))
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl From<BlobRef> for Value {
    fn from(b: BlobRef) -> Self {
        Value::Blob(b)
    }
}
