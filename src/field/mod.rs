//! Field Module
//!
//! Per-column codecs: every column of a schema is one `Field`.
//!
//! ## Responsibilities
//! - Report a constant byte size per field instance
//! - Pack a `Value` into the front of a row slice
//! - Unpack a standalone slice, or read a value from a stream
//!
//! ## Wire Formats
//! ```text
//! ┌──────────────┬──────────┬───────────────────────────────────────────┐
//! │ Field        │ Size     │ Encoding                                  │
//! ├──────────────┼──────────┼───────────────────────────────────────────┤
//! │ Num(kind)    │ 1/2/4/8  │ big-endian integer or IEEE float          │
//! │ Big(kind)    │ 8        │ big-endian i64 / u64                      │
//! │ DateTime     │ 8        │ big-endian i64, ms since epoch            │
//! │ InlineText   │ cap + 1  │ [len: u8][utf-8][zero fill]               │
//! │ Binary(dir)  │ 32       │ SHA-256 digest of blob in dir             │
//! │ Text(dir)    │ 32       │ digest of utf-8 blob                      │
//! │ Json(dir)    │ 32       │ digest of serialized JSON blob            │
//! └──────────────┴──────────┴───────────────────────────────────────────┘
//! ```

mod num;
mod text;
mod value;

use std::fmt;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::str::FromStr;

use bytes::Bytes;

use crate::blob::{BlobStore, Digest, DIGEST_SIZE};
use crate::error::{Result, RowDbError};

pub use num::{BigType, NumType};
pub use text::{InlineText, MAX_INLINE_CAPACITY};
pub use value::Value;

use num::mismatch;

/// Codec for a single column
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Num(NumType),
    Big(BigType),
    DateTime,
    InlineText(InlineText),
    Binary(BlobStore),
    Text(BlobStore),
    Json(BlobStore),
}

impl Field {
    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn num(kind: NumType) -> Self {
        Field::Num(kind)
    }

    pub fn big(kind: BigType) -> Self {
        Field::Big(kind)
    }

    pub fn datetime() -> Self {
        Field::DateTime
    }

    /// Inline text holding at most `capacity` bytes (capacity ≤ 255)
    pub fn inline_text(capacity: usize) -> Result<Self> {
        InlineText::new(capacity).map(Field::InlineText)
    }

    /// Raw payloads stored as blobs under `dir`
    pub fn binary(dir: impl Into<PathBuf>) -> Self {
        Field::Binary(BlobStore::new(dir))
    }

    /// UTF-8 text stored as blobs under `dir`
    pub fn text(dir: impl Into<PathBuf>) -> Self {
        Field::Text(BlobStore::new(dir))
    }

    /// JSON documents stored as blobs under `dir`
    pub fn json(dir: impl Into<PathBuf>) -> Self {
        Field::Json(BlobStore::new(dir))
    }

    // =========================================================================
    // Codec
    // =========================================================================

    /// Bytes this field occupies in every row
    pub fn size(&self) -> usize {
        match self {
            Field::Num(kind) => kind.size(),
            Field::Big(kind) => kind.size(),
            Field::DateTime => BigType::I64.size(),
            Field::InlineText(text) => text.size(),
            Field::Binary(_) | Field::Text(_) | Field::Json(_) => DIGEST_SIZE,
        }
    }

    /// Encode `value` at the start of `buf`, returning bytes written
    ///
    /// Blob-backed fields write their payload to the blob store first.
    pub fn pack(&self, value: &Value, buf: &mut [u8]) -> Result<usize> {
        match self {
            Field::Num(kind) => kind.pack(value, buf),
            Field::Big(kind) => kind.pack(value, buf),
            Field::DateTime => match value {
                Value::DateTime(ms) => BigType::I64.pack(&Value::Int(*ms), buf),
                other => Err(mismatch("datetime", other)),
            },
            Field::InlineText(text) => text.pack(value, buf),
            Field::Binary(store) => {
                let digest = match value {
                    Value::Bytes(data) => store.put_bytes(data)?,
                    Value::Blob(blob) if store.contains(blob.digest()) => *blob.digest(),
                    // Committed elsewhere (another column's store): copy it in
                    Value::Blob(blob) => store.put(&mut blob.open()?)?,
                    other => return Err(mismatch("bytes", other)),
                };
                write_digest(&digest, buf)
            }
            Field::Text(store) => {
                let text = value.as_text().ok_or_else(|| mismatch("text", value))?;
                let digest = store.put_bytes(text.as_bytes())?;
                write_digest(&digest, buf)
            }
            Field::Json(store) => {
                let doc = value.as_json().ok_or_else(|| mismatch("json", value))?;
                let data = serde_json::to_vec(doc)
                    .map_err(|e| RowDbError::Encoding(format!("json: {}", e)))?;
                let digest = store.put_bytes(&data)?;
                write_digest(&digest, buf)
            }
        }
    }

    /// Stream a payload into a `Binary` column's store
    ///
    /// The reader is hashed while it is copied, so the payload never has to
    /// fit in memory. The returned `Value::Blob` packs as its digest.
    pub fn put_stream<R: Read>(&self, reader: &mut R) -> Result<Value> {
        match self {
            Field::Binary(store) => {
                let digest = store.put(reader)?;
                Ok(Value::Blob(store.blob_ref(digest)))
            }
            other => Err(RowDbError::Encoding(format!(
                "{} column does not take a byte stream",
                other
            ))),
        }
    }

    /// Decode a standalone buffer
    pub fn unpack(&self, buf: &[u8]) -> Result<Value> {
        match self {
            Field::Num(kind) => kind.unpack(buf),
            Field::Big(kind) => kind.unpack(buf),
            Field::DateTime => match BigType::I64.unpack(buf)? {
                Value::Big(ms) => Ok(Value::DateTime(ms as i64)),
                other => Err(RowDbError::Decoding(format!(
                    "expected datetime, got {}",
                    other.type_name()
                ))),
            },
            Field::InlineText(text) => text.unpack(buf),
            Field::Binary(store) => {
                let digest = Digest::from_slice(buf)?;
                // Surface a missing blob here rather than on first read
                fs::metadata(store.path_for(&digest))?;
                Ok(Value::Blob(store.blob_ref(digest)))
            }
            Field::Text(store) => {
                let data = store.read(&Digest::from_slice(buf)?)?;
                String::from_utf8(data)
                    .map(Value::Text)
                    .map_err(|e| RowDbError::Decoding(format!("invalid utf-8 in text blob: {}", e)))
            }
            Field::Json(store) => {
                let data = store.read(&Digest::from_slice(buf)?)?;
                serde_json::from_slice(&data)
                    .map(Value::Json)
                    .map_err(|e| RowDbError::Decoding(format!("invalid json blob: {}", e)))
            }
        }
    }

    /// Decode from the reader's current position, consuming exactly `size()` bytes
    pub fn read<R: Read>(&self, reader: &mut R) -> Result<Value> {
        let mut buf = vec![0u8; self.size()];
        reader.read_exact(&mut buf)?;
        self.unpack(&buf)
    }

    /// Parse a value for this field from its textual form
    ///
    /// - numbers: decimal literals
    /// - datetime: milliseconds since epoch, or `now`
    /// - binary: the literal bytes, or `@path` to stream a file into the store
    /// - json: a JSON document
    pub fn parse_value(&self, input: &str) -> Result<Value> {
        let invalid = |e: String| {
            RowDbError::Encoding(format!("cannot parse {:?} as {}: {}", input, self, e))
        };

        match self {
            Field::Num(NumType::F32 | NumType::F64) => {
                input.parse::<f64>().map(Value::Float).map_err(|e| invalid(e.to_string()))
            }
            Field::Num(_) => input.parse::<i64>().map(Value::Int).map_err(|e| invalid(e.to_string())),
            Field::Big(_) => input.parse::<i128>().map(Value::Big).map_err(|e| invalid(e.to_string())),
            Field::DateTime if input == "now" => Ok(Value::now()),
            Field::DateTime => input.parse::<i64>().map(Value::DateTime).map_err(|e| invalid(e.to_string())),
            Field::InlineText(_) | Field::Text(_) => Ok(Value::Text(input.to_string())),
            Field::Binary(_) => match input.strip_prefix('@') {
                Some(path) => self.put_stream(&mut fs::File::open(path)?),
                None => Ok(Value::Bytes(Bytes::copy_from_slice(input.as_bytes()))),
            },
            Field::Json(_) => serde_json::from_str(input)
                .map(Value::Json)
                .map_err(|e| invalid(e.to_string())),
        }
    }
}

fn write_digest(digest: &Digest, buf: &mut [u8]) -> Result<usize> {
    let len = buf.len();
    let dest = buf.get_mut(..DIGEST_SIZE).ok_or_else(|| {
        RowDbError::Encoding(format!("digest needs {} bytes, buffer has {}", DIGEST_SIZE, len))
    })?;
    dest.copy_from_slice(digest.as_bytes());
    Ok(DIGEST_SIZE)
}

// =============================================================================
// Textual Form
// =============================================================================

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Num(kind) => f.write_str(kind.name()),
            Field::Big(kind) => f.write_str(kind.name()),
            Field::DateTime => f.write_str("datetime"),
            Field::InlineText(text) => write!(f, "inline({})", text.capacity()),
            Field::Binary(store) => write!(f, "binary({})", store.dir().display()),
            Field::Text(store) => write!(f, "text({})", store.dir().display()),
            Field::Json(store) => write!(f, "json({})", store.dir().display()),
        }
    }
}

impl FromStr for Field {
    type Err = RowDbError;

    /// Parse `u32`, `datetime`, `inline(31)`, `text(pastes/preview)`, ...
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (name, arg) = match s.split_once('(') {
            Some((name, rest)) => {
                let arg = rest
                    .strip_suffix(')')
                    .ok_or_else(|| RowDbError::Schema(format!("unclosed '(' in {:?}", s)))?;
                (name.trim(), Some(arg.trim()))
            }
            None => (s, None),
        };

        let field = match (name, arg) {
            ("u8", None) => Field::Num(NumType::U8),
            ("i8", None) => Field::Num(NumType::I8),
            ("u16", None) => Field::Num(NumType::U16),
            ("i16", None) => Field::Num(NumType::I16),
            ("u32", None) => Field::Num(NumType::U32),
            ("i32", None) => Field::Num(NumType::I32),
            ("f32", None) => Field::Num(NumType::F32),
            ("f64", None) => Field::Num(NumType::F64),
            ("i64", None) => Field::Big(BigType::I64),
            ("u64", None) => Field::Big(BigType::U64),
            ("datetime", None) => Field::DateTime,
            ("inline", Some(cap)) => {
                let cap = cap
                    .parse::<usize>()
                    .map_err(|e| RowDbError::Schema(format!("bad capacity {:?}: {}", cap, e)))?;
                Field::inline_text(cap)?
            }
            ("binary", Some(dir)) if !dir.is_empty() => Field::binary(dir),
            ("text", Some(dir)) if !dir.is_empty() => Field::text(dir),
            ("json", Some(dir)) if !dir.is_empty() => Field::json(dir),
            _ => return Err(RowDbError::Schema(format!("unknown field type {:?}", s))),
        };
        Ok(field)
    }
}
