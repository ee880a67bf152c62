//! Inline text codec
//!
//! ```text
//! ┌──────────┬──────────────────┬────────────────────────────┐
//! │ Len (1)  │ UTF-8 bytes (L)  │ zero fill (capacity - L)   │
//! └──────────┴──────────────────┴────────────────────────────┘
//! ```

use crate::error::{Result, RowDbError};

use super::num::mismatch;
use super::Value;

/// Largest capacity a one-byte length prefix can describe
pub const MAX_INLINE_CAPACITY: usize = u8::MAX as usize;

/// Fixed-capacity text stored directly in the row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineText {
    capacity: u8,
}

impl InlineText {
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = u8::try_from(capacity).map_err(|_| {
            RowDbError::Encoding(format!(
                "max inline text capacity is {}, got {}",
                MAX_INLINE_CAPACITY, capacity
            ))
        })?;
        Ok(Self { capacity })
    }

    pub fn capacity(&self) -> usize {
        self.capacity as usize
    }

    pub fn size(&self) -> usize {
        self.capacity() + 1
    }

    /// Write the text, truncated to capacity on a char boundary
    pub(crate) fn pack(&self, value: &Value, buf: &mut [u8]) -> Result<usize> {
        let text = value.as_text().ok_or_else(|| mismatch("text", value))?;
        let size = self.size();
        let len = buf.len();
        let dest = buf.get_mut(..size).ok_or_else(|| {
            RowDbError::Encoding(format!("inline text needs {} bytes, buffer has {}", size, len))
        })?;

        let mut end = text.len().min(self.capacity());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let bytes = &text.as_bytes()[..end];

        dest[0] = end as u8;
        dest[1..1 + end].copy_from_slice(bytes);
        dest[1 + end..].fill(0);
        Ok(size)
    }

    pub(crate) fn unpack(&self, buf: &[u8]) -> Result<Value> {
        let len = *buf
            .first()
            .ok_or_else(|| RowDbError::Decoding("no text length found".to_string()))?
            as usize;
        if len > self.capacity() {
            return Err(RowDbError::Decoding(format!(
                "stored text length {} exceeds capacity {}",
                len,
                self.capacity()
            )));
        }
        let bytes = buf
            .get(1..1 + len)
            .ok_or_else(|| RowDbError::Decoding(format!("text needs {} bytes", len)))?;
        let text = std::str::from_utf8(bytes)
            .map_err(|e| RowDbError::Decoding(format!("invalid utf-8 in text: {}", e)))?;
        Ok(Value::Text(text.to_string()))
    }
}
