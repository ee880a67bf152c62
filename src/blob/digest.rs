//! SHA-256 digest newtype

use std::fmt;

use crate::error::{Result, RowDbError};

/// Size in bytes of a stored digest
pub const DIGEST_SIZE: usize = 32;

/// Raw SHA-256 digest of a blob's contents
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; DIGEST_SIZE]);

impl Digest {
    pub fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }

    /// Build a digest from the first 32 bytes of `buf`
    pub fn from_slice(buf: &[u8]) -> Result<Self> {
        let bytes: [u8; DIGEST_SIZE] = buf
            .get(..DIGEST_SIZE)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| {
                RowDbError::Decoding(format!(
                    "digest needs {} bytes, got {}",
                    DIGEST_SIZE,
                    buf.len()
                ))
            })?;
        Ok(Self(bytes))
    }

    /// Parse a 64-character hex digest
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)
            .map_err(|e| RowDbError::Decoding(format!("invalid digest {:?}: {}", s, e)))?;
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Shard directory name: the first two hex characters
    pub fn shard(&self) -> String {
        hex::encode(&self.0[..1])
    }

    /// File name inside the shard: the remaining hex characters
    pub fn rest(&self) -> String {
        hex::encode(&self.0[1..])
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}
