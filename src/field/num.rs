//! Fixed-width numeric codecs
//!
//! All integers and floats are stored big-endian.

use crate::error::{Result, RowDbError};

use super::Value;

/// Storage kind for `Field::Num`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

/// Storage kind for `Field::Big`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BigType {
    I64,
    U64,
}

impl NumType {
    pub fn size(self) -> usize {
        match self {
            NumType::U8 | NumType::I8 => 1,
            NumType::U16 | NumType::I16 => 2,
            NumType::U32 | NumType::I32 | NumType::F32 => 4,
            NumType::F64 => 8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NumType::U8 => "u8",
            NumType::I8 => "i8",
            NumType::U16 => "u16",
            NumType::I16 => "i16",
            NumType::U32 => "u32",
            NumType::I32 => "i32",
            NumType::F32 => "f32",
            NumType::F64 => "f64",
        }
    }

    pub(crate) fn pack(self, value: &Value, buf: &mut [u8]) -> Result<usize> {
        let dest = dest(buf, self.size(), self.name())?;

        match self {
            NumType::F32 => dest.copy_from_slice(&(self.float(value)? as f32).to_be_bytes()),
            NumType::F64 => dest.copy_from_slice(&self.float(value)?.to_be_bytes()),
            NumType::U8 => dest.copy_from_slice(&narrow::<u8>(self.name(), value)?.to_be_bytes()),
            NumType::I8 => dest.copy_from_slice(&narrow::<i8>(self.name(), value)?.to_be_bytes()),
            NumType::U16 => dest.copy_from_slice(&narrow::<u16>(self.name(), value)?.to_be_bytes()),
            NumType::I16 => dest.copy_from_slice(&narrow::<i16>(self.name(), value)?.to_be_bytes()),
            NumType::U32 => dest.copy_from_slice(&narrow::<u32>(self.name(), value)?.to_be_bytes()),
            NumType::I32 => dest.copy_from_slice(&narrow::<i32>(self.name(), value)?.to_be_bytes()),
        }
        Ok(self.size())
    }

    fn float(self, value: &Value) -> Result<f64> {
        value.as_float().ok_or_else(|| mismatch(self.name(), value))
    }

    pub(crate) fn unpack(self, buf: &[u8]) -> Result<Value> {
        let src = src(buf, self.size(), self.name())?;
        let value = match self {
            NumType::U8 => Value::Int(src[0] as i64),
            NumType::I8 => Value::Int(src[0] as i8 as i64),
            NumType::U16 => Value::Int(u16::from_be_bytes([src[0], src[1]]) as i64),
            NumType::I16 => Value::Int(i16::from_be_bytes([src[0], src[1]]) as i64),
            NumType::U32 => Value::Int(u32::from_be_bytes(array(src)) as i64),
            NumType::I32 => Value::Int(i32::from_be_bytes(array(src)) as i64),
            NumType::F32 => Value::Float(f32::from_be_bytes(array(src)) as f64),
            NumType::F64 => Value::Float(f64::from_be_bytes(array(src))),
        };
        Ok(value)
    }
}

impl BigType {
    pub fn size(self) -> usize {
        8
    }

    pub fn name(self) -> &'static str {
        match self {
            BigType::I64 => "i64",
            BigType::U64 => "u64",
        }
    }

    pub(crate) fn pack(self, value: &Value, buf: &mut [u8]) -> Result<usize> {
        let dest = dest(buf, self.size(), self.name())?;
        match self {
            BigType::I64 => dest.copy_from_slice(&narrow::<i64>(self.name(), value)?.to_be_bytes()),
            BigType::U64 => dest.copy_from_slice(&narrow::<u64>(self.name(), value)?.to_be_bytes()),
        }
        Ok(self.size())
    }

    pub(crate) fn unpack(self, buf: &[u8]) -> Result<Value> {
        let src = src(buf, self.size(), self.name())?;
        let n = match self {
            BigType::I64 => i64::from_be_bytes(array(src)) as i128,
            BigType::U64 => u64::from_be_bytes(array(src)) as i128,
        };
        Ok(Value::Big(n))
    }
}

// =============================================================================
// Private Helpers
// =============================================================================

fn dest<'a>(buf: &'a mut [u8], size: usize, name: &str) -> Result<&'a mut [u8]> {
    let len = buf.len();
    buf.get_mut(..size).ok_or_else(|| {
        RowDbError::Encoding(format!("{} needs {} bytes, buffer has {}", name, size, len))
    })
}

fn src<'a>(buf: &'a [u8], size: usize, name: &str) -> Result<&'a [u8]> {
    buf.get(..size)
        .ok_or_else(|| RowDbError::Decoding(format!("no {} found", name)))
}

/// Integer value narrowed to the storage type, or an out-of-range error
fn narrow<T: TryFrom<i128>>(name: &str, value: &Value) -> Result<T> {
    let n = value.as_big().ok_or_else(|| mismatch(name, value))?;
    T::try_from(n).map_err(|_| RowDbError::Encoding(format!("{} out of range for {}", n, name)))
}

fn array<const N: usize>(src: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&src[..N]);
    out
}

pub(super) fn mismatch(expected: &str, got: &Value) -> RowDbError {
    RowDbError::Encoding(format!("expected {}, got {}", expected, got.type_name()))
}
