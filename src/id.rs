//! Surrogate ID codec
//!
//! Maps row indexes to short lowercase strings and back.
//!
//! The index is written in base 26 using the digit alphabet `0-9a-p`, then
//! the ten decimal digits are swapped for the unused letters `q-z`:
//!
//! ```text
//! 0 → "q"     25 → "p"     26 → "rq"     701 → "pp"
//! ```

use crate::error::{Result, RowDbError};

const RADIX: u64 = 26;

/// Encode a row index as a surrogate id
pub fn encode(mut n: u64) -> String {
    let mut digits = Vec::new();
    loop {
        digits.push(symbol((n % RADIX) as u8));
        n /= RADIX;
        if n == 0 {
            break;
        }
    }
    digits.iter().rev().map(|&b| b as char).collect()
}

/// Decode a surrogate id back into a row index
pub fn decode(id: &str) -> Result<u64> {
    if id.is_empty() {
        return Err(RowDbError::InvalidId(id.to_string()));
    }

    let mut n: u64 = 0;
    for b in id.bytes() {
        let digit = value(b).ok_or_else(|| RowDbError::InvalidId(id.to_string()))?;
        n = n
            .checked_mul(RADIX)
            .and_then(|n| n.checked_add(digit))
            .ok_or_else(|| RowDbError::InvalidId(id.to_string()))?;
    }
    Ok(n)
}

/// Digit value → id character
fn symbol(digit: u8) -> u8 {
    match digit {
        0..=9 => b'q' + digit,
        _ => b'a' + (digit - 10),
    }
}

/// Id character → digit value
fn value(b: u8) -> Option<u64> {
    match b {
        b'q'..=b'z' => Some((b - b'q') as u64),
        b'a'..=b'p' => Some((b - b'a') as u64 + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_small_values() {
        assert_eq!(encode(0), "q");
        assert_eq!(encode(9), "z");
        assert_eq!(encode(10), "a");
        assert_eq!(encode(25), "p");
        assert_eq!(encode(26), "rq");
        assert_eq!(encode(701), "pp");
    }

    #[test]
    fn test_round_trip() {
        for n in (0..10_000).chain([u32::MAX as u64, u64::MAX - 1, u64::MAX]) {
            assert_eq!(decode(&encode(n)).unwrap(), n);
        }
    }

    #[test]
    fn test_decode_rejects_foreign_characters() {
        assert!(matches!(decode("abc1"), Err(RowDbError::InvalidId(_))));
        assert!(matches!(decode("Q"), Err(RowDbError::InvalidId(_))));
        assert!(matches!(decode(""), Err(RowDbError::InvalidId(_))));
    }

    #[test]
    fn test_decode_rejects_overflow() {
        let too_long = "p".repeat(20);
        assert!(matches!(decode(&too_long), Err(RowDbError::InvalidId(_))));
    }
}
