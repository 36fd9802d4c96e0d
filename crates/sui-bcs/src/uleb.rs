//! Unsigned LEB128 varints, used for lengths and enum discriminants.

use crate::error::BcsError;

/// Encode `value` as ULEB128: seven bits per byte, least significant group
/// first, with the continuation bit (0x80) set on every byte but the last.
pub fn uleb_encode(mut value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(10);
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}

/// Decode a ULEB128 value from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed. Decoding stops at the
/// first byte whose high bit is clear.
pub fn uleb_decode(bytes: &[u8]) -> Result<(u64, usize), BcsError> {
    let mut value: u64 = 0;
    let mut shift = 0u32;

    for (i, byte) in bytes.iter().enumerate() {
        let low = (byte & 0x7f) as u64;
        if shift == 63 && low > 1 {
            return Err(BcsError::UlebOverflow);
        }
        if shift > 63 {
            return Err(BcsError::UlebOverflow);
        }
        value |= low << shift;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
        shift += 7;
    }

    Err(BcsError::UnexpectedEof {
        needed: bytes.len() + 1,
        remaining: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_boundaries() {
        assert_eq!(uleb_encode(0), vec![0x00]);
        assert_eq!(uleb_encode(127), vec![0x7f]);
        assert_eq!(uleb_encode(128), vec![0x80, 0x01]);
        assert_eq!(uleb_encode(16384), vec![0x80, 0x80, 0x01]);
        assert_eq!(uleb_encode(u64::MAX).len(), 10);
    }

    #[test]
    fn test_decode_reports_consumed_length() {
        assert_eq!(uleb_decode(&[0x00]).unwrap(), (0, 1));
        assert_eq!(uleb_decode(&[0x7f, 0xff]).unwrap(), (127, 1));
        assert_eq!(uleb_decode(&[0x80, 0x01, 0x05]).unwrap(), (128, 2));
        assert_eq!(uleb_decode(&uleb_encode(u64::MAX)).unwrap(), (u64::MAX, 10));
    }

    #[test]
    fn test_decode_truncated() {
        assert!(matches!(
            uleb_decode(&[0x80, 0x80]),
            Err(BcsError::UnexpectedEof { .. })
        ));
        assert!(uleb_decode(&[]).is_err());
    }

    #[test]
    fn test_decode_overflow() {
        let mut bytes = vec![0xff; 9];
        bytes.push(0x02);
        assert_eq!(uleb_decode(&bytes), Err(BcsError::UlebOverflow));
    }
}
