//! Cursor-based reader over a borrowed byte buffer.

use primitive_types::U256;

use crate::error::BcsError;
use crate::uleb::uleb_decode;

/// Reads BCS primitives from a fixed buffer.
///
/// The cursor only moves forward: every `readN` advances it by exactly the
/// number of bytes consumed and there is no way to seek back.
#[derive(Debug)]
pub struct BcsReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BcsReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Current cursor offset.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// The bytes consumed since offset `start`.
    pub fn consumed_since(&self, start: usize) -> &'a [u8] {
        self.data.get(start..self.position).unwrap_or_default()
    }

    /// Skip `bytes` bytes.
    pub fn shift(&mut self, bytes: usize) -> Result<&mut Self, BcsError> {
        self.take(bytes)?;
        Ok(self)
    }

    fn take(&mut self, bytes: usize) -> Result<&'a [u8], BcsError> {
        if bytes > self.remaining() {
            return Err(BcsError::UnexpectedEof {
                needed: bytes,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.position..self.position + bytes];
        self.position += bytes;
        Ok(slice)
    }

    pub fn read8(&mut self) -> Result<u8, BcsError> {
        Ok(self.take(1)?[0])
    }

    pub fn read16(&mut self) -> Result<u16, BcsError> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read32(&mut self) -> Result<u32, BcsError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a u64 as two little-endian 32-bit words.
    pub fn read64(&mut self) -> Result<u64, BcsError> {
        let low = self.read32()? as u64;
        let high = self.read32()? as u64;
        Ok((high << 32) | low)
    }

    /// Read a u128 as two little-endian 64-bit words.
    pub fn read128(&mut self) -> Result<u128, BcsError> {
        let low = self.read64()? as u128;
        let high = self.read64()? as u128;
        Ok((high << 64) | low)
    }

    /// Read a u256 as two little-endian 128-bit words.
    pub fn read256(&mut self) -> Result<U256, BcsError> {
        let low = U256::from(self.read128()?);
        let high = U256::from(self.read128()?);
        Ok((high << 128) | low)
    }

    /// Read exactly `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], BcsError> {
        self.take(len)
    }

    /// Read a ULEB128 value and advance past it.
    pub fn read_uleb128(&mut self) -> Result<u64, BcsError> {
        let (value, consumed) = uleb_decode(&self.data[self.position..])?;
        self.position += consumed;
        Ok(value)
    }

    /// Read a ULEB128 length followed by that many elements.
    ///
    /// The callback receives the reader, the element index and the declared length.
    pub fn read_vec<T, F>(&mut self, mut read_element: F) -> Result<Vec<T>, BcsError>
    where
        F: FnMut(&mut Self, usize, usize) -> Result<T, BcsError>,
    {
        let length = self.read_uleb128()? as usize;
        // A hostile length prefix must not drive the allocation.
        let mut items = Vec::with_capacity(length.min(self.remaining()));
        for i in 0..length {
            items.push(read_element(self, i, length)?);
        }
        Ok(items)
    }
}
