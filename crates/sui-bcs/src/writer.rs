//! Growable little-endian writer.

use primitive_types::U256;

use crate::encoding::{to_base58, to_base64, to_hex};
use crate::error::BcsError;
use crate::uleb::uleb_encode;

/// Sizing policy for a [`BcsWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BcsWriterOptions {
    /// Bytes reserved up front.
    pub initial_size: usize,
    /// Hard upper bound on the buffer; writes past it fail.
    pub max_size: usize,
    /// Minimum growth step when the buffer needs to grow.
    pub allocate_size: usize,
}

impl Default for BcsWriterOptions {
    fn default() -> Self {
        Self {
            initial_size: 1024,
            max_size: usize::MAX,
            allocate_size: 1024,
        }
    }
}

/// Writes BCS primitives into a growable buffer.
#[derive(Debug)]
pub struct BcsWriter {
    buffer: Vec<u8>,
    size: usize,
    options: BcsWriterOptions,
}

impl Default for BcsWriter {
    fn default() -> Self {
        Self::new(BcsWriterOptions::default())
    }
}

impl BcsWriter {
    pub fn new(options: BcsWriterOptions) -> Self {
        let size = options.initial_size.min(options.max_size);
        Self {
            buffer: Vec::with_capacity(size),
            size,
            options,
        }
    }

    /// Make room for `bytes` more bytes, growing by at least `allocate_size`.
    ///
    /// Fails instead of truncating when the write would exceed `max_size`.
    pub fn ensure_capacity(&mut self, bytes: usize) -> Result<(), BcsError> {
        let required = self.buffer.len().saturating_add(bytes);
        if required > self.options.max_size {
            return Err(BcsError::SizeLimitExceeded {
                max_size: self.options.max_size,
                requested: required,
            });
        }
        if required > self.size {
            let next = self
                .size
                .saturating_add(self.options.allocate_size)
                .max(required)
                .min(self.options.max_size);
            self.buffer.reserve(next - self.buffer.len());
            self.size = next;
        }
        Ok(())
    }

    /// Number of bytes written so far.
    pub fn bytes_written(&self) -> usize {
        self.buffer.len()
    }

    pub fn write8(&mut self, value: u8) -> Result<&mut Self, BcsError> {
        self.write_bytes(&[value])
    }

    pub fn write16(&mut self, value: u16) -> Result<&mut Self, BcsError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write32(&mut self, value: u32) -> Result<&mut Self, BcsError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write64(&mut self, value: u64) -> Result<&mut Self, BcsError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write128(&mut self, value: u128) -> Result<&mut Self, BcsError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write256(&mut self, value: U256) -> Result<&mut Self, BcsError> {
        self.write128(value.low_u128())?;
        self.write128((value >> 128).low_u128())
    }

    pub fn write_uleb128(&mut self, value: u64) -> Result<&mut Self, BcsError> {
        self.write_bytes(&uleb_encode(value))
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self, BcsError> {
        self.ensure_capacity(bytes.len())?;
        self.buffer.extend_from_slice(bytes);
        Ok(self)
    }

    /// Write a ULEB128 length followed by every element.
    pub fn write_vec<T, F>(&mut self, items: &[T], mut write_element: F) -> Result<&mut Self, BcsError>
    where
        F: FnMut(&mut Self, &T, usize, usize) -> Result<(), BcsError>,
    {
        self.write_uleb128(items.len() as u64)?;
        for (i, item) in items.iter().enumerate() {
            write_element(self, item, i, items.len())?;
        }
        Ok(self)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.buffer.clone()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn to_hex(&self) -> String {
        to_hex(&self.buffer)
    }

    pub fn to_base64(&self) -> String {
        to_base64(&self.buffer)
    }

    pub fn to_base58(&self) -> String {
        to_base58(&self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_layout() {
        let mut writer = BcsWriter::default();
        writer
            .write8(1)
            .unwrap()
            .write16(0x0203)
            .unwrap()
            .write64(0x0405)
            .unwrap();
        assert_eq!(
            writer.as_bytes(),
            &[0x01, 0x03, 0x02, 0x05, 0x04, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_write256_splits_words() {
        let mut writer = BcsWriter::default();
        let value = (U256::from(7u8) << 128) | U256::from(9u8);
        writer.write256(value).unwrap();
        let bytes = writer.into_bytes();
        assert_eq!(bytes.len(), 32);
        assert_eq!(bytes[0], 9);
        assert_eq!(bytes[16], 7);
    }

    #[test]
    fn test_grows_past_initial_size() {
        let mut writer = BcsWriter::new(BcsWriterOptions {
            initial_size: 2,
            max_size: 64,
            allocate_size: 4,
        });
        writer.write_bytes(&[0u8; 10]).unwrap();
        assert_eq!(writer.bytes_written(), 10);
    }

    #[test]
    fn test_max_size_is_enforced() {
        let mut writer = BcsWriter::new(BcsWriterOptions {
            initial_size: 2,
            max_size: 4,
            allocate_size: 2,
        });
        writer.write32(1).unwrap();
        let err = writer.write8(1).unwrap_err();
        assert_eq!(
            err,
            BcsError::SizeLimitExceeded {
                max_size: 4,
                requested: 5
            }
        );
        assert_eq!(writer.bytes_written(), 4);
    }

    #[test]
    fn test_write_vec() {
        let mut writer = BcsWriter::default();
        writer
            .write_vec(&[1u16, 2, 3], |w, v, _, _| w.write16(*v).map(|_| ()))
            .unwrap();
        assert_eq!(writer.as_bytes(), &[3, 1, 0, 2, 0, 3, 0]);
    }
}
