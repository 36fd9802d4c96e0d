//! The `Codec` trait every schema implements, and helpers layered on top.

use std::sync::Arc;

use crate::encoding::{from_base58, from_base64, from_hex, to_base58, to_base64, to_hex};
use crate::error::BcsError;
use crate::reader::BcsReader;
use crate::writer::{BcsWriter, BcsWriterOptions};

/// A named, immutable BCS schema for values of type `T`.
///
/// `read` and `write` are inverses for every value accepted by `validate`.
/// Composite codecs validate their children from `validate`, so a caller that
/// validates the root value before writing never observes a half-written
/// buffer for an invalid value.
pub trait Codec<T>: Send + Sync {
    /// Schema name used in error messages.
    fn name(&self) -> &str;

    /// Decode one value, advancing the reader past it.
    fn read(&self, reader: &mut BcsReader<'_>) -> Result<T, BcsError>;

    /// Encode `value`. Assumes `validate` already accepted it.
    fn write(&self, value: &T, writer: &mut BcsWriter) -> Result<(), BcsError>;

    /// Reject out-of-range or ill-shaped values.
    fn validate(&self, _value: &T) -> Result<(), BcsError> {
        Ok(())
    }

    /// Encoded size of `value`, or `None` when it cannot be known without encoding.
    fn serialized_size(&self, _value: &T) -> Option<usize> {
        None
    }
}

/// Shared handle to a schema. Composite codecs hold their children this way.
pub type BcsType<T> = Arc<dyn Codec<T>>;

impl<T, C> Codec<T> for Arc<C>
where
    C: Codec<T> + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read(&self, reader: &mut BcsReader<'_>) -> Result<T, BcsError> {
        (**self).read(reader)
    }

    fn write(&self, value: &T, writer: &mut BcsWriter) -> Result<(), BcsError> {
        (**self).write(value, writer)
    }

    fn validate(&self, value: &T) -> Result<(), BcsError> {
        (**self).validate(value)
    }

    fn serialized_size(&self, value: &T) -> Option<usize> {
        (**self).serialized_size(value)
    }
}

/// Entry points for encoding to and decoding from whole buffers.
pub trait CodecExt<T>: Codec<T> {
    /// Validate then encode `value` into a fresh buffer.
    fn serialize(&self, value: &T) -> Result<SerializedBcs, BcsError> {
        self.serialize_with(value, BcsWriterOptions::default())
    }

    /// Like [`serialize`](CodecExt::serialize) with explicit writer sizing.
    fn serialize_with(
        &self,
        value: &T,
        mut options: BcsWriterOptions,
    ) -> Result<SerializedBcs, BcsError> {
        self.validate(value)?;
        if let Some(size) = self.serialized_size(value) {
            options.initial_size = size.min(options.max_size);
        }
        let mut writer = BcsWriter::new(options);
        self.write(value, &mut writer)?;
        Ok(SerializedBcs::new(writer.into_bytes()))
    }

    /// Validate then encode `value`, returning the raw bytes.
    fn to_bytes(&self, value: &T) -> Result<Vec<u8>, BcsError> {
        Ok(self.serialize(value)?.into_bytes())
    }

    /// Decode a value from the front of `bytes`.
    fn parse(&self, bytes: &[u8]) -> Result<T, BcsError> {
        let mut reader = BcsReader::new(bytes);
        self.read(&mut reader)
    }

    fn from_hex(&self, hex_str: &str) -> Result<T, BcsError> {
        self.parse(&from_hex(hex_str)?)
    }

    fn from_base64(&self, b64: &str) -> Result<T, BcsError> {
        self.parse(&from_base64(b64)?)
    }

    fn from_base58(&self, b58: &str) -> Result<T, BcsError> {
        self.parse(&from_base58(b58)?)
    }

    /// Move this codec behind a shared [`BcsType`] handle.
    fn into_type(self) -> BcsType<T>
    where
        Self: Sized + 'static,
    {
        Arc::new(self)
    }
}

impl<T, C: Codec<T> + ?Sized> CodecExt<T> for C {}

/// Bytes produced by [`CodecExt::serialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedBcs {
    bytes: Vec<u8>,
}

impl SerializedBcs {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn to_hex(&self) -> String {
        to_hex(&self.bytes)
    }

    pub fn to_base64(&self) -> String {
        to_base64(&self.bytes)
    }

    pub fn to_base58(&self) -> String {
        to_base58(&self.bytes)
    }

    /// Decode these bytes back with `codec`.
    pub fn parse<T>(&self, codec: &dyn Codec<T>) -> Result<T, BcsError> {
        codec.parse(&self.bytes)
    }
}
