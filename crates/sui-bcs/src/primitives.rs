//! Primitive codecs: integers, bool, ULEB128, raw bytes and strings.

use std::sync::Arc;

use primitive_types::U256;

use crate::codec::{BcsType, Codec};
use crate::error::BcsError;
use crate::reader::BcsReader;
use crate::uleb::uleb_encode;
use crate::writer::BcsWriter;

macro_rules! fixed_width_codec {
    ($codec:ident, $ty:ty, $name:literal, $read:ident, $write:ident, $size:literal) => {
        #[doc = concat!("Little-endian `", $name, "`.")]
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $codec;

        impl Codec<$ty> for $codec {
            fn name(&self) -> &str {
                $name
            }

            fn read(&self, reader: &mut BcsReader<'_>) -> Result<$ty, BcsError> {
                reader.$read()
            }

            fn write(&self, value: &$ty, writer: &mut BcsWriter) -> Result<(), BcsError> {
                writer.$write(*value).map(|_| ())
            }

            fn serialized_size(&self, _value: &$ty) -> Option<usize> {
                Some($size)
            }
        }
    };
}

fixed_width_codec!(U8Codec, u8, "u8", read8, write8, 1);
fixed_width_codec!(U16Codec, u16, "u16", read16, write16, 2);
fixed_width_codec!(U32Codec, u32, "u32", read32, write32, 4);
fixed_width_codec!(U64Codec, u64, "u64", read64, write64, 8);
fixed_width_codec!(U128Codec, u128, "u128", read128, write128, 16);
fixed_width_codec!(U256Codec, U256, "u256", read256, write256, 32);

pub fn u8() -> BcsType<u8> {
    Arc::new(U8Codec)
}

pub fn u16() -> BcsType<u16> {
    Arc::new(U16Codec)
}

pub fn u32() -> BcsType<u32> {
    Arc::new(U32Codec)
}

pub fn u64() -> BcsType<u64> {
    Arc::new(U64Codec)
}

pub fn u128() -> BcsType<u128> {
    Arc::new(U128Codec)
}

pub fn u256() -> BcsType<U256> {
    Arc::new(U256Codec)
}

/// A single byte, 0 or 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolCodec;

impl Codec<bool> for BoolCodec {
    fn name(&self) -> &str {
        "bool"
    }

    fn read(&self, reader: &mut BcsReader<'_>) -> Result<bool, BcsError> {
        match reader.read8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(BcsError::InvalidBool(other)),
        }
    }

    fn write(&self, value: &bool, writer: &mut BcsWriter) -> Result<(), BcsError> {
        writer.write8(u8::from(*value)).map(|_| ())
    }

    fn serialized_size(&self, _value: &bool) -> Option<usize> {
        Some(1)
    }
}

pub fn bool() -> BcsType<bool> {
    Arc::new(BoolCodec)
}

/// A standalone ULEB128 varint.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uleb128Codec;

impl Codec<u64> for Uleb128Codec {
    fn name(&self) -> &str {
        "uleb128"
    }

    fn read(&self, reader: &mut BcsReader<'_>) -> Result<u64, BcsError> {
        reader.read_uleb128()
    }

    fn write(&self, value: &u64, writer: &mut BcsWriter) -> Result<(), BcsError> {
        writer.write_uleb128(*value).map(|_| ())
    }

    fn serialized_size(&self, value: &u64) -> Option<usize> {
        Some(uleb_encode(*value).len())
    }
}

pub fn uleb128() -> BcsType<u64> {
    Arc::new(Uleb128Codec)
}

/// Exactly `length` raw bytes, no length prefix.
#[derive(Debug, Clone)]
pub struct FixedBytesCodec {
    name: String,
    length: usize,
}

impl Codec<Vec<u8>> for FixedBytesCodec {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self, reader: &mut BcsReader<'_>) -> Result<Vec<u8>, BcsError> {
        Ok(reader.read_bytes(self.length)?.to_vec())
    }

    fn write(&self, value: &Vec<u8>, writer: &mut BcsWriter) -> Result<(), BcsError> {
        writer.write_bytes(value).map(|_| ())
    }

    fn validate(&self, value: &Vec<u8>) -> Result<(), BcsError> {
        if value.len() != self.length {
            return Err(BcsError::validation(
                &self.name,
                value,
                format!("expected {} bytes, got {}", self.length, value.len()),
            ));
        }
        Ok(())
    }

    fn serialized_size(&self, _value: &Vec<u8>) -> Option<usize> {
        Some(self.length)
    }
}

pub fn bytes(length: usize) -> BcsType<Vec<u8>> {
    Arc::new(FixedBytesCodec {
        name: format!("bytes[{}]", length),
        length,
    })
}

/// ULEB128 length followed by raw bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteVectorCodec;

impl Codec<Vec<u8>> for ByteVectorCodec {
    fn name(&self) -> &str {
        "vector<u8>"
    }

    fn read(&self, reader: &mut BcsReader<'_>) -> Result<Vec<u8>, BcsError> {
        let length = reader.read_uleb128()? as usize;
        Ok(reader.read_bytes(length)?.to_vec())
    }

    fn write(&self, value: &Vec<u8>, writer: &mut BcsWriter) -> Result<(), BcsError> {
        writer.write_uleb128(value.len() as u64)?;
        writer.write_bytes(value).map(|_| ())
    }

    fn serialized_size(&self, value: &Vec<u8>) -> Option<usize> {
        Some(uleb_encode(value.len() as u64).len() + value.len())
    }
}

pub fn byte_vector() -> BcsType<Vec<u8>> {
    Arc::new(ByteVectorCodec)
}

/// UTF-8 string, length-prefixed like a byte vector.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCodec;

impl Codec<String> for StringCodec {
    fn name(&self) -> &str {
        "string"
    }

    fn read(&self, reader: &mut BcsReader<'_>) -> Result<String, BcsError> {
        let length = reader.read_uleb128()? as usize;
        let bytes = reader.read_bytes(length)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| BcsError::InvalidUtf8 {
            type_name: "string".to_string(),
        })
    }

    fn write(&self, value: &String, writer: &mut BcsWriter) -> Result<(), BcsError> {
        writer.write_uleb128(value.len() as u64)?;
        writer.write_bytes(value.as_bytes()).map(|_| ())
    }

    fn serialized_size(&self, value: &String) -> Option<usize> {
        Some(uleb_encode(value.len() as u64).len() + value.len())
    }
}

pub fn string() -> BcsType<String> {
    Arc::new(StringCodec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecExt;

    #[test]
    fn test_integers_match_reference_bcs() {
        assert_eq!(u8().to_bytes(&7).unwrap(), ::bcs::to_bytes(&7u8).unwrap());
        assert_eq!(
            u16().to_bytes(&513).unwrap(),
            ::bcs::to_bytes(&513u16).unwrap()
        );
        assert_eq!(
            u32().to_bytes(&0xdead_beef).unwrap(),
            ::bcs::to_bytes(&0xdead_beefu32).unwrap()
        );
        assert_eq!(
            u64().to_bytes(&u64::MAX).unwrap(),
            ::bcs::to_bytes(&u64::MAX).unwrap()
        );
        let big = 0x0102_0304_0506_0708_090a_0b0c_0d0e_0f10u128;
        assert_eq!(
            u128().to_bytes(&big).unwrap(),
            ::bcs::to_bytes(&big).unwrap()
        );
    }

    #[test]
    fn test_u256_round_trip() {
        let value = U256::from_dec_str(
            "115792089237316195423570985008687907853269984665640564039457584007913129639935",
        )
        .unwrap();
        let bytes = u256().to_bytes(&value).unwrap();
        assert_eq!(bytes, vec![0xff; 32]);
        assert_eq!(u256().parse(&bytes).unwrap(), value);
    }

    #[test]
    fn test_bool_rejects_other_bytes() {
        assert!(bool().parse(&[1]).unwrap());
        assert!(!bool().parse(&[0]).unwrap());
        assert_eq!(bool().parse(&[2]).unwrap_err(), BcsError::InvalidBool(2));
    }

    #[test]
    fn test_string_and_bytes() {
        let s = "hello world".to_string();
        assert_eq!(string().to_bytes(&s).unwrap(), ::bcs::to_bytes(&s).unwrap());
        assert_eq!(string().parse(&::bcs::to_bytes(&s).unwrap()).unwrap(), s);

        let v = vec![1u8, 2, 3];
        assert_eq!(
            byte_vector().to_bytes(&v).unwrap(),
            ::bcs::to_bytes(&v).unwrap()
        );
        assert!(string().parse(&[2, 0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_fixed_bytes_validation() {
        let codec = bytes(4);
        assert_eq!(codec.to_bytes(&vec![1, 2, 3, 4]).unwrap(), vec![1, 2, 3, 4]);
        let err = codec.to_bytes(&vec![1, 2, 3]).unwrap_err();
        assert!(err.to_string().contains("bytes[4]"));
        assert!(err.to_string().contains("expected 4 bytes, got 3"));
    }

    #[test]
    fn test_uleb128_codec() {
        assert_eq!(uleb128().to_bytes(&0).unwrap(), vec![0]);
        assert_eq!(uleb128().to_bytes(&300).unwrap(), vec![0xac, 0x02]);
        assert_eq!(uleb128().serialized_size(&300), Some(2));
        assert_eq!(uleb128().parse(&[0xac, 0x02]).unwrap(), 300);
    }
}
