//! Binary Canonical Serialization (BCS) codecs.
//!
//! Schemas implement [`Codec`] and are shared as [`BcsType`] handles so they
//! can be composed freely:
//!
//! ```
//! use sui_bcs::{composite::vector, primitives::u16, CodecExt};
//!
//! let codec = vector(u16());
//! let bytes = codec.to_bytes(&vec![1, 2]).unwrap();
//! assert_eq!(bytes, vec![2, 1, 0, 2, 0]);
//! assert_eq!(codec.parse(&bytes).unwrap(), vec![1, 2]);
//! ```
//!
//! Typed codecs cover primitives, vectors, arrays, options, tuples and maps.
//! Structs and enums are declared dynamically over [`BcsValue`], and
//! [`transform`] bridges a dynamic schema back to a Rust type.

pub mod codec;
pub mod composite;
pub mod encoding;
pub mod error;
pub mod primitives;
pub mod reader;
pub mod uleb;
pub mod value;
pub mod writer;

pub use codec::{BcsType, Codec, CodecExt, SerializedBcs};
pub use composite::{
    fixed_array, lazy, lazy_named, map, option, transform, tuple2, tuple3, vector, Transform,
};
pub use encoding::{from_base58, from_base64, from_hex, to_base58, to_base64, to_hex};
pub use error::BcsError;
pub use primitive_types::U256;
pub use reader::BcsReader;
pub use uleb::{uleb_decode, uleb_encode};
pub use value::{
    dyn_option, dyn_vector, enum_type, erased, struct_type, tuple, BcsValue, FromBcsValue,
    ToBcsValue,
};
pub use writer::{BcsWriter, BcsWriterOptions};
