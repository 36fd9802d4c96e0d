//! 32-byte digests rendered as base58.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sui_bcs::{from_base58, to_base58, BcsError, BcsValue, FromBcsValue, ToBcsValue};

pub const DIGEST_LENGTH: usize = 32;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Digest([u8; DIGEST_LENGTH]);

pub type TransactionDigest = Digest;
pub type ObjectDigest = Digest;

impl Digest {
    pub const fn new(bytes: [u8; DIGEST_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let array: [u8; DIGEST_LENGTH] = bytes
            .try_into()
            .map_err(|_| anyhow!("Invalid digest length {}, expected 32", bytes.len()))?;
        Ok(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LENGTH] {
        &self.0
    }

    pub fn to_base58(&self) -> String {
        to_base58(&self.0)
    }
}

impl FromStr for Digest {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = from_base58(s).map_err(|e| anyhow!("Invalid digest '{}': {}", s, e))?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_base58())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl ToBcsValue for Digest {
    fn to_bcs_value(&self) -> BcsValue {
        BcsValue::String(self.to_base58())
    }
}

impl FromBcsValue for Digest {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        value
            .as_str()?
            .parse()
            .map_err(|e: anyhow::Error| BcsError::mapping("ObjectDigest", e.to_string()))
    }
}
