//! Addresses and object ids.
//!
//! Sui addresses are 32-byte values, but they're often represented in different formats:
//! - Short form: "0x2"
//! - Full form: "0x0000000000000000000000000000000000000000000000000000000000000002"
//! - Without prefix: "2"
//!
//! [`SuiAddress`] accepts all of them and always renders the full form.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sui_bcs::{BcsError, BcsValue, FromBcsValue, ToBcsValue};

pub const SUI_ADDRESS_LENGTH: usize = 32;

/// A 32-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SuiAddress([u8; SUI_ADDRESS_LENGTH]);

/// Object ids share the address space.
pub type ObjectID = SuiAddress;

impl SuiAddress {
    pub const ZERO: SuiAddress = SuiAddress([0u8; SUI_ADDRESS_LENGTH]);

    pub const fn new(bytes: [u8; SUI_ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Address whose last two bytes are `value` (big-endian), e.g. `0x6`.
    pub const fn from_u16(value: u16) -> Self {
        let mut bytes = [0u8; SUI_ADDRESS_LENGTH];
        bytes[30] = (value >> 8) as u8;
        bytes[31] = value as u8;
        Self(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let array: [u8; SUI_ADDRESS_LENGTH] = bytes
            .try_into()
            .map_err(|_| anyhow!("Invalid address length {}, expected 32", bytes.len()))?;
        Ok(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8; SUI_ADDRESS_LENGTH] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Full-form hex with `0x` prefix.
    pub fn to_hex_literal(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Hex with leading zeros stripped, e.g. `0x2`.
    pub fn to_short_string(&self) -> String {
        normalize_address_short(&self.to_hex_literal())
    }
}

impl FromStr for SuiAddress {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let hex_part = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if hex_part.is_empty() || hex_part.len() > SUI_ADDRESS_LENGTH * 2 {
            bail!("Invalid Sui address: {}", s);
        }
        let normalized = normalize_address(trimmed);
        let bytes = hex::decode(&normalized[2..])
            .map_err(|e| anyhow!("Invalid Sui address '{}': {}", s, e))?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Display for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_short_string())
    }
}

impl Serialize for SuiAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_literal())
    }
}

impl<'de> Deserialize<'de> for SuiAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl ToBcsValue for SuiAddress {
    fn to_bcs_value(&self) -> BcsValue {
        BcsValue::String(self.to_hex_literal())
    }
}

impl FromBcsValue for SuiAddress {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        value
            .as_str()?
            .parse()
            .map_err(|e: anyhow::Error| BcsError::mapping("Address", e.to_string()))
    }
}

/// Normalize an address to lowercase with 0x prefix and full 64 hex characters.
///
/// This is the canonical address format for internal use and comparisons.
///
/// # Examples
///
/// ```
/// use sui_types::address::normalize_address;
///
/// assert_eq!(
///     normalize_address("0x2"),
///     "0x0000000000000000000000000000000000000000000000000000000000000002"
/// );
/// ```
pub fn normalize_address(addr: &str) -> String {
    let addr = addr.trim();
    let hex = addr
        .strip_prefix("0x")
        .or_else(|| addr.strip_prefix("0X"))
        .unwrap_or(addr)
        .to_lowercase();
    if hex.len() < 64 {
        format!("0x{:0>64}", hex)
    } else {
        format!("0x{}", &hex[..64])
    }
}

/// Normalize an address to short form (minimal hex digits).
pub fn normalize_address_short(addr: &str) -> String {
    let normalized = normalize_address(addr);
    let hex = normalized.strip_prefix("0x").unwrap_or(&normalized);
    let trimmed = hex.trim_start_matches('0');
    if trimmed.is_empty() {
        "0x0".to_string()
    } else {
        format!("0x{}", trimmed)
    }
}

/// True for `0x`-optional hex strings of at most 64 digits.
pub fn is_valid_sui_address(addr: &str) -> bool {
    addr.parse::<SuiAddress>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_and_long_forms() {
        let short: SuiAddress = "0x2".parse().unwrap();
        let long: SuiAddress = "0x0000000000000000000000000000000000000000000000000000000000000002"
            .parse()
            .unwrap();
        let bare: SuiAddress = "2".parse().unwrap();
        assert_eq!(short, long);
        assert_eq!(short, bare);
        assert_eq!(short, SuiAddress::from_u16(2));
        assert_eq!(short.to_short_string(), "0x2");
        assert_eq!(
            short.to_string(),
            "0x0000000000000000000000000000000000000000000000000000000000000002"
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("not-hex".parse::<SuiAddress>().is_err());
        assert!("0x".parse::<SuiAddress>().is_err());
        assert!(format!("0x{}", "1".repeat(65)).parse::<SuiAddress>().is_err());
        assert!(!is_valid_sui_address("0xGGG"));
        assert!(is_valid_sui_address("0XABC"));
    }

    #[test]
    fn test_serde_as_string() {
        let addr = SuiAddress::from_u16(0xdee9);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(
            json,
            "\"0x000000000000000000000000000000000000000000000000000000000000dee9\""
        );
        let back: SuiAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_normalize_address() {
        assert_eq!(
            normalize_address("  0XABC  "),
            "0x0000000000000000000000000000000000000000000000000000000000000abc"
        );
        assert_eq!(normalize_address_short("0x00abc"), "0xabc");
        assert_eq!(normalize_address_short("0x0"), "0x0");
    }

    #[test]
    fn test_from_bytes_length() {
        assert!(SuiAddress::from_bytes(&[1u8; 32]).is_ok());
        let err = SuiAddress::from_bytes(&[1u8; 20]).unwrap_err();
        assert!(err.to_string().contains("expected 32"));
    }
}
