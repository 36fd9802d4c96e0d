//! Move type tags: parsing, canonical display and value conversion.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sui_bcs::{BcsError, BcsValue, FromBcsValue, ToBcsValue};

use crate::address::SuiAddress;

/// Variant order matches the wire discriminants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    Bool,
    U8,
    U64,
    U128,
    Address,
    Signer,
    Vector(Box<TypeTag>),
    Struct(Box<StructTag>),
    U16,
    U32,
    U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StructTag {
    pub address: SuiAddress,
    pub module: String,
    pub name: String,
    pub type_params: Vec<TypeTag>,
}

impl StructTag {
    pub fn new(address: SuiAddress, module: &str, name: &str, type_params: Vec<TypeTag>) -> Self {
        Self {
            address,
            module: module.to_string(),
            name: name.to_string(),
            type_params,
        }
    }

    /// True when this is `address::module::name`, ignoring type parameters.
    pub fn is(&self, address: &SuiAddress, module: &str, name: &str) -> bool {
        self.address == *address && self.module == module && self.name == name
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse a Move type string into a TypeTag.
///
/// Supports:
/// - Primitive types: `bool`, `u8`, `u16`, `u32`, `u64`, `u128`, `u256`, `address`, `signer`
/// - Vector types: `vector<T>`
/// - Struct types: `0x2::module::Struct` or `0x2::module::Struct<T1, T2>`
///
/// # Examples
///
/// ```
/// use sui_types::type_tag::{parse_type_tag, TypeTag};
///
/// let tag = parse_type_tag("0x2::coin::Coin<0x2::sui::SUI>").unwrap();
/// assert!(matches!(tag, TypeTag::Struct(_)));
/// ```
pub fn parse_type_tag(type_str: &str) -> Result<TypeTag> {
    let type_str = type_str.trim();

    match type_str {
        "bool" => return Ok(TypeTag::Bool),
        "u8" => return Ok(TypeTag::U8),
        "u16" => return Ok(TypeTag::U16),
        "u32" => return Ok(TypeTag::U32),
        "u64" => return Ok(TypeTag::U64),
        "u128" => return Ok(TypeTag::U128),
        "u256" => return Ok(TypeTag::U256),
        "address" => return Ok(TypeTag::Address),
        "signer" => return Ok(TypeTag::Signer),
        _ => {}
    }

    if let Some(inner) = type_str
        .strip_prefix("vector<")
        .and_then(|s| s.strip_suffix('>'))
    {
        return Ok(TypeTag::Vector(Box::new(parse_type_tag(inner)?)));
    }

    Ok(TypeTag::Struct(Box::new(parse_struct_tag(type_str)?)))
}

/// Parse `0x<address>::<module>::<name><type_args>`.
pub fn parse_struct_tag(type_str: &str) -> Result<StructTag> {
    let type_str = type_str.trim();
    let (base_type, type_args) = match type_str.find('<') {
        Some(angle_pos) => {
            let args = type_str[angle_pos..]
                .strip_prefix('<')
                .and_then(|s| s.strip_suffix('>'))
                .ok_or_else(|| anyhow!("Unbalanced type arguments in '{}'", type_str))?;
            (&type_str[..angle_pos], Some(args))
        }
        None => (type_str, None),
    };

    let parts: Vec<&str> = base_type.split("::").collect();
    if parts.len() != 3 {
        bail!("Invalid struct type '{}'", type_str);
    }
    let address: SuiAddress = parts[0].parse()?;
    if !is_identifier(parts[1]) || !is_identifier(parts[2]) {
        bail!("Invalid identifier in struct type '{}'", type_str);
    }

    let type_params = match type_args {
        Some(args) if !args.trim().is_empty() => split_type_params(args)
            .into_iter()
            .map(parse_type_tag)
            .collect::<Result<Vec<_>>>()?,
        _ => vec![],
    };

    Ok(StructTag::new(address, parts[1], parts[2], type_params))
}

/// Canonical form of a struct type string with full-length addresses.
pub fn normalize_struct_tag(type_str: &str) -> Result<String> {
    Ok(parse_struct_tag(type_str)?.to_string())
}

/// Split type parameters respecting nested angle brackets.
///
/// Given "A, B<C, D>, E", returns ["A", "B<C, D>", "E"] by tracking bracket depth.
pub fn split_type_params(s: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut depth = 0;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => {
                result.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }

    if start < s.len() {
        result.push(s[start..].trim());
    }

    result
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.address, self.module, self.name)?;
        if !self.type_params.is_empty() {
            write!(f, "<")?;
            for (i, param) in self.type_params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", param)?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Bool => f.write_str("bool"),
            TypeTag::U8 => f.write_str("u8"),
            TypeTag::U16 => f.write_str("u16"),
            TypeTag::U32 => f.write_str("u32"),
            TypeTag::U64 => f.write_str("u64"),
            TypeTag::U128 => f.write_str("u128"),
            TypeTag::U256 => f.write_str("u256"),
            TypeTag::Address => f.write_str("address"),
            TypeTag::Signer => f.write_str("signer"),
            TypeTag::Vector(inner) => write!(f, "vector<{}>", inner),
            TypeTag::Struct(tag) => write!(f, "{}", tag),
        }
    }
}

impl FromStr for TypeTag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_type_tag(s)
    }
}

impl Serialize for TypeTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TypeTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_type_tag(&s).map_err(serde::de::Error::custom)
    }
}

impl ToBcsValue for StructTag {
    fn to_bcs_value(&self) -> BcsValue {
        BcsValue::structure([
            ("address", self.address.to_bcs_value()),
            ("module", BcsValue::String(self.module.clone())),
            ("name", BcsValue::String(self.name.clone())),
            ("typeParams", self.type_params.to_bcs_value()),
        ])
    }
}

impl FromBcsValue for StructTag {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        Ok(Self {
            address: value.get("address")?,
            module: value.get("module")?,
            name: value.get("name")?,
            type_params: value.get("typeParams")?,
        })
    }
}

impl ToBcsValue for TypeTag {
    fn to_bcs_value(&self) -> BcsValue {
        match self {
            TypeTag::Bool => BcsValue::unit_variant("bool"),
            TypeTag::U8 => BcsValue::unit_variant("u8"),
            TypeTag::U16 => BcsValue::unit_variant("u16"),
            TypeTag::U32 => BcsValue::unit_variant("u32"),
            TypeTag::U64 => BcsValue::unit_variant("u64"),
            TypeTag::U128 => BcsValue::unit_variant("u128"),
            TypeTag::U256 => BcsValue::unit_variant("u256"),
            TypeTag::Address => BcsValue::unit_variant("address"),
            TypeTag::Signer => BcsValue::unit_variant("signer"),
            TypeTag::Vector(inner) => BcsValue::variant("vector", inner.to_bcs_value()),
            TypeTag::Struct(tag) => BcsValue::variant("struct", tag.to_bcs_value()),
        }
    }
}

impl FromBcsValue for TypeTag {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        let (variant, _) = value.as_variant()?;
        Ok(match variant {
            "bool" => TypeTag::Bool,
            "u8" => TypeTag::U8,
            "u16" => TypeTag::U16,
            "u32" => TypeTag::U32,
            "u64" => TypeTag::U64,
            "u128" => TypeTag::U128,
            "u256" => TypeTag::U256,
            "address" => TypeTag::Address,
            "signer" => TypeTag::Signer,
            "vector" => TypeTag::Vector(Box::new(value.payload()?.decode()?)),
            "struct" => TypeTag::Struct(Box::new(value.payload()?.decode()?)),
            other => {
                return Err(BcsError::mapping(
                    "TypeTag",
                    format!("unknown variant `{}`", other),
                ))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_primitives() {
        assert_eq!(parse_type_tag("bool").unwrap(), TypeTag::Bool);
        assert_eq!(parse_type_tag(" u64 ").unwrap(), TypeTag::U64);
        assert_eq!(parse_type_tag("address").unwrap(), TypeTag::Address);
    }

    #[test]
    fn test_parse_vector() {
        let tag = parse_type_tag("vector<vector<u8>>").unwrap();
        assert_eq!(
            tag,
            TypeTag::Vector(Box::new(TypeTag::Vector(Box::new(TypeTag::U8))))
        );
    }

    #[test]
    fn test_parse_struct() {
        let tag = parse_struct_tag("0x2::coin::Coin<0x2::sui::SUI>").unwrap();
        assert_eq!(tag.module, "coin");
        assert_eq!(tag.name, "Coin");
        assert_eq!(tag.type_params.len(), 1);
        assert!(tag.is(&SuiAddress::from_u16(2), "coin", "Coin"));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_type_tag("0x2::coin").is_err());
        assert!(parse_type_tag("0x2::9coin::Coin").is_err());
        assert!(parse_type_tag("0x2::coin::Coin<u8").is_err());
        assert!(parse_type_tag("@mvr/app::m::T").is_err());
    }

    #[test]
    fn test_normalize_struct_tag() {
        assert_eq!(
            normalize_struct_tag("0x2::coin::Coin<0x2::sui::SUI>").unwrap(),
            "0x0000000000000000000000000000000000000000000000000000000000000002::coin::Coin<\
             0x0000000000000000000000000000000000000000000000000000000000000002::sui::SUI>"
        );
    }

    #[test]
    fn test_split_type_params() {
        let params = split_type_params("u64, 0x2::coin::Coin<0x2::sui::SUI>, bool");
        assert_eq!(params.len(), 3);
        assert_eq!(params[0], "u64");
        assert_eq!(params[1], "0x2::coin::Coin<0x2::sui::SUI>");
        assert_eq!(params[2], "bool");
    }
}
