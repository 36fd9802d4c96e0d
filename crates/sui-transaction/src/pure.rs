//! Encoding JSON values as pure arguments from Move parameter types.

use serde_json::Value;
use sui_bcs::{BcsWriter, U256};
use sui_transport::MoveType;
use sui_types::framework::{MOVE_STDLIB, SUI_FRAMEWORK};
use sui_types::SuiAddress;

use crate::error::{Result, TransactionError};

/// True when values of `ty` (references stripped) can be passed as pure bytes.
pub fn is_pure_type(ty: &MoveType) -> bool {
    match ty.body() {
        MoveType::Bool
        | MoveType::U8
        | MoveType::U16
        | MoveType::U32
        | MoveType::U64
        | MoveType::U128
        | MoveType::U256
        | MoveType::Address => true,
        MoveType::Vector(inner) => is_pure_type(inner),
        MoveType::Struct {
            type_arguments, ..
        } => match pure_struct(ty.body()) {
            Some(PureStruct::Option) => type_arguments.first().is_some_and(is_pure_type),
            Some(_) => true,
            None => false,
        },
        MoveType::Signer
        | MoveType::TypeParameter(_)
        | MoveType::Reference(_)
        | MoveType::MutableReference(_) => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PureStruct {
    String,
    AsciiString,
    Id,
    Option,
}

fn pure_struct(ty: &MoveType) -> Option<PureStruct> {
    if ty.is_struct(&MOVE_STDLIB, "string", "String") {
        Some(PureStruct::String)
    } else if ty.is_struct(&MOVE_STDLIB, "ascii", "String") {
        Some(PureStruct::AsciiString)
    } else if ty.is_struct(&SUI_FRAMEWORK, "object", "ID") {
        Some(PureStruct::Id)
    } else if ty.is_struct(&MOVE_STDLIB, "option", "Option") {
        Some(PureStruct::Option)
    } else {
        None
    }
}

/// BCS bytes of `value` read as a `ty`.
///
/// Integers accept JSON numbers or decimal strings; addresses and IDs accept
/// hex strings; `Option` accepts `null` for `None`.
///
/// ```
/// use serde_json::json;
/// use sui_transport::MoveType;
/// use sui_transaction::pure::encode_pure_value;
///
/// let bytes = encode_pure_value(&MoveType::Vector(Box::new(MoveType::U16)), &json!([1, "2"])).unwrap();
/// assert_eq!(bytes, vec![2, 1, 0, 2, 0]);
/// ```
pub fn encode_pure_value(ty: &MoveType, value: &Value) -> Result<Vec<u8>> {
    let mut writer = BcsWriter::default();
    write_value(ty.body(), value, &mut writer)?;
    Ok(writer.into_bytes())
}

fn mismatch(ty: &MoveType, value: &Value) -> TransactionError {
    TransactionError::invalid_pure(ty.to_string(), format!("unexpected value {}", value))
}

fn unsigned(ty: &MoveType, value: &Value) -> Result<u128> {
    let parsed = match value {
        Value::Number(n) => n.as_u64().map(u128::from),
        Value::String(s) => s.parse::<u128>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| mismatch(ty, value))
}

fn bounded(ty: &MoveType, value: &Value, max: u128) -> Result<u128> {
    let n = unsigned(ty, value)?;
    if n > max {
        return Err(TransactionError::invalid_pure(
            ty.to_string(),
            format!("{} is out of range", n),
        ));
    }
    Ok(n)
}

fn address(ty: &MoveType, value: &Value) -> Result<SuiAddress> {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| mismatch(ty, value))
}

fn write_value(ty: &MoveType, value: &Value, writer: &mut BcsWriter) -> Result<()> {
    match ty {
        MoveType::Bool => {
            let b = value.as_bool().ok_or_else(|| mismatch(ty, value))?;
            writer.write8(b as u8)?;
        }
        MoveType::U8 => {
            writer.write8(bounded(ty, value, u8::MAX as u128)? as u8)?;
        }
        MoveType::U16 => {
            writer.write16(bounded(ty, value, u16::MAX as u128)? as u16)?;
        }
        MoveType::U32 => {
            writer.write32(bounded(ty, value, u32::MAX as u128)? as u32)?;
        }
        MoveType::U64 => {
            writer.write64(bounded(ty, value, u64::MAX as u128)? as u64)?;
        }
        MoveType::U128 => {
            writer.write128(unsigned(ty, value)?)?;
        }
        MoveType::U256 => {
            let n = match value {
                Value::Number(n) => n.as_u64().map(U256::from),
                Value::String(s) => U256::from_dec_str(s).ok(),
                _ => None,
            }
            .ok_or_else(|| mismatch(ty, value))?;
            writer.write256(n)?;
        }
        MoveType::Address => {
            writer.write_bytes(address(ty, value)?.as_bytes())?;
        }
        MoveType::Vector(inner) => {
            let items = value.as_array().ok_or_else(|| mismatch(ty, value))?;
            writer.write_uleb128(items.len() as u64)?;
            for item in items {
                write_value(inner, item, writer)?;
            }
        }
        MoveType::Struct {
            type_arguments, ..
        } => match pure_struct(ty) {
            Some(PureStruct::String) | Some(PureStruct::AsciiString) => {
                let s = value.as_str().ok_or_else(|| mismatch(ty, value))?;
                if pure_struct(ty) == Some(PureStruct::AsciiString) && !s.is_ascii() {
                    return Err(TransactionError::invalid_pure(
                        ty.to_string(),
                        "string is not ASCII",
                    ));
                }
                writer.write_uleb128(s.len() as u64)?;
                writer.write_bytes(s.as_bytes())?;
            }
            Some(PureStruct::Id) => {
                writer.write_bytes(address(ty, value)?.as_bytes())?;
            }
            Some(PureStruct::Option) => {
                let inner = type_arguments
                    .first()
                    .ok_or_else(|| mismatch(ty, value))?;
                if value.is_null() {
                    writer.write8(0)?;
                } else {
                    writer.write8(1)?;
                    write_value(inner, value, writer)?;
                }
            }
            None => {
                return Err(TransactionError::invalid_pure(
                    ty.to_string(),
                    "type cannot be passed as a pure value",
                ))
            }
        },
        MoveType::Signer
        | MoveType::TypeParameter(_)
        | MoveType::Reference(_)
        | MoveType::MutableReference(_) => {
            return Err(TransactionError::invalid_pure(
                ty.to_string(),
                "type cannot be passed as a pure value",
            ))
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn std_struct(module: &str, name: &str, args: Vec<MoveType>) -> MoveType {
        MoveType::Struct {
            address: MOVE_STDLIB,
            module: module.to_string(),
            name: name.to_string(),
            type_arguments: args,
        }
    }

    #[test]
    fn test_integers_match_reference_bcs() {
        assert_eq!(
            encode_pure_value(&MoveType::U64, &json!("18446744073709551615")).unwrap(),
            bcs::to_bytes(&u64::MAX).unwrap()
        );
        assert_eq!(
            encode_pure_value(&MoveType::U16, &json!(513)).unwrap(),
            bcs::to_bytes(&513u16).unwrap()
        );
        assert_eq!(
            encode_pure_value(&MoveType::U128, &json!("340282366920938463463374607431768211455"))
                .unwrap(),
            bcs::to_bytes(&u128::MAX).unwrap()
        );
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let err = encode_pure_value(&MoveType::U8, &json!(256)).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for u8: 256 is out of range");
    }

    #[test]
    fn test_strings_and_options() {
        let string = std_struct("string", "String", vec![]);
        assert_eq!(
            encode_pure_value(&string, &json!("hi")).unwrap(),
            bcs::to_bytes("hi").unwrap()
        );

        let option = std_struct("option", "Option", vec![MoveType::U8]);
        assert_eq!(encode_pure_value(&option, &json!(null)).unwrap(), vec![0]);
        assert_eq!(encode_pure_value(&option, &json!(7)).unwrap(), vec![1, 7]);
        assert!(is_pure_type(&option));

        let ascii = std_struct("ascii", "String", vec![]);
        assert!(encode_pure_value(&ascii, &json!("héllo")).is_err());
    }

    #[test]
    fn test_references_are_stripped_and_objects_are_not_pure() {
        let id = MoveType::Struct {
            address: SUI_FRAMEWORK,
            module: "object".to_string(),
            name: "ID".to_string(),
            type_arguments: vec![],
        };
        let by_ref = MoveType::Reference(Box::new(id));
        let bytes = encode_pure_value(&by_ref, &json!("0x2")).unwrap();
        assert_eq!(bytes, SuiAddress::from_u16(2).to_vec());

        let coin = MoveType::struct_type(SUI_FRAMEWORK, "coin", "Coin");
        assert!(!is_pure_type(&MoveType::MutableReference(Box::new(coin))));
        assert!(!is_pure_type(&std_struct(
            "option",
            "Option",
            vec![MoveType::struct_type(SUI_FRAMEWORK, "coin", "Coin")]
        )));
    }
}
