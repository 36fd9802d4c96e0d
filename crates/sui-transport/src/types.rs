//! Response types returned by a ledger client.

use std::fmt;

use serde::{Deserialize, Serialize};
use sui_bcs::{BcsError, CodecExt};
use sui_types::schema::transaction_effects_codec;
use sui_types::{
    ObjectDigest, ObjectID, ObjectRef, Owner, SequenceNumber, SuiAddress,
    TransactionDigest, TransactionEffects,
};

// =============================================================================
// Objects
// =============================================================================

/// Latest known state of an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectData {
    pub object_id: ObjectID,
    pub version: SequenceNumber,
    pub digest: ObjectDigest,
    pub owner: Owner,
    /// Full Move type, e.g. `0x2::coin::Coin<0x2::sui::SUI>`. `None` for packages.
    #[serde(rename = "type")]
    pub object_type: Option<String>,
}

impl ObjectData {
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.object_id, self.version, self.digest)
    }
}

/// Per-object failure inside an otherwise successful batch lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectResponseError {
    NotExists {
        object_id: ObjectID,
    },
    Deleted {
        object_id: ObjectID,
        version: SequenceNumber,
        digest: ObjectDigest,
    },
    Unknown {
        object_id: ObjectID,
        message: String,
    },
}

impl ObjectResponseError {
    pub fn object_id(&self) -> ObjectID {
        match self {
            ObjectResponseError::NotExists { object_id }
            | ObjectResponseError::Deleted { object_id, .. }
            | ObjectResponseError::Unknown { object_id, .. } => *object_id,
        }
    }
}

impl fmt::Display for ObjectResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectResponseError::NotExists { object_id } => {
                write!(f, "Object {} does not exist", object_id)
            }
            ObjectResponseError::Deleted {
                object_id, version, ..
            } => write!(f, "Object {} was deleted at version {}", object_id, version),
            ObjectResponseError::Unknown { object_id, message } => {
                write!(f, "Object {}: {}", object_id, message)
            }
        }
    }
}

impl std::error::Error for ObjectResponseError {}

/// One entry per requested id, in request order.
pub type ObjectResponse = Result<ObjectData, ObjectResponseError>;

// =============================================================================
// Coins
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinStruct {
    pub coin_type: String,
    pub coin_object_id: ObjectID,
    pub version: SequenceNumber,
    pub digest: ObjectDigest,
    pub balance: u64,
}

impl CoinStruct {
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.coin_object_id, self.version, self.digest)
    }
}

/// A page of coins. No ordering is guaranteed across or within pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinPage {
    pub data: Vec<CoinStruct>,
    pub next_cursor: Option<String>,
    pub has_next_page: bool,
}

// =============================================================================
// Execution
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRunResult {
    pub effects: TransactionEffects,
}

/// Result of submitting a signed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteResult {
    pub digest: TransactionDigest,
    /// BCS-encoded `TransactionEffects`.
    pub raw_effects: Vec<u8>,
}

impl ExecuteResult {
    pub fn effects(&self) -> Result<TransactionEffects, BcsError> {
        transaction_effects_codec().parse(&self.raw_effects)
    }
}

/// Snapshot of the system state relevant to gas pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemState {
    pub epoch: u64,
    pub reference_gas_price: u64,
    pub epoch_start_timestamp_ms: u64,
    pub epoch_duration_ms: u64,
}

impl SystemState {
    /// Wall-clock millisecond at which the current epoch is expected to end.
    pub fn epoch_end_timestamp_ms(&self) -> u64 {
        self.epoch_start_timestamp_ms
            .saturating_add(self.epoch_duration_ms)
    }
}

// =============================================================================
// Normalized Move signatures
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveVisibility {
    Private,
    Public,
    Friend,
}

/// A Move type as it appears in a function signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveType {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    Address,
    Signer,
    Vector(Box<MoveType>),
    Struct {
        address: SuiAddress,
        module: String,
        name: String,
        type_arguments: Vec<MoveType>,
    },
    TypeParameter(u16),
    Reference(Box<MoveType>),
    MutableReference(Box<MoveType>),
}

impl MoveType {
    pub fn struct_type(address: SuiAddress, module: &str, name: &str) -> Self {
        MoveType::Struct {
            address,
            module: module.to_string(),
            name: name.to_string(),
            type_arguments: vec![],
        }
    }

    /// The referenced type for references, otherwise `self`.
    pub fn body(&self) -> &MoveType {
        match self {
            MoveType::Reference(inner) | MoveType::MutableReference(inner) => inner,
            other => other,
        }
    }

    pub fn is_struct(&self, address: &SuiAddress, module: &str, name: &str) -> bool {
        matches!(
            self.body(),
            MoveType::Struct { address: a, module: m, name: n, .. }
                if a == address && m == module && n == name
        )
    }
}

impl fmt::Display for MoveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveType::Bool => f.write_str("bool"),
            MoveType::U8 => f.write_str("u8"),
            MoveType::U16 => f.write_str("u16"),
            MoveType::U32 => f.write_str("u32"),
            MoveType::U64 => f.write_str("u64"),
            MoveType::U128 => f.write_str("u128"),
            MoveType::U256 => f.write_str("u256"),
            MoveType::Address => f.write_str("address"),
            MoveType::Signer => f.write_str("signer"),
            MoveType::Vector(inner) => write!(f, "vector<{}>", inner),
            MoveType::Struct {
                address,
                module,
                name,
                type_arguments,
            } => {
                write!(f, "{}::{}::{}", address.to_short_string(), module, name)?;
                if !type_arguments.is_empty() {
                    let args: Vec<String> = type_arguments.iter().map(|t| t.to_string()).collect();
                    write!(f, "<{}>", args.join(", "))?;
                }
                Ok(())
            }
            MoveType::TypeParameter(index) => write!(f, "T{}", index),
            MoveType::Reference(inner) => write!(f, "&{}", inner),
            MoveType::MutableReference(inner) => write!(f, "&mut {}", inner),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveFunction {
    pub visibility: MoveVisibility,
    pub is_entry: bool,
    pub type_parameters: usize,
    pub parameters: Vec<MoveType>,
    pub returns: Vec<MoveType>,
}

impl MoveFunction {
    /// A public function with the given parameters and no returns.
    pub fn public(parameters: Vec<MoveType>) -> Self {
        Self {
            visibility: MoveVisibility::Public,
            is_entry: false,
            type_parameters: 0,
            parameters,
            returns: vec![],
        }
    }
}

/// `package::module::function` key used for caching normalized functions.
pub fn move_function_key(package: &SuiAddress, module: &str, function: &str) -> String {
    format!("{}::{}::{}", package.to_hex_literal(), module, function)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_type_display() {
        let coin = MoveType::Struct {
            address: SuiAddress::from_u16(2),
            module: "coin".to_string(),
            name: "Coin".to_string(),
            type_arguments: vec![MoveType::TypeParameter(0)],
        };
        let param = MoveType::MutableReference(Box::new(coin.clone()));
        assert_eq!(param.to_string(), "&mut 0x2::coin::Coin<T0>");
        assert_eq!(param.body(), &coin);
        assert!(param.is_struct(&SuiAddress::from_u16(2), "coin", "Coin"));
    }

    #[test]
    fn test_epoch_end() {
        let state = SystemState {
            epoch: 3,
            reference_gas_price: 750,
            epoch_start_timestamp_ms: 1_000,
            epoch_duration_ms: 86_400_000,
        };
        assert_eq!(state.epoch_end_timestamp_ms(), 86_401_000);
    }
}
