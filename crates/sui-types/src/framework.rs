//! Sui framework constants and well-known addresses.
//!
//! # Example
//!
//! ```
//! use sui_types::framework::{is_sui_type, SUI_FRAMEWORK};
//!
//! assert!(is_sui_type("0x2::sui::SUI"));
//! assert_eq!(SUI_FRAMEWORK.to_short_string(), "0x2");
//! ```

use crate::address::{ObjectID, SuiAddress};

// ============================================================================
// Framework Package Addresses
// ============================================================================

/// Move standard library address (0x1)
pub const MOVE_STDLIB: SuiAddress = SuiAddress::from_u16(1);

/// Sui framework address (0x2)
pub const SUI_FRAMEWORK: SuiAddress = SuiAddress::from_u16(2);

// ============================================================================
// Well-Known Object IDs
// ============================================================================

/// System state object ID (0x5)
pub const SYSTEM_STATE_OBJECT_ID: ObjectID = SuiAddress::from_u16(5);

/// Clock object ID (0x6)
pub const CLOCK_OBJECT_ID: ObjectID = SuiAddress::from_u16(6);

/// Random object ID (0x8)
pub const RANDOM_OBJECT_ID: ObjectID = SuiAddress::from_u16(8);

// ============================================================================
// Type strings and limits
// ============================================================================

pub const SUI_TYPE: &str = "0x2::sui::SUI";

/// Module and struct of the `Receiving<T>` wrapper in the framework.
pub const RECEIVING_MODULE: &str = "transfer";
pub const RECEIVING_STRUCT: &str = "Receiving";

/// Most gas coins a single transaction may pay with.
pub const MAX_GAS_OBJECTS: usize = 256;

/// True for `0x2::sui::SUI` in any address spelling.
pub fn is_sui_type(type_str: &str) -> bool {
    crate::type_tag::normalize_struct_tag(type_str)
        .ok()
        .zip(crate::type_tag::normalize_struct_tag(SUI_TYPE).ok())
        .is_some_and(|(a, b)| a == b)
}
