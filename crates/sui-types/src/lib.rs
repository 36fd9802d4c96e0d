//! Shared ledger types for the txkit workspace.
//!
//! This crate sits directly above `sui-bcs` and provides the value types every
//! other crate speaks:
//!
//! - [`address`], [`digest`], [`object`] - identifiers and object references
//! - [`type_tag`] - Move type tags with parsing and canonical display
//! - [`transaction`] and [`effects`] - the resolved wire structures
//! - [`schema`] - the BCS schemas for all of the above
//! - [`hash`], [`intent`], [`crypto`] - digests and signing prefixes

pub mod address;
pub mod crypto;
pub mod digest;
pub mod effects;
pub mod env_utils;
pub mod framework;
pub mod hash;
pub mod intent;
pub mod object;
pub mod schema;
pub mod transaction;
pub mod type_tag;

pub use address::{
    is_valid_sui_address, normalize_address, normalize_address_short, ObjectID, SuiAddress,
    SUI_ADDRESS_LENGTH,
};
pub use crypto::{PublicKey, SignatureScheme};
pub use digest::{Digest, ObjectDigest, TransactionDigest, DIGEST_LENGTH};
pub use effects::{
    EffectsObjectChange, ExecutionFailure, ExecutionStatus, GasCostSummary, IdOperation,
    ObjectIn, ObjectOut, TransactionEffects, TransactionEffectsV2, UnchangedSharedKind,
};
pub use hash::{blake2b256, signing_digest, transaction_digest};
pub use intent::{Intent, IntentMessage, IntentScope};
pub use object::{ObjectRef, Owner, SequenceNumber};
pub use transaction::{
    Argument, CallArg, Command, GasData, ObjectArg, ProgrammableMoveCall,
    ProgrammableTransaction, TransactionData, TransactionDataV1, TransactionExpiration,
    TransactionKind,
};
pub use type_tag::{parse_struct_tag, parse_type_tag, StructTag, TypeTag};
