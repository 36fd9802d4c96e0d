//! Programmable transaction building.
//!
//! This crate provides:
//! - [`transaction`]: the high-level [`Transaction`] API
//! - [`builder`]: [`TransactionDataBuilder`], the mutable aggregate with its
//!   argument-index invariants, `replace_command` and canonical `build`
//! - [`plugin`]: the resolution pipeline runner and per-transaction [`PluginRegistry`]
//! - [`resolve`]: the built-in stages (signatures, objects, gas, named packages)
//! - [`intents`]: the `CoinWithBalance` intent and its resolver
//! - [`pure`]: encoding JSON values from Move parameter types
//! - [`signer`]: the [`Signer`] interface and an Ed25519 implementation
//!
//! # Example
//!
//! ```ignore
//! use sui_transaction::{BuildOptions, CoinWithBalance, Transaction};
//!
//! let mut tx = Transaction::new();
//! let coin = tx.coin_with_balance(CoinWithBalance::sui(1_000))?;
//! let to = tx.pure_address(recipient)?;
//! tx.transfer_objects(vec![coin.arg()], to)?;
//! let signed = tx.sign(&keypair, &BuildOptions::with_client(client)).await?;
//! ```

pub mod arguments;
pub mod builder;
pub mod commands;
pub mod error;
pub mod inputs;
pub mod intents;
pub mod plugin;
pub mod pure;
pub mod resolve;
pub mod signer;
pub mod transaction;

// Re-export main types for convenience
pub use arguments::{Argument, InputKind, TransactionResult, MAX_NESTED_RESULTS};
pub use builder::{
    BuildOverrides, DataBuildOptions, GasConfig, ResultRemap, TransactionDataBuilder,
};
pub use commands::{Command, Intent, IntentInput, MoveCall};
pub use error::TransactionError;
pub use inputs::{CallArg, UnresolvedObject};
pub use intents::{CoinWithBalance, CoinWithBalanceResolver, COIN_WITH_BALANCE};
pub use plugin::{run_plugins, BuildOptions, Next, PluginRef, PluginRegistry, TransactionPlugin};
pub use resolve::{NamedPackagesOverrides, NamedPackagesPlugin, ResolveTransactionData};
pub use signer::{Ed25519Keypair, SignedTransaction, Signer};
pub use transaction::Transaction;
