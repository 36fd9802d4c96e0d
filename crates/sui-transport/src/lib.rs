//! Ledger transport interface.
//!
//! This crate provides:
//! - [`client`]: the [`SuiClient`] trait every higher layer talks through
//! - [`types`]: objects, coins, dry-run / execution results, normalized Move signatures
//! - [`wait`]: finality polling with timeout and cancellation
//! - [`test_utils`]: [`MockLedger`](test_utils::MockLedger), an in-memory ledger
//!
//! # Example
//!
//! ```ignore
//! use sui_transport::{wait_for_transaction, SuiClient, WaitOptions};
//!
//! let result = client.execute_transaction(&bytes, &[signature]).await?;
//! wait_for_transaction(&client, &result.digest, WaitOptions::default()).await?;
//! ```

pub mod client;
pub mod test_utils;
pub mod types;
pub mod wait;

// Re-export main types for convenience
pub use client::{get_all_coins, SuiClient};
pub use types::{
    move_function_key, CoinPage, CoinStruct, DryRunResult, ExecuteResult, MoveFunction,
    MoveType, MoveVisibility, ObjectData, ObjectResponse, ObjectResponseError, SystemState,
};
pub use wait::{wait_for_transaction, CancelSignal, WaitOptions};
