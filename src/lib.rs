//! Sui Transaction Toolkit
//!
//! Building, encoding and executing Sui programmable transactions:
//!
//! - **BCS**: schema-driven Binary Canonical Serialization ([`bcs`])
//! - **Types**: addresses, object refs, wire transaction data and effects ([`types`])
//! - **Transport**: the ledger client interface and finality polling ([`transport`])
//! - **Transaction builder**: commands, inputs, the resolution plugin pipeline ([`transaction`])
//! - **Execution**: object cache, serial and parallel executors ([`executor`])
//!
//! # Example
//!
//! ```ignore
//! use sui_txkit::transaction::Transaction;
//! use sui_txkit::executor::{SerialExecutorOptions, SerialTransactionExecutor};
//!
//! let mut tx = Transaction::new();
//! let amount = tx.pure_u64(1_000)?;
//! let coin = tx.split_coins(tx.gas(), vec![amount])?;
//! let recipient = tx.pure_address(recipient)?;
//! tx.transfer_objects(vec![coin.nested_result(0)], recipient)?;
//!
//! let executor = SerialTransactionExecutor::new(client, signer, SerialExecutorOptions::default());
//! executor.execute_transaction(&tx).await?;
//! ```

pub use sui_bcs as bcs;
pub use sui_executor as executor;
pub use sui_transaction as transaction;
pub use sui_transport as transport;
pub use sui_types as types;

pub use sui_bcs::{BcsError, BcsReader, BcsWriter, Codec};
pub use sui_executor::{
    ExecutionResult, ExecutorError, ObjectCache, ParallelExecutorOptions,
    ParallelTransactionExecutor, SerialExecutorOptions, SerialTransactionExecutor,
};
pub use sui_transaction::{Argument, BuildOptions, Signer, Transaction, TransactionError};
pub use sui_transport::{SuiClient, WaitOptions};
pub use sui_types::{ObjectID, ObjectRef, SuiAddress};
