//! Errors raised by the executors.

use sui_bcs::BcsError;
use sui_transaction::TransactionError;

#[derive(Debug)]
pub enum ExecutorError {
    /// Building, resolving or signing the transaction failed.
    Transaction(TransactionError),

    /// The ledger client failed, including submission and finality polling.
    Client(anyhow::Error),

    /// The cache backend failed.
    Cache(anyhow::Error),

    /// Effects or cached values could not be decoded.
    Bcs(BcsError),

    /// The coin pool is empty and could not be refilled.
    NoCoinsAvailable,

    /// The transaction that splits new pool coins did not succeed.
    CoinPoolRefill(String),

    /// The executor is shutting down.
    Closed,
}

impl std::fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutorError::Transaction(e) => write!(f, "{}", e),
            ExecutorError::Client(e) => write!(f, "Client error: {}", e),
            ExecutorError::Cache(e) => write!(f, "Cache error: {}", e),
            ExecutorError::Bcs(e) => write!(f, "{}", e),
            ExecutorError::NoCoinsAvailable => write!(f, "No coins available"),
            ExecutorError::CoinPoolRefill(reason) => {
                write!(f, "Failed to refill the gas coin pool: {}", reason)
            }
            ExecutorError::Closed => write!(f, "Executor is closed"),
        }
    }
}

impl std::error::Error for ExecutorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecutorError::Transaction(e) => Some(e),
            ExecutorError::Client(e) | ExecutorError::Cache(e) => Some(&**e),
            ExecutorError::Bcs(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TransactionError> for ExecutorError {
    fn from(e: TransactionError) -> Self {
        ExecutorError::Transaction(e)
    }
}

impl From<BcsError> for ExecutorError {
    fn from(e: BcsError) -> Self {
        ExecutorError::Bcs(e)
    }
}

impl From<anyhow::Error> for ExecutorError {
    fn from(e: anyhow::Error) -> Self {
        ExecutorError::Client(e)
    }
}

pub type Result<T, E = ExecutorError> = std::result::Result<T, E>;
