//! Execution orchestration on top of the transaction builder.
//!
//! This crate provides:
//! - [`cache`]: the object / Move function cache and its resolution plugin
//! - [`caching`]: an executor that applies its own effects to the cache
//! - [`serial`]: strictly ordered execution reusing one gas coin
//! - [`parallel`]: concurrent execution over a gas coin pool with per-object locks
//! - [`locks`]: the FIFO object locks used by the parallel executor
//! - [`metrics`]: cache hit/miss counters
//!
//! # Example
//!
//! ```ignore
//! use sui_executor::{SerialExecutorOptions, SerialTransactionExecutor};
//!
//! let executor = SerialTransactionExecutor::new(client, signer, SerialExecutorOptions::from_env());
//! let first = executor.execute_transaction(&tx_a).await?;
//! // tx_b sees tx_a's object versions without a ledger round trip
//! let second = executor.execute_transaction(&tx_b).await?;
//! ```

pub mod cache;
pub mod caching;
pub mod error;
pub mod locks;
pub mod metrics;
pub mod parallel;
pub mod serial;

// Re-export main types for convenience
pub use cache::{
    AsyncCache, CacheNamespace, CacheValue, InMemoryCache, MoveFunctionCacheEntry, ObjectCache,
    ObjectCacheEntry, OBJECT_CACHE_PLUGIN,
};
pub use caching::{CachingTransactionExecutor, ExecutionResult};
pub use error::{ExecutorError, Result};
pub use locks::{ObjectLockGuard, ObjectLocks};
pub use metrics::{CacheMetrics, MetricsSnapshot};
pub use parallel::{ParallelExecutorOptions, ParallelTransactionExecutor, PoolCoin};
pub use serial::{SerialExecutorOptions, SerialTransactionExecutor, GAS_COIN_KEY};
