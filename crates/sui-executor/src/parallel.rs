//! Concurrent execution over a pool of pre-split gas coins.
//!
//! Transactions that share no owned objects run side by side, each paying
//! with its own coin from the pool. Transactions that touch the same owned
//! object are serialized through per-object FIFO locks, so the later one is
//! built from the earlier one's effects.
//!
//! # Gas coins
//!
//! Every gas coin is in exactly one place at a time:
//!
//! - the pool, ready to pay for a transaction
//! - in flight, paying for a transaction being executed
//! - the source coins, waiting to be merged into the next refill; entries
//!   without a known reference are fetched again first
//!
//! The pool is refilled by splitting `coin_batch_size` coins of
//! `initial_coin_balance` off the source coins (or the signer's coins when
//! there are none).
//!
//! # Example
//!
//! ```ignore
//! let executor = ParallelTransactionExecutor::new(client, signer, ParallelExecutorOptions::from_env());
//! let (a, b) = futures::join!(
//!     executor.execute_transaction(first),
//!     executor.execute_transaction(second),
//! );
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sui_transaction::{
    Argument, BuildOptions, CallArg, Signer, Transaction, COIN_WITH_BALANCE,
};
use sui_transport::{get_all_coins, wait_for_transaction, SuiClient, WaitOptions};
use sui_types::env_utils::{env_duration_ms, env_var, env_var_or};
use sui_types::framework::{MAX_GAS_OBJECTS, SUI_TYPE};
use sui_types::{ExecutionStatus, ObjectArg, ObjectID, ObjectRef, Owner};
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, info, trace, warn};

use crate::cache::ObjectCache;
use crate::caching::{CachingTransactionExecutor, ExecutionResult};
use crate::error::{ExecutorError, Result};
use crate::locks::ObjectLocks;

pub const DEFAULT_COIN_BATCH_SIZE: usize = 20;
pub const DEFAULT_INITIAL_COIN_BALANCE: u64 = 200_000_000;
pub const DEFAULT_MINIMUM_COIN_BALANCE: u64 = 50_000_000;
pub const DEFAULT_MAX_POOL_SIZE: usize = 50;
pub const DEFAULT_EPOCH_BOUNDARY_WINDOW: Duration = Duration::from_millis(1_000);

/// Shortest wait before refetching a gas price that is about to expire.
const MIN_EPOCH_WAIT_MS: i64 = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelExecutorOptions {
    /// Coins split off per refill.
    pub coin_batch_size: usize,
    /// Balance of each newly split coin.
    pub initial_coin_balance: u64,
    /// Coins left with less than this after a transaction leave the pool.
    pub minimum_coin_balance: u64,
    /// Budget for transactions that do not set one. Defaults to
    /// `minimum_coin_balance`.
    pub default_gas_budget: Option<u64>,
    /// Stop using a cached gas price this long before the epoch ends.
    pub epoch_boundary_window: Duration,
    /// Upper bound on pooled plus in-flight coins, and on concurrent executions.
    pub max_pool_size: usize,
    /// Coins to fund refills from instead of the signer's coins.
    pub source_coins: Option<Vec<ObjectID>>,
}

impl Default for ParallelExecutorOptions {
    fn default() -> Self {
        Self {
            coin_batch_size: DEFAULT_COIN_BATCH_SIZE,
            initial_coin_balance: DEFAULT_INITIAL_COIN_BALANCE,
            minimum_coin_balance: DEFAULT_MINIMUM_COIN_BALANCE,
            default_gas_budget: None,
            epoch_boundary_window: DEFAULT_EPOCH_BOUNDARY_WINDOW,
            max_pool_size: DEFAULT_MAX_POOL_SIZE,
            source_coins: None,
        }
    }
}

impl ParallelExecutorOptions {
    /// Defaults overridden by the `SUI_EXECUTOR_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            coin_batch_size: env_var_or("SUI_EXECUTOR_COIN_BATCH_SIZE", DEFAULT_COIN_BATCH_SIZE),
            initial_coin_balance: env_var_or(
                "SUI_EXECUTOR_INITIAL_COIN_BALANCE",
                DEFAULT_INITIAL_COIN_BALANCE,
            ),
            minimum_coin_balance: env_var_or(
                "SUI_EXECUTOR_MINIMUM_COIN_BALANCE",
                DEFAULT_MINIMUM_COIN_BALANCE,
            ),
            default_gas_budget: env_var("SUI_EXECUTOR_DEFAULT_GAS_BUDGET"),
            epoch_boundary_window: env_duration_ms(
                "SUI_EXECUTOR_EPOCH_BOUNDARY_WINDOW_MS",
                DEFAULT_EPOCH_BOUNDARY_WINDOW,
            ),
            max_pool_size: env_var_or("SUI_EXECUTOR_MAX_POOL_SIZE", DEFAULT_MAX_POOL_SIZE),
            source_coins: None,
        }
    }

    pub fn with_source_coins(mut self, source_coins: Vec<ObjectID>) -> Self {
        self.source_coins = Some(source_coins);
        self
    }

    fn gas_budget(&self) -> u64 {
        self.default_gas_budget.unwrap_or(self.minimum_coin_balance)
    }
}

/// A pooled gas coin and its balance as last known to the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolCoin {
    pub object_ref: ObjectRef,
    pub balance: u64,
}

#[derive(Debug, Default)]
struct CoinPool {
    coins: VecDeque<PoolCoin>,
    in_flight: HashSet<ObjectID>,
    /// `None` values must be fetched before they can pay for a refill.
    source_coins: Option<BTreeMap<ObjectID, Option<ObjectRef>>>,
}

impl CoinPool {
    fn add_source_coin(&mut self, id: ObjectID, object_ref: Option<ObjectRef>) {
        self.source_coins
            .get_or_insert_with(BTreeMap::new)
            .insert(id, object_ref);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CachedGasPrice {
    price: u64,
    /// Wall-clock millisecond at which the epoch ends.
    expiration_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GasPriceLookup {
    Cached(u64),
    /// Fetch a new price, after waiting out the epoch change if one is near.
    Refresh { wait_ms: Option<u64> },
}

fn lookup_gas_price(
    cached: Option<CachedGasPrice>,
    now_ms: i64,
    window_ms: i64,
) -> GasPriceLookup {
    match cached {
        None => GasPriceLookup::Refresh { wait_ms: None },
        Some(cached) if cached.expiration_ms - window_ms - now_ms > 0 => {
            GasPriceLookup::Cached(cached.price)
        }
        Some(cached) => {
            let wait_ms = (cached.expiration_ms + window_ms - now_ms).max(MIN_EPOCH_WAIT_MS);
            GasPriceLookup::Refresh {
                wait_ms: Some(wait_ms as u64),
            }
        }
    }
}

/// Objects a transaction may take by value or mutable reference.
///
/// Shared objects are sequenced by the ledger and need no local lock.
fn owned_object_ids(transaction: &Transaction) -> Vec<ObjectID> {
    let mut ids = BTreeSet::new();
    for input in &transaction.data().inputs {
        match input {
            CallArg::Object(ObjectArg::ImmOrOwnedObject(object_ref))
            | CallArg::Object(ObjectArg::Receiving(object_ref)) => {
                ids.insert(object_ref.object_id);
            }
            CallArg::UnresolvedObject(object) if object.initial_shared_version.is_none() => {
                ids.insert(object.object_id);
            }
            _ => {}
        }
    }
    ids.into_iter().collect()
}

fn uses_gas_coin(transaction: &Transaction) -> bool {
    transaction
        .data()
        .commands
        .iter()
        .any(|command| command.arguments().iter().any(|a| **a == Argument::GasCoin))
}

pub struct ParallelTransactionExecutor {
    signer: Arc<dyn Signer>,
    executor: CachingTransactionExecutor,
    options: ParallelExecutorOptions,
    locks: ObjectLocks,
    /// Serializes gas selection and cache-backed resolution.
    build_queue: Mutex<()>,
    execute_permits: Semaphore,
    /// Held while the cache is being reset or invalidated.
    cache_lock: Mutex<()>,
    pool: parking_lot::Mutex<CoinPool>,
    gas_price: parking_lot::Mutex<Option<CachedGasPrice>>,
    wait_options: WaitOptions,
}

impl ParallelTransactionExecutor {
    pub fn new(
        client: Arc<dyn SuiClient>,
        signer: Arc<dyn Signer>,
        options: ParallelExecutorOptions,
    ) -> Self {
        Self::with_cache(client, signer, ObjectCache::new(), options)
    }

    pub fn with_cache(
        client: Arc<dyn SuiClient>,
        signer: Arc<dyn Signer>,
        cache: ObjectCache,
        options: ParallelExecutorOptions,
    ) -> Self {
        let mut pool = CoinPool::default();
        for id in options.source_coins.iter().flatten() {
            pool.add_source_coin(*id, None);
        }
        Self {
            signer,
            executor: CachingTransactionExecutor::new(client, cache),
            locks: ObjectLocks::new(),
            build_queue: Mutex::new(()),
            execute_permits: Semaphore::new(options.max_pool_size.max(1)),
            cache_lock: Mutex::new(()),
            pool: parking_lot::Mutex::new(pool),
            gas_price: parking_lot::Mutex::new(None),
            wait_options: WaitOptions::default(),
            options,
        }
    }

    pub fn with_wait_options(mut self, wait_options: WaitOptions) -> Self {
        self.executor = self.executor.with_wait_options(wait_options.clone());
        self.wait_options = wait_options;
        self
    }

    pub fn cache(&self) -> &ObjectCache {
        self.executor.cache()
    }

    pub fn options(&self) -> &ParallelExecutorOptions {
        &self.options
    }

    /// Coins ready to pay for a transaction.
    pub fn pool_coins(&self) -> Vec<PoolCoin> {
        self.pool.lock().coins.iter().copied().collect()
    }

    /// Coins waiting to fund the next refill, with their known references.
    pub fn source_coins(&self) -> BTreeMap<ObjectID, Option<ObjectRef>> {
        self.pool.lock().source_coins.clone().unwrap_or_default()
    }

    pub fn pending_transactions(&self) -> usize {
        self.pool.lock().in_flight.len()
    }

    /// Forget cached owned objects and the gas price.
    pub async fn reset_cache(&self) -> Result<()> {
        *self.gas_price.lock() = None;
        self.update_cache(self.executor.reset()).await
    }

    pub async fn wait_for_last_transaction(&self) -> Result<()> {
        self.update_cache(self.executor.wait_for_last_transaction())
            .await
    }

    /// Execute `transaction`, waiting first for any in-flight transaction
    /// that uses one of the same owned objects.
    pub async fn execute_transaction(&self, mut transaction: Transaction) -> Result<ExecutionResult> {
        let used_objects = self.get_used_objects(&mut transaction).await?;
        let _locks = self.locks.acquire(&used_objects).await;
        let _permit = self
            .execute_permits
            .acquire()
            .await
            .map_err(|_| ExecutorError::Closed)?;
        self.execute(transaction, &used_objects).await
    }

    async fn get_used_objects(&self, transaction: &mut Transaction) -> Result<Vec<ObjectID>> {
        let options = BuildOptions {
            client: Some(self.executor.client().clone()),
            only_transaction_kind: false,
            supported_intents: vec![COIN_WITH_BALANCE.to_string()],
        };
        transaction.prepare_for_serialization(&options).await?;
        let used = owned_object_ids(transaction);
        trace!(objects = used.len(), "collected owned objects");
        Ok(used)
    }

    async fn execute(
        &self,
        mut transaction: Transaction,
        used_objects: &[ObjectID],
    ) -> Result<ExecutionResult> {
        let mut gas_coin = None;
        let outcome = self
            .try_execute(&mut transaction, &mut gas_coin)
            .await;
        let error = match outcome {
            Ok(result) => return Ok(result),
            Err(error) => error,
        };
        warn!(error = %error, objects = used_objects.len(), "parallel execution failed");
        if let Some(coin) = gas_coin {
            let id = coin.object_ref.object_id;
            let mut pool = self.pool.lock();
            pool.in_flight.remove(&id);
            pool.add_source_coin(id, None);
        }
        let cleanup = self
            .update_cache(async {
                futures::try_join!(
                    async {
                        self.cache()
                            .delete_objects(used_objects)
                            .await
                            .map_err(ExecutorError::Cache)
                    },
                    self.executor.wait_for_last_transaction(),
                )
                .map(|_| ())
            })
            .await;
        if let Err(cleanup_error) = cleanup {
            warn!(error = %cleanup_error, "cache cleanup after failed execution did not complete");
        }
        Err(error)
    }

    async fn try_execute(
        &self,
        transaction: &mut Transaction,
        gas_coin: &mut Option<PoolCoin>,
    ) -> Result<ExecutionResult> {
        transaction.set_sender_if_not_set(self.signer.to_sui_address());

        let coin = {
            let _turn = self.build_queue.lock().await;
            if transaction.data().gas_data.price.is_none() {
                let price = self.get_gas_price().await?;
                transaction.set_gas_price(price);
            }
            transaction.set_gas_budget_if_not_set(self.options.gas_budget());

            drop(self.cache_lock.lock().await);
            let coin = self.get_gas_coin().await?;
            *gas_coin = Some(coin);
            transaction.set_gas_payment(vec![coin.object_ref]);

            self.executor.build_transaction_kind(transaction).await?;
            coin
        };

        let bytes = self.executor.build_transaction(transaction).await?;
        let signed = self.signer.sign_transaction(&bytes).await?;
        let result = self
            .executor
            .execute_transaction(&bytes, &[signed.signature])
            .await?;

        self.recycle_gas_coin(transaction, coin, &result);
        debug!(
            digest = %result.digest,
            success = result.is_success(),
            "parallel execution finished"
        );
        Ok(result)
    }

    fn recycle_gas_coin(&self, transaction: &Transaction, coin: PoolCoin, result: &ExecutionResult) {
        let mut pool = self.pool.lock();
        pool.in_flight.remove(&coin.object_ref.object_id);
        let Some((gas_ref, owner)) = result.effects.gas_object() else {
            return;
        };
        if owner != Owner::AddressOwner(self.signer.to_sui_address()) {
            return;
        }
        let gas_used = result.effects.gas_used;
        let charged = gas_used.computation_cost as i128 + gas_used.storage_cost as i128
            - gas_used.storage_rebate as i128;
        let remaining = (coin.balance as i128 - charged).clamp(0, u64::MAX as i128) as u64;

        if !uses_gas_coin(transaction) && remaining >= self.options.minimum_coin_balance {
            pool.coins.push_back(PoolCoin {
                object_ref: gas_ref,
                balance: remaining,
            });
        } else {
            trace!(object_id = %gas_ref.object_id, remaining, "gas coin retired to source coins");
            pool.add_source_coin(gas_ref.object_id, Some(gas_ref));
        }
    }

    async fn update_cache<F>(&self, update: F) -> Result<()>
    where
        F: Future<Output = Result<()>>,
    {
        let _guard = self.cache_lock.lock().await;
        update.await
    }

    async fn get_gas_price(&self) -> Result<u64> {
        let window_ms = self.options.epoch_boundary_window.as_millis() as i64;
        let cached = *self.gas_price.lock();
        match lookup_gas_price(cached, Utc::now().timestamp_millis(), window_ms) {
            GasPriceLookup::Cached(price) => return Ok(price),
            GasPriceLookup::Refresh { wait_ms: Some(wait_ms) } => {
                debug!(wait_ms, "gas price expires soon, waiting for the next epoch");
                tokio::time::sleep(Duration::from_millis(wait_ms)).await;
            }
            GasPriceLookup::Refresh { wait_ms: None } => {}
        }

        let state = self.executor.client().get_latest_system_state().await?;
        let fresh = CachedGasPrice {
            price: state.reference_gas_price,
            expiration_ms: state.epoch_end_timestamp_ms().min(i64::MAX as u64) as i64,
        };
        debug!(epoch = state.epoch, price = fresh.price, "refreshed reference gas price");
        *self.gas_price.lock() = Some(fresh);
        Ok(fresh.price)
    }

    /// Check a coin out of the pool, refilling it first if it is empty.
    async fn get_gas_coin(&self) -> Result<PoolCoin> {
        let needs_refill = {
            let pool = self.pool.lock();
            pool.coins.is_empty() && pool.in_flight.len() <= self.options.max_pool_size
        };
        if needs_refill {
            self.refill_coin_pool().await?;
        }
        let mut pool = self.pool.lock();
        let coin = pool
            .coins
            .pop_front()
            .ok_or(ExecutorError::NoCoinsAvailable)?;
        pool.in_flight.insert(coin.object_ref.object_id);
        Ok(coin)
    }

    async fn refill_coin_pool(&self) -> Result<()> {
        let (batch_size, source_coins) = {
            let mut pool = self.pool.lock();
            let capacity = (self.options.max_pool_size + 1)
                .saturating_sub(pool.coins.len() + pool.in_flight.len());
            let batch_size = self.options.coin_batch_size.min(capacity);
            if batch_size == 0 {
                return Ok(());
            }
            (batch_size, pool.source_coins.take().unwrap_or_default())
        };

        let source_ids: Vec<ObjectID> = source_coins.keys().copied().collect();
        let outcome = self.split_pool_coins(batch_size, source_coins).await;
        if outcome.is_err() {
            let mut pool = self.pool.lock();
            for id in source_ids {
                pool.add_source_coin(id, None);
            }
        }
        outcome
    }

    async fn split_pool_coins(
        &self,
        batch_size: usize,
        source_coins: BTreeMap<ObjectID, Option<ObjectRef>>,
    ) -> Result<()> {
        let address = self.signer.to_sui_address();
        let client = self.executor.client().clone();

        let mut payment = Vec::new();
        let mut refetch = Vec::new();
        for (id, known) in &source_coins {
            match known {
                Some(object_ref) => payment.push(*object_ref),
                None => refetch.push(*id),
            }
        }
        if !refetch.is_empty() {
            let objects = client.multi_get_objects(&refetch).await?;
            payment.extend(
                objects
                    .into_iter()
                    .filter_map(|object| object.ok())
                    .filter(|object| object.owner == Owner::AddressOwner(address))
                    .map(|object| object.object_ref()),
            );
        }
        if payment.is_empty() {
            payment = self.spare_owner_coins().await?;
        }
        if payment.is_empty() {
            return Err(ExecutorError::NoCoinsAvailable);
        }
        info!(
            batch_size,
            sources = payment.len(),
            "refilling gas coin pool"
        );

        let mut tx = Transaction::new();
        tx.set_sender(address);
        tx.set_gas_payment(payment);
        let price = self.get_gas_price().await?;
        tx.set_gas_price(price);
        let amounts = (0..batch_size)
            .map(|_| tx.pure_u64(self.options.initial_coin_balance))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let split = tx.split_coins(tx.gas(), amounts)?;
        let recipient = tx.pure_address(address)?;
        let count = u16::try_from(batch_size).unwrap_or(u16::MAX);
        tx.transfer_objects(split.nested_results(count).collect(), recipient)?;

        self.executor.wait_for_last_transaction().await?;
        let bytes = self.executor.build_transaction(&mut tx).await?;
        let signed = self.signer.sign_transaction(&bytes).await?;
        let result = self
            .executor
            .execute_transaction(&bytes, &[signed.signature])
            .await?;
        if let ExecutionStatus::Failure { error, .. } = &result.effects.status {
            return Err(ExecutorError::CoinPoolRefill(error.to_string()));
        }

        {
            let mut pool = self.pool.lock();
            for (object_ref, owner) in result.effects.created_objects() {
                if owner == Owner::AddressOwner(address) {
                    pool.coins.push_back(PoolCoin {
                        object_ref,
                        balance: self.options.initial_coin_balance,
                    });
                }
            }
            if let Some((gas_ref, _)) = result.effects.gas_object() {
                pool.add_source_coin(gas_ref.object_id, Some(gas_ref));
            }
            debug!(pool = pool.coins.len(), "gas coin pool refilled");
        }

        wait_for_transaction(client.as_ref(), &result.digest, self.wait_options.clone()).await?;
        Ok(())
    }

    /// The signer's SUI coins that are neither pooled nor paying for an
    /// in-flight transaction, largest first.
    async fn spare_owner_coins(&self) -> Result<Vec<ObjectRef>> {
        let address = self.signer.to_sui_address();
        let mut coins = get_all_coins(self.executor.client().as_ref(), address, SUI_TYPE).await?;
        let busy: HashSet<ObjectID> = {
            let pool = self.pool.lock();
            pool.coins
                .iter()
                .map(|coin| coin.object_ref.object_id)
                .chain(pool.in_flight.iter().copied())
                .collect()
        };
        coins.retain(|coin| !busy.contains(&coin.coin_object_id));
        coins.sort_by(|a, b| b.balance.cmp(&a.balance));
        Ok(coins
            .iter()
            .take(MAX_GAS_OBJECTS)
            .map(|coin| coin.object_ref())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sui_transaction::Ed25519Keypair;
    use sui_transport::test_utils::MockLedger;
    use sui_types::SuiAddress;

    fn setup(options: ParallelExecutorOptions) -> (Arc<MockLedger>, ParallelTransactionExecutor, SuiAddress) {
        let ledger = Arc::new(MockLedger::new());
        let keypair = Arc::new(Ed25519Keypair::from_secret_key(&[21; 32]));
        let address = keypair.to_sui_address();
        ledger.add_coin(address, 50_000_000_000);
        let executor = ParallelTransactionExecutor::new(ledger.clone(), keypair, options);
        (ledger, executor, address)
    }

    #[test]
    fn test_gas_price_lookup_respects_epoch_window() {
        let cached = CachedGasPrice {
            price: 750,
            expiration_ms: 10_000,
        };
        assert_eq!(
            lookup_gas_price(None, 0, 1_000),
            GasPriceLookup::Refresh { wait_ms: None }
        );
        assert_eq!(
            lookup_gas_price(Some(cached), 8_000, 1_000),
            GasPriceLookup::Cached(750)
        );
        // inside the window: wait until the window after the boundary
        assert_eq!(
            lookup_gas_price(Some(cached), 9_500, 1_000),
            GasPriceLookup::Refresh {
                wait_ms: Some(1_500)
            }
        );
        // long past the boundary: minimum wait
        assert_eq!(
            lookup_gas_price(Some(cached), 20_000, 1_000),
            GasPriceLookup::Refresh {
                wait_ms: Some(1_000)
            }
        );
    }

    #[test]
    fn test_options_from_env() {
        std::env::set_var("SUI_EXECUTOR_COIN_BATCH_SIZE", "5");
        std::env::set_var("SUI_EXECUTOR_EPOCH_BOUNDARY_WINDOW_MS", "250");
        let options = ParallelExecutorOptions::from_env();
        assert_eq!(options.coin_batch_size, 5);
        assert_eq!(options.epoch_boundary_window, Duration::from_millis(250));
        assert_eq!(options.gas_budget(), DEFAULT_MINIMUM_COIN_BALANCE);
        std::env::remove_var("SUI_EXECUTOR_COIN_BATCH_SIZE");
        std::env::remove_var("SUI_EXECUTOR_EPOCH_BOUNDARY_WINDOW_MS");
    }

    #[tokio::test]
    async fn test_first_execution_refills_pool() {
        let options = ParallelExecutorOptions {
            coin_batch_size: 4,
            ..ParallelExecutorOptions::default()
        };
        let (ledger, executor, address) = setup(options);

        let mut tx = Transaction::new();
        let recipient = tx.pure_address(SuiAddress::new([5; 32])).unwrap();
        let object = ledger.add_owned_object(address, "0x9::item::Item");
        let item = tx.object(object.object_id).unwrap();
        tx.transfer_objects(vec![item], recipient).unwrap();

        let result = executor.execute_transaction(tx).await.unwrap();
        assert!(result.is_success());

        // four split off, one used and returned
        let pool = executor.pool_coins();
        assert_eq!(pool.len(), 4);
        let (gas_after, _) = result.effects.gas_object().unwrap();
        let returned = pool.iter().find(|c| c.object_ref == gas_after).unwrap();
        assert_eq!(returned.balance, DEFAULT_INITIAL_COIN_BALANCE - 1_300);
        assert_eq!(executor.source_coins().len(), 1);
        assert_eq!(executor.pending_transactions(), 0);
    }

    #[tokio::test]
    async fn test_gas_coin_used_as_argument_is_retired() {
        let (_ledger, executor, address) = setup(ParallelExecutorOptions {
            coin_batch_size: 2,
            ..ParallelExecutorOptions::default()
        });

        let mut tx = Transaction::new();
        let amount = tx.pure_u64(1_000).unwrap();
        let coin = tx.split_coins(tx.gas(), vec![amount]).unwrap();
        let to = tx.pure_address(address).unwrap();
        tx.transfer_objects(vec![coin.nested_result(0)], to).unwrap();

        let result = executor.execute_transaction(tx).await.unwrap();
        let (gas_after, _) = result.effects.gas_object().unwrap();
        assert_eq!(executor.pool_coins().len(), 1);
        assert_eq!(
            executor.source_coins().get(&gas_after.object_id),
            Some(&Some(gas_after))
        );
    }

    #[tokio::test]
    async fn test_no_coins_available() {
        let ledger = Arc::new(MockLedger::new());
        let keypair = Arc::new(Ed25519Keypair::from_secret_key(&[22; 32]));
        let executor =
            ParallelTransactionExecutor::new(ledger, keypair, ParallelExecutorOptions::default());

        let mut tx = Transaction::new();
        let amount = tx.pure_u64(1).unwrap();
        tx.split_coins(tx.gas(), vec![amount]).unwrap();
        let err = executor.execute_transaction(tx).await.unwrap_err();
        assert_eq!(err.to_string(), "No coins available");
    }
}
