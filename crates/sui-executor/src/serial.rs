//! One transaction at a time, reusing the gas coin from the previous effects.

use std::sync::Arc;

use sui_transaction::{Signer, Transaction};
use sui_transport::SuiClient;
use sui_types::env_utils::env_var_or;
use sui_types::{ObjectRef, TransactionEffects, TransactionEffectsV2};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::ObjectCache;
use crate::caching::{CachingTransactionExecutor, ExecutionResult};
use crate::error::{ExecutorError, Result};

/// Custom cache key holding the gas coin of the last executed transaction.
pub const GAS_COIN_KEY: &str = "gasCoin";

pub const DEFAULT_SERIAL_GAS_BUDGET: u64 = 50_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialExecutorOptions {
    /// Budget for transactions that do not set one.
    pub default_gas_budget: u64,
}

impl Default for SerialExecutorOptions {
    fn default() -> Self {
        Self {
            default_gas_budget: DEFAULT_SERIAL_GAS_BUDGET,
        }
    }
}

impl SerialExecutorOptions {
    /// Defaults overridden by `SUI_EXECUTOR_DEFAULT_GAS_BUDGET`.
    pub fn from_env() -> Self {
        Self {
            default_gas_budget: env_var_or(
                "SUI_EXECUTOR_DEFAULT_GAS_BUDGET",
                DEFAULT_SERIAL_GAS_BUDGET,
            ),
        }
    }
}

/// Executes transactions strictly in submission order.
///
/// Each transaction is built only after the previous one's effects have been
/// applied, so object versions and the gas coin come from the cache instead
/// of the ledger. Any execution error resets the cache.
pub struct SerialTransactionExecutor {
    signer: Arc<dyn Signer>,
    executor: CachingTransactionExecutor,
    options: SerialExecutorOptions,
    queue: Mutex<()>,
}

impl SerialTransactionExecutor {
    pub fn new(
        client: Arc<dyn SuiClient>,
        signer: Arc<dyn Signer>,
        options: SerialExecutorOptions,
    ) -> Self {
        Self::with_cache(client, signer, ObjectCache::new(), options)
    }

    pub fn with_cache(
        client: Arc<dyn SuiClient>,
        signer: Arc<dyn Signer>,
        cache: ObjectCache,
        options: SerialExecutorOptions,
    ) -> Self {
        Self {
            signer,
            executor: CachingTransactionExecutor::new(client, cache),
            options,
            queue: Mutex::new(()),
        }
    }

    pub fn cache(&self) -> &ObjectCache {
        self.executor.cache()
    }

    /// Apply effects of a transaction executed elsewhere with this signer.
    pub async fn apply_effects(&self, effects: &TransactionEffects) -> Result<()> {
        self.executor.apply_effects(effects).await?;
        self.cache_gas_coin(effects.v2()).await
    }

    async fn cache_gas_coin(&self, effects: &TransactionEffectsV2) -> Result<()> {
        let cache = self.executor.cache();
        match effects.gas_object() {
            Some((gas_coin, _)) => cache.set_custom(GAS_COIN_KEY, &gas_coin).await,
            None => cache.delete_custom(GAS_COIN_KEY).await,
        }
        .map_err(ExecutorError::Cache)
    }

    /// Build a copy of `transaction` in queue order without executing it.
    pub async fn build_transaction(&self, transaction: &Transaction) -> Result<Vec<u8>> {
        let _turn = self.queue.lock().await;
        self.build_in_turn(transaction).await
    }

    async fn build_in_turn(&self, transaction: &Transaction) -> Result<Vec<u8>> {
        let gas_coin: Option<ObjectRef> = self
            .executor
            .cache()
            .get_custom(GAS_COIN_KEY)
            .await
            .map_err(ExecutorError::Cache)?;

        let mut copy = transaction.fork();
        if let Some(gas_coin) = gas_coin {
            copy.set_gas_payment(vec![gas_coin]);
        }
        copy.set_gas_budget_if_not_set(self.options.default_gas_budget);
        copy.set_sender_if_not_set(self.signer.to_sui_address());
        self.executor.build_transaction(&mut copy).await
    }

    /// Build, sign and execute `transaction` after every earlier one.
    pub async fn execute_transaction(&self, transaction: &Transaction) -> Result<ExecutionResult> {
        let _turn = self.queue.lock().await;
        let bytes = self.build_in_turn(transaction).await?;
        self.execute_in_turn(&bytes).await
    }

    /// Sign and execute already-built transaction bytes in queue order.
    pub async fn execute_transaction_bytes(&self, tx_bytes: &[u8]) -> Result<ExecutionResult> {
        let _turn = self.queue.lock().await;
        self.execute_in_turn(tx_bytes).await
    }

    async fn execute_in_turn(&self, tx_bytes: &[u8]) -> Result<ExecutionResult> {
        let signed = self.signer.sign_transaction(tx_bytes).await?;
        match self
            .executor
            .execute_transaction(tx_bytes, &[signed.signature])
            .await
        {
            Ok(result) => {
                self.cache_gas_coin(&result.effects).await?;
                debug!(digest = %result.digest, success = result.is_success(), "serial execution finished");
                Ok(result)
            }
            Err(e) => {
                warn!(error = %e, "serial execution failed, resetting cache");
                if let Err(reset_error) = self.executor.reset().await {
                    warn!(error = %reset_error, "cache reset after failure did not complete");
                }
                Err(e)
            }
        }
    }

    pub async fn reset_cache(&self) -> Result<()> {
        self.executor.reset().await
    }

    pub async fn wait_for_last_transaction(&self) -> Result<()> {
        self.executor.wait_for_last_transaction().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sui_transaction::Ed25519Keypair;
    use sui_transport::test_utils::MockLedger;
    use sui_types::SuiAddress;

    fn transfer_split(tx: &mut Transaction, amount: u64, to: SuiAddress) {
        let amount = tx.pure_u64(amount).unwrap();
        let coin = tx.split_coins(tx.gas(), vec![amount]).unwrap();
        let to = tx.pure_address(to).unwrap();
        tx.transfer_objects(vec![coin.nested_result(0)], to).unwrap();
    }

    #[test]
    fn test_options_from_env() {
        std::env::set_var("SUI_EXECUTOR_DEFAULT_GAS_BUDGET", "1234");
        assert_eq!(SerialExecutorOptions::from_env().default_gas_budget, 1234);
        std::env::remove_var("SUI_EXECUTOR_DEFAULT_GAS_BUDGET");
        assert_eq!(SerialExecutorOptions::default().default_gas_budget, 50_000_000);
    }

    #[tokio::test]
    async fn test_gas_coin_is_reused_without_refetching() {
        let ledger = Arc::new(MockLedger::new());
        let keypair = Arc::new(Ed25519Keypair::from_secret_key(&[11; 32]));
        let sender = keypair.to_sui_address();
        ledger.add_coin(sender, 10_000_000_000);
        let executor =
            SerialTransactionExecutor::new(ledger.clone(), keypair, SerialExecutorOptions::default());

        let mut first = Transaction::new();
        transfer_split(&mut first, 10, sender);
        let result = executor.execute_transaction(&first).await.unwrap();
        assert!(result.is_success());
        let (gas_after, _) = result.effects.gas_object().unwrap();
        assert_eq!(
            executor.cache().get_custom::<ObjectRef>(GAS_COIN_KEY).await.unwrap(),
            Some(gas_after)
        );

        let mut second = Transaction::new();
        transfer_split(&mut second, 20, sender);
        let result = executor.execute_transaction(&second).await.unwrap();
        assert!(result.is_success());

        let executed = ledger.executed_transactions();
        assert_eq!(executed.len(), 2);
        let second_gas = &executed[1].v1().gas_data;
        assert_eq!(second_gas.payment, vec![gas_after]);
        assert_eq!(second_gas.budget, DEFAULT_SERIAL_GAS_BUDGET);
    }

    #[tokio::test]
    async fn test_failure_resets_cache() {
        let ledger = Arc::new(MockLedger::new());
        let keypair = Arc::new(Ed25519Keypair::from_secret_key(&[12; 32]));
        let sender = keypair.to_sui_address();
        ledger.add_coin(sender, 10_000_000_000);
        let executor =
            SerialTransactionExecutor::new(ledger.clone(), keypair, SerialExecutorOptions::default());

        let mut first = Transaction::new();
        transfer_split(&mut first, 10, sender);
        executor.execute_transaction(&first).await.unwrap();

        ledger.fail_next_submissions(1);
        let mut second = Transaction::new();
        transfer_split(&mut second, 20, sender);
        assert!(executor.execute_transaction(&second).await.is_err());
        assert_eq!(
            executor.cache().get_custom::<ObjectRef>(GAS_COIN_KEY).await.unwrap(),
            None
        );

        let mut third = Transaction::new();
        transfer_split(&mut third, 30, sender);
        assert!(executor.execute_transaction(&third).await.unwrap().is_success());
    }
}
