//! An executor that keeps an [`ObjectCache`] in step with its own effects.

use std::sync::Arc;

use parking_lot::Mutex;
use sui_transaction::{BuildOptions, Signer, Transaction};
use sui_transport::{wait_for_transaction, SuiClient, WaitOptions};
use sui_types::{TransactionDigest, TransactionEffects, TransactionEffectsV2};
use tracing::{debug, info};

use crate::cache::{ObjectCache, OBJECT_CACHE_PLUGIN};
use crate::error::{ExecutorError, Result};

/// Effects of a submitted transaction, decoded.
///
/// A Move abort is still an `Ok` result; check [`is_success`](Self::is_success).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub digest: TransactionDigest,
    pub effects: TransactionEffectsV2,
    /// BCS `TransactionEffects` as returned by the ledger.
    pub raw_effects: Vec<u8>,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.effects.status.is_success()
    }

    pub fn effects_base64(&self) -> String {
        sui_bcs::to_base64(&self.raw_effects)
    }
}

pub struct CachingTransactionExecutor {
    client: Arc<dyn SuiClient>,
    cache: ObjectCache,
    last_digest: Mutex<Option<TransactionDigest>>,
    wait_options: WaitOptions,
}

impl CachingTransactionExecutor {
    pub fn new(client: Arc<dyn SuiClient>, cache: ObjectCache) -> Self {
        Self {
            client,
            cache,
            last_digest: Mutex::new(None),
            wait_options: WaitOptions::default(),
        }
    }

    /// Options used when waiting for the last transaction to be indexed.
    pub fn with_wait_options(mut self, wait_options: WaitOptions) -> Self {
        self.wait_options = wait_options;
        self
    }

    pub fn cache(&self) -> &ObjectCache {
        &self.cache
    }

    pub fn client(&self) -> &Arc<dyn SuiClient> {
        &self.client
    }

    fn install_plugin(&self, transaction: &mut Transaction) {
        let installed = transaction
            .plugins()
            .build
            .iter()
            .any(|plugin| plugin.name() == OBJECT_CACHE_PLUGIN);
        if !installed {
            transaction.add_build_plugin(self.cache.as_plugin());
        }
    }

    /// Build `transaction`, resolving what it can from the cache.
    pub async fn build_transaction(&self, transaction: &mut Transaction) -> Result<Vec<u8>> {
        self.install_plugin(transaction);
        Ok(transaction
            .build(&BuildOptions::with_client(self.client.clone()))
            .await?)
    }

    /// Resolve only the transaction kind, leaving gas data as it is.
    pub async fn build_transaction_kind(&self, transaction: &mut Transaction) -> Result<Vec<u8>> {
        self.install_plugin(transaction);
        Ok(transaction
            .build(&BuildOptions::with_client(self.client.clone()).kind_only())
            .await?)
    }

    /// Submit signed bytes and apply the resulting effects to the cache.
    pub async fn execute_transaction(
        &self,
        tx_bytes: &[u8],
        signatures: &[String],
    ) -> Result<ExecutionResult> {
        let result = self
            .client
            .execute_transaction(tx_bytes, signatures)
            .await?;
        let effects = result.effects()?;
        self.apply_effects(&effects).await?;
        debug!(digest = %result.digest, "transaction executed");
        Ok(ExecutionResult {
            digest: result.digest,
            effects: effects.into_v2(),
            raw_effects: result.raw_effects,
        })
    }

    /// Build with the signer as default sender, sign and execute.
    pub async fn sign_and_execute_transaction(
        &self,
        transaction: &mut Transaction,
        signer: &dyn Signer,
    ) -> Result<ExecutionResult> {
        transaction.set_sender_if_not_set(signer.to_sui_address());
        let bytes = self.build_transaction(transaction).await?;
        let signed = signer.sign_transaction(&bytes).await?;
        self.execute_transaction(&bytes, &[signed.signature]).await
    }

    /// Record `effects` as the latest known state.
    pub async fn apply_effects(&self, effects: &TransactionEffects) -> Result<()> {
        *self.last_digest.lock() = Some(effects.v2().transaction_digest);
        self.cache
            .apply_effects(effects)
            .await
            .map_err(ExecutorError::Cache)
    }

    /// Forget owned objects and custom entries once the last transaction
    /// is visible to the ledger.
    pub async fn reset(&self) -> Result<()> {
        info!("resetting object cache");
        futures::try_join!(
            async { self.cache.clear_owned_objects().await.map_err(ExecutorError::Cache) },
            async { self.cache.clear_custom().await.map_err(ExecutorError::Cache) },
            self.wait_for_last_transaction(),
        )?;
        Ok(())
    }

    /// Wait until the most recently applied transaction can be read back.
    pub async fn wait_for_last_transaction(&self) -> Result<()> {
        let digest = self.last_digest.lock().take();
        if let Some(digest) = digest {
            debug!(%digest, "waiting for last transaction");
            wait_for_transaction(self.client.as_ref(), &digest, self.wait_options.clone()).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use sui_transaction::Ed25519Keypair;
    use sui_transport::test_utils::MockLedger;

    #[tokio::test]
    async fn test_execute_updates_cache_and_waits_on_reset() {
        let ledger = Arc::new(MockLedger::new());
        let keypair = Ed25519Keypair::from_secret_key(&[7; 32]);
        let sender = keypair.to_sui_address();
        let gas = ledger.add_coin(sender, 10_000_000_000);
        ledger.set_status_delay_polls(1);

        let executor = CachingTransactionExecutor::new(ledger.clone(), ObjectCache::new())
            .with_wait_options(
                WaitOptions::default().with_poll_interval(Duration::from_millis(5)),
            );

        let mut tx = Transaction::new();
        let amount = tx.pure_u64(1_000).unwrap();
        let coin = tx.split_coins(tx.gas(), vec![amount]).unwrap();
        let to = tx.pure_address(sender).unwrap();
        tx.transfer_objects(vec![coin.nested_result(0)], to).unwrap();

        let result = executor
            .sign_and_execute_transaction(&mut tx, &keypair)
            .await
            .unwrap();
        assert!(result.is_success());

        let (gas_after, _) = result.effects.gas_object().unwrap();
        let cached = executor.cache().get_object(&gas.object_id).await.unwrap().unwrap();
        assert_eq!(cached.object_ref(), gas_after);

        executor.reset().await.unwrap();
        assert_eq!(executor.cache().get_object(&gas.object_id).await.unwrap(), None);
        // nothing left to wait for
        executor.wait_for_last_transaction().await.unwrap();
    }

    #[tokio::test]
    async fn test_submission_error_is_reported_without_touching_cache() {
        let ledger = Arc::new(MockLedger::new());
        let keypair = Ed25519Keypair::from_secret_key(&[8; 32]);
        ledger.add_coin(keypair.to_sui_address(), 10_000_000_000);
        ledger.fail_next_submissions(1);
        let executor = CachingTransactionExecutor::new(ledger.clone(), ObjectCache::new());

        let mut tx = Transaction::new();
        let amount = tx.pure_u64(1).unwrap();
        tx.split_coins(tx.gas(), vec![amount]).unwrap();
        let err = executor
            .sign_and_execute_transaction(&mut tx, &keypair)
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutorError::Client(_)));
        assert!(err.to_string().contains("rejected"));
        assert!(executor.cache().metrics().snapshot().invalidations == 0);
    }
}
