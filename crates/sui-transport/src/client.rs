//! The ledger collaborator interface.
//!
//! Everything above this crate talks to the network through [`SuiClient`].
//! A JSON-RPC or gRPC implementation lives outside this workspace; tests use
//! [`crate::test_utils::MockLedger`].

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use sui_types::{ObjectID, SuiAddress, TransactionDigest};

use crate::types::{
    CoinPage, DryRunResult, ExecuteResult, MoveFunction, ObjectResponse, SystemState,
};

/// Async access to a ledger full node.
///
/// All methods are suspension points. Implementations must be safe to share
/// between concurrently executing transactions.
#[async_trait]
pub trait SuiClient: Send + Sync {
    /// Fetch the latest version of each object.
    ///
    /// Returns exactly one entry per requested id, in request order. A missing
    /// or deleted object is an `Err` entry, not a failure of the whole call.
    async fn multi_get_objects(&self, ids: &[ObjectID]) -> Result<Vec<ObjectResponse>>;

    /// One page of `owner`'s coins of `coin_type`.
    async fn get_coins(
        &self,
        owner: SuiAddress,
        coin_type: &str,
        cursor: Option<String>,
    ) -> Result<CoinPage>;

    /// Execute without committing. `tx_bytes` is a BCS `TransactionData`.
    async fn dry_run_transaction(&self, tx_bytes: &[u8]) -> Result<DryRunResult>;

    /// Submit a signed transaction and wait for its effects.
    async fn execute_transaction(
        &self,
        tx_bytes: &[u8],
        signatures: &[String],
    ) -> Result<ExecuteResult>;

    async fn get_reference_gas_price(&self) -> Result<u64>;

    async fn get_latest_system_state(&self) -> Result<SystemState>;

    async fn get_normalized_move_function(
        &self,
        package: &ObjectID,
        module: &str,
        function: &str,
    ) -> Result<MoveFunction>;

    /// `None` while the transaction is not yet known to the node.
    async fn get_transaction_status(
        &self,
        digest: &TransactionDigest,
    ) -> Result<Option<ExecuteResult>>;

    /// Resolve `@org/app` style package names to package ids.
    ///
    /// Names that cannot be resolved are absent from the returned map.
    async fn resolve_package_names(&self, names: &[String]) -> Result<HashMap<String, ObjectID>>;

    /// Resolve type strings containing named packages to canonical type strings.
    async fn resolve_type_names(&self, types: &[String]) -> Result<HashMap<String, String>>;
}

#[async_trait]
impl<T: SuiClient + ?Sized> SuiClient for Arc<T> {
    async fn multi_get_objects(&self, ids: &[ObjectID]) -> Result<Vec<ObjectResponse>> {
        (**self).multi_get_objects(ids).await
    }

    async fn get_coins(
        &self,
        owner: SuiAddress,
        coin_type: &str,
        cursor: Option<String>,
    ) -> Result<CoinPage> {
        (**self).get_coins(owner, coin_type, cursor).await
    }

    async fn dry_run_transaction(&self, tx_bytes: &[u8]) -> Result<DryRunResult> {
        (**self).dry_run_transaction(tx_bytes).await
    }

    async fn execute_transaction(
        &self,
        tx_bytes: &[u8],
        signatures: &[String],
    ) -> Result<ExecuteResult> {
        (**self).execute_transaction(tx_bytes, signatures).await
    }

    async fn get_reference_gas_price(&self) -> Result<u64> {
        (**self).get_reference_gas_price().await
    }

    async fn get_latest_system_state(&self) -> Result<SystemState> {
        (**self).get_latest_system_state().await
    }

    async fn get_normalized_move_function(
        &self,
        package: &ObjectID,
        module: &str,
        function: &str,
    ) -> Result<MoveFunction> {
        (**self)
            .get_normalized_move_function(package, module, function)
            .await
    }

    async fn get_transaction_status(
        &self,
        digest: &TransactionDigest,
    ) -> Result<Option<ExecuteResult>> {
        (**self).get_transaction_status(digest).await
    }

    async fn resolve_package_names(&self, names: &[String]) -> Result<HashMap<String, ObjectID>> {
        (**self).resolve_package_names(names).await
    }

    async fn resolve_type_names(&self, types: &[String]) -> Result<HashMap<String, String>> {
        (**self).resolve_type_names(types).await
    }
}

/// Fetch every coin of `coin_type` owned by `owner`, following cursors.
pub async fn get_all_coins(
    client: &dyn SuiClient,
    owner: SuiAddress,
    coin_type: &str,
) -> Result<Vec<crate::types::CoinStruct>> {
    let mut coins = Vec::new();
    let mut cursor = None;
    loop {
        let page = client.get_coins(owner, coin_type, cursor).await?;
        coins.extend(page.data);
        if !page.has_next_page || page.next_cursor.is_none() {
            return Ok(coins);
        }
        cursor = page.next_cursor;
    }
}
