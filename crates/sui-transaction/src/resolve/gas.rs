//! Gas price, budget and payment.

use std::collections::HashSet;

use sui_transport::get_all_coins;
use sui_types::framework::{MAX_GAS_OBJECTS, SUI_TYPE};
use sui_types::{ObjectArg, ObjectID};
use tracing::debug;

use super::{GAS_SAFE_OVERHEAD, MAX_GAS};
use crate::builder::{BuildOverrides, DataBuildOptions, GasConfig, TransactionDataBuilder};
use crate::error::{Result, TransactionError};
use crate::inputs::CallArg;
use crate::plugin::BuildOptions;

/// Use the reference gas price unless a price is already set.
pub async fn set_gas_price(data: &mut TransactionDataBuilder, options: &BuildOptions) -> Result<()> {
    if data.gas_data.price.is_none() {
        let price = options.client()?.get_reference_gas_price().await?;
        debug!(price, "using reference gas price");
        data.gas_data.price = Some(price);
    }
    Ok(())
}

/// Budget from a dry run at [`MAX_GAS`] with an empty payment.
///
/// The estimate is `computation + GAS_SAFE_OVERHEAD * price`, plus the net
/// storage charge when that is positive.
pub async fn set_gas_budget(data: &mut TransactionDataBuilder, options: &BuildOptions) -> Result<()> {
    if data.gas_data.budget.is_some() {
        return Ok(());
    }
    let client = options.client()?;
    let bytes = data.build(&DataBuildOptions {
        only_transaction_kind: false,
        overrides: Some(BuildOverrides {
            gas_data: GasConfig {
                budget: Some(MAX_GAS),
                payment: Some(vec![]),
                ..GasConfig::default()
            },
            ..BuildOverrides::default()
        }),
    })?;
    let dry_run = client.dry_run_transaction(&bytes).await?;
    let effects = dry_run.effects.v2();
    if let sui_types::ExecutionStatus::Failure { error, .. } = &effects.status {
        return Err(TransactionError::DryRunFailed(error.to_string()));
    }

    let price = data.gas_data.price.unwrap_or_default();
    let gas = &effects.gas_used;
    let safe_overhead = GAS_SAFE_OVERHEAD as i128 * price as i128;
    let base = gas.computation_cost as i128 + safe_overhead;
    let with_storage = base + gas.storage_cost as i128 - gas.storage_rebate as i128;
    let budget = u64::try_from(base.max(with_storage)).unwrap_or(u64::MAX);

    debug!(budget, "estimated gas budget");
    data.gas_data.budget = Some(budget);
    Ok(())
}

/// Pay with the owner's largest SUI coins that are not also inputs.
pub async fn set_gas_payment(data: &mut TransactionDataBuilder, options: &BuildOptions) -> Result<()> {
    if data.gas_data.payment.is_some() {
        return Ok(());
    }
    let owner = data
        .gas_data
        .owner
        .or(data.sender)
        .ok_or(TransactionError::MissingField("transaction sender"))?;
    let client = options.client()?;

    let used: HashSet<ObjectID> = data
        .inputs
        .iter()
        .filter_map(|input| match input {
            CallArg::Object(ObjectArg::ImmOrOwnedObject(r)) => Some(r.object_id),
            _ => None,
        })
        .collect();
    let mut coins: Vec<_> = get_all_coins(client, owner, SUI_TYPE)
        .await?
        .into_iter()
        .filter(|coin| !used.contains(&coin.coin_object_id))
        .collect();
    coins.sort_by(|a, b| b.balance.cmp(&a.balance));
    coins.truncate(MAX_GAS_OBJECTS);

    if coins.is_empty() {
        return Err(TransactionError::NoGasCoins);
    }
    debug!(owner = %owner, coins = coins.len(), "selected gas payment");
    data.gas_data.payment = Some(coins.iter().map(|c| c.object_ref()).collect());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sui_transport::test_utils::MockLedger;
    use sui_types::{GasCostSummary, SuiAddress};

    use crate::arguments::{Argument, InputKind};
    use crate::commands::Command;

    fn sender() -> SuiAddress {
        SuiAddress::new([3; 32])
    }

    fn split_tx() -> TransactionDataBuilder {
        let mut data = TransactionDataBuilder::new();
        data.sender = Some(sender());
        let amount = data
            .add_input(InputKind::Pure, CallArg::Pure(5u64.to_le_bytes().to_vec()))
            .unwrap();
        data.add_command(Command::split_coins(Argument::GasCoin, vec![amount]))
            .unwrap();
        data
    }

    #[tokio::test]
    async fn test_budget_from_dry_run() {
        let ledger = Arc::new(MockLedger::new());
        let options = BuildOptions::with_client(ledger.clone());
        let mut data = split_tx();

        set_gas_price(&mut data, &options).await.unwrap();
        set_gas_budget(&mut data, &options).await.unwrap();
        // 1000 computation + 1000 * 1000 overhead + 500 storage - 200 rebate
        assert_eq!(data.gas_data.price, Some(1000));
        assert_eq!(data.gas_data.budget, Some(1_001_300));
        assert_eq!(ledger.dry_runs(), 1);
    }

    #[tokio::test]
    async fn test_rebate_never_lowers_budget_below_computation() {
        let ledger = Arc::new(MockLedger::new());
        ledger.set_gas_cost(GasCostSummary {
            computation_cost: 1000,
            storage_cost: 0,
            storage_rebate: 900,
            non_refundable_storage_fee: 0,
        });
        let mut data = split_tx();
        data.gas_data.price = Some(10);

        set_gas_budget(&mut data, &BuildOptions::with_client(ledger))
            .await
            .unwrap();
        assert_eq!(data.gas_data.budget, Some(11_000));
    }

    #[tokio::test]
    async fn test_failed_dry_run() {
        let ledger = Arc::new(MockLedger::new());
        ledger.fail_dry_runs("InsufficientGas");
        let mut data = split_tx();
        data.gas_data.price = Some(1000);

        let err = set_gas_budget(&mut data, &BuildOptions::with_client(ledger))
            .await
            .unwrap_err();
        assert!(matches!(err, TransactionError::DryRunFailed(ref e) if e == "InsufficientGas"));
    }

    #[tokio::test]
    async fn test_payment_prefers_large_coins_and_skips_inputs() {
        let ledger = Arc::new(MockLedger::new());
        let small = ledger.add_coin(sender(), 10);
        let large = ledger.add_coin(sender(), 1_000);
        let as_input = ledger.add_coin(sender(), 5_000);

        let mut data = split_tx();
        data.add_input(InputKind::Object, CallArg::object_ref(as_input))
            .unwrap();

        set_gas_payment(&mut data, &BuildOptions::with_client(ledger))
            .await
            .unwrap();
        assert_eq!(data.gas_data.payment, Some(vec![large, small]));
    }

    #[tokio::test]
    async fn test_no_gas_coins() {
        let ledger = Arc::new(MockLedger::new());
        let mut data = split_tx();
        let err = set_gas_payment(&mut data, &BuildOptions::with_client(ledger))
            .await
            .unwrap_err();
        assert!(matches!(err, TransactionError::NoGasCoins));
    }
}
