//! End-to-end tests for the parallel executor against the in-memory ledger.

mod common;

use std::time::Duration;

use common::{assert_error_contains, assert_executed, funded_account, item_call, item_package, touch_item, TestAccount};
use sui_txkit::executor::{ParallelExecutorOptions, ParallelTransactionExecutor};
use sui_txkit::types::ObjectRef;

fn parallel_executor(account: &TestAccount, coin_batch_size: usize) -> ParallelTransactionExecutor {
    ParallelTransactionExecutor::new(
        account.ledger.clone(),
        account.signer.clone(),
        ParallelExecutorOptions {
            coin_batch_size,
            ..ParallelExecutorOptions::default()
        },
    )
}

fn add_item(account: &TestAccount) -> ObjectRef {
    let item_type = format!("{}::item::Item", item_package().to_hex_literal());
    account.ledger.add_owned_object(account.address, &item_type)
}

#[tokio::test]
async fn test_transactions_on_one_object_never_overlap() {
    let account = funded_account(41);
    account.ledger.set_execution_delay(Duration::from_millis(20));
    let item = add_item(&account);
    let executor = parallel_executor(&account, 4);

    let (first, second) = futures::join!(
        executor.execute_transaction(touch_item(item.object_id)),
        executor.execute_transaction(touch_item(item.object_id)),
    );
    // the later call was built from the earlier call's effects
    assert_executed(&first.unwrap(), "first touch");
    assert_executed(&second.unwrap(), "second touch");

    assert_eq!(account.ledger.conflicting_executions(), 0);
    assert_eq!(account.ledger.executed_transactions().len(), 3);
    assert_eq!(executor.pending_transactions(), 0);
}

#[tokio::test]
async fn test_independent_transactions_use_separate_gas_coins() {
    let account = funded_account(42);
    account.ledger.set_execution_delay(Duration::from_millis(10));
    let items: Vec<ObjectRef> = (0..3).map(|_| add_item(&account)).collect();
    let executor = parallel_executor(&account, 3);

    let results = futures::future::join_all(
        items
            .iter()
            .map(|item| executor.execute_transaction(touch_item(item.object_id))),
    )
    .await;
    for (index, result) in results.into_iter().enumerate() {
        assert_executed(&result.unwrap(), &format!("touch {}", index));
    }

    let executed = account.ledger.executed_transactions();
    // one refill plus three touches
    assert_eq!(executed.len(), 4);
    let mut gas_coins: Vec<_> = executed[1..]
        .iter()
        .map(|tx| tx.v1().gas_data.payment[0].object_id)
        .collect();
    gas_coins.sort();
    gas_coins.dedup();
    assert_eq!(gas_coins.len(), 3);

    assert_eq!(account.ledger.conflicting_executions(), 0);
    assert_eq!(executor.pool_coins().len(), 3);
}

#[tokio::test]
async fn test_gas_coin_of_rejected_transaction_funds_next_refill() {
    let account = funded_account(43);
    let funding_coin = account.ledger.coins_owned_by(account.address)[0].object_id;
    let item = add_item(&account);
    let executor = parallel_executor(&account, 1);

    let first = executor
        .execute_transaction(touch_item(item.object_id))
        .await
        .unwrap();
    assert_executed(&first, "first touch");
    let pooled = executor.pool_coins();
    assert_eq!(pooled.len(), 1);
    let pooled_id = pooled[0].object_ref.object_id;

    account.ledger.fail_next_submissions(1);
    let err = executor
        .execute_transaction(touch_item(item.object_id))
        .await
        .unwrap_err();
    assert_error_contains(&err, "rejected", "second touch");
    assert!(executor.pool_coins().is_empty());
    assert_eq!(executor.source_coins().get(&pooled_id), Some(&None));

    // pool is empty, so this refills from the funding coin and the returned coin
    let third = executor
        .execute_transaction(touch_item(item.object_id))
        .await
        .unwrap();
    assert_executed(&third, "touch after rejection");

    assert!(account.ledger.object(&pooled_id).is_none());
    let sources = executor.source_coins();
    assert_eq!(sources.len(), 1);
    assert!(sources.contains_key(&funding_coin));
    assert_eq!(executor.pool_coins().len(), 1);
}

#[tokio::test]
async fn test_move_abort_returns_gas_coin_to_pool() {
    let account = funded_account(44);
    account.ledger.abort_move_call(item_package(), "item", "fail", 3);
    let item = add_item(&account);
    let executor = parallel_executor(&account, 2);

    let aborted = executor
        .execute_transaction(item_call("fail", item.object_id))
        .await
        .unwrap();
    assert!(!aborted.is_success());
    assert_eq!(executor.pool_coins().len(), 2);

    let touched = executor
        .execute_transaction(touch_item(item.object_id))
        .await
        .unwrap();
    assert_executed(&touched, "touch after abort");
}
