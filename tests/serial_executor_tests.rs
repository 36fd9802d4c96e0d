//! End-to-end tests for the serial executor against the in-memory ledger.

mod common;

use common::{assert_error_contains, assert_executed, funded_account, item_call, item_package, pay_from_gas, touch_item};
use sui_txkit::executor::{SerialExecutorOptions, SerialTransactionExecutor};
use sui_txkit::types::SuiAddress;

fn serial_executor(account: &common::TestAccount) -> SerialTransactionExecutor {
    SerialTransactionExecutor::new(
        account.ledger.clone(),
        account.signer.clone(),
        SerialExecutorOptions::default(),
    )
}

#[tokio::test]
async fn test_chained_calls_resolve_from_cache() {
    let account = funded_account(31);
    let item_type = format!("{}::item::Item", item_package().to_hex_literal());
    let item = account.ledger.add_owned_object(account.address, &item_type);
    let executor = serial_executor(&account);

    let first = executor
        .execute_transaction(&touch_item(item.object_id))
        .await
        .unwrap();
    assert_executed(&first, "first touch");
    let fetches_after_first = account.ledger.object_fetches();
    let function_fetches_after_first = account.ledger.function_fetches();

    for round in 0..2 {
        let result = executor
            .execute_transaction(&touch_item(item.object_id))
            .await
            .unwrap();
        assert_executed(&result, &format!("touch round {}", round));
    }

    // item version, gas coin and signature all came from earlier effects
    assert_eq!(account.ledger.object_fetches(), fetches_after_first);
    assert_eq!(account.ledger.function_fetches(), function_fetches_after_first);

    let on_ledger = account.ledger.object(&item.object_id).unwrap();
    let cached = executor
        .cache()
        .get_object(&item.object_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cached.version, on_ledger.version);
    assert_eq!(account.ledger.executed_transactions().len(), 3);
}

#[tokio::test]
async fn test_move_abort_keeps_the_queue_going() {
    let account = funded_account(32);
    let item_type = format!("{}::item::Item", item_package().to_hex_literal());
    let item = account.ledger.add_owned_object(account.address, &item_type);
    account.ledger.abort_move_call(item_package(), "item", "fail", 7);
    let executor = serial_executor(&account);

    let aborted = executor
        .execute_transaction(&item_call("fail", item.object_id))
        .await
        .unwrap();
    assert!(!aborted.is_success());

    // the aborted transaction still bumped the item and gas coin versions
    let result = executor
        .execute_transaction(&touch_item(item.object_id))
        .await
        .unwrap();
    assert_executed(&result, "touch after abort");
}

#[tokio::test]
async fn test_rejected_submission_resets_and_recovers() {
    let account = funded_account(33);
    let executor = serial_executor(&account);
    let recipient = SuiAddress::from_u16(0xbeef);

    let first = executor
        .execute_transaction(&pay_from_gas(1_000, recipient))
        .await
        .unwrap();
    assert_executed(&first, "first payment");

    account.ledger.fail_next_submissions(1);
    let err = executor
        .execute_transaction(&pay_from_gas(2_000, recipient))
        .await
        .unwrap_err();
    assert_error_contains(&err, "rejected", "second payment");

    let third = executor
        .execute_transaction(&pay_from_gas(3_000, recipient))
        .await
        .unwrap();
    assert_executed(&third, "payment after reset");

    let received: Vec<u64> = account
        .ledger
        .coins_owned_by(recipient)
        .iter()
        .map(|coin| coin.balance)
        .collect();
    assert_eq!(received.len(), 2);
    assert!(received.contains(&1_000));
    assert!(received.contains(&3_000));
}
