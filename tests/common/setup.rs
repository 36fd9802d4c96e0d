//! Ledger and signer setup shared by the executor tests.

use std::sync::Arc;

use sui_transaction::{Ed25519Keypair, Signer, Transaction};
use sui_transport::test_utils::MockLedger;
use sui_transport::{MoveFunction, MoveType};
use sui_types::{ObjectID, SuiAddress};

/// Balance of the coin every funded account starts with.
pub const FUNDED_BALANCE: u64 = 100_000_000_000;

/// Package seeded with the `item::touch(&mut Item)` and `item::fail(&mut Item)` functions.
pub const ITEM_PACKAGE: u16 = 0x7a;

pub struct TestAccount {
    pub ledger: Arc<MockLedger>,
    pub signer: Arc<Ed25519Keypair>,
    pub address: SuiAddress,
}

/// A ledger with one funded account derived from `seed`.
pub fn funded_account(seed: u8) -> TestAccount {
    let ledger = Arc::new(MockLedger::new());
    let signer = Arc::new(Ed25519Keypair::from_secret_key(&[seed; 32]));
    let address = signer.to_sui_address();
    ledger.add_coin(address, FUNDED_BALANCE);
    seed_item_package(&ledger);
    TestAccount {
        ledger,
        signer,
        address,
    }
}

pub fn item_package() -> ObjectID {
    SuiAddress::from_u16(ITEM_PACKAGE)
}

fn seed_item_package(ledger: &MockLedger) {
    let package = item_package();
    let item = MoveType::struct_type(package, "item", "Item");
    for function in ["touch", "fail"] {
        ledger.add_move_function(
            package,
            "item",
            function,
            MoveFunction::public(vec![MoveType::MutableReference(Box::new(item.clone()))]),
        );
    }
}

/// `item::touch(&mut item)` on an object the sender owns.
pub fn touch_item(item: ObjectID) -> Transaction {
    item_call("touch", item)
}

pub fn item_call(function: &str, item: ObjectID) -> Transaction {
    let mut tx = Transaction::new();
    let item = tx
        .object(item)
        .unwrap_or_else(|e| panic!("object {} should be accepted: {}", item, e));
    let target = format!("{}::item::{}", item_package().to_hex_literal(), function);
    tx.move_call(&target, &[], vec![item])
        .unwrap_or_else(|e| panic!("move call {} should be accepted: {}", target, e));
    tx
}

/// Split `amount` off the gas coin and send it to `recipient`.
pub fn pay_from_gas(amount: u64, recipient: SuiAddress) -> Transaction {
    let mut tx = Transaction::new();
    let amount = tx
        .pure_u64(amount)
        .unwrap_or_else(|e| panic!("amount should be accepted: {}", e));
    let coin = tx
        .split_coins(tx.gas(), vec![amount])
        .unwrap_or_else(|e| panic!("split should be accepted: {}", e));
    let recipient = tx
        .pure_address(recipient)
        .unwrap_or_else(|e| panic!("recipient should be accepted: {}", e));
    tx.transfer_objects(vec![coin.nested_result(0)], recipient)
        .unwrap_or_else(|e| panic!("transfer should be accepted: {}", e));
    tx
}
