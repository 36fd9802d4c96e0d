#![allow(unused_imports)]
//! Shared test utilities for integration tests.
//!
//! # Modules
//!
//! - `setup`: funded accounts on an in-memory ledger and transaction helpers
//! - `assertions`: assertions that name the transaction or object involved

pub mod assertions;
pub mod setup;

pub use assertions::{assert_error_contains, assert_executed, assert_owned_by};
pub use setup::{
    funded_account, item_call, item_package, pay_from_gas, touch_item, TestAccount,
    FUNDED_BALANCE,
};
