//! Assertion helpers with messages that name the transaction or object involved.

use sui_executor::ExecutionResult;
use sui_transport::test_utils::MockLedger;
use sui_types::{ObjectID, Owner, SuiAddress};

/// Assert that an error message contains expected text, ignoring case.
#[allow(dead_code)]
pub fn assert_error_contains<E: std::fmt::Display>(error: E, expected_text: &str, context: &str) {
    let error_str = error.to_string().to_lowercase();
    assert!(
        error_str.contains(&expected_text.to_lowercase()),
        "{}: error message should contain '{}', got: {}",
        context,
        expected_text,
        error
    );
}

/// Assert that the transaction executed without a Move abort.
#[allow(dead_code)]
pub fn assert_executed(result: &ExecutionResult, context: &str) {
    assert!(
        result.is_success(),
        "{}: transaction {} failed with {:?}",
        context,
        result.digest,
        result.effects.status
    );
}

/// Assert that `id` exists on the ledger and belongs to `owner`.
#[allow(dead_code)]
pub fn assert_owned_by(ledger: &MockLedger, id: &ObjectID, owner: SuiAddress) {
    let object = ledger
        .object(id)
        .unwrap_or_else(|| panic!("object {} does not exist", id));
    assert_eq!(
        object.owner,
        Owner::AddressOwner(owner),
        "object {} has the wrong owner",
        id
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_error_contains() {
        let error = "Submission of transaction 0x5 rejected";
        assert_error_contains(error, "REJECTED", "submission");
    }

    #[test]
    #[should_panic(expected = "should contain 'timeout'")]
    fn test_assert_error_contains_fails() {
        assert_error_contains("rejected", "timeout", "submission");
    }
}
