use crate::builder::TransactionDataBuilder;
use crate::error::{Result, TransactionError};

/// Fail on the first input that is still unresolved.
pub fn validate(data: &TransactionDataBuilder) -> Result<()> {
    match data
        .inputs
        .iter()
        .enumerate()
        .find(|(_, input)| !input.is_resolved())
    {
        Some((index, input)) => Err(TransactionError::UnresolvedInput {
            index,
            kind: input.kind(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments::InputKind;
    use crate::inputs::CallArg;

    #[test]
    fn test_reports_first_unresolved_input() {
        let mut data = TransactionDataBuilder::new();
        data.add_input(InputKind::Pure, CallArg::Pure(vec![1])).unwrap();
        data.add_input(InputKind::Pure, CallArg::UnresolvedPure(serde_json::json!(1)))
            .unwrap();

        let err = validate(&data).unwrap_err();
        assert!(matches!(
            err,
            TransactionError::UnresolvedInput { index: 1, kind: "UnresolvedPure" }
        ));
    }
}
